//! Utility functions for file presentation and type detection

use std::path::Path;

/// Format a byte count for display
///
/// Uses 1024-based units and at most two decimals, trimming trailing zeros:
/// `0` → "0 Bytes", `1536` → "1.5 KB", `10485760` → "10 MB".
pub fn format_file_size(bytes: u64) -> String {
    const UNITS: [&str; 5] = ["Bytes", "KB", "MB", "GB", "TB"];

    if bytes == 0 {
        return "0 Bytes".to_string();
    }

    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }

    let rounded = (value * 100.0).round() / 100.0;
    let text = format!("{:.2}", rounded);
    let text = text.trim_end_matches('0').trim_end_matches('.');
    format!("{} {}", text, UNITS[unit])
}

/// Shorten a file name to `max_chars` characters, appending "..." when cut
pub fn truncate_filename(name: &str, max_chars: usize) -> String {
    match name.char_indices().nth(max_chars) {
        Some((byte_idx, _)) => format!("{}...", &name[..byte_idx]),
        None => name.to_string(),
    }
}

/// Guess a MIME type from a path's extension
pub fn guess_mime(path: &Path) -> String {
    mime_guess::from_path(path)
        .first_raw()
        .unwrap_or("application/octet-stream")
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_file_size_units() {
        assert_eq!(format_file_size(0), "0 Bytes");
        assert_eq!(format_file_size(512), "512 Bytes");
        assert_eq!(format_file_size(1024), "1 KB");
        assert_eq!(format_file_size(1536), "1.5 KB");
        assert_eq!(format_file_size(10 * 1024 * 1024), "10 MB");
        assert_eq!(format_file_size(1_288_490_189), "1.2 GB");
    }

    #[test]
    fn test_truncate_filename() {
        assert_eq!(truncate_filename("short.pdf", 30), "short.pdf");
        assert_eq!(
            truncate_filename("a-very-long-document-name-that-goes-on.pdf", 30),
            "a-very-long-document-name-that..."
        );
    }

    #[test]
    fn test_truncate_filename_is_char_safe() {
        assert_eq!(truncate_filename("ringkasan-ñandú.pdf", 12), "ringkasan-ña...");
    }

    #[test]
    fn test_guess_mime() {
        assert_eq!(guess_mime(Path::new("a.pdf")), "application/pdf");
        assert_eq!(guess_mime(Path::new("b.txt")), "text/plain");
        assert_eq!(guess_mime(Path::new("noext")), "application/octet-stream");
    }
}
