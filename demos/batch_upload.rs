//! Queue the PDFs given on the command line, process them as one batch and
//! print the handed-off results.
//!
//! ```bash
//! RUST_LOG=docsum_batch=debug cargo run --example batch_upload -- a.pdf b.pdf
//! ```
//!
//! Set `DOCSUM_CONFIG` to a JSON config file to override the defaults
//! (for example the service `base_url`).

use docsum_batch::{ArtifactKind, BatchOrchestrator, Config, Event, FileRef, utils};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let paths: Vec<String> = std::env::args().skip(1).collect();
    if paths.is_empty() {
        eprintln!("usage: batch_upload <file.pdf>...");
        std::process::exit(2);
    }

    let config = match std::env::var("DOCSUM_CONFIG") {
        Ok(path) => Config::from_json_file(path)?,
        Err(_) => Config::default(),
    };

    let mut orchestrator = BatchOrchestrator::new(config)?;

    let mut events = orchestrator.subscribe();
    let printer = tokio::spawn(async move {
        while let Ok(event) = events.recv().await {
            match event {
                Event::Notification { message, severity, .. } => {
                    println!("{} {}", severity.icon(), message)
                }
                Event::BatchProgress {
                    processed,
                    total,
                    percent,
                } => println!("[{:>3}%] {}/{} processed", percent, processed, total),
                _ => {}
            }
        }
    });

    let mut files = Vec::with_capacity(paths.len());
    for path in &paths {
        match FileRef::from_path(path).await {
            Ok(file) => files.push(file),
            Err(e) => eprintln!("skipping {}: {}", path, e),
        }
    }

    orchestrator.add_files(files).await;
    for row in orchestrator.view().rows {
        println!("  {} ({}) {}", row.display_name, row.size_text, row.status_text);
    }

    let summary = match orchestrator.process().await {
        Ok(summary) => summary,
        Err(e) => {
            eprintln!("not processed: {} ({})", e, e.code());
            orchestrator.shutdown();
            return Ok(());
        }
    };

    println!(
        "\n{} document(s) processed, {} degraded, results under \"{}\"",
        summary.total, summary.degraded, summary.handoff_key
    );

    for result in orchestrator.results().take().unwrap_or_default() {
        println!("\n== {} ==", utils::truncate_filename(&result.source_name, 30));
        if let Some(error) = &result.error {
            println!("  failed: {}", error);
            continue;
        }
        for section in &result.sections {
            println!("  {}: {}", section.title, section.summary);
        }
        for kind in [ArtifactKind::Pdf, ArtifactKind::Docx] {
            if let Some(artifact) = result.artifact(kind) {
                println!("  download {:?}: {}", kind, artifact.url);
            }
        }
    }

    orchestrator.shutdown();
    drop(orchestrator);
    printer.await.ok();

    Ok(())
}
