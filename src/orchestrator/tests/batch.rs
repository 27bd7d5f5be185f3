use super::*;
use crate::orchestrator::batch::SKIPPED_REASON;

// --- process() precondition tests ---

#[tokio::test]
async fn test_process_empty_queue_is_refused() {
    let processor = ScriptedProcessor::succeeding();
    let mut orch = create_test_orchestrator(processor.clone());
    let mut rx = orch.subscribe();

    let err = orch.process().await.unwrap_err();

    assert!(matches!(
        err,
        Error::Precondition(PreconditionError::EmptyQueue)
    ));
    assert_eq!(err.code(), "empty_queue");
    assert!(processor.calls().is_empty());
    assert!(orch.results().take().is_none(), "nothing should be handed off");
    assert!(drain_events(&mut rx).iter().all(|e| matches!(e, Event::Notification { .. })));

    let current = orch.notifications().current().unwrap();
    assert_eq!(current.severity, Severity::Warning);
    assert!(!orch.is_running());
}

#[tokio::test]
async fn test_process_refused_while_uploads_pending() {
    let processor = ScriptedProcessor::succeeding();
    let mut orch = create_test_orchestrator(processor.clone());
    orch.add_files([pdf("done.pdf")]).await;
    // Bypass staging so the item stays in flight
    orch.queue.add(pdf("inflight.pdf"));

    let err = orch.process().await.unwrap_err();

    assert!(matches!(
        err,
        Error::Precondition(PreconditionError::UploadsPending { pending: 1 })
    ));
    assert!(processor.calls().is_empty());
    assert!(!orch.results().is_occupied());
    assert_eq!(
        orch.notifications().current().unwrap().severity,
        Severity::Warning
    );
    assert!(!orch.is_running());
}

// --- process() run tests ---

#[tokio::test]
async fn test_failed_item_degrades_without_aborting_batch() {
    let processor = ScriptedProcessor::failing_for(&["x.pdf"]);
    let mut orch = create_test_orchestrator(processor.clone());
    orch.add_files([pdf("x.pdf"), pdf("y.pdf")]).await;
    let mut rx = orch.subscribe();

    let summary = orch.process().await.unwrap();

    assert_eq!(summary.total, 2);
    assert_eq!(summary.degraded, 1);
    assert_eq!(summary.handoff_key, "processing_results");

    let results = orch.results().take().unwrap();
    assert_eq!(results.len(), 2);
    assert_eq!(results[0].source_name, "x.pdf");
    assert!(results[0].degraded);
    assert!(results[0].sections.is_empty());
    assert!(results[0].error.is_some());
    assert_eq!(results[1].source_name, "y.pdf");
    assert!(!results[1].degraded);
    assert_eq!(results[1].sections.len(), 1);

    let events = drain_events(&mut rx);
    assert_eq!(progress_sequence(&events), vec![50, 100]);
    assert!(events.iter().any(|e| matches!(e, Event::BatchDone { total: 2, degraded: 1 })));

    let current = orch.notifications().current().unwrap();
    assert_eq!(current.severity, Severity::Warning);
    assert_eq!(current.message, "Processed 2 file(s), 1 failed");
}

#[tokio::test]
async fn test_items_processed_in_queue_order_one_at_a_time() {
    let processor = ScriptedProcessor::succeeding();
    let mut orch = create_test_orchestrator(processor.clone());
    orch.add_files([pdf("c.pdf"), pdf("a.pdf"), pdf("b.pdf")])
        .await;
    let mut rx = orch.subscribe();

    let summary = orch.process().await.unwrap();
    assert_eq!(summary.degraded, 0);

    assert_eq!(processor.calls(), ["c.pdf", "a.pdf", "b.pdf"]);
    assert_eq!(processor.max_in_flight(), 1);

    let names: Vec<_> = orch
        .results()
        .take()
        .unwrap()
        .into_iter()
        .map(|r| r.source_name)
        .collect();
    assert_eq!(names, ["c.pdf", "a.pdf", "b.pdf"]);

    assert_eq!(progress_sequence(&drain_events(&mut rx)), vec![33, 67, 100]);
    let current = orch.notifications().current().unwrap();
    assert_eq!(current.severity, Severity::Success);
    assert_eq!(current.message, "Processed 3 file(s)");
}

#[tokio::test]
async fn test_errored_item_is_skipped_but_counted() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("gone.pdf");
    std::fs::write(&path, b"%PDF").unwrap();
    let gone = FileRef::from_path(&path).await.unwrap();
    std::fs::remove_file(&path).unwrap();

    let processor = ScriptedProcessor::succeeding();
    let mut orch = create_test_orchestrator(processor.clone());
    orch.add_files([gone, pdf("ok.pdf")]).await;
    let mut rx = orch.subscribe();

    let summary = orch.process().await.unwrap();

    assert_eq!(processor.calls(), ["ok.pdf"]);
    assert_eq!(summary.total, 2);
    assert_eq!(summary.degraded, 1);

    let results = orch.results().take().unwrap();
    assert_eq!(results[0].source_name, "gone.pdf");
    assert!(results[0].degraded);
    assert_eq!(results[0].error.as_deref(), Some(SKIPPED_REASON));
    assert!(!results[1].degraded);

    assert_eq!(progress_sequence(&drain_events(&mut rx)), vec![50, 100]);
}

#[tokio::test]
async fn test_remote_state_recorded_per_item() {
    let processor = ScriptedProcessor::failing_for(&["bad.pdf"]);
    let mut orch = create_test_orchestrator(processor);
    let report = orch.add_files([pdf("good.pdf"), pdf("bad.pdf")]).await;

    assert!(
        orch.queue()
            .items()
            .iter()
            .all(|item| item.remote == RemoteState::Pending)
    );

    orch.process().await.unwrap();

    let good = orch.queue().get(report.accepted[0]).unwrap();
    let bad = orch.queue().get(report.accepted[1]).unwrap();
    assert_eq!(good.remote, RemoteState::Processed);
    assert_eq!(bad.remote, RemoteState::Degraded);
    // Local status is untouched by remote failures
    assert_eq!(bad.status, Status::Completed);
}

#[tokio::test]
async fn test_trigger_restored_after_run() {
    let mut orch = create_test_orchestrator(ScriptedProcessor::failing_for(&["a.pdf"]));
    orch.add_files([pdf("a.pdf")]).await;

    let before = orch.view();
    assert!(before.process_button.enabled);
    assert_eq!(before.process_button.label, "Process 1 file(s)");

    orch.process().await.unwrap();

    assert!(!orch.is_running());
    let after = orch.view();
    assert!(after.process_button.enabled);
    assert_eq!(after.rows[0].remote_text, Some("Processing failed"));
}

#[tokio::test]
async fn test_second_run_replaces_unread_results() {
    let mut orch = create_test_orchestrator(ScriptedProcessor::succeeding());
    orch.add_files([pdf("a.pdf")]).await;
    orch.process().await.unwrap();

    orch.add_files([pdf("b.pdf")]).await;
    orch.process().await.unwrap();

    let results = orch.results().take().unwrap();
    let names: Vec<_> = results.iter().map(|r| r.source_name.as_str()).collect();
    assert_eq!(names, ["a.pdf", "b.pdf"]);
    assert!(orch.results().take().is_none());
}

#[tokio::test]
async fn test_results_available_as_json() {
    let mut orch = create_test_orchestrator(ScriptedProcessor::succeeding());
    orch.add_files([pdf("a.pdf")]).await;
    orch.process().await.unwrap();

    let json = orch.results().take_json().unwrap().unwrap();
    let value: serde_json::Value = serde_json::from_str(&json).unwrap();
    assert_eq!(value[0]["source_name"], "a.pdf");
    assert_eq!(value[0]["sections"][0]["title"], "BAB I");
}
