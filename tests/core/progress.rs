// Integration tests for progress snapshots polled during a run

use crate::common::{create_test_services, TestLibrary};
use booksearch::core::progress::RunPhase;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;

#[test]
fn test_snapshots_stay_consistent_during_run() {
    let mut library = TestLibrary::new();
    for i in 0..40 {
        library.add_text(
            &format!("book_{i:02}.txt"),
            &format!("volume {i} of the long series about lighthouses"),
        );
    }
    let (_index, services) = create_test_services(library.path());
    let services = Arc::new(services);
    let done = Arc::new(AtomicBool::new(false));

    let poller = {
        let tracker = Arc::clone(&services.tracker);
        let done = Arc::clone(&done);
        thread::spawn(move || {
            let mut seen = Vec::new();
            while !done.load(Ordering::SeqCst) {
                if let Some(snapshot) = tracker.snapshot() {
                    seen.push(snapshot);
                }
                thread::yield_now();
            }
            seen
        })
    };

    let summary = services.orchestrator().unwrap().run(library.path());
    done.store(true, Ordering::SeqCst);
    let snapshots = poller.join().unwrap();

    assert_eq!(summary.processed_files, 40);
    for snapshot in &snapshots {
        assert!(snapshot.processed_files <= snapshot.total_files || snapshot.total_files == 0);
        assert!((0.0..=100.0).contains(&snapshot.percentage));
        assert!(snapshot.estimated_remaining_secs >= 0.0);
        assert_ne!(snapshot.phase, RunPhase::Idle);
        assert_ne!(snapshot.phase, RunPhase::Done);
    }

    // Processed counts never go backwards
    for pair in snapshots.windows(2) {
        assert!(pair[0].processed_files <= pair[1].processed_files);
    }

    assert!(services.tracker.snapshot().is_none());
}

#[test]
fn test_snapshot_reports_errors_of_current_run_only() {
    let mut library = TestLibrary::new();
    library.add_text("broken.epub", "not an archive");
    let (_index, services) = create_test_services(library.path());

    services.orchestrator().unwrap().run(library.path());
    assert_eq!(services.tracker.errors().len(), 1);

    std::fs::remove_file(library.path().join("broken.epub")).unwrap();
    services.orchestrator().unwrap().run(library.path());
    assert!(services.tracker.errors().is_empty());
}
