// Test scroll synchronization: bidirectional line mapping, debounce
// coalescing, and echo suppression

use marginalia_wasm::sync::{LineProbe, ScrollSynchronizer, SyncConfig, SyncView};

fn make_sync() -> ScrollSynchronizer {
    let mut sync = ScrollSynchronizer::new(SyncConfig::default());
    // The rendered view spreads the same lines over more vertical space
    // than the raw editor
    sync.set_probes(
        SyncView::Structured,
        vec![
            LineProbe { line: 1, top: 0.0 },
            LineProbe { line: 4, top: 150.0 },
            LineProbe { line: 8, top: 420.0 },
            LineProbe { line: 12, top: 610.0 },
        ],
    );
    sync.set_probes(
        SyncView::Raw,
        vec![
            LineProbe { line: 1, top: 0.0 },
            LineProbe { line: 4, top: 54.0 },
            LineProbe { line: 8, top: 126.0 },
            LineProbe { line: 12, top: 198.0 },
        ],
    );
    sync
}

#[test]
fn test_mapping_is_bidirectional() {
    let sync = make_sync();

    let line = sync.line_for_scroll(SyncView::Structured, 400.0).unwrap();
    assert_eq!(line, 8);
    assert_eq!(sync.scroll_for_line(SyncView::Raw, line), Some(126.0));

    let line = sync.line_for_scroll(SyncView::Raw, 54.0).unwrap();
    assert_eq!(line, 4);
    assert_eq!(sync.scroll_for_line(SyncView::Structured, line), Some(150.0));
}

#[test]
fn test_jump_to_line_between_probes_snaps_forward() {
    let sync = make_sync();
    // Line 6 has no probe; the nearest probed line at or after it is 8
    assert_eq!(sync.scroll_for_line(SyncView::Structured, 6), Some(420.0));
}

#[test]
fn test_burst_coalesces_into_one_mirrored_scroll() {
    let mut sync = make_sync();

    for (i, top) in [100.0, 200.0, 300.0, 420.0].iter().enumerate() {
        assert!(sync.on_scroll(SyncView::Structured, *top, i as f64 * 30.0));
        // Nothing fires while the burst keeps the window open
        assert_eq!(sync.poll(i as f64 * 30.0 + 10.0), None);
    }

    // Window closes 100ms after the last event; only the final position syncs
    let cmd = sync.poll(90.0 + 150.0).expect("burst must produce one command");
    assert_eq!(cmd.target, SyncView::Raw);
    assert_eq!(cmd.line, 8);
    assert_eq!(cmd.scroll_top, 126.0);
    assert_eq!(sync.poll(1000.0), None, "one command per burst");
}

#[test]
fn test_echo_never_ping_pongs() {
    let mut sync = make_sync();

    sync.on_scroll(SyncView::Structured, 150.0, 0.0);
    let cmd = sync.poll(120.0).unwrap();
    assert_eq!(cmd.target, SyncView::Raw);

    // The raw view reports the programmatic scroll back within the
    // cool-down: swallowed, no counter-command
    assert!(!sync.on_scroll(SyncView::Raw, cmd.scroll_top, 170.0));
    assert_eq!(sync.poll(500.0), None);
}

#[test]
fn test_user_scroll_after_cooldown_syncs_again() {
    let mut sync = make_sync();

    sync.on_scroll(SyncView::Structured, 150.0, 0.0);
    let first = sync.poll(120.0).unwrap();
    assert_eq!(first.target, SyncView::Raw);

    // Well past the cool-down, a genuine raw-view scroll mirrors back
    assert!(sync.on_scroll(SyncView::Raw, 198.0, 1000.0));
    let second = sync.poll(1200.0).unwrap();
    assert_eq!(second.target, SyncView::Structured);
    assert_eq!(second.line, 12);
    assert_eq!(second.scroll_top, 610.0);
}
