//! Integration tests for lifecycle sequencing and per-device routing.

use std::sync::Arc;
use std::thread;

use izconnect::app::events::AppEvent;
use izconnect::{Command, DeviceType, Error};

use super::mock_bus::{Call, CallLog, Harness, MockBus, RecordingSink};

// ── Lifecycle ─────────────────────────────────────────────────

#[test]
fn session_start_and_shutdown_reach_transport_in_order() {
    let h = Harness::new();
    h.handle.start_session().unwrap();
    h.handle.shutdown().unwrap();
    let Harness {
        dispatcher,
        handle,
        log,
        sink,
        ..
    } = h;
    drop(handle);
    dispatcher.join().unwrap();

    assert_eq!(
        log.lifecycle(),
        vec![
            Call::Connect,
            Call::RegisterInterface,
            Call::Announce,
            Call::RegisterListeners,
            Call::UnregisterListeners,
            Call::UnregisterInterface,
            Call::Disconnect,
        ]
    );
    assert_eq!(sink.events().last(), Some(&AppEvent::Stopped));
}

#[test]
fn enqueue_after_disconnect_is_rejected() {
    let h = Harness::new();
    let late = h.handle.clone();
    h.finish();
    assert!(matches!(late.enqueue(Command::Connect), Err(Error::QueueClosed)));
    assert!(matches!(late.barrier(), Err(Error::QueueClosed)));
}

#[test]
fn commands_queued_behind_disconnect_never_run() {
    let h = Harness::new();
    h.handle.enqueue(Command::Disconnect).unwrap();
    // May land before or after the worker closes the queue; either way it
    // must not reach the transport.
    let _ = h.handle.enqueue(Command::Connect);
    let Harness {
        dispatcher,
        handle,
        log,
        ..
    } = h;
    drop(handle);
    dispatcher.join().unwrap();
    assert_eq!(log.lifecycle(), vec![Call::Disconnect]);
}

#[test]
fn lifecycle_failure_does_not_stop_the_queue() {
    let h = Harness::new();
    h.bus.fail_on("Connect");
    h.handle.start_session().unwrap();
    h.sync();
    let (log, _) = h.finish();
    assert_eq!(
        log.lifecycle(),
        vec![
            Call::Connect,
            Call::RegisterInterface,
            Call::Announce,
            Call::RegisterListeners,
            Call::Disconnect,
        ]
    );
}

#[test]
fn register_interface_exposes_local_service() {
    let h = Harness::new();
    h.handle.enqueue(Command::Connect).unwrap();
    h.handle.enqueue(Command::RegisterInterface).unwrap();
    h.sync();
    let local = h.bus.local().expect("interface registered");
    assert_eq!(local.device_name(), "Controller");

    h.handle.enqueue(Command::UnregisterInterface).unwrap();
    h.sync();
    assert!(h.bus.local().is_none());
    h.finish();
}

#[test]
fn worker_exits_when_every_handle_is_dropped() {
    let log = Arc::new(CallLog::default());
    let bus = MockBus::new(":1.0", Arc::clone(&log));
    let sink = Arc::new(RecordingSink::default());
    let dispatcher =
        izconnect::Dispatcher::spawn(Default::default(), bus, sink.clone()).unwrap();
    dispatcher.join().unwrap();
    assert_eq!(sink.events(), vec![AppEvent::Stopped]);
    assert!(log.all().is_empty());
}

// ── Routing ───────────────────────────────────────────────────

#[test]
fn device_command_without_selection_is_dropped() {
    let h = Harness::new();
    let peer = h.peer(":1.5");
    h.discover(DeviceType::Pc, &peer);
    h.handle.enqueue(Command::SetVolume(30)).unwrap();
    h.handle.enqueue(Command::ScriptRun("a.py".into())).unwrap();
    let (log, _) = h.finish();
    assert!(log.remote_calls(":1.5").is_empty());
}

#[test]
fn pc_commands_reach_selected_pc_in_order() {
    let h = Harness::new();
    h.select_new(DeviceType::Pc, ":1.5");
    for cmd in [
        Command::SetVolume(40),
        Command::MediaPlayPause,
        Command::MediaStop,
        Command::MediaNext,
        Command::MediaPrevious,
        Command::MouseMove { dx: 5, dy: -3 },
        Command::MouseLeftClick,
        Command::MouseRightClick,
        Command::KeyPressed(13),
        Command::SlideshowStart,
        Command::NextSlide,
        Command::PreviousSlide,
        Command::SlideshowStop,
        Command::ScriptRun("/scripts/a.py".into()),
    ] {
        h.handle.enqueue(cmd).unwrap();
    }
    let (log, _) = h.finish();
    assert_eq!(
        log.remote_calls(":1.5"),
        vec![
            "setVolume(40)",
            "mediaPlayPause",
            "mediaStop",
            "mediaNext",
            "mediaPrevious",
            "mouseMove(5, -3)",
            "mouseLeftClick",
            "mouseRightClick",
            "keyPressed(13)",
            "slideshowStart",
            "nextSlide",
            "previousSlide",
            "slideshowStop",
            "runScript(/scripts/a.py)",
        ]
    );
}

#[test]
fn board_handles_only_board_commands() {
    let h = Harness::new();
    h.select_new(DeviceType::Board, ":1.8");
    h.handle.enqueue(Command::SetVolume(10)).unwrap();
    h.handle.enqueue(Command::SetLight(true)).unwrap();
    h.handle.enqueue(Command::MouseLeftClick).unwrap();
    h.handle.enqueue(Command::SetAutoMode(false)).unwrap();
    h.handle.enqueue(Command::ScriptRun("blink".into())).unwrap();
    let (log, sink) = h.finish();
    assert_eq!(
        log.remote_calls(":1.8"),
        vec!["setLight(true)", "setAutoMode(false)", "runScript(blink)"]
    );
    assert!(sink.transfers_finished().is_empty());
}

#[test]
fn mobile_ignores_pc_and_board_commands() {
    let h = Harness::new();
    h.select_new(DeviceType::Mobile, ":1.6");
    h.handle.enqueue(Command::MediaNext).unwrap();
    h.handle.enqueue(Command::SetLight(true)).unwrap();
    h.handle.enqueue(Command::ScriptRun("tasker".into())).unwrap();
    let (log, _) = h.finish();
    assert_eq!(log.remote_calls(":1.6"), vec!["runScript(tasker)"]);
}

#[test]
fn remote_failure_does_not_stop_the_queue() {
    let h = Harness::new();
    let peer = h.select_new(DeviceType::Pc, ":1.5");
    peer.fail_on("setVolume");
    h.handle.enqueue(Command::SetVolume(99)).unwrap();
    h.handle.enqueue(Command::MediaStop).unwrap();
    let (log, _) = h.finish();
    assert_eq!(log.remote_calls(":1.5"), vec!["setVolume(99)", "mediaStop"]);
}

#[test]
fn reselecting_redirects_later_commands() {
    let h = Harness::new();
    h.select_new(DeviceType::Pc, ":1.5");
    h.handle.enqueue(Command::KeyPressed(1)).unwrap();
    h.sync();
    h.select_new(DeviceType::Pc, ":1.7");
    h.handle.enqueue(Command::KeyPressed(2)).unwrap();
    let (log, _) = h.finish();
    assert_eq!(log.remote_calls(":1.5"), vec!["keyPressed(1)"]);
    assert_eq!(log.remote_calls(":1.7"), vec!["keyPressed(2)"]);
}

#[test]
fn per_producer_order_is_preserved_across_threads() {
    let h = Harness::new();
    h.select_new(DeviceType::Pc, ":1.5");

    let producers: Vec<_> = (0..4)
        .map(|t| {
            let handle = h.handle.clone();
            thread::spawn(move || {
                for i in 0..50 {
                    handle.enqueue(Command::KeyPressed(t * 1000 + i)).unwrap();
                }
            })
        })
        .collect();
    for p in producers {
        p.join().unwrap();
    }

    let (log, _) = h.finish();
    let calls = log.remote_calls(":1.5");
    assert_eq!(calls.len(), 200);
    for t in 0..4 {
        let seen: Vec<_> = calls
            .iter()
            .filter_map(|c| {
                c.strip_prefix("keyPressed(")
                    .and_then(|s| s.strip_suffix(')'))
                    .and_then(|s| s.parse::<i32>().ok())
            })
            .filter(|code| code / 1000 == t)
            .collect();
        let expected: Vec<_> = (0..50).map(|i| t * 1000 + i).collect();
        assert_eq!(seen, expected, "producer {t} reordered");
    }
}
