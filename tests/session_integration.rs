//! Integration tests for the session loop
//!
//! These tests validate the polling workflow against a scripted transport:
//! - One line per poll step
//! - Reconnect ordering and history retention
//! - Recovery from read errors
//! - Device reset
//! - Overlong line recovery

mod common;

use common::builders::StreamBuilder;
use common::mock_helpers::{drain, scripted_session};
use serialplot_rs::backend::MAX_LINE_BYTES;
use serialplot_rs::session::SessionEvent;
use serialplot_rs::types::ConnectionStatus;

#[test]
fn test_connect_configured_port() {
    let (mut session, source) = scripted_session(Some("/dev/ttyUSB0"));
    session.connect_configured();

    assert_eq!(session.status(), ConnectionStatus::Connected);
    assert_eq!(source.opens(), vec![("/dev/ttyUSB0".to_string(), 115_200)]);
}

#[test]
fn test_no_port_means_no_connection() {
    let (mut session, source) = scripted_session(None);
    session.connect_configured();
    session.handle_event(SessionEvent::Tick);

    assert_eq!(session.status(), ConnectionStatus::Disconnected);
    assert!(source.opens().is_empty());
    assert_eq!(session.stats().lines_received, 0);
}

#[test]
fn test_tick_takes_one_line() {
    let (mut session, source) = scripted_session(Some("COM3"));
    session.connect_configured();
    source.feed(
        StreamBuilder::new()
            .header(&["t", "a", "b", "c", "d"])
            .ramp(4, 5)
            .build(),
    );

    session.handle_event(SessionEvent::Tick);
    assert_eq!(session.stats().lines_received, 1);
    assert!(session.buffer().get_series("a").unwrap().is_empty());

    session.handle_event(SessionEvent::Tick);
    assert_eq!(session.buffer().get_series("a").unwrap().len(), 1);

    assert_eq!(drain(&mut session), 3);
    assert_eq!(session.buffer().get_series("d").unwrap().len(), 4);
}

#[test]
fn test_port_change_keeps_history() {
    let (mut session, source) = scripted_session(Some("COM3"));
    session.connect_configured();
    source.feed(
        StreamBuilder::new()
            .header(&["t", "a", "b", "c", "d"])
            .row(&[0.0, 1.0, 2.0, 3.0, 4.0])
            .raw(b"1,2,")
            .build(),
    );
    drain(&mut session);

    session.handle_event(SessionEvent::PortChanged("COM4".to_string()));
    assert_eq!(source.closes(), 1);
    assert_eq!(source.opens().last().unwrap().0, "COM4");

    // The partial line from the old port is discarded
    source.feed(StreamBuilder::new().row(&[1.0, 5.0, 6.0, 7.0, 8.0]).build());
    drain(&mut session);

    assert_eq!(session.buffer().get_series("a").unwrap(), vec![[0.0, 1.0], [1.0, 5.0]]);
    assert_eq!(session.stats().unusable_lines, 0);
}

#[test]
fn test_baud_change_reopens_at_new_rate() {
    let (mut session, source) = scripted_session(Some("COM3"));
    session.connect_configured();

    session.handle_event(SessionEvent::BaudRateChanged(9_600));

    assert_eq!(
        source.opens(),
        vec![("COM3".to_string(), 115_200), ("COM3".to_string(), 9_600)]
    );
    assert_eq!(source.closes(), 1);
}

#[test]
fn test_read_error_is_no_data() {
    let (mut session, source) = scripted_session(Some("COM3"));
    session.connect_configured();
    source.feed(StreamBuilder::new().header(&["t", "a", "b", "c", "d"]).build());
    drain(&mut session);

    source.fail_next_read("device unplugged");
    assert_eq!(session.poll_step(), None);
    assert_eq!(session.status(), ConnectionStatus::Error);
    assert!(session.last_error().unwrap().contains("device unplugged"));

    // Further ticks are harmless while closed
    for _ in 0..3 {
        session.handle_event(SessionEvent::Tick);
    }
    assert_eq!(session.stats().read_errors, 1);

    // Reconnecting resumes the same traces
    session.handle_event(SessionEvent::PortChanged("COM3".to_string()));
    source.feed(StreamBuilder::new().row(&[0.0, 1.0, 2.0, 3.0, 4.0]).build());
    drain(&mut session);
    assert_eq!(session.status(), ConnectionStatus::Connected);
    assert_eq!(session.buffer().get_series("b").unwrap(), vec![[0.0, 2.0]]);
}

#[test]
fn test_transient_read_error_keeps_streaming() {
    let (mut session, source) = scripted_session(Some("COM3"));
    session.connect_configured();

    source.fail_next_read_with(std::io::ErrorKind::Interrupted, "signal");
    source.feed(StreamBuilder::new().row(&[0.0, 1.0, 2.0, 3.0, 4.0]).build());

    for _ in 0..10 {
        session.handle_event(SessionEvent::Tick);
    }

    assert_eq!(session.status(), ConnectionStatus::Connected);
    assert!(session.is_connected());
    assert!(session.last_error().is_none());
    assert_eq!(source.closes(), 0);
    assert_eq!(session.stats().read_errors, 1);
    assert_eq!(session.stats().data_rows, 1);
}

#[test]
fn test_overlong_line_split_across_reads_is_dropped_whole() {
    let (mut session, source) = scripted_session(Some("COM3"));
    session.connect_configured();

    // A runaway dump arriving in 1 KiB reads, then normal traffic
    let dump = vec![b'D'; MAX_LINE_BYTES + 904];
    for chunk in dump.chunks(1024) {
        source.feed(chunk.to_vec());
    }
    source.feed(b"\n".to_vec());
    source.feed(
        StreamBuilder::new()
            .header(&["Time", "A", "B", "C", "D"])
            .row(&[0.0, 1.0, 2.0, 3.0, 4.0])
            .build(),
    );

    for _ in 0..20 {
        session.handle_event(SessionEvent::Tick);
    }

    let stats = session.stats();
    assert_eq!(stats.overlong_lines, 1);
    assert_eq!(stats.lines_received, 2);
    assert_eq!(stats.unusable_lines, 0);
    assert_eq!(session.buffer().get_series("D").unwrap(), vec![[0.0, 4.0]]);
}

#[test]
fn test_refused_open_reports_error() {
    let (mut session, source) = scripted_session(Some("COM9"));
    source.refuse_open(true);

    session.connect_configured();

    assert_eq!(session.status(), ConnectionStatus::Error);
    assert!(session.last_error().unwrap().contains("COM9"));
}

#[test]
fn test_reset_device() {
    let (mut session, source) = scripted_session(Some("COM3"));
    session.connect_configured();

    session.handle_event(SessionEvent::ResetDevice);
    assert_eq!(session.status(), ConnectionStatus::Connecting);
    assert_eq!(source.resets(), 0);

    session.handle_event(SessionEvent::Tick);
    assert_eq!(source.resets(), 1);
    assert_eq!(session.status(), ConnectionStatus::Connected);

    // Data after the reset flows on the following ticks
    source.feed(StreamBuilder::new().row(&[0.0, 1.0, 2.0, 3.0, 4.0]).build());
    session.handle_event(SessionEvent::Tick);
    assert_eq!(session.stats().data_rows, 1);
}

#[test]
fn test_disconnect_then_tick() {
    let (mut session, source) = scripted_session(Some("COM3"));
    session.connect_configured();
    source.feed(StreamBuilder::new().ramp(2, 5).build());

    session.handle_event(SessionEvent::Disconnect);
    session.handle_event(SessionEvent::Tick);

    assert_eq!(session.status(), ConnectionStatus::Disconnected);
    assert!(!session.is_connected());
    assert_eq!(session.stats().lines_received, 0);
}

#[test]
fn test_raw_log_keeps_escapes() {
    let (mut session, source) = scripted_session(Some("COM3"));
    session.connect_configured();
    source.feed(
        StreamBuilder::new()
            .line("\x1b[1;33mhello\x1b[0m")
            .row(&[0.0, 1.0, 2.0, 3.0, 4.0])
            .build(),
    );
    drain(&mut session);

    let texts: Vec<&str> = session.log().iter().map(|e| e.text.as_str()).collect();
    assert_eq!(texts, vec!["\x1b[1;33mhello\x1b[0m", "0,1,2,3,4"]);
    let plain: Vec<String> = session.log().iter().map(|e| e.plain().into_owned()).collect();
    assert_eq!(plain, vec!["hello", "0,1,2,3,4"]);
    assert_eq!(session.stats().unusable_lines, 1);
    assert_eq!(session.stats().data_rows, 1);
}
