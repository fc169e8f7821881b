//! Whole-session tests: frames in over a channel, events out over a
//! channel, real threads and a real advancing clock in between.

use roll2midi::io::{ChannelFrameSource, ChannelSink};
use roll2midi::{EventKind, FrameCodec, Session, SessionConfig, ShutdownToken};
use std::time::{Duration, Instant};

fn test_config() -> SessionConfig {
    SessionConfig {
        n_notes: 4,
        transposition: 21,
        channel: 0,
        velocity: 100,
        discard_late: false,
        clock_resolution: 0.02,
    }
}

fn frame(codec: &FrameCodec, timestamp: f64, on: &[usize]) -> Vec<u8> {
    let mut act = vec![0.0f32; codec.n_notes()];
    for &i in on {
        act[i] = 1.0;
    }
    codec.encode(timestamp, &act)
}

#[test]
fn events_flow_end_to_end_and_never_arrive_early() {
    let config = test_config();
    let codec = FrameCodec::new(config.n_notes);
    let token = ShutdownToken::new();

    let (frame_tx, frame_rx) = crossbeam::channel::unbounded();
    let (event_tx, event_rx) = crossbeam::channel::unbounded();
    let session = Session::spawn(
        &config,
        ChannelFrameSource::new(frame_rx, token.clone()),
        ChannelSink::new(event_tx),
        token,
    )
    .unwrap();
    let clock = session.clock();

    // First frame seeds the clock at 10.0, so its NoteOn is due at once.
    frame_tx.send(frame(&codec, 10.0, &[1])).unwrap();
    // The NoteOff at 10.1 becomes due only after five clock ticks.
    frame_tx.send(frame(&codec, 10.1, &[])).unwrap();
    drop(frame_tx);

    // Stamp each delivery with the clock value observed at receipt.
    let mut received = Vec::new();
    while let Ok(event) = event_rx.recv_timeout(Duration::from_secs(5)) {
        received.push((event, clock.current()));
        if received.len() == 2 {
            break;
        }
    }
    session.join().unwrap();

    assert_eq!(received.len(), 2);
    let (on, seen_at) = &received[0];
    assert_eq!(on.kind, EventKind::NoteOn);
    assert_eq!(on.pitch, 22);
    assert_eq!(on.velocity, 100);
    assert_eq!(on.timestamp, 10.0);
    assert!(*seen_at >= on.timestamp);

    let (off, seen_at) = &received[1];
    assert_eq!(off.kind, EventKind::NoteOff);
    assert_eq!(off.pitch, 22);
    assert_eq!(off.timestamp, 10.1);
    assert!(*seen_at >= off.timestamp, "delivered early at {seen_at}");
}

#[test]
fn late_frames_are_discarded_silently() {
    let mut config = test_config();
    config.discard_late = true;
    config.clock_resolution = 0.01;
    let codec = FrameCodec::new(config.n_notes);
    let token = ShutdownToken::new();

    let (frame_tx, frame_rx) = crossbeam::channel::unbounded();
    let (event_tx, event_rx) = crossbeam::channel::unbounded();
    let session = Session::spawn(
        &config,
        ChannelFrameSource::new(frame_rx, token.clone()),
        ChannelSink::new(event_tx),
        token,
    )
    .unwrap();

    // Seed the clock at 5.0 with a silent frame, then let it run well past
    // the next frame's timestamp before that frame arrives.
    frame_tx.send(frame(&codec, 5.0, &[])).unwrap();
    std::thread::sleep(Duration::from_millis(200));
    frame_tx.send(frame(&codec, 5.05, &[2])).unwrap();
    drop(frame_tx);

    session.join().unwrap();
    assert!(event_rx.try_recv().is_err(), "late frame produced events");
}

#[test]
fn stop_request_ends_an_idle_session_promptly() {
    let config = test_config();
    let token = ShutdownToken::new();

    let (_frame_tx, frame_rx) = crossbeam::channel::unbounded();
    let (event_tx, _event_rx) = crossbeam::channel::unbounded();
    let session = Session::spawn(
        &config,
        ChannelFrameSource::new(frame_rx, token.clone()),
        ChannelSink::new(event_tx),
        token.clone(),
    )
    .unwrap();

    // No frames ever arrive; the sender stays alive so only the stop
    // request can end the scheduler.
    std::thread::sleep(Duration::from_millis(50));
    let asked = Instant::now();
    token.request_stop();
    session.join().unwrap();
    assert!(
        asked.elapsed() < Duration::from_secs(1),
        "shutdown took {:?}",
        asked.elapsed()
    );
}

#[test]
fn truncated_stream_fails_the_session() {
    use roll2midi::io::ReadFrameSource;

    let config = test_config();
    let codec = FrameCodec::new(config.n_notes);
    let mut bytes = frame(&codec, 1.0, &[0]);
    bytes.truncate(bytes.len() - 3);

    let (event_tx, _event_rx) = crossbeam::channel::unbounded();
    let session = Session::spawn(
        &config,
        ReadFrameSource::new(std::io::Cursor::new(bytes), codec.frame_size()),
        ChannelSink::new(event_tx),
        ShutdownToken::new(),
    )
    .unwrap();

    assert!(session.join().is_err());
}

#[test]
fn join_waits_out_a_trailing_note_off() {
    let config = test_config();
    let codec = FrameCodec::new(config.n_notes);
    let token = ShutdownToken::new();

    let (frame_tx, frame_rx) = crossbeam::channel::unbounded();
    let (event_tx, event_rx) = crossbeam::channel::unbounded();
    let session = Session::spawn(
        &config,
        ChannelFrameSource::new(frame_rx, token.clone()),
        ChannelSink::new(event_tx),
        token,
    )
    .unwrap();
    let clock = session.clock();

    // The stream ends while the NoteOff at 20.3 is still many clock ticks
    // from due; join must hold the session open until it has been sent,
    // not conclude the queue drained while the dispatcher waits it out.
    frame_tx.send(frame(&codec, 20.0, &[1])).unwrap();
    frame_tx.send(frame(&codec, 20.3, &[])).unwrap();
    drop(frame_tx);

    session.join().unwrap();
    assert!(clock.current() >= 20.3);

    let mut received = Vec::new();
    while let Ok(event) = event_rx.try_recv() {
        received.push(event);
    }
    assert_eq!(received.len(), 2);
    assert_eq!(received[0].kind, EventKind::NoteOn);
    assert_eq!(received[1].kind, EventKind::NoteOff);
    assert_eq!(received[1].timestamp, 20.3);
}
