//! Integration tests for tunebox library usage.
//!
//! These tests verify that the library can be used as a dependency
//! from external projects.

use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};
use tunebox::{
    parse_tune, CancellationToken, MidiMessage, MidiStatus, ParseError, PlaybackError,
    RecordingPort, RecordingScheduler, SequencerEngine, SequencerState, Token, TuneError,
    DEFAULT_VELOCITY, REST_MARKER,
};

fn play_text(text: &str, octave: i32) -> Result<Vec<MidiMessage>, TuneError> {
    let engine = SequencerEngine::with_scheduler(RecordingPort::new(), RecordingScheduler::new());
    let state = SequencerState::from_config_values(2, octave, 120.0)?;
    let outcome = parse_tune(text)
        .map_err(TuneError::from)
        .and_then(|tune| Ok(engine.play(&tune, &state, &CancellationToken::new())?));
    let messages = engine.shutdown().into_messages();
    outcome.map(|_report| messages)
}

/// Test that all major types are accessible from the library.
#[test]
fn test_types_accessible() {
    // If any re-export is missing, this test will fail to compile.
    fn _assert_types() {
        let _: fn(&str) -> Result<tunebox::Tune, ParseError> = parse_tune;
        let _: char = REST_MARKER;
        let _: u8 = DEFAULT_VELOCITY;
    }
}

/// Rests parse the same whatever the playback settings.
#[test]
fn test_rest_marker() {
    let tune = parse_tune("_ _").unwrap();
    assert!(tune.tokens().iter().all(|t| *t == Token::Rest));
    for octave in [-1, 4, 9] {
        let messages = play_text("_ _", octave).unwrap();
        assert!(messages.is_empty());
    }
}

/// A malformed token sends nothing at all.
#[test]
fn test_parse_error_sends_nothing() {
    let err = play_text("H 4", 3).unwrap_err();
    assert!(matches!(
        err,
        TuneError::ParseError(ParseError { position: 0, .. })
    ));
}

#[test]
fn test_range_error() {
    let err = play_text("C D G#", 9).unwrap_err();
    assert!(matches!(
        err,
        TuneError::PlaybackError(PlaybackError::Range { position: 2, .. })
    ));
}

#[test]
fn test_every_valid_note_in_range() {
    for octave in -1..=8 {
        let messages = play_text("C C# D D# E F F# G G# A A# B", octave).unwrap();
        assert_eq!(messages.len(), 24);
        for message in messages {
            assert!(message.note_number <= 127);
        }
    }
}

#[test]
fn test_emission_order() {
    let messages = play_text("C D _ E", 3).unwrap();
    let statuses: Vec<(MidiStatus, u8)> = messages
        .iter()
        .map(|m| (m.status, m.note_number))
        .collect();
    assert_eq!(
        statuses,
        vec![
            (MidiStatus::NoteOn, 48),
            (MidiStatus::NoteOff, 48),
            (MidiStatus::NoteOn, 50),
            (MidiStatus::NoteOff, 50),
            (MidiStatus::NoteOff, 50),
            (MidiStatus::NoteOn, 52),
            (MidiStatus::NoteOff, 52),
        ]
    );
    assert!(messages.iter().all(|m| m.channel == 1));
}

/// Real sleeping at 20ms per token.
#[test]
fn test_wall_clock_duration() {
    let engine = SequencerEngine::new(RecordingPort::new());
    let state = SequencerState::from_config_values(1, 4, 3000.0).unwrap();
    let tune = parse_tune("C D _ E").unwrap();
    let start = Instant::now();
    let report = engine
        .play(&tune, &state, &CancellationToken::new())
        .unwrap();
    assert!(start.elapsed() >= Duration::from_millis(80));
    assert!(report.elapsed >= Duration::from_millis(80));
}

/// Two tunes played from different threads never interleave on the port.
#[test]
fn test_concurrent_playbacks_are_serialized() {
    let engine = Arc::new(SequencerEngine::new(RecordingPort::new()));
    let state = SequencerState::from_config_values(1, 4, 6000.0).unwrap();

    let handles: Vec<_> = ["C D E F", "G A B _"]
        .into_iter()
        .map(|text| {
            let engine = engine.clone();
            let state = state.clone();
            thread::spawn(move || {
                let tune = parse_tune(text).unwrap();
                engine
                    .play(&tune, &state, &CancellationToken::new())
                    .unwrap()
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    let engine = Arc::try_unwrap(engine).ok().unwrap();
    let messages = engine.shutdown().into_messages();
    // 8 for the first tune, 7 for the second one
    assert_eq!(messages.len(), 15);
    let first_tune: Vec<u8> = vec![60, 62, 64, 65];
    let (head, tail) = if first_tune.contains(&messages[0].note_number) {
        messages.split_at(8)
    } else {
        messages.split_at(7)
    };
    let head_first = first_tune.contains(&head[0].note_number);
    assert!(head
        .iter()
        .all(|m| first_tune.contains(&m.note_number) == head_first));
    assert!(tail
        .iter()
        .all(|m| first_tune.contains(&m.note_number) != head_first));
}

#[test]
fn test_cancel_from_another_thread() {
    let engine = SequencerEngine::new(RecordingPort::new());
    let state = SequencerState::from_config_values(1, 4, 60.0).unwrap();
    let tune = parse_tune("C D E F G").unwrap();
    let cancel = CancellationToken::new();
    let canceller = cancel.clone();
    let handle = thread::spawn(move || {
        thread::sleep(Duration::from_millis(50));
        canceller.cancel();
    });
    let start = Instant::now();
    let err = engine.play(&tune, &state, &cancel).unwrap_err();
    handle.join().unwrap();
    assert_eq!(err, PlaybackError::Cancelled { position: 0 });
    assert!(start.elapsed() < Duration::from_secs(5));
    assert_eq!(
        engine.shutdown().into_messages(),
        vec![
            MidiMessage::note_on(0, 60, DEFAULT_VELOCITY),
            MidiMessage::note_off(0, 60, DEFAULT_VELOCITY),
        ]
    );
}
