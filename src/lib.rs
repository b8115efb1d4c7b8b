//! Tunebox - plays short text tunes on a MIDI output device
//!
//! This library provides:
//! - Parsing of tunes such as `"C D _ E5"` into note and rest tokens
//! - A sequencer emitting one note-on/note-off pair per token at a fixed tempo
//! - A `midir` backed output port and an in-memory port for dry runs
//!
//! # Example
//!
//! ```no_run
//! use tunebox::{open_output_port, parse_tune, CancellationToken, SequencerEngine, SequencerState};
//!
//! let port = open_output_port(1).unwrap();
//! let engine = SequencerEngine::new(port);
//! let state = SequencerState::from_config_values(2, 3, 120.0).unwrap();
//! let tune = parse_tune("C D _ E").unwrap();
//! engine.play(&tune, &state, &CancellationToken::new()).unwrap();
//! ```

pub mod audio;
pub mod error;
pub mod parser;

// Re-export main types for convenience
pub use audio::{
    midi_event::{MidiMessage, MidiStatus},
    midi_port::{list_output_ports, open_output_port, MidiOutputPort, MidirPort, RecordingPort},
    scheduler::{CancellationToken, Hold, RecordingScheduler, Scheduler, SleepScheduler},
    sequencer_engine::{EngineStatus, PlaybackReport, SequencerEngine},
    sequencer_state::SequencerState,
    DEFAULT_VELOCITY,
};
pub use error::{DeviceError, ParseError, PlaybackError, StartupError, TuneError};
pub use parser::tune_parser::{parse_tune, Token, Tune, REST_MARKER};
