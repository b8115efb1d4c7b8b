//! Error types for the tunebox library

use std::io;

/// A tune token that is neither the rest marker nor a note spelling.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unrecognized token {token:?} at position {position}")]
pub struct ParseError {
    /// The offending token as written.
    pub token: String,
    /// 0-based index of the token in the tune.
    pub position: usize,
}

/// Transport failure while writing to the MIDI device.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("MIDI device error: {0}")]
pub struct DeviceError(pub String);

/// The MIDI output device could not be found or opened.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("startup error: {0}")]
pub struct StartupError(pub String);

/// Failure of a single playback pass.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PlaybackError {
    /// Computed note number falls outside of the MIDI range [0, 127]
    #[error(
        "note out of range at position {position}: pitch class {pitch_class} in octave {octave} gives {note_number}"
    )]
    Range {
        position: usize,
        pitch_class: u8,
        octave: i32,
        note_number: i32,
    },

    /// The port failed mid-sequence, remaining tokens were dropped
    #[error("playback aborted at position {position}: {source}")]
    Device {
        position: usize,
        #[source]
        source: DeviceError,
    },

    /// Cancelled through its token before the tune completed
    #[error("playback cancelled at position {position}")]
    Cancelled { position: usize },

    /// Another playback holds the port
    #[error("another tune is already playing")]
    Busy,
}

/// Library error type for tunebox operations
#[derive(Debug, thiserror::Error)]
pub enum TuneError {
    #[error("parsing error: {0}")]
    ParseError(#[from] ParseError),

    #[error("playback error: {0}")]
    PlaybackError(#[from] PlaybackError),

    #[error(transparent)]
    StartupError(#[from] StartupError),

    /// Configuration error
    #[error("configuration error: {0}")]
    ConfigError(String),

    /// I/O error
    #[error("I/O error: {0}")]
    IoError(String),
}

impl From<io::Error> for TuneError {
    fn from(error: io::Error) -> Self {
        Self::IoError(error.to_string())
    }
}
