use crate::error::TuneError;
use std::time::Duration;

pub const MIN_OCTAVE: i32 = -1;
pub const MAX_OCTAVE: i32 = 9;
pub const MIDI_CHANNELS: u8 = 16;

/// Hold the values a playback pass reads: default octave, channel and tempo.
#[derive(Debug, Clone, PartialEq)]
pub struct SequencerState {
    octave: i32,
    channel: u8,
    tempo_notes_per_minute: f64,
    beat_duration: Duration,
}

impl SequencerState {
    /// Build a state from externally configured values.
    ///
    /// `channel` is 1-based (1-16) and stored 0-based.
    pub fn from_config_values(
        channel: u8,
        octave: i32,
        tempo_notes_per_minute: f64,
    ) -> Result<Self, TuneError> {
        if channel == 0 || channel > MIDI_CHANNELS {
            return Err(TuneError::ConfigError(format!(
                "MIDI channel must be within 1-{MIDI_CHANNELS}, got {channel}"
            )));
        }
        if !(MIN_OCTAVE..=MAX_OCTAVE).contains(&octave) {
            return Err(TuneError::ConfigError(format!(
                "octave must be within {MIN_OCTAVE}-{MAX_OCTAVE}, got {octave}"
            )));
        }
        if !tempo_notes_per_minute.is_finite() || tempo_notes_per_minute <= 0.0 {
            return Err(TuneError::ConfigError(format!(
                "notes per minute must be a positive number, got {tempo_notes_per_minute}"
            )));
        }
        let beat_duration = Duration::try_from_secs_f64(60.0 / tempo_notes_per_minute)
            .map_err(|err| {
                TuneError::ConfigError(format!(
                    "notes per minute {tempo_notes_per_minute} gives no usable beat: {err}"
                ))
            })?;
        Ok(Self {
            octave,
            channel: channel - 1,
            tempo_notes_per_minute,
            beat_duration,
        })
    }

    pub const fn octave(&self) -> i32 {
        self.octave
    }

    /// 0-based channel
    pub const fn channel(&self) -> u8 {
        self.channel
    }

    pub const fn tempo_notes_per_minute(&self) -> f64 {
        self.tempo_notes_per_minute
    }

    /// Time every token holds, `60 / notes_per_minute` seconds.
    pub const fn beat_duration(&self) -> Duration {
        self.beat_duration
    }
}
