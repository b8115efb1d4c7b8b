pub mod midi_event;
pub mod midi_port;
pub mod scheduler;
pub mod sequencer_engine;
pub mod sequencer_state;

/// Velocity used for every note-on and note-off
pub const DEFAULT_VELOCITY: u8 = 100;

/// Highest valid MIDI note number
pub const MAX_NOTE_NUMBER: i32 = 127;
