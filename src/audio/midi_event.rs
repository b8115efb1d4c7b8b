const NOTE_OFF_STATUS: u8 = 0x80;
const NOTE_ON_STATUS: u8 = 0x90;

#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum MidiStatus {
    NoteOn,
    NoteOff,
}

/// Single channel voice message, sent right after construction.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct MidiMessage {
    pub status: MidiStatus,
    /// 0-based channel
    pub channel: u8,
    pub note_number: u8,
    pub velocity: u8,
}

impl MidiMessage {
    pub const fn note_on(channel: u8, note_number: u8, velocity: u8) -> Self {
        Self {
            status: MidiStatus::NoteOn,
            channel,
            note_number,
            velocity,
        }
    }

    pub const fn note_off(channel: u8, note_number: u8, velocity: u8) -> Self {
        Self {
            status: MidiStatus::NoteOff,
            channel,
            note_number,
            velocity,
        }
    }

    pub const fn is_note_on(&self) -> bool {
        matches!(self.status, MidiStatus::NoteOn)
    }

    /// Raw wire bytes, data bytes are masked to 7 bits.
    pub const fn to_bytes(&self) -> [u8; 3] {
        let status = match self.status {
            MidiStatus::NoteOn => NOTE_ON_STATUS,
            MidiStatus::NoteOff => NOTE_OFF_STATUS,
        };
        [
            status | (self.channel & 0x0F),
            self.note_number & 0x7F,
            self.velocity & 0x7F,
        ]
    }
}
