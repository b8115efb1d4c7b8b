/// Canonical spelling of each pitch class, C = 0.
pub const SHARP_NOTES: [&str; 12] = [
    "C", "C#", "D", "D#", "E", "F", "F#", "G", "G#", "A", "A#", "B",
];

pub const SEMITONES_PER_OCTAVE: i32 = 12;

/// Sharp or flat marker following a note letter.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Accidental {
    Sharp,
    Flat,
}

impl Accidental {
    pub const fn from_marker(marker: char) -> Option<Self> {
        match marker {
            '#' => Some(Self::Sharp),
            'b' => Some(Self::Flat),
            _ => None,
        }
    }
}

const fn natural_pitch_class(letter: char) -> Option<u8> {
    match letter.to_ascii_uppercase() {
        'C' => Some(0),
        'D' => Some(2),
        'E' => Some(4),
        'F' => Some(5),
        'G' => Some(7),
        'A' => Some(9),
        'B' => Some(11),
        _ => None,
    }
}

/// Pitch class (0-11) of a note letter with an optional accidental.
///
/// Accidentals wrap inside the octave: `Cb` is 11 and `B#` is 0.
pub fn pitch_class(letter: char, accidental: Option<Accidental>) -> Option<u8> {
    let natural = natural_pitch_class(letter)?;
    let shifted = match accidental {
        None => natural,
        Some(Accidental::Sharp) => (natural + 1) % 12,
        Some(Accidental::Flat) => (natural + 11) % 12,
    };
    Some(shifted)
}

/// Canonical sharp spelling of a pitch class.
pub fn spelling(pitch_class: u8) -> &'static str {
    SHARP_NOTES[usize::from(pitch_class % 12)]
}

/// MIDI note number for a pitch class in an octave, C4 = 60.
///
/// The result is unchecked and may fall outside of [0, 127].
pub const fn note_number(pitch_class: u8, octave: i32) -> i32 {
    pitch_class as i32 + (octave + 1) * SEMITONES_PER_OCTAVE
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_natural_notes() {
        let expected = [('C', 0), ('D', 2), ('E', 4), ('F', 5), ('G', 7), ('A', 9), ('B', 11)];
        for (letter, class) in expected {
            assert_eq!(pitch_class(letter, None), Some(class), "letter {letter}");
            let lower = letter.to_ascii_lowercase();
            assert_eq!(pitch_class(lower, None), Some(class), "letter {lower}");
        }
        assert_eq!(pitch_class('H', None), None);
    }

    #[test]
    fn test_accidentals_wrap() {
        assert_eq!(pitch_class('C', Some(Accidental::Sharp)), Some(1));
        assert_eq!(pitch_class('E', Some(Accidental::Flat)), Some(3));
        assert_eq!(pitch_class('C', Some(Accidental::Flat)), Some(11));
        assert_eq!(pitch_class('B', Some(Accidental::Sharp)), Some(0));
    }

    #[test]
    fn test_spelling() {
        assert_eq!(spelling(0), "C");
        assert_eq!(spelling(10), "A#");
        let flat = pitch_class('B', Some(Accidental::Flat)).unwrap();
        assert_eq!(spelling(flat), "A#");
    }

    #[test]
    fn test_note_number() {
        assert_eq!(note_number(0, 4), 60);
        assert_eq!(note_number(9, 4), 69);
        assert_eq!(note_number(0, -1), 0);
        assert_eq!(note_number(7, 9), 127);
        assert_eq!(note_number(8, 9), 128);
    }
}
