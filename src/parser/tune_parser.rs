use crate::error::ParseError;
use crate::parser::note_table::{pitch_class, spelling, Accidental};
use nom::branch::alt;
use nom::character::complete::{char, one_of, satisfy};
use nom::combinator::{all_consuming, map_opt, opt, value};
use nom::{IResult, Parser};
use std::fmt;

/// Token skipping a beat
pub const REST_MARKER: char = '_';

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Token {
    Rest,
    NoteEvent {
        pitch_class: u8,
        octave_override: Option<i32>,
    },
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Rest => write!(f, "{REST_MARKER}"),
            Self::NoteEvent {
                pitch_class,
                octave_override,
            } => {
                write!(f, "{}", spelling(*pitch_class))?;
                if let Some(octave) = octave_override {
                    write!(f, "{octave}")?;
                }
                Ok(())
            }
        }
    }
}

/// Ordered tokens of a single playback request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Tune {
    tokens: Vec<Token>,
}

impl Tune {
    pub const fn new(tokens: Vec<Token>) -> Self {
        Self { tokens }
    }

    #[allow(clippy::missing_const_for_fn)]
    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }
}

impl fmt::Display for Tune {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (index, token) in self.tokens.iter().enumerate() {
            if index > 0 {
                write!(f, " ")?;
            }
            write!(f, "{token}")?;
        }
        Ok(())
    }
}

/// Parse a whole tune, failing on the first unrecognized token.
///
/// No partial tune is returned on failure.
pub fn parse_tune(text: &str) -> Result<Tune, ParseError> {
    let tokens = text
        .split_whitespace()
        .enumerate()
        .map(|(position, word)| {
            parse_token(word)
                .map(|(_rest, token)| token)
                .map_err(|err| {
                    log::debug!("Rejecting token {word:?} at {position}: {err}");
                    ParseError {
                        token: word.to_string(),
                        position,
                    }
                })
        })
        .collect::<Result<Vec<_>, _>>()?;
    log::debug!("Parsed tune with {} tokens", tokens.len());
    Ok(Tune::new(tokens))
}

/// Parse one whitespace-free token, it must be consumed entirely.
pub fn parse_token(i: &str) -> IResult<&str, Token> {
    all_consuming(alt((parse_rest, parse_note))).parse(i)
}

fn parse_rest(i: &str) -> IResult<&str, Token> {
    value(Token::Rest, char(REST_MARKER)).parse(i)
}

/// `[A-G][#|b]?[0-9]?`, letters in either case
fn parse_note(i: &str) -> IResult<&str, Token> {
    map_opt(
        (
            one_of("ABCDEFGabcdefg"),
            opt(map_opt(one_of("#b"), Accidental::from_marker)),
            opt(parse_octave),
        ),
        |(letter, accidental, octave_override): (char, Option<Accidental>, Option<i32>)| {
            pitch_class(letter, accidental).map(|pitch_class| Token::NoteEvent {
                pitch_class,
                octave_override,
            })
        },
    )
    .parse(i)
}

fn parse_octave(i: &str) -> IResult<&str, i32> {
    map_opt(satisfy(|c: char| c.is_ascii_digit()), |c: char| {
        c.to_digit(10).and_then(|d| i32::try_from(d).ok())
    })
    .parse(i)
}
