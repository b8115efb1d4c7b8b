use crate::audio::midi_event::MidiMessage;
use crate::audio::midi_port::MidiOutputPort;
use crate::audio::scheduler::{CancellationToken, Hold, Scheduler, SleepScheduler};
use crate::audio::sequencer_state::SequencerState;
use crate::audio::{DEFAULT_VELOCITY, MAX_NOTE_NUMBER};
use crate::error::{DeviceError, PlaybackError};
use crate::parser::note_table::note_number;
use crate::parser::tune_parser::{Token, Tune};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError, TryLockError};
use std::time::{Duration, Instant};

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum EngineStatus {
    Idle,
    Playing,
}

/// Summary of a completed playback.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlaybackReport {
    pub tokens: usize,
    pub notes_played: usize,
    pub messages_sent: usize,
    pub elapsed: Duration,
}

/// Plays tunes one at a time on an owned output port.
///
/// The port lock is held for a whole `play` call so that two tunes never
/// interleave on the device.
pub struct SequencerEngine<P, S = SleepScheduler> {
    port: Mutex<P>,
    scheduler: S,
    playing: AtomicBool,
}

impl<P: MidiOutputPort> SequencerEngine<P, SleepScheduler> {
    pub fn new(port: P) -> Self {
        Self::with_scheduler(port, SleepScheduler)
    }
}

impl<P: MidiOutputPort, S: Scheduler> SequencerEngine<P, S> {
    pub const fn with_scheduler(port: P, scheduler: S) -> Self {
        Self {
            port: Mutex::new(port),
            scheduler,
            playing: AtomicBool::new(false),
        }
    }

    pub fn status(&self) -> EngineStatus {
        if self.playing.load(Ordering::SeqCst) {
            EngineStatus::Playing
        } else {
            EngineStatus::Idle
        }
    }

    pub const fn scheduler(&self) -> &S {
        &self.scheduler
    }

    /// Play `tune`, waiting for any playback in flight to finish first.
    pub fn play(
        &self,
        tune: &Tune,
        state: &SequencerState,
        cancel: &CancellationToken,
    ) -> Result<PlaybackReport, PlaybackError> {
        let notes = resolve_notes(tune, state)?;
        let port = self.port.lock().unwrap_or_else(PoisonError::into_inner);
        self.run(port, &notes, state, cancel)
    }

    /// Play `tune`, rejecting with `Busy` if another playback is in flight.
    pub fn try_play(
        &self,
        tune: &Tune,
        state: &SequencerState,
        cancel: &CancellationToken,
    ) -> Result<PlaybackReport, PlaybackError> {
        let notes = resolve_notes(tune, state)?;
        let port = match self.port.try_lock() {
            Ok(port) => port,
            Err(TryLockError::Poisoned(poisoned)) => poisoned.into_inner(),
            Err(TryLockError::WouldBlock) => return Err(PlaybackError::Busy),
        };
        self.run(port, &notes, state, cancel)
    }

    /// Tear the engine down and hand the port back.
    pub fn shutdown(self) -> P {
        self.port
            .into_inner()
            .unwrap_or_else(PoisonError::into_inner)
    }

    fn run(
        &self,
        mut port: MutexGuard<'_, P>,
        notes: &[Option<u8>],
        state: &SequencerState,
        cancel: &CancellationToken,
    ) -> Result<PlaybackReport, PlaybackError> {
        let beat = state.beat_duration();
        log::info!(
            "Playing {} tokens on channel {} ({:?} per beat)",
            notes.len(),
            state.channel(),
            beat
        );
        let playing = PlayingGuard::enter(&self.playing);
        let start = Instant::now();
        let mut playback = Playback::new(&mut *port, state.channel());
        let result = playback.perform(&self.scheduler, notes, beat, cancel);
        drop(playing);
        drop(port);

        let (notes_played, messages_sent) = result?;
        let report = PlaybackReport {
            tokens: notes.len(),
            notes_played,
            messages_sent,
            elapsed: start.elapsed(),
        };
        log::info!("Playback done in {:?}", report.elapsed);
        Ok(report)
    }
}

/// Marks the engine as playing until dropped, unwinding included.
struct PlayingGuard<'a>(&'a AtomicBool);

impl<'a> PlayingGuard<'a> {
    fn enter(flag: &'a AtomicBool) -> Self {
        flag.store(true, Ordering::SeqCst);
        Self(flag)
    }
}

impl Drop for PlayingGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

/// Note number of every token, `None` for rests.
///
/// The whole tune is rejected on the first note outside of [0, 127].
fn resolve_notes(tune: &Tune, state: &SequencerState) -> Result<Vec<Option<u8>>, PlaybackError> {
    tune.tokens()
        .iter()
        .enumerate()
        .map(|(position, token)| match *token {
            Token::Rest => Ok(None),
            Token::NoteEvent {
                pitch_class,
                octave_override,
            } => {
                let octave = octave_override.unwrap_or_else(|| state.octave());
                let number = note_number(pitch_class, octave);
                u8::try_from(number)
                    .ok()
                    .filter(|n| i32::from(*n) <= MAX_NOTE_NUMBER)
                    .map(Some)
                    .ok_or(PlaybackError::Range {
                        position,
                        pitch_class,
                        octave,
                        note_number: number,
                    })
            }
        })
        .collect()
}

/// Single pass over a resolved tune.
struct Playback<'a, P: ?Sized> {
    port: &'a mut P,
    channel: u8,
    last_note: Option<u8>,
    sounding: bool,
    notes_played: usize,
    messages_sent: usize,
}

impl<'a, P: MidiOutputPort + ?Sized> Playback<'a, P> {
    fn new(port: &'a mut P, channel: u8) -> Self {
        Self {
            port,
            channel,
            last_note: None,
            sounding: false,
            notes_played: 0,
            messages_sent: 0,
        }
    }

    fn perform<S: Scheduler>(
        &mut self,
        scheduler: &S,
        notes: &[Option<u8>],
        beat: Duration,
        cancel: &CancellationToken,
    ) -> Result<(usize, usize), PlaybackError> {
        for (position, note) in notes.iter().enumerate() {
            if cancel.is_cancelled() {
                self.release();
                return Err(PlaybackError::Cancelled { position });
            }
            if let Some(note) = note {
                if let Err(source) = self.note_on(*note) {
                    self.release();
                    return Err(PlaybackError::Device { position, source });
                }
            }
            if scheduler.hold(beat, cancel) == Hold::Cancelled {
                self.release();
                return Err(PlaybackError::Cancelled { position });
            }
            // sent on rests as well, repeating the last note-off
            if let Err(source) = self.note_off() {
                self.release();
                return Err(PlaybackError::Device { position, source });
            }
        }
        Ok((self.notes_played, self.messages_sent))
    }

    fn note_on(&mut self, note: u8) -> Result<(), DeviceError> {
        // a failed write may have reached the device, the note counts as sounding
        self.last_note = Some(note);
        self.sounding = true;
        let message = MidiMessage::note_on(self.channel, note, DEFAULT_VELOCITY);
        self.port.send_message(&message)?;
        self.messages_sent += 1;
        self.notes_played += 1;
        Ok(())
    }

    fn note_off(&mut self) -> Result<(), DeviceError> {
        let Some(note) = self.last_note else {
            return Ok(());
        };
        let message = MidiMessage::note_off(self.channel, note, DEFAULT_VELOCITY);
        self.port.send_message(&message)?;
        self.messages_sent += 1;
        self.sounding = false;
        Ok(())
    }

    /// Best-effort note-off for a note left sounding.
    fn release(&mut self) {
        if !self.sounding {
            return;
        }
        if let Err(err) = self.note_off() {
            log::warn!("Could not release note {:?}: {err}", self.last_note);
        }
    }
}
