use clap::Parser;
use config::Config;
use std::io::{self, BufRead};
use tunebox::{
    list_output_ports, open_output_port, parse_tune, CancellationToken, MidiOutputPort,
    PlaybackReport, RecordingPort, RecordingScheduler, Scheduler, SequencerEngine,
    SequencerState, StartupError, TuneError,
};

mod config;

fn main() {
    let result = main_result();
    std::process::exit(match result {
        Ok(()) => 0,
        Err(err) => {
            // use Display instead of Debug for user friendly error messages
            log::error!("{err}");
            1
        }
    });
}

pub fn main_result() -> Result<(), AppError> {
    // setup logging
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("tunebox=info"))
        .init();

    // args
    let args = CliArgs::parse();

    if args.list_devices {
        for (index, name) in list_output_ports()?.iter().enumerate() {
            println!("{}: {name}", index + 1);
        }
        return Ok(());
    }

    // read local config and apply overrides
    let mut config = Config::read_config()?;
    config.override_with(
        args.device,
        args.channel,
        args.octave,
        args.notes_per_min,
    );
    let state = config.sequencer_state()?;
    log::info!(
        "Starting with device {} channel {} octave {} at {} notes per minute",
        config.device,
        config.channel,
        config.octave,
        config.notes_per_min
    );

    if args.dry_run {
        let engine = SequencerEngine::with_scheduler(RecordingPort::new(), RecordingScheduler::new());
        serve(&engine, &state, &args.tune)?;
        for message in engine.shutdown().messages() {
            println!("{message:?}");
        }
        return Ok(());
    }

    let port = open_output_port(config.device)?;
    let engine = SequencerEngine::new(port);
    let result = serve(&engine, &state, &args.tune);
    // explicit teardown of the device, even after a failed request
    engine.shutdown().close();
    result
}

/// Play the tune given as arguments, or one tune per stdin line.
fn serve<P: MidiOutputPort, S: Scheduler>(
    engine: &SequencerEngine<P, S>,
    state: &SequencerState,
    words: &[String],
) -> Result<(), AppError> {
    if !words.is_empty() {
        let text = words.join(" ");
        play_request(engine, state, &text)?;
        return Ok(());
    }
    for line in io::stdin().lock().lines() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        // a failed request does not stop the next ones
        if let Err(err) = play_request(engine, state, &line) {
            log::error!("Tune {line:?} failed: {err}");
        }
    }
    Ok(())
}

fn play_request<P: MidiOutputPort, S: Scheduler>(
    engine: &SequencerEngine<P, S>,
    state: &SequencerState,
    text: &str,
) -> Result<PlaybackReport, TuneError> {
    let tune = parse_tune(text)?;
    log::info!("Received tune \"{tune}\"");
    let report = engine.play(&tune, state, &CancellationToken::new())?;
    log::info!(
        "Played {} notes over {} tokens ({} MIDI messages)",
        report.notes_played,
        report.tokens,
        report.messages_sent
    );
    Ok(report)
}

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
pub struct CliArgs {
    /// 1-based index of the MIDI output device, see `--list-devices`.
    #[arg(long)]
    device: Option<usize>,
    /// 1-based MIDI channel.
    #[arg(long)]
    channel: Option<u8>,
    /// Octave of notes written without one.
    #[arg(long, allow_negative_numbers = true)]
    octave: Option<i32>,
    /// Tempo, every token lasts 60 / notes-per-min seconds.
    #[arg(long)]
    notes_per_min: Option<f64>,
    /// List the MIDI output devices and exit.
    #[arg(long, default_value_t = false)]
    list_devices: bool,
    /// Print the MIDI messages instead of sending them.
    #[arg(long, default_value_t = false)]
    dry_run: bool,
    /// Tune to play, e.g. `C D _ E`. One tune per stdin line when absent.
    tune: Vec<String>,
}

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("startup error: {0}")]
    StartupError(String),
    #[error("configuration error: {0}")]
    ConfigError(String),
    #[error("parsing error: {0}")]
    ParsingError(String),
    #[error("playback error: {0}")]
    PlaybackError(String),
    #[error("other error: {0}")]
    OtherError(String),
}

impl From<TuneError> for AppError {
    fn from(error: TuneError) -> Self {
        match error {
            TuneError::ParseError(e) => Self::ParsingError(e.to_string()),
            TuneError::PlaybackError(e) => Self::PlaybackError(e.to_string()),
            TuneError::StartupError(e) => Self::StartupError(e.0),
            TuneError::ConfigError(s) => Self::ConfigError(s),
            TuneError::IoError(s) => Self::OtherError(s),
        }
    }
}

impl From<StartupError> for AppError {
    fn from(error: StartupError) -> Self {
        Self::StartupError(error.0)
    }
}

impl From<io::Error> for AppError {
    fn from(error: io::Error) -> Self {
        Self::OtherError(error.to_string())
    }
}
