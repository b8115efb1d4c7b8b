use std::{
    fs::{create_dir_all, File},
    io::{BufReader, Read, Write},
    path::PathBuf,
};

use home::home_dir;
use serde::{Deserialize, Serialize};
use tunebox::{SequencerState, TuneError};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// 1-based index into the MIDI output devices
    pub device: usize,
    /// 1-based MIDI channel
    pub channel: u8,
    /// octave of notes without an explicit one
    pub octave: i32,
    pub notes_per_min: f64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            device: 1,
            channel: 2,
            octave: 3,
            notes_per_min: 120.0,
        }
    }
}

impl Config {
    // folder placed in $HOME directory
    const FOLDER: &'static str = ".tunebox";

    fn get_base_path() -> Result<PathBuf, TuneError> {
        let home = home_dir()
            .ok_or_else(|| TuneError::ConfigError("Could not find home directory".to_string()))?;
        let path = home.join(Self::FOLDER);
        Ok(path)
    }

    fn get_path() -> Result<PathBuf, TuneError> {
        let base = Self::get_base_path()?;
        Ok(base.join("config.json"))
    }

    /// Creates config if it does not exist
    pub fn read_config() -> Result<Self, TuneError> {
        let base_path = Self::get_base_path()?;
        if !base_path.exists() {
            create_dir_all(base_path)?;
        }
        let config_path = Self::get_path()?;
        if !config_path.exists() {
            // create default config
            Config::default().save_config()?;
        }
        let file = File::open(config_path)?;
        Self::from_reader(BufReader::new(file))
    }

    fn from_reader<R: Read>(reader: R) -> Result<Self, TuneError> {
        serde_json::from_reader(reader).map_err(|err| {
            TuneError::ConfigError(format!("Could not read local configuration {err:}"))
        })
    }

    /// Assumes the config folder exists
    pub fn save_config(&self) -> Result<(), TuneError> {
        let config_path = Self::get_path()?;
        let json = serde_json::to_string_pretty(self).map_err(|err| {
            TuneError::ConfigError(format!("Could not save local configuration {err:}"))
        })?;
        let mut file = File::create(config_path)?;
        file.write_all(json.as_bytes())?;
        Ok(())
    }

    /// Replace the fields given on the command line, for this run only
    pub fn override_with(
        &mut self,
        device: Option<usize>,
        channel: Option<u8>,
        octave: Option<i32>,
        notes_per_min: Option<f64>,
    ) {
        if let Some(device) = device {
            self.device = device;
        }
        if let Some(channel) = channel {
            self.channel = channel;
        }
        if let Some(octave) = octave {
            self.octave = octave;
        }
        if let Some(notes_per_min) = notes_per_min {
            self.notes_per_min = notes_per_min;
        }
    }

    pub fn sequencer_state(&self) -> Result<SequencerState, TuneError> {
        SequencerState::from_config_values(self.channel, self.octave, self.notes_per_min)
    }
}
