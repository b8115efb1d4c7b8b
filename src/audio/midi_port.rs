use crate::audio::midi_event::{MidiMessage, MidiStatus};
use crate::error::{DeviceError, StartupError};
use midir::{MidiOutput, MidiOutputConnection};

const CLIENT_NAME: &str = "tunebox";
const CONNECTION_NAME: &str = "tunebox-out";

/// Note-on/note-off sink for one opened device.
pub trait MidiOutputPort: Send {
    fn send_note_on(
        &mut self,
        channel: u8,
        note_number: u8,
        velocity: u8,
    ) -> Result<(), DeviceError>;

    fn send_note_off(
        &mut self,
        channel: u8,
        note_number: u8,
        velocity: u8,
    ) -> Result<(), DeviceError>;

    fn send_message(&mut self, message: &MidiMessage) -> Result<(), DeviceError> {
        log::debug!(
            "{:?}: channel={}, note={}, velocity={}",
            message.status,
            message.channel,
            message.note_number,
            message.velocity
        );
        match message.status {
            MidiStatus::NoteOn => {
                self.send_note_on(message.channel, message.note_number, message.velocity)
            }
            MidiStatus::NoteOff => {
                self.send_note_off(message.channel, message.note_number, message.velocity)
            }
        }
    }
}

/// Port writing raw messages to a device through `midir`.
pub struct MidirPort {
    name: String,
    connection: MidiOutputConnection,
}

impl MidirPort {
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Close the device connection.
    pub fn close(self) {
        log::info!("Closing MIDI device {}", self.name);
        let _output = self.connection.close();
    }

    fn write(&mut self, message: &MidiMessage) -> Result<(), DeviceError> {
        self.connection
            .send(&message.to_bytes())
            .map_err(|err| DeviceError(format!("{} on {}", err, self.name)))
    }
}

impl MidiOutputPort for MidirPort {
    fn send_note_on(
        &mut self,
        channel: u8,
        note_number: u8,
        velocity: u8,
    ) -> Result<(), DeviceError> {
        self.write(&MidiMessage::note_on(channel, note_number, velocity))
    }

    fn send_note_off(
        &mut self,
        channel: u8,
        note_number: u8,
        velocity: u8,
    ) -> Result<(), DeviceError> {
        self.write(&MidiMessage::note_off(channel, note_number, velocity))
    }
}

/// Port keeping every message in memory instead of reaching a device.
#[derive(Debug, Default, Clone)]
pub struct RecordingPort {
    messages: Vec<MidiMessage>,
}

impl RecordingPort {
    pub const fn new() -> Self {
        Self {
            messages: Vec::new(),
        }
    }

    #[allow(clippy::missing_const_for_fn)]
    pub fn messages(&self) -> &[MidiMessage] {
        &self.messages
    }

    #[allow(clippy::missing_const_for_fn)]
    pub fn into_messages(self) -> Vec<MidiMessage> {
        self.messages
    }
}

impl MidiOutputPort for RecordingPort {
    fn send_note_on(
        &mut self,
        channel: u8,
        note_number: u8,
        velocity: u8,
    ) -> Result<(), DeviceError> {
        self.messages
            .push(MidiMessage::note_on(channel, note_number, velocity));
        Ok(())
    }

    fn send_note_off(
        &mut self,
        channel: u8,
        note_number: u8,
        velocity: u8,
    ) -> Result<(), DeviceError> {
        self.messages
            .push(MidiMessage::note_off(channel, note_number, velocity));
        Ok(())
    }
}

fn port_name(midi_out: &MidiOutput, port: &midir::MidiOutputPort) -> String {
    midi_out.port_name(port).unwrap_or_else(|err| {
        log::warn!("Could not read MIDI device name: {err}");
        String::new()
    })
}

fn new_midi_output() -> Result<MidiOutput, StartupError> {
    MidiOutput::new(CLIENT_NAME)
        .map_err(|err| StartupError(format!("Could not initialise MIDI output: {err}")))
}

/// Names of the available output devices, in device index order.
pub fn list_output_ports() -> Result<Vec<String>, StartupError> {
    let midi_out = new_midi_output()?;
    let names = midi_out
        .ports()
        .iter()
        .map(|port| port_name(&midi_out, port))
        .collect();
    Ok(names)
}

/// Open the output device at the 1-based `device` index.
pub fn open_output_port(device: usize) -> Result<MidirPort, StartupError> {
    if device == 0 {
        return Err(StartupError(
            "MIDI device index is 1-based, got 0".to_string(),
        ));
    }
    let midi_out = new_midi_output()?;
    let ports = midi_out.ports();
    let port = ports.get(device - 1).ok_or_else(|| {
        StartupError(format!(
            "Couldn't find MIDI device {device} ({} available)",
            ports.len()
        ))
    })?;
    let name = port_name(&midi_out, port);
    let connection = midi_out
        .connect(port, CONNECTION_NAME)
        .map_err(|err| StartupError(format!("Could not connect to MIDI device {name}: {err}")))?;
    log::info!("Opened MIDI device {device}: {name}");
    Ok(MidirPort { name, connection })
}
