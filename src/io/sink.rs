use crate::events::MidiEvent;
use crossbeam::channel::Sender;
use midir::{MidiOutput, MidiOutputConnection};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SinkError {
    #[error("midi output unavailable: {0}")]
    Connect(String),
    #[error("midi send failed: {0}")]
    Send(String),
    #[error("sink receiver disconnected")]
    Disconnected,
}

/// Where due events go. Send is fire-and-forget; a failure is fatal for the
/// event (the dispatcher does not retry).
pub trait EventSink {
    fn send(&mut self, event: &MidiEvent) -> Result<(), SinkError>;
}

/// Real MIDI output through midir.
pub struct MidirSink {
    conn: MidiOutputConnection,
}

impl MidirSink {
    /// Names of the MIDI output ports currently available, for picking a
    /// `connect` target.
    pub fn port_names() -> Result<Vec<String>, SinkError> {
        let output = MidiOutput::new("roll2midi").map_err(|e| SinkError::Connect(e.to_string()))?;
        Ok(output
            .ports()
            .iter()
            .filter_map(|p| output.port_name(p).ok())
            .collect())
    }

    /// Connect to the named output port, or the first available one when no
    /// name is given.
    pub fn connect(port_name: Option<&str>) -> Result<Self, SinkError> {
        let output = MidiOutput::new("roll2midi").map_err(|e| SinkError::Connect(e.to_string()))?;
        let ports = output.ports();
        let port = match port_name {
            Some(name) => ports
                .iter()
                .find(|p| {
                    output
                        .port_name(p)
                        .map(|n| n.contains(name))
                        .unwrap_or(false)
                })
                .ok_or_else(|| SinkError::Connect(format!("no output port matching {name:?}")))?,
            None => ports
                .first()
                .ok_or_else(|| SinkError::Connect("no midi output ports".into()))?,
        };
        let conn = output
            .connect(port, "roll2midi-out")
            .map_err(|e| SinkError::Connect(e.to_string()))?;
        Ok(Self { conn })
    }
}

impl EventSink for MidirSink {
    fn send(&mut self, event: &MidiEvent) -> Result<(), SinkError> {
        self.conn
            .send(&event.to_raw())
            .map_err(|e| SinkError::Send(e.to_string()))
    }
}

/// Hands events to an in-process consumer; the integration tests collect
/// dispatched events through one of these.
pub struct ChannelSink {
    tx: Sender<MidiEvent>,
}

impl ChannelSink {
    pub fn new(tx: Sender<MidiEvent>) -> Self {
        Self { tx }
    }
}

impl EventSink for ChannelSink {
    fn send(&mut self, event: &MidiEvent) -> Result<(), SinkError> {
        self.tx
            .send(event.clone())
            .map_err(|_| SinkError::Disconnected)
    }
}
