#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    NoteOn,
    NoteOff,
}

/// A timestamped MIDI note event, immutable once created. Delivery order
/// is by timestamp, but that ordering lives in the event queue; equality
/// here compares whole events.
#[derive(Debug, Clone, PartialEq)]
pub struct MidiEvent {
    pub timestamp: f64,
    pub kind: EventKind,
    pub pitch: u8,
    pub velocity: u8,
    pub channel: u8,
}

impl MidiEvent {
    pub fn note_on(timestamp: f64, pitch: u8, velocity: u8, channel: u8) -> Self {
        Self {
            timestamp,
            kind: EventKind::NoteOn,
            pitch,
            velocity,
            channel,
        }
    }

    pub fn note_off(timestamp: f64, pitch: u8, channel: u8) -> Self {
        Self {
            timestamp,
            kind: EventKind::NoteOff,
            pitch,
            velocity: 0,
            channel,
        }
    }

    /// Status + data bytes on the wire.
    pub fn to_raw(&self) -> [u8; 3] {
        let status = match self.kind {
            EventKind::NoteOn => 0x90 | (self.channel & 0x0f),
            EventKind::NoteOff => 0x80 | (self.channel & 0x0f),
        };
        [status, self.pitch & 0x7f, self.velocity & 0x7f]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn equality_covers_every_field() {
        let a = MidiEvent::note_on(1.0, 60, 100, 0);
        let mut b = a.clone();
        assert_eq!(a, b);
        b.pitch = 61;
        assert_ne!(a, b);
    }

    #[test]
    fn raw_bytes_encode_kind_and_channel() {
        let on = MidiEvent::note_on(0.0, 61, 100, 3);
        assert_eq!(on.to_raw(), [0x93, 61, 100]);
        let off = MidiEvent::note_off(0.0, 61, 0);
        assert_eq!(off.to_raw(), [0x80, 61, 0]);
    }
}
