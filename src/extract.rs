use crate::events::MidiEvent;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
#[error("pitch range {transposition}+{n_notes} exceeds the MIDI limit of 128")]
pub struct PitchRangeError {
    pub transposition: u8,
    pub n_notes: usize,
}

/// Per-pitch note bookkeeping. `pitch` stays equal to the slot index for
/// the lifetime of the extractor; `velocity` holds the raw activation
/// magnitude observed when the note last turned on.
#[derive(Debug, Clone)]
pub struct NoteSlot {
    pub start_time: f64,
    pub end_time: f64,
    pub velocity: f32,
    pub pitch: u8,
}

/// Stateful activation diff: emits NoteOn when a pitch goes inactive to
/// active and NoteOff on the reverse transition. Callers must feed frames
/// in non-decreasing timestamp order; ordering is the scheduler's job.
#[derive(Debug)]
pub struct EventExtractor {
    notes: Vec<NoteSlot>,
    active: Vec<bool>,
    transposition: u8,
    channel: u8,
    velocity: u8,
}

impl EventExtractor {
    /// Fails when the highest reachable pitch, `transposition + n_notes -
    /// 1`, would fall outside the MIDI range; with that checked, the u8
    /// pitch arithmetic in `process` cannot overflow.
    pub fn new(
        n_notes: usize,
        transposition: u8,
        channel: u8,
        velocity: u8,
    ) -> Result<Self, PitchRangeError> {
        if transposition as usize + n_notes > 128 {
            return Err(PitchRangeError {
                transposition,
                n_notes,
            });
        }
        let notes = (0..n_notes)
            .map(|i| NoteSlot {
                start_time: 0.0,
                end_time: 0.0,
                velocity: 0.0,
                pitch: i as u8,
            })
            .collect();
        Ok(Self {
            notes,
            active: vec![false; n_notes],
            transposition,
            channel,
            velocity,
        })
    }

    /// Diff one frame against the previous one. Offs for this frame are
    /// emitted before ons; a pitch cannot do both in a single frame since
    /// the transition is a single boolean comparison.
    ///
    /// The emitted NoteOn carries the configured fixed velocity, not the
    /// activation magnitude. The magnitude is still recorded in the slot.
    pub fn process(&mut self, timestamp: f64, activations: &[f32]) -> Vec<MidiEvent> {
        debug_assert_eq!(activations.len(), self.notes.len());
        let mut events = Vec::new();

        for i in 0..self.notes.len() {
            let now_active = activations[i] > 0.0;
            if self.active[i] && !now_active {
                self.notes[i].end_time = timestamp;
                events.push(MidiEvent::note_off(
                    timestamp,
                    self.transposition + self.notes[i].pitch,
                    self.channel,
                ));
                self.active[i] = false;
            }
        }

        for i in 0..self.notes.len() {
            let now_active = activations[i] > 0.0;
            if !self.active[i] && now_active {
                self.notes[i].start_time = timestamp;
                self.notes[i].velocity = activations[i];
                events.push(MidiEvent::note_on(
                    timestamp,
                    self.transposition + self.notes[i].pitch,
                    self.velocity,
                    self.channel,
                ));
                self.active[i] = true;
            }
        }

        events
    }
}
