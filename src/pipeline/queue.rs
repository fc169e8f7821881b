use crate::events::MidiEvent;
use parking_lot::{Condvar, Mutex};
use std::cmp::Ordering;
use std::collections::BinaryHeap;
use std::time::{Duration, Instant};

/// Min-heap entry: reversed comparison so the lowest timestamp surfaces
/// first. Total order via f64::total_cmp; NaN timestamps never occur in
/// practice but must not poison the heap.
struct Queued(MidiEvent);

impl PartialEq for Queued {
    fn eq(&self, other: &Self) -> bool {
        self.0.timestamp == other.0.timestamp
    }
}

impl Eq for Queued {}

impl PartialOrd for Queued {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Queued {
    fn cmp(&self, other: &Self) -> Ordering {
        other.0.timestamp.total_cmp(&self.0.timestamp)
    }
}

/// Hand-off between scheduler and dispatcher, in timestamp-priority order
/// (lowest first). With a FIFO here, one early-arriving but far-future
/// event would starve later-but-due events behind it; with the priority
/// discipline the head is always the next-due candidate.
///
/// `push` never blocks; `pop_due` bounds its wait so a stopping task gets
/// its stop flag checked instead of parking forever, and it removes an
/// event only once that event is due — an undue head stays in the queue,
/// so "empty" always means "nothing left to deliver".
pub struct EventQueue {
    heap: Mutex<BinaryHeap<Queued>>,
    available: Condvar,
}

impl EventQueue {
    pub fn new() -> Self {
        Self {
            heap: Mutex::new(BinaryHeap::new()),
            available: Condvar::new(),
        }
    }

    pub fn push(&self, event: MidiEvent) {
        self.heap.lock().push(Queued(event));
        self.available.notify_one();
    }

    /// Pop the lowest-timestamp event if its timestamp is at or before
    /// `now`, waiting at most `timeout` for such an event to appear. An
    /// event that is not yet due is never removed; callers retry with a
    /// fresher `now` once the clock has advanced.
    pub fn pop_due(&self, now: f64, timeout: Duration) -> Option<MidiEvent> {
        let deadline = Instant::now() + timeout;
        let mut heap = self.heap.lock();
        loop {
            match heap.peek() {
                Some(q) if q.0.timestamp <= now => return heap.pop().map(|q| q.0),
                _ => {}
            }
            if self.available.wait_until(&mut heap, deadline).timed_out() {
                match heap.peek() {
                    Some(q) if q.0.timestamp <= now => return heap.pop().map(|q| q.0),
                    _ => return None,
                }
            }
        }
    }

    pub fn len(&self) -> usize {
        self.heap.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.heap.lock().is_empty()
    }
}

impl Default for EventQueue {
    fn default() -> Self {
        Self::new()
    }
}
