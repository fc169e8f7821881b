use parking_lot::Mutex;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::thread::JoinHandle;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ClockError {
    #[error("clock is already running")]
    AlreadyRunning,
}

/// The session's notion of "now": a counter advanced by `resolution` every
/// `resolution` seconds on its own thread, independent of frame arrival.
///
/// The count is an f64 stored as bits in an AtomicU64 so the scheduler and
/// dispatcher threads never observe a torn value. Only the advancing thread
/// writes once started. Drift against wall-clock sleep precision is
/// accepted jitter, not a fault.
pub struct Clock {
    bits: AtomicU64,
    running: AtomicBool,
    resolution: f64,
    advancer: Mutex<Option<JoinHandle<()>>>,
}

impl Clock {
    pub fn new(resolution: f64) -> Self {
        Self {
            bits: AtomicU64::new(0f64.to_bits()),
            running: AtomicBool::new(false),
            resolution,
            advancer: Mutex::new(None),
        }
    }

    pub fn resolution(&self) -> f64 {
        self.resolution
    }

    pub fn current(&self) -> f64 {
        f64::from_bits(self.bits.load(Ordering::Acquire))
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }

    /// Set the starting count. The session does not have to begin at zero;
    /// the scheduler seeds with the first frame's timestamp. Seeding a
    /// running clock is a programming error.
    pub fn seed(&self, count: f64) -> Result<(), ClockError> {
        if self.is_running() {
            return Err(ClockError::AlreadyRunning);
        }
        self.bits.store(count.to_bits(), Ordering::Release);
        Ok(())
    }

    /// Spawn the advancing thread. Fails if already running.
    pub fn start(self: &Arc<Self>) -> Result<(), ClockError> {
        if self
            .running
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return Err(ClockError::AlreadyRunning);
        }

        let clock = Arc::clone(self);
        let handle = std::thread::spawn(move || {
            while clock.running.load(Ordering::Acquire) {
                std::thread::sleep(Duration::from_secs_f64(clock.resolution));
                let next = clock.current() + clock.resolution;
                clock.bits.store(next.to_bits(), Ordering::Release);
            }
        });
        *self.advancer.lock() = Some(handle);
        Ok(())
    }

    /// Halt advancement. `current()` keeps returning the last value.
    pub fn stop(&self) {
        self.running.store(false, Ordering::Release);
        if let Some(handle) = self.advancer.lock().take() {
            let _ = handle.join();
        }
    }
}
