use crate::config::SessionConfig;
use crate::extract::{EventExtractor, PitchRangeError};
use crate::frame::FrameCodec;
use crate::io::{EventSink, FrameSource};
use crate::pipeline::{DispatchError, EventQueue, SchedulerError, run_dispatcher, run_scheduler};
use crate::timing::Clock;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::JoinHandle;
use std::time::Duration;
use thiserror::Error;
use tracing::info;

/// Cooperative shutdown flag shared by every task in a session. Passed in
/// at construction instead of living in ambient global state.
#[derive(Debug, Clone, Default)]
pub struct ShutdownToken {
    stopping: Arc<AtomicBool>,
}

impl ShutdownToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn request_stop(&self) {
        self.stopping.store(true, Ordering::Release);
    }

    pub fn is_stopping(&self) -> bool {
        self.stopping.load(Ordering::Acquire)
    }
}

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("invalid configuration: {0}")]
    Config(#[from] PitchRangeError),
    #[error("scheduler failed: {0}")]
    Scheduler(#[from] SchedulerError),
    #[error("dispatcher failed: {0}")]
    Dispatch(#[from] DispatchError),
    #[error("{task} task panicked")]
    Panicked { task: &'static str },
}

/// One running transcription session: a scheduler thread feeding the event
/// queue and a dispatcher thread draining it, synchronized only through the
/// queue and the logical clock. The clock's advancing thread is started by
/// the scheduler when the first frame arrives.
pub struct Session {
    token: ShutdownToken,
    clock: Arc<Clock>,
    queue: Arc<EventQueue>,
    retry: Duration,
    scheduler: JoinHandle<Result<(), SchedulerError>>,
    dispatcher: JoinHandle<Result<(), DispatchError>>,
}

impl Session {
    /// The token is passed in rather than created here so callers can hand
    /// the same token to a cancellable frame source.
    pub fn spawn<S, K>(
        config: &SessionConfig,
        source: S,
        sink: K,
        token: ShutdownToken,
    ) -> Result<Self, SessionError>
    where
        S: FrameSource + Send + 'static,
        K: EventSink + Send + 'static,
    {
        let clock = Arc::new(Clock::new(config.clock_resolution));
        let queue = Arc::new(EventQueue::new());
        let retry = config.retry_interval();
        let mut extractor = EventExtractor::new(
            config.n_notes,
            config.transposition,
            config.channel,
            config.velocity,
        )?;

        let scheduler = {
            let codec = FrameCodec::new(config.n_notes);
            let clock = Arc::clone(&clock);
            let queue = Arc::clone(&queue);
            let token = token.clone();
            let discard_late = config.discard_late;
            let mut source = source;
            std::thread::spawn(move || {
                run_scheduler(
                    &mut source,
                    &codec,
                    &clock,
                    &mut extractor,
                    &queue,
                    discard_late,
                    &token,
                )
            })
        };

        let dispatcher = {
            let clock = Arc::clone(&clock);
            let queue = Arc::clone(&queue);
            let token = token.clone();
            let mut sink = sink;
            std::thread::spawn(move || run_dispatcher(&queue, &clock, &mut sink, retry, &token))
        };

        Ok(Session {
            token,
            clock,
            queue,
            retry,
            scheduler,
            dispatcher,
        })
    }

    pub fn token(&self) -> ShutdownToken {
        self.token.clone()
    }

    pub fn clock(&self) -> Arc<Clock> {
        Arc::clone(&self.clock)
    }

    pub fn request_stop(&self) {
        self.token.request_stop();
    }

    /// Wait for the session to finish. After the frame stream ends, waits
    /// for the queue to drain (events still gated on the clock) before
    /// stopping the dispatcher. A failure in either task is terminal for
    /// the whole session: the surviving task cannot make progress alone.
    pub fn join(self) -> Result<(), SessionError> {
        let sched = self
            .scheduler
            .join()
            .map_err(|_| SessionError::Panicked { task: "scheduler" });

        match sched {
            Ok(Ok(())) => {}
            Ok(Err(e)) => {
                self.token.request_stop();
                let _ = self.dispatcher.join();
                self.clock.stop();
                return Err(e.into());
            }
            Err(panicked) => {
                self.token.request_stop();
                let _ = self.dispatcher.join();
                self.clock.stop();
                return Err(panicked);
            }
        }

        // Stream ended cleanly; let the dispatcher deliver what is queued.
        // The queue only loses an event on the way to an unconditional
        // send, so an empty queue means every event has been (or is right
        // now being) delivered, even ones that were not yet due here.
        while !self.queue.is_empty() && !self.dispatcher.is_finished() {
            std::thread::sleep(self.retry);
        }

        self.token.request_stop();
        let dispatched = self
            .dispatcher
            .join()
            .map_err(|_| SessionError::Panicked { task: "dispatcher" })?;
        self.clock.stop();
        dispatched?;
        info!("session finished");
        Ok(())
    }
}
