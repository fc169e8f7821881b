use super::EventQueue;
use crate::io::{EventSink, SinkError};
use crate::session::ShutdownToken;
use crate::timing::Clock;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tracing::{info, trace};

#[derive(Debug, Error)]
pub enum DispatchError {
    #[error(transparent)]
    Sink(#[from] SinkError),
}

/// Time-gated delivery loop. Takes the next event off the queue only once
/// the clock has reached its timestamp; a not-yet-due head is left in
/// place and the wait retried against a fresher clock reading, so the
/// queue's length always reflects undelivered events.
///
/// Never-early is the hard guarantee; punctuality is best effort, bounded
/// by the clock resolution plus `retry`. A sink failure is fatal for the
/// session: retrying an event that may already have reached the device
/// would risk duplicate notes.
pub fn run_dispatcher(
    queue: &EventQueue,
    clock: &Arc<Clock>,
    sink: &mut dyn EventSink,
    retry: Duration,
    token: &ShutdownToken,
) -> Result<(), DispatchError> {
    info!("dispatcher starting");

    while !token.is_stopping() {
        let Some(event) = queue.pop_due(clock.current(), retry) else {
            continue;
        };
        trace!(
            timestamp = event.timestamp,
            pitch = event.pitch,
            kind = ?event.kind,
            "dispatching event"
        );
        sink.send(&event)?;
    }

    info!("dispatcher stopping");
    Ok(())
}
