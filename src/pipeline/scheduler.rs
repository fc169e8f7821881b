use super::EventQueue;
use crate::extract::EventExtractor;
use crate::frame::{FrameCodec, FramingError};
use crate::io::{FrameSource, SourceError};
use crate::session::ShutdownToken;
use crate::timing::{Clock, ClockError};
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info};

#[derive(Debug, Error)]
pub enum SchedulerError {
    #[error(transparent)]
    Framing(#[from] FramingError),
    #[error(transparent)]
    Source(#[from] SourceError),
    #[error(transparent)]
    Clock(#[from] ClockError),
}

/// Frame-ingestion loop. Pulls raw frames from the source, starts the
/// session clock from the first frame's timestamp (t=0 of the session is
/// frame-relative, not wall-clock start), applies the late-frame policy,
/// and queues every extracted event.
///
/// Framing and source faults are fatal: the stream cannot be realigned at
/// byte granularity, so there is nothing to retry.
pub fn run_scheduler(
    source: &mut dyn FrameSource,
    codec: &FrameCodec,
    clock: &Arc<Clock>,
    extractor: &mut EventExtractor,
    queue: &EventQueue,
    discard_late: bool,
    token: &ShutdownToken,
) -> Result<(), SchedulerError> {
    info!("scheduler starting");

    while !token.is_stopping() {
        let Some(bytes) = source.next_frame()? else {
            info!("frame source reached end of stream");
            break;
        };
        let timestamp = codec.peek_timestamp(&bytes)?;

        if !clock.is_running() {
            clock.seed(timestamp)?;
            clock.start()?;
            info!(timestamp, "clock seeded from first frame");
        }

        // Policy outcome, not an error: the notes in this frame are lost,
        // in exchange for bounding queue growth under a lagging stream.
        if discard_late && timestamp < clock.current() {
            debug!(timestamp, now = clock.current(), "dropping late frame");
            continue;
        }

        let (timestamp, activations) = codec.decode(&bytes)?;
        for event in extractor.process(timestamp, &activations) {
            queue.push(event);
        }
    }

    info!("scheduler stopping");
    Ok(())
}
