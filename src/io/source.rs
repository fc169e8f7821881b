use crate::session::ShutdownToken;
use crossbeam::channel::{Receiver, RecvTimeoutError};
use std::io::Read;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SourceError {
    #[error("frame stream i/o error: {0}")]
    Io(#[from] std::io::Error),
    #[error("stream ended mid-frame after {got} of {expected} bytes")]
    TruncatedFrame { expected: usize, got: usize },
}

/// Where frames come from. `next_frame` blocks until one whole frame's raw
/// bytes are available, returns `Ok(None)` at end of stream, and `Err` on a
/// fatal stream fault.
pub trait FrameSource {
    fn next_frame(&mut self) -> Result<Option<Vec<u8>>, SourceError>;
}

/// Fixed-size reads from any byte stream (file, pipe, socket). The frame
/// format carries no markers, so alignment comes entirely from reading
/// exactly `frame_size` bytes at a time.
pub struct ReadFrameSource<R> {
    reader: R,
    frame_size: usize,
}

impl<R: Read> ReadFrameSource<R> {
    pub fn new(reader: R, frame_size: usize) -> Self {
        Self { reader, frame_size }
    }
}

impl<R: Read> FrameSource for ReadFrameSource<R> {
    fn next_frame(&mut self) -> Result<Option<Vec<u8>>, SourceError> {
        let mut buf = vec![0u8; self.frame_size];
        let mut filled = 0;
        while filled < self.frame_size {
            match self.reader.read(&mut buf[filled..]) {
                Ok(0) if filled == 0 => return Ok(None),
                Ok(0) => {
                    return Err(SourceError::TruncatedFrame {
                        expected: self.frame_size,
                        got: filled,
                    });
                }
                Ok(n) => filled += n,
                Err(e) if e.kind() == std::io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e.into()),
            }
        }
        Ok(Some(buf))
    }
}

/// In-process frame hand-off over a crossbeam channel. Waits in short
/// `recv_timeout` slices so a shutdown request is observed within one poll
/// interval instead of blocking until the next frame arrives.
pub struct ChannelFrameSource {
    rx: Receiver<Vec<u8>>,
    token: ShutdownToken,
    poll: Duration,
}

impl ChannelFrameSource {
    pub fn new(rx: Receiver<Vec<u8>>, token: ShutdownToken) -> Self {
        Self {
            rx,
            token,
            poll: Duration::from_millis(20),
        }
    }
}

impl FrameSource for ChannelFrameSource {
    fn next_frame(&mut self) -> Result<Option<Vec<u8>>, SourceError> {
        loop {
            if self.token.is_stopping() {
                return Ok(None);
            }
            match self.rx.recv_timeout(self.poll) {
                Ok(bytes) => return Ok(Some(bytes)),
                Err(RecvTimeoutError::Timeout) => continue,
                // All senders dropped: clean end of stream.
                Err(RecvTimeoutError::Disconnected) => return Ok(None),
            }
        }
    }
}
