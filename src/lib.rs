//! roll2midi turns a live stream of fixed-size piano-roll activation
//! frames into timed MIDI note events.
//!
//! Data flow: byte stream -> [`FrameCodec`] -> [`EventExtractor`] ->
//! [`pipeline::EventQueue`] -> dispatcher -> sink. The scheduler and
//! dispatcher run as independent threads, synchronized only through the
//! queue and the logical [`Clock`]; the dispatcher holds back each event
//! until the clock reaches its timestamp.

pub mod config;
pub mod events;
pub mod extract;
pub mod frame;
pub mod io;
pub mod pipeline;
pub mod session;
pub mod timing;

pub use config::SessionConfig;
pub use events::{EventKind, MidiEvent};
pub use extract::{EventExtractor, PitchRangeError};
pub use frame::{FrameCodec, FramingError};
pub use session::{Session, SessionError, ShutdownToken};
pub use timing::{Clock, ClockError};
