mod sink;
mod source;

pub use sink::{ChannelSink, EventSink, MidirSink, SinkError};
pub use source::{ChannelFrameSource, FrameSource, ReadFrameSource, SourceError};
