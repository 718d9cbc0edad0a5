//! Audio format description and sample buffers.

pub mod buffer;
pub mod samples;
pub mod spec;

pub use buffer::MasterTrack;
pub use spec::{AudioSpec, Channel, ChannelLayout};
