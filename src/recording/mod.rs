pub mod decode;
pub mod matrix;
pub mod sample;

pub use decode::{decode_bytes, read_recording};
pub use matrix::{ChannelIter, FrameMatrix};
pub use sample::Sample;

/// Default channel count of the neural recordings.
pub const DEFAULT_CHANNELS: usize = 256;
