pub mod spectrum;
pub mod stats;

pub use spectrum::{magnitude_spectrum, Spectrum, SpectrumPeak};
pub use stats::{
    compare_recordings, describe, describe_channel, describe_channels, describe_comparison,
    ChannelStatistics, Comparison, RecordingComparison, Statistics,
};
