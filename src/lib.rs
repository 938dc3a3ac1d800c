//! Decoding, statistics and filter characterization for multichannel
//! neural recordings stored as headerless interleaved 16-bit files.

pub mod analysis;
pub mod config;
pub mod error;
pub mod filter;
pub mod recording;
pub mod report;

pub use error::{Error, Result};
