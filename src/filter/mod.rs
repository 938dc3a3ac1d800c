pub mod coefficients;
pub mod iir;
pub mod response;

pub use coefficients::Coefficients;
pub use iir::{filter_recording, process_file, IirFilter, MultichannelFilter, ProcessingSummary};
pub use response::{
    bandwidth, characterize, frequency_grid, freqz, group_delay, passband_mask, unwrap_phase,
    Bandwidth, DelayStats, FilterReport, FilterSummary,
};
