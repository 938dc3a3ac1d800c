use rayon::prelude::*;
use serde::Serialize;

use crate::error::{Error, Result};
use crate::recording::{FrameMatrix, Sample};

/// Descriptive statistics over a set of samples, computed in `f64`.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct Statistics {
    pub count: usize,
    pub min: f64,
    pub max: f64,
    pub rms: f64,
    pub mean: f64,
    /// Population standard deviation
    pub std: f64,
}

/// Output relative to input.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct Comparison {
    pub rms_ratio: f64,
    pub mean_delta: f64,
    /// `None` when the input has zero standard deviation
    pub std_pct_change: Option<f64>,
    /// `20*log10(rms_ratio)`, `-inf` for a silent output
    pub attenuation_db: f64,
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct ChannelStatistics {
    pub channel: usize,
    pub stats: Statistics,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct RecordingComparison {
    pub shape: (usize, usize),
    pub input: Statistics,
    pub output: Statistics,
    pub comparison: Comparison,
}

/// Pooled statistics over every frame and channel.
pub fn describe<S: Sample>(matrix: &FrameMatrix<S>) -> Result<Statistics> {
    summarize(matrix.samples().iter().map(|s| s.to_f64()))
}

pub fn describe_channel<S: Sample>(matrix: &FrameMatrix<S>, channel: usize) -> Result<Statistics> {
    summarize(matrix.channel(channel)?.map(|s| s.to_f64()))
}

pub fn describe_channels<S: Sample>(
    matrix: &FrameMatrix<S>,
    channels: &[usize],
) -> Result<Vec<ChannelStatistics>> {
    channels
        .par_iter()
        .map(|&channel| {
            Ok(ChannelStatistics {
                channel,
                stats: describe_channel(matrix, channel)?,
            })
        })
        .collect()
}

pub fn describe_comparison(input: &Statistics, output: &Statistics) -> Result<Comparison> {
    if input.rms == 0.0 {
        return Err(Error::DivideByZero("input RMS is zero"));
    }

    let rms_ratio = output.rms / input.rms;
    let std_pct_change = if input.std == 0.0 {
        log::warn!("Input standard deviation is zero; std change is undefined");
        None
    } else {
        Some((output.std - input.std) / input.std * 100.0)
    };

    Ok(Comparison {
        rms_ratio,
        mean_delta: output.mean - input.mean,
        std_pct_change,
        attenuation_db: 20.0 * rms_ratio.log10(),
    })
}

/// Describe two recordings of the same shape and compare them.
pub fn compare_recordings<S: Sample>(
    input: &FrameMatrix<S>,
    output: &FrameMatrix<S>,
) -> Result<RecordingComparison> {
    if input.shape() != output.shape() {
        return Err(Error::ShapeMismatch {
            left: input.shape(),
            right: output.shape(),
        });
    }

    let (input_stats, output_stats) = rayon::join(|| describe(input), || describe(output));
    let input_stats = input_stats?;
    let output_stats = output_stats?;

    Ok(RecordingComparison {
        shape: input.shape(),
        input: input_stats,
        output: output_stats,
        comparison: describe_comparison(&input_stats, &output_stats)?,
    })
}

fn summarize<I>(values: I) -> Result<Statistics>
where
    I: Iterator<Item = f64> + Clone,
{
    let mut count = 0usize;
    let mut sum = 0.0;
    let mut sum_sq = 0.0;
    let mut min = f64::INFINITY;
    let mut max = f64::NEG_INFINITY;

    for x in values.clone() {
        count += 1;
        sum += x;
        sum_sq += x * x;
        min = min.min(x);
        max = max.max(x);
    }

    if count == 0 {
        return Err(Error::EmptyRecording);
    }

    let n = count as f64;
    let mean = sum / n;
    // Second pass about the mean; sum_sq - n*mean^2 cancels badly for offset data
    let variance = values.map(|x| (x - mean) * (x - mean)).sum::<f64>() / n;

    Ok(Statistics {
        count,
        min,
        max,
        rms: (sum_sq / n).sqrt(),
        mean,
        std: variance.sqrt(),
    })
}
