//! Text rendering of computed records. Nothing here computes statistics.

use std::io::{self, Write};

use serde::Serialize;

use crate::analysis::{ChannelStatistics, RecordingComparison, SpectrumPeak};
use crate::filter::{DelayStats, FilterReport, ProcessingSummary};
use crate::recording::{FrameMatrix, Sample};

const RULE: &str = "------------------------------";

fn section(w: &mut impl Write, title: &str) -> io::Result<()> {
    writeln!(w, "\n{}:", title)?;
    writeln!(w, "{}", RULE)
}

pub fn write_json<T: Serialize>(w: &mut impl Write, value: &T) -> io::Result<()> {
    serde_json::to_writer_pretty(&mut *w, value)?;
    writeln!(w)
}

pub fn write_comparison(w: &mut impl Write, report: &RecordingComparison) -> io::Result<()> {
    let (input, output, cmp) = (&report.input, &report.output, &report.comparison);

    section(w, "Signal Statistics")?;
    writeln!(w, "Input data shape: {:?}", report.shape)?;
    writeln!(w, "Output data shape: {:?}", report.shape)?;
    writeln!(w, "Input data range: [{}, {}]", input.min, input.max)?;
    writeln!(w, "Output data range: [{}, {}]", output.min, output.max)?;

    section(w, "RMS Values")?;
    writeln!(w, "Input RMS: {:.2}", input.rms)?;
    writeln!(w, "Output RMS: {:.2}", output.rms)?;
    writeln!(w, "RMS ratio (output/input): {:.4}", cmp.rms_ratio)?;

    section(w, "Signal Analysis")?;
    writeln!(w, "Signal level change: {:.2} dB", cmp.attenuation_db)?;

    section(w, "Mean and Standard Deviation")?;
    writeln!(w, "Input mean: {:.2}, std: {:.2}", input.mean, input.std)?;
    writeln!(w, "Output mean: {:.2}, std: {:.2}", output.mean, output.std)?;
    writeln!(w, "Mean change: {:.2}", cmp.mean_delta)?;
    match cmp.std_pct_change {
        Some(pct) => writeln!(w, "Std change: {:.2}%", pct),
        None => writeln!(w, "Std change: undefined (input standard deviation is zero)"),
    }
}

pub fn write_channel_table(
    w: &mut impl Write,
    input: &[ChannelStatistics],
    output: &[ChannelStatistics],
) -> io::Result<()> {
    section(w, "Per-Channel RMS")?;
    writeln!(w, "{:>8} {:>12} {:>12} {:>10}", "channel", "input", "output", "ratio")?;
    for (i, o) in input.iter().zip(output) {
        let ratio = if i.stats.rms > 0.0 {
            format!("{:.4}", o.stats.rms / i.stats.rms)
        } else {
            "n/a".to_string()
        };
        writeln!(
            w,
            "{:>8} {:>12.2} {:>12.2} {:>10}",
            i.channel, i.stats.rms, o.stats.rms, ratio
        )?;
    }
    Ok(())
}

pub fn write_spectrum_peaks(
    w: &mut impl Write,
    channel: usize,
    input: Option<SpectrumPeak>,
    output: Option<SpectrumPeak>,
) -> io::Result<()> {
    section(w, &format!("Spectral Peak (channel {})", channel))?;
    for (label, peak) in [("Input", input), ("Output", output)] {
        match peak {
            Some(p) => writeln!(w, "{}: {:.2} Hz (magnitude {:.1})", label, p.frequency_hz, p.magnitude)?,
            None => writeln!(w, "{}: n/a", label)?,
        }
    }
    Ok(())
}

fn write_delays(w: &mut impl Write, prefix: &str, unit: &str, d: &DelayStats) -> io::Result<()> {
    writeln!(w, "Average {}: {:.2} {}", prefix, d.mean, unit)?;
    writeln!(w, "Maximum {}: {:.2} {}", prefix, d.max, unit)?;
    writeln!(w, "Minimum {}: {:.2} {}", prefix, d.min, unit)
}

pub fn write_filter_report(w: &mut impl Write, report: &FilterReport) -> io::Result<()> {
    let delay = report.delay_stats();

    section(w, "Filter Response Statistics")?;
    write_delays(w, "group delay", "samples", &delay)?;
    let undefined = report.undefined_points();
    if let Some(&first) = undefined.first() {
        writeln!(
            w,
            "Undefined response: {} point(s), first at {:.2} Hz (excluded from passband and bandwidth)",
            undefined.len(),
            report.frequencies[first]
        )?;
    }

    section(w, "Time Delays (All Frequencies)")?;
    write_delays(w, "group delay", "microseconds", &delay.to_microseconds(report.sample_rate))?;

    section(w, "Time Delays (Passband Only)")?;
    match report.passband_delay_stats() {
        Ok(d) => write_delays(w, "passband delay", "microseconds", &d.to_microseconds(report.sample_rate))?,
        Err(e) => writeln!(w, "Passband delay: undefined ({})", e)?,
    }

    section(w, "Filter Bandwidth")?;
    match report.bandwidth() {
        Ok(bw) => {
            writeln!(w, "{}dB Bandwidth: {:.2} Hz", report.threshold_db, bw.width_hz)?;
            writeln!(w, "Lower {}dB point: {:.2} Hz", report.threshold_db, bw.lower_hz)?;
            writeln!(w, "Upper {}dB point: {:.2} Hz", report.threshold_db, bw.upper_hz)?;
        }
        Err(e) => writeln!(w, "{}dB Bandwidth: undefined ({})", report.threshold_db, e)?,
    }
    Ok(())
}

pub fn write_processing_summary(w: &mut impl Write, s: &ProcessingSummary) -> io::Result<()> {
    section(w, "Processing")?;
    writeln!(w, "Frames processed: {} x {} channels", s.frames, s.channels)?;
    writeln!(w, "Average time per frame: {:.2} us", s.avg_frame_us)?;
    writeln!(w, "Average time per sample: {:.4} us", s.avg_sample_us)?;
    writeln!(w, "Slowest frame: {:.2} us", s.max_frame_us)?;
    writeln!(w, "Frames over real-time budget: {}", s.slow_frames)?;
    if s.dropped_bytes > 0 {
        writeln!(w, "Trailing bytes ignored: {}", s.dropped_bytes)?;
    }
    Ok(())
}

/// First `frames` frames, each cut to the first `channels` channels.
pub fn write_preview<S: Sample + std::fmt::Display>(
    w: &mut impl Write,
    matrix: &FrameMatrix<S>,
    frames: usize,
    channels: usize,
) -> io::Result<()> {
    let (num_frames, num_channels) = matrix.shape();
    writeln!(w, "Neural Data ({} channels, {}-bit samples, {} frames)", num_channels, S::WIDTH * 8, num_frames)?;
    let shown = channels.min(num_channels);
    for (i, frame) in matrix.frames().take(frames).enumerate() {
        let values: Vec<String> = frame[..shown].iter().map(|s| format!("{:>6}", s)).collect();
        let more = if shown < num_channels { " ..." } else { "" };
        writeln!(w, "Frame {}: {}{}", i + 1, values.join(" "), more)?;
    }
    if frames > num_frames {
        writeln!(w, "Reached end of file after {} frame(s)", num_frames)?;
    }
    Ok(())
}
