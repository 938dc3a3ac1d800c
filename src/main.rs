mod cli;

use anyhow::{Context, Result};
use clap::Parser;
use serde::Serialize;
use std::io::Write;
use std::path::Path;

use cli::{Cli, Command};
use neurostat::analysis::{self, ChannelStatistics, RecordingComparison, SpectrumPeak};
use neurostat::config::{self, Config};
use neurostat::filter;
use neurostat::recording::{self, FrameMatrix};
use neurostat::report;

#[derive(Serialize)]
struct CompareOutput<'a> {
    #[serde(flatten)]
    recording: &'a RecordingComparison,
    input_channels: &'a [ChannelStatistics],
    output_channels: &'a [ChannelStatistics],
    spectrum_channel: usize,
    input_peak: Option<SpectrumPeak>,
    output_peak: Option<SpectrumPeak>,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp_millis()
        .init();

    let cli = Cli::parse();

    let cfg = match config::find_config(cli.config.as_deref()) {
        Some(path) => match config::load_config(&path) {
            Some(cfg) => {
                log::info!("Loaded config from {}", path.display());
                cfg
            }
            None => {
                log::warn!("Failed to load config from {}", path.display());
                Config::default()
            }
        },
        None => Config::default(),
    };

    let channels = cli.channels.unwrap_or(cfg.recording.channels);
    let sample_rate = cli.sample_rate.unwrap_or(cfg.recording.sample_rate);

    let stdout = std::io::stdout();
    let mut out = stdout.lock();

    match cli.command {
        Command::Compare {
            input,
            output,
            max_frames,
            report_channels,
            spectrum_channel,
            json,
        } => {
            let max_frames = max_frames.or(cfg.report.max_frames);
            let report_channels = if report_channels.is_empty() {
                cfg.report.channels.clone()
            } else {
                report_channels
            };
            let spectrum_channel = spectrum_channel.unwrap_or(cfg.report.spectrum_channel);
            run_compare(
                &mut out,
                &input,
                &output,
                channels,
                sample_rate,
                max_frames,
                &report_channels,
                spectrum_channel,
                json,
            )?;
        }
        Command::Response {
            points,
            threshold_db,
            json,
        } => {
            let coeffs = cfg.filter.coefficients();
            let report = filter::characterize(
                &coeffs,
                sample_rate,
                points.unwrap_or(cfg.filter.num_points),
                threshold_db.unwrap_or(cfg.filter.passband_threshold_db),
            )
            .context("Failed to characterize filter")?;

            if json {
                report::write_json(&mut out, &report.summary())?;
            } else {
                report::write_filter_report(&mut out, &report)?;
            }
        }
        Command::Apply {
            input,
            output,
            budget_us,
            json,
        } => {
            let coeffs = cfg.filter.coefficients();
            let budget = budget_us.unwrap_or(cfg.filter.realtime_budget_us);
            log::info!("Filtering {} -> {} ({} channels)", input.display(), output.display(), channels);
            let summary = filter::process_file(&input, &output, channels, &coeffs, budget)
                .with_context(|| format!("Failed to filter {}", input.display()))?;

            if json {
                report::write_json(&mut out, &summary)?;
            } else {
                report::write_processing_summary(&mut out, &summary)?;
                writeln!(out, "Processing complete. Filtered data saved to {}", output.display())?;
            }
        }
        Command::Inspect {
            file,
            frames,
            show_channels,
        } => {
            let matrix: FrameMatrix<i16> = recording::read_recording(&file, channels)?;
            let frames = frames.unwrap_or(cfg.report.preview_frames);
            report::write_preview(&mut out, &matrix, frames, show_channels)?;
        }
    }

    Ok(())
}

#[allow(clippy::too_many_arguments)]
fn run_compare(
    out: &mut impl Write,
    input_path: &Path,
    output_path: &Path,
    channels: usize,
    sample_rate: f64,
    max_frames: Option<usize>,
    report_channels: &[usize],
    spectrum_channel: usize,
    json: bool,
) -> Result<()> {
    // A missing or unreadable recording skips the analysis rather than failing the run
    let (input, output) = match (
        recording::read_recording::<i16>(input_path, channels),
        recording::read_recording::<i16>(output_path, channels),
    ) {
        (Ok(input), Ok(output)) => (input, output),
        (input, output) => {
            for err in [input.err(), output.err()].into_iter().flatten() {
                log::error!("{}", err);
            }
            return Ok(());
        }
    };

    let (input, output) = match max_frames {
        Some(n) => (input.truncated(n), output.truncated(n)),
        None => (input, output),
    };

    let comparison =
        analysis::compare_recordings(&input, &output).context("Failed to compare recordings")?;

    let selected: Vec<usize> = report_channels
        .iter()
        .copied()
        .filter(|&c| {
            let ok = c < channels;
            if !ok {
                log::warn!("Skipping channel {} (recording has {} channels)", c, channels);
            }
            ok
        })
        .collect();
    let input_channels = analysis::describe_channels(&input, &selected)?;
    let output_channels = analysis::describe_channels(&output, &selected)?;

    let peak = |m: &FrameMatrix<i16>| -> Option<SpectrumPeak> {
        let samples = m.channel_f64(spectrum_channel).ok()?;
        match analysis::magnitude_spectrum(&samples, sample_rate) {
            Ok(spectrum) => spectrum.peak(),
            Err(err) => {
                log::warn!("No spectrum for channel {}: {}", spectrum_channel, err);
                None
            }
        }
    };
    let (input_peak, output_peak) = rayon::join(|| peak(&input), || peak(&output));

    if json {
        report::write_json(
            out,
            &CompareOutput {
                recording: &comparison,
                input_channels: &input_channels,
                output_channels: &output_channels,
                spectrum_channel,
                input_peak,
                output_peak,
            },
        )?;
    } else {
        report::write_comparison(out, &comparison)?;
        if !selected.is_empty() {
            report::write_channel_table(out, &input_channels, &output_channels)?;
        }
        report::write_spectrum_peaks(out, spectrum_channel, input_peak, output_peak)?;
    }

    Ok(())
}
