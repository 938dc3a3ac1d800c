use std::fs::File;
use std::io::{BufReader, BufWriter, ErrorKind, Write};
use std::path::Path;
use std::time::Instant;

use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};
use indicatif::{ProgressBar, ProgressStyle};
use serde::Serialize;

use super::coefficients::Coefficients;
use crate::error::{Error, Result};
use crate::recording::{FrameMatrix, Sample};

/// Default real-time budget for one frame, in microseconds.
pub const DEFAULT_FRAME_BUDGET_US: f64 = 1000.0;

/// Direct-form-I IIR section with its own delay lines.
#[derive(Debug, Clone)]
pub struct IirFilter {
    b: Vec<f64>,
    a: Vec<f64>,
    x_delays: Vec<f64>,
    y_delays: Vec<f64>,
}

impl IirFilter {
    pub fn new(coeffs: &Coefficients) -> Result<Self> {
        coeffs.validate()?;
        let a0 = coeffs.a[0];
        Ok(Self {
            b: coeffs.b.iter().map(|b| b / a0).collect(),
            a: coeffs.a.iter().map(|a| a / a0).collect(),
            x_delays: vec![0.0; coeffs.b.len() - 1],
            y_delays: vec![0.0; coeffs.a.len() - 1],
        })
    }

    /// y[n] = Σ b[k] x[n-k] - Σ a[k] y[n-k]
    pub fn process_sample(&mut self, input: f64) -> f64 {
        let mut output = self.b[0] * input;
        for (b, x) in self.b[1..].iter().zip(&self.x_delays) {
            output += b * x;
        }
        for (a, y) in self.a[1..].iter().zip(&self.y_delays) {
            output -= a * y;
        }

        if !self.x_delays.is_empty() {
            self.x_delays.rotate_right(1);
            self.x_delays[0] = input;
        }
        if !self.y_delays.is_empty() {
            self.y_delays.rotate_right(1);
            self.y_delays[0] = output;
        }

        output
    }

    pub fn reset(&mut self) {
        self.x_delays.fill(0.0);
        self.y_delays.fill(0.0);
    }
}

/// One independent [`IirFilter`] per channel.
#[derive(Debug, Clone)]
pub struct MultichannelFilter {
    channels: Vec<IirFilter>,
}

impl MultichannelFilter {
    pub fn new(coeffs: &Coefficients, num_channels: usize) -> Result<Self> {
        if num_channels == 0 {
            return Err(Error::InvalidChannelCount(num_channels));
        }
        let filter = IirFilter::new(coeffs)?;
        Ok(Self {
            channels: vec![filter; num_channels],
        })
    }

    /// Filter one frame, saturating to the i16 range and truncating toward zero.
    pub fn process_frame(&mut self, input: &[i16], output: &mut [i16]) {
        for ((filter, &x), y) in self.channels.iter_mut().zip(input).zip(output.iter_mut()) {
            let filtered = filter.process_sample(f64::from(x));
            *y = filtered.clamp(f64::from(i16::MIN), f64::from(i16::MAX)) as i16;
        }
    }
}

/// Filter an in-memory recording channel by channel.
pub fn filter_recording(matrix: &FrameMatrix<i16>, coeffs: &Coefficients) -> Result<FrameMatrix<i16>> {
    let mut filter = MultichannelFilter::new(coeffs, matrix.num_channels())?;
    let mut out = vec![0i16; matrix.samples().len()];
    for (frame, dst) in matrix
        .frames()
        .zip(out.chunks_exact_mut(matrix.num_channels()))
    {
        filter.process_frame(frame, dst);
    }
    FrameMatrix::from_samples(out, matrix.num_channels())
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct ProcessingSummary {
    pub frames: usize,
    pub channels: usize,
    pub avg_frame_us: f64,
    pub avg_sample_us: f64,
    pub max_frame_us: f64,
    /// Frames that took longer than the real-time budget
    pub slow_frames: usize,
    pub dropped_bytes: u64,
}

/// Stream `input` frame by frame through the filter into `output`.
///
/// Stops at the first incomplete frame; its bytes are counted in
/// `dropped_bytes` and not written.
pub fn process_file(
    input: &Path,
    output: &Path,
    num_channels: usize,
    coeffs: &Coefficients,
    frame_budget_us: f64,
) -> Result<ProcessingSummary> {
    if !input.exists() {
        return Err(Error::FileNotFound {
            path: input.to_path_buf(),
        });
    }
    let decode_err = |source: std::io::Error| Error::Decode {
        path: input.to_path_buf(),
        source,
    };

    let infile = File::open(input).map_err(decode_err)?;
    let total_bytes = infile.metadata().map_err(decode_err)?.len();
    let frame_bytes = num_channels.max(1) * i16::WIDTH;
    let expected_frames = total_bytes / frame_bytes as u64;

    let mut filter = MultichannelFilter::new(coeffs, num_channels)?;
    let mut reader = BufReader::new(infile);
    let mut writer = BufWriter::new(File::create(output)?);

    let pb = ProgressBar::new(expected_frames);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("[{elapsed_precise}] {bar:40.cyan/blue} {pos}/{len} frames ({eta} remaining)")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("=>-"),
    );

    let mut frame_in = vec![0i16; num_channels];
    let mut frame_out = vec![0i16; num_channels];

    let mut frames = 0usize;
    let mut total_us = 0.0f64;
    let mut max_frame_us = 0.0f64;
    let mut slow_frames = 0usize;

    loop {
        match reader.read_i16_into::<LittleEndian>(&mut frame_in) {
            Ok(()) => {}
            Err(e) if e.kind() == ErrorKind::UnexpectedEof => break,
            Err(e) => return Err(decode_err(e)),
        }

        let start = Instant::now();

        filter.process_frame(&frame_in, &mut frame_out);
        for &s in &frame_out {
            writer.write_i16::<LittleEndian>(s)?;
        }

        let elapsed_us = start.elapsed().as_secs_f64() * 1e6;
        if elapsed_us > frame_budget_us {
            if slow_frames == 0 {
                log::warn!(
                    "Frame {} took {:.2} us, exceeding the {:.0} us real-time budget",
                    frames,
                    elapsed_us,
                    frame_budget_us
                );
            }
            slow_frames += 1;
        }
        total_us += elapsed_us;
        max_frame_us = max_frame_us.max(elapsed_us);
        frames += 1;
        pb.set_position(frames as u64);
    }

    writer.flush()?;
    pb.finish_and_clear();

    let (avg_frame_us, avg_sample_us) = if frames > 0 {
        let per_frame = total_us / frames as f64;
        (per_frame, per_frame / num_channels as f64)
    } else {
        (0.0, 0.0)
    };

    let summary = ProcessingSummary {
        frames,
        channels: num_channels,
        avg_frame_us,
        avg_sample_us,
        max_frame_us,
        slow_frames,
        dropped_bytes: total_bytes - (frames * frame_bytes) as u64,
    };

    log::info!(
        "Filtered {} frames from {} into {} ({:.2} us/frame, {:.4} us/sample)",
        frames,
        input.display(),
        output.display(),
        avg_frame_us,
        avg_sample_us
    );
    if slow_frames > 0 {
        log::warn!("{} frame(s) exceeded the real-time budget", slow_frames);
    }

    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn passthrough_filter_is_identity() {
        let mut f = IirFilter::new(&Coefficients::new(vec![1.0], vec![1.0]).unwrap()).unwrap();
        for x in [1.0, -2.5, 7.0] {
            assert_eq!(f.process_sample(x), x);
        }
    }

    #[test]
    fn impulse_response_of_one_pole() {
        let coeffs = Coefficients::new(vec![1.0], vec![1.0, -0.5]).unwrap();
        let mut f = IirFilter::new(&coeffs).unwrap();
        let out: Vec<f64> = [1.0, 0.0, 0.0, 0.0].iter().map(|&x| f.process_sample(x)).collect();
        assert_eq!(out, vec![1.0, 0.5, 0.25, 0.125]);

        f.reset();
        assert_eq!(f.process_sample(0.0), 0.0);
    }

    #[test]
    fn denominator_is_normalized() {
        let coeffs = Coefficients::new(vec![2.0], vec![2.0]).unwrap();
        let mut f = IirFilter::new(&coeffs).unwrap();
        assert_eq!(f.process_sample(3.0), 3.0);
    }

    #[test]
    fn fir_delay_line_shifts() {
        let coeffs = Coefficients::new(vec![0.0, 0.0, 1.0], vec![1.0]).unwrap();
        let mut f = IirFilter::new(&coeffs).unwrap();
        let out: Vec<f64> = [1.0, 2.0, 3.0, 4.0].iter().map(|&x| f.process_sample(x)).collect();
        assert_eq!(out, vec![0.0, 0.0, 1.0, 2.0]);
    }

    #[test]
    fn output_saturates_to_i16() {
        let gain = Coefficients::new(vec![4.0], vec![1.0]).unwrap();
        let mut f = MultichannelFilter::new(&gain, 3).unwrap();
        let mut out = [0i16; 3];
        f.process_frame(&[20000, -20000, 3], &mut out);
        assert_eq!(out, [i16::MAX, i16::MIN, 12]);
    }

    #[test]
    fn truncates_toward_zero() {
        let half = Coefficients::new(vec![0.5], vec![1.0]).unwrap();
        let mut f = MultichannelFilter::new(&half, 2).unwrap();
        let mut out = [0i16; 2];
        f.process_frame(&[3, -3], &mut out);
        assert_eq!(out, [1, -1]);
    }

    #[test]
    fn channels_keep_independent_state() {
        let coeffs = Coefficients::new(vec![0.0, 1.0], vec![1.0]).unwrap();
        let m = FrameMatrix::from_samples(vec![1i16, 10, 2, 20, 3, 30], 2).unwrap();
        let out = filter_recording(&m, &coeffs).unwrap();
        assert_eq!(out.samples(), &[0, 0, 1, 10, 2, 20]);
    }

    #[test]
    fn notch_removes_sixty_hz_and_keeps_dc() {
        let fs = 32000.0;
        let n = 32000;
        let samples: Vec<i16> = (0..n)
            .map(|i| {
                let t = i as f64 / fs;
                (1000.0 + 8000.0 * (2.0 * std::f64::consts::PI * 59.79 * t).sin()) as i16
            })
            .collect();
        let m = FrameMatrix::from_samples(samples, 1).unwrap();
        let out = filter_recording(&m, &Coefficients::notch()).unwrap();

        // Skip the transient; what remains should be close to the DC level
        let tail = &out.samples()[n / 2..];
        let max_dev = tail.iter().map(|&s| (f64::from(s) - 1000.0).abs()).fold(0.0, f64::max);
        assert!(max_dev < 800.0, "residual deviation {}", max_dev);
    }

    #[test]
    fn zero_channels_rejected() {
        assert!(matches!(
            MultichannelFilter::new(&Coefficients::notch(), 0),
            Err(Error::InvalidChannelCount(0))
        ));
    }
}
