use rustfft::{num_complex::Complex, FftPlanner};
use serde::Serialize;

use crate::error::{Error, Result};

/// One-sided magnitude spectrum of a real signal.
#[derive(Clone, Debug)]
pub struct Spectrum {
    /// Bin centre frequencies in Hz, `k * fs / n`
    pub frequencies: Vec<f64>,
    /// Linear magnitude `|X[k]|`, unnormalized
    pub magnitudes: Vec<f64>,
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct SpectrumPeak {
    pub frequency_hz: f64,
    pub magnitude: f64,
}

/// Magnitude of the real FFT: `n/2 + 1` bins from DC up to Nyquist.
pub fn magnitude_spectrum(samples: &[f64], sample_rate: f64) -> Result<Spectrum> {
    if samples.is_empty() {
        return Err(Error::EmptyRecording);
    }

    let n = samples.len();
    let mut planner = FftPlanner::<f64>::new();
    let fft = planner.plan_fft_forward(n);

    let mut buffer: Vec<Complex<f64>> = samples.iter().map(|&s| Complex::new(s, 0.0)).collect();
    fft.process(&mut buffer);

    let bins = n / 2 + 1;
    let frequencies = (0..bins).map(|k| k as f64 * sample_rate / n as f64).collect();
    let magnitudes = buffer[..bins].iter().map(|c| c.norm()).collect();

    Ok(Spectrum {
        frequencies,
        magnitudes,
    })
}

impl Spectrum {
    pub fn len(&self) -> usize {
        self.magnitudes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.magnitudes.is_empty()
    }

    pub fn resolution_hz(&self) -> f64 {
        self.frequencies.get(1).copied().unwrap_or(0.0)
    }

    /// Strongest bin, ignoring DC unless it is the only bin.
    pub fn peak(&self) -> Option<SpectrumPeak> {
        let skip = if self.len() > 1 { 1 } else { 0 };
        self.magnitudes
            .iter()
            .enumerate()
            .skip(skip)
            .max_by(|a, b| a.1.total_cmp(b.1))
            .map(|(i, &magnitude)| SpectrumPeak {
                frequency_hz: self.frequencies[i],
                magnitude,
            })
    }

    /// Magnitude of the bin nearest to `frequency_hz`.
    pub fn magnitude_at(&self, frequency_hz: f64) -> Option<f64> {
        let resolution = self.resolution_hz();
        if self.is_empty() {
            return None;
        }
        if resolution <= 0.0 {
            return Some(self.magnitudes[0]);
        }
        let bin = (frequency_hz / resolution).round().max(0.0) as usize;
        self.magnitudes.get(bin.min(self.len() - 1)).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::PI;

    fn sine(freq: f64, sample_rate: f64, n: usize, amplitude: f64) -> Vec<f64> {
        (0..n)
            .map(|i| amplitude * (2.0 * PI * freq * i as f64 / sample_rate).sin())
            .collect()
    }

    #[test]
    fn bin_layout_matches_rfftfreq() {
        let s = magnitude_spectrum(&[0.0; 8], 32000.0).unwrap();
        assert_eq!(s.len(), 5);
        assert_eq!(s.frequencies, vec![0.0, 4000.0, 8000.0, 12000.0, 16000.0]);

        let odd = magnitude_spectrum(&[0.0; 7], 7.0).unwrap();
        assert_eq!(odd.len(), 4);
        assert_eq!(odd.frequencies[3], 3.0);
    }

    #[test]
    fn dc_bin_is_the_sum() {
        let s = magnitude_spectrum(&[2.0, 2.0, 2.0, 2.0], 4.0).unwrap();
        assert!((s.magnitudes[0] - 8.0).abs() < 1e-12);
        assert!(s.magnitudes[1..].iter().all(|m| m.abs() < 1e-12));
    }

    #[test]
    fn sine_peaks_at_its_frequency() {
        // 1 kHz lands exactly on bin 32 with n=1024 at 32 kHz
        let s = magnitude_spectrum(&sine(1000.0, 32000.0, 1024, 100.0), 32000.0).unwrap();
        let peak = s.peak().unwrap();
        assert!((peak.frequency_hz - 1000.0).abs() < 1e-9);
        assert!((peak.magnitude - 100.0 * 1024.0 / 2.0).abs() < 1e-6);
        assert!((s.magnitude_at(1010.0).unwrap() - peak.magnitude).abs() < 1e-9);
    }

    #[test]
    fn peak_ignores_dc_offset() {
        let mut x = sine(2000.0, 32000.0, 256, 10.0);
        x.iter_mut().for_each(|v| *v += 500.0);
        let peak = magnitude_spectrum(&x, 32000.0).unwrap().peak().unwrap();
        assert!((peak.frequency_hz - 2000.0).abs() < 1e-9);
    }

    #[test]
    fn empty_input_is_an_error() {
        assert!(matches!(
            magnitude_spectrum(&[], 32000.0),
            Err(Error::EmptyRecording)
        ));
    }
}
