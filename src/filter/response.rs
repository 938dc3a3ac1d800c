//! Frequency response, phase and group delay of a rational transfer function.
//!
//! The frequency grid follows `scipy.signal.freqz`: `num_points` frequencies
//! evenly spaced from DC up to, but excluding, Nyquist.

use std::f64::consts::PI;

use rustfft::num_complex::Complex64;
use serde::Serialize;

use super::coefficients::Coefficients;
use crate::error::{Error, Result};

pub const DEFAULT_NUM_POINTS: usize = 512;
pub const DEFAULT_PASSBAND_THRESHOLD_DB: f64 = -3.0;

/// Frequencies in Hz for a half-band grid of `num_points` points.
pub fn frequency_grid(sample_rate: f64, num_points: usize) -> Result<Vec<f64>> {
    if num_points == 0 {
        return Err(Error::InvalidGrid("num_points must be at least 1".into()));
    }
    if !sample_rate.is_finite() || sample_rate <= 0.0 {
        return Err(Error::InvalidGrid(format!(
            "sample rate must be positive, got {}",
            sample_rate
        )));
    }
    let step = sample_rate / 2.0 / num_points as f64;
    Ok((0..num_points).map(|k| k as f64 * step).collect())
}

/// `sum c[k] z^k`
fn polyval(coeffs: &[f64], z: Complex64) -> Complex64 {
    coeffs
        .iter()
        .rev()
        .fold(Complex64::new(0.0, 0.0), |acc, &c| acc * z + c)
}

/// `e^{-jω}` for a frequency in Hz.
fn unit_delay(frequency_hz: f64, sample_rate: f64) -> Complex64 {
    Complex64::from_polar(1.0, -2.0 * PI * frequency_hz / sample_rate)
}

/// Complex response `H(e^{jω}) = B / A` at each frequency.
pub fn freqz(coeffs: &Coefficients, frequencies: &[f64], sample_rate: f64) -> Vec<Complex64> {
    frequencies
        .iter()
        .map(|&f| {
            let z = unit_delay(f, sample_rate);
            polyval(&coeffs.b, z) / polyval(&coeffs.a, z)
        })
        .collect()
}

/// Group delay in samples, `-dφ/dω`.
///
/// Points where the response is singular get a delay of zero.
pub fn group_delay(coeffs: &Coefficients, frequencies: &[f64], sample_rate: f64) -> Vec<f64> {
    let a_rev: Vec<f64> = coeffs.a.iter().rev().copied().collect();
    let c = convolve(&coeffs.b, &a_rev);
    let cr: Vec<f64> = c.iter().enumerate().map(|(k, &v)| k as f64 * v).collect();
    let order_a = (coeffs.a.len() - 1) as f64;

    let mut singular = 0usize;
    let delays = frequencies
        .iter()
        .map(|&f| {
            let z = unit_delay(f, sample_rate);
            let den = polyval(&c, z);
            if den.norm() < 10.0 * f64::EPSILON {
                singular += 1;
                return 0.0;
            }
            (polyval(&cr, z) / den).re - order_a
        })
        .collect();

    if singular > 0 {
        log::warn!(
            "Group delay is singular at {} frequency point(s); setting delay to 0",
            singular
        );
    }
    delays
}

fn convolve(x: &[f64], y: &[f64]) -> Vec<f64> {
    let mut out = vec![0.0; x.len() + y.len() - 1];
    for (i, &xi) in x.iter().enumerate() {
        for (j, &yj) in y.iter().enumerate() {
            out[i + j] += xi * yj;
        }
    }
    out
}

/// Remove 2π jumps from a wrapped phase sequence (radians).
pub fn unwrap_phase(phase: &[f64]) -> Vec<f64> {
    let mut out = Vec::with_capacity(phase.len());
    let mut offset = 0.0;
    let mut prev: Option<f64> = None;

    for &p in phase {
        if let Some(prev) = prev {
            let delta = p - prev;
            if delta.abs() > PI {
                // Wrap delta into [-π, π), keep +π for a positive jump of exactly π
                let mut wrapped = (delta + PI).rem_euclid(2.0 * PI) - PI;
                if wrapped == -PI && delta > 0.0 {
                    wrapped = PI;
                }
                offset += wrapped - delta;
            }
        }
        out.push(p + offset);
        prev = Some(p);
    }
    out
}

pub fn magnitude_db(response: &[Complex64]) -> Vec<f64> {
    response.iter().map(|h| 20.0 * h.norm().log10()).collect()
}

pub fn phase_degrees(response: &[Complex64]) -> Vec<f64> {
    let wrapped: Vec<f64> = response.iter().map(|h| h.arg()).collect();
    unwrap_phase(&wrapped)
        .into_iter()
        .map(f64::to_degrees)
        .collect()
}

/// `magnitude_db > threshold_db` pointwise.
pub fn passband_mask(magnitude_db: &[f64], threshold_db: f64) -> Vec<bool> {
    magnitude_db.iter().map(|&m| m > threshold_db).collect()
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct DelayStats {
    pub mean: f64,
    pub min: f64,
    pub max: f64,
}

impl DelayStats {
    pub fn from_delays(delays: &[f64]) -> Option<Self> {
        if delays.is_empty() {
            return None;
        }
        let mean = delays.iter().sum::<f64>() / delays.len() as f64;
        let min = delays.iter().copied().fold(f64::INFINITY, f64::min);
        let max = delays.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        Some(Self { mean, min, max })
    }

    /// Convert from samples to microseconds.
    pub fn to_microseconds(&self, sample_rate: f64) -> Self {
        let scale = 1e6 / sample_rate;
        Self {
            mean: self.mean * scale,
            min: self.min * scale,
            max: self.max * scale,
        }
    }
}

/// Span between the first and last grid points at or below the threshold.
///
/// This is the extent of the attenuated region, not an interpolated band
/// edge: a notch gives its stopband width, a multi-lobe response gives the
/// distance between its outermost attenuated points.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct Bandwidth {
    pub lower_hz: f64,
    pub upper_hz: f64,
    pub width_hz: f64,
}

pub fn bandwidth(frequencies: &[f64], magnitude_db: &[f64], threshold_db: f64) -> Result<Bandwidth> {
    let mut below = magnitude_db
        .iter()
        .enumerate()
        .filter(|(_, m)| **m <= threshold_db)
        .map(|(i, _)| i);

    let first = below.next();
    let last = below.last();
    match (first, last) {
        (Some(first), Some(last)) => Ok(Bandwidth {
            lower_hz: frequencies[first],
            upper_hz: frequencies[last],
            width_hz: frequencies[last] - frequencies[first],
        }),
        (Some(_), None) => Err(Error::InsufficientData { found: 1 }),
        _ => Err(Error::InsufficientData { found: 0 }),
    }
}

/// Everything derived from a coefficient pair over one frequency grid.
///
/// A grid point where numerator and denominator both vanish has an
/// indeterminate response: its magnitude and phase are NaN, it belongs to
/// neither the passband nor the bandwidth set, and its group delay is 0.
/// [`FilterReport::undefined_points`] lists those points.
#[derive(Clone, Debug)]
pub struct FilterReport {
    pub sample_rate: f64,
    pub threshold_db: f64,
    pub frequencies: Vec<f64>,
    pub response: Vec<Complex64>,
    pub magnitude_db: Vec<f64>,
    pub phase_deg: Vec<f64>,
    pub group_delay: Vec<f64>,
}

/// Plain-data view of a [`FilterReport`] for serialization.
#[derive(Clone, Debug, Serialize)]
pub struct FilterSummary {
    pub sample_rate: f64,
    pub num_points: usize,
    pub threshold_db: f64,
    pub passband_points: usize,
    pub undefined_points: usize,
    pub delay_samples: Option<DelayStats>,
    pub delay_us: Option<DelayStats>,
    pub passband_delay_samples: Option<DelayStats>,
    pub passband_delay_us: Option<DelayStats>,
    pub bandwidth: Option<Bandwidth>,
}

pub fn characterize(
    coeffs: &Coefficients,
    sample_rate: f64,
    num_points: usize,
    threshold_db: f64,
) -> Result<FilterReport> {
    coeffs.validate()?;
    let frequencies = frequency_grid(sample_rate, num_points)?;

    let response = freqz(coeffs, &frequencies, sample_rate);
    let group_delay = group_delay(coeffs, &frequencies, sample_rate);
    let magnitude_db = magnitude_db(&response);
    let phase_deg = phase_degrees(&response);

    let undefined = undefined_indices(&magnitude_db);
    if let Some(&first) = undefined.first() {
        log::warn!(
            "Response is indeterminate (0/0) at {} point(s), first at {:.2} Hz; excluded from passband and bandwidth",
            undefined.len(),
            frequencies[first]
        );
    }

    log::info!(
        "Characterized {}-tap/{}-tap filter over {} points at {} Hz",
        coeffs.b.len(),
        coeffs.a.len(),
        num_points,
        sample_rate
    );

    Ok(FilterReport {
        sample_rate,
        threshold_db,
        frequencies,
        response,
        magnitude_db,
        phase_deg,
        group_delay,
    })
}

fn undefined_indices(magnitude_db: &[f64]) -> Vec<usize> {
    magnitude_db
        .iter()
        .enumerate()
        .filter(|(_, m)| m.is_nan())
        .map(|(i, _)| i)
        .collect()
}

impl FilterReport {
    /// Grid indices with an indeterminate response.
    pub fn undefined_points(&self) -> Vec<usize> {
        undefined_indices(&self.magnitude_db)
    }

    pub fn passband_mask(&self) -> Vec<bool> {
        passband_mask(&self.magnitude_db, self.threshold_db)
    }

    /// Group delay statistics over the whole grid.
    pub fn delay_stats(&self) -> DelayStats {
        // frequency_grid guarantees at least one point
        DelayStats::from_delays(&self.group_delay).unwrap_or(DelayStats {
            mean: 0.0,
            min: 0.0,
            max: 0.0,
        })
    }

    pub fn passband_delay_stats(&self) -> Result<DelayStats> {
        let delays: Vec<f64> = self
            .group_delay
            .iter()
            .zip(self.passband_mask())
            .filter(|(_, in_band)| *in_band)
            .map(|(&d, _)| d)
            .collect();
        DelayStats::from_delays(&delays).ok_or(Error::EmptyPassband)
    }

    pub fn bandwidth(&self) -> Result<Bandwidth> {
        bandwidth(&self.frequencies, &self.magnitude_db, self.threshold_db)
    }

    pub fn summary(&self) -> FilterSummary {
        let delay = self.delay_stats();
        let passband = self.passband_delay_stats().ok();
        FilterSummary {
            sample_rate: self.sample_rate,
            num_points: self.frequencies.len(),
            threshold_db: self.threshold_db,
            passband_points: self.passband_mask().iter().filter(|&&m| m).count(),
            undefined_points: self.undefined_points().len(),
            delay_samples: Some(delay),
            delay_us: Some(delay.to_microseconds(self.sample_rate)),
            passband_delay_samples: passband,
            passband_delay_us: passband.map(|d| d.to_microseconds(self.sample_rate)),
            bandwidth: self.bandwidth().ok(),
        }
    }
}
