use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Notch section deployed on the recording hardware (≈60 Hz at 32 kHz).
pub const NOTCH_B: [f64; 3] = [0.99901921, -1.99790074, 0.99901921];
pub const NOTCH_A: [f64; 3] = [1.0, -1.99790074, 0.99803843];

/// Rational transfer function `B(z) / A(z)` in powers of `z^-1`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Coefficients {
    /// Numerator
    pub b: Vec<f64>,
    /// Denominator; `a[0]` is usually 1.0
    pub a: Vec<f64>,
}

impl Coefficients {
    pub fn new(b: Vec<f64>, a: Vec<f64>) -> Result<Self> {
        let coeffs = Self { b, a };
        coeffs.validate()?;
        Ok(coeffs)
    }

    pub fn notch() -> Self {
        Self {
            b: NOTCH_B.to_vec(),
            a: NOTCH_A.to_vec(),
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.b.is_empty() || self.a.is_empty() {
            return Err(Error::InvalidCoefficients(
                "numerator and denominator must be non-empty".into(),
            ));
        }
        if self.b.iter().chain(&self.a).any(|c| !c.is_finite()) {
            return Err(Error::InvalidCoefficients(
                "coefficients must be finite".into(),
            ));
        }
        if self.a[0] == 0.0 {
            return Err(Error::InvalidCoefficients("a[0] must be non-zero".into()));
        }
        Ok(())
    }

    /// Response at DC: `sum(b) / sum(a)`.
    pub fn dc_gain(&self) -> f64 {
        self.b.iter().sum::<f64>() / self.a.iter().sum::<f64>()
    }
}

impl Default for Coefficients {
    fn default() -> Self {
        Self::notch()
    }
}
