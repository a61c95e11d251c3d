use crate::error::{FilterError, Result};

/// Rational transfer function coefficients `H(z) = B(z) / A(z)`
///
/// FIR filters carry `a == [1.0]`. IIR filters are normalised on
/// construction so that `a[0] == 1.0`. Once built the coefficients are
/// immutable; consumers only borrow them.
#[derive(Debug, Clone, PartialEq)]
pub struct FilterCoefficients {
    b: Vec<f64>,
    a: Vec<f64>,
}

impl FilterCoefficients {
    /// Wrap FIR taps (`a = [1]`)
    pub fn fir(taps: Vec<f64>) -> Self {
        Self {
            b: taps,
            a: vec![1.0],
        }
    }

    /// Build an IIR transfer function, normalising so `a[0] == 1`
    ///
    /// # Errors
    /// Returns `FilterError::InvalidSpec` if either polynomial is empty or
    /// the leading denominator coefficient is zero.
    pub fn iir(b: Vec<f64>, a: Vec<f64>) -> Result<Self> {
        if b.is_empty() || a.is_empty() {
            return Err(FilterError::InvalidSpec(
                "numerator and denominator must be non-empty".to_string(),
            ));
        }
        let a0 = a[0];
        if a0 == 0.0 || !a0.is_finite() {
            return Err(FilterError::InvalidSpec(format!(
                "leading denominator coefficient must be finite and non-zero, got {}",
                a0
            )));
        }

        Ok(Self {
            b: b.into_iter().map(|c| c / a0).collect(),
            a: a.into_iter().map(|c| c / a0).collect(),
        })
    }

    /// Numerator taps
    pub fn b(&self) -> &[f64] {
        &self.b
    }

    /// Denominator taps (`[1.0]` for FIR)
    pub fn a(&self) -> &[f64] {
        &self.a
    }

    pub fn is_fir(&self) -> bool {
        self.a.len() == 1
    }

    /// Get the number of numerator taps
    pub fn num_taps(&self) -> usize {
        self.b.len()
    }

    /// Get the group delay in samples (half the filter length for linear phase)
    pub fn group_delay_samples(&self) -> usize {
        self.b.len().saturating_sub(1) / 2
    }

    /// Check `b[k] == b[N-1-k]` within `tolerance`
    pub fn is_symmetric(&self, tolerance: f64) -> bool {
        is_symmetric(&self.b, tolerance)
    }

    /// Causal half of the numerator, starting at index `N/2`
    pub fn right_half(&self) -> &[f64] {
        &self.b[self.b.len() / 2..]
    }
}

pub(crate) fn is_symmetric(taps: &[f64], tolerance: f64) -> bool {
    let n = taps.len();
    (0..n / 2).all(|k| (taps[k] - taps[n - 1 - k]).abs() <= tolerance)
}

/// Bump an even tap count to the next odd value
pub(crate) fn force_odd(num_taps: usize, designer: &str) -> usize {
    if num_taps.is_multiple_of(2) {
        log::warn!(
            "{} requested {} taps; using {} for a centre-symmetric response",
            designer,
            num_taps,
            num_taps + 1
        );
        num_taps + 1
    } else {
        num_taps
    }
}
