use crate::coefficients::FilterCoefficients;
use crate::constants::MIN_MAGNITUDE;
use crate::error::{FilterError, Result};
use num_complex::Complex64;
use serde::Serialize;
use std::f64::consts::PI;

/// Transfer function sampled on the upper half of the unit circle
///
/// `w` holds angular frequencies in radians/sample, ascending from 0
/// towards pi; `h` holds the complex response at each of them.
#[derive(Debug, Clone)]
pub struct FrequencyResponse {
    w: Vec<f64>,
    h: Vec<Complex64>,
}

/// One row of verification output
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ResponsePoint {
    pub frequency_hz: f64,
    pub magnitude_db: f64,
    pub phase_rad: f64,
}

impl FrequencyResponse {
    pub fn w(&self) -> &[f64] {
        &self.w
    }

    pub fn h(&self) -> &[Complex64] {
        &self.h
    }

    pub fn len(&self) -> usize {
        self.w.len()
    }

    pub fn is_empty(&self) -> bool {
        self.w.is_empty()
    }

    pub fn magnitude(&self) -> Vec<f64> {
        self.h.iter().map(|h| h.norm()).collect()
    }

    /// `20 log10 |h|`, floored at the dB value of `MIN_MAGNITUDE`
    pub fn magnitude_db(&self) -> Vec<f64> {
        self.h.iter().map(|h| magnitude_to_db(h.norm())).collect()
    }

    pub fn phase(&self) -> Vec<f64> {
        self.h.iter().map(|h| h.arg()).collect()
    }

    /// Convert `w` to Hz for a given sample rate
    pub fn frequencies_hz(&self, sample_rate: f64) -> Vec<f64> {
        self.w
            .iter()
            .map(|w| w * sample_rate / (2.0 * PI))
            .collect()
    }

    pub fn points(&self, sample_rate: f64) -> Vec<ResponsePoint> {
        self.w
            .iter()
            .zip(self.h.iter())
            .map(|(&w, h)| ResponsePoint {
                frequency_hz: w * sample_rate / (2.0 * PI),
                magnitude_db: magnitude_to_db(h.norm()),
                phase_rad: h.arg(),
            })
            .collect()
    }
}

pub fn magnitude_to_db(magnitude: f64) -> f64 {
    20.0 * magnitude.max(MIN_MAGNITUDE).log10()
}

/// Evaluate `H(e^jw)` at `wor_n` evenly spaced points `w_i = i*pi/wor_n`
///
/// # Errors
/// Returns `FilterError::InvalidSpec` if `wor_n` is zero.
pub fn freqz(coeffs: &FilterCoefficients, wor_n: usize) -> Result<FrequencyResponse> {
    freqz_raw(coeffs.b(), coeffs.a(), wor_n)
}

/// [`freqz`] over bare polynomials
///
/// # Errors
/// Returns `FilterError::InvalidSpec` if `wor_n` is zero or either
/// polynomial is empty.
pub fn freqz_raw(b: &[f64], a: &[f64], wor_n: usize) -> Result<FrequencyResponse> {
    if wor_n == 0 {
        return Err(FilterError::InvalidSpec(
            "frequency response needs at least one point".to_string(),
        ));
    }
    if b.is_empty() || a.is_empty() {
        return Err(FilterError::InvalidSpec(
            "numerator and denominator must be non-empty".to_string(),
        ));
    }

    let w: Vec<f64> = (0..wor_n).map(|i| i as f64 * PI / wor_n as f64).collect();
    let h = w.iter().map(|&omega| evaluate(b, a, omega)).collect();

    Ok(FrequencyResponse { w, h })
}

/// Complex response at a single angular frequency (radians/sample)
pub fn response_at(coeffs: &FilterCoefficients, omega: f64) -> Complex64 {
    evaluate(coeffs.b(), coeffs.a(), omega)
}

fn evaluate(b: &[f64], a: &[f64], omega: f64) -> Complex64 {
    // Horner in z^-1 = e^{-jw}
    let z_inv = Complex64::from_polar(1.0, -omega);
    let poly = |coeffs: &[f64]| {
        coeffs
            .iter()
            .rev()
            .fold(Complex64::new(0.0, 0.0), |acc, &c| acc * z_inv + c)
    };
    poly(b) / poly(a)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_identity_filter_is_flat() {
        let response = freqz_raw(&[1.0], &[1.0], 512).unwrap();
        assert_eq!(response.len(), 512);
        for m in response.magnitude() {
            assert_abs_diff_eq!(m, 1.0, epsilon = 1e-15);
        }
        for p in response.phase() {
            assert_abs_diff_eq!(p, 0.0, epsilon = 1e-15);
        }
    }

    #[test]
    fn test_grid_spacing() {
        let response = freqz_raw(&[1.0], &[1.0], 4).unwrap();
        assert_eq!(response.w(), &[0.0, PI / 4.0, PI / 2.0, 3.0 * PI / 4.0]);
        for (f, expected) in response
            .frequencies_hz(8000.0)
            .iter()
            .zip([0.0, 1000.0, 2000.0, 3000.0])
        {
            assert_abs_diff_eq!(*f, expected, epsilon = 1e-9);
        }
    }

    #[test]
    fn test_two_tap_average() {
        // H = (1 + z^-1)/2, |H| = |cos(w/2)|
        let coeffs = FilterCoefficients::fir(vec![0.5, 0.5]);
        let response = freqz(&coeffs, 64).unwrap();
        for (w, m) in response.w().iter().zip(response.magnitude()) {
            assert_abs_diff_eq!(m, (w / 2.0).cos().abs(), epsilon = 1e-12);
        }
        assert_abs_diff_eq!(response_at(&coeffs, PI).norm(), 0.0, epsilon = 1e-15);
    }

    #[test]
    fn test_one_pole_iir() {
        // H = 1 / (1 - 0.5 z^-1), |H(1)| = 2
        let coeffs = FilterCoefficients::iir(vec![1.0], vec![1.0, -0.5]).unwrap();
        assert_abs_diff_eq!(response_at(&coeffs, 0.0).re, 2.0, epsilon = 1e-12);
        assert_abs_diff_eq!(response_at(&coeffs, PI).re, 2.0 / 3.0, epsilon = 1e-12);
    }

    #[test]
    fn test_db_floor() {
        assert_abs_diff_eq!(magnitude_to_db(0.0), -400.0, epsilon = 1e-9);
        assert_abs_diff_eq!(magnitude_to_db(0.1), -20.0, epsilon = 1e-12);
    }

    #[test]
    fn test_points_in_hz() {
        let coeffs = FilterCoefficients::fir(vec![1.0]);
        let points = freqz(&coeffs, 2).unwrap().points(48000.0);
        assert_eq!(points.len(), 2);
        assert_abs_diff_eq!(points[1].frequency_hz, 12000.0, epsilon = 1e-9);
        assert_abs_diff_eq!(points[1].magnitude_db, 0.0, epsilon = 1e-12);
    }

    #[test]
    fn test_rejects_zero_points() {
        assert!(freqz_raw(&[1.0], &[1.0], 0).is_err());
        assert!(freqz_raw(&[], &[1.0], 8).is_err());
    }
}
