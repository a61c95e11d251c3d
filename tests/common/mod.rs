#![allow(dead_code)]

use filterkit::FilterCoefficients;
use filterkit::analysis::{magnitude_to_db, response_at};
use filterkit::design::RemezSpec;
use std::f64::consts::PI;

/// Response magnitude in dB at `freq_hz`
pub fn magnitude_db_at(coeffs: &FilterCoefficients, freq_hz: f64, sample_rate: f64) -> f64 {
    magnitude_to_db(response_at(coeffs, 2.0 * PI * freq_hz / sample_rate).norm())
}

/// Largest magnitude in dB over `[start_hz, end_hz]`, sampled at `points + 1` frequencies
pub fn band_max_db(
    coeffs: &FilterCoefficients,
    start_hz: f64,
    end_hz: f64,
    sample_rate: f64,
    points: usize,
) -> f64 {
    (0..=points)
        .map(|i| start_hz + (end_hz - start_hz) * i as f64 / points as f64)
        .map(|f| magnitude_db_at(coeffs, f, sample_rate))
        .fold(f64::NEG_INFINITY, f64::max)
}

pub fn remez_lowpass(num_taps: usize) -> RemezSpec {
    RemezSpec {
        sample_rate_hz: 48000.0,
        num_taps,
        passband_edge_hz: 9600.0,
        stopband_edge_hz: 14400.0,
        passband_ripple_db: 1.0,
        stopband_attenuation_db: 40.0,
    }
}
