use super::frequency_response::FrequencyResponse;
use crate::error::{FilterError, Result};
use rolling_stats::Stats;
use serde::{Deserialize, Serialize};

/// Frequency range in Hz, inclusive at both ends
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BandRange {
    pub start_hz: f64,
    pub end_hz: f64,
}

impl BandRange {
    pub fn new(start_hz: f64, end_hz: f64) -> Self {
        Self { start_hz, end_hz }
    }

    fn contains(&self, f: f64) -> bool {
        f >= self.start_hz && f <= self.end_hz
    }
}

/// What a finished filter is checked against
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VerificationTargets {
    pub sample_rate_hz: f64,
    pub passband: BandRange,
    pub stopband: BandRange,
    /// Largest allowed peak-to-peak passband variation
    #[serde(default)]
    pub max_passband_ripple_db: Option<f64>,
    #[serde(default)]
    pub min_stopband_attenuation_db: Option<f64>,
}

impl VerificationTargets {
    pub fn lowpass(sample_rate_hz: f64, passband_edge_hz: f64, stopband_edge_hz: f64) -> Self {
        Self {
            sample_rate_hz,
            passband: BandRange::new(0.0, passband_edge_hz),
            stopband: BandRange::new(stopband_edge_hz, sample_rate_hz / 2.0),
            max_passband_ripple_db: None,
            min_stopband_attenuation_db: None,
        }
    }

    pub fn highpass(sample_rate_hz: f64, stopband_edge_hz: f64, passband_edge_hz: f64) -> Self {
        Self {
            sample_rate_hz,
            passband: BandRange::new(passband_edge_hz, sample_rate_hz / 2.0),
            stopband: BandRange::new(0.0, stopband_edge_hz),
            max_passband_ripple_db: None,
            min_stopband_attenuation_db: None,
        }
    }

    pub fn with_ripple(mut self, ripple_db: f64) -> Self {
        self.max_passband_ripple_db = Some(ripple_db);
        self
    }

    pub fn with_attenuation(mut self, attenuation_db: f64) -> Self {
        self.min_stopband_attenuation_db = Some(attenuation_db);
        self
    }
}

/// Magnitude statistics over one band, in dB
#[derive(Debug, Clone, Serialize)]
pub struct BandStats {
    pub count: usize,
    pub mean_db: f64,
    pub std_dev_db: f64,
    pub min_db: f64,
    pub max_db: f64,
}

impl BandStats {
    fn from_stats(stats: &Stats<f64>) -> Option<Self> {
        if stats.count == 0 {
            return None;
        }
        Some(Self {
            count: stats.count,
            mean_db: stats.mean,
            std_dev_db: stats.std_dev,
            min_db: stats.min,
            max_db: stats.max,
        })
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct VerificationReport {
    pub passband: BandStats,
    pub stopband: BandStats,
    /// Peak-to-peak passband variation
    pub passband_ripple_db: f64,
    /// Negated peak stopband magnitude
    pub stopband_attenuation_db: f64,
    pub passed: bool,
}

/// Summarise a response against pass/stop band targets
///
/// # Errors
/// Returns `FilterError::InvalidSpec` if either band contains no
/// evaluated frequency.
pub fn verify(
    response: &FrequencyResponse,
    targets: &VerificationTargets,
) -> Result<VerificationReport> {
    let mut pass = Stats::<f64>::new();
    let mut stop = Stats::<f64>::new();

    let frequencies = response.frequencies_hz(targets.sample_rate_hz);
    for (f, db) in frequencies.into_iter().zip(response.magnitude_db()) {
        if targets.passband.contains(f) {
            pass.update(db);
        }
        if targets.stopband.contains(f) {
            stop.update(db);
        }
    }

    let passband = BandStats::from_stats(&pass).ok_or_else(|| {
        FilterError::InvalidSpec("no response points fall inside the passband".to_string())
    })?;
    let stopband = BandStats::from_stats(&stop).ok_or_else(|| {
        FilterError::InvalidSpec("no response points fall inside the stopband".to_string())
    })?;

    let passband_ripple_db = passband.max_db - passband.min_db;
    let stopband_attenuation_db = -stopband.max_db;

    let ripple_ok = targets
        .max_passband_ripple_db
        .is_none_or(|limit| passband_ripple_db <= limit);
    let attenuation_ok = targets
        .min_stopband_attenuation_db
        .is_none_or(|limit| stopband_attenuation_db >= limit);

    log::debug!(
        "Verification: ripple {:.4} dB, attenuation {:.2} dB",
        passband_ripple_db,
        stopband_attenuation_db
    );

    Ok(VerificationReport {
        passband,
        stopband,
        passband_ripple_db,
        stopband_attenuation_db,
        passed: ripple_ok && attenuation_ok,
    })
}
