use crate::coefficients::{FilterCoefficients, force_odd};
use crate::design::bessel_i0;
use crate::error::{FilterError, Result};
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

/// How the normalised cutoff of a Kaiser design is derived
///
/// Both conventions yield a fraction of Nyquist that is then divided by the
/// oversampling factor (samples per zero crossing).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum KaiserCutoff {
    /// `1/n - (transition_band_hz / denominator_freq_hz) / n`
    TransitionBand {
        transition_band_hz: f64,
        denominator_freq_hz: f64,
    },
    /// `(cutoff_hz / (denominator_freq_hz / 2)) / n`
    Cutoff {
        cutoff_hz: f64,
        denominator_freq_hz: f64,
    },
}

/// Windowed-sinc low-pass design request for an oversampled kernel
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KaiserSpec {
    /// Oversampling factor `n` (taps between adjacent sinc zero crossings)
    pub samples_per_zero_crossing: u32,
    /// Zero crossings `nz` on each side of the centre tap
    pub zero_crossing_count: u32,
    /// Desired stopband attenuation in dB
    pub stopband_attenuation_db: f64,
    pub cutoff: KaiserCutoff,
    /// Rescale taps to sum to 1
    #[serde(default)]
    pub unity_dc_gain: bool,
}

impl Default for KaiserSpec {
    fn default() -> Self {
        Self {
            samples_per_zero_crossing: 32,
            zero_crossing_count: 16,
            stopband_attenuation_db: 80.0,
            cutoff: KaiserCutoff::TransitionBand {
                transition_band_hz: 2000.0,
                denominator_freq_hz: 48000.0,
            },
            unity_dc_gain: false,
        }
    }
}

impl KaiserSpec {
    /// Check every field before any tap is computed
    ///
    /// # Errors
    /// Returns `FilterError::InvalidSpec` describing the first bad field.
    pub fn validate(&self) -> Result<()> {
        if self.samples_per_zero_crossing == 0 {
            return Err(FilterError::InvalidSpec(
                "samples per zero crossing must be positive".to_string(),
            ));
        }
        if !(self.stopband_attenuation_db > 0.0 && self.stopband_attenuation_db.is_finite()) {
            return Err(FilterError::InvalidSpec(format!(
                "stopband attenuation must be positive, got {} dB",
                self.stopband_attenuation_db
            )));
        }
        // I0(beta) normalises the window and must stay representable
        if !bessel_i0(kaiser_beta(self.stopband_attenuation_db)).is_finite() {
            return Err(FilterError::InvalidSpec(format!(
                "stopband attenuation {} dB gives a Kaiser window that overflows",
                self.stopband_attenuation_db
            )));
        }

        match self.cutoff {
            KaiserCutoff::TransitionBand {
                transition_band_hz,
                denominator_freq_hz,
            } => {
                if !(denominator_freq_hz > 0.0) {
                    return Err(FilterError::InvalidSpec(format!(
                        "denominator frequency must be positive, got {} Hz",
                        denominator_freq_hz
                    )));
                }
                if !(0.0..denominator_freq_hz).contains(&transition_band_hz) {
                    return Err(FilterError::InvalidSpec(format!(
                        "transition band {} Hz must lie in [0, {}) Hz",
                        transition_band_hz, denominator_freq_hz
                    )));
                }
            }
            KaiserCutoff::Cutoff {
                cutoff_hz,
                denominator_freq_hz,
            } => {
                if !(denominator_freq_hz > 0.0) {
                    return Err(FilterError::InvalidSpec(format!(
                        "denominator frequency must be positive, got {} Hz",
                        denominator_freq_hz
                    )));
                }
                if !(cutoff_hz > 0.0 && cutoff_hz <= denominator_freq_hz / 2.0) {
                    return Err(FilterError::InvalidSpec(format!(
                        "cutoff {} Hz must lie in (0, {}] Hz",
                        cutoff_hz,
                        denominator_freq_hz / 2.0
                    )));
                }
            }
        }

        Ok(())
    }

    /// Cutoff as a fraction of Nyquist, already divided by `n`
    pub fn normalized_cutoff(&self) -> f64 {
        let n = f64::from(self.samples_per_zero_crossing);
        match self.cutoff {
            KaiserCutoff::TransitionBand {
                transition_band_hz,
                denominator_freq_hz,
            } => 1.0 / n - (transition_band_hz / denominator_freq_hz) / n,
            KaiserCutoff::Cutoff {
                cutoff_hz,
                denominator_freq_hz,
            } => (cutoff_hz / (denominator_freq_hz / 2.0)) / n,
        }
    }

    /// Rate the oversampled kernel runs at, `denominator_freq_hz * n`
    pub fn oversampled_rate_hz(&self) -> f64 {
        let denominator = match self.cutoff {
            KaiserCutoff::TransitionBand {
                denominator_freq_hz,
                ..
            }
            | KaiserCutoff::Cutoff {
                denominator_freq_hz,
                ..
            } => denominator_freq_hz,
        };
        denominator * f64::from(self.samples_per_zero_crossing)
    }

    /// `n * (2*nz + 1)`, bumped to the next odd value
    pub fn num_taps(&self) -> usize {
        let n = self.samples_per_zero_crossing as usize;
        let nz = self.zero_crossing_count as usize;
        force_odd(n * (2 * nz + 1), "Kaiser design")
    }
}

/// Kaiser shape parameter for a stopband attenuation in dB
pub fn kaiser_beta(stopband_attenuation_db: f64) -> f64 {
    let sba = stopband_attenuation_db;
    if sba > 50.0 {
        0.1102 * (sba - 8.7)
    } else if sba >= 21.0 {
        0.5842 * (sba - 21.0).powf(0.4) + 0.07886 * (sba - 21.0)
    } else {
        0.0
    }
}

/// Normalised sinc, `sin(pi x) / (pi x)` with `sinc(0) = 1`
pub fn sinc(x: f64) -> f64 {
    if x == 0.0 {
        1.0
    } else {
        let px = PI * x;
        px.sin() / px
    }
}

/// Kaiser window of length `num_taps`
///
/// Only the left half is evaluated; the right half is mirrored so the
/// window is exactly symmetric.
pub fn kaiser_window(num_taps: usize, beta: f64) -> Vec<f64> {
    if num_taps == 0 {
        return Vec::new();
    }
    if num_taps == 1 {
        return vec![1.0];
    }

    let half_span = (num_taps - 1) as f64 / 2.0;
    let denom = bessel_i0(beta);
    let mut window = vec![0.0; num_taps];
    for k in 0..num_taps.div_ceil(2) {
        let ratio = (k as f64 - half_span) / half_span;
        let arg = beta * (1.0 - ratio * ratio).max(0.0).sqrt();
        let value = bessel_i0(arg) / denom;
        window[k] = value;
        window[num_taps - 1 - k] = value;
    }
    window
}

/// Design a linear-phase windowed-sinc low-pass FIR
///
/// # Errors
/// Returns `FilterError::InvalidSpec` if the spec fails validation or the
/// derived cutoff is not inside `(0, 1]` of Nyquist.
pub fn design(spec: &KaiserSpec) -> Result<FilterCoefficients> {
    spec.validate()?;

    let cutoff = spec.normalized_cutoff();
    if !(cutoff > 0.0 && cutoff <= 1.0) {
        return Err(FilterError::InvalidSpec(format!(
            "normalised cutoff {} is outside (0, 1]",
            cutoff
        )));
    }

    let num_taps = spec.num_taps();
    let beta = kaiser_beta(spec.stopband_attenuation_db);
    log::debug!(
        "Kaiser design: taps={}, beta={:.4}, cutoff={:.6} of Nyquist",
        num_taps,
        beta,
        cutoff
    );

    // cycles/sample
    let fc = cutoff / 2.0;
    let half_span = (num_taps - 1) as f64 / 2.0;
    let window = kaiser_window(num_taps, beta);

    let mut taps = vec![0.0; num_taps];
    for k in 0..num_taps.div_ceil(2) {
        let ideal = 2.0 * fc * sinc(2.0 * fc * (k as f64 - half_span));
        let value = ideal * window[k];
        taps[k] = value;
        taps[num_taps - 1 - k] = value;
    }

    if let Some(k) = taps.iter().position(|t| !t.is_finite()) {
        return Err(FilterError::InvalidSpec(format!(
            "tap {} is not finite for beta {}",
            k, beta
        )));
    }

    if spec.unity_dc_gain {
        let sum: f64 = taps.iter().sum();
        if sum.abs() > f64::EPSILON {
            taps.iter_mut().for_each(|t| *t /= sum);
        }
    }

    log::info!(
        "Designed {}-tap Kaiser low-pass ({} dB stopband)",
        num_taps,
        spec.stopband_attenuation_db
    );

    Ok(FilterCoefficients::fir(taps))
}
