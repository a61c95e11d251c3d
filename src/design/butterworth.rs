use crate::coefficients::FilterCoefficients;
use crate::error::{FilterError, Result};
use clap::ValueEnum;
use num_complex::Complex64;
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum FilterKind {
    #[default]
    HighPass,
    LowPass,
}

/// Digital Butterworth design request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ButterworthSpec {
    pub order: usize,
    /// -3 dB frequency in Hz
    pub cutoff_hz: f64,
    pub sample_rate_hz: f64,
    #[serde(default)]
    pub kind: FilterKind,
}

impl Default for ButterworthSpec {
    fn default() -> Self {
        Self {
            order: 2,
            cutoff_hz: 2000.0,
            sample_rate_hz: 48000.0,
            kind: FilterKind::HighPass,
        }
    }
}

impl ButterworthSpec {
    /// Cutoff as a fraction of Nyquist
    pub fn normalized_cutoff(&self) -> f64 {
        self.cutoff_hz / (self.sample_rate_hz / 2.0)
    }

    /// # Errors
    /// Returns `FilterError::InvalidSpec` for a zero order or a cutoff
    /// outside `(0, Nyquist)`.
    pub fn validate(&self) -> Result<()> {
        if self.order == 0 {
            return Err(FilterError::InvalidSpec(
                "Butterworth order must be positive".to_string(),
            ));
        }
        if !(self.sample_rate_hz > 0.0 && self.sample_rate_hz.is_finite()) {
            return Err(FilterError::InvalidSpec(format!(
                "sample rate must be positive, got {}",
                self.sample_rate_hz
            )));
        }
        let wc = self.normalized_cutoff();
        if !(wc > 0.0 && wc < 1.0) {
            return Err(FilterError::InvalidSpec(format!(
                "cutoff {} Hz must lie strictly between 0 and Nyquist ({} Hz)",
                self.cutoff_hz,
                self.sample_rate_hz / 2.0
            )));
        }
        Ok(())
    }
}

#[derive(Debug, Clone)]
pub struct ButterworthDesign {
    pub coefficients: FilterCoefficients,
    /// z-plane poles
    pub poles: Vec<Complex64>,
}

impl ButterworthDesign {
    pub fn is_stable(&self) -> bool {
        self.poles.iter().all(|p| p.norm() < 1.0)
    }
}

/// Design a digital Butterworth filter via the bilinear transform
///
/// Analog prototype poles `exp(j*pi*(2k + n - 1) / (2n))`, `k = 1..=n`, are
/// scaled by the pre-warped cutoff (`p -> warp / p` for high-pass), mapped
/// with `z = (1 + p/2) / (1 - p/2)` and expanded into polynomials. All `n`
/// zeros sit at `z = 1` (high-pass) or `z = -1` (low-pass). The gain is set
/// for unity response at Nyquist (high-pass) or DC (low-pass).
///
/// # Errors
/// Returns `FilterError::InvalidSpec` if the spec does not validate.
pub fn design(spec: &ButterworthSpec) -> Result<ButterworthDesign> {
    spec.validate()?;

    let n = spec.order;
    let warp = 2.0 * (spec.normalized_cutoff() * PI / 2.0).tan();

    let poles: Vec<Complex64> = (1..=n)
        .map(|k| {
            let theta = PI * (2 * k + n - 1) as f64 / (2 * n) as f64;
            let analog = Complex64::from_polar(1.0, theta);
            let scaled = match spec.kind {
                FilterKind::HighPass => warp / analog,
                FilterKind::LowPass => warp * analog,
            };
            (1.0 + scaled / 2.0) / (1.0 - scaled / 2.0)
        })
        .collect();

    let zero = match spec.kind {
        FilterKind::HighPass => Complex64::new(1.0, 0.0),
        FilterKind::LowPass => Complex64::new(-1.0, 0.0),
    };

    let mut b = real_poly(&vec![zero; n]);
    let a = real_poly(&poles);

    let gain = match spec.kind {
        FilterKind::HighPass => alternating_sum(&a) / alternating_sum(&b),
        FilterKind::LowPass => a.iter().sum::<f64>() / b.iter().sum::<f64>(),
    };
    for coeff in &mut b {
        *coeff *= gain;
    }

    log::debug!("Butterworth b={:?} a={:?}", b, a);
    log::info!(
        "Designed order-{} Butterworth {:?} at {} Hz (fs {} Hz)",
        n,
        spec.kind,
        spec.cutoff_hz,
        spec.sample_rate_hz
    );

    Ok(ButterworthDesign {
        coefficients: FilterCoefficients::iir(b, a)?,
        poles,
    })
}

/// Convenience wrapper returning only `(b, a)`
pub fn coefficients(spec: &ButterworthSpec) -> Result<FilterCoefficients> {
    design(spec).map(|d| d.coefficients)
}

/// Expand `prod (1 - r z^-1)` and keep the real parts
fn real_poly(roots: &[Complex64]) -> Vec<f64> {
    let mut poly = vec![Complex64::new(1.0, 0.0)];
    for &root in roots {
        let mut next = poly.clone();
        next.push(Complex64::new(0.0, 0.0));
        for i in 1..next.len() {
            next[i] -= root * poly[i - 1];
        }
        poly = next;
    }
    poly.into_iter().map(|c| c.re).collect()
}

fn alternating_sum(coeffs: &[f64]) -> f64 {
    coeffs
        .iter()
        .enumerate()
        .map(|(i, c)| if i % 2 == 0 { *c } else { -*c })
        .sum()
}
