//! Parks-McClellan equiripple FIR design
//!
//! Remez exchange over a dense frequency grid. Each iteration fits the
//! alternating error `(-1)^i * delta` through the current extremal set with
//! barycentric Lagrange interpolation in `x = cos(w)`, locates the local
//! extrema of the weighted error inside every band and exchanges them in.
//! The converged cosine polynomial is sampled at Chebyshev nodes and turned
//! into symmetric taps with a type-I DCT.
//!
//! Only odd-length symmetric (type I) filters are produced.

use crate::coefficients::{FilterCoefficients, force_odd};
use crate::constants::{
    BARYCENTRIC_EPSILON, MIN_BARYCENTRIC_DENOMINATOR, REMEZ_CONVERGENCE_TOLERANCE,
    REMEZ_GRID_DENSITY, REMEZ_MAX_ITERATIONS,
};
use crate::error::{FilterError, Result};
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;
use std::ops::Range;

/// Equiripple low-pass design request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RemezSpec {
    pub sample_rate_hz: f64,
    /// Filter length (even values are bumped to the next odd value)
    pub num_taps: usize,
    pub passband_edge_hz: f64,
    pub stopband_edge_hz: f64,
    pub passband_ripple_db: f64,
    pub stopband_attenuation_db: f64,
}

impl Default for RemezSpec {
    fn default() -> Self {
        Self {
            sample_rate_hz: 48000.0,
            num_taps: 63,
            passband_edge_hz: 15000.0,
            stopband_edge_hz: 20000.0,
            passband_ripple_db: 0.1,
            stopband_attenuation_db: 60.0,
        }
    }
}

impl RemezSpec {
    /// # Errors
    /// Returns `FilterError::InvalidSpec` describing the first bad field.
    pub fn validate(&self) -> Result<()> {
        let fs = self.sample_rate_hz;
        if !(fs > 0.0 && fs.is_finite()) {
            return Err(FilterError::InvalidSpec(format!(
                "sample rate must be positive, got {}",
                fs
            )));
        }
        if self.num_taps < 3 {
            return Err(FilterError::InvalidSpec(format!(
                "equiripple design needs at least 3 taps, got {}",
                self.num_taps
            )));
        }
        let (fp, fe) = (self.passband_edge_hz, self.stopband_edge_hz);
        if !(fp >= 0.0 && fp < fe && fe <= fs / 2.0) {
            return Err(FilterError::InvalidSpec(format!(
                "band edges must satisfy 0 <= passband ({} Hz) < stopband ({} Hz) <= {} Hz",
                fp,
                fe,
                fs / 2.0
            )));
        }
        if !(self.passband_ripple_db > 0.0 && self.passband_ripple_db.is_finite()) {
            return Err(FilterError::InvalidSpec(format!(
                "passband ripple must be positive, got {} dB",
                self.passband_ripple_db
            )));
        }
        if !(self.stopband_attenuation_db > 0.0 && self.stopband_attenuation_db.is_finite()) {
            return Err(FilterError::InvalidSpec(format!(
                "stopband attenuation must be positive, got {} dB",
                self.stopband_attenuation_db
            )));
        }
        Ok(())
    }

    /// `1 - 10^(-ripple/20)`
    pub fn passband_weight(&self) -> f64 {
        1.0 - 10f64.powf(-self.passband_ripple_db / 20.0)
    }

    /// `10^(-attenuation/20)`
    pub fn stopband_weight(&self) -> f64 {
        10f64.powf(-self.stopband_attenuation_db / 20.0)
    }

    /// Pass and stop bands in cycles/sample
    pub fn bands(&self) -> [Band; 2] {
        let fs = self.sample_rate_hz;
        [
            Band {
                start: 0.0,
                end: self.passband_edge_hz / fs,
                desired: 1.0,
                weight: self.passband_weight(),
            },
            Band {
                start: self.stopband_edge_hz / fs,
                end: 0.5,
                desired: 0.0,
                weight: self.stopband_weight(),
            },
        ]
    }
}

/// One band of a piecewise-constant response, frequencies in cycles/sample
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Band {
    pub start: f64,
    pub end: f64,
    pub desired: f64,
    pub weight: f64,
}

/// Tuning knobs of the exchange loop
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RemezOptions {
    /// Dense grid points per extremal frequency
    pub grid_density: usize,
    /// Iteration budget before `DesignNonConvergence`
    pub max_iterations: usize,
}

impl Default for RemezOptions {
    fn default() -> Self {
        Self {
            grid_density: REMEZ_GRID_DENSITY,
            max_iterations: REMEZ_MAX_ITERATIONS,
        }
    }
}

/// Result of a converged equiripple design
#[derive(Debug, Clone)]
pub struct RemezDesign {
    pub coefficients: FilterCoefficients,
    /// Peak weighted error `|delta|`
    pub weighted_error: f64,
    /// Final extremal set in cycles/sample, ascending
    pub extremal_frequencies: Vec<f64>,
    pub iterations: usize,
}

impl RemezDesign {
    pub fn extremal_frequencies_hz(&self, sample_rate: f64) -> Vec<f64> {
        self.extremal_frequencies
            .iter()
            .map(|f| f * sample_rate)
            .collect()
    }
}

/// Design an equiripple low-pass with default options
pub fn design(spec: &RemezSpec) -> Result<RemezDesign> {
    design_with(spec, &RemezOptions::default())
}

/// Design an equiripple low-pass
///
/// # Errors
/// `FilterError::InvalidSpec` for a malformed spec,
/// `FilterError::DesignNonConvergence` if the exchange exceeds its budget.
pub fn design_with(spec: &RemezSpec, options: &RemezOptions) -> Result<RemezDesign> {
    spec.validate()?;
    let design = equiripple(spec.num_taps, &spec.bands(), options)?;
    log::info!(
        "Designed {}-tap equiripple low-pass in {} iterations (weighted error {:.3e})",
        design.coefficients.num_taps(),
        design.iterations,
        design.weighted_error
    );
    Ok(design)
}

/// Minimax symmetric FIR for an arbitrary set of bands
///
/// # Errors
/// `FilterError::InvalidSpec` for malformed bands or options,
/// `FilterError::DesignNonConvergence` if the extremal set does not settle.
pub fn equiripple(num_taps: usize, bands: &[Band], options: &RemezOptions) -> Result<RemezDesign> {
    validate_bands(bands)?;
    if num_taps < 3 {
        return Err(FilterError::InvalidSpec(format!(
            "equiripple design needs at least 3 taps, got {}",
            num_taps
        )));
    }
    if options.grid_density == 0 || options.max_iterations == 0 {
        return Err(FilterError::InvalidSpec(
            "grid density and iteration budget must be positive".to_string(),
        ));
    }

    let num_taps = force_odd(num_taps, "Remez design");
    // cosine terms in the amplitude response
    let r = num_taps.div_ceil(2);
    let grid = DenseGrid::new(bands, r, options.grid_density);
    if grid.len() < r + 1 {
        return Err(FilterError::InvalidSpec(format!(
            "bands too narrow: {} grid points for {} extremal frequencies",
            grid.len(),
            r + 1
        )));
    }

    let mut ext = initial_guess(r, grid.len());
    // |delta| of the last trial whose error curve had a full extremal set
    let mut weighted_error = f64::INFINITY;
    let mut iterations = 0;
    let mut converged = false;

    while iterations < options.max_iterations {
        iterations += 1;

        let interp = Interpolant::new(&ext, &grid);
        let error = grid.weighted_error(&interp);

        ext = match search_extrema(&error, &grid.segments, r + 1) {
            Some(found) => found,
            None => {
                log::debug!(
                    "Remez iteration {}: fewer than {} extrema found",
                    iterations,
                    r + 1
                );
                return Err(FilterError::DesignNonConvergence {
                    iterations,
                    weighted_error,
                });
            }
        };
        let delta = interp.delta.abs();
        if delta > 0.0 && delta.is_finite() {
            weighted_error = delta;
        }

        log::debug!("Remez iteration {}: delta={:.6e}", iterations, delta);

        if is_converged(&ext, &error) {
            converged = true;
            break;
        }
    }

    if !converged {
        return Err(FilterError::DesignNonConvergence {
            iterations,
            weighted_error,
        });
    }

    let interp = Interpolant::new(&ext, &grid);
    let taps = taps_from_interpolant(&interp, num_taps);
    log::debug!("Remez taps: {:?}", taps);

    Ok(RemezDesign {
        coefficients: FilterCoefficients::fir(taps),
        weighted_error: interp.delta.abs(),
        extremal_frequencies: ext.iter().map(|&i| grid.freq[i]).collect(),
        iterations,
    })
}

fn validate_bands(bands: &[Band]) -> Result<()> {
    if bands.is_empty() {
        return Err(FilterError::InvalidSpec("no bands given".to_string()));
    }
    let mut previous_end = 0.0;
    for (i, band) in bands.iter().enumerate() {
        if !(band.start >= previous_end && band.start <= band.end && band.end <= 0.5) {
            return Err(FilterError::InvalidSpec(format!(
                "band {} [{}, {}] must be ordered, non-overlapping and within [0, 0.5]",
                i, band.start, band.end
            )));
        }
        if !(band.weight > 0.0 && band.weight.is_finite()) || !band.desired.is_finite() {
            return Err(FilterError::InvalidSpec(format!(
                "band {} needs a finite desired gain and a positive weight",
                i
            )));
        }
        previous_end = band.end;
    }
    Ok(())
}

/// Frequencies with the desired response and weight sampled on them
struct DenseGrid {
    freq: Vec<f64>,
    desired: Vec<f64>,
    weight: Vec<f64>,
    /// Index range of each band
    segments: Vec<Range<usize>>,
}

impl DenseGrid {
    fn new(bands: &[Band], r: usize, density: usize) -> Self {
        let delf = 0.5 / (density * r) as f64;
        let mut grid = Self {
            freq: Vec::new(),
            desired: Vec::new(),
            weight: Vec::new(),
            segments: Vec::with_capacity(bands.len()),
        };

        for band in bands {
            let start = grid.freq.len();
            let points = (((band.end - band.start) / delf).round() as usize).max(1);
            for i in 0..points {
                grid.freq.push(band.start + i as f64 * delf);
                grid.desired.push(band.desired);
                grid.weight.push(band.weight);
            }
            // pin the last point to the band edge
            if let Some(last) = grid.freq.last_mut() {
                *last = band.end;
            }
            grid.segments.push(start..grid.freq.len());
        }
        grid
    }

    fn len(&self) -> usize {
        self.freq.len()
    }

    fn weighted_error(&self, interp: &Interpolant) -> Vec<f64> {
        self.freq
            .iter()
            .zip(self.desired.iter().zip(self.weight.iter()))
            .map(|(&f, (&d, &w))| w * (d - interp.eval((2.0 * PI * f).cos())))
            .collect()
    }
}

/// Spread `r + 1` extremal indices evenly over the grid
fn initial_guess(r: usize, grid_len: usize) -> Vec<usize> {
    (0..=r).map(|i| i * (grid_len - 1) / r).collect()
}

/// Barycentric form of the polynomial that alternates around the desired
/// response by `delta` on the extremal set
struct Interpolant {
    x: Vec<f64>,
    ad: Vec<f64>,
    y: Vec<f64>,
    delta: f64,
}

impl Interpolant {
    fn new(ext: &[usize], grid: &DenseGrid) -> Self {
        let x: Vec<f64> = ext
            .iter()
            .map(|&i| (2.0 * PI * grid.freq[i]).cos())
            .collect();
        let m = x.len();

        // Interleave the product in strides to keep it from under/overflowing
        let stride = m.saturating_sub(2) / 15 + 1;
        let ad: Vec<f64> = (0..m)
            .map(|i| {
                let mut denom = 1.0;
                for j in 0..stride {
                    for k in (j..m).step_by(stride) {
                        if k != i {
                            denom *= 2.0 * (x[i] - x[k]);
                        }
                    }
                }
                if denom.abs() < MIN_BARYCENTRIC_DENOMINATOR {
                    denom = MIN_BARYCENTRIC_DENOMINATOR.copysign(denom);
                }
                1.0 / denom
            })
            .collect();

        let mut numer = 0.0;
        let mut denom = 0.0;
        let mut sign = 1.0;
        for (i, &e) in ext.iter().enumerate() {
            numer += ad[i] * grid.desired[e];
            denom += sign * ad[i] / grid.weight[e];
            sign = -sign;
        }
        let delta = numer / denom;

        let mut sign = 1.0;
        let y = ext
            .iter()
            .map(|&e| {
                let value = grid.desired[e] - sign * delta / grid.weight[e];
                sign = -sign;
                value
            })
            .collect();

        Self { x, ad, y, delta }
    }

    /// Amplitude response at `xc = cos(w)`
    fn eval(&self, xc: f64) -> f64 {
        let mut numer = 0.0;
        let mut denom = 0.0;
        for ((&xi, &ai), &yi) in self.x.iter().zip(self.ad.iter()).zip(self.y.iter()) {
            let diff = xc - xi;
            if diff.abs() < BARYCENTRIC_EPSILON {
                return yi;
            }
            let c = ai / diff;
            denom += c;
            numer += c * yi;
        }
        numer / denom
    }
}

/// Locate alternating extrema of `error` band by band and thin them to `count`
fn search_extrema(error: &[f64], segments: &[Range<usize>], count: usize) -> Option<Vec<usize>> {
    let mut found = Vec::with_capacity(2 * count);

    for segment in segments {
        let (lo, hi) = (segment.start, segment.end);
        match hi - lo {
            0 => {}
            1 => {
                if error[lo] != 0.0 {
                    found.push(lo);
                }
            }
            _ => {
                let e = error;
                if (e[lo] > 0.0 && e[lo] > e[lo + 1]) || (e[lo] < 0.0 && e[lo] < e[lo + 1]) {
                    found.push(lo);
                }
                for i in lo + 1..hi - 1 {
                    if (e[i] >= e[i - 1] && e[i] > e[i + 1] && e[i] > 0.0)
                        || (e[i] <= e[i - 1] && e[i] < e[i + 1] && e[i] < 0.0)
                    {
                        found.push(i);
                    }
                }
                let last = hi - 1;
                if (e[last] > 0.0 && e[last] > e[last - 1])
                    || (e[last] < 0.0 && e[last] < e[last - 1])
                {
                    found.push(last);
                }
            }
        }
    }

    if found.len() < count {
        return None;
    }

    let magnitude = |idx: usize| error[idx].abs();
    while found.len() > count {
        let same_sign =
            (1..found.len()).find(|&j| (error[found[j]] > 0.0) == (error[found[j - 1]] > 0.0));

        let remove = if let Some(j) = same_sign {
            // smaller of a non-alternating pair
            if magnitude(found[j]) < magnitude(found[j - 1]) {
                j
            } else {
                j - 1
            }
        } else if found.len() - count == 1 {
            let last = found.len() - 1;
            if magnitude(found[last]) < magnitude(found[0]) {
                last
            } else {
                0
            }
        } else {
            (0..found.len())
                .min_by(|&a, &b| magnitude(found[a]).total_cmp(&magnitude(found[b])))
                .unwrap_or(0)
        };
        found.remove(remove);
    }

    Some(found)
}

fn is_converged(ext: &[usize], error: &[f64]) -> bool {
    let (min, max) = ext
        .iter()
        .map(|&i| error[i].abs())
        .fold((f64::INFINITY, 0.0_f64), |(lo, hi), v| (lo.min(v), hi.max(v)));
    max == 0.0 || (max - min) / max < REMEZ_CONVERGENCE_TOLERANCE
}

/// Recover symmetric taps from the converged amplitude response
///
/// `A(w) = sum_k a_k cos(k w)` for `k < r` is sampled at `w_j = pi j / L`,
/// `L = r - 1`, and the cosine coefficients are recovered with a type-I DCT.
/// Then `h[M] = a_0` and `h[M +/- k] = a_k / 2` with `M = L`.
fn taps_from_interpolant(interp: &Interpolant, num_taps: usize) -> Vec<f64> {
    let r = num_taps.div_ceil(2);
    let l = r - 1;
    let lf = l as f64;

    let samples: Vec<f64> = (0..=l)
        .map(|j| interp.eval((PI * j as f64 / lf).cos()))
        .collect();

    let cosine_coeffs: Vec<f64> = (0..=l)
        .map(|k| {
            let sum: f64 = samples
                .iter()
                .enumerate()
                .map(|(j, &c)| {
                    let edge = if j == 0 || j == l { 0.5 } else { 1.0 };
                    edge * c * (PI * (j * k) as f64 / lf).cos()
                })
                .sum();
            let scale = if k == 0 || k == l { 1.0 } else { 2.0 };
            scale * sum / lf
        })
        .collect();

    let mut taps = vec![0.0; num_taps];
    taps[l] = cosine_coeffs[0];
    for k in 1..=l {
        let half = cosine_coeffs[k] / 2.0;
        taps[l - k] = half;
        taps[l + k] = half;
    }
    taps
}
