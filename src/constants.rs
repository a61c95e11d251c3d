//! Numeric constants for filter design stability
//!
//! These constants define grid densities, iteration budgets and epsilon
//! values used by the designers and the response evaluator.

/// Dense grid points per extremal frequency in the Remez exchange.
pub const REMEZ_GRID_DENSITY: usize = 16;

/// Exchange iterations allowed before a design is reported as non-converged.
pub const REMEZ_MAX_ITERATIONS: usize = 40;

/// Relative spread of |E| across the extremal set below which the exchange
/// is considered converged.
pub const REMEZ_CONVERGENCE_TOLERANCE: f64 = 1e-4;

/// Distance in cosine space below which a point is treated as coinciding
/// with an interpolation node.
pub const BARYCENTRIC_EPSILON: f64 = 1e-7;

/// Smallest magnitude allowed for a barycentric weight denominator.
pub const MIN_BARYCENTRIC_DENOMINATOR: f64 = 1e-5;

/// Smallest linear magnitude converted to dB. Exact zeros (e.g. a high-pass
/// zero at DC) report this floor instead of negative infinity.
pub const MIN_MAGNITUDE: f64 = 1e-20;

/// Empirical divisor in the stopband-attenuation tap estimate.
pub const TAP_ESTIMATE_DIVISOR: f64 = 22.0;

/// Default number of frequency points for verification.
pub const DEFAULT_RESPONSE_POINTS: usize = 8192;
