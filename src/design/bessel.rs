/// Zeroth-order modified Bessel function of the first kind, `I0(x)`
///
/// Two-regime polynomial approximation (Abramowitz & Stegun 9.8.1 and
/// 9.8.2): a power series in `(x/3.75)^2` below `|x| = 3.75` and the
/// scaled asymptotic expansion `e^|x| / sqrt(|x|) * P(3.75/|x|)` above it.
/// Relative error stays below 2e-7 everywhere, well inside single precision.
pub fn bessel_i0(x: f64) -> f64 {
    let ax = x.abs();
    if ax < 3.75 {
        let y = (x / 3.75).powi(2);
        1.0 + y
            * (3.5156229
                + y * (3.0899424
                    + y * (1.2067492 + y * (0.2659732 + y * (0.360768e-1 + y * 0.45813e-2)))))
    } else {
        let y = 3.75 / ax;
        (ax.exp() / ax.sqrt())
            * (0.39894228
                + y * (0.1328592e-1
                    + y * (0.225319e-2
                        + y * (-0.157565e-2
                            + y * (0.916281e-2
                                + y * (-0.2057706e-1
                                    + y * (0.2635537e-1
                                        + y * (-0.1647633e-1 + y * 0.392377e-2))))))))
    }
}
