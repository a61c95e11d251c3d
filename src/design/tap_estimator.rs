use crate::constants::TAP_ESTIMATE_DIVISOR;
use crate::error::{FilterError, Result};

/// Estimate the FIR length needed for a given stopband attenuation
///
/// Rule of thumb `N = dB * Fs / (22 * (f2 - f1))`. The result is not an
/// integer; use [`estimated_tap_count`] to get a usable odd length.
///
/// # Arguments
/// * `sample_rate` - Source sample rate in Hz
/// * `passband_hz` - Passband cutoff `f1` in Hz
/// * `stopband_hz` - Stopband edge `f2` in Hz
/// * `attenuation_db` - Desired stopband attenuation in dB
///
/// # Errors
/// Returns `FilterError::InvalidSpec` if the transition width is not
/// positive, or if the rate or attenuation is not positive.
pub fn estimate_taps(
    sample_rate: f64,
    passband_hz: f64,
    stopband_hz: f64,
    attenuation_db: f64,
) -> Result<f64> {
    if !(sample_rate > 0.0) {
        return Err(FilterError::InvalidSpec(format!(
            "sample rate must be positive, got {}",
            sample_rate
        )));
    }
    if !(stopband_hz > passband_hz) {
        return Err(FilterError::InvalidSpec(format!(
            "stopband edge ({} Hz) must be above passband cutoff ({} Hz)",
            stopband_hz, passband_hz
        )));
    }
    if !(attenuation_db > 0.0) {
        return Err(FilterError::InvalidSpec(format!(
            "stopband attenuation must be positive, got {} dB",
            attenuation_db
        )));
    }

    Ok((attenuation_db * sample_rate) / (TAP_ESTIMATE_DIVISOR * (stopband_hz - passband_hz)))
}

/// Round an estimate up to the next odd tap count
pub fn estimated_tap_count(
    sample_rate: f64,
    passband_hz: f64,
    stopband_hz: f64,
    attenuation_db: f64,
) -> Result<usize> {
    let estimate = estimate_taps(sample_rate, passband_hz, stopband_hz, attenuation_db)?;
    let taps = (estimate.ceil() as usize).max(1);
    Ok(if taps.is_multiple_of(2) { taps + 1 } else { taps })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_estimate_formula() {
        let n = estimate_taps(48000.0, 15000.0, 20000.0, 40.0).unwrap();
        assert_relative_eq!(n, 1_920_000.0 / 110_000.0, max_relative = 1e-12);

        let n = estimate_taps(480000.0, 15000.0, 20000.0, 40.0).unwrap();
        assert_relative_eq!(n, 174.545454, max_relative = 1e-6);
    }

    #[test]
    fn test_estimated_tap_count_is_odd() {
        assert_eq!(estimated_tap_count(48000.0, 15000.0, 20000.0, 40.0).unwrap(), 19);
        assert_eq!(estimated_tap_count(480000.0, 15000.0, 20000.0, 40.0).unwrap(), 175);
        // 44 * 22 * 1000 / 22000 = 44 exactly, bumped to 45
        assert_eq!(estimated_tap_count(22000.0, 1000.0, 2000.0, 44.0).unwrap(), 45);
    }

    #[test]
    fn test_rejects_invalid_transition() {
        assert!(matches!(
            estimate_taps(48000.0, 20000.0, 20000.0, 40.0),
            Err(FilterError::InvalidSpec(_))
        ));
        assert!(matches!(
            estimate_taps(48000.0, 20000.0, 15000.0, 40.0),
            Err(FilterError::InvalidSpec(_))
        ));
    }

    #[test]
    fn test_rejects_non_positive_rate() {
        assert!(estimate_taps(0.0, 100.0, 200.0, 40.0).is_err());
        assert!(estimate_taps(-48000.0, 100.0, 200.0, 40.0).is_err());
        assert!(estimate_taps(f64::NAN, 100.0, 200.0, 40.0).is_err());
    }
}
