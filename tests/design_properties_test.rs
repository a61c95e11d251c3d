mod common;

use approx::{assert_abs_diff_eq, assert_relative_eq};
use common::{band_max_db, magnitude_db_at};
use filterkit::analysis::freqz_raw;
use filterkit::design::{
    ButterworthSpec, FilterKind, KaiserCutoff, KaiserSpec, butterworth, estimate_taps, kaiser,
    kaiser_beta,
};
use filterkit::{FilterError, freqz};

#[test]
fn test_kaiser_symmetry_across_parameters() {
    for n in [1, 2, 4, 7, 32] {
        for nz in [0, 1, 3, 8] {
            for sba in [15.0, 35.0, 80.0, 120.0] {
                let spec = KaiserSpec {
                    samples_per_zero_crossing: n,
                    zero_crossing_count: nz,
                    stopband_attenuation_db: sba,
                    cutoff: KaiserCutoff::TransitionBand {
                        transition_band_hz: 2000.0,
                        denominator_freq_hz: 48000.0,
                    },
                    unity_dc_gain: false,
                };
                let coeffs = kaiser::design(&spec).unwrap();
                let taps = coeffs.b();
                assert_eq!(taps.len() % 2, 1, "n={} nz={}", n, nz);
                for k in 0..taps.len() {
                    assert_eq!(taps[k], taps[taps.len() - 1 - k]);
                }
            }
        }
    }
}

#[test]
fn test_kaiser_beta_for_80_db() {
    assert_relative_eq!(kaiser_beta(80.0), 7.857, max_relative = 1e-4);
}

#[test]
fn test_kaiser_unity_dc_gain() {
    let spec = KaiserSpec {
        samples_per_zero_crossing: 4,
        zero_crossing_count: 8,
        unity_dc_gain: true,
        ..KaiserSpec::default()
    };
    let coeffs = kaiser::design(&spec).unwrap();
    assert_abs_diff_eq!(coeffs.b().iter().sum::<f64>(), 1.0, epsilon = 1e-12);
}

#[test]
fn test_tap_estimate_scenario() {
    let n = estimate_taps(48000.0, 15000.0, 20000.0, 40.0).unwrap();
    assert_relative_eq!(n, 17.4545, max_relative = 1e-4);
    // same band edges at ten times the rate
    let n = estimate_taps(480000.0, 15000.0, 20000.0, 40.0).unwrap();
    assert_relative_eq!(n, 174.545, max_relative = 1e-4);
}

#[test]
fn test_tap_estimate_monotonicity() {
    let base = estimate_taps(48000.0, 15000.0, 20000.0, 40.0).unwrap();
    assert!(estimate_taps(48000.0, 15000.0, 20000.0, 60.0).unwrap() > base);
    assert!(estimate_taps(96000.0, 15000.0, 20000.0, 40.0).unwrap() > base);
    assert!(estimate_taps(48000.0, 15000.0, 22000.0, 40.0).unwrap() < base);
    assert!(matches!(
        estimate_taps(48000.0, 15000.0, 15000.0, 40.0),
        Err(FilterError::InvalidSpec(_))
    ));
}

#[test]
fn test_butterworth_highpass_scenario() {
    let fs = 48000.0;
    let coeffs = butterworth::coefficients(&ButterworthSpec {
        order: 2,
        cutoff_hz: 1000.0,
        sample_rate_hz: fs,
        kind: FilterKind::HighPass,
    })
    .unwrap();

    assert!(magnitude_db_at(&coeffs, 0.0, fs) <= -60.0);
    assert_abs_diff_eq!(magnitude_db_at(&coeffs, fs / 2.0, fs), 0.0, epsilon = 1e-6);
    assert_abs_diff_eq!(magnitude_db_at(&coeffs, 1000.0, fs), -3.01, epsilon = 0.1);
    // 40 dB/decade below the corner
    assert!(band_max_db(&coeffs, 0.0, 100.0, fs, 50) < -35.0);
}

#[test]
fn test_butterworth_stability_over_cutoffs() {
    for order in 1..=10 {
        for cutoff in [10.0, 500.0, 5000.0, 20000.0, 23900.0] {
            for kind in [FilterKind::HighPass, FilterKind::LowPass] {
                let design = butterworth::design(&ButterworthSpec {
                    order,
                    cutoff_hz: cutoff,
                    sample_rate_hz: 48000.0,
                    kind,
                })
                .unwrap();
                assert_eq!(design.poles.len(), order);
                assert!(
                    design.poles.iter().all(|p| p.norm() < 1.0),
                    "unstable: order {} cutoff {}",
                    order,
                    cutoff
                );
            }
        }
    }
}

#[test]
fn test_all_pass_response() {
    let response = freqz_raw(&[1.0], &[1.0], 1000).unwrap();
    for m in response.magnitude() {
        assert_abs_diff_eq!(m, 1.0, epsilon = 1e-15);
    }
    let w = response.w();
    assert_eq!(w[0], 0.0);
    assert!(w.windows(2).all(|pair| pair[0] < pair[1]));
    assert!(*w.last().unwrap() < std::f64::consts::PI);
}

#[test]
fn test_kaiser_response_is_lowpass() {
    let spec = KaiserSpec {
        samples_per_zero_crossing: 1,
        zero_crossing_count: 40,
        stopband_attenuation_db: 70.0,
        cutoff: KaiserCutoff::Cutoff {
            cutoff_hz: 8000.0,
            denominator_freq_hz: 48000.0,
        },
        unity_dc_gain: false,
    };
    let coeffs = kaiser::design(&spec).unwrap();
    let response = freqz(&coeffs, 2048).unwrap();
    let db = response.magnitude_db();
    assert_abs_diff_eq!(db[0], 0.0, epsilon = 0.01);
    assert!(band_max_db(&coeffs, 11000.0, 24000.0, 48000.0, 500) < -60.0);
}
