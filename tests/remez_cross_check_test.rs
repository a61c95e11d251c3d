//! Compare the exchange loop against the pm-remez crate

mod common;

use approx::assert_relative_eq;
use common::{band_max_db, remez_lowpass};
use filterkit::design::{Band, RemezOptions, equiripple, remez};
use pm_remez::{BandSetting, constant, pm_parameters, pm_remez};

fn reference(num_taps: usize, bands: &[Band]) -> (Vec<f64>, f64) {
    let settings: Vec<BandSetting<f64>> = bands
        .iter()
        .map(|b| {
            BandSetting::with_weight(b.start, b.end, constant(b.desired), constant(b.weight))
                .unwrap()
        })
        .collect();
    let params = pm_parameters(num_taps, &settings).unwrap();
    let design = pm_remez(&params).unwrap();
    (design.impulse_response, design.weighted_error)
}

fn assert_taps_close(actual: &[f64], expected: &[f64], tolerance: f64) {
    assert_eq!(actual.len(), expected.len());
    for (k, (a, e)) in actual.iter().zip(expected).enumerate() {
        assert!(
            (a - e).abs() <= tolerance,
            "tap {}: {} vs reference {}",
            k,
            a,
            e
        );
    }
}

#[test]
fn test_lowpass_matches_pm_remez() {
    for num_taps in [25, 35, 51] {
        let spec = remez_lowpass(num_taps);
        let design = remez::design(&spec).unwrap();
        let (taps, weighted_error) = reference(num_taps, &spec.bands());

        assert_taps_close(design.coefficients.b(), &taps, 5e-3);
        assert_relative_eq!(design.weighted_error, weighted_error, max_relative = 0.02);
    }
}

#[test]
fn test_bandpass_matches_pm_remez() {
    let bands = [
        Band {
            start: 0.0,
            end: 0.1,
            desired: 0.0,
            weight: 1.0,
        },
        Band {
            start: 0.15,
            end: 0.3,
            desired: 1.0,
            weight: 1.0,
        },
        Band {
            start: 0.35,
            end: 0.5,
            desired: 0.0,
            weight: 1.0,
        },
    ];
    let design = equiripple(41, &bands, &RemezOptions::default()).unwrap();
    let (taps, weighted_error) = reference(41, &bands);

    assert!(design.coefficients.is_symmetric(1e-12));
    assert_taps_close(design.coefficients.b(), &taps, 5e-3);
    assert_relative_eq!(design.weighted_error, weighted_error, max_relative = 0.02);
}

#[test]
fn test_stopband_level_follows_weighted_error() {
    let spec = remez_lowpass(41);
    let design = remez::design(&spec).unwrap();
    // stopband deviation is delta / W_s
    let deviation = design.weighted_error / spec.stopband_weight();
    let expected_db = 20.0 * deviation.log10();
    let measured = band_max_db(
        &design.coefficients,
        spec.stopband_edge_hz,
        spec.sample_rate_hz / 2.0,
        spec.sample_rate_hz,
        2000,
    );
    assert!(
        (measured - expected_db).abs() < 0.5,
        "measured {} dB, expected {} dB",
        measured,
        expected_db
    );
}

#[test]
fn test_extremal_frequencies_lie_in_bands() {
    let spec = remez_lowpass(31);
    let design = remez::design(&spec).unwrap();
    let fp = spec.passband_edge_hz;
    let fe = spec.stopband_edge_hz;
    for f in design.extremal_frequencies_hz(spec.sample_rate_hz) {
        assert!(
            (0.0..=fp).contains(&f) || (fe..=spec.sample_rate_hz / 2.0).contains(&f),
            "extremal frequency {} Hz inside the transition band",
            f
        );
    }
}
