use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use std::fs::File;
use std::io::{self, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use filterkit::analysis::{VerificationReport, VerificationTargets, freqz, verify};
use filterkit::config::{Design, Frequency, RequestFile};
use filterkit::constants::DEFAULT_RESPONSE_POINTS;
use filterkit::design::{
    ButterworthSpec, FilterKind, KaiserCutoff, KaiserSpec, RemezOptions, RemezSpec, butterworth,
    estimate_taps, estimated_tap_count, kaiser, remez,
};
use filterkit::export::{
    DEFAULT_TERMINATOR, ExportRange, mirror_right_half, read_transfer_function,
    write_coefficients, write_transfer_function,
};
use filterkit::output::{OutputFormat, create_formatter};
use filterkit::FilterCoefficients;

#[derive(Parser, Debug)]
#[command(name = "filterkit")]
#[command(about = "Design and verify FIR/IIR digital filters", long_about = None)]
struct Cli {
    /// Increase output verbosity
    #[arg(short = 'v', long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Estimate the FIR length for a stopband attenuation target
    Estimate {
        /// Sample rate (e.g. "48000", "48khz")
        #[arg(long)]
        sample_rate: Frequency,
        /// Passband cutoff
        #[arg(long)]
        passband: Frequency,
        /// Stopband edge
        #[arg(long)]
        stopband: Frequency,
        /// Stopband attenuation in dB
        #[arg(long)]
        attenuation: f64,
    },

    /// Kaiser-windowed sinc low-pass for an oversampled kernel
    Kaiser {
        /// Taps between adjacent sinc zero crossings
        #[arg(short = 'n', long, default_value = "32")]
        samples_per_zero_crossing: u32,
        /// Zero crossings on each side of the centre tap
        #[arg(short = 'z', long, default_value = "16")]
        zero_crossings: u32,
        /// Stopband attenuation in dB
        #[arg(long, default_value = "80")]
        attenuation: f64,
        /// Frequency the cutoff is expressed against
        #[arg(long, default_value = "48khz")]
        denominator: Frequency,
        /// Transition band width (ignored when --cutoff is given)
        #[arg(long, default_value = "2khz")]
        transition_band: Frequency,
        /// Explicit cutoff frequency
        #[arg(long)]
        cutoff: Option<Frequency>,
        /// Scale taps to unity DC gain
        #[arg(long)]
        unity_dc: bool,
        #[command(flatten)]
        export: ExportArgs,
        #[command(flatten)]
        response: ResponseArgs,
    },

    /// Parks-McClellan equiripple low-pass
    Remez {
        #[arg(long)]
        sample_rate: Frequency,
        /// Filter length (forced odd)
        #[arg(short = 'n', long)]
        taps: usize,
        #[arg(long)]
        passband: Frequency,
        #[arg(long)]
        stopband: Frequency,
        /// Passband ripple in dB
        #[arg(long, default_value = "0.1")]
        ripple: f64,
        /// Stopband attenuation in dB
        #[arg(long, default_value = "60")]
        attenuation: f64,
        #[arg(long, default_value_t = RemezOptions::default().grid_density)]
        grid_density: usize,
        #[arg(long, default_value_t = RemezOptions::default().max_iterations)]
        max_iterations: usize,
        #[command(flatten)]
        export: ExportArgs,
        #[command(flatten)]
        response: ResponseArgs,
    },

    /// Butterworth IIR via the bilinear transform
    Butterworth {
        #[arg(long, default_value = "2")]
        order: usize,
        #[arg(long)]
        cutoff: Frequency,
        #[arg(long)]
        sample_rate: Frequency,
        #[arg(long, value_enum, default_value = "high-pass")]
        kind: FilterKind,
        /// Written after every value
        #[arg(long, default_value = DEFAULT_TERMINATOR)]
        terminator: String,
        /// Write `b`, a blank line and `a` here instead of stdout
        #[arg(short = 'o', long)]
        output: Option<PathBuf>,
        #[command(flatten)]
        response: ResponseArgs,
    },

    /// Run a TOML design request
    Design {
        request: PathBuf,
        /// Write coefficients here instead of stdout
        #[arg(short = 'o', long)]
        output: Option<PathBuf>,
    },

    /// Evaluate the frequency response of a coefficient file
    Verify {
        /// One FIR list, or `b` and `a` separated by a blank line
        coefficients: PathBuf,
        #[arg(long)]
        sample_rate: Frequency,
        /// The list holds only the right half of a symmetric filter
        #[arg(long)]
        right_half: bool,
        #[arg(long, default_value_t = DEFAULT_RESPONSE_POINTS)]
        points: usize,
        #[arg(short = 'f', long, value_enum, default_value = "text")]
        format: OutputFormat,
        /// Passband edge for a ripple/attenuation report
        #[arg(long, requires = "stopband_edge")]
        passband_edge: Option<Frequency>,
        #[arg(long, requires = "passband_edge")]
        stopband_edge: Option<Frequency>,
        #[arg(long)]
        max_ripple: Option<f64>,
        #[arg(long)]
        min_attenuation: Option<f64>,
        /// Which side of the transition band the passband is on
        #[arg(long, value_enum, default_value = "low-pass")]
        kind: FilterKind,
    },
}

#[derive(Args, Debug)]
struct ExportArgs {
    /// Export the full filter or only its right half
    #[arg(long, value_enum, default_value = "full")]
    range: ExportRange,
    /// Written after every value
    #[arg(long, default_value = DEFAULT_TERMINATOR)]
    terminator: String,
    /// Write coefficients here instead of stdout
    #[arg(short = 'o', long)]
    output: Option<PathBuf>,
}

#[derive(Args, Debug)]
struct ResponseArgs {
    /// Print the frequency response at this many points
    #[arg(long)]
    response_points: Option<usize>,
    #[arg(short = 'f', long, value_enum, default_value = "text")]
    format: OutputFormat,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let log_level = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level)).init();
    let verbose = cli.verbose > 0;

    match cli.command {
        Command::Estimate {
            sample_rate,
            passband,
            stopband,
            attenuation,
        } => {
            let (fs, f1, f2) = (sample_rate.as_hz(), passband.as_hz(), stopband.as_hz());
            let estimate = estimate_taps(fs, f1, f2, attenuation)?;
            let taps = estimated_tap_count(fs, f1, f2, attenuation)?;
            println!("Estimated taps: {:.2} (use {})", estimate, taps);
        }

        Command::Kaiser {
            samples_per_zero_crossing,
            zero_crossings,
            attenuation,
            denominator,
            transition_band,
            cutoff,
            unity_dc,
            export,
            response,
        } => {
            let cutoff = match cutoff {
                Some(cutoff) => KaiserCutoff::Cutoff {
                    cutoff_hz: cutoff.as_hz(),
                    denominator_freq_hz: denominator.as_hz(),
                },
                None => KaiserCutoff::TransitionBand {
                    transition_band_hz: transition_band.as_hz(),
                    denominator_freq_hz: denominator.as_hz(),
                },
            };
            let spec = KaiserSpec {
                samples_per_zero_crossing,
                zero_crossing_count: zero_crossings,
                stopband_attenuation_db: attenuation,
                cutoff,
                unity_dc_gain: unity_dc,
            };
            let coeffs = kaiser::design(&spec)?;
            export_coefficients(&coeffs, &export)?;
            print_response(&coeffs, spec.oversampled_rate_hz(), &response, verbose)?;
        }

        Command::Remez {
            sample_rate,
            taps,
            passband,
            stopband,
            ripple,
            attenuation,
            grid_density,
            max_iterations,
            export,
            response,
        } => {
            let spec = RemezSpec {
                sample_rate_hz: sample_rate.as_hz(),
                num_taps: taps,
                passband_edge_hz: passband.as_hz(),
                stopband_edge_hz: stopband.as_hz(),
                passband_ripple_db: ripple,
                stopband_attenuation_db: attenuation,
            };
            let options = RemezOptions {
                grid_density,
                max_iterations,
            };
            let design = remez::design_with(&spec, &options)?;
            eprintln!(
                "Converged in {} iterations, weighted error {:.3e}",
                design.iterations, design.weighted_error
            );
            export_coefficients(&design.coefficients, &export)?;
            print_response(&design.coefficients, spec.sample_rate_hz, &response, verbose)?;
        }

        Command::Butterworth {
            order,
            cutoff,
            sample_rate,
            kind,
            terminator,
            output,
            response,
        } => {
            let spec = ButterworthSpec {
                order,
                cutoff_hz: cutoff.as_hz(),
                sample_rate_hz: sample_rate.as_hz(),
                kind,
            };
            let design = butterworth::design(&spec)?;
            export_transfer_function(&design.coefficients, output.as_deref(), &terminator)?;
            if verbose {
                for pole in &design.poles {
                    println!("pole {:.6} (|p| = {:.6})", pole, pole.norm());
                }
            }
            print_response(&design.coefficients, spec.sample_rate_hz, &response, verbose)?;
        }

        Command::Design { request, output } => run_request(&request, output, verbose)?,

        Command::Verify {
            coefficients,
            sample_rate,
            right_half,
            points,
            format,
            passband_edge,
            stopband_edge,
            max_ripple,
            min_attenuation,
            kind,
        } => {
            let file = File::open(&coefficients)
                .with_context(|| format!("Failed to open {}", coefficients.display()))?;
            let mut coeffs = read_transfer_function(BufReader::new(file))?;
            if right_half {
                anyhow::ensure!(coeffs.is_fir(), "--right-half only applies to FIR lists");
                coeffs = FilterCoefficients::fir(mirror_right_half(coeffs.b()));
            }
            let fs = sample_rate.as_hz();

            let response_args = ResponseArgs {
                response_points: Some(points),
                format,
            };
            print_response(&coeffs, fs, &response_args, verbose)?;

            if let (Some(pass), Some(stop)) = (passband_edge, stopband_edge) {
                let mut targets = match kind {
                    FilterKind::LowPass => {
                        VerificationTargets::lowpass(fs, pass.as_hz(), stop.as_hz())
                    }
                    FilterKind::HighPass => {
                        VerificationTargets::highpass(fs, stop.as_hz(), pass.as_hz())
                    }
                };
                targets.max_passband_ripple_db = max_ripple;
                targets.min_stopband_attenuation_db = min_attenuation;
                let report = verify(&freqz(&coeffs, points)?, &targets)?;
                print_report(&report);
                if !report.passed {
                    anyhow::bail!("filter does not meet its targets");
                }
            }
        }
    }

    Ok(())
}

fn run_request(path: &Path, output: Option<PathBuf>, verbose: bool) -> anyhow::Result<()> {
    let request = RequestFile::load(path)
        .with_context(|| format!("Failed to load request {}", path.display()))?;
    let design = request.design.design(&request.remez_options())?;
    let coeffs = design.coefficients();

    match &design {
        Design::Butterworth(_) => {
            if request.export.range == ExportRange::RightHalf {
                log::warn!("Right-half export does not apply to IIR designs; writing b and a");
            }
            export_transfer_function(coeffs, output.as_deref(), &request.export.terminator)?;
        }
        _ => {
            let export = ExportArgs {
                range: request.export.range,
                terminator: request.export.terminator.clone(),
                output,
            };
            export_coefficients(coeffs, &export)?;
        }
    }

    if let Some(targets) = &request.verify.targets {
        let response = freqz(coeffs, request.verify.points)?;
        let report = verify(&response, targets)?;
        print_report(&report);
        if verbose {
            let formatter = create_formatter(request.verify.format, verbose);
            for point in response.points(request.design.sample_rate_hz()) {
                eprintln!("{}", formatter.format(&point));
            }
        }
        if !report.passed {
            anyhow::bail!("filter does not meet its targets");
        }
    }
    Ok(())
}

fn export_coefficients(coeffs: &FilterCoefficients, args: &ExportArgs) -> anyhow::Result<()> {
    match &args.output {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("Failed to create {}", path.display()))?;
            write_coefficients(BufWriter::new(file), coeffs.b(), args.range, &args.terminator)?;
            log::info!("Wrote coefficients to {}", path.display());
        }
        None => {
            let stdout = io::stdout();
            write_coefficients(stdout.lock(), coeffs.b(), args.range, &args.terminator)?;
        }
    }
    Ok(())
}

fn export_transfer_function(
    coeffs: &FilterCoefficients,
    output: Option<&Path>,
    terminator: &str,
) -> anyhow::Result<()> {
    match output {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("Failed to create {}", path.display()))?;
            write_transfer_function(BufWriter::new(file), coeffs, terminator)?;
            log::info!("Wrote b and a to {}", path.display());
        }
        None => {
            let stdout = io::stdout();
            write_transfer_function(stdout.lock(), coeffs, terminator)?;
        }
    }
    Ok(())
}

fn print_response(
    coeffs: &FilterCoefficients,
    sample_rate: f64,
    args: &ResponseArgs,
    verbose: bool,
) -> anyhow::Result<()> {
    let Some(points) = args.response_points else {
        return Ok(());
    };
    let response = freqz(coeffs, points)?;
    let formatter = create_formatter(args.format, verbose);

    let stdout = io::stdout();
    let mut out = stdout.lock();
    if let Some(header) = formatter.header() {
        writeln!(out, "{}", header)?;
    }
    for point in response.points(sample_rate) {
        writeln!(out, "{}", formatter.format(&point))?;
    }
    Ok(())
}

fn print_report(report: &VerificationReport) {
    eprintln!(
        "Passband: {:.4} dB ripple ({} points, mean {:.4} dB)",
        report.passband_ripple_db, report.passband.count, report.passband.mean_db
    );
    eprintln!(
        "Stopband: {:.2} dB attenuation ({} points, max {:.2} dB)",
        report.stopband_attenuation_db, report.stopband.count, report.stopband.max_db
    );
    eprintln!("Result: {}", if report.passed { "PASS" } else { "FAIL" });
}
