//! Design request files and CLI value parsing
//!
//! A request is a TOML document with one `[design]` table selecting the
//! designer, plus optional `[remez]`, `[export]` and `[verify]` tables:
//!
//! ```toml
//! [design]
//! designer = "remez"
//! sample_rate_hz = 48000
//! num_taps = 63
//! passband_edge_hz = 15000
//! stopband_edge_hz = 20000
//! passband_ripple_db = 0.1
//! stopband_attenuation_db = 60
//!
//! [export]
//! range = "full"
//! terminator = ","
//! ```

use crate::analysis::VerificationTargets;
use crate::coefficients::FilterCoefficients;
use crate::constants::DEFAULT_RESPONSE_POINTS;
use crate::design::{
    ButterworthDesign, ButterworthSpec, KaiserSpec, RemezDesign, RemezOptions, RemezSpec,
    butterworth, kaiser, remez,
};
use crate::error::{FilterError, Result};
use crate::export::{DEFAULT_TERMINATOR, ExportRange};
use crate::output::OutputFormat;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::str::FromStr;

/// Frequency given on the command line
///
/// # Parsing formats
/// - `48000` - Hz (no suffix)
/// - `48000hz` or `48000Hz` - Hz (explicit)
/// - `1.5khz` or `1.5kHz` - kilohertz
/// - `2mhz` or `2MHz` - megahertz
///
/// # Example
/// ```
/// use filterkit::config::Frequency;
///
/// let f: Frequency = "1.5kHz".parse().unwrap();
/// assert_eq!(f.as_hz(), 1500.0);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Frequency(f64);

impl Frequency {
    pub fn from_hz(hz: f64) -> Self {
        Self(hz)
    }

    pub fn as_hz(&self) -> f64 {
        self.0
    }
}

impl fmt::Display for Frequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}hz", self.0)
    }
}

impl FromStr for Frequency {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let s = s.trim();
        let lower = s.to_ascii_lowercase();

        let (num, scale) = if let Some(num) = lower.strip_suffix("mhz") {
            (num, 1e6)
        } else if let Some(num) = lower.strip_suffix("khz") {
            (num, 1e3)
        } else {
            (lower.strip_suffix("hz").unwrap_or(lower.as_str()), 1.0)
        };

        let value: f64 = num
            .trim()
            .parse()
            .map_err(|_| format!("invalid frequency: {}", s))?;
        let hz = value * scale;
        if !(hz > 0.0 && hz.is_finite()) {
            return Err("frequency must be positive".to_string());
        }
        Ok(Self::from_hz(hz))
    }
}

/// Which designer to run and with what spec
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "designer", rename_all = "kebab-case")]
pub enum DesignRequest {
    Kaiser(KaiserSpec),
    Remez(RemezSpec),
    Butterworth(ButterworthSpec),
}

/// Output of any designer
#[derive(Debug, Clone)]
pub enum Design {
    Kaiser(FilterCoefficients),
    Remez(RemezDesign),
    Butterworth(ButterworthDesign),
}

impl Design {
    pub fn coefficients(&self) -> &FilterCoefficients {
        match self {
            Design::Kaiser(coeffs) => coeffs,
            Design::Remez(design) => &design.coefficients,
            Design::Butterworth(design) => &design.coefficients,
        }
    }
}

impl DesignRequest {
    pub fn validate(&self) -> Result<()> {
        match self {
            DesignRequest::Kaiser(spec) => spec.validate(),
            DesignRequest::Remez(spec) => spec.validate(),
            DesignRequest::Butterworth(spec) => spec.validate(),
        }
    }

    /// Rate at which the designed coefficients run
    pub fn sample_rate_hz(&self) -> f64 {
        match self {
            DesignRequest::Kaiser(spec) => spec.oversampled_rate_hz(),
            DesignRequest::Remez(spec) => spec.sample_rate_hz,
            DesignRequest::Butterworth(spec) => spec.sample_rate_hz,
        }
    }

    pub fn design(&self, remez_options: &RemezOptions) -> Result<Design> {
        Ok(match self {
            DesignRequest::Kaiser(spec) => Design::Kaiser(kaiser::design(spec)?),
            DesignRequest::Remez(spec) => Design::Remez(remez::design_with(spec, remez_options)?),
            DesignRequest::Butterworth(spec) => Design::Butterworth(butterworth::design(spec)?),
        })
    }
}

/// Exchange loop settings as they appear in a request file
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RemezConfig {
    pub grid_density: usize,
    pub max_iterations: usize,
}

impl Default for RemezConfig {
    fn default() -> Self {
        let options = RemezOptions::default();
        Self {
            grid_density: options.grid_density,
            max_iterations: options.max_iterations,
        }
    }
}

impl From<RemezConfig> for RemezOptions {
    fn from(config: RemezConfig) -> Self {
        Self {
            grid_density: config.grid_density,
            max_iterations: config.max_iterations,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportConfig {
    pub range: ExportRange,
    /// Appended to every value, before the newline
    pub terminator: String,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            range: ExportRange::Full,
            terminator: DEFAULT_TERMINATOR.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VerifyConfig {
    /// Frequency points between DC and Nyquist
    pub points: usize,
    pub format: OutputFormat,
    pub targets: Option<VerificationTargets>,
}

impl Default for VerifyConfig {
    fn default() -> Self {
        Self {
            points: DEFAULT_RESPONSE_POINTS,
            format: OutputFormat::Text,
            targets: None,
        }
    }
}

/// A complete design request as loaded from TOML
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RequestFile {
    pub design: DesignRequest,
    #[serde(default)]
    pub remez: RemezConfig,
    #[serde(default)]
    pub export: ExportConfig,
    #[serde(default)]
    pub verify: VerifyConfig,
}

impl RequestFile {
    /// Parse and validate a request
    ///
    /// # Errors
    /// `FilterError::Config` for malformed TOML, `FilterError::InvalidSpec`
    /// for a well-formed request that fails validation.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let request: Self =
            toml::from_str(content).map_err(|e| FilterError::Config(e.to_string()))?;
        request.design.validate()?;
        if request.verify.points == 0 {
            return Err(FilterError::Config(
                "verify.points must be at least 1".to_string(),
            ));
        }
        Ok(request)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        log::debug!("Loaded request file {}", path.display());
        Self::from_toml_str(&content)
    }

    pub fn remez_options(&self) -> RemezOptions {
        self.remez.into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::design::{FilterKind, KaiserCutoff};

    #[test]
    fn test_frequency_parsing() {
        assert_eq!("48000".parse::<Frequency>().unwrap().as_hz(), 48000.0);
        assert_eq!("48000Hz".parse::<Frequency>().unwrap().as_hz(), 48000.0);
        assert_eq!("1.5kHz".parse::<Frequency>().unwrap().as_hz(), 1500.0);
        assert_eq!("44.1khz".parse::<Frequency>().unwrap().as_hz(), 44100.0);
        assert_eq!("2MHz".parse::<Frequency>().unwrap().as_hz(), 2e6);
        assert_eq!(" 100 hz ".parse::<Frequency>().unwrap().as_hz(), 100.0);
    }

    #[test]
    fn test_frequency_rejects_bad_input() {
        assert!("".parse::<Frequency>().is_err());
        assert!("abc".parse::<Frequency>().is_err());
        assert!("0".parse::<Frequency>().is_err());
        assert!("-5khz".parse::<Frequency>().is_err());
    }

    #[test]
    fn test_remez_request() {
        let request = RequestFile::from_toml_str(
            r#"
            [design]
            designer = "remez"
            sample_rate_hz = 48000
            num_taps = 63
            passband_edge_hz = 15000
            stopband_edge_hz = 20000
            passband_ripple_db = 0.1
            stopband_attenuation_db = 60

            [remez]
            max_iterations = 60

            [export]
            range = "right-half"
            terminator = ""
            "#,
        )
        .unwrap();

        assert_eq!(request.design, DesignRequest::Remez(RemezSpec::default()));
        assert_eq!(request.remez_options().max_iterations, 60);
        assert_eq!(request.remez_options().grid_density, 16);
        assert_eq!(request.export.range, ExportRange::RightHalf);
        assert_eq!(request.export.terminator, "");
        assert_eq!(request.verify, VerifyConfig::default());
        assert_eq!(request.design.sample_rate_hz(), 48000.0);
    }

    #[test]
    fn test_kaiser_request_with_cutoff() {
        let request = RequestFile::from_toml_str(
            r#"
            [design]
            designer = "kaiser"
            samples_per_zero_crossing = 32
            zero_crossing_count = 16
            stopband_attenuation_db = 80.0

            [design.cutoff]
            cutoff_hz = 20000.0
            denominator_freq_hz = 48000.0
            "#,
        )
        .unwrap();

        match &request.design {
            DesignRequest::Kaiser(spec) => {
                assert_eq!(
                    spec.cutoff,
                    KaiserCutoff::Cutoff {
                        cutoff_hz: 20000.0,
                        denominator_freq_hz: 48000.0
                    }
                );
                assert!(!spec.unity_dc_gain);
            }
            other => panic!("unexpected designer {:?}", other),
        }
        assert_eq!(request.design.sample_rate_hz(), 48000.0 * 32.0);
        assert_eq!(request.export, ExportConfig::default());
    }

    #[test]
    fn test_butterworth_request_defaults_to_highpass() {
        let request = RequestFile::from_toml_str(
            r#"
            [design]
            designer = "butterworth"
            order = 2
            cutoff_hz = 1000.0
            sample_rate_hz = 48000.0

            [verify]
            points = 1024
            format = "csv"
            "#,
        )
        .unwrap();

        match &request.design {
            DesignRequest::Butterworth(spec) => assert_eq!(spec.kind, FilterKind::HighPass),
            other => panic!("unexpected designer {:?}", other),
        }
        assert_eq!(request.verify.points, 1024);
        assert_eq!(request.verify.format, OutputFormat::Csv);

        let design = request.design.design(&request.remez_options()).unwrap();
        assert_eq!(design.coefficients().a().len(), 3);
    }

    #[test]
    fn test_invalid_requests() {
        assert!(matches!(
            RequestFile::from_toml_str("[design]\ndesigner = \"chebyshev\"\n"),
            Err(FilterError::Config(_))
        ));
        assert!(matches!(
            RequestFile::from_toml_str(
                "[design]\ndesigner = \"butterworth\"\norder = 0\ncutoff_hz = 1000.0\nsample_rate_hz = 48000.0\n"
            ),
            Err(FilterError::InvalidSpec(_))
        ));
    }

    #[test]
    fn test_kaiser_request_rejects_infinite_attenuation() {
        let result = RequestFile::from_toml_str(
            r#"
            [design]
            designer = "kaiser"
            samples_per_zero_crossing = 4
            zero_crossing_count = 4
            stopband_attenuation_db = inf

            [design.cutoff]
            cutoff_hz = 20000.0
            denominator_freq_hz = 48000.0
            "#,
        );
        assert!(matches!(result, Err(FilterError::InvalidSpec(_))));
    }
}
