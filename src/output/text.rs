use super::Formatter;
use crate::analysis::ResponsePoint;

pub struct TextFormatter {
    verbose: bool,
}

impl TextFormatter {
    pub fn new(verbose: bool) -> Self {
        Self { verbose }
    }
}

impl Formatter for TextFormatter {
    fn format(&self, point: &ResponsePoint) -> String {
        if self.verbose {
            format!(
                "{:>10.1} Hz: {:>8.2} dB (phase: {:>7.4} rad)",
                point.frequency_hz, point.magnitude_db, point.phase_rad
            )
        } else {
            format!("{:>10.1} Hz: {:>8.2} dB", point.frequency_hz, point.magnitude_db)
        }
    }
}
