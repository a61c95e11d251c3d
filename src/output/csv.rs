use super::Formatter;
use crate::analysis::ResponsePoint;

pub struct CsvFormatter;

impl Formatter for CsvFormatter {
    fn format(&self, point: &ResponsePoint) -> String {
        format!(
            "{:.3},{:.4},{:.4}",
            point.frequency_hz, point.magnitude_db, point.phase_rad
        )
    }

    fn header(&self) -> Option<&'static str> {
        Some("frequency_hz,magnitude_db,phase_rad")
    }
}
