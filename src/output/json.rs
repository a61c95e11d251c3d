use super::Formatter;
use crate::analysis::ResponsePoint;

/// One JSON object per line
pub struct JsonFormatter;

impl Formatter for JsonFormatter {
    fn format(&self, point: &ResponsePoint) -> String {
        // a struct of plain floats always serializes
        serde_json::to_string(point).unwrap_or_default()
    }
}
