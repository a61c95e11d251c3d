//! Flat coefficient lists: one decimal value per line
//!
//! Values are written with Rust's shortest round-trip float formatting so a
//! list read back with [`read_coefficients`] reproduces the taps bit for bit.
//! An IIR transfer function is two such lists, numerator first, separated by
//! a blank line.

use crate::coefficients::FilterCoefficients;
use crate::error::{FilterError, Result};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::io::{BufRead, Write};

/// Which part of a symmetric filter to export
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum ExportRange {
    #[default]
    Full,
    /// Centre tap onwards (index `N/2` to the end)
    RightHalf,
}

pub const DEFAULT_TERMINATOR: &str = ",";

pub fn select(taps: &[f64], range: ExportRange) -> &[f64] {
    match range {
        ExportRange::Full => taps,
        ExportRange::RightHalf => &taps[taps.len() / 2..],
    }
}

/// Write `taps` one per line, each followed by `terminator`
///
/// # Errors
/// Propagates any I/O error from `writer`.
pub fn write_coefficients<W: Write>(
    mut writer: W,
    taps: &[f64],
    range: ExportRange,
    terminator: &str,
) -> Result<()> {
    let selected = select(taps, range);
    for tap in selected {
        writeln!(writer, "{}{}", tap, terminator)?;
    }
    writer.flush()?;
    log::debug!("Exported {} of {} taps", selected.len(), taps.len());
    Ok(())
}

/// Write `b`, a blank line, then `a`
///
/// FIR coefficients are written as a single list.
///
/// # Errors
/// Propagates any I/O error from `writer`.
pub fn write_transfer_function<W: Write>(
    mut writer: W,
    coeffs: &FilterCoefficients,
    terminator: &str,
) -> Result<()> {
    write_coefficients(&mut writer, coeffs.b(), ExportRange::Full, terminator)?;
    if !coeffs.is_fir() {
        writeln!(writer)?;
        write_coefficients(&mut writer, coeffs.a(), ExportRange::Full, terminator)?;
    }
    Ok(())
}

/// Parse a coefficient list, ignoring blank lines and a trailing `,` or `;`
///
/// # Errors
/// `FilterError::Parse` with the 1-based line number of the first value
/// that is not a finite number; `FilterError::Io` on read failure.
pub fn read_coefficients<R: BufRead>(reader: R) -> Result<Vec<f64>> {
    Ok(read_lists(reader)?.into_iter().flatten().collect())
}

/// Parse one list as FIR taps or two blank-separated lists as `b` and `a`
///
/// # Errors
/// As [`read_coefficients`], plus `FilterError::InvalidSpec` when the input
/// holds no values, more than two lists, or a denominator with a zero
/// leading coefficient.
pub fn read_transfer_function<R: BufRead>(reader: R) -> Result<FilterCoefficients> {
    let mut lists = read_lists(reader)?.into_iter();
    match (lists.next(), lists.next(), lists.next()) {
        (Some(b), None, None) => Ok(FilterCoefficients::fir(b)),
        (Some(b), Some(a), None) => FilterCoefficients::iir(b, a),
        (None, ..) => Err(FilterError::InvalidSpec(
            "coefficient file holds no values".to_string(),
        )),
        _ => Err(FilterError::InvalidSpec(
            "expected a numerator list and at most one denominator list".to_string(),
        )),
    }
}

/// Runs of values separated by one or more blank lines
fn read_lists<R: BufRead>(reader: R) -> Result<Vec<Vec<f64>>> {
    let mut lists = Vec::new();
    let mut current = Vec::new();
    for (index, line) in reader.lines().enumerate() {
        let line = line?;
        let value = line.trim().trim_end_matches([',', ';']).trim();
        if value.is_empty() {
            if !current.is_empty() {
                lists.push(std::mem::take(&mut current));
            }
            continue;
        }
        match value.parse::<f64>() {
            Ok(tap) if tap.is_finite() => current.push(tap),
            _ => {
                return Err(FilterError::Parse {
                    line: index + 1,
                    text: line.clone(),
                });
            }
        }
    }
    if !current.is_empty() {
        lists.push(current);
    }
    Ok(lists)
}

/// Rebuild a full odd-length symmetric filter from its right half
///
/// `half[0]` is the centre tap.
pub fn mirror_right_half(half: &[f64]) -> Vec<f64> {
    let mut full: Vec<f64> = half.iter().skip(1).rev().copied().collect();
    full.extend_from_slice(half);
    full
}
