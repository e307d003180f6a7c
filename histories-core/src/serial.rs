//! OOR ("out of range") serial entries and quantity derivation.
//!
//! Entries are singles or inclusive ranges separated by commas or
//! semicolons: `"1000-1010, 1050; 2000-2005"` is 18 devices.

use crate::ValidationError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Inclusive serial range. Singles have `start == end`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SerialRange {
    pub start: u64,
    pub end: u64,
}

impl SerialRange {
    /// Number of serials covered. Saturates for the full `u64` span.
    pub fn count(&self) -> u64 {
        self.end.saturating_sub(self.start).saturating_add(1)
    }
}

impl fmt::Display for SerialRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.start == self.end {
            write!(f, "{}", self.start)
        } else {
            write!(f, "{}-{}", self.start, self.end)
        }
    }
}

/// Parsed OOR serial text.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OorSerials {
    pub entries: Vec<SerialRange>,
}

impl OorSerials {
    /// Parse OOR text. Blank input is valid and empty.
    ///
    /// An entry whose count, or the running total, does not fit in an
    /// `i64` quantity is rejected as invalid.
    pub fn parse(text: &str) -> Result<Self, ValidationError> {
        let mut entries = Vec::new();
        let mut total: i64 = 0;
        for part in text.split([',', ';']).map(str::trim).filter(|p| !p.is_empty()) {
            let entry = parse_entry(part)?;
            total = (entry.end - entry.start)
                .checked_add(1)
                .and_then(|count| i64::try_from(count).ok())
                .and_then(|count| total.checked_add(count))
                .ok_or_else(|| ValidationError::InvalidSerialEntry {
                    entry: part.to_string(),
                })?;
            entries.push(entry);
        }
        Ok(Self { entries })
    }

    pub fn total_quantity(&self) -> u64 {
        self.entries
            .iter()
            .fold(0u64, |total, range| total.saturating_add(range.count()))
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Full listing, or `"N entries (Q)"` when longer than `max_len`.
    pub fn compact_display(&self, max_len: usize) -> String {
        if self.entries.is_empty() {
            return String::new();
        }
        let full = self.to_string();
        if full.len() <= max_len {
            full
        } else {
            format!("{} entries ({})", self.entries.len(), self.total_quantity())
        }
    }

    /// One numbered line per entry, followed by the total.
    pub fn breakdown(&self) -> String {
        if self.entries.is_empty() {
            return "No entries".to_string();
        }
        let mut lines: Vec<String> = self
            .entries
            .iter()
            .enumerate()
            .map(|(i, range)| match range.count() {
                1 => format!("{}. {} (1 item)", i + 1, range),
                n => format!("{}. {} ({} items)", i + 1, range, n),
            })
            .collect();
        lines.push(format!("\nTotal: {} items", self.total_quantity()));
        lines.join("\n")
    }
}

impl fmt::Display for OorSerials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, entry) in self.entries.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{}", entry)?;
        }
        Ok(())
    }
}

fn parse_entry(part: &str) -> Result<SerialRange, ValidationError> {
    let invalid = || ValidationError::InvalidSerialEntry {
        entry: part.to_string(),
    };
    let parse = |s: &str| s.trim().parse::<u64>().map_err(|_| invalid());

    match part.split_once('-') {
        Some((start, end)) => {
            let start = parse(start)?;
            let end = parse(end)?;
            if start > end {
                return Err(invalid());
            }
            Ok(SerialRange { start, end })
        }
        None => {
            let n = parse(part)?;
            Ok(SerialRange { start: n, end: n })
        }
    }
}

/// Quantity implied by begin/end serials, using only their digits.
/// Zero when either side has no digits, begin is zero, or end < begin.
pub fn quantity_from_range(beg_ser: &str, end_ser: &str) -> u64 {
    let digits = |s: &str| -> Option<u64> {
        let d: String = s.chars().filter(char::is_ascii_digit).collect();
        d.parse().ok()
    };
    match (digits(beg_ser), digits(end_ser)) {
        (Some(beg), Some(end)) if beg > 0 && end >= beg => end - beg + 1,
        _ => 0,
    }
}

/// Quantity to store for a record being saved: OOR text when present and
/// valid, else the begin/end serial range when both are present, else the
/// typed quantity, else zero. A range too large for `i64` counts as zero.
pub fn derive_quantity(oor_serial: &str, beg_ser: &str, end_ser: &str, typed_qty: Option<i64>) -> i64 {
    if !oor_serial.trim().is_empty() {
        return OorSerials::parse(oor_serial)
            .ok()
            .and_then(|s| i64::try_from(s.total_quantity()).ok())
            .unwrap_or(0);
    }
    if !beg_ser.trim().is_empty() && !end_ser.trim().is_empty() {
        return i64::try_from(quantity_from_range(beg_ser, end_ser)).unwrap_or(0);
    }
    typed_qty.unwrap_or(0)
}
