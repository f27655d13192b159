//! Display formatting for metric values.

use serde::{Deserialize, Serialize};

pub const RUPEE: &str = "₹";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ValueFormat {
    /// Whole currency units with thousands separators, e.g. `₹1,234,567`.
    Currency { symbol: String },
    /// Plain integer, no separators.
    Integer,
}

impl ValueFormat {
    pub fn rupees() -> Self {
        ValueFormat::Currency {
            symbol: RUPEE.to_string(),
        }
    }
}

pub fn format_value(val: f64, format: &ValueFormat) -> String {
    match format {
        ValueFormat::Currency { symbol } => {
            format!("{}{}", symbol, format_thousands(round_whole(val)))
        }
        ValueFormat::Integer => round_whole(val).to_string(),
    }
}

/// Banker's rounding (half to even); non-finite values collapse to 0.
fn round_whole(val: f64) -> i64 {
    if val.is_finite() {
        val.round_ties_even() as i64
    } else {
        0
    }
}

pub fn format_thousands(n: i64) -> String {
    let s = n.unsigned_abs().to_string();
    let mut result = String::new();
    for (i, ch) in s.chars().rev().enumerate() {
        if i > 0 && i % 3 == 0 {
            result.push(',');
        }
        result.push(ch);
    }
    if n < 0 {
        result.push('-');
    }
    result.chars().rev().collect()
}
