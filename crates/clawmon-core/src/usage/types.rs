//! Usage data types parsed from `openclaw status` output.

use std::fmt;

use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;

/// Pattern for a token count with an optional magnitude suffix ("512", "500k", "1.5m")
static COUNT_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\d+(?:\.\d+)?)([kKmM])?$").expect("Invalid COUNT_PATTERN regex"));

/// A token count as scraped from status output.
///
/// The original text is preserved (a count may carry a magnitude suffix like
/// `500k`); expansion to an absolute count happens at consumption time via
/// [`TokenCount::normalized`], so the usage log round-trips the scraped text
/// bit-for-bit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct TokenCount(String);

impl TokenCount {
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    /// The defaulted count used when the `Tokens:` label is absent
    pub fn zero() -> Self {
        Self("0".to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Expand the count to an absolute integer, resolving any magnitude
    /// suffix (`500k` → 500000, `1.5m` → 1500000). Returns `None` when the
    /// text is not a recognizable count.
    pub fn normalized(&self) -> Option<u64> {
        let caps = COUNT_PATTERN.captures(self.0.trim())?;
        let multiplier = match caps.get(2).map(|m| m.as_str()) {
            Some("k") | Some("K") => 1_000.0,
            Some("m") | Some("M") => 1_000_000.0,
            _ => 1.0,
        };
        // A fractional count only makes sense together with a suffix
        if multiplier == 1.0 && caps[1].contains('.') {
            return None;
        }
        let value: f64 = caps[1].parse().ok()?;
        Some((value * multiplier) as u64)
    }
}

impl fmt::Display for TokenCount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A monetary cost as scraped from status output.
///
/// Preserves the original text including any currency-symbol prefix
/// (`$12.34`); numeric interpretation happens at consumption time via
/// [`CostAmount::amount`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct CostAmount(String);

impl CostAmount {
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    /// The defaulted amount used when the `Cost:` label is absent
    pub fn zero() -> Self {
        Self("0.0".to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Interpret the text as a non-negative decimal amount, stripping a
    /// single leading currency symbol. Returns `None` on corrupted input.
    pub fn amount(&self) -> Option<f64> {
        let text = self.0.trim();
        let text = text
            .strip_prefix(|c: char| matches!(c, '$' | '€' | '£' | '¥'))
            .unwrap_or(text);
        let value: f64 = text.parse().ok()?;
        if value.is_finite() && value >= 0.0 {
            Some(value)
        } else {
            None
        }
    }
}

impl fmt::Display for CostAmount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Result of scanning the status text for one labeled field.
///
/// `Missing` and `Malformed` are kept distinct so diagnostics (and tests)
/// can tell an absent label apart from a label whose value did not decode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldScan<T> {
    /// The label did not appear in the status text
    Missing,
    /// The label appeared but its value did not match the expected shape
    Malformed(String),
    /// The label appeared with a decodable value
    Found(T),
}

/// Strict structured decode of one status capture.
///
/// Produced by [`scan_status_text`](crate::usage::parser::scan_status_text);
/// no defaults are applied here. The fallback policy lives in
/// [`UsageRecord::from_raw`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawStatus {
    /// Input and output token counts, as the raw `A/B` pair
    pub tokens: FieldScan<(String, String)>,
    /// Cost amount, as the raw token after the label
    pub cost: FieldScan<String>,
}

/// A field that was defaulted while building a [`UsageRecord`].
///
/// Degradations are data, not errors: the record is still produced, but the
/// substitution must stay observable for diagnostics.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Degradation {
    /// `Tokens:` label absent; counts defaulted to 0/0
    TokensMissing,
    /// `Tokens:` value present but undecodable; counts defaulted to 0/0
    TokensMalformed,
    /// `Cost:` label absent; amount defaulted to 0.0
    CostMissing,
    /// `Cost:` value present but undecodable; amount defaulted to 0.0
    CostMalformed,
}

impl fmt::Display for Degradation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let msg = match self {
            Degradation::TokensMissing => "Tokens: label absent, counts defaulted to 0/0",
            Degradation::TokensMalformed => "Tokens: value malformed, counts defaulted to 0/0",
            Degradation::CostMissing => "Cost: label absent, amount defaulted to 0.0",
            Degradation::CostMalformed => "Cost: value malformed, amount defaulted to 0.0",
        };
        f.write_str(msg)
    }
}

/// One token/cost snapshot derived from a single status query.
///
/// Either fully populated or not produced at all; absent fields are filled
/// from the default policy in [`UsageRecord::from_raw`] with a matching
/// [`Degradation`]. Never mutated after creation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UsageRecord {
    /// Input token count, original scraped text
    pub tokens_in: TokenCount,
    /// Output token count, original scraped text
    pub tokens_out: TokenCount,
    /// Session cost, original scraped text
    pub cost: CostAmount,
    /// When this record was captured (set at parse time)
    pub captured_at: DateTime<Utc>,
}

impl UsageRecord {
    /// Apply the default policy to a strict decode.
    ///
    /// Missing or malformed fields are substituted (`0` tokens, `0.0` cost)
    /// and each substitution is reported as a [`Degradation`]. This is the
    /// only place defaults are introduced; the scan itself stays strict.
    pub fn from_raw(raw: RawStatus) -> (Self, Vec<Degradation>) {
        let mut degradations = Vec::new();

        let (tokens_in, tokens_out) = match raw.tokens {
            FieldScan::Found((input, output)) => (TokenCount::new(input), TokenCount::new(output)),
            FieldScan::Malformed(_) => {
                degradations.push(Degradation::TokensMalformed);
                (TokenCount::zero(), TokenCount::zero())
            }
            FieldScan::Missing => {
                degradations.push(Degradation::TokensMissing);
                (TokenCount::zero(), TokenCount::zero())
            }
        };

        let cost = match raw.cost {
            FieldScan::Found(amount) => CostAmount::new(amount),
            FieldScan::Malformed(_) => {
                degradations.push(Degradation::CostMalformed);
                CostAmount::zero()
            }
            FieldScan::Missing => {
                degradations.push(Degradation::CostMissing);
                CostAmount::zero()
            }
        };

        let record = Self {
            tokens_in,
            tokens_out,
            cost,
            captured_at: Utc::now(),
        };
        (record, degradations)
    }
}
