//! Parse `openclaw status` output into structured usage data.
//!
//! The status output is an unstable, partially documented text format. This
//! module is the only place that knows the label strings, so format drift
//! stays contained here.

use super::types::{FieldScan, RawStatus};

const TOKENS_LABEL: &str = "Tokens:";
const COST_LABEL: &str = "Cost:";

/// Strict structured decode of raw status text.
///
/// Expected shape (labels may appear anywhere in the output, the first line
/// containing each label wins):
/// ```text
/// Session: 0199af
/// Tokens: 1200/800
/// Cost: $4.20 (this session)
/// ```
///
/// `Tokens:` is followed by input/output counts separated by `/`; `Cost:` by
/// a decimal amount, optionally prefixed with a currency symbol. No defaults
/// are applied here; see [`UsageRecord::from_raw`](super::UsageRecord::from_raw)
/// for the fallback policy.
pub fn scan_status_text(text: &str) -> RawStatus {
    let mut tokens = FieldScan::Missing;
    let mut cost = FieldScan::Missing;

    for line in text.lines() {
        if matches!(tokens, FieldScan::Missing) {
            if let Some((_, rest)) = line.split_once(TOKENS_LABEL) {
                tokens = scan_tokens_value(rest);
            }
        }
        if matches!(cost, FieldScan::Missing) {
            if let Some((_, rest)) = line.split_once(COST_LABEL) {
                cost = scan_cost_value(rest);
            }
        }
    }

    RawStatus { tokens, cost }
}

/// Decode the `A/B` pair after the tokens label.
///
/// The output count may carry trailing words ("800 total"); only its first
/// whitespace-delimited token is kept.
fn scan_tokens_value(rest: &str) -> FieldScan<(String, String)> {
    match rest.split_once('/') {
        Some((input, output)) => {
            let input = input.trim().to_string();
            let output = output
                .split_whitespace()
                .next()
                .unwrap_or("0")
                .to_string();
            FieldScan::Found((input, output))
        }
        None => FieldScan::Malformed(rest.trim().to_string()),
    }
}

/// Decode the amount after the cost label: the first whitespace-delimited
/// token, currency symbol preserved.
fn scan_cost_value(rest: &str) -> FieldScan<String> {
    match rest.split_whitespace().next() {
        Some(amount) => FieldScan::Found(amount.to_string()),
        None => FieldScan::Malformed(rest.trim().to_string()),
    }
}
