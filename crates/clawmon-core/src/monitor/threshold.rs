//! Cost threshold evaluation.

use serde::Serialize;
use tracing::warn;

use crate::usage::UsageRecord;

/// Default cost ceiling, currency-unit-agnostic
pub const DEFAULT_THRESHOLD: f64 = 30.0;

/// Outcome of comparing a record's cost against the configured ceiling.
///
/// Tri-state so a corrupted cost is reported distinctly from "below
/// threshold" instead of crashing the cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CostCheck {
    /// Cost strictly exceeds the threshold — alert
    Over,
    /// Cost is at or below the threshold
    Under,
    /// Cost could not be interpreted as a number
    Unknown,
}

impl CostCheck {
    /// Whether this outcome should raise the alert signal
    pub fn is_alert(&self) -> bool {
        matches!(self, CostCheck::Over)
    }
}

/// Compare a record's cost against the ceiling (strict greater-than).
///
/// A cost that cannot be interpreted numerically yields
/// [`CostCheck::Unknown`] with a diagnostic; callers must treat it as
/// non-alerting but report it distinctly.
pub fn check_cost(record: &UsageRecord, threshold: f64) -> CostCheck {
    match record.cost.amount() {
        Some(cost) if cost > threshold => CostCheck::Over,
        Some(_) => CostCheck::Under,
        None => {
            warn!(
                "cost {:?} is not interpretable as a number; threshold check inconclusive",
                record.cost.as_str()
            );
            CostCheck::Unknown
        }
    }
}
