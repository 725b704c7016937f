//! Usage monitoring — fetch and parse `openclaw status` output.
//!
//! This module runs the external status command, captures its text output,
//! and parses it into a structured usage record. The parser is the only
//! place that knows the output's label strings.

pub mod fetcher;
pub mod parser;
pub mod types;

pub use fetcher::StatusClient;
pub use parser::scan_status_text;
pub use types::{CostAmount, Degradation, FieldScan, RawStatus, TokenCount, UsageRecord};
