//! The monitoring cycle: fetch → parse → evaluate → log → advise.

pub mod threshold;

pub use threshold::{check_cost, CostCheck, DEFAULT_THRESHOLD};

use std::time::Duration;

use tracing::{info, warn};

use crate::advisor::{suggest_model, ModelAdvice};
use crate::config::Settings;
use crate::error::{CommandFailure, PersistenceFailure};
use crate::store::UsageLog;
use crate::usage::{scan_status_text, Degradation, StatusClient, UsageRecord};

/// Everything one monitoring cycle produced.
///
/// The persistence outcome rides along as its own `Result` so a log-store
/// failure reaches the caller without being conflated with fetch or parse
/// problems.
#[derive(Debug)]
pub struct CycleReport {
    pub record: UsageRecord,
    /// Fields that were defaulted during parsing, for diagnostics
    pub degradations: Vec<Degradation>,
    pub check: CostCheck,
    pub advice: ModelAdvice,
    /// Outcome of appending the record to the usage log
    pub logged: Result<(), PersistenceFailure>,
}

/// Sequential usage monitor over one external CLI.
///
/// Each public operation runs to completion before the next begins; the only
/// blocking step is the bounded external command. A [`CommandFailure`]
/// aborts the current cycle before anything is written, so an abandoned
/// cycle never leaves the log store inconsistent.
pub struct UsageMonitor {
    settings: Settings,
    client: StatusClient,
    log: UsageLog,
}

impl UsageMonitor {
    pub fn new(settings: Settings) -> Self {
        let client = StatusClient::new(
            settings.command.clone(),
            Duration::from_secs(settings.timeout_secs),
        );
        let log = UsageLog::new(settings.log_file.clone());
        Self {
            settings,
            client,
            log,
        }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn log(&self) -> &UsageLog {
        &self.log
    }

    /// Fetch and parse one usage record.
    ///
    /// Degradations are returned alongside the record; they are reported,
    /// not errors.
    pub async fn fetch_record(
        &self,
    ) -> Result<(UsageRecord, Vec<Degradation>), CommandFailure> {
        let text = self.client.fetch_status().await?;
        let (record, degradations) = UsageRecord::from_raw(scan_status_text(&text));
        for degradation in &degradations {
            warn!("degraded parse: {degradation}");
        }
        Ok((record, degradations))
    }

    /// Run one full monitoring cycle.
    ///
    /// The alert re-fires on every over-threshold cycle; there is no
    /// crossing-edge latch, matching the stateless per-cycle design.
    pub async fn run_cycle(&self) -> Result<CycleReport, CommandFailure> {
        let (record, degradations) = self.fetch_record().await?;

        let check = check_cost(&record, self.settings.cost_threshold);
        if check.is_alert() {
            warn!(
                "cost {} exceeds threshold {}",
                record.cost, self.settings.cost_threshold
            );
        }

        let advice = suggest_model(&record.tokens_in);
        let logged = self.log.append(&record);
        if logged.is_ok() {
            info!("usage logged to {:?}", self.log.path());
        }

        Ok(CycleReport {
            record,
            degradations,
            check,
            advice,
            logged,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::path::Path;

    #[cfg(unix)]
    fn fake_status_command(dir: &Path, body: &str) -> String {
        use std::os::unix::fs::PermissionsExt;

        let path = dir.join("fake-openclaw");
        std::fs::write(&path, format!("#!/bin/sh\n{body}\n")).unwrap();
        let mut perms = std::fs::metadata(&path).unwrap().permissions();
        perms.set_mode(0o755);
        std::fs::set_permissions(&path, perms).unwrap();
        path.to_string_lossy().to_string()
    }

    #[cfg(unix)]
    fn monitor_with(dir: &Path, body: &str, threshold: f64, timeout_secs: u64) -> UsageMonitor {
        let settings = Settings {
            command: fake_status_command(dir, body),
            cost_threshold: threshold,
            log_file: dir.join("token_usage.log"),
            timeout_secs,
        };
        UsageMonitor::new(settings)
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_cycle_under_threshold() {
        let dir = tempfile::tempdir().unwrap();
        let monitor = monitor_with(
            dir.path(),
            "echo 'Tokens: 100/50'; echo 'Cost: $2.50'",
            30.0,
            5,
        );

        let report = monitor.run_cycle().await.unwrap();
        assert_eq!(report.check, CostCheck::Under);
        assert_eq!(report.advice, ModelAdvice::CurrentOk);
        assert!(report.degradations.is_empty());
        assert!(report.logged.is_ok());

        let content = std::fs::read_to_string(monitor.log().path()).unwrap();
        assert_eq!(content.lines().count(), 1);
        assert!(content.contains("in=100, out=50, cost=$2.50"));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_cycle_over_threshold_with_heavy_input() {
        let dir = tempfile::tempdir().unwrap();
        let monitor = monitor_with(
            dir.path(),
            "echo 'Tokens: 600k/98k'; echo 'Cost: $31.07'",
            30.0,
            5,
        );

        let report = monitor.run_cycle().await.unwrap();
        assert_eq!(report.check, CostCheck::Over);
        assert_eq!(report.advice, ModelAdvice::SwitchSmaller);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_cycle_with_degraded_parse_still_logs() {
        let dir = tempfile::tempdir().unwrap();
        let monitor = monitor_with(dir.path(), "echo 'Cost: $1.00'", 30.0, 5);

        let report = monitor.run_cycle().await.unwrap();
        assert_eq!(report.degradations, vec![Degradation::TokensMissing]);
        assert!(report.logged.is_ok());

        let content = std::fs::read_to_string(monitor.log().path()).unwrap();
        assert!(content.contains("in=0, out=0, cost=$1.00"));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_timeout_aborts_cycle_without_log_write() {
        let dir = tempfile::tempdir().unwrap();
        let monitor = monitor_with(dir.path(), "sleep 10", 30.0, 0);

        let err = monitor.run_cycle().await.unwrap_err();
        assert!(matches!(err, CommandFailure::Timeout { .. }));
        assert!(!monitor.log().path().exists());
    }
}
