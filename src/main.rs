use std::process::ExitCode;

use anyhow::Result;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use clawmon_core::config::{Action, Config, Settings};
use clawmon_core::monitor::{CostCheck, UsageMonitor};

/// Exit codes: 0 ok, 1 failure (command or log store), 2 cost alert.
#[tokio::main]
async fn main() -> Result<ExitCode> {
    // Parse CLI arguments
    let cli = Config::parse_args();

    // Setup logging
    setup_logging(cli.debug);

    // Load settings
    let mut settings = Settings::load(cli.config.as_ref())?;
    settings.merge_cli(&cli);
    settings.validate();

    let action = cli.action.clone().unwrap_or(Action::Run);
    let monitor = UsageMonitor::new(settings);
    run_action(&monitor, action).await
}

fn setup_logging(debug: bool) {
    let filter = if debug {
        EnvFilter::new("clawmon=debug,clawmon_core=debug")
    } else {
        EnvFilter::new("clawmon=info,clawmon_core=info")
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();
}

async fn run_action(monitor: &UsageMonitor, action: Action) -> Result<ExitCode> {
    match action {
        Action::Status { json } => status(monitor, json).await,
        Action::Check => check(monitor).await,
        Action::Log => log(monitor).await,
        Action::Suggest => suggest(monitor).await,
        Action::Run => run(monitor).await,
    }
}

async fn status(monitor: &UsageMonitor, json: bool) -> Result<ExitCode> {
    let (record, degradations) = match monitor.fetch_record().await {
        Ok(result) => result,
        Err(err) => return Ok(command_failed(&err)),
    };

    if json {
        let snapshot = serde_json::json!({
            "tokens_in": record.tokens_in,
            "tokens_out": record.tokens_out,
            "cost": record.cost,
            "captured_at": record.captured_at,
            "degradations": degradations,
        });
        println!("{}", serde_json::to_string_pretty(&snapshot)?);
        return Ok(ExitCode::SUCCESS);
    }

    println!("Tokens: {} in / {} out", record.tokens_in, record.tokens_out);
    println!("Cost: {}", record.cost);
    for degradation in &degradations {
        println!("note: {degradation}");
    }
    Ok(ExitCode::SUCCESS)
}

async fn check(monitor: &UsageMonitor) -> Result<ExitCode> {
    let (record, _) = match monitor.fetch_record().await {
        Ok(result) => result,
        Err(err) => return Ok(command_failed(&err)),
    };

    let threshold = monitor.settings().cost_threshold;
    Ok(print_check(
        clawmon_core::monitor::check_cost(&record, threshold),
        record.cost.as_str(),
        threshold,
    ))
}

async fn log(monitor: &UsageMonitor) -> Result<ExitCode> {
    let (record, _) = match monitor.fetch_record().await {
        Ok(result) => result,
        Err(err) => return Ok(command_failed(&err)),
    };

    match monitor.log().append(&record) {
        Ok(()) => {
            println!("usage logged to {}", monitor.log().path().display());
            Ok(ExitCode::SUCCESS)
        }
        Err(err) => {
            eprintln!("log store failure: {err}");
            Ok(ExitCode::FAILURE)
        }
    }
}

async fn suggest(monitor: &UsageMonitor) -> Result<ExitCode> {
    let (record, _) = match monitor.fetch_record().await {
        Ok(result) => result,
        Err(err) => return Ok(command_failed(&err)),
    };

    let advice = clawmon_core::advisor::suggest_model(&record.tokens_in);
    println!("suggestion: {}", advice.message());
    Ok(ExitCode::SUCCESS)
}

/// One full monitoring cycle, the default action.
async fn run(monitor: &UsageMonitor) -> Result<ExitCode> {
    let report = match monitor.run_cycle().await {
        Ok(report) => report,
        Err(err) => return Ok(command_failed(&err)),
    };

    println!(
        "Tokens: {} in / {} out",
        report.record.tokens_in, report.record.tokens_out
    );
    println!("Cost: {}", report.record.cost);
    for degradation in &report.degradations {
        println!("note: {degradation}");
    }
    println!("suggestion: {}", report.advice.message());

    let mut exit = print_check(
        report.check,
        report.record.cost.as_str(),
        monitor.settings().cost_threshold,
    );

    match report.logged {
        Ok(()) => println!("usage logged to {}", monitor.log().path().display()),
        Err(err) => {
            eprintln!("log store failure: {err}");
            exit = ExitCode::FAILURE;
        }
    }

    Ok(exit)
}

fn print_check(check: CostCheck, cost: &str, threshold: f64) -> ExitCode {
    match check {
        CostCheck::Over => {
            println!("ALERT: cost {cost} exceeds threshold {threshold}");
            ExitCode::from(2)
        }
        CostCheck::Under => {
            println!("ok: cost {cost} within threshold {threshold}");
            ExitCode::SUCCESS
        }
        CostCheck::Unknown => {
            println!("unknown: cost {cost:?} not interpretable; threshold check inconclusive");
            ExitCode::SUCCESS
        }
    }
}

/// A command failure means "no data available this cycle" — report it and
/// exit non-zero without tearing anything down.
fn command_failed(err: &clawmon_core::error::CommandFailure) -> ExitCode {
    eprintln!("status unavailable: {err}");
    ExitCode::FAILURE
}
