//! rider-sim: run a staking scenario script and print a JSON report.

mod scenario;

use clap::Parser;
use rider_types::AccountId;
use rider_utils::LogFormat;
use scenario::Scenario;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "rider-sim", about = "Run a Rider staking scenario and print a JSON report")]
struct Cli {
    /// Path to the scenario TOML file.
    #[arg(long, env = "RIDER_SCENARIO")]
    scenario: PathBuf,

    /// Log format: "human" or "json". Overrides the scenario's [logging] table.
    #[arg(long, env = "RIDER_LOG_FORMAT")]
    log_format: Option<LogFormat>,

    /// Log level: "trace", "debug", "info", "warn", "error".
    #[arg(long, env = "RIDER_LOG_LEVEL")]
    log_level: Option<String>,

    /// Token account holding staked principal and the reward reserve.
    #[arg(long, env = "RIDER_STAKING_ACCOUNT")]
    staking_account: Option<String>,

    /// Print single-line JSON instead of pretty-printed.
    #[arg(long)]
    compact: bool,

    /// Exit with an error when any step failed.
    #[arg(long)]
    strict: bool,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut scenario = Scenario::from_toml_file(&cli.scenario)?;
    if let Some(account) = cli.staking_account {
        scenario.staking.staking_account = AccountId::new(account);
    }

    let format = cli.log_format.unwrap_or(scenario.logging.format);
    let level = cli
        .log_level
        .clone()
        .unwrap_or_else(|| scenario.logging.level.clone());
    rider_utils::init_logging(format, &level);

    tracing::info!(
        path = %cli.scenario.display(),
        steps = scenario.steps.len(),
        staking_account = %scenario.staking.staking_account,
        "running scenario"
    );
    let report = scenario::run(&scenario)?;

    let json = if cli.compact {
        serde_json::to_string(&report)?
    } else {
        serde_json::to_string_pretty(&report)?
    };
    println!("{json}");

    if cli.strict && report.failures > 0 {
        anyhow::bail!(
            "{} of {} steps failed",
            report.failures,
            report.steps.len()
        );
    }
    Ok(())
}
