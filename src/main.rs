//! Circuit breaker demo runner.
//!
//! Replays scripted request loops against simulated dependencies and
//! prints the per-attempt outcomes and final breaker snapshots as JSON.
//!
//! ```text
//! CLI flags / TOML config
//!     → validated BreakerConfig
//!     → logging + optional metrics exporter
//!     → demo scenarios (stable, failing, unstable)
//!     → JSON report on stdout
//! ```

use std::path::PathBuf;

use clap::Parser;

use circuit_guard::config::{
    self, validation::validate_config, BreakerConfig, ConfigError, GuardConfig,
};
use circuit_guard::demo::{self, DemoSettings, Scenario};
use circuit_guard::observability::{logging, metrics};
use circuit_guard::{BreakerRegistry, BreakerState};

#[derive(Parser)]
#[command(name = "circuit-guard")]
#[command(about = "Run circuit breaker demo scenarios", long_about = None)]
struct Cli {
    /// TOML configuration file. Breaker thresholds are read from it when given.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Breaker entry to use (also the name prefix in logs and metrics).
    #[arg(short, long, default_value = "demo")]
    breaker: String,

    /// Scenario to run.
    #[arg(short, long, value_enum, default_value_t = Scenario::All)]
    scenario: Scenario,

    /// Timeout budget passed to the service, in milliseconds.
    #[arg(long, default_value_t = 1000)]
    timeout_ms: u64,

    /// Wait after the last failure before probing, in milliseconds.
    #[arg(long, default_value_t = 2000)]
    retry_timeout_ms: u64,

    /// Failures at which the breaker opens.
    #[arg(long, default_value_t = 4)]
    failure_threshold: u32,

    /// Force each breaker into this state before its first request.
    #[arg(long)]
    initial_state: Option<BreakerState>,
}

impl Cli {
    /// Resolve the configuration, from file when given, otherwise from flags.
    fn resolve(&self) -> Result<(GuardConfig, BreakerConfig), Box<dyn std::error::Error>> {
        if let Some(path) = &self.config {
            let config = config::load_config(path)?;
            let breaker = config
                .breaker(&self.breaker)
                .cloned()
                .ok_or_else(|| {
                    format!("no breaker named {:?} in {}", self.breaker, path.display())
                })?;
            return Ok((config, breaker));
        }

        let breaker = BreakerConfig {
            name: self.breaker.clone(),
            timeout_ms: self.timeout_ms,
            retry_timeout_ms: self.retry_timeout_ms,
            failure_threshold: self.failure_threshold,
        };
        let config = GuardConfig {
            breakers: vec![breaker.clone()],
            ..GuardConfig::default()
        };
        validate_config(&config).map_err(ConfigError::Validation)?;
        Ok((config, breaker))
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let (config, breaker) = cli.resolve()?;

    logging::init_logging(&config.observability)?;
    tracing::info!("circuit-guard v{} starting", env!("CARGO_PKG_VERSION"));

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => {
                if let Err(e) = metrics::init_metrics(addr) {
                    tracing::error!(error = %e, "Failed to start metrics exporter");
                }
            }
            Err(_) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            ),
        }
    }

    tracing::info!(
        breaker = %breaker.name,
        timeout_ms = breaker.timeout_ms,
        retry_timeout_ms = breaker.retry_timeout_ms,
        failure_threshold = breaker.failure_threshold,
        scenario = %cli.scenario,
        "Configuration loaded"
    );

    let mut settings = DemoSettings::new(breaker);
    settings.initial_state = cli.initial_state;

    let registry = BreakerRegistry::new();
    let reports = demo::run(cli.scenario, &settings, &registry).await;

    let output = serde_json::json!({
        "reports": reports,
        "breakers": registry.snapshots(),
    });
    println!("{}", serde_json::to_string_pretty(&output)?);

    tracing::info!("Demo complete");
    Ok(())
}
