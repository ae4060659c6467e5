use std::path::PathBuf;
use std::time::Duration;

use anyhow::Context;
use clap::Parser;
use gambit::GambitServer;
use gambit_clock::TickConfig;
use gambit_engine::{UciConfig, UciLauncher};
use gambit_session::{DriverConfig, SessionConfig};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "gambit-server")]
#[command(about = "Two-player chess sessions with clocks and engine opponents")]
struct Args {
    /// Address to listen on
    #[arg(long, env = "GAMBIT_BIND", default_value = "0.0.0.0:8080")]
    bind: String,

    /// UCI engine binary for automated opponents (path or name on PATH)
    #[arg(long, env = "GAMBIT_ENGINE")]
    engine: Option<PathBuf>,

    /// Time each side starts with, in seconds
    #[arg(long, env = "GAMBIT_ALLOTMENT_SECS", default_value_t = 600)]
    allotment_secs: u64,

    /// Search time the engine gets per move, in milliseconds
    #[arg(long, env = "GAMBIT_MOVE_BUDGET_MS", default_value_t = 1000)]
    move_budget_ms: u64,

    /// Background clock check interval in milliseconds
    #[arg(
        long,
        env = "GAMBIT_TICK_MS",
        default_value_t = 100,
        value_parser = clap::value_parser!(u64).range(1..)
    )]
    tick_ms: u64,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();

    let session_config = SessionConfig {
        allotment: Duration::from_secs(args.allotment_secs),
        tick: TickConfig::every(Duration::from_millis(args.tick_ms)).validated(),
        ..SessionConfig::default()
    };
    let driver_config = DriverConfig {
        move_budget: Duration::from_millis(args.move_budget_ms),
        ..DriverConfig::default()
    };

    let builder = GambitServer::builder()
        .bind(&args.bind)
        .session_config(session_config)
        .driver_config(driver_config);

    let builder = match &args.engine {
        Some(program) => {
            let launcher = UciLauncher::locate(program, UciConfig::default())
                .with_context(|| format!("engine {} is not usable", program.display()))?;
            builder.launcher(launcher)
        }
        None => {
            tracing::warn!("no engine configured, automated opponents are disabled");
            builder
        }
    };

    let server = builder
        .build()
        .await
        .with_context(|| format!("failed to bind {}", args.bind))?;
    server.run().await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_args_defaults() {
        let args = Args::try_parse_from(["gambit-server"]).unwrap();
        assert_eq!(args.bind, "0.0.0.0:8080");
        assert_eq!(args.engine, None);
        assert_eq!(args.allotment_secs, 600);
        assert_eq!(args.move_budget_ms, 1000);
        assert_eq!(args.tick_ms, 100);
    }

    #[test]
    fn test_args_zero_tick_interval_rejected() {
        assert!(Args::try_parse_from(["gambit-server", "--tick-ms", "0"]).is_err());
        let args = Args::try_parse_from(["gambit-server", "--tick-ms", "250"]).unwrap();
        assert_eq!(args.tick_ms, 250);
    }
}
