use std::path::PathBuf;

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use itsm_db::DbConfig;
use tracing_subscriber::EnvFilter;

mod codes;
mod migrate;

#[derive(Parser)]
#[command(version, about, long_about = None)]
#[command(propagate_version = true)]
#[command(name = "itsm-admin")]
struct Cli {
    #[command(flatten)]
    common: CommonArgs,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct CommonArgs {
    /// YAML file with a `database` section; `ITSM_DATABASE__*` variables override it
    #[arg(short = 'c', long, global = true)]
    config: Option<PathBuf>,

    /// Log verbosity (-v debug, -vv trace); `RUST_LOG` wins when set
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Commands {
    /// Apply pending schema migrations
    Migrate(migrate::MigrateArgs),
    /// Print the next free business code of a series
    NextCode(codes::NextCodeArgs),
    /// Print the effective database configuration and exit
    Config,
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.common.verbose);

    if let Some(path) = &cli.common.config
        && !path.is_file()
    {
        anyhow::bail!("config file does not exist: {}", path.display());
    }
    let cfg = DbConfig::load(cli.common.config.as_deref()).context("loading configuration")?;

    match cli.command {
        Commands::Migrate(args) => args.run(&cfg).await,
        Commands::NextCode(args) => args.run(&cfg).await,
        Commands::Config => print_config(cfg),
    }
}

fn print_config(mut cfg: DbConfig) -> anyhow::Result<()> {
    cfg.dsn = itsm_db::redact_dsn(&cfg.dsn);
    println!("{}", serde_json::to_string_pretty(&cfg)?);
    Ok(())
}
