use std::net::IpAddr;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use spf_check::{logging, Config, HickoryResolver, SpfChecker};

/// Check whether an IP address may send mail for an address's domain
#[derive(Parser, Debug)]
#[command(name = "spf-check")]
#[command(version)]
struct Cli {
    /// The IP to check
    #[arg(long = "ip-address")]
    ip_address: IpAddr,

    /// The email address to check
    #[arg(long)]
    id: String,

    /// TOML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Log level (error, warn, info, debug, trace); overrides LOG_LEVEL
    #[arg(long)]
    log_level: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    logging::init(cli.log_level.as_deref());

    let config = match &cli.config {
        Some(path) => Config::from_file(path)?,
        None => Config::default(),
    };

    let resolver = HickoryResolver::from_config(&config.dns).context("cannot set up DNS resolver")?;
    let checker = SpfChecker::with_config(Arc::new(resolver), &config.resolution);

    let evaluation = checker
        .evaluate(&cli.id, cli.ip_address)
        .await
        .with_context(|| format!("SPF check for {} from {} failed", cli.id, cli.ip_address))?;

    println!("{}", evaluation.outcome());
    Ok(())
}
