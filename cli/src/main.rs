//! iov-migrate: turn a legacy IOV ledger dump into a Starname genesis.

mod config;
mod inputs;

use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::{Duration, Instant};

use anyhow::Context;
use clap::Parser;

use iov_genesis::{compose, patch_for, write_genesis, GentxCollector};
use iov_migration::{migrate, MigrationOutput};
use iov_types::NetworkId;
use iov_utils::{format_duration, init_logging, LogFormat};

use crate::config::MigrationConfig;
use crate::inputs::{load_dump, load_inputs};

#[derive(Parser)]
#[command(name = "iov-migrate", about = "Migrate the IOV Name Service ledger to a Starname genesis")]
struct Cli {
    /// Path to the TOML migration configuration.
    #[arg(long, env = "IOV_MIGRATE_CONFIG")]
    config: PathBuf,

    /// Chain home directory; overrides the config file.
    #[arg(long, env = "IOV_MIGRATE_HOME")]
    home: Option<PathBuf>,

    /// Network patch to apply: "mainnet" or "testnet".
    #[arg(long, env = "IOV_MIGRATE_NETWORK")]
    network: Option<NetworkId>,

    /// Directory of validator gentxs to collect.
    #[arg(long, env = "IOV_MIGRATE_GENTX_DIR")]
    gentx_dir: Option<PathBuf>,

    /// Chain binary used to collect gentxs.
    #[arg(long, env = "IOV_MIGRATE_CHAIN_BINARY")]
    chain_binary: Option<PathBuf>,

    /// Skip the known one-off corrections (for dumps of non-production chains).
    #[arg(long, env = "IOV_MIGRATE_NO_CORRECTIONS")]
    no_corrections: bool,

    /// Log level: "trace", "debug", "info", "warn", "error".
    #[arg(long, env = "IOV_MIGRATE_LOG_LEVEL")]
    log_level: Option<String>,

    /// Log format: "human" or "json".
    #[arg(long, env = "IOV_MIGRATE_LOG_FORMAT")]
    log_format: Option<LogFormat>,
}

impl Cli {
    /// Flags and env vars take precedence over the file.
    fn override_config(&self, mut config: MigrationConfig) -> MigrationConfig {
        if let Some(home) = &self.home {
            config.home = home.clone();
        }
        if self.network.is_some() {
            config.network = self.network;
        }
        if let Some(dir) = &self.gentx_dir {
            config.gentx_dir = Some(dir.clone());
        }
        if let Some(binary) = &self.chain_binary {
            config.chain_binary = binary.clone();
        }
        if self.no_corrections {
            config.apply_corrections = false;
        }
        if let Some(level) = &self.log_level {
            config.log_level = level.clone();
        }
        if let Some(format) = self.log_format {
            config.log_format = format;
        }
        config
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let config = MigrationConfig::from_toml_file(&cli.config).map(|c| cli.override_config(c));
    match &config {
        Ok(config) => init_logging(config.log_format, &config.log_level),
        Err(_) => init_logging(
            cli.log_format.unwrap_or_default(),
            cli.log_level.as_deref().unwrap_or("info"),
        ),
    }

    let result = match config {
        Ok(config) => run(config).await,
        Err(err) => Err(err),
    };
    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            tracing::error!(error = %format!("{err:#}"), "migration failed");
            ExitCode::FAILURE
        }
    }
}

async fn run(config: MigrationConfig) -> anyhow::Result<()> {
    let started = Instant::now();

    let mut dump = load_dump(&config.dump)?;
    let inputs = load_inputs(&config)?;
    let mut genesis = iov_genesis::read_json(&config.template)
        .with_context(|| format!("loading template {}", config.template.display()))?;

    let output = migrate(&mut dump, inputs).context("migrating dump")?;
    for record in output.burns.records() {
        if record.reason.destroys_supply() {
            tracing::info!(wallet = %record.address, amount = %record.amount, "destroyed balance");
        }
    }

    compose(&mut genesis, &output).context("composing genesis")?;
    if let Some(network) = config.network {
        patch_for(network, config.policy.reservation_admin.clone())
            .apply(&mut genesis)
            .with_context(|| format!("applying {network} patch"))?;
    }

    // nothing is written until every in-memory stage has succeeded
    let path = write_genesis(&config.home, &genesis)?;
    if let Some(out) = &config.identity_map_out {
        write_identity_map(out, &output)?;
    }

    if let Some(dir) = &config.gentx_dir {
        GentxCollector::new(&config.chain_binary)
            .with_timeout(Duration::from_secs(config.gentx_timeout_secs))
            .collect(&config.home, dir)
            .await
            .context("collecting gentxs")?;
    }

    tracing::info!(
        genesis = %path.display(),
        accounts = output.all_accounts().count(),
        starnames = output.conversion.names.len(),
        domains = output.conversion.domains.len(),
        custodial_owners = output.conversion.custodian.len(),
        burned = %output.supply.destroyed,
        elapsed = %format_duration(started.elapsed().as_secs()),
        "migration finished"
    );
    Ok(())
}

fn write_identity_map(path: &Path, output: &MigrationOutput) -> anyhow::Result<()> {
    let value = serde_json::to_value(&output.identities)?;
    let text = iov_genesis::to_canonical_string(&value)?;
    std::fs::write(path, text).with_context(|| format!("writing {}", path.display()))?;
    tracing::info!(
        path = %path.display(),
        entries = output.identities.len(),
        "wrote identity map"
    );
    Ok(())
}
