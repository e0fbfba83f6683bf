//! Loading the JSON inputs named by the configuration.

use std::path::Path;

use anyhow::Context;
use serde::de::DeserializeOwned;

use iov_migration::MigrationInputs;
use iov_types::{Dump, Indicative, LegacyAddress, LegacyGenesis, PremiumDataset};

use crate::config::MigrationConfig;

pub fn read_json<T: DeserializeOwned>(path: &Path) -> anyhow::Result<T> {
    let text =
        std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("decoding {}", path.display()))
}

fn read_optional<T: DeserializeOwned + Default>(path: Option<&Path>) -> anyhow::Result<T> {
    match path {
        Some(path) => read_json(path),
        None => Ok(T::default()),
    }
}

pub fn load_dump(path: &Path) -> anyhow::Result<Dump> {
    let dump: Dump = read_json(path)?;
    tracing::info!(
        path = %path.display(),
        height = dump.height,
        wallets = dump.cash.len(),
        usernames = dump.username.len(),
        escrows = dump.escrow.len(),
        "loaded dump"
    );
    Ok(dump)
}

/// Indicative transfers whose memo carries a star1 address.
pub fn keep_indicatives(all: Vec<Indicative>) -> Vec<Indicative> {
    let total = all.len();
    let kept: Vec<Indicative> = all
        .into_iter()
        .filter(|i| i.claimed_address().is_some())
        .collect();
    tracing::info!(total, kept = kept.len(), "filtered indicative transfers");
    kept
}

/// Reserved names a domain can actually be registered under:
/// 4 to 16 of `a-z`, `0-9`, `-`, `_`, `.`.
pub fn is_reservable(name: &str) -> bool {
    (4..=16).contains(&name.len())
        && name
            .bytes()
            .all(|b| matches!(b, b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.'))
}

pub fn keep_reserved(all: Vec<String>) -> Vec<String> {
    let total = all.len();
    let kept: Vec<String> = all.into_iter().filter(|n| is_reservable(n)).collect();
    tracing::info!(total, kept = kept.len(), "filtered reserved names");
    kept
}

/// Everything the pipeline reads besides the dump.
pub fn load_inputs(config: &MigrationConfig) -> anyhow::Result<MigrationInputs> {
    let legacy_genesis: LegacyGenesis = read_optional(config.legacy_genesis.as_deref())?;
    let flammable: Vec<LegacyAddress> = read_optional(config.flammable.as_deref())?;
    let indicatives: Vec<Indicative> = read_optional(config.indicatives.as_deref())?;
    let premiums: PremiumDataset = read_optional(config.premiums.as_deref())?;
    let reserved: Vec<String> = read_optional(config.reserved.as_deref())?;

    Ok(MigrationInputs {
        legacy_genesis,
        flammable,
        chain_ids: config.chain_ids.clone(),
        multisigs: config.multisigs.clone(),
        escrow_sources: config.escrow_sources.clone(),
        indicatives: keep_indicatives(indicatives),
        premiums,
        reserved: keep_reserved(reserved),
        policy: config.policy.clone(),
        apply_corrections: config.apply_corrections,
    })
}
