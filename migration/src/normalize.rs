//! Structural fixups applied to the raw dump before anything is resolved.
//!
//! Every operation is total over its inputs: a referenced wallet or record
//! that is missing aborts the migration rather than being skipped.

use std::collections::BTreeMap;

use serde_json::Value;

use iov_types::{
    ChainIdTable, Dump, Indicative, LegacyAddress, LegacyGenesis, LegacyGenesisWallet,
    MultisigRegistry, Wallet, TAG_ID, TAG_IOV1, TAG_NAME,
};

use crate::MigrationError;

/// Remove exactly one wallet per address from the dump.
///
/// Returns the removed wallets in the order given. Fails on the first address
/// without a wallet; a repeated address fails on its second occurrence.
pub fn burn(dump: &mut Dump, addresses: &[LegacyAddress]) -> Result<Vec<Wallet>, MigrationError> {
    let mut burned = Vec::with_capacity(addresses.len());
    for address in addresses {
        let index = dump
            .wallet_position(address)
            .ok_or_else(|| MigrationError::not_found("wallet", address))?;
        burned.push(dump.cash.remove(index));
    }
    Ok(burned)
}

/// Log every coin that will not migrate. Returns how many were found.
pub fn warn_foreign_coins(dump: &Dump) -> usize {
    let mut found = 0;
    for wallet in &dump.cash {
        for coin in wallet.foreign_coins() {
            tracing::warn!(
                wallet = %wallet.address,
                ticker = %coin.ticker,
                whole = coin.whole,
                fractional = coin.fractional,
                "dropping non-IOV coin"
            );
            found += 1;
        }
    }
    found
}

/// Tag every registered multisig wallet with its name and legacy address.
pub fn label_multisig_accounts(
    dump: &mut Dump,
    multisigs: &MultisigRegistry,
) -> Result<(), MigrationError> {
    for (iov1, entry) in multisigs.iter() {
        let wallet = dump
            .wallet_mut(iov1)
            .ok_or_else(|| MigrationError::not_found("multisig wallet", iov1))?;
        wallet
            .tags
            .insert(TAG_NAME.to_string(), Value::from(entry.name.clone()));
        wallet
            .tags
            .insert(TAG_IOV1.to_string(), Value::from(iov1.as_str()));
    }
    Ok(())
}

/// Backfill `//id` from the legacy genesis and tag every wallet with its own
/// address. Returns how many wallets received an id.
///
/// Dump addresses can be truncated forms of legacy-genesis addresses, so when
/// there is no exact match the first legacy wallet containing the dump
/// address is used.
pub fn label_all_accounts(dump: &mut Dump, legacy: &LegacyGenesis) -> usize {
    let exact: BTreeMap<&str, &LegacyGenesisWallet> = legacy
        .app_state
        .cash
        .iter()
        .map(|w| (w.address.as_str(), w))
        .collect();

    let mut labelled = 0;
    for wallet in &mut dump.cash {
        let found = exact.get(wallet.address.as_str()).copied().or_else(|| {
            legacy
                .app_state
                .cash
                .iter()
                .find(|w| wallet.address.is_contained_in(&w.address))
        });

        match found.and_then(|w| w.id.clone()) {
            Some(id) => {
                wallet.tags.insert(TAG_ID.to_string(), id);
                labelled += 1;
            }
            None => tracing::debug!(address = %wallet.address, "no legacy genesis id"),
        }
        wallet
            .tags
            .insert(TAG_IOV1.to_string(), Value::from(wallet.address.as_str()));
    }
    labelled
}

/// Rewrite foreign-chain ids on every username target. Returns how many
/// targets changed.
pub fn remap_foreign_chain_ids(dump: &mut Dump, chain_ids: &ChainIdTable) -> usize {
    let mut remapped = 0;
    for target in dump.username.iter_mut().flat_map(|u| u.targets.iter_mut()) {
        if let Some(chain_id) = chain_ids.get(&target.blockchain_id) {
            target.blockchain_id = chain_id.clone();
            remapped += 1;
        }
    }
    remapped
}

/// Sent its IOV to a star1 via an indicative transfer after already being
/// upgraded through a wallet provider; the transfer must not count as evidence.
pub const UPGRADED_INDICATIVE_SOURCE: &str = "iov1yhk8qqp3wsdg7tefd8u457n9zqsny4nqzp6960";

/// Username whose owner lost its key.
pub const RECOVERED_USERNAME: &str = "dave*iov";

/// Recovery owner for [`RECOVERED_USERNAME`].
pub const RECOVERY_OWNER: &str = "iov1q40tvnph5xy7cjmj3tuuzfmxf6f5ucjl5xfvnw";

/// Apply the two known one-off corrections.
pub fn apply_known_corrections(
    dump: &mut Dump,
    indicatives: &mut Vec<Indicative>,
) -> Result<(), MigrationError> {
    drop_upgraded_indicative(indicatives)?;
    reassign_recovered_username(dump)?;
    Ok(())
}

fn drop_upgraded_indicative(indicatives: &mut Vec<Indicative>) -> Result<(), MigrationError> {
    let index = indicatives
        .iter()
        .position(|i| i.source().as_str() == UPGRADED_INDICATIVE_SOURCE)
        .ok_or_else(|| MigrationError::not_found("indicative from", UPGRADED_INDICATIVE_SOURCE))?;
    let removed = indicatives.remove(index);
    tracing::info!(
        source = UPGRADED_INDICATIVE_SOURCE,
        height = removed.block_height,
        "dropped indicative of already-upgraded account"
    );
    Ok(())
}

fn reassign_recovered_username(dump: &mut Dump) -> Result<(), MigrationError> {
    let binding = dump
        .username_mut(RECOVERED_USERNAME)
        .ok_or_else(|| MigrationError::not_found("username", RECOVERED_USERNAME))?;
    tracing::info!(
        username = RECOVERED_USERNAME,
        from = %binding.owner,
        to = RECOVERY_OWNER,
        "reassigned username to recovery owner"
    );
    binding.owner = LegacyAddress::new(RECOVERY_OWNER);
    Ok(())
}
