//! The full migration, stage by stage.
//!
//! The dump is borrowed exclusively for the whole run. Each stage reads what
//! the previous one left behind, so the order below is fixed:
//!
//! normalize → resolve → consolidate escrows → convert → check supply.

use std::collections::{BTreeMap, BTreeSet};

use iov_types::{
    ChainIdTable, Dump, EscrowSourceRegistry, IdentityMap, Indicative, LegacyAddress,
    LegacyGenesis, MicroIov, MultisigRegistry, NewAccount, PremiumDataset,
};

use crate::audit::{BurnLedger, BurnReason, SupplyReport};
use crate::convert::{convert, Conversion, ConvertContext};
use crate::escrow::consolidate_escrows;
use crate::normalize::{
    apply_known_corrections, burn, label_all_accounts, label_multisig_accounts,
    remap_foreign_chain_ids, warn_foreign_coins,
};
use crate::policy::MigrationPolicy;
use crate::resolve::resolve_identities;
use crate::MigrationError;

/// Everything a migration run reads besides the dump.
#[derive(Clone, Debug)]
pub struct MigrationInputs {
    pub legacy_genesis: LegacyGenesis,
    pub flammable: Vec<LegacyAddress>,
    pub chain_ids: ChainIdTable,
    pub multisigs: MultisigRegistry,
    pub escrow_sources: EscrowSourceRegistry,
    pub indicatives: Vec<Indicative>,
    pub premiums: PremiumDataset,
    pub reserved: Vec<String>,
    pub policy: MigrationPolicy,
    /// Whether to apply the two known one-off corrections. Only disabled
    /// for dumps that do not come from the production chain.
    pub apply_corrections: bool,
}

/// Result of a successful run.
#[derive(Clone, Debug)]
pub struct MigrationOutput {
    pub conversion: Conversion,
    /// Consolidated escrow accounts keyed by escrow source.
    pub escrows: BTreeMap<LegacyAddress, NewAccount>,
    pub identities: IdentityMap,
    pub burns: BurnLedger,
    pub supply: SupplyReport,
}

impl MigrationOutput {
    /// Converted accounts followed by escrow accounts, in genesis order.
    pub fn all_accounts(&self) -> impl Iterator<Item = &NewAccount> {
        self.conversion.accounts.iter().chain(self.escrows.values())
    }
}

/// Run every stage over `dump`.
///
/// On error the dump may be partially mutated; callers must discard it.
pub fn migrate(dump: &mut Dump, inputs: MigrationInputs) -> Result<MigrationOutput, MigrationError> {
    let MigrationInputs {
        legacy_genesis,
        flammable,
        chain_ids,
        multisigs,
        escrow_sources,
        mut indicatives,
        premiums,
        reserved,
        policy,
        apply_corrections,
    } = inputs;

    let original = dump.total_micro();
    tracing::info!(
        height = dump.height,
        wallets = dump.cash.len(),
        usernames = dump.username.len(),
        escrows = dump.escrow.len(),
        supply = %original,
        "starting migration"
    );

    let foreign = warn_foreign_coins(dump);
    if foreign > 0 {
        tracing::warn!(coins = foreign, "non-IOV coins are not migrated");
    }

    let mut burns = BurnLedger::new();

    let burned = burn(dump, &flammable)?;
    burns.record_all(BurnReason::Flammable, &burned);
    tracing::info!(
        wallets = burned.len(),
        amount = %burns.destroyed(),
        "burned flammable wallets"
    );

    let labelled = label_all_accounts(dump, &legacy_genesis);
    tracing::debug!(labelled, "backfilled legacy genesis ids");
    label_multisig_accounts(dump, &multisigs)?;
    let remapped = remap_foreign_chain_ids(dump, &chain_ids);
    tracing::debug!(remapped, "remapped foreign chain ids");
    if apply_corrections {
        apply_known_corrections(dump, &mut indicatives)?;
    }

    let identities = resolve_identities(dump, &multisigs, &indicatives, &premiums)?;

    let escrows = consolidate_escrows(dump, &escrow_sources, &mut burns)?;

    let ctx = ConvertContext {
        identities: &identities,
        multisigs: &multisigs,
        premiums: &premiums,
        reserved: &reserved,
        policy: &policy,
    };
    let conversion = convert(dump, ctx, &mut burns)?;
    check_distinct_accounts(&conversion, &escrows)?;

    let supply = SupplyReport {
        original,
        accounts: conversion.accounts.iter().map(NewAccount::balance).sum(),
        escrows: escrows.values().map(NewAccount::balance).sum::<MicroIov>(),
        destroyed: burns.destroyed(),
    };
    supply.check()?;
    tracing::info!(
        accounts = conversion.accounts.len() + escrows.len(),
        starnames = conversion.names.len(),
        domains = conversion.domains.len(),
        destroyed = %supply.destroyed,
        "migration complete, supply conserved"
    );

    Ok(MigrationOutput {
        conversion,
        escrows,
        identities,
        burns,
        supply,
    })
}

/// Converted accounts are merged by address already; an escrow landing on
/// any other account's star1 would emit two genesis accounts for it.
fn check_distinct_accounts(
    conversion: &Conversion,
    escrows: &BTreeMap<LegacyAddress, NewAccount>,
) -> Result<(), MigrationError> {
    let mut seen: BTreeSet<_> = conversion.accounts.iter().map(|a| &a.address).collect();
    for account in escrows.values() {
        if !seen.insert(&account.address) {
            return Err(MigrationError::DuplicateAccount {
                address: account.address.clone(),
            });
        }
    }
    Ok(())
}
