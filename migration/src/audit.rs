//! Burn ledger and supply accounting.
//!
//! Every wallet removed from the dump is recorded here with the reason it was
//! removed. Only [`BurnReason::Flammable`] destroys supply; every other reason
//! moves the balance into a new-ledger account.

use serde::Serialize;

use iov_types::{LegacyAddress, MicroIov, Wallet};

use crate::MigrationError;

/// Why a wallet left the dump.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum BurnReason {
    /// Explicitly disallowed balance; destroyed.
    Flammable,
    /// Escrow wallet folded into its source's consolidated account.
    Escrow,
    /// Multisig wallet re-created at its registered new address.
    Multisig,
    /// Unresolved owner swept into the custodian account.
    Custodial,
}

impl BurnReason {
    pub fn destroys_supply(&self) -> bool {
        matches!(self, Self::Flammable)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct BurnRecord {
    pub reason: BurnReason,
    pub address: LegacyAddress,
    pub amount: MicroIov,
}

/// Ordered record of every burn performed during a run.
#[derive(Clone, Debug, Default, Serialize)]
#[serde(transparent)]
pub struct BurnLedger {
    records: Vec<BurnRecord>,
}

impl BurnLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, reason: BurnReason, wallet: &Wallet) {
        tracing::trace!(?reason, address = %wallet.address, amount = %wallet.micro(), "burned wallet");
        self.records.push(BurnRecord {
            reason,
            address: wallet.address.clone(),
            amount: wallet.micro(),
        });
    }

    pub fn record_all(&mut self, reason: BurnReason, wallets: &[Wallet]) {
        for wallet in wallets {
            self.record(reason, wallet);
        }
    }

    pub fn records(&self) -> &[BurnRecord] {
        &self.records
    }

    /// Total burned for one reason.
    pub fn total(&self, reason: BurnReason) -> MicroIov {
        self.records
            .iter()
            .filter(|r| r.reason == reason)
            .map(|r| r.amount)
            .sum()
    }

    /// Total supply destroyed.
    pub fn destroyed(&self) -> MicroIov {
        self.records
            .iter()
            .filter(|r| r.reason.destroys_supply())
            .map(|r| r.amount)
            .sum()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Where every micro unit of the original dump ended up.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct SupplyReport {
    /// Total held by the dump before any stage ran.
    pub original: MicroIov,
    /// Total held by converted accounts (multisig, ordinary, custodian).
    pub accounts: MicroIov,
    /// Total held by consolidated escrow accounts.
    pub escrows: MicroIov,
    /// Total explicitly destroyed.
    pub destroyed: MicroIov,
}

impl SupplyReport {
    pub fn accounted(&self) -> MicroIov {
        self.accounts + self.escrows + self.destroyed
    }

    pub fn is_conserved(&self) -> bool {
        self.original == self.accounted()
    }

    pub fn check(&self) -> Result<(), MigrationError> {
        if self.is_conserved() {
            Ok(())
        } else {
            Err(MigrationError::SupplyMismatch {
                expected: self.original,
                actual: self.accounted(),
            })
        }
    }
}
