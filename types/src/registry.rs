//! Static registries supplied by configuration.
//!
//! These used to be module-level tables; here they are plain values that the
//! caller loads once and hands to each stage that needs them.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::address::{LegacyAddress, NewAddress};

/// A known multisig account and its pre-agreed new address.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MultisigEntry {
    /// Human-readable purpose, e.g. "custodian of missing star1 accounts".
    pub name: String,
    pub star1: NewAddress,
    /// Legacy multisig condition id, kept for audit.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cond: Option<String>,
}

/// Legacy multisig address → new multisig account.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MultisigRegistry(BTreeMap<LegacyAddress, MultisigEntry>);

impl MultisigRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, iov1: LegacyAddress, entry: MultisigEntry) {
        self.0.insert(iov1, entry);
    }

    pub fn get(&self, iov1: &LegacyAddress) -> Option<&MultisigEntry> {
        self.0.get(iov1)
    }

    /// Entries in address order.
    pub fn iter(&self) -> impl Iterator<Item = (&LegacyAddress, &MultisigEntry)> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<(LegacyAddress, MultisigEntry)> for MultisigRegistry {
    fn from_iter<I: IntoIterator<Item = (LegacyAddress, MultisigEntry)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// Where the escrows funded by one source are consolidated.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EscrowTarget {
    pub name: String,
    pub star1: NewAddress,
}

/// Escrow source → consolidation target.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EscrowSourceRegistry(BTreeMap<LegacyAddress, EscrowTarget>);

impl EscrowSourceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, source: LegacyAddress, target: EscrowTarget) {
        self.0.insert(source, target);
    }

    pub fn get(&self, source: &LegacyAddress) -> Option<&EscrowTarget> {
        self.0.get(source)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<(LegacyAddress, EscrowTarget)> for EscrowSourceRegistry {
    fn from_iter<I: IntoIterator<Item = (LegacyAddress, EscrowTarget)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// Legacy foreign-chain identifier → current identifier.
pub type ChainIdTable = BTreeMap<String, String>;
