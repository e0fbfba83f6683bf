//! The legacy ledger as dumped from the IOV Name Service chain.
//!
//! Only the sections the migration touches are typed; everything else is
//! carried through untouched in flattened maps so nothing is lost on re-write.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

use crate::address::LegacyAddress;
use crate::amount::{iov_float_total, iov_micro_total, LegacyCoin, MicroIov};

/// Debug-only provenance tags, serialized as `//`-prefixed JSON keys.
pub type Tags = BTreeMap<String, Value>;

/// Tag holding the legacy genesis id of a wallet.
pub const TAG_ID: &str = "//id";
/// Tag holding the legacy address a record came from.
pub const TAG_IOV1: &str = "//iov1";
/// Tag holding a human-readable account name.
pub const TAG_NAME: &str = "//name";

/// Separator between name and domain in a starname.
pub const STARNAME_SEPARATOR: char = '*';

fn null_as_empty<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Option::<Vec<T>>::deserialize(deserializer)?.unwrap_or_default())
}

/// The full dumped state of the legacy chain.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Dump {
    #[serde(default, deserialize_with = "null_as_empty")]
    pub cash: Vec<Wallet>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub username: Vec<UsernameBinding>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub escrow: Vec<Escrow>,
    #[serde(default)]
    pub contract: Value,
    #[serde(default)]
    pub height: u64,
    #[serde(flatten)]
    pub rest: Tags,
}

impl Dump {
    pub fn wallet(&self, address: &LegacyAddress) -> Option<&Wallet> {
        self.cash.iter().find(|w| &w.address == address)
    }

    pub fn wallet_mut(&mut self, address: &LegacyAddress) -> Option<&mut Wallet> {
        self.cash.iter_mut().find(|w| &w.address == address)
    }

    pub fn wallet_position(&self, address: &LegacyAddress) -> Option<usize> {
        self.cash.iter().position(|w| &w.address == address)
    }

    pub fn username_mut(&mut self, username: &str) -> Option<&mut UsernameBinding> {
        self.username.iter_mut().find(|u| u.username == username)
    }

    /// Sum of every wallet's IOV balance.
    pub fn total_micro(&self) -> MicroIov {
        self.cash.iter().map(Wallet::micro).sum()
    }
}

/// A legacy wallet.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Wallet {
    pub address: LegacyAddress,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub coins: Vec<LegacyCoin>,
    #[serde(flatten)]
    pub tags: Tags,
}

impl Wallet {
    pub fn new(address: impl Into<LegacyAddress>, coins: Vec<LegacyCoin>) -> Self {
        Self {
            address: address.into(),
            coins,
            tags: Tags::new(),
        }
    }

    pub fn micro(&self) -> MicroIov {
        iov_micro_total(&self.coins)
    }

    pub fn iov(&self) -> f64 {
        iov_float_total(&self.coins)
    }

    /// Coins of any ticker other than IOV; these do not migrate.
    pub fn foreign_coins(&self) -> impl Iterator<Item = &LegacyCoin> {
        self.coins.iter().filter(|c| !c.is_iov())
    }

    pub fn tag(&self, key: &str) -> Option<&Value> {
        self.tags.get(key)
    }
}

/// A resource target attached to a legacy username.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Target {
    pub blockchain_id: String,
    pub address: String,
}

/// A legacy `name*domain` binding.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct UsernameBinding {
    #[serde(rename = "Username", alias = "username")]
    pub username: String,
    #[serde(rename = "Owner", alias = "owner")]
    pub owner: LegacyAddress,
    #[serde(
        rename = "Targets",
        alias = "targets",
        default,
        deserialize_with = "null_as_empty"
    )]
    pub targets: Vec<Target>,
    #[serde(flatten)]
    pub tags: Tags,
}

impl UsernameBinding {
    pub fn new(username: impl Into<String>, owner: impl Into<LegacyAddress>) -> Self {
        Self {
            username: username.into(),
            owner: owner.into(),
            targets: Vec::new(),
            tags: Tags::new(),
        }
    }

    /// Split `name*domain` into its parts.
    pub fn split(&self) -> Option<(&str, &str)> {
        self.username.split_once(STARNAME_SEPARATOR)
    }
}

/// A time-locked legacy escrow.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Escrow {
    pub source: LegacyAddress,
    pub address: LegacyAddress,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub amount: Vec<LegacyCoin>,
    /// Release time, unix seconds.
    pub timeout: i64,
    #[serde(flatten)]
    pub rest: Tags,
}

/// The legacy chain's own genesis, used only to backfill wallet ids.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct LegacyGenesis {
    #[serde(default)]
    pub app_state: LegacyAppState,
    #[serde(flatten)]
    pub rest: Tags,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct LegacyAppState {
    #[serde(default, deserialize_with = "null_as_empty")]
    pub cash: Vec<LegacyGenesisWallet>,
    #[serde(flatten)]
    pub rest: Tags,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct LegacyGenesisWallet {
    pub address: String,
    #[serde(rename = "//id", default, skip_serializing_if = "Option::is_none")]
    pub id: Option<Value>,
    #[serde(flatten)]
    pub rest: Tags,
}
