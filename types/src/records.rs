//! Records emitted for the new genesis: accounts, starnames and domains.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;
use std::collections::BTreeMap;

use crate::address::{LegacyAddress, NewAddress};
use crate::amount::{Coin, MicroIov, MICRO_DENOM};
use crate::dump::Tags;

/// Tag prefix for custodian provenance entries.
pub const NO_STAR1_TAG_PREFIX: &str = "//no star1 ";

/// A funded account in the new ledger.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct NewAccount {
    pub address: NewAddress,
    pub coins: Vec<Coin>,
    /// Running IOV total, audit only.
    #[serde(rename = "//iov", default, skip_serializing_if = "Option::is_none")]
    pub iov: Option<f64>,
    #[serde(flatten)]
    pub tags: Tags,
}

impl NewAccount {
    pub fn new(address: NewAddress, amount: MicroIov) -> Self {
        Self {
            address,
            coins: vec![Coin::uiov(amount)],
            iov: None,
            tags: Tags::new(),
        }
    }

    /// Current `uiov` balance.
    pub fn balance(&self) -> MicroIov {
        self.coins
            .iter()
            .filter(|c| c.denom == MICRO_DENOM)
            .map(|c| c.amount)
            .sum()
    }

    /// Add to the `uiov` balance and the audit total.
    pub fn credit(&mut self, amount: MicroIov, iov: f64) {
        match self.coins.iter_mut().find(|c| c.denom == MICRO_DENOM) {
            Some(coin) => coin.amount += amount,
            None => self.coins.push(Coin::uiov(amount)),
        }
        self.iov = Some(self.iov.unwrap_or(0.0) + iov);
    }

    /// Fold `other`, an account at the same address, into this one.
    ///
    /// Tags present on both sides with different values become a list.
    pub fn absorb(&mut self, other: NewAccount) {
        self.credit(other.balance(), other.iov.unwrap_or(0.0));
        for (key, value) in other.tags {
            match self.tags.get_mut(&key) {
                None => {
                    self.tags.insert(key, value);
                }
                Some(Value::Array(existing)) => match value {
                    Value::Array(more) => existing.extend(more),
                    value => existing.push(value),
                },
                Some(existing) if *existing == value => {}
                Some(existing) => {
                    let first = existing.take();
                    *existing = Value::Array(vec![first, value]);
                }
            }
        }
    }

    pub fn with_tag(mut self, key: &str, value: impl Into<serde_json::Value>) -> Self {
        self.tags.insert(key.to_string(), value.into());
        self
    }
}

/// One entry in the custodian's record of an unresolved legacy owner.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Provenance {
    /// IOV balance swept into the custodian.
    Balance(f64),
    /// Starname (`name*domain`) or domain (`*domain`) held in custody.
    Starname(String),
}

impl From<&Provenance> for Value {
    fn from(entry: &Provenance) -> Self {
        match entry {
            Provenance::Balance(iov) => Value::from(*iov),
            Provenance::Starname(name) => Value::from(name.as_str()),
        }
    }
}

/// Per unresolved legacy owner, everything the custodian holds for it.
///
/// Always a list per owner, rendered into the custodian account as
/// `"//no star1 <iov1>": [..]` tags.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct CustodianLedger(BTreeMap<LegacyAddress, Vec<Provenance>>);

impl CustodianLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, iov1: &LegacyAddress, entry: Provenance) {
        self.0.entry(iov1.clone()).or_default().push(entry);
    }

    pub fn get(&self, iov1: &LegacyAddress) -> Option<&[Provenance]> {
        self.0.get(iov1).map(Vec::as_slice)
    }

    pub fn contains(&self, iov1: &LegacyAddress) -> bool {
        self.0.contains_key(iov1)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&LegacyAddress, &Vec<Provenance>)> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Write every owner's provenance list into `tags`.
    pub fn render_into(&self, tags: &mut Tags) {
        for (iov1, entries) in &self.0 {
            let value = Value::Array(entries.iter().map(Value::from).collect());
            tags.insert(format!("{NO_STAR1_TAG_PREFIX}{iov1}"), value);
        }
    }
}

/// A resource attached to a starname.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Resource {
    pub uri: String,
    pub resource: String,
}

/// A `name*domain` record in the new name service.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct NameRecord {
    pub domain: String,
    pub name: String,
    pub owner: NewAddress,
    #[serde(with = "unix_string")]
    pub valid_until: i64,
    pub resources: Option<Vec<Resource>>,
    pub certificates: Option<Vec<String>>,
    pub broker: String,
    pub metadata_uri: String,
}

/// Whether anyone may register names under a domain.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DomainKind {
    Open,
    Closed,
}

/// A domain record in the new name service.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DomainRecord {
    pub name: String,
    pub admin: NewAddress,
    #[serde(rename = "type")]
    pub kind: DomainKind,
    #[serde(with = "unix_string")]
    pub valid_until: i64,
    pub broker: String,
}

/// Amino JSON encodes int64 as a decimal string.
mod unix_string {
    use super::*;

    pub fn serialize<S: Serializer>(secs: &i64, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&secs.to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<i64, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}
