//! External evidence used to resolve legacy owners to new addresses.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::address::{LegacyAddress, NewAddress};

/// A legacy transfer whose memo claims a new address for its payer.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Indicative {
    pub message: IndicativeMessage,
    #[serde(default)]
    pub block_height: u64,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndicativeMessage {
    pub details: TransferDetails,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransferDetails {
    pub source: LegacyAddress,
    pub destination: LegacyAddress,
    #[serde(default)]
    pub memo: String,
}

impl Indicative {
    pub fn new(
        source: impl Into<LegacyAddress>,
        destination: impl Into<LegacyAddress>,
        memo: impl Into<String>,
        block_height: u64,
    ) -> Self {
        Self {
            message: IndicativeMessage {
                details: TransferDetails {
                    source: source.into(),
                    destination: destination.into(),
                    memo: memo.into(),
                },
            },
            block_height,
        }
    }

    pub fn source(&self) -> &LegacyAddress {
        &self.message.details.source
    }

    pub fn memo(&self) -> &str {
        &self.message.details.memo
    }

    /// The new address embedded in the memo, if any.
    pub fn claimed_address(&self) -> Option<NewAddress> {
        NewAddress::find_in(self.memo())
    }
}

/// One holder's premium starnames.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PremiumEntry {
    #[serde(default)]
    pub starnames: Vec<String>,
    /// New address declared by the holder when buying the premium names.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub star1: Option<NewAddress>,
}

/// Legacy address → premium starnames.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PremiumDataset(BTreeMap<LegacyAddress, PremiumEntry>);

impl PremiumDataset {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, iov1: LegacyAddress, entry: PremiumEntry) {
        self.0.insert(iov1, entry);
    }

    pub fn iter(&self) -> impl Iterator<Item = (&LegacyAddress, &PremiumEntry)> {
        self.0.iter()
    }

    /// Every premium domain name, without the leading `*`.
    pub fn domains(&self) -> impl Iterator<Item = &str> {
        self.0
            .values()
            .flat_map(|entry| entry.starnames.iter())
            .map(|starname| starname.trim_start_matches('*'))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<(LegacyAddress, PremiumEntry)> for PremiumDataset {
    fn from_iter<I: IntoIterator<Item = (LegacyAddress, PremiumEntry)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_indicative() {
        let json = r#"{
            "message": { "details": {
                "source": "iov1src",
                "destination": "iov1dst",
                "memo": "star1ml9muux6m8w69532lwsu40caecc3vmg2s9nrtg"
            } },
            "block_height": 99
        }"#;
        let indicative: Indicative = serde_json::from_str(json).unwrap();
        assert_eq!(indicative.source().as_str(), "iov1src");
        assert_eq!(indicative.block_height, 99);
        assert!(indicative.claimed_address().is_some());
    }

    #[test]
    fn premium_domains_strip_star() {
        let dataset: PremiumDataset = serde_json::from_str(
            r#"{ "iov1p": { "starnames": ["*bank", "shop"] } }"#,
        )
        .unwrap();
        let domains: Vec<&str> = dataset.domains().collect();
        assert_eq!(domains, vec!["bank", "shop"]);
    }
}
