//! Target network identifier.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Which Starname network a genesis is being composed for.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NetworkId {
    /// The production network.
    Mainnet,
    /// The public test network.
    Testnet,
}

impl NetworkId {
    /// The `chain_id` a genesis for this network must declare.
    pub fn chain_id(&self) -> &'static str {
        match self {
            Self::Mainnet => "iov-mainnet-ibc",
            Self::Testnet => "iovns-galaxynet",
        }
    }

    /// Human-readable name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Mainnet => "mainnet",
            Self::Testnet => "testnet",
        }
    }
}

impl fmt::Display for NetworkId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for NetworkId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "mainnet" | "main" => Ok(Self::Mainnet),
            "testnet" | "test" | "galaxynet" => Ok(Self::Testnet),
            other => Err(format!("unknown network {other:?}")),
        }
    }
}
