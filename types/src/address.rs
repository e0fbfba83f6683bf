//! Address types for both sides of the migration.
//!
//! Legacy addresses (`iov1…`) come straight out of the dump and are kept as
//! opaque strings, since the dump and the legacy genesis do not always agree
//! on their exact spelling. New addresses (`star1…`) are validated on parse.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::AddressError;

/// A legacy IOV Name Service address, typically `iov1…`.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LegacyAddress(String);

impl LegacyAddress {
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether `other` contains this address as a substring.
    ///
    /// The dump sometimes carries a truncated form of the address found in the
    /// legacy genesis, so lookups between the two match by containment.
    pub fn is_contained_in(&self, other: &str) -> bool {
        !self.0.is_empty() && other.contains(self.0.as_str())
    }
}

impl fmt::Display for LegacyAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for LegacyAddress {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for LegacyAddress {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}

/// A Starname address, always `star1` followed by 38 bech32 characters.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct NewAddress(String);

impl NewAddress {
    /// Human-readable part plus separator.
    pub const PREFIX: &'static str = "star1";

    /// Number of data characters following the prefix.
    pub const DATA_LEN: usize = 38;

    /// The bech32 data alphabet.
    pub const CHARSET: &'static str = "qpzry9x8gf2tvdw0s3jn54khce6mua7l";

    /// Parse and validate a new-scheme address.
    pub fn parse(raw: impl Into<String>) -> Result<Self, AddressError> {
        let s = raw.into();
        let Some(data) = s.strip_prefix(Self::PREFIX) else {
            return Err(AddressError::MissingPrefix(s));
        };
        if data.len() != Self::DATA_LEN {
            return Err(AddressError::InvalidLength {
                address: s.clone(),
                len: s.len(),
            });
        }
        if let Some(c) = data.chars().find(|c| !Self::CHARSET.contains(*c)) {
            return Err(AddressError::InvalidCharacter { address: s, found: c });
        }
        Ok(Self(s))
    }

    /// Find the first embedded new address inside free text, e.g. a memo.
    pub fn find_in(text: &str) -> Option<Self> {
        let total = Self::PREFIX.len() + Self::DATA_LEN;
        text.match_indices(Self::PREFIX).find_map(|(start, _)| {
            let candidate = text.get(start..start + total)?;
            Self::parse(candidate).ok()
        })
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for NewAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<String> for NewAddress {
    type Error = AddressError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::parse(s)
    }
}

impl From<NewAddress> for String {
    fn from(address: NewAddress) -> Self {
        address.0
    }
}
