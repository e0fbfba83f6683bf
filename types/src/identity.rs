//! Legacy → new address resolution table.

use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};
use std::collections::BTreeMap;

use crate::address::{LegacyAddress, NewAddress};

/// What is known about a legacy address's new-scheme identity.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Resolution {
    /// The owner's new address.
    Resolved(NewAddress),
    /// The owner was seen but has no known new address.
    KnownAbsent,
}

impl Resolution {
    pub fn address(&self) -> Option<&NewAddress> {
        match self {
            Self::Resolved(address) => Some(address),
            Self::KnownAbsent => None,
        }
    }
}

/// Legacy address → [`Resolution`]. A missing key means "never seen".
///
/// Serializes as `{ "iov1…": "star1…" | false }`.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct IdentityMap(BTreeMap<LegacyAddress, Resolution>);

impl IdentityMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, iov1: &LegacyAddress) -> Option<&Resolution> {
        self.0.get(iov1)
    }

    /// The resolved new address, if any.
    pub fn resolve(&self, iov1: &LegacyAddress) -> Option<&NewAddress> {
        self.0.get(iov1).and_then(Resolution::address)
    }

    /// Whether the address is unknown or known to be absent.
    pub fn is_unresolved(&self, iov1: &LegacyAddress) -> bool {
        self.resolve(iov1).is_none()
    }

    pub fn set(&mut self, iov1: LegacyAddress, star1: NewAddress) -> Option<Resolution> {
        self.0.insert(iov1, Resolution::Resolved(star1))
    }

    pub fn mark_absent(&mut self, iov1: LegacyAddress) {
        self.0.insert(iov1, Resolution::KnownAbsent);
    }

    pub fn iter(&self) -> impl Iterator<Item = (&LegacyAddress, &Resolution)> {
        self.0.iter()
    }

    /// Number of addresses with a resolved new address.
    pub fn resolved_count(&self) -> usize {
        self.0.values().filter(|r| r.address().is_some()).count()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl Serialize for IdentityMap {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (iov1, resolution) in &self.0 {
            match resolution {
                Resolution::Resolved(star1) => map.serialize_entry(iov1, star1)?,
                Resolution::KnownAbsent => map.serialize_entry(iov1, &false)?,
            }
        }
        map.end()
    }
}
