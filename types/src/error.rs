//! Errors raised while parsing migration types.

use thiserror::Error;

/// An address that does not conform to the new `star1` scheme.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AddressError {
    #[error("address {0} does not start with star1")]
    MissingPrefix(String),

    #[error("address {address} has length {len}, expected 43")]
    InvalidLength { address: String, len: usize },

    #[error("address {address} contains non-bech32 character {found:?}")]
    InvalidCharacter { address: String, found: char },
}
