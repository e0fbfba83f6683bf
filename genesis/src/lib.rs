//! Starname genesis assembly.
//!
//! Everything after the in-memory migration: appending its output to a
//! genesis template, network patches, canonical serialization, and the
//! gentx round-trip through the chain binary.

pub mod compose;
pub mod error;
pub mod gentx;
pub mod patch;
pub mod serialize;

pub use compose::{auth_account, compose};
pub use error::GenesisError;
pub use gentx::GentxCollector;
pub use patch::{patch_for, GenesisPatch, MainnetPatch, TestnetPatch};
pub use serialize::{genesis_path, normalize_genesis, read_json, to_canonical_string, write_genesis};
