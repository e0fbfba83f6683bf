//! Fundamental types for the IOV → Starname genesis migration.
//!
//! This crate defines the data shared by every other crate in the workspace:
//! both address schemes, token amounts, the legacy dump, identity evidence,
//! static registries, and the records emitted into the new genesis.

pub mod address;
pub mod amount;
pub mod dump;
pub mod error;
pub mod evidence;
pub mod identity;
pub mod network;
pub mod records;
pub mod registry;

pub use address::{LegacyAddress, NewAddress};
pub use amount::{Coin, LegacyCoin, MicroIov, IOV_TICKER, MICRO_DENOM};
pub use dump::{
    Dump, Escrow, LegacyGenesis, LegacyGenesisWallet, Tags, Target, UsernameBinding, Wallet,
    TAG_ID, TAG_IOV1, TAG_NAME,
};
pub use error::AddressError;
pub use evidence::{Indicative, PremiumDataset, PremiumEntry};
pub use identity::{IdentityMap, Resolution};
pub use network::NetworkId;
pub use records::{
    CustodianLedger, DomainKind, DomainRecord, NameRecord, NewAccount, Provenance, Resource,
};
pub use registry::{ChainIdTable, EscrowSourceRegistry, EscrowTarget, MultisigEntry, MultisigRegistry};
