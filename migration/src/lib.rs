//! Migration engine for the IOV Name Service ledger.
//!
//! Takes the dumped legacy state plus registries and evidence, and produces
//! the accounts, starnames and domains of the Starname genesis. Total supply
//! is conserved except for explicitly flammable wallets.

pub mod audit;
pub mod convert;
pub mod error;
pub mod escrow;
pub mod normalize;
pub mod pipeline;
pub mod policy;
pub mod resolve;

pub use audit::{BurnLedger, BurnReason, BurnRecord, SupplyReport};
pub use convert::{convert, Conversion, ConvertContext};
pub use error::MigrationError;
pub use escrow::consolidate_escrows;
pub use normalize::{
    apply_known_corrections, burn, label_all_accounts, label_multisig_accounts,
    remap_foreign_chain_ids, warn_foreign_coins,
};
pub use pipeline::{migrate, MigrationInputs, MigrationOutput};
pub use policy::MigrationPolicy;
pub use resolve::resolve_identities;
