use iov_types::{LegacyAddress, MicroIov, NewAddress};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum MigrationError {
    #[error("{kind} {key} not found")]
    NotFound { kind: &'static str, key: String },

    #[error("conflicting star1 for {legacy}: {current} vs {claimed}")]
    ConflictingIdentity {
        legacy: LegacyAddress,
        current: NewAddress,
        claimed: NewAddress,
    },

    #[error("indicative transfer from {payer} at height {height} has no star1 in memo {memo:?}")]
    MalformedMemo {
        payer: LegacyAddress,
        height: u64,
        memo: String,
    },

    #[error("unknown escrow source {0}")]
    UnknownEscrowSource(LegacyAddress),

    #[error("username {0:?} is not of the form name*domain")]
    MalformedUsername(String),

    #[error("release schedule for reserved domains is empty")]
    EmptyReleaseSchedule,

    #[error("two migrated accounts share star1 {address}")]
    DuplicateAccount { address: NewAddress },

    #[error("supply not conserved: dump held {expected} uiov, migration accounts for {actual} uiov")]
    SupplyMismatch { expected: MicroIov, actual: MicroIov },
}

impl MigrationError {
    pub(crate) fn not_found(kind: &'static str, key: impl ToString) -> Self {
        Self::NotFound {
            kind,
            key: key.to_string(),
        }
    }
}
