//! Policy values the converter needs beyond the registries.

use serde::{Deserialize, Serialize};

use iov_types::{LegacyAddress, NewAddress};

use crate::MigrationError;

/// Release dates for reserved domains, first of each month 2021-03 .. 2021-10 UTC.
///
/// Reserved domains cycle through these so they reach the secondary market
/// gradually instead of all at once.
pub const DEFAULT_RELEASES: [i64; 8] = [
    1_614_556_800, // 2021-03-01
    1_617_235_200, // 2021-04-01
    1_619_827_200, // 2021-05-01
    1_622_505_600, // 2021-06-01
    1_625_097_600, // 2021-07-01
    1_627_776_000, // 2021-08-01
    1_630_454_400, // 2021-09-01
    1_633_046_400, // 2021-10-01
];

/// 2022-01-01 00:00:00 UTC.
pub const DEFAULT_NAME_VALID_UNTIL: i64 = 1_640_995_200;

/// 2022-01-01 00:00:00 UTC.
pub const DEFAULT_PREMIUM_VALID_UNTIL: i64 = 1_640_995_200;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MigrationPolicy {
    /// Multisig registry key of the account that takes custody of
    /// unresolved balances and names.
    pub custodian: LegacyAddress,

    /// Admin of reserved domains until their release date.
    pub reservation_admin: NewAddress,

    /// Release schedule for reserved domains; cycled by index.
    #[serde(default = "default_releases")]
    pub releases: Vec<i64>,

    #[serde(default = "default_name_valid_until")]
    pub name_valid_until: i64,

    #[serde(default = "default_premium_valid_until")]
    pub premium_valid_until: i64,
}

fn default_releases() -> Vec<i64> {
    DEFAULT_RELEASES.to_vec()
}

fn default_name_valid_until() -> i64 {
    DEFAULT_NAME_VALID_UNTIL
}

fn default_premium_valid_until() -> i64 {
    DEFAULT_PREMIUM_VALID_UNTIL
}

impl MigrationPolicy {
    pub fn new(custodian: LegacyAddress, reservation_admin: NewAddress) -> Self {
        Self {
            custodian,
            reservation_admin,
            releases: default_releases(),
            name_valid_until: DEFAULT_NAME_VALID_UNTIL,
            premium_valid_until: DEFAULT_PREMIUM_VALID_UNTIL,
        }
    }

    pub fn validate(&self) -> Result<(), MigrationError> {
        if self.releases.is_empty() {
            return Err(MigrationError::EmptyReleaseSchedule);
        }
        Ok(())
    }

    /// Release date of the `index`-th reserved domain.
    pub fn release_for(&self, index: usize) -> i64 {
        self.releases[index % self.releases.len()]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn policy() -> MigrationPolicy {
        MigrationPolicy::new(
            LegacyAddress::new("iov1custodian"),
            NewAddress::parse("star1ml9muux6m8w69532lwsu40caecc3vmg2s9nrtg").unwrap(),
        )
    }

    #[test]
    fn releases_cycle_mod_eight() {
        let policy = policy();
        assert_eq!(policy.releases.len(), 8);
        for i in 0..24 {
            assert_eq!(policy.release_for(i), DEFAULT_RELEASES[i % 8]);
        }
    }

    #[test]
    fn empty_schedule_is_rejected() {
        let mut policy = policy();
        policy.releases.clear();
        assert!(matches!(
            policy.validate(),
            Err(MigrationError::EmptyReleaseSchedule)
        ));
    }

    #[test]
    fn defaults_apply_when_deserializing() {
        let policy: MigrationPolicy = serde_json::from_str(
            r#"{
                "custodian": "iov1custodian",
                "reservation_admin": "star1ml9muux6m8w69532lwsu40caecc3vmg2s9nrtg"
            }"#,
        )
        .unwrap();
        assert_eq!(policy.releases, DEFAULT_RELEASES.to_vec());
        assert_eq!(policy.name_valid_until, DEFAULT_NAME_VALID_UNTIL);
    }
}
