//! Network-specific overrides of the Starname configuration module.
//!
//! A patch is only ever applied to the chain it was written for: the
//! genesis `chain_id` is checked before anything is changed.

use serde_json::{Map, Value};

use iov_types::{NetworkId, NewAddress};

use crate::compose::object;
use crate::GenesisError;

pub const CONFIGURATION: &[&str] = &["app_state", "configuration", "config"];

const DAY: u64 = 24 * 60 * 60;
const YEAR: u64 = 365 * DAY + DAY / 4;

/// Durations are encoded the way the configuration module parses them.
fn seconds(secs: u64) -> Value {
    Value::from(format!("{secs}s"))
}

pub trait GenesisPatch {
    fn network(&self) -> NetworkId;

    /// Rewrite the configuration object in place.
    fn patch_config(&self, config: &mut Map<String, Value>);

    fn apply(&self, genesis: &mut Value) -> Result<(), GenesisError> {
        let expected = self.network().chain_id();
        let found = genesis.get("chain_id").and_then(Value::as_str).unwrap_or_default();
        if found != expected {
            return Err(GenesisError::NetworkIdentityMismatch {
                expected,
                found: found.to_string(),
            });
        }

        let config = object(genesis, CONFIGURATION)?;
        self.patch_config(config);
        tracing::info!(network = %self.network(), chain_id = expected, "applied genesis patch");
        Ok(())
    }
}

/// Production settings: the configured admin becomes the configurer.
#[derive(Clone, Debug)]
pub struct MainnetPatch {
    pub configurer: NewAddress,
}

impl GenesisPatch for MainnetPatch {
    fn network(&self) -> NetworkId {
        NetworkId::Mainnet
    }

    fn patch_config(&self, config: &mut Map<String, Value>) {
        config.insert("configurer".into(), Value::from(self.configurer.as_str()));
        config.insert("account_grace_period".into(), seconds(30 * DAY));
        config.insert("domain_grace_period".into(), seconds(30 * DAY));
        config.insert("account_renewal_period".into(), seconds(YEAR));
        config.insert("domain_renewal_period".into(), seconds(YEAR));
        config.insert("account_renewal_count_max".into(), Value::from(2));
        config.insert("domain_renewal_count_max".into(), Value::from(2));
    }
}

/// Short periods so expiry paths can be exercised on the test network.
#[derive(Clone, Debug)]
pub struct TestnetPatch {
    pub configurer: NewAddress,
}

impl GenesisPatch for TestnetPatch {
    fn network(&self) -> NetworkId {
        NetworkId::Testnet
    }

    fn patch_config(&self, config: &mut Map<String, Value>) {
        config.insert("configurer".into(), Value::from(self.configurer.as_str()));
        config.insert("account_grace_period".into(), seconds(60 * 60));
        config.insert("domain_grace_period".into(), seconds(60 * 60));
        config.insert("account_renewal_period".into(), seconds(DAY));
        config.insert("domain_renewal_period".into(), seconds(DAY));
    }
}

/// The patch for `network`.
pub fn patch_for(network: NetworkId, configurer: NewAddress) -> Box<dyn GenesisPatch> {
    match network {
        NetworkId::Mainnet => Box::new(MainnetPatch { configurer }),
        NetworkId::Testnet => Box::new(TestnetPatch { configurer }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn admin() -> NewAddress {
        NewAddress::parse(format!("star1{}", "a".repeat(NewAddress::DATA_LEN))).unwrap()
    }

    fn genesis(chain_id: &str) -> Value {
        json!({
            "chain_id": chain_id,
            "app_state": { "configuration": { "config": { "configurer": "star1old" } } },
        })
    }

    #[test]
    fn mainnet_patch_sets_configurer_and_periods() {
        let mut doc = genesis("iov-mainnet-ibc");
        patch_for(NetworkId::Mainnet, admin()).apply(&mut doc).unwrap();

        let config = &doc["app_state"]["configuration"]["config"];
        assert_eq!(config["configurer"], admin().as_str());
        assert_eq!(config["domain_grace_period"], "2592000s");
        assert_eq!(config["account_renewal_period"], "31557600s");
    }

    #[test]
    fn testnet_patch_shortens_periods() {
        let mut doc = genesis("iovns-galaxynet");
        patch_for(NetworkId::Testnet, admin()).apply(&mut doc).unwrap();
        assert_eq!(
            doc["app_state"]["configuration"]["config"]["account_grace_period"],
            "3600s"
        );
    }

    #[test]
    fn wrong_chain_is_rejected_before_any_change() {
        let mut doc = genesis("iovns-galaxynet");
        let before = doc.clone();

        let err = patch_for(NetworkId::Mainnet, admin()).apply(&mut doc).unwrap_err();
        assert!(matches!(
            err,
            GenesisError::NetworkIdentityMismatch { expected: "iov-mainnet-ibc", ref found } if found == "iovns-galaxynet"
        ));
        assert_eq!(doc, before);
    }

    #[test]
    fn missing_configuration_section() {
        let mut doc = json!({ "chain_id": "iov-mainnet-ibc", "app_state": {} });
        assert!(matches!(
            patch_for(NetworkId::Mainnet, admin()).apply(&mut doc),
            Err(GenesisError::MissingSection(_))
        ));
    }
}
