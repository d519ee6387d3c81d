use std::fs;
use std::time::Duration;

use oracle_common::retry::RetryPolicy;
use oracle_common::service::monitoring::Configuration as MonitoringConfiguration;
use oracle_providers::{Asset, Configuration as ProviderConfiguration};
use oracle_publisher::{Configuration as PublisherConfiguration, PublishMode};
use oracle_starknet::{Configuration as StarknetConfiguration, ContractAddress, StarknetAccountConfiguration};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use serde_with::serde_as;
use starknet::core::serde::unsigned_field_element::UfeHex;

use crate::core::context::environment::{JSONPath, Variables};
use crate::core::Error;

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VerbosityConfiguration {
    Debug,
    #[default]
    Info,
}

#[serde_as]
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Configuration {
    #[serde(default)]
    pub verbosity: VerbosityConfiguration,
    pub prometheus: Option<MonitoringConfiguration>,

    pub assets: Vec<Asset>,
    #[serde(default)]
    pub mode: PublishMode,

    /// Seconds between two publications, publishes once when absent or zero
    #[serde(default)]
    pub interval: Option<u64>,

    pub providers: Vec<ProviderConfiguration>,

    pub starknet: StarknetConfiguration,
    pub account: StarknetAccountConfiguration,

    #[serde_as(as = "UfeHex")]
    pub oracle: ContractAddress,

    #[serde(default)]
    pub retry: RetryPolicy,
}

impl Configuration {
    pub fn from_profile(profile: &Profile) -> Result<Self, Error> {
        serde_json::from_value(Value::Object(profile.0.clone())).map_err(|e| Error::Configuration(e.to_string()))
    }

    pub fn interval(&self) -> Option<Duration> {
        self.interval.filter(|x| *x > 0).map(Duration::from_secs)
    }

    pub fn publisher(&self) -> PublisherConfiguration {
        PublisherConfiguration {
            starknet: self.starknet.clone(),
            account: self.account,
            oracle: self.oracle,
            retry: self.retry,
        }
    }
}

/// Raw configuration document, assembled from several sources before being parsed
#[derive(Clone, Debug, Default, Deserialize)]
pub struct Profile(Map<String, Value>);

impl Profile {
    pub fn empty() -> Self {
        Self(Map::new())
    }

    pub fn from_file(path: &str) -> Result<Self, Error> {
        let data = fs::read(path).map_err(|e| Error::Configuration(format!("could not read profile {}: {}", path, e)))?;
        let variables: Map<String, Value> = serde_json::from_slice(&data).map_err(|e| Error::Configuration(e.to_string()))?;

        Ok(Self(variables))
    }

    pub fn insert_variables(&mut self, variables: Variables) -> Result<(), Error> {
        for (path, value) in variables {
            self.insert_variable(&path, value)?
        }

        Ok(())
    }

    pub fn insert_variable(&mut self, path: &JSONPath, value: Value) -> Result<(), Error> {
        fn insert_rec(object: &mut Map<String, Value>, path: &[String], value: Value) -> Result<(), Error> {
            match path {
                [] => Ok(()),
                [field] => {
                    object.insert(field.clone(), value);
                    Ok(())
                },
                [field, rest @ ..] => {
                    let inner = object
                        .entry(field.clone())
                        .or_insert(Value::Object(Map::new()))
                        .as_object_mut()
                        .ok_or(Error::Configuration(format!("could not merge variable {} in configuration", field)))?;

                    insert_rec(inner, rest, value)
                },
            }
        }

        insert_rec(&mut self.0, path.segments(), value)
    }
}

#[cfg(test)]
mod tests {
    use oracle_starknet::ChainID;
    use serde_json::json;
    use starknet::macros::felt;

    use super::*;

    fn profile(value: Value) -> Profile {
        let Value::Object(map) = value else { panic!("profile must be an object") };
        Profile(map)
    }

    fn complete() -> Value {
        json!({
            "assets": ["btc", "eth"],
            "providers": [{ "provider": "okx", "endpoint": "https://www.okx.com" }],
            "starknet": { "chain_id": "sepolia", "timeout": 10 },
            "account": { "address": "0x1234", "private_key": "0x5678" },
            "oracle": "0x02de2fd1695a30436230a036d27b8f5b506d1882e0ff61acd418a5348ecb106c"
        })
    }

    #[test]
    fn defaults_are_applied() {
        let configuration = Configuration::from_profile(&profile(complete())).unwrap();

        assert_eq!(configuration.verbosity, VerbosityConfiguration::Info);
        assert_eq!(configuration.mode, PublishMode::Batched);
        assert_eq!(configuration.interval(), None);
        assert_eq!(configuration.retry, RetryPolicy::default());
        assert_eq!(configuration.assets, vec![Asset::new("BTC").unwrap(), Asset::new("ETH").unwrap()]);
        assert!(configuration.prometheus.is_none());
    }

    #[test]
    fn publisher_configuration_is_extracted() {
        let configuration = Configuration::from_profile(&profile(complete())).unwrap();

        let publisher = configuration.publisher();

        assert_eq!(publisher.starknet.chain_id, ChainID::Sepolia);
        assert_eq!(publisher.account.address, felt!("0x1234"));
        assert_eq!(publisher.oracle, configuration.oracle);
    }

    #[test]
    fn missing_account_is_a_configuration_error() {
        let mut value = complete();
        value.as_object_mut().unwrap().remove("account");

        let result = Configuration::from_profile(&profile(value));

        assert!(matches!(result, Err(Error::Configuration(_))));
    }

    #[test]
    fn zero_interval_publishes_once() {
        let mut value = complete();
        value["interval"] = json!(0);
        assert_eq!(Configuration::from_profile(&profile(value.clone())).unwrap().interval(), None);

        value["interval"] = json!(30);
        assert_eq!(Configuration::from_profile(&profile(value)).unwrap().interval(), Some(Duration::from_secs(30)));
    }

    #[test]
    fn variables_are_inserted_at_their_path() {
        let mut profile = profile(complete());

        profile.insert_variable(&JSONPath::parse("starknet.chain_id"), json!("mainnet")).unwrap();
        profile.insert_variable(&JSONPath::parse("retry.attempts"), json!(5)).unwrap();

        let configuration = Configuration::from_profile(&profile).unwrap();
        assert_eq!(configuration.starknet.chain_id, ChainID::Mainnet);
        assert_eq!(configuration.starknet.timeout, 10);
        assert_eq!(configuration.retry.attempts, 5);
    }
}
