use oracle_common::retry::RetryPolicy;
use oracle_starknet::{Configuration as StarknetConfiguration, ContractAddress, StarknetAccountConfiguration};
use serde::{Deserialize, Serialize};
use serde_with::serde_as;
use starknet::core::serde::unsigned_field_element::UfeHex;

mod error;
mod publisher;
pub mod submitter;

#[cfg(feature = "testing")]
pub mod testing;

pub use error::Error;
pub use publisher::{label, PublishMode, PublishReport, PublishResult, PublishResults, PublishUnit, Publisher};
pub use submitter::{StarknetSubmitter, TransactionSubmitter};

/// Publisher configuration
#[serde_as]
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Configuration {
    pub starknet: StarknetConfiguration,

    /// Account signing and paying for the publish transactions
    pub account: StarknetAccountConfiguration,

    /// Address of the oracle contract exposing `publish_entry`
    #[serde_as(as = "UfeHex")]
    pub oracle: ContractAddress,

    #[serde(default)]
    pub retry: RetryPolicy,
}

#[cfg(test)]
mod tests {
    use oracle_starknet::ChainID;
    use starknet::macros::felt;

    use super::*;

    #[test]
    fn configuration_is_read_from_json() {
        let configuration: Configuration = serde_json::from_str(
            r#"{
                "starknet": { "chain_id": "sepolia", "timeout": 10 },
                "account": { "address": "0x1234", "private_key": "0x5678" },
                "oracle": "0x02de2fd1695a30436230a036d27b8f5b506d1882e0ff61acd418a5348ecb106c"
            }"#,
        )
        .unwrap();

        assert_eq!(configuration.starknet.chain_id, ChainID::Sepolia);
        assert_eq!(configuration.account.address, felt!("0x1234"));
        assert_eq!(configuration.oracle, felt!("0x02de2fd1695a30436230a036d27b8f5b506d1882e0ff61acd418a5348ecb106c"));
        assert_eq!(configuration.retry, RetryPolicy::default());
    }

    #[test]
    fn retry_policy_can_be_overridden() {
        let configuration: Configuration = serde_json::from_str(
            r#"{
                "starknet": { "chain_id": "mainnet", "timeout": 10 },
                "account": { "address": "0x1234", "private_key": "0x5678" },
                "oracle": "0x1",
                "retry": { "attempts": 5 }
            }"#,
        )
        .unwrap();

        assert_eq!(configuration.retry.attempts, 5);
        assert_eq!(configuration.retry.backoff, RetryPolicy::default().backoff);
    }
}
