use std::fmt::{Debug, Display};

use oracle_common::{log_if_error, measure_duration, metric};
use serde::{Deserialize, Serialize};
use serde_with::serde_as;
use starknet::accounts::{AccountError, ExecutionEncoding, SingleOwnerAccount};
use starknet::core::serde::unsigned_field_element::UfeHex;
use starknet::core::types::{BlockId, BlockTag, ContractExecutionError, Felt, StarknetError};
use starknet::providers::{Provider, ProviderError};
use starknet::signers::{LocalWallet, SigningKey};
use thiserror::Error;
use tracing::instrument;

use crate::constants::Endpoint;

pub mod constants;
pub mod transaction;

mod network;
pub use network::ChainID;

mod client;
pub use client::StarknetClient;

pub type StarknetAccount = SingleOwnerAccount<StarknetClient, LocalWallet>;

#[serde_as]
#[derive(Deserialize, Serialize, Debug, Clone, Copy)]
pub struct StarknetAccountConfiguration {
    #[serde_as(as = "UfeHex")]
    pub address: ContractAddress,

    #[serde_as(as = "UfeHex")]
    pub private_key: Felt,
}

pub type ContractAddress = Felt;
pub type TransactionHash = Felt;

#[derive(Error, Debug)]
pub enum Error {
    #[error("configuration error {0}")]
    Configuration(String),

    #[error("transport error {0}")]
    Transport(String),

    #[error("invalid nonce {0}")]
    InvalidNonce(String),

    #[error("contract not found")]
    ContractNotFound,

    #[error("execution error {0:?}")]
    Execution(ContractExecutionError),

    #[error("validation failure {0}")]
    ValidationFailure(String),

    #[error("starknet error {0}")]
    Starknet(String),
}

impl Error {
    /// Returns true when the error comes from the transport layer rather than from the
    /// chain itself, meaning that the same request may succeed if sent again.
    pub fn is_transient(&self) -> bool {
        matches!(self, Error::Transport(_))
    }
}

impl From<ProviderError> for Error {
    fn from(value: ProviderError) -> Self {
        match value {
            ProviderError::StarknetError(StarknetError::InvalidTransactionNonce(value)) => Error::InvalidNonce(value),
            ProviderError::StarknetError(StarknetError::TransactionExecutionError(e)) => Error::Execution(e.execution_error),
            ProviderError::StarknetError(StarknetError::ContractError(e)) => Error::Execution(e.revert_error),
            ProviderError::StarknetError(StarknetError::ContractNotFound) => Error::ContractNotFound,
            ProviderError::StarknetError(StarknetError::ValidationFailure(error)) => Error::ValidationFailure(format!("{:?}", error)),
            ProviderError::Other(e) => Error::Transport(e.to_string()),
            ProviderError::RateLimited => Error::Transport("rate limited".to_string()),
            e => Error::Starknet(e.to_string()),
        }
    }
}

impl<T: Display + Debug> From<AccountError<T>> for Error {
    fn from(value: AccountError<T>) -> Self {
        match value {
            AccountError::Provider(error) => error.into(),
            AccountError::Signing(e) => Error::Configuration(format!("could not sign transaction {}", e)),
            e => Error::Starknet(e.to_string()),
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Configuration {
    pub chain_id: ChainID,

    /// RPC endpoint, the public endpoint of `chain_id` is used when empty
    #[serde(default)]
    pub endpoint: String,

    /// Request timeout in seconds
    pub timeout: u64,
}

impl Configuration {
    pub fn endpoint(&self) -> &str {
        if self.endpoint.is_empty() {
            Endpoint::default_rpc_url(&self.chain_id)
        } else {
            &self.endpoint
        }
    }
}

#[derive(Clone)]
pub struct Client {
    chain_id: ChainID,

    inner: StarknetClient,
}

impl Client {
    pub fn new(configuration: &Configuration) -> Result<Self, Error> {
        Ok(Self {
            chain_id: configuration.chain_id,
            inner: client::connect(configuration.endpoint(), configuration.timeout)?,
        })
    }

    /// Initialize an account using the given account configuration
    pub fn initialize_account(&self, account: &StarknetAccountConfiguration) -> StarknetAccount {
        let signing_key = LocalWallet::from_signing_key(SigningKey::from_secret_scalar(account.private_key));

        let mut account = StarknetAccount::new(self.inner.clone(), signing_key, account.address, self.chain_id.as_felt(), ExecutionEncoding::New);
        account.set_block_id(BlockId::Tag(BlockTag::PreConfirmed));
        account
    }

    /// Fetch the nonce of the given `user`
    #[instrument(name = "fetch_nonce", skip(self))]
    pub async fn fetch_nonce(&self, user: ContractAddress) -> Result<Felt, Error> {
        let (result, duration) = measure_duration!(log_if_error!(self.inner.get_nonce(BlockId::Tag(BlockTag::PreConfirmed), user).await));

        metric!(histogram[starknet_rpc] = duration.as_millis(), method = "get_nonce");
        metric!(on error result => counter [ starknet_rpc_error ] = 1, method = "get_nonce");

        Ok(result?)
    }
}

#[cfg(test)]
mod tests {
    use starknet::core::types::StarknetError;
    use starknet::providers::ProviderError;

    use super::*;

    #[test]
    fn rate_limit_is_transient() {
        let error = Error::from(ProviderError::RateLimited);

        assert!(error.is_transient());
    }

    #[test]
    fn chain_rejections_are_not_transient() {
        let cases = vec![
            ProviderError::StarknetError(StarknetError::InvalidTransactionNonce("nonce too old".to_string())),
            ProviderError::StarknetError(StarknetError::ContractNotFound),
            ProviderError::ArrayLengthMismatch,
        ];

        for case in cases {
            assert!(!Error::from(case).is_transient());
        }
    }

    #[test]
    fn invalid_nonce_keeps_the_node_message() {
        let error = Error::from(ProviderError::StarknetError(StarknetError::InvalidTransactionNonce("nonce too old".to_string())));

        assert!(matches!(error, Error::InvalidNonce(ref message) if message == "nonce too old"));
    }

    #[test]
    fn empty_endpoint_falls_back_to_public_endpoint() {
        let configuration: Configuration = serde_json::from_str(r#"{ "chain_id": "sepolia", "timeout": 10 }"#).unwrap();

        assert_eq!(configuration.endpoint(), Endpoint::default_rpc_url(&ChainID::Sepolia));
    }

    #[test]
    fn account_configuration_is_read_from_hex() {
        let configuration: StarknetAccountConfiguration = serde_json::from_str(r#"{ "address": "0x1234", "private_key": "0xabcd" }"#).unwrap();

        assert_eq!(configuration.address, Felt::from(0x1234u64));
        assert_eq!(configuration.private_key, Felt::from(0xabcdu64));
    }
}
