use std::ops::Deref;

use serde::{Deserialize, Serialize};
use starknet::accounts::{Account, AccountError};
use starknet::core::types::{Call, Felt, InvokeTransactionResult};
use starknet::providers::ProviderError;
use tracing::error;

use crate::{Error, StarknetAccount};

/// Values that can be serialized as the calldata of a contract entrypoint
pub trait AsCalldata {
    fn encode(&self) -> Vec<Felt>;
}

/// Ordered list of calls executed atomically in a single invoke transaction
#[derive(Serialize, Deserialize, Debug, Clone, Hash, Default)]
pub struct Calls(Vec<Call>);

impl Deref for Calls {
    type Target = Vec<Call>;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl FromIterator<Call> for Calls {
    fn from_iter<I: IntoIterator<Item = Call>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl Calls {
    /// Sends the calls as one invoke transaction signed by `account`, letting the
    /// account estimate the fee.
    pub async fn execute(&self, account: &StarknetAccount, nonce: Felt) -> Result<InvokeTransactionResult, Error> {
        let result = account.execute_v3(self.to_vec()).nonce(nonce).send().await;

        match &result {
            Err(AccountError::Provider(e @ ProviderError::RateLimited)) => {
                error!("{}", e);
            },
            Err(AccountError::Provider(ProviderError::Other(error))) => {
                error!("{}", error);
            },
            _ => {},
        };

        Ok(result?)
    }
}
