use async_trait::async_trait;
use oracle_attestation::CallOperation;
use oracle_common::{measure_duration, metric};
use oracle_starknet::transaction::Calls;
use oracle_starknet::{Client, StarknetAccount, TransactionHash};
use starknet::accounts::Account;
use starknet::core::types::Felt;
use tokio::sync::Mutex;
use tracing::{instrument, warn};

use crate::{Configuration, Error};

/// Sends prepared operations to the ledger
#[async_trait]
pub trait TransactionSubmitter: Send + Sync {
    /// Submits `operations`, in order, as one transaction and returns its hash. Fails with
    /// [`Error::Transport`] when the ledger could not be reached and with
    /// [`Error::LedgerRejection`] when the transaction was refused.
    async fn submit(&self, operations: &[CallOperation]) -> Result<TransactionHash, Error>;
}

/// Submits operations through a Starknet account. The account nonce is cached between two
/// submissions and fetched again after any failure.
pub struct StarknetSubmitter {
    client: Client,
    account: StarknetAccount,

    nonce: Mutex<Option<Felt>>,
}

impl StarknetSubmitter {
    pub fn new(configuration: &Configuration) -> Result<Self, Error> {
        let client = Client::new(&configuration.starknet)?;
        let account = client.initialize_account(&configuration.account);

        Ok(Self {
            client,
            account,
            nonce: Mutex::new(None),
        })
    }

    async fn fetch_nonce(&self, cached: Option<Felt>) -> Result<Felt, Error> {
        match cached {
            Some(nonce) => Ok(nonce),
            None => Ok(self.client.fetch_nonce(self.account.address()).await?),
        }
    }
}

#[async_trait]
impl TransactionSubmitter for StarknetSubmitter {
    #[instrument(name = "submit", skip(self, operations), fields(operations = operations.len()))]
    async fn submit(&self, operations: &[CallOperation]) -> Result<TransactionHash, Error> {
        if operations.is_empty() {
            return Err(Error::InvalidRequest("no operation to submit".to_string()));
        }

        let mut cached = self.nonce.lock().await;

        let nonce = self.fetch_nonce(*cached).await?;
        let calls: Calls = operations.iter().map(CallOperation::as_call).collect();

        let (result, duration) = measure_duration!(calls.execute(&self.account, nonce).await);
        metric!(histogram[submission_duration_milliseconds] = duration.as_millis(), method = "submit");

        match result {
            Ok(value) => {
                *cached = Some(nonce + Felt::ONE);
                metric!(counter[submission] = 1, method = "submit");

                Ok(value.transaction_hash)
            },
            Err(e) => {
                warn!("submission failed, nonce will be fetched again: {}", e);
                metric!(counter[submission_error] = 1, method = "submit", error = e.to_string());

                *cached = None;
                Err(e.into())
            },
        }
    }
}
