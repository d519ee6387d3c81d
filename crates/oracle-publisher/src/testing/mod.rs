use std::collections::VecDeque;

use async_trait::async_trait;
use oracle_attestation::CallOperation;
use oracle_starknet::TransactionHash;
use starknet::core::types::Felt;
use tokio::sync::Mutex;

use crate::{Error, TransactionSubmitter};

/// Submitter recording every submission. Scripted outcomes are consumed in order, once they are
/// exhausted submissions succeed with hashes `0x1`, `0x2`, ... numbered after the submission
/// count.
#[derive(Debug, Default)]
pub struct MockSubmitter {
    outcomes: Mutex<VecDeque<Result<TransactionHash, Error>>>,
    submissions: Mutex<Vec<Vec<CallOperation>>>,
}

impl MockSubmitter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_outcome(mut self, outcome: Result<TransactionHash, Error>) -> Self {
        self.outcomes.get_mut().push_back(outcome);
        self
    }

    pub fn with_failure(self, error: Error) -> Self {
        self.with_outcome(Err(error))
    }

    /// Every submission received so far, in order
    pub async fn submissions(&self) -> Vec<Vec<CallOperation>> {
        self.submissions.lock().await.clone()
    }
}

#[async_trait]
impl TransactionSubmitter for MockSubmitter {
    async fn submit(&self, operations: &[CallOperation]) -> Result<TransactionHash, Error> {
        let mut submissions = self.submissions.lock().await;
        submissions.push(operations.to_vec());

        match self.outcomes.lock().await.pop_front() {
            Some(outcome) => outcome,
            None => Ok(Felt::from(submissions.len() as u64)),
        }
    }
}
