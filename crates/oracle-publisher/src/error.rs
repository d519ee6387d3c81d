use oracle_common::retry::Retryable;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    #[error("malformed message {0}")]
    MalformedMessage(String),

    #[error("transport error {0}")]
    Transport(String),

    #[error("transaction rejected {0}")]
    LedgerRejection(String),

    #[error("configuration error {0}")]
    Configuration(String),

    #[error("provider error {0}")]
    Provider(String),

    #[error("invalid request {0}")]
    InvalidRequest(String),
}

impl Retryable for Error {
    fn is_retryable(&self) -> bool {
        matches!(self, Error::Transport(_))
    }
}

impl From<oracle_attestation::Error> for Error {
    fn from(value: oracle_attestation::Error) -> Self {
        Self::MalformedMessage(value.to_string())
    }
}

impl From<oracle_providers::Error> for Error {
    fn from(value: oracle_providers::Error) -> Self {
        match value {
            e if e.is_transient() => Self::Transport(e.to_string()),
            oracle_providers::Error::Attestation(e) => e.into(),
            e => Self::Provider(e.to_string()),
        }
    }
}

impl From<oracle_starknet::Error> for Error {
    fn from(value: oracle_starknet::Error) -> Self {
        match value {
            oracle_starknet::Error::Transport(e) => Self::Transport(e),
            oracle_starknet::Error::Configuration(e) => Self::Configuration(e),
            e => Self::LedgerRejection(e.to_string()),
        }
    }
}
