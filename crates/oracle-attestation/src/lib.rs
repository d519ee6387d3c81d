use thiserror::Error;

pub mod hex;
pub mod layout;

mod attestation;
pub use attestation::{decode, DecodedAttestation, RawAttestation};

mod signature;
pub use signature::{normalize_recovery_id, split_u256, SignatureComponents};

mod entry;
pub use entry::{build, CallOperation, PublishEntry, PUBLISH_ENTRY_SELECTOR};

#[cfg(feature = "testing")]
pub mod testing;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    #[error("malformed message {0}")]
    MalformedMessage(String),

    #[error("invalid recovery id {0}")]
    InvalidRecoveryId(String),

    #[error("invalid attester address {0}")]
    InvalidAddress(String),
}
