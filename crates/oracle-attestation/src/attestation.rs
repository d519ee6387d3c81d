use serde::{Deserialize, Serialize};
use starknet::core::types::Felt;

use crate::hex::{decode_hex, remove_0x_if_present};
use crate::layout::{self, MESSAGE_LENGTH, PRICE, TICKER_LENGTH, TICKER_NAME, TIMESTAMP};
use crate::signature::SignatureComponents;
use crate::Error;

/// Attestation as returned by a reporter, not validated yet
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawAttestation {
    pub message_bytes: Vec<u8>,
    pub signature_bytes: Vec<u8>,

    /// Ethereum address of the reporter which signed the message
    pub attester_address_hex: String,
}

impl RawAttestation {
    /// Builds an attestation from its hex representation as served by the reporters' APIs
    pub fn from_hex(message: &str, signature: &str, attester_address: &str) -> Result<Self, Error> {
        Ok(Self {
            message_bytes: decode_hex(message)?,
            signature_bytes: decode_hex(signature)?,
            attester_address_hex: attester_address.to_string(),
        })
    }

    /// Ticker of the asset this attestation is about, if it can be read
    pub fn symbol(&self) -> Option<String> {
        layout::ticker_symbol(&self.message_bytes)
    }

    pub fn decode(&self) -> Result<DecodedAttestation, Error> {
        decode(&self.message_bytes, &self.signature_bytes, parse_address(&self.attester_address_hex)?)
    }
}

/// Fields of an attestation as expected by the `publish_entry` entrypoint. Integers read from
/// the message are kept in the byte order they are read with, the contract is responsible for
/// swapping them back.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecodedAttestation {
    pub ticker: u64,
    pub ticker_length: u64,
    pub timestamp: u64,
    pub price: u64,
    pub signature: SignatureComponents,
    pub attester_address: Felt,
}

/// Extracts the attestation fields from `message` and `signature`. Nothing is returned unless
/// every field could be read.
pub fn decode(message: &[u8], signature: &[u8], attester_address: Felt) -> Result<DecodedAttestation, Error> {
    if message.len() < MESSAGE_LENGTH {
        return Err(Error::MalformedMessage(format!(
            "message must be at least {} bytes long, got {}",
            MESSAGE_LENGTH,
            message.len()
        )));
    }

    let signature = SignatureComponents::decode(signature)?;

    Ok(DecodedAttestation {
        ticker: TICKER_NAME.read_u64(message)?,
        ticker_length: TICKER_LENGTH.read_u64(message)?,
        timestamp: TIMESTAMP.read_u64(message)?,
        price: PRICE.read_u64(message)?,
        signature,
        attester_address,
    })
}

/// An Ethereum address is at most 20 bytes, given in hex with or without `0x` prefix
fn parse_address(value: &str) -> Result<Felt, Error> {
    let digits = remove_0x_if_present(value);
    if digits.is_empty() || digits.len() > 40 || !digits.chars().all(|x| x.is_ascii_hexdigit()) {
        return Err(Error::InvalidAddress(value.to_string()));
    }

    Felt::from_hex(&format!("0x{}", digits)).map_err(|_| Error::InvalidAddress(value.to_string()))
}
