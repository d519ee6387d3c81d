use starknet::core::types::U256;

use crate::layout::{SIGNATURE, SIGNATURE_LENGTH, SIGNATURE_R, SIGNATURE_S, SIGNATURE_V};
use crate::Error;

/// Splits `value` into its `(low, high)` 128 bits halves, the representation of a `u256`
/// expected by Cairo contracts
pub fn split_u256(value: U256) -> (u128, u128) {
    (value.low(), value.high())
}

/// Normalizes an Ethereum recovery id to {0, 1}. Ids 27 and 28 are shifted down by 27,
/// ids already in {0, 1} are kept and any other value is rejected.
pub fn normalize_recovery_id(v: U256) -> Result<u8, Error> {
    if v.high() != 0 {
        return Err(Error::InvalidRecoveryId(format!("{:#x}{:032x}", v.high(), v.low())));
    }

    match v.low() {
        v @ (0 | 1) => Ok(v as u8),
        v @ (27 | 28) => Ok((v - 27) as u8),
        v => Err(Error::InvalidRecoveryId(v.to_string())),
    }
}

/// ECDSA signature of an attestation with a normalized recovery id
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SignatureComponents {
    pub r: U256,
    pub s: U256,
    pub v: u8,
}

impl SignatureComponents {
    /// Reads a `r || s || v` signature which must be exactly [`SIGNATURE_LENGTH`] bytes long
    pub fn decode(signature: &[u8]) -> Result<Self, Error> {
        if signature.len() != SIGNATURE_LENGTH {
            return Err(Error::MalformedMessage(format!(
                "signature must be {} bytes long, got {}",
                SIGNATURE.required_length(),
                signature.len()
            )));
        }

        Ok(Self {
            r: SIGNATURE_R.read_u256(signature)?,
            s: SIGNATURE_S.read_u256(signature)?,
            v: normalize_recovery_id(SIGNATURE_V.read_u256(signature)?)?,
        })
    }

    pub fn r(&self) -> (u128, u128) {
        split_u256(self.r)
    }

    pub fn s(&self) -> (u128, u128) {
        split_u256(self.s)
    }
}
