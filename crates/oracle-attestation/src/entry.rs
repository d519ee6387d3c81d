use oracle_starknet::transaction::AsCalldata;
use oracle_starknet::ContractAddress;
use starknet::core::types::{Call, Felt};
use starknet::macros::selector;

use crate::attestation::DecodedAttestation;

pub const PUBLISH_ENTRY_SELECTOR: Felt = selector!("publish_entry");

/// Arguments of `publish_entry`. The argument order is the one of [`PublishEntry::FIELDS`],
/// which is the only place where it is defined.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PublishEntry {
    pub t_little: u64,
    pub p_little: u64,
    pub ticker_len_little: u64,
    pub ticker_name_little: u64,
    pub r_low: u128,
    pub r_high: u128,
    pub s_low: u128,
    pub s_high: u128,
    pub v: u8,
    pub eth_address: Felt,
}

impl PublishEntry {
    pub const FIELDS: [&'static str; 10] = [
        "t_little",
        "p_little",
        "ticker_len_little",
        "ticker_name_little",
        "r_low",
        "r_high",
        "s_low",
        "s_high",
        "v",
        "eth_address",
    ];

    /// Named arguments in calldata order
    pub fn arguments(&self) -> [(&'static str, Felt); 10] {
        let values = [
            Felt::from(self.t_little),
            Felt::from(self.p_little),
            Felt::from(self.ticker_len_little),
            Felt::from(self.ticker_name_little),
            Felt::from(self.r_low),
            Felt::from(self.r_high),
            Felt::from(self.s_low),
            Felt::from(self.s_high),
            Felt::from(self.v),
            self.eth_address,
        ];

        let mut arguments = [("", Felt::ZERO); 10];
        for (i, value) in values.into_iter().enumerate() {
            arguments[i] = (Self::FIELDS[i], value);
        }

        arguments
    }
}

impl From<&DecodedAttestation> for PublishEntry {
    fn from(value: &DecodedAttestation) -> Self {
        let (r_low, r_high) = value.signature.r();
        let (s_low, s_high) = value.signature.s();

        Self {
            t_little: value.timestamp,
            p_little: value.price,
            ticker_len_little: value.ticker_length,
            ticker_name_little: value.ticker,
            r_low,
            r_high,
            s_low,
            s_high,
            v: value.signature.v,
            eth_address: value.attester_address,
        }
    }
}

impl AsCalldata for PublishEntry {
    fn encode(&self) -> Vec<Felt> {
        self.arguments().iter().map(|(_, value)| *value).collect()
    }
}

/// A `publish_entry` invocation on the oracle contract
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CallOperation {
    pub oracle: ContractAddress,
    pub entry: PublishEntry,
}

impl CallOperation {
    pub fn new(oracle: ContractAddress, entry: PublishEntry) -> Self {
        Self { oracle, entry }
    }

    pub fn as_call(&self) -> Call {
        Call {
            to: self.oracle,
            selector: PUBLISH_ENTRY_SELECTOR,
            calldata: self.entry.encode(),
        }
    }
}

/// Prepares the `publish_entry` call on `oracle` for the given attestation
pub fn build(oracle: ContractAddress, decoded: &DecodedAttestation) -> CallOperation {
    CallOperation::new(oracle, PublishEntry::from(decoded))
}
