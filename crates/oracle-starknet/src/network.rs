use serde::{Deserialize, Serialize};
use starknet::core::chain_id::{MAINNET, SEPOLIA};
use starknet::core::types::Felt;

/// Represent the chain id which is either Sepolia or Mainnet
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChainID {
    Sepolia,
    Mainnet,
}

impl ChainID {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Sepolia => "sepolia",
            Self::Mainnet => "mainnet",
        }
    }

    pub fn as_felt(&self) -> Felt {
        match self {
            Self::Sepolia => SEPOLIA,
            Self::Mainnet => MAINNET,
        }
    }
}
