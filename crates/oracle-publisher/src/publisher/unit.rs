use oracle_attestation::CallOperation;
use oracle_providers::Asset;

/// Label under which the result of a sequential submission is reported
pub fn label(provider: &str, asset: &Asset) -> String {
    format!("{}:{}", provider, asset.symbol())
}

/// Operations submitted together as a single transaction
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishUnit {
    pub label: String,
    pub operations: Vec<CallOperation>,
}

impl PublishUnit {
    pub fn new(label: String, operations: Vec<CallOperation>) -> Self {
        Self { label, operations }
    }
}
