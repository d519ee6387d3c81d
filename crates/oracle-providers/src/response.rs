use std::collections::HashMap;

use oracle_attestation::RawAttestation;
use serde::Deserialize;
use tracing::warn;

use crate::{Asset, Error};

/// Signed payload served by open-oracle reporters. Messages and signatures are paired by
/// position.
#[derive(Deserialize, Debug, Clone, Default)]
pub struct OpenOraclePayload {
    #[serde(default)]
    pub messages: Vec<String>,

    #[serde(default)]
    pub signatures: Vec<String>,
}

impl OpenOraclePayload {
    /// Returns the attestations of `assets`, in the same order. Entries that cannot be decoded are
    /// skipped, so only a requested asset without a usable entry fails the selection.
    pub fn select(&self, assets: &[Asset], attester: &str) -> Result<Vec<RawAttestation>, Error> {
        if self.messages.len() != self.signatures.len() {
            return Err(Error::Format(format!(
                "got {} messages but {} signatures",
                self.messages.len(),
                self.signatures.len()
            )));
        }

        let mut attestations = HashMap::new();
        for (message, signature) in self.messages.iter().zip(self.signatures.iter()) {
            let attestation = match RawAttestation::from_hex(message, signature, attester) {
                Ok(attestation) => attestation,
                Err(e) => {
                    warn!("skipping undecodable attestation: {}", e);
                    continue;
                },
            };

            if let Some(symbol) = attestation.symbol() {
                attestations.entry(symbol.to_uppercase()).or_insert(attestation);
            }
        }

        assets
            .iter()
            .map(|asset| attestations.get(asset.symbol()).cloned().ok_or_else(|| Error::MissingAsset(asset.clone())))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use oracle_attestation::testing;
    use oracle_attestation::testing::ATTESTER;

    use super::*;

    fn encode(attestation: &RawAttestation) -> (String, String) {
        (
            format!("0x{}", hex_string(&attestation.message_bytes)),
            format!("0x{}", hex_string(&attestation.signature_bytes)),
        )
    }

    fn hex_string(bytes: &[u8]) -> String {
        bytes.iter().map(|x| format!("{:02x}", x)).collect()
    }

    fn payload(tickers: &[&str]) -> OpenOraclePayload {
        let (messages, signatures) = tickers
            .iter()
            .map(|ticker| encode(&testing::attestation(ticker, 1_700_000_000, 42_000)))
            .unzip();

        OpenOraclePayload { messages, signatures }
    }

    #[test]
    fn attestations_follow_requested_order() {
        // Given
        let payload = payload(&["BTC", "ETH", "DAI"]);
        let assets = vec![Asset::new("dai").unwrap(), Asset::new("btc").unwrap()];

        // When
        let attestations = payload.select(&assets, ATTESTER).unwrap();

        // Then
        assert_eq!(attestations.len(), 2);
        assert_eq!(attestations[0].symbol(), Some("DAI".to_string()));
        assert_eq!(attestations[1].symbol(), Some("BTC".to_string()));
        assert_eq!(attestations[0].attester_address_hex, ATTESTER);
    }

    #[test]
    fn missing_asset_is_reported() {
        let payload = payload(&["BTC"]);
        let assets = vec![Asset::new("BTC").unwrap(), Asset::new("SOL").unwrap()];

        let result = payload.select(&assets, ATTESTER);

        assert!(matches!(result, Err(Error::MissingAsset(asset)) if asset.symbol() == "SOL"));
    }

    #[test]
    fn unpaired_messages_are_rejected() {
        let mut payload = payload(&["BTC", "ETH"]);
        payload.signatures.pop();

        let result = payload.select(&[Asset::new("BTC").unwrap()], ATTESTER);

        assert!(matches!(result, Err(Error::Format(_))));
    }

    #[test]
    fn undecodable_entries_do_not_hide_other_assets() {
        // Given
        let mut payload = payload(&["BTC"]);
        payload.messages.push("0xzz".to_string());
        payload.signatures.push("0x00".to_string());

        // When
        let attestations = payload.select(&[Asset::new("btc").unwrap()], ATTESTER).unwrap();

        // Then
        assert_eq!(attestations.len(), 1);
        assert_eq!(attestations[0].symbol(), Some("BTC".to_string()));
    }

    #[test]
    fn asset_with_only_an_undecodable_entry_is_missing() {
        let payload = OpenOraclePayload {
            messages: vec!["0xzz".to_string()],
            signatures: vec!["0x00".to_string()],
        };

        let result = payload.select(&[Asset::new("BTC").unwrap()], ATTESTER);

        assert!(matches!(result, Err(Error::MissingAsset(asset)) if asset.symbol() == "BTC"));
    }
}
