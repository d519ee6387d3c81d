use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use oracle_attestation::{testing, RawAttestation};
use tokio::sync::Mutex;

use crate::{Asset, AttestationProvider, Configuration, Error};

/// In-memory provider serving attestations built with [`testing::attestation`]. Failures can be
/// scripted and are returned, in order, before any attestation is served.
#[derive(Debug, Default)]
pub struct MockProvider {
    name: String,
    attestations: HashMap<String, RawAttestation>,
    response: Option<Vec<RawAttestation>>,

    failures: Mutex<VecDeque<Error>>,
    calls: AtomicUsize,
}

impl MockProvider {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            ..Default::default()
        }
    }

    /// Serves a well-formed attestation of `price` for `ticker`
    pub fn with_price(self, ticker: &str, timestamp: u64, price: u64) -> Self {
        self.with_attestation(ticker, testing::attestation(ticker, timestamp, price))
    }

    pub fn with_attestation(mut self, ticker: &str, attestation: RawAttestation) -> Self {
        self.attestations.insert(ticker.to_uppercase(), attestation);
        self
    }

    /// Answers every fetch with `attestations` whatever the requested assets are
    pub fn with_response(mut self, attestations: Vec<RawAttestation>) -> Self {
        self.response = Some(attestations);
        self
    }

    pub fn with_failure(mut self, error: Error) -> Self {
        self.failures.get_mut().push_back(error);
        self
    }

    /// Number of fetches made so far
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl From<Arc<MockProvider>> for Configuration {
    fn from(value: Arc<MockProvider>) -> Self {
        Self::Mock(value)
    }
}

#[async_trait]
impl AttestationProvider for MockProvider {
    fn name(&self) -> &str {
        &self.name
    }

    async fn fetch(&self, assets: &[Asset]) -> Result<Vec<RawAttestation>, Error> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        if let Some(error) = self.failures.lock().await.pop_front() {
            return Err(error);
        }

        if let Some(response) = &self.response {
            return Ok(response.clone());
        }

        assets
            .iter()
            .map(|asset| {
                self.attestations
                    .get(asset.symbol())
                    .cloned()
                    .ok_or_else(|| Error::MissingAsset(asset.clone()))
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Client;

    #[tokio::test]
    async fn scripted_failures_come_first() {
        // Given
        let provider = Arc::new(
            MockProvider::new("Mock")
                .with_price("BTC", 1_700_000_000, 42)
                .with_failure(Error::Status { status: 503, body: String::new() }),
        );
        let client = Client::new(&provider.clone().into()).unwrap();
        let assets = vec![Asset::new("BTC").unwrap()];

        // When
        let first = client.fetch(&assets).await;
        let second = client.fetch(&assets).await;

        // Then
        assert!(matches!(first, Err(Error::Status { status: 503, .. })));
        assert_eq!(second.unwrap()[0].symbol(), Some("BTC".to_string()));
        assert_eq!(client.name(), "Mock");
        assert_eq!(provider.calls(), 2);
    }

    #[tokio::test]
    async fn unknown_assets_are_missing() {
        let provider = MockProvider::new("Mock").with_price("BTC", 1_700_000_000, 42);

        let result = provider.fetch(&[Asset::new("ETH").unwrap()]).await;

        assert!(matches!(result, Err(Error::MissingAsset(_))));
    }
}
