use std::fmt::{Display, Formatter};
use std::sync::Arc;

use async_trait::async_trait;
use oracle_attestation::RawAttestation;
use oracle_common::service::tracing::instrument;
use oracle_common::{log_if_error, measure_duration, metric};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::coinbase::{CoinbaseProvider, CoinbaseProviderConfiguration};
use crate::okx::{OKXProvider, OKXProviderConfiguration};

pub mod coinbase;
pub mod okx;

mod response;

#[cfg(feature = "testing")]
pub mod mock;

#[derive(Error, Debug)]
pub enum Error {
    #[error("invalid url {0}")]
    URL(String),

    #[error(transparent)]
    HTTP(#[from] reqwest::Error),

    #[error("request error status={status}, body={body}")]
    Status { status: u16, body: String },

    #[error("provider error {0}")]
    Api(String),

    #[error("wrong format error {0}")]
    Format(String),

    #[error("no attestation for asset {0}")]
    MissingAsset(Asset),

    #[error(transparent)]
    Attestation(#[from] oracle_attestation::Error),

    #[error("invalid credentials {0}")]
    Credentials(String),
}

impl Error {
    /// Returns true when the failure comes from the network or from an unavailable provider,
    /// in which case fetching again later may succeed.
    pub fn is_transient(&self) -> bool {
        match self {
            Error::HTTP(e) => !e.is_decode() && !e.is_builder(),
            Error::Status { status, .. } => *status >= 500 || *status == 429,
            _ => false,
        }
    }
}

/// Upper-case ticker of a traded asset
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Asset(String);

impl Asset {
    pub fn new(symbol: &str) -> Result<Self, Error> {
        let symbol = symbol.trim();
        if symbol.is_empty() {
            return Err(Error::Format("empty asset symbol".to_string()));
        }

        Ok(Self(symbol.to_uppercase()))
    }

    pub fn symbol(&self) -> &str {
        &self.0
    }
}

impl Display for Asset {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for Asset {
    type Error = Error;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(&value)
    }
}

impl From<Asset> for String {
    fn from(value: Asset) -> Self {
        value.0
    }
}

/// A reporter of signed prices
#[async_trait]
pub trait AttestationProvider: Send + Sync {
    /// Name under which results of this provider are reported
    fn name(&self) -> &str;

    /// Fetches one attestation per asset in a single request. Attestations are returned in
    /// the order of `assets`.
    async fn fetch(&self, assets: &[Asset]) -> Result<Vec<RawAttestation>, Error>;
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(tag = "provider", rename_all = "snake_case")]
pub enum Configuration {
    #[cfg(feature = "testing")]
    #[serde(skip)]
    Mock(Arc<mock::MockProvider>),

    #[serde(rename = "okx")]
    OKX(OKXProviderConfiguration),

    Coinbase(CoinbaseProviderConfiguration),
}

#[derive(Clone)]
pub enum Client {
    #[cfg(feature = "testing")]
    Mock(Arc<mock::MockProvider>),

    OKX(Arc<OKXProvider>),
    Coinbase(Arc<CoinbaseProvider>),
}

impl Client {
    pub fn new(configuration: &Configuration) -> Result<Self, Error> {
        Ok(match configuration {
            #[cfg(feature = "testing")]
            Configuration::Mock(x) => Self::Mock(x.clone()),

            Configuration::OKX(x) => Self::OKX(Arc::new(OKXProvider::new(x)?)),
            Configuration::Coinbase(x) => Self::Coinbase(Arc::new(CoinbaseProvider::new(x)?)),
        })
    }

    fn inner(&self) -> &dyn AttestationProvider {
        match self {
            #[cfg(feature = "testing")]
            Self::Mock(x) => x.as_ref(),

            Self::OKX(x) => x.as_ref(),
            Self::Coinbase(x) => x.as_ref(),
        }
    }
}

#[async_trait]
impl AttestationProvider for Client {
    fn name(&self) -> &str {
        self.inner().name()
    }

    #[instrument(name = "fetch_attestations", skip(self), fields(provider = %self.name()))]
    async fn fetch(&self, assets: &[Asset]) -> Result<Vec<RawAttestation>, Error> {
        let (result, duration) = measure_duration!(log_if_error!(self.inner().fetch(assets).await));

        metric!(counter[attestation_request] = 1, method = "fetch", provider = self.name());
        metric!(histogram[attestation_request_duration_milliseconds] = duration.as_millis(), method = "fetch", provider = self.name());
        metric!(on error result => counter [ attestation_request_error ] = 1, method = "fetch", provider = self.name());

        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn asset_symbols_are_normalized() {
        assert_eq!(Asset::new("btc").unwrap().symbol(), "BTC");
        assert_eq!(Asset::new(" Eth ").unwrap().symbol(), "ETH");
        assert!(matches!(Asset::new("  "), Err(Error::Format(_))));
    }

    #[test]
    fn assets_are_deserialized_from_strings() {
        let assets: Vec<Asset> = serde_json::from_str(r#"["btc", "eth"]"#).unwrap();

        assert_eq!(assets, vec![Asset::new("BTC").unwrap(), Asset::new("ETH").unwrap()]);
        assert!(serde_json::from_str::<Vec<Asset>>(r#"[""]"#).is_err());
    }

    #[test]
    fn server_errors_are_transient() {
        let unavailable = Error::Status { status: 503, body: String::new() };
        let rate_limited = Error::Status { status: 429, body: String::new() };
        let unauthorized = Error::Status { status: 401, body: String::new() };

        assert!(unavailable.is_transient());
        assert!(rate_limited.is_transient());
        assert!(!unauthorized.is_transient());
    }

    #[test]
    fn payload_errors_are_not_transient() {
        assert!(!Error::Format("bad json".to_string()).is_transient());
        assert!(!Error::MissingAsset(Asset::new("BTC").unwrap()).is_transient());
        assert!(!Error::Api("50011".to_string()).is_transient());
    }

    #[test]
    fn configuration_is_tagged_by_provider() {
        let configuration: Configuration = serde_json::from_str(r#"{ "provider": "okx", "endpoint": "https://www.okx.com" }"#).unwrap();
        assert!(matches!(configuration, Configuration::OKX(_)));

        let configuration: Configuration = serde_json::from_str(
            r#"{ "provider": "coinbase", "endpoint": "https://api.exchange.coinbase.com", "api_key": "k", "api_secret": "c2VjcmV0LWtleQ==", "api_passphrase": "p" }"#,
        )
        .unwrap();
        assert!(matches!(configuration, Configuration::Coinbase(_)));
    }
}
