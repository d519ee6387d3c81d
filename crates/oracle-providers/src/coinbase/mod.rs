use std::time::Duration;

use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use chrono::Utc;
use hmac::{Hmac, Mac};
use oracle_attestation::RawAttestation;
use reqwest::header::{HeaderMap, HeaderValue};
use reqwest::{Client as HTTPClient, Url};
use serde::{Deserialize, Serialize};
use sha2::Sha256;

use crate::response::OpenOraclePayload;
use crate::{Asset, AttestationProvider, Configuration, Error};

pub const DEFAULT_COINBASE_ENDPOINT: &str = "https://api.exchange.coinbase.com";

/// Address Coinbase signs its open-oracle messages with
pub const COINBASE_ATTESTER_ADDRESS: &str = "fCEAdAFab14d46e20144F48824d0C09B1a03F2BC";

const ORACLE_PATH: &str = "/oracle";

fn default_timeout() -> u64 {
    5
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct CoinbaseProviderConfiguration {
    pub endpoint: String,

    pub api_key: String,
    /// Base64 encoded API secret
    pub api_secret: String,
    pub api_passphrase: String,

    #[serde(default)]
    pub name: Option<String>,

    #[serde(default = "default_timeout")]
    pub timeout: u64,
}

impl From<CoinbaseProviderConfiguration> for Configuration {
    fn from(value: CoinbaseProviderConfiguration) -> Self {
        Self::Coinbase(value)
    }
}

/// Signs Coinbase exchange requests
#[derive(Clone)]
struct Signer {
    secret: Vec<u8>,
}

impl Signer {
    fn new(secret: &str) -> Result<Self, Error> {
        let secret = STANDARD
            .decode(secret.trim())
            .map_err(|e| Error::Credentials(format!("api secret is not base64: {}", e)))?;

        Ok(Self { secret })
    }

    fn sign(&self, timestamp: &str, method: &str, path: &str) -> Result<String, Error> {
        let mut mac = Hmac::<Sha256>::new_from_slice(&self.secret).map_err(|e| Error::Credentials(e.to_string()))?;
        mac.update(timestamp.as_bytes());
        mac.update(method.as_bytes());
        mac.update(path.as_bytes());

        Ok(STANDARD.encode(mac.finalize().into_bytes()))
    }
}

#[derive(Clone)]
pub struct CoinbaseProvider {
    name: String,
    url: Url,
    client: HTTPClient,

    api_key: HeaderValue,
    api_passphrase: HeaderValue,
    signer: Signer,
}

impl std::fmt::Debug for CoinbaseProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CoinbaseProvider").field("name", &self.name).field("url", &self.url).finish()
    }
}

impl CoinbaseProvider {
    pub fn new(configuration: &CoinbaseProviderConfiguration) -> Result<Self, Error> {
        let url = Url::parse(&configuration.endpoint)
            .and_then(|x| x.join(ORACLE_PATH))
            .map_err(|e| Error::URL(e.to_string()))?;

        Ok(Self {
            name: configuration.name.clone().unwrap_or_else(|| "Coinbase".to_string()),
            url,
            client: HTTPClient::builder().timeout(Duration::from_secs(configuration.timeout)).build()?,

            api_key: HeaderValue::from_str(&configuration.api_key).map_err(|_| Error::Credentials("invalid api key".to_string()))?,
            api_passphrase: HeaderValue::from_str(&configuration.api_passphrase)
                .map_err(|_| Error::Credentials("invalid api passphrase".to_string()))?,
            signer: Signer::new(&configuration.api_secret)?,
        })
    }

    fn headers(&self) -> Result<HeaderMap, Error> {
        let timestamp = Utc::now().timestamp().to_string();
        let signature = self.signer.sign(&timestamp, "GET", ORACLE_PATH)?;

        let mut headers = HeaderMap::new();
        headers.insert("CB-ACCESS-KEY", self.api_key.clone());
        headers.insert("CB-ACCESS-PASSPHRASE", self.api_passphrase.clone());
        headers.insert("CB-ACCESS-TIMESTAMP", HeaderValue::from_str(&timestamp).map_err(|e| Error::Credentials(e.to_string()))?);
        headers.insert("CB-ACCESS-SIGN", HeaderValue::from_str(&signature).map_err(|e| Error::Credentials(e.to_string()))?);

        Ok(headers)
    }

    async fn fetch_payload(&self) -> Result<OpenOraclePayload, Error> {
        let response = self.client.get(self.url.clone()).headers(self.headers()?).send().await?;

        let status = response.status();
        let text = response.text().await?;

        if !status.is_success() {
            return Err(Error::Status { status: status.as_u16(), body: text });
        }

        serde_json::from_str::<OpenOraclePayload>(&text).map_err(|e| Error::Format(e.to_string()))
    }
}

#[async_trait]
impl AttestationProvider for CoinbaseProvider {
    fn name(&self) -> &str {
        &self.name
    }

    async fn fetch(&self, assets: &[Asset]) -> Result<Vec<RawAttestation>, Error> {
        let payload = self.fetch_payload().await?;

        payload.select(assets, COINBASE_ATTESTER_ADDRESS)
    }
}
