use std::time::Duration;

use async_trait::async_trait;
use oracle_attestation::RawAttestation;
use reqwest::{Client as HTTPClient, Url};
use serde::{Deserialize, Serialize};

use crate::response::OpenOraclePayload;
use crate::{Asset, AttestationProvider, Configuration, Error};

pub const DEFAULT_OKX_ENDPOINT: &str = "https://www.okx.com";

/// Address OKX signs its open-oracle messages with
pub const OKX_ATTESTER_ADDRESS: &str = "85615b076615317c80f14cbad6501eec031cd51c";

fn default_timeout() -> u64 {
    5
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct OKXProviderConfiguration {
    pub endpoint: String,

    /// Name results are reported under, `OKX` if not set
    #[serde(default)]
    pub name: Option<String>,

    /// Request timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout: u64,
}

impl Default for OKXProviderConfiguration {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_OKX_ENDPOINT.to_string(),
            name: None,
            timeout: default_timeout(),
        }
    }
}

impl From<OKXProviderConfiguration> for Configuration {
    fn from(value: OKXProviderConfiguration) -> Self {
        Self::OKX(value)
    }
}

#[derive(Deserialize, Debug)]
struct OKXResponse {
    code: String,

    #[serde(default)]
    msg: String,

    #[serde(default)]
    data: Vec<OpenOraclePayload>,
}

#[derive(Debug, Clone)]
pub struct OKXProvider {
    name: String,
    url: Url,
    client: HTTPClient,
}

impl OKXProvider {
    pub fn new(configuration: &OKXProviderConfiguration) -> Result<Self, Error> {
        let url = Url::parse(&configuration.endpoint)
            .and_then(|x| x.join("/api/v5/market/open-oracle"))
            .map_err(|e| Error::URL(e.to_string()))?;

        Ok(Self {
            name: configuration.name.clone().unwrap_or_else(|| "OKX".to_string()),
            url,
            client: HTTPClient::builder().timeout(Duration::from_secs(configuration.timeout)).build()?,
        })
    }

    async fn fetch_payload(&self) -> Result<OpenOraclePayload, Error> {
        let response = self.client.get(self.url.clone()).send().await?;

        let status = response.status();
        let text = response.text().await?;

        if !status.is_success() {
            return Err(Error::Status { status: status.as_u16(), body: text });
        }

        let response = serde_json::from_str::<OKXResponse>(&text).map_err(|e| Error::Format(e.to_string()))?;
        if response.code != "0" {
            return Err(Error::Api(format!("code={}, msg={}", response.code, response.msg)));
        }

        response
            .data
            .into_iter()
            .next()
            .ok_or_else(|| Error::Format("empty data".to_string()))
    }
}

#[async_trait]
impl AttestationProvider for OKXProvider {
    fn name(&self) -> &str {
        &self.name
    }

    async fn fetch(&self, assets: &[Asset]) -> Result<Vec<RawAttestation>, Error> {
        let payload = self.fetch_payload().await?;

        payload.select(assets, OKX_ATTESTER_ADDRESS)
    }
}
