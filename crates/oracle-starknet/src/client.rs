use std::time::Duration;

use starknet::providers::jsonrpc::HttpTransport;
use starknet::providers::{JsonRpcClient, Url};

use crate::Error;

pub type StarknetClient = JsonRpcClient<HttpTransport>;

/// Builds a JSON-RPC client on `endpoint` whose requests time out after `timeout` seconds
pub(crate) fn connect(endpoint: &str, timeout: u64) -> Result<StarknetClient, Error> {
    let endpoint = Url::parse(endpoint).map_err(|e| Error::Configuration(format!("invalid endpoint {}: {}", endpoint, e)))?;

    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(timeout))
        .connect_timeout(Duration::from_secs(5))
        .tcp_keepalive(Some(Duration::from_secs(30)))
        .build()
        .map_err(|e| Error::Configuration(e.to_string()))?;

    Ok(JsonRpcClient::new(HttpTransport::new_with_client(endpoint, client)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_endpoint_is_a_configuration_error() {
        let result = connect("not an url", 10);

        assert!(matches!(result, Err(Error::Configuration(_))));
    }

    #[test]
    fn valid_endpoint_connects() {
        assert!(connect("http://localhost:5050", 10).is_ok());
    }
}
