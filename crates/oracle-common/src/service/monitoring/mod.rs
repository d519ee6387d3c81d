use std::collections::HashMap;

use serde::{Deserialize, Serialize};

mod metric;

mod telemetry;
pub use telemetry::Telemetry;

const DEFAULT_SERVICE_NAME: &str = "oracle-publisher";

fn default_service_name() -> String {
    DEFAULT_SERVICE_NAME.to_string()
}

/// OTLP collector used to export metrics and traces
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Configuration {
    pub endpoint: String,
    pub token: Option<String>,

    #[serde(default = "default_service_name")]
    pub service_name: String,
}

impl Configuration {
    fn headers(&self) -> HashMap<String, String> {
        let mut headers = HashMap::new();
        if let Some(token) = &self.token {
            headers.insert("Authorization".to_string(), format!("Basic {}", token));
        }

        headers
    }
}
