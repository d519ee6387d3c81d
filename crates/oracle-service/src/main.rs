use oracle_common::service::monitoring::Telemetry;
use tracing::info;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::Registry;

use crate::core::context::Context;
use crate::core::{Error, Fmt};
use crate::publish::PublishService;

mod core;
mod publish;

#[tokio::main]
async fn main() -> Result<(), Error> {
    let context = Context::load()?;
    let configuration = &context.configuration;

    let telemetry = configuration.prometheus.as_ref().map(|x| {
        Telemetry::new(x)
            .with_attribute("starknet.chain_id", configuration.starknet.chain_id.name())
            .with_attribute("oracle.address", configuration.oracle.to_fixed_hex_string())
    });

    let metric_layer = match &telemetry {
        Some(telemetry) => Some(telemetry.metric_layer().map_err(|e| Error::Configuration(e.to_string()))?),
        None => None,
    };
    let trace_layer = match &telemetry {
        Some(telemetry) => Some(telemetry.trace_layer().map_err(|e| Error::Configuration(e.to_string()))?),
        None => None,
    };
    let fmt_layer = Fmt::layer(&configuration.verbosity);

    let subscriber = Registry::default().with(fmt_layer).with(metric_layer).with(trace_layer);
    tracing::subscriber::set_global_default(subscriber).map_err(|e| Error::Configuration(e.to_string()))?;

    let providers = context.providers()?;
    let publisher = context.publisher()?;

    info!(
        assets = configuration.assets.len(),
        providers = providers.len(),
        mode = ?configuration.mode,
        "starting publisher"
    );

    let service = PublishService::new(
        publisher,
        providers,
        configuration.assets.clone(),
        configuration.mode,
        configuration.interval(),
    );

    service.run().await
}
