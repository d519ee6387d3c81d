use opentelemetry::trace::TracerProvider;
use opentelemetry::{global, KeyValue};
use opentelemetry_otlp::{ExporterBuildError, MetricExporter, Protocol, SpanExporter, WithExportConfig, WithHttpConfig};
use opentelemetry_sdk::metrics::SdkMeterProvider;
use opentelemetry_sdk::trace::SdkTracerProvider;
use opentelemetry_sdk::Resource;
use tracing::level_filters::LevelFilter;
use tracing::Subscriber;
use tracing_opentelemetry::MetricsLayer;
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::Layer;

use crate::service::monitoring::Configuration;

/// Exports the metrics and spans of the process to the configured OTLP collector. Every signal
/// is tagged with the service name and the attributes describing what this instance publishes.
#[derive(Debug, Clone)]
pub struct Telemetry {
    configuration: Configuration,
    attributes: Vec<KeyValue>,
}

impl Telemetry {
    pub fn new(configuration: &Configuration) -> Self {
        Self {
            configuration: configuration.clone(),
            attributes: vec![KeyValue::new("service.version", env!("CARGO_PKG_VERSION"))],
        }
    }

    pub fn with_attribute(mut self, key: &'static str, value: impl Into<String>) -> Self {
        self.attributes.push(KeyValue::new(key, value.into()));
        self
    }

    fn resource(&self) -> Resource {
        Resource::builder()
            .with_service_name(self.configuration.service_name.clone())
            .with_attributes(self.attributes.clone())
            .build()
    }

    fn endpoint(&self, signal: &str) -> String {
        format!("{}/v1/{}", self.configuration.endpoint.trim_end_matches('/'), signal)
    }

    pub fn metric_layer<S>(&self) -> Result<impl Layer<S>, ExporterBuildError>
    where
        S: Subscriber,
        S: for<'span> LookupSpan<'span>,
    {
        let exporter = MetricExporter::builder()
            .with_http()
            .with_endpoint(self.endpoint("metrics"))
            .with_protocol(Protocol::HttpBinary)
            .with_headers(self.configuration.headers())
            .build()?;

        let provider = SdkMeterProvider::builder()
            .with_periodic_exporter(exporter)
            .with_resource(self.resource())
            .build();

        global::set_meter_provider(provider.clone());

        Ok(MetricsLayer::new(provider))
    }

    pub fn trace_layer<S>(&self) -> Result<impl Layer<S>, ExporterBuildError>
    where
        S: Subscriber,
        S: for<'span> LookupSpan<'span>,
    {
        let exporter = SpanExporter::builder()
            .with_http()
            .with_endpoint(self.endpoint("traces"))
            .with_protocol(Protocol::HttpBinary)
            .with_headers(self.configuration.headers())
            .build()?;

        let provider = SdkTracerProvider::builder()
            .with_batch_exporter(exporter)
            .with_resource(self.resource())
            .build();

        let tracer = provider.tracer(self.configuration.service_name.clone());

        Ok(tracing_opentelemetry::layer().with_tracer(tracer).with_filter(LevelFilter::TRACE))
    }
}
