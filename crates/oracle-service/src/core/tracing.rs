use tracing_subscriber::filter::{EnvFilter, LevelFilter};
use tracing_subscriber::Layer;

use crate::core::context::configuration::VerbosityConfiguration;

pub struct Fmt;

impl Fmt {
    /// Console output at the configured verbosity. `RUST_LOG` directives take precedence.
    pub fn layer<S>(verbosity: &VerbosityConfiguration) -> impl Layer<S>
    where
        S: for<'span> tracing_subscriber::registry::LookupSpan<'span> + tracing::Subscriber,
    {
        let level = match verbosity {
            VerbosityConfiguration::Info => LevelFilter::INFO,
            VerbosityConfiguration::Debug => LevelFilter::DEBUG,
        };

        let filter = EnvFilter::builder().with_default_directive(level.into()).from_env_lossy();

        tracing_subscriber::fmt::layer().with_ansi(false).with_target(false).compact().with_filter(filter)
    }
}
