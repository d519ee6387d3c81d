use thiserror::Error;

pub mod context;

mod tracing;
pub use tracing::Fmt;

#[derive(Error, Debug)]
pub enum Error {
    #[error("configuration error {0}")]
    Configuration(String),

    #[error(transparent)]
    Provider(#[from] oracle_providers::Error),

    #[error(transparent)]
    Publisher(#[from] oracle_publisher::Error),
}
