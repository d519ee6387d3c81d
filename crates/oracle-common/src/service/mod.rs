pub mod monitoring;

pub use tracing;

#[macro_export]
macro_rules! log_if_error {
    ($e: expr) => {
        match $e {
            Ok(v) => Ok(v),
            Err(e) => {
                $crate::service::tracing::error!("{}", e);
                Err(e)
            },
        }
    };
}
