use std::time::Duration;

use oracle_providers::{Asset, AttestationProvider};
use oracle_publisher::{PublishMode, PublishReport, Publisher};
use tokio::{signal, time};
use tracing::{error, info, warn};

use crate::core::Error;

/// Publishes the configured assets once, or every `interval` until the process is interrupted
pub struct PublishService<P> {
    publisher: Publisher,
    providers: Vec<P>,

    assets: Vec<Asset>,
    mode: PublishMode,
    interval: Option<Duration>,
}

impl<P: AttestationProvider> PublishService<P> {
    pub fn new(publisher: Publisher, providers: Vec<P>, assets: Vec<Asset>, mode: PublishMode, interval: Option<Duration>) -> Self {
        Self {
            publisher,
            providers,
            assets,
            mode,
            interval,
        }
    }

    pub async fn run(&self) -> Result<(), Error> {
        let Some(interval) = self.interval else {
            let report = self.publish_once().await?;
            return Self::ensure_published(&report);
        };

        loop {
            if let Err(e) = self.publish_once().await {
                error!("publication failed: {}", e);
            }

            tokio::select! {
                _ = time::sleep(interval) => {},
                _ = signal::ctrl_c() => {
                    info!("interrupted, stopping");
                    return Ok(());
                },
            }
        }
    }

    async fn publish_once(&self) -> Result<PublishReport, Error> {
        let report = self.publisher.publish(self.mode, &self.assets, &self.providers).await?;

        match &report {
            PublishReport::Batched(hash) => info!(transaction_hash = %hash.to_fixed_hex_string(), "batch published"),
            PublishReport::Sequential(results) => {
                for (label, result) in results {
                    match result {
                        Ok(hash) => info!(%label, transaction_hash = %hash.to_fixed_hex_string(), "entry published"),
                        Err(e) => warn!(%label, "entry not published: {}", e),
                    }
                }
            },
        }

        Ok(report)
    }

    /// A one-shot run fails when any entry could not be published
    fn ensure_published(report: &PublishReport) -> Result<(), Error> {
        match report {
            PublishReport::Batched(_) => Ok(()),
            PublishReport::Sequential(results) => match results.values().find_map(|x| x.as_ref().err()) {
                Some(e) => Err(e.clone().into()),
                None => Ok(()),
            },
        }
    }
}
