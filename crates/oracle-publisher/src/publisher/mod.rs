use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use indexmap::IndexMap;
use oracle_attestation::{build, CallOperation, RawAttestation};
use oracle_common::retry::{Attempt, RetryPolicy};
use oracle_providers::{Asset, AttestationProvider};
use oracle_starknet::{ContractAddress, TransactionHash};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument, warn};

mod unit;
pub use unit::{label, PublishUnit};

use crate::submitter::{StarknetSubmitter, TransactionSubmitter};
use crate::{Configuration, Error};

/// Outcome of one submitted unit
pub type PublishResult = Result<TransactionHash, Error>;

/// Outcome of sequential submissions keyed by their label, in submission order
pub type PublishResults = IndexMap<String, PublishResult>;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PublishMode {
    /// Every attestation of every provider in a single transaction
    #[default]
    Batched,

    /// One transaction per provider and asset
    Sequential,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PublishReport {
    Batched(TransactionHash),
    Sequential(PublishResults),
}

/// Turns provider attestations into `publish_entry` transactions
#[derive(Clone)]
pub struct Publisher {
    oracle: ContractAddress,
    retry: RetryPolicy,

    submitter: Arc<dyn TransactionSubmitter>,
}

impl Publisher {
    /// Creates a publisher submitting through the configured Starknet account
    pub fn new(configuration: &Configuration) -> Result<Self, Error> {
        let submitter = StarknetSubmitter::new(configuration)?;

        Ok(Self::with_submitter(configuration.oracle, configuration.retry, Arc::new(submitter)))
    }

    pub fn with_submitter(oracle: ContractAddress, retry: RetryPolicy, submitter: Arc<dyn TransactionSubmitter>) -> Self {
        Self { oracle, retry, submitter }
    }

    /// Decodes `attestations` and prepares their call, in order. Fails on the first attestation
    /// that cannot be decoded.
    pub fn prepare(&self, attestations: &[RawAttestation]) -> Result<Vec<CallOperation>, Error> {
        attestations.iter().map(|x| self.prepare_one(x)).collect()
    }

    fn prepare_one(&self, attestation: &RawAttestation) -> Result<CallOperation, Error> {
        let decoded = attestation.decode()?;

        Ok(build(self.oracle, &decoded))
    }

    /// Publishes with `mode`, starting over when an attempt fails with a transport error. Every
    /// attempt fetches and builds everything again, nothing from a failed attempt is kept. In
    /// sequential mode only the provider whose attempt failed is started over.
    pub async fn publish<P: AttestationProvider>(&self, mode: PublishMode, assets: &[Asset], providers: &[P]) -> Result<PublishReport, Error> {
        match mode {
            PublishMode::Batched => self
                .retry
                .run(move |attempt| async move {
                    info!(attempt, ?mode, "publishing");
                    Attempt::from(self.publish_batched(assets, providers).await)
                })
                .await
                .map(PublishReport::Batched),
            PublishMode::Sequential => self.publish_each_sequential(assets, providers, self.retry).await.map(PublishReport::Sequential),
        }
    }

    /// Fetches `assets` from every provider and submits all of them in one transaction, ordered by
    /// provider then by asset. Nothing is submitted if any attestation is malformed.
    #[instrument(name = "publish_batched", skip_all, fields(assets = assets.len(), providers = providers.len()))]
    pub async fn publish_batched<P: AttestationProvider>(&self, assets: &[Asset], providers: &[P]) -> Result<TransactionHash, Error> {
        validate_assets(assets)?;
        validate_providers(providers)?;

        let mut operations = vec![];
        for provider in providers {
            let attestations = fetch(provider, assets).await?;
            operations.extend(self.prepare(&attestations)?);
        }

        self.submit(PublishUnit::new("batched".to_string(), operations)).await
    }

    /// Fetches `assets` from `provider` at once and submits one transaction per asset. A failed
    /// asset is reported under its label and does not stop the others.
    #[instrument(name = "publish_sequential", skip_all, fields(assets = assets.len(), provider = %provider.name()))]
    pub async fn publish_sequential<P: AttestationProvider>(&self, assets: &[Asset], provider: &P) -> Result<PublishResults, Error> {
        validate_assets(assets)?;

        let attestations = fetch(provider, assets).await?;

        let mut results = PublishResults::new();
        for (asset, attestation) in assets.iter().zip(attestations.iter()) {
            let label = label(provider.name(), asset);

            let result = match self.prepare_one(attestation) {
                Ok(operation) => self.submit(PublishUnit::new(label.clone(), vec![operation])).await,
                Err(e) => {
                    warn!(%label, "skipping malformed attestation: {}", e);
                    Err(e)
                },
            };

            results.insert(label, result);
        }

        Ok(results)
    }

    /// Runs [`Publisher::publish_sequential`] for every provider and merges the results. Provider
    /// names must be unique so that no label is reported twice. A provider that fails as a whole
    /// has its error reported under each of its labels, the next providers are still published.
    pub async fn publish_all_sequential<P: AttestationProvider>(&self, assets: &[Asset], providers: &[P]) -> Result<PublishResults, Error> {
        self.publish_each_sequential(assets, providers, RetryPolicy::new(1, Duration::ZERO)).await
    }

    async fn publish_each_sequential<P: AttestationProvider>(&self, assets: &[Asset], providers: &[P], retry: RetryPolicy) -> Result<PublishResults, Error> {
        validate_assets(assets)?;
        validate_providers(providers)?;

        let mut results = PublishResults::new();
        for provider in providers {
            let published = retry
                .run(move |attempt| async move {
                    info!(attempt, provider = %provider.name(), "publishing");
                    Attempt::from(self.publish_sequential(assets, provider).await)
                })
                .await;

            match published {
                Ok(published) => results.extend(published),
                Err(e) => {
                    warn!(provider = %provider.name(), "provider not published: {}", e);
                    results.extend(assets.iter().map(|asset| (label(provider.name(), asset), Err(e.clone()))));
                },
            }
        }

        Ok(results)
    }

    async fn submit(&self, unit: PublishUnit) -> PublishResult {
        info!(label = %unit.label, operations = unit.operations.len(), "submitting");

        let result = self.submitter.submit(&unit.operations).await;
        match &result {
            Ok(hash) => info!(label = %unit.label, transaction_hash = %hash.to_fixed_hex_string(), "submitted"),
            Err(e) => warn!(label = %unit.label, "submission failed: {}", e),
        }

        result
    }
}

async fn fetch<P: AttestationProvider>(provider: &P, assets: &[Asset]) -> Result<Vec<RawAttestation>, Error> {
    let attestations = provider.fetch(assets).await?;
    if attestations.len() != assets.len() {
        return Err(Error::Provider(format!(
            "{} returned {} attestations for {} assets",
            provider.name(),
            attestations.len(),
            assets.len()
        )));
    }

    Ok(attestations)
}

fn validate_assets(assets: &[Asset]) -> Result<(), Error> {
    if assets.is_empty() {
        return Err(Error::InvalidRequest("no asset requested".to_string()));
    }

    let mut symbols = HashSet::new();
    for asset in assets {
        if !symbols.insert(asset) {
            return Err(Error::InvalidRequest(format!("asset {} requested more than once", asset)));
        }
    }

    Ok(())
}

fn validate_providers<P: AttestationProvider>(providers: &[P]) -> Result<(), Error> {
    if providers.is_empty() {
        return Err(Error::InvalidRequest("no provider configured".to_string()));
    }

    let mut names = HashSet::new();
    for provider in providers {
        if !names.insert(provider.name()) {
            return Err(Error::InvalidRequest(format!("provider {} configured more than once", provider.name())));
        }
    }

    Ok(())
}
