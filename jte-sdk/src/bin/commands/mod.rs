// Command modules for jte CLI

pub mod metadata;
pub mod run;
pub mod token;
pub mod utils;
pub mod wallet;

use std::sync::Arc;

use anyhow::{Context as _, Result};
use jte_sdk::{
    config::{JteConfig, LedgerBackend, StorageBackend},
    explorer::Cluster,
    identity::Identity,
    ledger::{LedgerService, MemoryLedger, RetryingLedger, RpcLedger},
    storage::{BundlerStorage, ContentStorage, LocalStorage, MemoryStorage},
    JteClient,
};

/// Everything a command needs, built from the effective configuration
pub struct Context {
    pub config: JteConfig,
    pub client: JteClient,
    pub cluster: Cluster,
}

impl Context {
    pub fn new(config: JteConfig) -> Result<Self> {
        let ledger = build_ledger(&config)?;
        let storage = build_storage(&config)?;
        let cluster = config.explorer_cluster()?;

        Ok(Self {
            client: JteClient::new(ledger, storage),
            cluster,
            config,
        })
    }

    /// Load the payer identity
    pub fn identity(&self) -> Result<Identity> {
        self.config
            .identity_provider()?
            .load()
            .context("Failed to load wallet")
    }
}

pub fn build_ledger(config: &JteConfig) -> Result<Arc<dyn LedgerService>> {
    let ledger: Arc<dyn LedgerService> = match config.cluster.backend {
        LedgerBackend::Rpc => Arc::new(RpcLedger::new(
            &config.cluster.rpc_url,
            config.commitment()?,
        )),
        LedgerBackend::Memory => {
            utils::warn("Using the in-memory ledger: nothing is sent to a cluster");
            Arc::new(MemoryLedger::new())
        }
    };

    if config.retry.max_retries == 0 {
        return Ok(ledger);
    }
    Ok(Arc::new(RetryingLedger::new(ledger, config.retry.clone())))
}

pub fn build_storage(config: &JteConfig) -> Result<Arc<dyn ContentStorage>> {
    let storage = &config.storage;
    Ok(match storage.backend {
        StorageBackend::Memory => Arc::new(MemoryStorage::new()),
        StorageBackend::Local => Arc::new(LocalStorage::new(&storage.local_dir)?),
        StorageBackend::Bundler => Arc::new(BundlerStorage::new(
            &storage.bundler_url,
            &storage.gateway_url,
        )),
    })
}
