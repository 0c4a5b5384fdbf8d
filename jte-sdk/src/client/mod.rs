pub mod metadata;
pub mod token;

use std::sync::Arc;

use crate::{ledger::LedgerService, pda::PdaBuilder, storage::ContentStorage};

pub use metadata::MetadataPublisher;
pub use token::LedgerClient;

/// Main JTE client with service-based architecture
pub struct JteClient {
    /// Ledger backend shared by every service
    pub ledger: Arc<dyn LedgerService>,
    /// Token lifecycle operations
    pub tokens: LedgerClient,
    /// Metadata publishing
    pub metadata: MetadataPublisher,
    /// PDA builder
    pub pda: Arc<PdaBuilder>,
}

impl JteClient {
    pub fn new(ledger: Arc<dyn LedgerService>, storage: Arc<dyn ContentStorage>) -> Self {
        let pda = Arc::new(PdaBuilder::token_metadata());
        Self {
            tokens: LedgerClient::new(ledger.clone()),
            metadata: MetadataPublisher::new(ledger.clone(), storage, pda.clone()),
            ledger,
            pda,
        }
    }
}
