//! Prelude module for common imports

pub use solana_sdk::{pubkey::Pubkey, signature::Signature};

pub use crate::{
    client::{JteClient, LedgerClient, MetadataPublisher},
    core::{
        MetadataRecord, PublishedMetadata, SdkError, SdkResult, TokenAccountInfo, TokenInfo,
        TokenMetadataArgs, UiAmount,
    },
    explorer::Cluster,
    identity::{Identity, IdentityProvider, KeypairFileProvider},
    ledger::{LedgerService, MemoryLedger, RpcLedger},
    storage::{ContentStorage, MemoryStorage},
    workflow::{Steps, Workflow, WorkflowPlan},
};
