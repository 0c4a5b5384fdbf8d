//! JTE token SDK
//!
//! Runs the fungible-token lifecycle against a Solana cluster or an
//! in-process ledger:
//! - token creation and associated accounts
//! - mint, transfer, burn, freeze and thaw
//! - Metaplex metadata publishing
//! - a configurable end-to-end workflow with explorer links

pub mod client;
pub mod config;
pub mod core;
pub mod explorer;
pub mod identity;
pub mod instructions;
pub mod ledger;
pub mod pda;
pub mod prelude;
pub mod storage;
pub mod workflow;

pub use client::{JteClient, LedgerClient, MetadataPublisher};
pub use config::JteConfig;
pub use core::{SdkError, SdkResult, UiAmount};
pub use explorer::Cluster;
pub use identity::{Identity, IdentityProvider};
pub use ledger::{LedgerService, MemoryLedger, RetryPolicy, RetryingLedger, RpcLedger};
pub use workflow::{Steps, Workflow, WorkflowPlan, WorkflowReport};
