//! Ledger service abstraction
//!
//! The narrow interface the workflow needs from an account-based token
//! ledger. `RpcLedger` talks to a Solana cluster; `MemoryLedger` keeps the
//! same state in process and enforces the same rules, which is what the
//! tests and the offline backend run against.

pub mod memory;
pub mod retry;
pub mod rpc;

use async_trait::async_trait;
use solana_sdk::{pubkey::Pubkey, signature::Signature};

use crate::{
    core::{MetadataContent, MetadataRecord, SdkResult, TokenAccountInfo, TokenInfo},
    identity::Identity,
};

pub use memory::MemoryLedger;
pub use retry::{RetryPolicy, RetryingLedger};
pub use rpc::RpcLedger;

/// Operations consumed from the external ledger
///
/// Amounts are base units. Every call is a single request: implementations
/// never retry on their own.
#[async_trait]
pub trait LedgerService: Send + Sync {
    /// Create a new token and return its address
    async fn create_token(
        &self,
        payer: &Identity,
        mint_authority: &Pubkey,
        freeze_authority: Option<&Pubkey>,
        decimals: u8,
    ) -> SdkResult<Pubkey>;

    /// Return the associated account for (token, owner), creating it if needed
    async fn get_or_create_account(
        &self,
        payer: &Identity,
        token: &Pubkey,
        owner: &Pubkey,
    ) -> SdkResult<Pubkey>;

    async fn get_token_info(&self, token: &Pubkey) -> SdkResult<TokenInfo>;

    async fn get_token_account(&self, account: &Pubkey) -> SdkResult<TokenAccountInfo>;

    async fn mint_to(
        &self,
        payer: &Identity,
        token: &Pubkey,
        destination: &Pubkey,
        mint_authority: &Identity,
        amount: u64,
    ) -> SdkResult<Signature>;

    async fn transfer(
        &self,
        payer: &Identity,
        source: &Pubkey,
        destination: &Pubkey,
        owner: &Identity,
        amount: u64,
    ) -> SdkResult<Signature>;

    async fn burn(
        &self,
        payer: &Identity,
        account: &Pubkey,
        token: &Pubkey,
        owner: &Identity,
        amount: u64,
    ) -> SdkResult<Signature>;

    async fn freeze_account(
        &self,
        payer: &Identity,
        account: &Pubkey,
        token: &Pubkey,
        freeze_authority: &Identity,
    ) -> SdkResult<Signature>;

    async fn thaw_account(
        &self,
        payer: &Identity,
        account: &Pubkey,
        token: &Pubkey,
        freeze_authority: &Identity,
    ) -> SdkResult<Signature>;

    /// Fetch the metadata record stored at `metadata`, if any
    async fn get_metadata(&self, metadata: &Pubkey) -> SdkResult<Option<MetadataRecord>>;

    async fn create_metadata(
        &self,
        payer: &Identity,
        token: &Pubkey,
        mint_authority: &Identity,
        update_authority: &Identity,
        content: &MetadataContent,
    ) -> SdkResult<Signature>;

    async fn update_metadata(
        &self,
        payer: &Identity,
        token: &Pubkey,
        update_authority: &Identity,
        content: &MetadataContent,
    ) -> SdkResult<Signature>;

    /// Native (lamport) balance of an address
    async fn get_balance(&self, address: &Pubkey) -> SdkResult<u64>;

    async fn request_airdrop(&self, address: &Pubkey, lamports: u64) -> SdkResult<Signature>;
}
