//! Bounded exponential backoff around ledger reads
//!
//! Only reads and idempotent requests are retried. Writes are passed
//! through single-shot: a mint or transfer that timed out may still land,
//! and repeating it would apply the amount twice.

use std::{future::Future, sync::Arc, time::Duration};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use solana_sdk::{pubkey::Pubkey, signature::Signature};
use tracing::warn;

use super::LedgerService;
use crate::{
    core::{
        MetadataContent, MetadataRecord, SdkError, SdkResult, TokenAccountInfo, TokenInfo,
    },
    identity::Identity,
};

/// Retry configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RetryPolicy {
    /// Maximum number of retries after the first attempt
    pub max_retries: u32,

    /// Base delay between retries in milliseconds
    pub base_delay_ms: u64,

    /// Maximum delay between retries in milliseconds
    pub max_delay_ms: u64,

    /// Exponential backoff multiplier
    pub backoff_multiplier: f64,
}

impl RetryPolicy {
    /// Single-shot: no retries at all
    pub fn none() -> Self {
        Self {
            max_retries: 0,
            ..Self::default()
        }
    }

    pub fn validate(&self) -> SdkResult<()> {
        if self.max_retries > 0 && self.base_delay_ms == 0 {
            return Err(SdkError::Config(
                "retry.base_delay_ms must be greater than 0".to_string(),
            ));
        }

        if self.max_delay_ms < self.base_delay_ms {
            return Err(SdkError::Config(format!(
                "retry.max_delay_ms must be at least base_delay_ms ({})",
                self.base_delay_ms
            )));
        }

        if self.backoff_multiplier.is_nan() || self.backoff_multiplier < 1.0 {
            return Err(SdkError::Config(
                "retry.backoff_multiplier must be at least 1.0".to_string(),
            ));
        }

        Ok(())
    }

    /// Calculate delay for retry attempt
    pub fn delay_for_attempt(&self, attempt: u32) -> u64 {
        if attempt == 0 {
            return self.base_delay_ms;
        }

        let exponential_delay =
            self.base_delay_ms as f64 * self.backoff_multiplier.powi(attempt as i32);
        (exponential_delay as u64).min(self.max_delay_ms)
    }

    /// Run `operation` until it succeeds, fails permanently, or retries run out
    pub async fn run<T, F, Fut>(&self, label: &str, mut operation: F) -> SdkResult<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = SdkResult<T>>,
    {
        let mut attempt = 0;
        loop {
            match operation().await {
                Err(err) if err.is_transient() && attempt < self.max_retries => {
                    let delay = self.delay_for_attempt(attempt);
                    warn!(
                        "{} failed (attempt {}/{}): {}; retrying in {}ms",
                        label,
                        attempt + 1,
                        self.max_retries + 1,
                        err,
                        delay
                    );
                    tokio::time::sleep(Duration::from_millis(delay)).await;
                    attempt += 1;
                }
                result => return result,
            }
        }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            base_delay_ms: 500,
            max_delay_ms: 10_000,
            backoff_multiplier: 2.0,
        }
    }
}

/// Decorates a ledger with retries on transient read failures
pub struct RetryingLedger {
    inner: Arc<dyn LedgerService>,
    policy: RetryPolicy,
}

impl RetryingLedger {
    pub fn new(inner: Arc<dyn LedgerService>, policy: RetryPolicy) -> Self {
        Self { inner, policy }
    }

    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }
}

#[async_trait]
impl LedgerService for RetryingLedger {
    async fn create_token(
        &self,
        payer: &Identity,
        mint_authority: &Pubkey,
        freeze_authority: Option<&Pubkey>,
        decimals: u8,
    ) -> SdkResult<Pubkey> {
        self.inner
            .create_token(payer, mint_authority, freeze_authority, decimals)
            .await
    }

    // Associated account creation is idempotent on chain.
    async fn get_or_create_account(
        &self,
        payer: &Identity,
        token: &Pubkey,
        owner: &Pubkey,
    ) -> SdkResult<Pubkey> {
        self.policy
            .run("get_or_create_account", || {
                self.inner.get_or_create_account(payer, token, owner)
            })
            .await
    }

    async fn get_token_info(&self, token: &Pubkey) -> SdkResult<TokenInfo> {
        self.policy
            .run("get_token_info", || self.inner.get_token_info(token))
            .await
    }

    async fn get_token_account(&self, account: &Pubkey) -> SdkResult<TokenAccountInfo> {
        self.policy
            .run("get_token_account", || self.inner.get_token_account(account))
            .await
    }

    async fn mint_to(
        &self,
        payer: &Identity,
        token: &Pubkey,
        destination: &Pubkey,
        mint_authority: &Identity,
        amount: u64,
    ) -> SdkResult<Signature> {
        self.inner
            .mint_to(payer, token, destination, mint_authority, amount)
            .await
    }

    async fn transfer(
        &self,
        payer: &Identity,
        source: &Pubkey,
        destination: &Pubkey,
        owner: &Identity,
        amount: u64,
    ) -> SdkResult<Signature> {
        self.inner
            .transfer(payer, source, destination, owner, amount)
            .await
    }

    async fn burn(
        &self,
        payer: &Identity,
        account: &Pubkey,
        token: &Pubkey,
        owner: &Identity,
        amount: u64,
    ) -> SdkResult<Signature> {
        self.inner.burn(payer, account, token, owner, amount).await
    }

    async fn freeze_account(
        &self,
        payer: &Identity,
        account: &Pubkey,
        token: &Pubkey,
        freeze_authority: &Identity,
    ) -> SdkResult<Signature> {
        self.inner
            .freeze_account(payer, account, token, freeze_authority)
            .await
    }

    async fn thaw_account(
        &self,
        payer: &Identity,
        account: &Pubkey,
        token: &Pubkey,
        freeze_authority: &Identity,
    ) -> SdkResult<Signature> {
        self.inner
            .thaw_account(payer, account, token, freeze_authority)
            .await
    }

    async fn get_metadata(&self, metadata: &Pubkey) -> SdkResult<Option<MetadataRecord>> {
        self.policy
            .run("get_metadata", || self.inner.get_metadata(metadata))
            .await
    }

    async fn create_metadata(
        &self,
        payer: &Identity,
        token: &Pubkey,
        mint_authority: &Identity,
        update_authority: &Identity,
        content: &MetadataContent,
    ) -> SdkResult<Signature> {
        self.inner
            .create_metadata(payer, token, mint_authority, update_authority, content)
            .await
    }

    async fn update_metadata(
        &self,
        payer: &Identity,
        token: &Pubkey,
        update_authority: &Identity,
        content: &MetadataContent,
    ) -> SdkResult<Signature> {
        self.inner
            .update_metadata(payer, token, update_authority, content)
            .await
    }

    async fn get_balance(&self, address: &Pubkey) -> SdkResult<u64> {
        self.policy
            .run("get_balance", || self.inner.get_balance(address))
            .await
    }

    async fn request_airdrop(&self, address: &Pubkey, lamports: u64) -> SdkResult<Signature> {
        self.inner.request_airdrop(address, lamports).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::MemoryLedger;

    fn fast_policy(max_retries: u32) -> RetryPolicy {
        RetryPolicy {
            max_retries,
            base_delay_ms: 1,
            max_delay_ms: 5,
            backoff_multiplier: 2.0,
        }
    }

    #[test]
    fn test_delay_for_attempt() {
        let policy = RetryPolicy {
            max_retries: 5,
            base_delay_ms: 1000,
            max_delay_ms: 5000,
            backoff_multiplier: 2.0,
        };
        assert_eq!(policy.delay_for_attempt(0), 1000);
        assert_eq!(policy.delay_for_attempt(1), 2000);
        assert_eq!(policy.delay_for_attempt(2), 4000);
        assert_eq!(policy.delay_for_attempt(3), 5000);
    }

    #[test]
    fn test_policy_validation() {
        assert!(RetryPolicy::default().validate().is_ok());
        assert!(RetryPolicy::none().validate().is_ok());

        let mut policy = RetryPolicy::default();
        policy.max_delay_ms = 1;
        assert!(policy.validate().is_err());

        let mut policy = RetryPolicy::default();
        policy.backoff_multiplier = 0.5;
        assert!(policy.validate().is_err());

        policy.backoff_multiplier = f64::NAN;
        assert!(policy.validate().is_err());
    }

    #[test]
    fn test_nan_multiplier_rejected_from_toml() {
        let policy: RetryPolicy = toml::from_str("backoff_multiplier = nan").unwrap();
        assert!(matches!(policy.validate(), Err(SdkError::Config(_))));
    }

    #[tokio::test]
    async fn test_reads_recover_from_transient_failures() {
        let memory = Arc::new(MemoryLedger::new());
        let ledger = RetryingLedger::new(memory.clone(), fast_policy(3));

        memory.fail_next(2);
        let balance = ledger.get_balance(&Pubkey::new_unique()).await.unwrap();
        assert_eq!(balance, 0);
        assert_eq!(memory.request_count(), 3);
    }

    #[tokio::test]
    async fn test_retries_are_bounded() {
        let memory = Arc::new(MemoryLedger::new());
        let ledger = RetryingLedger::new(memory.clone(), fast_policy(2));

        memory.set_offline(true);
        let result = ledger.get_balance(&Pubkey::new_unique()).await;
        assert!(matches!(result, Err(SdkError::LedgerUnavailable(_))));
        assert_eq!(memory.request_count(), 3);
    }

    #[tokio::test]
    async fn test_permanent_errors_are_not_retried() {
        let memory = Arc::new(MemoryLedger::new());
        let ledger = RetryingLedger::new(memory.clone(), fast_policy(3));

        let result = ledger.get_token_info(&Pubkey::new_unique()).await;
        assert!(matches!(result, Err(SdkError::TokenNotFound(_))));
        assert_eq!(memory.request_count(), 1);
    }

    #[tokio::test]
    async fn test_writes_are_single_shot() {
        let memory = Arc::new(MemoryLedger::new());
        let ledger = RetryingLedger::new(memory.clone(), fast_policy(3));

        memory.fail_next(1);
        let result = ledger
            .request_airdrop(&Pubkey::new_unique(), 1_000)
            .await;
        assert!(matches!(result, Err(SdkError::LedgerUnavailable(_))));
        assert_eq!(memory.request_count(), 1);
    }
}
