//! End-to-end workflow runs against the in-memory backends

use std::{sync::Arc, time::Duration};

use async_trait::async_trait;
use jte_sdk::{
    config::MetadataMode,
    core::{
        MetadataContent, MetadataRecord, SdkResult, TokenAccountInfo, TokenInfo,
        TokenMetadataArgs, LAMPORTS_PER_SOL,
    },
    ledger::LedgerService,
    storage::MemoryStorage,
    workflow::MetadataPlan,
    Cluster, Identity, JteClient, MemoryLedger, RetryPolicy, RetryingLedger, SdkError, Steps,
    UiAmount, Workflow, WorkflowPlan,
};
use solana_sdk::{pubkey::Pubkey, signature::Signature};

fn metadata_plan(mode: MetadataMode, name: &str) -> MetadataPlan {
    MetadataPlan {
        args: TokenMetadataArgs {
            name: name.to_string(),
            symbol: "JTE".to_string(),
            description: "JTE test token".to_string(),
            image: b"logo".to_vec(),
            image_content_type: "image/png".to_string(),
        },
        mode,
    }
}

fn full_plan(receiver: Pubkey) -> WorkflowPlan {
    WorkflowPlan {
        steps: Steps::all(),
        decimals: 2,
        receiver: Some(receiver),
        mint_amount: UiAmount::from(100),
        transfer_amount: UiAmount::from(50),
        burn_amount: UiAmount::from(25),
        metadata: Some(metadata_plan(MetadataMode::Auto, "JTE Coin")),
        min_balance_lamports: LAMPORTS_PER_SOL,
        airdrop_lamports: 2 * LAMPORTS_PER_SOL,
        ..WorkflowPlan::default()
    }
}

fn workflow(
    ledger: Arc<dyn LedgerService>,
    identity: &Identity,
    plan: WorkflowPlan,
) -> Workflow {
    let client = JteClient::new(ledger, Arc::new(MemoryStorage::new()));
    Workflow::new(client, Box::new(identity.clone()), plan, Cluster::Devnet)
}

#[tokio::test]
async fn full_run_produces_expected_balances() {
    let ledger = Arc::new(MemoryLedger::new());
    let identity = Identity::generate();
    let receiver = Pubkey::new_unique();

    let report = workflow(ledger.clone(), &identity, full_plan(receiver))
        .run()
        .await
        .unwrap();

    let token = report.token.unwrap();
    let sender = report.sender_account.unwrap();
    let destination = report.receiver_account.unwrap();
    assert!(report.token_created);
    assert!(report.airdrop.is_some());
    assert!(report.mint_signature.is_some());
    assert!(report.transfer_signature.is_some());
    assert!(report.burn_signature.is_some());

    // 100 minted, 50 sent, 25 burned at 2 decimals
    assert_eq!(ledger.get_token_account(&sender).await.unwrap().amount, 2500);
    assert_eq!(ledger.get_token_account(&destination).await.unwrap().amount, 5000);
    assert_eq!(ledger.get_token_account(&destination).await.unwrap().owner, receiver);
    assert_eq!(ledger.get_token_info(&token).await.unwrap().supply, 7500);

    let metadata = report.metadata.as_ref().unwrap();
    let record = ledger
        .get_metadata(&metadata.metadata_address)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(record.content.name, "JTE Coin");
    assert_eq!(record.mint, token);

    let links = report.links(&Cluster::Devnet);
    assert!(links
        .iter()
        .all(|(_, url)| url.starts_with("https://explorer.solana.com/") && url.ends_with("?cluster=devnet")));
    assert!(links.iter().any(|(label, _)| *label == "Burn Transaction"));
}

#[tokio::test]
async fn rerun_on_existing_mint_updates_metadata() {
    let ledger = Arc::new(MemoryLedger::new());
    let identity = Identity::generate();
    let receiver = Pubkey::new_unique();

    let first = workflow(ledger.clone(), &identity, full_plan(receiver))
        .run()
        .await
        .unwrap();
    let token = first.token.unwrap();
    let accounts = ledger.account_count();

    let mut plan = full_plan(receiver);
    plan.steps.create_token = false;
    plan.existing_mint = Some(token);
    plan.metadata = Some(metadata_plan(MetadataMode::Auto, "JTE Coin v2"));

    let second = workflow(ledger.clone(), &identity, plan)
        .run()
        .await
        .unwrap();

    assert!(!second.token_created);
    assert_eq!(second.token, Some(token));
    assert_eq!(second.sender_account, first.sender_account);
    assert_eq!(second.receiver_account, first.receiver_account);
    assert_eq!(ledger.account_count(), accounts);
    assert_eq!(ledger.token_count(), 1);

    let published = second.metadata.unwrap();
    assert_eq!(
        published.metadata_address,
        first.metadata.unwrap().metadata_address
    );
    let record = ledger
        .get_metadata(&published.metadata_address)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(record.content.name, "JTE Coin v2");

    let sender = second.sender_account.unwrap();
    assert_eq!(ledger.get_token_account(&sender).await.unwrap().amount, 5000);
    assert_eq!(ledger.get_token_info(&token).await.unwrap().supply, 15000);
}

#[tokio::test]
async fn explicit_publish_on_existing_metadata_aborts() {
    let ledger = Arc::new(MemoryLedger::new());
    let identity = Identity::generate();
    let receiver = Pubkey::new_unique();

    let first = workflow(ledger.clone(), &identity, full_plan(receiver))
        .run()
        .await
        .unwrap();

    let mut plan = full_plan(receiver);
    plan.steps = Steps {
        create_token: false,
        mint: false,
        transfer: false,
        burn: false,
        metadata: true,
    };
    plan.existing_mint = first.token;
    plan.metadata = Some(metadata_plan(MetadataMode::Publish, "Again"));

    let result = workflow(ledger.clone(), &identity, plan).run().await;
    assert!(matches!(result, Err(SdkError::MetadataAlreadyExists(_))));
}

#[tokio::test]
async fn failed_step_aborts_the_run() {
    let ledger = Arc::new(MemoryLedger::new());
    let identity = Identity::generate();
    let receiver = Pubkey::new_unique();

    let mut plan = full_plan(receiver);
    plan.metadata = None;
    plan.steps.metadata = false;
    plan.transfer_amount = UiAmount::from(150);

    let result = workflow(ledger.clone(), &identity, plan).run().await;
    assert!(matches!(
        result,
        Err(SdkError::InsufficientBalance {
            expected: 15000,
            available: 10000
        })
    ));

    // Nothing after the transfer ran and nothing before it was undone
    assert_eq!(ledger.token_count(), 1);
    let token = ledger.tokens()[0];
    assert_eq!(ledger.get_token_info(&token).await.unwrap().supply, 10000);
    let sender = ledger
        .get_or_create_account(&identity, &token, &identity.address())
        .await
        .unwrap();
    assert_eq!(ledger.get_token_account(&sender).await.unwrap().amount, 10000);
}

#[tokio::test]
async fn missing_receiver_is_caught_before_anything_is_sent() {
    let ledger = Arc::new(MemoryLedger::new());
    let identity = Identity::generate();

    let mut plan = full_plan(Pubkey::new_unique());
    plan.receiver = None;

    let result = workflow(ledger.clone(), &identity, plan).run().await;
    assert!(matches!(result, Err(SdkError::InvalidParameters(_))));
    assert_eq!(ledger.request_count(), 0);
    assert_eq!(ledger.token_count(), 0);
}

#[tokio::test]
async fn missing_metadata_args_are_caught_before_anything_is_sent() {
    let ledger = Arc::new(MemoryLedger::new());
    let identity = Identity::generate();

    let mut plan = full_plan(Pubkey::new_unique());
    plan.metadata = None;

    let result = workflow(ledger.clone(), &identity, plan).run().await;
    assert!(matches!(result, Err(SdkError::InvalidParameters(_))));
    assert_eq!(ledger.request_count(), 0);
}

#[tokio::test]
async fn watch_only_identity_cannot_run() {
    let ledger = Arc::new(MemoryLedger::new());
    let identity = Identity::watch_only(Pubkey::new_unique());

    let mut plan = full_plan(Pubkey::new_unique());
    plan.min_balance_lamports = 0;

    let result = workflow(ledger.clone(), &identity, plan).run().await;
    assert!(matches!(result, Err(SdkError::InvalidAuthority(_))));
    assert_eq!(ledger.token_count(), 0);
}

/// Delegates to a memory ledger but stalls every balance query
struct StallingLedger {
    inner: MemoryLedger,
}

#[async_trait]
impl LedgerService for StallingLedger {
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

    async fn get_or_create_account(
        &self,
        payer: &Identity,
        token: &Pubkey,
        owner: &Pubkey,
    ) -> SdkResult<Pubkey> {
        self.inner.get_or_create_account(payer, token, owner).await
    }

    async fn get_token_info(&self, token: &Pubkey) -> SdkResult<TokenInfo> {
        self.inner.get_token_info(token).await
    }

    async fn get_token_account(&self, account: &Pubkey) -> SdkResult<TokenAccountInfo> {
        self.inner.get_token_account(account).await
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
        self.inner.get_metadata(metadata).await
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

    async fn get_balance(&self, _address: &Pubkey) -> SdkResult<u64> {
        tokio::time::sleep(Duration::from_secs(3600)).await;
        Ok(0)
    }

    async fn request_airdrop(&self, address: &Pubkey, lamports: u64) -> SdkResult<Signature> {
        self.inner.request_airdrop(address, lamports).await
    }
}

#[tokio::test]
async fn deadline_cancels_a_stalled_run() {
    let ledger = Arc::new(StallingLedger {
        inner: MemoryLedger::new(),
    });
    let identity = Identity::generate();

    let result = workflow(ledger.clone(), &identity, full_plan(Pubkey::new_unique()))
        .run_with_deadline(Duration::from_millis(50))
        .await;

    assert!(matches!(result, Err(SdkError::DeadlineExceeded(_))));
    assert_eq!(ledger.inner.token_count(), 0);
}

#[tokio::test]
async fn retrying_ledger_rides_out_transient_read_failures() {
    let memory = Arc::new(MemoryLedger::new());
    let policy = RetryPolicy {
        max_retries: 3,
        base_delay_ms: 1,
        max_delay_ms: 4,
        backoff_multiplier: 2.0,
    };
    let ledger = Arc::new(RetryingLedger::new(memory.clone(), policy));
    let identity = Identity::generate();

    // The balance check is the first request of the run
    memory.fail_next(2);
    let mut plan = full_plan(Pubkey::new_unique());
    plan.metadata = None;
    plan.steps.metadata = false;

    let report = workflow(ledger, &identity, plan).run().await.unwrap();
    assert!(report.burn_signature.is_some());
}

#[tokio::test]
async fn transient_write_failure_is_not_retried() {
    let memory = Arc::new(MemoryLedger::new());
    let ledger = Arc::new(RetryingLedger::new(memory.clone(), RetryPolicy::default()));
    let identity = Identity::generate();
    memory
        .request_airdrop(&identity.address(), 2 * LAMPORTS_PER_SOL)
        .await
        .unwrap();

    let mut plan = full_plan(Pubkey::new_unique());
    plan.min_balance_lamports = 0;
    plan.steps = Steps {
        create_token: true,
        mint: false,
        transfer: false,
        burn: false,
        metadata: false,
    };

    memory.fail_next(1);
    let result = workflow(ledger, &identity, plan).run().await;
    assert!(matches!(result, Err(SdkError::LedgerUnavailable(_))));
    assert_eq!(memory.token_count(), 0);
}
