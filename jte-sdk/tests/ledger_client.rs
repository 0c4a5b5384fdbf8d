//! Ledger client behaviour against the in-memory ledger

use std::sync::Arc;

use jte_sdk::{
    core::{AuthorityRole, LAMPORTS_PER_SOL},
    Identity, LedgerClient, LedgerService, MemoryLedger, SdkError, UiAmount,
};
use solana_sdk::pubkey::Pubkey;

struct Harness {
    memory: Arc<MemoryLedger>,
    client: LedgerClient,
    payer: Identity,
    token: Pubkey,
}

async fn harness(decimals: u8) -> Harness {
    let memory = Arc::new(MemoryLedger::new());
    let client = LedgerClient::new(memory.clone());
    let payer = Identity::generate();
    client
        .ensure_funded(&payer, LAMPORTS_PER_SOL, 2 * LAMPORTS_PER_SOL)
        .await
        .unwrap();
    let token = client
        .create_token(&payer, &payer.address(), Some(&payer.address()), decimals)
        .await
        .unwrap();
    Harness {
        memory,
        client,
        payer,
        token,
    }
}

fn amount(s: &str) -> UiAmount {
    s.parse().unwrap()
}

#[tokio::test]
async fn get_or_create_account_is_idempotent() {
    let h = harness(2).await;
    let owner = Pubkey::new_unique();

    let first = h
        .client
        .get_or_create_account(&h.payer, &h.token, &owner)
        .await
        .unwrap();
    let accounts = h.memory.account_count();
    let balance = h.client.sol_balance(&h.payer.address()).await.unwrap();

    let second = h
        .client
        .get_or_create_account(&h.payer, &h.token, &owner)
        .await
        .unwrap();

    assert_eq!(first, second);
    assert_eq!(h.memory.account_count(), accounts);
    assert_eq!(h.client.sol_balance(&h.payer.address()).await.unwrap(), balance);
}

#[tokio::test]
async fn mint_scales_by_token_decimals() {
    for (decimals, human, expected) in [(0u8, "7", 7u64), (2, "100", 10_000), (9, "0.5", 500_000_000)] {
        let h = harness(decimals).await;
        let account = h
            .client
            .get_or_create_account(&h.payer, &h.token, &h.payer.address())
            .await
            .unwrap();

        h.client
            .mint(&h.payer, &h.token, &account, &h.payer, &amount(human))
            .await
            .unwrap();

        assert_eq!(h.client.balance(&account).await.unwrap(), expected);
        assert_eq!(h.client.token_info(&h.token).await.unwrap().supply, expected);
    }
}

#[tokio::test]
async fn over_balance_transfer_changes_nothing() {
    let h = harness(2).await;
    let source = h
        .client
        .get_or_create_account(&h.payer, &h.token, &h.payer.address())
        .await
        .unwrap();
    let destination = h
        .client
        .get_or_create_account(&h.payer, &h.token, &Pubkey::new_unique())
        .await
        .unwrap();
    h.client
        .mint(&h.payer, &h.token, &source, &h.payer, &amount("10"))
        .await
        .unwrap();

    let result = h
        .client
        .transfer(&h.payer, &source, &destination, &h.payer, &amount("10.01"), &h.token)
        .await;

    assert!(matches!(
        result,
        Err(SdkError::InsufficientBalance {
            expected: 1001,
            available: 1000
        })
    ));
    assert_eq!(h.client.balance(&source).await.unwrap(), 1000);
    assert_eq!(h.client.balance(&destination).await.unwrap(), 0);
}

#[tokio::test]
async fn burn_reduces_balance_and_supply() {
    let h = harness(2).await;
    let account = h
        .client
        .get_or_create_account(&h.payer, &h.token, &h.payer.address())
        .await
        .unwrap();
    h.client
        .mint(&h.payer, &h.token, &account, &h.payer, &amount("40"))
        .await
        .unwrap();

    h.client
        .burn(&h.payer, &account, &h.token, &h.payer, &amount("15.25"))
        .await
        .unwrap();

    assert_eq!(h.client.balance(&account).await.unwrap(), 2475);
    assert_eq!(h.client.token_info(&h.token).await.unwrap().supply, 2475);
}

#[tokio::test]
async fn over_balance_burn_changes_nothing() {
    let h = harness(2).await;
    let account = h
        .client
        .get_or_create_account(&h.payer, &h.token, &h.payer.address())
        .await
        .unwrap();
    h.client
        .mint(&h.payer, &h.token, &account, &h.payer, &amount("25"))
        .await
        .unwrap();

    let result = h
        .client
        .burn(&h.payer, &account, &h.token, &h.payer, &amount("25.01"))
        .await;
    assert!(matches!(
        result,
        Err(SdkError::InsufficientBalance {
            expected: 2501,
            available: 2500
        })
    ));

    // The ledger enforces the same floor without the client's precheck
    let result = h
        .memory
        .burn(&h.payer, &account, &h.token, &h.payer, 2501)
        .await;
    assert!(matches!(result, Err(SdkError::InsufficientBalance { .. })));

    assert_eq!(h.client.balance(&account).await.unwrap(), 2500);
    assert_eq!(h.client.token_info(&h.token).await.unwrap().supply, 2500);
}

#[tokio::test]
async fn burn_requires_account_owner() {
    let h = harness(2).await;
    let account = h
        .client
        .get_or_create_account(&h.payer, &h.token, &h.payer.address())
        .await
        .unwrap();
    h.client
        .mint(&h.payer, &h.token, &account, &h.payer, &amount("10"))
        .await
        .unwrap();
    let stranger = Identity::generate();

    let result = h
        .client
        .burn(&h.payer, &account, &h.token, &stranger, &amount("1"))
        .await;
    assert!(matches!(
        result,
        Err(SdkError::OwnerMismatch { account: a, owner, signer })
            if a == account && owner == h.payer.address() && signer == stranger.address()
    ));

    let result = h
        .memory
        .burn(&h.payer, &account, &h.token, &stranger, 100)
        .await;
    assert!(matches!(result, Err(SdkError::OwnerMismatch { .. })));

    assert_eq!(h.client.balance(&account).await.unwrap(), 1000);
    assert_eq!(h.client.token_info(&h.token).await.unwrap().supply, 1000);
}

#[tokio::test]
async fn watch_only_identities_cannot_authorize() {
    let h = harness(2).await;
    let account = h
        .client
        .get_or_create_account(&h.payer, &h.token, &h.payer.address())
        .await
        .unwrap();
    let watch_only = Identity::watch_only(h.payer.address());

    let result = h
        .client
        .mint(&h.payer, &h.token, &account, &watch_only, &amount("1"))
        .await;
    assert!(matches!(result, Err(SdkError::InvalidAuthority(key)) if key == h.payer.address()));

    let result = h
        .client
        .create_token(&watch_only, &h.payer.address(), None, 2)
        .await;
    assert!(matches!(result, Err(SdkError::InvalidAuthority(_))));
}

#[tokio::test]
async fn mint_requires_mint_authority() {
    let h = harness(2).await;
    let account = h
        .client
        .get_or_create_account(&h.payer, &h.token, &h.payer.address())
        .await
        .unwrap();
    let stranger = Identity::generate();

    let result = h
        .client
        .mint(&h.payer, &h.token, &account, &stranger, &amount("1"))
        .await;
    assert!(matches!(
        result,
        Err(SdkError::AuthorityMismatch {
            role: AuthorityRole::Mint,
            ..
        })
    ));
    assert_eq!(h.client.token_info(&h.token).await.unwrap().supply, 0);
}

#[tokio::test]
async fn transfer_requires_source_owner() {
    let h = harness(0).await;
    let source = h
        .client
        .get_or_create_account(&h.payer, &h.token, &h.payer.address())
        .await
        .unwrap();
    let destination = h
        .client
        .get_or_create_account(&h.payer, &h.token, &Pubkey::new_unique())
        .await
        .unwrap();
    h.client
        .mint(&h.payer, &h.token, &source, &h.payer, &amount("5"))
        .await
        .unwrap();

    let thief = Identity::generate();
    let result = h
        .client
        .transfer(&h.payer, &source, &destination, &thief, &amount("5"), &h.token)
        .await;
    assert!(matches!(result, Err(SdkError::OwnerMismatch { .. })));
    assert_eq!(h.client.balance(&source).await.unwrap(), 5);
}

#[tokio::test]
async fn accounts_of_another_token_are_rejected() {
    let h = harness(2).await;
    let other = h
        .client
        .create_token(&h.payer, &h.payer.address(), None, 2)
        .await
        .unwrap();
    let foreign = h
        .client
        .get_or_create_account(&h.payer, &other, &h.payer.address())
        .await
        .unwrap();

    let result = h
        .client
        .mint(&h.payer, &h.token, &foreign, &h.payer, &amount("1"))
        .await;
    assert!(matches!(
        result,
        Err(SdkError::TokenMismatch { expected, actual, .. }) if expected == h.token && actual == other
    ));
}

#[tokio::test]
async fn freeze_needs_the_freeze_authority_and_blocks_burns() {
    let h = harness(2).await;
    let account = h
        .client
        .get_or_create_account(&h.payer, &h.token, &h.payer.address())
        .await
        .unwrap();
    h.client
        .mint(&h.payer, &h.token, &account, &h.payer, &amount("3"))
        .await
        .unwrap();

    let stranger = Identity::generate();
    let result = h.client.freeze(&h.payer, &account, &h.token, &stranger).await;
    assert!(matches!(
        result,
        Err(SdkError::AuthorityMismatch {
            role: AuthorityRole::Freeze,
            ..
        })
    ));

    h.client
        .freeze(&h.payer, &account, &h.token, &h.payer)
        .await
        .unwrap();
    assert!(h.client.token_account(&account).await.unwrap().frozen);

    let result = h
        .client
        .burn(&h.payer, &account, &h.token, &h.payer, &amount("1"))
        .await;
    assert!(matches!(result, Err(SdkError::InsufficientAuthority(_))));
    assert_eq!(h.client.balance(&account).await.unwrap(), 300);
}

#[tokio::test]
async fn unknown_token_is_reported() {
    let h = harness(2).await;
    let missing = Pubkey::new_unique();
    let result = h.client.token_info(&missing).await;
    assert!(matches!(result, Err(SdkError::TokenNotFound(key)) if key == missing));
}
