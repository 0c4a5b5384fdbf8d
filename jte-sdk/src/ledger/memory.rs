//! In-process ledger backed by a single `Mutex`.
//!
//! Mirrors the SPL token and token-metadata rules closely enough for the
//! workflow: associated accounts, rent and fees paid by the payer, mint and
//! freeze authorities, frozen accounts, one metadata record per token.
//! Every operation validates first and mutates last, under one lock, so a
//! failed request never leaves partial state behind.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU32, AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use solana_sdk::{
    pubkey::Pubkey,
    signature::{Keypair, Signature},
    signer::Signer,
};
use tracing::debug;

use super::LedgerService;
use crate::{
    core::{
        AuthorityRole, MetadataContent, MetadataRecord, SdkError, SdkResult, TokenAccountInfo,
        TokenInfo, METADATA_RENT_LAMPORTS, MINT_RENT_LAMPORTS, SIGNATURE_FEE_LAMPORTS,
        TOKEN_ACCOUNT_RENT_LAMPORTS,
    },
    identity::Identity,
    instructions::{validate_content, TokenInstructionBuilder},
    pda::PdaBuilder,
};

#[derive(Default)]
struct LedgerState {
    tokens: HashMap<Pubkey, TokenInfo>,
    accounts: HashMap<Pubkey, TokenAccountInfo>,
    metadata: HashMap<Pubkey, MetadataRecord>,
    lamports: HashMap<Pubkey, u64>,
    transactions: u64,
}

impl LedgerState {
    fn token(&self, token: &Pubkey) -> SdkResult<&TokenInfo> {
        self.tokens.get(token).ok_or(SdkError::TokenNotFound(*token))
    }

    fn account(&self, account: &Pubkey) -> SdkResult<&TokenAccountInfo> {
        self.accounts
            .get(account)
            .ok_or(SdkError::AccountNotFound(*account))
    }

    /// Check that `payer` can cover `lamports` without debiting yet
    fn ensure_funds(&self, payer: &Pubkey, lamports: u64) -> SdkResult<()> {
        let available = self.lamports.get(payer).copied().unwrap_or(0);
        if available < lamports {
            return Err(SdkError::InsufficientFunds {
                required: lamports,
                available,
            });
        }
        Ok(())
    }

    /// Debit fees and produce the transaction signature
    fn commit(&mut self, payer: &Keypair, lamports: u64) -> Signature {
        let balance = self.lamports.entry(payer.pubkey()).or_insert(0);
        *balance = balance.saturating_sub(lamports);
        self.transactions += 1;
        payer.sign_message(&self.transactions.to_le_bytes())
    }
}

fn fee_for(signers: &[&Pubkey]) -> u64 {
    let mut unique: Vec<&Pubkey> = signers.to_vec();
    unique.sort();
    unique.dedup();
    SIGNATURE_FEE_LAMPORTS * unique.len() as u64
}

fn ensure_owner(account: &TokenAccountInfo, owner: &Pubkey) -> SdkResult<()> {
    if account.owner != *owner {
        return Err(SdkError::OwnerMismatch {
            account: account.address,
            owner: account.owner,
            signer: *owner,
        });
    }
    Ok(())
}

fn ensure_not_frozen(account: &TokenAccountInfo) -> SdkResult<()> {
    if account.frozen {
        return Err(SdkError::InsufficientAuthority(account.address));
    }
    Ok(())
}

fn ensure_token(account: &TokenAccountInfo, token: &Pubkey) -> SdkResult<()> {
    if account.token != *token {
        return Err(SdkError::TokenMismatch {
            account: account.address,
            expected: *token,
            actual: account.token,
        });
    }
    Ok(())
}

/// In-memory ledger for tests and offline runs
pub struct MemoryLedger {
    state: Mutex<LedgerState>,
    faucet: Keypair,
    token_ix: TokenInstructionBuilder,
    pda: PdaBuilder,
    offline: AtomicBool,
    failures_pending: AtomicU32,
    requests: AtomicU64,
}

impl MemoryLedger {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(LedgerState::default()),
            faucet: Keypair::new(),
            token_ix: TokenInstructionBuilder::default(),
            pda: PdaBuilder::token_metadata(),
            offline: AtomicBool::new(false),
            failures_pending: AtomicU32::new(0),
            requests: AtomicU64::new(0),
        }
    }

    /// Reject every request with `LedgerUnavailable` while set
    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    /// Reject the next `count` requests with `LedgerUnavailable`
    pub fn fail_next(&self, count: u32) {
        self.failures_pending.store(count, Ordering::SeqCst);
    }

    /// Requests received, including rejected ones
    pub fn request_count(&self) -> u64 {
        self.requests.load(Ordering::SeqCst)
    }

    pub fn transaction_count(&self) -> u64 {
        self.state().transactions
    }

    pub fn token_count(&self) -> usize {
        self.state().tokens.len()
    }

    /// Addresses of every token created so far
    pub fn tokens(&self) -> Vec<Pubkey> {
        self.state().tokens.keys().copied().collect()
    }

    pub fn account_count(&self) -> usize {
        self.state().accounts.len()
    }

    fn state(&self) -> MutexGuard<'_, LedgerState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn admit(&self, operation: &str) -> SdkResult<()> {
        self.requests.fetch_add(1, Ordering::SeqCst);
        if self.offline.load(Ordering::SeqCst) {
            return Err(SdkError::LedgerUnavailable(format!(
                "{}: ledger is offline",
                operation
            )));
        }
        let injected = self
            .failures_pending
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();
        if injected {
            return Err(SdkError::LedgerUnavailable(format!(
                "{}: connection reset",
                operation
            )));
        }
        debug!("memory ledger: {}", operation);
        Ok(())
    }
}

impl Default for MemoryLedger {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl LedgerService for MemoryLedger {
    async fn create_token(
        &self,
        payer: &Identity,
        mint_authority: &Pubkey,
        freeze_authority: Option<&Pubkey>,
        decimals: u8,
    ) -> SdkResult<Pubkey> {
        self.admit("create_token")?;
        let payer_key = payer.keypair()?;
        let mint = Keypair::new();

        let mut state = self.state();
        let cost = MINT_RENT_LAMPORTS + fee_for(&[&payer.address(), &mint.pubkey()]);
        state.ensure_funds(&payer.address(), cost)?;

        state.tokens.insert(
            mint.pubkey(),
            TokenInfo {
                address: mint.pubkey(),
                decimals,
                supply: 0,
                mint_authority: Some(*mint_authority),
                freeze_authority: freeze_authority.copied(),
            },
        );
        state.commit(payer_key, cost);
        Ok(mint.pubkey())
    }

    async fn get_or_create_account(
        &self,
        payer: &Identity,
        token: &Pubkey,
        owner: &Pubkey,
    ) -> SdkResult<Pubkey> {
        self.admit("get_or_create_account")?;
        let payer_key = payer.keypair()?;
        let address = self.token_ix.associated_account(owner, token);

        let mut state = self.state();
        state.token(token)?;
        if state.accounts.contains_key(&address) {
            return Ok(address);
        }

        let cost = TOKEN_ACCOUNT_RENT_LAMPORTS + fee_for(&[&payer.address()]);
        state.ensure_funds(&payer.address(), cost)?;
        state.accounts.insert(
            address,
            TokenAccountInfo {
                address,
                token: *token,
                owner: *owner,
                amount: 0,
                frozen: false,
            },
        );
        state.commit(payer_key, cost);
        Ok(address)
    }

    async fn get_token_info(&self, token: &Pubkey) -> SdkResult<TokenInfo> {
        self.admit("get_token_info")?;
        self.state().token(token).cloned()
    }

    async fn get_token_account(&self, account: &Pubkey) -> SdkResult<TokenAccountInfo> {
        self.admit("get_token_account")?;
        self.state().account(account).cloned()
    }

    async fn mint_to(
        &self,
        payer: &Identity,
        token: &Pubkey,
        destination: &Pubkey,
        mint_authority: &Identity,
        amount: u64,
    ) -> SdkResult<Signature> {
        self.admit("mint_to")?;
        let payer_key = payer.keypair()?;
        mint_authority.keypair()?;

        let mut state = self.state();
        let info = state.token(token)?;
        if info.mint_authority != Some(mint_authority.address()) {
            return Err(SdkError::AuthorityMismatch {
                token: *token,
                signer: mint_authority.address(),
                role: AuthorityRole::Mint,
            });
        }
        let new_supply = info.supply.checked_add(amount).ok_or(SdkError::MathOverflow)?;

        let account = state.account(destination)?;
        ensure_token(account, token)?;
        ensure_not_frozen(account)?;
        let new_amount = account
            .amount
            .checked_add(amount)
            .ok_or(SdkError::MathOverflow)?;

        let cost = fee_for(&[&payer.address(), &mint_authority.address()]);
        state.ensure_funds(&payer.address(), cost)?;

        if let Some(info) = state.tokens.get_mut(token) {
            info.supply = new_supply;
        }
        if let Some(account) = state.accounts.get_mut(destination) {
            account.amount = new_amount;
        }
        Ok(state.commit(payer_key, cost))
    }

    async fn transfer(
        &self,
        payer: &Identity,
        source: &Pubkey,
        destination: &Pubkey,
        owner: &Identity,
        amount: u64,
    ) -> SdkResult<Signature> {
        self.admit("transfer")?;
        let payer_key = payer.keypair()?;
        owner.keypair()?;

        let mut state = self.state();
        let from = state.account(source)?;
        let to = state.account(destination)?;
        ensure_token(to, &from.token)?;
        ensure_owner(from, &owner.address())?;
        ensure_not_frozen(from)?;
        ensure_not_frozen(to)?;
        if from.amount < amount {
            return Err(SdkError::InsufficientBalance {
                expected: amount,
                available: from.amount,
            });
        }
        if source != destination {
            to.amount.checked_add(amount).ok_or(SdkError::MathOverflow)?;
        }

        let cost = fee_for(&[&payer.address(), &owner.address()]);
        state.ensure_funds(&payer.address(), cost)?;

        if source != destination {
            if let Some(from) = state.accounts.get_mut(source) {
                from.amount -= amount;
            }
            if let Some(to) = state.accounts.get_mut(destination) {
                to.amount += amount;
            }
        }
        Ok(state.commit(payer_key, cost))
    }

    async fn burn(
        &self,
        payer: &Identity,
        account: &Pubkey,
        token: &Pubkey,
        owner: &Identity,
        amount: u64,
    ) -> SdkResult<Signature> {
        self.admit("burn")?;
        let payer_key = payer.keypair()?;
        owner.keypair()?;

        let mut state = self.state();
        let supply = state.token(token)?.supply;
        let holder = state.account(account)?;
        ensure_token(holder, token)?;
        ensure_owner(holder, &owner.address())?;
        ensure_not_frozen(holder)?;
        if holder.amount < amount {
            return Err(SdkError::InsufficientBalance {
                expected: amount,
                available: holder.amount,
            });
        }
        let new_supply = supply.checked_sub(amount).ok_or(SdkError::MathOverflow)?;

        let cost = fee_for(&[&payer.address(), &owner.address()]);
        state.ensure_funds(&payer.address(), cost)?;

        if let Some(holder) = state.accounts.get_mut(account) {
            holder.amount -= amount;
        }
        if let Some(info) = state.tokens.get_mut(token) {
            info.supply = new_supply;
        }
        Ok(state.commit(payer_key, cost))
    }

    async fn freeze_account(
        &self,
        payer: &Identity,
        account: &Pubkey,
        token: &Pubkey,
        freeze_authority: &Identity,
    ) -> SdkResult<Signature> {
        self.admit("freeze_account")?;
        self.set_frozen(payer, account, token, freeze_authority, true)
    }

    async fn thaw_account(
        &self,
        payer: &Identity,
        account: &Pubkey,
        token: &Pubkey,
        freeze_authority: &Identity,
    ) -> SdkResult<Signature> {
        self.admit("thaw_account")?;
        self.set_frozen(payer, account, token, freeze_authority, false)
    }

    async fn get_metadata(&self, metadata: &Pubkey) -> SdkResult<Option<MetadataRecord>> {
        self.admit("get_metadata")?;
        Ok(self.state().metadata.get(metadata).cloned())
    }

    async fn create_metadata(
        &self,
        payer: &Identity,
        token: &Pubkey,
        mint_authority: &Identity,
        update_authority: &Identity,
        content: &MetadataContent,
    ) -> SdkResult<Signature> {
        self.admit("create_metadata")?;
        let payer_key = payer.keypair()?;
        mint_authority.keypair()?;
        update_authority.keypair()?;
        validate_content(content)?;

        let (address, _) = self.pda.metadata(token);
        let mut state = self.state();
        let info = state.token(token)?;
        if info.mint_authority != Some(mint_authority.address()) {
            return Err(SdkError::AuthorityMismatch {
                token: *token,
                signer: mint_authority.address(),
                role: AuthorityRole::Mint,
            });
        }
        if state.metadata.contains_key(&address) {
            return Err(SdkError::MetadataAlreadyExists(address));
        }

        let cost = METADATA_RENT_LAMPORTS
            + fee_for(&[
                &payer.address(),
                &mint_authority.address(),
                &update_authority.address(),
            ]);
        state.ensure_funds(&payer.address(), cost)?;

        state.metadata.insert(
            address,
            MetadataRecord {
                address,
                mint: *token,
                update_authority: update_authority.address(),
                content: content.clone(),
            },
        );
        Ok(state.commit(payer_key, cost))
    }

    async fn update_metadata(
        &self,
        payer: &Identity,
        token: &Pubkey,
        update_authority: &Identity,
        content: &MetadataContent,
    ) -> SdkResult<Signature> {
        self.admit("update_metadata")?;
        let payer_key = payer.keypair()?;
        update_authority.keypair()?;
        validate_content(content)?;

        let (address, _) = self.pda.metadata(token);
        let mut state = self.state();
        let record = state
            .metadata
            .get(&address)
            .ok_or(SdkError::MetadataNotFound(address))?;
        if record.update_authority != update_authority.address() {
            return Err(SdkError::UpdateAuthorityMismatch {
                metadata: address,
                expected: record.update_authority,
                signer: update_authority.address(),
            });
        }

        let cost = fee_for(&[&payer.address(), &update_authority.address()]);
        state.ensure_funds(&payer.address(), cost)?;

        if let Some(record) = state.metadata.get_mut(&address) {
            record.content = content.clone();
        }
        Ok(state.commit(payer_key, cost))
    }

    async fn get_balance(&self, address: &Pubkey) -> SdkResult<u64> {
        self.admit("get_balance")?;
        Ok(self.state().lamports.get(address).copied().unwrap_or(0))
    }

    async fn request_airdrop(&self, address: &Pubkey, lamports: u64) -> SdkResult<Signature> {
        self.admit("request_airdrop")?;
        let mut state = self.state();
        let balance = state.lamports.entry(*address).or_insert(0);
        *balance = balance.checked_add(lamports).ok_or(SdkError::MathOverflow)?;
        Ok(state.commit(&self.faucet, 0))
    }
}

impl MemoryLedger {
    fn set_frozen(
        &self,
        payer: &Identity,
        account: &Pubkey,
        token: &Pubkey,
        freeze_authority: &Identity,
        frozen: bool,
    ) -> SdkResult<Signature> {
        let payer_key = payer.keypair()?;
        freeze_authority.keypair()?;

        let mut state = self.state();
        let info = state.token(token)?;
        if info.freeze_authority != Some(freeze_authority.address()) {
            return Err(SdkError::AuthorityMismatch {
                token: *token,
                signer: freeze_authority.address(),
                role: AuthorityRole::Freeze,
            });
        }
        let holder = state.account(account)?;
        ensure_token(holder, token)?;
        if holder.frozen == frozen {
            return Err(SdkError::InvalidParameters(format!(
                "token account {} is already {}",
                account,
                if frozen { "frozen" } else { "thawed" }
            )));
        }

        let cost = fee_for(&[&payer.address(), &freeze_authority.address()]);
        state.ensure_funds(&payer.address(), cost)?;

        if let Some(holder) = state.accounts.get_mut(account) {
            holder.frozen = frozen;
        }
        Ok(state.commit(payer_key, cost))
    }
}
