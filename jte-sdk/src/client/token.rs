use std::sync::Arc;

use solana_sdk::{pubkey::Pubkey, signature::Signature};
use tracing::{debug, info};

use crate::{
    core::{
        AuthorityRole, SdkError, SdkResult, TokenAccountInfo, TokenInfo, UiAmount, MAX_DECIMALS,
    },
    identity::Identity,
    ledger::LedgerService,
};

/// Service for token lifecycle operations
///
/// Checks capability, authority, ownership, freeze state and balance before
/// anything reaches the ledger, so callers get a precise error instead of a
/// generic transaction failure. Human amounts are scaled with the decimals
/// the ledger reports at call time.
pub struct LedgerClient {
    ledger: Arc<dyn LedgerService>,
}

impl LedgerClient {
    pub fn new(ledger: Arc<dyn LedgerService>) -> Self {
        Self { ledger }
    }

    pub fn ledger(&self) -> &Arc<dyn LedgerService> {
        &self.ledger
    }

    /// Create a new token with `decimals` precision
    pub async fn create_token(
        &self,
        payer: &Identity,
        mint_authority: &Pubkey,
        freeze_authority: Option<&Pubkey>,
        decimals: u8,
    ) -> SdkResult<Pubkey> {
        payer.keypair()?;
        if decimals > MAX_DECIMALS {
            return Err(SdkError::InvalidParameters(format!(
                "decimals {} exceeds maximum {}",
                decimals, MAX_DECIMALS
            )));
        }

        let token = self
            .ledger
            .create_token(payer, mint_authority, freeze_authority, decimals)
            .await?;
        info!("Token created: {} ({} decimals)", token, decimals);
        Ok(token)
    }

    /// Associated account of `owner` for `token`; created on first use
    pub async fn get_or_create_account(
        &self,
        payer: &Identity,
        token: &Pubkey,
        owner: &Pubkey,
    ) -> SdkResult<Pubkey> {
        payer.keypair()?;
        let account = self
            .ledger
            .get_or_create_account(payer, token, owner)
            .await?;
        debug!("token account for {} / {}: {}", owner, token, account);
        Ok(account)
    }

    /// Mint `amount` whole tokens into `destination`
    pub async fn mint(
        &self,
        payer: &Identity,
        token: &Pubkey,
        destination: &Pubkey,
        mint_authority: &Identity,
        amount: &UiAmount,
    ) -> SdkResult<Signature> {
        payer.keypair()?;
        mint_authority.keypair()?;

        let info = self.ledger.get_token_info(token).await?;
        if info.mint_authority != Some(mint_authority.address()) {
            return Err(SdkError::AuthorityMismatch {
                token: *token,
                signer: mint_authority.address(),
                role: AuthorityRole::Mint,
            });
        }

        let target = self.ledger.get_token_account(destination).await?;
        ensure_token(&target, token)?;
        ensure_not_frozen(&target)?;

        let base_units = amount.to_base_units(info.decimals)?;
        let signature = self
            .ledger
            .mint_to(payer, token, destination, mint_authority, base_units)
            .await?;
        info!(
            "Minted {} ({} base units) of {} to {}",
            amount, base_units, token, destination
        );
        Ok(signature)
    }

    /// Move `amount` whole tokens from `source` to `destination`
    pub async fn transfer(
        &self,
        payer: &Identity,
        source: &Pubkey,
        destination: &Pubkey,
        owner: &Identity,
        amount: &UiAmount,
        token: &Pubkey,
    ) -> SdkResult<Signature> {
        payer.keypair()?;
        owner.keypair()?;

        let info = self.ledger.get_token_info(token).await?;
        let from = self.ledger.get_token_account(source).await?;
        let to = self.ledger.get_token_account(destination).await?;
        ensure_token(&from, token)?;
        ensure_token(&to, token)?;
        ensure_owner(&from, owner)?;
        ensure_not_frozen(&from)?;
        ensure_not_frozen(&to)?;

        let base_units = amount.to_base_units(info.decimals)?;
        ensure_balance(&from, base_units)?;

        let signature = self
            .ledger
            .transfer(payer, source, destination, owner, base_units)
            .await?;
        info!(
            "Transferred {} ({} base units) from {} to {}",
            amount, base_units, source, destination
        );
        Ok(signature)
    }

    /// Destroy `amount` whole tokens held in `account`
    pub async fn burn(
        &self,
        payer: &Identity,
        account: &Pubkey,
        token: &Pubkey,
        owner: &Identity,
        amount: &UiAmount,
    ) -> SdkResult<Signature> {
        payer.keypair()?;
        owner.keypair()?;

        let info = self.ledger.get_token_info(token).await?;
        let holder = self.ledger.get_token_account(account).await?;
        ensure_token(&holder, token)?;
        ensure_owner(&holder, owner)?;
        ensure_not_frozen(&holder)?;

        let base_units = amount.to_base_units(info.decimals)?;
        ensure_balance(&holder, base_units)?;

        let signature = self
            .ledger
            .burn(payer, account, token, owner, base_units)
            .await?;
        info!(
            "Burned {} ({} base units) of {} from {}",
            amount, base_units, token, account
        );
        Ok(signature)
    }

    pub async fn freeze(
        &self,
        payer: &Identity,
        account: &Pubkey,
        token: &Pubkey,
        freeze_authority: &Identity,
    ) -> SdkResult<Signature> {
        self.check_freeze_authority(payer, account, token, freeze_authority)
            .await?;
        let signature = self
            .ledger
            .freeze_account(payer, account, token, freeze_authority)
            .await?;
        info!("Froze token account {}", account);
        Ok(signature)
    }

    pub async fn thaw(
        &self,
        payer: &Identity,
        account: &Pubkey,
        token: &Pubkey,
        freeze_authority: &Identity,
    ) -> SdkResult<Signature> {
        self.check_freeze_authority(payer, account, token, freeze_authority)
            .await?;
        let signature = self
            .ledger
            .thaw_account(payer, account, token, freeze_authority)
            .await?;
        info!("Thawed token account {}", account);
        Ok(signature)
    }

    pub async fn token_info(&self, token: &Pubkey) -> SdkResult<TokenInfo> {
        self.ledger.get_token_info(token).await
    }

    pub async fn token_account(&self, account: &Pubkey) -> SdkResult<TokenAccountInfo> {
        self.ledger.get_token_account(account).await
    }

    /// Token balance of `account` in base units
    pub async fn balance(&self, account: &Pubkey) -> SdkResult<u64> {
        Ok(self.ledger.get_token_account(account).await?.amount)
    }

    /// Native balance of `address` in lamports
    pub async fn sol_balance(&self, address: &Pubkey) -> SdkResult<u64> {
        self.ledger.get_balance(address).await
    }

    /// Airdrop `airdrop_lamports` when the balance is below `min_lamports`
    pub async fn ensure_funded(
        &self,
        identity: &Identity,
        min_lamports: u64,
        airdrop_lamports: u64,
    ) -> SdkResult<Option<Signature>> {
        let balance = self.ledger.get_balance(&identity.address()).await?;
        if balance >= min_lamports {
            debug!("{} holds {} lamports", identity.address(), balance);
            return Ok(None);
        }

        info!(
            "Balance of {} is {} lamports, requesting airdrop of {}",
            identity.address(),
            balance,
            airdrop_lamports
        );
        let signature = self
            .ledger
            .request_airdrop(&identity.address(), airdrop_lamports)
            .await?;
        Ok(Some(signature))
    }

    async fn check_freeze_authority(
        &self,
        payer: &Identity,
        account: &Pubkey,
        token: &Pubkey,
        freeze_authority: &Identity,
    ) -> SdkResult<()> {
        payer.keypair()?;
        freeze_authority.keypair()?;

        let info = self.ledger.get_token_info(token).await?;
        if info.freeze_authority != Some(freeze_authority.address()) {
            return Err(SdkError::AuthorityMismatch {
                token: *token,
                signer: freeze_authority.address(),
                role: AuthorityRole::Freeze,
            });
        }
        let holder = self.ledger.get_token_account(account).await?;
        ensure_token(&holder, token)
    }
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

fn ensure_owner(account: &TokenAccountInfo, owner: &Identity) -> SdkResult<()> {
    if account.owner != owner.address() {
        return Err(SdkError::OwnerMismatch {
            account: account.address,
            owner: account.owner,
            signer: owner.address(),
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

fn ensure_balance(account: &TokenAccountInfo, required: u64) -> SdkResult<()> {
    if account.amount < required {
        return Err(SdkError::InsufficientBalance {
            expected: required,
            available: account.amount,
        });
    }
    Ok(())
}
