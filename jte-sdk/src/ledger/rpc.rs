//! Ledger service over a Solana JSON-RPC endpoint

use std::{sync::Arc, time::Duration};

use async_trait::async_trait;
use solana_client::nonblocking::rpc_client::RpcClient;
use solana_sdk::{
    account::Account,
    commitment_config::CommitmentConfig,
    instruction::Instruction,
    pubkey::Pubkey,
    signature::{Keypair, Signature},
    signer::Signer,
    transaction::Transaction,
};
use spl_token::solana_program::{program_option::COption, program_pack::Pack};
use tracing::{debug, info};

use super::LedgerService;
use crate::{
    core::{
        MetadataContent, MetadataRecord, SdkError, SdkResult, TokenAccountInfo, TokenInfo,
    },
    identity::Identity,
    instructions::{self, TokenInstructionBuilder},
    pda::PdaBuilder,
};

const AIRDROP_CONFIRM_ATTEMPTS: u32 = 30;
const AIRDROP_POLL_INTERVAL: Duration = Duration::from_millis(500);

/// RPC-backed ledger
pub struct RpcLedger {
    rpc: Arc<RpcClient>,
    commitment: CommitmentConfig,
    token_ix: TokenInstructionBuilder,
    pda: PdaBuilder,
}

impl RpcLedger {
    pub fn new(rpc_url: &str, commitment: CommitmentConfig) -> Self {
        let rpc = Arc::new(RpcClient::new_with_commitment(
            rpc_url.to_string(),
            commitment,
        ));
        Self::with_client(rpc, commitment)
    }

    pub fn with_client(rpc: Arc<RpcClient>, commitment: CommitmentConfig) -> Self {
        Self {
            rpc,
            commitment,
            token_ix: TokenInstructionBuilder::default(),
            pda: PdaBuilder::token_metadata(),
        }
    }

    /// Get the RPC endpoint URL
    pub fn rpc_url(&self) -> String {
        self.rpc.url()
    }

    async fn fetch_account(&self, address: &Pubkey) -> SdkResult<Option<Account>> {
        Ok(self
            .rpc
            .get_account_with_commitment(address, self.commitment)
            .await?
            .value)
    }

    /// Sign with the payer plus every extra signer and wait for confirmation
    async fn send_and_confirm(
        &self,
        instructions: &[Instruction],
        payer: &Keypair,
        signers: &[&Keypair],
    ) -> SdkResult<Signature> {
        let mut all: Vec<&Keypair> = vec![payer];
        for signer in signers {
            if !all.iter().any(|k| k.pubkey() == signer.pubkey()) {
                all.push(signer);
            }
        }

        let recent_blockhash = self.rpc.get_latest_blockhash().await?;
        let tx = Transaction::new_signed_with_payer(
            instructions,
            Some(&payer.pubkey()),
            &all[..],
            recent_blockhash,
        );

        let signature = self.rpc.send_and_confirm_transaction(&tx).await?;
        debug!("confirmed {}", signature);
        Ok(signature)
    }
}

fn coption<T>(value: COption<T>) -> Option<T> {
    match value {
        COption::Some(v) => Some(v),
        COption::None => None,
    }
}

/// Decode a raw SPL mint account
pub fn decode_mint(address: &Pubkey, data: &[u8]) -> SdkResult<TokenInfo> {
    let mint = spl_token::state::Mint::unpack(data)
        .map_err(|e| SdkError::DeserializationError(format!("mint {}: {}", address, e)))?;
    Ok(TokenInfo {
        address: *address,
        decimals: mint.decimals,
        supply: mint.supply,
        mint_authority: coption(mint.mint_authority),
        freeze_authority: coption(mint.freeze_authority),
    })
}

/// Decode a raw SPL token account
pub fn decode_token_account(address: &Pubkey, data: &[u8]) -> SdkResult<TokenAccountInfo> {
    let account = spl_token::state::Account::unpack(data).map_err(|e| {
        SdkError::DeserializationError(format!("token account {}: {}", address, e))
    })?;
    Ok(TokenAccountInfo {
        address: *address,
        token: account.mint,
        owner: account.owner,
        amount: account.amount,
        frozen: account.is_frozen(),
    })
}

/// On-chain metadata strings are padded with NULs to their maximum length
fn trim_padding(value: &str) -> String {
    value.trim_end_matches('\0').to_string()
}

fn decode_metadata(address: &Pubkey, data: &[u8]) -> SdkResult<MetadataRecord> {
    let metadata = mpl_token_metadata::accounts::Metadata::from_bytes(data)
        .map_err(|e| SdkError::DeserializationError(format!("metadata {}: {}", address, e)))?;
    Ok(MetadataRecord {
        address: *address,
        mint: metadata.mint,
        update_authority: metadata.update_authority,
        content: MetadataContent {
            name: trim_padding(&metadata.name),
            symbol: trim_padding(&metadata.symbol),
            uri: trim_padding(&metadata.uri),
        },
    })
}

#[async_trait]
impl LedgerService for RpcLedger {
    async fn create_token(
        &self,
        payer: &Identity,
        mint_authority: &Pubkey,
        freeze_authority: Option<&Pubkey>,
        decimals: u8,
    ) -> SdkResult<Pubkey> {
        let payer_key = payer.keypair()?;
        let mint = Keypair::new();
        let rent = self
            .rpc
            .get_minimum_balance_for_rent_exemption(TokenInstructionBuilder::mint_space())
            .await?;

        let ixs = self.token_ix.create_mint(
            &payer.address(),
            &mint.pubkey(),
            rent,
            mint_authority,
            freeze_authority,
            decimals,
        )?;
        self.send_and_confirm(&ixs, payer_key, &[&mint]).await?;

        info!("Created token {}", mint.pubkey());
        Ok(mint.pubkey())
    }

    async fn get_or_create_account(
        &self,
        payer: &Identity,
        token: &Pubkey,
        owner: &Pubkey,
    ) -> SdkResult<Pubkey> {
        let payer_key = payer.keypair()?;
        let address = self.token_ix.associated_account(owner, token);

        if let Some(existing) = self.fetch_account(&address).await? {
            decode_token_account(&address, &existing.data)?;
            return Ok(address);
        }

        let ix = self
            .token_ix
            .create_associated_account(&payer.address(), owner, token);
        self.send_and_confirm(&[ix], payer_key, &[]).await?;
        Ok(address)
    }

    async fn get_token_info(&self, token: &Pubkey) -> SdkResult<TokenInfo> {
        let account = self
            .fetch_account(token)
            .await?
            .ok_or(SdkError::TokenNotFound(*token))?;
        if account.owner != self.token_ix.token_program_id() {
            return Err(SdkError::TokenNotFound(*token));
        }
        decode_mint(token, &account.data)
    }

    async fn get_token_account(&self, account: &Pubkey) -> SdkResult<TokenAccountInfo> {
        let raw = self
            .fetch_account(account)
            .await?
            .ok_or(SdkError::AccountNotFound(*account))?;
        if raw.owner != self.token_ix.token_program_id() {
            return Err(SdkError::AccountNotFound(*account));
        }
        decode_token_account(account, &raw.data)
    }

    async fn mint_to(
        &self,
        payer: &Identity,
        token: &Pubkey,
        destination: &Pubkey,
        mint_authority: &Identity,
        amount: u64,
    ) -> SdkResult<Signature> {
        let payer_key = payer.keypair()?;
        let authority_key = mint_authority.keypair()?;
        let ix = self
            .token_ix
            .mint_to(token, destination, &mint_authority.address(), amount)?;
        self.send_and_confirm(&[ix], payer_key, &[authority_key]).await
    }

    async fn transfer(
        &self,
        payer: &Identity,
        source: &Pubkey,
        destination: &Pubkey,
        owner: &Identity,
        amount: u64,
    ) -> SdkResult<Signature> {
        let payer_key = payer.keypair()?;
        let owner_key = owner.keypair()?;
        let ix = self
            .token_ix
            .transfer(source, destination, &owner.address(), amount)?;
        self.send_and_confirm(&[ix], payer_key, &[owner_key]).await
    }

    async fn burn(
        &self,
        payer: &Identity,
        account: &Pubkey,
        token: &Pubkey,
        owner: &Identity,
        amount: u64,
    ) -> SdkResult<Signature> {
        let payer_key = payer.keypair()?;
        let owner_key = owner.keypair()?;
        let ix = self.token_ix.burn(account, token, &owner.address(), amount)?;
        self.send_and_confirm(&[ix], payer_key, &[owner_key]).await
    }

    async fn freeze_account(
        &self,
        payer: &Identity,
        account: &Pubkey,
        token: &Pubkey,
        freeze_authority: &Identity,
    ) -> SdkResult<Signature> {
        let payer_key = payer.keypair()?;
        let authority_key = freeze_authority.keypair()?;
        let ix = self
            .token_ix
            .freeze(account, token, &freeze_authority.address())?;
        self.send_and_confirm(&[ix], payer_key, &[authority_key]).await
    }

    async fn thaw_account(
        &self,
        payer: &Identity,
        account: &Pubkey,
        token: &Pubkey,
        freeze_authority: &Identity,
    ) -> SdkResult<Signature> {
        let payer_key = payer.keypair()?;
        let authority_key = freeze_authority.keypair()?;
        let ix = self
            .token_ix
            .thaw(account, token, &freeze_authority.address())?;
        self.send_and_confirm(&[ix], payer_key, &[authority_key]).await
    }

    async fn get_metadata(&self, metadata: &Pubkey) -> SdkResult<Option<MetadataRecord>> {
        match self.fetch_account(metadata).await? {
            Some(account) if account.owner == self.pda.program_id && !account.data.is_empty() => {
                decode_metadata(metadata, &account.data).map(Some)
            }
            _ => Ok(None),
        }
    }

    async fn create_metadata(
        &self,
        payer: &Identity,
        token: &Pubkey,
        mint_authority: &Identity,
        update_authority: &Identity,
        content: &MetadataContent,
    ) -> SdkResult<Signature> {
        let payer_key = payer.keypair()?;
        let mint_key = mint_authority.keypair()?;
        let update_key = update_authority.keypair()?;
        let (address, _) = self.pda.metadata(token);

        let ix = instructions::create_metadata(
            address,
            *token,
            mint_authority.address(),
            payer.address(),
            update_authority.address(),
            content,
        )?;
        self.send_and_confirm(&[ix], payer_key, &[mint_key, update_key]).await
    }

    async fn update_metadata(
        &self,
        payer: &Identity,
        token: &Pubkey,
        update_authority: &Identity,
        content: &MetadataContent,
    ) -> SdkResult<Signature> {
        let payer_key = payer.keypair()?;
        let update_key = update_authority.keypair()?;
        let (address, _) = self.pda.metadata(token);

        let ix = instructions::update_metadata(address, update_authority.address(), content)?;
        self.send_and_confirm(&[ix], payer_key, &[update_key]).await
    }

    async fn get_balance(&self, address: &Pubkey) -> SdkResult<u64> {
        Ok(self.rpc.get_balance(address).await?)
    }

    async fn request_airdrop(&self, address: &Pubkey, lamports: u64) -> SdkResult<Signature> {
        let signature = self.rpc.request_airdrop(address, lamports).await?;
        for _ in 0..AIRDROP_CONFIRM_ATTEMPTS {
            if self.rpc.confirm_transaction(&signature).await? {
                return Ok(signature);
            }
            tokio::time::sleep(AIRDROP_POLL_INTERVAL).await;
        }
        Err(SdkError::LedgerUnavailable(format!(
            "airdrop {} was not confirmed",
            signature
        )))
    }
}
