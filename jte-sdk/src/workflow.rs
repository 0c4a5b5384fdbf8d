//! The token lifecycle run: fund, create, mint, transfer, burn, describe
//!
//! Stages run strictly in order and each one feeds the next. The first
//! failure aborts the run; nothing already sent is rolled back.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use solana_sdk::{pubkey::Pubkey, signature::Signature};
use tracing::info;

use crate::{
    client::JteClient,
    config::{JteConfig, MetadataMode},
    core::{PublishedMetadata, SdkError, SdkResult, TokenMetadataArgs, UiAmount},
    explorer::Cluster,
    identity::{Identity, IdentityProvider},
};

/// Which optional stages run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Steps {
    pub create_token: bool,
    pub mint: bool,
    pub transfer: bool,
    pub burn: bool,
    pub metadata: bool,
}

impl Steps {
    /// Every stage enabled
    pub fn all() -> Self {
        Self {
            create_token: true,
            mint: true,
            transfer: true,
            burn: true,
            metadata: true,
        }
    }

    /// Whether any stage operates on a token
    pub fn needs_token(&self) -> bool {
        self.mint || self.transfer || self.burn || self.metadata
    }

    fn needs_sender_account(&self) -> bool {
        self.mint || self.transfer || self.burn
    }
}

impl Default for Steps {
    fn default() -> Self {
        Self {
            create_token: true,
            mint: true,
            transfer: false,
            burn: true,
            metadata: false,
        }
    }
}

/// Metadata to publish or update in the final stage
#[derive(Debug, Clone)]
pub struct MetadataPlan {
    pub args: TokenMetadataArgs,
    pub mode: MetadataMode,
}

/// Inputs of one run
#[derive(Debug, Clone)]
pub struct WorkflowPlan {
    pub steps: Steps,
    /// Used when `steps.create_token` is off
    pub existing_mint: Option<Pubkey>,
    pub decimals: u8,
    /// Make the payer the freeze authority of a created token
    pub freeze_authority: bool,
    pub receiver: Option<Pubkey>,
    pub mint_amount: UiAmount,
    pub transfer_amount: UiAmount,
    pub burn_amount: UiAmount,
    pub metadata: Option<MetadataPlan>,
    /// Airdrop below this balance; 0 skips the funding check
    pub min_balance_lamports: u64,
    pub airdrop_lamports: u64,
}

impl Default for WorkflowPlan {
    fn default() -> Self {
        Self {
            steps: Steps::default(),
            existing_mint: None,
            decimals: 2,
            freeze_authority: true,
            receiver: None,
            mint_amount: UiAmount::from(100),
            transfer_amount: UiAmount::from(50),
            burn_amount: UiAmount::from(25),
            metadata: None,
            min_balance_lamports: 0,
            airdrop_lamports: 0,
        }
    }
}

impl WorkflowPlan {
    /// Inputs each enabled stage needs, checked before anything is sent
    pub fn validate(&self) -> SdkResult<()> {
        let steps = &self.steps;
        if !steps.create_token && steps.needs_token() && self.existing_mint.is_none() {
            return Err(SdkError::InvalidParameters(
                "no token to operate on: set a mint".to_string(),
            ));
        }
        if steps.transfer && self.receiver.is_none() {
            return Err(SdkError::InvalidParameters(
                "transfer step needs a receiver".to_string(),
            ));
        }
        if steps.metadata && self.metadata.is_none() {
            return Err(SdkError::InvalidParameters(
                "metadata step needs metadata arguments".to_string(),
            ));
        }
        Ok(())
    }

    /// Plan described by `config`; `metadata_args` carries the loaded image
    pub fn from_config(config: &JteConfig, metadata_args: Option<TokenMetadataArgs>) -> Self {
        let mode = config
            .metadata
            .as_ref()
            .map(|metadata| metadata.mode)
            .unwrap_or_default();

        Self {
            steps: config.steps,
            existing_mint: config.token.mint,
            decimals: config.token.decimals,
            freeze_authority: config.token.freeze_authority,
            receiver: config.token.receiver,
            mint_amount: config.amounts.mint.clone(),
            transfer_amount: config.amounts.transfer.clone(),
            burn_amount: config.amounts.burn.clone(),
            metadata: metadata_args.map(|args| MetadataPlan { args, mode }),
            min_balance_lamports: config.identity.min_balance_lamports,
            airdrop_lamports: config.identity.airdrop_lamports,
        }
    }
}

/// Everything a run produced
#[derive(Debug, Clone, Default)]
pub struct WorkflowReport {
    pub identity: Pubkey,
    pub airdrop: Option<Signature>,
    pub token: Option<Pubkey>,
    pub token_created: bool,
    pub sender_account: Option<Pubkey>,
    pub receiver_account: Option<Pubkey>,
    pub mint_signature: Option<Signature>,
    pub transfer_signature: Option<Signature>,
    pub burn_signature: Option<Signature>,
    pub metadata: Option<PublishedMetadata>,
}

impl WorkflowReport {
    /// Labelled explorer links for every address and transaction produced
    pub fn links(&self, cluster: &Cluster) -> Vec<(&'static str, String)> {
        let mut links = vec![("Identity", cluster.address_url(&self.identity))];
        let addresses = [
            ("Token Mint", self.token),
            ("Sender Token Account", self.sender_account),
            ("Receiver Token Account", self.receiver_account),
            (
                "Metadata Account",
                self.metadata.as_ref().map(|m| m.metadata_address),
            ),
        ];
        let transactions = [
            ("Airdrop Transaction", self.airdrop),
            ("Mint Token Transaction", self.mint_signature),
            ("Transfer Transaction", self.transfer_signature),
            ("Burn Transaction", self.burn_signature),
            (
                "Metadata Transaction",
                self.metadata.as_ref().map(|m| m.signature),
            ),
        ];

        for (label, address) in addresses {
            if let Some(address) = address {
                links.push((label, cluster.address_url(&address)));
            }
        }
        for (label, signature) in transactions {
            if let Some(signature) = signature {
                links.push((label, cluster.tx_url(&signature)));
            }
        }
        links
    }
}

/// Sequential token workflow
pub struct Workflow {
    client: JteClient,
    identity: Box<dyn IdentityProvider + Send + Sync>,
    plan: WorkflowPlan,
    cluster: Cluster,
}

impl Workflow {
    pub fn new(
        client: JteClient,
        identity: Box<dyn IdentityProvider + Send + Sync>,
        plan: WorkflowPlan,
        cluster: Cluster,
    ) -> Self {
        Self {
            client,
            identity,
            plan,
            cluster,
        }
    }

    pub fn client(&self) -> &JteClient {
        &self.client
    }

    pub fn plan(&self) -> &WorkflowPlan {
        &self.plan
    }

    /// Run every enabled stage in order
    pub async fn run(&self) -> SdkResult<WorkflowReport> {
        let plan = &self.plan;
        let steps = plan.steps;
        let tokens = &self.client.tokens;
        plan.validate()?;

        let identity = self.identity.load()?;
        info!("PublicKey: {}", identity.address());
        let mut report = WorkflowReport {
            identity: identity.address(),
            ..WorkflowReport::default()
        };

        if plan.min_balance_lamports > 0 {
            report.airdrop = tokens
                .ensure_funded(&identity, plan.min_balance_lamports, plan.airdrop_lamports)
                .await?;
            if let Some(signature) = report.airdrop {
                self.log_tx("Airdrop Transaction", &signature);
            }
        }

        if !steps.create_token && !steps.needs_token() {
            return Ok(report);
        }

        let token = self.resolve_token(&identity, &mut report).await?;

        if steps.needs_sender_account() {
            let sender = tokens
                .get_or_create_account(&identity, &token, &identity.address())
                .await?;
            self.log_address("Token Account", &sender);
            report.sender_account = Some(sender);

            if steps.mint {
                let signature = tokens
                    .mint(&identity, &token, &sender, &identity, &plan.mint_amount)
                    .await?;
                self.log_tx("Mint Token Transaction", &signature);
                report.mint_signature = Some(signature);
            }

            if steps.transfer {
                let receiver = plan.receiver.ok_or_else(|| {
                    SdkError::InvalidParameters("transfer step needs a receiver".to_string())
                })?;
                let destination = tokens
                    .get_or_create_account(&identity, &token, &receiver)
                    .await?;
                self.log_address("Receiver Token Account", &destination);
                report.receiver_account = Some(destination);

                let signature = tokens
                    .transfer(
                        &identity,
                        &sender,
                        &destination,
                        &identity,
                        &plan.transfer_amount,
                        &token,
                    )
                    .await?;
                self.log_tx("Transfer Transaction", &signature);
                report.transfer_signature = Some(signature);
            }

            if steps.burn {
                let signature = tokens
                    .burn(&identity, &sender, &token, &identity, &plan.burn_amount)
                    .await?;
                self.log_tx("Burn Transaction", &signature);
                report.burn_signature = Some(signature);
            }
        }

        if steps.metadata {
            let metadata = plan.metadata.as_ref().ok_or_else(|| {
                SdkError::InvalidParameters("metadata step needs metadata arguments".to_string())
            })?;
            let published = self.describe(&identity, &token, metadata).await?;
            self.log_address("Metadata Account", &published.metadata_address);
            self.log_tx("Metadata Transaction", &published.signature);
            report.metadata = Some(published);
        }

        info!("Finished successfully");
        Ok(report)
    }

    /// `run`, cancelled as a whole once `deadline` elapses
    pub async fn run_with_deadline(&self, deadline: Duration) -> SdkResult<WorkflowReport> {
        tokio::time::timeout(deadline, self.run())
            .await
            .map_err(|_| SdkError::DeadlineExceeded(deadline.as_secs()))?
    }

    async fn resolve_token(
        &self,
        identity: &Identity,
        report: &mut WorkflowReport,
    ) -> SdkResult<Pubkey> {
        let plan = &self.plan;
        if plan.steps.create_token {
            let freeze = identity.address();
            let token = self
                .client
                .tokens
                .create_token(
                    identity,
                    &identity.address(),
                    plan.freeze_authority.then_some(&freeze),
                    plan.decimals,
                )
                .await?;
            self.log_address("Token Mint", &token);
            report.token = Some(token);
            report.token_created = true;
            return Ok(token);
        }

        let token = plan.existing_mint.ok_or_else(|| {
            SdkError::InvalidParameters("no token to operate on: set a mint".to_string())
        })?;
        self.client.tokens.token_info(&token).await?;
        report.token = Some(token);
        Ok(token)
    }

    async fn describe(
        &self,
        identity: &Identity,
        token: &Pubkey,
        metadata: &MetadataPlan,
    ) -> SdkResult<PublishedMetadata> {
        let publisher = &self.client.metadata;
        let update = match metadata.mode {
            MetadataMode::Publish => false,
            MetadataMode::Update => true,
            MetadataMode::Auto => publisher.fetch(token).await?.is_some(),
        };

        if update {
            publisher.update(token, identity, &metadata.args).await
        } else {
            publisher.publish(token, identity, &metadata.args).await
        }
    }

    fn log_address(&self, label: &str, address: &Pubkey) {
        info!("{}: {}", label, self.cluster.address_url(address));
    }

    fn log_tx(&self, label: &str, signature: &Signature) {
        info!("{}: {}", label, self.cluster.tx_url(signature));
    }
}
