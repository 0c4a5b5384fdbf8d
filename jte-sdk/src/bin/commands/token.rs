// Token commands

use anyhow::{Context as _, Result};
use clap::{Args, Subcommand};
use jte_sdk::{core::UiAmount, JteConfig};

use super::{
    utils::{address_link, info, parse_pubkey, success, tx_link},
    Context,
};

#[derive(Args)]
pub struct TokenCmd {
    #[command(subcommand)]
    command: TokenSubcommand,
}

#[derive(Subcommand)]
enum TokenSubcommand {
    /// Create a new token with the wallet as mint authority
    Create {
        #[arg(long, default_value_t = 2)]
        decimals: u8,

        /// Do not set the wallet as freeze authority
        #[arg(long)]
        no_freeze_authority: bool,
    },

    /// Get or create the associated token account of an owner
    Account {
        #[arg(long)]
        mint: String,

        /// Account owner (defaults to the wallet)
        #[arg(long)]
        owner: Option<String>,
    },

    /// Mint tokens
    Mint {
        #[arg(long)]
        mint: String,

        /// Amount in whole tokens, e.g. 100 or 12.5
        #[arg(long)]
        amount: UiAmount,

        /// Destination token account (defaults to the wallet's)
        #[arg(long)]
        to: Option<String>,
    },

    /// Transfer tokens from the wallet to another owner
    Transfer {
        #[arg(long)]
        mint: String,

        /// Receiving owner
        #[arg(long)]
        to: String,

        #[arg(long)]
        amount: UiAmount,
    },

    /// Burn tokens held by the wallet
    Burn {
        #[arg(long)]
        mint: String,

        #[arg(long)]
        amount: UiAmount,
    },

    /// Freeze a token account
    Freeze {
        #[arg(long)]
        mint: String,

        #[arg(long)]
        account: String,
    },

    /// Thaw a frozen token account
    Thaw {
        #[arg(long)]
        mint: String,

        #[arg(long)]
        account: String,
    },

    /// Show token information
    Info {
        #[arg(long)]
        mint: String,
    },
}

pub async fn execute(cmd: TokenCmd, config: JteConfig) -> Result<()> {
    let ctx = Context::new(config)?;
    let tokens = &ctx.client.tokens;

    match cmd.command {
        TokenSubcommand::Create {
            decimals,
            no_freeze_authority,
        } => {
            info("Creating token...");
            let wallet = ctx.identity()?;
            let authority = wallet.address();
            let freeze = (!no_freeze_authority).then_some(&authority);

            let mint = tokens
                .create_token(&wallet, &authority, freeze, decimals)
                .await
                .context("Failed to create token")?;

            success(&format!("Token created: {}", mint));
            address_link(&ctx.cluster, "Token Mint", &mint);
        }

        TokenSubcommand::Account { mint, owner } => {
            let wallet = ctx.identity()?;
            let mint = parse_pubkey(&mint)?;
            let owner = match owner {
                Some(owner) => parse_pubkey(&owner)?,
                None => wallet.address(),
            };

            let account = tokens
                .get_or_create_account(&wallet, &mint, &owner)
                .await
                .context("Failed to get or create token account")?;

            success(&format!("Token account: {}", account));
            address_link(&ctx.cluster, "Token Account", &account);
        }

        TokenSubcommand::Mint { mint, amount, to } => {
            let wallet = ctx.identity()?;
            let mint = parse_pubkey(&mint)?;
            let destination = match to {
                Some(account) => parse_pubkey(&account)?,
                None => tokens
                    .get_or_create_account(&wallet, &mint, &wallet.address())
                    .await
                    .context("Failed to get or create token account")?,
            };

            info(&format!("Minting {} to {}...", amount, destination));
            let signature = tokens
                .mint(&wallet, &mint, &destination, &wallet, &amount)
                .await
                .context("Failed to mint")?;
            tx_link(&ctx.cluster, "Mint Token Transaction", &signature);
        }

        TokenSubcommand::Transfer { mint, to, amount } => {
            let wallet = ctx.identity()?;
            let mint = parse_pubkey(&mint)?;
            let receiver = parse_pubkey(&to)?;

            let source = tokens
                .get_or_create_account(&wallet, &mint, &wallet.address())
                .await
                .context("Failed to get or create source account")?;
            let destination = tokens
                .get_or_create_account(&wallet, &mint, &receiver)
                .await
                .context("Failed to get or create receiver account")?;

            info(&format!("Transferring {} to {}...", amount, receiver));
            let signature = tokens
                .transfer(&wallet, &source, &destination, &wallet, &amount, &mint)
                .await
                .context("Failed to transfer")?;
            tx_link(&ctx.cluster, "Transfer Transaction", &signature);
        }

        TokenSubcommand::Burn { mint, amount } => {
            let wallet = ctx.identity()?;
            let mint = parse_pubkey(&mint)?;
            let account = tokens
                .get_or_create_account(&wallet, &mint, &wallet.address())
                .await
                .context("Failed to get or create token account")?;

            info(&format!("Burning {}...", amount));
            let signature = tokens
                .burn(&wallet, &account, &mint, &wallet, &amount)
                .await
                .context("Failed to burn")?;
            tx_link(&ctx.cluster, "Burn Transaction", &signature);
        }

        TokenSubcommand::Freeze { mint, account } => {
            let wallet = ctx.identity()?;
            let signature = tokens
                .freeze(&wallet, &parse_pubkey(&account)?, &parse_pubkey(&mint)?, &wallet)
                .await
                .context("Failed to freeze account")?;
            tx_link(&ctx.cluster, "Freeze Transaction", &signature);
        }

        TokenSubcommand::Thaw { mint, account } => {
            let wallet = ctx.identity()?;
            let signature = tokens
                .thaw(&wallet, &parse_pubkey(&account)?, &parse_pubkey(&mint)?, &wallet)
                .await
                .context("Failed to thaw account")?;
            tx_link(&ctx.cluster, "Thaw Transaction", &signature);
        }

        TokenSubcommand::Info { mint } => {
            let mint = parse_pubkey(&mint)?;
            let token = tokens
                .token_info(&mint)
                .await
                .context("Failed to fetch token")?;

            info(&format!("Token: {}", token.address));
            info(&format!("Decimals: {}", token.decimals));
            info(&format!("Supply: {} base units", token.supply));
            info(&format!(
                "Mint authority: {}",
                token
                    .mint_authority
                    .map(|key| key.to_string())
                    .unwrap_or_else(|| "none".to_string())
            ));
            info(&format!(
                "Freeze authority: {}",
                token
                    .freeze_authority
                    .map(|key| key.to_string())
                    .unwrap_or_else(|| "none".to_string())
            ));
            address_link(&ctx.cluster, "Token Mint", &mint);
        }
    }

    Ok(())
}
