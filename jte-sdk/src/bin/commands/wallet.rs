// Wallet commands

use anyhow::{Context as _, Result};
use clap::{Args, Subcommand};
use jte_sdk::{core::LAMPORTS_PER_SOL, JteConfig};

use super::{
    utils::{address_link, format_sol, info, tx_link},
    Context,
};

#[derive(Args)]
pub struct WalletCmd {
    #[command(subcommand)]
    command: WalletSubcommand,
}

#[derive(Subcommand)]
enum WalletSubcommand {
    /// Show the wallet address and SOL balance
    Show,

    /// Request an airdrop (devnet, testnet, localnet)
    Airdrop {
        #[arg(long, default_value_t = LAMPORTS_PER_SOL)]
        lamports: u64,
    },
}

pub async fn execute(cmd: WalletCmd, config: JteConfig) -> Result<()> {
    let ctx = Context::new(config)?;
    let wallet = ctx.identity()?;
    let tokens = &ctx.client.tokens;

    match cmd.command {
        WalletSubcommand::Show => {
            let balance = tokens
                .sol_balance(&wallet.address())
                .await
                .context("Failed to fetch balance")?;
            info(&format!("PublicKey: {}", wallet.address()));
            info(&format!("Balance: {} SOL", format_sol(balance)));
            address_link(&ctx.cluster, "Wallet", &wallet.address());
        }

        WalletSubcommand::Airdrop { lamports } => {
            info(&format!("Requesting {} SOL...", format_sol(lamports)));
            let signature = tokens
                .ledger()
                .request_airdrop(&wallet.address(), lamports)
                .await
                .context("Airdrop failed")?;
            tx_link(&ctx.cluster, "Airdrop Transaction", &signature);
        }
    }

    Ok(())
}
