//! Basic usage example for the JTE SDK
//!
//! This example demonstrates:
//! - Building a client over the in-memory ledger
//! - Running the full token workflow
//! - Reading balances back and printing explorer links

use std::sync::Arc;

use jte_sdk::{
    config::MetadataMode,
    core::{TokenMetadataArgs, LAMPORTS_PER_SOL},
    storage::MemoryStorage,
    workflow::MetadataPlan,
    Cluster, Identity, JteClient, MemoryLedger, Steps, UiAmount, Workflow, WorkflowPlan,
};
use solana_sdk::pubkey::Pubkey;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Swap MemoryLedger for RpcLedger to run against a real cluster
    let ledger = Arc::new(MemoryLedger::new());
    let storage = Arc::new(MemoryStorage::new());
    let client = JteClient::new(ledger.clone(), storage.clone());

    let payer = Identity::generate();
    let receiver = Pubkey::new_unique();
    println!("Payer: {}", payer.address());

    let plan = WorkflowPlan {
        steps: Steps::all(),
        decimals: 2,
        receiver: Some(receiver),
        mint_amount: UiAmount::from(100),
        transfer_amount: UiAmount::from(50),
        burn_amount: UiAmount::from(25),
        metadata: Some(MetadataPlan {
            args: TokenMetadataArgs {
                name: "JTE Coin".to_string(),
                symbol: "JTE".to_string(),
                description: "Example token".to_string(),
                image: b"not really a png".to_vec(),
                image_content_type: "image/png".to_string(),
            },
            mode: MetadataMode::Auto,
        }),
        min_balance_lamports: LAMPORTS_PER_SOL,
        airdrop_lamports: 2 * LAMPORTS_PER_SOL,
        ..WorkflowPlan::default()
    };

    let workflow = Workflow::new(client, Box::new(payer), plan, Cluster::Devnet);
    let report = workflow.run().await?;

    let tokens = &workflow.client().tokens;
    if let (Some(token), Some(sender), Some(destination)) =
        (report.token, report.sender_account, report.receiver_account)
    {
        let info = tokens.token_info(&token).await?;
        println!("Token {} supply: {}", token, info.supply);
        println!("  Sender balance:   {}", tokens.balance(&sender).await?);
        println!("  Receiver balance: {}", tokens.balance(&destination).await?);
    }

    if let Some(metadata) = &report.metadata {
        println!("Metadata URI: {}", metadata.uri);
    }

    for (label, url) in report.links(&Cluster::Devnet) {
        println!("{}: {}", label, url);
    }

    Ok(())
}
