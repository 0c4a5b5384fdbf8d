// Token metadata commands

use anyhow::{Context as _, Result};
use clap::{Args, Subcommand};
use jte_sdk::{
    config::{MetadataConfig, MetadataMode},
    core::TokenMetadataArgs,
    JteConfig,
};

use super::{
    utils::{address_link, info, parse_pubkey, success, tx_link, warn},
    Context,
};

#[derive(Args)]
pub struct MetadataCmd {
    #[command(subcommand)]
    command: MetadataSubcommand,
}

#[derive(Args)]
struct DescribeArgs {
    #[arg(long)]
    mint: String,

    #[arg(long)]
    name: String,

    #[arg(long)]
    symbol: String,

    #[arg(long, default_value = "")]
    description: String,

    /// Image file to upload
    #[arg(long)]
    image: String,
}

#[derive(Subcommand)]
enum MetadataSubcommand {
    /// Upload and attach metadata to a token
    Publish(DescribeArgs),

    /// Replace the metadata of a token
    Update(DescribeArgs),

    /// Show the on-chain metadata of a token
    Show {
        #[arg(long)]
        mint: String,
    },
}

async fn load_args(args: &DescribeArgs) -> Result<TokenMetadataArgs> {
    let metadata = MetadataConfig {
        name: args.name.clone(),
        symbol: args.symbol.clone(),
        description: args.description.clone(),
        image_path: args.image.clone(),
        mode: MetadataMode::default(),
    };
    metadata.validate()?;
    Ok(metadata.load_args().await?)
}

pub async fn execute(cmd: MetadataCmd, config: JteConfig) -> Result<()> {
    let ctx = Context::new(config)?;
    let publisher = &ctx.client.metadata;

    match cmd.command {
        MetadataSubcommand::Publish(args) => {
            let wallet = ctx.identity()?;
            let mint = parse_pubkey(&args.mint)?;
            let metadata = load_args(&args).await?;

            info("Publishing metadata...");
            let published = publisher
                .publish(&mint, &wallet, &metadata)
                .await
                .context("Failed to publish metadata")?;

            success(&format!("Metadata URI: {}", published.uri));
            info(&format!("Image URI: {}", published.image_uri));
            address_link(&ctx.cluster, "Metadata Account", &published.metadata_address);
            tx_link(&ctx.cluster, "Metadata Transaction", &published.signature);
        }

        MetadataSubcommand::Update(args) => {
            let wallet = ctx.identity()?;
            let mint = parse_pubkey(&args.mint)?;
            let metadata = load_args(&args).await?;

            info("Updating metadata...");
            let published = publisher
                .update(&mint, &wallet, &metadata)
                .await
                .context("Failed to update metadata")?;

            success(&format!("Metadata URI: {}", published.uri));
            address_link(&ctx.cluster, "Metadata Account", &published.metadata_address);
            tx_link(&ctx.cluster, "Metadata Transaction", &published.signature);
        }

        MetadataSubcommand::Show { mint } => {
            let mint = parse_pubkey(&mint)?;
            match publisher
                .fetch(&mint)
                .await
                .context("Failed to fetch metadata")?
            {
                Some(record) => {
                    info(&format!("Name: {}", record.content.name));
                    info(&format!("Symbol: {}", record.content.symbol));
                    info(&format!("URI: {}", record.content.uri));
                    info(&format!("Update authority: {}", record.update_authority));
                    address_link(&ctx.cluster, "Metadata Account", &record.address);
                }
                None => warn(&format!("No metadata for {}", mint)),
            }
        }
    }

    Ok(())
}
