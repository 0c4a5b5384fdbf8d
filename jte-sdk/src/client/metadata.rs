use std::sync::Arc;

use solana_sdk::pubkey::Pubkey;
use tracing::{debug, info};

use crate::{
    core::{
        AuthorityRole, MetadataContent, MetadataDescriptor, MetadataRecord, PublishedMetadata,
        SdkError, SdkResult, TokenMetadataArgs, MAX_NAME_LENGTH, MAX_SYMBOL_LENGTH,
        MAX_URI_LENGTH,
    },
    identity::Identity,
    instructions::metadata::check_length,
    ledger::LedgerService,
    pda::PdaBuilder,
    storage::ContentStorage,
};

/// Service for token metadata
pub struct MetadataPublisher {
    ledger: Arc<dyn LedgerService>,
    storage: Arc<dyn ContentStorage>,
    pda: Arc<PdaBuilder>,
}

impl MetadataPublisher {
    pub fn new(
        ledger: Arc<dyn LedgerService>,
        storage: Arc<dyn ContentStorage>,
        pda: Arc<PdaBuilder>,
    ) -> Self {
        Self {
            ledger,
            storage,
            pda,
        }
    }

    /// Metadata account bound to `token`
    pub fn metadata_address(&self, token: &Pubkey) -> Pubkey {
        self.pda.metadata(token).0
    }

    /// Upload the image and descriptor, then create the on-chain record
    ///
    /// `authority` pays, must be the token's mint authority, and becomes the
    /// record's update authority.
    pub async fn publish(
        &self,
        token: &Pubkey,
        authority: &Identity,
        args: &TokenMetadataArgs,
    ) -> SdkResult<PublishedMetadata> {
        authority.keypair()?;
        validate_args(args)?;

        let address = self.metadata_address(token);
        if self.ledger.get_metadata(&address).await?.is_some() {
            return Err(SdkError::MetadataAlreadyExists(address));
        }

        let info = self.ledger.get_token_info(token).await?;
        if info.mint_authority != Some(authority.address()) {
            return Err(SdkError::AuthorityMismatch {
                token: *token,
                signer: authority.address(),
                role: AuthorityRole::Mint,
            });
        }

        let (content, image_uri) = self.upload(args).await?;
        let signature = self
            .ledger
            .create_metadata(authority, token, authority, authority, &content)
            .await?;

        info!("Metadata for {} published at {}", token, address);
        Ok(PublishedMetadata {
            uri: content.uri,
            image_uri,
            metadata_address: address,
            signature,
        })
    }

    /// Re-upload and rebind the content of an existing record
    pub async fn update(
        &self,
        token: &Pubkey,
        authority: &Identity,
        args: &TokenMetadataArgs,
    ) -> SdkResult<PublishedMetadata> {
        authority.keypair()?;
        validate_args(args)?;

        let address = self.metadata_address(token);
        let record = self
            .ledger
            .get_metadata(&address)
            .await?
            .ok_or(SdkError::MetadataNotFound(address))?;
        if record.update_authority != authority.address() {
            return Err(SdkError::UpdateAuthorityMismatch {
                metadata: address,
                expected: record.update_authority,
                signer: authority.address(),
            });
        }

        let (content, image_uri) = self.upload(args).await?;
        let signature = self
            .ledger
            .update_metadata(authority, token, authority, &content)
            .await?;

        info!("Metadata for {} updated at {}", token, address);
        Ok(PublishedMetadata {
            uri: content.uri,
            image_uri,
            metadata_address: address,
            signature,
        })
    }

    pub async fn fetch(&self, token: &Pubkey) -> SdkResult<Option<MetadataRecord>> {
        self.ledger.get_metadata(&self.metadata_address(token)).await
    }

    /// Image first, then the descriptor that points at it
    async fn upload(&self, args: &TokenMetadataArgs) -> SdkResult<(MetadataContent, String)> {
        let image_uri = self
            .storage
            .upload(args.image.clone(), &args.image_content_type)
            .await?;
        debug!("image uploaded: {}", image_uri);

        let descriptor = MetadataDescriptor {
            name: args.name.clone(),
            symbol: args.symbol.clone(),
            description: args.description.clone(),
            image: image_uri.clone(),
        };
        let uri = self
            .storage
            .upload(serde_json::to_vec(&descriptor)?, "application/json")
            .await?;
        check_length("uri", &uri, MAX_URI_LENGTH)?;
        debug!("descriptor uploaded: {}", uri);

        Ok((
            MetadataContent {
                name: args.name.clone(),
                symbol: args.symbol.clone(),
                uri,
            },
            image_uri,
        ))
    }
}

fn validate_args(args: &TokenMetadataArgs) -> SdkResult<()> {
    check_length("name", &args.name, MAX_NAME_LENGTH)?;
    check_length("symbol", &args.symbol, MAX_SYMBOL_LENGTH)?;
    if args.name.trim().is_empty() {
        return Err(SdkError::InvalidParameters(
            "metadata name cannot be empty".to_string(),
        ));
    }
    Ok(())
}
