//! Metaplex token-metadata instruction building

use mpl_token_metadata::{
    instructions::{CreateMetadataAccountV3Builder, UpdateMetadataAccountV2Builder},
    types::DataV2,
};
use solana_sdk::{instruction::Instruction, pubkey::Pubkey};

use crate::core::{
    MetadataContent, SdkError, SdkResult, MAX_NAME_LENGTH, MAX_SYMBOL_LENGTH, MAX_URI_LENGTH,
};

/// Reject content the metadata program would refuse
pub fn validate_content(content: &MetadataContent) -> SdkResult<()> {
    check_length("name", &content.name, MAX_NAME_LENGTH)?;
    check_length("symbol", &content.symbol, MAX_SYMBOL_LENGTH)?;
    check_length("uri", &content.uri, MAX_URI_LENGTH)?;
    if content.name.trim().is_empty() {
        return Err(SdkError::InvalidParameters(
            "metadata name cannot be empty".to_string(),
        ));
    }
    Ok(())
}

pub(crate) fn check_length(field: &str, value: &str, max: usize) -> SdkResult<()> {
    if value.len() > max {
        return Err(SdkError::InvalidParameters(format!(
            "metadata {} is {} bytes, maximum is {}",
            field,
            value.len(),
            max
        )));
    }
    Ok(())
}

fn data_v2(content: &MetadataContent) -> DataV2 {
    DataV2 {
        name: content.name.clone(),
        symbol: content.symbol.clone(),
        uri: content.uri.clone(),
        seller_fee_basis_points: 0,
        creators: None,
        collection: None,
        uses: None,
    }
}

/// Create a mutable metadata record for `mint`
pub fn create_metadata(
    metadata: Pubkey,
    mint: Pubkey,
    mint_authority: Pubkey,
    payer: Pubkey,
    update_authority: Pubkey,
    content: &MetadataContent,
) -> SdkResult<Instruction> {
    validate_content(content)?;
    Ok(CreateMetadataAccountV3Builder::new()
        .metadata(metadata)
        .mint(mint)
        .mint_authority(mint_authority)
        .payer(payer)
        .update_authority(update_authority, true)
        .data(data_v2(content))
        .is_mutable(true)
        .instruction())
}

/// Replace the content of an existing metadata record
pub fn update_metadata(
    metadata: Pubkey,
    update_authority: Pubkey,
    content: &MetadataContent,
) -> SdkResult<Instruction> {
    validate_content(content)?;
    Ok(UpdateMetadataAccountV2Builder::new()
        .metadata(metadata)
        .update_authority(update_authority)
        .data(data_v2(content))
        .instruction())
}
