use serde::{Deserialize, Serialize};
use solana_sdk::{pubkey::Pubkey, signature::Signature};

/// Token (mint) information as recorded by the ledger
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenInfo {
    pub address: Pubkey,
    pub decimals: u8,
    pub supply: u64,
    pub mint_authority: Option<Pubkey>,
    pub freeze_authority: Option<Pubkey>,
}

/// Token account information
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenAccountInfo {
    pub address: Pubkey,
    pub token: Pubkey,
    pub owner: Pubkey,
    /// Balance in base units
    pub amount: u64,
    pub frozen: bool,
}

/// The fields bound on chain by a metadata record
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetadataContent {
    pub name: String,
    pub symbol: String,
    pub uri: String,
}

/// On-chain metadata record for a token
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetadataRecord {
    pub address: Pubkey,
    pub mint: Pubkey,
    pub update_authority: Pubkey,
    pub content: MetadataContent,
}

/// Off-chain descriptor uploaded to content storage
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetadataDescriptor {
    pub name: String,
    pub symbol: String,
    pub description: String,
    pub image: String,
}

/// Input for publishing or updating token metadata
#[derive(Debug, Clone)]
pub struct TokenMetadataArgs {
    pub name: String,
    pub symbol: String,
    pub description: String,
    pub image: Vec<u8>,
    pub image_content_type: String,
}

/// Result of a metadata publish or update
#[derive(Debug, Clone)]
pub struct PublishedMetadata {
    /// URI of the uploaded JSON descriptor (bound on chain)
    pub uri: String,
    pub image_uri: String,
    pub metadata_address: Pubkey,
    pub signature: Signature,
}

/// Serde adapter for optional base58 addresses in config files
pub mod option_pubkey_serde {
    use serde::{Deserialize, Deserializer, Serializer};
    use solana_sdk::pubkey::Pubkey;
    use std::str::FromStr;

    pub fn serialize<S>(pubkey: &Option<Pubkey>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match pubkey {
            Some(key) => serializer.serialize_some(&key.to_string()),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<Pubkey>, D::Error>
    where
        D: Deserializer<'de>,
    {
        Option::<String>::deserialize(deserializer)?
            .map(|s| Pubkey::from_str(&s).map_err(serde::de::Error::custom))
            .transpose()
    }
}
