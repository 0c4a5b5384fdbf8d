//! TOML configuration for the `jte` workflow and CLI

use std::path::Path;

use serde::{Deserialize, Serialize};
use solana_sdk::{commitment_config::CommitmentConfig, pubkey::Pubkey};
use tracing::warn;

use crate::{
    core::{
        option_pubkey_serde, SdkError, SdkResult, TokenMetadataArgs, UiAmount, DEVNET_RPC_URL,
        LAMPORTS_PER_SOL, MAX_DECIMALS, MAX_NAME_LENGTH, MAX_SYMBOL_LENGTH,
    },
    explorer::Cluster,
    identity::{EnvKeypairProvider, IdentityProvider, KeypairFileProvider},
    ledger::RetryPolicy,
    storage::content_type_for_path,
    workflow::Steps,
};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct JteConfig {
    pub cluster: ClusterConfig,
    pub identity: IdentityConfig,
    pub token: TokenConfig,
    pub steps: Steps,
    pub amounts: AmountsConfig,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<MetadataConfig>,
    pub storage: StorageConfig,
    pub retry: RetryPolicy,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LedgerBackend {
    Rpc,
    Memory,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ClusterConfig {
    pub rpc_url: String,
    /// Explorer cluster: devnet, testnet, mainnet, localnet or a URL
    pub cluster: String,
    /// processed, confirmed or finalized
    pub commitment: String,
    pub backend: LedgerBackend,
    /// Whole-run deadline; 0 disables it
    pub deadline_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct IdentityConfig {
    pub keypair_path: String,
    /// Read the keypair from this environment variable instead of a file
    #[serde(skip_serializing_if = "Option::is_none")]
    pub env_var: Option<String>,
    pub generate_if_missing: bool,
    /// Request an airdrop when the payer holds less than this
    pub min_balance_lamports: u64,
    pub airdrop_lamports: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TokenConfig {
    /// Existing mint to operate on when the create step is off
    #[serde(
        with = "option_pubkey_serde",
        skip_serializing_if = "Option::is_none"
    )]
    pub mint: Option<Pubkey>,
    pub decimals: u8,
    /// Make the payer the freeze authority of a newly created token
    pub freeze_authority: bool,
    #[serde(
        with = "option_pubkey_serde",
        skip_serializing_if = "Option::is_none"
    )]
    pub receiver: Option<Pubkey>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AmountsConfig {
    pub mint: UiAmount,
    pub transfer: UiAmount,
    pub burn: UiAmount,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MetadataMode {
    /// Update when a record exists, publish otherwise
    #[default]
    Auto,
    Publish,
    Update,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetadataConfig {
    pub name: String,
    pub symbol: String,
    #[serde(default)]
    pub description: String,
    pub image_path: String,
    #[serde(default)]
    pub mode: MetadataMode,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    Memory,
    Local,
    Bundler,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    pub backend: StorageBackend,
    pub local_dir: String,
    /// Upload proxy accepting unsigned POSTs; public bundler nodes will not
    pub bundler_url: String,
    pub gateway_url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub json: bool,
}

impl Default for ClusterConfig {
    fn default() -> Self {
        Self {
            rpc_url: DEVNET_RPC_URL.to_string(),
            cluster: "devnet".to_string(),
            commitment: "confirmed".to_string(),
            backend: LedgerBackend::Rpc,
            deadline_secs: 300,
        }
    }
}

impl Default for IdentityConfig {
    fn default() -> Self {
        Self {
            keypair_path: "~/.config/solana/id.json".to_string(),
            env_var: None,
            generate_if_missing: true,
            min_balance_lamports: LAMPORTS_PER_SOL,
            airdrop_lamports: LAMPORTS_PER_SOL,
        }
    }
}

impl Default for TokenConfig {
    fn default() -> Self {
        Self {
            mint: None,
            decimals: 2,
            freeze_authority: true,
            receiver: None,
        }
    }
}

impl Default for AmountsConfig {
    fn default() -> Self {
        Self {
            mint: UiAmount::from(100),
            transfer: UiAmount::from(50),
            burn: UiAmount::from(25),
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: StorageBackend::Local,
            local_dir: "./jte-assets".to_string(),
            bundler_url: "http://localhost:3000".to_string(),
            gateway_url: "https://arweave.net".to_string(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
        }
    }
}

impl JteConfig {
    /// Load configuration from file
    pub fn from_file(path: &str) -> SdkResult<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| SdkError::Config(format!("Failed to read {}: {}", path, e)))?;
        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> SdkResult<Self> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Like `from_file`, but a missing file yields the defaults
    pub fn load_or_default(path: &str) -> SdkResult<Self> {
        if Path::new(path).exists() {
            Self::from_file(path)
        } else {
            warn!("Config file {} not found, using defaults", path);
            Ok(Self::default())
        }
    }

    pub fn save(&self, path: &str) -> SdkResult<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| SdkError::SerializationError(e.to_string()))?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Cross-field checks that serde cannot express
    pub fn validate(&self) -> SdkResult<()> {
        if self.cluster.rpc_url.is_empty() && self.cluster.backend == LedgerBackend::Rpc {
            return Err(SdkError::Config("cluster.rpc_url cannot be empty".to_string()));
        }
        self.commitment()?;
        self.explorer_cluster()?;

        if self.token.decimals > MAX_DECIMALS {
            return Err(SdkError::Config(format!(
                "token.decimals must be at most {}",
                MAX_DECIMALS
            )));
        }
        if !self.steps.create_token && self.token.mint.is_none() && self.steps.needs_token() {
            return Err(SdkError::Config(
                "token.mint is required when steps.create_token is false".to_string(),
            ));
        }
        if self.steps.transfer && self.token.receiver.is_none() {
            return Err(SdkError::Config(
                "token.receiver is required for the transfer step".to_string(),
            ));
        }

        match &self.metadata {
            Some(metadata) => metadata.validate()?,
            None if self.steps.metadata => {
                return Err(SdkError::Config(
                    "a [metadata] section is required for the metadata step".to_string(),
                ));
            }
            None => {}
        }

        self.retry.validate()?;
        Ok(())
    }

    pub fn commitment(&self) -> SdkResult<CommitmentConfig> {
        match self.cluster.commitment.as_str() {
            "processed" => Ok(CommitmentConfig::processed()),
            "confirmed" => Ok(CommitmentConfig::confirmed()),
            "finalized" => Ok(CommitmentConfig::finalized()),
            other => Err(SdkError::Config(format!("unknown commitment: {}", other))),
        }
    }

    pub fn explorer_cluster(&self) -> SdkResult<Cluster> {
        self.cluster.cluster.parse()
    }

    /// File or environment provider, as configured
    pub fn identity_provider(&self) -> SdkResult<Box<dyn IdentityProvider + Send + Sync>> {
        match &self.identity.env_var {
            Some(var) => Ok(Box::new(EnvKeypairProvider::new(var))),
            None => Ok(Box::new(
                KeypairFileProvider::new(&self.identity.keypair_path)?
                    .generate_if_missing(self.identity.generate_if_missing),
            )),
        }
    }
}

impl MetadataConfig {
    pub fn validate(&self) -> SdkResult<()> {
        if self.name.trim().is_empty() || self.name.len() > MAX_NAME_LENGTH {
            return Err(SdkError::Config(format!(
                "metadata.name must be 1 to {} bytes",
                MAX_NAME_LENGTH
            )));
        }
        if self.symbol.len() > MAX_SYMBOL_LENGTH {
            return Err(SdkError::Config(format!(
                "metadata.symbol must be at most {} bytes",
                MAX_SYMBOL_LENGTH
            )));
        }
        if self.image_path.is_empty() {
            return Err(SdkError::Config(
                "metadata.image_path cannot be empty".to_string(),
            ));
        }
        Ok(())
    }

    /// Read the image and assemble publish arguments
    pub async fn load_args(&self) -> SdkResult<TokenMetadataArgs> {
        let path = crate::identity::expand_home(&self.image_path)?;
        let image = tokio::fs::read(&path).await.map_err(|e| {
            SdkError::Config(format!("Failed to read image {}: {}", path.display(), e))
        })?;

        Ok(TokenMetadataArgs {
            name: self.name.clone(),
            symbol: self.symbol.clone(),
            description: self.description.clone(),
            image,
            image_content_type: content_type_for_path(&path).to_string(),
        })
    }
}
