//! Signing identities
//!
//! Authorization is modelled as an explicit capability: an `Identity` always
//! has an address, but only carries a signing key when it was loaded from
//! a keypair. Every ledger operation that needs an authority asks the
//! identity for its keypair and fails with `InvalidAuthority` otherwise.

use std::{
    fmt,
    path::{Path, PathBuf},
    sync::Arc,
};

use solana_sdk::{
    pubkey::Pubkey,
    signature::{read_keypair_file, write_keypair_file, Keypair},
    signer::Signer,
};
use tracing::info;

use crate::core::{SdkError, SdkResult};

/// An account address plus an optional signing capability
#[derive(Clone)]
pub struct Identity {
    address: Pubkey,
    signer: Option<Arc<Keypair>>,
}

impl Identity {
    pub fn from_keypair(keypair: Keypair) -> Self {
        Self {
            address: keypair.pubkey(),
            signer: Some(Arc::new(keypair)),
        }
    }

    /// An identity that can be named as owner or receiver but never signs
    pub fn watch_only(address: Pubkey) -> Self {
        Self {
            address,
            signer: None,
        }
    }

    /// Fresh random signing identity
    pub fn generate() -> Self {
        Self::from_keypair(Keypair::new())
    }

    pub fn address(&self) -> Pubkey {
        self.address
    }

    pub fn can_sign(&self) -> bool {
        self.signer.is_some()
    }

    /// The signing key, or `InvalidAuthority` for a watch-only identity
    pub fn keypair(&self) -> SdkResult<&Keypair> {
        self.signer
            .as_deref()
            .ok_or(SdkError::InvalidAuthority(self.address))
    }
}

impl fmt::Debug for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Identity")
            .field("address", &self.address.to_string())
            .field("can_sign", &self.can_sign())
            .finish()
    }
}

/// Supplies the signing identity used to authorize the workflow
pub trait IdentityProvider {
    fn load(&self) -> SdkResult<Identity>;
}

impl IdentityProvider for Identity {
    fn load(&self) -> SdkResult<Identity> {
        Ok(self.clone())
    }
}

/// Solana CLI style JSON keypair file
pub struct KeypairFileProvider {
    path: PathBuf,
    generate_if_missing: bool,
}

impl KeypairFileProvider {
    pub fn new(path: &str) -> SdkResult<Self> {
        Ok(Self {
            path: expand_home(path)?,
            generate_if_missing: false,
        })
    }

    /// Create and persist a new keypair on first run
    pub fn generate_if_missing(mut self, generate: bool) -> Self {
        self.generate_if_missing = generate;
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl IdentityProvider for KeypairFileProvider {
    fn load(&self) -> SdkResult<Identity> {
        if !self.path.exists() && self.generate_if_missing {
            if let Some(parent) = self.path.parent() {
                std::fs::create_dir_all(parent)?;
            }
            let keypair = Keypair::new();
            write_keypair_file(&keypair, &self.path).map_err(|e| {
                SdkError::Identity(format!(
                    "Failed to write keypair to {}: {}",
                    self.path.display(),
                    e
                ))
            })?;
            info!(
                "Generated new keypair {} at {}",
                keypair.pubkey(),
                self.path.display()
            );
            return Ok(Identity::from_keypair(keypair));
        }

        let keypair = read_keypair_file(&self.path).map_err(|e| {
            SdkError::Identity(format!(
                "Failed to load keypair from {}: {}",
                self.path.display(),
                e
            ))
        })?;
        Ok(Identity::from_keypair(keypair))
    }
}

/// Keypair stored as a JSON byte array in an environment variable
pub struct EnvKeypairProvider {
    var: String,
}

impl EnvKeypairProvider {
    pub fn new(var: &str) -> Self {
        Self {
            var: var.to_string(),
        }
    }
}

impl IdentityProvider for EnvKeypairProvider {
    fn load(&self) -> SdkResult<Identity> {
        let raw = std::env::var(&self.var)
            .map_err(|_| SdkError::Identity(format!("{} is not set", self.var)))?;
        let bytes: Vec<u8> = serde_json::from_str(&raw)?;
        let keypair = Keypair::from_bytes(&bytes)
            .map_err(|e| SdkError::Identity(format!("Invalid keypair in {}: {}", self.var, e)))?;
        Ok(Identity::from_keypair(keypair))
    }
}

/// Expand a leading `~` to the home directory
pub fn expand_home(path: &str) -> SdkResult<PathBuf> {
    let rest = match path.strip_prefix('~') {
        Some(rest) if rest.is_empty() || rest.starts_with('/') => rest,
        _ => return Ok(PathBuf::from(path)),
    };
    let home = std::env::var("HOME")
        .map_err(|_| SdkError::Identity("HOME environment variable not set".to_string()))?;
    Ok(PathBuf::from(format!("{}{}", home, rest)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_watch_only_cannot_sign() {
        let address = Pubkey::new_unique();
        let identity = Identity::watch_only(address);
        assert!(!identity.can_sign());
        assert!(matches!(
            identity.keypair(),
            Err(SdkError::InvalidAuthority(key)) if key == address
        ));
    }

    #[test]
    fn test_generate_then_reload() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("id.json");
        let provider = KeypairFileProvider::new(path.to_str().unwrap())
            .unwrap()
            .generate_if_missing(true);

        let first = provider.load().unwrap();
        assert!(path.exists());
        let second = provider.load().unwrap();
        assert_eq!(first.address(), second.address());
        assert!(second.can_sign());
    }

    #[test]
    fn test_missing_file_without_generation_fails() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent.json");
        let provider = KeypairFileProvider::new(path.to_str().unwrap()).unwrap();
        assert!(matches!(provider.load(), Err(SdkError::Identity(_))));
        assert!(!path.exists());
    }

    #[test]
    fn test_env_provider() {
        let keypair = Keypair::new();
        let var = "JTE_TEST_PRIVATE_KEY_ENV_PROVIDER";
        std::env::set_var(var, serde_json::to_string(&keypair.to_bytes().to_vec()).unwrap());

        let identity = EnvKeypairProvider::new(var).load().unwrap();
        assert_eq!(identity.address(), keypair.pubkey());

        std::env::set_var(var, "[1, 2, 3]");
        assert!(matches!(
            EnvKeypairProvider::new(var).load(),
            Err(SdkError::Identity(_))
        ));
        std::env::remove_var(var);
    }

    #[test]
    fn test_expand_home() {
        let home = std::env::var("HOME").unwrap();
        assert_eq!(
            expand_home("~/.config/solana/id.json").unwrap(),
            PathBuf::from(format!("{}/.config/solana/id.json", home))
        );
        assert_eq!(expand_home("/tmp/id.json").unwrap(), PathBuf::from("/tmp/id.json"));
        assert_eq!(expand_home("~").unwrap(), PathBuf::from(&home));
        assert_eq!(
            expand_home("~alice/id.json").unwrap(),
            PathBuf::from("~alice/id.json")
        );
    }
}
