//! Block explorer links for addresses and transactions

use std::{fmt, str::FromStr};

use solana_sdk::{pubkey::Pubkey, signature::Signature};
use url::form_urlencoded;

use crate::core::{SdkError, EXPLORER_BASE_URL, LOCALNET_RPC_URL};

/// Cluster a run is pointed at
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Cluster {
    Devnet,
    Testnet,
    Mainnet,
    Localnet,
    /// Any other RPC endpoint, linked through the explorer's custom mode
    Custom(String),
}

impl Cluster {
    fn query(&self) -> String {
        match self {
            Cluster::Devnet => "?cluster=devnet".to_string(),
            Cluster::Testnet => "?cluster=testnet".to_string(),
            Cluster::Mainnet => String::new(),
            Cluster::Localnet => {
                format!("?cluster=custom&customUrl={}", encode_url(LOCALNET_RPC_URL))
            }
            Cluster::Custom(url) => format!("?cluster=custom&customUrl={}", encode_url(url)),
        }
    }

    pub fn address_url(&self, address: &Pubkey) -> String {
        format!("{}/address/{}{}", EXPLORER_BASE_URL, address, self.query())
    }

    pub fn tx_url(&self, signature: &Signature) -> String {
        format!("{}/tx/{}{}", EXPLORER_BASE_URL, signature, self.query())
    }
}

impl Default for Cluster {
    fn default() -> Self {
        Cluster::Devnet
    }
}

impl fmt::Display for Cluster {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cluster::Devnet => write!(f, "devnet"),
            Cluster::Testnet => write!(f, "testnet"),
            Cluster::Mainnet => write!(f, "mainnet"),
            Cluster::Localnet => write!(f, "localnet"),
            Cluster::Custom(url) => write!(f, "{}", url),
        }
    }
}

impl FromStr for Cluster {
    type Err = SdkError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "devnet" => Ok(Cluster::Devnet),
            "testnet" => Ok(Cluster::Testnet),
            "mainnet" | "mainnet-beta" => Ok(Cluster::Mainnet),
            "localnet" | "localhost" => Ok(Cluster::Localnet),
            _ if s.starts_with("http://") || s.starts_with("https://") => {
                Ok(Cluster::Custom(s.to_string()))
            }
            _ => Err(SdkError::Config(format!("unknown cluster: {}", s))),
        }
    }
}

fn encode_url(url: &str) -> String {
    form_urlencoded::byte_serialize(url.as_bytes()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_devnet_links() {
        let address = Pubkey::new_unique();
        assert_eq!(
            Cluster::Devnet.address_url(&address),
            format!("https://explorer.solana.com/address/{}?cluster=devnet", address)
        );

        let signature = Signature::default();
        assert!(Cluster::Mainnet
            .tx_url(&signature)
            .ends_with(&signature.to_string()));
    }

    #[test]
    fn test_custom_cluster_is_encoded() {
        let cluster: Cluster = "http://10.0.0.2:8899".parse().unwrap();
        let link = cluster.address_url(&Pubkey::new_unique());
        assert!(link.ends_with("?cluster=custom&customUrl=http%3A%2F%2F10.0.0.2%3A8899"));

        let cluster: Cluster = "https://rpc.example.com/key%20a+b#x?y=1&z".parse().unwrap();
        let link = cluster.tx_url(&Signature::default());
        let query = link.split_once("customUrl=").unwrap().1;
        assert_eq!(
            query,
            "https%3A%2F%2Frpc.example.com%2Fkey%2520a%2Bb%23x%3Fy%3D1%26z"
        );
    }

    #[test]
    fn test_parse_cluster() {
        assert_eq!("mainnet-beta".parse::<Cluster>().unwrap(), Cluster::Mainnet);
        assert_eq!("Devnet".parse::<Cluster>().unwrap(), Cluster::Devnet);
        assert!("moon".parse::<Cluster>().is_err());
    }
}
