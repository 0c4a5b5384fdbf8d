// Utility functions for CLI commands

use anyhow::{Context, Result};
use jte_sdk::explorer::Cluster;
use solana_sdk::{pubkey::Pubkey, signature::Signature};
use std::str::FromStr;

/// Parse a pubkey from string
pub fn parse_pubkey(s: &str) -> Result<Pubkey> {
    Pubkey::from_str(s).with_context(|| format!("Invalid public key: {}", s))
}

/// Print success message with checkmark
pub fn success(msg: &str) {
    println!("[OK] {}", msg);
}

/// Print info message
pub fn info(msg: &str) {
    println!("[INFO] {}", msg);
}

/// Print warning message
pub fn warn(msg: &str) {
    eprintln!("[WARN] {}", msg);
}

/// Print an explorer link for an address
pub fn address_link(cluster: &Cluster, label: &str, address: &Pubkey) {
    info(&format!("{}: {}", label, cluster.address_url(address)));
}

/// Print an explorer link for a transaction
pub fn tx_link(cluster: &Cluster, label: &str, signature: &Signature) {
    success(&format!("{}: {}", label, cluster.tx_url(signature)));
}

/// Lamports as SOL with nine decimals
pub fn format_sol(lamports: u64) -> String {
    format!(
        "{}.{:09}",
        lamports / jte_sdk::core::LAMPORTS_PER_SOL,
        lamports % jte_sdk::core::LAMPORTS_PER_SOL
    )
}
