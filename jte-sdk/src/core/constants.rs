/// Rent-exempt minimum for an SPL mint account (82 bytes)
pub const MINT_RENT_LAMPORTS: u64 = 1_461_600;

/// Rent-exempt minimum for an SPL token account (165 bytes)
pub const TOKEN_ACCOUNT_RENT_LAMPORTS: u64 = 2_039_280;

/// Rent-exempt minimum for a Metaplex metadata account (679 bytes)
pub const METADATA_RENT_LAMPORTS: u64 = 5_616_720;

/// Base fee charged per transaction signature
pub const SIGNATURE_FEE_LAMPORTS: u64 = 5_000;

pub const LAMPORTS_PER_SOL: u64 = 1_000_000_000;

/// Metaplex on-chain field limits
pub const MAX_NAME_LENGTH: usize = 32;
pub const MAX_SYMBOL_LENGTH: usize = 10;
pub const MAX_URI_LENGTH: usize = 200;

/// Largest decimal precision that still leaves room for whole units in a u64
pub const MAX_DECIMALS: u8 = 19;

pub const DEVNET_RPC_URL: &str = "https://api.devnet.solana.com";
pub const LOCALNET_RPC_URL: &str = "http://localhost:8899";
pub const EXPLORER_BASE_URL: &str = "https://explorer.solana.com";

/// Seeds for the token-metadata PDA
pub mod seeds {
    pub const METADATA: &[u8] = b"metadata";
}
