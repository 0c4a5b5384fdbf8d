//! SDK error types

use solana_sdk::pubkey::Pubkey;
use thiserror::Error;

/// SDK error type
#[derive(Error, Debug)]
pub enum SdkError {
    /// Transport or network failure talking to the ledger
    #[error("Ledger unavailable: {0}")]
    LedgerUnavailable(String),

    /// The ledger accepted the request but rejected the transaction
    #[error("Transaction failed: {0}")]
    TransactionFailed(String),

    /// The identity has no signing capability
    #[error("Invalid authority: {0} has no signing capability")]
    InvalidAuthority(Pubkey),

    #[error("Authority mismatch: {signer} is not the {role} authority of token {token}")]
    AuthorityMismatch {
        token: Pubkey,
        signer: Pubkey,
        role: AuthorityRole,
    },

    /// The token account has been frozen by the freeze authority
    #[error("Insufficient authority: token account {0} is frozen")]
    InsufficientAuthority(Pubkey),

    #[error("Owner mismatch: {signer} does not own token account {account} (owner {owner})")]
    OwnerMismatch {
        account: Pubkey,
        owner: Pubkey,
        signer: Pubkey,
    },

    #[error("Update authority mismatch: metadata {metadata} is updatable by {expected}, not {signer}")]
    UpdateAuthorityMismatch {
        metadata: Pubkey,
        expected: Pubkey,
        signer: Pubkey,
    },

    /// Insufficient token balance
    #[error("Insufficient balance: expected {expected}, available {available}")]
    InsufficientBalance { expected: u64, available: u64 },

    /// Insufficient lamports for fees or rent
    #[error("Insufficient funds: {required} lamports required, {available} available")]
    InsufficientFunds { required: u64, available: u64 },

    #[error("Metadata already exists at {0}")]
    MetadataAlreadyExists(Pubkey),

    #[error("Metadata not found at {0}")]
    MetadataNotFound(Pubkey),

    #[error("Token not found: {0}")]
    TokenNotFound(Pubkey),

    #[error("Account not found: {0}")]
    AccountNotFound(Pubkey),

    #[error("Token mismatch: account {account} holds {actual}, expected {expected}")]
    TokenMismatch {
        account: Pubkey,
        expected: Pubkey,
        actual: Pubkey,
    },

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Identity error: {0}")]
    Identity(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid parameters: {0}")]
    InvalidParameters(String),

    #[error("Failed to serialize data: {0}")]
    SerializationError(String),

    #[error("Failed to deserialize account: {0}")]
    DeserializationError(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Math overflow")]
    MathOverflow,

    #[error("Deadline of {0}s exceeded")]
    DeadlineExceeded(u64),
}

/// Which token authority a check was made against
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthorityRole {
    Mint,
    Freeze,
}

impl std::fmt::Display for AuthorityRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AuthorityRole::Mint => write!(f, "mint"),
            AuthorityRole::Freeze => write!(f, "freeze"),
        }
    }
}

impl SdkError {
    /// Whether a retry of the same request could succeed
    pub fn is_transient(&self) -> bool {
        matches!(self, SdkError::LedgerUnavailable(_))
    }
}

impl From<solana_client::client_error::ClientError> for SdkError {
    fn from(err: solana_client::client_error::ClientError) -> Self {
        match err.get_transaction_error() {
            Some(tx_err) => SdkError::TransactionFailed(tx_err.to_string()),
            None => SdkError::LedgerUnavailable(err.to_string()),
        }
    }
}

impl From<spl_token::solana_program::program_error::ProgramError> for SdkError {
    fn from(err: spl_token::solana_program::program_error::ProgramError) -> Self {
        SdkError::InvalidParameters(err.to_string())
    }
}

impl From<serde_json::Error> for SdkError {
    fn from(err: serde_json::Error) -> Self {
        SdkError::SerializationError(err.to_string())
    }
}

impl From<toml::de::Error> for SdkError {
    fn from(err: toml::de::Error) -> Self {
        SdkError::Config(err.to_string())
    }
}

impl From<ureq::Error> for SdkError {
    fn from(err: ureq::Error) -> Self {
        SdkError::Storage(err.to_string())
    }
}

pub type SdkResult<T> = Result<T, SdkError>;
