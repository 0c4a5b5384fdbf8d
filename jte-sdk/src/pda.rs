use solana_sdk::pubkey::Pubkey;
use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};

use crate::core::seeds;

/// PDA cache to avoid recomputing addresses
pub struct PdaCache {
    cache: RwLock<HashMap<String, (Pubkey, u8)>>,
}

impl PdaCache {
    pub fn new() -> Self {
        Self {
            cache: RwLock::new(HashMap::new()),
        }
    }

    pub fn get_or_compute<F>(&self, key: &str, compute: F) -> (Pubkey, u8)
    where
        F: FnOnce() -> (Pubkey, u8),
    {
        if let Some(cached) = self
            .cache
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
        {
            return *cached;
        }

        let result = compute();
        self.cache
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key.to_string(), result);
        result
    }

    pub fn len(&self) -> usize {
        self.cache
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for PdaCache {
    fn default() -> Self {
        Self::new()
    }
}

/// Derives token-metadata program addresses
pub struct PdaBuilder {
    cache: PdaCache,
    pub program_id: Pubkey,
}

impl PdaBuilder {
    pub fn new(program_id: Pubkey) -> Self {
        Self {
            cache: PdaCache::new(),
            program_id,
        }
    }

    /// Builder for the Metaplex token-metadata program
    pub fn token_metadata() -> Self {
        Self::new(mpl_token_metadata::ID)
    }

    /// Metadata account bound to `mint`: `["metadata", program_id, mint]`
    pub fn metadata(&self, mint: &Pubkey) -> (Pubkey, u8) {
        let key = format!("metadata:{}", mint);
        self.cache.get_or_compute(&key, || {
            Pubkey::find_program_address(
                &[seeds::METADATA, self.program_id.as_ref(), mint.as_ref()],
                &self.program_id,
            )
        })
    }

    pub fn cached(&self) -> usize {
        self.cache.len()
    }
}

impl Default for PdaBuilder {
    fn default() -> Self {
        Self::token_metadata()
    }
}
