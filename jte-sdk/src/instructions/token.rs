//! SPL token instruction building
//!
//! Pure functions over addresses; nothing here touches the network. The
//! RPC ledger composes these into transactions.

use solana_program::system_instruction;
use solana_sdk::{instruction::Instruction, pubkey::Pubkey};
use spl_associated_token_account::{
    get_associated_token_address_with_program_id,
    instruction::create_associated_token_account_idempotent,
};
use spl_token::solana_program::program_pack::Pack;

use crate::core::SdkResult;

/// Builds SPL token program instructions
pub struct TokenInstructionBuilder {
    token_program_id: Pubkey,
}

impl TokenInstructionBuilder {
    pub fn new(token_program_id: Pubkey) -> Self {
        Self { token_program_id }
    }

    pub fn token_program_id(&self) -> Pubkey {
        self.token_program_id
    }

    /// Space required for a mint account
    pub fn mint_space() -> usize {
        spl_token::state::Mint::LEN
    }

    /// Associated token account for (owner, mint)
    pub fn associated_account(&self, owner: &Pubkey, mint: &Pubkey) -> Pubkey {
        get_associated_token_address_with_program_id(owner, mint, &self.token_program_id)
    }

    /// Allocate and initialize a new mint at `mint`, paid by `payer`
    pub fn create_mint(
        &self,
        payer: &Pubkey,
        mint: &Pubkey,
        rent_lamports: u64,
        mint_authority: &Pubkey,
        freeze_authority: Option<&Pubkey>,
        decimals: u8,
    ) -> SdkResult<Vec<Instruction>> {
        let create = system_instruction::create_account(
            payer,
            mint,
            rent_lamports,
            Self::mint_space() as u64,
            &self.token_program_id,
        );
        let initialize = spl_token::instruction::initialize_mint2(
            &self.token_program_id,
            mint,
            mint_authority,
            freeze_authority,
            decimals,
        )?;
        Ok(vec![create, initialize])
    }

    /// Create the associated account if it does not exist yet
    pub fn create_associated_account(
        &self,
        payer: &Pubkey,
        owner: &Pubkey,
        mint: &Pubkey,
    ) -> Instruction {
        create_associated_token_account_idempotent(payer, owner, mint, &self.token_program_id)
    }

    pub fn mint_to(
        &self,
        mint: &Pubkey,
        destination: &Pubkey,
        mint_authority: &Pubkey,
        amount: u64,
    ) -> SdkResult<Instruction> {
        Ok(spl_token::instruction::mint_to(
            &self.token_program_id,
            mint,
            destination,
            mint_authority,
            &[],
            amount,
        )?)
    }

    pub fn transfer(
        &self,
        source: &Pubkey,
        destination: &Pubkey,
        owner: &Pubkey,
        amount: u64,
    ) -> SdkResult<Instruction> {
        Ok(spl_token::instruction::transfer(
            &self.token_program_id,
            source,
            destination,
            owner,
            &[],
            amount,
        )?)
    }

    pub fn burn(
        &self,
        account: &Pubkey,
        mint: &Pubkey,
        owner: &Pubkey,
        amount: u64,
    ) -> SdkResult<Instruction> {
        Ok(spl_token::instruction::burn(
            &self.token_program_id,
            account,
            mint,
            owner,
            &[],
            amount,
        )?)
    }

    pub fn freeze(
        &self,
        account: &Pubkey,
        mint: &Pubkey,
        freeze_authority: &Pubkey,
    ) -> SdkResult<Instruction> {
        Ok(spl_token::instruction::freeze_account(
            &self.token_program_id,
            account,
            mint,
            freeze_authority,
            &[],
        )?)
    }

    pub fn thaw(
        &self,
        account: &Pubkey,
        mint: &Pubkey,
        freeze_authority: &Pubkey,
    ) -> SdkResult<Instruction> {
        Ok(spl_token::instruction::thaw_account(
            &self.token_program_id,
            account,
            mint,
            freeze_authority,
            &[],
        )?)
    }
}

impl Default for TokenInstructionBuilder {
    fn default() -> Self {
        Self::new(spl_token::id())
    }
}
