//! Probe transactions used by the simulation checks.
//!
//! These are built unsigned; the node simulates them with signature
//! verification off and a fresh blockhash, so no key material is needed.

use solana_sdk::instruction::{AccountMeta, Instruction};
use solana_sdk::message::Message;
use solana_sdk::pubkey::Pubkey;
use solana_sdk::transaction::Transaction;
use solana_sdk::{system_instruction, system_program};

pub const ASSOCIATED_TOKEN_PROGRAM_ID: Pubkey =
    solana_sdk::pubkey!("ATokenGPvbdGVxr1b2hvZbsiqW5xWH25efTNsLJA8knL");

/// Discriminator of `CreateIdempotent` in the associated token program.
const CREATE_IDEMPOTENT: u8 = 1;

pub fn associated_token_address(wallet: &Pubkey, mint: &Pubkey, token_program: &Pubkey) -> Pubkey {
    Pubkey::find_program_address(
        &[wallet.as_ref(), token_program.as_ref(), mint.as_ref()],
        &ASSOCIATED_TOKEN_PROGRAM_ID,
    )
    .0
}

/// One-lamport transfer from the wallet to itself.
pub fn self_transfer(wallet: &Pubkey) -> Transaction {
    let instruction = system_instruction::transfer(wallet, wallet, 1);
    Transaction::new_unsigned(Message::new(&[instruction], Some(wallet)))
}

/// Open (or confirm) the wallet's associated account for `mint`.
pub fn create_token_account(wallet: &Pubkey, mint: &Pubkey, token_program: &Pubkey) -> Transaction {
    let ata = associated_token_address(wallet, mint, token_program);
    let instruction = Instruction {
        program_id: ASSOCIATED_TOKEN_PROGRAM_ID,
        accounts: vec![
            AccountMeta::new(*wallet, true),
            AccountMeta::new(ata, false),
            AccountMeta::new_readonly(*wallet, false),
            AccountMeta::new_readonly(*mint, false),
            AccountMeta::new_readonly(system_program::id(), false),
            AccountMeta::new_readonly(*token_program, false),
        ],
        data: vec![CREATE_IDEMPOTENT],
    };
    Transaction::new_unsigned(Message::new(&[instruction], Some(wallet)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chain::mint::TOKEN_PROGRAM_ID;

    #[test]
    fn test_self_transfer_has_wallet_as_payer() {
        let wallet = Pubkey::new_unique();
        let tx = self_transfer(&wallet);

        assert_eq!(tx.message.account_keys[0], wallet);
        assert_eq!(tx.signatures.len(), 1);
    }

    #[test]
    fn test_token_account_address_is_deterministic() {
        let wallet = Pubkey::new_unique();
        let mint = Pubkey::new_unique();

        let a = associated_token_address(&wallet, &mint, &TOKEN_PROGRAM_ID);
        let b = associated_token_address(&wallet, &mint, &TOKEN_PROGRAM_ID);
        assert_eq!(a, b);
        assert!(!a.is_on_curve());

        let tx = create_token_account(&wallet, &mint, &TOKEN_PROGRAM_ID);
        assert!(tx.message.account_keys.contains(&a));
    }
}
