//! Domain views of RPC responses.

use solana_sdk::account::Account;
use solana_sdk::pubkey::Pubkey;

/// One top-level instruction of a fetched transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstructionRecord {
    /// Base58 program id as reported by the node
    pub program_id: String,
    /// Base58 account addresses in instruction order
    pub accounts: Vec<String>,
}

/// A fetched transaction, reduced to what the resolver needs.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TransactionRecord {
    pub signature: String,
    pub instructions: Vec<InstructionRecord>,
}

impl TransactionRecord {
    /// First top-level instruction addressed to `program_id`.
    pub fn find_instruction(&self, program_id: &Pubkey) -> Option<&InstructionRecord> {
        let program_id = program_id.to_string();
        self.instructions
            .iter()
            .find(|ix| ix.program_id == program_id)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccountRecord {
    pub owner: Pubkey,
    pub lamports: u64,
    pub data: Vec<u8>,
}

impl From<Account> for AccountRecord {
    fn from(account: Account) -> Self {
        Self {
            owner: account.owner,
            lamports: account.lamports,
            data: account.data,
        }
    }
}

/// A token account among the largest holders of a mint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HolderBalance {
    pub address: String,
    /// Raw amount in base units
    pub amount: u64,
}
