//! Blockchain node access: the RPC gateway, account decoding and the
//! probe transactions used by the simulation checks.

pub mod instructions;
pub mod mint;
pub mod rpc;
pub mod types;

pub use mint::{is_token_program, MintInfo, TOKEN_2022_PROGRAM_ID, TOKEN_PROGRAM_ID};
pub use rpc::{ChainRpc, SolanaRpc};
pub use types::{AccountRecord, HolderBalance, InstructionRecord, TransactionRecord};
