//! SPL mint account decoding.
//!
//! Base mint layout (82 bytes, shared by Token and Token-2022):
//! mint_authority COption<Pubkey> [0..36], supply u64 [36..44],
//! decimals u8 [44], is_initialized bool [45],
//! freeze_authority COption<Pubkey> [46..82].

use crate::error::{Result, SniperError};
use solana_sdk::pubkey::Pubkey;

pub const MINT_LEN: usize = 82;

pub const TOKEN_PROGRAM_ID: Pubkey =
    solana_sdk::pubkey!("TokenkegQfeZyiNwAJbNbGKPFXCWuBvf9Ss623VQ5DA");
pub const TOKEN_2022_PROGRAM_ID: Pubkey =
    solana_sdk::pubkey!("TokenzQdBNbLqP5VEhdkAS6EPFLC1PHnBqCXEpPxuEb");

pub fn is_token_program(program: &Pubkey) -> bool {
    *program == TOKEN_PROGRAM_ID || *program == TOKEN_2022_PROGRAM_ID
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MintInfo {
    pub mint_authority: Option<Pubkey>,
    pub supply: u64,
    pub decimals: u8,
    pub is_initialized: bool,
    pub freeze_authority: Option<Pubkey>,
}

impl MintInfo {
    pub fn unpack(data: &[u8]) -> Result<Self> {
        if data.len() < MINT_LEN {
            return Err(SniperError::MalformedData(format!(
                "mint account is {} bytes, expected at least {MINT_LEN}",
                data.len()
            )));
        }

        let supply = u64::from_le_bytes(
            data[36..44]
                .try_into()
                .map_err(|_| SniperError::MalformedData("invalid supply bytes".into()))?,
        );

        Ok(Self {
            mint_authority: unpack_coption_key(&data[0..36])?,
            supply,
            decimals: data[44],
            is_initialized: data[45] != 0,
            freeze_authority: unpack_coption_key(&data[46..82])?,
        })
    }

    pub fn pack(&self) -> Vec<u8> {
        let mut data = Vec::with_capacity(MINT_LEN);
        pack_coption_key(&mut data, self.mint_authority.as_ref());
        data.extend_from_slice(&self.supply.to_le_bytes());
        data.push(self.decimals);
        data.push(self.is_initialized as u8);
        pack_coption_key(&mut data, self.freeze_authority.as_ref());
        data
    }
}

fn unpack_coption_key(bytes: &[u8]) -> Result<Option<Pubkey>> {
    let (tag, body) = bytes.split_at(4);
    match tag {
        [0, 0, 0, 0] => Ok(None),
        [1, 0, 0, 0] => Pubkey::try_from(body)
            .map(Some)
            .map_err(|_| SniperError::MalformedData("invalid authority key".into())),
        _ => Err(SniperError::MalformedData(format!("invalid COption tag {tag:?}"))),
    }
}

fn pack_coption_key(out: &mut Vec<u8>, key: Option<&Pubkey>) {
    match key {
        Some(key) => {
            out.extend_from_slice(&1u32.to_le_bytes());
            out.extend_from_slice(key.as_ref());
        }
        None => out.extend_from_slice(&[0u8; 36]),
    }
}
