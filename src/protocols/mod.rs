pub mod jupiter;
pub mod system;
pub mod token;

use borsh::BorshDeserialize;

use crate::accounts::{AccountInfo, AccountMap};
use crate::address::Address;
use crate::error::Error;
use crate::protocols::jupiter::JupiterV6Decoder;
use crate::protocols::system::SystemDecoder;
use crate::protocols::token::TokenDecoder;
use crate::summary::{AssetTransfer, Swap};
use crate::types::InnerInstructions;

/// `11111111111111111111111111111111`
pub const SYSTEM_PROGRAM_ID: Address = Address::new_from_array([0; 32]);

/// `TokenkegQfeZyiNwAJbNbGKPFXCWuBvf9Ss623VQ5DA`
pub const TOKEN_PROGRAM_ID: Address = Address::new_from_array([
    6, 221, 246, 225, 215, 101, 161, 147, 217, 203, 225, 70, 206, 235, 121, 172, 28, 180, 133,
    237, 95, 91, 55, 145, 58, 140, 245, 133, 126, 255, 0, 169,
]);

/// `TokenzQdBNbLqP5VEhdkAS6EPFLC1PHnBqCXEpPxuEb`
pub const TOKEN_2022_PROGRAM_ID: Address = Address::new_from_array([
    6, 221, 246, 225, 238, 117, 143, 222, 24, 66, 93, 188, 228, 108, 205, 218, 182, 26, 252, 77,
    131, 185, 13, 39, 254, 189, 249, 40, 216, 161, 139, 252,
]);

/// `JUP6LkbZbjS1jKKwapdHNy74zcZ3tLUZoi5QNyVTaV4`
pub const JUPITER_V6_PROGRAM_ID: Address = Address::new_from_array([
    4, 121, 213, 91, 242, 49, 192, 110, 238, 116, 197, 110, 206, 104, 21, 7, 253, 177, 178, 222,
    163, 244, 142, 81, 2, 177, 205, 162, 86, 188, 19, 143,
]);

/// `So11111111111111111111111111111111111111112`
pub const WRAPPED_SOL_MINT: Address = Address::new_from_array([
    6, 155, 136, 87, 254, 171, 129, 132, 251, 104, 127, 99, 70, 24, 192, 53, 218, 196, 57, 220,
    26, 235, 59, 85, 152, 160, 240, 0, 0, 0, 0, 1,
]);

pub const WRAPPED_SOL_DECIMALS: u8 = 9;

/// Asset reported for native SOL transfers.
pub const NATIVE_ASSET: Address = SYSTEM_PROGRAM_ID;

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, strum_macros::AsRefStr, strum_macros::EnumIter,
)]
#[strum(serialize_all = "snake_case")]
pub enum Program {
    System,
    Token,
    Token2022,
    JupiterV6,
}

impl Program {
    pub fn from_address(address: &Address) -> Option<Self> {
        match *address {
            SYSTEM_PROGRAM_ID => Some(Self::System),
            TOKEN_PROGRAM_ID => Some(Self::Token),
            TOKEN_2022_PROGRAM_ID => Some(Self::Token2022),
            JUPITER_V6_PROGRAM_ID => Some(Self::JupiterV6),
            _ => None,
        }
    }

    pub fn address(self) -> Address {
        match self {
            Self::System => SYSTEM_PROGRAM_ID,
            Self::Token => TOKEN_PROGRAM_ID,
            Self::Token2022 => TOKEN_2022_PROGRAM_ID,
            Self::JupiterV6 => JUPITER_V6_PROGRAM_ID,
        }
    }

    pub fn all_program_ids() -> &'static [Address] {
        &[
            SYSTEM_PROGRAM_ID,
            TOKEN_PROGRAM_ID,
            TOKEN_2022_PROGRAM_ID,
            JUPITER_V6_PROGRAM_ID,
        ]
    }
}

/// One top-level instruction with its accounts already resolved.
pub struct InstructionContext<'a> {
    /// Position among the transaction's top-level instructions.
    pub index: usize,
    pub data: &'a [u8],
    pub accounts: Vec<&'a AccountInfo>,
    pub account_map: &'a AccountMap,
    pub inner_instructions: &'a [InnerInstructions],
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DecodedInstruction {
    Transfer(AssetTransfer),
    Swap(Swap),
    /// Known program, but not an instruction this crate summarizes.
    Handled,
    /// Routed swap that left no usable CPI event.
    Unrecognized,
}

pub trait ProgramDecoder: Sync {
    fn program(&self) -> Program;

    fn decode(&self, ctx: &InstructionContext<'_>) -> Result<DecodedInstruction, Error>;
}

pub fn decoder_for(program: Program) -> &'static dyn ProgramDecoder {
    match program {
        Program::System => &SystemDecoder,
        Program::Token => &TokenDecoder {
            program: Program::Token,
        },
        Program::Token2022 => &TokenDecoder {
            program: Program::Token2022,
        },
        Program::JupiterV6 => &JupiterV6Decoder,
    }
}

/// Deserialize a fixed layout from the start of `data`; trailing bytes are ignored.
pub(crate) fn decode_layout<T: BorshDeserialize>(data: &[u8], layout: &str) -> Result<T, Error> {
    let mut buf = data;
    T::deserialize(&mut buf).map_err(|e| Error::Decode {
        reason: format!("{layout} payload of {} bytes: {e}", data.len()),
    })
}

pub(crate) fn require_accounts(accounts: &[&AccountInfo], expected: usize) -> Result<(), Error> {
    if accounts.len() < expected {
        return Err(Error::AccountArity {
            expected,
            found: accounts.len(),
        });
    }
    Ok(())
}
