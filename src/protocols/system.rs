use borsh::BorshDeserialize;

use crate::accounts::AccountInfo;
use crate::address::Address;
use crate::error::Error;
use crate::protocols::{
    DecodedInstruction, InstructionContext, NATIVE_ASSET, Program, ProgramDecoder,
    decode_layout, require_accounts,
};
use crate::summary::AssetTransfer;

pub const TRANSFER_DISCRIMINATOR: u8 = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SystemInstructionKind {
    Transfer,
    Other,
}

impl SystemInstructionKind {
    pub fn classify(data: &[u8]) -> Self {
        match data.first() {
            Some(&TRANSFER_DISCRIMINATOR) => Self::Transfer,
            _ => Self::Other,
        }
    }
}

/// `u32` discriminator followed by `u64` lamports.
#[derive(BorshDeserialize)]
struct TransferLayout {
    _discriminator: u32,
    lamports: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NativeTransfer {
    pub source: Address,
    pub destination: Address,
    pub lamports: u64,
}

/// Accounts: `[source, destination]`.
pub fn decode_transfer(data: &[u8], accounts: &[&AccountInfo]) -> Result<NativeTransfer, Error> {
    let TransferLayout { lamports, .. } = decode_layout(data, "system transfer")?;
    require_accounts(accounts, 2)?;

    Ok(NativeTransfer {
        source: accounts[0].address,
        destination: accounts[1].address,
        lamports,
    })
}

#[derive(Debug)]
pub struct SystemDecoder;

impl ProgramDecoder for SystemDecoder {
    fn program(&self) -> Program {
        Program::System
    }

    fn decode(&self, ctx: &InstructionContext<'_>) -> Result<DecodedInstruction, Error> {
        match SystemInstructionKind::classify(ctx.data) {
            SystemInstructionKind::Transfer => {
                let transfer = decode_transfer(ctx.data, &ctx.accounts)?;
                Ok(DecodedInstruction::Transfer(AssetTransfer {
                    from: transfer.source,
                    from_owner: None,
                    to: transfer.destination,
                    to_owner: None,
                    asset: NATIVE_ASSET,
                    amount: transfer.lamports.to_string(),
                    decimals: None,
                }))
            }
            SystemInstructionKind::Other => Ok(DecodedInstruction::Handled),
        }
    }
}
