use borsh::BorshDeserialize;

use crate::accounts::{AccountInfo, AccountMap};
use crate::address::Address;
use crate::error::Error;
use crate::protocols::{
    DecodedInstruction, InstructionContext, Program, ProgramDecoder, WRAPPED_SOL_DECIMALS,
    WRAPPED_SOL_MINT, decode_layout, require_accounts,
};
use crate::summary::AssetTransfer;

pub const TRANSFER_DISCRIMINATOR: u8 = 3;
pub const TRANSFER_CHECKED_DISCRIMINATOR: u8 = 12;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenInstructionKind {
    Transfer,
    TransferChecked,
    Other,
}

impl TokenInstructionKind {
    pub fn classify(data: &[u8]) -> Self {
        match data.first() {
            Some(&TRANSFER_DISCRIMINATOR) => Self::Transfer,
            Some(&TRANSFER_CHECKED_DISCRIMINATOR) => Self::TransferChecked,
            _ => Self::Other,
        }
    }
}

/// `u32` discriminator followed by `u64` amount.
#[derive(BorshDeserialize)]
struct TransferLayout {
    _discriminator: u32,
    amount: u64,
}

/// `u8` discriminator, `u64` amount, `u8` decimals.
#[derive(BorshDeserialize)]
struct TransferCheckedLayout {
    _discriminator: u8,
    amount: u64,
    decimals: u8,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenTransfer {
    pub source: Address,
    pub destination: Address,
    pub authority: Address,
    pub amount: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenTransferChecked {
    pub source: Address,
    pub mint: Address,
    pub destination: Address,
    pub authority: Address,
    pub amount: u64,
    pub decimals: u8,
}

/// Accounts: `[source, destination, authority]`.
pub fn decode_transfer(data: &[u8], accounts: &[&AccountInfo]) -> Result<TokenTransfer, Error> {
    let TransferLayout { amount, .. } = decode_layout(data, "token transfer")?;
    require_accounts(accounts, 3)?;

    Ok(TokenTransfer {
        source: accounts[0].address,
        destination: accounts[1].address,
        authority: accounts[2].address,
        amount,
    })
}

/// Accounts: `[source, mint, destination, authority]`.
pub fn decode_transfer_checked(
    data: &[u8],
    accounts: &[&AccountInfo],
) -> Result<TokenTransferChecked, Error> {
    let TransferCheckedLayout {
        amount, decimals, ..
    } = decode_layout(data, "token transfer_checked")?;
    require_accounts(accounts, 4)?;

    Ok(TokenTransferChecked {
        source: accounts[0].address,
        mint: accounts[1].address,
        destination: accounts[2].address,
        authority: accounts[3].address,
        amount,
        decimals,
    })
}

/// Handles both the legacy token program and Token-2022.
#[derive(Debug)]
pub struct TokenDecoder {
    pub program: Program,
}

impl ProgramDecoder for TokenDecoder {
    fn program(&self) -> Program {
        self.program
    }

    fn decode(&self, ctx: &InstructionContext<'_>) -> Result<DecodedInstruction, Error> {
        match TokenInstructionKind::classify(ctx.data) {
            TokenInstructionKind::Transfer => {
                let transfer = decode_transfer(ctx.data, &ctx.accounts)?;
                // The layout carries no mint; assume wrapped SOL.
                Ok(DecodedInstruction::Transfer(with_owners(
                    ctx.account_map,
                    transfer.source,
                    transfer.destination,
                    WRAPPED_SOL_MINT,
                    transfer.amount,
                    WRAPPED_SOL_DECIMALS,
                )))
            }
            TokenInstructionKind::TransferChecked => {
                let transfer = decode_transfer_checked(ctx.data, &ctx.accounts)?;
                Ok(DecodedInstruction::Transfer(with_owners(
                    ctx.account_map,
                    transfer.source,
                    transfer.destination,
                    transfer.mint,
                    transfer.amount,
                    transfer.decimals,
                )))
            }
            TokenInstructionKind::Other => Ok(DecodedInstruction::Handled),
        }
    }
}

fn with_owners(
    account_map: &AccountMap,
    from: Address,
    to: Address,
    asset: Address,
    amount: u64,
    decimals: u8,
) -> AssetTransfer {
    AssetTransfer {
        from,
        from_owner: account_map.owner_of(&from),
        to,
        to_owner: account_map.owner_of(&to),
        asset,
        amount: amount.to_string(),
        decimals: Some(decimals),
    }
}

#[cfg(test)]
#[expect(clippy::unwrap_used, reason = "test assertions")]
mod tests {
    use super::*;
    use crate::accounts::BalanceSnapshots;
    use crate::types::{MessageHeader, TokenBalance, UiTokenAmount};

    fn addr(n: u8) -> Address {
        Address::new_from_array([n; 32])
    }

    fn transfer_data(amount: u64) -> Vec<u8> {
        let mut data = u32::from(TRANSFER_DISCRIMINATOR).to_le_bytes().to_vec();
        data.extend_from_slice(&amount.to_le_bytes());
        data
    }

    fn balance(account_index: u16, owner: Address) -> TokenBalance {
        TokenBalance {
            account_index,
            mint: WRAPPED_SOL_MINT,
            owner: Some(owner),
            program_id: None,
            ui_token_amount: UiTokenAmount {
                amount: "1000".to_string(),
                decimals: WRAPPED_SOL_DECIMALS,
            },
        }
    }

    /// Source 1 owned by wallet 3, destination 2 owned by wallet 9.
    fn account_map() -> AccountMap {
        let balances = [balance(0, addr(3)), balance(1, addr(9))];
        AccountMap::build(
            &[addr(1), addr(2), addr(3)],
            &MessageHeader {
                num_required_signatures: 1,
                num_readonly_signed_accounts: 0,
                num_readonly_unsigned_accounts: 0,
            },
            &BalanceSnapshots {
                pre_token_balances: Some(&balances),
                post_token_balances: Some(&balances),
                pre_balances: &[],
                post_balances: &[],
            },
        )
        .unwrap()
    }

    fn decode_with(
        program: Program,
        data: &[u8],
        account_indices: &[usize],
    ) -> Result<DecodedInstruction, Error> {
        let map = account_map();
        let ctx = InstructionContext {
            index: 0,
            data,
            accounts: account_indices.iter().map(|&i| map.get(i).unwrap()).collect(),
            account_map: &map,
            inner_instructions: &[],
        };
        TokenDecoder { program }.decode(&ctx)
    }

    fn accounts(n: u8) -> Vec<AccountInfo> {
        (0..n)
            .map(|i| AccountInfo::bare(Address::new_from_array([i + 1; 32]), usize::from(i)))
            .collect()
    }

    #[test]
    fn classify_known_discriminators() {
        assert_eq!(
            TokenInstructionKind::classify(&[3, 0, 0, 0]),
            TokenInstructionKind::Transfer
        );
        assert_eq!(
            TokenInstructionKind::classify(&[12]),
            TokenInstructionKind::TransferChecked
        );
        assert_eq!(
            TokenInstructionKind::classify(&[17]),
            TokenInstructionKind::Other
        );
    }

    #[test]
    fn decode_basic_transfer() {
        let infos = accounts(3);
        let refs: Vec<&AccountInfo> = infos.iter().collect();
        let mut data = 3_u32.to_le_bytes().to_vec();
        data.extend_from_slice(&1_998_000_000_u64.to_le_bytes());

        let transfer = decode_transfer(&data, &refs).unwrap();
        assert_eq!(transfer.source, infos[0].address);
        assert_eq!(transfer.destination, infos[1].address);
        assert_eq!(transfer.authority, infos[2].address);
        assert_eq!(transfer.amount, 1_998_000_000);
    }

    #[test]
    fn decode_transfer_checked_reads_mint_and_decimals() {
        let infos = accounts(4);
        let refs: Vec<&AccountInfo> = infos.iter().collect();
        let mut data = vec![12];
        data.extend_from_slice(&498_950_000_u64.to_le_bytes());
        data.push(6);

        let transfer = decode_transfer_checked(&data, &refs).unwrap();
        assert_eq!(
            transfer,
            TokenTransferChecked {
                source: infos[0].address,
                mint: infos[1].address,
                destination: infos[2].address,
                authority: infos[3].address,
                amount: 498_950_000,
                decimals: 6,
            }
        );
    }

    #[test]
    fn transfer_checked_without_decimals_byte_is_a_decode_error() {
        let infos = accounts(4);
        let refs: Vec<&AccountInfo> = infos.iter().collect();
        let mut data = vec![12];
        data.extend_from_slice(&1_u64.to_le_bytes());
        assert!(matches!(
            decode_transfer_checked(&data, &refs),
            Err(Error::Decode { .. })
        ));
    }

    #[test]
    fn transfer_checked_with_three_accounts_is_an_arity_error() {
        let infos = accounts(3);
        let refs: Vec<&AccountInfo> = infos.iter().collect();
        let mut data = vec![12];
        data.extend_from_slice(&1_u64.to_le_bytes());
        data.push(9);
        assert!(matches!(
            decode_transfer_checked(&data, &refs),
            Err(Error::AccountArity {
                expected: 4,
                found: 3
            })
        ));
    }

    #[test]
    fn basic_transfer_is_reported_as_wrapped_sol_for_both_token_programs() {
        for program in [Program::Token, Program::Token2022] {
            let decoded = decode_with(program, &transfer_data(777), &[0, 1, 2]).unwrap();
            assert_eq!(
                decoded,
                DecodedInstruction::Transfer(AssetTransfer {
                    from: addr(1),
                    from_owner: Some(addr(3)),
                    to: addr(2),
                    to_owner: Some(addr(9)),
                    asset: WRAPPED_SOL_MINT,
                    amount: "777".to_string(),
                    decimals: Some(WRAPPED_SOL_DECIMALS),
                })
            );
        }
    }

    #[test]
    fn single_byte_discriminator_transfer_payload_is_a_decode_error() {
        let mut data = vec![TRANSFER_DISCRIMINATOR];
        data.extend_from_slice(&777_u64.to_le_bytes());
        assert_eq!(data.len(), 9);
        assert!(matches!(
            decode_with(Program::Token, &data, &[0, 1, 2]),
            Err(Error::Decode { .. })
        ));
    }

    #[test]
    fn basic_transfer_with_two_accounts_is_an_arity_error() {
        assert!(matches!(
            decode_with(Program::Token2022, &transfer_data(1), &[0, 1]),
            Err(Error::AccountArity {
                expected: 3,
                found: 2
            })
        ));
    }

    #[test]
    fn non_transfer_instruction_is_handled() {
        // close_account
        assert_eq!(
            decode_with(Program::Token, &[9], &[0, 2, 2]).unwrap(),
            DecodedInstruction::Handled
        );
        assert_eq!(
            decode_with(Program::Token2022, &[], &[]).unwrap(),
            DecodedInstruction::Handled
        );
    }
}
