pub mod events;

use crate::accounts::AccountMap;
use crate::address::Address;
use crate::error::Error;
use crate::protocols::jupiter::events::{SwapEventKind, aggregate_legs, decode_legs};
use crate::protocols::{
    DecodedInstruction, InstructionContext, JUPITER_V6_PROGRAM_ID, Program, ProgramDecoder,
};
use crate::summary::{RawSwap, Swap};
use crate::types::CompiledInstruction;

/// `global:route`
pub const ROUTE_DISCRIMINATOR: [u8; 8] = [0xe5, 0x17, 0xcb, 0x97, 0x7a, 0xe3, 0xad, 0x2a];
/// `global:route_v2`
pub const ROUTE_V2_DISCRIMINATOR: [u8; 8] = [0xbb, 0x64, 0xfa, 0xcc, 0x31, 0xc4, 0xaf, 0x14];
/// `global:shared_accounts_route`
pub const SHARED_ACCOUNTS_ROUTE_DISCRIMINATOR: [u8; 8] =
    [0xc1, 0x20, 0x9b, 0x33, 0x41, 0xd6, 0x9c, 0x81];
/// `global:shared_accounts_route_v2`
pub const SHARED_ACCOUNTS_ROUTE_V2_DISCRIMINATOR: [u8; 8] =
    [0xd1, 0x98, 0x53, 0x93, 0x7c, 0xfe, 0xd8, 0xe9];

/// Fewer accounts than this cannot be a routed swap.
pub const MIN_ROUTE_ACCOUNTS: usize = 4;

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, strum_macros::AsRefStr, strum_macros::EnumIter,
)]
#[strum(serialize_all = "snake_case")]
pub enum RouteVariant {
    Route,
    RouteV2,
    SharedAccountsRoute,
    SharedAccountsRouteV2,
}

/// Positions of the user accounts in a route instruction's account list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RouteAccountOffsets {
    pub user_transfer_authority: usize,
    pub user_source_token_account: usize,
    pub user_destination_token_account: usize,
}

impl RouteVariant {
    pub fn from_discriminator(discriminator: [u8; 8]) -> Option<Self> {
        match discriminator {
            ROUTE_DISCRIMINATOR => Some(Self::Route),
            ROUTE_V2_DISCRIMINATOR => Some(Self::RouteV2),
            SHARED_ACCOUNTS_ROUTE_DISCRIMINATOR => Some(Self::SharedAccountsRoute),
            SHARED_ACCOUNTS_ROUTE_V2_DISCRIMINATOR => Some(Self::SharedAccountsRouteV2),
            _ => None,
        }
    }

    /// Variant named by the first 8 bytes of an instruction payload.
    pub fn classify(data: &[u8]) -> Result<Self, Error> {
        data.get(..8)
            .and_then(|prefix| <[u8; 8]>::try_from(prefix).ok())
            .and_then(Self::from_discriminator)
            .ok_or_else(|| Error::UnknownInstructionVariant {
                discriminator: hex::encode(data.get(..8).unwrap_or(data)),
            })
    }

    pub fn discriminator(self) -> [u8; 8] {
        match self {
            Self::Route => ROUTE_DISCRIMINATOR,
            Self::RouteV2 => ROUTE_V2_DISCRIMINATOR,
            Self::SharedAccountsRoute => SHARED_ACCOUNTS_ROUTE_DISCRIMINATOR,
            Self::SharedAccountsRouteV2 => SHARED_ACCOUNTS_ROUTE_V2_DISCRIMINATOR,
        }
    }

    pub fn account_offsets(self) -> RouteAccountOffsets {
        let (user_transfer_authority, user_source_token_account, user_destination_token_account) =
            match self {
                Self::Route => (1, 2, 3),
                Self::RouteV2 => (0, 1, 2),
                Self::SharedAccountsRoute => (2, 3, 6),
                Self::SharedAccountsRouteV2 => (1, 2, 5),
            };
        RouteAccountOffsets {
            user_transfer_authority,
            user_source_token_account,
            user_destination_token_account,
        }
    }
}

/// Rebuild the swap performed by a top-level Jupiter v6 instruction from the
/// events it emitted.
///
/// `Ok(None)` means there is nothing usable to report: too few accounts, no
/// CPI group for the instruction, or no swap event in it. An instruction that
/// did emit swap events but whose discriminator names no known route layout is
/// an error.
pub fn decode_route(ctx: &InstructionContext<'_>) -> Result<Option<Swap>, Error> {
    if ctx.accounts.len() < MIN_ROUTE_ACCOUNTS {
        tracing::warn!(
            instruction_index = ctx.index,
            accounts = ctx.accounts.len(),
            "not enough accounts involved to be a Jupiter swap"
        );
        return Ok(None);
    }

    let Some(group) = ctx
        .inner_instructions
        .iter()
        .find(|group| usize::from(group.index) == ctx.index)
    else {
        tracing::warn!(
            instruction_index = ctx.index,
            "no CPI event found for Jupiter instruction"
        );
        return Ok(None);
    };

    let legs = collect_legs(ctx.account_map, &group.instructions)?;
    let Some(raw) = aggregate_legs(&legs)? else {
        tracing::warn!(
            instruction_index = ctx.index,
            "no usable Jupiter swap event in CPI log"
        );
        return Ok(None);
    };

    let variant = RouteVariant::classify(ctx.data)?;
    let offsets = variant.account_offsets();

    let swap = Swap {
        raw,
        user_transfer_authority: account_at(ctx, offsets.user_transfer_authority)?,
        user_source_token_account: account_at(ctx, offsets.user_source_token_account)?,
        user_destination_token_account: account_at(ctx, offsets.user_destination_token_account)?,
    };
    tracing::debug!(
        instruction_index = ctx.index,
        variant = variant.as_ref(),
        legs = legs.len(),
        "decoded Jupiter swap"
    );
    Ok(Some(swap))
}

/// Swap legs from the router's self-CPI events, in log order.
fn collect_legs(
    account_map: &AccountMap,
    instructions: &[CompiledInstruction],
) -> Result<Vec<RawSwap>, Error> {
    let mut legs = Vec::new();
    for ix in instructions {
        if account_map.program_address(ix)? != JUPITER_V6_PROGRAM_ID {
            continue;
        }
        let Some(kind) = SwapEventKind::classify(&ix.data) else {
            continue;
        };
        let decoded = decode_legs(kind, &ix.data)?;
        tracing::trace!(event = kind.as_ref(), legs = decoded.len(), "Jupiter swap event");
        legs.extend(decoded);
    }
    Ok(legs)
}

fn account_at(ctx: &InstructionContext<'_>, offset: usize) -> Result<Address, Error> {
    ctx.accounts
        .get(offset)
        .map(|account| account.address)
        .ok_or(Error::AccountArity {
            expected: offset + 1,
            found: ctx.accounts.len(),
        })
}

#[derive(Debug)]
pub struct JupiterV6Decoder;

impl ProgramDecoder for JupiterV6Decoder {
    fn program(&self) -> Program {
        Program::JupiterV6
    }

    fn decode(&self, ctx: &InstructionContext<'_>) -> Result<DecodedInstruction, Error> {
        Ok(match decode_route(ctx)? {
            Some(swap) => DecodedInstruction::Swap(swap),
            None => DecodedInstruction::Unrecognized,
        })
    }
}
