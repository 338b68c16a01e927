use serde::Serialize;

use crate::address::Address;

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Serialize,
    strum_macros::Display,
    strum_macros::EnumString,
    strum_macros::AsRefStr,
)]
#[serde(rename_all = "UPPERCASE")]
#[strum(serialize_all = "UPPERCASE")]
pub enum TransactionStatus {
    Confirmed,
    Reverted,
}

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Serialize,
    strum_macros::Display,
    strum_macros::EnumString,
    strum_macros::AsRefStr,
)]
#[serde(rename_all = "UPPERCASE")]
#[strum(serialize_all = "UPPERCASE")]
pub enum TransactionType {
    Transfer,
    Swap,
    Unknown,
}

/// A movement of one asset between two accounts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AssetTransfer {
    pub from: Address,
    /// Wallet owning `from`, when `from` is a token account.
    pub from_owner: Option<Address>,
    pub to: Address,
    pub to_owner: Option<Address>,
    /// Mint, or the system program address for native SOL.
    pub asset: Address,
    /// Base units as a decimal string.
    pub amount: String,
    pub decimals: Option<u8>,
}

/// Economic effect of a routed swap, summed over its legs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RawSwap {
    /// Venue of the last leg; `None` when the event does not name it.
    pub amm: Option<Address>,
    pub input_mint: Address,
    pub input_amount: u64,
    pub output_mint: Address,
    pub output_amount: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Swap {
    #[serde(flatten)]
    pub raw: RawSwap,
    pub user_transfer_authority: Address,
    pub user_source_token_account: Address,
    pub user_destination_token_account: Address,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionSummary {
    pub signature: String,
    pub slot: u64,
    pub status: TransactionStatus,
    #[serde(rename = "type")]
    pub transaction_type: TransactionType,
    pub asset_transfers: Vec<AssetTransfer>,
    pub swaps: Vec<Swap>,
}
