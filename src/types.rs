use serde::Deserialize;

use crate::address::Address;

/// A confirmed transaction as returned by RPC `getTransaction`
/// with `encoding: "json"` and `maxSupportedTransactionVersion: 0`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionEnvelope {
    /// Slot in which the transaction landed.
    pub slot: u64,
    #[serde(default)]
    pub block_time: Option<i64>,
    /// Signed transaction body. RPC may omit it for pruned slots.
    pub transaction: Option<EncodedTransaction>,
    /// Execution metadata (balances, CPI log, status).
    pub meta: Option<TransactionMeta>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EncodedTransaction {
    /// Base58 signatures; the first one identifies the transaction.
    pub signatures: Vec<String>,
    pub message: Message,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    pub header: MessageHeader,
    /// Statically listed account keys.
    pub account_keys: Vec<Address>,
    pub instructions: Vec<CompiledInstruction>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageHeader {
    pub num_required_signatures: u8,
    pub num_readonly_signed_accounts: u8,
    pub num_readonly_unsigned_accounts: u8,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompiledInstruction {
    /// Index of the invoked program in the combined account list.
    pub program_id_index: u16,
    /// Indices of the instruction's accounts in the combined account list.
    pub accounts: Vec<u16>,
    /// Raw payload; base58 on the wire.
    #[serde(deserialize_with = "base58_bytes")]
    pub data: Vec<u8>,
    #[serde(default)]
    pub stack_height: Option<u32>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionMeta {
    /// Present when the transaction failed on chain.
    #[serde(default)]
    pub err: Option<serde_json::Value>,
    pub pre_balances: Vec<u64>,
    pub post_balances: Vec<u64>,
    #[serde(default)]
    pub inner_instructions: Option<Vec<InnerInstructions>>,
    #[serde(default)]
    pub pre_token_balances: Option<Vec<TokenBalance>>,
    #[serde(default)]
    pub post_token_balances: Option<Vec<TokenBalance>>,
    /// Address-lookup-table keys for v0 messages.
    #[serde(default)]
    pub loaded_addresses: Option<LoadedAddresses>,
}

/// CPIs recorded while executing the top-level instruction at `index`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InnerInstructions {
    pub index: u16,
    pub instructions: Vec<CompiledInstruction>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoadedAddresses {
    pub writable: Vec<Address>,
    pub readonly: Vec<Address>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenBalance {
    /// Index of the token account in the combined account list.
    pub account_index: u16,
    pub mint: Address,
    /// Wallet owning the token account.
    #[serde(default)]
    pub owner: Option<Address>,
    #[serde(default)]
    pub program_id: Option<Address>,
    pub ui_token_amount: UiTokenAmount,
}

impl TokenBalance {
    /// Raw integer amount, if the RPC string parses.
    pub fn raw_amount(&self) -> Option<u64> {
        self.ui_token_amount.amount.parse().ok()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UiTokenAmount {
    /// Amount in base units, as a decimal string.
    pub amount: String,
    pub decimals: u8,
}

fn base58_bytes<'de, D>(deserializer: D) -> Result<Vec<u8>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let encoded = String::deserialize(deserializer)?;
    bs58::decode(&encoded)
        .into_vec()
        .map_err(|e| serde::de::Error::custom(format!("invalid base58 instruction data: {e}")))
}
