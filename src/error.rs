#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("malformed envelope: {reason}")]
    MalformedEnvelope { reason: String },

    #[error("missing token balances; cannot process transaction")]
    MissingBalanceData,

    #[error("account index {index} out of range for {len} accounts")]
    IndexOutOfRange { index: usize, len: usize },

    #[error("unknown instruction variant for discriminator {discriminator}")]
    UnknownInstructionVariant { discriminator: String },

    #[error("decode error: {reason}")]
    Decode { reason: String },

    #[error("expected at least {expected} accounts, found {found}")]
    AccountArity { expected: usize, found: usize },

    #[error("u64 overflow while summing amounts for mint {mint}")]
    AmountOverflow { mint: String },

    #[error("invalid address: {value}")]
    InvalidAddress { value: String },

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}
