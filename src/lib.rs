#![cfg_attr(
    not(test),
    deny(
        clippy::unwrap_used,
        clippy::expect_used,
        clippy::dbg_macro,
        clippy::print_stdout,
        clippy::print_stderr,
        clippy::panic,
    )
)]

pub mod accounts;
pub mod address;
pub mod classifier;
pub mod error;
pub mod protocols;
pub mod summary;
pub mod types;

#[cfg(feature = "wasm")]
pub mod wasm;

pub use accounts::{AccountInfo, AccountMap, AccountRole, BalanceSnapshots, compute_account_role};
pub use address::Address;
pub use classifier::{TransactionCounters, analyze, analyze_json};
pub use error::Error;
pub use protocols::{DecodedInstruction, Program, ProgramDecoder, decoder_for};
pub use summary::{
    AssetTransfer, RawSwap, Swap, TransactionStatus, TransactionSummary, TransactionType,
};
pub use types::TransactionEnvelope;
