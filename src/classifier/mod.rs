use crate::accounts::{AccountMap, BalanceSnapshots, message_account_keys};
use crate::error::Error;
use crate::protocols::{DecodedInstruction, InstructionContext, Program, decoder_for};
use crate::summary::{TransactionStatus, TransactionSummary, TransactionType};
use crate::types::{EncodedTransaction, TransactionEnvelope, TransactionMeta};

/// Tallies of decoder outcomes over the top-level instructions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TransactionCounters {
    pub transfer_count: usize,
    /// System or token calls that are not transfers.
    pub system_ix_count: usize,
    pub swap_count: usize,
    /// Routed swaps that left no usable event.
    pub unknown_count: usize,
}

impl TransactionCounters {
    pub fn record(&mut self, outcome: &DecodedInstruction) {
        match outcome {
            DecodedInstruction::Transfer(_) => self.transfer_count += 1,
            DecodedInstruction::Swap(_) => self.swap_count += 1,
            DecodedInstruction::Handled => self.system_ix_count += 1,
            DecodedInstruction::Unrecognized => self.unknown_count += 1,
        }
    }

    /// A lone swap wins over everything else; a lone transfer only counts
    /// when no routed swap went unrecognized.
    pub fn derive_type(&self) -> TransactionType {
        if self.swap_count == 1 {
            return TransactionType::Swap;
        }
        if self.transfer_count == 1 && self.unknown_count == 0 {
            return TransactionType::Transfer;
        }
        TransactionType::Unknown
    }
}

pub fn analyze_json(json: &str) -> Result<TransactionSummary, Error> {
    let envelope: TransactionEnvelope = serde_json::from_str(json)?;
    analyze(&envelope)
}

/// Summarize a confirmed transaction.
pub fn analyze(envelope: &TransactionEnvelope) -> Result<TransactionSummary, Error> {
    let (transaction, meta, signature) = unpack(envelope)?;
    let message = &transaction.message;

    let keys = message_account_keys(&message.account_keys, meta.loaded_addresses.as_ref());
    let account_map =
        AccountMap::build(&keys, &message.header, &BalanceSnapshots::from_meta(meta))?;
    let inner_instructions = meta.inner_instructions.as_deref().unwrap_or_default();

    let mut counters = TransactionCounters::default();
    let mut asset_transfers = Vec::new();
    let mut swaps = Vec::new();

    for (index, ix) in message.instructions.iter().enumerate() {
        let program_address = account_map.program_address(ix)?;
        let accounts = account_map.instruction_accounts(ix)?;
        let Some(program) = Program::from_address(&program_address) else {
            tracing::trace!(instruction_index = index, program = %program_address, "skipping");
            continue;
        };

        tracing::debug!(
            instruction_index = index,
            program = program.as_ref(),
            accounts = accounts.len(),
            "dispatching instruction"
        );
        let ctx = InstructionContext {
            index,
            data: &ix.data,
            accounts,
            account_map: &account_map,
            inner_instructions,
        };
        let outcome = decoder_for(program).decode(&ctx)?;
        counters.record(&outcome);
        match outcome {
            DecodedInstruction::Transfer(transfer) => asset_transfers.push(transfer),
            DecodedInstruction::Swap(swap) => swaps.push(swap),
            DecodedInstruction::Handled | DecodedInstruction::Unrecognized => {}
        }
    }

    let status = if meta.err.is_some() {
        TransactionStatus::Reverted
    } else {
        TransactionStatus::Confirmed
    };
    let transaction_type = counters.derive_type();
    tracing::debug!(
        signature = %signature,
        %status,
        %transaction_type,
        transfers = counters.transfer_count,
        swaps = counters.swap_count,
        unknown = counters.unknown_count,
        "classified transaction"
    );

    Ok(TransactionSummary {
        signature: signature.to_string(),
        slot: envelope.slot,
        status,
        transaction_type,
        asset_transfers,
        swaps,
    })
}

fn unpack(
    envelope: &TransactionEnvelope,
) -> Result<(&EncodedTransaction, &TransactionMeta, &str), Error> {
    let transaction = envelope
        .transaction
        .as_ref()
        .ok_or_else(|| malformed("transaction body is missing"))?;
    let meta = envelope
        .meta
        .as_ref()
        .ok_or_else(|| malformed("transaction meta is missing"))?;
    let signature = transaction
        .signatures
        .first()
        .ok_or_else(|| malformed("transaction has no signatures"))?;
    Ok((transaction, meta, signature))
}

fn malformed(reason: &str) -> Error {
    Error::MalformedEnvelope {
        reason: reason.to_string(),
    }
}
