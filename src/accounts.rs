use std::collections::HashSet;

use crate::address::Address;
use crate::error::Error;
use crate::types::{
    CompiledInstruction, LoadedAddresses, MessageHeader, TokenBalance, TransactionMeta,
};

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, strum_macros::Display, strum_macros::AsRefStr,
)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum AccountRole {
    Readonly,
    Writable,
    ReadonlySigner,
    WritableSigner,
}

impl AccountRole {
    pub fn is_signer(self) -> bool {
        matches!(self, Self::ReadonlySigner | Self::WritableSigner)
    }

    pub fn is_writable(self) -> bool {
        matches!(self, Self::Writable | Self::WritableSigner)
    }
}

/// Role of the account at `index` in a message with `total_accounts` keys.
///
/// Message layout:
/// `[0, S - RS)` writable signers, `[S - RS, S)` readonly signers,
/// `[S, N - RU)` writable non-signers, `[N - RU, N)` readonly non-signers.
pub fn compute_account_role(
    index: usize,
    header: &MessageHeader,
    total_accounts: usize,
) -> AccountRole {
    let signers = usize::from(header.num_required_signatures);
    let readonly_signed = usize::from(header.num_readonly_signed_accounts);
    let readonly_unsigned = usize::from(header.num_readonly_unsigned_accounts);

    let is_signer = index < signers;
    let is_writable = index < signers.saturating_sub(readonly_signed)
        || (index >= signers && index < total_accounts.saturating_sub(readonly_unsigned));

    match (is_signer, is_writable) {
        (true, true) => AccountRole::WritableSigner,
        (true, false) => AccountRole::ReadonlySigner,
        (false, true) => AccountRole::Writable,
        (false, false) => AccountRole::Readonly,
    }
}

/// Static keys followed by lookup-table keys, writable before readonly.
pub fn message_account_keys(
    static_keys: &[Address],
    loaded: Option<&LoadedAddresses>,
) -> Vec<Address> {
    let mut keys = static_keys.to_vec();
    if let Some(loaded) = loaded {
        keys.extend_from_slice(&loaded.writable);
        keys.extend_from_slice(&loaded.readonly);
    }
    keys
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccountInfo {
    pub address: Address,
    /// Position in the combined account list.
    pub index: usize,
    pub role: AccountRole,
    pub token_accounts_owned: Vec<Address>,
    pub pre_token_balance: Option<TokenBalance>,
    pub post_token_balance: Option<TokenBalance>,
    pub pre_native_balance: Option<u64>,
    pub post_native_balance: Option<u64>,
    appended_owner: bool,
}

impl AccountInfo {
    /// True for wallet owners recovered from token balances rather than
    /// listed in the message.
    pub fn is_appended_owner(&self) -> bool {
        self.appended_owner
    }

    pub fn native_balance_delta(&self) -> Option<i128> {
        Some(i128::from(self.post_native_balance?) - i128::from(self.pre_native_balance?))
    }

    pub fn token_balance_delta(&self) -> Option<i128> {
        let pre = self.pre_token_balance.as_ref()?.raw_amount()?;
        let post = self.post_token_balance.as_ref()?.raw_amount()?;
        Some(i128::from(post) - i128::from(pre))
    }
}

#[cfg(test)]
impl AccountInfo {
    pub(crate) fn bare(address: Address, index: usize) -> Self {
        Self {
            address,
            index,
            role: AccountRole::Writable,
            token_accounts_owned: Vec::new(),
            pre_token_balance: None,
            post_token_balance: None,
            pre_native_balance: None,
            post_native_balance: None,
            appended_owner: false,
        }
    }
}

/// Pre/post balance snapshots taken from transaction metadata.
pub struct BalanceSnapshots<'a> {
    /// `None` when RPC omitted the array entirely.
    pub pre_token_balances: Option<&'a [TokenBalance]>,
    pub post_token_balances: Option<&'a [TokenBalance]>,
    pub pre_balances: &'a [u64],
    pub post_balances: &'a [u64],
}

impl<'a> BalanceSnapshots<'a> {
    pub fn from_meta(meta: &'a TransactionMeta) -> Self {
        Self {
            pre_token_balances: meta.pre_token_balances.as_deref(),
            post_token_balances: meta.post_token_balances.as_deref(),
            pre_balances: &meta.pre_balances,
            post_balances: &meta.post_balances,
        }
    }
}

/// Every account of a transaction, addressed by its position in the
/// combined account list.
#[derive(Debug, Clone)]
pub struct AccountMap {
    accounts: Vec<AccountInfo>,
    message_key_count: usize,
}

impl AccountMap {
    pub fn build(
        message_keys: &[Address],
        header: &MessageHeader,
        balances: &BalanceSnapshots<'_>,
    ) -> Result<Self, Error> {
        let (Some(pre_tokens), Some(post_tokens)) =
            (balances.pre_token_balances, balances.post_token_balances)
        else {
            return Err(Error::MissingBalanceData);
        };

        let message_key_count = message_keys.len();
        let mut combined = message_keys.to_vec();
        let mut seen: HashSet<Address> = message_keys.iter().copied().collect();
        for owner in pre_tokens.iter().chain(post_tokens).filter_map(|b| b.owner) {
            if seen.insert(owner) {
                combined.push(owner);
            }
        }

        let accounts = combined
            .iter()
            .enumerate()
            .map(|(index, &address)| {
                let appended_owner = index >= message_key_count;
                let role = if appended_owner {
                    AccountRole::Readonly
                } else {
                    compute_account_role(index, header, message_key_count)
                };
                let (pre_native_balance, post_native_balance) = if appended_owner {
                    (None, None)
                } else {
                    (
                        balances.pre_balances.get(index).copied(),
                        balances.post_balances.get(index).copied(),
                    )
                };

                AccountInfo {
                    address,
                    index,
                    role,
                    token_accounts_owned: owned_token_accounts(
                        &combined,
                        pre_tokens,
                        post_tokens,
                        address,
                    ),
                    pre_token_balance: first_owned_by(pre_tokens, address),
                    post_token_balance: first_owned_by(post_tokens, address),
                    pre_native_balance,
                    post_native_balance,
                    appended_owner,
                }
            })
            .collect();

        Ok(Self {
            accounts,
            message_key_count,
        })
    }

    /// Account at `index`. Only message keys are addressable by
    /// instructions; appended owners are not.
    pub fn get(&self, index: usize) -> Result<&AccountInfo, Error> {
        if index >= self.message_key_count {
            return Err(Error::IndexOutOfRange {
                index,
                len: self.message_key_count,
            });
        }
        self.accounts.get(index).ok_or(Error::IndexOutOfRange {
            index,
            len: self.accounts.len(),
        })
    }

    pub fn program_address(&self, ix: &CompiledInstruction) -> Result<Address, Error> {
        Ok(self.get(usize::from(ix.program_id_index))?.address)
    }

    pub fn instruction_accounts(
        &self,
        ix: &CompiledInstruction,
    ) -> Result<Vec<&AccountInfo>, Error> {
        ix.accounts
            .iter()
            .map(|&idx| self.get(usize::from(idx)))
            .collect()
    }

    /// Wallet whose token accounts include `token_account`.
    pub fn owner_of(&self, token_account: &Address) -> Option<Address> {
        self.accounts
            .iter()
            .find(|a| a.token_accounts_owned.contains(token_account))
            .map(|a| a.address)
    }

    pub fn find(&self, address: &Address) -> Option<&AccountInfo> {
        self.accounts.iter().find(|a| a.address == *address)
    }

    pub fn iter(&self) -> impl Iterator<Item = &AccountInfo> {
        self.accounts.iter()
    }

    pub fn len(&self) -> usize {
        self.accounts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.accounts.is_empty()
    }

    pub fn message_key_count(&self) -> usize {
        self.message_key_count
    }
}

fn first_owned_by(balances: &[TokenBalance], owner: Address) -> Option<TokenBalance> {
    balances.iter().find(|b| b.owner == Some(owner)).cloned()
}

fn owned_token_accounts(
    combined: &[Address],
    pre: &[TokenBalance],
    post: &[TokenBalance],
    owner: Address,
) -> Vec<Address> {
    let mut owned: Vec<Address> = Vec::new();
    for balance in pre.iter().chain(post) {
        if balance.owner != Some(owner) {
            continue;
        }
        if let Some(&token_account) = combined.get(usize::from(balance.account_index))
            && !owned.contains(&token_account)
        {
            owned.push(token_account);
        }
    }
    owned
}
