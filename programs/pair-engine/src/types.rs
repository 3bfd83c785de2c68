//! Parameters and receipts of the public operations.

use serde::{Deserialize, Serialize};
use solana_sdk::pubkey::Pubkey;

/// Arguments of the one-time `initialize` call made by the factory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct InitializeParams {
    pub asset_a:          Pubkey,
    pub asset_b:          Pubkey,
    pub fee_recipient:    Pubkey,
    /// Amounts the factory already delivered into the pair's custody.
    pub initial_amount_a: u64,
    pub initial_amount_b: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct InitializeReceipt {
    pub reserve_a:   u64,
    pub reserve_b:   u64,
    /// Shares minted to the fee recipient for the seed deposit (0 for an empty pair).
    pub seed_shares: u128,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MintReceipt {
    pub shares:   u128,
    /// Observed amounts delivered, not declared ones.
    pub amount_a: u64,
    pub amount_b: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BurnReceipt {
    pub shares:   u128,
    pub amount_a: u64,
    pub amount_b: u64,
    /// Fees settled and paid alongside the withdrawal.
    pub fees_a:   u64,
    pub fees_b:   u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SwapReceipt {
    pub amount_a_in:    u64,
    pub amount_b_in:    u64,
    pub amount_a_out:   u64,
    pub amount_b_out:   u64,
    pub protocol_fee_a: u64,
    pub protocol_fee_b: u64,
    pub lp_fee_a:       u64,
    pub lp_fee_b:       u64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeeAmounts {
    pub amount_a: u64,
    pub amount_b: u64,
}

impl FeeAmounts {
    pub fn is_zero(&self) -> bool {
        self.amount_a == 0 && self.amount_b == 0
    }
}
