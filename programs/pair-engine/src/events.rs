//! Records emitted by committed operations, for off-chain indexing.
//!
//! Events are buffered per operation and only published when it commits; a
//! reverted operation emits nothing.

use serde::{Deserialize, Serialize};
use solana_sdk::pubkey::Pubkey;

use crate::confidential::CiphertextHandle;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum PairEvent {
    PairInitialized {
        asset_a:       Pubkey,
        asset_b:       Pubkey,
        fee_recipient: Pubkey,
        reserve_a:     u64,
        reserve_b:     u64,
        seed_shares:   u128,
    },
    LiquidityMinted {
        provider: Pubkey,
        shares:   u128,
        amount_a: u64,
        amount_b: u64,
    },
    LiquidityBurned {
        holder:    Pubkey,
        recipient: Pubkey,
        shares:    u128,
        amount_a:  u64,
        amount_b:  u64,
    },
    /// `asset_in` is the other asset whenever it was paid in, else the
    /// output asset. Input paid in both assets shows up in `second_leg`.
    SwapExecuted {
        asset_in:     Pubkey,
        amount_in:    u64,
        asset_out:    Pubkey,
        amount_out:   u64,
        recipient:    Pubkey,
        protocol_fee: u64,
        lp_fee:       u64,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        second_leg:   Option<InputLeg>,
    },
    FeesClaimed {
        holder:   Pubkey,
        amount_a: u64,
        amount_b: u64,
    },
    Synced {
        reserve_a: u64,
        reserve_b: u64,
    },
    Skimmed {
        recipient: Pubkey,
        amount_a:  u64,
        amount_b:  u64,
    },
    /// Carries only the handle of the updated encrypted total.
    ConfidentialAccumulatorUpdated {
        asset:  Pubkey,
        handle: CiphertextHandle,
    },
}

/// One asset's contribution to a swap and the fee charged on it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct InputLeg {
    pub asset:        Pubkey,
    pub amount:       u64,
    pub protocol_fee: u64,
    pub lp_fee:       u64,
}

impl PairEvent {
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}
