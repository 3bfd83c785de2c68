use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use solana_sdk::pubkey::Pubkey;

use crate::config::PairConfig;
use crate::math::U256;

// ─── Reserves ─────────────────────────────────────────────────────────────────
// The engine's record of what it custodies. Equals the observed custodied
// balances after every completed operation; includes escrowed LP fees.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reserves {
    pub reserve_a: u64,
    pub reserve_b: u64,
}

// ─── Pool ─────────────────────────────────────────────────────────────────────
// Scalar pair state. Copied out at the start of an operation and written back
// once, after every check has passed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoolState {
    pub asset_a:       Pubkey,
    pub asset_b:       Pubkey,
    /// Receives the protocol cut of every swap fee and the seed shares.
    pub fee_recipient: Pubkey,
    pub reserves:      Reserves,
    /// Total liquidity shares outstanding
    pub total_shares:  u128,
    /// Cumulative LP fee per share, scaled by `PRECISION`
    #[serde(with = "u256_dec")]
    pub acc_fee_per_share_a: U256,
    #[serde(with = "u256_dec")]
    pub acc_fee_per_share_b: U256,
    /// LP fees inside the reserves that are owed to holders and not yet paid
    pub fee_escrow_a:  u64,
    pub fee_escrow_b:  u64,
}

impl PoolState {
    /// Reserve minus escrowed fees: what withdrawals and swaps may draw on.
    pub fn distributable(&self) -> (u64, u64) {
        (
            self.reserves.reserve_a.saturating_sub(self.fee_escrow_a),
            self.reserves.reserve_b.saturating_sub(self.fee_escrow_b),
        )
    }

    pub fn is_tracked(&self, asset: &Pubkey) -> bool {
        *asset == self.asset_a || *asset == self.asset_b
    }
}

// ─── Holder ───────────────────────────────────────────────────────────────────
// One liquidity provider's record. Persists with zero shares after a full
// withdrawal.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HolderRecord {
    pub shares:        u128,
    /// `shares × acc_fee_per_share / PRECISION` at last sync
    pub reward_debt_a: u128,
    pub reward_debt_b: u128,
    /// Fees settled on a balance change but not yet paid out
    pub fees_owed_a:   u64,
    pub fees_owed_b:   u64,
}

// ─── Pair ─────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PairState {
    pub pool:    PoolState,
    pub holders: HashMap<Pubkey, HolderRecord>,
}

impl PairState {
    pub fn new(pool: PoolState) -> Self {
        Self { pool, holders: HashMap::new() }
    }

    pub fn holder(&self, owner: &Pubkey) -> HolderRecord {
        self.holders.get(owner).copied().unwrap_or_default()
    }
}

/// Serializable image of a whole pair, for persistence and inspection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PairSnapshot {
    pub address: Pubkey,
    pub config:  PairConfig,
    pub pool:    Option<PoolState>,
    /// Sorted by owner.
    pub holders: Vec<(Pubkey, HolderRecord)>,
}

impl PairSnapshot {
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }
}

/// `U256` as a decimal string.
mod u256_dec {
    use serde::{de::Error, Deserialize, Deserializer, Serializer};

    use crate::math::U256;

    pub fn serialize<S: Serializer>(value: &U256, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&value.to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<U256, D::Error> {
        let raw = String::deserialize(deserializer)?;
        U256::from_dec_str(&raw).map_err(|e| D::Error::custom(format!("{raw}: {e:?}")))
    }
}
