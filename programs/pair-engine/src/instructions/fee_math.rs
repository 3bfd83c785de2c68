use crate::{
    constants::*,
    error::{PairError, Result},
    math::{mul_div, mul_div_ceil, to_u128, U256},
    state::{HolderRecord, PoolState},
    types::FeeAmounts,
};

/// How one leg's swap fee is divided.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FeeSplit {
    /// `amount_in × fee_bps / 10000`
    pub total:    u64,
    /// Routed to the fee recipient immediately.
    pub protocol: u64,
    /// Distributed to liquidity providers through the accumulator.
    pub lp:       u64,
}

pub fn split_fee(amount_in: u64, fee_bps: u16, protocol_share_bps: u16) -> FeeSplit {
    let total = amount_in as u128 * fee_bps as u128 / BPS_DENOMINATOR;
    let protocol = total * protocol_share_bps as u128 / BPS_DENOMINATOR;
    // both are at most amount_in
    FeeSplit {
        total:    total as u64,
        protocol: protocol as u64,
        lp:       (total - protocol) as u64,
    }
}

/// `lp_fee × PRECISION / total_shares`; zero when nobody holds shares.
pub fn accumulator_delta(lp_fee: u64, total_shares: u128) -> Result<U256> {
    if total_shares == 0 || lp_fee == 0 {
        return Ok(U256::zero());
    }
    mul_div(U256::from(lp_fee), U256::from(PRECISION), U256::from(total_shares))
}

/// `shares × acc / PRECISION`
pub fn accrued(shares: u128, acc_fee_per_share: U256) -> Result<u128> {
    to_u128(mul_div(U256::from(shares), acc_fee_per_share, U256::from(PRECISION))?)
}

/// [`accrued`] rounded up; the reward debt a balance starts from.
pub fn reward_debt(shares: u128, acc_fee_per_share: U256) -> Result<u128> {
    to_u128(mul_div_ceil(U256::from(shares), acc_fee_per_share, U256::from(PRECISION))?)
}

// ─── Fee accrual ───────────────────────────────────────────────────────────
// Fold one swap's LP fees into the pool. A leg whose delta rounds to zero (or
// a pool with no shares) leaves its fee idle in the reserves instead of
// escrowing something nobody could ever claim.
pub fn accrue_lp_fees(pool: &mut PoolState, lp_fee_a: u64, lp_fee_b: u64) -> Result<()> {
    let delta_a = accumulator_delta(lp_fee_a, pool.total_shares)?;
    if !delta_a.is_zero() {
        pool.acc_fee_per_share_a = pool
            .acc_fee_per_share_a
            .checked_add(delta_a)
            .ok_or(PairError::MathOverflow)?;
        pool.fee_escrow_a = pool
            .fee_escrow_a
            .checked_add(lp_fee_a)
            .ok_or(PairError::MathOverflow)?;
    }
    let delta_b = accumulator_delta(lp_fee_b, pool.total_shares)?;
    if !delta_b.is_zero() {
        pool.acc_fee_per_share_b = pool
            .acc_fee_per_share_b
            .checked_add(delta_b)
            .ok_or(PairError::MathOverflow)?;
        pool.fee_escrow_b = pool
            .fee_escrow_b
            .checked_add(lp_fee_b)
            .ok_or(PairError::MathOverflow)?;
    }
    Ok(())
}

// ─── Holder sync ───────────────────────────────────────────────────────────
// Call `settle` before any change to `record.shares` and
// `reset_reward_debt` right after it; otherwise fees earned by the old
// balance are re-priced against the new one.
//
// Debt is rounded up and accrual down, so a holder is never credited more
// than `shares × Δacc / PRECISION` and the claims of all holders together
// never exceed the escrow. The debt may sit one unit above the accrual until
// the accumulator moves again.

/// Fees earned since the last sync, not counting `fees_owed`.
pub fn pending(record: &HolderRecord, pool: &PoolState) -> Result<FeeAmounts> {
    let pending_a = accrued(record.shares, pool.acc_fee_per_share_a)?
        .saturating_sub(record.reward_debt_a);
    let pending_b = accrued(record.shares, pool.acc_fee_per_share_b)?
        .saturating_sub(record.reward_debt_b);
    Ok(FeeAmounts {
        amount_a: u64::try_from(pending_a).map_err(|_| PairError::MathOverflow)?,
        amount_b: u64::try_from(pending_b).map_err(|_| PairError::MathOverflow)?,
    })
}

/// Pending plus previously settled fees.
pub fn claimable(record: &HolderRecord, pool: &PoolState) -> Result<FeeAmounts> {
    let pending = pending(record, pool)?;
    Ok(FeeAmounts {
        amount_a: pending
            .amount_a
            .checked_add(record.fees_owed_a)
            .ok_or(PairError::MathOverflow)?,
        amount_b: pending
            .amount_b
            .checked_add(record.fees_owed_b)
            .ok_or(PairError::MathOverflow)?,
    })
}

/// Roll pending fees into `fees_owed` and resync the reward debt.
pub fn settle(record: &mut HolderRecord, pool: &PoolState) -> Result<()> {
    let owed = claimable(record, pool)?;
    record.fees_owed_a = owed.amount_a;
    record.fees_owed_b = owed.amount_b;
    reset_reward_debt(record, pool)
}

pub fn reset_reward_debt(record: &mut HolderRecord, pool: &PoolState) -> Result<()> {
    record.reward_debt_a = reward_debt(record.shares, pool.acc_fee_per_share_a)?;
    record.reward_debt_b = reward_debt(record.shares, pool.acc_fee_per_share_b)?;
    Ok(())
}

/// Once the last share is burned nobody can claim what is left in escrow;
/// it becomes ordinary reserve for the next depositor.
pub fn release_orphaned_escrow(pool: &mut PoolState) {
    if pool.total_shares == 0 {
        pool.fee_escrow_a = 0;
        pool.fee_escrow_b = 0;
    }
}

/// Take `fees` out of the escrow when they are paid.
pub fn release_escrow(pool: &mut PoolState, fees: &FeeAmounts) -> Result<()> {
    pool.fee_escrow_a = pool
        .fee_escrow_a
        .checked_sub(fees.amount_a)
        .ok_or(PairError::MathOverflow)?;
    pool.fee_escrow_b = pool
        .fee_escrow_b
        .checked_sub(fees.amount_b)
        .ok_or(PairError::MathOverflow)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::Reserves;
    use solana_sdk::pubkey::Pubkey;

    fn pool(total_shares: u128) -> PoolState {
        PoolState {
            asset_a:             Pubkey::new_unique(),
            asset_b:             Pubkey::new_unique(),
            fee_recipient:       Pubkey::new_unique(),
            reserves:            Reserves { reserve_a: 1_000_000, reserve_b: 1_000_000 },
            total_shares,
            acc_fee_per_share_a: U256::zero(),
            acc_fee_per_share_b: U256::zero(),
            fee_escrow_a:        0,
            fee_escrow_b:        0,
        }
    }

    #[test]
    fn split_rounds_down_and_sums() {
        let split = split_fee(1_000, 25, 2_000);
        assert_eq!(split, FeeSplit { total: 2, protocol: 0, lp: 2 });
        let split = split_fee(1_000_000, 30, 5_000);
        assert_eq!(split, FeeSplit { total: 3_000, protocol: 1_500, lp: 1_500 });
    }

    #[test]
    fn accrual_without_shares_leaves_fee_idle() {
        let mut p = pool(0);
        accrue_lp_fees(&mut p, 500, 500).unwrap();
        assert_eq!(p.fee_escrow_a, 0);
        assert!(p.acc_fee_per_share_a.is_zero());
    }

    #[test]
    fn settle_before_balance_change_keeps_past_fees() {
        let mut p = pool(100);
        let mut holder = HolderRecord { shares: 100, ..Default::default() };
        accrue_lp_fees(&mut p, 50, 0).unwrap();

        // holder doubles its balance; settle first
        settle(&mut holder, &p).unwrap();
        holder.shares = 200;
        p.total_shares = 200;
        reset_reward_debt(&mut holder, &p).unwrap();
        assert_eq!(holder.fees_owed_a, 50);
        assert_eq!(pending(&holder, &p).unwrap().amount_a, 0);

        accrue_lp_fees(&mut p, 40, 0).unwrap();
        assert_eq!(claimable(&holder, &p).unwrap().amount_a, 90);
    }

    #[test]
    fn skipping_settle_would_misprice() {
        let mut p = pool(100);
        let mut holder = HolderRecord { shares: 100, ..Default::default() };
        accrue_lp_fees(&mut p, 50, 0).unwrap();
        holder.shares = 200;
        // without settle the old accrual is re-priced at the new balance
        assert_eq!(pending(&holder, &p).unwrap().amount_a, 100);
    }

    fn join(p: &mut PoolState, record: &mut HolderRecord, shares: u128) {
        settle(record, p).unwrap();
        record.shares += shares;
        p.total_shares += shares;
        reset_reward_debt(record, p).unwrap();
    }

    #[test]
    fn late_joiners_cannot_claim_past_the_escrow() {
        let mut p = pool(0);
        let (mut x, mut y, mut z) =
            (HolderRecord::default(), HolderRecord::default(), HolderRecord::default());
        join(&mut p, &mut x, 2);
        accrue_lp_fees(&mut p, 1, 0).unwrap();
        join(&mut p, &mut y, 1);
        // acc is exactly half a unit per share; debt rounds it up
        assert_eq!(y.reward_debt_a, 1);
        assert!(pending(&y, &p).unwrap().is_zero());
        accrue_lp_fees(&mut p, 1, 0).unwrap();
        join(&mut p, &mut z, 1);
        accrue_lp_fees(&mut p, 1, 0).unwrap();

        assert_eq!(p.fee_escrow_a, 3);
        let owed: Vec<u64> = [x, y, z].iter().map(|r| claimable(r, &p).unwrap().amount_a).collect();
        assert_eq!(owed, vec![2, 0, 0]);
        assert!(owed.iter().sum::<u64>() <= p.fee_escrow_a);
    }

    #[test]
    fn escrow_left_after_the_last_burn_is_released() {
        let mut p = pool(10);
        p.fee_escrow_a = 1;
        release_orphaned_escrow(&mut p);
        assert_eq!(p.fee_escrow_a, 1);

        p.total_shares = 0;
        release_orphaned_escrow(&mut p);
        assert_eq!((p.fee_escrow_a, p.fee_escrow_b), (0, 0));
    }
}
