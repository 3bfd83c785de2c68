//! Invariant engine: pure quote, mint and burn arithmetic.
//!
//! Every intermediate product is carried in [`U256`] (at least twice the
//! width of any operand) and every division truncates toward zero, so
//! rounding always favours the pool.

use crate::constants::BPS_DENOMINATOR;
use crate::error::{PairError, Result};

pub use wide::U256;

// The expansion names `Result<T, E>`, so it must not see the crate alias.
mod wide {
    uint::construct_uint! {
        /// 256-bit unsigned integer for overflow-free intermediates.
        pub struct U256(4);
    }
}

// ─── Conversions ──────────────────────────────────────────────────────────────

pub fn to_u64(x: U256) -> Result<u64> {
    if x.bits() > 64 {
        return Err(PairError::MathOverflow);
    }
    Ok(x.low_u64())
}

pub fn to_u128(x: U256) -> Result<u128> {
    if x.bits() > 128 {
        return Err(PairError::MathOverflow);
    }
    Ok(x.low_u128())
}

/// `a * b / d`, truncating. Fails on overflow or a zero divisor.
pub fn mul_div(a: U256, b: U256, d: U256) -> Result<U256> {
    if d.is_zero() {
        return Err(PairError::MathOverflow);
    }
    Ok(a.checked_mul(b).ok_or(PairError::MathOverflow)? / d)
}

/// `a * b / d`, rounded up.
pub fn mul_div_ceil(a: U256, b: U256, d: U256) -> Result<U256> {
    if d.is_zero() {
        return Err(PairError::MathOverflow);
    }
    let product = a.checked_mul(b).ok_or(PairError::MathOverflow)?;
    let (quotient, remainder) = product.div_mod(d);
    if remainder.is_zero() {
        Ok(quotient)
    } else {
        quotient.checked_add(U256::one()).ok_or(PairError::MathOverflow)
    }
}

fn fee_multiplier(fee_bps: u16) -> Result<U256> {
    BPS_DENOMINATOR
        .checked_sub(fee_bps as u128)
        .filter(|m| *m > 0)
        .map(U256::from)
        .ok_or(PairError::MathOverflow)
}

// ─── Quotes ───────────────────────────────────────────────────────────────────

/// Constant-product output for an exact input:
/// `out = in·(10000−fee)·reserve_out / (reserve_in·10000 + in·(10000−fee))`.
pub fn quote_out(amount_in: u64, reserve_in: u64, reserve_out: u64, fee_bps: u16) -> Result<u64> {
    if amount_in == 0 {
        return Err(PairError::InsufficientInput);
    }
    if reserve_in == 0 || reserve_out == 0 {
        return Err(PairError::InsufficientLiquidity);
    }
    let in_with_fee = U256::from(amount_in) * fee_multiplier(fee_bps)?;
    let numerator = in_with_fee * U256::from(reserve_out);
    let denominator = U256::from(reserve_in) * U256::from(BPS_DENOMINATOR) + in_with_fee;
    to_u64(numerator / denominator)
}

/// Minimum input that buys `amount_out`; the inverse of [`quote_out`] rounded up.
pub fn quote_in(amount_out: u64, reserve_in: u64, reserve_out: u64, fee_bps: u16) -> Result<u64> {
    if amount_out == 0 {
        return Err(PairError::NoOutput);
    }
    if reserve_in == 0 || amount_out >= reserve_out {
        return Err(PairError::InsufficientLiquidity);
    }
    let numerator =
        U256::from(reserve_in) * U256::from(amount_out) * U256::from(BPS_DENOMINATOR);
    let denominator = U256::from(reserve_out - amount_out) * fee_multiplier(fee_bps)?;
    to_u64(numerator / denominator + U256::one())
}

// ─── Invariant ────────────────────────────────────────────────────────────────

/// Post-swap check on fee-adjusted balances:
/// `(bal_a·10000 − in_a·fee)·(bal_b·10000 − in_b·fee) ≥ r_a·r_b·10000²`.
///
/// `balance_*` are the pair's balances after the optimistic release.
pub fn invariant_holds(
    balance_a: u64,
    balance_b: u64,
    amount_a_in: u64,
    amount_b_in: u64,
    reserve_a: u64,
    reserve_b: u64,
    fee_bps: u16,
) -> Result<bool> {
    let bps = U256::from(BPS_DENOMINATOR);
    let fee = U256::from(fee_bps);
    let adjusted = |balance: u64, amount_in: u64| -> Result<U256> {
        (U256::from(balance) * bps)
            .checked_sub(U256::from(amount_in) * fee)
            .ok_or(PairError::InvariantViolated)
    };
    let lhs = adjusted(balance_a, amount_a_in)? * adjusted(balance_b, amount_b_in)?;
    let rhs = U256::from(reserve_a) * U256::from(reserve_b) * bps * bps;
    Ok(lhs >= rhs)
}

// ─── Liquidity shares ─────────────────────────────────────────────────────────

/// Shares for the very first deposit: `amount_a × amount_b` defines the unit.
/// Two `u64` factors always fit a `u128`.
pub fn initial_shares(amount_a: u64, amount_b: u64) -> u128 {
    amount_a as u128 * amount_b as u128
}

/// Shares for a later deposit, proportional to the smaller contribution ratio.
pub fn proportional_shares(
    amount_a: u64,
    amount_b: u64,
    reserve_a: u64,
    reserve_b: u64,
    total_shares: u128,
) -> Result<u128> {
    if reserve_a == 0 || reserve_b == 0 {
        return Err(PairError::InsufficientLiquidity);
    }
    let total = U256::from(total_shares);
    let by_a = mul_div(U256::from(amount_a), total, U256::from(reserve_a))?;
    let by_b = mul_div(U256::from(amount_b), total, U256::from(reserve_b))?;
    to_u128(by_a.min(by_b))
}

/// Proportional payout for burning `shares` out of `total_shares`.
pub fn burn_payout(shares: u128, reserve: u64, total_shares: u128) -> Result<u64> {
    if total_shares == 0 {
        return Err(PairError::InsufficientLiquidity);
    }
    to_u64(mul_div(U256::from(shares), U256::from(reserve), U256::from(total_shares))?)
}
