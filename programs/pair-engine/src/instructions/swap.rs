use solana_sdk::pubkey::Pubkey;
use tracing::info;

use super::{check_recipient, fee_math, Context};
use crate::{
    custody::AssetLedger,
    error::{PairError, Result},
    events::{InputLeg, PairEvent},
    math::invariant_holds,
    state::Reserves,
    types::SwapReceipt,
};

/// Constant-product swap settled by balance difference.
///
/// Flow:
///   1. validate direction, recipient and distributable reserve
///   2. release the requested output to `to` (optimistic)
///   3. observe both balances; amount-in = balance − (reserve − out)
///   4. check the fee-adjusted invariant against the pre-swap reserves
///   5. route the protocol cut to the fee recipient, escrow the LP cut
///   6. commit reserves = observed balances
///
/// Whatever was paid in is what counts; a caller-declared amount-in does not
/// exist. The router delivers input before calling.
pub(crate) fn handler<L: AssetLedger>(
    ctx: &mut Context<'_, L>,
    amount_a_out: u64,
    amount_b_out: u64,
    to: Pubkey,
) -> Result<SwapReceipt> {
    match (amount_a_out, amount_b_out) {
        (0, 0) => return Err(PairError::NoOutput),
        (a, b) if a > 0 && b > 0 => return Err(PairError::AmbiguousDirection),
        _ => {}
    }
    let mut pool = ctx.pool()?;
    check_recipient(&ctx.pair, &pool, &to)?;

    let Reserves { reserve_a, reserve_b } = pool.reserves;
    let (available_a, available_b) = pool.distributable();
    if amount_a_out > available_a || amount_b_out > available_b {
        return Err(PairError::InsufficientReserve);
    }

    // ── Optimistic release ───────────────────────────────────────────────────
    ctx.pay(&pool.asset_a, &to, amount_a_out)?;
    ctx.pay(&pool.asset_b, &to, amount_b_out)?;

    // ── Balance-difference amount-in ─────────────────────────────────────────
    let (balance_a, balance_b) = ctx.observe(&pool)?;
    let amount_a_in = balance_a.saturating_sub(reserve_a - amount_a_out);
    let amount_b_in = balance_b.saturating_sub(reserve_b - amount_b_out);
    if amount_a_in == 0 && amount_b_in == 0 {
        return Err(PairError::InsufficientInput);
    }

    let fee_bps = ctx.config.fee_bps;
    if !invariant_holds(
        balance_a,
        balance_b,
        amount_a_in,
        amount_b_in,
        reserve_a,
        reserve_b,
        fee_bps,
    )? {
        return Err(PairError::InvariantViolated);
    }

    // ── Fee split ────────────────────────────────────────────────────────────
    let share_bps = ctx.config.protocol_fee_share_bps;
    let fee_a = fee_math::split_fee(amount_a_in, fee_bps, share_bps);
    let fee_b = fee_math::split_fee(amount_b_in, fee_bps, share_bps);
    ctx.pay(&pool.asset_a, &pool.fee_recipient, fee_a.protocol)?;
    ctx.pay(&pool.asset_b, &pool.fee_recipient, fee_b.protocol)?;
    fee_math::accrue_lp_fees(&mut pool, fee_a.lp, fee_b.lp)?;

    let (balance_a, balance_b) = ctx.observe(&pool)?;
    pool.reserves = Reserves { reserve_a: balance_a, reserve_b: balance_b };
    ctx.commit(pool, None);

    let leg_a = InputLeg {
        asset:        pool.asset_a,
        amount:       amount_a_in,
        protocol_fee: fee_a.protocol,
        lp_fee:       fee_a.lp,
    };
    let leg_b = InputLeg {
        asset:        pool.asset_b,
        amount:       amount_b_in,
        protocol_fee: fee_b.protocol,
        lp_fee:       fee_b.lp,
    };
    let (asset_out, amount_out, counter, same) = if amount_b_out > 0 {
        (pool.asset_b, amount_b_out, leg_a, leg_b)
    } else {
        (pool.asset_a, amount_a_out, leg_b, leg_a)
    };
    let (primary, second_leg) = if counter.amount > 0 {
        (counter, (same.amount > 0).then_some(same))
    } else {
        (same, None)
    };
    ctx.emit(PairEvent::SwapExecuted {
        asset_in: primary.asset,
        amount_in: primary.amount,
        asset_out,
        amount_out,
        recipient: to,
        protocol_fee: primary.protocol_fee,
        lp_fee: primary.lp_fee,
        second_leg,
    });
    info!(
        "Swap: a_in={} b_in={} protocol_fee_a={} protocol_fee_b={} lp_fee_a={} lp_fee_b={} a_out={} b_out={} to={}",
        amount_a_in,
        amount_b_in,
        fee_a.protocol,
        fee_b.protocol,
        fee_a.lp,
        fee_b.lp,
        amount_a_out,
        amount_b_out,
        to
    );

    Ok(SwapReceipt {
        amount_a_in,
        amount_b_in,
        amount_a_out,
        amount_b_out,
        protocol_fee_a: fee_a.protocol,
        protocol_fee_b: fee_b.protocol,
        lp_fee_a: fee_a.lp,
        lp_fee_b: fee_b.lp,
    })
}
