use solana_sdk::pubkey::Pubkey;
use tracing::info;

use super::{check_recipient, fee_math, Context};
use crate::{
    custody::AssetLedger,
    error::{PairError, Result},
    events::PairEvent,
    math::burn_payout,
    state::Reserves,
    types::{BurnReceipt, FeeAmounts},
};

/// Burn `shares` of `holder` and send the proportional slice of the
/// distributable reserves to `to`, together with every fee the holder has
/// earned so far. Fees are settled against the pre-burn balance.
pub(crate) fn handler<L: AssetLedger>(
    ctx: &mut Context<'_, L>,
    holder_key: Pubkey,
    shares: u128,
    to: Pubkey,
) -> Result<BurnReceipt> {
    if shares == 0 {
        return Err(PairError::ZeroAmount);
    }
    let mut pool = ctx.pool()?;
    check_recipient(&ctx.pair, &pool, &to)?;
    if pool.total_shares == 0 {
        return Err(PairError::InsufficientLiquidity);
    }
    let mut holder = ctx.holder(&holder_key)?;
    if shares > holder.shares {
        return Err(PairError::InsufficientBalance { requested: shares, available: holder.shares });
    }

    fee_math::settle(&mut holder, &pool)?;
    let fees = FeeAmounts { amount_a: holder.fees_owed_a, amount_b: holder.fees_owed_b };

    let (available_a, available_b) = pool.distributable();
    let amount_a = burn_payout(shares, available_a, pool.total_shares)?;
    let amount_b = burn_payout(shares, available_b, pool.total_shares)?;

    let send_a = amount_a.checked_add(fees.amount_a).ok_or(PairError::MathOverflow)?;
    let send_b = amount_b.checked_add(fees.amount_b).ok_or(PairError::MathOverflow)?;
    ctx.pay(&pool.asset_a, &to, send_a)?;
    ctx.pay(&pool.asset_b, &to, send_b)?;

    fee_math::release_escrow(&mut pool, &fees)?;
    holder.shares -= shares;
    holder.fees_owed_a = 0;
    holder.fees_owed_b = 0;
    fee_math::reset_reward_debt(&mut holder, &pool)?;

    pool.total_shares -= shares;
    fee_math::release_orphaned_escrow(&mut pool);
    let (balance_a, balance_b) = ctx.observe(&pool)?;
    pool.reserves = Reserves { reserve_a: balance_a, reserve_b: balance_b };
    ctx.commit(pool, Some((holder_key, holder)));

    ctx.emit(PairEvent::LiquidityBurned {
        holder: holder_key,
        recipient: to,
        shares,
        amount_a,
        amount_b,
    });
    if !fees.is_zero() {
        ctx.emit(PairEvent::FeesClaimed {
            holder:   holder_key,
            amount_a: fees.amount_a,
            amount_b: fees.amount_b,
        });
    }
    info!(
        "Liquidity removed: shares={} a={} b={} fees_a={} fees_b={} to={}",
        shares, amount_a, amount_b, fees.amount_a, fees.amount_b, to
    );

    Ok(BurnReceipt {
        shares,
        amount_a,
        amount_b,
        fees_a: fees.amount_a,
        fees_b: fees.amount_b,
    })
}
