use solana_sdk::pubkey::Pubkey;
use tracing::info;

use super::{check_recipient, fee_math, Context};
use crate::{
    custody::AssetLedger,
    error::{PairError, Result},
    events::PairEvent,
    math::{initial_shares, proportional_shares},
    state::Reserves,
    types::MintReceipt,
};

/// Mint shares to `to` for whatever was delivered since the last operation.
///
/// Amounts are never declared: they are the observed balance minus the
/// recorded reserve. The first deposit into an empty pair mints `a × b`
/// shares; later deposits mint in proportion to the smaller of the two
/// contribution ratios against the distributable (non-escrowed) reserves.
pub(crate) fn handler<L: AssetLedger>(ctx: &mut Context<'_, L>, to: Pubkey) -> Result<MintReceipt> {
    let mut pool = ctx.pool()?;
    check_recipient(&ctx.pair, &pool, &to)?;

    let (balance_a, balance_b) = ctx.observe(&pool)?;
    let amount_a = balance_a.saturating_sub(pool.reserves.reserve_a);
    let amount_b = balance_b.saturating_sub(pool.reserves.reserve_b);

    let minted = if pool.total_shares == 0 {
        if amount_a == 0 || amount_b == 0 {
            return Err(PairError::InsufficientAmounts);
        }
        initial_shares(amount_a, amount_b)
    } else {
        let (available_a, available_b) = pool.distributable();
        proportional_shares(amount_a, amount_b, available_a, available_b, pool.total_shares)?
    };
    if minted == 0 {
        return Err(PairError::InsufficientAmounts);
    }

    // Sync fees, then change the balance
    let mut holder = ctx.holder(&to)?;
    fee_math::settle(&mut holder, &pool)?;
    holder.shares = holder.shares.checked_add(minted).ok_or(PairError::MathOverflow)?;
    fee_math::reset_reward_debt(&mut holder, &pool)?;

    pool.total_shares = pool
        .total_shares
        .checked_add(minted)
        .ok_or(PairError::MathOverflow)?;
    pool.reserves = Reserves { reserve_a: balance_a, reserve_b: balance_b };
    ctx.commit(pool, Some((to, holder)));

    ctx.emit(PairEvent::LiquidityMinted { provider: to, shares: minted, amount_a, amount_b });
    info!("Liquidity provided: shares={} a={} b={} to={}", minted, amount_a, amount_b, to);

    Ok(MintReceipt { shares: minted, amount_a, amount_b })
}
