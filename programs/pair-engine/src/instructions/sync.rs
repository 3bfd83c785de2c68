use solana_sdk::pubkey::Pubkey;
use tracing::info;

use super::{check_recipient, Context};
use crate::{
    custody::AssetLedger,
    error::Result,
    events::PairEvent,
    state::Reserves,
    types::FeeAmounts,
};

/// Send whatever the pair holds above its recorded reserves to `to`.
pub(crate) fn skim<L: AssetLedger>(ctx: &mut Context<'_, L>, to: Pubkey) -> Result<FeeAmounts> {
    let pool = ctx.pool()?;
    check_recipient(&ctx.pair, &pool, &to)?;

    let (balance_a, balance_b) = ctx.observe(&pool)?;
    let excess = FeeAmounts {
        amount_a: balance_a.saturating_sub(pool.reserves.reserve_a),
        amount_b: balance_b.saturating_sub(pool.reserves.reserve_b),
    };
    ctx.pay(&pool.asset_a, &to, excess.amount_a)?;
    ctx.pay(&pool.asset_b, &to, excess.amount_b)?;

    ctx.emit(PairEvent::Skimmed {
        recipient: to,
        amount_a:  excess.amount_a,
        amount_b:  excess.amount_b,
    });
    info!("Skimmed: a={} b={} to={}", excess.amount_a, excess.amount_b, to);
    Ok(excess)
}

/// Absorb donations: reserves := observed balances.
pub(crate) fn sync<L: AssetLedger>(ctx: &mut Context<'_, L>) -> Result<Reserves> {
    let mut pool = ctx.pool()?;
    let (balance_a, balance_b) = ctx.observe(&pool)?;
    pool.reserves = Reserves { reserve_a: balance_a, reserve_b: balance_b };
    ctx.commit(pool, None);

    ctx.emit(PairEvent::Synced {
        reserve_a: pool.reserves.reserve_a,
        reserve_b: pool.reserves.reserve_b,
    });
    info!("Synced: reserve_a={} reserve_b={}", pool.reserves.reserve_a, pool.reserves.reserve_b);
    Ok(pool.reserves)
}
