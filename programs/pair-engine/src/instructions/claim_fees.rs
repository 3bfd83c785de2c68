use solana_sdk::pubkey::Pubkey;
use tracing::info;

use super::{fee_math, Context};
use crate::{
    custody::AssetLedger,
    error::{PairError, Result},
    events::PairEvent,
    state::Reserves,
    types::FeeAmounts,
};

/// Pay `holder` every fee it has earned, in both assets, out of the escrow.
///
/// O(1): one accumulator read per asset against the holder's reward debt.
pub(crate) fn handler<L: AssetLedger>(ctx: &mut Context<'_, L>, holder_key: Pubkey) -> Result<FeeAmounts> {
    let mut pool = ctx.pool()?;
    let mut holder = ctx.holder(&holder_key)?;
    if holder.shares == 0 {
        return Err(PairError::NoLiquidity);
    }

    fee_math::settle(&mut holder, &pool)?;
    let fees = FeeAmounts { amount_a: holder.fees_owed_a, amount_b: holder.fees_owed_b };
    if fees.is_zero() {
        return Err(PairError::NoFeesToClaim);
    }

    ctx.pay(&pool.asset_a, &holder_key, fees.amount_a)?;
    ctx.pay(&pool.asset_b, &holder_key, fees.amount_b)?;

    fee_math::release_escrow(&mut pool, &fees)?;
    holder.fees_owed_a = 0;
    holder.fees_owed_b = 0;

    let (balance_a, balance_b) = ctx.observe(&pool)?;
    pool.reserves = Reserves { reserve_a: balance_a, reserve_b: balance_b };
    ctx.commit(pool, Some((holder_key, holder)));

    ctx.emit(PairEvent::FeesClaimed {
        holder:   holder_key,
        amount_a: fees.amount_a,
        amount_b: fees.amount_b,
    });
    info!("Fees claimed: holder={} a={} b={}", holder_key, fees.amount_a, fees.amount_b);

    Ok(fees)
}
