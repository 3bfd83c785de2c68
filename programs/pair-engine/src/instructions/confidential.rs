use std::cell::RefCell;

use solana_sdk::pubkey::Pubkey;
use tracing::info;

use super::{provide_liquidity, swap, Context};
use crate::{
    confidential::{ConfidentialLegs, ConfidentialVolume, FoldPlan, VolumeBackend},
    custody::AssetLedger,
    error::{PairError, Result},
    events::PairEvent,
    types::{MintReceipt, SwapReceipt},
};

/// Plaintext swap plus an encrypted size declaration per leg.
///
/// Every declaration is verified before anything moves; a bad proof fails
/// with `InvalidCiphertext` and no side effects. Settlement is exactly the
/// plaintext swap.
pub(crate) fn swap<L: AssetLedger, B: VolumeBackend>(
    ctx: &mut Context<'_, L>,
    volume: &RefCell<Option<ConfidentialVolume<B>>>,
    sender: Pubkey,
    amount_a_out: u64,
    amount_b_out: u64,
    to: Pubkey,
    legs: &ConfidentialLegs<B>,
) -> Result<SwapReceipt> {
    let plan = prepare(ctx, volume, sender, legs)?;
    let receipt = swap::handler(ctx, amount_a_out, amount_b_out, to)?;
    publish(ctx, volume, plan);
    Ok(receipt)
}

pub(crate) fn provide_liquidity<L: AssetLedger, B: VolumeBackend>(
    ctx: &mut Context<'_, L>,
    volume: &RefCell<Option<ConfidentialVolume<B>>>,
    sender: Pubkey,
    to: Pubkey,
    legs: &ConfidentialLegs<B>,
) -> Result<MintReceipt> {
    let plan = prepare(ctx, volume, sender, legs)?;
    let receipt = provide_liquidity::handler(ctx, to)?;
    publish(ctx, volume, plan);
    Ok(receipt)
}

fn prepare<L: AssetLedger, B: VolumeBackend>(
    ctx: &Context<'_, L>,
    volume: &RefCell<Option<ConfidentialVolume<B>>>,
    sender: Pubkey,
    legs: &ConfidentialLegs<B>,
) -> Result<FoldPlan<B>> {
    let volume = volume.borrow();
    let volume = volume.as_ref().ok_or(PairError::ConfidentialDisabled)?;
    let pool = ctx.pool()?;
    volume.prepare(legs, ctx.pair, &pool, sender)
}

fn publish<L: AssetLedger, B: VolumeBackend>(
    ctx: &mut Context<'_, L>,
    volume: &RefCell<Option<ConfidentialVolume<B>>>,
    plan: FoldPlan<B>,
) {
    let updated = match volume.borrow_mut().as_mut() {
        Some(volume) => volume.apply(plan),
        None => return,
    };
    for (asset, handle) in updated {
        info!("Confidential volume updated: asset={} handle={}", asset, handle);
        ctx.emit(PairEvent::ConfidentialAccumulatorUpdated { asset, handle });
    }
}
