use solana_sdk::pubkey::Pubkey;
use tracing::info;

use super::Context;
use crate::{
    custody::AssetLedger,
    error::{PairError, Result},
    events::PairEvent,
    math::{initial_shares, U256},
    state::{HolderRecord, PairState, PoolState, Reserves},
    types::{InitializeParams, InitializeReceipt},
};

/// Bind the pair to its two assets and seed reserves from what the factory
/// already delivered. Runs exactly once.
///
/// The declared initial amounts are only a floor: reserves are seeded from the
/// observed balances. A non-empty seed mints `a × b` shares to the fee
/// recipient so the seed is owned by someone and later deposits are priced
/// against it.
pub(crate) fn handler<L: AssetLedger>(
    ctx: &mut Context<'_, L>,
    params: InitializeParams,
) -> Result<InitializeReceipt> {
    if ctx.is_initialized() {
        return Err(PairError::AlreadyInitialized);
    }
    let zero = Pubkey::default();
    for asset in [params.asset_a, params.asset_b] {
        if asset == zero || asset == ctx.pair {
            return Err(PairError::InvalidAsset(asset));
        }
    }
    if params.asset_a == params.asset_b {
        return Err(PairError::IdenticalAssets);
    }
    let recipient = params.fee_recipient;
    if recipient == zero
        || recipient == ctx.pair
        || recipient == params.asset_a
        || recipient == params.asset_b
    {
        return Err(PairError::InvalidRecipient(recipient));
    }
    if (params.initial_amount_a == 0) != (params.initial_amount_b == 0) {
        return Err(PairError::InsufficientAmounts);
    }

    let balance_a = ctx.observe_asset(&params.asset_a)?;
    let balance_b = ctx.observe_asset(&params.asset_b)?;
    if balance_a < params.initial_amount_a || balance_b < params.initial_amount_b {
        return Err(PairError::InsufficientAmounts);
    }

    let seed_shares = if params.initial_amount_a > 0 {
        initial_shares(balance_a, balance_b)
    } else {
        0
    };

    let mut state = PairState::new(PoolState {
        asset_a:             params.asset_a,
        asset_b:             params.asset_b,
        fee_recipient:       recipient,
        reserves:            Reserves { reserve_a: balance_a, reserve_b: balance_b },
        total_shares:        seed_shares,
        acc_fee_per_share_a: U256::zero(),
        acc_fee_per_share_b: U256::zero(),
        fee_escrow_a:        0,
        fee_escrow_b:        0,
    });
    if seed_shares > 0 {
        state
            .holders
            .insert(recipient, HolderRecord { shares: seed_shares, ..Default::default() });
    }
    ctx.install(state);

    ctx.emit(PairEvent::PairInitialized {
        asset_a:       params.asset_a,
        asset_b:       params.asset_b,
        fee_recipient: recipient,
        reserve_a:     balance_a,
        reserve_b:     balance_b,
        seed_shares,
    });
    info!(
        "Pair initialized: a={} b={} reserve_a={} reserve_b={} seed_shares={}",
        params.asset_a, params.asset_b, balance_a, balance_b, seed_shares
    );

    Ok(InitializeReceipt { reserve_a: balance_a, reserve_b: balance_b, seed_shares })
}
