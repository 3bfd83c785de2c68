use std::cell::RefCell;

use solana_sdk::pubkey::Pubkey;

use crate::{
    config::PairConfig,
    custody::AssetLedger,
    error::{PairError, Result},
    events::PairEvent,
    state::{HolderRecord, PairState, PoolState},
};

pub(crate) mod claim_fees;
pub(crate) mod confidential;
pub mod fee_math;
pub(crate) mod initialize_pair;
pub(crate) mod provide_liquidity;
pub(crate) mod swap;
pub(crate) mod sync;
pub(crate) mod withdraw_liquidity;

// ─── Context ──────────────────────────────────────────────────────────────────
// Everything one handler may touch. State is read by copy and written back in
// a single `commit` at the very end, so no borrow of it is ever held across a
// ledger call and a failed handler leaves it untouched.
pub(crate) struct Context<'a, L: AssetLedger> {
    pub pair:   Pubkey,
    pub config: &'a PairConfig,
    pub ledger: &'a mut L,
    state:      &'a RefCell<Option<PairState>>,
    events:     Vec<PairEvent>,
}

impl<'a, L: AssetLedger> Context<'a, L> {
    pub fn new(
        pair: Pubkey,
        config: &'a PairConfig,
        state: &'a RefCell<Option<PairState>>,
        ledger: &'a mut L,
    ) -> Self {
        Self { pair, config, ledger, state, events: Vec::new() }
    }

    pub fn is_initialized(&self) -> bool {
        self.state.borrow().is_some()
    }

    pub fn pool(&self) -> Result<PoolState> {
        self.state
            .borrow()
            .as_ref()
            .map(|s| s.pool)
            .ok_or(PairError::NotInitialized)
    }

    pub fn holder(&self, owner: &Pubkey) -> Result<HolderRecord> {
        self.state
            .borrow()
            .as_ref()
            .map(|s| s.holder(owner))
            .ok_or(PairError::NotInitialized)
    }

    /// The pair's own balances of both assets, as the ledger reports them now.
    pub fn observe(&self, pool: &PoolState) -> Result<(u64, u64)> {
        let balance_a = self.ledger.balance_of(&pool.asset_a, &self.pair)?;
        let balance_b = self.ledger.balance_of(&pool.asset_b, &self.pair)?;
        Ok((balance_a, balance_b))
    }

    pub fn observe_asset(&self, asset: &Pubkey) -> Result<u64> {
        Ok(self.ledger.balance_of(asset, &self.pair)?)
    }

    /// Send `amount` of `asset` out of the pair's custody.
    pub fn pay(&mut self, asset: &Pubkey, to: &Pubkey, amount: u64) -> Result<()> {
        if amount > 0 {
            self.ledger.transfer(asset, &self.pair, to, amount)?;
        }
        Ok(())
    }

    pub fn emit(&mut self, event: PairEvent) {
        self.events.push(event);
    }

    pub fn install(&self, state: PairState) {
        *self.state.borrow_mut() = Some(state);
    }

    pub fn commit(&self, pool: PoolState, holder: Option<(Pubkey, HolderRecord)>) {
        if let Some(state) = self.state.borrow_mut().as_mut() {
            state.pool = pool;
            if let Some((owner, record)) = holder {
                state.holders.insert(owner, record);
            }
        }
    }

    pub fn into_events(self) -> Vec<PairEvent> {
        self.events
    }
}

/// Recipients may not be the zero address, either tracked asset or the pair
/// itself.
pub(crate) fn check_recipient(pair: &Pubkey, pool: &PoolState, to: &Pubkey) -> Result<()> {
    if *to == Pubkey::default() || *to == *pair || pool.is_tracked(to) {
        return Err(PairError::InvalidRecipient(*to));
    }
    Ok(())
}
