//! Pair engine: a constant-product liquidity pair for two fungible assets.
//!
//! Operations:
//!   initialize                      one-time setup by the factory; seeds reserves
//!   provide_liquidity               mint shares for balances delivered since the last op
//!   withdraw_liquidity              burn shares; pays the proportional reserve plus fees
//!   swap                            optimistic-release swap settled by balance difference
//!   claim_fees                      O(1) claim of accrued LP fees in both assets
//!   skim / sync                     hand out or absorb untracked balances
//!   swap_confidential               swap plus encrypted size declarations
//!   provide_liquidity_confidential  deposit plus encrypted size declarations
//!
//! Every mutating operation holds a reentrancy latch, checkpoints the asset
//! ledger and either commits everything or rolls everything back.

pub mod confidential;
pub mod config;
pub mod constants;
pub mod custody;
pub mod error;
pub mod events;
mod guard;
mod instructions;
pub mod math;
pub mod state;
pub mod types;

use std::cell::RefCell;

use solana_sdk::pubkey::Pubkey;
use tracing::{debug, warn};

pub use confidential::{
    CiphertextHandle, ConfidentialLegs, ConfidentialVolume, ElGamalBackend, ElGamalKeypair,
    ProofContext, VolumeBackend, VolumeDeclaration,
};
pub use config::PairConfig;
pub use custody::{AssetLedger, Checkpoint, InMemoryLedger};
pub use error::{LedgerError, PairError, Result};
pub use events::{InputLeg, PairEvent};
pub use instructions::fee_math;
pub use state::{HolderRecord, PairSnapshot, PoolState, Reserves};
pub use types::*;

use guard::OperationLatch;
use instructions::{
    claim_fees, confidential as confidential_ix, initialize_pair, provide_liquidity, swap, sync,
    withdraw_liquidity, Context,
};
use math::U256;
use state::PairState;

// ─── Pair ─────────────────────────────────────────────────────────────────────

/// One pair instance. Balances live in the caller's [`AssetLedger`], passed
/// to every mutating call; the pair only holds its own bookkeeping.
pub struct Pair<B: VolumeBackend = ElGamalBackend> {
    address: Pubkey,
    config:  PairConfig,
    state:   RefCell<Option<PairState>>,
    volume:  RefCell<Option<ConfidentialVolume<B>>>,
    latch:   OperationLatch,
    events:  RefCell<Vec<PairEvent>>,
}

impl Pair {
    /// A pair without a confidential backend; the confidential variants
    /// fail with `ConfidentialDisabled`.
    pub fn new(address: Pubkey, config: PairConfig) -> Result<Self> {
        Self::build(address, config, None, None)
    }

    /// Rebuild a pair from a snapshot. Confidential totals are not part of
    /// a snapshot.
    pub fn restore(snapshot: PairSnapshot) -> Result<Self> {
        let state = snapshot.pool.map(|pool| PairState {
            pool,
            holders: snapshot.holders.into_iter().collect(),
        });
        Self::build(snapshot.address, snapshot.config, state, None)
    }
}

impl<B: VolumeBackend> Pair<B> {
    pub fn with_confidential(address: Pubkey, config: PairConfig, backend: B) -> Result<Self> {
        Self::build(address, config, None, Some(ConfidentialVolume::new(backend)))
    }

    fn build(
        address: Pubkey,
        config: PairConfig,
        state: Option<PairState>,
        volume: Option<ConfidentialVolume<B>>,
    ) -> Result<Self> {
        config.validate()?;
        if address == Pubkey::default() {
            return Err(PairError::InvalidConfig("pair address must be non-zero".into()));
        }
        Ok(Self {
            address,
            config,
            state: RefCell::new(state),
            volume: RefCell::new(volume),
            latch: OperationLatch::default(),
            events: RefCell::new(Vec::new()),
        })
    }

    pub fn address(&self) -> Pubkey {
        self.address
    }

    pub fn config(&self) -> &PairConfig {
        &self.config
    }

    // ─── Dispatch ─────────────────────────────────────────────────────────────

    fn execute<L, T>(
        &self,
        ledger: &mut L,
        operation: &'static str,
        handler: impl FnOnce(&mut Context<'_, L>) -> Result<T>,
    ) -> Result<T>
    where
        L: AssetLedger,
    {
        let _entered = self.latch.enter().map_err(|err| {
            warn!("{}: rejected reentrant call", operation);
            err
        })?;

        let checkpoint = ledger.checkpoint();
        let mut ctx = Context::new(self.address, &self.config, &self.state, ledger);
        match handler(&mut ctx) {
            Ok(value) => {
                let events = ctx.into_events();
                ledger.commit(checkpoint);
                self.events.borrow_mut().extend(events);
                Ok(value)
            }
            Err(err) => {
                ledger.rollback(checkpoint);
                debug!("{} reverted: {}", operation, err);
                Err(err)
            }
        }
    }

    // ─── Operations ───────────────────────────────────────────────────────────

    pub fn initialize<L: AssetLedger>(
        &self,
        ledger: &mut L,
        params: InitializeParams,
    ) -> Result<InitializeReceipt> {
        self.execute(ledger, "initialize", |ctx| initialize_pair::handler(ctx, params))
    }

    /// Mint shares to `to` for the amounts delivered since the last operation.
    pub fn provide_liquidity<L: AssetLedger>(&self, ledger: &mut L, to: Pubkey) -> Result<MintReceipt> {
        self.execute(ledger, "provide_liquidity", |ctx| provide_liquidity::handler(ctx, to))
    }

    /// Burn `shares` of `holder` and send the payout plus the holder's fees to
    /// `to`. Authorization of `holder` is the caller's concern.
    pub fn withdraw_liquidity<L: AssetLedger>(
        &self,
        ledger: &mut L,
        holder: Pubkey,
        shares: u128,
        to: Pubkey,
    ) -> Result<BurnReceipt> {
        self.execute(ledger, "withdraw_liquidity", |ctx| {
            withdraw_liquidity::handler(ctx, holder, shares, to)
        })
    }

    /// Exactly one of the out amounts must be non-zero. Input must already be
    /// in the pair's custody.
    pub fn swap<L: AssetLedger>(
        &self,
        ledger: &mut L,
        amount_a_out: u64,
        amount_b_out: u64,
        to: Pubkey,
    ) -> Result<SwapReceipt> {
        self.execute(ledger, "swap", |ctx| swap::handler(ctx, amount_a_out, amount_b_out, to))
    }

    pub fn claim_fees<L: AssetLedger>(&self, ledger: &mut L, holder: Pubkey) -> Result<FeeAmounts> {
        self.execute(ledger, "claim_fees", |ctx| claim_fees::handler(ctx, holder))
    }

    pub fn skim<L: AssetLedger>(&self, ledger: &mut L, to: Pubkey) -> Result<FeeAmounts> {
        self.execute(ledger, "skim", |ctx| sync::skim(ctx, to))
    }

    pub fn sync<L: AssetLedger>(&self, ledger: &mut L) -> Result<Reserves> {
        self.execute(ledger, "sync", |ctx| sync::sync(ctx))
    }

    /// [`Pair::swap`] with an optional encrypted size declaration per leg,
    /// each proven for `sender`.
    pub fn swap_confidential<L: AssetLedger>(
        &self,
        ledger: &mut L,
        sender: Pubkey,
        amount_a_out: u64,
        amount_b_out: u64,
        to: Pubkey,
        legs: &ConfidentialLegs<B>,
    ) -> Result<SwapReceipt> {
        self.execute(ledger, "swap_confidential", |ctx| {
            confidential_ix::swap(ctx, &self.volume, sender, amount_a_out, amount_b_out, to, legs)
        })
    }

    pub fn provide_liquidity_confidential<L: AssetLedger>(
        &self,
        ledger: &mut L,
        sender: Pubkey,
        to: Pubkey,
        legs: &ConfidentialLegs<B>,
    ) -> Result<MintReceipt> {
        self.execute(ledger, "provide_liquidity_confidential", |ctx| {
            confidential_ix::provide_liquidity(ctx, &self.volume, sender, to, legs)
        })
    }

    // ─── Queries ──────────────────────────────────────────────────────────────

    fn read<T>(&self, f: impl FnOnce(&PairState) -> T) -> Result<T> {
        self.state.borrow().as_ref().map(f).ok_or(PairError::NotInitialized)
    }

    pub fn pool(&self) -> Result<PoolState> {
        self.read(|s| s.pool)
    }

    pub fn get_reserves(&self) -> Result<Reserves> {
        self.read(|s| s.pool.reserves)
    }

    pub fn get_share_supply(&self) -> Result<u128> {
        self.read(|s| s.pool.total_shares)
    }

    /// `(acc_fee_per_share_a, acc_fee_per_share_b)`, scaled by `PRECISION`.
    pub fn get_acc_fee_per_share(&self) -> Result<(U256, U256)> {
        self.read(|s| (s.pool.acc_fee_per_share_a, s.pool.acc_fee_per_share_b))
    }

    pub fn get_holder_record(&self, holder: &Pubkey) -> Result<HolderRecord> {
        self.read(|s| s.holder(holder))
    }

    /// Fees `holder` would receive from `claim_fees` right now.
    pub fn pending_fees(&self, holder: &Pubkey) -> Result<FeeAmounts> {
        self.read(|s| fee_math::claimable(&s.holder(holder), &s.pool))?
    }

    pub fn fee_escrow(&self) -> Result<FeeAmounts> {
        self.read(|s| FeeAmounts { amount_a: s.pool.fee_escrow_a, amount_b: s.pool.fee_escrow_b })
    }

    /// Output for `amount_in` of `asset_in` against the current reserves.
    pub fn get_amount_out(&self, asset_in: &Pubkey, amount_in: u64) -> Result<u64> {
        let pool = self.pool()?;
        let (reserve_in, reserve_out) = oriented(&pool, asset_in)?;
        math::quote_out(amount_in, reserve_in, reserve_out, self.config.fee_bps)
    }

    /// Input of the other asset needed to receive `amount_out` of `asset_out`.
    pub fn get_amount_in(&self, asset_out: &Pubkey, amount_out: u64) -> Result<u64> {
        let pool = self.pool()?;
        let (reserve_out, reserve_in) = oriented(&pool, asset_out)?;
        math::quote_in(amount_out, reserve_in, reserve_out, self.config.fee_bps)
    }

    /// Running encrypted volume total for `asset`.
    pub fn volume_ciphertext(&self, asset: &Pubkey) -> Result<B::Ciphertext> {
        let pool = self.pool()?;
        let volume = self.volume.borrow();
        let volume = volume.as_ref().ok_or(PairError::ConfidentialDisabled)?;
        if *asset == pool.asset_a {
            Ok(volume.total_a().clone())
        } else if *asset == pool.asset_b {
            Ok(volume.total_b().clone())
        } else {
            Err(PairError::InvalidAsset(*asset))
        }
    }

    pub fn snapshot(&self) -> PairSnapshot {
        let state = self.state.borrow();
        let mut holders: Vec<(Pubkey, HolderRecord)> = state
            .as_ref()
            .map(|s| s.holders.iter().map(|(k, v)| (*k, *v)).collect())
            .unwrap_or_default();
        holders.sort_by_key(|(owner, _)| *owner);
        PairSnapshot {
            address: self.address,
            config:  self.config,
            pool:    state.as_ref().map(|s| s.pool),
            holders,
        }
    }

    /// Drain the events of every operation committed so far.
    pub fn take_events(&self) -> Vec<PairEvent> {
        std::mem::take(&mut *self.events.borrow_mut())
    }
}

/// `(reserve of asset, reserve of the other asset)`.
fn oriented(pool: &PoolState, asset: &Pubkey) -> Result<(u64, u64)> {
    let Reserves { reserve_a, reserve_b } = pool.reserves;
    if *asset == pool.asset_a {
        Ok((reserve_a, reserve_b))
    } else if *asset == pool.asset_b {
        Ok((reserve_b, reserve_a))
    } else {
        Err(PairError::InvalidAsset(*asset))
    }
}
