#![allow(dead_code)]

use pair_engine::{AssetLedger, InMemoryLedger, InitializeParams, Pair, PairConfig};
use solana_sdk::pubkey::Pubkey;

/// Addresses shared by one pair and everyone trading against it.
#[derive(Debug, Clone, Copy)]
pub struct Market {
    pub pair:      Pubkey,
    pub asset_a:   Pubkey,
    pub asset_b:   Pubkey,
    pub recipient: Pubkey,
}

impl Market {
    pub fn new() -> Self {
        Self {
            pair:      Pubkey::new_unique(),
            asset_a:   Pubkey::new_unique(),
            asset_b:   Pubkey::new_unique(),
            recipient: Pubkey::new_unique(),
        }
    }

    pub fn params(&self, amount_a: u64, amount_b: u64) -> InitializeParams {
        InitializeParams {
            asset_a:          self.asset_a,
            asset_b:          self.asset_b,
            fee_recipient:    self.recipient,
            initial_amount_a: amount_a,
            initial_amount_b: amount_b,
        }
    }

    /// Fund `from` and move the funds into the pair, as a router would.
    pub fn deliver(&self, ledger: &mut InMemoryLedger, from: &Pubkey, amount_a: u64, amount_b: u64) {
        for (asset, amount) in [(self.asset_a, amount_a), (self.asset_b, amount_b)] {
            ledger.mint(&asset, from, amount).unwrap();
            ledger.transfer(&asset, from, &self.pair, amount).unwrap();
        }
    }

    pub fn pair_balances(&self, ledger: &impl AssetLedger) -> (u64, u64) {
        (
            ledger.balance_of(&self.asset_a, &self.pair).unwrap(),
            ledger.balance_of(&self.asset_b, &self.pair).unwrap(),
        )
    }
}

/// A pair seeded with `(amount_a, amount_b)` by the factory.
pub fn launch(config: PairConfig, amount_a: u64, amount_b: u64) -> (Market, Pair, InMemoryLedger) {
    let market = Market::new();
    let mut ledger = InMemoryLedger::new();
    ledger.mint(&market.asset_a, &market.pair, amount_a).unwrap();
    ledger.mint(&market.asset_b, &market.pair, amount_b).unwrap();
    let pair = Pair::new(market.pair, config).unwrap();
    pair.initialize(&mut ledger, market.params(amount_a, amount_b)).unwrap();
    (market, pair, ledger)
}

pub fn no_protocol_cut() -> PairConfig {
    PairConfig { protocol_fee_share_bps: 0, ..PairConfig::default() }
}
