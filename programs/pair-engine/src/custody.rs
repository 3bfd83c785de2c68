//! Custodied-balance oracle.
//!
//! The engine never trusts a declared transfer amount. It asks the
//! [`AssetLedger`] for its own balances before and after every external
//! transfer and derives amounts from the difference. The ledger also owns
//! atomicity: every engine operation opens a checkpoint and either commits it
//! or rolls the ledger back to it.

use std::collections::HashMap;

use solana_sdk::pubkey::Pubkey;

use crate::constants::BPS_DENOMINATOR;
use crate::error::LedgerError;

/// Journal position returned by [`AssetLedger::checkpoint`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Checkpoint(pub usize);

/// Balance tables of the fungible assets a pair custodies.
///
/// Implementations are untrusted: the engine re-reads balances rather than
/// caching them across calls.
pub trait AssetLedger {
    fn balance_of(&self, asset: &Pubkey, owner: &Pubkey) -> Result<u64, LedgerError>;

    fn transfer(
        &mut self,
        asset: &Pubkey,
        from: &Pubkey,
        to: &Pubkey,
        amount: u64,
    ) -> Result<(), LedgerError>;

    /// Open a (possibly nested) checkpoint.
    fn checkpoint(&mut self) -> Checkpoint;

    /// Keep every change made since `checkpoint`.
    fn commit(&mut self, checkpoint: Checkpoint);

    /// Undo every change made since `checkpoint`.
    fn rollback(&mut self, checkpoint: Checkpoint);
}

// ─── In-memory ledger ─────────────────────────────────────────────────────────

type BalanceKey = (Pubkey, Pubkey);

/// Journaled in-memory balance table.
///
/// Assets may carry a transfer fee (burned from the amount in flight) to
/// model fee-on-transfer tokens.
#[derive(Debug, Clone, Default)]
pub struct InMemoryLedger {
    balances:     HashMap<BalanceKey, u64>,
    transfer_fee: HashMap<Pubkey, u16>,
    journal:      Vec<(BalanceKey, u64)>,
    open:         usize,
}

impl InMemoryLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Credit `amount` of `asset` to `owner` out of thin air.
    pub fn mint(&mut self, asset: &Pubkey, owner: &Pubkey, amount: u64) -> Result<(), LedgerError> {
        let key = (*asset, *owner);
        let balance = self.get(&key);
        let next = balance
            .checked_add(amount)
            .ok_or(LedgerError::BalanceOverflow { asset: *asset, owner: *owner })?;
        self.set(key, next);
        Ok(())
    }

    /// Burn `bps` of every transfer of `asset` in flight.
    pub fn set_transfer_fee(&mut self, asset: &Pubkey, bps: u16) {
        self.transfer_fee.insert(*asset, bps);
    }

    fn get(&self, key: &BalanceKey) -> u64 {
        self.balances.get(key).copied().unwrap_or(0)
    }

    fn set(&mut self, key: BalanceKey, value: u64) {
        let previous = self.get(&key);
        if self.open > 0 {
            self.journal.push((key, previous));
        }
        self.balances.insert(key, value);
    }

    fn close(&mut self) {
        self.open = self.open.saturating_sub(1);
        if self.open == 0 {
            self.journal.clear();
        }
    }
}

impl AssetLedger for InMemoryLedger {
    fn balance_of(&self, asset: &Pubkey, owner: &Pubkey) -> Result<u64, LedgerError> {
        Ok(self.get(&(*asset, *owner)))
    }

    fn transfer(
        &mut self,
        asset: &Pubkey,
        from: &Pubkey,
        to: &Pubkey,
        amount: u64,
    ) -> Result<(), LedgerError> {
        if amount == 0 || from == to {
            return Ok(());
        }
        let from_key = (*asset, *from);
        let available = self.get(&from_key);
        if available < amount {
            return Err(LedgerError::InsufficientFunds {
                asset:     *asset,
                owner:     *from,
                needed:    amount,
                available,
            });
        }
        let fee_bps = self.transfer_fee.get(asset).copied().unwrap_or(0) as u128;
        let burned = (amount as u128 * fee_bps / BPS_DENOMINATOR) as u64;
        let to_key = (*asset, *to);
        let received = self
            .get(&to_key)
            .checked_add(amount - burned)
            .ok_or(LedgerError::BalanceOverflow { asset: *asset, owner: *to })?;
        self.set(from_key, available - amount);
        self.set(to_key, received);
        Ok(())
    }

    fn checkpoint(&mut self) -> Checkpoint {
        self.open += 1;
        Checkpoint(self.journal.len())
    }

    fn commit(&mut self, _checkpoint: Checkpoint) {
        self.close();
    }

    fn rollback(&mut self, checkpoint: Checkpoint) {
        while self.journal.len() > checkpoint.0 {
            if let Some((key, previous)) = self.journal.pop() {
                self.balances.insert(key, previous);
            }
        }
        self.close();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transfer_moves_balance() {
        let (asset, alice, bob) = (Pubkey::new_unique(), Pubkey::new_unique(), Pubkey::new_unique());
        let mut ledger = InMemoryLedger::new();
        ledger.mint(&asset, &alice, 100).unwrap();
        ledger.transfer(&asset, &alice, &bob, 40).unwrap();
        assert_eq!(ledger.balance_of(&asset, &alice).unwrap(), 60);
        assert_eq!(ledger.balance_of(&asset, &bob).unwrap(), 40);
        assert!(matches!(
            ledger.transfer(&asset, &alice, &bob, 61),
            Err(LedgerError::InsufficientFunds { needed: 61, available: 60, .. })
        ));
    }

    #[test]
    fn transfer_fee_is_burned_in_flight() {
        let (asset, alice, bob) = (Pubkey::new_unique(), Pubkey::new_unique(), Pubkey::new_unique());
        let mut ledger = InMemoryLedger::new();
        ledger.set_transfer_fee(&asset, 100); // 1 %
        ledger.mint(&asset, &alice, 1_000).unwrap();
        ledger.transfer(&asset, &alice, &bob, 1_000).unwrap();
        assert_eq!(ledger.balance_of(&asset, &alice).unwrap(), 0);
        assert_eq!(ledger.balance_of(&asset, &bob).unwrap(), 990);
    }

    #[test]
    fn nested_rollback_restores_only_inner_changes() {
        let (asset, alice, bob) = (Pubkey::new_unique(), Pubkey::new_unique(), Pubkey::new_unique());
        let mut ledger = InMemoryLedger::new();
        ledger.mint(&asset, &alice, 100).unwrap();

        let outer = ledger.checkpoint();
        ledger.transfer(&asset, &alice, &bob, 10).unwrap();
        let inner = ledger.checkpoint();
        ledger.transfer(&asset, &alice, &bob, 20).unwrap();
        ledger.rollback(inner);
        assert_eq!(ledger.balance_of(&asset, &bob).unwrap(), 10);

        ledger.rollback(outer);
        assert_eq!(ledger.balance_of(&asset, &alice).unwrap(), 100);
        assert_eq!(ledger.balance_of(&asset, &bob).unwrap(), 0);
    }

    #[test]
    fn commit_keeps_changes() {
        let (asset, alice, bob) = (Pubkey::new_unique(), Pubkey::new_unique(), Pubkey::new_unique());
        let mut ledger = InMemoryLedger::new();
        ledger.mint(&asset, &alice, 5).unwrap();
        let cp = ledger.checkpoint();
        ledger.transfer(&asset, &alice, &bob, 5).unwrap();
        ledger.commit(cp);
        assert_eq!(ledger.balance_of(&asset, &bob).unwrap(), 5);
        assert!(ledger.journal.is_empty());
    }
}
