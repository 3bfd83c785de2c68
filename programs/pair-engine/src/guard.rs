use std::cell::Cell;

use crate::error::{PairError, Result};

// ─── Operation latch ──────────────────────────────────────────────────────────
// Held for the whole of every state-mutating operation. A call that arrives
// while it is held (e.g. an asset ledger calling back into `swap` during a
// transfer) is rejected with `Reentrancy`.
#[derive(Debug, Default)]
pub(crate) struct OperationLatch {
    entered: Cell<bool>,
}

impl OperationLatch {
    pub(crate) fn enter(&self) -> Result<Entered<'_>> {
        if self.entered.replace(true) {
            return Err(PairError::Reentrancy);
        }
        Ok(Entered { latch: self })
    }

    #[cfg(test)]
    pub(crate) fn is_entered(&self) -> bool {
        self.entered.get()
    }
}

/// Releases the latch on drop, on both the success and the error path.
pub(crate) struct Entered<'a> {
    latch: &'a OperationLatch,
}

impl Drop for Entered<'_> {
    fn drop(&mut self) {
        self.latch.entered.set(false);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn second_entry_is_rejected_until_release() {
        let latch = OperationLatch::default();
        let held = latch.enter().unwrap();
        assert!(latch.is_entered());
        assert!(matches!(latch.enter(), Err(PairError::Reentrancy)));
        drop(held);
        assert!(!latch.is_entered());
        assert!(latch.enter().is_ok());
    }
}
