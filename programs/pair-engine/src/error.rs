//! Engine error types.

use solana_sdk::pubkey::Pubkey;

/// Every condition a pair operation can fail with.
///
/// All failures are fully reverting: when an operation returns `Err`, neither
/// engine state nor custodied balances reflect any part of it.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PairError {
    // ── Input validation ─────────────────────────────────────────────────────
    #[error("Amount in must be greater than zero")]
    InsufficientInput,

    #[error("Asset {0} is not tracked by this pair")]
    InvalidAsset(Pubkey),

    #[error("Both assets of a pair must differ")]
    IdenticalAssets,

    #[error("Swap requests no output")]
    NoOutput,

    #[error("Swap requests output in both assets")]
    AmbiguousDirection,

    #[error("Recipient {0} is the zero address or a tracked asset")]
    InvalidRecipient(Pubkey),

    #[error("Amount must be greater than zero")]
    ZeroAmount,

    // ── Invariant ────────────────────────────────────────────────────────────
    #[error("Constant-product invariant violated")]
    InvariantViolated,

    // ── Accounting exhaustion ────────────────────────────────────────────────
    #[error("Pair has insufficient liquidity")]
    InsufficientLiquidity,

    #[error("Requested output exceeds the distributable reserve")]
    InsufficientReserve,

    #[error("Observed deposit amounts are insufficient")]
    InsufficientAmounts,

    #[error("Holder has {available} shares; {requested} requested")]
    InsufficientBalance { requested: u128, available: u128 },

    #[error("Holder has no liquidity")]
    NoLiquidity,

    #[error("No fees to claim")]
    NoFeesToClaim,

    // ── Confidential path ────────────────────────────────────────────────────
    #[error("Ciphertext or proof of encryption is invalid")]
    InvalidCiphertext,

    #[error("Pair has no confidential volume backend")]
    ConfidentialDisabled,

    // ── Lifecycle / guard ────────────────────────────────────────────────────
    #[error("Pair is already initialized")]
    AlreadyInitialized,

    #[error("Pair is not initialized")]
    NotInitialized,

    #[error("Reentrant call rejected")]
    Reentrancy,

    // ── Arithmetic / config / custody ────────────────────────────────────────
    #[error("Math overflow")]
    MathOverflow,

    #[error("Invalid config: {0}")]
    InvalidConfig(String),

    #[error("Ledger error: {0}")]
    Ledger(#[from] LedgerError),
}

/// Failures reported by an [`AssetLedger`](crate::custody::AssetLedger).
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LedgerError {
    #[error("{owner} holds {available} of {asset}; {needed} needed")]
    InsufficientFunds {
        asset:     Pubkey,
        owner:     Pubkey,
        needed:    u64,
        available: u64,
    },

    #[error("Balance overflow for {owner} in {asset}")]
    BalanceOverflow { asset: Pubkey, owner: Pubkey },

    #[error("Transfer rejected: {0}")]
    Rejected(String),
}

/// Convenience alias so every module can write `Result<T>`.
pub type Result<T> = std::result::Result<T, PairError>;
