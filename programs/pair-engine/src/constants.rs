/// Denominator for basis-point math (u128 to avoid up-cast noise)
pub const BPS_DENOMINATOR: u128 = 10_000;

/// Default swap fee: 0.25 %
pub const DEFAULT_FEE_BPS: u16 = 25;

/// Default protocol cut of every swap fee: 20 % of the fee, the rest goes to LPs
pub const DEFAULT_PROTOCOL_FEE_SHARE_BPS: u16 = 2_000;

/// Declared-volume divisor applied client-side before encryption (1 = exact)
pub const DEFAULT_VOLUME_DIVISOR: u64 = 1;

/// Fixed-point scale of the fee-per-share accumulators (1e36)
pub const PRECISION: u128 = 1_000_000_000_000_000_000_000_000_000_000_000_000;

/// Domain tag mixed into every proof-of-encryption transcript
pub const VOLUME_PROOF_DOMAIN: &[u8] = b"pair-engine/volume-declaration/v1";

/// Environment variables read by `PairConfig::from_env`
pub const ENV_FEE_BPS: &str = "PAIR_FEE_BPS";
pub const ENV_PROTOCOL_FEE_SHARE_BPS: &str = "PAIR_PROTOCOL_FEE_SHARE_BPS";
pub const ENV_VOLUME_DIVISOR: &str = "PAIR_VOLUME_DIVISOR";
