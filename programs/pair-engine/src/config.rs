//! Pair configuration.
//!
//! Kept small and explicit:
//! - swap fee rate
//! - protocol cut of that fee
//! - the coarse-graining divisor for confidential volume declarations
//!
//! Loaded from JSON or from `PAIR_*` environment variables; every source goes
//! through [`PairConfig::validate`] before a pair accepts it.

use std::env;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::constants::*;
use crate::error::{PairError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PairConfig {
    /// Swap fee in basis points of amount-in (e.g. 25 = 0.25 %).
    pub fee_bps: u16,
    /// Portion of each swap fee routed to the fee recipient, in basis points
    /// of the fee. The remainder is distributed to liquidity providers.
    pub protocol_fee_share_bps: u16,
    /// Clients divide declared trade sizes by this before encrypting them.
    ///
    /// 1 keeps declarations bit-exact. Larger values trade precision for
    /// a narrower plaintext range. Settlement never reads it.
    pub volume_divisor: u64,
}

impl Default for PairConfig {
    fn default() -> Self {
        Self {
            fee_bps:                DEFAULT_FEE_BPS,
            protocol_fee_share_bps: DEFAULT_PROTOCOL_FEE_SHARE_BPS,
            volume_divisor:         DEFAULT_VOLUME_DIVISOR,
        }
    }
}

impl PairConfig {
    /// Parse a config from JSON; missing fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self =
            serde_json::from_str(json).map_err(|e| PairError::InvalidConfig(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Build a config from `PAIR_FEE_BPS`, `PAIR_PROTOCOL_FEE_SHARE_BPS` and
    /// `PAIR_VOLUME_DIVISOR`; unset variables keep their defaults.
    pub fn from_env() -> Result<Self> {
        let defaults = Self::default();
        let config = Self {
            fee_bps:                env_or(ENV_FEE_BPS, defaults.fee_bps)?,
            protocol_fee_share_bps: env_or(ENV_PROTOCOL_FEE_SHARE_BPS, defaults.protocol_fee_share_bps)?,
            volume_divisor:         env_or(ENV_VOLUME_DIVISOR, defaults.volume_divisor)?,
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.fee_bps as u128 >= BPS_DENOMINATOR {
            return Err(PairError::InvalidConfig(format!(
                "fee_bps must be below {BPS_DENOMINATOR}, got {}",
                self.fee_bps
            )));
        }
        if self.protocol_fee_share_bps as u128 > BPS_DENOMINATOR {
            return Err(PairError::InvalidConfig(format!(
                "protocol_fee_share_bps must be at most {BPS_DENOMINATOR}, got {}",
                self.protocol_fee_share_bps
            )));
        }
        if self.volume_divisor == 0 {
            return Err(PairError::InvalidConfig("volume_divisor must be at least 1".into()));
        }
        Ok(())
    }
}

fn env_or<T: FromStr>(key: &str, default: T) -> Result<T>
where
    T::Err: std::fmt::Display,
{
    match env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map_err(|e| PairError::InvalidConfig(format!("{key}={raw}: {e}"))),
        Err(env::VarError::NotPresent) => Ok(default),
        Err(e) => Err(PairError::InvalidConfig(format!("{key}: {e}"))),
    }
}
