//! Runtime configuration.
//!
//! The only runtime knob is the dispatch tier. It is read from the
//! environment once, the first time [`Tier::active`] is needed:
//!
//! | Variable        | Values                                   | Default |
//! |-----------------|------------------------------------------|---------|
//! | `LAZYSIMD_TIER` | `auto`, `avx`, `sse2`, `neon`, `scalar`  | `auto`  |
//!
//! Which tiers exist at all is decided at build time: the build script reads
//! `LAZYSIMD_MAX_TIER` (same values minus `auto`) and compiles in only the
//! kernels at or below that tier.

use std::str::FromStr;

use crate::error::{config_error, LazySimdError, Result};
use crate::simd::{CpuFeatures, Tier};

/// Environment variable selecting the dispatch tier.
pub const TIER_ENV: &str = "LAZYSIMD_TIER";

/// How the dispatch tier should be chosen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TierPreference {
    /// Widest tier the CPU supports.
    #[default]
    Auto,
    /// A specific tier, used when supported.
    Fixed(Tier),
}

impl FromStr for TierPreference {
    type Err = LazySimdError;

    fn from_str(s: &str) -> Result<Self> {
        let value = s.trim();

        if value.is_empty() || value.eq_ignore_ascii_case("auto") {
            return Ok(TierPreference::Auto);
        }

        value
            .parse::<Tier>()
            .map(TierPreference::Fixed)
            .map_err(|_| {
                config_error(
                    TIER_ENV,
                    s,
                    "expected one of auto, avx, sse2, neon, scalar",
                )
            })
    }
}

/// Engine configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Config {
    pub tier: TierPreference,
}

impl Config {
    /// Reads the configuration from the process environment.
    ///
    /// # Errors
    ///
    /// [`ConfigError`](LazySimdError::ConfigError) if a variable is set to an
    /// unrecognized value.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Reads the configuration through `lookup`, which maps a variable name to
    /// its value.
    ///
    /// # Errors
    ///
    /// Same conditions as [`Config::from_env`].
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let tier = match lookup(TIER_ENV) {
            Some(value) => value.parse()?,
            None => TierPreference::Auto,
        };

        Ok(Self { tier })
    }

    /// Picks the tier to run with on a CPU reporting `features`.
    ///
    /// A fixed tier that is not compiled in or not supported by `features`
    /// is replaced by [`Tier::best`], with a warning.
    pub fn resolve(&self, features: &CpuFeatures) -> Tier {
        match self.tier {
            TierPreference::Auto => Tier::best(features),
            TierPreference::Fixed(tier) if tier.is_compiled() && features.supports(tier) => tier,
            TierPreference::Fixed(tier) => {
                let fallback = Tier::best(features);
                log::warn!(
                    "{TIER_ENV}={tier} is not available on this machine, falling back to {fallback}"
                );
                fallback
            }
        }
    }
}
