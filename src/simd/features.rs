use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

use crate::config::Config;
use crate::error::{config_error, LazySimdError};

/// Instruction-set extensions relevant to dispatch, as reported by the CPU
/// (or guaranteed by the compilation target).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CpuFeatures {
    pub sse: bool,
    pub sse2: bool,
    pub avx: bool,
    pub avx2: bool,
    pub avx512f: bool,
    pub neon: bool,
}

impl CpuFeatures {
    /// Queries the running CPU.
    pub fn detect() -> Self {
        #[cfg(any(target_arch = "x86", target_arch = "x86_64"))]
        {
            Self {
                sse: is_x86_feature_detected!("sse"),
                sse2: is_x86_feature_detected!("sse2"),
                avx: is_x86_feature_detected!("avx"),
                avx2: is_x86_feature_detected!("avx2"),
                avx512f: is_x86_feature_detected!("avx512f"),
                neon: false,
            }
        }

        #[cfg(target_arch = "aarch64")]
        {
            Self {
                neon: std::arch::is_aarch64_feature_detected!("neon"),
                ..Self::default()
            }
        }

        #[cfg(not(any(target_arch = "x86", target_arch = "x86_64", target_arch = "aarch64")))]
        {
            Self::default()
        }
    }

    /// Features the compilation target guarantees, independent of the host.
    pub fn compiled() -> Self {
        Self {
            sse: cfg!(target_feature = "sse"),
            sse2: cfg!(target_feature = "sse2"),
            avx: cfg!(target_feature = "avx"),
            avx2: cfg!(target_feature = "avx2"),
            avx512f: cfg!(target_feature = "avx512f"),
            neon: cfg!(target_feature = "neon"),
        }
    }

    /// Detected features, queried once per process.
    pub fn current() -> Self {
        static CURRENT: OnceLock<CpuFeatures> = OnceLock::new();
        *CURRENT.get_or_init(Self::detect)
    }

    /// Whether the instructions used by `tier` are present.
    pub fn supports(&self, tier: Tier) -> bool {
        match tier {
            Tier::Avx => self.avx,
            Tier::Sse2 => self.sse2,
            Tier::Neon => self.neon,
            Tier::Scalar => true,
        }
    }
}

impl fmt::Display for CpuFeatures {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let flag = |present: bool| if present { "yes" } else { "no" };
        write!(
            f,
            "sse={} sse2={} avx={} avx2={} avx512f={} neon={}",
            flag(self.sse),
            flag(self.sse2),
            flag(self.avx),
            flag(self.avx2),
            flag(self.avx512f),
            flag(self.neon)
        )
    }
}

/// Dispatch tier: the instruction set used to evaluate expressions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Tier {
    /// 256-bit AVX registers.
    Avx,
    /// 128-bit SSE2 registers.
    Sse2,
    /// 128-bit ARM NEON registers.
    Neon,
    /// Plain scalar arithmetic, one element at a time.
    Scalar,
}

impl Tier {
    /// All tiers, widest first.
    pub const ALL: [Tier; 4] = [Tier::Avx, Tier::Sse2, Tier::Neon, Tier::Scalar];

    pub fn name(self) -> &'static str {
        match self {
            Tier::Avx => "avx",
            Tier::Sse2 => "sse2",
            Tier::Neon => "neon",
            Tier::Scalar => "scalar",
        }
    }

    /// Register width in bits; `0` for the scalar tier.
    pub fn register_bits(self) -> usize {
        match self {
            Tier::Avx => 256,
            Tier::Sse2 | Tier::Neon => 128,
            Tier::Scalar => 0,
        }
    }

    /// Whether a kernel for this tier was compiled into the crate.
    pub fn is_compiled(self) -> bool {
        match self {
            Tier::Avx => cfg!(all(
                lazysimd_avx,
                any(target_arch = "x86", target_arch = "x86_64")
            )),
            Tier::Sse2 => cfg!(all(
                lazysimd_sse2,
                any(target_arch = "x86", target_arch = "x86_64")
            )),
            Tier::Neon => cfg!(all(lazysimd_neon, target_arch = "aarch64")),
            Tier::Scalar => true,
        }
    }

    /// Whether this tier is compiled in and the running CPU can execute it.
    pub fn is_supported(self) -> bool {
        self.is_compiled() && CpuFeatures::current().supports(self)
    }

    /// Widest compiled-in tier that `features` can execute.
    pub fn best(features: &CpuFeatures) -> Tier {
        Self::ALL
            .into_iter()
            .find(|tier| tier.is_compiled() && features.supports(*tier))
            .unwrap_or(Tier::Scalar)
    }

    /// Every tier usable on this machine, widest first. Always ends with
    /// [`Tier::Scalar`].
    pub fn supported() -> Vec<Tier> {
        Self::ALL
            .into_iter()
            .filter(|tier| tier.is_supported())
            .collect()
    }

    /// The tier used by [`Vector::assign`](crate::Vector::assign), selected on
    /// first use and fixed for the rest of the process.
    ///
    /// Selection honours the `LAZYSIMD_TIER` environment variable (see
    /// [`Config`]) and otherwise picks [`Tier::best`] for the detected CPU.
    pub fn active() -> Tier {
        static ACTIVE: OnceLock<Tier> = OnceLock::new();

        *ACTIVE.get_or_init(|| {
            let config = Config::from_env().unwrap_or_else(|err| {
                log::warn!("{err}; using automatic tier selection");
                Config::default()
            });

            let features = CpuFeatures::current();
            let tier = config.resolve(&features);

            log::info!("dispatch tier selected: {tier} (cpu: {features})");
            tier
        })
    }
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Tier {
    type Err = LazySimdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "avx" => Ok(Tier::Avx),
            "sse2" | "sse" => Ok(Tier::Sse2),
            "neon" => Ok(Tier::Neon),
            "scalar" | "fallback" => Ok(Tier::Scalar),
            _ => Err(config_error(
                "tier",
                s,
                "unknown dispatch tier (expected avx, sse2, neon or scalar)",
            )),
        }
    }
}
