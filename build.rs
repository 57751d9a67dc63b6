use std::cmp::Ordering;
use std::env;

// SIMD tiers this crate can compile evaluation kernels for
#[derive(PartialEq, Eq, Debug)]
struct TierFeature {
    name: &'static str,
    arches: &'static [&'static str],
    cfg_flag: &'static str,
    enabled: bool,
}

impl TierFeature {
    // Define priority order between tiers (Lowest number == Highest Priority)
    fn priority(&self) -> usize {
        priority_of(self.name)
    }

    fn features() -> Vec<TierFeature> {
        vec![
            TierFeature {
                name: "sse2",
                arches: &["x86", "x86_64"],
                cfg_flag: "lazysimd_sse2",
                enabled: false,
            },
            TierFeature {
                name: "avx",
                arches: &["x86", "x86_64"],
                cfg_flag: "lazysimd_avx",
                enabled: false,
            },
            TierFeature {
                name: "neon",
                arches: &["aarch64"],
                cfg_flag: "lazysimd_neon",
                enabled: false,
            },
        ]
    }
}

fn priority_of(name: &str) -> usize {
    match name {
        "avx" => 0,
        "sse2" | "neon" => 1,
        _ => usize::MAX, // scalar: lowest priority
    }
}

impl Ord for TierFeature {
    fn cmp(&self, other: &Self) -> Ordering {
        self.priority().cmp(&other.priority())
    }
}

impl PartialOrd for TierFeature {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

// Reads the optional build-time cap on compiled tiers
fn max_tier_priority() -> usize {
    match env::var("LAZYSIMD_MAX_TIER") {
        Ok(value) => {
            let value = value.trim().to_lowercase();
            match value.as_str() {
                "avx" | "sse2" | "neon" | "scalar" => priority_of(&value),
                _ => {
                    println!("cargo:warning=ignoring unknown LAZYSIMD_MAX_TIER value `{value}`");
                    0
                }
            }
        }
        Err(_) => 0,
    }
}

fn apply(features: &mut [TierFeature]) {
    let arch = env::var("CARGO_CFG_TARGET_ARCH").unwrap_or_default();
    let cap = max_tier_priority();

    features.sort();

    for feature in features.iter_mut() {
        feature.enabled = feature.arches.contains(&arch.as_str()) && feature.priority() >= cap;

        if feature.enabled {
            println!("cargo:rustc-cfg={}", feature.cfg_flag);
        }
    }

    for feature in features.iter() {
        println!("cargo::rustc-check-cfg=cfg({})", feature.cfg_flag);
    }
}

fn main() {
    println!("cargo:rerun-if-changed=build.rs");
    println!("cargo:rerun-if-env-changed=LAZYSIMD_MAX_TIER");

    let mut features = TierFeature::features();
    apply(&mut features);
}
