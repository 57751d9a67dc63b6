use std::fmt::{Debug, Display};

use crate::expr::Expression;
use crate::simd::Tier;

/// Load/store/arithmetic primitives of one instruction set for one element type.
///
/// Implementors are zero-sized strategy types ([`Avx`](crate::simd::avx::Avx),
/// [`Sse2`](crate::simd::sse2::Sse2), [`Neon`](crate::simd::neon::Neon),
/// [`Scalar`](crate::simd::scalar::Scalar)). The evaluation loop is generic
/// over the strategy, so choosing one is a compile-time decision per
/// monomorphized kernel and a single `match` on [`Tier`] per assignment.
///
/// # Safety
///
/// All primitives are `unsafe`: they may execute instructions the running CPU
/// does not support, and `load`/`store` dereference raw pointers. Callers must
/// only use a strategy whose [`Tier`] is supported, and pointers must be valid
/// for `WIDTH` consecutive elements.
pub trait SimdTraits<T: Element> {
    /// Register type holding `WIDTH` lanes of `T`.
    type Packet: Copy;

    /// Number of lanes processed per instruction. Always at least 1.
    const WIDTH: usize;

    /// Loads `WIDTH` elements starting at `ptr`.
    ///
    /// # Safety
    ///
    /// `ptr` must be valid for reads of `WIDTH` elements.
    unsafe fn load(ptr: *const T) -> Self::Packet;

    /// Stores `WIDTH` elements starting at `ptr`.
    ///
    /// # Safety
    ///
    /// `ptr` must be valid for writes of `WIDTH` elements.
    unsafe fn store(ptr: *mut T, packet: Self::Packet);

    /// Lane-wise addition.
    ///
    /// # Safety
    ///
    /// The strategy's instruction set must be available.
    unsafe fn add(a: Self::Packet, b: Self::Packet) -> Self::Packet;

    /// Lane-wise multiplication.
    ///
    /// # Safety
    ///
    /// The strategy's instruction set must be available.
    unsafe fn mul(a: Self::Packet, b: Self::Packet) -> Self::Packet;
}

/// Scalar types a [`Vector`](crate::Vector) can hold.
///
/// Each element type knows which strategies it has SIMD primitives for and
/// routes an evaluation to the kernel compiled for the requested [`Tier`].
/// Types without SIMD primitives for a tier are evaluated by the scalar kernel.
pub trait Element:
    Copy + PartialEq + Debug + Display + num::Num + Send + Sync + 'static
{
    /// Lanes per chunk when evaluating with `tier`.
    fn lanes(tier: Tier) -> usize;

    /// Evaluates `expr` into `len` elements starting at `dst`.
    ///
    /// # Safety
    ///
    /// - `tier` must be supported by the build and the running CPU
    /// - `dst` must be valid for reads and writes of `len` elements
    /// - every sized leaf of `expr` must hold exactly `len` elements
    #[doc(hidden)]
    unsafe fn evaluate<E>(tier: Tier, expr: &E, dst: *mut Self, len: usize)
    where
        E: Expression<Elem = Self>;
}
