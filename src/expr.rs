//! Deferred elementwise expressions.
//!
//! `&a + &b` does not compute anything: it returns a [`Sum`] holding the two
//! borrowed operands. Further operators nest nodes by value, so
//! `&a * &a + &b * &b` is a `Sum<Product<&Vector, &Vector>, Product<...>>`
//! whose shape is known at compile time. The whole tree is evaluated in one
//! pass when it is assigned into a [`Vector`]:
//!
//! ```
//! use lazysimd::Vector;
//!
//! let a = Vector::<f64>::from_fn(6, |i| i as f64)?;
//! let b = Vector::<f64>::from_elem(6, 2.0)?;
//!
//! let mut out = Vector::<f64>::new(6)?;
//! out.assign(&a * &a + &b)?;
//!
//! assert_eq!(out.as_slice(), &[2.0, 3.0, 6.0, 11.0, 18.0, 27.0]);
//! # Ok::<(), lazysimd::LazySimdError>(())
//! ```
//!
//! Every node borrows its leaves for `'a`, so an expression can never outlive
//! the vectors it reads, and it cannot be assigned into one of them either:
//! the destination is borrowed mutably for the duration of the assignment.
//! In-place forms such as `u = u + w` go through [`Vector::update`], which
//! hands the closure a [`Current`] leaf standing for the destination.

use std::marker::PhantomData;
use std::ops::{Add, Mul};

use crate::error::{shape_mismatch, Result};
use crate::simd::{Element, SimdTraits};
use crate::vector::Vector;

pub(crate) mod sealed {
    /// Closes [`Expression`](super::Expression) to the node types of this crate.
    pub trait Sealed {}
}

/// A value-producing node of a deferred elementwise computation.
///
/// Implemented by vector references (leaves), [`Current`] (the destination as
/// a leaf) and the composite nodes [`Sum`] and [`Product`]. The trait is
/// sealed: [`Vector::assign`] trusts `check_len` before running the unsafe
/// evaluation loop, so outside types cannot implement it.
///
/// ```compile_fail
/// use lazysimd::{Expression, Result, SimdTraits};
///
/// struct Ones(usize);
///
/// impl Expression for Ones {
///     type Elem = f64;
///
///     fn leaf_len(&self) -> Option<usize> {
///         Some(self.0)
///     }
///
///     fn check_len(&self, _expected: usize) -> Result<()> {
///         Ok(())
///     }
///
///     unsafe fn packet<D: SimdTraits<f64>>(&self, _dst: *const f64, _offset: usize) -> D::Packet {
///         D::load([1.0; 8].as_ptr())
///     }
///
///     unsafe fn scalar(&self, _dst: *const f64, _offset: usize) -> f64 {
///         1.0
///     }
/// }
/// ```
pub trait Expression: sealed::Sealed {
    /// Element type produced by every position.
    type Elem: Element;

    /// Length of the first sized leaf, or `None` if every leaf is [`Current`].
    fn leaf_len(&self) -> Option<usize>;

    /// Checks that every sized leaf holds exactly `expected` elements.
    ///
    /// # Errors
    ///
    /// [`ShapeMismatch`](crate::LazySimdError::ShapeMismatch) naming the first
    /// leaf whose length differs.
    fn check_len(&self, expected: usize) -> Result<()>;

    /// Computes `D::WIDTH` consecutive results starting at `offset`.
    ///
    /// # Safety
    ///
    /// - the strategy `D` must be supported by the running CPU
    /// - `offset + D::WIDTH` must not exceed the length passed to
    ///   [`check_len`](Expression::check_len)
    /// - `dst` must be valid for reads of that many elements
    #[doc(hidden)]
    unsafe fn packet<D: SimdTraits<Self::Elem>>(
        &self,
        dst: *const Self::Elem,
        offset: usize,
    ) -> D::Packet;

    /// Computes the single result at `offset`.
    ///
    /// # Safety
    ///
    /// Same pointer contract as [`packet`](Expression::packet) for one element.
    #[doc(hidden)]
    unsafe fn scalar(&self, dst: *const Self::Elem, offset: usize) -> Self::Elem;
}

impl<T: Element, const A: usize> sealed::Sealed for &Vector<T, A> {}

impl<'a, T: Element, const A: usize> Expression for &'a Vector<T, A> {
    type Elem = T;

    #[inline]
    fn leaf_len(&self) -> Option<usize> {
        Some(self.len())
    }

    #[inline]
    fn check_len(&self, expected: usize) -> Result<()> {
        match self.len() == expected {
            true => Ok(()),
            false => Err(shape_mismatch(expected, self.len())),
        }
    }

    #[inline(always)]
    unsafe fn packet<D: SimdTraits<T>>(&self, _dst: *const T, offset: usize) -> D::Packet {
        D::load(self.as_ptr().add(offset))
    }

    #[inline(always)]
    unsafe fn scalar(&self, _dst: *const T, offset: usize) -> T {
        *self.as_ptr().add(offset)
    }
}

/// The destination of an in-place assignment, used as an operand.
///
/// Only obtainable through [`Vector::update`]. Reading position `i` returns
/// the destination's value before position `i` is overwritten, so
/// `v.update(|cur| cur + &w)` computes exactly what `v + w` through a
/// temporary would.
#[derive(Debug, Clone, Copy)]
pub struct Current<T> {
    _elem: PhantomData<T>,
}

impl<T: Element> Current<T> {
    pub(crate) fn new() -> Self {
        Self { _elem: PhantomData }
    }
}

impl<T: Element> sealed::Sealed for Current<T> {}

impl<T: Element> Expression for Current<T> {
    type Elem = T;

    #[inline]
    fn leaf_len(&self) -> Option<usize> {
        None
    }

    #[inline]
    fn check_len(&self, _expected: usize) -> Result<()> {
        Ok(())
    }

    #[inline(always)]
    unsafe fn packet<D: SimdTraits<T>>(&self, dst: *const T, offset: usize) -> D::Packet {
        D::load(dst.add(offset))
    }

    #[inline(always)]
    unsafe fn scalar(&self, dst: *const T, offset: usize) -> T {
        *dst.add(offset)
    }
}

#[inline]
fn debug_assert_commensurate(lhs: Option<usize>, rhs: Option<usize>) {
    if let (Some(lhs), Some(rhs)) = (lhs, rhs) {
        debug_assert_eq!(lhs, rhs, "expression operands must have the same length");
    }
}

/// Elementwise `lhs + rhs`.
#[derive(Debug, Clone, Copy)]
pub struct Sum<L, R> {
    lhs: L,
    rhs: R,
}

impl<L, R> Sum<L, R>
where
    L: Expression,
    R: Expression<Elem = L::Elem>,
{
    /// Composes `lhs + rhs`.
    ///
    /// Debug builds assert that sized operands have equal lengths.
    /// [`Vector::assign`] checks them again in every build.
    pub fn new(lhs: L, rhs: R) -> Self {
        debug_assert_commensurate(lhs.leaf_len(), rhs.leaf_len());
        Self { lhs, rhs }
    }
}

impl<L, R> sealed::Sealed for Sum<L, R> {}

impl<L, R> Expression for Sum<L, R>
where
    L: Expression,
    R: Expression<Elem = L::Elem>,
{
    type Elem = L::Elem;

    #[inline]
    fn leaf_len(&self) -> Option<usize> {
        self.lhs.leaf_len().or_else(|| self.rhs.leaf_len())
    }

    #[inline]
    fn check_len(&self, expected: usize) -> Result<()> {
        self.lhs.check_len(expected)?;
        self.rhs.check_len(expected)
    }

    #[inline(always)]
    unsafe fn packet<D: SimdTraits<L::Elem>>(
        &self,
        dst: *const L::Elem,
        offset: usize,
    ) -> D::Packet {
        D::add(
            self.lhs.packet::<D>(dst, offset),
            self.rhs.packet::<D>(dst, offset),
        )
    }

    #[inline(always)]
    unsafe fn scalar(&self, dst: *const L::Elem, offset: usize) -> L::Elem {
        self.lhs.scalar(dst, offset) + self.rhs.scalar(dst, offset)
    }
}

/// Elementwise `lhs * rhs`.
#[derive(Debug, Clone, Copy)]
pub struct Product<L, R> {
    lhs: L,
    rhs: R,
}

impl<L, R> Product<L, R>
where
    L: Expression,
    R: Expression<Elem = L::Elem>,
{
    /// Composes `lhs * rhs`, with the same length contract as [`Sum::new`].
    pub fn new(lhs: L, rhs: R) -> Self {
        debug_assert_commensurate(lhs.leaf_len(), rhs.leaf_len());
        Self { lhs, rhs }
    }
}

impl<L, R> sealed::Sealed for Product<L, R> {}

impl<L, R> Expression for Product<L, R>
where
    L: Expression,
    R: Expression<Elem = L::Elem>,
{
    type Elem = L::Elem;

    #[inline]
    fn leaf_len(&self) -> Option<usize> {
        self.lhs.leaf_len().or_else(|| self.rhs.leaf_len())
    }

    #[inline]
    fn check_len(&self, expected: usize) -> Result<()> {
        self.lhs.check_len(expected)?;
        self.rhs.check_len(expected)
    }

    #[inline(always)]
    unsafe fn packet<D: SimdTraits<L::Elem>>(
        &self,
        dst: *const L::Elem,
        offset: usize,
    ) -> D::Packet {
        D::mul(
            self.lhs.packet::<D>(dst, offset),
            self.rhs.packet::<D>(dst, offset),
        )
    }

    #[inline(always)]
    unsafe fn scalar(&self, dst: *const L::Elem, offset: usize) -> L::Elem {
        self.lhs.scalar(dst, offset) * self.rhs.scalar(dst, offset)
    }
}

// `+` and `*` on every expression type build the next node up.
macro_rules! impl_ops {
    ($([$($gen:tt)*] $ty:ty),* $(,)?) => {$(
        impl<$($gen)*, Rhs> Add<Rhs> for $ty
        where
            $ty: Expression,
            Rhs: Expression<Elem = <$ty as Expression>::Elem>,
        {
            type Output = Sum<$ty, Rhs>;

            #[inline]
            fn add(self, rhs: Rhs) -> Self::Output {
                Sum::new(self, rhs)
            }
        }

        impl<$($gen)*, Rhs> Mul<Rhs> for $ty
        where
            $ty: Expression,
            Rhs: Expression<Elem = <$ty as Expression>::Elem>,
        {
            type Output = Product<$ty, Rhs>;

            #[inline]
            fn mul(self, rhs: Rhs) -> Self::Output {
                Product::new(self, rhs)
            }
        }
    )*};
}

impl_ops! {
    [L, R] Sum<L, R>,
    [L, R] Product<L, R>,
    [T: Element] Current<T>,
    ['a, T: Element, const A: usize] &'a Vector<T, A>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::LazySimdError;

    #[test]
    fn test_composition_computes_nothing() {
        let a = Vector::<f64>::from_elem(4, 1.0).unwrap();
        let b = Vector::<f64>::from_elem(4, 2.0).unwrap();

        let expr = &a + &b * &a;
        assert_eq!(expr.leaf_len(), Some(4));

        // operands are untouched until the expression is assigned
        assert_eq!(a.as_slice(), &[1.0; 4]);
        assert_eq!(b.as_slice(), &[2.0; 4]);
    }

    #[test]
    fn test_scalar_walk_follows_tree_shape() {
        let a = Vector::<i64>::from_slice(&[1, 2, 3]).unwrap();
        let b = Vector::<i64>::from_slice(&[10, 20, 30]).unwrap();

        let expr = (&a + &b) * &a;
        let values: Vec<i64> = (0..3)
            .map(|i| unsafe { expr.scalar(std::ptr::null(), i) })
            .collect();

        assert_eq!(values, vec![11, 44, 99]);
    }

    #[test]
    fn test_current_reads_destination() {
        let w = Vector::<f32>::from_slice(&[1.0, 1.0]).unwrap();
        let dst = [5.0f32, 7.0];

        let expr = Current::<f32>::new() * &w + Current::<f32>::new();
        assert_eq!(expr.leaf_len(), Some(2));
        assert_eq!(unsafe { expr.scalar(dst.as_ptr(), 1) }, 14.0);

        assert_eq!(Current::<f32>::new().leaf_len(), None);
    }

    #[test]
    fn test_check_len_reports_first_mismatch() {
        let a = Vector::<f64>::new(8).unwrap();
        let b = Vector::<f64>::new(8).unwrap();

        let expr = &a + &b;
        assert!(expr.check_len(8).is_ok());
        assert_eq!(
            expr.check_len(5),
            Err(LazySimdError::ShapeMismatch {
                expected: 5,
                actual: 8
            })
        );
    }

    #[cfg(debug_assertions)]
    #[test]
    #[should_panic(expected = "expression operands must have the same length")]
    fn test_mismatched_operands_panic_in_debug() {
        let a = Vector::<f64>::new(3).unwrap();
        let b = Vector::<f64>::new(4).unwrap();
        let _ = &a + &b;
    }
}
