//! Fixed-length vector backed by an aligned buffer.

use std::fmt;
use std::ops::{AddAssign, Index, IndexMut, MulAssign};

use crate::buffer::AlignedBuffer;
use crate::error::{shape_mismatch, validation_error, LazySimdError, Result};
use crate::expr::{Current, Expression};
use crate::simd::{Element, Tier};
use crate::DEFAULT_ALIGNMENT;

/// A fixed-length vector of `T` whose storage starts on an `A`-byte boundary.
///
/// Arithmetic between vectors is lazy: `&a + &b` builds an
/// [`Expression`](crate::Expression) and nothing is computed until it is passed
/// to [`assign`](Vector::assign), which evaluates the whole tree in one pass
/// using the widest SIMD tier available.
///
/// The default alignment of 32 bytes suits 256-bit AVX registers; any power of
/// two at least `align_of::<T>()` is accepted.
///
/// # Examples
///
/// ```
/// use lazysimd::Vector;
///
/// let v = Vector::<f64>::from_fn(10, |i| i as f64)?;
/// let w = Vector::<f64>::from_fn(10, |i| 2.0 * i as f64)?;
///
/// let mut u = Vector::<f64>::new(10)?;
/// u.assign(&v + &w)?;
///
/// assert_eq!(u[9], 27.0);
/// # Ok::<(), lazysimd::LazySimdError>(())
/// ```
pub struct Vector<T: Element, const A: usize = { DEFAULT_ALIGNMENT }> {
    buffer: AlignedBuffer<T>,
}

impl<T: Element, const A: usize> Vector<T, A> {
    /// Creates a vector of `len` zeros.
    ///
    /// # Errors
    ///
    /// [`LayoutError`](LazySimdError::LayoutError) if `A` is not a valid
    /// alignment for `T` or the byte size overflows;
    /// [`AllocationError`](LazySimdError::AllocationError) if the allocator
    /// fails.
    pub fn new(len: usize) -> Result<Self> {
        Ok(Self {
            buffer: AlignedBuffer::allocate(len, A)?,
        })
    }

    /// Creates a vector of `len` copies of `value`.
    ///
    /// # Errors
    ///
    /// Same as [`Vector::new`].
    pub fn from_elem(len: usize, value: T) -> Result<Self> {
        Ok(Self {
            buffer: AlignedBuffer::allocate_filled(len, A, value)?,
        })
    }

    /// Creates a vector holding a copy of `data`.
    ///
    /// # Errors
    ///
    /// Same as [`Vector::new`].
    pub fn from_slice(data: &[T]) -> Result<Self> {
        Ok(Self {
            buffer: AlignedBuffer::from_slice(data, A)?,
        })
    }

    /// Creates a vector whose element `i` is `f(i)`.
    ///
    /// # Errors
    ///
    /// Same as [`Vector::new`].
    pub fn from_fn<F>(len: usize, mut f: F) -> Result<Self>
    where
        F: FnMut(usize) -> T,
    {
        let mut vector = Self::new(len)?;
        for (i, slot) in vector.as_mut_slice().iter_mut().enumerate() {
            *slot = f(i);
        }
        Ok(vector)
    }

    /// Evaluates `expr` into a freshly allocated vector.
    ///
    /// The length is taken from the expression's sized operands.
    ///
    /// # Errors
    ///
    /// [`ValidationError`](LazySimdError::ValidationError) if the expression
    /// has no sized operand, plus everything [`Vector::assign`] reports.
    pub fn from_expr<E>(expr: E) -> Result<Self>
    where
        E: Expression<Elem = T>,
    {
        let len = expr
            .leaf_len()
            .ok_or_else(|| validation_error("expression has no operand to take a length from"))?;

        let mut vector = Self::new(len)?;
        vector.assign(expr)?;
        Ok(vector)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    /// Alignment of the storage in bytes.
    #[inline]
    pub const fn alignment(&self) -> usize {
        A
    }

    /// Elements processed per chunk by [`assign`](Vector::assign) on this
    /// machine.
    pub fn dispatch_width() -> usize {
        T::lanes(Tier::active())
    }

    #[inline]
    pub fn as_slice(&self) -> &[T] {
        self.buffer.as_slice()
    }

    #[inline]
    pub fn as_mut_slice(&mut self) -> &mut [T] {
        self.buffer.as_mut_slice()
    }

    #[inline]
    pub fn as_ptr(&self) -> *const T {
        self.buffer.as_ptr()
    }

    #[inline]
    pub fn as_mut_ptr(&mut self) -> *mut T {
        self.buffer.as_mut_ptr()
    }

    #[inline]
    pub fn get(&self, index: usize) -> Option<T> {
        self.as_slice().get(index).copied()
    }

    /// Returns element `index` without a bounds check in release builds.
    ///
    /// # Safety
    ///
    /// `index` must be less than `self.len()`.
    #[inline(always)]
    pub unsafe fn get_unchecked(&self, index: usize) -> T {
        debug_assert!(index < self.len(), "index {index} out of bounds");
        *self.as_ptr().add(index)
    }

    /// Returns a mutable reference to element `index` without a bounds check
    /// in release builds.
    ///
    /// # Safety
    ///
    /// `index` must be less than `self.len()`.
    #[inline(always)]
    pub unsafe fn get_unchecked_mut(&mut self, index: usize) -> &mut T {
        debug_assert!(index < self.len(), "index {index} out of bounds");
        &mut *self.as_mut_ptr().add(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.as_slice().iter()
    }

    /// Evaluates `expr` into this vector using [`Tier::active`].
    ///
    /// No allocation takes place; the existing storage is overwritten.
    ///
    /// # Errors
    ///
    /// [`ShapeMismatch`](LazySimdError::ShapeMismatch) if an operand's length
    /// differs from `self.len()`. Nothing is written in that case.
    pub fn assign<E>(&mut self, expr: E) -> Result<()>
    where
        E: Expression<Elem = T>,
    {
        self.assign_with_tier(Tier::active(), expr)
    }

    /// Evaluates `expr` into this vector using an explicit `tier`.
    ///
    /// # Errors
    ///
    /// [`UnsupportedTier`](LazySimdError::UnsupportedTier) if `tier` is not
    /// compiled in or not supported by the CPU, plus everything
    /// [`Vector::assign`] reports.
    pub fn assign_with_tier<E>(&mut self, tier: Tier, expr: E) -> Result<()>
    where
        E: Expression<Elem = T>,
    {
        if !tier.is_supported() {
            return Err(LazySimdError::UnsupportedTier { tier });
        }

        let len = self.len();
        expr.check_len(len)?;

        if len == 0 {
            return Ok(());
        }

        log::trace!(
            "evaluating {len} x {} with {tier} ({} lanes)",
            std::any::type_name::<T>(),
            T::lanes(tier)
        );

        // SAFETY: `tier` is supported, the buffer holds `len` initialized
        // elements and every sized leaf was checked to hold `len` as well.
        unsafe { T::evaluate(tier, &expr, self.as_mut_ptr(), len) };
        Ok(())
    }

    /// Evaluates an expression that reads this vector's current values.
    ///
    /// `build` receives a [`Current`] leaf standing for `self`:
    ///
    /// ```
    /// use lazysimd::Vector;
    ///
    /// let mut u = Vector::<f64>::from_elem(5, 1.0)?;
    /// let w = Vector::<f64>::from_elem(5, 2.0)?;
    ///
    /// u.update(|cur| cur * &w + &w)?;
    /// assert_eq!(u.as_slice(), &[4.0; 5]);
    /// # Ok::<(), lazysimd::LazySimdError>(())
    /// ```
    ///
    /// # Errors
    ///
    /// Same as [`Vector::assign`].
    pub fn update<F, E>(&mut self, build: F) -> Result<()>
    where
        F: FnOnce(Current<T>) -> E,
        E: Expression<Elem = T>,
    {
        let expr = build(Current::new());
        self.assign(expr)
    }

    /// Copies every element of `other` into this vector.
    ///
    /// # Errors
    ///
    /// [`ShapeMismatch`](LazySimdError::ShapeMismatch) if the lengths differ.
    pub fn copy_from<const B: usize>(&mut self, other: &Vector<T, B>) -> Result<()> {
        if other.len() != self.len() {
            return Err(shape_mismatch(self.len(), other.len()));
        }
        self.as_mut_slice().copy_from_slice(other.as_slice());
        Ok(())
    }

    /// Deep copy into a new allocation.
    ///
    /// # Errors
    ///
    /// [`AllocationError`](LazySimdError::AllocationError) if the allocator
    /// fails.
    pub fn try_clone(&self) -> Result<Self> {
        Ok(Self {
            buffer: self.buffer.try_clone()?,
        })
    }
}

impl<T: Element, const A: usize> Index<usize> for Vector<T, A> {
    type Output = T;

    #[inline]
    fn index(&self, index: usize) -> &T {
        &self.as_slice()[index]
    }
}

impl<T: Element, const A: usize> IndexMut<usize> for Vector<T, A> {
    #[inline]
    fn index_mut(&mut self, index: usize) -> &mut T {
        &mut self.as_mut_slice()[index]
    }
}

/// `v += expr` is `v.update(|cur| cur + expr)`.
///
/// # Panics
///
/// Panics if an operand's length differs from `v.len()`. Use
/// [`Vector::update`] to get the error instead.
impl<T: Element, const A: usize, E> AddAssign<E> for Vector<T, A>
where
    E: Expression<Elem = T>,
{
    fn add_assign(&mut self, rhs: E) {
        if let Err(err) = self.update(|cur| cur + rhs) {
            panic!("{err}");
        }
    }
}

/// `v *= expr` is `v.update(|cur| cur * expr)`.
///
/// # Panics
///
/// Panics if an operand's length differs from `v.len()`.
impl<T: Element, const A: usize, E> MulAssign<E> for Vector<T, A>
where
    E: Expression<Elem = T>,
{
    fn mul_assign(&mut self, rhs: E) {
        if let Err(err) = self.update(|cur| cur * rhs) {
            panic!("{err}");
        }
    }
}

impl<T: Element, const A: usize> AsRef<[T]> for Vector<T, A> {
    fn as_ref(&self) -> &[T] {
        self.as_slice()
    }
}

impl<T: Element, const A: usize> AsMut<[T]> for Vector<T, A> {
    fn as_mut(&mut self) -> &mut [T] {
        self.as_mut_slice()
    }
}

impl<'v, T: Element, const A: usize> IntoIterator for &'v Vector<T, A> {
    type Item = &'v T;
    type IntoIter = std::slice::Iter<'v, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<T: Element, const A: usize, const B: usize> PartialEq<Vector<T, B>> for Vector<T, A> {
    fn eq(&self, other: &Vector<T, B>) -> bool {
        self.as_slice() == other.as_slice()
    }
}

impl<T: Element, const A: usize> fmt::Debug for Vector<T, A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Vector")
            .field("len", &self.len())
            .field("alignment", &A)
            .field("data", &self.as_slice())
            .finish()
    }
}

impl<T: Element, const A: usize> fmt::Display for Vector<T, A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[")?;
        for (i, value) in self.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{value}")?;
        }
        f.write_str("]")
    }
}
