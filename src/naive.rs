//! Eager reference vector.
//!
//! [`NaiveVector`] evaluates every operator immediately into a new heap
//! allocation, so `a * a + b * b` allocates three temporaries. It exists as a
//! baseline for benchmarks and as an independent reference in tests.

use std::ops::{Add, Index, IndexMut, Mul};

/// A `Vec`-backed vector whose arithmetic allocates one result per operator.
#[derive(Debug, Clone, PartialEq)]
pub struct NaiveVector<T> {
    data: Vec<T>,
}

impl<T: Copy> NaiveVector<T> {
    /// Creates a vector of `len` copies of `value`.
    pub fn from_elem(len: usize, value: T) -> Self {
        Self {
            data: vec![value; len],
        }
    }

    pub fn from_fn<F: FnMut(usize) -> T>(len: usize, f: F) -> Self {
        Self {
            data: (0..len).map(f).collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn as_slice(&self) -> &[T] {
        &self.data
    }

    /// Overwrites every element with the matching element of `other`.
    ///
    /// # Panics
    ///
    /// Panics if the lengths differ.
    pub fn assign_from(&mut self, other: &NaiveVector<T>) {
        self.data.copy_from_slice(&other.data);
    }

    fn zip_with(&self, other: &NaiveVector<T>, op: impl Fn(T, T) -> T) -> NaiveVector<T> {
        assert_eq!(
            self.len(),
            other.len(),
            "NaiveVector operands must have the same length"
        );

        NaiveVector {
            data: self
                .data
                .iter()
                .zip(&other.data)
                .map(|(&a, &b)| op(a, b))
                .collect(),
        }
    }
}

impl<T> From<Vec<T>> for NaiveVector<T> {
    fn from(data: Vec<T>) -> Self {
        Self { data }
    }
}

impl<T> Index<usize> for NaiveVector<T> {
    type Output = T;

    fn index(&self, index: usize) -> &T {
        &self.data[index]
    }
}

impl<T> IndexMut<usize> for NaiveVector<T> {
    fn index_mut(&mut self, index: usize) -> &mut T {
        &mut self.data[index]
    }
}

// Owned and borrowed operand combinations all go through `zip_with`.
macro_rules! impl_naive_op {
    ($trait:ident, $method:ident, $op:tt) => {
        impl<T> $trait<&NaiveVector<T>> for &NaiveVector<T>
        where
            T: Copy + $trait<Output = T>,
        {
            type Output = NaiveVector<T>;

            fn $method(self, rhs: &NaiveVector<T>) -> NaiveVector<T> {
                self.zip_with(rhs, |a, b| a $op b)
            }
        }

        impl<T> $trait<&NaiveVector<T>> for NaiveVector<T>
        where
            T: Copy + $trait<Output = T>,
        {
            type Output = NaiveVector<T>;

            fn $method(self, rhs: &NaiveVector<T>) -> NaiveVector<T> {
                &self $op rhs
            }
        }

        impl<T> $trait<NaiveVector<T>> for &NaiveVector<T>
        where
            T: Copy + $trait<Output = T>,
        {
            type Output = NaiveVector<T>;

            fn $method(self, rhs: NaiveVector<T>) -> NaiveVector<T> {
                self $op &rhs
            }
        }

        impl<T> $trait<NaiveVector<T>> for NaiveVector<T>
        where
            T: Copy + $trait<Output = T>,
        {
            type Output = NaiveVector<T>;

            fn $method(self, rhs: NaiveVector<T>) -> NaiveVector<T> {
                &self $op &rhs
            }
        }
    };
}

impl_naive_op!(Add, add, +);
impl_naive_op!(Mul, mul, *);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_eager_arithmetic() {
        let x = NaiveVector::from_fn(4, |i| i as f32);
        let y = NaiveVector::from_elem(4, 2.0f32);

        let z = &x * &x + &y * &y;
        assert_eq!(z.as_slice(), &[4.0, 5.0, 8.0, 13.0]);
    }

    #[test]
    fn test_owned_and_borrowed_operands() {
        let x = NaiveVector::from(vec![1, 2, 3]);
        let y = NaiveVector::from(vec![4, 5, 6]);

        let by_ref = &x + &y;
        assert_eq!(x.clone() + &y, by_ref);
        assert_eq!(&x + y.clone(), by_ref);
        assert_eq!(x.clone() + y.clone(), by_ref);

        assert_eq!((&x * y).as_slice(), &[4, 10, 18]);
    }

    #[test]
    fn test_assign_from_copies() {
        let source = NaiveVector::from(vec![1, 2, 3]);
        let mut target = NaiveVector::from_elem(3, 0);

        target.assign_from(&source);
        assert_eq!(target, source);

        target[0] = 100;
        assert_eq!(source[0], 1);
    }

    #[test]
    #[should_panic(expected = "same length")]
    fn test_mismatched_lengths_panic() {
        let a = NaiveVector::from_elem(2, 1.0f64);
        let b = NaiveVector::from_elem(3, 1.0f64);
        let _ = &a + &b;
    }
}
