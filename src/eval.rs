use crate::expr::Expression;
use crate::simd::{Element, SimdTraits};

/// Evaluates `expr` into `dst[0..len]` with strategy `D`.
///
/// Positions `[0, len - len % WIDTH)` are computed a packet at a time; the
/// remaining `len % WIDTH` positions go through the scalar path, each exactly
/// once. Position `i` is read before it is written, which keeps
/// [`Current`](crate::expr::Current) leaves correct.
///
/// # Safety
///
/// - `D` must be supported by the running CPU
/// - `dst` must be valid for reads and writes of `len` elements
/// - every sized leaf of `expr` must hold exactly `len` elements
#[inline(always)]
pub(crate) unsafe fn evaluate<D, T, E>(expr: &E, dst: *mut T, len: usize)
where
    D: SimdTraits<T>,
    T: Element,
    E: Expression<Elem = T>,
{
    let width = D::WIDTH;
    let main = len - len % width;

    let mut i = 0;
    while i < main {
        let packet = expr.packet::<D>(dst, i);
        D::store(dst.add(i), packet);
        i += width;
    }

    while i < len {
        *dst.add(i) = expr.scalar(dst, i);
        i += 1;
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;

    use super::*;
    use crate::error::Result;
    use crate::simd::Scalar;

    /// Four-lane strategy on plain arrays, for exercising chunking on any host.
    struct Lanes4;

    impl SimdTraits<f64> for Lanes4 {
        type Packet = [f64; 4];

        const WIDTH: usize = 4;

        unsafe fn load(ptr: *const f64) -> [f64; 4] {
            std::ptr::read_unaligned(ptr as *const [f64; 4])
        }

        unsafe fn store(ptr: *mut f64, packet: [f64; 4]) {
            std::ptr::write_unaligned(ptr as *mut [f64; 4], packet)
        }

        unsafe fn add(a: [f64; 4], b: [f64; 4]) -> [f64; 4] {
            std::array::from_fn(|i| a[i] + b[i])
        }

        unsafe fn mul(a: [f64; 4], b: [f64; 4]) -> [f64; 4] {
            std::array::from_fn(|i| a[i] * b[i])
        }
    }

    /// Leaf that counts how it is visited and returns `offset + 1`.
    struct CountingLeaf {
        len: usize,
        packets: Cell<usize>,
        scalars: Cell<usize>,
        visited: Cell<Vec<usize>>,
    }

    impl CountingLeaf {
        fn new(len: usize) -> Self {
            Self {
                len,
                packets: Cell::new(0),
                scalars: Cell::new(0),
                visited: Cell::new(Vec::new()),
            }
        }

        fn visit(&self, offset: usize) {
            let mut visited = self.visited.take();
            visited.push(offset);
            self.visited.set(visited);
        }
    }

    impl crate::expr::sealed::Sealed for CountingLeaf {}

    impl Expression for CountingLeaf {
        type Elem = f64;

        fn leaf_len(&self) -> Option<usize> {
            Some(self.len)
        }

        fn check_len(&self, _expected: usize) -> Result<()> {
            Ok(())
        }

        unsafe fn packet<D: SimdTraits<f64>>(&self, _dst: *const f64, offset: usize) -> D::Packet {
            self.packets.set(self.packets.get() + 1);
            self.visit(offset);
            let values: Vec<f64> = (offset..offset + D::WIDTH).map(|i| (i + 1) as f64).collect();
            D::load(values.as_ptr())
        }

        unsafe fn scalar(&self, _dst: *const f64, offset: usize) -> f64 {
            self.scalars.set(self.scalars.get() + 1);
            self.visit(offset);
            (offset + 1) as f64
        }
    }

    fn run<D: SimdTraits<f64>>(leaf: &CountingLeaf) -> Vec<f64> {
        let mut out = vec![0.0; leaf.len];
        unsafe { evaluate::<D, f64, CountingLeaf>(leaf, out.as_mut_ptr(), leaf.len) };
        out
    }

    #[test]
    fn test_one_past_width_takes_one_scalar_step() {
        let leaf = CountingLeaf::new(5);
        let out = run::<Lanes4>(&leaf);

        assert_eq!(out, vec![1.0, 2.0, 3.0, 4.0, 5.0]);
        assert_eq!(leaf.packets.get(), 1);
        assert_eq!(leaf.scalars.get(), 1);
    }

    #[test]
    fn test_every_position_visited_once() {
        for len in [0, 1, 3, 4, 8, 10, 13] {
            let leaf = CountingLeaf::new(len);
            let out = run::<Lanes4>(&leaf);

            let expected: Vec<f64> = (1..=len).map(|i| i as f64).collect();
            assert_eq!(out, expected, "len {len}");
            assert_eq!(leaf.packets.get(), len / 4, "len {len}");
            assert_eq!(leaf.scalars.get(), len % 4, "len {len}");

            let chunk_starts = (0..len - len % 4).step_by(4);
            let tail = len - len % 4..len;
            let expected_order: Vec<usize> = chunk_starts.chain(tail).collect();
            assert_eq!(leaf.visited.take(), expected_order, "len {len}");
        }
    }

    #[test]
    fn test_scalar_strategy_never_packs_more_than_one() {
        let leaf = CountingLeaf::new(7);
        let out = run::<Scalar>(&leaf);

        assert_eq!(out, vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0]);
        assert_eq!(leaf.packets.get(), 7);
        assert_eq!(leaf.scalars.get(), 0);
    }
}
