//! End-to-end evaluation of lazy expressions on the active dispatch tier.
//!
//! Results are compared against plain scalar loops that apply the same
//! operations in the same order, so floating-point results must match exactly.

use lazysimd::{LazySimdError, NaiveVector, Vector};

fn ramp(len: usize, scale: f64) -> Vector<f64> {
    Vector::<f64>::from_fn(len, |i| scale * i as f64).unwrap()
}

#[test]
fn test_vector_addition_scenario() {
    let v = ramp(10, 1.0);
    let w = ramp(10, 2.0);
    let mut u = Vector::<f64>::new(10).unwrap();

    u.assign(&v + &w).unwrap();

    let expected: Vec<f64> = (0..10).map(|i| 3.0 * i as f64).collect();
    assert_eq!(u.as_slice(), expected.as_slice());
    assert_eq!(u.to_string(), "[0, 3, 6, 9, 12, 15, 18, 21, 24, 27]");
}

#[test]
fn test_sum_of_squares_across_sizes() {
    let width = Vector::<f64>::dispatch_width();
    let mut sizes = vec![0, 1, width.saturating_sub(1), width, width + 1, 10, 1_000_000];
    sizes.dedup();

    for n in sizes {
        let a = Vector::<f64>::from_fn(n, |i| (i % 97) as f64 * 0.5).unwrap();
        let b = Vector::<f64>::from_fn(n, |i| (i % 13) as f64 - 6.0).unwrap();
        let c = Vector::<f64>::from_fn(n, |i| 1.0 / (1 + i % 7) as f64).unwrap();
        let d = Vector::<f64>::from_elem(n, 0.1).unwrap();

        let mut r = Vector::<f64>::new(n).unwrap();
        r.assign(&a * &a + &b * &b + &c * &c + &d * &d).unwrap();

        for i in 0..n {
            let expected = a[i] * a[i] + b[i] * b[i] + c[i] * c[i] + d[i] * d[i];
            assert_eq!(r[i], expected, "n = {n}, i = {i}");
        }
    }
}

#[test]
fn test_f32_sum_of_squares_matches_naive() {
    let n = 1_003;
    let x = NaiveVector::from_fn(n, |i| i as f32 * 0.25);
    let y = NaiveVector::from_fn(n, |i| (n - i) as f32);

    let naive = &x * &x + &y * &y;

    let vx = Vector::<f32>::from_slice(x.as_slice()).unwrap();
    let vy = Vector::<f32>::from_slice(y.as_slice()).unwrap();
    let lazy = Vector::<f32>::from_expr(&vx * &vx + &vy * &vy).unwrap();

    assert_eq!(lazy.as_slice(), naive.as_slice());
}

#[test]
fn test_chained_expression_is_exact_on_powers_of_two() {
    let n = 37;
    let a = Vector::<f64>::from_fn(n, |i| (1u64 << (i % 20)) as f64).unwrap();
    let b = Vector::<f64>::from_fn(n, |i| 1.0 / (1u64 << (i % 8)) as f64).unwrap();
    let c = Vector::<f64>::from_elem(n, 4.0).unwrap();

    let mut r = Vector::<f64>::new(n).unwrap();
    r.assign((&a + &b) * &c + &a * &b).unwrap();

    for i in 0..n {
        assert_eq!(r[i], (a[i] + b[i]) * c[i] + a[i] * b[i], "i = {i}");
    }
}

#[test]
fn test_tail_element_is_computed() {
    let width = Vector::<f64>::dispatch_width();
    let n = width + 1;

    let a = Vector::<f64>::from_fn(n, |i| i as f64 + 1.0).unwrap();
    let mut r = Vector::<f64>::from_elem(n, -1.0).unwrap();
    r.assign(&a * &a).unwrap();

    assert_eq!(r[n - 1], (n * n) as f64);
    assert!(r.iter().all(|&x| x > 0.0));
}

#[test]
fn test_in_place_update_matches_temporary() {
    let n = 21;
    let w = ramp(n, 0.5);

    let mut in_place = ramp(n, 1.0);
    let mut temporary = Vector::<f64>::new(n).unwrap();
    {
        let before = in_place.try_clone().unwrap();
        temporary.assign(&before + &w).unwrap();
    }

    in_place.update(|u| u + &w).unwrap();
    assert_eq!(in_place, temporary);

    let mut via_operator = ramp(n, 1.0);
    via_operator += &w;
    assert_eq!(via_operator, temporary);
}

#[test]
fn test_in_place_update_reading_destination_twice() {
    let mut u = Vector::<i64>::from_slice(&[1, 2, 3, 4, 5, 6, 7]).unwrap();
    let w = Vector::<i64>::from_elem(7, 3).unwrap();

    u.update(|cur| cur * cur + cur * &w).unwrap();
    assert_eq!(u.as_slice(), &[4, 10, 18, 28, 40, 54, 70]);
}

#[test]
fn test_destination_length_mismatch() {
    let a = ramp(8, 1.0);
    let b = ramp(8, 1.0);
    let mut r = Vector::<f64>::new(7).unwrap();

    match r.assign(&a + &b) {
        Err(LazySimdError::ShapeMismatch { expected, actual }) => {
            assert_eq!(expected, 7);
            assert_eq!(actual, 8);
        }
        other => panic!("expected a shape mismatch, got {other:?}"),
    }
}

#[test]
fn test_integer_vectors() {
    let a = Vector::<u32>::from_fn(9, |i| i as u32).unwrap();
    let b = Vector::<u32>::from_elem(9, 2).unwrap();

    let r = Vector::<u32>::from_expr(&a * &b + &b).unwrap();
    assert_eq!(r.as_slice(), &[2, 4, 6, 8, 10, 12, 14, 16, 18]);
}
