//! Storage alignment guarantees of `AlignedBuffer` and `Vector`.

use lazysimd::{AlignedBuffer, LazySimdError, Vector, DEFAULT_ALIGNMENT};

#[test]
fn test_vector_storage_is_aligned_for_every_size() {
    for n in 0..=65 {
        let v = Vector::<f64>::new(n).unwrap();
        assert_eq!(v.as_ptr() as usize % DEFAULT_ALIGNMENT, 0, "n = {n}");

        let v = Vector::<f32, 64>::from_elem(n, 1.0).unwrap();
        assert_eq!(v.as_ptr() as usize % 64, 0, "n = {n}");
    }
}

#[test]
fn test_byte_size_rounds_up_to_alignment() {
    for (len, alignment, expected) in [(0, 32, 0), (1, 32, 32), (4, 32, 32), (5, 32, 64), (3, 16, 32)] {
        let buffer = AlignedBuffer::<f64>::allocate(len, alignment).unwrap();
        assert_eq!(buffer.capacity_bytes(), expected, "len {len}, alignment {alignment}");
        assert_eq!(buffer.len(), len);
    }
}

#[test]
fn test_invalid_alignments_are_layout_errors() {
    for alignment in [0, 3, 24, 4] {
        match AlignedBuffer::<f64>::allocate(8, alignment) {
            Err(LazySimdError::LayoutError { alignment: reported, .. }) => {
                assert_eq!(reported, alignment)
            }
            other => panic!("alignment {alignment}: expected a layout error, got {other:?}"),
        }
    }
}

#[test]
fn test_oversized_request_is_reported() {
    let err = AlignedBuffer::<f64>::allocate(usize::MAX / 4, 32).unwrap_err();
    assert!(matches!(err, LazySimdError::LayoutError { .. }));
}

#[cfg(target_pointer_width = "64")]
#[test]
fn test_out_of_memory_reaches_vector_construction() {
    let len = isize::MAX as usize / 16;

    let err = AlignedBuffer::<f64>::allocate(len, 32).unwrap_err();
    assert!(matches!(err, LazySimdError::AllocationError { .. }), "{err:?}");

    let err = Vector::<f64>::new(len).unwrap_err();
    assert!(matches!(err, LazySimdError::AllocationError { .. }), "{err:?}");

    let err = Vector::<f64>::from_elem(len, 1.0).unwrap_err();
    assert!(matches!(err, LazySimdError::AllocationError { .. }), "{err:?}");
}

#[test]
fn test_clone_keeps_alignment() {
    let v = Vector::<f32, 128>::from_fn(7, |i| i as f32).unwrap();
    let copy = v.try_clone().unwrap();

    assert_eq!(copy, v);
    assert_eq!(copy.as_ptr() as usize % 128, 0);
}
