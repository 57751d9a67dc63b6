//! Error types for lazysimd operations.
//!
//! Every fallible operation in the crate (allocation, expression assignment,
//! explicit tier selection, configuration) reports failures through
//! [`LazySimdError`] instead of panicking.

use std::fmt;

use crate::simd::Tier;

/// Errors that can occur during lazysimd operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LazySimdError {
    /// Memory allocation failed (out of memory).
    AllocationError {
        /// The size in bytes that was requested.
        requested_size: usize,
        /// The alignment that was requested.
        requested_alignment: usize,
        /// Human-readable error message.
        message: String,
    },
    /// Invalid layout parameters were provided.
    LayoutError {
        /// The size parameter that caused the error.
        size: usize,
        /// The alignment parameter that caused the error.
        alignment: usize,
        /// Human-readable error message.
        message: String,
    },
    /// An operand's length differs from the destination's length.
    ShapeMismatch {
        /// Length of the destination (or of the first operand).
        expected: usize,
        /// Length of the offending operand.
        actual: usize,
    },
    /// A dispatch tier was requested that this build or CPU cannot run.
    UnsupportedTier {
        /// The requested tier.
        tier: Tier,
    },
    /// A configuration value could not be parsed.
    ConfigError {
        /// Name of the configuration key.
        key: String,
        /// The raw value that was rejected.
        value: String,
        /// Human-readable error message.
        message: String,
    },
    /// Input validation error.
    ValidationError {
        /// Human-readable error message.
        message: String,
    },
}

impl fmt::Display for LazySimdError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LazySimdError::AllocationError {
                requested_size,
                requested_alignment,
                message,
            } => write!(
                f,
                "Memory allocation failed: {} (requested {} bytes with {} byte alignment)",
                message, requested_size, requested_alignment
            ),
            LazySimdError::LayoutError {
                size,
                alignment,
                message,
            } => write!(
                f,
                "Invalid memory layout: {} (size: {}, alignment: {})",
                message, size, alignment
            ),
            LazySimdError::ShapeMismatch { expected, actual } => write!(
                f,
                "Shape mismatch: expected {} elements, got {}",
                expected, actual
            ),
            LazySimdError::UnsupportedTier { tier } => {
                write!(f, "Dispatch tier not supported on this machine: {}", tier)
            }
            LazySimdError::ConfigError {
                key,
                value,
                message,
            } => write!(
                f,
                "Invalid configuration: {} ({}={:?})",
                message, key, value
            ),
            LazySimdError::ValidationError { message } => {
                write!(f, "Validation error: {}", message)
            }
        }
    }
}

impl std::error::Error for LazySimdError {}

/// Result type alias for lazysimd operations.
pub type Result<T> = std::result::Result<T, LazySimdError>;

/// Creates an allocation error.
pub fn allocation_error(size: usize, alignment: usize, message: impl Into<String>) -> LazySimdError {
    LazySimdError::AllocationError {
        requested_size: size,
        requested_alignment: alignment,
        message: message.into(),
    }
}

/// Creates a layout error.
pub fn layout_error(size: usize, alignment: usize, message: impl Into<String>) -> LazySimdError {
    LazySimdError::LayoutError {
        size,
        alignment,
        message: message.into(),
    }
}

/// Creates a shape mismatch error.
pub fn shape_mismatch(expected: usize, actual: usize) -> LazySimdError {
    LazySimdError::ShapeMismatch { expected, actual }
}

/// Creates a configuration error.
pub fn config_error(
    key: impl Into<String>,
    value: impl Into<String>,
    message: impl Into<String>,
) -> LazySimdError {
    LazySimdError::ConfigError {
        key: key.into(),
        value: value.into(),
        message: message.into(),
    }
}

/// Creates a validation error.
pub fn validation_error(message: impl Into<String>) -> LazySimdError {
    LazySimdError::ValidationError {
        message: message.into(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::buffer::AlignedBuffer;

    #[cfg(target_pointer_width = "64")]
    #[test]
    fn test_allocation_error_display() {
        // what a buffer of 2^59 - 1 f64 at 32 byte alignment reports on OOM
        let error = allocation_error(1 << 62, 32, "allocator returned null");
        assert_eq!(
            error.to_string(),
            "Memory allocation failed: allocator returned null \
             (requested 4611686018427387904 bytes with 32 byte alignment)"
        );
    }

    #[test]
    fn test_layout_error_from_buffer() {
        let error = AlignedBuffer::<f64>::allocate(8, 24).unwrap_err();
        assert_eq!(error, layout_error(8, 24, "alignment must be a power of two"));
        assert_eq!(
            error.to_string(),
            "Invalid memory layout: alignment must be a power of two (size: 8, alignment: 24)"
        );

        let error = AlignedBuffer::<f64>::allocate(3, 4).unwrap_err();
        assert!(error.to_string().contains("natural alignment of the element (8 bytes)"));
    }

    #[test]
    fn test_shape_mismatch_display() {
        let error = shape_mismatch(10, 7);
        assert_eq!(
            error.to_string(),
            "Shape mismatch: expected 10 elements, got 7"
        );
    }

    #[test]
    fn test_unsupported_tier_display() {
        let error = LazySimdError::UnsupportedTier { tier: Tier::Avx };
        assert_eq!(
            error.to_string(),
            "Dispatch tier not supported on this machine: avx"
        );
    }

    #[test]
    fn test_config_error_display() {
        let error = config_error("LAZYSIMD_TIER", "avx9000", "unknown dispatch tier");
        let display = error.to_string();
        assert!(display.contains("unknown dispatch tier"));
        assert!(display.contains("LAZYSIMD_TIER=\"avx9000\""));
    }

    #[test]
    fn test_validation_error_display() {
        let error = validation_error("expression has no operand to take a length from");
        assert_eq!(
            error.to_string(),
            "Validation error: expression has no operand to take a length from"
        );
    }

    #[test]
    fn test_error_equality() {
        assert_eq!(shape_mismatch(10, 7), LazySimdError::ShapeMismatch { expected: 10, actual: 7 });
        assert_ne!(shape_mismatch(10, 7), shape_mismatch(7, 10));

        assert_ne!(
            LazySimdError::UnsupportedTier { tier: Tier::Avx },
            LazySimdError::UnsupportedTier { tier: Tier::Neon }
        );

        let parsed = "avx9000".parse::<Tier>().unwrap_err();
        assert_eq!(
            parsed,
            config_error(
                "tier",
                "avx9000",
                "unknown dispatch tier (expected avx, sse2, neon or scalar)"
            )
        );
    }
}
