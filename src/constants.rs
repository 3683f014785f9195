//! Constants defined by ISO/IEC 14495-1.

/// Default RESET value, ISO/IEC 14495-1 table C.2.
pub const DEFAULT_RESET_THRESHOLD: i32 = 64;

pub const MINIMUM_COMPONENT_COUNT: i32 = 1;
pub const MAXIMUM_COMPONENT_COUNT_IN_SCAN: i32 = 4;
pub const MINIMUM_BITS_PER_SAMPLE: i32 = 2;
pub const MAXIMUM_BITS_PER_SAMPLE: i32 = 16;
pub const MAXIMUM_NEAR_LOSSLESS: i32 = 255;

/// Implementation limit on the Golomb parameter k (theoretical limit is 32).
pub const MAX_K_VALUE: i32 = 16;

/// The special value indicating "compute the stride automatically".
pub const AUTO_CALCULATE_STRIDE: usize = 0;

pub const SEGMENT_LENGTH_SIZE: usize = 2;
pub const SEGMENT_MAX_DATA_SIZE: usize = u16::MAX as usize - SEGMENT_LENGTH_SIZE;

/// Run-length block table used by the run-mode coder, ISO/IEC 14495-1 A.7.1.
pub const J: [i32; 32] = [
    0, 0, 0, 0, 1, 1, 1, 1, 2, 2, 2, 2, 3, 3, 3, 3, 4, 4, 5, 5, 6, 6, 7, 7, 8, 9, 10, 11, 12, 13,
    14, 15,
];
