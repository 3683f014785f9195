//! Gradient quantization, ISO/IEC 14495-1 A.3.3 code segment A.4, and the
//! 365-valued context id derived from it (A.3.4).

/// Quantizes a local gradient `di` into one of the nine symmetric buckets
/// `-4..=4`, per the encoder/decoder's shared threshold triple.
pub fn quantize_gradient(di: i32, near_lossless: i32, t1: i32, t2: i32, t3: i32) -> i32 {
    if di <= -t3 {
        -4
    } else if di <= -t2 {
        -3
    } else if di <= -t1 {
        -2
    } else if di < -near_lossless {
        -1
    } else if di <= near_lossless {
        0
    } else if di < t1 {
        1
    } else if di < t2 {
        2
    } else if di < t3 {
        3
    } else {
        4
    }
}

/// Combines three quantized gradients into a context id in `0..365`,
/// ISO/IEC 14495-1 A.3.4.
pub const fn compute_context_id(q1: i32, q2: i32, q3: i32) -> i32 {
    (q1 * 9 + q2) * 9 + q3
}

/// Median edge detector predictor, ISO/IEC 14495-1 A.3.1 / annex Figure A.1.
pub fn get_predicted_value(ra: i32, rb: i32, rc: i32) -> i32 {
    let sign = crate::sample::bit_wise_sign(rb - ra);
    if (sign ^ (rc - ra)) < 0 {
        rb
    } else if (sign ^ (rb - rc)) < 0 {
        ra
    } else {
        ra + rb - rc
    }
}

/// Maps a signed error value to an unsigned code, ISO/IEC 14495-1 A.5.1.
pub const fn map_error_value(error_value: i32) -> i32 {
    (error_value >> 30) ^ (2 * error_value)
}

/// Inverse of [`map_error_value`].
pub const fn unmap_error_value(mapped_error: i32) -> i32 {
    let sign = ((mapped_error as u32) << 31) as i32 >> 31;
    sign ^ (mapped_error >> 1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quantize_gradient_is_symmetric() {
        assert_eq!(quantize_gradient(0, 0, 3, 7, 21), 0);
        assert_eq!(quantize_gradient(100, 0, 3, 7, 21), 4);
        assert_eq!(quantize_gradient(-100, 0, 3, 7, 21), -4);
    }

    #[test]
    fn predictor_clamps_to_plane() {
        assert_eq!(get_predicted_value(10, 10, 10), 10);
        assert_eq!(get_predicted_value(10, 20, 10), 20);
    }

    #[test]
    fn error_value_mapping_round_trips() {
        for e in -200..200 {
            assert_eq!(unmap_error_value(map_error_value(e)), e);
        }
    }
}
