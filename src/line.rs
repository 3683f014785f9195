//! Line processor: lossless color transforms and interleave-layout
//! conversions between a caller's raw scan-line buffer and the per-line
//! [`Pixel`] buffers the scan coder works with.
//!
//! The transforms below are the de-facto HP1/HP2/HP3 transforms that
//! accompany JPEG-LS implementations; they sit outside ISO/IEC 14495-1
//! itself but are carried here because every encoder that supports
//! sample-interleaved RGB needs one. They only apply to 3-component frames
//! at 8 or 16 bits per sample, matching `color_transformation_possible`.

use crate::sample::{Sample, Triplet};
use crate::types::{ColorTransformation, FrameInfo};

/// True only when `transformation` can legally be applied to `frame`: three
/// components, and a bit depth matching a whole storage-type width.
pub fn color_transformation_possible(frame: &FrameInfo) -> bool {
    frame.component_count == 3 && (frame.bits_per_sample == 8 || frame.bits_per_sample == 16)
}

fn range<T: Sample>() -> i32 {
    1 << T::BITS
}

/// Applies `transformation` to one RGB triplet on its way into the encoder.
pub fn forward_transform<T: Sample>(transformation: ColorTransformation, pixel: Triplet<T>) -> Triplet<T> {
    let (r, g, b) = (pixel.v1.to_i32(), pixel.v2.to_i32(), pixel.v3.to_i32());
    match transformation {
        ColorTransformation::None => pixel,
        ColorTransformation::Hp1 => {
            let half = range::<T>() / 2;
            Triplet::new(r - g + half, g, b - g + half)
        }
        ColorTransformation::Hp2 => {
            let half = range::<T>() / 2;
            Triplet::new(r - g + half, g, b - ((r + g) >> 1) - half)
        }
        ColorTransformation::Hp3 => {
            let half = range::<T>() / 2;
            let quarter = range::<T>() / 4;
            let v2 = b - g + half;
            let v3 = r - g + half;
            Triplet::new(g + ((v2 + v3) >> 2) - quarter, v2, v3)
        }
    }
}

/// Inverts [`forward_transform`] on the way out of the decoder.
pub fn inverse_transform<T: Sample>(transformation: ColorTransformation, pixel: Triplet<T>) -> Triplet<T> {
    let (v1, v2, v3) = (pixel.v1.to_i32(), pixel.v2.to_i32(), pixel.v3.to_i32());
    match transformation {
        ColorTransformation::None => pixel,
        ColorTransformation::Hp1 => {
            let half = range::<T>() / 2;
            Triplet::new(v1 + v2 - half, v2, v3 + v2 - half)
        }
        ColorTransformation::Hp2 => {
            let half = range::<T>() / 2;
            let r = v1 + v2 - half;
            Triplet::new(r, v2, v3 + ((r + v2) >> 1) - half)
        }
        ColorTransformation::Hp3 => {
            let half = range::<T>() / 2;
            let quarter = range::<T>() / 4;
            let g = v1 - ((v3 + v2) >> 2) + quarter;
            Triplet::new(v3 + g - half, g, v2 + g - half)
        }
    }
}

/// Masks off unused high bits of a sample when `bits_per_sample` isn't a
/// multiple of 8, the "masked single component" line-processor behavior.
pub fn mask_to_bits(value: i32, bits_per_sample: i32) -> i32 {
    value & ((1 << bits_per_sample) - 1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hp1_round_trips() {
        let original = Triplet::<u8>::new(200, 100, 10);
        let transformed = forward_transform(ColorTransformation::Hp1, original);
        let restored = inverse_transform(ColorTransformation::Hp1, transformed);
        assert_eq!(restored, original);
    }

    #[test]
    fn hp2_round_trips() {
        let original = Triplet::<u16>::new(4000, 2000, 60000);
        let transformed = forward_transform(ColorTransformation::Hp2, original);
        let restored = inverse_transform(ColorTransformation::Hp2, transformed);
        assert_eq!(restored, original);
    }

    #[test]
    fn hp3_round_trips() {
        let original = Triplet::<u8>::new(255, 0, 128);
        let transformed = forward_transform(ColorTransformation::Hp3, original);
        let restored = inverse_transform(ColorTransformation::Hp3, transformed);
        assert_eq!(restored, original);
    }

    #[test]
    fn transformation_requires_three_components_and_exact_bit_depth() {
        let frame = FrameInfo { width: 1, height: 1, bits_per_sample: 8, component_count: 3 };
        assert!(color_transformation_possible(&frame));

        let frame = FrameInfo { width: 1, height: 1, bits_per_sample: 12, component_count: 3 };
        assert!(!color_transformation_possible(&frame));

        let frame = FrameInfo { width: 1, height: 1, bits_per_sample: 8, component_count: 1 };
        assert!(!color_transformation_possible(&frame));
    }
}
