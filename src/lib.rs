/*!
# jlscore

A pure Rust implementation of the JPEG-LS lossless and near-lossless image
compression standard (ISO/IEC 14495-1 / ITU-T Recommendation T.87).

## Scope

- Context-based adaptive MED prediction, Golomb-Rice entropy coding, and
  run-mode coding (Annex A).
- `None`, `Line`, and `Sample` interleave modes for multi-component frames.
- Custom preset coding parameters (LSE) and near-lossless error bounds.
- Restart intervals (DRI/RSTm), for fault-tolerant decoding of long scans.
- The de-facto HP1/HP2/HP3 lossless color transforms carried via a CharLS-
  compatible APP8 marker, for sample-interleaved RGB frames.

Bit depths from 2 to 16 are supported, backed by `u8` or `u16` sample
storage. JPEG 1 and JPEG 2000 are out of scope.
*/

#![forbid(unsafe_code)]

pub mod bitstream;
pub mod coding_parameters;
pub mod constants;
pub mod context;
pub mod decoder;
pub mod encoder;
pub mod error;
pub mod frame;
pub mod golomb;
pub mod line;
pub mod marker;
pub mod quant;
pub mod sample;
pub mod scan;
pub mod types;

pub use coding_parameters::{CodingParameters, JpeglsPcParameters};
pub use decoder::{DecodedInfo, JlsDecoder};
pub use encoder::JlsEncoder;
pub use error::JlsError;
pub use sample::{Quad, Sample, Triplet};
pub use types::{ColorTransformation, FrameInfo, InterleaveMode};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encode_decode_round_trips_grayscale_lossless() {
        let frame_info = FrameInfo { width: 4, height: 3, bits_per_sample: 8, component_count: 1 };
        let source: Vec<u8> = vec![10, 20, 30, 40, 50, 60, 70, 80, 90, 100, 110, 120];

        let mut encoder = JlsEncoder::new();
        encoder.set_frame_info(frame_info).unwrap();
        let encoded = encoder.encode(&source).unwrap();

        let mut destination = vec![0u8; source.len()];
        let info = JlsDecoder::new(&encoded).decode(&mut destination).unwrap();
        assert_eq!(info.frame_info, frame_info);
        assert_eq!(destination, source);
    }
}
