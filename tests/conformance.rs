//! Round-trip, boundary and standard-vector conformance tests.

use jlscore::{ColorTransformation, FrameInfo, InterleaveMode, JlsDecoder, JlsEncoder, JpeglsPcParameters};

fn grayscale_frame(width: u32, height: u32, bits_per_sample: i32) -> FrameInfo {
    FrameInfo { width, height, bits_per_sample, component_count: 1 }
}

#[test]
fn annex_h3_sample_encodes_to_the_exact_reference_bytes() {
    let frame = grayscale_frame(4, 4, 8);
    let source: Vec<u8> = vec![0, 0, 90, 74, 68, 50, 43, 205, 64, 145, 145, 145, 100, 145, 145, 145];

    let mut encoder = JlsEncoder::new();
    encoder.set_frame_info(frame).unwrap();
    let encoded = encoder.encode(&source).unwrap();

    let expected: Vec<u8> = [
        0xFF, 0xD8, 0xFF, 0xF7, 0x00, 0x0B, 0x08, 0x00, 0x04, 0x00, 0x04, 0x01, 0x01, 0x11, 0x00, 0xFF, 0xDA, 0x00,
        0x08, 0x01, 0x01, 0x00, 0x00, 0x00, 0x00, 0xC0, 0x00, 0x00, 0x6C, 0x80, 0x20, 0x8E, 0x01, 0xC0, 0x00, 0x00,
        0x57, 0x40, 0x00, 0x00, 0x6E, 0xE6, 0x00, 0x00, 0x01, 0xBC, 0x18, 0x00, 0x00, 0x05, 0xD8, 0x00, 0x00, 0x91,
        0x60, 0xFF, 0xD9,
    ]
    .to_vec();
    assert_eq!(encoded, expected);
}

#[test]
fn annex_h3_sample_decodes_back_to_the_original_pixels() {
    let encoded: Vec<u8> = [
        0xFF, 0xD8, 0xFF, 0xF7, 0x00, 0x0B, 0x08, 0x00, 0x04, 0x00, 0x04, 0x01, 0x01, 0x11, 0x00, 0xFF, 0xDA, 0x00,
        0x08, 0x01, 0x01, 0x00, 0x00, 0x00, 0x00, 0xC0, 0x00, 0x00, 0x6C, 0x80, 0x20, 0x8E, 0x01, 0xC0, 0x00, 0x00,
        0x57, 0x40, 0x00, 0x00, 0x6E, 0xE6, 0x00, 0x00, 0x01, 0xBC, 0x18, 0x00, 0x00, 0x05, 0xD8, 0x00, 0x00, 0x91,
        0x60, 0xFF, 0xD9,
    ]
    .to_vec();
    let expected: Vec<u8> = vec![0, 0, 90, 74, 68, 50, 43, 205, 64, 145, 145, 145, 100, 145, 145, 145];

    let mut destination = vec![0u8; expected.len()];
    let info = JlsDecoder::new(&encoded).decode(&mut destination).unwrap();
    assert_eq!(info.frame_info, grayscale_frame(4, 4, 8));
    assert_eq!(info.near_lossless, 0);
    assert_eq!(destination, expected);
}

fn checkerboard(width: usize, height: usize, components: usize, maxval: i32) -> Vec<u8> {
    (0..width * height * components)
        .map(|i| (((i * 37 + 11) % (maxval as usize + 1)) as u8))
        .collect()
}

fn checkerboard16(width: usize, height: usize, components: usize, maxval: i32) -> Vec<u16> {
    (0..width * height * components)
        .map(|i| ((i * 773 + 101) % (maxval as usize + 1)) as u16)
        .collect()
}

#[test]
fn lossless_round_trips_for_every_interleave_mode_and_component_count() {
    for (width, height, components) in [(16usize, 12usize, 1usize), (16, 12, 3), (16, 12, 4)] {
        for mode in [InterleaveMode::None, InterleaveMode::Line, InterleaveMode::Sample] {
            if components == 1 && mode != InterleaveMode::None {
                continue;
            }
            let frame = FrameInfo {
                width: width as u32,
                height: height as u32,
                bits_per_sample: 8,
                component_count: components as i32,
            };
            let source = checkerboard(width, height, components, 255);

            let mut encoder = JlsEncoder::new();
            encoder.set_frame_info(frame).unwrap();
            encoder.set_interleave_mode(mode).unwrap();
            let encoded = encoder.encode(&source).unwrap();

            let mut destination = vec![0u8; source.len()];
            let info = JlsDecoder::new(&encoded).decode(&mut destination).unwrap();
            assert_eq!(info.interleave_mode, mode);
            assert_eq!(destination, source, "mode={mode:?} components={components}");
        }
    }
}

#[test]
fn sample_interleave_with_hp1_transform_round_trips_losslessly() {
    let frame = FrameInfo { width: 20, height: 15, bits_per_sample: 8, component_count: 3 };
    let source = checkerboard(20, 15, 3, 255);

    let mut encoder = JlsEncoder::new();
    encoder.set_frame_info(frame).unwrap();
    encoder.set_interleave_mode(InterleaveMode::Sample).unwrap();
    encoder.set_color_transformation(ColorTransformation::Hp1).unwrap();
    let encoded = encoder.encode(&source).unwrap();

    let mut destination = vec![0u8; source.len()];
    let info = JlsDecoder::new(&encoded).decode(&mut destination).unwrap();
    assert_eq!(info.transformation, ColorTransformation::Hp1);
    assert_eq!(destination, source);
}

#[test]
fn near_lossless_decoded_samples_stay_within_the_error_bound() {
    let frame = grayscale_frame(32, 24, 8);
    let source = checkerboard(32, 24, 1, 255);
    let near = 3;

    let mut encoder = JlsEncoder::new();
    encoder.set_frame_info(frame).unwrap();
    encoder.set_near_lossless(near).unwrap();
    let encoded = encoder.encode(&source).unwrap();

    let mut destination = vec![0u8; source.len()];
    let info = JlsDecoder::new(&encoded).decode(&mut destination).unwrap();
    assert_eq!(info.near_lossless, near);
    for (a, b) in source.iter().zip(destination.iter()) {
        assert!((*a as i32 - *b as i32).abs() <= near, "{a} vs {b} exceeds NEAR={near}");
    }
}

#[test]
fn single_pixel_frame_round_trips() {
    let frame = grayscale_frame(1, 1, 8);
    let source = vec![128u8];

    let mut encoder = JlsEncoder::new();
    encoder.set_frame_info(frame).unwrap();
    let encoded = encoder.encode(&source).unwrap();

    let mut destination = vec![0u8; 1];
    JlsDecoder::new(&encoded).decode(&mut destination).unwrap();
    assert_eq!(destination, source);
}

#[test]
fn full_line_run_round_trips() {
    let frame = grayscale_frame(32, 3, 8);
    let source = vec![42u8; 32 * 3];

    let mut encoder = JlsEncoder::new();
    encoder.set_frame_info(frame).unwrap();
    let encoded = encoder.encode(&source).unwrap();

    let mut destination = vec![0u8; source.len()];
    JlsDecoder::new(&encoded).decode(&mut destination).unwrap();
    assert_eq!(destination, source);
}

#[test]
fn run_interrupted_at_the_last_sample_round_trips() {
    let frame = grayscale_frame(16, 1, 8);
    let mut source = vec![7u8; 16];
    *source.last_mut().unwrap() = 200;

    let mut encoder = JlsEncoder::new();
    encoder.set_frame_info(frame).unwrap();
    let encoded = encoder.encode(&source).unwrap();

    let mut destination = vec![0u8; source.len()];
    JlsDecoder::new(&encoded).decode(&mut destination).unwrap();
    assert_eq!(destination, source);
}

#[test]
fn custom_reset_thresholds_round_trip() {
    for reset_value in [3, 63, 255] {
        let frame = grayscale_frame(20, 20, 8);
        let source = checkerboard(20, 20, 1, 255);
        let preset = JpeglsPcParameters { maximum_sample_value: 255, threshold1: 3, threshold2: 7, threshold3: 21, reset_value };

        let mut encoder = JlsEncoder::new();
        encoder.set_frame_info(frame).unwrap();
        encoder.set_preset_coding_parameters(preset).unwrap();
        let encoded = encoder.encode(&source).unwrap();

        let mut destination = vec![0u8; source.len()];
        JlsDecoder::new(&encoded).decode(&mut destination).unwrap();
        assert_eq!(destination, source, "RESET={reset_value}");
    }
}

#[test]
fn twelve_and_sixteen_bit_depths_round_trip() {
    for bits_per_sample in [12, 16] {
        let frame = grayscale_frame(24, 18, bits_per_sample);
        let maxval = (1i32 << bits_per_sample) - 1;
        let source = checkerboard16(24, 18, 1, maxval);

        let mut encoder = JlsEncoder::new();
        encoder.set_frame_info(frame).unwrap();
        let encoded = encoder.encode(&source).unwrap();

        let mut destination = vec![0u16; source.len()];
        JlsDecoder::new(&encoded).decode(&mut destination).unwrap();
        assert_eq!(destination, source, "bits_per_sample={bits_per_sample}");
    }
}

#[test]
fn two_bit_depth_round_trips() {
    let frame = grayscale_frame(9, 7, 2);
    let source = checkerboard(9, 7, 1, 3);

    let mut encoder = JlsEncoder::new();
    encoder.set_frame_info(frame).unwrap();
    let encoded = encoder.encode(&source).unwrap();

    let mut destination = vec![0u8; source.len()];
    JlsDecoder::new(&encoded).decode(&mut destination).unwrap();
    assert_eq!(destination, source);
}

#[test]
fn restart_interval_round_trips_across_many_chunks() {
    let frame = grayscale_frame(16, 10, 8);
    let source = checkerboard(16, 10, 1, 255);

    let mut encoder = JlsEncoder::new();
    encoder.set_frame_info(frame).unwrap();
    encoder.set_restart_interval(3).unwrap();
    let encoded = encoder.encode(&source).unwrap();

    let mut destination = vec![0u8; source.len()];
    let info = JlsDecoder::new(&encoded).decode(&mut destination).unwrap();
    assert_eq!(info.frame_info, frame);
    assert_eq!(destination, source);
}

#[test]
fn encoding_is_deterministic() {
    let frame = grayscale_frame(16, 16, 8);
    let source = checkerboard(16, 16, 1, 255);

    let mut encoder = JlsEncoder::new();
    encoder.set_frame_info(frame).unwrap();
    let first = encoder.encode(&source).unwrap();
    let second = encoder.encode(&source).unwrap();
    assert_eq!(first, second);
}
