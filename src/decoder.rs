//! Public decoding facade: the inverse of [`crate::encoder::JlsEncoder`].

use crate::coding_parameters::{is_valid, JpeglsPcParameters};
use crate::error::JlsError;
use crate::frame::FrameReader;
use crate::line::inverse_transform;
use crate::marker::JpegMarkerCode;
use crate::sample::{Pixel, Quad, Sample, Traits, Triplet};
use crate::scan::{LineBuffer, ScanDecoder};
use crate::types::{ColorTransformation, FrameInfo, InterleaveMode};

/// Reads a complete JPEG-LS codestream back into raw samples, with the same
/// source/destination layout conventions as [`crate::encoder::JlsEncoder`].
#[derive(Debug, Clone)]
pub struct JlsDecoder<'a> {
    source: &'a [u8],
}

/// Everything the decoder recovered from the stream's headers, returned
/// alongside the decoded samples so a caller can interpret them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecodedInfo {
    pub frame_info: FrameInfo,
    pub near_lossless: i32,
    pub interleave_mode: InterleaveMode,
    pub transformation: ColorTransformation,
}

impl<'a> JlsDecoder<'a> {
    pub fn new(source: &'a [u8]) -> Self {
        Self { source }
    }

    /// Reads just the frame header, without decoding any scan data.
    pub fn read_header(&self) -> Result<(FrameInfo, DecodedInfo), JlsError> {
        let mut reader = FrameReader::new(self.source);
        let (frame_info, _, _, transformation) = read_headers_up_to_first_scan(&mut reader)?;
        let scan = reader.read_start_of_scan()?;
        let info = DecodedInfo {
            frame_info,
            near_lossless: scan.near_lossless,
            interleave_mode: scan.interleave_mode,
            transformation,
        };
        Ok((frame_info, info))
    }

    /// Decodes the stream into `destination`, using the layout convention
    /// documented on [`crate::encoder::JlsEncoder::encode`]. Returns the
    /// decoded header information.
    pub fn decode<T: Sample>(&self, destination: &mut [T]) -> Result<DecodedInfo, JlsError> {
        let mut reader = FrameReader::new(self.source);
        let (frame_info, stream_preset, restart_interval, transformation) =
            read_headers_up_to_first_scan(&mut reader)?;

        if frame_info.bits_per_sample > T::BITS as i32 {
            return Err(JlsError::InvalidParameterBitsPerSample);
        }
        let maxval = (1i32 << frame_info.bits_per_sample) - 1;
        let width = frame_info.width as usize;
        let height = frame_info.height as usize;
        let component_count = frame_info.component_count as usize;

        let scan = reader.read_start_of_scan()?;
        if scan.component_ids.len() != component_count && scan.interleave_mode != InterleaveMode::None {
            return Err(JlsError::InvalidData);
        }

        let near_lossless = scan.near_lossless;
        let preset = is_valid(&stream_preset.unwrap_or_default(), maxval, near_lossless)?;
        let traits = Traits::new(maxval, near_lossless, preset.reset_value);

        match scan.interleave_mode {
            InterleaveMode::None => {
                if destination.len() != width * height * component_count {
                    return Err(JlsError::InvalidArgument);
                }
                let plane_offset = 0usize;
                decode_generic::<T>(width, height, 1, traits, preset, restart_interval, &mut reader, |line, _c, x, v| {
                    destination[plane_offset + line * width + x] = v;
                })?;
                for component in 1..component_count {
                    reader.read_next_marker()?;
                    let next_scan = reader.read_start_of_scan()?;
                    if next_scan.interleave_mode != InterleaveMode::None {
                        return Err(JlsError::InvalidData);
                    }
                    let plane_offset = component * width * height;
                    decode_generic::<T>(
                        width,
                        height,
                        1,
                        traits,
                        preset,
                        restart_interval,
                        &mut reader,
                        |line, _c, x, v| destination[plane_offset + line * width + x] = v,
                    )?;
                }
            }
            InterleaveMode::Line => {
                if destination.len() != width * height * component_count {
                    return Err(JlsError::InvalidArgument);
                }
                decode_generic::<T>(width, height, component_count, traits, preset, restart_interval, &mut reader, |line, component, x, v| {
                    destination[line * width * component_count + component * width + x] = v;
                })?;
            }
            InterleaveMode::Sample => match component_count {
                3 => {
                    if destination.len() != width * height * 3 {
                        return Err(JlsError::InvalidArgument);
                    }
                    decode_generic::<Triplet<T>>(width, height, 1, traits, preset, restart_interval, &mut reader, |line, _c, x, v| {
                        let restored = inverse_transform(transformation, v);
                        let i = (line * width + x) * 3;
                        destination[i] = T::from_i32(restored.v1.to_i32());
                        destination[i + 1] = T::from_i32(restored.v2.to_i32());
                        destination[i + 2] = T::from_i32(restored.v3.to_i32());
                    })?;
                }
                4 => {
                    if destination.len() != width * height * 4 {
                        return Err(JlsError::InvalidArgument);
                    }
                    decode_generic::<Quad<T>>(width, height, 1, traits, preset, restart_interval, &mut reader, |line, _c, x, v| {
                        let i = (line * width + x) * 4;
                        destination[i] = T::from_i32(v.v1.to_i32());
                        destination[i + 1] = T::from_i32(v.v2.to_i32());
                        destination[i + 2] = T::from_i32(v.v3.to_i32());
                        destination[i + 3] = T::from_i32(v.v4.to_i32());
                    })?;
                }
                _ => return Err(JlsError::ParameterValueNotSupported),
            },
        }

        reader.read_next_marker().and_then(|m| match m {
            JpegMarkerCode::EndOfImage => Ok(()),
            _ => Err(JlsError::EndOfImageMarkerNotFound),
        })?;

        Ok(DecodedInfo { frame_info, near_lossless, interleave_mode: scan.interleave_mode, transformation })
    }
}

/// Reads SOI, SOF55, and any LSE/DRI/APP8 segments up to (but not
/// including) the first SOS, returning the frame info, any explicit preset
/// coding parameters, restart interval (0 if absent) and color
/// transformation (`None` if absent).
#[allow(clippy::type_complexity)]
fn read_headers_up_to_first_scan(
    reader: &mut FrameReader,
) -> Result<(FrameInfo, Option<JpeglsPcParameters>, u32, ColorTransformation), JlsError> {
    reader.read_start_of_image()?;
    match reader.read_next_marker()? {
        JpegMarkerCode::StartOfFrameJpegls => {}
        _ => return Err(JlsError::DuplicateStartOfFrameMarker),
    }
    let frame_info = reader.read_start_of_frame()?;

    let mut preset = None;
    let mut restart_interval = 0u32;
    let mut transformation = ColorTransformation::None;
    loop {
        match reader.read_next_marker()? {
            JpegMarkerCode::JpeglsPresetParameters => {
                preset = Some(reader.read_preset_parameters()?);
            }
            JpegMarkerCode::DefineRestartInterval => {
                restart_interval = reader.read_restart_interval()?;
            }
            JpegMarkerCode::ApplicationData8 => {
                if let Some(t) = reader.read_application_data()? {
                    transformation = t;
                }
            }
            JpegMarkerCode::Comment
            | JpegMarkerCode::ApplicationData0
            | JpegMarkerCode::ApplicationData1
            | JpegMarkerCode::ApplicationData2
            | JpegMarkerCode::ApplicationData3
            | JpegMarkerCode::ApplicationData4
            | JpegMarkerCode::ApplicationData5
            | JpegMarkerCode::ApplicationData6
            | JpegMarkerCode::ApplicationData7
            | JpegMarkerCode::ApplicationData9
            | JpegMarkerCode::ApplicationData10
            | JpegMarkerCode::ApplicationData11
            | JpegMarkerCode::ApplicationData12
            | JpegMarkerCode::ApplicationData13
            | JpegMarkerCode::ApplicationData14
            | JpegMarkerCode::ApplicationData15 => {
                reader.skip_segment()?;
            }
            // The marker itself is already consumed; the reader is left
            // positioned at the segment length field, exactly where
            // `FrameReader::read_start_of_scan` expects to start.
            JpegMarkerCode::StartOfScan => return Ok((frame_info, preset, restart_interval, transformation)),
            _ => return Err(JlsError::UnexpectedStartOfScanMarker),
        }
    }
}

/// Mirrors [`crate::encoder::encode_generic`] on the decode side.
fn decode_generic<P: Pixel>(
    width: usize,
    height: usize,
    components: usize,
    traits: Traits,
    preset: JpeglsPcParameters,
    restart_interval: u32,
    reader: &mut FrameReader,
    mut write_sample: impl FnMut(usize, usize, usize, P),
) -> Result<(), JlsError> {
    let effective_restart = if restart_interval == 0 { height as u32 } else { restart_interval };

    let mut previous: Vec<LineBuffer<P>> = (0..components).map(|_| LineBuffer::new(width + 2)).collect();
    let mut current: Vec<LineBuffer<P>> = (0..components).map(|_| LineBuffer::new(width + 2)).collect();

    let mut restart_counter = 0u32;
    let mut line = 0usize;

    while line < height {
        let lines_in_interval = std::cmp::min(height - line, effective_restart as usize);
        let mut scan_decoder = ScanDecoder::<P>::new(reader.remaining(), traits, preset, components);

        for _ in 0..lines_in_interval {
            for component in 0..components {
                let rightmost = previous[component].get(width as i32 - 1);
                previous[component].set(width as i32, rightmost);
                let top_left = previous[component].get(0);
                current[component].set(-1, top_left);

                scan_decoder.decode_line(component, width as i32, &previous[component], &mut current[component])?;

                for x in 0..width {
                    write_sample(line, component, x, current[component].get(x as i32));
                }
            }
            std::mem::swap(&mut previous, &mut current);
            line += 1;
        }

        let consumed = scan_decoder.current_byte_position();
        scan_decoder.end_scan()?;
        reader.advance(consumed);

        if line < height {
            reader.read_restart_marker(restart_counter)?;
            restart_counter += 1;
            for lb in previous.iter_mut().chain(current.iter_mut()) {
                *lb = LineBuffer::new(width + 2);
            }
        }
    }

    Ok(())
}
