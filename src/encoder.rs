//! Public encoding facade: wires the frame walker, line processor and scan
//! coder together into a complete JPEG-LS encoder.

use crate::coding_parameters::{compute_default, is_valid, JpeglsPcParameters};
use crate::constants::MAXIMUM_NEAR_LOSSLESS;
use crate::error::JlsError;
use crate::frame::FrameWriter;
use crate::line::{color_transformation_possible, forward_transform};
use crate::marker::JPEG_RESTART_MARKER_BASE;
use crate::sample::{Pixel, Quad, Sample, Traits, Triplet};
use crate::scan::{LineBuffer, ScanEncoder};
use crate::types::{ColorTransformation, FrameInfo, InterleaveMode};

/// Builds a complete JPEG-LS codestream from raw samples.
///
/// Source layout by interleave mode:
/// - `None`: `component_count` planes concatenated, each `width * height`
///   samples in raster order.
/// - `Line`: raster rows of `component_count` back-to-back `width`-wide
///   component runs (component-major within a row).
/// - `Sample`: raster pixels of `component_count` consecutive samples each.
#[derive(Debug, Clone)]
pub struct JlsEncoder {
    frame_info: Option<FrameInfo>,
    near_lossless: i32,
    interleave_mode: InterleaveMode,
    transformation: ColorTransformation,
    restart_interval: u32,
    preset_coding_parameters: Option<JpeglsPcParameters>,
}

impl Default for JlsEncoder {
    fn default() -> Self {
        Self::new()
    }
}

impl JlsEncoder {
    pub fn new() -> Self {
        Self {
            frame_info: None,
            near_lossless: 0,
            interleave_mode: InterleaveMode::None,
            transformation: ColorTransformation::None,
            restart_interval: 0,
            preset_coding_parameters: None,
        }
    }

    pub fn set_frame_info(&mut self, frame_info: FrameInfo) -> Result<(), JlsError> {
        if frame_info.width == 0 || frame_info.width > 65535 {
            return Err(JlsError::InvalidParameterWidth);
        }
        if frame_info.height == 0 || frame_info.height > 65535 {
            return Err(JlsError::InvalidParameterHeight);
        }
        if !(2..=16).contains(&frame_info.bits_per_sample) {
            return Err(JlsError::InvalidParameterBitsPerSample);
        }
        if !(1..=255).contains(&frame_info.component_count) {
            return Err(JlsError::InvalidParameterComponentCount);
        }
        self.frame_info = Some(frame_info);
        Ok(())
    }

    pub fn set_near_lossless(&mut self, near_lossless: i32) -> Result<(), JlsError> {
        if !(0..=MAXIMUM_NEAR_LOSSLESS).contains(&near_lossless) {
            return Err(JlsError::InvalidParameterNearLossless);
        }
        self.near_lossless = near_lossless;
        Ok(())
    }

    pub fn set_interleave_mode(&mut self, mode: InterleaveMode) -> Result<(), JlsError> {
        self.interleave_mode = mode;
        Ok(())
    }

    pub fn set_color_transformation(&mut self, transformation: ColorTransformation) -> Result<(), JlsError> {
        self.transformation = transformation;
        Ok(())
    }

    pub fn set_restart_interval(&mut self, restart_interval: u32) -> Result<(), JlsError> {
        self.restart_interval = restart_interval;
        Ok(())
    }

    pub fn set_preset_coding_parameters(&mut self, preset: JpeglsPcParameters) -> Result<(), JlsError> {
        self.preset_coding_parameters = Some(preset);
        Ok(())
    }

    pub fn encode<T: Sample>(&self, source: &[T]) -> Result<Vec<u8>, JlsError> {
        let frame_info = self.frame_info.ok_or(JlsError::InvalidOperation)?;
        if frame_info.bits_per_sample > T::BITS as i32 {
            return Err(JlsError::InvalidParameterBitsPerSample);
        }
        if self.transformation != ColorTransformation::None
            && (self.interleave_mode != InterleaveMode::Sample || !color_transformation_possible(&frame_info))
        {
            return Err(JlsError::ColorTransformNotSupported);
        }

        let maxval = (1i32 << frame_info.bits_per_sample) - 1;
        let preset = is_valid(&self.preset_coding_parameters.unwrap_or_default(), maxval, self.near_lossless)?;
        let defaults = compute_default(maxval, self.near_lossless);
        let traits = Traits::new(preset.maximum_sample_value, self.near_lossless, preset.reset_value);

        let width = frame_info.width as usize;
        let height = frame_info.height as usize;
        let component_count = frame_info.component_count as usize;

        let mut out = Vec::new();
        let mut writer = FrameWriter::new(&mut out);
        writer.write_start_of_image();
        writer.write_start_of_frame(&frame_info)?;
        writer.write_preset_parameters(&preset, &defaults);
        writer.write_restart_interval(self.restart_interval);
        writer.write_color_transform(self.transformation);

        match self.interleave_mode {
            InterleaveMode::None => {
                if source.len() != width * height * component_count {
                    return Err(JlsError::InvalidArgument);
                }
                for component in 0..component_count {
                    writer.write_start_of_scan(&[component as i32 + 1], self.near_lossless, InterleaveMode::None);
                    let plane_offset = component * width * height;
                    encode_generic::<T>(
                        width,
                        height,
                        1,
                        traits,
                        preset,
                        self.restart_interval,
                        &mut writer,
                        |line, _component, x| source[plane_offset + line * width + x],
                    )?;
                }
            }
            InterleaveMode::Line => {
                if source.len() != width * height * component_count {
                    return Err(JlsError::InvalidArgument);
                }
                let ids: Vec<i32> = (1..=component_count as i32).collect();
                writer.write_start_of_scan(&ids, self.near_lossless, InterleaveMode::Line);
                encode_generic::<T>(
                    width,
                    height,
                    component_count,
                    traits,
                    preset,
                    self.restart_interval,
                    &mut writer,
                    |line, component, x| source[line * width * component_count + component * width + x],
                )?;
            }
            InterleaveMode::Sample => {
                let ids: Vec<i32> = (1..=component_count as i32).collect();
                writer.write_start_of_scan(&ids, self.near_lossless, InterleaveMode::Sample);
                match component_count {
                    3 => {
                        if source.len() != width * height * 3 {
                            return Err(JlsError::InvalidArgument);
                        }
                        let transformation = self.transformation;
                        encode_generic::<Triplet<T>>(
                            width,
                            height,
                            1,
                            traits,
                            preset,
                            self.restart_interval,
                            &mut writer,
                            |line, _component, x| {
                                let i = (line * width + x) * 3;
                                let raw = Triplet::new(source[i].to_i32(), source[i + 1].to_i32(), source[i + 2].to_i32());
                                forward_transform(transformation, raw)
                            },
                        )?;
                    }
                    4 => {
                        if source.len() != width * height * 4 {
                            return Err(JlsError::InvalidArgument);
                        }
                        encode_generic::<Quad<T>>(
                            width,
                            height,
                            1,
                            traits,
                            preset,
                            self.restart_interval,
                            &mut writer,
                            |line, _component, x| {
                                let i = (line * width + x) * 4;
                                Quad::new(source[i].to_i32(), source[i + 1].to_i32(), source[i + 2].to_i32(), source[i + 3].to_i32())
                            },
                        )?;
                    }
                    _ => return Err(JlsError::ParameterValueNotSupported),
                }
            }
        }

        writer.write_end_of_image();
        Ok(out)
    }
}

fn estimate_scan_capacity(width: usize, height: usize, components: usize, traits: Traits, restart_interval: u32) -> usize {
    let bytes_per_sample = (std::cmp::max(traits.bpp, 8) as usize + 7) / 8;
    let raw_bytes = width * height * components.max(1) * bytes_per_sample;
    let restart_interval = if restart_interval == 0 { height as u32 } else { restart_interval };
    let restart_markers = ((height as u32 + restart_interval - 1) / restart_interval) as usize;
    raw_bytes + raw_bytes / 4 + restart_markers * 2 + 256
}

/// Drives the restart-interval-chunked, per-component-shared-context scan
/// loop shared by every interleave mode, mirroring the reference decoder's
/// `encode_lines`: one large restart interval when none is configured, a
/// fresh [`ScanEncoder`] (and so fresh contexts/run indices) per chunk, and
/// edge-pixel initialization before each component's line.
fn encode_generic<P: Pixel>(
    width: usize,
    height: usize,
    components: usize,
    traits: Traits,
    preset: JpeglsPcParameters,
    restart_interval: u32,
    writer: &mut FrameWriter,
    mut read_sample: impl FnMut(usize, usize, usize) -> P,
) -> Result<(), JlsError> {
    let effective_restart = if restart_interval == 0 { height as u32 } else { restart_interval };

    let mut previous: Vec<LineBuffer<P>> = (0..components).map(|_| LineBuffer::new(width + 2)).collect();
    let mut current: Vec<LineBuffer<P>> = (0..components).map(|_| LineBuffer::new(width + 2)).collect();

    let mut buf = vec![0u8; estimate_scan_capacity(width, height, components, traits, restart_interval)];
    let mut offset = 0usize;
    let mut restart_counter = 0u32;
    let mut line = 0usize;

    while line < height {
        let lines_in_interval = std::cmp::min(height - line, effective_restart as usize);
        let mut scan_encoder = ScanEncoder::<P>::new(&mut buf[offset..], traits, preset, components);

        for _ in 0..lines_in_interval {
            for component in 0..components {
                for x in 0..width {
                    current[component].set(x as i32, read_sample(line, component, x));
                }
                let rightmost = previous[component].get(width as i32 - 1);
                previous[component].set(width as i32, rightmost);
                let top_left = previous[component].get(0);
                current[component].set(-1, top_left);

                scan_encoder.encode_line(component, width as i32, &previous[component], &mut current[component])?;
            }
            std::mem::swap(&mut previous, &mut current);
            line += 1;
        }

        offset += scan_encoder.end_scan()?;

        if line < height {
            buf[offset] = crate::marker::JPEG_MARKER_START_BYTE;
            buf[offset + 1] = JPEG_RESTART_MARKER_BASE + (restart_counter % 8) as u8;
            offset += 2;
            restart_counter += 1;
            for lb in previous.iter_mut().chain(current.iter_mut()) {
                *lb = LineBuffer::new(width + 2);
            }
        }
    }

    writer.append_scan_data(&buf[..offset]);
    Ok(())
}
