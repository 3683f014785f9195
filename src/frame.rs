//! Frame walker: reads and writes the JPEG marker segments that wrap a
//! JPEG-LS codestream (SOI/SOF55/LSE/DRI/SOS/RSTm/EOI), ISO/IEC 14495-1
//! Annex C.
//!
//! Application data (APPn), comment (COM) and foreign start-of-frame
//! markers are recognized structurally (so the walker can skip or reject
//! them) but their payloads are not interpreted, beyond the CharLS-style
//! APP8 "mrfx" marker this crate uses to self-describe a lossless color
//! transform, since that information isn't otherwise representable in a
//! plain JPEG-LS stream.

use crate::coding_parameters::{is_default, JpeglsPcParameters};
use crate::error::JlsError;
use crate::marker::{JpegMarkerCode, JPEG_MARKER_START_BYTE, JPEG_RESTART_MARKER_BASE};
use crate::types::{ColorTransformation, FrameInfo, InterleaveMode};

const MRFX_TAG: [u8; 4] = *b"mrfx";

/// Appends marker segments to a growable byte buffer.
pub struct FrameWriter<'a> {
    dest: &'a mut Vec<u8>,
}

impl<'a> FrameWriter<'a> {
    pub fn new(dest: &'a mut Vec<u8>) -> Self {
        Self { dest }
    }

    fn write_marker_code(&mut self, code: JpegMarkerCode) {
        self.dest.push(JPEG_MARKER_START_BYTE);
        self.dest.push(code as u8);
    }

    fn write_segment(&mut self, code: JpegMarkerCode, payload: &[u8]) {
        self.write_marker_code(code);
        let length = (payload.len() + 2) as u16;
        self.dest.extend_from_slice(&length.to_be_bytes());
        self.dest.extend_from_slice(payload);
    }

    pub fn write_start_of_image(&mut self) {
        self.write_marker_code(JpegMarkerCode::StartOfImage);
    }

    pub fn write_end_of_image(&mut self) {
        self.write_marker_code(JpegMarkerCode::EndOfImage);
    }

    /// SOF55, ISO/IEC 14495-1 C.2.2.
    pub fn write_start_of_frame(&mut self, frame: &FrameInfo) -> Result<(), JlsError> {
        if frame.component_count < 1 || frame.component_count > 255 {
            return Err(JlsError::InvalidParameterComponentCount);
        }
        let mut payload = Vec::with_capacity(6 + 3 * frame.component_count as usize);
        payload.push(frame.bits_per_sample as u8);
        payload.extend_from_slice(&(frame.height as u16).to_be_bytes());
        payload.extend_from_slice(&(frame.width as u16).to_be_bytes());
        payload.push(frame.component_count as u8);
        for component_id in 1..=frame.component_count {
            payload.push(component_id as u8);
            payload.push(0x11); // Hi/Vi: no subsampling.
            payload.push(0); // Tqi: no quantization table.
        }
        self.write_segment(JpegMarkerCode::StartOfFrameJpegls, &payload);
        Ok(())
    }

    /// LSE preset coding parameters segment (type 1), ISO/IEC 14495-1 C.2.4.1.1.
    pub fn write_preset_parameters(&mut self, preset: &JpeglsPcParameters, defaults: &JpeglsPcParameters) {
        if is_default(preset, defaults) {
            return;
        }
        let mut payload = Vec::with_capacity(11);
        payload.push(1); // ID: preset coding parameters.
        payload.extend_from_slice(&(preset.maximum_sample_value as u16).to_be_bytes());
        payload.extend_from_slice(&(preset.threshold1 as u16).to_be_bytes());
        payload.extend_from_slice(&(preset.threshold2 as u16).to_be_bytes());
        payload.extend_from_slice(&(preset.threshold3 as u16).to_be_bytes());
        payload.extend_from_slice(&(preset.reset_value as u16).to_be_bytes());
        self.write_segment(JpegMarkerCode::JpeglsPresetParameters, &payload);
    }

    /// DRI, ISO/IEC 14495-1 C.2.5.
    pub fn write_restart_interval(&mut self, restart_interval: u32) {
        if restart_interval == 0 {
            return;
        }
        self.write_segment(
            JpegMarkerCode::DefineRestartInterval,
            &(restart_interval as u32).to_be_bytes(),
        );
    }

    /// APP8 "mrfx" marker this crate uses to record a non-standard lossless
    /// color transform, grounded on CharLS's own use of APP8 for the same
    /// purpose.
    pub fn write_color_transform(&mut self, transformation: ColorTransformation) {
        if transformation == ColorTransformation::None {
            return;
        }
        let mut payload = Vec::with_capacity(5);
        payload.extend_from_slice(&MRFX_TAG);
        payload.push(transformation as u8);
        self.write_segment(JpegMarkerCode::ApplicationData8, &payload);
    }

    /// SOS, ISO/IEC 14495-1 C.2.3. `component_ids` lists the components
    /// carried by this scan (all of them for `Line`/`Sample` interleave, one
    /// for `None`).
    pub fn write_start_of_scan(
        &mut self,
        component_ids: &[i32],
        near_lossless: i32,
        interleave_mode: InterleaveMode,
    ) {
        let mut payload = Vec::with_capacity(4 + 2 * component_ids.len());
        payload.push(component_ids.len() as u8);
        for &id in component_ids {
            payload.push(id as u8);
            payload.push(0); // mapping table selector: none.
        }
        payload.push(near_lossless as u8);
        payload.push(interleave_mode as u8);
        payload.push(0); // point transform: none.
        self.write_segment(JpegMarkerCode::StartOfScan, &payload);
    }

    /// Writes one restart marker (RSTm), cycling `m` through 0-7.
    pub fn write_restart_marker(&mut self, counter: u32) {
        self.dest.push(JPEG_MARKER_START_BYTE);
        self.dest
            .push(JPEG_RESTART_MARKER_BASE + (counter % 8) as u8);
    }

    pub fn append_scan_data(&mut self, data: &[u8]) {
        self.dest.extend_from_slice(data);
    }
}

/// Parses marker segments out of a byte buffer, stopping at scan data.
pub struct FrameReader<'a> {
    source: &'a [u8],
    position: usize,
}

/// Fields recovered from an SOS segment.
pub struct ScanHeader {
    pub component_ids: Vec<i32>,
    pub near_lossless: i32,
    pub interleave_mode: InterleaveMode,
}

impl<'a> FrameReader<'a> {
    pub fn new(source: &'a [u8]) -> Self {
        Self { source, position: 0 }
    }

    pub fn position(&self) -> usize {
        self.position
    }

    fn read_u8(&mut self) -> Result<u8, JlsError> {
        let b = *self.source.get(self.position).ok_or(JlsError::InvalidData)?;
        self.position += 1;
        Ok(b)
    }

    fn read_u16(&mut self) -> Result<u16, JlsError> {
        let hi = self.read_u8()? as u16;
        let lo = self.read_u8()? as u16;
        Ok((hi << 8) | lo)
    }

    fn read_segment(&mut self) -> Result<&'a [u8], JlsError> {
        let length = self.read_u16()? as usize;
        if length < 2 {
            return Err(JlsError::InvalidMarkerSegmentSize);
        }
        let payload_len = length - 2;
        let end = self.position + payload_len;
        let payload = self.source.get(self.position..end).ok_or(JlsError::InvalidMarkerSegmentSize)?;
        self.position = end;
        Ok(payload)
    }

    /// Reads the next marker code, failing if the next byte isn't `0xFF`.
    pub fn read_next_marker(&mut self) -> Result<JpegMarkerCode, JlsError> {
        if self.read_u8()? != JPEG_MARKER_START_BYTE {
            return Err(JlsError::JpegMarkerStartByteNotFound);
        }
        let mut code_byte = self.read_u8()?;
        while code_byte == JPEG_MARKER_START_BYTE {
            // JPEG allows fill bytes of 0xFF before the marker code.
            code_byte = self.read_u8()?;
        }
        JpegMarkerCode::try_from(code_byte)
    }

    pub fn read_start_of_image(&mut self) -> Result<(), JlsError> {
        match self.read_next_marker()? {
            JpegMarkerCode::StartOfImage => Ok(()),
            _ => Err(JlsError::StartOfImageMarkerNotFound),
        }
    }

    pub fn read_start_of_frame(&mut self) -> Result<FrameInfo, JlsError> {
        let payload = self.read_segment()?;
        if payload.len() < 6 {
            return Err(JlsError::InvalidMarkerSegmentSize);
        }
        let bits_per_sample = payload[0] as i32;
        let height = u16::from_be_bytes([payload[1], payload[2]]) as u32;
        let width = u16::from_be_bytes([payload[3], payload[4]]) as u32;
        let component_count = payload[5] as i32;
        Ok(FrameInfo { width, height, bits_per_sample, component_count })
    }

    pub fn read_preset_parameters(&mut self) -> Result<JpeglsPcParameters, JlsError> {
        let payload = self.read_segment()?;
        if payload.is_empty() {
            return Err(JlsError::InvalidMarkerSegmentSize);
        }
        if payload[0] != 1 {
            return Err(JlsError::JpeglsPresetExtendedParameterTypeNotSupported);
        }
        if payload.len() < 11 {
            return Err(JlsError::InvalidMarkerSegmentSize);
        }
        Ok(JpeglsPcParameters {
            maximum_sample_value: u16::from_be_bytes([payload[1], payload[2]]) as i32,
            threshold1: u16::from_be_bytes([payload[3], payload[4]]) as i32,
            threshold2: u16::from_be_bytes([payload[5], payload[6]]) as i32,
            threshold3: u16::from_be_bytes([payload[7], payload[8]]) as i32,
            reset_value: u16::from_be_bytes([payload[9], payload[10]]) as i32,
        })
    }

    pub fn read_restart_interval(&mut self) -> Result<u32, JlsError> {
        let payload = self.read_segment()?;
        if payload.len() != 4 {
            return Err(JlsError::InvalidMarkerSegmentSize);
        }
        Ok(u32::from_be_bytes([payload[0], payload[1], payload[2], payload[3]]))
    }

    /// Returns `None` for an APPn segment this crate doesn't recognize
    /// (simply skipped), or the color transform for a recognized "mrfx"
    /// payload.
    pub fn read_application_data(&mut self) -> Result<Option<ColorTransformation>, JlsError> {
        let payload = self.read_segment()?;
        if payload.len() == 5 && payload[0..4] == MRFX_TAG {
            return Ok(Some(ColorTransformation::try_from(payload[4])?));
        }
        Ok(None)
    }

    /// Skips an unrecognized segment (COM, or an APPn this crate ignores).
    pub fn skip_segment(&mut self) -> Result<(), JlsError> {
        self.read_segment().map(|_| ())
    }

    pub fn read_start_of_scan(&mut self) -> Result<ScanHeader, JlsError> {
        let payload = self.read_segment()?;
        if payload.is_empty() {
            return Err(JlsError::InvalidMarkerSegmentSize);
        }
        let component_count = payload[0] as usize;
        if payload.len() != 4 + 2 * component_count {
            return Err(JlsError::InvalidMarkerSegmentSize);
        }
        let mut component_ids = Vec::with_capacity(component_count);
        for i in 0..component_count {
            component_ids.push(payload[1 + 2 * i] as i32);
        }
        let near_lossless = payload[1 + 2 * component_count] as i32;
        let interleave_mode = InterleaveMode::try_from(payload[2 + 2 * component_count])?;
        Ok(ScanHeader { component_ids, near_lossless, interleave_mode })
    }

    /// Consumes one restart marker, verifying its cyclic index matches
    /// `expected_counter % 8`.
    pub fn read_restart_marker(&mut self, expected_counter: u32) -> Result<(), JlsError> {
        if self.read_u8()? != JPEG_MARKER_START_BYTE {
            return Err(JlsError::RestartMarkerNotFound);
        }
        let code = self.read_u8()?;
        if !JpegMarkerCode::is_restart_marker(code) {
            return Err(JlsError::RestartMarkerNotFound);
        }
        if code - JPEG_RESTART_MARKER_BASE != (expected_counter % 8) as u8 {
            return Err(JlsError::UnexpectedRestartMarker);
        }
        Ok(())
    }

    /// Remaining bytes from the current position onward, for handing the
    /// scan's entropy-coded data to [`crate::scan::ScanDecoder`].
    pub fn remaining(&self) -> &'a [u8] {
        &self.source[self.position..]
    }

    pub fn advance(&mut self, count: usize) {
        self.position += count;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn frame_header_round_trips() {
        let mut buf = Vec::new();
        let mut writer = FrameWriter::new(&mut buf);
        writer.write_start_of_image();
        let frame = FrameInfo { width: 512, height: 256, bits_per_sample: 8, component_count: 1 };
        writer.write_start_of_frame(&frame).unwrap();
        writer.write_start_of_scan(&[1], 0, InterleaveMode::None);
        writer.write_end_of_image();

        let mut reader = FrameReader::new(&buf);
        reader.read_start_of_image().unwrap();
        assert_eq!(reader.read_next_marker().unwrap(), JpegMarkerCode::StartOfFrameJpegls);
        let read_frame = reader.read_start_of_frame().unwrap();
        assert_eq!(read_frame, frame);
        assert_eq!(reader.read_next_marker().unwrap(), JpegMarkerCode::StartOfScan);
        let scan = reader.read_start_of_scan().unwrap();
        assert_eq!(scan.component_ids, vec![1]);
        assert_eq!(scan.interleave_mode, InterleaveMode::None);
        assert_eq!(reader.read_next_marker().unwrap(), JpegMarkerCode::EndOfImage);
    }

    #[test]
    fn preset_parameters_round_trip_when_non_default() {
        let mut buf = Vec::new();
        let mut writer = FrameWriter::new(&mut buf);
        let preset = JpeglsPcParameters {
            maximum_sample_value: 255,
            threshold1: 9,
            threshold2: 20,
            threshold3: 100,
            reset_value: 63,
        };
        let defaults = crate::coding_parameters::compute_default(255, 0);
        writer.write_preset_parameters(&preset, &defaults);

        let mut reader = FrameReader::new(&buf);
        assert_eq!(reader.read_next_marker().unwrap(), JpegMarkerCode::JpeglsPresetParameters);
        assert_eq!(reader.read_preset_parameters().unwrap(), preset);
    }

    #[test]
    fn default_preset_parameters_are_not_written() {
        let mut buf = Vec::new();
        let mut writer = FrameWriter::new(&mut buf);
        let defaults = crate::coding_parameters::compute_default(255, 0);
        writer.write_preset_parameters(&defaults, &defaults);
        assert!(buf.is_empty());
    }
}
