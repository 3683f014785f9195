//! JPEG marker codes relevant to a JPEG-LS codestream.

use crate::error::JlsError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum JpegMarkerCode {
    /// SOI: start of image.
    StartOfImage = 0xD8,
    /// EOI: end of image.
    EndOfImage = 0xD9,
    /// SOS: start of scan.
    StartOfScan = 0xDA,
    /// DNL: define number of lines.
    DefineNumberOfLines = 0xDC,
    /// DRI: define restart interval.
    DefineRestartInterval = 0xDD,
    /// APP0-APP15: application data segments (carried through verbatim).
    ApplicationData0 = 0xE0,
    ApplicationData1 = 0xE1,
    ApplicationData2 = 0xE2,
    ApplicationData3 = 0xE3,
    ApplicationData4 = 0xE4,
    ApplicationData5 = 0xE5,
    ApplicationData6 = 0xE6,
    ApplicationData7 = 0xE7,
    /// APP8: used by CharLS-compatible encoders for the HP color-transform hint.
    ApplicationData8 = 0xE8,
    ApplicationData9 = 0xE9,
    ApplicationData10 = 0xEA,
    ApplicationData11 = 0xEB,
    ApplicationData12 = 0xEC,
    ApplicationData13 = 0xED,
    ApplicationData14 = 0xEE,
    ApplicationData15 = 0xEF,
    /// COM: comment.
    Comment = 0xFE,
    /// SOF_55: start of a JPEG-LS encoded frame, ISO/IEC 14495-1.
    StartOfFrameJpegls = 0xF7,
    /// LSE: JPEG-LS preset parameters segment, ISO/IEC 14495-1.
    JpeglsPresetParameters = 0xF8,
    /// RSTm: restart markers (0xD0-0xD7), encoded as a single variant; the
    /// specific index is recovered from the raw byte where needed.
    RestartMarker = 0xD0,
}

pub const JPEG_MARKER_START_BYTE: u8 = 0xFF;
pub const JPEG_RESTART_MARKER_BASE: u8 = 0xD0;
pub const JPEG_RESTART_MARKER_RANGE: u8 = 8;

impl JpegMarkerCode {
    /// True if `byte` is a restart marker (0xD0-0xD7).
    pub fn is_restart_marker(byte: u8) -> bool {
        (JPEG_RESTART_MARKER_BASE..JPEG_RESTART_MARKER_BASE + JPEG_RESTART_MARKER_RANGE)
            .contains(&byte)
    }

    /// True if `byte` is a non-JPEG-LS start-of-frame marker (SOF0-SOF15,
    /// excluding SOF_55 and the reserved/JPG marker). These are recognized
    /// so the frame walker can report `EncodingNotSupported` rather than
    /// silently misparsing another JPEG variant's frame header.
    pub fn is_foreign_start_of_frame(byte: u8) -> bool {
        (0xC0..=0xCF).contains(&byte) && byte != 0xC8
    }
}

impl std::convert::TryFrom<u8> for JpegMarkerCode {
    type Error = JlsError;

    fn try_from(v: u8) -> Result<Self, Self::Error> {
        if JpegMarkerCode::is_restart_marker(v) {
            return Ok(Self::RestartMarker);
        }
        match v {
            0xD8 => Ok(Self::StartOfImage),
            0xD9 => Ok(Self::EndOfImage),
            0xDA => Ok(Self::StartOfScan),
            0xDC => Ok(Self::DefineNumberOfLines),
            0xDD => Ok(Self::DefineRestartInterval),
            0xE0 => Ok(Self::ApplicationData0),
            0xE1 => Ok(Self::ApplicationData1),
            0xE2 => Ok(Self::ApplicationData2),
            0xE3 => Ok(Self::ApplicationData3),
            0xE4 => Ok(Self::ApplicationData4),
            0xE5 => Ok(Self::ApplicationData5),
            0xE6 => Ok(Self::ApplicationData6),
            0xE7 => Ok(Self::ApplicationData7),
            0xE8 => Ok(Self::ApplicationData8),
            0xE9 => Ok(Self::ApplicationData9),
            0xEA => Ok(Self::ApplicationData10),
            0xEB => Ok(Self::ApplicationData11),
            0xEC => Ok(Self::ApplicationData12),
            0xED => Ok(Self::ApplicationData13),
            0xEE => Ok(Self::ApplicationData14),
            0xEF => Ok(Self::ApplicationData15),
            0xFE => Ok(Self::Comment),
            0xF7 => Ok(Self::StartOfFrameJpegls),
            0xF8 => Ok(Self::JpeglsPresetParameters),
            _ if JpegMarkerCode::is_foreign_start_of_frame(v) => {
                Err(JlsError::EncodingNotSupported)
            }
            _ => Err(JlsError::UnknownJpegMarkerFound),
        }
    }
}
