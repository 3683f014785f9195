//! Shared small enums describing frame and scan shape.

use crate::error::JlsError;

/// Basic information about a JPEG-LS frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FrameInfo {
    pub width: u32,
    pub height: u32,
    pub bits_per_sample: i32,
    pub component_count: i32,
}

/// Interleave mode for multi-component scans, ISO/IEC 14495-1 section 4.6.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InterleaveMode {
    /// Each component is a separate, non-interleaved scan.
    None = 0,
    /// One sample of each component per line, lines interleaved.
    Line = 1,
    /// One sample of each component per pixel, pixels interleaved.
    Sample = 2,
}

impl std::convert::TryFrom<u8> for InterleaveMode {
    type Error = JlsError;
    fn try_from(v: u8) -> Result<Self, Self::Error> {
        match v {
            0 => Ok(Self::None),
            1 => Ok(Self::Line),
            2 => Ok(Self::Sample),
            _ => Err(JlsError::InvalidParameterInterleaveMode),
        }
    }
}

/// Lossless color transformation applied before prediction, as used by
/// CharLS-compatible encoders (outside the formal JPEG-LS standard, carried
/// via the APP8 "mrfx" marker).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorTransformation {
    None = 0,
    Hp1 = 1,
    Hp2 = 2,
    Hp3 = 3,
}

impl std::convert::TryFrom<u8> for ColorTransformation {
    type Error = JlsError;
    fn try_from(v: u8) -> Result<Self, Self::Error> {
        match v {
            0 => Ok(Self::None),
            1 => Ok(Self::Hp1),
            2 => Ok(Self::Hp2),
            3 => Ok(Self::Hp3),
            _ => Err(JlsError::InvalidParameterColorTransformation),
        }
    }
}
