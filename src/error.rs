//! Error taxonomy for the JPEG-LS codec core.
//!
//! Mirrors CharLS's `jpegls_errc` exception taxonomy as a plain `Result`
//! error type, trimmed of the SPIFF-specific variants (SPIFF headers are
//! out of scope for this crate).

use thiserror::Error;

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum JlsError {
    #[error("destination buffer too small")]
    DestinationTooSmall,
    #[error("not enough encoded data to complete the operation")]
    NeedMoreData,
    #[error("invalid encoded data")]
    InvalidData,
    #[error("encoding not supported")]
    EncodingNotSupported,
    #[error("parameter value not supported")]
    ParameterValueNotSupported,
    #[error("color transform not supported for this frame")]
    ColorTransformNotSupported,
    #[error("JPEG-LS preset parameter type not supported")]
    JpeglsPresetExtendedParameterTypeNotSupported,
    #[error("JPEG marker start byte (0xFF) not found")]
    JpegMarkerStartByteNotFound,
    #[error("start of image marker not found")]
    StartOfImageMarkerNotFound,
    #[error("unknown JPEG marker found")]
    UnknownJpegMarkerFound,
    #[error("unexpected start of scan marker")]
    UnexpectedStartOfScanMarker,
    #[error("invalid marker segment size")]
    InvalidMarkerSegmentSize,
    #[error("duplicate start of image marker")]
    DuplicateStartOfImageMarker,
    #[error("duplicate start of frame marker")]
    DuplicateStartOfFrameMarker,
    #[error("unexpected end of image marker")]
    UnexpectedEndOfImageMarker,
    #[error("end of image marker not found")]
    EndOfImageMarkerNotFound,
    #[error("invalid JPEG-LS preset parameter type")]
    InvalidJpeglsPresetParameterType,
    #[error("unexpected restart marker")]
    UnexpectedRestartMarker,
    #[error("restart marker not found")]
    RestartMarkerNotFound,
    #[error("too much encoded data for the declared frame size")]
    TooMuchEncodedData,

    #[error("invalid parameter: width")]
    InvalidParameterWidth,
    #[error("invalid parameter: height")]
    InvalidParameterHeight,
    #[error("invalid parameter: bits per sample")]
    InvalidParameterBitsPerSample,
    #[error("invalid parameter: component count")]
    InvalidParameterComponentCount,
    #[error("invalid parameter: interleave mode")]
    InvalidParameterInterleaveMode,
    #[error("invalid parameter: near lossless")]
    InvalidParameterNearLossless,
    #[error("invalid parameter: JPEG-LS preset coding parameters")]
    InvalidParameterJpeglsPresetParameters,
    #[error("invalid parameter: color transformation")]
    InvalidParameterColorTransformation,

    #[error("invalid operation for current codec state")]
    InvalidOperation,
    #[error("invalid argument")]
    InvalidArgument,
}
