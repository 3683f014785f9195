//! Bit-stream I/O with JPEG marker-safe bit-stuffing, ISO/IEC 14495-1 A.1.

mod reader;
mod writer;

pub use reader::BitReader;
pub use writer::BitWriter;
