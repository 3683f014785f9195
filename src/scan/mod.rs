//! Scan coder: predicts, quantizes gradients, and Golomb/run codes a single
//! JPEG-LS scan's samples, ISO/IEC 14495-1 Annex A.
//!
//! A "scan" here is generic over [`Pixel`]: a bare sample (`u8`/`u16`) for
//! `None`/`Line` interleave, or a `Triplet`/`Quad` for `Sample` interleave.
//! Both cases share one 365-entry regular-mode context table and one pair of
//! run-mode contexts per scan, with a per-channel loop standing in for the
//! reference decoder's three separately generated pixel-type code paths.

mod decoder;
mod encoder;

pub use decoder::ScanDecoder;
pub use encoder::ScanEncoder;

use crate::sample::Pixel;

/// One scan line with a sample of padding before index 0 and a few after
/// `width`, addressed the way the reference coder walks `previous_line_`/
/// `current_line_` pointers with negative and past-the-end offsets.
pub(crate) struct LineBuffer<P> {
    data: Vec<P>,
}

impl<P: Pixel> LineBuffer<P> {
    pub(crate) fn new(stride: usize) -> Self {
        Self {
            data: vec![P::default(); stride],
        }
    }

    pub(crate) fn get(&self, index: i32) -> P {
        self.data[(index + 1) as usize]
    }

    pub(crate) fn set(&mut self, index: i32, value: P) {
        self.data[(index + 1) as usize] = value;
    }
}

pub(crate) fn increment_run_index(run_index: i32) -> i32 {
    std::cmp::min(run_index + 1, 31)
}

pub(crate) fn decrement_run_index(run_index: i32) -> i32 {
    std::cmp::max(run_index - 1, 0)
}
