//! Scan decoder, ISO/IEC 14495-1 Annex A.

use std::marker::PhantomData;

use crate::bitstream::BitReader;
use crate::coding_parameters::JpeglsPcParameters;
use crate::constants::J;
use crate::context::{RegularModeContext, RunModeContext};
use crate::error::JlsError;
use crate::golomb::GOLOMB_LUT;
use crate::quant::{compute_context_id, get_predicted_value, quantize_gradient, unmap_error_value};
use crate::sample::{apply_sign, bit_wise_sign, sign, Pixel, Traits};

use super::{decrement_run_index, increment_run_index, LineBuffer};

/// Decodes one scan's entropy-coded bit-stream back into pixels, the
/// inverse of [`super::ScanEncoder`].
pub struct ScanDecoder<'a, P: Pixel> {
    reader: BitReader<'a>,
    traits: Traits,
    t1: i32,
    t2: i32,
    t3: i32,
    contexts: Vec<RegularModeContext>,
    run_mode_contexts: [RunModeContext; 2],
    /// See [`super::ScanEncoder::run_index`].
    run_index: Vec<i32>,
    active: usize,
    _pixel: PhantomData<P>,
}

impl<'a, P: Pixel> ScanDecoder<'a, P> {
    pub fn new(source: &'a [u8], traits: Traits, preset: JpeglsPcParameters, component_count: usize) -> Self {
        Self {
            reader: BitReader::new(source),
            contexts: (0..365).map(|_| RegularModeContext::new(traits.range)).collect(),
            run_mode_contexts: [
                RunModeContext::new(0, traits.range),
                RunModeContext::new(1, traits.range),
            ],
            run_index: vec![0; component_count.max(1)],
            active: 0,
            t1: preset.threshold1,
            t2: preset.threshold2,
            t3: preset.threshold3,
            traits,
            _pixel: PhantomData,
        }
    }

    pub fn decode_line(
        &mut self,
        component: usize,
        width: i32,
        previous: &LineBuffer<P>,
        current: &mut LineBuffer<P>,
    ) -> Result<(), JlsError> {
        self.active = component;
        let mut index = 0i32;
        while index < width {
            let ra = current.get(index - 1);
            let rc = previous.get(index - 1);
            let rb = previous.get(index);
            let rd = previous.get(index + 1);

            let mut qs = [0i32; 4];
            let mut all_zero = true;
            for c in 0..P::CHANNELS {
                let q = compute_context_id(
                    quantize_gradient(rd.channel(c) - rb.channel(c), self.traits.near, self.t1, self.t2, self.t3),
                    quantize_gradient(rb.channel(c) - rc.channel(c), self.traits.near, self.t1, self.t2, self.t3),
                    quantize_gradient(rc.channel(c) - ra.channel(c), self.traits.near, self.t1, self.t2, self.t3),
                );
                qs[c] = q;
                all_zero &= q == 0;
            }

            if all_zero {
                index += self.decode_run_mode(index, width, previous, current)?;
            } else {
                let mut rx = P::default();
                for c in 0..P::CHANNELS {
                    let predicted = get_predicted_value(ra.channel(c), rb.channel(c), rc.channel(c));
                    let v = self.decode_regular(qs[c], predicted)?;
                    rx.set_channel(c, v);
                }
                current.set(index, rx);
                index += 1;
            }
        }
        Ok(())
    }

    fn decode_regular(&mut self, qs: i32, predicted: i32) -> Result<i32, JlsError> {
        let sign = bit_wise_sign(qs);
        let context_index = apply_sign(qs, sign) as usize;
        let context = self.contexts[context_index];
        let k = context.compute_golomb_coding_parameter()?;
        let predicted_value = self.traits.correct_prediction(predicted + apply_sign(context.c(), sign));

        let peeked = self.reader.peek_byte() as usize;
        let code = GOLOMB_LUT[k as usize][peeked];
        let mut error_value = if code.bit_count != 0 {
            self.reader.skip(code.bit_count as i32);
            code.error_value as i32
        } else {
            unmap_error_value(self.decode_value(k, self.traits.limit)?)
        };

        if error_value.abs() > 65535 {
            return Err(JlsError::InvalidData);
        }

        if k == 0 {
            error_value ^= context.get_error_correction(self.traits.near);
        }
        self.contexts[context_index].update_variables_and_bias(error_value, self.traits.near, self.traits.reset)?;
        error_value = apply_sign(error_value, sign);
        Ok(self.traits.compute_reconstructed_sample(predicted_value, error_value))
    }

    fn decode_value(&mut self, k: i32, limit: i32) -> Result<i32, JlsError> {
        let qbpp = self.traits.qbpp;
        let high_bits = self.reader.read_high_bits()?;
        if high_bits >= limit - (qbpp + 1) {
            return Ok(self.reader.read_value(qbpp)? + 1);
        }
        if k == 0 {
            return Ok(high_bits);
        }
        Ok((high_bits << k) + self.reader.read_value(k)?)
    }

    fn decode_run_mode(
        &mut self,
        start_index: i32,
        width: i32,
        previous: &LineBuffer<P>,
        current: &mut LineBuffer<P>,
    ) -> Result<i32, JlsError> {
        let ra = current.get(start_index - 1);

        let run_length = self.decode_run_pixels(ra, start_index, width - start_index, current)?;
        let end_index = start_index + run_length;

        if end_index == width {
            return Ok(end_index - start_index);
        }

        let rb = previous.get(end_index);
        let rx = self.decode_run_interruption_pixel(ra, rb)?;
        current.set(end_index, rx);
        self.run_index[self.active] = decrement_run_index(self.run_index[self.active]);
        Ok(end_index - start_index + 1)
    }

    fn decode_run_pixels(
        &mut self,
        ra: P,
        start_index: i32,
        pixel_count: i32,
        current: &mut LineBuffer<P>,
    ) -> Result<i32, JlsError> {
        let mut index = 0i32;
        while self.reader.read_bit()? {
            let count = std::cmp::min(1 << J[self.run_index[self.active] as usize], pixel_count - index);
            index += count;
            if count == 1 << J[self.run_index[self.active] as usize] {
                self.run_index[self.active] = increment_run_index(self.run_index[self.active]);
            }
            if index == pixel_count {
                break;
            }
        }

        if index != pixel_count {
            index += if J[self.run_index[self.active] as usize] > 0 {
                self.reader.read_value(J[self.run_index[self.active] as usize])?
            } else {
                0
            };
        }

        if index > pixel_count {
            return Err(JlsError::InvalidData);
        }

        for i in 0..index {
            current.set(start_index + i, ra);
        }
        Ok(index)
    }

    fn decode_run_interruption_error(&mut self, context_index: usize) -> Result<i32, JlsError> {
        let context = self.run_mode_contexts[context_index];
        let k = context.compute_golomb_coding_parameter();
        let e_mapped_error_value =
            self.decode_value(k, self.traits.limit - J[self.run_index[self.active] as usize] - 1)?;
        let error_value = context.decode_error_value(e_mapped_error_value + context.run_interruption_type(), k);
        self.run_mode_contexts[context_index].update_variables(error_value, e_mapped_error_value, self.traits.reset);
        Ok(error_value)
    }

    fn decode_run_interruption_pixel(&mut self, ra: P, rb: P) -> Result<P, JlsError> {
        if P::CHANNELS == 1 {
            let (ra, rb) = (ra.channel(0), rb.channel(0));
            let value = if (ra - rb).abs() <= self.traits.near {
                let error_value = self.decode_run_interruption_error(1)?;
                self.traits.compute_reconstructed_sample(ra, error_value)
            } else {
                let error_value = self.decode_run_interruption_error(0)?;
                self.traits.compute_reconstructed_sample(rb, error_value * sign(rb - ra))
            };
            let mut result = P::default();
            result.set_channel(0, value);
            return Ok(result);
        }

        let mut result = P::default();
        for c in 0..P::CHANNELS {
            let error_value = self.decode_run_interruption_error(0)?;
            result.set_channel(
                c,
                self.traits
                    .compute_reconstructed_sample(rb.channel(c), error_value * sign(rb.channel(c) - ra.channel(c))),
            );
        }
        Ok(result)
    }

    /// Byte offset of the marker immediately following the bits consumed so
    /// far, valid at any point a full line has just been decoded. Used by
    /// the frame walker to locate a restart marker or the scan's trailing
    /// marker without consuming it.
    pub fn current_byte_position(&self) -> usize {
        self.reader.current_byte_position()
    }

    /// Verifies no extra encoded data trails the scan, ISO/IEC 14495-1's
    /// end-of-scan check. Call once after the last [`Self::decode_line`] in
    /// a restart segment (or the whole scan, if no restart interval).
    pub fn end_scan(mut self) -> Result<(), JlsError> {
        self.reader.end_scan()
    }
}
