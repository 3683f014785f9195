//! Scan encoder, ISO/IEC 14495-1 Annex A.

use std::marker::PhantomData;

use crate::bitstream::BitWriter;
use crate::coding_parameters::JpeglsPcParameters;
use crate::constants::J;
use crate::context::{RegularModeContext, RunModeContext};
use crate::error::JlsError;
use crate::quant::{compute_context_id, get_predicted_value, map_error_value, quantize_gradient};
use crate::sample::{apply_sign, bit_wise_sign, sign, Pixel, Traits};

use super::{decrement_run_index, increment_run_index, LineBuffer};

/// Encodes one scan (one component for `None`/`Line` interleave, or the
/// whole multi-component pixel stream for `Sample` interleave) into an
/// entropy-coded bit-stream.
pub struct ScanEncoder<'a, P: Pixel> {
    writer: BitWriter<'a>,
    traits: Traits,
    t1: i32,
    t2: i32,
    t3: i32,
    contexts: Vec<RegularModeContext>,
    run_mode_contexts: [RunModeContext; 2],
    /// One run index per virtual component. `Sample`-interleaved and
    /// single-component scans only ever use slot 0; `Line` interleave keeps
    /// one slot per component, saved and restored around each component's
    /// turn within a shared line, matching the reference coder's per-line
    /// component loop sharing one context table but separate run state.
    run_index: Vec<i32>,
    active: usize,
    _pixel: PhantomData<P>,
}

impl<'a, P: Pixel> ScanEncoder<'a, P> {
    pub fn new(destination: &'a mut [u8], traits: Traits, preset: JpeglsPcParameters, component_count: usize) -> Self {
        Self {
            writer: BitWriter::new(destination),
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

    /// Encodes a single scan line for the given virtual component (always 0
    /// outside `Line` interleave). `previous`/`current` must be sized for
    /// `width` plus the edge padding `LineBuffer` expects; `current` carries
    /// the unencoded source samples in and the reconstructed (possibly
    /// near-lossless-quantized) samples out.
    pub fn encode_line(
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
                index += self.encode_run_mode(index, width, previous, current)?;
            } else {
                let mut rx = P::default();
                for c in 0..P::CHANNELS {
                    let predicted = get_predicted_value(ra.channel(c), rb.channel(c), rc.channel(c));
                    let v = self.encode_regular(qs[c], current.get(index).channel(c), predicted)?;
                    rx.set_channel(c, v);
                }
                current.set(index, rx);
                index += 1;
            }
        }
        Ok(())
    }

    fn encode_regular(&mut self, qs: i32, x: i32, predicted: i32) -> Result<i32, JlsError> {
        let sign = bit_wise_sign(qs);
        let context_index = apply_sign(qs, sign) as usize;

        let (k, correction, c) = {
            let context = &self.contexts[context_index];
            let k = context.compute_golomb_coding_parameter()?;
            (k, context.get_error_correction(k | self.traits.near), context.c())
        };
        let predicted_value = self.traits.correct_prediction(predicted + apply_sign(c, sign));
        let error_value = self.traits.compute_err_val(apply_sign(x - predicted_value, sign));

        self.encode_mapped_value(k, map_error_value(correction ^ error_value), self.traits.limit)?;
        self.contexts[context_index].update_variables_and_bias(error_value, self.traits.near, self.traits.reset)?;

        Ok(self.traits.compute_reconstructed_sample(predicted_value, apply_sign(error_value, sign)))
    }

    fn encode_mapped_value(&mut self, k: i32, mapped_error: i32, limit: i32) -> Result<(), JlsError> {
        let qbpp = self.traits.qbpp;
        let mut high_bits = mapped_error >> k;

        if high_bits < limit - qbpp - 1 {
            if high_bits + 1 > 31 {
                self.writer.append_to_bit_stream(0, high_bits / 2)?;
                high_bits -= high_bits / 2;
            }
            self.writer.append_to_bit_stream(1, high_bits + 1)?;
            self.writer
                .append_to_bit_stream((mapped_error & ((1 << k) - 1)) as u32, k)?;
            return Ok(());
        }

        if limit - qbpp > 31 {
            self.writer.append_to_bit_stream(0, 31)?;
            self.writer.append_to_bit_stream(1, limit - qbpp - 31)?;
        } else {
            self.writer.append_to_bit_stream(1, limit - qbpp)?;
        }
        self.writer
            .append_to_bit_stream(((mapped_error - 1) & ((1 << qbpp) - 1)) as u32, qbpp)
    }

    fn encode_run_mode(
        &mut self,
        index: i32,
        width: i32,
        previous: &LineBuffer<P>,
        current: &mut LineBuffer<P>,
    ) -> Result<i32, JlsError> {
        let count_type_remain = width - index;
        let ra = current.get(index - 1);

        let mut run_length = 0i32;
        while self.traits.pixel_is_near(current.get(index + run_length), ra) {
            current.set(index + run_length, ra);
            run_length += 1;
            if run_length == count_type_remain {
                break;
            }
        }
        self.encode_run_pixels(run_length, run_length == count_type_remain)?;

        if run_length == count_type_remain {
            return Ok(run_length);
        }

        let rb = previous.get(index + run_length);
        let x = current.get(index + run_length);
        let rx = self.encode_run_interruption_pixel(x, ra, rb)?;
        current.set(index + run_length, rx);
        self.run_index[self.active] = decrement_run_index(self.run_index[self.active]);
        Ok(run_length + 1)
    }

    fn encode_run_pixels(&mut self, mut run_length: i32, end_of_line: bool) -> Result<(), JlsError> {
        while run_length >= 1 << J[self.run_index[self.active] as usize] {
            self.writer.append_ones_to_bit_stream(1)?;
            run_length -= 1 << J[self.run_index[self.active] as usize];
            self.run_index[self.active] = increment_run_index(self.run_index[self.active]);
        }

        if end_of_line {
            if run_length != 0 {
                self.writer.append_ones_to_bit_stream(1)?;
            }
        } else {
            self.writer
                .append_to_bit_stream(run_length as u32, J[self.run_index[self.active] as usize] + 1)?;
        }
        Ok(())
    }

    fn encode_run_interruption_pixel(&mut self, x: P, ra: P, rb: P) -> Result<P, JlsError> {
        if P::CHANNELS == 1 {
            let (x, ra, rb) = (x.channel(0), ra.channel(0), rb.channel(0));
            let value = if (ra - rb).abs() <= self.traits.near {
                let error_value = self.traits.compute_err_val(x - ra);
                self.encode_run_interruption_error(1, error_value)?;
                self.traits.compute_reconstructed_sample(ra, error_value)
            } else {
                let s = sign(rb - ra);
                let error_value = self.traits.compute_err_val((x - rb) * s);
                self.encode_run_interruption_error(0, error_value)?;
                self.traits.compute_reconstructed_sample(rb, error_value * s)
            };
            let mut result = P::default();
            result.set_channel(0, value);
            return Ok(result);
        }

        let mut result = P::default();
        for c in 0..P::CHANNELS {
            let s = sign(rb.channel(c) - ra.channel(c));
            let error_value = self.traits.compute_err_val(s * (x.channel(c) - rb.channel(c)));
            self.encode_run_interruption_error(0, error_value)?;
            result.set_channel(c, self.traits.compute_reconstructed_sample(rb.channel(c), error_value * s));
        }
        Ok(result)
    }

    fn encode_run_interruption_error(&mut self, context_index: usize, error_value: i32) -> Result<(), JlsError> {
        let context = &self.run_mode_contexts[context_index];
        let k = context.compute_golomb_coding_parameter();
        let map = context.compute_map(error_value, k);
        let e_mapped_error_value =
            2 * error_value.abs() - context.run_interruption_type() - (map as i32);

        self.encode_mapped_value(k, e_mapped_error_value, self.traits.limit - J[self.run_index[self.active] as usize] - 1)?;
        self.run_mode_contexts[context_index].update_variables(error_value, e_mapped_error_value, self.traits.reset);
        Ok(())
    }

    /// Flushes any buffered bits and byte-aligns the stream. Call once after
    /// the last [`Self::encode_line`] call. Returns the number of bytes
    /// written to the destination.
    pub fn end_scan(mut self) -> Result<usize, JlsError> {
        self.writer.end_scan()?;
        Ok(self.writer.len())
    }
}
