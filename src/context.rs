//! Context models, ISO/IEC 14495-1 Annex A.6 / A.7.

use crate::constants::MAX_K_VALUE;
use crate::error::JlsError;
use crate::sample::bit_wise_sign;

/// Statistics for one of the 365 regular-mode contexts (A, B, C, N),
/// ISO/IEC 14495-1 A.6.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RegularModeContext {
    a: i32,
    b: i32,
    c: i32,
    n: i32,
}

impl RegularModeContext {
    pub fn new(range: i32) -> Self {
        Self {
            a: initialization_value_for_a(range),
            b: 0,
            c: 0,
            n: 1,
        }
    }

    pub fn c(&self) -> i32 {
        self.c
    }

    /// ISO/IEC 14495-1 A.6, bias correction used only when k == 0.
    pub fn get_error_correction(&self, k: i32) -> i32 {
        if k != 0 {
            0
        } else {
            bit_wise_sign(2 * self.b + self.n - 1)
        }
    }

    /// Updates A/B/N/C and halves on reset, ISO/IEC 14495-1 code segment A.13.
    pub fn update_variables_and_bias(
        &mut self,
        error_value: i32,
        near_lossless: i32,
        reset_threshold: i32,
    ) -> Result<(), JlsError> {
        debug_assert!(self.n != 0);

        self.a += error_value.abs();
        self.b += error_value * (2 * near_lossless + 1);

        if self.a >= 65536 * 256 || self.b.abs() >= 65536 * 256 {
            return Err(JlsError::InvalidData);
        }

        if self.n == reset_threshold {
            self.a >>= 1;
            self.b >>= 1;
            self.n >>= 1;
        }

        self.n += 1;
        debug_assert!(self.n != 0);

        const MAX_C: i32 = 127;
        const MIN_C: i32 = -128;

        if self.b + self.n <= 0 {
            self.b += self.n;
            if self.b <= -self.n {
                self.b = -self.n + 1;
            }
            if self.c > MIN_C {
                self.c -= 1;
            }
        } else if self.b > 0 {
            self.b -= self.n;
            if self.b > 0 {
                self.b = 0;
            }
            if self.c < MAX_C {
                self.c += 1;
            }
        }
        Ok(())
    }

    /// ISO/IEC 14495-1 code segment A.10.
    pub fn compute_golomb_coding_parameter(&self) -> Result<i32, JlsError> {
        let mut k = 0;
        while (self.n << k) < self.a && k < MAX_K_VALUE {
            k += 1;
        }
        if k == MAX_K_VALUE {
            return Err(JlsError::InvalidData);
        }
        Ok(k)
    }
}

/// Statistics for one of the two run-interruption contexts, ISO/IEC 14495-1
/// A.7.2.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunModeContext {
    run_interruption_type: i32,
    a: i32,
    n: i32,
    nn: i32,
}

impl RunModeContext {
    pub fn new(run_interruption_type: i32, range: i32) -> Self {
        Self {
            run_interruption_type,
            a: initialization_value_for_a(range),
            n: 1,
            nn: 0,
        }
    }

    pub fn run_interruption_type(&self) -> i32 {
        self.run_interruption_type
    }

    pub fn n(&self) -> i32 {
        self.n
    }

    pub fn nn(&self) -> i32 {
        self.nn
    }

    pub fn compute_golomb_coding_parameter(&self) -> i32 {
        let temp = self.a + (self.n >> 1) * self.run_interruption_type;
        let mut n_test = self.n;
        let mut k = 0;
        while n_test < temp {
            n_test <<= 1;
            k += 1;
            debug_assert!(k <= 32);
        }
        k
    }

    /// ISO/IEC 14495-1 code segment A.23.
    pub fn update_variables(&mut self, error_value: i32, e_mapped_error_value: i32, reset_threshold: i32) {
        if error_value < 0 {
            self.nn += 1;
        }

        self.a += (e_mapped_error_value + 1 - self.run_interruption_type) >> 1;

        if self.n == reset_threshold {
            self.a >>= 1;
            self.n >>= 1;
            self.nn >>= 1;
        }

        self.n += 1;
    }

    pub fn decode_error_value(&self, temp: i32, k: i32) -> i32 {
        let map = (temp & 1) != 0;
        let error_value_abs = (temp + (map as i32)) / 2;

        if (k != 0 || (2 * self.nn >= self.n)) == map {
            -error_value_abs
        } else {
            error_value_abs
        }
    }

    /// ISO/IEC 14495-1 code segment A.21.
    pub fn compute_map(&self, error_value: i32, k: i32) -> bool {
        if k == 0 && error_value > 0 && 2 * self.nn < self.n {
            return true;
        }
        if error_value < 0 && 2 * self.nn >= self.n {
            return true;
        }
        if error_value < 0 && k != 0 {
            return true;
        }
        false
    }
}

fn initialization_value_for_a(range: i32) -> i32 {
    std::cmp::max(2, (range + 32) / 64)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn regular_context_starts_with_default_k() {
        let ctx = RegularModeContext::new(256);
        assert_eq!(ctx.compute_golomb_coding_parameter().unwrap(), 0);
    }

    #[test]
    fn run_mode_context_update_tracks_nn_on_negative_errors() {
        let mut ctx = RunModeContext::new(0, 256);
        ctx.update_variables(-1, 3, 64);
        assert_eq!(ctx.nn(), 1);
        assert_eq!(ctx.n(), 2);
    }
}
