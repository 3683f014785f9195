//! Bit-stream reader, ISO/IEC 14495-1 A.1.
//!
//! Implements the same two-speed strategy as the reference decoder: an
//! `optimized_read` fast path that loads a whole machine word at once when
//! no `0xFF` byte is within reach, and a `make_valid` byte-at-a-time slow
//! path used near a `0xFF` that respects the "no 0xFF followed by a byte
//! >= 0x80" marker-safety rule.

use crate::error::JlsError;
use crate::marker::JPEG_MARKER_START_BYTE;

type BufType = u64;
const BUF_BIT_COUNT: i32 = (std::mem::size_of::<BufType>() * 8) as i32;

pub struct BitReader<'a> {
    source: &'a [u8],
    position: usize,
    next_ff_position: usize,
    read_cache: BufType,
    valid_bits: i32,
}

impl<'a> BitReader<'a> {
    pub fn new(source: &'a [u8]) -> Self {
        let mut r = Self {
            source,
            position: 0,
            next_ff_position: 0,
            read_cache: 0,
            valid_bits: 0,
        };
        r.next_ff_position = r.find_next_ff();
        r.make_valid();
        r
    }

    fn find_next_ff(&self) -> usize {
        let mut p = self.position;
        while p < self.source.len() && self.source[p] != JPEG_MARKER_START_BYTE {
            p += 1;
        }
        p
    }

    fn optimized_read(&mut self) -> bool {
        let word_bytes = (BUF_BIT_COUNT / 8) as usize;
        if self.position + word_bytes <= self.next_ff_position {
            let mut word_bytes_arr = [0u8; 8];
            word_bytes_arr.copy_from_slice(&self.source[self.position..self.position + word_bytes]);
            let word = BufType::from_be_bytes(word_bytes_arr);
            self.read_cache |= word >> self.valid_bits;
            let bytes_to_read = (BUF_BIT_COUNT - self.valid_bits) / 8;
            self.position += bytes_to_read as usize;
            self.valid_bits += bytes_to_read * 8;
            true
        } else {
            false
        }
    }

    fn make_valid(&mut self) {
        debug_assert!(self.valid_bits <= BUF_BIT_COUNT - 8);

        if self.position + 8 <= self.source.len() && self.optimized_read() {
            return;
        }

        loop {
            if self.position >= self.source.len() {
                return;
            }

            let value_new = self.source[self.position];

            if value_new == JPEG_MARKER_START_BYTE
                && (self.position == self.source.len() - 1 || (self.source[self.position + 1] & 0x80) != 0)
            {
                return;
            }

            self.read_cache |= (value_new as BufType) << (BUF_BIT_COUNT - 8 - self.valid_bits);
            self.position += 1;
            self.valid_bits += 8;

            if value_new == JPEG_MARKER_START_BYTE {
                self.valid_bits -= 1;
            }

            if self.valid_bits >= BUF_BIT_COUNT - 8 {
                break;
            }
        }

        self.next_ff_position = self.find_next_ff();
    }

    /// Position of the byte that `valid_bits` worth of unread bits actually
    /// start at, accounting for already-consumed stuffing bits — the
    /// "current byte position" used to align restart markers.
    pub fn current_byte_position(&self) -> usize {
        let mut valid_bits = self.valid_bits;
        let mut compressed_bytes = self.position;

        loop {
            let last_bits_count = if compressed_bytes > 0 && self.source[compressed_bytes - 1] == JPEG_MARKER_START_BYTE {
                7
            } else {
                8
            };

            if valid_bits < last_bits_count {
                return compressed_bytes;
            }

            valid_bits -= last_bits_count;
            compressed_bytes -= 1;
        }
    }

    pub(crate) fn skip(&mut self, length: i32) {
        self.valid_bits -= length;
        self.read_cache <<= length;
    }

    pub fn read_value(&mut self, length: i32) -> Result<i32, JlsError> {
        if self.valid_bits < length {
            self.make_valid();
            if self.valid_bits < length {
                return Err(JlsError::InvalidData);
            }
        }
        let result = (self.read_cache >> (BUF_BIT_COUNT - length)) as i32;
        self.skip(length);
        Ok(result)
    }

    pub fn peek_byte(&mut self) -> i32 {
        if self.valid_bits < 8 {
            self.make_valid();
        }
        (self.read_cache >> (BUF_BIT_COUNT - 8)) as i32
    }

    pub fn read_bit(&mut self) -> Result<bool, JlsError> {
        if self.valid_bits <= 0 {
            self.make_valid();
            if self.valid_bits <= 0 {
                return Err(JlsError::InvalidData);
            }
        }
        let set = (self.read_cache & (1 << (BUF_BIT_COUNT - 1))) != 0;
        self.skip(1);
        Ok(set)
    }

    /// Number of leading zero bits before the next set bit, within the next
    /// 16 bits, or -1 if none found there.
    fn peek_0_bits(&mut self) -> i32 {
        if self.valid_bits < 16 {
            self.make_valid();
        }
        let mut val_test = self.read_cache;
        for count in 0..16 {
            if (val_test & (1 << (BUF_BIT_COUNT - 1))) != 0 {
                return count;
            }
            val_test <<= 1;
        }
        -1
    }

    /// Reads a run-mode unary prefix (number of leading zero bits before
    /// the terminating 1), ISO/IEC 14495-1 A.7.1 code segment A.19.
    pub fn read_high_bits(&mut self) -> Result<i32, JlsError> {
        let count = self.peek_0_bits();
        if count >= 0 {
            self.skip(count + 1);
            return Ok(count);
        }
        self.skip(15);

        let mut high_bits_count = 15;
        loop {
            if self.read_bit()? {
                return Ok(high_bits_count);
            }
            high_bits_count += 1;
        }
    }

    pub fn read_long_value(&mut self, length: i32) -> Result<i32, JlsError> {
        if length <= 24 {
            return self.read_value(length);
        }
        Ok((self.read_value(length - 24)? << 24) + self.read_value(24)?)
    }

    /// Verifies no extra bits remain beyond the next marker, ISO/IEC
    /// 14495-1's end-of-scan check.
    pub fn end_scan(&mut self) -> Result<(), JlsError> {
        if self.position >= self.source.len() || self.source[self.position] != JPEG_MARKER_START_BYTE {
            self.read_bit()?;
            if self.position >= self.source.len() || self.source[self.position] != JPEG_MARKER_START_BYTE {
                return Err(JlsError::TooMuchEncodedData);
            }
        }
        if self.read_cache != 0 {
            return Err(JlsError::TooMuchEncodedData);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_back_written_bits() {
        let data = [0b1010_1010, 0b1111_0000];
        let mut r = BitReader::new(&data);
        assert_eq!(r.read_value(4).unwrap(), 0b1010);
        assert_eq!(r.read_value(4).unwrap(), 0b1010);
        assert_eq!(r.read_value(8).unwrap(), 0b1111_0000);
    }

    #[test]
    fn current_byte_position_tracks_consumption() {
        let data = [0xAB, 0xCD, 0xEF, 0x01];
        let mut r = BitReader::new(&data);
        let _ = r.read_value(8).unwrap();
        assert_eq!(r.current_byte_position(), 1);
    }
}
