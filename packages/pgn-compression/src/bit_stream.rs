//! MSB-first bit packing on top of `bit_vec::BitVec`.
//!
//! `BitWriter::finish` pads the last byte with zeros. The reader cannot tell
//! padding from data, so containers record a symbol count and call
//! [`BitReader::finish`] once it has been reached.

use crate::error::CorruptStreamError;
use bit_vec::BitVec;

/// A prefix code: the low `len` bits of `bits`, sent most significant bit first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Code {
    pub bits: u64,
    pub len: u8,
}

impl Code {
    /// True when `self` is a prefix of `other` (or equal to it).
    pub fn is_prefix_of(&self, other: &Code) -> bool {
        self.len <= other.len && other.bits >> (other.len - self.len) == self.bits
    }
}

#[derive(Debug, Default)]
pub struct BitWriter {
    buffer: BitVec,
}

impl BitWriter {
    pub fn new() -> Self {
        BitWriter {
            buffer: BitVec::new(),
        }
    }

    /// Appends the low `count` bits of `value`, most significant first.
    pub fn write_bits(&mut self, value: u64, count: u8) {
        debug_assert!(count <= 64);
        for shift in (0..count).rev() {
            self.buffer.push((value >> shift) & 1 == 1);
        }
    }

    pub fn write_code(&mut self, code: Code) {
        self.write_bits(code.bits, code.len);
    }

    /// Elias-gamma code of `value` (which must be at least 1).
    pub fn write_gamma(&mut self, value: u64) {
        debug_assert!(value >= 1);
        let width = 64 - value.leading_zeros() as u8;
        self.write_bits(0, width - 1);
        self.write_bits(value, width);
    }

    pub fn bit_len(&self) -> usize {
        self.buffer.len()
    }

    pub fn finish(self) -> Vec<u8> {
        self.buffer.to_bytes()
    }
}

#[derive(Debug)]
pub struct BitReader {
    bits: BitVec,
    position: usize,
}

impl BitReader {
    pub fn new(data: &[u8]) -> Self {
        BitReader {
            bits: BitVec::from_bytes(data),
            position: 0,
        }
    }

    pub fn position(&self) -> usize {
        self.position
    }

    pub fn bits_remaining(&self) -> usize {
        self.bits.len() - self.position
    }

    pub fn read_bit(&mut self) -> Result<bool, CorruptStreamError> {
        let bit = self
            .bits
            .get(self.position)
            .ok_or(CorruptStreamError::UnexpectedEndOfBits)?;
        self.position += 1;
        Ok(bit)
    }

    pub fn read_bits(&mut self, count: u8) -> Result<u64, CorruptStreamError> {
        debug_assert!(count <= 64);
        if (count as usize) > self.bits_remaining() {
            return Err(CorruptStreamError::UnexpectedEndOfBits);
        }
        let mut value = 0u64;
        for _ in 0..count {
            value = (value << 1) | self.read_bit()? as u64;
        }
        Ok(value)
    }

    pub fn read_gamma(&mut self) -> Result<u64, CorruptStreamError> {
        let mut zeros = 0u8;
        while !self.read_bit()? {
            zeros += 1;
            if zeros > 63 {
                return Err(CorruptStreamError::InvalidCode {
                    position: self.position,
                });
            }
        }
        let tail = self.read_bits(zeros)?;
        Ok((1u64 << zeros) | tail)
    }

    /// Checks that only zero padding (less than a byte) is left.
    pub fn finish(self) -> Result<(), CorruptStreamError> {
        let remaining = self.bits_remaining();
        if remaining >= 8 || self.bits.iter().skip(self.position).any(|bit| bit) {
            return Err(CorruptStreamError::TrailingBits { bits: remaining });
        }
        Ok(())
    }
}
