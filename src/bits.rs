//! Low-level bit read and write primitives for byte slices.
//!
//! Bit position `p` addresses byte `p / 8`; which intra-byte bit it selects
//! depends on the [BitOrder]: `MsbFirst` counts from the most significant bit
//! of the byte, `LsbFirst` from the least significant. Multi-bit reads and
//! writes always treat the first addressed bit as the most significant bit of
//! the value.

use crate::descriptor::BitOrder;
use crate::errors::{DecodeError, EncodeError};

/// Reads a single bit. Returns 0 or 1.
pub fn read_bit(data: &[u8], bit_pos: usize, order: BitOrder) -> Result<u8, DecodeError> {
    if bit_pos >= data.len() * 8 {
        return Err(DecodeError::OutOfBounds);
    }

    let byte = data[bit_pos / 8];
    let bit_index = bit_pos % 8;

    let bit = match order {
        BitOrder::MsbFirst => (byte >> (7 - bit_index)) & 1,
        BitOrder::LsbFirst => (byte >> bit_index) & 1,
    };

    Ok(bit)
}

/// Reads `n` bits starting at `bit_pos` as an unsigned value (max 64 bits).
/// The first bit read becomes the most significant bit of the result.
pub fn read_bits(
    data: &[u8],
    bit_pos: usize,
    n: usize,
    order: BitOrder,
) -> Result<u64, DecodeError> {
    if n > 64 {
        return Err(DecodeError::TooManyBits);
    }

    if bit_pos
        .checked_add(n)
        .is_none_or(|end| end > data.len() * 8)
    {
        return Err(DecodeError::OutOfBounds);
    }

    let mut value = 0u64;
    for i in 0..n {
        let bit = read_bit(data, bit_pos + i, order)? as u64;
        value = (value << 1) | bit;
    }

    Ok(value)
}

/// Writes the low `n` bits of `value` starting at `bit_pos`, leaving all other
/// bits of the buffer untouched. The most significant of the `n` bits lands at
/// `bit_pos`. Exact inverse of [read_bits].
pub fn write_bits(
    buf: &mut [u8],
    bit_pos: usize,
    n: usize,
    value: u64,
    order: BitOrder,
) -> Result<(), EncodeError> {
    if n > 64 {
        return Err(EncodeError::OutOfBounds);
    }

    if bit_pos
        .checked_add(n)
        .is_none_or(|end| end > buf.len() * 8)
    {
        return Err(EncodeError::OutOfBounds);
    }

    for i in 0..n {
        let bit = ((value >> (n - 1 - i)) & 1) as u8;
        let pos = bit_pos + i;
        let bit_index = pos % 8;

        let mask = match order {
            BitOrder::MsbFirst => 1u8 << (7 - bit_index),
            BitOrder::LsbFirst => 1u8 << bit_index,
        };

        if bit == 1 {
            buf[pos / 8] |= mask;
        } else {
            buf[pos / 8] &= !mask;
        }
    }

    Ok(())
}

/// Sign-extends the low `bits` of `value` to a full `i64`.
pub fn sign_extend(value: u64, bits: usize) -> i64 {
    let shift = 64 - bits;
    ((value << shift) as i64) >> shift
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_bit_msb_first() {
        let data = [0b1000_0001];
        assert_eq!(read_bit(&data, 0, BitOrder::MsbFirst).unwrap(), 1);
        assert_eq!(read_bit(&data, 1, BitOrder::MsbFirst).unwrap(), 0);
        assert_eq!(read_bit(&data, 7, BitOrder::MsbFirst).unwrap(), 1);
    }

    #[test]
    fn test_read_bit_lsb_first() {
        let data = [0b1000_0001];
        assert_eq!(read_bit(&data, 0, BitOrder::LsbFirst).unwrap(), 1);
        assert_eq!(read_bit(&data, 1, BitOrder::LsbFirst).unwrap(), 0);
        assert_eq!(read_bit(&data, 7, BitOrder::LsbFirst).unwrap(), 1);
    }

    #[test]
    fn test_read_bits_across_byte_boundary() {
        let data = [0b0000_0011, 0b1100_0000];
        assert_eq!(read_bits(&data, 6, 4, BitOrder::MsbFirst).unwrap(), 0b1111);
    }

    #[test]
    fn test_read_bits_out_of_bounds() {
        let data = [0xFF];
        assert_eq!(
            read_bits(&data, 0, 9, BitOrder::MsbFirst).unwrap_err(),
            DecodeError::OutOfBounds
        );
    }

    #[test]
    fn test_read_bits_more_than_64() {
        let data = [0xFF; 16];
        assert_eq!(
            read_bits(&data, 0, 65, BitOrder::MsbFirst).unwrap_err(),
            DecodeError::TooManyBits
        );
    }

    #[test]
    fn test_write_bits_merges() {
        let mut buf = [0b1111_1111];
        write_bits(&mut buf, 2, 3, 0b000, BitOrder::MsbFirst).unwrap();
        assert_eq!(buf, [0b1100_0111]);
    }

    #[test]
    fn test_write_then_read_round_trip_msb() {
        let mut buf = [0u8; 4];
        write_bits(&mut buf, 5, 11, 0b101_0101_0101, BitOrder::MsbFirst).unwrap();
        assert_eq!(
            read_bits(&buf, 5, 11, BitOrder::MsbFirst).unwrap(),
            0b101_0101_0101
        );
    }

    #[test]
    fn test_write_then_read_round_trip_lsb() {
        let mut buf = [0u8; 4];
        write_bits(&mut buf, 3, 13, 0x15A7 & 0x1FFF, BitOrder::LsbFirst).unwrap();
        assert_eq!(
            read_bits(&buf, 3, 13, BitOrder::LsbFirst).unwrap(),
            0x15A7 & 0x1FFF
        );
    }

    #[test]
    fn test_write_bits_out_of_bounds() {
        let mut buf = [0u8; 1];
        assert_eq!(
            write_bits(&mut buf, 4, 5, 0, BitOrder::MsbFirst).unwrap_err(),
            EncodeError::OutOfBounds
        );
    }

    #[test]
    fn test_sign_extend() {
        assert_eq!(sign_extend(0b1111, 4), -1);
        assert_eq!(sign_extend(0b0111, 4), 7);
        assert_eq!(sign_extend(0b1000, 4), -8);
        assert_eq!(sign_extend(u64::MAX, 64), -1);
    }
}
