use crate::error::{FlvError, Result};

/// A bit-level reader for parsing binary data streams.
///
/// Implements H.264 style bit reading operations including:
/// - Reading individual bits
/// - Reading multiple bits as numbers
/// - Reading exponential Golomb codes (ue(v))
/// - Reading signed exponential Golomb codes (se(v))
///
/// Example:
/// ```
/// use flvio::utils::BitReader;
///
/// let data = [0b10110011];
/// let mut reader = BitReader::new(&data);
///
/// assert_eq!(reader.read_bit().unwrap(), true);   // 1
/// assert_eq!(reader.read_bits(3).unwrap(), 0b011); // 011
/// ```
pub struct BitReader<'a> {
    data: &'a [u8],
    byte_offset: usize,
    bit_offset: u8,
}

impl<'a> BitReader<'a> {
    /// Creates a new BitReader from a byte slice
    pub fn new(data: &'a [u8]) -> Self {
        BitReader {
            data,
            byte_offset: 0,
            bit_offset: 0,
        }
    }

    /// Reads a single bit from the stream.
    /// Returns true for 1, false for 0.
    ///
    /// Returns error if end of data is reached.
    pub fn read_bit(&mut self) -> Result<bool> {
        if self.byte_offset >= self.data.len() {
            return Err(FlvError::Bitstream("reached end of data".into()));
        }

        let bit = (self.data[self.byte_offset] >> (7 - self.bit_offset)) & 1;
        self.bit_offset += 1;

        if self.bit_offset == 8 {
            self.bit_offset = 0;
            self.byte_offset += 1;
        }

        Ok(bit == 1)
    }

    /// Reads n bits and returns them as a number.
    /// The bits are interpreted as big-endian.
    ///
    /// Returns error if n > 32 or end of data is reached.
    pub fn read_bits(&mut self, n: u32) -> Result<u32> {
        if n > 32 {
            return Err(FlvError::Bitstream("too many bits requested".into()));
        }

        let mut value = 0u32;
        let n = n as usize;

        for i in 0..n {
            let bit = self.read_bit()?;
            if bit {
                value |= 1 << (n - 1 - i);
            }
        }

        Ok(value)
    }

    /// Reads an unsigned exponential Golomb code (ue(v)) as specified in H.264.
    ///
    /// Format:
    /// 1. M leading zeros followed by a 1
    /// 2. M more INFO bits
    /// 3. Value = 2^M + INFO - 1
    ///
    /// Example: "00110" (M=2, INFO=10)
    /// - Count zeros until 1: M=2
    /// - Read 2 more bits: INFO=10=2
    /// - Value = 2^2 + 2 - 1 = 4 + 2 - 1 = 5
    pub fn read_golomb(&mut self) -> Result<u32> {
        let mut leading_zeros = 0;
        while !self.read_bit()? {
            leading_zeros += 1;
            if leading_zeros > 31 {
                return Err(FlvError::Bitstream("invalid golomb code".into()));
            }
        }

        if leading_zeros == 0 {
            return Ok(0);
        }

        let info = self.read_bits(leading_zeros)?;
        Ok((1u32 << leading_zeros) + info - 1)
    }

    /// Reads a signed exponential Golomb code (se(v)) as specified in H.264.
    ///
    /// The mapping from unsigned (k) to signed is:
    /// - k=0 -> 0
    /// - For k>0:
    ///   * magnitude = (k+1)>>1
    ///   * sign from parity (odd k -> positive, even k -> negative)
    pub fn read_signed_golomb(&mut self) -> Result<i32> {
        let k = self.read_golomb()?;
        if k == 0 {
            return Ok(0);
        }

        let magnitude = ((k + 1) >> 1) as i32;
        let sign = if k & 1 == 1 { 1 } else { -1 };
        Ok(sign * magnitude)
    }

    /// Skips n bits in the stream.
    pub fn skip_bits(&mut self, n: u32) -> Result<()> {
        let n = n as usize;
        for _ in 0..n {
            self.read_bit()?;
        }
        Ok(())
    }

    /// Aligns reader to next byte boundary by skipping remaining bits in current byte.
    pub fn align_byte(&mut self) -> Result<()> {
        if self.bit_offset != 0 {
            self.bit_offset = 0;
            self.byte_offset += 1;
        }
        Ok(())
    }

    /// Returns number of bits available to read.
    pub fn available_bits(&self) -> usize {
        (self.data.len() - self.byte_offset) * 8 - self.bit_offset as usize
    }
}

/// A bit-level writer producing MSB-first packed bytes.
///
/// The counterpart of [`BitReader`], used to build exponential Golomb
/// sequences and other sub-byte fields. Output is zero-padded to a whole
/// number of bytes.
///
/// Example:
/// ```
/// use flvio::utils::BitWriter;
///
/// let mut writer = BitWriter::new();
/// writer.write_golomb(5);
/// assert_eq!(writer.finish(), vec![0b00110000]);
/// ```
pub struct BitWriter {
    bytes: Vec<u8>,
    bit_len: usize,
}

impl BitWriter {
    /// Creates an empty BitWriter.
    pub fn new() -> Self {
        BitWriter {
            bytes: Vec::new(),
            bit_len: 0,
        }
    }

    /// Appends a single bit.
    pub fn write_bit(&mut self, bit: bool) {
        if self.bit_len % 8 == 0 {
            self.bytes.push(0);
        }
        if bit {
            self.bytes[self.bit_len / 8] |= 1 << (7 - (self.bit_len % 8));
        }
        self.bit_len += 1;
    }

    /// Appends the low n bits of `value`, most significant first.
    ///
    /// Returns error if n > 32.
    pub fn write_bits(&mut self, value: u32, n: u32) -> Result<()> {
        if n > 32 {
            return Err(FlvError::Bitstream("too many bits written".into()));
        }
        for i in (0..n).rev() {
            self.write_bit((value >> i) & 1 == 1);
        }
        Ok(())
    }

    /// Appends an unsigned exponential Golomb code (ue(v)).
    pub fn write_golomb(&mut self, value: u32) {
        self.put_golomb(value as u64);
    }

    /// Appends a signed exponential Golomb code (se(v)).
    ///
    /// Positive v maps to code 2v-1, non-positive v to -2v, the inverse of
    /// [`BitReader::read_signed_golomb`].
    pub fn write_signed_golomb(&mut self, value: i32) {
        let k = if value > 0 {
            (value as u64) * 2 - 1
        } else {
            (-(value as i64)) as u64 * 2
        };
        self.put_golomb(k);
    }

    // u64 so the se(v) mapping of i32::MIN stays representable.
    fn put_golomb(&mut self, value: u64) {
        let m = 63 - (value + 1).leading_zeros();
        for _ in 0..m {
            self.write_bit(false);
        }
        self.write_bit(true);
        let info = (value + 1) - (1u64 << m);
        for i in (0..m).rev() {
            self.write_bit((info >> i) & 1 == 1);
        }
    }

    /// Number of bits written so far.
    pub fn bit_len(&self) -> usize {
        self.bit_len
    }

    /// Consumes the writer and returns the packed bytes, zero-padded to a
    /// byte boundary.
    pub fn finish(self) -> Vec<u8> {
        self.bytes
    }
}

impl Default for BitWriter {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use quickcheck_macros::quickcheck;

    #[test]
    fn test_read_bits() {
        // Simple pattern within a byte
        let data = [0b10110010];
        let mut reader = BitReader::new(&data);
        assert_eq!(reader.read_bits(3).unwrap(), 0b101);
        assert_eq!(reader.read_bits(5).unwrap(), 0b10010);

        // Cross-byte boundary
        let data = [0b10110011, 0b01011010];
        let mut reader = BitReader::new(&data);
        assert_eq!(reader.read_bits(3).unwrap(), 0b101);
        assert_eq!(reader.read_bits(8).unwrap(), 0b10011010);

        // Reading a full byte
        let data = [0b11111111];
        let mut reader = BitReader::new(&data);
        assert_eq!(reader.read_bits(8).unwrap(), 0b11111111);

        // Reading zero bits
        let data = [0b10101010];
        let mut reader = BitReader::new(&data);
        assert_eq!(reader.read_bits(0).unwrap(), 0);

        // Error on too many bits
        let data = [0xFF];
        let mut reader = BitReader::new(&data);
        assert!(reader.read_bits(33).is_err());

        // Cross multiple byte boundaries
        let data = [0b10110011, 0b11001100, 0b10101010];
        let mut reader = BitReader::new(&data);
        assert_eq!(reader.read_bits(20).unwrap(), 0b10110011110011001010);
    }

    #[test]
    fn test_bit_by_bit() {
        let data = [0b10110010];
        let mut reader = BitReader::new(&data);
        let expected = [true, false, true, true, false, false, true, false];
        for &bit in &expected {
            assert_eq!(reader.read_bit().unwrap(), bit);
        }
        assert!(reader.read_bit().is_err());
    }

    #[test]
    fn test_read_golomb() {
        // Known patterns from the H.264 spec
        let test_cases = [
            ([0b10000000], 0, "1"),       // zeros=0: 0
            ([0b01000000], 1, "010"),     // zeros=1,INFO=0: 2+0-1=1
            ([0b01100000], 2, "011"),     // zeros=1,INFO=1: 2+1-1=2
            ([0b00100000], 3, "00100"),   // zeros=2,INFO=00: 4+0-1=3
            ([0b00110000], 5, "00110"),   // zeros=2,INFO=10: 4+2-1=5
            ([0b00101000], 4, "00101"),   // zeros=2,INFO=01: 4+1-1=4
            ([0b00111000], 6, "00111"),   // zeros=2,INFO=11: 4+3-1=6
            ([0b00010000], 7, "0001000"), // zeros=3,INFO=000: 8+0-1=7
            ([0b00010010], 8, "0001001"), // zeros=3,INFO=001: 8+1-1=8
        ];

        for (input, expected, pattern) in test_cases.iter() {
            let mut reader = BitReader::new(input);
            let result = reader.read_golomb().unwrap();
            assert_eq!(result, *expected, "Failed for pattern {}", pattern);

            // The writer must generate the same pattern
            let mut writer = BitWriter::new();
            writer.write_golomb(*expected);
            assert_eq!(
                &writer.finish()[..1],
                input,
                "Encoding {} gave wrong pattern",
                expected
            );
        }

        // Error on all-zero input
        let data = [0x00];
        let mut reader = BitReader::new(&data);
        assert!(reader.read_golomb().is_err());
    }

    #[test]
    fn test_signed_golomb() {
        // k to signed value mapping: odd k positive, even k negative
        let test_cases = [
            ([0b10000000], 0, 0, "k=0 -> 0"),
            ([0b01000000], 1, 1, "k=1 -> +1"),
            ([0b01100000], 2, -1, "k=2 -> -1"),
            ([0b00100000], 3, 2, "k=3 -> +2"),
            ([0b00101000], 4, -2, "k=4 -> -2"),
            ([0b00110000], 5, 3, "k=5 -> +3"),
            ([0b00111000], 6, -3, "k=6 -> -3"),
            ([0b00010000], 7, 4, "k=7 -> +4"),
            ([0b00010010], 8, -4, "k=8 -> -4"),
        ];

        for (input, code, expected, desc) in test_cases.iter() {
            let mut reader = BitReader::new(input);
            let result = reader.read_signed_golomb().unwrap();
            assert_eq!(result, *expected, "Failed for code {} ({})", code, desc);

            let mut writer = BitWriter::new();
            writer.write_signed_golomb(*expected);
            assert_eq!(
                &writer.finish()[..1],
                input,
                "Encoding {} gave wrong pattern",
                desc
            );
        }
    }

    #[test]
    fn test_write_bits() {
        let mut writer = BitWriter::new();
        writer.write_bits(0b101, 3).unwrap();
        writer.write_bits(0b10010, 5).unwrap();
        assert_eq!(writer.bit_len(), 8);
        let bytes = writer.finish();
        assert_eq!(bytes, vec![0b10110010]);

        let mut writer = BitWriter::new();
        assert!(writer.write_bits(0, 33).is_err());
    }

    #[test]
    fn test_consecutive_golomb() {
        // Multiple consecutive codes through one writer
        let values = [3u32, 5, 1, 0, 4, 1000];
        let mut writer = BitWriter::new();
        for &v in &values {
            writer.write_golomb(v);
        }
        let encoded = writer.finish();
        let mut reader = BitReader::new(&encoded);

        for &expected in &values {
            let result = reader.read_golomb().unwrap();
            assert_eq!(result, expected, "Failed reading value {}", expected);
        }
    }

    #[quickcheck]
    fn prop_read_bits_matches_manual(data: Vec<u8>, n: u8) -> bool {
        if data.is_empty() || n > 32 {
            return true;
        }

        let mut reader = BitReader::new(&data);
        let n = n % 32;

        match reader.read_bits(n as u32) {
            Ok(result) => {
                let mut expected = 0u32;
                for i in 0..n as usize {
                    let byte_idx = i / 8;
                    let bit_idx = 7 - (i % 8);
                    if byte_idx >= data.len() {
                        return true;
                    }
                    let bit = (data[byte_idx] >> bit_idx) & 1;
                    expected |= (bit as u32) << (n - 1 - i as u8);
                }
                result == expected
            }
            Err(_) => true,
        }
    }

    #[quickcheck]
    fn prop_golomb_round_trip(values: Vec<u32>) -> bool {
        if values.is_empty() {
            return true;
        }

        let mut writer = BitWriter::new();
        for &v in &values {
            writer.write_golomb(v);
        }
        let encoded = writer.finish();
        let mut reader = BitReader::new(&encoded);

        for &expected in &values {
            match reader.read_golomb() {
                Ok(decoded) if decoded == expected => continue,
                _ => return false,
            }
        }
        true
    }

    #[quickcheck]
    fn prop_signed_golomb_round_trip(values: Vec<i32>) -> bool {
        let mut writer = BitWriter::new();
        for &v in &values {
            writer.write_signed_golomb(v);
        }
        let encoded = writer.finish();
        let mut reader = BitReader::new(&encoded);

        for &expected in &values {
            // i32::MIN maps to a code outside the reader's 32-bit range
            if expected == i32::MIN {
                return true;
            }
            match reader.read_signed_golomb() {
                Ok(decoded) if decoded == expected => continue,
                _ => return false,
            }
        }
        true
    }

    #[test]
    fn test_error_cases() {
        // Reading past end of data
        let data = [0xFF];
        let mut reader = BitReader::new(&data);
        reader.read_bits(8).unwrap();
        assert!(reader.read_bit().is_err());

        // Invalid Golomb code (too many zeros)
        let data = vec![0; 5]; // 40 zeros
        let mut reader = BitReader::new(&data);
        assert!(reader.read_golomb().is_err());

        // Byte alignment
        let data = [0xFF, 0x00];
        let mut reader = BitReader::new(&data);
        reader.read_bits(3).unwrap();
        assert_eq!(reader.bit_offset, 3);
        reader.align_byte().unwrap();
        assert_eq!(reader.bit_offset, 0);
        assert_eq!(reader.byte_offset, 1);
        assert_eq!(reader.available_bits(), 8);
    }
}
