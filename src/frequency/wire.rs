//! Byte-exact serialization and the plain-text counter dump
//!
//! The binary layout is big-endian with a fixed field order and no padding:
//!
//! ```text
//! int64 total_weight
//! int32 depth
//! int32 width
//! repeat depth times:
//!     int64 index_a[i]
//!     int64 index_b[i]
//!     int64 sign_a[i]
//!     int64 sign_b[i]
//!     repeat width times: int64 table[i][j]
//! ```
//!
//! The advisory error parameters are never persisted; decoding recomputes
//! them from the shape. The text format is a convenience dump of the bare
//! counters (comma-separated rows, no header, no shape metadata) and can
//! only be loaded into a sketch that already has the right dimensions.

use crate::frequency::CountSketch;
use crate::hash::{LinearCoeffs, PRIME_MODULUS};
use crate::traits::DecodeError;

#[cfg(feature = "std")]
use std::{format, string::String, vec::Vec};

#[cfg(not(feature = "std"))]
extern crate alloc;
#[cfg(not(feature = "std"))]
use alloc::{format, string::String, vec::Vec};

struct Reader<'a> {
    buf: &'a [u8],
    pos: usize,
}

impl<'a> Reader<'a> {
    fn new(buf: &'a [u8]) -> Self {
        Self { buf, pos: 0 }
    }

    fn take<const N: usize>(&mut self) -> Result<[u8; N], DecodeError> {
        let end = self.pos + N;
        if end > self.buf.len() {
            return Err(DecodeError::BufferTooShort {
                expected: end,
                found: self.buf.len(),
            });
        }
        let mut bytes = [0u8; N];
        bytes.copy_from_slice(&self.buf[self.pos..end]);
        self.pos = end;
        Ok(bytes)
    }

    fn read_i64(&mut self) -> Result<i64, DecodeError> {
        Ok(i64::from_be_bytes(self.take::<8>()?))
    }

    fn read_i32(&mut self) -> Result<i32, DecodeError> {
        Ok(i32::from_be_bytes(self.take::<4>()?))
    }

    fn remaining(&self) -> usize {
        self.buf.len() - self.pos
    }
}

impl CountSketch {
    /// Serialize the full sketch state to bytes
    pub fn to_bytes(&self) -> Vec<u8> {
        let per_row = 4 * 8 + self.width * 8;
        let mut out = Vec::with_capacity(8 + 4 + 4 + self.depth * per_row);

        out.extend_from_slice(&(self.total_weight as i64).to_be_bytes());
        out.extend_from_slice(&(self.depth as i32).to_be_bytes());
        out.extend_from_slice(&(self.width as i32).to_be_bytes());
        for row in 0..self.depth {
            out.extend_from_slice(&self.coeffs.index_a[row].to_be_bytes());
            out.extend_from_slice(&self.coeffs.index_b[row].to_be_bytes());
            out.extend_from_slice(&self.coeffs.sign_a[row].to_be_bytes());
            out.extend_from_slice(&self.coeffs.sign_b[row].to_be_bytes());
            for &cell in &self.table[row] {
                out.extend_from_slice(&cell.to_be_bytes());
            }
        }
        out
    }

    /// Reconstruct a sketch from bytes produced by [`to_bytes`]
    ///
    /// Fails with [`DecodeError::BufferTooShort`] on truncation and
    /// [`DecodeError::Corrupted`] on structural inconsistency (negative
    /// fields, mixed-zero shape, out-of-range coefficients, trailing
    /// bytes).
    ///
    /// [`to_bytes`]: CountSketch::to_bytes
    pub fn from_bytes(bytes: &[u8]) -> Result<CountSketch, DecodeError> {
        let mut reader = Reader::new(bytes);

        let total_weight = reader.read_i64()?;
        if total_weight < 0 {
            return Err(DecodeError::Corrupted(format!(
                "negative total weight: {}",
                total_weight
            )));
        }

        let depth = reader.read_i32()?;
        let width = reader.read_i32()?;
        if depth < 0 || width < 0 {
            return Err(DecodeError::Corrupted(format!(
                "negative shape: {}x{}",
                width, depth
            )));
        }
        // Only the zero-shaped merge sentinel may have a zero dimension
        if (depth == 0) != (width == 0) {
            return Err(DecodeError::Corrupted(format!(
                "inconsistent shape: {}x{}",
                width, depth
            )));
        }
        let depth = depth as usize;
        let width = width as usize;

        let mut coeffs = LinearCoeffs {
            index_a: Vec::with_capacity(depth),
            index_b: Vec::with_capacity(depth),
            sign_a: Vec::with_capacity(depth),
            sign_b: Vec::with_capacity(depth),
        };
        let mut table = Vec::with_capacity(depth);
        for _ in 0..depth {
            for arr in [
                &mut coeffs.index_a,
                &mut coeffs.index_b,
                &mut coeffs.sign_a,
                &mut coeffs.sign_b,
            ] {
                let coeff = reader.read_i64()?;
                if !(0..PRIME_MODULUS).contains(&coeff) {
                    return Err(DecodeError::Corrupted(format!(
                        "hash coefficient out of range: {}",
                        coeff
                    )));
                }
                arr.push(coeff);
            }
            let mut row = Vec::with_capacity(width);
            for _ in 0..width {
                row.push(reader.read_i64()?);
            }
            table.push(row);
        }

        if reader.remaining() != 0 {
            return Err(DecodeError::Corrupted(format!(
                "{} trailing bytes",
                reader.remaining()
            )));
        }

        Ok(CountSketch::from_parts(
            width,
            depth,
            table,
            coeffs,
            total_weight as u64,
        ))
    }

    /// Dump the counter table as text, one comma-separated row per line
    ///
    /// Carries no shape metadata and no coefficients; the binary codec is
    /// the authoritative format.
    pub fn to_text_table(&self) -> String {
        let mut out = String::new();
        for row in &self.table {
            for (col, cell) in row.iter().enumerate() {
                if col > 0 {
                    out.push(',');
                }
                out.push_str(&format!("{}", cell));
            }
            out.push('\n');
        }
        out
    }

    /// Replace the counter table from a text dump
    ///
    /// The text must contain exactly `depth` lines of `width` cells each;
    /// any mismatch or unparsable cell fails with
    /// [`DecodeError::Corrupted`] and leaves the sketch unchanged.
    /// Coefficients and total weight are untouched, since the format
    /// carries neither.
    pub fn load_text_table(&mut self, text: &str) -> Result<(), DecodeError> {
        let mut rows: Vec<Vec<i64>> = Vec::with_capacity(self.depth);
        for (lineno, line) in text.lines().enumerate() {
            let mut row = Vec::with_capacity(self.width);
            for cell in line.split(',') {
                let value = cell.trim().parse::<i64>().map_err(|_| {
                    DecodeError::Corrupted(format!(
                        "line {}: bad counter {:?}",
                        lineno + 1,
                        cell
                    ))
                })?;
                row.push(value);
            }
            if row.len() != self.width {
                return Err(DecodeError::Corrupted(format!(
                    "line {}: {} cells, expected {}",
                    lineno + 1,
                    row.len(),
                    self.width
                )));
            }
            rows.push(row);
        }
        if rows.len() != self.depth {
            return Err(DecodeError::Corrupted(format!(
                "{} rows, expected {}",
                rows.len(),
                self.depth
            )));
        }
        self.table = rows;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn populated() -> CountSketch {
        let mut cs = CountSketch::with_seed(32, 4, 77);
        cs.add(b"apple", 100).unwrap();
        cs.add(b"banana", 3).unwrap();
        cs.add_int(42, 9).unwrap();
        cs
    }

    #[test]
    fn test_round_trip() {
        let cs = populated();
        let bytes = cs.to_bytes();
        let decoded = CountSketch::from_bytes(&bytes).unwrap();

        assert_eq!(decoded.width(), cs.width());
        assert_eq!(decoded.depth(), cs.depth());
        assert_eq!(decoded.total_weight(), cs.total_weight());
        for row in 0..cs.depth() {
            for col in 0..cs.width() {
                assert_eq!(decoded.cell(row, col), cs.cell(row, col));
            }
        }
        // Advisory parameters are recomputed, not persisted
        assert_eq!(decoded.relative_error(), cs.relative_error());
        assert_eq!(decoded.to_bytes(), bytes);
    }

    #[test]
    fn test_encoded_length() {
        let cs = CountSketch::with_dimensions(32, 4);
        assert_eq!(cs.to_bytes().len(), 8 + 4 + 4 + 4 * (4 * 8 + 32 * 8));
    }

    #[test]
    fn test_header_layout() {
        let mut cs = CountSketch::with_dimensions(32, 4);
        cs.add(b"x", 5).unwrap();
        let bytes = cs.to_bytes();
        assert_eq!(i64::from_be_bytes(bytes[0..8].try_into().unwrap()), 5);
        assert_eq!(i32::from_be_bytes(bytes[8..12].try_into().unwrap()), 4);
        assert_eq!(i32::from_be_bytes(bytes[12..16].try_into().unwrap()), 32);
    }

    #[test]
    fn test_truncated_input() {
        let bytes = populated().to_bytes();
        for cut in [0, 7, 8, 15, 16, bytes.len() - 1] {
            let err = CountSketch::from_bytes(&bytes[..cut]).unwrap_err();
            assert!(
                matches!(err, DecodeError::BufferTooShort { .. }),
                "cut at {} gave {:?}",
                cut,
                err
            );
        }
    }

    #[test]
    fn test_trailing_bytes_rejected() {
        let mut bytes = populated().to_bytes();
        bytes.push(0);
        assert!(matches!(
            CountSketch::from_bytes(&bytes).unwrap_err(),
            DecodeError::Corrupted(_)
        ));
    }

    #[test]
    fn test_negative_fields_rejected() {
        let mut bytes = populated().to_bytes();
        bytes[0] = 0x80; // total_weight sign bit
        assert!(matches!(
            CountSketch::from_bytes(&bytes).unwrap_err(),
            DecodeError::Corrupted(_)
        ));

        let mut bytes = populated().to_bytes();
        bytes[8] = 0x80; // depth sign bit
        assert!(matches!(
            CountSketch::from_bytes(&bytes).unwrap_err(),
            DecodeError::Corrupted(_)
        ));
    }

    #[test]
    fn test_zero_shape_round_trips() {
        let sentinel = CountSketch::merged(&[]);
        let decoded = CountSketch::from_bytes(&sentinel.to_bytes()).unwrap();
        assert_eq!(decoded.depth(), 0);
        assert_eq!(decoded.width(), 0);
    }

    #[test]
    fn test_text_table_round_trip() {
        let cs = populated();
        let text = cs.to_text_table();
        assert_eq!(text.lines().count(), cs.depth());

        let mut other = CountSketch::with_seed(32, 4, 77);
        other.load_text_table(&text).unwrap();
        for row in 0..cs.depth() {
            for col in 0..cs.width() {
                assert_eq!(other.cell(row, col), cs.cell(row, col));
            }
        }
        // Same coefficients and counters, same estimates
        assert_eq!(other.estimate(b"apple"), cs.estimate(b"apple"));
    }

    #[test]
    fn test_text_table_shape_mismatch() {
        let cs = populated();
        let text = cs.to_text_table();

        let mut narrow = CountSketch::with_dimensions(16, 4);
        assert!(narrow.load_text_table(&text).is_err());

        let mut shallow = CountSketch::with_dimensions(32, 3);
        assert!(shallow.load_text_table(&text).is_err());
    }

    #[test]
    fn test_text_table_bad_cell() {
        let mut cs = CountSketch::with_dimensions(2, 2);
        let before = cs.to_bytes();
        assert!(cs.load_text_table("1,2\n3,oops\n").is_err());
        // Failed load leaves the table untouched
        assert_eq!(cs.to_bytes(), before);
    }
}
