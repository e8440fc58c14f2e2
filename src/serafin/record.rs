//! Record-marker primitives.
//!
//! Every logical field of a Serafin file is a sequential unformatted record:
//!
//! ```text
//! +-----------+------------------+-----------+
//! | len (i32) | payload len bytes| len (i32) |
//! +-----------+------------------+-----------+
//! ```
//!
//! Integers are 4-byte signed, floats are 4 or 8 bytes depending on the
//! format tag, and the whole file uses a single byte order.

use std::io::{Read, Write};

use super::error::{Result, ValidationError};

/// Size of one record marker.
pub const MARKER_SIZE: u64 = 4;

/// Byte order of a file.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Endianness {
    /// Most significant byte first (solver default)
    #[default]
    Big,
    /// Least significant byte first
    Little,
}

impl Endianness {
    /// Detect byte order from the raw first marker of a file, which must be 80.
    pub fn detect(marker: [u8; 4]) -> Option<Self> {
        if i32::from_be_bytes(marker) == 80 {
            Some(Endianness::Big)
        } else if i32::from_le_bytes(marker) == 80 {
            Some(Endianness::Little)
        } else {
            None
        }
    }

    /// The opposite byte order.
    pub fn toggled(self) -> Self {
        match self {
            Endianness::Big => Endianness::Little,
            Endianness::Little => Endianness::Big,
        }
    }

    #[inline]
    pub fn i32_from(self, bytes: [u8; 4]) -> i32 {
        match self {
            Endianness::Big => i32::from_be_bytes(bytes),
            Endianness::Little => i32::from_le_bytes(bytes),
        }
    }

    #[inline]
    pub fn i32_bytes(self, value: i32) -> [u8; 4] {
        match self {
            Endianness::Big => value.to_be_bytes(),
            Endianness::Little => value.to_le_bytes(),
        }
    }

    #[inline]
    fn f32_from(self, bytes: [u8; 4]) -> f32 {
        match self {
            Endianness::Big => f32::from_be_bytes(bytes),
            Endianness::Little => f32::from_le_bytes(bytes),
        }
    }

    #[inline]
    fn f64_from(self, bytes: [u8; 8]) -> f64 {
        match self {
            Endianness::Big => f64::from_be_bytes(bytes),
            Endianness::Little => f64::from_le_bytes(bytes),
        }
    }
}

/// Floating-point precision of coordinates and frame values.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum FloatType {
    /// 4-byte IEEE floats
    #[default]
    Single,
    /// 8-byte IEEE floats
    Double,
}

/// Format tag written for single precision files.
pub const SINGLE_PRECISION_TAG: &[u8; 8] = b"SERAFIN ";

/// Format tag written for double precision files.
pub const DOUBLE_PRECISION_TAG: &[u8; 8] = b"SERAFIND";

/// Single precision tags seen in the wild.
const KNOWN_SINGLE_TAGS: [&[u8; 8]; 3] = [b"SERAFIN ", b"SERAPHIN", b"SERAFINS"];

impl FloatType {
    /// Bytes per value.
    #[inline]
    pub fn size(self) -> u64 {
        match self {
            FloatType::Single => 4,
            FloatType::Double => 8,
        }
    }

    /// Select precision from an 8-byte format tag.
    ///
    /// Returns the precision and whether the tag was recognised. Unknown tags
    /// fall back to single precision.
    pub fn from_tag(tag: &[u8; 8]) -> (Self, bool) {
        let last = tag.iter().rev().find(|&&b| b != b' ');
        if tag == DOUBLE_PRECISION_TAG || last == Some(&b'D') {
            (FloatType::Double, true)
        } else if KNOWN_SINGLE_TAGS.contains(&tag) {
            (FloatType::Single, true)
        } else {
            (FloatType::Single, false)
        }
    }

    /// Canonical format tag for this precision.
    pub fn tag(self) -> [u8; 8] {
        match self {
            FloatType::Single => *SINGLE_PRECISION_TAG,
            FloatType::Double => *DOUBLE_PRECISION_TAG,
        }
    }
}

/// Low-level record reader bound to one byte order and precision.
pub struct RecordReader<'a, R: Read> {
    reader: &'a mut R,
    endian: Endianness,
    float_type: FloatType,
}

impl<'a, R: Read> RecordReader<'a, R> {
    pub fn new(reader: &'a mut R, endian: Endianness, float_type: FloatType) -> Self {
        Self {
            reader,
            endian,
            float_type,
        }
    }

    /// Change precision once the format tag has been decoded.
    pub fn set_float_type(&mut self, float_type: FloatType) {
        self.float_type = float_type;
    }

    fn read_marker(&mut self) -> Result<i32> {
        let mut buf = [0u8; 4];
        self.reader.read_exact(&mut buf)?;
        Ok(self.endian.i32_from(buf))
    }

    /// Read one record whose payload must be exactly `len` bytes.
    pub fn read_record(&mut self, field: &'static str, len: usize) -> Result<Vec<u8>> {
        let leading = self.read_marker()?;
        if leading as i64 != len as i64 {
            return Err(ValidationError::RecordMarkerMismatch {
                field,
                expected: len as i64,
                found: leading as i64,
            }
            .into());
        }

        let mut payload = vec![0u8; len];
        self.reader.read_exact(&mut payload)?;

        let trailing = self.read_marker()?;
        if trailing != leading {
            return Err(ValidationError::RecordMarkerMismatch {
                field,
                expected: len as i64,
                found: trailing as i64,
            }
            .into());
        }
        Ok(payload)
    }

    /// Read a record of `count` integers.
    pub fn read_i32s(&mut self, field: &'static str, count: usize) -> Result<Vec<i32>> {
        let payload = self.read_record(field, 4 * count)?;
        Ok(decode_i32s(&payload, self.endian))
    }

    /// Read a record of `count` floats, widened to f64.
    pub fn read_floats(&mut self, field: &'static str, count: usize) -> Result<Vec<f64>> {
        let size = self.float_type.size() as usize;
        let payload = self.read_record(field, size * count)?;
        Ok(decode_floats(&payload, self.endian, self.float_type))
    }
}

/// Decode big/little-endian i32 values.
pub fn decode_i32s(bytes: &[u8], endian: Endianness) -> Vec<i32> {
    bytes
        .chunks_exact(4)
        .map(|c| endian.i32_from([c[0], c[1], c[2], c[3]]))
        .collect()
}

/// Decode floats of the given precision into f64.
pub fn decode_floats(bytes: &[u8], endian: Endianness, float_type: FloatType) -> Vec<f64> {
    match float_type {
        FloatType::Single => bytes
            .chunks_exact(4)
            .map(|c| endian.f32_from([c[0], c[1], c[2], c[3]]) as f64)
            .collect(),
        FloatType::Double => bytes
            .chunks_exact(8)
            .map(|c| {
                let mut b = [0u8; 8];
                b.copy_from_slice(c);
                endian.f64_from(b)
            })
            .collect(),
    }
}

/// Encode i32 values.
pub fn encode_i32s(values: &[i32], endian: Endianness) -> Vec<u8> {
    let mut out = Vec::with_capacity(4 * values.len());
    for &v in values {
        out.extend_from_slice(&endian.i32_bytes(v));
    }
    out
}

/// Encode f64 values at the given precision (narrowing to f32 when single).
pub fn encode_floats(values: &[f64], endian: Endianness, float_type: FloatType) -> Vec<u8> {
    let mut out = Vec::with_capacity(float_type.size() as usize * values.len());
    match (float_type, endian) {
        (FloatType::Single, Endianness::Big) => {
            values
                .iter()
                .for_each(|&v| out.extend_from_slice(&(v as f32).to_be_bytes()));
        }
        (FloatType::Single, Endianness::Little) => {
            values
                .iter()
                .for_each(|&v| out.extend_from_slice(&(v as f32).to_le_bytes()));
        }
        (FloatType::Double, Endianness::Big) => {
            values
                .iter()
                .for_each(|&v| out.extend_from_slice(&v.to_be_bytes()));
        }
        (FloatType::Double, Endianness::Little) => {
            values
                .iter()
                .for_each(|&v| out.extend_from_slice(&v.to_le_bytes()));
        }
    }
    out
}

/// Write one record: marker, payload, marker.
pub fn write_record<W: Write>(writer: &mut W, endian: Endianness, payload: &[u8]) -> Result<()> {
    let marker = endian.i32_bytes(payload.len() as i32);
    writer.write_all(&marker)?;
    writer.write_all(payload)?;
    writer.write_all(&marker)?;
    Ok(())
}
