//! Byte-level encoding for binary type packages.
//!
//! Integers up to [`MAX_INLINE`] occupy four ASCII characters, right aligned
//! and padded with `.`. Larger integers occupy four bytes carrying seven bits
//! each, most significant first, with the top bit of every byte set so a
//! reader can tell the two forms apart from the first byte alone.

use thiserror::Error;

pub const MAX_INLINE: u64 = 9999;
pub const MAX_WIDE: u64 = 0x0fff_ffff;
pub const INT_WIDTH: usize = 4;

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum PackError {
    #[error("integer {0} exceeds the package limit of {MAX_WIDE}")]
    IntegerOverflow(u64),
    #[error("unexpected end of package at offset {0}")]
    Truncated(usize),
    #[error("malformed integer at offset {0}")]
    MalformedInt(usize),
}

pub fn encode_int(value: u64, out: &mut Vec<u8>) -> Result<(), PackError> {
    if value <= MAX_INLINE {
        out.extend_from_slice(format!("{value:.>4}").as_bytes());
        return Ok(());
    }
    if value > MAX_WIDE {
        return Err(PackError::IntegerOverflow(value));
    }
    for shift in [21u32, 14, 7, 0] {
        out.push(0x80 | ((value >> shift) & 0x7f) as u8);
    }
    Ok(())
}

/// Reads one integer at `offset`, returning the value and the offset after it.
pub fn decode_int(bytes: &[u8], offset: usize) -> Result<(u64, usize), PackError> {
    let end = offset + INT_WIDTH;
    let Some(chunk) = bytes.get(offset..end) else {
        return Err(PackError::Truncated(offset));
    };
    if chunk[0] & 0x80 != 0 {
        let mut value = 0u64;
        for byte in chunk {
            if byte & 0x80 == 0 {
                return Err(PackError::MalformedInt(offset));
            }
            value = (value << 7) | u64::from(byte & 0x7f);
        }
        return Ok((value, end));
    }
    let text = std::str::from_utf8(chunk).map_err(|_| PackError::MalformedInt(offset))?;
    let digits = text.trim_start_matches('.');
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return Err(PackError::MalformedInt(offset));
    }
    let value = digits
        .parse::<u64>()
        .map_err(|_| PackError::MalformedInt(offset))?;
    Ok((value, end))
}

/// Append-only writer for package sections.
#[derive(Debug, Default)]
pub struct PackWriter {
    buf: Vec<u8>,
}

impl PackWriter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn raw(&mut self, bytes: &[u8]) {
        self.buf.extend_from_slice(bytes);
    }

    pub fn tag(&mut self, tag: u8) {
        self.buf.push(tag);
    }

    pub fn int(&mut self, value: u64) -> Result<(), PackError> {
        encode_int(value, &mut self.buf)
    }

    pub fn count(&mut self, len: usize) -> Result<(), PackError> {
        self.int(len as u64)
    }

    pub fn str(&mut self, text: &str) -> Result<(), PackError> {
        self.count(text.len())?;
        self.buf.extend_from_slice(text.as_bytes());
        Ok(())
    }

    /// Writes the output of `body` prefixed with its encoded byte length.
    pub fn block<F>(&mut self, body: F) -> Result<(), PackError>
    where
        F: FnOnce(&mut PackWriter) -> Result<(), PackError>,
    {
        let mut inner = PackWriter::new();
        body(&mut inner)?;
        self.count(inner.buf.len())?;
        self.buf.extend_from_slice(&inner.buf);
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.buf.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.buf
    }
}
