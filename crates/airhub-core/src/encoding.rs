//! Bounds-checked byte-slice reader/writer used by the frame and message
//! codecs. All multi-byte fields on this wire are big-endian.

use crate::{DecodeError, EncodeError};

#[derive(Debug, Clone, Copy)]
pub struct Reader<'a> {
    buf: &'a [u8],
    pos: usize,
}

impl<'a> Reader<'a> {
    pub const fn new(buf: &'a [u8]) -> Self {
        Self { buf, pos: 0 }
    }

    pub const fn position(&self) -> usize {
        self.pos
    }

    pub fn remaining(&self) -> usize {
        self.buf.len().saturating_sub(self.pos)
    }

    pub fn is_empty(&self) -> bool {
        self.remaining() == 0
    }

    pub fn peek_u8(&self) -> Result<u8, DecodeError> {
        self.buf
            .get(self.pos)
            .copied()
            .ok_or(DecodeError::UnexpectedEof)
    }

    pub fn read_u8(&mut self) -> Result<u8, DecodeError> {
        let byte = self.peek_u8()?;
        self.pos += 1;
        Ok(byte)
    }

    pub fn read_exact(&mut self, len: usize) -> Result<&'a [u8], DecodeError> {
        if self.remaining() < len {
            return Err(DecodeError::UnexpectedEof);
        }
        let start = self.pos;
        self.pos += len;
        Ok(&self.buf[start..start + len])
    }

    pub fn read_be_u16(&mut self) -> Result<u16, DecodeError> {
        let bytes = self.read_exact(2)?;
        Ok(u16::from_be_bytes([bytes[0], bytes[1]]))
    }

    pub fn rest(&mut self) -> &'a [u8] {
        let start = self.pos;
        self.pos = self.buf.len();
        &self.buf[start..]
    }

    /// Reads a fixed-width, NUL-padded name field and returns the text up to
    /// the first NUL. Non-UTF-8 content is rejected rather than guessed at.
    pub fn read_name(&mut self, width: usize) -> Result<&'a str, DecodeError> {
        let raw = self.read_exact(width)?;
        let end = raw.iter().position(|&b| b == 0).unwrap_or(raw.len());
        core::str::from_utf8(&raw[..end]).map_err(|_| DecodeError::InvalidValue)
    }
}

#[derive(Debug)]
pub struct Writer<'a> {
    buf: &'a mut [u8],
    pos: usize,
}

impl<'a> Writer<'a> {
    pub fn new(buf: &'a mut [u8]) -> Self {
        Self { buf, pos: 0 }
    }

    pub const fn position(&self) -> usize {
        self.pos
    }

    pub fn remaining(&self) -> usize {
        self.buf.len().saturating_sub(self.pos)
    }

    pub fn as_written(&self) -> &[u8] {
        &self.buf[..self.pos]
    }

    pub fn write_u8(&mut self, value: u8) -> Result<(), EncodeError> {
        if self.remaining() < 1 {
            return Err(EncodeError::BufferTooSmall);
        }
        self.buf[self.pos] = value;
        self.pos += 1;
        Ok(())
    }

    pub fn write_all(&mut self, data: &[u8]) -> Result<(), EncodeError> {
        if self.remaining() < data.len() {
            return Err(EncodeError::BufferTooSmall);
        }
        let end = self.pos + data.len();
        self.buf[self.pos..end].copy_from_slice(data);
        self.pos = end;
        Ok(())
    }

    pub fn write_be_u16(&mut self, value: u16) -> Result<(), EncodeError> {
        self.write_all(&value.to_be_bytes())
    }

    /// Writes `name` into a fixed-width field, NUL-padded on the right.
    pub fn write_name(&mut self, name: &str, width: usize) -> Result<(), EncodeError> {
        if name.len() > width {
            return Err(EncodeError::NameTooLong);
        }
        self.write_all(name.as_bytes())?;
        for _ in name.len()..width {
            self.write_u8(0)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::{Reader, Writer};
    use crate::DecodeError;

    #[test]
    fn walks_a_body_header_field_by_field() {
        // Address, id, kind, big-endian length, then the data section.
        let mut r = Reader::new(&[0x80, 0xB0, 0x01, 0xC0, 0x00, 0x04, 0x21, 0x00, 0x00, 0x00]);
        assert_eq!(r.read_exact(2).unwrap(), &[0x80, 0xB0]);
        assert_eq!(r.read_u8().unwrap(), 0x01);
        assert_eq!(r.read_u8().unwrap(), 0xC0);
        assert_eq!(r.read_be_u16().unwrap(), 4);
        assert_eq!(r.position(), 6);
        assert_eq!(r.peek_u8().unwrap(), 0x21);
        assert_eq!(r.rest(), &[0x21, 0x00, 0x00, 0x00]);
        assert!(r.is_empty());
    }

    #[test]
    fn short_input_fails_instead_of_panicking() {
        let mut r = Reader::new(&[0x21]);
        assert_eq!(r.read_be_u16().unwrap_err(), DecodeError::UnexpectedEof);
        // The failed read consumes nothing.
        assert_eq!(r.read_u8().unwrap(), 0x21);
        assert_eq!(r.read_exact(1).unwrap_err(), DecodeError::UnexpectedEof);
        assert_eq!(r.peek_u8().unwrap_err(), DecodeError::UnexpectedEof);
    }

    #[test]
    fn name_field_round_trip() {
        let mut buf = [0xFFu8; 16];
        let mut w = Writer::new(&mut buf);
        w.write_name("Living", 16).unwrap();
        assert_eq!(&w.as_written()[..7], b"Living\0");

        let mut r = Reader::new(&buf);
        assert_eq!(r.read_name(16).unwrap(), "Living");
    }

    #[test]
    fn name_without_terminator_uses_full_width() {
        let mut r = Reader::new(b"ABCDEFGHIJKLMNOP");
        assert_eq!(r.read_name(16).unwrap(), "ABCDEFGHIJKLMNOP");
    }

    #[test]
    fn invalid_utf8_name_rejected() {
        let mut r = Reader::new(&[0xFF, 0xFE, 0, 0]);
        assert_eq!(r.read_name(4).unwrap_err(), DecodeError::InvalidValue);
    }
}
