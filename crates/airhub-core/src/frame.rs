//! Wire framing: magic header, addressing, declared length, CRC trailer.
//!
//! A frame on the socket is `magic(4) | body | crc16(body)(2)` where the body
//! is `address(2) | message id(1) | kind(1) | data length(2 BE) | data`.
//! Standard messages (kind 0xC0) carry a subtype byte and three reserved
//! bytes ahead of their payload; extended messages (kind 0x1F) carry their
//! payload as-is, starting with `0xFF, subtype`.

use crate::crc::crc16;
use crate::encoding::{Reader, Writer};
use crate::{DecodeError, EncodeError};

/// Fixed frame preamble.
pub const MAGIC: [u8; 4] = [0x55, 0x55, 0x55, 0xAA];

/// Address bytes of a standard message.
pub const ADDR_STANDARD: [u8; 2] = [0x80, 0xB0];
/// Address bytes of an extended message.
pub const ADDR_EXTENDED: [u8; 2] = [0x90, 0xB0];

/// Message id byte. The protocol defines no other value.
pub const MESSAGE_ID: u8 = 0x01;
/// Kind byte of a standard (control/status) message.
pub const KIND_STANDARD: u8 = 0xC0;
/// Kind byte of an extended message.
pub const KIND_EXTENDED: u8 = 0x1F;

/// Byte count of the frame preamble plus body header, i.e. the offset of the
/// data section from the start of a frame.
pub const DATA_OFFSET: usize = MAGIC.len() + 6;

/// Upper bound on the declared data length. Anything larger is treated as a
/// corrupt header rather than an instruction to buffer megabytes.
pub const MAX_DATA_LEN: usize = 2048;

/// Assembles a standard message body: address, id, kind, length, subtype,
/// three reserved bytes, payload.
pub fn encode_standard_body(
    w: &mut Writer<'_>,
    subtype: u8,
    payload: &[u8],
) -> Result<(), EncodeError> {
    let data_len = 4 + payload.len();
    if data_len > MAX_DATA_LEN {
        return Err(EncodeError::ValueOutOfRange);
    }
    w.write_all(&ADDR_STANDARD)?;
    w.write_u8(MESSAGE_ID)?;
    w.write_u8(KIND_STANDARD)?;
    w.write_be_u16(data_len as u16)?;
    w.write_u8(subtype)?;
    w.write_all(&[0x00, 0x00, 0x00])?;
    w.write_all(payload)
}

/// Assembles an extended message body. The payload must already start with
/// the `0xFF, subtype` marker pair.
pub fn encode_extended_body(w: &mut Writer<'_>, payload: &[u8]) -> Result<(), EncodeError> {
    if payload.len() > MAX_DATA_LEN {
        return Err(EncodeError::ValueOutOfRange);
    }
    w.write_all(&ADDR_EXTENDED)?;
    w.write_u8(MESSAGE_ID)?;
    w.write_u8(KIND_EXTENDED)?;
    w.write_be_u16(payload.len() as u16)?;
    w.write_all(payload)
}

/// Wraps an assembled body into the unit written to the socket: magic
/// preamble, body, big-endian CRC16 trailer.
pub fn wrap(w: &mut Writer<'_>, body: &[u8]) -> Result<(), EncodeError> {
    w.write_all(&MAGIC)?;
    w.write_all(body)?;
    w.write_be_u16(crc16(body))
}

/// Writes a complete standard-message frame in one step.
pub fn write_standard_frame(
    w: &mut Writer<'_>,
    subtype: u8,
    payload: &[u8],
) -> Result<(), EncodeError> {
    w.write_all(&MAGIC)?;
    let body_start = w.position();
    encode_standard_body(w, subtype, payload)?;
    let crc = crc16(&w.as_written()[body_start..]);
    w.write_be_u16(crc)
}

/// Writes a complete extended-message frame in one step.
pub fn write_extended_frame(w: &mut Writer<'_>, payload: &[u8]) -> Result<(), EncodeError> {
    w.write_all(&MAGIC)?;
    let body_start = w.position();
    encode_extended_body(w, payload)?;
    let crc = crc16(&w.as_written()[body_start..]);
    w.write_be_u16(crc)
}

/// A parsed frame body. `data` is exactly the declared-length data section.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameBody<'a> {
    pub address: [u8; 2],
    pub message_id: u8,
    pub kind: u8,
    pub data: &'a [u8],
}

/// Parses a frame body (the region between magic and CRC).
pub fn parse_body(body: &[u8]) -> Result<FrameBody<'_>, DecodeError> {
    let mut r = Reader::new(body);
    let addr = r.read_exact(2)?;
    let message_id = r.read_u8()?;
    let kind = r.read_u8()?;
    let len = usize::from(r.read_be_u16()?);
    if len > MAX_DATA_LEN {
        return Err(DecodeError::InvalidLength);
    }
    let data = r.read_exact(len)?;
    Ok(FrameBody {
        address: [addr[0], addr[1]],
        message_id,
        kind,
        data,
    })
}

/// Incremental deframer for the inbound TCP stream.
///
/// Socket reads are not aligned to message boundaries: a read may carry a
/// partial frame, several frames, or junk ahead of the magic (controllers
/// prefix bursts with an envelope of roughly ten bytes). The deframer
/// buffers everything fed to it, discards bytes until a magic preamble,
/// frames on the declared length, and verifies the CRC before yielding a
/// body.
#[cfg(feature = "alloc")]
#[derive(Debug, Default)]
pub struct Deframer {
    buf: alloc::vec::Vec<u8>,
}

#[cfg(feature = "alloc")]
impl Deframer {
    /// Bytes retained while waiting for a frame to complete. Junk past this
    /// bound is discarded oldest-first.
    const MAX_BUFFERED: usize = 64 * 1024;

    pub fn new() -> Self {
        Self::default()
    }

    /// Appends raw bytes read from the socket.
    pub fn extend(&mut self, bytes: &[u8]) {
        self.buf.extend_from_slice(bytes);
        if self.buf.len() > Self::MAX_BUFFERED {
            let excess = self.buf.len() - Self::MAX_BUFFERED;
            self.buf.drain(..excess);
        }
    }

    /// Attempts to extract the next complete frame body.
    ///
    /// `None` means more bytes are needed. An `Err` is a single corrupt
    /// frame (bad CRC); the stream stays usable and the next call resumes
    /// scanning.
    pub fn next_body(&mut self) -> Option<Result<alloc::vec::Vec<u8>, DecodeError>> {
        loop {
            let start = find_magic(&self.buf)?;
            if start > 0 {
                self.buf.drain(..start);
            }

            if self.buf.len() < DATA_OFFSET {
                return None;
            }
            let declared = usize::from(u16::from_be_bytes([self.buf[8], self.buf[9]]));
            if declared > MAX_DATA_LEN {
                // Corrupt header: this was not a real frame start. Skip one
                // byte of the false magic and rescan.
                self.buf.drain(..1);
                continue;
            }

            let total = DATA_OFFSET + declared + 2;
            if self.buf.len() < total {
                return None;
            }

            let body_end = total - 2;
            let expected =
                u16::from_be_bytes([self.buf[body_end], self.buf[body_end + 1]]);
            let actual = crc16(&self.buf[MAGIC.len()..body_end]);
            if actual != expected {
                self.buf.drain(..total);
                return Some(Err(DecodeError::ChecksumMismatch { expected, actual }));
            }

            let body = self.buf[MAGIC.len()..body_end].to_vec();
            self.buf.drain(..total);
            return Some(Ok(body));
        }
    }
}

#[cfg(feature = "alloc")]
fn find_magic(buf: &[u8]) -> Option<usize> {
    buf.windows(MAGIC.len()).position(|w| w == MAGIC)
}
