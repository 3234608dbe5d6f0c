//! Typed encode/decode for each message subtype the driver speaks.
//!
//! Inbound dispatch is by address bytes, then subtype. Subtypes the driver
//! does not know decode to [`Message::Unhandled`] so that new controller
//! firmware cannot break the receive loop.

pub mod ac_ability;
pub mod ac_control;
pub mod ac_status;
pub mod requests;
pub mod zone_control;
pub mod zone_name;
pub mod zone_status;

use crate::encoding::Reader;
use crate::frame::{parse_body, ADDR_EXTENDED, ADDR_STANDARD};
use crate::DecodeError;

/// Standard subtype: zone control command.
pub const SUBTYPE_ZONE_CONTROL: u8 = 0x20;
/// Standard subtype: zone status report / request.
pub const SUBTYPE_ZONE_STATUS: u8 = 0x21;
/// Standard subtype: AC control command.
pub const SUBTYPE_AC_CONTROL: u8 = 0x22;
/// Standard subtype: AC status report / request.
pub const SUBTYPE_AC_STATUS: u8 = 0x23;

/// Extended subtype: AC error detail. Not decoded yet.
pub const SUBTYPE_AC_ERROR: u8 = 0x10;
/// Extended subtype: AC capability report / request.
pub const SUBTYPE_AC_ABILITY: u8 = 0x11;
/// Extended subtype: zone name report / request.
pub const SUBTYPE_ZONE_NAME: u8 = 0x13;

/// Marker byte opening every extended payload.
pub const EXTENDED_MARKER: u8 = 0xFF;

/// Repeat header for control payloads: one repeat of four bytes.
pub const CONTROL_REPEAT_HEADER: [u8; 4] = [0x00, 0x04, 0x00, 0x01];

/// A decoded inbound message body.
#[derive(Debug, Clone, Copy)]
pub enum Message<'a> {
    AcStatus(ac_status::AcStatusBatch<'a>),
    ZoneStatus(zone_status::ZoneStatusBatch<'a>),
    AcAbility(ac_ability::AcAbilityBatch<'a>),
    ZoneNames(zone_name::ZoneNameBatch<'a>),
    /// Recognized frame carrying a subtype this driver does not handle.
    Unhandled { address: [u8; 2], subtype: u8 },
}

/// Decodes a CRC-verified frame body (as yielded by the deframer).
pub fn decode_body(body: &[u8]) -> Result<Message<'_>, DecodeError> {
    let frame = parse_body(body)?;
    let mut r = Reader::new(frame.data);
    match frame.address {
        ADDR_STANDARD => {
            let subtype = r.read_u8()?;
            r.read_exact(3)?; // reserved
            match subtype {
                SUBTYPE_ZONE_STATUS => {
                    Ok(Message::ZoneStatus(zone_status::ZoneStatusBatch::decode(&mut r)?))
                }
                SUBTYPE_AC_STATUS => {
                    Ok(Message::AcStatus(ac_status::AcStatusBatch::decode(&mut r)?))
                }
                other => Ok(Message::Unhandled {
                    address: frame.address,
                    subtype: other,
                }),
            }
        }
        ADDR_EXTENDED => {
            let marker = r.read_u8()?;
            if marker != EXTENDED_MARKER {
                return Ok(Message::Unhandled {
                    address: frame.address,
                    subtype: marker,
                });
            }
            let subtype = r.read_u8()?;
            match subtype {
                SUBTYPE_AC_ABILITY => {
                    Ok(Message::AcAbility(ac_ability::AcAbilityBatch::new(r.rest())))
                }
                SUBTYPE_ZONE_NAME => {
                    Ok(Message::ZoneNames(zone_name::ZoneNameBatch::new(r.rest())))
                }
                other => Ok(Message::Unhandled {
                    address: frame.address,
                    subtype: other,
                }),
            }
        }
        other => Ok(Message::Unhandled {
            address: other,
            subtype: frame.data.first().copied().unwrap_or(0),
        }),
    }
}

/// Repeat-data section of a standard status message: per-repeat length and
/// the raw record bytes.
#[derive(Debug, Clone, Copy)]
pub(crate) struct RepeatData<'a> {
    pub each_len: usize,
    pub records: &'a [u8],
}

/// Reads the `[per-repeat length][repeat count]` header and slices out the
/// record area. An empty data section (a bare request) yields zero records.
/// A record shorter than `min_len` is a framing-level defect; a longer one
/// is tolerated for forward compatibility, extra bytes ignored per record.
pub(crate) fn decode_repeats<'a>(
    r: &mut Reader<'a>,
    min_len: usize,
) -> Result<RepeatData<'a>, DecodeError> {
    if r.is_empty() {
        return Ok(RepeatData {
            each_len: min_len,
            records: &[],
        });
    }
    let each_len = usize::from(r.read_be_u16()?);
    let count = usize::from(r.read_be_u16()?);
    if each_len < min_len {
        return Err(DecodeError::InvalidLength);
    }
    let available = r.remaining() / each_len;
    let take = count.min(available);
    let records = r.read_exact(take * each_len)?;
    Ok(RepeatData { each_len, records })
}
