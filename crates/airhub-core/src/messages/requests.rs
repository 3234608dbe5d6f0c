//! Request frames the driver sends to pull state from the controller.
//!
//! Status requests are empty standard messages; ability and name requests
//! are extended messages carrying only the marker pair. The controller
//! answers all of them asynchronously.

use super::{EXTENDED_MARKER, SUBTYPE_AC_ABILITY, SUBTYPE_AC_STATUS, SUBTYPE_ZONE_NAME, SUBTYPE_ZONE_STATUS};
use crate::encoding::Writer;
use crate::frame::{write_extended_frame, write_standard_frame};
use crate::EncodeError;

/// Largest request frame, for sizing stack buffers.
pub const REQUEST_FRAME_MAX: usize = 16;

/// Requests every unit's capability record.
pub fn write_ac_ability_request(w: &mut Writer<'_>) -> Result<(), EncodeError> {
    write_extended_frame(w, &[EXTENDED_MARKER, SUBTYPE_AC_ABILITY])
}

/// Requests the current status of every unit.
pub fn write_ac_status_request(w: &mut Writer<'_>) -> Result<(), EncodeError> {
    write_standard_frame(w, SUBTYPE_AC_STATUS, &[])
}

/// Requests the current status of every zone.
pub fn write_zone_status_request(w: &mut Writer<'_>) -> Result<(), EncodeError> {
    write_standard_frame(w, SUBTYPE_ZONE_STATUS, &[])
}

/// Requests every zone's name. The controller only answers once ability
/// and zone status have been exchanged; callers sequence this last.
pub fn write_zone_name_request(w: &mut Writer<'_>) -> Result<(), EncodeError> {
    write_extended_frame(w, &[EXTENDED_MARKER, SUBTYPE_ZONE_NAME])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn requests_fit_declared_maximum() {
        for write in [
            write_ac_ability_request,
            write_ac_status_request,
            write_zone_status_request,
            write_zone_name_request,
        ] {
            let mut buf = [0u8; REQUEST_FRAME_MAX];
            let mut w = Writer::new(&mut buf);
            write(&mut w).unwrap();
            assert!(w.position() <= REQUEST_FRAME_MAX);
        }
    }

    #[test]
    fn ability_request_bytes() {
        let mut buf = [0u8; REQUEST_FRAME_MAX];
        let mut w = Writer::new(&mut buf);
        write_ac_ability_request(&mut w).unwrap();
        let frame = w.as_written();
        assert_eq!(&frame[..4], &[0x55, 0x55, 0x55, 0xAA]);
        assert_eq!(&frame[4..8], &[0x90, 0xB0, 0x01, 0x1F]);
        assert_eq!(&frame[8..12], &[0x00, 0x02, 0xFF, 0x11]);
    }
}
