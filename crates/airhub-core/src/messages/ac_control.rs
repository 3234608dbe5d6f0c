//! AC control commands (standard subtype 0x22).

use super::{CONTROL_REPEAT_HEADER, SUBTYPE_AC_CONTROL};
use crate::encoding::{Reader, Writer};
use crate::frame::write_standard_frame;
use crate::types::{setpoint_from_raw, setpoint_to_raw, AcMode, AcPowerAction, FanSpeed, Setting};
use crate::{DecodeError, EncodeError};

/// Nibble meaning "leave power as it is".
const POWER_KEEP: u8 = 0x0;
/// Nibble meaning "leave mode / fan speed as it is".
const NIBBLE_KEEP: u8 = 0xF;
/// Setpoint flag byte: change the setpoint.
const SETPOINT_SET: u8 = 0x40;
/// Raw setpoint byte when the setpoint is kept.
const SETPOINT_KEEP_RAW: u8 = 0xFF;

/// One AC control command. Every field defaults to [`Setting::Keep`], so a
/// caller states exactly what it wants changed and nothing else moves.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct AcControl {
    pub unit: u8,
    pub power: Setting<AcPowerAction>,
    pub mode: Setting<AcMode>,
    pub fan_speed: Setting<FanSpeed>,
    /// Target setpoint in degrees Celsius, 10.0 to 35.0.
    pub setpoint: Setting<f32>,
}

impl AcControl {
    pub fn for_unit(unit: u8) -> Self {
        Self {
            unit,
            ..Self::default()
        }
    }

    /// Encodes the four control bytes.
    pub fn encode(&self, w: &mut Writer<'_>) -> Result<(), EncodeError> {
        if self.unit > 0x0F {
            return Err(EncodeError::ValueOutOfRange);
        }
        let power = match self.power {
            Setting::Keep => POWER_KEEP,
            Setting::Set(action) => action.to_u8(),
        };
        let mode = match self.mode {
            Setting::Keep => NIBBLE_KEEP,
            Setting::Set(AcMode::Unknown(_)) => return Err(EncodeError::ValueOutOfRange),
            Setting::Set(mode) => mode.to_u8(),
        };
        let fan = match self.fan_speed {
            Setting::Keep => NIBBLE_KEEP,
            Setting::Set(FanSpeed::Unknown(_)) => return Err(EncodeError::ValueOutOfRange),
            Setting::Set(speed) => speed.to_u8(),
        };
        w.write_u8(power << 4 | self.unit)?;
        w.write_u8(mode << 4 | fan)?;
        match self.setpoint {
            Setting::Keep => {
                w.write_u8(0x00)?;
                w.write_u8(SETPOINT_KEEP_RAW)
            }
            Setting::Set(celsius) => {
                w.write_u8(SETPOINT_SET)?;
                w.write_u8(setpoint_to_raw(celsius)?)
            }
        }
    }

    /// Decodes the four control bytes. Exists for tests and controller
    /// simulation; the controller itself is the normal consumer.
    pub fn decode(r: &mut Reader<'_>) -> Result<Self, DecodeError> {
        let b0 = r.read_u8()?;
        let b1 = r.read_u8()?;
        let b2 = r.read_u8()?;
        let b3 = r.read_u8()?;

        let power = match b0 >> 4 {
            POWER_KEEP => Setting::Keep,
            nibble => Setting::Set(
                AcPowerAction::from_u8(nibble).ok_or(DecodeError::InvalidValue)?,
            ),
        };
        let mode = match b1 >> 4 {
            NIBBLE_KEEP => Setting::Keep,
            nibble => Setting::Set(AcMode::from_u8(nibble)),
        };
        let fan_speed = match b1 & 0x0F {
            NIBBLE_KEEP => Setting::Keep,
            nibble => Setting::Set(FanSpeed::from_u8(nibble)),
        };
        let setpoint = if b2 & SETPOINT_SET != 0 {
            Setting::Set(setpoint_from_raw(b3))
        } else {
            Setting::Keep
        };
        Ok(Self {
            unit: b0 & 0x0F,
            power,
            mode,
            fan_speed,
            setpoint,
        })
    }
}

/// Writes the complete wire frame for one AC control command.
pub fn write_ac_control_frame(w: &mut Writer<'_>, control: &AcControl) -> Result<(), EncodeError> {
    let mut payload = [0u8; 8];
    {
        let mut pw = Writer::new(&mut payload);
        pw.write_all(&CONTROL_REPEAT_HEADER)?;
        control.encode(&mut pw)?;
    }
    write_standard_frame(w, SUBTYPE_AC_CONTROL, &payload)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keep_everything_encodes_neutral_bytes() {
        let mut buf = [0u8; 4];
        let mut w = Writer::new(&mut buf);
        AcControl::for_unit(2).encode(&mut w).unwrap();
        assert_eq!(w.as_written(), &[0x02, 0xFF, 0x00, 0xFF]);
    }

    #[test]
    fn set_everything_encodes_expected_bytes() {
        let control = AcControl {
            unit: 1,
            power: Setting::Set(AcPowerAction::On),
            mode: Setting::Set(AcMode::Cool),
            fan_speed: Setting::Set(FanSpeed::Low),
            setpoint: Setting::Set(24.0),
        };
        let mut buf = [0u8; 4];
        let mut w = Writer::new(&mut buf);
        control.encode(&mut w).unwrap();
        assert_eq!(w.as_written(), &[0x31, 0x42, 0x40, 0x8C]);
    }

    #[test]
    fn decode_inverts_encode() {
        let control = AcControl {
            unit: 3,
            power: Setting::Set(AcPowerAction::Off),
            mode: Setting::Set(AcMode::Heat),
            fan_speed: Setting::Keep,
            setpoint: Setting::Set(21.5),
        };
        let mut buf = [0u8; 4];
        let mut w = Writer::new(&mut buf);
        control.encode(&mut w).unwrap();
        let mut r = Reader::new(w.as_written());
        assert_eq!(AcControl::decode(&mut r).unwrap(), control);
    }

    #[test]
    fn rejects_out_of_range_fields() {
        let mut buf = [0u8; 4];
        let mut w = Writer::new(&mut buf);
        assert_eq!(
            AcControl::for_unit(16).encode(&mut w).unwrap_err(),
            EncodeError::ValueOutOfRange
        );

        let mut w = Writer::new(&mut buf);
        let control = AcControl {
            unit: 0,
            setpoint: Setting::Set(40.0),
            ..AcControl::default()
        };
        assert_eq!(control.encode(&mut w).unwrap_err(), EncodeError::ValueOutOfRange);
    }

    #[test]
    fn frame_wraps_repeat_header_and_payload() {
        let mut buf = [0u8; 32];
        let mut w = Writer::new(&mut buf);
        write_ac_control_frame(&mut w, &AcControl::for_unit(0)).unwrap();
        let frame = w.as_written();
        assert_eq!(&frame[..4], &[0x55, 0x55, 0x55, 0xAA]);
        assert_eq!(frame[10], SUBTYPE_AC_CONTROL);
        // Repeat header then the four control bytes.
        assert_eq!(&frame[14..22], &[0x00, 0x04, 0x00, 0x01, 0x00, 0xFF, 0x00, 0xFF]);
    }
}
