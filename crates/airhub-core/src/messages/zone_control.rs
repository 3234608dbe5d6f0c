//! Zone control commands (standard subtype 0x20).

use super::{CONTROL_REPEAT_HEADER, SUBTYPE_ZONE_CONTROL};
use crate::encoding::{Reader, Writer};
use crate::frame::write_standard_frame;
use crate::types::{setpoint_from_raw, setpoint_to_raw, Setting, ZonePowerAction};
use crate::{DecodeError, EncodeError};

/// Highest addressable zone number.
pub const MAX_ZONE: u8 = 15;

/// Three-bit setting-kind codes (byte 1, bits 7-5).
const KIND_KEEP: u8 = 0;
const KIND_DAMPER_PERCENT: u8 = 4;
const KIND_SETPOINT: u8 = 5;

/// What a zone control command does to the zone's regulation target.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum ZoneSetting {
    /// Leave the current damper/setpoint target untouched.
    #[default]
    Keep,
    /// Hold the damper at a fixed open percentage, 0-100.
    DamperPercent(u8),
    /// Regulate to a setpoint in degrees Celsius, 10.0 to 35.0.
    Setpoint(f32),
}

/// One zone control command.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ZoneControl {
    pub zone: u8,
    pub power: Setting<ZonePowerAction>,
    pub setting: ZoneSetting,
}

impl ZoneControl {
    pub fn for_zone(zone: u8) -> Self {
        Self {
            zone,
            ..Self::default()
        }
    }

    /// Encodes the four control bytes.
    pub fn encode(&self, w: &mut Writer<'_>) -> Result<(), EncodeError> {
        if self.zone > MAX_ZONE {
            return Err(EncodeError::ValueOutOfRange);
        }
        let power = match self.power {
            Setting::Keep => 0,
            Setting::Set(action) => action.to_u8(),
        };
        let (kind, value) = match self.setting {
            ZoneSetting::Keep => (KIND_KEEP, 0),
            ZoneSetting::DamperPercent(percent) => {
                if percent > 100 {
                    return Err(EncodeError::ValueOutOfRange);
                }
                (KIND_DAMPER_PERCENT, percent)
            }
            ZoneSetting::Setpoint(celsius) => (KIND_SETPOINT, setpoint_to_raw(celsius)?),
        };
        w.write_u8(self.zone)?;
        w.write_u8(kind << 5 | power)?;
        w.write_u8(value)?;
        w.write_u8(0x00) // reserved
    }

    /// Decodes the four control bytes. Exists for tests and controller
    /// simulation.
    pub fn decode(r: &mut Reader<'_>) -> Result<Self, DecodeError> {
        let zone = r.read_u8()?;
        let b1 = r.read_u8()?;
        let value = r.read_u8()?;
        let _reserved = r.read_u8()?;

        let power = match b1 & 0x07 {
            0 => Setting::Keep,
            bits => Setting::Set(
                ZonePowerAction::from_u8(bits).ok_or(DecodeError::InvalidValue)?,
            ),
        };
        let setting = match b1 >> 5 {
            KIND_KEEP => ZoneSetting::Keep,
            KIND_DAMPER_PERCENT => ZoneSetting::DamperPercent(value),
            KIND_SETPOINT => ZoneSetting::Setpoint(setpoint_from_raw(value)),
            _ => return Err(DecodeError::InvalidValue),
        };
        Ok(Self {
            zone,
            power,
            setting,
        })
    }
}

/// Writes the complete wire frame for one zone control command.
pub fn write_zone_control_frame(
    w: &mut Writer<'_>,
    control: &ZoneControl,
) -> Result<(), EncodeError> {
    let mut payload = [0u8; 8];
    {
        let mut pw = Writer::new(&mut payload);
        pw.write_all(&CONTROL_REPEAT_HEADER)?;
        control.encode(&mut pw)?;
    }
    write_standard_frame(w, SUBTYPE_ZONE_CONTROL, &payload)
}
