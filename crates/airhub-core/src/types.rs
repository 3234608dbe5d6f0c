//! Protocol enums and value conversions shared by the message codecs.

use crate::EncodeError;

/// AC power state as reported in a status record (4-bit field).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum AcPower {
    Off,
    On,
    AwayOff,
    AwayOn,
    Sleep,
    Unknown(u8),
}

impl AcPower {
    pub const fn to_u8(self) -> u8 {
        match self {
            Self::Off => 0,
            Self::On => 1,
            Self::AwayOff => 2,
            Self::AwayOn => 3,
            Self::Sleep => 5,
            Self::Unknown(v) => v,
        }
    }

    pub const fn from_u8(value: u8) -> Self {
        match value {
            0 => Self::Off,
            1 => Self::On,
            2 => Self::AwayOff,
            3 => Self::AwayOn,
            5 => Self::Sleep,
            v => Self::Unknown(v),
        }
    }

    /// True for every powered-on variant, including away-on.
    pub const fn is_on(self) -> bool {
        matches!(self, Self::On | Self::AwayOn | Self::Sleep)
    }
}

/// AC power transition requested by a control message (4-bit field).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum AcPowerAction {
    Off,
    On,
    Away,
    Sleep,
}

impl AcPowerAction {
    pub const fn to_u8(self) -> u8 {
        match self {
            Self::Off => 2,
            Self::On => 3,
            Self::Away => 4,
            Self::Sleep => 5,
        }
    }

    pub const fn from_u8(value: u8) -> Option<Self> {
        match value {
            2 => Some(Self::Off),
            3 => Some(Self::On),
            4 => Some(Self::Away),
            5 => Some(Self::Sleep),
            _ => None,
        }
    }
}

/// AC operating mode (4-bit field). Modes 8 and 9 are the compressor
/// direction the unit chose while in auto.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum AcMode {
    Auto,
    Heat,
    Dry,
    Fan,
    Cool,
    AutoHeat,
    AutoCool,
    Unknown(u8),
}

impl AcMode {
    pub const fn to_u8(self) -> u8 {
        match self {
            Self::Auto => 0,
            Self::Heat => 1,
            Self::Dry => 2,
            Self::Fan => 3,
            Self::Cool => 4,
            Self::AutoHeat => 8,
            Self::AutoCool => 9,
            Self::Unknown(v) => v,
        }
    }

    pub const fn from_u8(value: u8) -> Self {
        match value {
            0 => Self::Auto,
            1 => Self::Heat,
            2 => Self::Dry,
            3 => Self::Fan,
            4 => Self::Cool,
            8 => Self::AutoHeat,
            9 => Self::AutoCool,
            v => Self::Unknown(v),
        }
    }
}

/// Fan speed code (4-bit field).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum FanSpeed {
    Auto,
    Quiet,
    Low,
    Medium,
    High,
    Powerful,
    Turbo,
    Intelligent,
    Unknown(u8),
}

impl FanSpeed {
    pub const fn to_u8(self) -> u8 {
        match self {
            Self::Auto => 0,
            Self::Quiet => 1,
            Self::Low => 2,
            Self::Medium => 3,
            Self::High => 4,
            Self::Powerful => 5,
            Self::Turbo => 6,
            Self::Intelligent => 8,
            Self::Unknown(v) => v,
        }
    }

    pub const fn from_u8(value: u8) -> Self {
        match value {
            0 => Self::Auto,
            1 => Self::Quiet,
            2 => Self::Low,
            3 => Self::Medium,
            4 => Self::High,
            5 => Self::Powerful,
            6 => Self::Turbo,
            8 => Self::Intelligent,
            v => Self::Unknown(v),
        }
    }
}

/// Zone power state as reported in a status record (2-bit field).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ZonePower {
    Off,
    On,
    Turbo,
    Unknown(u8),
}

impl ZonePower {
    pub const fn to_u8(self) -> u8 {
        match self {
            Self::Off => 0,
            Self::On => 1,
            Self::Turbo => 3,
            Self::Unknown(v) => v,
        }
    }

    pub const fn from_u8(value: u8) -> Self {
        match value {
            0 => Self::Off,
            1 => Self::On,
            3 => Self::Turbo,
            v => Self::Unknown(v),
        }
    }

    pub const fn is_on(self) -> bool {
        matches!(self, Self::On | Self::Turbo)
    }
}

/// Zone power transition requested by a control message (3-bit field).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ZonePowerAction {
    Off,
    On,
    Turbo,
}

impl ZonePowerAction {
    pub const fn to_u8(self) -> u8 {
        match self {
            Self::Off => 2,
            Self::On => 3,
            Self::Turbo => 5,
        }
    }

    pub const fn from_u8(value: u8) -> Option<Self> {
        match value {
            2 => Some(Self::Off),
            3 => Some(Self::On),
            5 => Some(Self::Turbo),
            _ => None,
        }
    }
}

/// How a zone is being regulated: by damper percentage or by setpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ZoneControlMethod {
    DamperPercent,
    Setpoint,
}

impl ZoneControlMethod {
    pub const fn to_bit(self) -> u8 {
        match self {
            Self::DamperPercent => 0,
            Self::Setpoint => 1,
        }
    }

    pub const fn from_bit(bit: u8) -> Self {
        if bit == 0 {
            Self::DamperPercent
        } else {
            Self::Setpoint
        }
    }
}

/// A control field that either keeps the controller's current value or sets
/// a new one. Replaces the sentinel "magic default" convention: a caller who
/// did not touch a field and a caller who asked for the default are
/// distinguishable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Setting<T> {
    #[default]
    Keep,
    Set(T),
}

impl<T> Setting<T> {
    pub const fn is_keep(&self) -> bool {
        matches!(self, Self::Keep)
    }
}

/// Lowest encodable setpoint, degrees Celsius.
pub const SETPOINT_MIN_CELSIUS: f32 = 10.0;
/// Highest encodable setpoint, degrees Celsius.
pub const SETPOINT_MAX_CELSIUS: f32 = 35.0;

/// Significant bits of the 16-bit current-temperature field. Observed
/// firmware disagrees on whether the high byte carries flags; only the low
/// 11 bits are trusted until a real device says otherwise.
pub const CURRENT_TEMP_MASK: u16 = 0x07FF;

/// Encodes a setpoint in degrees Celsius to the raw wire byte.
pub fn setpoint_to_raw(celsius: f32) -> Result<u8, EncodeError> {
    if !celsius.is_finite() || !(SETPOINT_MIN_CELSIUS..=SETPOINT_MAX_CELSIUS).contains(&celsius) {
        return Err(EncodeError::ValueOutOfRange);
    }
    // Round to the protocol's 0.1 degree resolution before the offset.
    let tenths = (celsius * 10.0 + 0.5) as u16;
    Ok((tenths - 100) as u8)
}

/// Decodes a raw setpoint byte to degrees Celsius.
pub fn setpoint_from_raw(raw: u8) -> f32 {
    f32::from(u16::from(raw) + 100) / 10.0
}

/// Decodes the 16-bit current-temperature field to degrees Celsius,
/// masking to [`CURRENT_TEMP_MASK`] before the offset so stray high bits
/// cannot sign-extend into nonsense readings.
pub fn current_temp_from_raw(raw: u16) -> f32 {
    let masked = i32::from(raw & CURRENT_TEMP_MASK);
    (masked - 500) as f32 / 10.0
}

/// Encodes a current temperature back to the raw field. Used by tests and
/// simulated controllers.
pub fn current_temp_to_raw(celsius: f32) -> u16 {
    ((celsius * 10.0 + 0.5) as i32 + 500) as u16 & CURRENT_TEMP_MASK
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn setpoint_round_trips_across_valid_range() {
        let mut tenths = 100; // 10.0
        while tenths <= 350 {
            let celsius = tenths as f32 / 10.0;
            let raw = setpoint_to_raw(celsius).unwrap();
            assert!(
                (setpoint_from_raw(raw) - celsius).abs() < 0.05,
                "{celsius} failed round trip"
            );
            tenths += 1;
        }
    }

    #[test]
    fn setpoint_rejects_out_of_range() {
        assert_eq!(setpoint_to_raw(9.9), Err(EncodeError::ValueOutOfRange));
        assert_eq!(setpoint_to_raw(35.1), Err(EncodeError::ValueOutOfRange));
        assert_eq!(setpoint_to_raw(f32::NAN), Err(EncodeError::ValueOutOfRange));
    }

    #[test]
    fn current_temp_decode_examples() {
        // 735 raw -> 23.5 C
        assert_eq!(current_temp_from_raw(735), 23.5);
        // High bits beyond the mask are ignored, not sign-extended.
        assert_eq!(current_temp_from_raw(0xF800 | 735), 23.5);
        assert_eq!(current_temp_to_raw(23.5), 735);
    }

    #[test]
    fn unknown_codes_survive_conversion() {
        assert_eq!(AcMode::from_u8(7), AcMode::Unknown(7));
        assert_eq!(AcMode::from_u8(7).to_u8(), 7);
        assert_eq!(FanSpeed::from_u8(9), FanSpeed::Unknown(9));
        assert_eq!(ZonePower::from_u8(2), ZonePower::Unknown(2));
    }
}
