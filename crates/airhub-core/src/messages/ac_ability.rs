//! AC capability reports (extended subtype 0x11).
//!
//! One ability record per unit, sent once per session in reply to the
//! ability request. The record defines the unit's identity, supported
//! modes and fan speeds, setpoint bounds, and the contiguous zone range
//! the unit owns.

use crate::encoding::Reader;
use crate::types::{AcMode, FanSpeed};
use crate::DecodeError;

/// Wire length of one ability record: unit byte, following-length byte,
/// then 24 bytes of detail.
pub const ABILITY_RECORD_LEN: usize = 26;
/// Value of the following-length byte in a well-formed record.
pub const ABILITY_DETAIL_LEN: usize = 24;
/// Fixed width of the unit name field.
pub const NAME_FIELD_LEN: usize = 16;

/// Supported-mode bitmap (byte 20 of the record).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ModeSupport(u8);

impl ModeSupport {
    pub const fn from_bits(bits: u8) -> Self {
        Self(bits)
    }

    pub const fn bits(self) -> u8 {
        self.0
    }

    /// Whether the unit supports operating in `mode`. The auto-resolved
    /// modes (auto-heat, auto-cool) follow the auto bit.
    pub const fn supports(self, mode: AcMode) -> bool {
        let bit = match mode {
            AcMode::Auto | AcMode::AutoHeat | AcMode::AutoCool => 0,
            AcMode::Heat => 1,
            AcMode::Dry => 2,
            AcMode::Fan => 3,
            AcMode::Cool => 4,
            AcMode::Unknown(_) => return false,
        };
        self.0 & (1 << bit) != 0
    }
}

/// Supported-fan-speed bitmap (byte 21 of the record).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FanSpeedSupport(u8);

impl FanSpeedSupport {
    pub const fn from_bits(bits: u8) -> Self {
        Self(bits)
    }

    pub const fn bits(self) -> u8 {
        self.0
    }

    pub const fn supports(self, speed: FanSpeed) -> bool {
        let bit = match speed {
            FanSpeed::Auto => 0,
            FanSpeed::Quiet => 1,
            FanSpeed::Low => 2,
            FanSpeed::Medium => 3,
            FanSpeed::High => 4,
            FanSpeed::Powerful => 5,
            FanSpeed::Turbo => 6,
            FanSpeed::Intelligent => 7,
            FanSpeed::Unknown(_) => return false,
        };
        self.0 & (1 << bit) != 0
    }
}

/// One unit's capability record. Static for the life of a session.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AcAbilityRecord<'a> {
    pub unit: u8,
    pub name: &'a str,
    /// First zone number owned by this unit.
    pub start_zone: u8,
    /// Number of contiguous zones owned by this unit.
    pub zone_count: u8,
    pub modes: ModeSupport,
    pub fan_speeds: FanSpeedSupport,
    /// Setpoint bounds in whole degrees Celsius.
    pub min_cool_setpoint: f32,
    pub max_cool_setpoint: f32,
    pub min_heat_setpoint: f32,
    pub max_heat_setpoint: f32,
}

impl<'a> AcAbilityRecord<'a> {
    fn decode(r: &mut Reader<'a>) -> Result<Self, DecodeError> {
        let unit = r.read_u8()?;
        let following = usize::from(r.read_u8()?);
        if following < ABILITY_DETAIL_LEN {
            return Err(DecodeError::InvalidLength);
        }
        let detail = r.read_exact(following)?;
        let mut d = Reader::new(detail);
        let name = d.read_name(NAME_FIELD_LEN)?;
        let start_zone = d.read_u8()?;
        let zone_count = d.read_u8()?;
        let modes = ModeSupport::from_bits(d.read_u8()?);
        let fan_speeds = FanSpeedSupport::from_bits(d.read_u8()?);
        let min_cool_setpoint = f32::from(d.read_u8()?);
        let max_cool_setpoint = f32::from(d.read_u8()?);
        let min_heat_setpoint = f32::from(d.read_u8()?);
        let max_heat_setpoint = f32::from(d.read_u8()?);
        Ok(Self {
            unit,
            name,
            start_zone,
            zone_count,
            modes,
            fan_speeds,
            min_cool_setpoint,
            max_cool_setpoint,
            min_heat_setpoint,
            max_heat_setpoint,
        })
    }

    /// Whether `zone` falls inside this unit's owned range.
    pub fn owns_zone(&self, zone: u8) -> bool {
        zone >= self.start_zone && u16::from(zone) < u16::from(self.start_zone) + u16::from(self.zone_count)
    }
}

/// The records of one ability message. Iteration is fallible per record:
/// a malformed record ends the batch with an error, leaving earlier
/// records usable.
#[derive(Debug, Clone, Copy)]
pub struct AcAbilityBatch<'a> {
    records: &'a [u8],
}

impl<'a> AcAbilityBatch<'a> {
    pub(crate) fn new(records: &'a [u8]) -> Self {
        Self { records }
    }

    pub fn iter(&self) -> AcAbilityIter<'a> {
        AcAbilityIter {
            r: Reader::new(self.records),
            failed: false,
        }
    }
}

pub struct AcAbilityIter<'a> {
    r: Reader<'a>,
    failed: bool,
}

impl<'a> Iterator for AcAbilityIter<'a> {
    type Item = Result<AcAbilityRecord<'a>, DecodeError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed || self.r.is_empty() {
            return None;
        }
        match AcAbilityRecord::decode(&mut self.r) {
            Ok(record) => Some(Ok(record)),
            Err(e) => {
                self.failed = true;
                Some(Err(e))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec::Vec;

    fn record(unit: u8, name: &str, start_zone: u8, zone_count: u8) -> Vec<u8> {
        let mut out = Vec::new();
        out.push(unit);
        out.push(ABILITY_DETAIL_LEN as u8);
        let mut field = [0u8; NAME_FIELD_LEN];
        field[..name.len()].copy_from_slice(name.as_bytes());
        out.extend_from_slice(&field);
        out.push(start_zone);
        out.push(zone_count);
        out.push(0b0001_0011); // cool, heat, auto
        out.push(0b0001_0101); // high, low, auto
        out.extend_from_slice(&[16, 30, 17, 31]);
        out
    }

    #[test]
    fn decodes_single_record() {
        let data = record(0, "Living", 0, 2);
        let batch = AcAbilityBatch::new(&data);
        let records: Vec<_> = batch.iter().collect::<Result<_, _>>().unwrap();
        assert_eq!(records.len(), 1);
        let ability = records[0];
        assert_eq!(ability.unit, 0);
        assert_eq!(ability.name, "Living");
        assert_eq!(ability.start_zone, 0);
        assert_eq!(ability.zone_count, 2);
        assert!(ability.modes.supports(AcMode::Cool));
        assert!(ability.modes.supports(AcMode::Heat));
        assert!(ability.modes.supports(AcMode::Auto));
        assert!(ability.modes.supports(AcMode::AutoCool));
        assert!(!ability.modes.supports(AcMode::Dry));
        assert!(ability.fan_speeds.supports(FanSpeed::Auto));
        assert!(ability.fan_speeds.supports(FanSpeed::Low));
        assert!(ability.fan_speeds.supports(FanSpeed::High));
        assert!(!ability.fan_speeds.supports(FanSpeed::Turbo));
        assert_eq!(ability.min_cool_setpoint, 16.0);
        assert_eq!(ability.max_cool_setpoint, 30.0);
        assert_eq!(ability.min_heat_setpoint, 17.0);
        assert_eq!(ability.max_heat_setpoint, 31.0);
    }

    #[test]
    fn decodes_multiple_records() {
        let mut data = record(0, "Upstairs", 0, 4);
        data.extend_from_slice(&record(1, "Downstairs", 4, 3));
        let batch = AcAbilityBatch::new(&data);
        let records: Vec<_> = batch.iter().collect::<Result<_, _>>().unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[1].name, "Downstairs");
        assert_eq!(records[1].start_zone, 4);
    }

    #[test]
    fn zone_ownership_range() {
        let data = record(1, "Downstairs", 4, 3);
        let batch = AcAbilityBatch::new(&data);
        let ability = batch.iter().next().unwrap().unwrap();
        assert!(!ability.owns_zone(3));
        assert!(ability.owns_zone(4));
        assert!(ability.owns_zone(5));
        assert!(ability.owns_zone(6));
        assert!(!ability.owns_zone(7));
    }

    #[test]
    fn truncated_record_yields_error_after_valid_ones() {
        let mut data = record(0, "Living", 0, 2);
        data.extend_from_slice(&[1, 24, 0xAA]); // claims 24 bytes, has 1
        let batch = AcAbilityBatch::new(&data);
        let mut iter = batch.iter();
        assert!(iter.next().unwrap().is_ok());
        assert_eq!(iter.next().unwrap().unwrap_err(), DecodeError::UnexpectedEof);
        assert!(iter.next().is_none());
    }

    #[test]
    fn longer_detail_from_newer_firmware_is_skipped() {
        let mut data = record(0, "Living", 0, 2);
        data[1] = ABILITY_DETAIL_LEN as u8 + 2;
        data.extend_from_slice(&[0xDE, 0xAD]);
        data.extend_from_slice(&record(1, "Spare", 2, 1));
        let batch = AcAbilityBatch::new(&data);
        let records: Vec<_> = batch.iter().collect::<Result<_, _>>().unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[1].unit, 1);
    }
}
