//! Zone status reports (standard subtype 0x21).

use super::{decode_repeats, RepeatData};
use crate::encoding::Reader;
use crate::types::{
    current_temp_from_raw, setpoint_from_raw, ZoneControlMethod, ZonePower,
};
use crate::DecodeError;

/// Wire length of the decoded portion of one zone record.
pub const ZONE_RECORD_LEN: usize = 8;

/// One zone's reported state. Replaced wholesale on every status message.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ZoneStatus {
    pub zone: u8,
    pub power: ZonePower,
    pub control_method: ZoneControlMethod,
    /// Damper open percentage, 0-100.
    pub damper_percent: u8,
    /// Target setpoint, degrees Celsius.
    pub setpoint: f32,
    /// Whether the zone has its own temperature sensor. Without one,
    /// `current_temp` is meaningless and callers fall back to the owning
    /// unit's reading.
    pub has_sensor: bool,
    /// Current temperature, degrees Celsius.
    pub current_temp: f32,
    pub spill: bool,
    pub battery_low: bool,
}

impl ZoneStatus {
    /// Decodes one record. `record` must be at least [`ZONE_RECORD_LEN`]
    /// bytes; extra bytes from newer firmware are ignored.
    pub fn from_record(record: &[u8]) -> Self {
        Self {
            zone: record[0] & 0x3F,
            power: ZonePower::from_u8(record[0] >> 6),
            control_method: ZoneControlMethod::from_bit(record[1] >> 7),
            damper_percent: record[1] & 0x7F,
            setpoint: setpoint_from_raw(record[2]),
            has_sensor: record[3] & 0x80 != 0,
            current_temp: current_temp_from_raw(u16::from_be_bytes([record[4], record[5]])),
            spill: record[6] & 0x02 != 0,
            battery_low: record[6] & 0x01 != 0,
        }
    }
}

/// The repeat records of one zone status message.
#[derive(Debug, Clone, Copy)]
pub struct ZoneStatusBatch<'a> {
    repeats: RepeatData<'a>,
}

impl<'a> ZoneStatusBatch<'a> {
    pub(crate) fn decode(r: &mut Reader<'a>) -> Result<Self, DecodeError> {
        Ok(Self {
            repeats: decode_repeats(r, ZONE_RECORD_LEN)?,
        })
    }

    pub fn len(&self) -> usize {
        self.repeats.records.len() / self.repeats.each_len
    }

    pub fn is_empty(&self) -> bool {
        self.repeats.records.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = ZoneStatus> + 'a {
        self.repeats
            .records
            .chunks_exact(self.repeats.each_len)
            .map(ZoneStatus::from_record)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ZonePower;

    // Zone 3, on, percentage control, damper 50%, setpoint 24.0, sensor
    // present, current 21.5, no spill, battery ok.
    const RECORD: [u8; 8] = [0x43, 0x32, 0x8C, 0x80, 0x02, 0xD7, 0x00, 0x00];

    #[test]
    fn decodes_record_fields() {
        let status = ZoneStatus::from_record(&RECORD);
        assert_eq!(status.zone, 3);
        assert_eq!(status.power, ZonePower::On);
        assert_eq!(status.control_method, ZoneControlMethod::DamperPercent);
        assert_eq!(status.damper_percent, 50);
        assert_eq!(status.setpoint, 24.0);
        assert!(status.has_sensor);
        assert_eq!(status.current_temp, 22.7);
        assert!(!status.spill);
        assert!(!status.battery_low);
    }

    #[test]
    fn flag_bits() {
        let mut record = RECORD;
        record[6] = 0x03;
        let status = ZoneStatus::from_record(&record);
        assert!(status.spill);
        assert!(status.battery_low);
    }

    #[test]
    fn setpoint_control_bit() {
        let mut record = RECORD;
        record[1] = 0x80 | 0x32;
        let status = ZoneStatus::from_record(&record);
        assert_eq!(status.control_method, ZoneControlMethod::Setpoint);
    }

    #[test]
    fn batch_iterates_all_records() {
        let mut data = alloc::vec::Vec::new();
        data.extend_from_slice(&[0x00, 0x08, 0x00, 0x02]); // each=8, count=2
        data.extend_from_slice(&RECORD);
        let mut second = RECORD;
        second[0] = 0x04; // zone 4, off
        data.extend_from_slice(&second);

        let mut r = Reader::new(&data);
        let batch = ZoneStatusBatch::decode(&mut r).unwrap();
        assert_eq!(batch.len(), 2);
        let zones: alloc::vec::Vec<u8> = batch.iter().map(|z| z.zone).collect();
        assert_eq!(zones, [3, 4]);
        assert_eq!(batch.iter().nth(1).unwrap().power, ZonePower::Off);
    }

    #[test]
    fn empty_data_is_an_empty_batch() {
        let mut r = Reader::new(&[]);
        let batch = ZoneStatusBatch::decode(&mut r).unwrap();
        assert!(batch.is_empty());
    }

    #[test]
    fn oversized_records_are_tolerated() {
        let mut data = alloc::vec::Vec::new();
        data.extend_from_slice(&[0x00, 0x0A, 0x00, 0x01]); // each=10
        data.extend_from_slice(&RECORD);
        data.extend_from_slice(&[0xAA, 0xBB]); // trailing firmware extras
        let mut r = Reader::new(&data);
        let batch = ZoneStatusBatch::decode(&mut r).unwrap();
        assert_eq!(batch.len(), 1);
        assert_eq!(batch.iter().next().unwrap().zone, 3);
    }

    #[test]
    fn undersized_record_length_rejected() {
        let data = [0x00, 0x04, 0x00, 0x01, 0x43, 0x32, 0x8C, 0x80];
        let mut r = Reader::new(&data);
        assert_eq!(
            ZoneStatusBatch::decode(&mut r).unwrap_err(),
            DecodeError::InvalidLength
        );
    }
}
