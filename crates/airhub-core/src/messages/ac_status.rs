//! AC unit status reports (standard subtype 0x23).

use super::{decode_repeats, RepeatData};
use crate::encoding::Reader;
use crate::types::{current_temp_from_raw, setpoint_from_raw, AcMode, AcPower, FanSpeed};
use crate::DecodeError;

/// Wire length of the decoded portion of one AC record.
pub const AC_RECORD_LEN: usize = 8;

/// One unit's reported state. Replaced wholesale on every status message.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AcStatus {
    pub unit: u8,
    pub power: AcPower,
    pub mode: AcMode,
    pub fan_speed: FanSpeed,
    /// Target setpoint, degrees Celsius.
    pub setpoint: f32,
    /// Current temperature at the unit, degrees Celsius.
    pub current_temp: f32,
    pub turbo: bool,
    pub bypass: bool,
    pub spill: bool,
    pub timer_set: bool,
    /// Controller-reported error code; 0 means healthy.
    pub error_code: u16,
}

impl AcStatus {
    /// Decodes one record. `record` must be at least [`AC_RECORD_LEN`]
    /// bytes; extra bytes from newer firmware are ignored.
    pub fn from_record(record: &[u8]) -> Self {
        Self {
            unit: record[0] & 0x0F,
            power: AcPower::from_u8(record[0] >> 4),
            mode: AcMode::from_u8(record[1] >> 4),
            fan_speed: FanSpeed::from_u8(record[1] & 0x0F),
            setpoint: setpoint_from_raw(record[2]),
            turbo: record[3] & 0x08 != 0,
            bypass: record[3] & 0x04 != 0,
            spill: record[3] & 0x02 != 0,
            timer_set: record[3] & 0x01 != 0,
            current_temp: current_temp_from_raw(u16::from_be_bytes([record[4], record[5]])),
            error_code: u16::from_be_bytes([record[6], record[7]]),
        }
    }

    pub const fn has_error(&self) -> bool {
        self.error_code != 0
    }
}

/// The repeat records of one AC status message.
#[derive(Debug, Clone, Copy)]
pub struct AcStatusBatch<'a> {
    repeats: RepeatData<'a>,
}

impl<'a> AcStatusBatch<'a> {
    pub(crate) fn decode(r: &mut Reader<'a>) -> Result<Self, DecodeError> {
        Ok(Self {
            repeats: decode_repeats(r, AC_RECORD_LEN)?,
        })
    }

    pub fn len(&self) -> usize {
        self.repeats.records.len() / self.repeats.each_len
    }

    pub fn is_empty(&self) -> bool {
        self.repeats.records.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = AcStatus> + 'a {
        self.repeats
            .records
            .chunks_exact(self.repeats.each_len)
            .map(AcStatus::from_record)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Unit 0, on, auto mode, fan auto, setpoint 22.0, current 23.5,
    // no flags, no error.
    const RECORD: [u8; 8] = [0x10, 0x00, 0x78, 0x00, 0x02, 0xDF, 0x00, 0x00];

    #[test]
    fn decodes_record_fields() {
        let status = AcStatus::from_record(&RECORD);
        assert_eq!(status.unit, 0);
        assert_eq!(status.power, AcPower::On);
        assert_eq!(status.mode, AcMode::Auto);
        assert_eq!(status.fan_speed, FanSpeed::Auto);
        assert_eq!(status.setpoint, 22.0);
        assert_eq!(status.current_temp, 23.5);
        assert!(!status.turbo && !status.bypass && !status.spill && !status.timer_set);
        assert!(!status.has_error());
    }

    #[test]
    fn decodes_flags_and_error() {
        let record = [0x51, 0x45, 0x96, 0x0F, 0x02, 0x1C, 0x00, 0x07];
        let status = AcStatus::from_record(&record);
        assert_eq!(status.unit, 1);
        assert_eq!(status.power, AcPower::Sleep);
        assert_eq!(status.mode, AcMode::Cool);
        assert_eq!(status.fan_speed, FanSpeed::Powerful);
        assert_eq!(status.setpoint, 25.0);
        assert!(status.turbo && status.bypass && status.spill && status.timer_set);
        assert_eq!(status.current_temp, 4.0);
        assert_eq!(status.error_code, 7);
        assert!(status.has_error());
    }

    #[test]
    fn current_temp_high_bits_masked() {
        let record = [0x10, 0x00, 0x78, 0x00, 0xFA, 0xDF, 0x00, 0x00];
        let status = AcStatus::from_record(&record);
        // 0xFADF masked to 0x02DF.
        assert_eq!(status.current_temp, 23.5);
    }

    #[test]
    fn unknown_mode_survives_decode() {
        let record = [0x10, 0x77, 0x78, 0x00, 0x02, 0xDF, 0x00, 0x00];
        let status = AcStatus::from_record(&record);
        assert_eq!(status.mode, AcMode::Unknown(7));
        assert_eq!(status.fan_speed, FanSpeed::Unknown(7));
    }

    #[test]
    fn batch_decode() {
        let mut data = alloc::vec::Vec::new();
        data.extend_from_slice(&[0x00, 0x08, 0x00, 0x01]);
        data.extend_from_slice(&RECORD);
        let mut r = Reader::new(&data);
        let batch = AcStatusBatch::decode(&mut r).unwrap();
        assert_eq!(batch.len(), 1);
        assert_eq!(batch.iter().next().unwrap().unit, 0);
    }
}
