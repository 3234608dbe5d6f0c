//! Modbus-variant CRC16 used as the frame trailer.
//!
//! Polynomial 0xA001 (reflected 0x8005), initial value 0xFFFF, LSB-first,
//! no final XOR. The controller silently discards any frame whose trailer
//! does not match this computation exactly.

const POLY: u16 = 0xA001;
const INIT: u16 = 0xFFFF;

/// Computes the CRC16 of `data`.
pub fn crc16(data: &[u8]) -> u16 {
    let mut crc = INIT;
    for &byte in data {
        crc ^= u16::from(byte);
        for _ in 0..8 {
            if crc & 1 != 0 {
                crc = (crc >> 1) ^ POLY;
            } else {
                crc >>= 1;
            }
        }
    }
    crc
}
