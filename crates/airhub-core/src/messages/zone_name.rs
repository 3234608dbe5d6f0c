//! Zone name reports (extended subtype 0x13).
//!
//! Variable-length records, `[zone][name length][name bytes]`, packed until
//! the payload is exhausted. Names arrive asynchronously from status and
//! are merged into the zone model, not replaced.

use crate::encoding::Reader;

/// One zone's display name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ZoneNameRecord<'a> {
    pub zone: u8,
    pub name: &'a str,
}

/// The records of one zone name message.
#[derive(Debug, Clone, Copy)]
pub struct ZoneNameBatch<'a> {
    records: &'a [u8],
}

impl<'a> ZoneNameBatch<'a> {
    pub(crate) fn new(records: &'a [u8]) -> Self {
        Self { records }
    }

    /// Iterates the well-formed records. A record with a non-UTF-8 name is
    /// skipped; a truncated trailing record ends iteration.
    pub fn iter(&self) -> ZoneNameIter<'a> {
        ZoneNameIter {
            r: Reader::new(self.records),
        }
    }
}

pub struct ZoneNameIter<'a> {
    r: Reader<'a>,
}

impl<'a> Iterator for ZoneNameIter<'a> {
    type Item = ZoneNameRecord<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if self.r.remaining() < 2 {
                return None;
            }
            let zone = self.r.read_u8().ok()?;
            let len = usize::from(self.r.read_u8().ok()?);
            let raw = self.r.read_exact(len).ok()?;
            match core::str::from_utf8(raw) {
                Ok(name) => return Some(ZoneNameRecord { zone, name }),
                Err(_) => continue,
            }
        }
    }
}
