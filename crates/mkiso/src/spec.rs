//! ECMA-119 constants and low-level field types shared by the encoders.

use chrono::{DateTime, Datelike, Timelike, Utc};

/// Size of a logical block. Hardcoded by the standard.
pub const SECTOR_SIZE: u32 = 2048;

/// Number of zeroed sectors reserved at the start of the image.
pub const SYSTEM_AREA_SECTORS: u32 = 16;

/// Standard identifier carried by every volume descriptor.
pub const STANDARD_IDENTIFIER: &[u8; 5] = b"CD001";

/// Volume descriptor version (ECMA-119 8.4.3).
pub const DESCRIPTOR_VERSION: u8 = 1;

/// Size of a directory record excluding the identifier and its padding
/// (ECMA-119 9.1).
pub const DR_FIXED_LEN: usize = 33;

/// Size of a path table record excluding the identifier and its padding
/// (ECMA-119 9.4).
pub const PT_RECORD_FIXED_LEN: usize = 8;

/// Maximum length of a Joliet identifier in UCS-2 code units.
pub const JOLIET_MAX_NAME_UNITS: usize = 64;

/// Largest file the 32-bit data-length field can describe.
pub const MAX_FILE_EXTENT_BYTES: u64 = u32::MAX as u64;

/// Which of the two parallel directory hierarchies a name, record, or
/// extent belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Namespace {
  /// ECMA-119 Level 1 (ASCII 8.3 identifiers).
  Primary,
  /// Joliet supplementary view (UCS-2BE identifiers).
  Joliet,
}

/// Integer byte order of a path table variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endian {
  /// L-type table.
  Little,
  /// M-type table.
  Big,
}

#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VolumeDescriptorType {
  Primary = 1,
  Supplementary = 2,
  Terminator = 255,
}

bitflags::bitflags! {
  /// Directory record file flags (ECMA-119 9.1.6). Only the bits this
  /// builder emits are modelled; associated-file, record, protection and
  /// multi-extent stay zero.
  #[derive(Debug, Clone, Copy, PartialEq, Eq)]
  pub struct FileFlags: u8 {
    /// "Existence" bit: the entry is hidden from directory listings.
    const HIDDEN = 1 << 0;
    const DIRECTORY = 1 << 1;
  }
}

/// 7-byte recording date and time of a directory record (ECMA-119 9.1.5).
#[derive(Debug, Clone, Copy)]
pub struct RecordingTime {
  pub years_since_1900: u8,
  pub month: u8,
  pub day: u8,
  pub hour: u8,
  pub minute: u8,
  pub second: u8,
  /// GMT offset in 15-minute units; 0 means unspecified.
  pub gmt_offset: i8,
}

impl RecordingTime {
  pub fn to_bytes(self) -> [u8; 7] {
    [
      self.years_since_1900,
      self.month,
      self.day,
      self.hour,
      self.minute,
      self.second,
      self.gmt_offset as u8,
    ]
  }
}

impl From<DateTime<Utc>> for RecordingTime {
  fn from(dt: DateTime<Utc>) -> Self {
    // The single-byte year only reaches 1900..=2155.
    let year = dt.year().clamp(1900, 2155);
    Self {
      years_since_1900: (year - 1900) as u8,
      month: dt.month() as u8,
      day: dt.day() as u8,
      hour: dt.hour() as u8,
      minute: dt.minute() as u8,
      second: dt.second() as u8,
      gmt_offset: 0,
    }
  }
}

/// 17-byte digit timestamp used in volume descriptors (ECMA-119 8.4.26.1).
/// The unspecified value is sixteen ASCII `'0'` digits and a zero offset.
#[derive(Debug, Clone, Copy)]
pub struct VolumeTimestamp(Option<DateTime<Utc>>);

impl VolumeTimestamp {
  pub fn unspecified() -> Self {
    Self(None)
  }

  pub fn to_bytes(&self) -> [u8; 17] {
    let mut buf = [0u8; 17];
    match self.0 {
      None => buf[..16].fill(b'0'),
      Some(dt) => {
        let digits = format!(
          "{:04}{:02}{:02}{:02}{:02}{:02}00",
          dt.year(),
          dt.month(),
          dt.day(),
          dt.hour(),
          dt.minute(),
          dt.second()
        );
        buf[..16].copy_from_slice(&digits.as_bytes()[..16]);
      }
    }
    // buf[16] stays 0: GMT offset unspecified.
    buf
  }
}

impl From<DateTime<Utc>> for VolumeTimestamp {
  fn from(dt: DateTime<Utc>) -> Self {
    Self(Some(dt))
  }
}

/// Writes a 32-bit value in both-endian form: little-endian then big-endian.
pub fn put_both_u32(buf: &mut [u8], value: u32) {
  buf[..4].copy_from_slice(&value.to_le_bytes());
  buf[4..8].copy_from_slice(&value.to_be_bytes());
}

/// Writes a 16-bit value in both-endian form.
pub fn put_both_u16(buf: &mut [u8], value: u16) {
  buf[..2].copy_from_slice(&value.to_le_bytes());
  buf[2..4].copy_from_slice(&value.to_be_bytes());
}

/// Sectors needed to hold `bytes` of metadata. Zero bytes need no sectors.
pub fn sectors_for_bytes(bytes: u64) -> u32 {
  bytes.div_ceil(SECTOR_SIZE as u64) as u32
}

/// Sectors allocated to a file extent. An empty file still owns one sector;
/// its directory record carries a data length of zero.
pub fn sectors_for_file(bytes: u64) -> u32 {
  sectors_for_bytes(bytes).max(1)
}

#[cfg(test)]
mod tests {
  use super::*;
  use chrono::TimeZone;

  #[test]
  fn both_endian_halves_agree() {
    let mut buf = [0u8; 8];
    put_both_u32(&mut buf, 0x1234_5678);
    assert_eq!(u32::from_le_bytes(buf[..4].try_into().unwrap()), 0x1234_5678);
    assert_eq!(u32::from_be_bytes(buf[4..].try_into().unwrap()), 0x1234_5678);

    let mut buf = [0u8; 4];
    put_both_u16(&mut buf, 0xBEEF);
    assert_eq!(u16::from_le_bytes(buf[..2].try_into().unwrap()), 0xBEEF);
    assert_eq!(u16::from_be_bytes(buf[2..].try_into().unwrap()), 0xBEEF);
  }

  #[test]
  fn sector_counts() {
    assert_eq!(sectors_for_bytes(0), 0);
    assert_eq!(sectors_for_bytes(1), 1);
    assert_eq!(sectors_for_bytes(2048), 1);
    assert_eq!(sectors_for_bytes(2049), 2);
    assert_eq!(sectors_for_file(0), 1);
    assert_eq!(sectors_for_file(5000), 3);
  }

  #[test]
  fn volume_timestamp_digits() {
    let dt = Utc.with_ymd_and_hms(2024, 3, 9, 14, 5, 59).unwrap();
    let bytes = VolumeTimestamp::from(dt).to_bytes();
    assert_eq!(&bytes[..16], b"2024030914055900");
    assert_eq!(bytes[16], 0);

    let unspec = VolumeTimestamp::unspecified().to_bytes();
    assert_eq!(&unspec[..16], b"0000000000000000");
    assert_eq!(unspec[16], 0);
  }

  #[test]
  fn recording_time_from_datetime() {
    let dt = Utc.with_ymd_and_hms(1999, 12, 31, 23, 59, 58).unwrap();
    let rt = RecordingTime::from(dt);
    assert_eq!(rt.to_bytes(), [99, 12, 31, 23, 59, 58, 0]);
  }
}
