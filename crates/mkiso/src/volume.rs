//! Volume descriptor encoding: PVD, Joliet SVD, and the set terminator
//! (ECMA-119 sections 8.4, 8.5, 8.6). Each descriptor is exactly one sector.

use chrono::Utc;

use crate::builder::Options;
use crate::entry::Entry;
use crate::layout::Layout;
use crate::names::encode_ucs2_be;
use crate::record;
use crate::spec::{
  Namespace, VolumeDescriptorType, VolumeTimestamp, DESCRIPTOR_VERSION, SECTOR_SIZE,
  STANDARD_IDENTIFIER,
};

/// Space-padded a-character / d-character text field.
fn pad_text(s: &str, len: usize) -> Vec<u8> {
  let mut field = vec![b' '; len];
  let bytes = s.as_bytes();
  let take = bytes.len().min(len);
  field[..take].copy_from_slice(&bytes[..take]);
  field
}

/// UCS-2BE text field of `units` code units, zero-padded.
fn pad_ucs2(s: &str, units: usize) -> Vec<u8> {
  let mut field = vec![0u8; units * 2];
  let encoded = encode_ucs2_be(s);
  let take = encoded.len().min(field.len());
  field[..take].copy_from_slice(&encoded[..take]);
  field
}

/// UCS-2BE field capped at `max_units` code units inside a fixed span of
/// `total_bytes` (the odd-sized 37-byte file identifier fields).
fn pad_ucs2_field(s: &str, max_units: usize, total_bytes: usize) -> Vec<u8> {
  assert!(max_units * 2 <= total_bytes);
  let mut field = vec![0u8; total_bytes];
  let mut encoded = encode_ucs2_be(s);
  encoded.truncate(max_units * 2);
  field[..encoded.len()].copy_from_slice(&encoded);
  field
}

fn header(sector: &mut [u8], kind: VolumeDescriptorType) {
  sector[0] = kind as u8;
  sector[1..6].copy_from_slice(STANDARD_IDENTIFIER);
  sector[6] = DESCRIPTOR_VERSION;
}

fn put(sector: &mut [u8], offset: usize, bytes: &[u8]) {
  sector[offset..offset + bytes.len()].copy_from_slice(bytes);
}

fn put_both_u32(sector: &mut [u8], offset: usize, value: u32) {
  crate::spec::put_both_u32(&mut sector[offset..offset + 8], value);
}

fn put_both_u16(sector: &mut [u8], offset: usize, value: u16) {
  crate::spec::put_both_u16(&mut sector[offset..offset + 4], value);
}

/// The fields shared by the PVD and SVD, written at their common offsets.
/// Text fields differ in encoding between the two, so they are passed in
/// already rendered.
#[allow(clippy::too_many_arguments)]
fn descriptor_body(
  sector: &mut [u8],
  entries: &[Entry],
  layout: &Layout,
  ns: Namespace,
  system_id: Vec<u8>,
  volume_id: Vec<u8>,
  volume_set_id: Vec<u8>,
  publisher: Vec<u8>,
  data_preparer: Vec<u8>,
  application: Vec<u8>,
  file_ids: [Vec<u8>; 3],
) {
  let tables = match ns {
    Namespace::Primary => &layout.primary_tables,
    Namespace::Joliet => &layout.joliet_tables,
  };
  let root = &entries[0];
  let root_extent = match ns {
    Namespace::Primary => layout.root_primary_extent,
    Namespace::Joliet => layout.root_joliet_extent,
  };

  put(sector, 8, &system_id);
  put(sector, 40, &volume_id);
  // 72..80 unused.
  put_both_u32(sector, 80, layout.total_sectors);
  // 88..120: unused in the PVD, escape sequences in the SVD.
  put_both_u16(sector, 120, 1); // volume set size
  put_both_u16(sector, 124, 1); // volume sequence number
  put_both_u16(sector, 128, SECTOR_SIZE as u16);
  put_both_u32(sector, 132, tables.byte_len());
  put(sector, 140, &tables.l_lba.to_le_bytes());
  put(sector, 144, &tables.l_copy_lba.to_le_bytes());
  put(sector, 148, &tables.m_lba.to_be_bytes());
  put(sector, 152, &tables.m_copy_lba.to_be_bytes());

  let root_record = record::entry_record(root, root.name_in(ns), ns, root.lba_in(ns), root_extent);
  // The PVD/SVD root record field is fixed at 34 bytes by the standard.
  assert_eq!(
    root_record.len(),
    34,
    "root directory record must fill the 34-byte descriptor field"
  );
  put(sector, 156, &root_record);

  put(sector, 190, &volume_set_id);
  put(sector, 318, &publisher);
  put(sector, 446, &data_preparer);
  put(sector, 574, &application);
  let [copyright, abstract_id, bibliographic] = file_ids;
  put(sector, 702, &copyright);
  put(sector, 739, &abstract_id);
  put(sector, 776, &bibliographic);

  let now = VolumeTimestamp::from(Utc::now());
  put(sector, 813, &now.to_bytes()); // creation
  put(sector, 830, &now.to_bytes()); // modification
  put(sector, 847, &VolumeTimestamp::unspecified().to_bytes()); // expiration
  put(sector, 864, &now.to_bytes()); // effective
  sector[881] = 1; // file structure version
}

/// Primary volume descriptor, one sector.
pub(crate) fn primary(entries: &[Entry], layout: &Layout, options: &Options) -> Vec<u8> {
  let mut sector = vec![0u8; SECTOR_SIZE as usize];
  header(&mut sector, VolumeDescriptorType::Primary);
  // Byte 7 is unused in the PVD and stays zero.
  descriptor_body(
    &mut sector,
    entries,
    layout,
    Namespace::Primary,
    pad_text(&options.system_id, 32),
    pad_text(&options.volume_id_primary, 32),
    pad_text("", 128),
    pad_text(&options.publisher_primary, 128),
    pad_text(&options.data_preparer_primary, 128),
    pad_text(&options.application_primary, 128),
    [pad_text("", 37), pad_text("", 37), pad_text("", 37)],
  );
  sector
}

/// Joliet supplementary volume descriptor, one sector. Differs from the
/// PVD in the volume-flags byte, the UCS-2 text fields, and the escape
/// sequence announcing the Joliet level.
pub(crate) fn supplementary(entries: &[Entry], layout: &Layout, options: &Options) -> Vec<u8> {
  let mut sector = vec![0u8; SECTOR_SIZE as usize];
  header(&mut sector, VolumeDescriptorType::Supplementary);
  sector[7] = 0; // volume flags: only registered escape sequences
  descriptor_body(
    &mut sector,
    entries,
    layout,
    Namespace::Joliet,
    pad_text(&options.system_id, 32),
    pad_ucs2(&options.volume_id_joliet, 16),
    pad_ucs2("", 64),
    pad_ucs2(&options.publisher_joliet, 64),
    pad_ucs2(&options.data_preparer_joliet, 64),
    pad_ucs2(&options.application_joliet, 64),
    [
      pad_ucs2_field("", 18, 37),
      pad_ucs2_field("", 18, 37),
      pad_ucs2_field("", 18, 37),
    ],
  );
  // Escape sequences field: the Joliet level marker, rest zero.
  put(&mut sector, 88, &options.joliet_escape);
  sector
}

/// Volume descriptor set terminator: the common header, rest zero.
pub(crate) fn terminator() -> Vec<u8> {
  let mut sector = vec![0u8; SECTOR_SIZE as usize];
  header(&mut sector, VolumeDescriptorType::Terminator);
  sector
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::entry::ROOT_SENTINEL;
  use crate::layout;

  fn planned_root() -> (Vec<Entry>, Layout) {
    let mut entries = vec![Entry {
      original_name: ROOT_SENTINEL.to_string(),
      iso_path: "/".into(),
      is_dir: true,
      path_table_number: 1,
      ..Entry::default()
    }];
    let layout = layout::plan(&mut entries);
    (entries, layout)
  }

  #[test]
  fn primary_descriptor_fields() {
    let (entries, layout) = planned_root();
    let options = Options {
      volume_id_primary: "DATA".into(),
      system_id: "LINUX".into(),
      ..Options::default()
    };
    let pvd = primary(&entries, &layout, &options);

    assert_eq!(pvd.len(), 2048);
    assert_eq!(pvd[0], 1);
    assert_eq!(&pvd[1..6], b"CD001");
    assert_eq!(pvd[6], 1);
    assert_eq!(pvd[7], 0);
    assert_eq!(&pvd[8..13], b"LINUX");
    assert_eq!(&pvd[40..44], b"DATA");
    assert_eq!(pvd[44], b' '); // space padding

    assert_eq!(u32::from_le_bytes(pvd[80..84].try_into().unwrap()), 30);
    assert_eq!(u32::from_be_bytes(pvd[84..88].try_into().unwrap()), 30);
    assert_eq!(u16::from_le_bytes(pvd[128..130].try_into().unwrap()), 2048);
    assert_eq!(u32::from_le_bytes(pvd[132..136].try_into().unwrap()), 10);
    assert_eq!(u32::from_le_bytes(pvd[140..144].try_into().unwrap()), 19);
    assert_eq!(u32::from_le_bytes(pvd[144..148].try_into().unwrap()), 23);
    assert_eq!(u32::from_be_bytes(pvd[148..152].try_into().unwrap()), 20);
    assert_eq!(u32::from_be_bytes(pvd[152..156].try_into().unwrap()), 24);

    // Embedded root record: 34 bytes, identifier 0x00, extent at LBA 27.
    assert_eq!(pvd[156], 34);
    assert_eq!(u32::from_le_bytes(pvd[158..162].try_into().unwrap()), 27);
    assert_eq!(pvd[156 + 32], 1);
    assert_eq!(pvd[156 + 33], 0x00);

    assert_eq!(pvd[881], 1);
    // Expiration timestamp is the unspecified value.
    assert_eq!(&pvd[847..863], b"0000000000000000");
  }

  #[test]
  fn supplementary_descriptor_fields() {
    let (entries, layout) = planned_root();
    let options = Options {
      volume_id_joliet: "DATA".into(),
      ..Options::default()
    };
    let svd = supplementary(&entries, &layout, &options);

    assert_eq!(svd[0], 2);
    assert_eq!(&svd[1..6], b"CD001");
    assert_eq!(svd[7], 0);
    // Joliet Level 3 escape sequence, rest of the field zero.
    assert_eq!(&svd[88..91], b"%/E");
    assert!(svd[91..120].iter().all(|&b| b == 0));
    // Volume identifier in UCS-2BE.
    assert_eq!(&svd[40..48], &[0, b'D', 0, b'A', 0, b'T', 0, b'A']);
    // Joliet root record points at the Joliet listing extent.
    assert_eq!(u32::from_le_bytes(svd[158..162].try_into().unwrap()), 28);
    assert_eq!(svd[881], 1);
  }

  #[test]
  fn terminator_is_header_only() {
    let term = terminator();
    assert_eq!(term[0], 255);
    assert_eq!(&term[1..6], b"CD001");
    assert_eq!(term[6], 1);
    assert!(term[7..].iter().all(|&b| b == 0));
  }
}
