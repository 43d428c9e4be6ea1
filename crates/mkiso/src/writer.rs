//! Image writer: places every planned region at its absolute sector offset.

use std::fs::File;
use std::io::{Seek, SeekFrom, Write};

use crate::builder::Options;
use crate::entry::Entry;
use crate::error::{Error, Result};
use crate::layout::Layout;
use crate::spec::{self, Namespace, SECTOR_SIZE, SYSTEM_AREA_SECTORS};
use crate::{record, volume};

/// Emits the complete image in the planned order: system area, volume
/// descriptors, the eight path table placements, primary directory
/// listings, file data, Joliet directory listings. Finally forces the file
/// to exactly `total_sectors` sectors.
///
/// Every region is addressed by an absolute seek; nothing relies on the
/// write sequence matching the sector order.
pub(crate) fn write_image(
  file: &mut File,
  entries: &[Entry],
  layout: &Layout,
  options: &Options,
) -> Result<()> {
  write_region(file, &[], 0, SYSTEM_AREA_SECTORS * SECTOR_SIZE)?;
  write_region(file, &volume::primary(entries, layout, options), 16, SECTOR_SIZE)?;
  write_region(
    file,
    &volume::supplementary(entries, layout, options),
    17,
    SECTOR_SIZE,
  )?;
  write_region(file, &volume::terminator(), 18, SECTOR_SIZE)?;

  for tables in [&layout.primary_tables, &layout.joliet_tables] {
    let allocated = tables.allocated_bytes();
    write_region(file, &tables.l_data, tables.l_lba, allocated)?;
    write_region(file, &tables.m_data, tables.m_lba, allocated)?;
    write_region(file, &tables.l_data, tables.l_copy_lba, allocated)?;
    write_region(file, &tables.m_data, tables.m_copy_lba, allocated)?;
  }

  for (index, entry) in entries.iter().enumerate() {
    if entry.is_dir {
      let listing = directory_listing(entries, index, Namespace::Primary);
      write_region(file, &listing, entry.primary_lba, entry.primary_extent_size)?;
    }
  }

  for entry in entries.iter().filter(|e| !e.is_dir) {
    write_file_data(file, entry)?;
  }

  for (index, entry) in entries.iter().enumerate() {
    if entry.is_dir {
      let listing = directory_listing(entries, index, Namespace::Joliet);
      write_region(file, &listing, entry.joliet_lba, entry.joliet_extent_size)?;
    }
  }

  file.set_len(layout.total_sectors as u64 * SECTOR_SIZE as u64)?;
  Ok(())
}

fn write_file_data(file: &mut File, entry: &Entry) -> Result<()> {
  let data = std::fs::read(&entry.disk_path).map_err(|source| Error::ReadSource {
    path: entry.disk_path.clone(),
    source,
  })?;
  // The scanned size drove the layout; a mismatch means the source moved
  // under us and every LBA past this point would shift.
  if data.len() as u64 != entry.primary_extent_size as u64 {
    return Err(Error::SourceChanged {
      path: entry.disk_path.clone(),
      expected: entry.primary_extent_size as u64,
      actual: data.len() as u64,
    });
  }
  let allocated = spec::sectors_for_file(data.len() as u64) * SECTOR_SIZE;
  write_region(file, &data, entry.primary_lba, allocated)
}

/// Builds one directory's listing on demand: `.`, `..`, then the children
/// sorted byte-wise by their namespace identifier.
fn directory_listing(entries: &[Entry], dir_index: usize, ns: Namespace) -> Vec<u8> {
  let dir = &entries[dir_index];
  let parent = &entries[dir.parent];
  log::debug!(
    "emitting {:?} listing for {} at LBA {}",
    ns,
    dir.iso_path,
    dir.lba_in(ns)
  );

  let mut listing =
    record::entry_record(dir, ".", ns, dir.lba_in(ns), dir.extent_size_in(ns));
  // For the root the parent is the root itself.
  listing.extend(record::entry_record(
    parent,
    "..",
    ns,
    parent.lba_in(ns),
    parent.extent_size_in(ns),
  ));

  let mut children: Vec<&Entry> = dir.children.iter().map(|&c| &entries[c]).collect();
  children.sort_by_cached_key(|child| record::identifier_bytes(child.name_in(ns), ns, false));

  for child in children {
    let rec = record::entry_record(
      child,
      child.name_in(ns),
      ns,
      child.lba_in(ns),
      child.extent_size_in(ns),
    );
    assert_eq!(
      rec.len(),
      child.dr_size_in(ns),
      "record for {} differs from its planned size",
      child.iso_path
    );
    listing.extend(rec);
  }

  assert!(
    listing.len() <= dir.extent_size_in(ns) as usize,
    "listing for {} overflows its {}-byte extent",
    dir.iso_path,
    dir.extent_size_in(ns)
  );
  listing
}

/// Seeks to `lba` and writes `data`, zero-filling the rest of the
/// allocated span. `allocated` must be whole sectors and large enough;
/// both are guaranteed by the planner.
fn write_region(file: &mut File, data: &[u8], lba: u32, allocated: u32) -> Result<()> {
  assert!(
    allocated % SECTOR_SIZE == 0,
    "region at LBA {lba} allocated {allocated} bytes, not sector-aligned"
  );
  assert!(
    data.len() <= allocated as usize,
    "region at LBA {lba} holds {} bytes but only {allocated} were allocated",
    data.len()
  );

  file.seek(SeekFrom::Start(lba as u64 * SECTOR_SIZE as u64))?;
  file.write_all(data)?;

  let mut padding = allocated as usize - data.len();
  if padding > 0 {
    let zeros = [0u8; SECTOR_SIZE as usize];
    while padding > 0 {
      let chunk = padding.min(zeros.len());
      file.write_all(&zeros[..chunk])?;
      padding -= chunk;
    }
  }
  Ok(())
}
