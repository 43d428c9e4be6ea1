//! The layout planner: sizes every region and pins it to a sector address
//! before a single byte is written.
//!
//! Ordering is fixed: system area (0-15), PVD/SVD/terminator (16-18), the
//! eight path table placements, every primary directory extent, every file
//! extent (shared by both namespaces), every Joliet directory extent, one
//! trailing pad sector.

use crate::entry::{Entry, ROOT_SENTINEL};
use crate::lba::LbaAllocator;
use crate::spec::{self, Endian, Namespace, SECTOR_SIZE, SYSTEM_AREA_SECTORS};
use crate::{names, path_table, record};

/// LBAs and pre-generated bytes for one namespace's path tables. The same
/// bytes are written twice (primary and second copy) per variant.
pub(crate) struct PathTables {
  pub l_lba: u32,
  pub m_lba: u32,
  pub l_copy_lba: u32,
  pub m_copy_lba: u32,
  pub l_data: Vec<u8>,
  pub m_data: Vec<u8>,
}

impl PathTables {
  /// Unpadded byte length, as advertised in the volume descriptor.
  pub fn byte_len(&self) -> u32 {
    self.l_data.len() as u32
  }

  /// On-disk span of one placement, padded to whole sectors.
  pub fn allocated_bytes(&self) -> u32 {
    spec::sectors_for_bytes(self.l_data.len() as u64) * SECTOR_SIZE
  }
}

pub(crate) struct Layout {
  /// Image size in sectors, including the trailing pad sector.
  pub total_sectors: u32,
  pub primary_tables: PathTables,
  pub joliet_tables: PathTables,
  /// Root listing extent sizes, repeated here because the root's record is
  /// embedded in the PVD/SVD rather than in any parent listing.
  pub root_primary_extent: u32,
  pub root_joliet_extent: u32,
}

/// Runs the whole plan over the scanned table. Mutates only the computed
/// fields of each entry; performs no I/O. Internal inconsistencies panic:
/// they are planner bugs, not runtime conditions.
pub(crate) fn plan(entries: &mut [Entry]) -> Layout {
  assert!(!entries.is_empty(), "layout planned over an empty entry table");

  assign_names_and_record_sizes(entries);
  assign_extent_sizes(entries);

  // LBAs 0-15 are the system area, 16-18 the volume descriptors.
  let mut alloc = LbaAllocator::new(SYSTEM_AREA_SECTORS + 3);

  let primary_len = path_table::table_len(entries, Namespace::Primary) as u64;
  let joliet_len = path_table::table_len(entries, Namespace::Joliet) as u64;

  let primary_l = alloc.allocate(primary_len);
  let primary_m = alloc.allocate(primary_len);
  let joliet_l = alloc.allocate(joliet_len);
  let joliet_m = alloc.allocate(joliet_len);
  let primary_l_copy = alloc.allocate(primary_len);
  let primary_m_copy = alloc.allocate(primary_len);
  let joliet_l_copy = alloc.allocate(joliet_len);
  let joliet_m_copy = alloc.allocate(joliet_len);

  assign_content_lbas(entries, &mut alloc);

  // One pad sector of zeros past the last extent, for reader compatibility.
  let total_sectors = alloc.position() + 1;

  let primary_tables = PathTables {
    l_lba: primary_l,
    m_lba: primary_m,
    l_copy_lba: primary_l_copy,
    m_copy_lba: primary_m_copy,
    l_data: path_table::encode(entries, Namespace::Primary, Endian::Little),
    m_data: path_table::encode(entries, Namespace::Primary, Endian::Big),
  };
  let joliet_tables = PathTables {
    l_lba: joliet_l,
    m_lba: joliet_m,
    l_copy_lba: joliet_l_copy,
    m_copy_lba: joliet_m_copy,
    l_data: path_table::encode(entries, Namespace::Joliet, Endian::Little),
    m_data: path_table::encode(entries, Namespace::Joliet, Endian::Big),
  };

  // The sector reservations above were made from the predicted lengths;
  // the generated tables must agree with them exactly.
  assert_eq!(
    primary_tables.l_data.len() as u64,
    primary_len,
    "generated primary path table length differs from the planned length"
  );
  assert_eq!(
    joliet_tables.l_data.len() as u64,
    joliet_len,
    "generated joliet path table length differs from the planned length"
  );
  assert_eq!(
    primary_tables.l_data.len(),
    primary_tables.m_data.len(),
    "primary L and M path tables differ in length"
  );
  assert_eq!(
    joliet_tables.l_data.len(),
    joliet_tables.m_data.len(),
    "joliet L and M path tables differ in length"
  );

  Layout {
    total_sectors,
    primary_tables,
    joliet_tables,
    root_primary_extent: entries[0].primary_extent_size,
    root_joliet_extent: entries[0].joliet_extent_size,
  }
}

fn assign_names_and_record_sizes(entries: &mut [Entry]) {
  for entry in entries.iter_mut() {
    if entry.is_root() {
      // The root's identifier is the 0x00 sentinel in both namespaces;
      // its record appears only inside the PVD/SVD, always 34 bytes.
      entry.primary_name = ROOT_SENTINEL.to_string();
      entry.joliet_name = ROOT_SENTINEL.to_string();
    } else {
      entry.primary_name = names::primary_name(&entry.original_name, entry.is_dir);
      entry.joliet_name = names::joliet_name(&entry.original_name);
    }
    let root_self = entry.is_root();
    entry.primary_dr_size =
      record::sized_record_len(&entry.primary_name, Namespace::Primary, root_self);
    entry.joliet_dr_size =
      record::sized_record_len(&entry.joliet_name, Namespace::Joliet, root_self);
  }
}

fn assign_extent_sizes(entries: &mut [Entry]) {
  for i in 0..entries.len() {
    if !entries[i].is_dir {
      continue;
    }
    let primary = directory_extent_size(entries, i, Namespace::Primary);
    let joliet = directory_extent_size(entries, i, Namespace::Joliet);
    entries[i].primary_extent_size = primary;
    entries[i].joliet_extent_size = joliet;
  }
}

/// Sum of the `.`, `..`, and child record sizes, rounded up to a sector.
fn directory_extent_size(entries: &[Entry], dir_index: usize, ns: Namespace) -> u32 {
  let dir = &entries[dir_index];
  let mut total = record::sized_record_len(".", ns, dir.is_root())
    + record::sized_record_len("..", ns, false);
  for &child in &dir.children {
    total += entries[child].dr_size_in(ns);
  }
  assert!(
    total > 0,
    "directory {:?} sized to a zero-byte extent",
    dir.iso_path
  );
  spec::sectors_for_bytes(total as u64) * SECTOR_SIZE
}

fn assign_content_lbas(entries: &mut [Entry], alloc: &mut LbaAllocator) {
  // Primary directory extents in table order; the root leads by construction.
  for entry in entries.iter_mut().filter(|e| e.is_dir) {
    entry.primary_lba = alloc.allocate_extent(entry.primary_extent_size);
  }
  // File data, shared between the namespaces.
  for entry in entries.iter_mut().filter(|e| !e.is_dir) {
    let lba = alloc.allocate_file(entry.primary_extent_size as u64);
    entry.primary_lba = lba;
    entry.joliet_lba = lba;
  }
  // Joliet directory extents.
  for entry in entries.iter_mut().filter(|e| e.is_dir) {
    entry.joliet_lba = alloc.allocate_extent(entry.joliet_extent_size);
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn root() -> Entry {
    Entry {
      original_name: ROOT_SENTINEL.to_string(),
      iso_path: "/".into(),
      is_dir: true,
      path_table_number: 1,
      ..Entry::default()
    }
  }

  fn file(name: &str, parent: usize, size: u32) -> Entry {
    Entry {
      original_name: name.to_string(),
      iso_path: format!("/{name}"),
      parent,
      primary_extent_size: size,
      joliet_extent_size: size,
      ..Entry::default()
    }
  }

  fn dir(name: &str, parent: usize, number: u16) -> Entry {
    Entry {
      original_name: name.to_string(),
      iso_path: format!("/{name}"),
      is_dir: true,
      parent,
      path_table_number: number,
      ..Entry::default()
    }
  }

  /// root -> { docs/ -> { note.txt }, hello.txt }
  fn sample_tree() -> Vec<Entry> {
    let mut entries = vec![root(), dir("docs", 0, 2), file("note.txt", 1, 100), file("hello.txt", 0, 5)];
    entries[0].children = vec![1, 3];
    entries[1].children = vec![2];
    entries
  }

  #[test]
  fn empty_tree_layout() {
    let mut entries = vec![root()];
    let layout = plan(&mut entries);

    // One 10-byte path table per namespace: 8 single-sector placements
    // at 19..=26, then the two root listings, then the pad sector.
    assert_eq!(layout.primary_tables.l_lba, 19);
    assert_eq!(layout.primary_tables.m_lba, 20);
    assert_eq!(layout.joliet_tables.l_lba, 21);
    assert_eq!(layout.joliet_tables.m_lba, 22);
    assert_eq!(layout.primary_tables.l_copy_lba, 23);
    assert_eq!(layout.primary_tables.m_copy_lba, 24);
    assert_eq!(layout.joliet_tables.l_copy_lba, 25);
    assert_eq!(layout.joliet_tables.m_copy_lba, 26);
    assert_eq!(entries[0].primary_lba, 27);
    assert_eq!(entries[0].joliet_lba, 28);
    assert_eq!(layout.total_sectors, 30);

    // Root listings hold exactly `.` and `..`.
    assert_eq!(layout.root_primary_extent, SECTOR_SIZE);
    assert_eq!(layout.root_joliet_extent, SECTOR_SIZE);
  }

  #[test]
  fn file_lbas_are_shared_across_namespaces() {
    let mut entries = sample_tree();
    plan(&mut entries);
    for entry in entries.iter().filter(|e| !e.is_dir) {
      assert_eq!(entry.primary_lba, entry.joliet_lba);
      assert_eq!(entry.primary_extent_size, entry.joliet_extent_size);
    }
    // Directories get distinct listing extents per namespace.
    for entry in entries.iter().filter(|e| e.is_dir) {
      assert_ne!(entry.primary_lba, entry.joliet_lba);
    }
  }

  #[test]
  fn directory_extents_are_sector_aligned_sums() {
    let mut entries = sample_tree();
    plan(&mut entries);
    for i in 0..entries.len() {
      let e = &entries[i];
      if !e.is_dir {
        continue;
      }
      for ns in [Namespace::Primary, Namespace::Joliet] {
        assert_eq!(e.extent_size_in(ns) % SECTOR_SIZE, 0);
        let sum = record::sized_record_len(".", ns, e.is_root())
          + record::sized_record_len("..", ns, false)
          + e.children.iter().map(|&c| entries[c].dr_size_in(ns)).sum::<usize>();
        assert_eq!(
          e.extent_size_in(ns),
          spec::sectors_for_bytes(sum as u64) * SECTOR_SIZE
        );
      }
    }
  }

  #[test]
  fn content_ordering_and_total() {
    let mut entries = sample_tree();
    let layout = plan(&mut entries);

    // Path tables still fit one sector each here.
    let first_content = 19 + 8;
    assert_eq!(entries[0].primary_lba, first_content);
    assert_eq!(entries[1].primary_lba, first_content + 1);
    // Files follow all primary directory extents...
    assert_eq!(entries[2].primary_lba, first_content + 2);
    assert_eq!(entries[3].primary_lba, first_content + 3);
    // ...and Joliet directory extents follow the files.
    assert_eq!(entries[0].joliet_lba, first_content + 4);
    assert_eq!(entries[1].joliet_lba, first_content + 5);
    assert_eq!(layout.total_sectors, first_content + 6 + 1);
  }

  #[test]
  fn empty_file_still_owns_a_sector() {
    let mut entries = vec![root(), file("empty", 0, 0), file("next", 0, 1)];
    entries[0].children = vec![1, 2];
    plan(&mut entries);
    assert_eq!(entries[1].primary_extent_size, 0);
    assert_eq!(entries[2].primary_lba, entries[1].primary_lba + 1);
  }

  #[test]
  fn hidden_marking_does_not_move_anything() {
    let mut plain = sample_tree();
    let plain_layout = plan(&mut plain);

    let mut hidden = sample_tree();
    for e in hidden.iter_mut().skip(1) {
      e.hidden = true;
    }
    let hidden_layout = plan(&mut hidden);

    assert_eq!(plain_layout.total_sectors, hidden_layout.total_sectors);
    for (a, b) in plain.iter().zip(&hidden) {
      assert_eq!(a.primary_lba, b.primary_lba);
      assert_eq!(a.joliet_lba, b.joliet_lba);
      assert_eq!(a.primary_extent_size, b.primary_extent_size);
      assert_eq!(a.joliet_extent_size, b.joliet_extent_size);
    }
  }
}
