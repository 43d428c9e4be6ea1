//! Path table encoding (ECMA-119 9.4).
//!
//! A path table is a flat index of every directory in one namespace. Each
//! namespace gets an L-type (little-endian) and an M-type (big-endian)
//! variant; the two carry the same records and the same byte length, only
//! the integer byte order and the record order differ.

use crate::entry::Entry;
use crate::names::encode_ucs2_be;
use crate::spec::{Endian, Namespace, PT_RECORD_FIXED_LEN};

fn identifier_bytes(entry: &Entry, ns: Namespace) -> Vec<u8> {
  if entry.is_root() {
    return vec![0x00];
  }
  match ns {
    Namespace::Primary => entry.name_in(ns).as_bytes().to_vec(),
    Namespace::Joliet => encode_ucs2_be(entry.name_in(ns)),
  }
}

fn record_len(identifier: &[u8]) -> usize {
  let len = PT_RECORD_FIXED_LEN + identifier.len();
  len + len % 2
}

fn encode_record(identifier: &[u8], extent_lba: u32, parent_number: u16, endian: Endian) -> Vec<u8> {
  let mut buf = vec![0u8; record_len(identifier)];
  buf[0] = identifier.len() as u8;
  buf[1] = 0; // extended attribute record length
  match endian {
    Endian::Little => {
      buf[2..6].copy_from_slice(&extent_lba.to_le_bytes());
      buf[6..8].copy_from_slice(&parent_number.to_le_bytes());
    }
    Endian::Big => {
      buf[2..6].copy_from_slice(&extent_lba.to_be_bytes());
      buf[6..8].copy_from_slice(&parent_number.to_be_bytes());
    }
  }
  buf[8..8 + identifier.len()].copy_from_slice(identifier);
  // Odd identifiers leave one zero padding byte.
  buf
}

fn parent_number(entries: &[Entry], entry: &Entry) -> u16 {
  if entry.is_root() {
    1 // the root is its own parent
  } else {
    entries[entry.parent].path_table_number
  }
}

/// Byte length of one namespace's path table, L-type and M-type alike.
/// Known before any record is encoded so the planner can reserve sectors.
pub(crate) fn table_len(entries: &[Entry], ns: Namespace) -> usize {
  entries
    .iter()
    .filter(|e| e.is_dir)
    .map(|e| record_len(&identifier_bytes(e, ns)))
    .sum()
}

/// Encodes one namespace's path table.
///
/// L-type records follow path-table-number order (the depth-first scan
/// order, root first). M-type records are keyed by the parent's number and
/// then byte-wise by identifier, which also puts the root first.
pub(crate) fn encode(entries: &[Entry], ns: Namespace, endian: Endian) -> Vec<u8> {
  let mut dirs: Vec<&Entry> = entries.iter().filter(|e| e.is_dir).collect();
  match endian {
    Endian::Little => dirs.sort_by_key(|e| e.path_table_number),
    Endian::Big => {
      dirs.sort_by_cached_key(|e| (parent_number(entries, e), identifier_bytes(e, ns)))
    }
  }

  let mut table = Vec::with_capacity(table_len(entries, ns));
  for dir in dirs {
    let identifier = identifier_bytes(dir, ns);
    table.extend_from_slice(&encode_record(
      &identifier,
      dir.lba_in(ns),
      parent_number(entries, dir),
      endian,
    ));
  }
  table
}
