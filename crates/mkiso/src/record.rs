//! Directory record encoding (ECMA-119 9.1).

use chrono::Utc;

use crate::entry::{Entry, ROOT_SENTINEL};
use crate::names::encode_ucs2_be;
use crate::spec::{self, FileFlags, Namespace, RecordingTime, DR_FIXED_LEN};

/// Identifier bytes for one record slot in a directory listing.
///
/// `root_self` is true when the identifier stands for the root directory
/// itself (the PVD/SVD root record, or the root listing's `.` entry); that
/// slot is always a single 0x00 byte in both namespaces.
pub(crate) fn identifier_bytes(name: &str, ns: Namespace, root_self: bool) -> Vec<u8> {
  match ns {
    Namespace::Primary => {
      if root_self || name == "." || name == ROOT_SENTINEL {
        vec![0x00]
      } else if name == ".." {
        vec![0x01]
      } else {
        name.as_bytes().to_vec()
      }
    }
    Namespace::Joliet => {
      if root_self || name == ROOT_SENTINEL {
        vec![0x00]
      } else {
        // Joliet keeps `.` and `..` as UCS-2 of the literal ASCII.
        encode_ucs2_be(name)
      }
    }
  }
}

/// Total record length: 33 fixed bytes plus the identifier, rounded up to
/// an even boundary.
pub(crate) fn record_len(identifier: &[u8]) -> usize {
  let len = DR_FIXED_LEN + identifier.len();
  len + len % 2
}

/// Record length for an entry appearing under `name` in a listing, without
/// encoding it. Used by the planner so parents can be sized up front.
pub(crate) fn sized_record_len(name: &str, ns: Namespace, root_self: bool) -> usize {
  record_len(&identifier_bytes(name, ns, root_self))
}

fn encode(
  lba: u32,
  data_len: u32,
  time: RecordingTime,
  flags: FileFlags,
  identifier: &[u8],
) -> Vec<u8> {
  let len = record_len(identifier);
  assert!(len <= u8::MAX as usize, "directory record overflows length byte");

  let mut buf = vec![0u8; len];
  buf[0] = len as u8;
  buf[1] = 0; // extended attribute record length
  spec::put_both_u32(&mut buf[2..10], lba);
  spec::put_both_u32(&mut buf[10..18], data_len);
  buf[18..25].copy_from_slice(&time.to_bytes());
  buf[25] = flags.bits();
  buf[26] = 0; // file unit size: no interleaving
  buf[27] = 0; // interleave gap size
  spec::put_both_u16(&mut buf[28..32], 1); // volume sequence number
  buf[32] = identifier.len() as u8;
  buf[33..33 + identifier.len()].copy_from_slice(identifier);
  // A final padding byte, when present, stays zero.
  buf
}

/// Builds the complete record describing `target` under the given
/// identifier (`target`'s own namespace name, `.`, `..`, or the root
/// sentinel). `lba` and `size` are the extent location and data length the
/// record advertises, which for `..` entries belong to the parent.
pub(crate) fn entry_record(
  target: &Entry,
  name: &str,
  ns: Namespace,
  lba: u32,
  size: u32,
) -> Vec<u8> {
  let root_self = target.is_root() && (name == "." || name == ROOT_SENTINEL);

  let mut flags = FileFlags::empty();
  if target.is_dir {
    flags |= FileFlags::DIRECTORY;
  }
  // The hidden bit belongs to the record that names the entity itself,
  // never to the `.`/`..` slots or the root sentinel.
  if target.hidden && name != "." && name != ".." && name != ROOT_SENTINEL {
    flags |= FileFlags::HIDDEN;
  }

  let time = RecordingTime::from(target.mtime.unwrap_or_else(Utc::now));
  encode(lba, size, time, flags, &identifier_bytes(name, ns, root_self))
}
