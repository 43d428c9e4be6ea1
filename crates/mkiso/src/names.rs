//! Identifier sanitisation for the two namespaces.
//!
//! The sanitiser is deterministic and idempotent. It never de-duplicates:
//! two siblings may well collapse onto the same primary identifier
//! (`report.txt` and `REPORT.TXT` both become `REPORT.TXT;1`), which is an
//! accepted hazard of ISO 9660 Level 1. The Joliet identifiers keep the
//! original names apart in that case.

use crate::entry::ROOT_SENTINEL;
use crate::spec::JOLIET_MAX_NAME_UNITS;

/// Maps `part` into the Level 1 alphabet (`A-Z`, `0-9`, `_`), truncated to
/// `max_len` characters. Everything else, dots included, becomes `_`.
fn sanitize_part(part: &str, max_len: usize) -> String {
  part
    .chars()
    .map(|c| {
      let c = c.to_ascii_uppercase();
      if c.is_ascii_uppercase() || c.is_ascii_digit() || c == '_' {
        c
      } else {
        '_'
      }
    })
    .take(max_len)
    .collect()
}

/// The sanitised name without the version suffix. Idempotent: feeding a
/// stem back in returns it unchanged.
fn primary_stem(original: &str, is_dir: bool) -> String {
  if is_dir {
    let name = sanitize_part(original, 8);
    return if name.is_empty() { "DIR".to_string() } else { name };
  }

  let (base, ext) = match original.rfind('.') {
    Some(dot) => (&original[..dot], &original[dot + 1..]),
    None => (original, ""),
  };
  let base = sanitize_part(base, 8);
  let ext = sanitize_part(ext, 3);

  match (base.is_empty(), ext.is_empty()) {
    (true, true) => "FILE".to_string(),
    // Dotfile-style names keep only the extension part.
    (true, false) => ext,
    (false, true) => base,
    (false, false) => format!("{base}.{ext}"),
  }
}

/// Produces the ECMA-119 Level 1 identifier for an on-disk name.
///
/// Files are split on the final dot into an 8-character base and a
/// 3-character extension and get a `;1` version suffix. Directories take no
/// extension and no version. An empty result substitutes `DIR` or `FILE`.
///
/// The root's identifier (a single 0x00 byte) is not produced here; the
/// record encoder handles the sentinel.
pub(crate) fn primary_name(original: &str, is_dir: bool) -> String {
  let stem = primary_stem(original, is_dir);
  if is_dir {
    stem
  } else {
    format!("{stem};1")
  }
}

/// Produces the Joliet identifier: the original name truncated to 64 UCS-2
/// code units. `.`, `..`, and the root sentinel pass through unchanged.
pub(crate) fn joliet_name(original: &str) -> String {
  if original == ROOT_SENTINEL || original == "." || original == ".." {
    return original.to_string();
  }

  let mut units = 0;
  let mut out = String::new();
  for c in original.chars() {
    let width = c.len_utf16();
    if units + width > JOLIET_MAX_NAME_UNITS {
      log::warn!(
        "joliet name {original:?} truncated to {JOLIET_MAX_NAME_UNITS} UCS-2 units: {out:?}"
      );
      break;
    }
    units += width;
    out.push(c);
  }
  out
}

/// UCS-2 big-endian encoding of `s`. Scalars outside the BMP fall back to
/// UTF-16 surrogate pairs; code-unit limits are enforced by the callers.
pub(crate) fn encode_ucs2_be(s: &str) -> Vec<u8> {
  s.encode_utf16().flat_map(|unit| unit.to_be_bytes()).collect()
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn primary_file_names() {
    assert_eq!(primary_name("hello.txt", false), "HELLO.TXT;1");
    assert_eq!(primary_name("longfilename.extension", false), "LONGFILE.EXT;1");
    assert_eq!(primary_name("README", false), "README;1");
    assert_eq!(primary_name("meta-data", false), "META_DAT;1");
    // Non-ASCII collapses to underscore.
    assert_eq!(primary_name("Σ.md", false), "_.MD;1");
    // Multiple dots: only the final one separates the extension.
    assert_eq!(primary_name("a.b.c", false), "A_B.C;1");
    // Leading dot leaves an empty base.
    assert_eq!(primary_name(".bashrc", false), "BAS;1");
    // Trailing dot leaves an empty extension.
    assert_eq!(primary_name("archive.", false), "ARCHIVE;1");
    assert_eq!(primary_name("", false), "FILE;1");
  }

  #[test]
  fn primary_directory_names() {
    assert_eq!(primary_name("src", true), "SRC");
    assert_eq!(primary_name("my.folder", true), "MY_FOLDE");
    assert_eq!(primary_name("überlang", true), "_BERLANG");
    assert_eq!(primary_name("", true), "DIR");
  }

  #[test]
  fn primary_collision_is_accepted() {
    assert_eq!(
      primary_name("report.txt", false),
      primary_name("REPORT.TXT", false)
    );
  }

  #[test]
  fn primary_stem_is_idempotent() {
    for name in ["hello.txt", "Σ.md", "meta-data", "a.b.c", ".bashrc"] {
      let once = primary_stem(name, false);
      assert_eq!(primary_stem(&once, false), once);
    }
    for name in ["src", "my.folder", "überlang"] {
      let once = primary_stem(name, true);
      assert_eq!(primary_stem(&once, true), once);
    }
  }

  #[test]
  fn joliet_passthrough_and_truncation() {
    assert_eq!(joliet_name("Σ.md"), "Σ.md");
    assert_eq!(joliet_name("."), ".");
    assert_eq!(joliet_name(".."), "..");
    assert_eq!(joliet_name(ROOT_SENTINEL), ROOT_SENTINEL);

    let long: String = "x".repeat(80);
    assert_eq!(joliet_name(&long).chars().count(), 64);
  }

  #[test]
  fn joliet_truncation_counts_code_units() {
    // '𝄞' (U+1D11E) encodes as a surrogate pair: two code units each.
    let name: String = "𝄞".repeat(40);
    let truncated = joliet_name(&name);
    assert_eq!(truncated.encode_utf16().count(), 64);
    assert_eq!(truncated.chars().count(), 32);
  }

  #[test]
  fn ucs2_encoding_is_big_endian() {
    assert_eq!(encode_ucs2_be("A"), vec![0x00, 0x41]);
    assert_eq!(encode_ucs2_be("Σ"), vec![0x03, 0xA3]);
    assert_eq!(encode_ucs2_be(".."), vec![0x00, 0x2E, 0x00, 0x2E]);
  }
}
