//! Source tree scanner: builds the flat entry table the planner works on.

use std::path::Path;

use chrono::{DateTime, Utc};
use walkdir::WalkDir;

use crate::entry::{Entry, ROOT_SENTINEL};
use crate::error::{Error, Result};
use crate::spec::MAX_FILE_EXTENT_BYTES;

/// Walks `source_dir` depth-first and returns the entry table: the
/// synthetic root at index 0 followed by every directory and regular file.
/// Siblings are visited in file-name order, children are recorded in visit
/// order, and path table numbers are dense in depth-first pre-order.
/// Symlinks and special files are skipped.
pub(crate) fn scan_tree(source_dir: &Path) -> Result<Vec<Entry>> {
  let root_path = source_dir
    .canonicalize()
    .map_err(|source| Error::ResolveSource {
      path: source_dir.to_path_buf(),
      source,
    })?;
  if !root_path.is_dir() {
    return Err(Error::NotADirectory(root_path));
  }

  let mut entries = vec![Entry {
    original_name: ROOT_SENTINEL.to_string(),
    disk_path: root_path.clone(),
    iso_path: "/".to_string(),
    is_dir: true,
    // The root is its own parent and always directory #1 in the path table.
    parent: 0,
    path_table_number: 1,
    ..Entry::default()
  }];

  let mut next_table_number: u16 = 2;
  // Index of the most recent directory per depth; stack[0] is the root.
  let mut stack: Vec<usize> = vec![0];

  for item in WalkDir::new(&root_path).min_depth(1).sort_by_file_name() {
    let item = item?;
    let file_type = item.file_type();
    if !file_type.is_dir() && !file_type.is_file() {
      log::debug!("skipping non-regular entry {}", item.path().display());
      continue;
    }

    let metadata = item.metadata()?;
    let depth = item.depth();
    stack.truncate(depth);
    let parent = stack[depth - 1];

    let original_name = item.file_name().to_string_lossy().into_owned();
    let relative = item
      .path()
      .strip_prefix(&root_path)
      .expect("walked path lies under the scanned root");
    let iso_path = format!("/{}", relative.to_string_lossy().replace('\\', "/"));

    let mtime = match metadata.modified() {
      Ok(time) => Some(DateTime::<Utc>::from(time)),
      Err(err) => {
        log::warn!(
          "no modification time for {}: {err}; recording build time",
          item.path().display()
        );
        None
      }
    };

    let mut entry = Entry {
      original_name,
      disk_path: item.path().to_path_buf(),
      iso_path,
      is_dir: file_type.is_dir(),
      level: depth,
      parent,
      mtime,
      ..Entry::default()
    };

    if entry.is_dir {
      entry.path_table_number = next_table_number;
      next_table_number += 1;
    } else {
      let size = metadata.len();
      if size > MAX_FILE_EXTENT_BYTES {
        return Err(Error::FileTooLarge(item.path().to_path_buf()));
      }
      entry.primary_extent_size = size as u32;
      entry.joliet_extent_size = size as u32;
    }

    let index = entries.len();
    entries.push(entry);
    entries[parent].children.push(index);
    if entries[index].is_dir {
      stack.push(index);
    }
  }

  log::debug!(
    "scanned {} entries under {}",
    entries.len(),
    root_path.display()
  );
  Ok(entries)
}
