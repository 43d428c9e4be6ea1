//! High-level interface for building an ISO 9660 + Joliet image from a
//! directory tree.

use std::fs::File;
use std::path::{Path, PathBuf};

use crate::entry::{Entry, ROOT_SENTINEL};
use crate::error::{Error, Result};
use crate::{layout, scan, writer};

/// Volume metadata carried by the descriptors. Primary fields are stored
/// space-padded as ASCII; Joliet fields are encoded as UCS-2BE and capped
/// to the code-unit capacity of their descriptor field.
#[derive(Debug, Clone)]
pub struct Options {
  /// PVD volume identifier, up to 32 d-characters.
  pub volume_id_primary: String,
  /// SVD volume identifier, up to 16 UCS-2 code units.
  pub volume_id_joliet: String,
  /// System identifier shared by both descriptors, up to 32 a-characters.
  pub system_id: String,
  pub publisher_primary: String,
  pub publisher_joliet: String,
  pub data_preparer_primary: String,
  pub data_preparer_joliet: String,
  pub application_primary: String,
  pub application_joliet: String,
  /// Escape sequence announced in the SVD; `%/E` marks UCS-2 Level 3.
  pub joliet_escape: [u8; 3],
}

impl Default for Options {
  fn default() -> Self {
    Self {
      volume_id_primary: "ISO_VOLUME".to_string(),
      volume_id_joliet: "ISO_VOLUME".to_string(),
      system_id: String::new(),
      publisher_primary: String::new(),
      publisher_joliet: String::new(),
      data_preparer_primary: String::new(),
      data_preparer_joliet: String::new(),
      application_primary: "MKISO".to_string(),
      application_joliet: "MKISO".to_string(),
      joliet_escape: *b"%/E",
    }
  }
}

/// Builds one image from one source tree.
///
/// `scan` and `mark_hidden` may be called explicitly; [`IsoBuilder::build`]
/// is the only call that touches the output path and will scan on its own
/// when it has not happened yet.
///
/// ```no_run
/// # fn main() -> mkiso::Result<()> {
/// let mut builder = mkiso::IsoBuilder::new("./staging", "out.iso", Default::default());
/// builder.scan()?;
/// builder.mark_hidden(["secret.bin"]);
/// builder.build()?;
/// # Ok(())
/// # }
/// ```
pub struct IsoBuilder {
  source_dir: PathBuf,
  output_path: PathBuf,
  options: Options,
  entries: Vec<Entry>,
}

impl IsoBuilder {
  pub fn new(
    source_dir: impl AsRef<Path>,
    output_path: impl AsRef<Path>,
    options: Options,
  ) -> Self {
    Self {
      source_dir: source_dir.as_ref().to_path_buf(),
      output_path: output_path.as_ref().to_path_buf(),
      options,
      entries: Vec::new(),
    }
  }

  /// Scans the source tree, replacing any previous scan results.
  pub fn scan(&mut self) -> Result<()> {
    self.entries = scan::scan_tree(&self.source_dir)?;
    Ok(())
  }

  /// Flags every entry whose on-disk name matches one of `names` as hidden
  /// in its directory records. A name may match in several directories;
  /// all matches apply. Empty and navigational names, and names matching
  /// nothing, are reported as warnings and skipped — the build proceeds.
  ///
  /// Call after [`IsoBuilder::scan`]; hiding alters no sizes or sector
  /// assignments, so the layout needs no recomputation.
  pub fn mark_hidden<I, S>(&mut self, names: I)
  where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
  {
    if self.entries.is_empty() {
      log::warn!("mark_hidden called before any scan; nothing to match");
      return;
    }
    for name in names {
      let name = name.as_ref();
      if name.is_empty() || name == "." || name == ".." || name == ROOT_SENTINEL {
        log::warn!("cannot hide reserved name {name:?}");
        continue;
      }
      let mut matched = false;
      // Index 0 is the synthetic root; its sentinel never matches a real name.
      for entry in self.entries.iter_mut().skip(1) {
        if entry.original_name == name {
          entry.hidden = true;
          matched = true;
          log::debug!("hiding {}", entry.iso_path);
        }
      }
      if !matched {
        log::warn!("no entry named {name:?} found to hide");
      }
    }
  }

  /// Scans if necessary, plans the layout, and writes the image. On error
  /// a partially written output file is left in place.
  pub fn build(&mut self) -> Result<()> {
    if self.entries.is_empty() {
      self.scan()?;
    }
    let layout = layout::plan(&mut self.entries);
    log::debug!(
      "planned {} sectors for {} entries",
      layout.total_sectors,
      self.entries.len()
    );

    let mut file = File::create(&self.output_path).map_err(|source| Error::CreateOutput {
      path: self.output_path.clone(),
      source,
    })?;
    writer::write_image(&mut file, &self.entries, &layout, &self.options)?;
    log::debug!("wrote image to {}", self.output_path.display());
    Ok(())
  }
}
