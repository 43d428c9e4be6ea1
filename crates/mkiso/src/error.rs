use std::path::PathBuf;

/// Errors surfaced while scanning the source tree or writing the image.
///
/// Planner inconsistencies (mis-sized records, misaligned extents, path
/// tables that disagree with their reservation) are bugs, not runtime
/// conditions, and panic instead of appearing here.
#[derive(Debug, thiserror::Error)]
pub enum Error {
  #[error("walking source tree: {0}")]
  Walk(#[from] walkdir::Error),
  #[error("source is not a directory: {0}")]
  NotADirectory(PathBuf),
  #[error("resolving source directory {path}: {source}")]
  ResolveSource {
    path: PathBuf,
    #[source]
    source: std::io::Error,
  },
  #[error("file too large for a 32-bit extent: {0}")]
  FileTooLarge(PathBuf),
  #[error("reading {path}: {source}")]
  ReadSource {
    path: PathBuf,
    #[source]
    source: std::io::Error,
  },
  #[error("size of {path} changed since scan: expected {expected} bytes, read {actual}")]
  SourceChanged {
    path: PathBuf,
    expected: u64,
    actual: u64,
  },
  #[error("creating output file {path}: {source}")]
  CreateOutput {
    path: PathBuf,
    #[source]
    source: std::io::Error,
  },
  #[error("writing output image: {0}")]
  Output(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
