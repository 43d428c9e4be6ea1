//! ECMA-119 (ISO 9660 Level 1) image builder with a Joliet supplementary
//! volume, producing a single sector-aligned image readable under both
//! namespaces at once.
//!
//! The two hierarchies share every file-data extent by construction: each
//! scanned entry carries a pair of names, record sizes, and extent
//! addresses, and the planner assigns file sectors once. Only directory
//! listings are emitted twice.
//!
//! ```no_run
//! # fn main() -> mkiso::Result<()> {
//! let mut builder = mkiso::IsoBuilder::new("./tree", "tree.iso", Default::default());
//! builder.build()?;
//! # Ok(())
//! # }
//! ```

mod builder;
mod entry;
mod error;
mod layout;
mod lba;
mod names;
mod path_table;
mod record;
mod scan;
pub mod spec;
mod volume;
mod writer;

pub use builder::{IsoBuilder, Options};
pub use error::{Error, Result};
