//! Pull the first CSV out of a zip archive, rename the campaign export headers
//! to warehouse column names, and hand back the table plus a timestamped CSV.

pub mod archive;
pub mod artifact;
pub mod error;
pub mod process;
pub mod rename;
pub mod report;
pub mod table;

#[cfg(test)]
mod testutil;

pub use error::{Error, Result};
pub use process::{process, Pipeline, ProcessOptions, ProcessedResult, Summary};
pub use rename::{rename_headers, RenameMap};
pub use table::{Field, Table};
