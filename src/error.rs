//! Error kinds raised by the extraction-and-rename pipeline.
//!
//! Every variant is terminal for the invocation that produced it: nothing is
//! retried and no partial table escapes.

use thiserror::Error;
use zip::result::ZipError;

#[derive(Debug, Error)]
pub enum Error {
    /// The input bytes are not a readable zip container, or an entry inside
    /// it could not be decompressed.
    #[error("not a valid zip archive: {0}")]
    ArchiveFormat(#[from] ZipError),

    /// The archive holds no entry whose name ends in `.csv`.
    #[error("no CSV files found in the ZIP archive")]
    NoTabularFileFound,

    /// The selected entry has no header row or could not be decoded as text.
    #[error("malformed CSV: {0}")]
    MalformedTable(String),

    /// Writing the processed table back out failed.
    #[error("failed to serialize table: {0}")]
    Serialize(String),
}

pub type Result<T> = std::result::Result<T, Error>;
