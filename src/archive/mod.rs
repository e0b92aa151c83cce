// src/archive/mod.rs
use std::io::{Cursor, Read};

use tracing::{debug, info, instrument};
use zip::{result::ZipError, ZipArchive};

use crate::error::{Error, Result};

/// Suffix (compared case-insensitively) that marks an entry as tabular data.
pub const TABULAR_EXTENSION: &str = ".csv";

/// One file pulled out of an archive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveEntry {
    /// Path of the entry as stored in the archive.
    pub name: String,
    /// Decompressed bytes.
    pub content: Vec<u8>,
}

/// Read-only view over an in-memory zip container.
pub struct Archive<'a> {
    inner: ZipArchive<Cursor<&'a [u8]>>,
    input_len: u64,
}

impl<'a> Archive<'a> {
    /// Parse the central directory of `bytes`. Anything that is not a zip
    /// container fails with [`Error::ArchiveFormat`].
    pub fn open(bytes: &'a [u8]) -> Result<Self> {
        let inner = ZipArchive::new(Cursor::new(bytes))?;
        debug!(entries = inner.len(), "opened archive");
        Ok(Self {
            inner,
            input_len: bytes.len() as u64,
        })
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.len() == 0
    }

    /// Entry names in central-directory order. Position `i` in the returned
    /// list is the index accepted by [`Archive::read_entry`].
    pub fn entry_names(&mut self) -> Result<Vec<String>> {
        let mut names = Vec::with_capacity(self.inner.len());
        for i in 0..self.inner.len() {
            // raw access: listing must not require decrypting or inflating
            let entry = self.inner.by_index_raw(i)?;
            names.push(entry.name().to_string());
        }
        Ok(names)
    }

    /// Decompress the entry at `index` into memory.
    pub fn read_entry(&mut self, index: usize) -> Result<ArchiveEntry> {
        let mut entry = self.inner.by_index(index)?;
        let name = entry.name().to_string();
        // the declared size is untrusted; only use it as a hint bounded by the input
        let hint = entry.size().min(self.input_len);
        let mut content = Vec::with_capacity(hint as usize);
        entry.read_to_end(&mut content).map_err(ZipError::from)?;
        Ok(ArchiveEntry { name, content })
    }

    /// Pick the data file according to [`first_tabular_entry`] and extract it.
    /// Only one entry is ever read, however many qualify.
    pub fn select_entry(&mut self) -> Result<ArchiveEntry> {
        let names = self.entry_names()?;
        let index = first_tabular_entry(names.iter().map(String::as_str))
            .ok_or(Error::NoTabularFileFound)?;
        let entry = self.read_entry(index)?;
        info!(entry = %entry.name, bytes = entry.content.len(), "found CSV file");
        Ok(entry)
    }
}

/// Case-insensitive suffix test against [`TABULAR_EXTENSION`].
pub fn is_tabular(name: &str) -> bool {
    name.to_lowercase().ends_with(TABULAR_EXTENSION)
}

/// Selection policy: the first name in listing order that [`is_tabular`].
///
/// Later matches are ignored. Directory entries end in `/` and so never match.
pub fn first_tabular_entry<'n, I>(names: I) -> Option<usize>
where
    I: IntoIterator<Item = &'n str>,
{
    names.into_iter().position(is_tabular)
}

/// Open `bytes`, extract the selected data file, and release the archive
/// before returning on every path.
#[instrument(level = "info", skip(bytes), fields(len = bytes.len()))]
pub fn extract_first_csv(bytes: &[u8]) -> Result<ArchiveEntry> {
    let mut archive = Archive::open(bytes)?;
    let entry = archive.select_entry();
    drop(archive);
    entry
}
