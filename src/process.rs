// src/process.rs
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};

use crate::{
    archive::extract_first_csv,
    artifact::{artifact_name, Clock},
    error::Result,
    rename::{rename_headers, RenameMap},
    table::{parse_table_with, to_csv, DecodePolicy, Table},
};

/// Knobs for one pipeline run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ProcessOptions {
    pub decode: DecodePolicy,
    pub clock: Clock,
    /// Rows shown by [`ProcessedResult::preview`].
    pub preview_rows: usize,
}

impl Default for ProcessOptions {
    fn default() -> Self {
        Self {
            decode: DecodePolicy::default(),
            clock: Clock::default(),
            preview_rows: 5,
        }
    }
}

/// Everything produced by one successful run. Nothing is persisted.
#[derive(Debug, Clone)]
pub struct ProcessedResult {
    /// Archive entry the table was read from.
    pub source_entry: String,
    /// Header row as read, before renaming.
    pub original_columns: Vec<String>,
    pub table: Table,
    pub renamed: usize,
    pub filename: String,
    /// Full table serialised as CSV.
    pub csv: String,
    preview_rows: usize,
}

/// Counts shown to the caller after a run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Summary {
    pub source_entry: String,
    pub filename: String,
    pub rows: usize,
    pub columns: usize,
    pub renamed: usize,
}

impl ProcessedResult {
    pub fn preview(&self) -> Table {
        self.table.head(self.preview_rows)
    }

    pub fn summary(&self) -> Summary {
        Summary {
            source_entry: self.source_entry.clone(),
            filename: self.filename.clone(),
            rows: self.table.num_rows(),
            columns: self.table.num_columns(),
            renamed: self.renamed,
        }
    }

    pub fn csv_bytes(&self) -> &[u8] {
        self.csv.as_bytes()
    }
}

/// Archive bytes in, renamed CSV out.
pub struct Pipeline<'m> {
    map: &'m RenameMap,
    options: ProcessOptions,
}

impl Pipeline<'static> {
    /// Pipeline over the fixed campaign header map.
    pub fn campaign(options: ProcessOptions) -> Self {
        Pipeline::new(RenameMap::campaign(), options)
    }
}

impl<'m> Pipeline<'m> {
    pub fn new(map: &'m RenameMap, options: ProcessOptions) -> Self {
        Self { map, options }
    }

    /// Run against the configured wall clock.
    pub fn run(&self, archive: &[u8]) -> Result<ProcessedResult> {
        self.run_at(archive, self.options.clock.now())
    }

    /// Run with an explicit timestamp for the artifact name.
    #[instrument(level = "info", skip(self, archive), fields(len = archive.len()))]
    pub fn run_at(&self, archive: &[u8], now: NaiveDateTime) -> Result<ProcessedResult> {
        let entry = extract_first_csv(archive)?;
        let table = parse_table_with(&entry.content, self.options.decode)?;
        drop(entry.content);

        let original_columns = table.columns().to_vec();
        info!(columns = ?original_columns, "original columns");

        let (table, renamed) = rename_headers(table, self.map);
        info!(columns = ?table.columns(), "renamed columns");

        let csv = to_csv(&table)?;
        let filename = artifact_name(now);
        info!(
            %filename,
            rows = table.num_rows(),
            cols = table.num_columns(),
            renamed,
            "processed"
        );

        Ok(ProcessedResult {
            source_entry: entry.name,
            original_columns,
            table,
            renamed,
            filename,
            csv,
            preview_rows: self.options.preview_rows,
        })
    }
}

/// One-shot convenience over [`Pipeline::campaign`] with default options.
pub fn process(archive: &[u8]) -> Result<ProcessedResult> {
    Pipeline::campaign(ProcessOptions::default()).run(archive)
}
