use csv::{QuoteStyle, Terminator, WriterBuilder};
use tracing::instrument;

use super::Table;
use crate::error::{Error, Result};

/// Render `table` as comma-separated text: header row, then one line per row,
/// each terminated by `\n`. Fields are quoted only when they contain a comma,
/// a quote or a line break.
#[instrument(level = "debug", skip(table), fields(rows = table.num_rows(), cols = table.num_columns()))]
pub fn to_csv(table: &Table) -> Result<String> {
    let mut wtr = WriterBuilder::new()
        .quote_style(QuoteStyle::Necessary)
        .terminator(Terminator::Any(b'\n'))
        .from_writer(Vec::new());

    wtr.write_record(table.columns())
        .map_err(|e| Error::Serialize(e.to_string()))?;
    for row in table.rows() {
        wtr.write_record(row.iter().map(|f| f.to_string()))
            .map_err(|e| Error::Serialize(e.to_string()))?;
    }

    let bytes = wtr
        .into_inner()
        .map_err(|e| Error::Serialize(e.to_string()))?;
    String::from_utf8(bytes).map_err(|e| Error::Serialize(e.to_string()))
}
