use std::collections::{HashMap, HashSet};

use anyhow::Context;
use csv::{ReaderBuilder, StringRecord};
use serde::Deserialize;
use tracing::{debug, instrument, warn};

use super::{Field, Table};
use crate::error::{Error, Result};

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// How to turn entry bytes into text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DecodePolicy {
    /// UTF-8, falling back to Latin-1 when the bytes are not valid UTF-8.
    #[default]
    Lossy,
    /// UTF-8 only; anything else is a malformed table.
    Strict,
}

/// Parse comma-separated bytes with the default [`DecodePolicy`].
pub fn parse_table(bytes: &[u8]) -> Result<Table> {
    parse_table_with(bytes, DecodePolicy::default())
}

/// Parse comma-separated bytes into a [`Table`].
///
/// The first non-blank line is the header. Blank header cells become
/// `Unnamed: <index>` and repeats get `.1`, `.2`, ... suffixes. Short rows are
/// padded, long rows truncated to the header width, blank lines skipped.
#[instrument(level = "debug", skip(bytes), fields(len = bytes.len()))]
pub fn parse_table_with(bytes: &[u8], policy: DecodePolicy) -> Result<Table> {
    let text = decode(bytes, policy)?;
    if text.trim().is_empty() {
        return Err(Error::MalformedTable(
            "file is empty, no header row".to_string(),
        ));
    }

    read_records(&text).map_err(|e| Error::MalformedTable(format!("{e:#}")))
}

fn decode(bytes: &[u8], policy: DecodePolicy) -> Result<String> {
    let bytes = bytes.strip_prefix(UTF8_BOM).unwrap_or(bytes);
    match std::str::from_utf8(bytes) {
        Ok(s) => Ok(s.to_string()),
        Err(e) => match policy {
            DecodePolicy::Strict => Err(Error::MalformedTable(format!(
                "content is not valid UTF-8: {e}"
            ))),
            DecodePolicy::Lossy => {
                warn!(error = %e, "content is not valid UTF-8, decoding as Latin-1");
                Ok(bytes.iter().map(|&b| char::from(b)).collect())
            }
        },
    }
}

fn read_records(text: &str) -> anyhow::Result<Table> {
    let mut rdr = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(text.as_bytes());

    let header = rdr.headers().context("reading header row")?.clone();
    let columns = normalize_headers(&header);
    let width = columns.len();

    let mut rows = Vec::new();
    for (idx, result) in rdr.records().enumerate() {
        let record = result.with_context(|| format!("CSV parse error at record {}", idx + 1))?;
        if record.len() > width {
            debug!(
                record = idx + 1,
                fields = record.len(),
                width,
                "truncating row longer than header"
            );
        }
        let row: Vec<Field> = record.iter().take(width).map(Field::infer).collect();
        rows.push(row);
    }

    Ok(Table::new(columns, rows))
}

/// Name blank header cells and make repeated names unique.
fn normalize_headers(header: &StringRecord) -> Vec<String> {
    let mut seen: HashSet<String> = HashSet::with_capacity(header.len());
    let mut counters: HashMap<String, usize> = HashMap::new();
    let mut out = Vec::with_capacity(header.len());

    for (idx, raw) in header.iter().enumerate() {
        let base = if raw.is_empty() {
            format!("Unnamed: {idx}")
        } else {
            raw.to_string()
        };

        let mut name = base.clone();
        if seen.contains(&name) {
            let n = counters.entry(base.clone()).or_insert(0);
            while seen.contains(&name) {
                *n += 1;
                name = format!("{base}.{n}");
            }
        }
        seen.insert(name.clone());
        out.push(name);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Result;

    fn cols(t: &Table) -> Vec<&str> {
        t.columns().iter().map(String::as_str).collect()
    }

    #[test]
    fn header_defines_columns_and_rows_follow() -> Result<()> {
        let t = parse_table(b"Campaign Id,Campaign Name,Sent\n101,Spring,2500\n102,\"Summer, hot\",3.5\n")?;
        assert_eq!(cols(&t), ["Campaign Id", "Campaign Name", "Sent"]);
        assert_eq!(t.num_rows(), 2);
        assert_eq!(t.get(0, "Campaign Id"), Some(&Field::Int(101)));
        assert_eq!(
            t.get(1, "Campaign Name"),
            Some(&Field::Text("Summer, hot".into()))
        );
        assert_eq!(t.get(1, "Sent"), Some(&Field::Float(3.5)));
        Ok(())
    }

    #[test]
    fn header_only_file_has_no_rows() -> Result<()> {
        let t = parse_table(b"a,b,c")?;
        assert_eq!(t.num_columns(), 3);
        assert_eq!(t.num_rows(), 0);
        Ok(())
    }

    #[test]
    fn empty_content_is_malformed() {
        for input in [&b""[..], &b"\n\n"[..], &b"  \r\n"[..], UTF8_BOM] {
            let err = parse_table(input).unwrap_err();
            assert!(matches!(err, Error::MalformedTable(_)), "got {err:?}");
        }
    }

    #[test]
    fn short_rows_padded_long_rows_truncated() -> Result<()> {
        let t = parse_table(b"a,b,c\n1\n1,2,3,4,5\n")?;
        assert_eq!(t.rows()[0], vec![Field::Int(1), Field::Empty, Field::Empty]);
        assert_eq!(t.rows()[1], vec![Field::Int(1), Field::Int(2), Field::Int(3)]);
        Ok(())
    }

    #[test]
    fn blank_lines_are_not_rows() -> Result<()> {
        let t = parse_table(b"a,b\n1,2\n\n3,4\n\n")?;
        assert_eq!(t.num_rows(), 2);
        Ok(())
    }

    #[test]
    fn quoted_newlines_and_quotes_survive() -> Result<()> {
        let t = parse_table(b"note,n\n\"line one\nline two\",1\n\"say \"\"hi\"\"\",2\n")?;
        assert_eq!(t.num_rows(), 2);
        assert_eq!(t.rows()[0][0], Field::Text("line one\nline two".into()));
        assert_eq!(t.rows()[1][0], Field::Text("say \"hi\"".into()));
        Ok(())
    }

    #[test]
    fn blank_and_duplicate_headers_are_normalized() -> Result<()> {
        let t = parse_table(b"Sent,,Sent,Sent.1,Sent\n1,2,3,4,5\n")?;
        assert_eq!(
            cols(&t),
            ["Sent", "Unnamed: 1", "Sent.1", "Sent.1.1", "Sent.2"]
        );
        Ok(())
    }

    #[test]
    fn bom_is_stripped_from_first_header() -> Result<()> {
        let mut bytes = UTF8_BOM.to_vec();
        bytes.extend_from_slice(b"Campaign Id,Sent\n1,2\n");
        let t = parse_table(&bytes)?;
        assert_eq!(cols(&t), ["Campaign Id", "Sent"]);
        Ok(())
    }

    #[test]
    fn crlf_line_endings() -> Result<()> {
        let t = parse_table(b"a,b\r\n1,x\r\n")?;
        assert_eq!(cols(&t), ["a", "b"]);
        assert_eq!(t.rows()[0][1], Field::Text("x".into()));
        Ok(())
    }

    #[test]
    fn invalid_utf8_depends_on_policy() -> Result<()> {
        let bytes = b"name\ncaf\xE9\n";

        let lossy = parse_table_with(bytes, DecodePolicy::Lossy)?;
        assert_eq!(lossy.rows()[0][0], Field::Text("caf\u{e9}".into()));

        let err = parse_table_with(bytes, DecodePolicy::Strict).unwrap_err();
        assert!(matches!(err, Error::MalformedTable(_)), "got {err:?}");
        Ok(())
    }
}
