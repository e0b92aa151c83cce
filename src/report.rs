use crate::{process::Summary, table::Table};

/// Render `table` as a left-aligned text grid with a separator under the
/// header. Embedded line breaks are shown as `\n`.
pub fn render_table(table: &Table) -> String {
    let cells: Vec<Vec<String>> = table
        .rows()
        .iter()
        .map(|row| row.iter().map(|f| f.to_string().replace('\n', "\\n")).collect())
        .collect();

    let mut widths: Vec<usize> = table.columns().iter().map(|c| c.chars().count()).collect();
    for row in &cells {
        for (w, cell) in widths.iter_mut().zip(row) {
            *w = (*w).max(cell.chars().count());
        }
    }

    let mut out = String::new();
    push_line(&mut out, table.columns(), &widths);
    let rule: Vec<String> = widths.iter().map(|&w| "-".repeat(w)).collect();
    push_line(&mut out, &rule, &widths);
    for row in &cells {
        push_line(&mut out, row, &widths);
    }
    out
}

fn push_line(out: &mut String, cells: &[String], widths: &[usize]) {
    let line = cells
        .iter()
        .zip(widths)
        .map(|(c, &w)| format!("{c:<w$}"))
        .collect::<Vec<_>>()
        .join(" | ");
    out.push_str(line.trim_end());
    out.push('\n');
}

/// `1234567` → `1,234,567`.
pub fn group_thousands(n: usize) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

pub fn render_summary(summary: &Summary) -> String {
    format!(
        "Source file:     {}\n\
         Output file:     {}\n\
         Total rows:      {}\n\
         Total columns:   {}\n\
         Rows processed:  {}\n\
         Columns renamed: {}\n",
        summary.source_entry,
        summary.filename,
        summary.rows,
        summary.columns,
        group_thousands(summary.rows),
        summary.renamed,
    )
}
