//! Console table and CSV export for compatibility results

use crate::brewfile::Kind;
use crate::check::CompatibilityRow;
use crate::compat::Status;
use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::io::{Read, Write};
use std::path::Path;

/// File name used by `--export`
pub const EXPORT_FILE: &str = "compatibility.csv";

const HEADERS: [&str; 3] = ["Kind", "Formula", "Status"];

/// Render rows as a left-aligned, bordered table.
///
/// ```text
/// +--------+---------+-----------+
/// | Kind   | Formula | Status    |
/// +--------+---------+-----------+
/// | Bottle | wget    | Supported |
/// +--------+---------+-----------+
/// ```
///
/// Status cells are colored when `colored` has colorization enabled.
pub fn render_table(rows: &[CompatibilityRow]) -> String {
    let mut widths = HEADERS.map(str::len);
    for row in rows {
        widths[0] = widths[0].max(row.kind.as_str().len());
        widths[1] = widths[1].max(row.name.chars().count());
        widths[2] = widths[2].max(row.status.as_str().len());
    }

    let border = format!(
        "+{}+\n",
        widths
            .iter()
            .map(|w| "-".repeat(w + 2))
            .collect::<Vec<_>>()
            .join("+")
    );

    let mut out = String::new();
    out.push_str(&border);
    out.push_str(&format!(
        "| {:<w0$} | {:<w1$} | {:<w2$} |\n",
        HEADERS[0],
        HEADERS[1],
        HEADERS[2],
        w0 = widths[0],
        w1 = widths[1],
        w2 = widths[2],
    ));
    out.push_str(&border);

    for row in rows {
        // Pad by hand: escape codes would throw off the formatter's width
        let status_pad = " ".repeat(widths[2] - row.status.as_str().len());
        out.push_str(&format!(
            "| {:<w0$} | {:<w1$} | {}{} |\n",
            row.kind.as_str(),
            row.name,
            row.status.colored(),
            status_pad,
            w0 = widths[0],
            w1 = widths[1],
        ));
    }

    if !rows.is_empty() {
        out.push_str(&border);
    }

    out
}

#[derive(Debug, Serialize, Deserialize)]
struct CsvRecord {
    kind: Kind,
    formula: String,
    status: Status,
}

/// Write rows as CSV with a `kind,formula,status` header and every field quoted
pub fn write_csv<W: Write>(rows: &[CompatibilityRow], writer: W) -> Result<()> {
    let mut wtr = csv::WriterBuilder::new()
        .quote_style(csv::QuoteStyle::Always)
        .from_writer(writer);

    for row in rows {
        wtr.serialize(CsvRecord {
            kind: row.kind,
            formula: row.name.clone(),
            status: row.status,
        })?;
    }

    // An empty report still gets its header line
    if rows.is_empty() {
        wtr.write_record(["kind", "formula", "status"])?;
    }

    wtr.flush()?;
    Ok(())
}

/// Read rows back from a CSV export
pub fn read_csv<R: Read>(reader: R) -> Result<Vec<CompatibilityRow>> {
    let mut rdr = csv::Reader::from_reader(reader);
    let mut rows = Vec::new();

    for record in rdr.deserialize() {
        let record: CsvRecord = record?;
        rows.push(CompatibilityRow {
            kind: record.kind,
            name: record.formula,
            status: record.status,
        });
    }

    Ok(rows)
}

/// Write the export file, replacing any previous one
pub fn export(rows: &[CompatibilityRow], path: &Path) -> Result<()> {
    let file = std::fs::File::create(path)?;
    write_csv(rows, std::io::BufWriter::new(file))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_rows() -> Vec<CompatibilityRow> {
        vec![
            CompatibilityRow {
                kind: Kind::Bottle,
                name: "wget".to_string(),
                status: Status::Supported,
            },
            CompatibilityRow {
                kind: Kind::Bottle,
                name: "gnu-sed".to_string(),
                status: Status::NoInfo,
            },
            CompatibilityRow {
                kind: Kind::Application,
                name: "docker".to_string(),
                status: Status::Unknown,
            },
        ]
    }

    #[test]
    fn test_render_table_layout() {
        colored::control::set_override(false);
        let table = render_table(&sample_rows());
        let lines: Vec<&str> = table.lines().collect();

        assert_eq!(lines.len(), 7);
        assert_eq!(lines[0], "+-------------+---------+-----------+");
        assert_eq!(lines[1], "| Kind        | Formula | Status    |");
        assert_eq!(lines[3], "| Bottle      | wget    | Supported |");
        assert_eq!(lines[4], "| Bottle      | gnu-sed | No info   |");
        assert_eq!(lines[5], "| Application | docker  | Unknown   |");
        assert_eq!(lines[6], lines[0]);
    }

    #[test]
    fn test_render_empty_table() {
        colored::control::set_override(false);
        let table = render_table(&[]);
        assert_eq!(table.lines().count(), 3);
        assert!(table.contains("| Kind | Formula | Status |"));
    }

    #[test]
    fn test_csv_format() {
        let mut buf = Vec::new();
        write_csv(&sample_rows(), &mut buf).unwrap();
        let text = String::from_utf8(buf).unwrap();

        assert_eq!(
            text,
            "\"kind\",\"formula\",\"status\"\n\
             \"Bottle\",\"wget\",\"Supported\"\n\
             \"Bottle\",\"gnu-sed\",\"No info\"\n\
             \"Application\",\"docker\",\"Unknown\"\n"
        );
    }

    #[test]
    fn test_csv_round_trip_preserves_order() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join(EXPORT_FILE);
        let rows = sample_rows();

        export(&rows, &path).unwrap();
        let read_back = read_csv(std::fs::File::open(&path).unwrap()).unwrap();

        assert_eq!(read_back, rows);
    }

    #[test]
    fn test_csv_empty_report_has_header() {
        let mut buf = Vec::new();
        write_csv(&[], &mut buf).unwrap();
        assert_eq!(String::from_utf8(buf).unwrap(), "\"kind\",\"formula\",\"status\"\n");
        assert!(read_csv(&b"\"kind\",\"formula\",\"status\"\n"[..]).unwrap().is_empty());
    }

    #[test]
    fn test_read_csv_rejects_unknown_status() {
        let data = "kind,formula,status\nBottle,wget,Maybe\n";
        assert!(read_csv(data.as_bytes()).is_err());
    }
}
