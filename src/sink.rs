use serde::{Deserialize, Serialize};
use std::io::Write;

/// Format of the `Date Received` column.
pub const DATE_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

pub const HEADER: [&str; 6] = [
    "Subject",
    "Date Received",
    "Size (KB)",
    "Size (MB)",
    "Folder",
    "Main Folder",
];

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ExportRow {
    #[serde(rename = "Subject")]
    pub subject: String,
    #[serde(rename = "Date Received")]
    pub received: String,
    #[serde(rename = "Size (KB)")]
    pub size_kb: f64,
    #[serde(rename = "Size (MB)")]
    pub size_mb: f64,
    #[serde(rename = "Folder")]
    pub folder: String,
    #[serde(rename = "Main Folder")]
    pub main_folder: String,
}

pub trait RowSink {
    fn write_row(&mut self, row: &ExportRow) -> csv::Result<()>;
}

impl RowSink for Vec<ExportRow> {
    fn write_row(&mut self, row: &ExportRow) -> csv::Result<()> {
        self.push(row.clone());
        Ok(())
    }
}

/// Writes rows as CSV. The header is written even if no row follows.
pub struct CsvSink<W: Write> {
    writer: csv::Writer<W>,
}

impl<W: Write> CsvSink<W> {
    pub fn new(output: W) -> csv::Result<Self> {
        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(output);
        writer.write_record(HEADER)?;
        Ok(CsvSink { writer })
    }

    pub fn finish(mut self) -> csv::Result<()> {
        self.writer.flush()?;
        Ok(())
    }
}

impl<W: Write> RowSink for CsvSink<W> {
    fn write_row(&mut self, row: &ExportRow) -> csv::Result<()> {
        self.writer.serialize(row)
    }
}
