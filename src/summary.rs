use crate::sink::ExportRow;
use crate::tally::Tally;
use indexmap::IndexMap;
use std::fmt;
use std::io::Read;

/// Per main folder and overall totals of an export, in the order the main
/// folders first appear.
#[derive(Debug, Default, PartialEq)]
pub struct ExportSummary {
    pub folders: IndexMap<String, Tally>,
    pub total: Tally,
}

impl ExportSummary {
    pub fn from_rows<'a>(rows: impl IntoIterator<Item = &'a ExportRow>) -> Self {
        let mut summary = ExportSummary::default();
        for row in rows {
            summary.add(row);
        }
        summary
    }

    /// Reads back an exported CSV file.
    pub fn read<R: Read>(input: R) -> csv::Result<Self> {
        let rows = csv::Reader::from_reader(input)
            .deserialize()
            .collect::<csv::Result<Vec<ExportRow>>>()?;
        Ok(Self::from_rows(&rows))
    }

    fn add(&mut self, row: &ExportRow) {
        self.folders
            .entry(row.main_folder.clone())
            .or_default()
            .add_kb(row.size_kb);
        self.total.add_kb(row.size_kb);
    }
}

impl fmt::Display for ExportSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Exported folder statistics:")?;
        for (folder, tally) in &self.folders {
            let folder = if folder.is_empty() { "(mailbox root)" } else { folder.as_str() };
            writeln!(
                f,
                "Main Folder: {} | Emails: {} | Total size: {:.2} MB",
                folder,
                tally.count,
                tally.size_mb()
            )?;
        }
        write!(
            f,
            "Total exported emails: {} | Overall size: {:.2} MB",
            self.total.count,
            self.total.size_mb()
        )
    }
}
