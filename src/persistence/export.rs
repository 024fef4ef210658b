//! Flat CSV export.

use std::fs::OpenOptions;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::PipelineResult;
use crate::record::Transaction;

const HEADER: [&str; 6] = ["id", "date", "description", "institution", "type", "amount"];

/// Writes transactions to a CSV file as `id,date,description,institution,type,amount`.
///
/// Dates are written as `%Y-%m-%d` and amounts with two decimals.
#[derive(Debug, Clone)]
pub struct CsvExport {
    path: PathBuf,
}

impl CsvExport {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Write `records`. When `append` is false the file is truncated and a header row written
    /// first; when true, rows are appended with no header.
    pub fn write<'a, I>(&self, records: I, append: bool) -> PipelineResult<usize>
    where
        I: IntoIterator<Item = &'a Transaction>,
    {
        let file = OpenOptions::new()
            .create(true)
            .write(true)
            .append(append)
            .truncate(!append)
            .open(&self.path)?;
        let mut wtr = csv::WriterBuilder::new().has_headers(false).from_writer(file);

        if !append {
            wtr.write_record(HEADER)?;
        }

        let mut written = 0usize;
        for t in records {
            wtr.write_record([
                t.identity(),
                t.date.format("%Y-%m-%d").to_string(),
                t.description.clone(),
                t.institution.clone(),
                t.kind.clone(),
                format!("{:.2}", t.amount),
            ])?;
            written += 1;
        }
        wtr.flush()?;

        debug!(path = %self.path.display(), written, append, "exported transactions");
        Ok(written)
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use chrono::NaiveDate;

    use super::CsvExport;
    use crate::record::Transaction;

    fn refund() -> Transaction {
        let date = NaiveDate::from_ymd_opt(2024, 4, 2).unwrap().and_hms_opt(13, 5, 0).unwrap();
        Transaction::new(date, "Refund, partial", "Amex", "credit", 19.999)
    }

    #[test]
    fn overwrite_writes_header_then_rows() {
        let dir = tempfile::tempdir().unwrap();
        let export = CsvExport::new(dir.path().join("out.csv"));

        assert_eq!(export.write(&[refund()], false).unwrap(), 1);
        let text = fs::read_to_string(export.path()).unwrap();
        let lines = text.lines().collect::<Vec<_>>();
        assert_eq!(lines[0], "id,date,description,institution,type,amount");
        assert_eq!(
            lines[1],
            format!("{},2024-04-02,\"Refund, partial\",Amex,credit,20.00", refund().identity())
        );
    }

    #[test]
    fn append_adds_rows_without_header() {
        let dir = tempfile::tempdir().unwrap();
        let export = CsvExport::new(dir.path().join("out.csv"));

        export.write(&[refund()], false).unwrap();
        export.write(&[refund(), refund()], true).unwrap();
        let text = fs::read_to_string(export.path()).unwrap();
        assert_eq!(text.lines().count(), 4);
        assert_eq!(text.matches("id,date").count(), 1);

        export.write(&[refund()], false).unwrap();
        assert_eq!(fs::read_to_string(export.path()).unwrap().lines().count(), 2);
    }
}
