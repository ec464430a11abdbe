// src/storage/mod.rs
use std::fs::{self, File, OpenOptions};
use std::path::{Path, PathBuf};

use clap::ValueEnum;

use crate::batch::{BatchSummary, RecordSink};
use crate::extractors::{OutputRecord, SectionKind};
use crate::utils::error::StorageError;

const SUBJECT_COLUMNS: [&str; 3] = ["Drug", "Application Number", "Date"];
const PRESENT_MARK: &str = "x";

/// Which per-section columns the output table carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ColumnLayout {
    /// One presence column per section.
    Presence,
    /// A presence column and a `<Section> Content` column per section.
    #[value(name = "content")]
    PresenceAndContent,
}

impl ColumnLayout {
    pub fn header(self) -> Vec<String> {
        let mut columns: Vec<String> = SUBJECT_COLUMNS.iter().map(|c| c.to_string()).collect();
        for kind in SectionKind::ALL {
            columns.push(kind.title().to_string());
            if self == ColumnLayout::PresenceAndContent {
                columns.push(format!("{} Content", kind.title()));
            }
        }
        columns
    }

    pub fn row(self, record: &OutputRecord) -> Vec<String> {
        let mut cells = vec![
            record.subject.name.clone(),
            record.subject.application_number.clone(),
            record.date.clone(),
        ];
        for section in record.sections.iter() {
            cells.push(if section.present { PRESENT_MARK } else { "" }.to_string());
            if self == ColumnLayout::PresenceAndContent {
                cells.push(section.text.clone());
            }
        }
        cells
    }
}

/// Append-only CSV output. The header is written once, when the file is new
/// or empty; every row is flushed as soon as it is written.
pub struct CsvSink {
    writer: csv::Writer<File>,
    layout: ColumnLayout,
    path: PathBuf,
}

impl CsvSink {
    pub fn open<P: AsRef<Path>>(path: P, layout: ColumnLayout) -> Result<Self, StorageError> {
        let path = path.as_ref().to_path_buf();

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                fs::create_dir_all(parent).map_err(StorageError::IoError)?;
            }
        }

        let needs_header = fs::metadata(&path).map(|m| m.len() == 0).unwrap_or(true);
        if !needs_header {
            warn_on_header_mismatch(&path, layout)?;
        }

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .map_err(StorageError::IoError)?;
        let mut writer = csv::WriterBuilder::new().has_headers(false).from_writer(file);

        if needs_header {
            writer.write_record(layout.header())?;
            writer.flush()?;
            tracing::info!("Created {} with {:?} columns", path.display(), layout);
        } else {
            tracing::info!("Appending to existing {}", path.display());
        }

        Ok(Self { writer, layout, path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl RecordSink for CsvSink {
    fn append(&mut self, record: &OutputRecord) -> Result<(), StorageError> {
        self.writer.write_record(self.layout.row(record))?;
        self.writer.flush()?;
        Ok(())
    }
}

fn warn_on_header_mismatch(path: &Path, layout: ColumnLayout) -> Result<(), StorageError> {
    let mut reader = csv::ReaderBuilder::new().flexible(true).from_path(path)?;
    let existing: Vec<String> = reader.headers()?.iter().map(str::to_string).collect();
    if existing != layout.header() {
        tracing::warn!(
            "{} has {} columns that differ from the {:?} layout; rows will not line up with its header",
            path.display(),
            existing.len(),
            layout
        );
    }
    Ok(())
}

/// Writes the run summary as pretty JSON.
pub fn save_run_summary(path: &Path, summary: &BatchSummary, output: &Path) -> Result<(), StorageError> {
    let document = serde_json::json!({
        "output": output.display().to_string(),
        "summary": summary,
        "completed_at": chrono::Utc::now().to_rfc3339(),
    });

    let text = serde_json::to_string_pretty(&document)
        .map_err(|e| StorageError::SerializationError(e.to_string()))?;
    fs::write(path, text).map_err(StorageError::IoError)?;

    tracing::info!("Saved run summary to {}", path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extractors::section::{fold_spans, ClassifiedSpan};
    use crate::extractors::subject::Subject;

    fn record(date: &str) -> OutputRecord {
        OutputRecord {
            subject: Subject { name: "Drug X".into(), application_number: "123456".into() },
            date: date.into(),
            sections: fold_spans(vec![
                ClassifiedSpan { kind: SectionKind::BoxedWarning, text: "Risk, \"serious\"".into() },
                ClassifiedSpan { kind: SectionKind::PciOrPiOrMg, text: String::new() },
            ]),
        }
    }

    #[test]
    fn presence_layout_columns() {
        let header = ColumnLayout::Presence.header();
        assert_eq!(header.len(), 10);
        assert_eq!(&header[..4], &["Drug", "Application Number", "Date", "Boxed Warning"]);
        assert_eq!(header[9], "PCI/PI/MG");

        let row = ColumnLayout::Presence.row(&record("06/28/2023"));
        assert_eq!(row, vec!["Drug X", "123456", "06/28/2023", "x", "", "", "", "", "", "x"]);
    }

    #[test]
    fn content_layout_interleaves_text_columns() {
        let header = ColumnLayout::PresenceAndContent.header();
        assert_eq!(header.len(), 17);
        assert_eq!(header[3], "Boxed Warning");
        assert_eq!(header[4], "Boxed Warning Content");
        assert_eq!(header[16], "PCI/PI/MG Content");

        let row = ColumnLayout::PresenceAndContent.row(&record("06/28/2023"));
        assert_eq!(row.len(), 17);
        assert_eq!(row[3], "x");
        assert_eq!(row[4], "Risk, \"serious\"");
        assert_eq!(row[15], "x");
        assert_eq!(row[16], "");
    }

    #[test]
    fn header_written_once_across_reopens() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("nested").join("out.csv");

        let mut sink = CsvSink::open(&path, ColumnLayout::Presence).unwrap();
        sink.append(&record("01/01/2024")).unwrap();
        drop(sink);

        let mut sink = CsvSink::open(&path, ColumnLayout::Presence).unwrap();
        sink.append(&record("02/02/2024")).unwrap();
        assert_eq!(sink.path(), path.as_path());
        drop(sink);

        let text = fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("Drug,Application Number,Date,Boxed Warning"));
        assert!(lines[1].contains("01/01/2024"));
        assert!(lines[2].contains("02/02/2024"));
    }

    #[test]
    fn cells_with_commas_and_quotes_are_quoted() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("out.csv");

        let mut sink = CsvSink::open(&path, ColumnLayout::PresenceAndContent).unwrap();
        sink.append(&record("06/28/2023")).unwrap();
        drop(sink);

        let mut reader = csv::Reader::from_path(&path).unwrap();
        let rows: Vec<csv::StringRecord> = reader.records().map(|r| r.unwrap()).collect();
        assert_eq!(rows.len(), 1);
        assert_eq!(&rows[0][4], "Risk, \"serious\"");
    }

    #[test]
    fn empty_existing_file_gets_a_header() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("out.csv");
        fs::write(&path, "").unwrap();

        drop(CsvSink::open(&path, ColumnLayout::Presence).unwrap());
        let text = fs::read_to_string(&path).unwrap();
        assert!(text.starts_with("Drug,"));
    }

    #[test]
    fn summary_is_pretty_json() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("run.summary.json");
        let summary = BatchSummary { input_rows: 3, attempted: 2, records_written: 5, ..BatchSummary::default() };

        save_run_summary(&path, &summary, Path::new("out.csv")).unwrap();

        let value: serde_json::Value = serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(value["summary"]["records_written"], 5);
        assert_eq!(value["summary"]["attempted"], 2);
        assert_eq!(value["output"], "out.csv");
        assert!(value["completed_at"].is_string());
    }
}
