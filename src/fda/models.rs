// src/fda/models.rs
use std::path::Path;

use csv::StringRecord;

use crate::utils::error::StorageError;

// Older exports title the drug column `Drug`, newer ones `Drug Name`.
const DRUG_COLUMNS: [&str; 2] = ["Drug", "Drug Name"];
const APPLICATION_NUMBER_COLUMN: &str = "Application Number";
const LINK_COLUMN: &str = "Link";

/// One row of the Safety-related Labeling Changes export.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InputRecord {
    pub drug: String,
    pub application_number: String,
    pub link: String,
}

impl InputRecord {
    pub fn has_link(&self) -> bool {
        !self.link.trim().is_empty()
    }
}

/// Positions of the columns we read, resolved once from the header row.
#[derive(Debug, Clone, Copy)]
struct ColumnIndex {
    drug: Option<usize>,
    application_number: Option<usize>,
    link: Option<usize>,
}

impl ColumnIndex {
    fn from_headers(headers: &StringRecord) -> Self {
        let position = |name: &str| headers.iter().position(|h| h == name);
        Self {
            drug: DRUG_COLUMNS.iter().find_map(|&name| position(name)),
            application_number: position(APPLICATION_NUMBER_COLUMN),
            link: position(LINK_COLUMN),
        }
    }

    /// Missing columns and cells past the end of a short row read as "".
    fn record(&self, row: &StringRecord) -> InputRecord {
        let cell = |idx: Option<usize>| {
            idx.and_then(|i| row.get(i)).unwrap_or_default().to_string()
        };
        InputRecord {
            drug: cell(self.drug),
            application_number: cell(self.application_number),
            link: cell(self.link),
        }
    }
}

/// Reads every row of the input table. Extra columns are ignored and short
/// rows are padded with empty cells. A row the CSV reader cannot decode is
/// logged and skipped; only an unreadable file or header fails the load.
pub fn load_input_records<P: AsRef<Path>>(path: P) -> Result<Vec<InputRecord>, StorageError> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::Headers)
        .from_path(path.as_ref())?;

    let columns = ColumnIndex::from_headers(reader.headers()?);
    if columns.link.is_none() {
        tracing::warn!("{} has no `{}` column; every row will be skipped", path.as_ref().display(), LINK_COLUMN);
    }

    let mut records = Vec::new();
    let mut unreadable = 0;
    for result in reader.records() {
        match result {
            Ok(row) => records.push(columns.record(&row)),
            Err(e) => {
                tracing::warn!("Skipping unreadable input row: {}", e);
                unreadable += 1;
            }
        }
    }

    tracing::info!(
        "Loaded {} input rows from {} ({} unreadable)",
        records.len(),
        path.as_ref().display(),
        unreadable
    );
    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn reads_rows_with_either_drug_header() {
        let dir = tempfile::TempDir::new().unwrap();

        let old = dir.path().join("old.csv");
        fs::write(&old, "Drug,Application Number,Link\nAspirin,NDA-1,https://example.test/1\n").unwrap();
        let rows = load_input_records(&old).unwrap();
        assert_eq!(rows[0].drug, "Aspirin");
        assert_eq!(rows[0].link, "https://example.test/1");

        let new = dir.path().join("new.csv");
        fs::write(
            &new,
            "Drug Name,Active Ingredient,Application Number,Link\n\"Tylenol, Extra\",acetaminophen,NDA-2,https://example.test/2\n",
        )
        .unwrap();
        let rows = load_input_records(&new).unwrap();
        assert_eq!(rows[0].drug, "Tylenol, Extra");
        assert_eq!(rows[0].application_number, "NDA-2");
    }

    #[test]
    fn missing_link_column_defaults_to_empty() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("rows.csv");
        fs::write(&path, "Drug,Application Number\nAspirin,NDA-1\n").unwrap();

        let rows = load_input_records(&path).unwrap();
        assert_eq!(rows.len(), 1);
        assert!(!rows[0].has_link());
    }

    #[test]
    fn short_rows_and_blank_links_are_kept_but_linkless() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("rows.csv");
        fs::write(&path, "Drug,Application Number,Link\nA,1,   \nB,2\nC,3,https://x.test\n").unwrap();

        let rows = load_input_records(&path).unwrap();
        let linked: Vec<bool> = rows.iter().map(InputRecord::has_link).collect();
        assert_eq!(linked, vec![false, false, true]);
    }

    #[test]
    fn short_row_does_not_lose_its_neighbours() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("rows.csv");
        fs::write(
            &path,
            "Drug,Application Number,Link\nA,1,https://x.test/a\nB,2\nC,3,https://x.test/c\n",
        )
        .unwrap();

        let rows = load_input_records(&path).unwrap();
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0].link, "https://x.test/a");
        assert_eq!(
            rows[1],
            InputRecord { drug: "B".into(), application_number: "2".into(), link: String::new() }
        );
        assert_eq!(rows[2].drug, "C");
        assert_eq!(rows[2].link, "https://x.test/c");
    }

    #[test]
    fn undecodable_row_is_skipped() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("rows.csv");
        let mut bytes = b"Drug,Application Number,Link\nA,1,https://x.test/a\n".to_vec();
        bytes.extend_from_slice(b"B,2,\xff\xfe\n");
        bytes.extend_from_slice(b"C,3,https://x.test/c\n");
        fs::write(&path, bytes).unwrap();

        let rows = load_input_records(&path).unwrap();
        let drugs: Vec<&str> = rows.iter().map(|r| r.drug.as_str()).collect();
        assert_eq!(drugs, vec!["A", "C"]);
    }

    #[test]
    fn missing_file_is_reported_as_csv_error() {
        let err = load_input_records("/definitely/not/here.csv").unwrap_err();
        assert!(matches!(err, StorageError::Csv(_)));
    }
}
