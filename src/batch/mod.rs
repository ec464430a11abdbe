// src/batch/mod.rs
use std::path::Path;

use async_trait::async_trait;
use serde::Serialize;

use crate::extractors::{self, OutputRecord};
use crate::fda::InputRecord;
use crate::utils::error::{FetchError, StorageError};
use crate::utils::html_debug;

/// Where label pages come from. The HTTP client implements it; tests stub it.
#[async_trait]
pub trait DocumentSource: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<Vec<u8>, FetchError>;

    /// Waits between consecutive fetches.
    async fn pace(&self);
}

/// Destination for extracted records, written in order.
pub trait RecordSink {
    fn append(&mut self, record: &OutputRecord) -> Result<(), StorageError>;
}

/// Counts reported at the end of a run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BatchSummary {
    pub input_rows: usize,
    pub attempted: usize,
    pub skipped: usize,
    pub unavailable: usize,
    pub malformed: usize,
    pub records_written: usize,
}

/// Processes `rows` strictly in order.
///
/// A row's fetch or extraction failure is logged and counted; the run moves
/// on. Only a sink failure stops the batch, since every later row would be lost too.
pub async fn run_batch<S, K>(
    source: &S,
    rows: &[InputRecord],
    sink: &mut K,
    debug_dir: Option<&Path>,
) -> Result<BatchSummary, StorageError>
where
    S: DocumentSource + ?Sized,
    K: RecordSink + ?Sized,
{
    let mut summary = BatchSummary { input_rows: rows.len(), ..BatchSummary::default() };
    let last_linked = rows.iter().rposition(InputRecord::has_link);

    for (index, row) in rows.iter().enumerate() {
        if !row.has_link() {
            tracing::debug!("[{}/{}] Skipping {} ({}): no link", index + 1, rows.len(), row.drug, row.application_number);
            summary.skipped += 1;
            continue;
        }

        let link = row.link.trim();
        tracing::info!("[{}/{}] Processing {} ({}) => {}", index + 1, rows.len(), row.drug, row.application_number, link);
        summary.attempted += 1;

        match source.fetch(link).await {
            Ok(page) => {
                let records = match extractors::extract(&page) {
                    Ok(records) => records,
                    Err(e) => {
                        tracing::error!("Error processing URL {}: {}", link, e);
                        summary.malformed += 1;
                        Vec::new()
                    }
                };

                if records.is_empty() {
                    if let Some(dir) = debug_dir {
                        save_debug_artefacts(dir, index, &page);
                    }
                }

                for record in &records {
                    sink.append(record)?;
                }
                summary.records_written += records.len();
                tracing::info!("Wrote {} records for {}", records.len(), link);
            }
            Err(e) => {
                tracing::warn!("Failed to retrieve URL {}: {}", link, e);
                summary.unavailable += 1;
            }
        }

        if Some(index) != last_linked {
            source.pace().await;
        }
    }

    tracing::info!(
        "Batch finished: {} records written from {} of {} rows ({} skipped, {} unavailable, {} malformed)",
        summary.records_written,
        summary.attempted,
        summary.input_rows,
        summary.skipped,
        summary.unavailable,
        summary.malformed
    );
    Ok(summary)
}

/// Keeps the raw page and an annotated copy of any page that produced no records.
fn save_debug_artefacts(dir: &Path, index: usize, page: &[u8]) {
    let html = String::from_utf8_lossy(page);
    let raw_path = dir.join(format!("row_{:05}_raw.html", index + 1));
    let annotated_path = dir.join(format!("row_{:05}_annotated.html", index + 1));

    if let Err(e) = std::fs::create_dir_all(dir).and_then(|_| std::fs::write(&raw_path, page)) {
        tracing::warn!("Failed to save raw page {}: {}", raw_path.display(), e);
        return;
    }
    if let Err(e) = html_debug::create_debug_html(&html, &annotated_path, html_debug::LABEL_PAGE_PATTERNS) {
        tracing::warn!("Failed to create debug HTML: {}", e);
    } else {
        tracing::info!("Saved debug pages for row {} to {}", index + 1, dir.display());
    }
}
