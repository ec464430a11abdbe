// src/extractors/pipeline.rs
use crate::extractors::document::Document;
use crate::extractors::record::{self, OutputRecord};
use crate::extractors::section;
use crate::extractors::subject;
use crate::utils::error::ExtractError;

const PREVIEW_CHARS: usize = 60;

/// Extracts every dated labeling change from one label page.
///
/// Pure and self-contained: the parsed tree lives only for this call. A page
/// with no date-blocks yields `Ok(vec![])`; only input that cannot be a label
/// page at all is an error, and callers treat that as zero records.
pub fn extract(document_bytes: &[u8]) -> Result<Vec<OutputRecord>, ExtractError> {
    let source = String::from_utf8_lossy(document_bytes);

    if source.trim().is_empty() {
        return Err(ExtractError::EmptyDocument);
    }
    if !source.contains('<') {
        let preview: String = source.trim().chars().take(PREVIEW_CHARS).collect();
        return Err(ExtractError::NotHtml(preview));
    }

    let document = Document::parse(&source);
    if !document.has_content() {
        return Err(ExtractError::EmptyDocument);
    }
    tracing::debug!("Parsed document ({} recovered markup errors)", document.parse_error_count());

    let subject = subject::resolve(&document);
    if subject.is_empty() {
        tracing::debug!("Records from this page will carry an empty subject");
    }

    let records: Vec<OutputRecord> = section::segment(&document)
        .iter()
        .map(|block| {
            let sections = section::accumulate(&document, block.content_root);
            tracing::debug!(
                "Block '{}': {} of {} sections present",
                block.date,
                sections.present_count(),
                sections.iter().count()
            );
            record::build(&subject, block, sections)
        })
        .collect();

    Ok(records)
}
