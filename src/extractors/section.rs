// src/extractors/section.rs

// --- Imports ---
use std::collections::BTreeMap;

use once_cell::sync::Lazy;
use scraper::Selector;

use crate::extractors::classify::{classify, SectionKind};
use crate::extractors::document::{Document, NodeHandle};

// --- CSS Selectors (Lazy Static) ---
// jQuery UI accordion markup of the safety labeling changes page.
// A selector with several classes matches elements carrying all of them.
static DATE_BLOCK_HEADING_SELECTOR: Lazy<Selector> = Lazy::new(|| {
    Selector::parse(
        "h3.background_text.accordion-header.ui-accordion-header.ui-helper-reset\
         .ui-state-default.ui-accordion-icons.ui-corner-all",
    )
    .expect("Failed to compile DATE_BLOCK_HEADING_SELECTOR")
});

static CONTENT_CONTAINER_SELECTOR: Lazy<Selector> = Lazy::new(|| {
    Selector::parse("div.ui-accordion-content.ui-helper-reset.ui-widget-content.ui-corner-bottom")
        .expect("Failed to compile CONTENT_CONTAINER_SELECTOR")
});

const SECTION_HEADING_TAG: &str = "h4";

static SECTION_HEADING_SELECTOR: Lazy<Selector> = Lazy::new(|| {
    Selector::parse(SECTION_HEADING_TAG).expect("Failed to compile SECTION_HEADING_SELECTOR")
});

// --- Data Structures ---

/// One dated labeling-change entry and the container holding its sections.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DateBlock {
    pub date: String,
    pub content_root: NodeHandle,
}

/// Presence and text of one section within a date-block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SectionRecord {
    pub kind: SectionKind,
    pub present: bool,
    pub text: String,
}

impl SectionRecord {
    fn absent(kind: SectionKind) -> Self {
        Self { kind, present: false, text: String::new() }
    }
}

/// Text collected under one classified section heading.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassifiedSpan {
    pub kind: SectionKind,
    pub text: String,
}

/// Per-block section records, always holding every [`SectionKind`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SectionTable {
    records: BTreeMap<SectionKind, SectionRecord>,
}

impl SectionTable {
    /// Every kind absent with empty text.
    pub fn empty() -> Self {
        let records = SectionKind::ALL
            .iter()
            .map(|&kind| (kind, SectionRecord::absent(kind)))
            .collect();
        Self { records }
    }

    /// Marks the span's kind present and replaces whatever text it held.
    pub fn record(&mut self, span: ClassifiedSpan) {
        self.records.insert(
            span.kind,
            SectionRecord { kind: span.kind, present: true, text: span.text },
        );
    }

    pub fn get(&self, kind: SectionKind) -> &SectionRecord {
        // Every kind is inserted by `empty()` and never removed.
        &self.records[&kind]
    }

    /// Records in column order.
    pub fn iter(&self) -> impl Iterator<Item = &SectionRecord> {
        self.records.values()
    }

    pub fn present_count(&self) -> usize {
        self.records.values().filter(|r| r.present).count()
    }
}

// --- Segmentation ---

/// Finds every date-block heading in document order and pairs it with its
/// content container. Headings without a container are dropped.
pub fn segment(document: &Document) -> Vec<DateBlock> {
    document
        .select(&DATE_BLOCK_HEADING_SELECTOR)
        .into_iter()
        .filter_map(|heading| {
            let date = document.direct_text(heading).unwrap_or_default();
            match find_content_root(document, heading) {
                Some(content_root) => Some(DateBlock { date, content_root }),
                None => {
                    tracing::warn!("Dropping date-block '{}': no content container follows it", date);
                    None
                }
            }
        })
        .collect()
}

/// Nearest following sibling that is a content container, searched no further
/// than the next date-block heading.
fn find_content_root(document: &Document, heading: NodeHandle) -> Option<NodeHandle> {
    document
        .following_siblings(heading)
        .take_while(|&sibling| !document.matches(sibling, &DATE_BLOCK_HEADING_SELECTOR))
        .find(|&sibling| document.matches(sibling, &CONTENT_CONTAINER_SELECTOR))
}

// --- Accumulation ---

/// Classifies every section heading under `content_root` and collects the
/// text of each classified heading's span, in document order.
/// Unclassified headings contribute no span, and their content is attributed
/// to no section.
pub fn classified_spans(document: &Document, content_root: NodeHandle) -> Vec<ClassifiedSpan> {
    document
        .select_within(content_root, &SECTION_HEADING_SELECTOR)
        .into_iter()
        .filter_map(|heading| {
            let heading_text = document.text_content(heading);
            match classify(&heading_text) {
                Some(kind) => Some(ClassifiedSpan { kind, text: span_text(document, heading) }),
                None => {
                    tracing::trace!("Ignoring unclassified section heading '{}'", heading_text);
                    None
                }
            }
        })
        .collect()
}

/// Text of the siblings after `heading` up to, not including, the next
/// section heading of any kind.
fn span_text(document: &Document, heading: NodeHandle) -> String {
    document
        .following_siblings(heading)
        .take_while(|&sibling| !document.is_tag(sibling, SECTION_HEADING_TAG))
        .map(|sibling| document.text_content(sibling))
        .filter(|fragment| !fragment.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Folds spans into a table in order. A later span for a kind replaces an
/// earlier one: last write wins, nothing is concatenated.
pub fn fold_spans<I>(spans: I) -> SectionTable
where
    I: IntoIterator<Item = ClassifiedSpan>,
{
    spans.into_iter().fold(SectionTable::empty(), |mut table, span| {
        table.record(span);
        table
    })
}

/// Section records for one date-block container.
pub fn accumulate(document: &Document, content_root: NodeHandle) -> SectionTable {
    fold_spans(classified_spans(document, content_root))
}
