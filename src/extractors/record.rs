// src/extractors/record.rs
use crate::extractors::section::{DateBlock, SectionTable};
use crate::extractors::subject::Subject;

/// One output row: a dated labeling change for a subject.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputRecord {
    pub subject: Subject,
    pub date: String,
    pub sections: SectionTable,
}

/// Assembles a record once a block's sections are fully accumulated.
pub fn build(subject: &Subject, block: &DateBlock, sections: SectionTable) -> OutputRecord {
    OutputRecord {
        subject: subject.clone(),
        date: block.date.clone(),
        sections,
    }
}
