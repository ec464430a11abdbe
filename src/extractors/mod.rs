// src/extractors/mod.rs
pub mod classify;
pub mod document;
pub mod pipeline;
pub mod record;
pub mod section;
pub mod subject;

// Re-export key extraction types for convenience
pub use classify::SectionKind;
pub use pipeline::extract;
pub use record::OutputRecord;
