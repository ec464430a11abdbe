// src/extractors/subject.rs
use once_cell::sync::Lazy;
use regex::Regex;
use scraper::Selector;

use crate::extractors::document::Document;

static SUBJECT_HEADING_SELECTOR: Lazy<Selector> = Lazy::new(|| {
    Selector::parse("h3").expect("Failed to compile SUBJECT_HEADING_SELECTOR")
});

static APPLICATION_NUMBER_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(NDA|BLA)-(\d+)").expect("Failed to compile APPLICATION_NUMBER_RE")
});

/// Drug and application a label page is about.
/// Both fields are empty when the page names no NDA/BLA application.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Subject {
    pub name: String,
    pub application_number: String,
}

impl Subject {
    pub fn is_empty(&self) -> bool {
        self.name.is_empty() && self.application_number.is_empty()
    }
}

/// Resolves the subject from the first `h3` mentioning `NDA-` or `BLA-`.
pub fn resolve(document: &Document) -> Subject {
    let heading = document
        .select(&SUBJECT_HEADING_SELECTOR)
        .into_iter()
        .map(|h| document.text_content(h))
        .find(|text| text.contains("NDA-") || text.contains("BLA-"));

    match heading {
        Some(text) => {
            tracing::debug!("Subject heading: {}", text);
            parse_subject_heading(&text)
        }
        None => {
            tracing::debug!("No NDA/BLA heading found; subject left empty");
            Subject::default()
        }
    }
}

/// `"Drug X (NDA-123456)"` -> name `"Drug X"`, application number `"123456"`.
fn parse_subject_heading(text: &str) -> Subject {
    let name = text.split(" (").next().unwrap_or_default().trim().to_string();
    let application_number = APPLICATION_NUMBER_RE
        .captures(text)
        .and_then(|caps| caps.get(2))
        .map(|m| m.as_str().to_string())
        .unwrap_or_default();

    Subject { name, application_number }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_name_and_application_number() {
        let doc = Document::parse("<h3>Drug X (NDA-123456)</h3>");
        assert_eq!(
            resolve(&doc),
            Subject { name: "Drug X".to_string(), application_number: "123456".to_string() }
        );
    }

    #[test]
    fn accepts_biologics_and_nested_markup() {
        let doc = Document::parse("<h3>  Keytruda <span>(BLA-125514)</span></h3>");
        let subject = resolve(&doc);
        assert_eq!(subject.name, "Keytruda");
        assert_eq!(subject.application_number, "125514");
    }

    #[test]
    fn first_matching_heading_wins() {
        let doc = Document::parse(
            "<h3>Search results</h3><h3>Alpha (NDA-000111)</h3><h3>Beta (NDA-000222)</h3>",
        );
        assert_eq!(resolve(&doc).name, "Alpha");
        assert_eq!(resolve(&doc).application_number, "000111");
    }

    #[test]
    fn missing_heading_yields_empty_subject() {
        let doc = Document::parse("<h3>Safety Labeling Changes</h3><h2>NDA-999</h2>");
        let subject = resolve(&doc);
        assert!(subject.is_empty());
        assert_eq!(subject, Subject::default());
    }

    #[test]
    fn heading_without_parenthesis_keeps_full_name() {
        let subject = parse_subject_heading("Drug Y NDA-42");
        assert_eq!(subject.name, "Drug Y NDA-42");
        assert_eq!(subject.application_number, "42");
    }

    #[test]
    fn marker_without_digits_leaves_number_empty() {
        let subject = parse_subject_heading("Drug Z (NDA-pending)");
        assert_eq!(subject.name, "Drug Z");
        assert_eq!(subject.application_number, "");
    }
}
