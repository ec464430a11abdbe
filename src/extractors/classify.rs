// src/extractors/classify.rs

/// Labeling sections tracked per date-block, in output column order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum SectionKind {
    BoxedWarning,
    Contraindications,
    WarningsAndPrecautions,
    AdverseReactions,
    DrugInteractions,
    UseInSpecificPopulations,
    /// Patient Counseling Information / Patient Information / Medication Guide.
    PciOrPiOrMg,
}

impl SectionKind {
    pub const ALL: [SectionKind; 7] = [
        SectionKind::BoxedWarning,
        SectionKind::Contraindications,
        SectionKind::WarningsAndPrecautions,
        SectionKind::AdverseReactions,
        SectionKind::DrugInteractions,
        SectionKind::UseInSpecificPopulations,
        SectionKind::PciOrPiOrMg,
    ];

    /// Column title used in the output table.
    pub fn title(self) -> &'static str {
        match self {
            SectionKind::BoxedWarning => "Boxed Warning",
            SectionKind::Contraindications => "Contraindications",
            SectionKind::WarningsAndPrecautions => "Warnings and Precautions",
            SectionKind::AdverseReactions => "Adverse Reactions",
            SectionKind::DrugInteractions => "Drug Interactions",
            SectionKind::UseInSpecificPopulations => "Use in Specific Populations",
            SectionKind::PciOrPiOrMg => "PCI/PI/MG",
        }
    }
}

// First hit wins. "pci" is a bare substring and must stay last.
const HEADING_KEYWORDS: [(&str, SectionKind); 8] = [
    ("boxed warning", SectionKind::BoxedWarning),
    ("contraindications", SectionKind::Contraindications),
    ("warnings and precautions", SectionKind::WarningsAndPrecautions),
    ("adverse reactions", SectionKind::AdverseReactions),
    ("drug interactions", SectionKind::DrugInteractions),
    ("use in specific populations", SectionKind::UseInSpecificPopulations),
    ("patient counseling information", SectionKind::PciOrPiOrMg),
    ("pci", SectionKind::PciOrPiOrMg),
];

/// Maps a section heading to its kind, or `None` for headings outside the vocabulary.
pub fn classify(heading: &str) -> Option<SectionKind> {
    let normalized = heading.trim().to_lowercase();
    HEADING_KEYWORDS
        .iter()
        .find(|(keyword, _)| normalized.contains(keyword))
        .map(|&(_, kind)| kind)
}
