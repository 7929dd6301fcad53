/// Commonly used alignment tags and their meanings, shown by the
/// `tags` report. A mix of SAM-standard tags and single-cell
/// pipeline conventions.
pub const KNOWN_TAGS: &[(&str, &str)] = &[
    ("SM", "sample name"),
    ("LY", "library name"),
    ("RG", "read group"),
    ("BC", "raw sample barcode sequence"),
    ("CB", "corrected cell barcode"),
    ("CR", "raw cell barcode sequence"),
    ("RX", "molecular identifier sequence"),
    ("MI", "molecule identifier"),
    ("GX", "gene identifier"),
    ("GN", "gene name"),
    ("NH", "number of reported alignments"),
    ("HI", "query hit index"),
    ("AS", "alignment score"),
    ("NM", "edit distance to the reference"),
    ("MD", "mismatching positions string"),
    ("MQ", "mapping quality of the mate"),
    ("XA", "alternative hits reported by the aligner"),
    ("SA", "supplementary alignment records"),
    ("DS", "assigned site coordinate"),
    ("RC", "duplicate rank within the molecule"),
    ("RZ", "recognized restriction site sequence"),
];

pub fn describe(tag: &str) -> Option<&'static str> {
    KNOWN_TAGS
        .iter()
        .find(|(name, _)| *name == tag)
        .map(|(_, description)| *description)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_tags_resolve_and_unknown_do_not() {
        assert_eq!(describe("SM"), Some("sample name"));
        assert_eq!(describe("DS"), Some("assigned site coordinate"));
        assert_eq!(describe("ZZ"), None);
    }

    #[test]
    fn dictionary_entries_are_well_formed() {
        let mut seen = std::collections::HashSet::new();
        for (tag, description) in KNOWN_TAGS {
            assert_eq!(tag.len(), 2);
            assert!(!description.is_empty());
            assert!(seen.insert(tag));
        }
    }
}
