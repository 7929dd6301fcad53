use crate::bins::coordinate_to_bins;
use crate::config::{BinParams, RunConfig, REFERENCE_NAME_TAG};
use crate::data::bed::NamedInterval;
use crate::data::record::{TagLabel, TaggedRecord};
use count_table::table::CountTable;

/// Sample identity of a record, one label per sample tag
#[derive(Hash, Clone, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub struct SampleKey {
    pub parts: Vec<TagLabel>,
}

impl SampleKey {
    pub fn label(&self) -> Box<str> {
        self.parts
            .iter()
            .map(|x| x.to_string())
            .collect::<Vec<_>>()
            .join(",")
            .into_boxed_str()
    }
}

/// Feature identity of a record. A run produces keys of one variant
/// only, fixed by the feature mode of its configuration.
#[derive(Hash, Clone, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum FeatureKey {
    /// one tag value on its own, for independent feature tags
    Single(TagLabel),
    /// tuple of tag values, for joined feature tags
    Joined(Vec<TagLabel>),
    /// tag values followed by a genomic bin
    Binned {
        parts: Vec<TagLabel>,
        start: i64,
        end: i64,
    },
    /// tag values followed by a named counting interval
    Interval {
        parts: Vec<TagLabel>,
        start: i64,
        end: i64,
        name: Box<str>,
    },
}

impl FeatureKey {
    /// Row label columns, arity matching `RunConfig::feature_level_names`
    pub fn label_parts(&self) -> Vec<Box<str>> {
        fn labels(parts: &[TagLabel]) -> Vec<Box<str>> {
            parts.iter().map(|x| x.clone().into()).collect()
        }

        match self {
            FeatureKey::Single(x) => vec![x.clone().into()],
            FeatureKey::Joined(parts) => labels(parts),
            FeatureKey::Binned { parts, start, end } => {
                let mut out = labels(parts);
                out.push(start.to_string().into_boxed_str());
                out.push(end.to_string().into_boxed_str());
                out
            }
            FeatureKey::Interval {
                parts,
                start,
                end,
                name,
            } => {
                let mut out = labels(parts);
                out.push(start.to_string().into_boxed_str());
                out.push(end.to_string().into_boxed_str());
                out.push(name.clone());
                out
            }
        }
    }
}

/// Per-record facts resolved from the reader rather than the record
/// itself.
#[derive(Default, Clone, Copy)]
pub struct AssignContext<'a> {
    /// reference sequence name of the record's contig
    pub reference_name: Option<&'a str>,
    /// reference sequence length, bounding genomic bins
    pub reference_length: Option<i64>,
    /// interval the record was fetched from, in interval counting
    pub interval: Option<&'a NamedInterval>,
}

/// Resolve one tag name against a record. The reference-name
/// pseudo-tag reads the contig name instead of an alignment tag.
pub fn tag_label(record: &impl TaggedRecord, tag: &str, context: &AssignContext) -> TagLabel {
    if tag == REFERENCE_NAME_TAG {
        return match context.reference_name {
            Some(name) => TagLabel::Value(name.into()),
            None => TagLabel::Missing,
        };
    }

    record.tag(tag).into()
}

fn tag_labels(
    record: &impl TaggedRecord,
    tags: &[Box<str>],
    context: &AssignContext,
) -> Vec<TagLabel> {
    tags.iter()
        .map(|tag| tag_label(record, tag, context))
        .collect()
}

/// Feature keys of one record, empty when the record cannot be
/// assigned. Binning is all or nothing: an unreadable coordinate or
/// any bin outside `[0, reference length)` drops every key.
pub fn feature_keys(
    record: &impl TaggedRecord,
    config: &RunConfig,
    context: &AssignContext,
) -> Vec<FeatureKey> {
    if let Some(bin) = &config.bin {
        return binned_keys(record, config, bin, context);
    }

    if config.bed_file.is_some() {
        let Some(interval) = context.interval else {
            return Vec::new();
        };
        return vec![FeatureKey::Interval {
            parts: tag_labels(record, &config.feature_tags, context),
            start: interval.start,
            end: interval.stop,
            name: interval.name.clone(),
        }];
    }

    if config.join_features {
        vec![FeatureKey::Joined(tag_labels(
            record,
            &config.feature_tags,
            context,
        ))]
    } else {
        config
            .feature_tags
            .iter()
            .map(|tag| FeatureKey::Single(tag_label(record, tag, context)))
            .collect()
    }
}

fn binned_keys(
    record: &impl TaggedRecord,
    config: &RunConfig,
    bin: &BinParams,
    context: &AssignContext,
) -> Vec<FeatureKey> {
    let Some(position) = record.tag(&bin.tag).and_then(|x| x.as_int()) else {
        return Vec::new();
    };

    let bins = coordinate_to_bins(position, bin.size, bin.increment);
    if bins.is_empty() {
        return Vec::new();
    }

    if !bin.keep_over_bounds {
        let Some(reference_length) = context.reference_length else {
            return Vec::new();
        };
        let violates = bins
            .iter()
            .any(|(start, end)| *start < 0 || *end > reference_length);
        if violates {
            return Vec::new();
        }
    }

    let parts = tag_labels(record, &config.feature_tags, context);

    bins.into_iter()
        .map(|(start, end)| FeatureKey::Binned {
            parts: parts.clone(),
            start,
            end,
        })
        .collect()
}

/// Add one record's weight to the table under every feature key it
/// resolves to. Returns whether anything was assigned.
pub fn assign_record(
    record: &impl TaggedRecord,
    config: &RunConfig,
    context: &AssignContext,
    weight: f64,
    table: &mut CountTable<SampleKey, FeatureKey>,
) -> bool {
    let features = feature_keys(record, config, context);
    if features.is_empty() {
        return false;
    }

    let sample = SampleKey {
        parts: tag_labels(record, &config.sample_tags, context),
    };

    for key in features {
        table.increment(sample.clone(), key, weight);
    }

    true
}
