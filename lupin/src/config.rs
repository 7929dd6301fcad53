use thiserror::Error;

/// default sample axis tag
pub const DEFAULT_SAMPLE_TAG: &str = "SM";
/// default tag carrying the coordinate to bin
pub const DEFAULT_BIN_TAG: &str = "DS";
/// duplicate rank tag; rank 1 marks the canonical molecule
pub const DUPLICATE_RANK_TAG: &str = "RC";
/// alternative hits, semicolon-separated locus descriptors
pub const ALT_HITS_TAG: &str = "XA";
/// number of reported alignments of a multimapping read
pub const MULTIMAP_COUNT_TAG: &str = "NH";
/// pseudo-tag resolving to the reference sequence name
pub const REFERENCE_NAME_TAG: &str = "chrom";

#[derive(Error, Debug, PartialEq, Eq)]
pub enum ConfigError {
    #[error("specify feature tags with --feature-tags, --joined-feature-tags, or --bin-size")]
    MissingFeatureTags,

    #[error("--feature-tags and --joined-feature-tags are mutually exclusive")]
    ConflictingFeatureTags,

    #[error("independent feature tags cannot drive bins or intervals; use --joined-feature-tags")]
    IndependentTagsWithRegions,

    #[error("binning and a BED interval file are mutually exclusive")]
    BinWithBed,

    #[error("interval counting requires --joined-feature-tags")]
    BedRequiresJoinedTags,

    #[error("specify at least one sample tag")]
    MissingSampleTags,

    #[error("supply at least one alignment file")]
    MissingInputFiles,

    #[error("tag names cannot be empty")]
    EmptyTagName,

    #[error("bin size and sliding increment must be positive")]
    NonPositiveBin,
}

/// Fixed-size or sliding-window binning of a tag-carried coordinate
#[derive(Debug, Clone)]
pub struct BinParams {
    pub size: i64,
    /// step between bin starts; equal to `size` for disjoint bins
    pub increment: i64,
    /// tag holding the coordinate to bin
    pub tag: Box<str>,
    /// keep bins reaching below zero or past the reference end
    pub keep_over_bounds: bool,
}

/// Immutable description of one counting run, validated once before
/// any record is read.
///
/// `feature_tags` never contains the bin tag; in bin mode the bin
/// coordinate contributes the `(start, end)` key parts instead of a
/// plain value.
#[derive(Debug, Clone)]
pub struct RunConfig {
    pub feature_tags: Vec<Box<str>>,
    /// one key per record (tuple) rather than one key per tag
    pub join_features: bool,
    pub sample_tags: Vec<Box<str>>,
    pub bin: Option<BinParams>,
    pub bed_file: Option<Box<str>>,
    pub min_mapq: u8,
    pub divide_multimapping: bool,
    pub do_not_divide_fragments: bool,
    pub dedup: bool,
    pub filter_alt_hits: bool,
    /// approximate record cap for interval counting
    pub head: Option<usize>,
}

impl RunConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.sample_tags.is_empty() {
            return Err(ConfigError::MissingSampleTags);
        }

        let all_tags = self.sample_tags.iter().chain(self.feature_tags.iter());
        for tag in all_tags {
            if tag.is_empty() {
                return Err(ConfigError::EmptyTagName);
            }
        }

        if self.bin.is_some() && self.bed_file.is_some() {
            return Err(ConfigError::BinWithBed);
        }

        if let Some(bin) = &self.bin {
            if bin.size <= 0 || bin.increment <= 0 {
                return Err(ConfigError::NonPositiveBin);
            }
            if bin.tag.is_empty() {
                return Err(ConfigError::EmptyTagName);
            }
        }

        if !self.join_features && (self.bin.is_some() || self.bed_file.is_some()) {
            return Err(ConfigError::IndependentTagsWithRegions);
        }

        if self.bed_file.is_some() && self.feature_tags.is_empty() {
            return Err(ConfigError::BedRequiresJoinedTags);
        }

        if self.feature_tags.is_empty() && self.bin.is_none() {
            return Err(ConfigError::MissingFeatureTags);
        }

        Ok(())
    }

    /// Names of the leading row-label columns in the exported matrix
    pub fn feature_level_names(&self) -> Vec<Box<str>> {
        let mut names: Vec<Box<str>> = if self.join_features {
            self.feature_tags.clone()
        } else {
            vec![self.feature_tags.join(",").into_boxed_str()]
        };

        if self.bin.is_some() {
            names.push("start".into());
            names.push("end".into());
        } else if self.bed_file.is_some() {
            names.push("start".into());
            names.push("end".into());
            names.push("bname".into());
        }

        names
    }
}
