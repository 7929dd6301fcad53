use crate::config::{RunConfig, ALT_HITS_TAG, DUPLICATE_RANK_TAG};
use crate::data::record::{TagValue, TaggedRecord};

/// True when a record passes every record-level gate and should
/// contribute weight to the counts.
pub fn should_count(record: &impl TaggedRecord, config: &RunConfig) -> bool {
    if record.mapping_quality() < config.min_mapq {
        return false;
    }

    if config.filter_alt_hits && has_foreign_alt_hits(record) {
        return false;
    }

    if record.is_unmapped() {
        return false;
    }

    if config.dedup {
        let rank = record
            .tag(DUPLICATE_RANK_TAG)
            .and_then(|x| x.as_whole_int());
        if rank != Some(1) {
            return false;
        }
    }

    true
}

/// True when any alternative hit lands outside the `_alt` contigs.
/// Empty hit descriptors occur in the wild and are ignored.
pub fn has_foreign_alt_hits(record: &impl TaggedRecord) -> bool {
    let hits = match record.tag(ALT_HITS_TAG) {
        Some(TagValue::Text(x)) => x,
        _ => return false,
    };

    hits.split(';').filter(|hit| !hit.is_empty()).any(|hit| {
        let chrom = hit.split_once(',').map_or(hit, |(chrom, _)| chrom);
        !chrom.ends_with("_alt")
    })
}
