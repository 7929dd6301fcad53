use crate::config::{RunConfig, ALT_HITS_TAG, MULTIMAP_COUNT_TAG};
use crate::data::record::{TagValue, TaggedRecord};

/// Weight a passing record adds to its `(sample, feature)` cell.
///
/// Paired records add one half each so a whole fragment sums to one,
/// unless deduplication already collapsed mates or fragment division
/// is switched off. Multimappers optionally spread their weight over
/// the reported alignment sites, preferring the alternative-hit list
/// over the alignment count tag.
pub fn record_weight(record: &impl TaggedRecord, config: &RunConfig) -> f64 {
    let mut weight = if config.do_not_divide_fragments {
        1.0
    } else if record.is_paired() && !config.dedup {
        0.5
    } else {
        1.0
    };

    if config.divide_multimapping {
        if let Some(TagValue::Text(hits)) = record.tag(ALT_HITS_TAG) {
            weight /= hits.split(';').count() as f64;
        } else if let Some(n) = record.tag(MULTIMAP_COUNT_TAG).and_then(|x| x.as_int()) {
            if n > 0 {
                weight /= n as f64;
            }
        }
    }

    weight
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DEFAULT_SAMPLE_TAG;
    use crate::testing::{sam_header, sam_record};
    use approx::assert_abs_diff_eq;

    fn config() -> RunConfig {
        RunConfig {
            feature_tags: vec!["GX".into()],
            join_features: true,
            sample_tags: vec![DEFAULT_SAMPLE_TAG.into()],
            bin: None,
            bed_file: None,
            min_mapq: 0,
            divide_multimapping: false,
            do_not_divide_fragments: false,
            dedup: false,
            filter_alt_hits: false,
            head: None,
        }
    }

    #[test]
    fn paired_records_add_half_a_fragment() -> anyhow::Result<()> {
        let header = sam_header("chr1", 10_000);
        let single = sam_record(&header, "r1\t0\tchr1\t100\t60\t4M\t*\t0\t0\tACGT\tFFFF")?;
        let paired = sam_record(&header, "r2\t99\tchr1\t100\t60\t4M\t=\t200\t104\tACGT\tFFFF")?;

        let mut conf = config();
        assert_abs_diff_eq!(record_weight(&single, &conf), 1.0);
        assert_abs_diff_eq!(record_weight(&paired, &conf), 0.5);

        conf.dedup = true;
        assert_abs_diff_eq!(record_weight(&paired, &conf), 1.0);

        conf.dedup = false;
        conf.do_not_divide_fragments = true;
        assert_abs_diff_eq!(record_weight(&paired, &conf), 1.0);
        Ok(())
    }

    #[test]
    fn alternative_hits_divide_the_weight() -> anyhow::Result<()> {
        let header = sam_header("chr1", 10_000);
        let two_sites = sam_record(
            &header,
            "r1\t0\tchr1\t100\t60\t4M\t*\t0\t0\tACGT\tFFFF\tXA:Z:chr2,+500,4M,0;chr3,-80,4M,1",
        )?;
        let trailing = sam_record(
            &header,
            "r2\t0\tchr1\t100\t60\t4M\t*\t0\t0\tACGT\tFFFF\tXA:Z:chr2,+500,4M,0;chr3,-80,4M,1;",
        )?;

        let mut conf = config();
        assert_abs_diff_eq!(record_weight(&two_sites, &conf), 1.0);

        conf.divide_multimapping = true;
        assert_abs_diff_eq!(record_weight(&two_sites, &conf), 0.5);

        // the trailing separator counts as a hit slot
        assert_abs_diff_eq!(record_weight(&trailing, &conf), 1.0 / 3.0);
        Ok(())
    }

    #[test]
    fn alignment_count_divides_when_no_alternative_hits() -> anyhow::Result<()> {
        let header = sam_header("chr1", 10_000);
        let by_count = sam_record(&header, "r1\t0\tchr1\t100\t60\t4M\t*\t0\t0\tACGT\tFFFF\tNH:i:4")?;
        let both = sam_record(
            &header,
            "r2\t0\tchr1\t100\t60\t4M\t*\t0\t0\tACGT\tFFFF\tXA:Z:chr2,+500,4M,0;\tNH:i:4",
        )?;

        let mut conf = config();
        conf.divide_multimapping = true;
        assert_abs_diff_eq!(record_weight(&by_count, &conf), 0.25);
        assert_abs_diff_eq!(record_weight(&both, &conf), 0.5);
        Ok(())
    }

    #[test]
    fn degenerate_alignment_counts_leave_the_weight_alone() -> anyhow::Result<()> {
        let header = sam_header("chr1", 10_000);
        let zero = sam_record(&header, "r1\t0\tchr1\t100\t60\t4M\t*\t0\t0\tACGT\tFFFF\tNH:i:0")?;
        let truncated =
            sam_record(&header, "r2\t0\tchr1\t100\t60\t4M\t*\t0\t0\tACGT\tFFFF\tNH:f:2.9")?;

        let mut conf = config();
        conf.divide_multimapping = true;
        assert_abs_diff_eq!(record_weight(&zero, &conf), 1.0);
        assert_abs_diff_eq!(record_weight(&truncated, &conf), 0.5);
        Ok(())
    }
}
