use crate::assign::{assign_record, AssignContext, FeatureKey, SampleKey};
use crate::common::*;
use crate::config::{BinParams, ConfigError, RunConfig, DEFAULT_BIN_TAG, DEFAULT_SAMPLE_TAG};
use crate::data::bed::read_intervals;
use crate::data::util_htslib::*;
use crate::filter::should_count;
use crate::weight::record_weight;

use count_table::matrix::LabeledMatrix;
use count_table::table::CountTable;
use rayon::ThreadPoolBuilder;
use rust_htslib::bam::{self, Read};

const LOG_EVERY: usize = 1_000_000;

#[derive(Args, Debug)]
pub struct CountArgs {
    #[arg(
        short = 'i',
        long = "bam",
        value_delimiter = ',',
        required = true,
        help = "Tag-annotated BAM files to count.",
        long_help = "Comma-separated list of tag-annotated BAM files. \n\
		     All files are counted into one matrix. \n\
		     Example: lib1.bam,lib2.bam"
    )]
    bam_files: Vec<Box<str>>,

    #[arg(
        short = 'o',
        long,
        required = true,
        help = "Output matrix file",
        long_help = "Output matrix file. A `.parquet` suffix selects the \n\
		     columnar format; anything else is written as CSV, \n\
		     gzip-compressed when the name ends with `.gz`. \n\
		     Example: counts.csv.gz"
    )]
    output: Box<str>,

    #[arg(
        short = 'f',
        long = "feature-tags",
        value_delimiter = ',',
        help = "Tags counted independently, one key per tag",
        long_help = "Comma-separated tags counted independently: every tag \n\
		     of a record contributes its own row. \n\
		     Example: GX,DA"
    )]
    feature_tags: Vec<Box<str>>,

    #[arg(
        short = 'F',
        long = "joined-feature-tags",
        value_delimiter = ',',
        help = "Tags joined into one key per record",
        long_help = "Comma-separated tags joined into a single tuple row key. \n\
		     Required for binning and interval counting. \n\
		     The pseudo-tag `chrom` reads the contig name. \n\
		     Example: chrom,GX"
    )]
    joined_feature_tags: Vec<Box<str>>,

    #[arg(
        short = 's',
        long = "sample-tags",
        value_delimiter = ',',
        default_value = DEFAULT_SAMPLE_TAG,
        help = "Tags identifying the sample (column) of a record",
        long_help = "Comma-separated tags identifying the sample of a record. \n\
		     Multiple tags label one column joined by commas. \n\
		     Example: SM,LY"
    )]
    sample_tags: Vec<Box<str>>,

    #[arg(
        long = "bin-size",
        help = "Bin the coordinate in --bin-tag into windows of this size",
        long_help = "Bin the coordinate carried by --bin-tag into genomic \n\
		     windows of this size, keying rows on (start, end). \n\
		     Example: 250000"
    )]
    bin_size: Option<i64>,

    #[arg(
        long = "sliding-increment",
        help = "Step between bin starts (default: the bin size)",
        long_help = "Step between bin starts. A value below the bin size \n\
		     produces overlapping windows and a record lands in \n\
		     every window containing its coordinate."
    )]
    sliding_increment: Option<i64>,

    #[arg(
        long = "bin-tag",
        default_value = DEFAULT_BIN_TAG,
        help = "Tag carrying the coordinate to bin",
        long_help = "Tag carrying the genomic coordinate to bin. \n\
		     Removed from the joined feature tags when binning."
    )]
    bin_tag: Box<str>,

    #[arg(
        long = "keep-over-bounds",
        default_value_t = false,
        help = "Keep bins reaching outside the reference sequence",
        long_help = "Keep bins that start below zero or end past the \n\
		     reference sequence end. Without this flag a record \n\
		     touching such a bin is not assigned at all."
    )]
    keep_over_bounds: bool,

    #[arg(
        long = "bed",
        help = "Count reads overlapping intervals from this BED file",
        long_help = "Count reads overlapping intervals from this BED file \n\
		     instead of scanning whole files. Rows are keyed on \n\
		     (tags..., start, end, name); a missing name column \n\
		     falls back to the chr:start-stop locus."
    )]
    bed_file: Option<Box<str>>,

    #[arg(
        long = "min-mapq",
        default_value_t = 0,
        help = "Minimum mapping quality",
        long_help = "Minimum mapping quality; records below are skipped."
    )]
    min_mapq: u8,

    #[arg(
        long = "divide-multimapping",
        default_value_t = false,
        help = "Divide weight over reported alignment sites",
        long_help = "Divide a record's weight over its reported alignment \n\
		     sites, from the XA list when present and the NH \n\
		     count otherwise."
    )]
    divide_multimapping: bool,

    #[arg(
        long = "whole-fragments",
        default_value_t = false,
        help = "Count every record as a whole fragment",
        long_help = "Count every record as one whole fragment instead of \n\
		     half a fragment per mate of a pair."
    )]
    do_not_divide_fragments: bool,

    #[arg(
        long = "dedup",
        default_value_t = false,
        help = "Keep only duplicate-rank-one records (RC tag)",
        long_help = "Keep only records whose duplicate rank (RC tag) equals \n\
		     one, counting each molecule once."
    )]
    dedup: bool,

    #[arg(
        long = "filter-alt-hits",
        default_value_t = false,
        help = "Skip reads with alternative hits beyond _alt contigs",
        long_help = "Skip reads whose XA list reports an alternative hit on \n\
		     any contig not ending in `_alt`."
    )]
    filter_alt_hits: bool,

    #[arg(
        long,
        help = "Stop interval counting after this many records",
        long_help = "Stop interval counting once this many records have been \n\
		     seen across all files, checked after each interval. \n\
		     Useful for quick previews of large runs."
    )]
    head: Option<usize>,

    #[arg(
        long = "no-names",
        default_value_t = false,
        help = "Blank the row label column names in the output",
        long_help = "Blank the row label column names in the output header, \n\
		     keeping the labels themselves."
    )]
    no_names: bool,

    #[arg(
        long,
        default_value_t = 16,
        help = "Maximum number of threads",
        long_help = "Maximum number of threads to use for parallel processing. \n\
		     Choose the right number in HPC environments."
    )]
    max_threads: usize,

    #[arg(
        long,
        short,
        help = "verbosity",
        long_help = "Enable verbose output `RUST_LOG=info`"
    )]
    verbose: bool,
}

/// Counts seen and assigned while scanning alignment files
#[derive(Default, Debug, Clone, Copy)]
pub struct RunStats {
    /// records read, before any filter
    pub processed: usize,
    /// records that contributed weight to at least one cell
    pub assigned: usize,
}

fn build_config(args: &CountArgs) -> Result<RunConfig, ConfigError> {
    if !args.feature_tags.is_empty() && !args.joined_feature_tags.is_empty() {
        return Err(ConfigError::ConflictingFeatureTags);
    }

    let (mut feature_tags, join_features) = if !args.feature_tags.is_empty() {
        (args.feature_tags.clone(), false)
    } else {
        (args.joined_feature_tags.clone(), true)
    };

    let bin = args.bin_size.map(|size| BinParams {
        size,
        increment: args.sliding_increment.unwrap_or(size),
        tag: args.bin_tag.clone(),
        keep_over_bounds: args.keep_over_bounds,
    });

    if bin.is_some() {
        feature_tags.retain(|tag| tag.as_ref() != args.bin_tag.as_ref());
    }

    let config = RunConfig {
        feature_tags,
        join_features,
        sample_tags: args.sample_tags.clone(),
        bin,
        bed_file: args.bed_file.clone(),
        min_mapq: args.min_mapq,
        divide_multimapping: args.divide_multimapping,
        do_not_divide_fragments: args.do_not_divide_fragments,
        dedup: args.dedup,
        filter_alt_hits: args.filter_alt_hits,
        head: args.head,
    };

    config.validate()?;
    Ok(config)
}

/// Count tag-annotated alignments into a weighted sample-by-feature
/// matrix and write it out.
///
pub fn run_count(args: &CountArgs) -> anyhow::Result<()> {
    if args.verbose {
        std::env::set_var("RUST_LOG", "info");
    }
    env_logger::init();

    let config = build_config(args)?;

    let max_threads = num_cpus::get().min(args.max_threads);

    ThreadPoolBuilder::new()
        .num_threads(max_threads)
        .build_global()?;

    info!("will use {} threads", rayon::current_num_threads());

    let (table, stats) = count_alignment_files(&args.bam_files, &config)?;

    info!(
        "assigned {} of {} records into {} samples and {} nonzero cells",
        stats.assigned,
        stats.processed,
        table.num_samples(),
        table.num_entries()
    );

    let matrix = dense_matrix(&table, &config);
    matrix.write(&args.output, !args.no_names)?;

    info!("done -> {}", args.output);
    Ok(())
}

/// Count every record of `bam_files` under `config`, whole files or
/// BED intervals depending on the configuration.
pub fn count_alignment_files(
    bam_files: &[Box<str>],
    config: &RunConfig,
) -> anyhow::Result<(CountTable<SampleKey, FeatureKey>, RunStats)> {
    if bam_files.is_empty() {
        return Err(ConfigError::MissingInputFiles.into());
    }

    match &config.bed_file {
        Some(bed_file) => count_intervals(bam_files, bed_file, config),
        None => count_whole_files(bam_files, config),
    }
}

/// Count `bam_files` under `config` and pivot straight into a labeled
/// matrix, for in-process consumers.
pub fn count_matrix(
    bam_files: &[Box<str>],
    config: &RunConfig,
) -> anyhow::Result<(LabeledMatrix, RunStats)> {
    let (table, stats) = count_alignment_files(bam_files, config)?;
    Ok((dense_matrix(&table, config), stats))
}

/// Pivot a count table into an exportable labeled matrix with sorted
/// axes.
pub fn dense_matrix(
    table: &CountTable<SampleKey, FeatureKey>,
    config: &RunConfig,
) -> LabeledMatrix {
    let dense = table.to_dense();

    LabeledMatrix {
        index_names: config.feature_level_names(),
        row_labels: dense.features.iter().map(|key| key.label_parts()).collect(),
        column_labels: dense.samples.iter().map(|key| key.label()).collect(),
        values: dense.values,
    }
}

fn count_whole_files(
    bam_files: &[Box<str>],
    config: &RunConfig,
) -> anyhow::Result<(CountTable<SampleKey, FeatureKey>, RunStats)> {
    let results = bam_files
        .par_iter()
        .progress_count(bam_files.len() as u64)
        .map(|bam_file| count_one_file(bam_file, config))
        .collect::<anyhow::Result<Vec<_>>>()?;

    let mut table = CountTable::new();
    let mut stats = RunStats::default();

    for (partial, partial_stats) in results {
        table.merge(partial);
        stats.processed += partial_stats.processed;
        stats.assigned += partial_stats.assigned;
    }

    Ok((table, stats))
}

fn count_one_file(
    bam_file: &str,
    config: &RunConfig,
) -> anyhow::Result<(CountTable<SampleKey, FeatureKey>, RunStats)> {
    let mut reader = bam::Reader::from_path(bam_file)?;
    let header = reader.header().clone();
    let reference = reference_table(&header)?;

    let mut table = CountTable::new();
    let mut stats = RunStats::default();

    for result in reader.records() {
        let record = result?;
        stats.processed += 1;

        if stats.processed % LOG_EVERY == 0 {
            info!(
                "{} records from {}, {} assigned",
                stats.processed, bam_file, stats.assigned
            );
        }

        if !should_count(&record, config) {
            continue;
        }

        let context = reference_context(&reference, record.tid());
        let weight = record_weight(&record, config);

        if assign_record(&record, config, &context, weight, &mut table) {
            stats.assigned += 1;
        }
    }

    Ok((table, stats))
}

fn count_intervals(
    bam_files: &[Box<str>],
    bed_file: &str,
    config: &RunConfig,
) -> anyhow::Result<(CountTable<SampleKey, FeatureKey>, RunStats)> {
    let intervals = read_intervals(bed_file)?;
    info!("{} intervals from {}", intervals.len(), bed_file);

    for bam_file in bam_files.iter() {
        check_bam_index(bam_file, None)?;
    }

    let mut table = CountTable::new();
    let mut stats = RunStats::default();

    'files: for bam_file in bam_files.iter() {
        info!("counting {} over {} intervals", bam_file, intervals.len());

        let mut reader = bam::IndexedReader::from_path(&**bam_file)?;
        let header = reader.header().clone();
        let reference = reference_table(&header)?;

        for interval in intervals.iter().progress_count(intervals.len() as u64) {
            reader.fetch((interval.chr.as_ref(), interval.start, interval.stop))?;

            for result in reader.records() {
                let record = result?;
                stats.processed += 1;

                if !should_count(&record, config) {
                    continue;
                }

                let mut context = reference_context(&reference, record.tid());
                context.interval = Some(interval);
                let weight = record_weight(&record, config);

                if assign_record(&record, config, &context, weight, &mut table) {
                    stats.assigned += 1;
                }
            }

            // cumulative cap, checked on interval boundaries
            if let Some(head) = config.head {
                if stats.processed >= head {
                    info!("record cap {} reached", head);
                    break 'files;
                }
            }
        }
    }

    Ok((table, stats))
}

fn reference_context<'a>(reference: &'a [(Box<str>, i64)], tid: i32) -> AssignContext<'a> {
    if tid < 0 {
        return AssignContext::default();
    }

    match reference.get(tid as usize) {
        Some((name, len)) => AssignContext {
            reference_name: Some(name.as_ref()),
            reference_length: Some(*len),
            interval: None,
        },
        None => AssignContext::default(),
    }
}
