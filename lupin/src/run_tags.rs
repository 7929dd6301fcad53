use crate::common::*;
use crate::data::record::decode_aux;
use crate::tag_table::{describe, KNOWN_TAGS};

use fnv::FnvHashMap;
use rust_htslib::bam::{self, Read};

#[derive(Args, Debug)]
pub struct TagsArgs {
    #[arg(
        short = 'i',
        long = "bam",
        value_delimiter = ',',
        required = true,
        help = "Alignment files to inspect",
        long_help = "Comma-separated alignment files whose records are \n\
		     scanned for tags. \n\
		     Example: lib1.bam,lib2.bam"
    )]
    bam_files: Vec<Box<str>>,

    #[arg(
        long,
        default_value_t = 1000,
        help = "Number of records to inspect per file",
        long_help = "Number of records to inspect from the start of each \n\
		     file. Tag usage is usually uniform, so a prefix \n\
		     suffices."
    )]
    head: usize,

    #[arg(
        long,
        short,
        help = "verbosity",
        long_help = "Enable verbose output `RUST_LOG=info`"
    )]
    verbose: bool,
}

#[derive(Default, Debug)]
struct TagTally {
    count: usize,
    example: Option<Box<str>>,
}

/// Report which tags occur in the input files, with counts, an
/// example value each, and known meanings.
pub fn run_tags(args: &TagsArgs) -> anyhow::Result<()> {
    if args.verbose {
        std::env::set_var("RUST_LOG", "info");
    }
    env_logger::init();

    let (observed, seen) = tally_tags(&args.bam_files, args.head)?;

    let mut observed = observed.into_iter().collect::<Vec<_>>();
    observed.sort_by(|a, b| a.0.cmp(&b.0));

    println!("tags seen in the first {} records of each file:", args.head);
    for (name, tally) in observed {
        println!(
            "  {}  x{}  e.g. {}  {}{}",
            name,
            tally.count,
            tally.example.as_deref().unwrap_or("."),
            describe(&name).unwrap_or("?"),
            if tally.count < seen {
                "  (not on every record)"
            } else {
                ""
            }
        );
    }

    println!();
    println!("known tags:");
    for (tag, description) in KNOWN_TAGS.iter() {
        println!("  {}  {}", tag, description);
    }

    Ok(())
}

/// Tag tallies over a prefix of each file, with the number of records
/// actually inspected.
fn tally_tags(
    bam_files: &[Box<str>],
    head: usize,
) -> anyhow::Result<(FnvHashMap<Box<str>, TagTally>, usize)> {
    let mut observed: FnvHashMap<Box<str>, TagTally> = FnvHashMap::default();
    let mut total = 0_usize;

    for bam_file in bam_files.iter() {
        let mut reader = bam::Reader::from_path(bam_file.as_ref())?;
        let mut seen = 0_usize;

        for result in reader.records() {
            let record = result?;

            for (name, value) in record.aux_iter().filter_map(Result::ok) {
                let name = String::from_utf8_lossy(name).into_owned().into_boxed_str();

                let tally = observed.entry(name).or_default();
                tally.count += 1;
                if tally.example.is_none() {
                    tally.example = decode_aux(&value).map(|x| x.to_string().into_boxed_str());
                }
            }

            seen += 1;
            if seen >= head {
                break;
            }
        }

        total += seen;
    }

    Ok((observed, total))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::write_test_bam;

    #[test]
    fn tags_tally_across_files_with_examples() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let first = write_test_bam(
            dir.path(),
            "first.bam",
            "chr1",
            10_000,
            &[
                "r1\t0\tchr1\t100\t60\t4M\t*\t0\t0\tACGT\tFFFF\tSM:Z:cellA\tGX:Z:geneX",
                "r2\t0\tchr1\t200\t60\t4M\t*\t0\t0\tACGT\tFFFF\tSM:Z:cellB\tNH:i:4",
            ],
        )?;
        let second = write_test_bam(
            dir.path(),
            "second.bam",
            "chr1",
            10_000,
            &["r3\t0\tchr1\t300\t60\t4M\t*\t0\t0\tACGT\tFFFF\tSM:Z:cellC"],
        )?;

        let (observed, seen) = tally_tags(&[first, second], 1000)?;

        assert_eq!(seen, 3);
        assert_eq!(observed.len(), 3);
        assert_eq!(observed["SM"].count, 3);
        assert_eq!(observed["SM"].example.as_deref(), Some("cellA"));
        assert_eq!(observed["GX"].count, 1);
        assert_eq!(observed["NH"].example.as_deref(), Some("4"));
        Ok(())
    }

    #[test]
    fn record_cap_limits_the_scan_per_file() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let bam_file = write_test_bam(
            dir.path(),
            "reads.bam",
            "chr1",
            10_000,
            &[
                "r1\t0\tchr1\t100\t60\t4M\t*\t0\t0\tACGT\tFFFF\tSM:Z:cellA",
                "r2\t0\tchr1\t200\t60\t4M\t*\t0\t0\tACGT\tFFFF\tSM:Z:cellB",
                "r3\t0\tchr1\t300\t60\t4M\t*\t0\t0\tACGT\tFFFF\tSM:Z:cellC",
            ],
        )?;

        let (observed, seen) = tally_tags(&[bam_file], 2)?;
        assert_eq!(seen, 2);
        assert_eq!(observed["SM"].count, 2);
        Ok(())
    }
}
