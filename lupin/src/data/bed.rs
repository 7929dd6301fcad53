use count_table::common_io::read_lines;

/// One counting interval from a BED file. `name` falls back to the
/// `chr:start-stop` locus when the fourth column is absent.
#[derive(Hash, Clone, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub struct NamedInterval {
    pub chr: Box<str>,
    pub start: i64,
    pub stop: i64,
    pub name: Box<str>,
}

impl std::fmt::Display for NamedInterval {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}-{}", self.chr, self.start, self.stop)
    }
}

/// parse one BED line to an interval
pub fn parse_bed_line(line: &str) -> Option<NamedInterval> {
    if line.starts_with('#') || line.starts_with("track") || line.starts_with("browser") {
        return None;
    }

    let mut words = line.split_whitespace();
    let chr = words.next()?;
    let start = words.next()?.parse::<i64>().ok()?;
    let stop = words.next()?.parse::<i64>().ok()?;

    let name = match words.next() {
        Some(x) => Box::from(x),
        None => format!("{}:{}-{}", chr, start, stop).into_boxed_str(),
    };

    Some(NamedInterval {
        chr: chr.into(),
        start,
        stop,
        name,
    })
}

/// read counting intervals, skipping headers and malformed lines
pub fn read_intervals(file_path: &str) -> anyhow::Result<Vec<NamedInterval>> {
    let lines = read_lines(file_path)?;

    let intervals = lines
        .iter()
        .filter_map(|line| parse_bed_line(line))
        .collect::<Vec<_>>();

    if intervals.is_empty() {
        anyhow::bail!("no usable intervals in {}", file_path);
    }

    Ok(intervals)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn named_and_unnamed_intervals_parse() {
        let named = parse_bed_line("chr1\t100\t500\tpeak_1").unwrap();
        assert_eq!(named.chr.as_ref(), "chr1");
        assert_eq!((named.start, named.stop), (100, 500));
        assert_eq!(named.name.as_ref(), "peak_1");

        let unnamed = parse_bed_line("chr2 1000 2000").unwrap();
        assert_eq!(unnamed.name.as_ref(), "chr2:1000-2000");
    }

    #[test]
    fn headers_and_malformed_lines_are_skipped() {
        assert_eq!(parse_bed_line("# comment"), None);
        assert_eq!(parse_bed_line("track name=peaks"), None);
        assert_eq!(parse_bed_line("browser position chr1"), None);
        assert_eq!(parse_bed_line("chr1\t100"), None);
        assert_eq!(parse_bed_line("chr1\tlow\thigh"), None);
        assert_eq!(parse_bed_line(""), None);
    }

    #[test]
    fn interval_files_read_through_gzip() -> anyhow::Result<()> {
        use count_table::common_io::write_lines;

        let dir = tempfile::tempdir()?;
        let bed_file = dir.path().join("peaks.bed.gz");
        let bed_file = bed_file.to_string_lossy();

        let lines: Vec<Box<str>> = vec![
            "# peak calls".into(),
            "chr1\t100\t500\tpeak_1".into(),
            "chr1\t900\t1300".into(),
        ];
        write_lines(&lines, &bed_file)?;

        let intervals = read_intervals(&bed_file)?;
        assert_eq!(intervals.len(), 2);
        assert_eq!(intervals[0].name.as_ref(), "peak_1");
        assert_eq!(intervals[1].name.as_ref(), "chr1:900-1300");
        Ok(())
    }

    #[test]
    fn empty_interval_files_are_rejected() -> anyhow::Result<()> {
        use count_table::common_io::write_lines;

        let dir = tempfile::tempdir()?;
        let bed_file = dir.path().join("empty.bed");
        let bed_file = bed_file.to_string_lossy();
        write_lines(&["# nothing here".into()], &bed_file)?;

        assert!(read_intervals(&bed_file).is_err());
        Ok(())
    }
}
