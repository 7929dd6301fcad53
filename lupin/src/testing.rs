use rust_htslib::bam::{self, HeaderView, Record};
use std::path::Path;

pub fn sam_header(chrom: &str, len: i64) -> HeaderView {
    let text = format!("@SQ\tSN:{}\tLN:{}\n", chrom, len);
    HeaderView::from_bytes(&text.into_bytes())
}

pub fn sam_record(header: &HeaderView, line: &str) -> anyhow::Result<Record> {
    Ok(Record::from_sam(header, line.as_bytes())?)
}

/// Write `sam_lines` into a fresh BAM under `dir` with a single
/// reference sequence
pub fn write_test_bam(
    dir: &Path,
    name: &str,
    chrom: &str,
    chrom_len: i64,
    sam_lines: &[&str],
) -> anyhow::Result<Box<str>> {
    let mut header = bam::header::Header::new();
    let mut chr_rec = bam::header::HeaderRecord::new(b"SQ");
    chr_rec.push_tag(b"SN", chrom);
    chr_rec.push_tag(b"LN", chrom_len);
    header.push_record(&chr_rec);

    let header_view = sam_header(chrom, chrom_len);

    let bam_path = dir.join(name);
    let mut writer = bam::Writer::from_path(&bam_path, &header, bam::Format::Bam)?;
    for line in sam_lines {
        let record = Record::from_sam(&header_view, line.as_bytes())?;
        writer.write(&record)?;
    }
    // force flush so the records land before any reader opens the file
    drop(writer);

    let path = bam_path
        .to_str()
        .ok_or(anyhow::anyhow!("non-utf8 temp path"))?;
    Ok(path.into())
}
