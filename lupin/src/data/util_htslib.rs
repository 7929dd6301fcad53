use rust_htslib::bam::{self, HeaderView};
use std::path::Path;

/// Check random access BAM index, creating a `.bai` next to the file
/// when none exists. Returns the index path.
pub fn check_bam_index(
    bam_file_name: &str,
    idx_file_name: Option<&str>,
) -> anyhow::Result<Box<str>> {
    let idx_file = match idx_file_name {
        Some(x) => String::from(x),
        None => format!("{}.bai", bam_file_name),
    };

    if Path::new(&idx_file).exists() {
        return Ok(idx_file.into_boxed_str());
    }

    bam::index::build(
        bam_file_name,
        Some(&idx_file),
        bam::index::Type::Bai,
        num_cpus::get() as u32,
    )?;

    Ok(idx_file.into_boxed_str())
}

/// reference sequence name of a target id
pub fn tid_to_name(header: &HeaderView, tid: i32) -> Option<Box<str>> {
    if tid < 0 || (tid as u32) >= header.target_count() {
        return None;
    }

    String::from_utf8(header.tid2name(tid as u32).to_vec())
        .ok()
        .map(|x| x.into_boxed_str())
}

/// reference sequence length of a target id
pub fn tid_to_length(header: &HeaderView, tid: i32) -> Option<i64> {
    if tid < 0 {
        return None;
    }

    header.target_len(tid as u32).map(|x| x as i64)
}

/// names and lengths of every reference sequence, indexed by tid
pub fn reference_table(header: &HeaderView) -> anyhow::Result<Vec<(Box<str>, i64)>> {
    let num_targets = header.target_count() as i32;
    let mut ret = Vec::with_capacity(num_targets as usize);

    for tid in 0..num_targets {
        match (tid_to_name(header, tid), tid_to_length(header, tid)) {
            (Some(name), Some(len)) => ret.push((name, len)),
            _ => anyhow::bail!("invalid reference sequence #{}", tid),
        }
    }

    Ok(ret)
}
