use crate::{
    core::record::VcfRecord,
    io::vcf_reader::{VcfFile, VcfHeader},
    utils::util::Result,
};
use std::cmp::Ordering;

/// Metaheader kinds carried over from every file of a sample, not just the first.
const MERGEABLE_METAHEADERS: [&str; 4] = ["##INFO=", "##FORMAT=", "##FILTER=", "##contig="];

/// Orders records by chromosome name (plain string order), position, REF, ALT.
pub fn compare_records(a: &VcfRecord, b: &VcfRecord) -> Ordering {
    a.chrom
        .cmp(&b.chrom)
        .then_with(|| a.pos.cmp(&b.pos))
        .then_with(|| a.reference.cmp(&b.reference))
        .then_with(|| a.alt.cmp(&b.alt))
}

/// Concatenates the records of all files, normalizes chromosome names and sorts
/// them. Equal keys keep their input order and duplicates are retained.
pub fn merge_records(files: &[VcfFile]) -> Vec<VcfRecord> {
    let total = files.iter().map(|file| file.records.len()).sum();
    let mut merged = Vec::with_capacity(total);
    for file in files {
        merged.extend(file.records.iter().cloned());
    }
    for record in merged.iter_mut() {
        record.normalize_chrom();
    }
    merged.sort_by(compare_records);
    merged
}

/// Header of the first file, extended with definitions only later files declare.
pub fn merge_headers(files: &[VcfFile]) -> Result<VcfHeader> {
    let Some(first) = files.first() else {
        return Err(crate::jacquard_error!("No files to merge"));
    };

    let mut metaheaders = first.header.metaheaders.clone();
    for file in &files[1..] {
        if file.header.column_header != first.header.column_header {
            return Err(crate::jacquard_error!(
                "Column headers of {} and {} differ; their samples cannot be merged",
                first.path.display(),
                file.path.display()
            ));
        }
        for line in &file.header.metaheaders {
            let mergeable = MERGEABLE_METAHEADERS
                .iter()
                .any(|prefix| line.starts_with(prefix));
            if mergeable && !metaheaders.contains(line) {
                metaheaders.push(line.clone());
            }
        }
    }

    Ok(VcfHeader {
        metaheaders,
        column_header: first.header.column_header.clone(),
    })
}
