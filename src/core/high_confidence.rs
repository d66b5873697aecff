use crate::{
    constants::JacquardConfig,
    core::{
        caller::CallerKind,
        record::{normalize_chrom, VcfRecord},
    },
    error::JacquardError,
    io::{readers::open_text_reader, vcf_reader::VcfFile},
    utils::util::Result,
};
use std::{
    collections::HashSet,
    io::BufRead,
    path::{Path, PathBuf},
};

const KEY_SEPARATOR: char = '^';
const NATIVE_MIN_COLUMNS: usize = 4;
const VCF_FILEFORMAT_PREFIX: &str = "##fileformat=VCF";

/// Encodes one allele the way VarScan's native tables do: indels are written
/// as the anchor base plus a `+inserted` or `-deleted` variant allele.
fn native_alleles<'a>(reference: &'a str, alt: &'a str) -> (&'a str, String) {
    if reference.len() > alt.len() {
        if let Some(deleted) = reference.strip_prefix(alt) {
            return (alt, format!("-{deleted}"));
        }
    } else if alt.len() > reference.len() {
        if let Some(inserted) = alt.strip_prefix(reference) {
            return (reference, format!("+{inserted}"));
        }
    }
    (reference, alt.to_string())
}

pub fn hc_key(chrom: &str, pos: i64, reference: &str, alt: &str) -> String {
    let (reference, alt) = native_alleles(reference, alt);
    format!(
        "{}{KEY_SEPARATOR}{pos}{KEY_SEPARATOR}{reference}{KEY_SEPARATOR}{alt}",
        normalize_chrom(chrom)
    )
}

/// One key per ALT allele of the record.
pub fn record_hc_keys(record: &VcfRecord) -> Vec<String> {
    record
        .alts()
        .into_iter()
        .map(|alt| hc_key(&record.chrom, record.pos, &record.reference, alt))
        .collect()
}

/// Union of the high-confidence keys of every auxiliary file of a sample.
#[derive(Debug, Default, Clone)]
pub struct HighConfidenceSet {
    keys: HashSet<String>,
}

impl HighConfidenceSet {
    pub fn from_files(paths: &[PathBuf]) -> Result<Self> {
        let mut set = HighConfidenceSet::default();
        for path in paths {
            let before = set.keys.len();
            if is_vcf_formatted(path)? {
                set.extend_from_vcf(path)?;
            } else {
                set.extend_from_native(path)?;
            }
            log::debug!(
                "Loaded {} high-confidence keys from {}",
                set.keys.len() - before,
                path.display()
            );
        }
        Ok(set)
    }

    fn extend_from_vcf(&mut self, path: &Path) -> Result<()> {
        let file = VcfFile::from_path(path)?;
        for record in &file.records {
            self.keys.extend(record_hc_keys(record));
        }
        Ok(())
    }

    fn extend_from_native(&mut self, path: &Path) -> Result<()> {
        for (index, line) in open_text_reader(path)?.lines().enumerate() {
            let line = line?;
            let line_number = index + 1;
            let trimmed = line.trim_end();
            if trimmed.is_empty()
                || trimmed.starts_with('#')
                || trimmed.to_ascii_lowercase().starts_with("chrom\t")
            {
                continue;
            }
            let columns: Vec<&str> = trimmed.split('\t').collect();
            if columns.len() < NATIVE_MIN_COLUMNS {
                return Err(JacquardError::MalformedRecord {
                    path: path.to_path_buf(),
                    line: line_number,
                    message: format!(
                        "expected at least {NATIVE_MIN_COLUMNS} columns (chrom, position, ref, var)"
                    ),
                });
            }
            let pos = columns[1].parse::<i64>().map_err(|_| JacquardError::MalformedRecord {
                path: path.to_path_buf(),
                line: line_number,
                message: format!("position is not an integer: '{}'", columns[1]),
            })?;
            self.keys.insert(format!(
                "{}{KEY_SEPARATOR}{pos}{KEY_SEPARATOR}{}{KEY_SEPARATOR}{}",
                normalize_chrom(columns[0]),
                columns[2],
                columns[3]
            ));
        }
        Ok(())
    }

    pub fn contains(&self, key: &str) -> bool {
        self.keys.contains(key)
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    pub fn is_high_confidence(&self, record: &VcfRecord) -> bool {
        record_hc_keys(record)
            .iter()
            .any(|key| self.keys.contains(key))
    }

    /// Adds `flag` to the INFO column of every high-confidence record.
    pub fn mark(&self, records: &mut [VcfRecord], flag: &str) -> usize {
        let mut marked = 0;
        for record in records.iter_mut() {
            if self.is_high_confidence(record) {
                record.add_info_flag(flag);
                marked += 1;
            }
        }
        marked
    }
}

/// `##INFO` definition of the caller's high-confidence flag.
pub fn hc_info_metaheader(caller: CallerKind, config: &JacquardConfig) -> Option<String> {
    caller.hc_info_flag().map(|flag| {
        format!(
            "##INFO=<ID={flag},Number=0,Type=Flag,Description=\"Jacquard high-confidence call: variant appears in a {caller} high-confidence (.hc) file\",Source=\"Jacquard\",Version={}>",
            config.caller_version(caller)
        )
    })
}

fn is_vcf_formatted(path: &Path) -> Result<bool> {
    let mut first_line = String::new();
    open_text_reader(path)?.read_line(&mut first_line)?;
    Ok(first_line.starts_with(VCF_FILEFORMAT_PREFIX))
}
