use crate::{core::caller::CallerKind, error::JacquardError, utils::util::Result};
use std::{
    collections::BTreeMap,
    path::{Path, PathBuf},
};

const GZIP_EXTENSION: &str = ".gz";

/// The files one sample contributes to normalization.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SampleFiles {
    pub sample: String,
    pub variant_files: Vec<PathBuf>,
    pub hc_files: Vec<PathBuf>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FileKind {
    Variant,
    HighConfidence,
}

/// Splits a file name into sample identifier and the caller-specific suffix it carries.
fn classify(caller: CallerKind, file_name: &str) -> Option<(String, &'static str, FileKind)> {
    let candidates = caller
        .variant_suffixes()
        .iter()
        .map(|suffix| (*suffix, FileKind::Variant))
        .chain(
            caller
                .hc_suffixes()
                .iter()
                .map(|suffix| (*suffix, FileKind::HighConfidence)),
        );

    let mut best: Option<(String, &'static str, FileKind)> = None;
    for (suffix, kind) in candidates {
        let stripped = file_name.strip_suffix(suffix).or_else(|| {
            match kind {
                FileKind::Variant => file_name
                    .strip_suffix(GZIP_EXTENSION)
                    .and_then(|name| name.strip_suffix(suffix)),
                FileKind::HighConfidence => None,
            }
        });
        let Some(sample) = stripped else {
            continue;
        };
        if sample.is_empty() {
            continue;
        }
        let longer = best
            .as_ref()
            .map_or(true, |(_, best_suffix, _)| suffix.len() > best_suffix.len());
        if longer {
            best = Some((sample.to_string(), suffix, kind));
        }
    }
    best
}

#[derive(Default)]
struct SampleGroup {
    by_suffix: BTreeMap<&'static str, PathBuf>,
}

/// Groups files by sample and checks that every sample has the caller's full file set.
///
/// Files that match none of the caller's suffixes are logged and left out.
pub fn group_sample_files(caller: CallerKind, files: &[PathBuf]) -> Result<Vec<SampleFiles>> {
    let mut groups: BTreeMap<String, SampleGroup> = BTreeMap::new();
    for path in files {
        let file_name = file_name(path);
        match classify(caller, &file_name) {
            Some((sample, suffix, _)) => {
                let group = groups.entry(sample.clone()).or_default();
                if let Some(previous) = group.by_suffix.insert(suffix, path.clone()) {
                    return Err(crate::jacquard_error!(
                        "Sample [{}] has more than one {} file: {} and {}",
                        sample,
                        suffix,
                        previous.display(),
                        path.display()
                    ));
                }
            }
            None => log::warn!(
                "Ignoring {}: not a recognized {} file",
                path.display(),
                caller
            ),
        }
    }

    if groups.is_empty() {
        return Err(crate::jacquard_error!(
            "No {} input files were found",
            caller
        ));
    }

    let mut samples = Vec::with_capacity(groups.len());
    for (sample, mut group) in groups {
        let missing: Vec<String> = caller
            .variant_suffixes()
            .iter()
            .chain(caller.hc_suffixes())
            .filter(|suffix| !group.by_suffix.contains_key(*suffix))
            .map(|suffix| format!("{sample}{suffix}"))
            .collect();
        if !missing.is_empty() {
            return Err(JacquardError::IncompleteFileSet { sample, missing });
        }

        let mut take = |suffixes: &[&'static str]| -> Vec<PathBuf> {
            suffixes
                .iter()
                .filter_map(|suffix| group.by_suffix.remove(suffix))
                .collect()
        };
        let variant_files = take(caller.variant_suffixes());
        let hc_files = take(caller.hc_suffixes());
        log::debug!(
            "Sample [{}]: {} variant file(s), {} high-confidence file(s)",
            sample,
            variant_files.len(),
            hc_files.len()
        );
        samples.push(SampleFiles {
            sample,
            variant_files,
            hc_files,
        });
    }
    Ok(samples)
}

pub fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// True for files that may hold VCF records (`.vcf` or `.vcf.gz`).
pub fn is_vcf_file(path: &Path) -> bool {
    let name = file_name(path);
    name.ends_with(".vcf") || name.ends_with(".vcf.gz")
}

/// File name without its `.vcf`/`.vcf.gz` extension.
pub fn vcf_stem(path: &Path) -> String {
    let name = file_name(path);
    let name = name.strip_suffix(GZIP_EXTENSION).unwrap_or(&name);
    name.strip_suffix(".vcf").unwrap_or(name).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn paths(names: &[&str]) -> Vec<PathBuf> {
        names.iter().map(|name| PathBuf::from("/in").join(name)).collect()
    }

    const VARSCAN_SET: [&str; 8] = [
        "tiny.indel.Germline.hc",
        "tiny.indel.LOH.hc",
        "tiny.indel.Somatic.hc",
        "tiny.indel.vcf",
        "tiny.snp.Germline.hc",
        "tiny.snp.LOH.hc",
        "tiny.snp.Somatic.hc",
        "tiny.snp.vcf",
    ];

    #[test]
    fn groups_complete_varscan_sample() -> Result<()> {
        let samples = group_sample_files(CallerKind::VarScan, &paths(&VARSCAN_SET))?;
        assert_eq!(samples.len(), 1);
        assert_eq!(samples[0].sample, "tiny");
        assert_eq!(
            samples[0].variant_files,
            paths(&["tiny.snp.vcf", "tiny.indel.vcf"])
        );
        assert_eq!(samples[0].hc_files.len(), 6);
        Ok(())
    }

    #[test]
    fn missing_indel_vcf_is_incomplete() {
        let names: Vec<&str> = VARSCAN_SET
            .iter()
            .copied()
            .filter(|name| *name != "tiny.indel.vcf")
            .collect();
        let err = group_sample_files(CallerKind::VarScan, &paths(&names)).unwrap_err();
        match err {
            JacquardError::IncompleteFileSet { sample, missing } => {
                assert_eq!(sample, "tiny");
                assert_eq!(missing, vec!["tiny.indel.vcf".to_string()]);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn extra_files_are_ignored() -> Result<()> {
        let mut names = VARSCAN_SET.to_vec();
        names.push("README.txt");
        let samples = group_sample_files(CallerKind::VarScan, &paths(&names))?;
        assert_eq!(samples.len(), 1);
        Ok(())
    }

    #[test]
    fn strelka_samples_are_grouped_separately() -> Result<()> {
        let samples = group_sample_files(
            CallerKind::Strelka,
            &paths(&["a.indels.vcf", "a.snvs.vcf", "b.indels.vcf", "b.snvs.vcf.gz"]),
        )?;
        assert_eq!(samples.len(), 2);
        assert_eq!(samples[1].sample, "b");
        assert!(samples[1].hc_files.is_empty());
        Ok(())
    }

    #[test]
    fn strelka_missing_snvs() {
        let err = group_sample_files(
            CallerKind::Strelka,
            &paths(&["a.indels.vcf", "a.snvs.vcf", "b.indels.vcf"]),
        )
        .unwrap_err();
        assert!(matches!(err, JacquardError::IncompleteFileSet { ref sample, .. } if sample == "b"));
    }

    #[test]
    fn mutect_sample_is_file_stem() -> Result<()> {
        let samples = group_sample_files(CallerKind::MuTect, &paths(&["patientA.vcf"]))?;
        assert_eq!(samples[0].sample, "patientA");
        Ok(())
    }

    #[test]
    fn no_matching_files_is_an_error() {
        assert!(group_sample_files(CallerKind::Strelka, &paths(&["notes.txt"])).is_err());
    }

    #[test]
    fn vcf_names() {
        assert!(is_vcf_file(Path::new("/x/a.snp.vcf")));
        assert!(is_vcf_file(Path::new("/x/a.vcf.gz")));
        assert!(!is_vcf_file(Path::new("/x/a.snp.Somatic.hc")));
        assert_eq!(vcf_stem(Path::new("/x/a.snp.vcf.gz")), "a.snp");
    }
}
