use crate::{
    core::{caller::CallerKind, file_set::is_vcf_file},
    error::JacquardError,
    io::{vcf_reader::read_metaheaders, vcf_writer::list_input_files},
    utils::util::Result,
};
use std::{
    collections::BTreeSet,
    path::{Path, PathBuf},
};

mod consensus;
mod filter_hc_somatic;
mod normalize;
mod tag;

pub use consensus::{consensus, resolve_consensus_output, write_zscores};
pub use filter_hc_somatic::filter_hc_somatic;
pub use normalize::normalize;
pub use tag::tag;


/// Lists the VCF files of an input directory, failing when there are none.
fn input_vcf_files(input_dir: &Path) -> Result<(Vec<PathBuf>, Vec<PathBuf>)> {
    if !input_dir.is_dir() {
        return Err(JacquardError::directory_access(
            input_dir,
            "input is not a directory",
        ));
    }
    let files = list_input_files(input_dir)?;
    let vcf_files: Vec<PathBuf> = files.iter().filter(|path| is_vcf_file(path)).cloned().collect();
    if vcf_files.is_empty() {
        return Err(crate::jacquard_error!(
            "No VCF files found in {}",
            input_dir.display()
        ));
    }
    Ok((files, vcf_files))
}

/// Detects the caller of every file; any file without a known caller is fatal.
fn detect_callers(vcf_files: &[PathBuf]) -> Result<Vec<(PathBuf, CallerKind)>> {
    let mut detected = Vec::with_capacity(vcf_files.len());
    for path in vcf_files {
        let caller = CallerKind::detect(&read_metaheaders(path)?);
        if !caller.is_known() {
            return Err(JacquardError::UnknownCaller { path: path.clone() });
        }
        log::debug!("{}: {}", path.display(), caller);
        detected.push((path.clone(), caller));
    }
    Ok(detected)
}

/// The single caller shared by every file of a directory.
fn detect_directory_caller(input_dir: &Path, vcf_files: &[PathBuf]) -> Result<CallerKind> {
    let callers: BTreeSet<CallerKind> = detect_callers(vcf_files)?
        .into_iter()
        .map(|(_, caller)| caller)
        .collect();
    let mut iter = callers.iter();
    match (iter.next(), iter.next()) {
        (Some(caller), None) => Ok(*caller),
        (Some(_), Some(_)) => Err(JacquardError::AmbiguousCaller {
            dir: input_dir.to_path_buf(),
            callers: callers.iter().map(|caller| caller.to_string()).collect(),
        }),
        (None, _) => Err(crate::jacquard_error!(
            "No VCF files found in {}",
            input_dir.display()
        )),
    }
}

/// Wraps a per-record failure with the file and line it came from.
fn record_error(path: &Path, line: usize, error: JacquardError) -> JacquardError {
    match error {
        JacquardError::MalformedRecord { .. } => error,
        other => JacquardError::MalformedRecord {
            path: path.to_path_buf(),
            line,
            message: other.to_string(),
        },
    }
}
