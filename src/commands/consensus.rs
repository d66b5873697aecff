use super::record_error;
use crate::{
    cli::IoArgs,
    constants::{JacquardConfig, DEFAULT_CONSENSUS_FILENAME},
    core::consensus::{
        annotate_zscores, consensus_metaheaders, zscore_metaheaders, ConsensusAccumulator,
        ConsensusStats,
    },
    error::JacquardError,
    io::{
        vcf_reader::VcfReader,
        vcf_writer::{extend_header, VcfWriter},
    },
    utils::util::{format_number_with_commas, Result},
};
use std::{
    fs,
    path::{Path, PathBuf},
};

/// Resolves the final output file; a path without an extension is a directory
/// that receives `consensus.vcf`.
pub fn resolve_consensus_output(output: &Path, force: bool) -> Result<PathBuf> {
    let output_file = if output.extension().is_none() {
        if output.exists() && !output.is_dir() {
            return Err(JacquardError::directory_access(
                output,
                "output path exists and is not a directory",
            ));
        }
        fs::create_dir_all(output)
            .map_err(|error| JacquardError::directory_access(output, error.to_string()))?;
        output.join(DEFAULT_CONSENSUS_FILENAME)
    } else {
        output.to_path_buf()
    };

    if output_file.exists() && !force {
        return Err(JacquardError::directory_access(
            &output_file,
            "output file already exists; use --force to overwrite",
        ));
    }
    Ok(output_file)
}

/// Two-pass consensus over a tagged VCF: pass 1 adds the consensus tags and
/// collects range populations, pass 2 adds the range z-scores.
pub fn consensus(args: &IoArgs, config: &JacquardConfig) -> Result<()> {
    if !args.input.is_file() {
        return Err(JacquardError::directory_access(
            &args.input,
            "consensus input must be a VCF file",
        ));
    }
    let output_file = resolve_consensus_output(&args.output, args.force)?;
    let output_dir = match output_file.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    };

    let intermediate = tempfile::Builder::new()
        .prefix(".jacquard_consensus")
        .suffix(".vcf")
        .tempfile_in(&output_dir)
        .map_err(|error| JacquardError::directory_access(&output_dir, error.to_string()))?;
    log::debug!("Writing intermediate file {}", intermediate.path().display());

    let stats = write_consensus(&args.input, intermediate.path(), config)?;
    log::info!(
        "Range populations: AF {}, DP {}",
        describe(stats.allele_freq.map(|stats| (stats.mean, stats.std))),
        describe(stats.depth.map(|stats| (stats.mean, stats.std)))
    );

    let written = write_zscores(intermediate.path(), &output_file, &stats, config)?;
    intermediate.close()?;

    log::info!(
        "Wrote {} consensus records to {}",
        format_number_with_commas(written),
        output_file.display()
    );
    Ok(())
}

fn describe(stats: Option<(f64, f64)>) -> String {
    match stats {
        Some((mean, std)) => format!("mean={mean:.4} std={std:.4}"),
        None => "empty".to_string(),
    }
}

fn write_consensus(input: &Path, output: &Path, config: &JacquardConfig) -> Result<ConsensusStats> {
    let mut reader = VcfReader::from_path(input)?;
    let mut extra = config.execution_metaheaders();
    extra.extend(consensus_metaheaders(config));
    let header = extend_header(&reader.header, extra);

    let mut accumulator = ConsensusAccumulator::new();
    let mut writer = VcfWriter::from_path(output)?;
    writer.write_header(&header)?;
    while let Some(record) = reader.next() {
        let mut record = record?;
        accumulator
            .annotate(&mut record)
            .map_err(|error| record_error(input, reader.line_number(), error))?;
        writer.write_record(&record)?;
    }
    let written = writer.finish()?;
    log::debug!(
        "Pass 1 annotated {} records; {} AF and {} DP ranges collected",
        format_number_with_commas(written),
        accumulator.allele_freq_ranges().len(),
        accumulator.depth_ranges().len()
    );
    Ok(accumulator.stats())
}

/// Pass 2: rewrites a pass 1 file with z-score tags and the population
/// statistics they were computed from.
pub fn write_zscores(
    intermediate: &Path,
    output: &Path,
    stats: &ConsensusStats,
    config: &JacquardConfig,
) -> Result<usize> {
    let mut reader = VcfReader::from_path(intermediate)?;
    let mut extra = stats.metaheaders();
    extra.extend(zscore_metaheaders(config));
    let header = extend_header(&reader.header, extra);

    let mut writer = VcfWriter::from_path(output)?;
    writer.write_header(&header)?;
    while let Some(record) = reader.next() {
        let mut record = record?;
        annotate_zscores(&mut record, stats)
            .map_err(|error| record_error(intermediate, reader.line_number(), error))?;
        writer.write_record(&record)?;
    }
    writer.finish()
}
