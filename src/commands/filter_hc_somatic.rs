use super::{input_vcf_files, record_error};
use crate::{
    cli::IoArgs,
    constants::{JacquardConfig, HC_SOMATIC_SUFFIX, METAHEADER_PREFIX},
    core::{file_set::vcf_stem, record::VcfRecord, tags::TagFamily},
    io::{
        vcf_reader::VcfReader,
        vcf_writer::{extend_header, prepare_output_dir, VcfWriter},
    },
    utils::util::{format_number_with_commas, Result},
};
use std::{collections::HashSet, path::Path};

const SOMATIC_VALUE: &str = "1";

fn position_key(record: &VcfRecord) -> String {
    format!("{}^{}", record.chrom, record.pos)
}

/// True when any sample carries a somatic tag from any caller set to `1`.
pub(crate) fn is_hc_somatic(record: &VcfRecord) -> bool {
    record.samples.iter().any(|sample| {
        sample.iter().any(|(tag, value)| {
            TagFamily::classify(tag) == Some(TagFamily::Somatic) && value == SOMATIC_VALUE
        })
    })
}

fn collect_somatic_positions(path: &Path, positions: &mut HashSet<String>) -> Result<()> {
    for record in VcfReader::from_path(path)? {
        let record = record?;
        if is_hc_somatic(&record) {
            positions.insert(position_key(&record));
        }
    }
    Ok(())
}

/// Writes each tagged VCF restricted to positions that any file calls
/// high-confidence somatic.
pub fn filter_hc_somatic(args: &IoArgs, config: &JacquardConfig) -> Result<()> {
    let (_, vcf_files) = input_vcf_files(&args.input)?;

    let mut positions = HashSet::new();
    for path in &vcf_files {
        collect_somatic_positions(path, &mut positions)?;
    }
    if positions.is_empty() {
        log::warn!(
            "No high-confidence somatic positions found in {}; outputs will contain headers only",
            args.input.display()
        );
    } else {
        log::info!(
            "Found {} high-confidence somatic positions",
            format_number_with_commas(positions.len())
        );
    }

    prepare_output_dir(&args.output, args.force)?;
    for path in &vcf_files {
        let output_path = args
            .output
            .join(format!("{}{HC_SOMATIC_SUFFIX}", vcf_stem(path)));
        filter_file(path, &output_path, &positions, config)?;
    }
    Ok(())
}

fn filter_file(
    input: &Path,
    output: &Path,
    positions: &HashSet<String>,
    config: &JacquardConfig,
) -> Result<()> {
    let mut reader = VcfReader::from_path(input)?;
    let mut extra = config.execution_metaheaders();
    extra.push(format!(
        "{METAHEADER_PREFIX}.filterHCSomatic.total_highConfidence_somatic_positions={}",
        positions.len()
    ));
    let header = extend_header(&reader.header, extra);

    let mut writer = VcfWriter::from_path(output)?;
    writer.write_header(&header)?;
    let mut excluded = 0usize;
    while let Some(record) = reader.next() {
        let record = record.map_err(|error| record_error(input, reader.line_number(), error))?;
        if positions.contains(&position_key(&record)) {
            writer.write_record(&record)?;
        } else {
            excluded += 1;
        }
    }
    let written = writer.finish()?;
    log::info!(
        "{}: kept {} records, excluded {}",
        input.display(),
        format_number_with_commas(written),
        format_number_with_commas(excluded)
    );
    Ok(())
}
