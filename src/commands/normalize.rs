use super::{detect_directory_caller, input_vcf_files};
use crate::{
    cli::IoArgs,
    constants::{JacquardConfig, METAHEADER_PREFIX, MERGED_SUFFIX},
    core::{
        caller::CallerKind,
        file_set::{group_sample_files, SampleFiles},
        high_confidence::{hc_info_metaheader, HighConfidenceSet},
        merge::{merge_headers, merge_records},
    },
    io::{
        vcf_reader::VcfFile,
        vcf_writer::{extend_header, prepare_output_dir, VcfWriter},
    },
    utils::util::{format_number_with_commas, Result},
};
use std::path::Path;

/// Merges each sample's variant files into one sorted VCF with high-confidence
/// records flagged.
///
/// The whole input directory is validated before the output directory is touched.
pub fn normalize(args: &IoArgs, config: &JacquardConfig) -> Result<()> {
    let (files, vcf_files) = input_vcf_files(&args.input)?;
    let caller = detect_directory_caller(&args.input, &vcf_files)?;
    log::info!(
        "Detected {} output in {} ({} files)",
        caller,
        args.input.display(),
        files.len()
    );

    let samples = group_sample_files(caller, &files)?;
    log::info!("Validated file sets for {} sample(s)", samples.len());

    prepare_output_dir(&args.output, args.force)?;
    for sample in &samples {
        normalize_sample(caller, sample, &args.output, config)?;
    }
    Ok(())
}

fn normalize_sample(
    caller: CallerKind,
    sample: &SampleFiles,
    output_dir: &Path,
    config: &JacquardConfig,
) -> Result<()> {
    let files = sample
        .variant_files
        .iter()
        .map(|path| VcfFile::from_path(path))
        .collect::<Result<Vec<_>>>()?;

    let header = merge_headers(&files)?;
    let mut records = merge_records(&files);

    let hc_set = HighConfidenceSet::from_files(&sample.hc_files)?;
    let marked = match caller.hc_info_flag() {
        Some(flag) => hc_set.mark(&mut records, &flag),
        None => 0,
    };

    let mut extra = config.execution_metaheaders();
    extra.push(format!("{METAHEADER_PREFIX}.normalize.caller={caller}"));
    extra.extend(hc_info_metaheader(caller, config));
    let header = extend_header(&header, extra);

    let output_path = output_dir.join(format!("{}{MERGED_SUFFIX}", sample.sample));
    let mut writer = VcfWriter::from_path(&output_path)?;
    writer.write_header(&header)?;
    for record in &records {
        writer.write_record(record)?;
    }
    let written = writer.finish()?;

    log::info!(
        "Sample [{}]: wrote {} records ({} high-confidence) to {}",
        sample.sample,
        format_number_with_commas(written),
        format_number_with_commas(marked),
        output_path.display()
    );
    Ok(())
}
