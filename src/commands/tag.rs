use super::{detect_callers, input_vcf_files, record_error};
use crate::{
    cli::IoArgs,
    constants::{JacquardConfig, METAHEADER_PREFIX, TAGGED_SUFFIX},
    core::{
        caller::CallerKind,
        file_set::vcf_stem,
        tags::{tag_metaheaders, tag_record},
    },
    io::{
        vcf_reader::VcfReader,
        vcf_writer::{extend_header, prepare_output_dir, VcfWriter},
    },
    utils::util::{format_number_with_commas, Result},
};
use std::path::Path;

/// Adds the Jacquard FORMAT tags to every VCF of the input directory.
pub fn tag(args: &IoArgs, config: &JacquardConfig) -> Result<()> {
    let (_, vcf_files) = input_vcf_files(&args.input)?;
    let detected = detect_callers(&vcf_files)?;
    log::info!("Tagging {} VCF file(s)", detected.len());

    prepare_output_dir(&args.output, args.force)?;
    for (path, caller) in &detected {
        let output_path = args
            .output
            .join(format!("{}{TAGGED_SUFFIX}", vcf_stem(path)));
        tag_file(path, &output_path, *caller, config)?;
    }
    Ok(())
}

pub(crate) fn tag_file(
    input: &Path,
    output: &Path,
    caller: CallerKind,
    config: &JacquardConfig,
) -> Result<usize> {
    let mut reader = VcfReader::from_path(input)?;

    let mut extra = config.execution_metaheaders();
    extra.push(format!("{METAHEADER_PREFIX}.tag.caller={caller}"));
    extra.extend(tag_metaheaders(caller, config));
    let header = extend_header(&reader.header, extra);

    let mut writer = VcfWriter::from_path(output)?;
    writer.write_header(&header)?;
    while let Some(record) = reader.next() {
        let mut record = record?;
        tag_record(caller, &mut record)
            .map_err(|error| record_error(input, reader.line_number(), error))?;
        writer.write_record(&record)?;
    }
    let written = writer.finish()?;

    log::info!(
        "{}: tagged {} {} records into {}",
        input.display(),
        format_number_with_commas(written),
        caller,
        output.display()
    );
    Ok(written)
}
