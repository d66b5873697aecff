use crate::{
    core::record::VcfRecord, error::JacquardError, io::vcf_reader::VcfHeader, utils::util::Result,
};
use std::{
    fs::{self, File},
    io::{BufWriter, Write},
    path::{Path, PathBuf},
};

pub struct VcfWriter<W: Write> {
    pub writer: W,
    pub records_written: usize,
}

impl VcfWriter<BufWriter<File>> {
    pub fn from_path(path: &Path) -> Result<Self> {
        let file = File::create(path).map_err(|error| {
            crate::jacquard_error!("Failed to create output {}: {error}", path.display())
        })?;
        Ok(Self::new(BufWriter::new(file)))
    }
}

impl<W: Write> VcfWriter<W> {
    pub fn new(writer: W) -> Self {
        VcfWriter {
            writer,
            records_written: 0,
        }
    }

    pub fn write_header(&mut self, header: &VcfHeader) -> Result<()> {
        for line in &header.metaheaders {
            writeln!(self.writer, "{line}")?;
        }
        writeln!(self.writer, "{}", header.column_header)?;
        Ok(())
    }

    pub fn write_record(&mut self, record: &VcfRecord) -> Result<()> {
        writeln!(self.writer, "{}", record.to_line())?;
        self.records_written += 1;
        Ok(())
    }

    pub fn finish(mut self) -> Result<usize> {
        self.writer.flush()?;
        Ok(self.records_written)
    }
}

/// Builds an output header: input metaheaders, then `extra` lines, then the column header.
pub fn extend_header(header: &VcfHeader, extra: impl IntoIterator<Item = String>) -> VcfHeader {
    let mut metaheaders = header.metaheaders.clone();
    metaheaders.extend(extra);
    VcfHeader {
        metaheaders,
        column_header: header.column_header.clone(),
    }
}

/// Prepares an output directory, refusing to reuse a non-empty one unless forced.
pub fn prepare_output_dir(path: &Path, force: bool) -> Result<()> {
    if path.exists() {
        if !path.is_dir() {
            return Err(JacquardError::directory_access(
                path,
                "output path exists and is not a directory",
            ));
        }
        let mut entries = fs::read_dir(path)
            .map_err(|error| JacquardError::directory_access(path, error.to_string()))?;
        if entries.next().is_some() && !force {
            return Err(JacquardError::directory_access(
                path,
                "output directory is not empty; use --force to overwrite",
            ));
        }
        return Ok(());
    }
    fs::create_dir_all(path)
        .map_err(|error| JacquardError::directory_access(path, error.to_string()))
}

/// Lists the regular files of an input directory sorted by name.
pub fn list_input_files(dir: &Path) -> Result<Vec<PathBuf>> {
    let entries =
        fs::read_dir(dir).map_err(|error| JacquardError::directory_access(dir, error.to_string()))?;
    let mut files = Vec::new();
    for entry in entries {
        let path = entry
            .map_err(|error| JacquardError::directory_access(dir, error.to_string()))?
            .path();
        if path.is_file() {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}
