use crate::{
    core::{caller::CallerKind, record::VcfRecord},
    error::JacquardError,
    io::readers::open_text_reader,
    utils::util::Result,
};
use std::{
    io::{BufRead, BufReader, Lines, Read},
    path::{Path, PathBuf},
};

const COLUMN_HEADER_PREFIX: &str = "#CHROM";
const SAMPLE_COLUMN_OFFSET: usize = 9;

/// Metaheaders and column header of a VCF file.
#[derive(Debug, Clone, PartialEq)]
pub struct VcfHeader {
    pub metaheaders: Vec<String>,
    pub column_header: String,
}

impl VcfHeader {
    pub fn sample_names(&self) -> Vec<&str> {
        self.column_header
            .split('\t')
            .skip(SAMPLE_COLUMN_OFFSET)
            .collect()
    }

    pub fn caller(&self) -> CallerKind {
        CallerKind::detect(&self.metaheaders)
    }
}

/// Streams records from a VCF file after its header has been consumed.
pub struct VcfReader {
    pub path: PathBuf,
    pub header: VcfHeader,
    lines: Lines<BufReader<Box<dyn Read>>>,
    line_number: usize,
}

impl VcfReader {
    pub fn from_path(path: &Path) -> Result<Self> {
        let mut lines = open_text_reader(path)?.lines();
        let mut metaheaders = Vec::new();
        let mut line_number = 0;
        let column_header = loop {
            let Some(line) = lines.next() else {
                return Err(JacquardError::MalformedRecord {
                    path: path.to_path_buf(),
                    line: line_number,
                    message: "no #CHROM column header found".to_string(),
                });
            };
            let line = line?;
            line_number += 1;
            if line.starts_with("##") {
                metaheaders.push(line);
            } else if line.starts_with(COLUMN_HEADER_PREFIX) {
                break line;
            } else if !line.trim().is_empty() {
                return Err(JacquardError::MalformedRecord {
                    path: path.to_path_buf(),
                    line: line_number,
                    message: "data line found before #CHROM column header".to_string(),
                });
            }
        };

        Ok(VcfReader {
            path: path.to_path_buf(),
            header: VcfHeader {
                metaheaders,
                column_header,
            },
            lines,
            line_number,
        })
    }

    /// Line number of the most recently read line.
    pub fn line_number(&self) -> usize {
        self.line_number
    }
}

impl Iterator for VcfReader {
    type Item = Result<VcfRecord>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let line = match self.lines.next()? {
                Ok(line) => line,
                Err(error) => return Some(Err(error.into())),
            };
            self.line_number += 1;
            if line.trim().is_empty() {
                continue;
            }
            if line.starts_with('#') {
                return Some(Err(JacquardError::MalformedRecord {
                    path: self.path.clone(),
                    line: self.line_number,
                    message: "header line found after #CHROM column header".to_string(),
                }));
            }
            return Some(VcfRecord::from_line(&line, &self.path, self.line_number));
        }
    }
}

/// A VCF file read completely into memory.
#[derive(Debug, Clone)]
pub struct VcfFile {
    pub path: PathBuf,
    pub header: VcfHeader,
    pub records: Vec<VcfRecord>,
}

impl VcfFile {
    pub fn from_path(path: &Path) -> Result<Self> {
        let mut reader = VcfReader::from_path(path)?;
        let header = reader.header.clone();
        let records = reader.by_ref().collect::<Result<Vec<_>>>()?;
        log::debug!(
            "Read {} records from {}",
            records.len(),
            path.display()
        );
        Ok(VcfFile {
            path: path.to_path_buf(),
            header,
            records,
        })
    }
}

/// Reads only the leading `##` lines of a file; used for caller detection.
pub fn read_metaheaders(path: &Path) -> Result<Vec<String>> {
    let mut metaheaders = Vec::new();
    for line in open_text_reader(path)?.lines() {
        let line = line?;
        if !line.starts_with("##") {
            break;
        }
        metaheaders.push(line);
    }
    Ok(metaheaders)
}
