use crate::{error::JacquardError, utils::util::MISSING_VALUE, utils::util::Result};
use indexmap::IndexMap;
use std::path::Path;

/// Per-sample FORMAT tag values in column order.
pub type FormatTagMap = IndexMap<String, String>;

const FIXED_COLUMNS: usize = 8;
const CHROM_PREFIX: &str = "chr";

/// One data line of a VCF file.
#[derive(Debug, Clone, PartialEq)]
pub struct VcfRecord {
    pub chrom: String,
    pub pos: i64,
    pub id: String,
    pub reference: String,
    pub alt: String,
    pub qual: String,
    pub filter: String,
    pub info: String,
    pub samples: Vec<FormatTagMap>,
}

fn malformed(path: &Path, line: usize, message: impl Into<String>) -> JacquardError {
    JacquardError::MalformedRecord {
        path: path.to_path_buf(),
        line,
        message: message.into(),
    }
}

/// Strips any `chr` prefix and puts the canonical one back.
pub fn normalize_chrom(chrom: &str) -> String {
    let bare = chrom.strip_prefix(CHROM_PREFIX).unwrap_or(chrom);
    format!("{CHROM_PREFIX}{bare}")
}

impl VcfRecord {
    pub fn from_line(line: &str, path: &Path, line_number: usize) -> Result<Self> {
        let fields: Vec<&str> = line.split('\t').collect();
        if fields.len() < FIXED_COLUMNS {
            return Err(malformed(
                path,
                line_number,
                format!(
                    "expected at least {FIXED_COLUMNS} tab-separated columns, found {}",
                    fields.len()
                ),
            ));
        }

        let pos = fields[1].trim().parse::<i64>().map_err(|_| {
            malformed(
                path,
                line_number,
                format!("POS is not an integer: '{}'", fields[1]),
            )
        })?;

        let mut samples = Vec::new();
        if fields.len() > FIXED_COLUMNS {
            let keys: Vec<&str> = fields[FIXED_COLUMNS].split(':').collect();
            for (sample_index, sample) in fields[FIXED_COLUMNS + 1..].iter().enumerate() {
                let values: Vec<&str> = sample.split(':').collect();
                if values.len() != keys.len() {
                    return Err(malformed(
                        path,
                        line_number,
                        format!(
                            "FORMAT declares {} tags but sample {} has {} values",
                            keys.len(),
                            sample_index,
                            values.len()
                        ),
                    ));
                }
                let mut tags = FormatTagMap::with_capacity(keys.len());
                for (key, value) in keys.iter().zip(values) {
                    if tags.insert(key.to_string(), value.to_string()).is_some() {
                        return Err(malformed(
                            path,
                            line_number,
                            format!("FORMAT tag {key} appears more than once"),
                        ));
                    }
                }
                samples.push(tags);
            }
        }

        Ok(VcfRecord {
            chrom: fields[0].to_string(),
            pos,
            id: fields[2].to_string(),
            reference: fields[3].to_string(),
            alt: fields[4].to_string(),
            qual: fields[5].to_string(),
            filter: fields[6].to_string(),
            info: fields[7].to_string(),
            samples,
        })
    }

    /// FORMAT keys across all samples in first-seen order.
    pub fn format_keys(&self) -> Vec<&str> {
        let mut keys: Vec<&str> = Vec::new();
        for sample in &self.samples {
            for key in sample.keys() {
                if !keys.contains(&key.as_str()) {
                    keys.push(key.as_str());
                }
            }
        }
        keys
    }

    pub fn to_line(&self) -> String {
        let mut columns = vec![
            self.chrom.clone(),
            self.pos.to_string(),
            self.id.clone(),
            self.reference.clone(),
            self.alt.clone(),
            self.qual.clone(),
            self.filter.clone(),
            self.info.clone(),
        ];
        if !self.samples.is_empty() {
            let keys = self.format_keys();
            columns.push(keys.join(":"));
            for sample in &self.samples {
                let values: Vec<&str> = keys
                    .iter()
                    .map(|key| sample.get(*key).map_or(MISSING_VALUE, String::as_str))
                    .collect();
                columns.push(values.join(":"));
            }
        }
        columns.join("\t")
    }

    pub fn alts(&self) -> Vec<&str> {
        self.alt.split(',').collect()
    }

    pub fn info_fields(&self) -> impl Iterator<Item = &str> {
        self.info
            .split(';')
            .filter(|field| !field.is_empty() && *field != MISSING_VALUE)
    }

    /// True when INFO holds `field` verbatim, either a flag or a `key=value` pair.
    pub fn info_contains(&self, field: &str) -> bool {
        self.info_fields().any(|candidate| candidate == field)
    }

    pub fn add_info_flag(&mut self, flag: &str) {
        if self.info_contains(flag) {
            return;
        }
        if self.info.is_empty() || self.info == MISSING_VALUE {
            self.info = flag.to_string();
        } else {
            self.info.push(';');
            self.info.push_str(flag);
        }
    }

    pub fn normalize_chrom(&mut self) {
        self.chrom = normalize_chrom(&self.chrom);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const LINE: &str =
        "chr1\t100\t.\tA\tG\t.\tPASS\tDP=30;SS=2\tGT:FREQ:DP\t0/0:0%:12\t0/1:20.4%:18";

    fn parse(line: &str) -> Result<VcfRecord> {
        VcfRecord::from_line(line, Path::new("test.vcf"), 3)
    }

    #[test]
    fn parses_fixed_columns_and_samples() {
        let record = parse(LINE).unwrap();
        assert_eq!(record.chrom, "chr1");
        assert_eq!(record.pos, 100);
        assert_eq!(record.reference, "A");
        assert_eq!(record.alt, "G");
        assert_eq!(record.samples.len(), 2);
        assert_eq!(record.samples[1]["FREQ"], "20.4%");
        assert_eq!(record.format_keys(), vec!["GT", "FREQ", "DP"]);
    }

    #[test]
    fn round_trips_line() {
        let record = parse(LINE).unwrap();
        assert_eq!(record.to_line(), LINE);
    }

    #[test]
    fn record_without_samples_writes_eight_columns() {
        let line = "1\t5\trs1\tC\tT\t50\tPASS\t.";
        let record = parse(line).unwrap();
        assert!(record.samples.is_empty());
        assert_eq!(record.to_line(), line);
    }

    #[test]
    fn sample_cardinality_mismatch_is_malformed() {
        let line = "chr1\t100\t.\tA\tG\t.\tPASS\t.\tGT:DP\t0/1:12:7";
        let err = parse(line).unwrap_err();
        assert!(matches!(err, JacquardError::MalformedRecord { line: 3, .. }));
    }

    #[test]
    fn duplicate_format_tag_is_malformed() {
        let line = "chr1\t100\t.\tA\tG\t.\tPASS\t.\tDP:DP\t1:2";
        assert!(matches!(
            parse(line).unwrap_err(),
            JacquardError::MalformedRecord { .. }
        ));
    }

    #[test]
    fn short_line_and_bad_position_are_malformed() {
        assert!(parse("chr1\t100\t.\tA").is_err());
        assert!(parse("chr1\tabc\t.\tA\tG\t.\tPASS\t.").is_err());
    }

    #[test]
    fn added_tags_extend_format_and_fill_missing() {
        let mut record = parse(LINE).unwrap();
        record.samples[1].insert("JQ_VS_AF".to_string(), "0.2".to_string());
        assert!(record.to_line().ends_with("GT:FREQ:DP:JQ_VS_AF\t0/0:0%:12:.\t0/1:20.4%:18:0.2"));
    }

    #[test]
    fn info_flags() {
        let mut record = parse(LINE).unwrap();
        assert!(record.info_contains("SS=2"));
        assert!(!record.info_contains("SS=1"));
        record.add_info_flag("JQ_HC_VS");
        record.add_info_flag("JQ_HC_VS");
        assert_eq!(record.info, "DP=30;SS=2;JQ_HC_VS");

        let mut empty = parse("chr1\t1\t.\tA\tC\t.\t.\t.").unwrap();
        empty.add_info_flag("JQ_HC_VS");
        assert_eq!(empty.info, "JQ_HC_VS");
    }

    #[test]
    fn chrom_prefix_is_canonical() {
        assert_eq!(normalize_chrom("1"), "chr1");
        assert_eq!(normalize_chrom("chr1"), "chr1");
        assert_eq!(normalize_chrom("X"), "chrX");
    }
}
