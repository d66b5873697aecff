//! Caller-specific derivation of the normalized `JQ_*` FORMAT tags.
//!
//! Every known caller supplies three rules, applied per sample in a fixed
//! order: allele frequency, depth, then somatic status. A rule that finds
//! none of its native tags leaves the sample untouched.

mod mutect;
mod strelka;
mod varscan;

use crate::{
    constants::JacquardConfig,
    core::{caller::CallerKind, record::VcfRecord},
    utils::util::{round_two_digits, Result, MISSING_VALUE},
};

pub const TAG_PREFIX: &str = "JQ_";

/// The quantity a normalized tag carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TagFamily {
    AlleleFreq,
    Depth,
    Somatic,
}

impl TagFamily {
    pub const ALL: [TagFamily; 3] = [TagFamily::AlleleFreq, TagFamily::Depth, TagFamily::Somatic];

    pub fn suffix(self) -> &'static str {
        match self {
            TagFamily::AlleleFreq => "AF",
            TagFamily::Depth => "DP",
            TagFamily::Somatic => "HC_SOM",
        }
    }

    fn number(self) -> &'static str {
        match self {
            TagFamily::AlleleFreq => "A",
            _ => "1",
        }
    }

    fn value_type(self) -> &'static str {
        match self {
            TagFamily::AlleleFreq => "Float",
            _ => "Integer",
        }
    }

    /// Recognizes `JQ_<CALLER>_<SUFFIX>` where `<CALLER>` is a single token.
    pub fn classify(tag: &str) -> Option<TagFamily> {
        let rest = tag.strip_prefix(TAG_PREFIX)?;
        Self::ALL.into_iter().find(|family| {
            rest.strip_suffix(family.suffix())
                .and_then(|caller| caller.strip_suffix('_'))
                .is_some_and(|caller| {
                    !caller.is_empty() && caller.chars().all(|c| c.is_ascii_alphanumeric())
                })
        })
    }
}

/// Computes a tag value for one sample of a record, `None` when the inputs are absent.
pub type TagRule = fn(&VcfRecord, usize) -> Result<Option<String>>;

pub struct TagSpec {
    pub family: TagFamily,
    pub rule: TagRule,
    pub description: &'static str,
}

pub fn tag_specs(caller: CallerKind) -> &'static [TagSpec] {
    match caller {
        CallerKind::VarScan => &varscan::TAG_SPECS,
        CallerKind::MuTect => &mutect::TAG_SPECS,
        CallerKind::Strelka => &strelka::TAG_SPECS,
        CallerKind::Unknown => &[],
    }
}

pub fn tag_name(caller: CallerKind, family: TagFamily) -> Option<String> {
    caller
        .abbreviation()
        .map(|abbr| format!("{TAG_PREFIX}{abbr}_{}", family.suffix()))
}

/// `##FORMAT` definitions for the tags `caller` adds.
pub fn tag_metaheaders(caller: CallerKind, config: &JacquardConfig) -> Vec<String> {
    tag_specs(caller)
        .iter()
        .filter_map(|spec| {
            tag_name(caller, spec.family).map(|name| {
                format!(
                    "##FORMAT=<ID={name},Number={},Type={},Description=\"{}\",Source=\"Jacquard\",Version={}>",
                    spec.family.number(),
                    spec.family.value_type(),
                    spec.description,
                    config.caller_version(caller)
                )
            })
        })
        .collect()
}

/// Appends the caller's tags to every sample of the record.
pub fn tag_record(caller: CallerKind, record: &mut VcfRecord) -> Result<()> {
    let specs = tag_specs(caller);
    for sample_index in 0..record.samples.len() {
        for spec in specs {
            let Some(name) = tag_name(caller, spec.family) else {
                continue;
            };
            if let Some(value) = (spec.rule)(record, sample_index)? {
                record.samples[sample_index].insert(name, value);
            }
        }
    }
    Ok(())
}

pub(crate) fn sample_tag<'a>(record: &'a VcfRecord, sample_index: usize, tag: &str) -> Option<&'a str> {
    record
        .samples
        .get(sample_index)
        .and_then(|sample| sample.get(tag))
        .map(String::as_str)
}

/// Applies two-digit rounding to each comma-separated value, passing `.` through.
pub(crate) fn round_each(values: &str, convert: impl Fn(&str) -> Result<String>) -> Result<String> {
    let rounded = values
        .split(',')
        .map(|value| {
            if value == MISSING_VALUE {
                Ok(MISSING_VALUE.to_string())
            } else {
                convert(value).and_then(|converted| round_two_digits(&converted))
            }
        })
        .collect::<Result<Vec<_>>>()?;
    Ok(rounded.join(","))
}
