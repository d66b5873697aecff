use super::{round_each, sample_tag, TagFamily, TagSpec};
use crate::{core::record::VcfRecord, utils::util::Result};

pub(super) static TAG_SPECS: [TagSpec; 3] = [
    TagSpec {
        family: TagFamily::AlleleFreq,
        rule: allele_freq,
        description: "Jacquard allele frequency for MuTect: Decimal allele frequency rounded to 2 digits (based on FA)",
    },
    TagSpec {
        family: TagFamily::Depth,
        rule: depth,
        description: "Jacquard depth for MuTect (based on DP)",
    },
    TagSpec {
        family: TagFamily::Somatic,
        rule: somatic,
        description: "Jacquard somatic status for MuTect: 0=non-somatic,1=somatic (based on SS FORMAT tag)",
    },
];

fn checked_decimal(value: &str) -> Result<String> {
    value
        .parse::<f64>()
        .map_err(|_| crate::jacquard_error!("FA value '{value}' is not a decimal"))?;
    Ok(value.to_string())
}

fn allele_freq(record: &VcfRecord, sample_index: usize) -> Result<Option<String>> {
    sample_tag(record, sample_index, "FA")
        .map(|fa| round_each(fa, checked_decimal))
        .transpose()
}

fn depth(record: &VcfRecord, sample_index: usize) -> Result<Option<String>> {
    Ok(sample_tag(record, sample_index, "DP").map(str::to_string))
}

fn somatic(record: &VcfRecord, sample_index: usize) -> Result<Option<String>> {
    Ok(sample_tag(record, sample_index, "SS")
        .map(|status| if status == "2" { "1" } else { "0" }.to_string()))
}
