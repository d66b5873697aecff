use super::{round_each, sample_tag, TagFamily, TagSpec};
use crate::{
    core::{caller::CallerKind, record::VcfRecord},
    utils::util::{format_float, Result},
};

const SOMATIC_STATUS: &str = "SS=2";

pub(super) static TAG_SPECS: [TagSpec; 3] = [
    TagSpec {
        family: TagFamily::AlleleFreq,
        rule: allele_freq,
        description: "Jacquard allele frequency for VarScan: Decimal allele frequency rounded to 2 digits (based on FREQ)",
    },
    TagSpec {
        family: TagFamily::Depth,
        rule: depth,
        description: "Jacquard depth for VarScan (based on DP)",
    },
    TagSpec {
        family: TagFamily::Somatic,
        rule: somatic,
        description: "Jacquard somatic status for VarScan: 0=non-somatic,1=somatic (based on SS=2 and high-confidence INFO flag)",
    },
];

fn percent_to_decimal(value: &str) -> Result<String> {
    let percent: f64 = value.trim_end_matches('%').parse().map_err(|_| {
        crate::jacquard_error!("FREQ value '{value}' is not a percentage")
    })?;
    Ok(format_float(percent / 100.0))
}

fn allele_freq(record: &VcfRecord, sample_index: usize) -> Result<Option<String>> {
    sample_tag(record, sample_index, "FREQ")
        .map(|freq| round_each(freq, percent_to_decimal))
        .transpose()
}

fn depth(record: &VcfRecord, sample_index: usize) -> Result<Option<String>> {
    Ok(sample_tag(record, sample_index, "DP").map(str::to_string))
}

/// The first sample is NORMAL and never somatic; later samples are somatic when
/// VarScan called `SS=2` and the record was marked high-confidence.
fn somatic(record: &VcfRecord, sample_index: usize) -> Result<Option<String>> {
    let hc_flag = CallerKind::VarScan.hc_info_flag().unwrap_or_default();
    let is_somatic =
        sample_index > 0 && record.info_contains(SOMATIC_STATUS) && record.info_contains(&hc_flag);
    Ok(Some(if is_somatic { "1" } else { "0" }.to_string()))
}
