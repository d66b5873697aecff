use super::{sample_tag, TagFamily, TagSpec};
use crate::{
    core::record::VcfRecord,
    utils::util::{round_float_two_digits, Result},
};

const BASE_COUNT_TAGS: [&str; 4] = ["AU", "CU", "GU", "TU"];
const MAX_ALLELE_FREQ: &str = "1.00";
const PASS_FILTER: &str = "PASS";

pub(super) static TAG_SPECS: [TagSpec; 3] = [
    TagSpec {
        family: TagFamily::AlleleFreq,
        rule: allele_freq,
        description: "Jacquard allele frequency for Strelka: Decimal allele frequency rounded to 2 digits (based on alt_depth/total_depth. Uses (TIR tier 2)/DP2 if available, otherwise uses (ACGT tier2 depth) / DP2)",
    },
    TagSpec {
        family: TagFamily::Depth,
        rule: depth,
        description: "Jacquard depth for Strelka (uses DP2 if available, otherwise uses ACGT tier2 depth)",
    },
    TagSpec {
        family: TagFamily::Somatic,
        rule: somatic,
        description: "Jacquard somatic status for Strelka: 0=non-somatic,1=somatic (based on PASS in FILTER column)",
    },
];

/// Second comma-separated (tier 2) value of a Strelka count tag.
fn tier2(record: &VcfRecord, sample_index: usize, tag: &str) -> Result<Option<f64>> {
    let Some(value) = sample_tag(record, sample_index, tag) else {
        return Ok(None);
    };
    let Some(tier2) = value.split(',').nth(1) else {
        return Err(crate::jacquard_error!(
            "{tag} value '{value}' has no tier 2 count"
        ));
    };
    tier2
        .parse::<f64>()
        .map(Some)
        .map_err(|_| crate::jacquard_error!("{tag} tier 2 count '{tier2}' is not numeric"))
}

/// Sum of the tier 2 counts of all four bases, `None` unless all are present.
fn base_count_total(record: &VcfRecord, sample_index: usize) -> Result<Option<f64>> {
    let mut total = 0.0;
    for tag in BASE_COUNT_TAGS {
        match tier2(record, sample_index, tag)? {
            Some(count) => total += count,
            None => return Ok(None),
        }
    }
    Ok(Some(total))
}

fn capped_ratio(numerator: f64, denominator: f64) -> Result<String> {
    let rounded = round_float_two_digits(numerator / denominator)?;
    Ok(std::cmp::min(rounded.as_str(), MAX_ALLELE_FREQ).to_string())
}

fn snv_allele_freq(record: &VcfRecord, sample_index: usize) -> Result<Option<String>> {
    let Some(total) = base_count_total(record, sample_index)? else {
        return Ok(None);
    };
    if total == 0.0 {
        return Ok(None);
    }
    let mut freqs = Vec::new();
    for alt in record.alts() {
        let Some(alt_count) = tier2(record, sample_index, &format!("{alt}U"))? else {
            return Ok(None);
        };
        freqs.push(capped_ratio(alt_count, total)?);
    }
    Ok(Some(freqs.join(",")))
}

fn indel_allele_freq(record: &VcfRecord, sample_index: usize) -> Result<Option<String>> {
    let (Some(alt_count), Some(depth)) = (
        tier2(record, sample_index, "TAR")?,
        dp2(record, sample_index)?,
    ) else {
        return Ok(None);
    };
    if depth == 0.0 {
        return Ok(None);
    }
    let freq = capped_ratio(alt_count, depth)?;
    Ok(Some(vec![freq; record.alts().len()].join(",")))
}

fn dp2(record: &VcfRecord, sample_index: usize) -> Result<Option<f64>> {
    sample_tag(record, sample_index, "DP2")
        .map(|value| {
            value
                .parse::<f64>()
                .map_err(|_| crate::jacquard_error!("DP2 value '{value}' is not numeric"))
        })
        .transpose()
}

fn allele_freq(record: &VcfRecord, sample_index: usize) -> Result<Option<String>> {
    if sample_tag(record, sample_index, "TAR").is_some() {
        indel_allele_freq(record, sample_index)
    } else {
        snv_allele_freq(record, sample_index)
    }
}

fn depth(record: &VcfRecord, sample_index: usize) -> Result<Option<String>> {
    if let Some(dp2) = sample_tag(record, sample_index, "DP2") {
        return Ok(Some(dp2.to_string()));
    }
    Ok(base_count_total(record, sample_index)?.map(|total| format!("{}", total as i64)))
}

/// Somatic when the record passed Strelka's filters, for tumor samples only.
fn somatic(record: &VcfRecord, sample_index: usize) -> Result<Option<String>> {
    let is_somatic = sample_index > 0 && record.filter == PASS_FILTER;
    Ok(Some(if is_somatic { "1" } else { "0" }.to_string()))
}

#[cfg(test)]
mod tests {
    use super::super::test_utils::record;
    use super::*;

    const SNV: &str = "chr1\t10\t.\tA\tG\t.\tPASS\tSOMATIC\tDP:FDP:SDP:SUBDP:AU:CU:GU:TU\t30:0:0:0:28,29:0,0:1,1:0,0\t40:0:0:0:20,20:0,0:19,20:0,0";
    const INDEL: &str = "chr1\t20\t.\tCTG\tC\t.\tQSI_ref\tSOMATIC\tDP:DP2:TAR:TIR:TOR\t30:30:30,30:0,0:0,0\t40:40:20,22:17,17:1,1";

    #[test]
    fn snv_allele_freq_uses_tier2_counts() {
        let rec = record(SNV);
        assert_eq!(allele_freq(&rec, 0).unwrap().as_deref(), Some("0.03"));
        assert_eq!(allele_freq(&rec, 1).unwrap().as_deref(), Some("0.5"));
    }

    #[test]
    fn snv_allele_freq_multi_allelic() {
        let rec = record("chr1\t10\t.\tA\tG,T\t.\tPASS\t.\tAU:CU:GU:TU\t5,5:0,0:3,3:2,2");
        assert_eq!(allele_freq(&rec, 0).unwrap().as_deref(), Some("0.3,0.2"));
    }

    #[test]
    fn allele_freq_is_capped() {
        let rec = record("chr1\t20\t.\tCTG\tC\t.\tPASS\t.\tDP2:TAR\t10:4,15");
        assert_eq!(allele_freq(&rec, 0).unwrap().as_deref(), Some("1.00"));
        let exact = record("chr1\t20\t.\tCTG\tC\t.\tPASS\t.\tDP2:TAR\t10:4,10");
        assert_eq!(allele_freq(&exact, 0).unwrap().as_deref(), Some("1.0"));
    }

    #[test]
    fn indel_allele_freq_uses_tar_and_dp2() {
        let rec = record(INDEL);
        assert_eq!(allele_freq(&rec, 0).unwrap().as_deref(), Some("1.0"));
        assert_eq!(allele_freq(&rec, 1).unwrap().as_deref(), Some("0.55"));
    }

    #[test]
    fn depth_prefers_dp2() {
        assert_eq!(depth(&record(INDEL), 1).unwrap().as_deref(), Some("40"));
        assert_eq!(depth(&record(SNV), 1).unwrap().as_deref(), Some("40"));
        assert_eq!(depth(&record(SNV), 0).unwrap().as_deref(), Some("30"));
    }

    #[test]
    fn missing_counts_are_no_op() {
        let rec = record("chr1\t10\t.\tA\tG\t.\tPASS\t.\tDP:AU\t3:1,1");
        assert_eq!(allele_freq(&rec, 0).unwrap(), None);
        assert_eq!(depth(&rec, 0).unwrap(), None);
    }

    #[test]
    fn zero_depth_is_no_op() {
        let rec = record("chr1\t10\t.\tA\tG\t.\tPASS\t.\tAU:CU:GU:TU\t0,0:0,0:0,0:0,0");
        assert_eq!(allele_freq(&rec, 0).unwrap(), None);
        assert_eq!(depth(&rec, 0).unwrap().as_deref(), Some("0"));
    }

    #[test]
    fn malformed_tier_value_is_an_error() {
        let rec = record("chr1\t10\t.\tA\tG\t.\tPASS\t.\tAU:CU:GU:TU\t5:0,0:0,0:0,0");
        assert!(allele_freq(&rec, 0).is_err());
    }

    #[test]
    fn somatic_requires_pass_and_tumor() {
        let rec = record(SNV);
        assert_eq!(somatic(&rec, 0).unwrap().as_deref(), Some("0"));
        assert_eq!(somatic(&rec, 1).unwrap().as_deref(), Some("1"));
        let filtered = record(INDEL);
        assert_eq!(somatic(&filtered, 1).unwrap().as_deref(), Some("0"));
    }
}
