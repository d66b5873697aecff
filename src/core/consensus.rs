//! Cross-caller consensus tags and range z-scores.
//!
//! Pass 1 combines each sample's `JQ_<CALLER>_*` tags into sums, averages
//! and ranges, collecting the non-zero ranges into population lists. Pass 2
//! turns each range into a z-score against its population.

use crate::{
    constants::{JacquardConfig, METAHEADER_PREFIX},
    core::{
        record::{FormatTagMap, VcfRecord},
        tags::TagFamily,
    },
    utils::util::{format_float, parse_optional_f64, round_float_two_digits, Result, MISSING_VALUE},
};

pub const SOM_SUM_TAG: &str = "JQ_SOM_SUM";
pub const AF_AVERAGE_TAG: &str = "JQ_AF_AVERAGE";
pub const DP_AVERAGE_TAG: &str = "JQ_DP_AVERAGE";
pub const AF_RANGE_TAG: &str = "JQ_AF_RANGE";
pub const DP_RANGE_TAG: &str = "JQ_DP_RANGE";
pub const AF_ZSCORE_TAG: &str = "JQ_AF_RANGE_ZSCORE";
pub const DP_ZSCORE_TAG: &str = "JQ_DP_RANGE_ZSCORE";

/// Per-caller values of one sample, split by comma position.
#[derive(Debug, Default)]
struct SampleInputs {
    somatic: Vec<i64>,
    allele_freqs: Vec<Vec<Option<f64>>>,
    depths: Vec<Vec<Option<f64>>>,
}

fn parse_positions(tag: &str, value: &str) -> Result<Vec<Option<f64>>> {
    value
        .split(',')
        .map(|item| {
            parse_optional_f64(item)
                .map_err(|_| crate::jacquard_error!("{tag} value '{value}' is not numeric"))
        })
        .collect()
}

fn collect_inputs(sample: &FormatTagMap) -> Result<SampleInputs> {
    let mut inputs = SampleInputs::default();
    for (tag, value) in sample {
        let Some(family) = TagFamily::classify(tag) else {
            continue;
        };
        if value == MISSING_VALUE {
            continue;
        }
        match family {
            TagFamily::Somatic => {
                let status = value
                    .parse::<i64>()
                    .map_err(|_| crate::jacquard_error!("{tag} value '{value}' is not an integer"))?;
                inputs.somatic.push(status);
            }
            TagFamily::AlleleFreq => inputs.allele_freqs.push(parse_positions(tag, value)?),
            TagFamily::Depth => inputs.depths.push(parse_positions(tag, value)?),
        }
    }
    Ok(inputs)
}

/// Applies `combine` to the values present at each comma position.
fn per_position(values: &[Vec<Option<f64>>], combine: impl Fn(&[f64]) -> f64) -> Vec<Option<f64>> {
    let width = values.iter().map(Vec::len).max().unwrap_or(0);
    (0..width)
        .map(|position| {
            let present: Vec<f64> = values
                .iter()
                .filter_map(|caller_values| caller_values.get(position).copied().flatten())
                .collect();
            (!present.is_empty()).then(|| combine(&present))
        })
        .collect()
}

fn average(values: &[f64]) -> f64 {
    values.iter().sum::<f64>() / values.len() as f64
}

fn range(values: &[f64]) -> f64 {
    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let min = values.iter().copied().fold(f64::INFINITY, f64::min);
    max - min
}

fn format_positions(values: &[Option<f64>]) -> Result<String> {
    if values.iter().all(Option::is_none) {
        return Ok(MISSING_VALUE.to_string());
    }
    let rendered = values
        .iter()
        .map(|value| match value {
            Some(value) => round_float_two_digits(*value),
            None => Ok(MISSING_VALUE.to_string()),
        })
        .collect::<Result<Vec<_>>>()?;
    Ok(rendered.join(","))
}

/// Mean and standard deviation of a population of ranges.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PopulationStats {
    pub mean: f64,
    pub std: f64,
}

impl PopulationStats {
    /// Population (divide by N) statistics; `None` for an empty list.
    pub fn from_values(values: &[f64]) -> Option<Self> {
        if values.is_empty() {
            return None;
        }
        let mean = average(values);
        let variance = values
            .iter()
            .map(|value| (value - mean).powi(2))
            .sum::<f64>()
            / values.len() as f64;
        Some(PopulationStats {
            mean,
            std: variance.sqrt(),
        })
    }

    /// `None` when the population has no spread.
    pub fn zscore(&self, value: f64) -> Option<f64> {
        (self.std > 0.0).then(|| (value - self.mean) / self.std)
    }
}

/// Statistics for both range families, known once pass 1 has seen every record.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ConsensusStats {
    pub allele_freq: Option<PopulationStats>,
    pub depth: Option<PopulationStats>,
}

impl ConsensusStats {
    /// Mean and standard deviation of each population; `.` when no z-score
    /// could be computed from it.
    pub fn metaheaders(&self) -> Vec<String> {
        let mut lines = Vec::new();
        for (tag, label, stats) in [
            (AF_ZSCORE_TAG, "AF", self.allele_freq),
            (DP_ZSCORE_TAG, "DP", self.depth),
        ] {
            let (mean, std) = match stats {
                Some(stats) if stats.std > 0.0 => (format_float(stats.mean), format_float(stats.std)),
                _ => (MISSING_VALUE.to_string(), MISSING_VALUE.to_string()),
            };
            lines.push(format!(
                "{METAHEADER_PREFIX}.consensus.{tag}.mean_{label}_range={mean}"
            ));
            lines.push(format!(
                "{METAHEADER_PREFIX}.consensus.{tag}.standard_deviation_{label}_range={std}"
            ));
        }
        lines
    }
}

/// Pass 1 state: population lists of non-zero ranges.
#[derive(Debug, Default)]
pub struct ConsensusAccumulator {
    allele_freq_ranges: Vec<f64>,
    depth_ranges: Vec<f64>,
}

impl ConsensusAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds the pass 1 consensus tags to every sample of the record.
    pub fn annotate(&mut self, record: &mut VcfRecord) -> Result<()> {
        for sample in record.samples.iter_mut() {
            let inputs = collect_inputs(sample)?;

            let som_sum: i64 = inputs.somatic.iter().sum();
            let af_average = format_positions(&per_position(&inputs.allele_freqs, average))?;
            let dp_average = format_positions(&per_position(&inputs.depths, average))?;
            let af_range = format_positions(&per_position(&inputs.allele_freqs, range))?;
            let dp_range = format_positions(&per_position(&inputs.depths, range))?;

            collect_nonzero(&af_range, &mut self.allele_freq_ranges)?;
            collect_nonzero(&dp_range, &mut self.depth_ranges)?;

            sample.insert(SOM_SUM_TAG.to_string(), som_sum.to_string());
            sample.insert(AF_AVERAGE_TAG.to_string(), af_average);
            sample.insert(DP_AVERAGE_TAG.to_string(), dp_average);
            sample.insert(AF_RANGE_TAG.to_string(), af_range);
            sample.insert(DP_RANGE_TAG.to_string(), dp_range);
        }
        Ok(())
    }

    pub fn allele_freq_ranges(&self) -> &[f64] {
        &self.allele_freq_ranges
    }

    pub fn depth_ranges(&self) -> &[f64] {
        &self.depth_ranges
    }

    pub fn stats(&self) -> ConsensusStats {
        ConsensusStats {
            allele_freq: PopulationStats::from_values(&self.allele_freq_ranges),
            depth: PopulationStats::from_values(&self.depth_ranges),
        }
    }
}

fn collect_nonzero(rendered: &str, population: &mut Vec<f64>) -> Result<()> {
    for value in parse_positions("range", rendered)?.into_iter().flatten() {
        if value != 0.0 {
            population.push(value);
        }
    }
    Ok(())
}

fn zscores(range: Option<&String>, stats: Option<PopulationStats>) -> Result<String> {
    let (Some(range), Some(stats)) = (range, stats) else {
        return Ok(MISSING_VALUE.to_string());
    };
    let values: Vec<Option<f64>> = parse_positions("range", range)?
        .into_iter()
        .map(|value| value.and_then(|value| stats.zscore(value)))
        .collect();
    format_positions(&values)
}

/// Pass 2: adds range z-scores to every sample of a pass 1 record.
pub fn annotate_zscores(record: &mut VcfRecord, stats: &ConsensusStats) -> Result<()> {
    for sample in record.samples.iter_mut() {
        let af_zscore = zscores(sample.get(AF_RANGE_TAG), stats.allele_freq)?;
        let dp_zscore = zscores(sample.get(DP_RANGE_TAG), stats.depth)?;
        sample.insert(AF_ZSCORE_TAG.to_string(), af_zscore);
        sample.insert(DP_ZSCORE_TAG.to_string(), dp_zscore);
    }
    Ok(())
}

fn format_definition(tag: &str, number: &str, value_type: &str, description: &str, config: &JacquardConfig) -> String {
    format!(
        "##FORMAT=<ID={tag},Number={number},Type={value_type},Description=\"{description}\",Source=\"Jacquard\",Version={}>",
        config.version
    )
}

/// `##FORMAT` definitions of the pass 1 tags.
pub fn consensus_metaheaders(config: &JacquardConfig) -> Vec<String> {
    vec![
        format_definition(SOM_SUM_TAG, "1", "Integer", "Jacquard consensus somatic call = sum of JQ_*_HC_SOM values across callers", config),
        format_definition(AF_AVERAGE_TAG, "A", "Float", "Jacquard consensus allele frequency = average of JQ_*_AF values across callers", config),
        format_definition(DP_AVERAGE_TAG, "1", "Float", "Jacquard consensus depth = average of JQ_*_DP values across callers", config),
        format_definition(AF_RANGE_TAG, "A", "Float", "Jacquard allele frequency range = max(JQ_*_AF) - min(JQ_*_AF) across callers", config),
        format_definition(DP_RANGE_TAG, "1", "Float", "Jacquard depth range = max(JQ_*_DP) - min(JQ_*_DP) across callers", config),
    ]
}

/// `##FORMAT` definitions of the pass 2 tags.
pub fn zscore_metaheaders(config: &JacquardConfig) -> Vec<String> {
    vec![
        format_definition(AF_ZSCORE_TAG, "A", "Float", "Jacquard allele frequency range z-score = (JQ_AF_RANGE - population mean) / population standard deviation", config),
        format_definition(DP_ZSCORE_TAG, "1", "Float", "Jacquard depth range z-score = (JQ_DP_RANGE - population mean) / population standard deviation", config),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use std::path::Path;

    const FORMAT: &str = "JQ_VS_AF:JQ_VS_DP:JQ_VS_HC_SOM:JQ_MT_AF:JQ_MT_DP:JQ_MT_HC_SOM:JQ_SK_AF:JQ_SK_DP:JQ_SK_HC_SOM";

    fn record(samples: &[&str]) -> VcfRecord {
        let line = format!("chr1\t10\t.\tA\tG\t.\tPASS\t.\t{FORMAT}\t{}", samples.join("\t"));
        VcfRecord::from_line(&line, Path::new("merged.vcf"), 1).unwrap()
    }

    #[test]
    fn somatic_sum_counts_callers() -> Result<()> {
        let mut rec = record(&["0.2:10:1:0.3:20:1:0.25:30:0", "0.2:10:0:0.3:20:0:0.25:30:0"]);
        ConsensusAccumulator::new().annotate(&mut rec)?;
        assert_eq!(rec.samples[0][SOM_SUM_TAG], "2");
        assert_eq!(rec.samples[1][SOM_SUM_TAG], "0");
        Ok(())
    }

    #[test]
    fn averages_and_ranges() -> Result<()> {
        let mut rec = record(&["0.2:10:1:0.3:20:1:0.25:30:0"]);
        let mut accumulator = ConsensusAccumulator::new();
        accumulator.annotate(&mut rec)?;
        let sample = &rec.samples[0];
        assert_eq!(sample[AF_AVERAGE_TAG], "0.25");
        assert_eq!(sample[DP_AVERAGE_TAG], "20.0");
        assert_eq!(sample[AF_RANGE_TAG], "0.1");
        assert_eq!(sample[DP_RANGE_TAG], "20.0");
        assert_eq!(accumulator.allele_freq_ranges(), &[0.1]);
        assert_eq!(accumulator.depth_ranges(), &[20.0]);
        Ok(())
    }

    #[test]
    fn missing_values_are_excluded() -> Result<()> {
        let mut rec = record(&[".:.:.:0.3:20:1:0.5:40:."]);
        ConsensusAccumulator::new().annotate(&mut rec)?;
        let sample = &rec.samples[0];
        assert_eq!(sample[SOM_SUM_TAG], "1");
        assert_eq!(sample[AF_AVERAGE_TAG], "0.4");
        assert_eq!(sample[DP_AVERAGE_TAG], "30.0");
        Ok(())
    }

    #[test]
    fn single_caller_has_zero_range_outside_population() -> Result<()> {
        let line = "chr1\t10\t.\tA\tG\t.\tPASS\t.\tJQ_VS_AF:JQ_VS_DP\t0.2:10";
        let mut rec = VcfRecord::from_line(line, Path::new("x.vcf"), 1)?;
        let mut accumulator = ConsensusAccumulator::new();
        accumulator.annotate(&mut rec)?;
        assert_eq!(rec.samples[0][AF_RANGE_TAG], "0.0");
        assert_eq!(rec.samples[0][SOM_SUM_TAG], "0");
        assert!(accumulator.allele_freq_ranges().is_empty());
        assert_eq!(accumulator.stats(), ConsensusStats::default());
        Ok(())
    }

    #[test]
    fn no_caller_tags_yield_missing() -> Result<()> {
        let line = "chr1\t10\t.\tA\tG\t.\tPASS\t.\tGT:DP\t0/1:10";
        let mut rec = VcfRecord::from_line(line, Path::new("x.vcf"), 1)?;
        ConsensusAccumulator::new().annotate(&mut rec)?;
        assert_eq!(rec.samples[0][SOM_SUM_TAG], "0");
        assert_eq!(rec.samples[0][AF_AVERAGE_TAG], ".");
        assert_eq!(rec.samples[0][DP_RANGE_TAG], ".");
        Ok(())
    }

    #[test]
    fn multi_allelic_values_are_combined_per_position() -> Result<()> {
        let line = "chr1\t10\t.\tA\tG,T\t.\tPASS\t.\tJQ_VS_AF:JQ_MT_AF\t0.2,0.4:0.3,0.1";
        let mut rec = VcfRecord::from_line(line, Path::new("x.vcf"), 1)?;
        ConsensusAccumulator::new().annotate(&mut rec)?;
        assert_eq!(rec.samples[0][AF_AVERAGE_TAG], "0.25,0.25");
        assert_eq!(rec.samples[0][AF_RANGE_TAG], "0.1,0.3");
        Ok(())
    }

    #[test]
    fn non_numeric_input_is_an_error() {
        let line = "chr1\t10\t.\tA\tG\t.\tPASS\t.\tJQ_VS_HC_SOM\tyes";
        let mut rec = VcfRecord::from_line(line, Path::new("x.vcf"), 1).unwrap();
        assert!(ConsensusAccumulator::new().annotate(&mut rec).is_err());
    }

    #[test]
    fn population_stats() {
        let stats = PopulationStats::from_values(&[0.1, 0.2, 0.3]).unwrap();
        assert_abs_diff_eq!(stats.mean, 0.2, epsilon = 1e-12);
        assert_abs_diff_eq!(stats.std, (0.02f64 / 3.0).sqrt(), epsilon = 1e-12);
        assert_eq!(PopulationStats::from_values(&[]), None);
        let flat = PopulationStats::from_values(&[0.5, 0.5]).unwrap();
        assert_eq!(flat.zscore(0.5), None);
    }

    #[test]
    fn zscores_match_definition() -> Result<()> {
        let values = [0.1, 0.2, 0.4];
        let stats = PopulationStats::from_values(&values).unwrap();
        let consensus = ConsensusStats {
            allele_freq: Some(stats),
            depth: None,
        };
        for value in values {
            let line = format!("chr1\t10\t.\tA\tG\t.\tPASS\t.\t{AF_RANGE_TAG}:{DP_RANGE_TAG}\t{value}:5.0");
            let mut rec = VcfRecord::from_line(&line, Path::new("x.vcf"), 1)?;
            annotate_zscores(&mut rec, &consensus)?;
            let zscore: f64 = rec.samples[0][AF_ZSCORE_TAG].parse()?;
            assert_abs_diff_eq!(zscore, (value - stats.mean) / stats.std, epsilon = 0.0051);
            assert_eq!(rec.samples[0][DP_ZSCORE_TAG], ".");
        }
        Ok(())
    }

    #[test]
    fn missing_range_yields_missing_zscore() -> Result<()> {
        let line = format!("chr1\t10\t.\tA\tG\t.\tPASS\t.\t{AF_RANGE_TAG}\t.");
        let mut rec = VcfRecord::from_line(&line, Path::new("x.vcf"), 1)?;
        let consensus = ConsensusStats {
            allele_freq: PopulationStats::from_values(&[0.1, 0.3]),
            depth: None,
        };
        annotate_zscores(&mut rec, &consensus)?;
        assert_eq!(rec.samples[0][AF_ZSCORE_TAG], ".");
        Ok(())
    }

    #[test]
    fn stats_metaheaders() {
        let stats = ConsensusStats {
            allele_freq: PopulationStats::from_values(&[0.1, 0.3]),
            depth: None,
        };
        assert_eq!(
            stats.metaheaders(),
            vec![
                "##jacquard.consensus.JQ_AF_RANGE_ZSCORE.mean_AF_range=0.2",
                "##jacquard.consensus.JQ_AF_RANGE_ZSCORE.standard_deviation_AF_range=0.1",
                "##jacquard.consensus.JQ_DP_RANGE_ZSCORE.mean_DP_range=.",
                "##jacquard.consensus.JQ_DP_RANGE_ZSCORE.standard_deviation_DP_range=.",
            ]
        );
    }
}
