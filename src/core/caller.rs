use std::fmt;

/// The variant callers whose output can be normalized and tagged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum CallerKind {
    VarScan,
    MuTect,
    Strelka,
    Unknown,
}

const VARSCAN_VARIANT_SUFFIXES: &[&str] = &[".snp.vcf", ".indel.vcf"];
const VARSCAN_HC_SUFFIXES: &[&str] = &[
    ".snp.Germline.hc",
    ".snp.LOH.hc",
    ".snp.Somatic.hc",
    ".indel.Germline.hc",
    ".indel.LOH.hc",
    ".indel.Somatic.hc",
];
const MUTECT_VARIANT_SUFFIXES: &[&str] = &[".vcf"];
const STRELKA_VARIANT_SUFFIXES: &[&str] = &[".snvs.vcf", ".indels.vcf"];

impl CallerKind {
    /// Known callers in detection priority order.
    pub const KNOWN: [CallerKind; 3] = [CallerKind::VarScan, CallerKind::MuTect, CallerKind::Strelka];

    pub fn name(self) -> &'static str {
        match self {
            CallerKind::VarScan => "VarScan",
            CallerKind::MuTect => "MuTect",
            CallerKind::Strelka => "Strelka",
            CallerKind::Unknown => "Unknown",
        }
    }

    /// Short code embedded in the tag names this caller produces.
    pub fn abbreviation(self) -> Option<&'static str> {
        match self {
            CallerKind::VarScan => Some("VS"),
            CallerKind::MuTect => Some("MT"),
            CallerKind::Strelka => Some("SK"),
            CallerKind::Unknown => None,
        }
    }

    fn signature(self) -> Option<&'static str> {
        match self {
            CallerKind::VarScan => Some("##source=VarScan2"),
            CallerKind::MuTect => Some("##MuTect"),
            CallerKind::Strelka => Some("##source=strelka"),
            CallerKind::Unknown => None,
        }
    }

    pub fn is_known(self) -> bool {
        self != CallerKind::Unknown
    }

    /// Identifies the caller from a file's metaheader lines; first match wins.
    pub fn detect<S: AsRef<str>>(metaheaders: &[S]) -> CallerKind {
        Self::KNOWN
            .into_iter()
            .find(|caller| {
                caller.signature().is_some_and(|signature| {
                    metaheaders
                        .iter()
                        .any(|line| line.as_ref().starts_with(signature))
                })
            })
            .unwrap_or(CallerKind::Unknown)
    }

    /// File-name suffixes of the variant files one sample must provide.
    pub fn variant_suffixes(self) -> &'static [&'static str] {
        match self {
            CallerKind::VarScan => VARSCAN_VARIANT_SUFFIXES,
            CallerKind::MuTect => MUTECT_VARIANT_SUFFIXES,
            CallerKind::Strelka => STRELKA_VARIANT_SUFFIXES,
            CallerKind::Unknown => &[],
        }
    }

    /// File-name suffixes of the high-confidence files one sample must provide.
    pub fn hc_suffixes(self) -> &'static [&'static str] {
        match self {
            CallerKind::VarScan => VARSCAN_HC_SUFFIXES,
            _ => &[],
        }
    }

    /// INFO flag marking high-confidence records after normalization.
    pub fn hc_info_flag(self) -> Option<String> {
        match self {
            CallerKind::VarScan => self.abbreviation().map(|abbr| format!("JQ_HC_{abbr}")),
            _ => None,
        }
    }
}

impl fmt::Display for CallerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detect_varscan() {
        let lines = ["##fileformat=VCFv4.1", "##source=VarScan2"];
        assert_eq!(CallerKind::detect(&lines), CallerKind::VarScan);
    }

    #[test]
    fn detect_mutect() {
        let lines = [
            "##fileformat=VCFv4.1",
            "##MuTect=\"analysis_type=MuTect input_file=[tumor.bam]\"",
        ];
        assert_eq!(CallerKind::detect(&lines), CallerKind::MuTect);
    }

    #[test]
    fn detect_strelka() {
        let lines = ["##fileformat=VCFv4.1", "##source=strelka", "##source_version=2.0.15"];
        assert_eq!(CallerKind::detect(&lines), CallerKind::Strelka);
    }

    #[test]
    fn detect_unknown() {
        let lines = ["##fileformat=VCFv4.1", "##source=freebayes"];
        assert_eq!(CallerKind::detect(&lines), CallerKind::Unknown);
        let empty: [&str; 0] = [];
        assert_eq!(CallerKind::detect(&empty), CallerKind::Unknown);
    }

    #[test]
    fn detect_requires_line_prefix() {
        let lines = ["##description=converted from ##source=VarScan2"];
        assert_eq!(CallerKind::detect(&lines), CallerKind::Unknown);
    }

    #[test]
    fn detect_uses_priority_order() {
        let lines = ["##source=strelka", "##source=VarScan2"];
        assert_eq!(CallerKind::detect(&lines), CallerKind::VarScan);
    }

    #[test]
    fn hc_flag_only_for_varscan() {
        assert_eq!(CallerKind::VarScan.hc_info_flag().as_deref(), Some("JQ_HC_VS"));
        assert_eq!(CallerKind::Strelka.hc_info_flag(), None);
        assert_eq!(CallerKind::VarScan.hc_suffixes().len(), 6);
        assert!(CallerKind::MuTect.hc_suffixes().is_empty());
    }
}
