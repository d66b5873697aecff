use crate::core::caller::CallerKind;
use std::{collections::BTreeMap, path::PathBuf};

pub const DEFAULT_TAG_VERSION: &str = "0.1";
pub const DEFAULT_CONSENSUS_FILENAME: &str = "consensus.vcf";

pub const MERGED_SUFFIX: &str = ".merged.vcf";
pub const TAGGED_SUFFIX: &str = ".jacquardTags.vcf";
pub const HC_SOMATIC_SUFFIX: &str = "_HCsomatic.vcf";

pub const METAHEADER_PREFIX: &str = "##jacquard";

/// Run-wide settings shared by every command.
#[derive(Debug, Clone)]
pub struct JacquardConfig {
    pub version: String,
    pub command_line: String,
    pub cwd: PathBuf,
    pub caller_versions: BTreeMap<CallerKind, String>,
}

impl JacquardConfig {
    pub fn new(version: impl Into<String>, command_line: impl Into<String>, cwd: PathBuf) -> Self {
        let caller_versions = CallerKind::KNOWN
            .iter()
            .map(|caller| (*caller, DEFAULT_TAG_VERSION.to_string()))
            .collect();
        Self {
            version: version.into(),
            command_line: command_line.into(),
            cwd,
            caller_versions,
        }
    }

    pub fn caller_version(&self, caller: CallerKind) -> &str {
        self.caller_versions
            .get(&caller)
            .map(String::as_str)
            .unwrap_or(DEFAULT_TAG_VERSION)
    }

    /// Metaheaders describing the run, written ahead of command-specific lines.
    pub fn execution_metaheaders(&self) -> Vec<String> {
        vec![
            format!("{METAHEADER_PREFIX}.version={}", self.version),
            format!("{METAHEADER_PREFIX}.command={}", self.command_line),
            format!("{METAHEADER_PREFIX}.cwd={}", self.cwd.display()),
        ]
    }
}

#[cfg(test)]
pub(crate) fn test_config() -> JacquardConfig {
    JacquardConfig::new("0.1.0", "jacquard test", PathBuf::from("/tmp"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn execution_metaheaders_are_ordered() {
        let config = test_config();
        assert_eq!(
            config.execution_metaheaders(),
            vec![
                "##jacquard.version=0.1.0".to_string(),
                "##jacquard.command=jacquard test".to_string(),
                "##jacquard.cwd=/tmp".to_string(),
            ]
        );
    }

    #[test]
    fn every_known_caller_has_a_version() {
        let config = test_config();
        for caller in CallerKind::KNOWN {
            assert_eq!(config.caller_version(caller), DEFAULT_TAG_VERSION);
        }
    }
}
