use anyhow::{Context, Result};
use config::{Config, Environment, File};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::canonicalizer::link_cleanup::{DEFAULT_QUERY_ALLOW_LIST, DEFAULT_REDIRECTOR_MARKER};
use crate::canonicalizer::CleanupPolicy;
use crate::dedup::KeyStrategy;
use crate::sheet::{HighlightStyle, SheetOptions};

/// Config file looked up in the working directory when none is given
pub const DEFAULT_CONFIG_FILE: &str = "job_dedup";
/// Prefix of environment overrides, e.g. `JOB_DEDUP_TOP_RESUMES=5`
pub const ENV_PREFIX: &str = "JOB_DEDUP";
/// Worksheet holding the applications in a workbook
pub const DEFAULT_SHEET_NAME: &str = "Main";
/// Number of resumes listed in the summary
pub const TOP_RESUMES: usize = 10;

/// Settings for a dedup run
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DedupConfig {
    /// Sheet to read and, unless `output_path` is set, write back
    pub sheet_path: PathBuf,

    pub output_path: Option<PathBuf>,

    /// Worksheet read from `.xlsx` sheets; the first one is used when missing
    pub sheet_name: String,

    /// Directory for log files
    pub log_dir: PathBuf,

    pub key_strategy: KeyStrategy,

    /// Hosts whose query strings survive the loose cleanup
    pub query_allow_list: Vec<String>,

    pub redirector_marker: String,

    pub highlight_column: String,
    pub highlight_color: String,
    pub clear_color: String,

    pub top_resumes: usize,
}

impl Default for DedupConfig {
    fn default() -> Self {
        let style = HighlightStyle::default();
        Self {
            sheet_path: PathBuf::from("bid.csv"),
            output_path: None,
            sheet_name: DEFAULT_SHEET_NAME.to_string(),
            log_dir: PathBuf::from("logs"),
            key_strategy: KeyStrategy::default(),
            query_allow_list: DEFAULT_QUERY_ALLOW_LIST.iter().map(|s| s.to_string()).collect(),
            redirector_marker: DEFAULT_REDIRECTOR_MARKER.to_string(),
            highlight_column: style.column,
            highlight_color: style.duplicate_color,
            clear_color: style.clear_color,
            top_resumes: TOP_RESUMES,
        }
    }
}

impl DedupConfig {
    /// Layers defaults, the config file and `JOB_DEDUP_*` variables.
    ///
    /// An explicit `path` must exist; the default file is optional.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let file = match path {
            Some(path) => File::from(path).required(true),
            None => File::with_name(DEFAULT_CONFIG_FILE).required(false),
        };

        let config: Self = Config::builder()
            .add_source(file)
            .add_source(Environment::with_prefix(ENV_PREFIX).try_parsing(true))
            .build()
            .context("Failed to load configuration")?
            .try_deserialize()
            .context("Invalid configuration")?;

        debug!("Loaded configuration: {:?}", config);
        Ok(config)
    }

    pub fn cleanup_policy(&self) -> CleanupPolicy {
        CleanupPolicy {
            query_allow_list: self.query_allow_list.clone(),
            redirector_marker: self.redirector_marker.clone(),
        }
    }

    pub fn sheet_options(&self) -> SheetOptions {
        SheetOptions {
            path: self.sheet_path.clone(),
            output: self.output_path.clone(),
            sheet_name: self.sheet_name.clone(),
            style: self.highlight_style(),
        }
    }

    pub fn highlight_style(&self) -> HighlightStyle {
        HighlightStyle {
            column: self.highlight_column.clone(),
            duplicate_color: self.highlight_color.clone(),
            clear_color: self.clear_color.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use uuid::Uuid;

    #[test]
    fn test_defaults_match_original_colors() {
        let config = DedupConfig::default();
        assert_eq!(config.highlight_color, "FFFF00");
        assert_eq!(config.clear_color, "FFFFFF");
        assert_eq!(config.top_resumes, 10);
        assert_eq!(config.sheet_name, "Main");
        assert_eq!(config.cleanup_policy(), CleanupPolicy::default());
        assert_eq!(config.highlight_style(), HighlightStyle::default());
    }

    #[test]
    fn test_load_from_file() {
        let path = std::env::temp_dir().join(format!("job_dedup_config_{}.toml", Uuid::new_v4()));
        fs::write(
            &path,
            "sheet_path = \"apps.xlsx\"\nsheet_name = \"Bids\"\nkey_strategy = \"canonical\"\nquery_allow_list = [\"lever\"]\ntop_resumes = 3\n",
        )
        .unwrap();

        let config = DedupConfig::load(Some(&path)).unwrap();
        assert_eq!(config.sheet_path, PathBuf::from("apps.xlsx"));
        assert_eq!(config.sheet_options().sheet_name, "Bids");
        assert_eq!(config.key_strategy, KeyStrategy::Canonical);
        assert_eq!(config.query_allow_list, vec!["lever".to_string()]);
        assert_eq!(config.top_resumes, 3);
        // untouched keys keep their defaults
        assert_eq!(config.highlight_column, "HIGHLIGHT");
        fs::remove_file(path).unwrap();
    }

    #[test]
    fn test_missing_explicit_file_fails() {
        let path = std::env::temp_dir().join(format!("job_dedup_absent_{}.toml", Uuid::new_v4()));
        assert!(DedupConfig::load(Some(&path)).is_err());
    }
}
