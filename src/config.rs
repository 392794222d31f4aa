use std::path::{Path, PathBuf};

use figment::providers::{Env, Format, Serialized, Toml};
use figment::Figment;
use serde::{Deserialize, Serialize};

use crate::core::search::latex::{LatexLanguage, DEFAULT_MAX_PASSES};
use crate::core::search::DEFAULT_ESCAPE_SEQUENCE;

/// Prefix of environment overrides, e.g. `TERMVEC_SEARCH__DEFAULT_PROFILE`.
pub const ENV_PREFIX: &str = "TERMVEC_";

/// Top-level application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub search: SearchConfig,
    pub log: LogConfig,
}

/// Search pipeline configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// Directory with `languages.yaml`, `profiles.yaml`, `stopwords/` and
    /// `morphology/`. Unset means the copies built into the binary.
    pub resources_dir: Option<PathBuf>,
    /// Replaces the `#` of a hashtag so tokenizers keep the tag.
    pub hashtag_escape: String,
    /// Upper bound on LaTeX rewrite passes per formula.
    pub latex_max_passes: usize,
    /// Phrase language for profiles without LaTeX phrases of their own.
    pub latex_default_language: LatexLanguage,
    /// Profile used for short texts and unknown languages.
    pub default_profile: String,
    /// Texts shorter than this (in characters) skip language detection.
    pub detect_min_length: usize,
    /// Minimum identifier probability for a candidate language.
    pub detect_threshold_prob: f64,
    pub detect_max_candidates: usize,
    /// Build batches on the rayon pool.
    pub parallel_batches: bool,
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    /// `EnvFilter` directives used when `RUST_LOG` is not set.
    pub filter: String,
    /// Directory for daily JSON log files. Unset means stderr only.
    pub dir: Option<PathBuf>,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            resources_dir: None,
            hashtag_escape: DEFAULT_ESCAPE_SEQUENCE.to_string(),
            latex_max_passes: DEFAULT_MAX_PASSES,
            latex_default_language: LatexLanguage::English,
            default_profile: "simple".to_string(),
            detect_min_length: 5,
            detect_threshold_prob: 0.3,
            detect_max_candidates: 3,
            parallel_batches: true,
        }
    }
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            filter: "info".to_string(),
            dir: None,
        }
    }
}

impl AppConfig {
    /// Layered sources, lowest precedence first: defaults, the user config
    /// file, `explicit`, then `TERMVEC_*` variables.
    pub fn figment(explicit: Option<&Path>) -> Figment {
        let mut figment = Figment::from(Serialized::defaults(AppConfig::default()));
        if let Some(path) = Self::user_config_path() {
            figment = figment.merge(Toml::file(path));
        }
        if let Some(path) = explicit {
            figment = figment.merge(Toml::file(path));
        }
        figment.merge(Env::prefixed(ENV_PREFIX).split("__"))
    }

    pub fn load(explicit: Option<&Path>) -> Result<Self, figment::Error> {
        if let Some(path) = explicit {
            if !path.exists() {
                log::warn!("Config file {} does not exist", path.display());
            }
        }
        let config: AppConfig = Self::figment(explicit).extract()?;
        log::debug!("Loaded configuration: {config:?}");
        Ok(config)
    }

    /// `termvec/termvec.toml` under the platform config directory.
    pub fn user_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join("termvec").join("termvec.toml"))
    }

    pub fn to_toml(&self) -> Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }
}
