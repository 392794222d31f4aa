//! Search Resources
//!
//! Everything the pipeline reads but never writes: the LaTeX rule set, the
//! language table, profiles, stopword lists and morphological dictionaries.
//! Built once at startup, either from the copies embedded in the binary or
//! from a resource directory with the same layout:
//!
//! ```text
//! languages.yaml
//! profiles.yaml
//! stopwords/<name>.json
//! morphology/<name>.tsv
//! ```
//!
//! Any unreadable or malformed file is fatal. A profile whose stopword list
//! is missing only loses stopword filtering.

use std::collections::{BTreeMap, HashMap};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use super::error::{Result, SearchError};
use super::latex::RuleSet;
use super::morphology::LemmaDictionary;
use super::profile::{
    LanguageProfile, LanguageRecord, LanguageTable, ProfileSpec, StemmingStrategy, SIMPLE_PROFILE,
};
use super::stopwords::StopwordSet;
use super::vectorizer::snowball_algorithm;
use crate::config::SearchConfig;

const EMBEDDED: &[(&str, &str)] = &[
    (
        "languages.yaml",
        include_str!("../../../resources/languages.yaml"),
    ),
    (
        "profiles.yaml",
        include_str!("../../../resources/profiles.yaml"),
    ),
    (
        "stopwords/english.json",
        include_str!("../../../resources/stopwords/english.json"),
    ),
    (
        "stopwords/polish.json",
        include_str!("../../../resources/stopwords/polish.json"),
    ),
    (
        "morphology/polish.tsv",
        include_str!("../../../resources/morphology/polish.tsv"),
    ),
];

/// Where resource files come from.
enum Source<'a> {
    Embedded,
    Directory(&'a Path),
}

impl Source<'_> {
    fn read(&self, relative: &str) -> Result<String> {
        match self {
            Self::Embedded => EMBEDDED
                .iter()
                .find(|(name, _)| *name == relative)
                .map(|(_, content)| content.to_string())
                .ok_or_else(|| SearchError::Resource {
                    path: PathBuf::from(relative),
                    source: io::Error::new(io::ErrorKind::NotFound, "not embedded"),
                }),
            Self::Directory(dir) => {
                let path = dir.join(relative);
                std::fs::read_to_string(&path).map_err(|source| SearchError::Resource { path, source })
            }
        }
    }
}

fn is_not_found(err: &SearchError) -> bool {
    matches!(err, SearchError::Resource { source, .. } if source.kind() == io::ErrorKind::NotFound)
}

// ============================================================================
// Resources
// ============================================================================

#[derive(Debug, Clone)]
pub struct SearchResources {
    rules: Arc<RuleSet>,
    languages: LanguageTable,
    profiles: HashMap<String, LanguageProfile>,
    stopwords: HashMap<String, StopwordSet>,
    dictionaries: HashMap<String, Arc<LemmaDictionary>>,
    default_profile: String,
}

impl SearchResources {
    /// Resources compiled into the binary.
    pub fn embedded(config: &SearchConfig) -> Result<Self> {
        Self::from_source(&Source::Embedded, config)
    }

    /// Resources read from `dir`.
    pub fn load(dir: &Path, config: &SearchConfig) -> Result<Self> {
        log::info!("Loading search resources from {}", dir.display());
        Self::from_source(&Source::Directory(dir), config)
    }

    /// `config.resources_dir` when set, the embedded copies otherwise.
    pub fn from_config(config: &SearchConfig) -> Result<Self> {
        match config.resources_dir.as_deref() {
            Some(dir) => Self::load(dir, config),
            None => Self::embedded(config),
        }
    }

    fn from_source(source: &Source<'_>, config: &SearchConfig) -> Result<Self> {
        let languages: Vec<LanguageRecord> =
            serde_yaml_ng::from_str(&source.read("languages.yaml")?)?;
        let specs: BTreeMap<String, ProfileSpec> =
            serde_yaml_ng::from_str(&source.read("profiles.yaml")?)?;

        let mut stopwords = HashMap::new();
        let mut dictionaries = HashMap::new();

        for spec in specs.values() {
            if let Some(name) = &spec.stopwords {
                if !stopwords.contains_key(name) {
                    match source.read(&format!("stopwords/{name}.json")) {
                        Ok(json) => {
                            stopwords.insert(name.clone(), StopwordSet::from_json(&json)?);
                        }
                        Err(err) if is_not_found(&err) => {
                            log::warn!("Stopword list '{name}' not found, filtering disabled");
                        }
                        Err(err) => return Err(err),
                    }
                }
            }

            if let Some(name) = &spec.dictionary {
                if !dictionaries.contains_key(name) {
                    let tsv = source.read(&format!("morphology/{name}.tsv"))?;
                    dictionaries.insert(name.clone(), Arc::new(LemmaDictionary::from_tsv(&tsv)?));
                }
            }
        }

        let profiles = specs
            .into_iter()
            .map(|(name, spec)| (name.clone(), LanguageProfile::from_spec(name, spec)))
            .collect();

        Self::from_parts(
            Arc::new(RuleSet::builtin()?),
            languages,
            profiles,
            stopwords,
            dictionaries,
            &config.default_profile,
        )
    }

    /// Assemble resources from already-built parts and check that they agree.
    pub fn from_parts(
        rules: Arc<RuleSet>,
        languages: Vec<LanguageRecord>,
        mut profiles: HashMap<String, LanguageProfile>,
        stopwords: HashMap<String, StopwordSet>,
        dictionaries: HashMap<String, Arc<LemmaDictionary>>,
        default_profile: &str,
    ) -> Result<Self> {
        if !profiles.contains_key(default_profile) {
            if default_profile == SIMPLE_PROFILE {
                profiles.insert(SIMPLE_PROFILE.to_string(), LanguageProfile::simple());
            } else {
                return Err(SearchError::Config(format!(
                    "default profile '{default_profile}' is not defined"
                )));
            }
        }

        for record in &languages {
            if !profiles.contains_key(&record.profile) {
                return Err(SearchError::Config(format!(
                    "language '{}' maps to unknown profile '{}'",
                    record.abbr, record.profile
                )));
            }
        }

        for profile in profiles.values() {
            match profile.strategy {
                StemmingStrategy::Dictionary => {
                    let known = profile
                        .dictionary
                        .as_ref()
                        .is_some_and(|name| dictionaries.contains_key(name));
                    if !known {
                        return Err(SearchError::Config(format!(
                            "profile '{}' uses dictionary stemming without a dictionary",
                            profile.name
                        )));
                    }
                }
                StemmingStrategy::Vectorizer => {
                    if let Some(algorithm) = &profile.algorithm {
                        snowball_algorithm(algorithm)?;
                    }
                }
            }
        }

        log::debug!(
            "Search resources ready: {} languages, {} profiles, {} rules",
            languages.len(),
            profiles.len(),
            rules.len()
        );

        Ok(Self {
            rules,
            languages: LanguageTable::new(languages),
            profiles,
            stopwords,
            dictionaries,
            default_profile: default_profile.to_string(),
        })
    }

    pub fn rules(&self) -> &Arc<RuleSet> {
        &self.rules
    }

    pub fn languages(&self) -> &LanguageTable {
        &self.languages
    }

    pub fn default_profile(&self) -> &str {
        &self.default_profile
    }

    pub fn profile(&self, name: &str) -> Option<&LanguageProfile> {
        self.profiles.get(name)
    }

    /// Profile by name, or the default profile when `name` is unknown.
    pub fn profile_or_default(&self, name: &str) -> &LanguageProfile {
        match self.profiles.get(name) {
            Some(profile) => profile,
            None => {
                log::debug!(
                    "Unknown profile '{name}', using '{}'",
                    self.default_profile
                );
                &self.profiles[&self.default_profile]
            }
        }
    }

    pub fn profiles(&self) -> impl Iterator<Item = &LanguageProfile> {
        self.profiles.values()
    }

    /// Stopwords of a profile, `None` when it filters nothing.
    pub fn stopwords(&self, profile: &LanguageProfile) -> Option<&StopwordSet> {
        profile
            .stopwords
            .as_ref()
            .and_then(|name| self.stopwords.get(name))
    }

    pub fn dictionary(&self, profile: &LanguageProfile) -> Option<&Arc<LemmaDictionary>> {
        profile
            .dictionary
            .as_ref()
            .and_then(|name| self.dictionaries.get(name))
    }
}
