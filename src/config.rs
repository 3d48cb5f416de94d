//! Configuration loading
//!
//! Values come from an optional TOML file; the CLI applies flag/env overrides on top.
//! Nothing is discovered implicitly: every lexicon or dictionary path is explicit.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::nlp::analyzer::{DictType, MecabOptions};
use crate::nlp::lexicon::DefaultSource;
use crate::nlp::splitter::DEFAULT_DELIMITER;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub mecab: MecabConfig,
    pub lexicon: LexiconConfig,
    pub splitter: SplitterConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MecabConfig {
    pub binary: PathBuf,
    pub config_binary: PathBuf,
    pub dict_type: DictType,
    pub dicdir: Option<PathBuf>,
    /// Compiled user dictionary passed with `-u`
    pub userdict: Option<PathBuf>,
}

impl Default for MecabConfig {
    fn default() -> Self {
        let defaults = MecabOptions::default();
        Self {
            binary: defaults.binary,
            config_binary: defaults.config_binary,
            dict_type: defaults.dict_type,
            dicdir: defaults.dicdir,
            userdict: defaults.userdict,
        }
    }
}

impl MecabConfig {
    pub fn options(&self) -> MecabOptions {
        MecabOptions {
            binary: self.binary.clone(),
            config_binary: self.config_binary.clone(),
            dict_type: self.dict_type,
            dicdir: self.dicdir.clone(),
            userdict: self.userdict.clone(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LexiconConfig {
    /// `term,label` override file merged into the noun lexicon
    pub noun: Option<PathBuf>,
    /// `term,label` override file merged into the wago lexicon
    pub wago: Option<PathBuf>,
    /// JSON replacing the bundled noun lexicon
    pub noun_default: Option<PathBuf>,
    /// JSON replacing the bundled wago lexicon
    pub wago_default: Option<PathBuf>,
    pub stopwords: Option<PathBuf>,
    /// Extra negation markers on top of the defaults
    pub negation: Vec<String>,
}

impl LexiconConfig {
    pub fn noun_source(&self) -> DefaultSource {
        source(&self.noun_default)
    }

    pub fn wago_source(&self) -> DefaultSource {
        source(&self.wago_default)
    }
}

fn source(path: &Option<PathBuf>) -> DefaultSource {
    match path {
        Some(p) => DefaultSource::File(p.clone()),
        None => DefaultSource::Bundled,
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SplitterConfig {
    pub delimiter: String,
}

impl Default for SplitterConfig {
    fn default() -> Self {
        Self {
            delimiter: DEFAULT_DELIMITER.to_string(),
        }
    }
}

impl Config {
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("cannot read {}: {}", path.display(), e)))?;
        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Loads `path` when given, otherwise returns defaults.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(p) => Self::load(p),
            None => Ok(Self::default()),
        }
    }
}
