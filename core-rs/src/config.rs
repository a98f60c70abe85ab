/**
 * config.rs
 * Parser for qgraph.yaml run configuration
 *
 * Format:
 * ```yaml
 * endpoint: http://localhost:3030/kb/query
 * ontology: ontology.json
 * xmlMapping: xml_mapping.json
 * mode: select
 * onMalformedJustification: propagate
 * timeoutSecs: 60
 * ```
 *
 * Relative paths are resolved against the directory holding the file.
 * `mode` is the output form `compile` uses when `--mode` is not given; `ask`
 * always sends SELECT.
 */

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::drivers::DEFAULT_TIMEOUT_SECS;
use crate::errors::{QgError, Result};
use crate::ontology::QueryMode;
use crate::response::MalformedPolicy;

pub const CONFIG_FILE: &str = "qgraph.yaml";

fn default_timeout() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

/// qgraph.yaml file structure
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RunConfig {
    /// SPARQL endpoint URL; required for `ask`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<String>,
    /// Ontology mapping JSON
    pub ontology: PathBuf,
    /// Justification field -> XML tag mapping JSON
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub xml_mapping: Option<PathBuf>,
    #[serde(default)]
    pub mode: QueryMode,
    #[serde(default)]
    pub on_malformed_justification: MalformedPolicy,
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
}

impl RunConfig {
    pub fn new(ontology: impl Into<PathBuf>) -> Self {
        Self {
            endpoint: None,
            ontology: ontology.into(),
            xml_mapping: None,
            mode: QueryMode::default(),
            on_malformed_justification: MalformedPolicy::default(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }

    /// Load, resolve relative paths and validate
    ///
    /// # Example
    /// ```no_run
    /// use qgraph_core::RunConfig;
    ///
    /// let config = RunConfig::load("qgraph.yaml").unwrap();
    /// println!("{}", config.ontology.display());
    /// ```
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        if !path.exists() {
            return Err(QgError::FileNotFound(path.to_string_lossy().to_string()));
        }

        let content = fs::read_to_string(path)?;
        let mut config: RunConfig = serde_yaml::from_str(&content)?;

        if let Some(base) = path.parent() {
            config.resolve_paths(base);
        }
        config.validate()?;

        debug!(path = %path.display(), "loaded run configuration");
        Ok(config)
    }

    /// Load `qgraph.yaml` from a directory
    pub fn load_from_dir<P: AsRef<Path>>(dir: P) -> Result<Self> {
        Self::load(dir.as_ref().join(CONFIG_FILE))
    }

    /// Make relative file paths relative to `base`
    pub fn resolve_paths(&mut self, base: &Path) {
        if self.ontology.is_relative() {
            self.ontology = base.join(&self.ontology);
        }
        if let Some(mapping) = self.xml_mapping.as_mut() {
            if mapping.is_relative() {
                *mapping = base.join(&*mapping);
            }
        }
    }

    /// Ensures:
    /// - ontology path is non-empty
    /// - endpoint, when set, is an http(s) URL
    /// - timeout is positive
    pub fn validate(&self) -> Result<()> {
        if self.ontology.as_os_str().is_empty() {
            return Err(QgError::ValidationError("ontology cannot be empty".to_string()));
        }

        if let Some(endpoint) = &self.endpoint {
            if !(endpoint.starts_with("http://") || endpoint.starts_with("https://")) {
                return Err(QgError::ValidationError(format!(
                    "endpoint must be an http(s) URL, got '{}'",
                    endpoint
                )));
            }
        }

        if self.timeout_secs == 0 {
            return Err(QgError::ValidationError("timeoutSecs must be positive".to_string()));
        }

        Ok(())
    }

    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        fs::write(path.as_ref(), serde_yaml::to_string(self)?)?;
        Ok(())
    }
}
