use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::lintfix::rules::Rule;
use crate::utils::io;

/// Config file looked up in the root directory when no explicit path is given.
pub const CONFIG_FILE_NAME: &str = ".ansible-lintfix.json";

/// Root configuration structure for .ansible-lintfix.json
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct LintfixConfig {
    #[serde(default)]
    pub defaults: Defaults,
}

/// All configurable defaults that can be overridden via .ansible-lintfix.json
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Defaults {
    /// Glob patterns, relative to the root, naming the files to rewrite.
    #[serde(default = "default_patterns")]
    pub patterns: Vec<String>,

    /// Glob patterns matched against root-relative paths to skip.
    #[serde(default)]
    pub exclude: Vec<String>,

    #[serde(default = "default_rules")]
    pub rules: Vec<Rule>,

    /// Extra or overriding short name → FQCN entries.
    #[serde(default)]
    pub fqcn: BTreeMap<String, String>,
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            patterns: default_patterns(),
            exclude: Vec::new(),
            rules: default_rules(),
            fqcn: BTreeMap::new(),
        }
    }
}

// =============================================================================
// Default value functions
// =============================================================================

fn default_patterns() -> Vec<String> {
    vec![
        "playbooks/*.yml".to_string(),
        "roles/*/tasks/*.yml".to_string(),
        "roles/*/handlers/*.yml".to_string(),
        "roles/*/defaults/*.yml".to_string(),
    ]
}

fn default_rules() -> Vec<Rule> {
    Rule::ALL.to_vec()
}

// =============================================================================
// Loading functions
// =============================================================================

/// Where the config came from, for reporting.
#[derive(Debug, Clone, Serialize)]
pub struct LoadedConfig {
    pub config: LintfixConfig,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
}

/// Load config for a root directory.
///
/// An explicit `config_path` must exist. Without one, `<root>/.ansible-lintfix.json`
/// is used when present and built-in defaults otherwise. Invalid JSON is an
/// error in both cases.
pub fn load_config(root: &Path, config_path: Option<&Path>) -> crate::Result<LoadedConfig> {
    let path: PathBuf = match config_path {
        Some(explicit) => {
            if !explicit.is_file() {
                return Err(crate::Error::validation_invalid_argument(
                    "config",
                    format!("Config file not found: {}", explicit.display()),
                    Some(explicit.display().to_string()),
                    None,
                ));
            }
            explicit.to_path_buf()
        }
        None => {
            let implicit = root.join(CONFIG_FILE_NAME);
            if !implicit.is_file() {
                return Ok(LoadedConfig {
                    config: LintfixConfig::default(),
                    path: None,
                });
            }
            implicit
        }
    };

    let config = load_config_from_file(&path)?;
    log_status!("config", "Loaded {}", path.display());

    Ok(LoadedConfig {
        config,
        path: Some(path.display().to_string()),
    })
}

fn load_config_from_file(path: &Path) -> crate::Result<LintfixConfig> {
    let content = io::read_file(path, &format!("read {}", path.display()))?;

    let config: LintfixConfig = serde_json::from_str(&content)
        .map_err(|e| crate::Error::config_invalid_json(path.display().to_string(), e))?;

    validate(&config.defaults)?;

    Ok(config)
}

fn validate(defaults: &Defaults) -> crate::Result<()> {
    if defaults.patterns.is_empty() {
        return Err(crate::Error::config_invalid_value(
            "defaults.patterns",
            None,
            "At least one file pattern is required",
        ));
    }

    if let Some(blank) = defaults.patterns.iter().find(|p| p.trim().is_empty()) {
        return Err(crate::Error::config_invalid_value(
            "defaults.patterns",
            Some(blank.clone()),
            "File patterns must not be empty",
        ));
    }

    Ok(())
}

/// Get built-in defaults (ignoring any file config)
pub fn builtin_defaults() -> Defaults {
    Defaults::default()
}
