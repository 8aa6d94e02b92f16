//! Configuration management with layered loading
//!
//! Precedence (lowest to highest):
//! 1. Compiled defaults
//! 2. Global config: `$XDG_CONFIG_HOME/wikitree/wikitree.toml`
//! 3. Local config: `<dir>/.wikitree.toml` (usually the working directory)
//! 4. Environment variables: `WIKITREE_*` prefix

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use config::{Config, ConfigError, Environment, Map};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::application::ApplicationError;
use crate::domain::NodeProperties;

/// Default number of children fetched per page.
pub const DEFAULT_PAGE_SIZE: usize = 15;

/// Default depth of `tree` rendering.
pub const DEFAULT_MAX_DEPTH: usize = 3;

const ENV_PREFIX: &str = "WIKITREE_";
const ENV_PROPERTIES_PREFIX: &str = "WIKITREE_PROPERTIES__";

/// Raw settings for intermediate parsing (`None` means "not specified, inherit").
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct RawSettings {
    pub tree_file: Option<PathBuf>,
    pub page_size: Option<usize>,
    pub max_depth: Option<usize>,
    pub properties: Option<BTreeMap<String, String>>,
}

/// Unified configuration for wikitree.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Settings {
    /// Tree file loaded when none is given on the command line
    pub tree_file: Option<PathBuf>,
    /// Children fetched per page
    pub page_size: usize,
    /// Levels rendered by `tree`
    pub max_depth: usize,
    /// Node properties forwarded with every query (locale, hierarchy mode, ...)
    pub properties: NodeProperties,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            tree_file: None,
            page_size: DEFAULT_PAGE_SIZE,
            max_depth: DEFAULT_MAX_DEPTH,
            properties: NodeProperties::new(),
        }
    }
}

/// Get the XDG config directory for wikitree.
pub fn global_config_dir() -> Option<PathBuf> {
    ProjectDirs::from("", "", "wikitree").map(|dirs| dirs.config_dir().to_path_buf())
}

/// Get the path to the global config file.
pub fn global_config_path() -> Option<PathBuf> {
    global_config_dir().map(|dir| dir.join("wikitree.toml"))
}

/// Get the path to the local config file in a directory.
pub fn local_config_path(dir: &Path) -> PathBuf {
    dir.join(".wikitree.toml")
}

/// Load a TOML file into RawSettings for manual merging.
fn load_raw_settings(path: &Path) -> Result<RawSettings, ApplicationError> {
    let content = std::fs::read_to_string(path).map_err(|e| ApplicationError::Config {
        message: format!("read {}: {}", path.display(), e),
    })?;
    toml::from_str(&content).map_err(|e| ApplicationError::Config {
        message: format!("parse {}: {}", path.display(), e),
    })
}

/// Expand `~`, `$VAR` and `${VAR}`; unexpandable input is kept as is.
fn expand_path(path: &Path) -> PathBuf {
    let raw = path.to_string_lossy();
    shellexpand::full(raw.as_ref())
        .map(|s| PathBuf::from(s.into_owned()))
        .unwrap_or_else(|_| path.to_path_buf())
}

impl Settings {
    /// Overlay a config layer.
    ///
    /// - Scalars: overlay wins if specified
    /// - Properties: merged key by key, overlay wins per key
    fn merge_with(&self, overlay: &RawSettings) -> Self {
        let properties = match &overlay.properties {
            Some(props) => self.properties.merged(&NodeProperties::from(props.clone())),
            None => self.properties.clone(),
        };
        Self {
            tree_file: overlay.tree_file.clone().or_else(|| self.tree_file.clone()),
            page_size: overlay.page_size.unwrap_or(self.page_size),
            max_depth: overlay.max_depth.unwrap_or(self.max_depth),
            properties,
        }
    }

    fn expand_paths(&mut self) {
        if let Some(tree_file) = &self.tree_file {
            self.tree_file = Some(expand_path(tree_file));
        }
    }

    fn validate(&self) -> Result<(), ApplicationError> {
        if self.page_size == 0 {
            return Err(ApplicationError::Config {
                message: "page_size must be at least 1".into(),
            });
        }
        Ok(())
    }

    /// Load settings with layered precedence.
    ///
    /// # Arguments
    /// * `local_dir` - Optional directory holding a `.wikitree.toml`
    pub fn load(local_dir: Option<&Path>) -> Result<Self, ApplicationError> {
        // 1. Start with defaults
        let mut current = Self::default();

        // 2. Global config
        if let Some(global_path) = global_config_path() {
            if global_path.exists() {
                debug!(path = %global_path.display(), "applying global config");
                current = current.merge_with(&load_raw_settings(&global_path)?);
            }
        }

        // 3. Local config
        if let Some(dir) = local_dir {
            let local_path = local_config_path(dir);
            if local_path.exists() {
                debug!(path = %local_path.display(), "applying local config");
                current = current.merge_with(&load_raw_settings(&local_path)?);
            }
        }

        // 4. Environment variables
        let vars = std::env::vars_os()
            .filter_map(|(key, value)| Some((key.into_string().ok()?, value.into_string().ok()?)));
        current = Self::apply_env_overrides(current, vars)?;

        current.expand_paths();
        current.validate()?;

        Ok(current)
    }

    /// Apply WIKITREE_* environment variables as explicit overrides.
    ///
    /// `WIKITREE_PAGE_SIZE=7` sets `page_size`; scalar names are
    /// case-insensitive. `WIKITREE_PROPERTIES__hierarchyMode=parentChild`
    /// sets a property, keeping the key's case as written.
    fn apply_env_overrides<I>(settings: Self, vars: I) -> Result<Self, ApplicationError>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let vars: Map<String, String> = vars
            .into_iter()
            .filter(|(key, _)| key.starts_with(ENV_PREFIX))
            .collect();

        // Property keys are case-sensitive; the config crate lowercases.
        let properties: BTreeMap<String, String> = vars
            .iter()
            .filter_map(|(key, value)| {
                key.strip_prefix(ENV_PROPERTIES_PREFIX)
                    .filter(|name| !name.is_empty())
                    .map(|name| (name.to_string(), value.clone()))
            })
            .collect();

        let config = Config::builder()
            .add_source(
                Environment::with_prefix("WIKITREE")
                    .prefix_separator("_")
                    .separator("__")
                    .source(Some(vars)),
            )
            .build()
            .map_err(config_err)?;

        let mut overlay = RawSettings::default();
        if let Ok(val) = config.get_string("tree_file") {
            overlay.tree_file = Some(PathBuf::from(val));
        }
        if let Ok(val) = config.get_string("page_size") {
            overlay.page_size = Some(parse_count("WIKITREE_PAGE_SIZE", &val)?);
        }
        if let Ok(val) = config.get_string("max_depth") {
            overlay.max_depth = Some(parse_count("WIKITREE_MAX_DEPTH", &val)?);
        }
        if !properties.is_empty() {
            overlay.properties = Some(properties);
        }

        Ok(settings.merge_with(&overlay))
    }

    /// Show the effective configuration as TOML.
    pub fn to_toml(&self) -> Result<String, ApplicationError> {
        toml::to_string_pretty(self).map_err(|e| ApplicationError::Config {
            message: format!("serialize config: {e}"),
        })
    }

    /// Generate a template config file.
    pub fn template() -> String {
        r#"# wikitree configuration
#
# Locations (by precedence, lowest to highest):
#   Global: ~/.config/wikitree/wikitree.toml
#   Local:  ./.wikitree.toml
#   Env:    WIKITREE_* environment variables (WIKITREE_PAGE_SIZE=30,
#           WIKITREE_PROPERTIES__locale=fr; property keys keep their case)

# Tree file used when --tree-file is not given
# tree_file = "~/wiki/tree.toml"

# Children fetched per page
# page_size = 15

# Levels shown by `wikitree tree`
# max_depth = 3

# Node properties forwarded to every provider (merged key by key)
[properties]
# locale = "en"
# hierarchyMode = "nestedPages"
"#
        .to_string()
    }
}

fn parse_count(name: &str, value: &str) -> Result<usize, ApplicationError> {
    value.trim().parse().map_err(|_| ApplicationError::Config {
        message: format!("{name}: expected a non-negative integer, got '{value}'"),
    })
}

fn config_err(e: ConfigError) -> ApplicationError {
    ApplicationError::Config {
        message: e.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn given_defaults_when_created_then_has_page_size_and_depth() {
        let settings = Settings::default();
        assert_eq!(settings.page_size, DEFAULT_PAGE_SIZE);
        assert_eq!(settings.max_depth, DEFAULT_MAX_DEPTH);
        assert!(settings.tree_file.is_none());
        assert!(settings.properties.is_empty());
    }

    #[test]
    fn given_overlay_properties_when_merging_then_merges_key_by_key() {
        let base = Settings {
            properties: NodeProperties::new()
                .with("locale", "en")
                .with("showTranslations", "true"),
            ..Settings::default()
        };
        let overlay = RawSettings {
            page_size: Some(50),
            properties: Some(BTreeMap::from([("locale".to_string(), "fr".to_string())])),
            ..RawSettings::default()
        };

        let merged = base.merge_with(&overlay);

        assert_eq!(merged.page_size, 50);
        assert_eq!(merged.max_depth, DEFAULT_MAX_DEPTH);
        assert_eq!(merged.properties.get("locale"), Some("fr"));
        assert_eq!(merged.properties.get("showTranslations"), Some("true"));
    }

    #[test]
    fn given_unspecified_overlay_when_merging_then_keeps_base() {
        let base = Settings {
            tree_file: Some(PathBuf::from("/srv/wiki/tree.toml")),
            ..Settings::default()
        };

        let merged = base.merge_with(&RawSettings::default());

        assert_eq!(merged, base);
    }

    #[test]
    fn given_tilde_in_tree_file_when_expand_paths_then_expands_to_home() {
        let mut settings = Settings {
            tree_file: Some(PathBuf::from("~/wiki/tree.toml")),
            ..Settings::default()
        };

        settings.expand_paths();

        let home = std::env::var("HOME").expect("HOME should be set");
        let expanded = settings.tree_file.unwrap();
        assert!(expanded.starts_with(&home), "expanded: {}", expanded.display());
    }

    #[test]
    fn given_zero_page_size_when_validating_then_config_error() {
        let settings = Settings {
            page_size: 0,
            ..Settings::default()
        };
        assert!(matches!(settings.validate(), Err(ApplicationError::Config { .. })));
    }

    fn vars(pairs: &[(&str, &str)]) -> Vec<(String, String)> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn given_single_underscore_prefix_vars_when_applying_env_then_scalars_override() {
        let env = vars(&[
            ("WIKITREE_PAGE_SIZE", "7"),
            ("WIKITREE_MAX_DEPTH", "1"),
            ("WIKITREE_TREE_FILE", "/srv/wiki/tree.toml"),
            ("UNRELATED_PAGE_SIZE", "99"),
        ]);

        let settings = Settings::apply_env_overrides(Settings::default(), env).unwrap();

        assert_eq!(settings.page_size, 7);
        assert_eq!(settings.max_depth, 1);
        assert_eq!(settings.tree_file, Some(PathBuf::from("/srv/wiki/tree.toml")));
    }

    #[test]
    fn given_camel_case_property_var_when_applying_env_then_key_case_preserved() {
        let base = Settings {
            properties: NodeProperties::new().with("locale", "en"),
            ..Settings::default()
        };
        let env = vars(&[("WIKITREE_PROPERTIES__hierarchyMode", "parentChild")]);

        let settings = Settings::apply_env_overrides(base, env).unwrap();

        assert_eq!(settings.properties.get("hierarchyMode"), Some("parentChild"));
        assert_eq!(settings.properties.get("locale"), Some("en"));
        assert_eq!(settings.page_size, DEFAULT_PAGE_SIZE);
    }

    #[test]
    fn given_non_numeric_page_size_var_when_applying_env_then_config_error() {
        let env = vars(&[("WIKITREE_PAGE_SIZE", "many")]);

        let err = Settings::apply_env_overrides(Settings::default(), env).unwrap_err();

        assert!(matches!(
            err,
            ApplicationError::Config { ref message } if message.contains("WIKITREE_PAGE_SIZE")
        ));
    }

    #[test]
    fn given_template_when_parsed_then_is_valid_toml() {
        let raw: RawSettings = toml::from_str(&Settings::template()).expect("template parses");
        assert!(raw.tree_file.is_none());
    }
}
