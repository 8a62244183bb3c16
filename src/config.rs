//! Configuration handling for replica templates.
//! This module locates the template configuration file, validates it against the
//! bundled JSON schema, deserializes the declared variables and hooks, and writes
//! the document back when `lint --fix` prunes variables.

use crate::constants::{CAPITALIZED, CONFIG_FILES, CONFIG_SCHEMA, DEFAULT_CONFIG_FILE, DEFAULT_IGNORE_PATTERNS, SCHEMA_URL};
use crate::error::{Error, Result};
use indexmap::IndexMap;
use log::debug;
use serde::Deserialize;
use std::fmt;
use std::path::{Path, PathBuf};

/// Type of a declared template variable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VariableType {
    String,
    Number,
    Boolean,
    Regex,
    Choice,
}

impl fmt::Display for VariableType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            VariableType::String => "string",
            VariableType::Number => "number",
            VariableType::Boolean => "boolean",
            VariableType::Regex => "regex",
            VariableType::Choice => "choice",
        };
        write!(f, "{name}")
    }
}

fn default_required() -> bool {
    true
}

/// A variable declared in `template.variables`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct VariableSpec {
    /// Key of the variable in the configuration, filled after deserialization
    #[serde(skip)]
    pub name: String,
    #[serde(rename = "type")]
    pub variable_type: VariableType,
    #[serde(default = "default_required")]
    pub required: bool,
    #[serde(default)]
    pub description: Option<String>,
    /// Type-specific qualifier: a pattern for `regex`, the labels for `choice`
    #[serde(default)]
    pub item: Option<serde_json::Value>,
    #[serde(default)]
    pub default: Option<serde_json::Value>,
}

impl VariableSpec {
    pub fn new<S: Into<String>>(name: S, variable_type: VariableType) -> Self {
        Self {
            name: name.into(),
            variable_type,
            required: true,
            description: None,
            item: None,
            default: None,
        }
    }

    pub fn with_item(mut self, item: serde_json::Value) -> Self {
        self.item = Some(item);
        self
    }

    pub fn optional(mut self) -> Self {
        self.required = false;
        self
    }

    /// Pattern of a `regex` variable.
    pub fn pattern(&self) -> Option<&str> {
        match self.variable_type {
            VariableType::Regex => self.item.as_ref().and_then(|item| item.as_str()),
            _ => None,
        }
    }

    /// Labels of a `choice` variable, in declaration order.
    pub fn choices(&self) -> Vec<&str> {
        match (self.variable_type, &self.item) {
            (VariableType::Choice, Some(serde_json::Value::Array(items))) => {
                items.iter().filter_map(|item| item.as_str()).collect()
            }
            _ => Vec::new(),
        }
    }

    /// Whether boolean values keep their natural casing (`True`/`False`).
    pub fn is_capitalized(&self) -> bool {
        self.item.as_ref().and_then(|item| item.as_str()) == Some(CAPITALIZED)
    }

    /// Checks the type-specific invariants of the `item` qualifier.
    pub fn validate(&self) -> Result<()> {
        match self.variable_type {
            VariableType::Regex => {
                let pattern = self.pattern().ok_or_else(|| {
                    Error::ConfigError(format!(
                        "variable '{}' of type regex requires a string item",
                        self.name
                    ))
                })?;
                regex::Regex::new(pattern).map_err(|e| {
                    Error::ConfigError(format!("variable '{}' has an invalid pattern: {}", self.name, e))
                })?;
            }
            VariableType::Choice => {
                let valid = matches!(&self.item, Some(serde_json::Value::Array(items))
                    if !items.is_empty() && items.iter().all(|item| item.is_string()));
                if !valid {
                    return Err(Error::ConfigError(format!(
                        "variable '{}' of type choice requires a non-empty list of labels",
                        self.name
                    )));
                }
            }
            _ => {}
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct GitConfig {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default = "default_main_branch")]
    pub main_branch: String,
}

fn default_main_branch() -> String {
    "main".to_string()
}

impl Default for GitConfig {
    fn default() -> Self {
        Self { enabled: false, main_branch: default_main_branch() }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct TemplateConfig {
    #[serde(rename = "ignorePatterns", default)]
    pub ignore_patterns: Vec<String>,
    #[serde(default)]
    pub variables: IndexMap<String, VariableSpec>,
}

/// Lifecycle phase a hook is bound to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub enum HookPhase {
    #[serde(rename = "pre_template_injection", alias = "pre_injection")]
    PreInjection,
    #[serde(rename = "post_template_injection", alias = "post_injection")]
    PostInjection,
}

impl HookPhase {
    pub const ALL: [HookPhase; 2] = [HookPhase::PreInjection, HookPhase::PostInjection];
}

impl fmt::Display for HookPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HookPhase::PreInjection => write!(f, "pre_template_injection"),
            HookPhase::PostInjection => write!(f, "post_template_injection"),
        }
    }
}

/// An ordered set of shell steps bound to a lifecycle phase.
#[derive(Debug, Clone, Deserialize)]
pub struct HookSpec {
    #[serde(default)]
    pub name: Option<String>,
    pub when: HookPhase,
    pub steps: Vec<String>,
    #[serde(default)]
    pub ignore_error: bool,
    #[serde(default)]
    pub ignore_user_skip: bool,
}

impl HookSpec {
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or("<unnamed hook>")
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub git: GitConfig,
    #[serde(default)]
    pub template: TemplateConfig,
    #[serde(default)]
    pub hooks: Vec<HookSpec>,
}

impl Config {
    /// Hooks bound to `phase`, in declaration order.
    pub fn hooks_for(&self, phase: HookPhase) -> Vec<&HookSpec> {
        self.hooks.iter().filter(|hook| hook.when == phase).collect()
    }
}

/// Serialization format of a configuration file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    Json,
    Yaml,
}

impl ConfigFormat {
    pub fn from_path<P: AsRef<Path>>(path: P) -> Self {
        match path.as_ref().extension().and_then(|ext| ext.to_str()) {
            Some("yml") | Some("yaml") => ConfigFormat::Yaml,
            _ => ConfigFormat::Json,
        }
    }
}

/// A loaded configuration together with the document it was read from.
///
/// The raw document is kept so that [`ConfigFile::save`] writes back the same
/// shape (key order, `$schema`, untouched sections) minus removed variables.
#[derive(Debug, Clone)]
pub struct ConfigFile {
    pub path: PathBuf,
    pub format: ConfigFormat,
    pub config: Config,
    document: serde_json::Value,
}

/// Returns the first existing configuration file in `template_dir`.
pub fn find_config<P: AsRef<Path>>(template_dir: P) -> Option<PathBuf> {
    CONFIG_FILES
        .iter()
        .map(|file| template_dir.as_ref().join(file))
        .find(|path| path.is_file())
}

fn parse_document(content: &str, format: ConfigFormat) -> Result<serde_json::Value> {
    match format {
        ConfigFormat::Json => serde_json::from_str(content)
            .map_err(|e| Error::ConfigError(format!("Invalid configuration format: {e}"))),
        ConfigFormat::Yaml => serde_yaml::from_str(content)
            .map_err(|e| Error::ConfigError(format!("Invalid configuration format: {e}"))),
    }
}

/// Validates a configuration document against the bundled schema.
///
/// # Returns
/// * `Result<Vec<String>>` - One `path: message` line per violation, empty when valid
pub fn validate_document(document: &serde_json::Value) -> Result<Vec<String>> {
    let schema: serde_json::Value = serde_json::from_str(CONFIG_SCHEMA)
        .map_err(|e| Error::ConfigError(format!("Invalid bundled schema: {e}")))?;
    let validator = jsonschema::validator_for(&schema)
        .map_err(|e| Error::ConfigError(format!("Invalid bundled schema: {e}")))?;

    let issues = validator
        .iter_errors(document)
        .map(|error| {
            let path = error.instance_path().to_string();
            if path.is_empty() {
                error.to_string()
            } else {
                format!("{path}: {error}")
            }
        })
        .collect();
    Ok(issues)
}

impl ConfigFile {
    /// Loads, validates and deserializes a configuration file.
    ///
    /// # Errors
    /// * `Error::ConfigError` if the file is not valid JSON/YAML or a variable
    ///   qualifier is inconsistent with its type
    /// * `Error::ConfigValidationError` if the document violates the schema
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        debug!("Loading configuration from {}", path.display());
        let format = ConfigFormat::from_path(path);
        let content = std::fs::read_to_string(path)?;
        let document = parse_document(&content, format)?;

        let issues = validate_document(&document)?;
        if !issues.is_empty() {
            return Err(Error::ConfigValidationError {
                config_path: path.display().to_string(),
                issues,
            });
        }

        let mut config: Config = serde_json::from_value(document.clone())
            .map_err(|e| Error::ConfigError(format!("Invalid schema: {e}")))?;
        for (name, variable) in config.template.variables.iter_mut() {
            variable.name = name.clone();
            variable.validate()?;
        }

        Ok(Self { path: path.to_path_buf(), format, config, document })
    }

    /// Loads the configuration of `template_dir`, if there is one.
    pub fn discover<P: AsRef<Path>>(template_dir: P) -> Result<Option<Self>> {
        find_config(template_dir).map(Self::load).transpose()
    }

    pub fn variables(&self) -> &IndexMap<String, VariableSpec> {
        &self.config.template.variables
    }

    /// Removes declared variables, returning how many were actually declared.
    pub fn remove_variables<S: AsRef<str>>(&mut self, names: &[S]) -> usize {
        let mut removed = 0;
        for name in names {
            let name = name.as_ref();
            if self.config.template.variables.shift_remove(name).is_some() {
                removed += 1;
            }
            if let Some(variables) = self
                .document
                .get_mut("template")
                .and_then(|template| template.get_mut("variables"))
                .and_then(|variables| variables.as_object_mut())
            {
                variables.shift_remove(name);
            }
        }
        removed
    }

    /// Writes the document back to [`ConfigFile::path`] in its original format.
    pub fn save(&self) -> Result<()> {
        let content = match self.format {
            ConfigFormat::Json => serde_json::to_string_pretty(&self.document)
                .map(|json| json + "\n")
                .map_err(|e| Error::ConfigError(e.to_string()))?,
            ConfigFormat::Yaml => serde_yaml::to_string(&self.document)
                .map_err(|e| Error::ConfigError(e.to_string()))?,
        };
        debug!("Writing configuration to {}", self.path.display());
        std::fs::write(&self.path, content)?;
        Ok(())
    }
}

/// Writes a starter configuration into `template_dir`.
///
/// # Errors
/// * `Error::ConfigAlreadyExistsError` if the directory already has a configuration
pub fn write_default_config<P: AsRef<Path>>(template_dir: P) -> Result<PathBuf> {
    let template_dir = template_dir.as_ref();
    if find_config(template_dir).is_some() {
        return Err(Error::ConfigAlreadyExistsError {
            template_dir: template_dir.display().to_string(),
        });
    }

    let document = serde_json::json!({
        "$schema": SCHEMA_URL,
        "git": { "enabled": false },
        "template": {
            "ignorePatterns": DEFAULT_IGNORE_PATTERNS,
            "variables": {}
        },
        "hooks": []
    });
    let path = template_dir.join(DEFAULT_CONFIG_FILE);
    let content = serde_json::to_string_pretty(&document)
        .map_err(|e| Error::ConfigError(e.to_string()))?;
    std::fs::write(&path, content + "\n")?;
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const CONFIG: &str = r#"{
  "$schema": "https://example.com/schema.json",
  "git": { "enabled": true, "main_branch": "trunk" },
  "template": {
    "ignorePatterns": [".git", ".git/**"],
    "variables": {
      "project": { "type": "string", "description": "project name" },
      "unused": { "type": "number", "required": false },
      "flavor": { "type": "choice", "item": ["vanilla", "chocolate"] }
    }
  },
  "hooks": [
    { "name": "setup", "when": "pre_template_injection", "steps": ["true"] },
    { "when": "post_injection", "steps": ["make", "make test"], "ignore_error": true }
  ]
}"#;

    fn write(dir: &Path, name: &str, content: &str) -> PathBuf {
        let path = dir.join(name);
        std::fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn loads_variables_in_declaration_order() {
        let dir = TempDir::new().unwrap();
        let path = write(dir.path(), ".replica.json", CONFIG);
        let file = ConfigFile::load(&path).unwrap();

        let names: Vec<_> = file.variables().keys().cloned().collect();
        assert_eq!(names, vec!["project", "unused", "flavor"]);
        assert_eq!(file.variables()["project"].name, "project");
        assert!(file.variables()["project"].required);
        assert!(!file.variables()["unused"].required);
        assert_eq!(file.variables()["flavor"].choices(), vec!["vanilla", "chocolate"]);
        assert!(file.config.git.enabled);
        assert_eq!(file.config.git.main_branch, "trunk");
    }

    #[test]
    fn hooks_are_grouped_by_phase() {
        let dir = TempDir::new().unwrap();
        let path = write(dir.path(), ".replica.json", CONFIG);
        let config = ConfigFile::load(&path).unwrap().config;

        let pre = config.hooks_for(HookPhase::PreInjection);
        let post = config.hooks_for(HookPhase::PostInjection);
        assert_eq!(pre.len(), 1);
        assert_eq!(pre[0].display_name(), "setup");
        assert_eq!(post.len(), 1);
        assert_eq!(post[0].display_name(), "<unnamed hook>");
        assert!(post[0].ignore_error);
        assert!(!post[0].ignore_user_skip);
    }

    #[test]
    fn schema_violations_are_reported() {
        let dir = TempDir::new().unwrap();
        let path = write(
            dir.path(),
            ".replica.json",
            r#"{ "template": { "variables": { "x": { "type": "date" } } }, "unknown": 1 }"#,
        );
        match ConfigFile::load(&path) {
            Err(Error::ConfigValidationError { issues, .. }) => assert!(issues.len() >= 2),
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn invalid_regex_item_is_rejected() {
        let dir = TempDir::new().unwrap();
        let path = write(
            dir.path(),
            ".replica.json",
            r#"{ "template": { "variables": { "x": { "type": "regex", "item": "([" } } } }"#,
        );
        assert!(matches!(ConfigFile::load(&path), Err(Error::ConfigError(_))));
    }

    #[test]
    fn remove_and_save_keeps_document_shape() {
        let dir = TempDir::new().unwrap();
        let path = write(dir.path(), ".replica.json", CONFIG);
        let mut file = ConfigFile::load(&path).unwrap();

        assert_eq!(file.remove_variables(&["unused", "never_declared"]), 1);
        file.save().unwrap();

        let saved: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        let keys: Vec<_> = saved["template"]["variables"].as_object().unwrap().keys().cloned().collect();
        assert_eq!(keys, vec!["project", "flavor"]);
        assert_eq!(saved["$schema"], "https://example.com/schema.json");
        assert_eq!(saved["hooks"].as_array().unwrap().len(), 2);
    }

    #[test]
    fn yaml_configuration_round_trips_through_save() {
        let dir = TempDir::new().unwrap();
        let path = write(
            dir.path(),
            ".replica.yml",
            "template:\n  variables:\n    name:\n      type: string\n    gone:\n      type: boolean\n",
        );
        let mut file = ConfigFile::load(&path).unwrap();
        assert_eq!(file.format, ConfigFormat::Yaml);
        file.remove_variables(&["gone"]);
        file.save().unwrap();

        let reloaded = ConfigFile::load(&path).unwrap();
        assert_eq!(reloaded.variables().len(), 1);
        assert!(reloaded.variables().contains_key("name"));
    }

    #[test]
    fn find_config_follows_lookup_order() {
        let dir = TempDir::new().unwrap();
        assert!(find_config(dir.path()).is_none());
        write(dir.path(), ".replica.yaml", "{}");
        write(dir.path(), ".replica.json", "{}");
        assert_eq!(find_config(dir.path()).unwrap(), dir.path().join(".replica.json"));
    }

    #[test]
    fn default_config_is_valid_and_not_overwritten() {
        let dir = TempDir::new().unwrap();
        let path = write_default_config(dir.path()).unwrap();
        let file = ConfigFile::load(&path).unwrap();
        assert_eq!(file.config.template.ignore_patterns, vec![".git", ".git/**"]);
        assert!(matches!(
            write_default_config(dir.path()),
            Err(Error::ConfigAlreadyExistsError { .. })
        ));
    }
}
