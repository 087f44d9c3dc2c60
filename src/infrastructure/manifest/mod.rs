//! Plugin manifest validation
//!
//! Validates a JSON manifest against the host's field checklist. Errors make
//! the manifest invalid; warnings are advisory and never affect the outcome.

use std::path::Path;

use once_cell::sync::Lazy;
use regex_lite::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::application::errors::BotError;

static SEMVER: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\d+\.\d+\.\d+$").unwrap());
static URL: Lazy<Regex> = Lazy::new(|| Regex::new(r"^https?://\S+$").unwrap());

const REQUIRED_MANIFEST_VERSION: i64 = 3;
const COMPONENT_TYPES: [&str; 3] = ["action", "command", "tool"];

/// Typed view of a manifest that already passed validation
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Manifest {
    pub manifest_version: i64,
    pub name: String,
    pub version: String,
    pub description: String,
    pub author: ManifestAuthor,
    #[serde(default)]
    pub keywords: Vec<String>,
    #[serde(default)]
    pub categories: Vec<String>,
    pub host_application: Option<HostApplication>,
    pub plugin_info: Option<PluginInfo>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ManifestAuthor {
    pub name: String,
    pub url: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct HostApplication {
    pub min_version: Option<String>,
    pub max_version: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PluginInfo {
    #[serde(default)]
    pub components: Vec<ComponentEntry>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ComponentEntry {
    #[serde(rename = "type")]
    pub kind: String,
    pub name: String,
    pub description: Option<String>,
}

/// Outcome of a validation run
#[derive(Debug, Clone, Default)]
pub struct ValidationReport {
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
}

impl ValidationReport {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Field-by-field manifest validator
#[derive(Default)]
pub struct ManifestValidator {
    errors: Vec<String>,
    warnings: Vec<String>,
}

impl ManifestValidator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate a parsed manifest document and produce the report.
    pub fn validate(mut self, doc: &Value) -> ValidationReport {
        self.check_manifest_version(doc);
        self.check_basic_info(doc);
        self.check_author(doc);
        self.check_urls(doc);
        self.check_keywords_categories(doc);
        self.check_host_application(doc);
        self.check_plugin_info(doc);
        ValidationReport {
            errors: self.errors,
            warnings: self.warnings,
        }
    }

    fn error(&mut self, msg: impl Into<String>) {
        self.errors.push(msg.into());
    }

    fn warning(&mut self, msg: impl Into<String>) {
        self.warnings.push(msg.into());
    }

    fn check_manifest_version(&mut self, doc: &Value) {
        match doc.get("manifest_version").and_then(Value::as_i64) {
            Some(REQUIRED_MANIFEST_VERSION) => {}
            Some(other) => self.error(format!(
                "manifest_version must be {}, found {}",
                REQUIRED_MANIFEST_VERSION, other
            )),
            None => self.error(format!(
                "manifest_version must be {}, found none",
                REQUIRED_MANIFEST_VERSION
            )),
        }
    }

    fn check_basic_info(&mut self, doc: &Value) {
        for field in ["name", "version", "description"] {
            match doc.get(field).and_then(Value::as_str) {
                Some(value) if !value.trim().is_empty() => {}
                Some(_) => self.error(format!("field '{}' must not be blank", field)),
                None => self.error(format!("required field '{}' missing or not a string", field)),
            }
        }
        if let Some(version) = doc.get("version").and_then(Value::as_str) {
            if !SEMVER.is_match(version) {
                self.error(format!(
                    "version '{}' is not in x.y.z form",
                    version
                ));
            }
        }
    }

    fn check_author(&mut self, doc: &Value) {
        let Some(author) = doc.get("author") else {
            self.error("author field is required");
            return;
        };
        if !author.is_object() {
            self.error("author must be an object");
            return;
        }
        match author.get("name").and_then(Value::as_str) {
            Some(name) if !name.trim().is_empty() => {}
            _ => self.error("author.name is required"),
        }
        if let Some(url) = author.get("url").and_then(Value::as_str) {
            if !URL.is_match(url) {
                self.warning(format!("author.url may be malformed: {}", url));
            }
        }
    }

    fn check_urls(&mut self, doc: &Value) {
        for field in ["homepage_url", "repository_url"] {
            if let Some(url) = doc.get(field).and_then(Value::as_str) {
                if !URL.is_match(url) {
                    self.warning(format!("{} may be malformed: {}", field, url));
                }
            }
        }
    }

    fn check_keywords_categories(&mut self, doc: &Value) {
        for field in ["keywords", "categories"] {
            match doc.get(field) {
                None => {}
                Some(Value::Array(items)) => {
                    if items.is_empty() {
                        self.warning(format!("consider adding {} for discoverability", field));
                    }
                }
                Some(_) => self.error(format!("{} must be an array", field)),
            }
        }
    }

    fn check_host_application(&mut self, doc: &Value) {
        let Some(host) = doc.get("host_application") else {
            self.warning("consider declaring host_application version bounds");
            return;
        };
        if !host.is_object() {
            self.error("host_application must be an object");
            return;
        }
        for field in ["min_version", "max_version"] {
            if let Some(version) = host.get(field).and_then(Value::as_str) {
                if !SEMVER.is_match(version) {
                    self.error(format!(
                        "host_application.{} '{}' is not in x.y.z form",
                        field, version
                    ));
                }
            }
        }
    }

    fn check_plugin_info(&mut self, doc: &Value) {
        let Some(info) = doc.get("plugin_info") else {
            return;
        };
        if !info.is_object() {
            self.error("plugin_info must be an object");
            return;
        }
        match info.get("components") {
            None => {}
            Some(Value::Array(components)) => {
                if components.is_empty() {
                    self.warning("plugin declares no components");
                }
                for (i, component) in components.iter().enumerate() {
                    let Some(component) = component.as_object() else {
                        self.error(format!("component {} must be an object", i));
                        continue;
                    };
                    match component.get("type").and_then(Value::as_str) {
                        Some(kind) if COMPONENT_TYPES.contains(&kind) => {}
                        Some(kind) => {
                            self.error(format!("component {} has invalid type '{}'", i, kind))
                        }
                        None => self.error(format!("component {} is missing its type", i)),
                    }
                    match component.get("name").and_then(Value::as_str) {
                        Some(name) if !name.trim().is_empty() => {}
                        _ => self.error(format!("component {} is missing a valid name", i)),
                    }
                    if component
                        .get("description")
                        .and_then(Value::as_str)
                        .map(|d| d.trim().is_empty())
                        .unwrap_or(true)
                    {
                        self.warning(format!("component {} could use a description", i));
                    }
                }
            }
            Some(_) => self.error("plugin_info.components must be an array"),
        }
    }
}

/// Validate a manifest file on disk. Read or parse failures are reported as
/// errors inside the report, matching the recoverable-error contract.
pub fn validate_file(path: impl AsRef<Path>) -> ValidationReport {
    let content = match std::fs::read_to_string(path.as_ref()) {
        Ok(content) => content,
        Err(e) => {
            return ValidationReport {
                errors: vec![format!("cannot read manifest: {}", e)],
                warnings: Vec::new(),
            }
        }
    };
    let doc: Value = match serde_json::from_str(&content) {
        Ok(doc) => doc,
        Err(e) => {
            return ValidationReport {
                errors: vec![format!("cannot parse manifest: {}", e)],
                warnings: Vec::new(),
            }
        }
    };
    ManifestValidator::new().validate(&doc)
}

/// Deserialize a document into the typed manifest after it validated cleanly.
pub fn parse(doc: Value) -> Result<Manifest, BotError> {
    serde_json::from_value(doc).map_err(|e| BotError::Manifest(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn valid_manifest() -> Value {
        json!({
            "manifest_version": 3,
            "name": "lark-bot",
            "version": "0.1.0",
            "description": "configuration-driven chat components",
            "author": { "name": "lark team", "url": "https://example.com" },
            "keywords": ["chat", "components"],
            "categories": ["utility"],
            "host_application": { "min_version": "1.0.0", "max_version": "2.0.0" },
            "plugin_info": {
                "components": [
                    { "type": "action", "name": "greeting_action", "description": "greets" },
                    { "type": "command", "name": "help_command", "description": "help" }
                ]
            }
        })
    }

    #[test]
    fn valid_manifest_passes() {
        let report = ManifestValidator::new().validate(&valid_manifest());
        assert!(report.is_valid(), "errors: {:?}", report.errors);
        assert!(report.warnings.is_empty(), "warnings: {:?}", report.warnings);
    }

    #[test]
    fn wrong_manifest_version_fails() {
        let mut doc = valid_manifest();
        doc["manifest_version"] = json!(2);
        let report = ManifestValidator::new().validate(&doc);
        assert!(!report.is_valid());
    }

    #[test]
    fn bad_semver_fails() {
        let mut doc = valid_manifest();
        doc["version"] = json!("1.0");
        let report = ManifestValidator::new().validate(&doc);
        assert!(report.errors.iter().any(|e| e.contains("x.y.z")));
    }

    #[test]
    fn missing_author_name_fails() {
        let mut doc = valid_manifest();
        doc["author"] = json!({ "url": "https://example.com" });
        let report = ManifestValidator::new().validate(&doc);
        assert!(report.errors.iter().any(|e| e.contains("author.name")));
    }

    #[test]
    fn blank_description_fails() {
        let mut doc = valid_manifest();
        doc["description"] = json!("   ");
        let report = ManifestValidator::new().validate(&doc);
        assert!(!report.is_valid());
    }

    #[test]
    fn warnings_do_not_invalidate() {
        let mut doc = valid_manifest();
        doc["keywords"] = json!([]);
        doc.as_object_mut().unwrap().remove("host_application");
        let report = ManifestValidator::new().validate(&doc);
        assert!(report.is_valid());
        assert!(report.warnings.len() >= 2);
    }

    #[test]
    fn invalid_component_type_fails() {
        let mut doc = valid_manifest();
        doc["plugin_info"]["components"][0]["type"] = json!("middleware");
        let report = ManifestValidator::new().validate(&doc);
        assert!(report.errors.iter().any(|e| e.contains("invalid type")));
    }

    #[test]
    fn non_array_keywords_fail() {
        let mut doc = valid_manifest();
        doc["keywords"] = json!("chat");
        let report = ManifestValidator::new().validate(&doc);
        assert!(report.errors.iter().any(|e| e.contains("keywords")));
    }

    #[test]
    fn bad_host_version_bound_fails() {
        let mut doc = valid_manifest();
        doc["host_application"]["min_version"] = json!("one");
        let report = ManifestValidator::new().validate(&doc);
        assert!(!report.is_valid());
    }

    #[test]
    fn typed_parse_after_validation() {
        let manifest = parse(valid_manifest()).expect("parse");
        assert_eq!(manifest.manifest_version, 3);
        assert_eq!(manifest.name, "lark-bot");
        assert_eq!(manifest.plugin_info.unwrap().components.len(), 2);
    }
}
