//! Template configuration loading and validation.
//!
//! A missing or unreadable template file falls back to the built-in default
//! set; inside a valid file, entries with missing fields or non-compiling
//! patterns are skipped with warnings and never abort the load.

use std::path::Path;

use regex::Regex;
use serde::Deserialize;
use serde_json::Value;
use tracing::{error, info, warn};

use crate::core::model::{Template, TemplateMapping};
use crate::{SeqError, SeqResult};

#[derive(Debug, Deserialize)]
struct TemplateFile {
    templates: Vec<Value>,
}

/// Load templates from `path`, sorted ascending by priority (stable, so
/// equal priorities keep file order). Falls back to [`default_templates`]
/// when no path is given, the file is missing, or it cannot be parsed.
pub fn load_templates(path: Option<&Path>) -> Vec<Template> {
    let Some(path) = path else {
        info!("no template file given, loading default templates");
        return default_templates();
    };
    if !path.exists() {
        info!(
            "template file {} not found, loading default templates",
            path.display()
        );
        return default_templates();
    }
    match load_from_file(path) {
        Ok(templates) => {
            info!(
                "loaded {} templates from {}",
                templates.len(),
                path.display()
            );
            templates
        }
        Err(e) => {
            error!("{e}, falling back to default templates");
            default_templates()
        }
    }
}

fn load_from_file(path: &Path) -> SeqResult<Vec<Template>> {
    let s = std::fs::read_to_string(path)
        .map_err(|e| SeqError::Message(format!("failed to read {}: {e}", path.display())))?;
    let file: TemplateFile = serde_json::from_str(&s).map_err(|e| {
        SeqError::Message(format!("invalid template file {}: {e}", path.display()))
    })?;

    let mut templates = Vec::new();
    for raw in file.templates {
        let name = raw
            .get("name")
            .and_then(Value::as_str)
            .unwrap_or("unknown")
            .to_string();
        match serde_json::from_value::<Template>(raw) {
            Ok(template) => {
                if Regex::new(&template.pattern).is_err() {
                    warn!("skipping template with invalid regex: {}", template.name);
                    continue;
                }
                templates.push(template);
            }
            Err(e) => {
                warn!("skipping template '{name}' with missing or invalid fields: {e}");
            }
        }
    }

    templates.sort_by_key(|t| t.priority);
    Ok(templates)
}

/// Outcome of the template business-rule check.
#[derive(Debug, Default)]
pub struct TemplateValidation {
    pub errors: Vec<String>,
}

impl TemplateValidation {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Validate a loaded set: unique names, priorities within 1..=999,
/// compilable patterns.
pub fn validate_templates(templates: &[Template]) -> TemplateValidation {
    let mut validation = TemplateValidation::default();

    let mut seen = std::collections::HashSet::new();
    for template in templates {
        if !seen.insert(template.name.as_str()) {
            validation
                .errors
                .push(format!("duplicate template name: {}", template.name));
        }
    }

    for template in templates {
        if !(1..=999).contains(&template.priority) {
            validation.errors.push(format!(
                "template '{}' has invalid priority: {}",
                template.name, template.priority
            ));
        }
        if Regex::new(&template.pattern).is_err() {
            validation.errors.push(format!(
                "template '{}' has invalid regex pattern",
                template.name
            ));
        }
    }

    validation
}

/// Built-in template set for the automotive camera stack.
pub fn default_templates() -> Vec<Template> {
    let make = |name: &str, pattern: &str, from: &str, to: &str, message: &str, priority, description: &str| Template {
        name: name.to_string(),
        pattern: pattern.to_string(),
        mapping: TemplateMapping {
            from: from.to_string(),
            to: to.to_string(),
            message: message.to_string(),
        },
        priority,
        description: description.to_string(),
    };

    vec![
        make(
            "Camera Service Start",
            r"(\d{2}-\d{2}\s+\d{2}:\d{2}:\d{2}\.\d{3})\s+(\w+)\s+(\w+):\s*(.*CameraService.*start.*)",
            "System",
            "CameraService",
            "Service Start",
            1,
            "Camera service initialization",
        ),
        make(
            "Camera Activity Launch",
            r"(\d{2}-\d{2}\s+\d{2}:\d{2}:\d{2}\.\d{3})\s+(\w+)\s+(\w+):\s*(.*ActivityManager.*Starting.*Camera.*)",
            "ActivityManager",
            "CameraActivity",
            "Start Activity",
            2,
            "Camera activity launch",
        ),
        make(
            "Camera HAL Connection",
            r"(\d{2}-\d{2}\s+\d{2}:\d{2}:\d{2}\.\d{3})\s+(\w+)\s+(\w+):\s*(.*CameraHAL.*connect.*)",
            "CameraService",
            "CameraHAL",
            "HAL Connection",
            3,
            "Camera HAL connection",
        ),
        make(
            "Vehicle Gear Change",
            r"(\d{2}-\d{2}\s+\d{2}:\d{2}:\d{2}\.\d{3})\s+(\w+)\s+(\w+):\s*(.*VehicleHAL.*gear.*change.*)",
            "VehicleHAL",
            "CameraApp",
            "Gear Change Event",
            4,
            "Vehicle gear change event",
        ),
        make(
            "Camera Error",
            r"(\d{2}-\d{2}\s+\d{2}:\d{2}:\d{2}\.\d{3})\s+(\w+)\s+(\w+):\s*(.*Camera.*error.*)",
            "CameraHAL",
            "CameraService",
            "Error Notification",
            5,
            "Camera error handling",
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_templates_are_valid_and_sorted() {
        let templates = default_templates();
        assert_eq!(templates.len(), 5);
        assert!(validate_templates(&templates).is_valid());
        assert!(templates.windows(2).all(|w| w[0].priority <= w[1].priority));
    }

    #[test]
    fn test_missing_file_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let templates = load_templates(Some(&dir.path().join("absent.json")));
        assert_eq!(templates.len(), default_templates().len());
    }

    #[test]
    fn test_invalid_json_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("templates.json");
        std::fs::write(&path, "{ not json").unwrap();
        let templates = load_templates(Some(&path));
        assert_eq!(templates.len(), default_templates().len());
    }

    #[test]
    fn test_loads_and_sorts_by_priority() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("templates.json");
        std::fs::write(
            &path,
            r#"{"templates": [
                {"name":"B","pattern":"b","mapping":{"from":"X","to":"Y","message":"m"},"priority":5},
                {"name":"A","pattern":"a","mapping":{"from":"X","to":"Y","message":"m"},"priority":1}
            ]}"#,
        )
        .unwrap();

        let templates = load_templates(Some(&path));
        assert_eq!(templates.len(), 2);
        assert_eq!(templates[0].name, "A");
        assert_eq!(templates[1].name, "B");
    }

    #[test]
    fn test_skips_entries_with_missing_fields_or_bad_regex() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("templates.json");
        std::fs::write(
            &path,
            r#"{"templates": [
                {"name":"NoPattern","mapping":{},"priority":1},
                {"name":"BadRegex","pattern":"(unclosed","mapping":{},"priority":2},
                {"name":"Good","pattern":"ok","mapping":{},"priority":3}
            ]}"#,
        )
        .unwrap();

        let templates = load_templates(Some(&path));
        assert_eq!(templates.len(), 1);
        assert_eq!(templates[0].name, "Good");
    }

    #[test]
    fn test_accepts_original_sequence_mapping_key() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("templates.json");
        std::fs::write(
            &path,
            r#"{"templates": [
                {"name":"T","pattern":"x","sequence_mapping":{"from":"A","to":"B","message":"M"},"priority":1}
            ]}"#,
        )
        .unwrap();

        let templates = load_templates(Some(&path));
        assert_eq!(templates.len(), 1);
        assert_eq!(templates[0].mapping.from, "A");
    }

    #[test]
    fn test_validation_flags_duplicates_and_priority_range() {
        let mut templates = default_templates();
        templates[1].name = templates[0].name.clone();
        templates[2].priority = 0;
        templates[3].priority = 1000;

        let validation = validate_templates(&templates);
        assert!(!validation.is_valid());
        assert_eq!(validation.errors.len(), 3);
    }
}
