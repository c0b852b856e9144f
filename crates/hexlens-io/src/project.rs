use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use hexlens_core::LayoutConfig;

#[derive(Error, Debug)]
pub enum ProjectError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid project file: {0}")]
    Json(#[from] serde_json::Error),
}

/// A lens project file: metadata plus the full generation config.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LensProject {
    pub name: String,
    pub version: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub config: LayoutConfig,
}

impl LensProject {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            version: "0.1.0".to_string(),
            description: String::new(),
            config: LayoutConfig::default(),
        }
    }

    pub fn with_description(mut self, desc: &str) -> Self {
        self.description = desc.to_string();
        self
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn load(path: &Path) -> Result<Self, ProjectError> {
        let text = fs::read_to_string(path)?;
        let project = Self::from_json(&text)?;
        log::info!("Loaded project '{}' from {}", project.name, path.display());
        Ok(project)
    }

    pub fn save(&self, path: &Path) -> Result<(), ProjectError> {
        fs::write(path, self.to_json()?)?;
        log::info!("Saved project '{}' to {}", self.name, path.display());
        Ok(())
    }
}

impl Default for LensProject {
    fn default() -> Self {
        Self::new("sunglasses")
            .with_description("Left lens of a wayfarer-style segmented display")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_minimal_project_fills_defaults() {
        let project = LensProject::from_json(r#"{ "name": "demo", "version": "0.2.0" }"#).unwrap();
        assert_eq!(project.name, "demo");
        assert!(project.description.is_empty());
        assert_eq!(project.config, LayoutConfig::default());
    }

    #[test]
    fn test_save_and_load() {
        let path = std::env::temp_dir().join(format!("hexlens-project-{}.json", std::process::id()));
        let project = LensProject::default();
        project.save(&path).unwrap();
        let loaded = LensProject::load(&path).unwrap();
        fs::remove_file(&path).unwrap();
        assert_eq!(loaded, project);
    }

    #[test]
    fn test_load_reports_bad_json() {
        let err = LensProject::from_json("{ not json").unwrap_err();
        assert!(matches!(ProjectError::from(err), ProjectError::Json(_)));
    }
}
