//! Named project library, stored as one JSON document in the data dir.

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};
use shared::ProjectFile;

use crate::error::PersistenceError;

pub const UNTITLED: &str = "Untitled Project";

/// Saved projects by name plus the name of the one being edited
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectLibrary {
    projects: BTreeMap<String, ProjectFile>,
    current: String,
}

impl Default for ProjectLibrary {
    fn default() -> Self {
        Self {
            projects: BTreeMap::new(),
            current: UNTITLED.to_string(),
        }
    }
}

impl ProjectLibrary {
    fn library_path() -> Option<std::path::PathBuf> {
        directories::ProjectDirs::from("com", "sculpt", "sculpt")
            .map(|dirs| dirs.data_dir().join("projects.json"))
    }

    /// Open the library from the data dir, empty if missing or unreadable
    pub fn open() -> Self {
        let Some(path) = Self::library_path() else {
            return Self::default();
        };
        match Self::load_from(&path) {
            Ok(library) => library,
            Err(PersistenceError::Io(_)) => Self::default(),
            Err(e) => {
                tracing::warn!("Ignoring project library at {}: {e}", path.display());
                Self::default()
            }
        }
    }

    pub fn load_from(path: &Path) -> Result<Self, PersistenceError> {
        let json = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&json)?)
    }

    pub fn save_to(&self, path: &Path) -> Result<(), PersistenceError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, serde_json::to_string_pretty(self)?)?;
        Ok(())
    }

    /// Write the library back to the data dir
    pub fn persist(&self) {
        if let Some(path) = Self::library_path() {
            if let Err(e) = self.save_to(&path) {
                tracing::warn!("Failed to save projects to {}: {e}", path.display());
            }
        }
    }

    pub fn current_name(&self) -> &str {
        &self.current
    }

    /// Sorted project names
    pub fn names(&self) -> Vec<String> {
        self.projects.keys().cloned().collect()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.projects.contains_key(name)
    }

    /// Store `project` under `name` and make it current
    pub fn save(&mut self, name: &str, mut project: ProjectFile) {
        project.name = name.to_string();
        self.projects.insert(name.to_string(), project);
        self.current = name.to_string();
    }

    /// Look up a project and make it current
    pub fn open_project(&mut self, name: &str) -> Result<ProjectFile, PersistenceError> {
        let project = self
            .projects
            .get(name)
            .cloned()
            .ok_or_else(|| PersistenceError::UnknownProject(name.to_string()))?;
        self.current = name.to_string();
        Ok(project)
    }

    /// Delete a project; the current name resets to untitled
    pub fn delete(&mut self, name: &str) -> Result<(), PersistenceError> {
        self.projects
            .remove(name)
            .ok_or_else(|| PersistenceError::UnknownProject(name.to_string()))?;
        self.current = UNTITLED.to_string();
        Ok(())
    }

    /// Start an unnamed project
    pub fn start_new(&mut self) {
        self.current = UNTITLED.to_string();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn save_open_delete() {
        let mut library = ProjectLibrary::default();
        assert_eq!(library.current_name(), UNTITLED);

        library.save("Robot", ProjectFile::new("", vec![]));
        library.save("Arch", ProjectFile::new("", vec![]));
        assert_eq!(library.names(), vec!["Arch".to_string(), "Robot".to_string()]);
        assert_eq!(library.current_name(), "Arch");

        let project = library.open_project("Robot").unwrap();
        assert_eq!(project.name, "Robot");
        assert_eq!(library.current_name(), "Robot");

        library.delete("Robot").unwrap();
        assert!(!library.contains("Robot"));
        assert_eq!(library.current_name(), UNTITLED);
    }

    #[test]
    fn unknown_project_is_an_error() {
        let mut library = ProjectLibrary::default();
        assert!(matches!(
            library.open_project("missing"),
            Err(PersistenceError::UnknownProject(name)) if name == "missing"
        ));
        assert!(library.delete("missing").is_err());
    }

    #[test]
    fn library_file_round_trip() {
        let dir = std::env::temp_dir().join(format!("sculpt-projects-{}", uuid::Uuid::new_v4()));
        let path = dir.join("projects.json");

        let mut library = ProjectLibrary::default();
        library.save("Tower", ProjectFile::new("", vec![]));
        library.save_to(&path).unwrap();

        let loaded = ProjectLibrary::load_from(&path).unwrap();
        assert_eq!(loaded.names(), vec!["Tower".to_string()]);
        assert_eq!(loaded.current_name(), "Tower");
        let _ = std::fs::remove_dir_all(dir);
    }
}
