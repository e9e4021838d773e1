use std::path::{Path, PathBuf};

use log::info;
use serde::{Deserialize, Serialize};

use crate::{
    error::{Result, SpecialError},
    persist,
};

pub const SPECIAL_DEFINITIONS_FILE: &str = "special.json";
pub const SPECIAL_GRAPHICS_EXTENSION: &str = "chr";

#[derive(Serialize, Deserialize, Default, Debug, PartialEq)]
pub struct GlobalConfig {
    #[serde(skip_serializing, skip_deserializing)]
    pub modified: bool,
    pub project_dir: Option<PathBuf>,
}

pub fn get_global_config_path() -> Result<PathBuf> {
    let project_dirs = directories::ProjectDirs::from("", "", "NesSpecialEditor")
        .ok_or_else(|| SpecialError::NotReady("global config directory".to_string()))?;
    Ok(project_dirs.config_dir().join("config.json"))
}

impl GlobalConfig {
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            info!("No config at {}, using defaults", path.display());
            return Ok(GlobalConfig::default());
        }
        persist::load_json(path)
    }

    pub fn save(&mut self, path: &Path) -> Result<()> {
        if self.modified {
            persist::save_json(path, self)?;
            self.modified = false;
        }
        Ok(())
    }

    pub fn set_project_dir(&mut self, dir: PathBuf) {
        self.project_dir = Some(dir);
        self.modified = true;
    }

    /// Where the project's special definitions live, if a project is configured.
    pub fn special_path(&self) -> Option<PathBuf> {
        self.project_dir
            .as_ref()
            .map(|dir| dir.join(SPECIAL_DEFINITIONS_FILE))
    }
}

/// The graphics payload sits next to its definitions document.
pub fn graphics_path(definitions_path: &Path) -> PathBuf {
    definitions_path.with_extension(SPECIAL_GRAPHICS_EXTENSION)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_config_is_default() {
        let dir = tempfile::tempdir().unwrap();
        let config = GlobalConfig::load(&dir.path().join("config.json")).unwrap();
        assert_eq!(config, GlobalConfig::default());
        assert_eq!(config.special_path(), None);
    }

    #[test]
    fn config_saves_only_when_modified() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cfg").join("config.json");
        let mut config = GlobalConfig::default();
        config.save(&path).unwrap();
        assert!(!path.exists());

        config.set_project_dir(PathBuf::from("/games/project"));
        config.save(&path).unwrap();
        assert!(!config.modified);
        let loaded = GlobalConfig::load(&path).unwrap();
        assert_eq!(
            loaded.special_path(),
            Some(PathBuf::from("/games/project").join("special.json"))
        );
    }

    #[test]
    fn graphics_sit_beside_definitions() {
        assert_eq!(
            graphics_path(Path::new("proj/special.json")),
            PathBuf::from("proj/special.chr")
        );
    }
}
