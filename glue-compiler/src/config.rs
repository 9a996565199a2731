//! Generator configuration and settings

use crate::backend::BackendFactory;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Main generator configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorConfig {
    /// Directories searched for `webidlfile` references
    pub idl_paths: Vec<PathBuf>,
    /// Backend name; when unset the binding's `type` decides
    pub backend: Option<String>,
    /// Dump the loaded WebIDL tree at debug level
    pub dump_webidl: bool,
    pub verbose: bool,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            idl_paths: Vec::new(),
            backend: None,
            dump_webidl: false,
            verbose: false,
        }
    }
}

impl GeneratorConfig {
    /// Load configuration from TOML file
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            error: e,
        })?;

        toml::from_str(&content).map_err(|e| ConfigError::Parse {
            path: path.to_path_buf(),
            error: e,
        })
    }

    /// Save configuration to TOML file
    pub fn to_file(&self, path: &Path) -> Result<(), ConfigError> {
        let content = toml::to_string_pretty(self).map_err(|e| ConfigError::Serialize { error: e })?;

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| ConfigError::Io {
                path: parent.to_path_buf(),
                error: e,
            })?;
        }

        std::fs::write(path, content).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            error: e,
        })
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Some(backend) = &self.backend {
            if BackendFactory::create_backend(backend).is_none() {
                return Err(ConfigError::Invalid {
                    field: "backend".to_string(),
                    message: format!(
                        "unknown backend {:?}, expected one of {}",
                        backend,
                        BackendFactory::available_backends().join(", ")
                    ),
                });
            }
        }

        if let Some(path) = self.idl_paths.iter().find(|p| p.exists() && !p.is_dir()) {
            return Err(ConfigError::Invalid {
                field: "idl_paths".to_string(),
                message: format!("{} is not a directory", path.display()),
            });
        }

        Ok(())
    }

    /// Merge with another configuration (other takes precedence)
    pub fn merge(&mut self, other: GeneratorConfig) {
        if !other.idl_paths.is_empty() {
            // the other configuration's directories are searched first
            let mut paths = other.idl_paths;
            paths.extend(std::mem::take(&mut self.idl_paths));
            self.idl_paths = paths;
        }
        if other.backend.is_some() {
            self.backend = other.backend;
        }
        if other.dump_webidl {
            self.dump_webidl = true;
        }
        if other.verbose {
            self.verbose = true;
        }
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("I/O error for {path:?}: {error}")]
    Io { path: PathBuf, error: std::io::Error },

    #[error("Parse error for {path:?}: {error}")]
    Parse { path: PathBuf, error: toml::de::Error },

    #[error("Serialization error: {error}")]
    Serialize { error: toml::ser::Error },

    #[error("Invalid configuration for {field}: {message}")]
    Invalid { field: String, message: String },
}

/// Predefined configurations
pub mod presets {
    use super::*;

    /// SpiderMonkey bindings against libdom
    pub fn jsapi_libdom() -> GeneratorConfig {
        GeneratorConfig {
            backend: Some("jsapi".to_string()),
            idl_paths: vec![PathBuf::from("webidl")],
            ..GeneratorConfig::default()
        }
    }

    /// Duktape bindings against libdom
    pub fn duktape_libdom() -> GeneratorConfig {
        GeneratorConfig {
            backend: Some("duktape".to_string()),
            idl_paths: vec![PathBuf::from("webidl")],
            ..GeneratorConfig::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_config() {
        let config = GeneratorConfig::default();
        assert!(config.idl_paths.is_empty());
        assert_eq!(config.backend, None);
        assert!(!config.verbose);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_validation() {
        let mut config = GeneratorConfig::default();
        config.backend = Some("v8".to_string());
        assert!(matches!(config.validate(), Err(ConfigError::Invalid { ref field, .. }) if field == "backend"));

        config.backend = Some("duktape".to_string());
        assert!(config.validate().is_ok());

        let temp_dir = TempDir::new().unwrap();
        let file = temp_dir.path().join("not-a-dir.idl");
        std::fs::write(&file, "").unwrap();
        config.idl_paths = vec![file];
        assert!(matches!(config.validate(), Err(ConfigError::Invalid { ref field, .. }) if field == "idl_paths"));
    }

    #[test]
    fn test_config_file_roundtrip() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("nested").join("glue.toml");

        let mut config = presets::duktape_libdom();
        config.dump_webidl = true;

        config.to_file(&config_path).unwrap();
        let loaded_config = GeneratorConfig::from_file(&config_path).unwrap();
        assert_eq!(config, loaded_config);
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("glue.toml");
        std::fs::write(&config_path, "idl_paths = [\"idl\"]\n").unwrap();

        let config = GeneratorConfig::from_file(&config_path).unwrap();
        assert_eq!(config.idl_paths, vec![PathBuf::from("idl")]);
        assert_eq!(config.backend, None);
    }

    #[test]
    fn test_bad_files() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("glue.toml");
        assert!(matches!(GeneratorConfig::from_file(&config_path), Err(ConfigError::Io { .. })));

        std::fs::write(&config_path, "verbose = \"very\"").unwrap();
        assert!(matches!(GeneratorConfig::from_file(&config_path), Err(ConfigError::Parse { .. })));
    }

    #[test]
    fn test_config_merge() {
        let mut base_config = presets::jsapi_libdom();

        let mut override_config = GeneratorConfig::default();
        override_config.idl_paths = vec![PathBuf::from("local")];
        override_config.verbose = true;

        base_config.merge(override_config);

        assert!(base_config.verbose);
        assert_eq!(base_config.backend.as_deref(), Some("jsapi"));
        assert_eq!(
            base_config.idl_paths,
            vec![PathBuf::from("local"), PathBuf::from("webidl")]
        );
    }
}
