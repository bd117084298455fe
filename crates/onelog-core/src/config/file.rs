//! File-based configuration (YAML) with environment overrides

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use super::traits::{ConfigError, ConfigResult};
use crate::backend::{
    has_backend, ConsoleSettings, FileSink, LogLevel, RawHandle, LOG_FILE_ENV, LOG_LEVEL_ENV,
};
use crate::context::UseOptions;
use crate::middleware::MiddlewareOptions;

/// Backend used when none is configured
pub const DEFAULT_BACKEND: &str = "console";
/// Environment variable selecting the backend
pub const BACKEND_ENV: &str = "ONELOG_BACKEND";
/// Environment variable adding comma-separated extra methods
pub const METHODS_ENV: &str = "ONELOG_METHODS";

/// Configuration file structure
///
/// ```yaml
/// backend: file
/// methods: [audit]
/// file:
///   path: /var/log/app.log
///   level: info
/// middleware:
///   category: http
///   level: debug
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OnelogConfig {
    /// Registered backend name
    #[serde(default)]
    pub backend: Option<String>,

    /// Extra methods to add to the method set
    #[serde(default)]
    pub methods: Vec<String>,

    /// Defaults for `middleware()`
    #[serde(default)]
    pub middleware: MiddlewareOptions,

    /// Settings for the file backend
    #[serde(default)]
    pub file: Option<FileSettings>,

    /// Settings for the console backend
    #[serde(default)]
    pub console: Option<ConsoleConfig>,
}

/// File backend settings
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FileSettings {
    /// Log file path (temp dir `onelog.log` when unset)
    #[serde(default)]
    pub path: Option<PathBuf>,
    /// Minimum level (`debug` when unset)
    #[serde(default)]
    pub level: Option<String>,
}

/// Console backend settings
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConsoleConfig {
    /// Label printed for the default logger
    #[serde(default)]
    pub prefix: Option<String>,
}

impl OnelogConfig {
    /// User-level config path (~/.config/onelog/config.yaml)
    pub fn user_path() -> PathBuf {
        let config_dir = dirs::config_dir().unwrap_or_else(|| {
            dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(".config")
        });
        config_dir.join("onelog").join("config.yaml")
    }

    /// Workspace-level config path (.config/onelog/config.yaml)
    pub fn workspace_path(workspace_root: impl AsRef<Path>) -> PathBuf {
        workspace_root
            .as_ref()
            .join(".config")
            .join("onelog")
            .join("config.yaml")
    }

    /// Parse YAML
    pub fn from_yaml(content: &str) -> ConfigResult<Self> {
        Ok(serde_yaml::from_str(content)?)
    }

    /// Load config from a file, or the defaults if it doesn't exist
    pub fn load(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    /// Load the user-level config with environment overrides applied
    pub fn load_user() -> ConfigResult<Self> {
        Self::load_with_overrides(Self::user_path(), |key| std::env::var(key).ok())
    }

    /// Load a config file, then apply overrides from a variable lookup
    pub fn load_with_overrides(
        path: impl AsRef<Path>,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> ConfigResult<Self> {
        Ok(Self::load(path)?.apply_overrides(lookup))
    }

    /// Save config to a file, creating parent directories
    pub fn save(&self, path: impl AsRef<Path>) -> ConfigResult<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, serde_yaml::to_string(self)?)?;
        Ok(())
    }

    /// Apply overrides from a variable lookup
    pub fn apply_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(backend) = lookup(BACKEND_ENV).filter(|b| !b.trim().is_empty()) {
            self.backend = Some(backend.trim().to_string());
        }
        if let Some(methods) = lookup(METHODS_ENV) {
            self.methods.extend(
                methods
                    .split(',')
                    .map(str::trim)
                    .filter(|m| !m.is_empty())
                    .map(str::to_string),
            );
        }
        let path = lookup(LOG_FILE_ENV);
        let level = lookup(LOG_LEVEL_ENV);
        if path.is_some() || level.is_some() {
            let file = self.file.get_or_insert_with(FileSettings::default);
            if let Some(path) = path {
                file.path = Some(PathBuf::from(path));
            }
            if let Some(level) = level {
                file.level = Some(level);
            }
        }
        self
    }

    /// Backend name, defaulting to the console
    pub fn backend_name(&self) -> &str {
        self.backend.as_deref().unwrap_or(DEFAULT_BACKEND)
    }

    /// Check that the backend is registered and the file level parses
    pub fn validate(&self) -> ConfigResult<()> {
        if !has_backend(self.backend_name()) {
            return Err(ConfigError::Invalid(format!(
                "unknown backend '{}'",
                self.backend_name()
            )));
        }
        if let Some(level) = self.file.as_ref().and_then(|f| f.level.as_deref()) {
            if LogLevel::parse(level).is_none() {
                return Err(ConfigError::Invalid(format!("unknown file level '{}'", level)));
            }
        }
        Ok(())
    }

    /// Library handle for backends that take settings
    pub fn library(&self) -> ConfigResult<Option<RawHandle>> {
        match self.backend_name() {
            "file" => {
                let Some(settings) = &self.file else {
                    return Ok(None);
                };
                let path = settings.path.clone().unwrap_or_else(FileSink::default_path);
                let level = settings
                    .level
                    .as_deref()
                    .and_then(LogLevel::parse)
                    .unwrap_or(LogLevel::Debug);
                Ok(Some(Arc::new(FileSink::open(path, level)?) as RawHandle))
            }
            "console" => Ok(self
                .console
                .as_ref()
                .and_then(|c| c.prefix.clone())
                .map(|prefix| Arc::new(ConsoleSettings::with_prefix(prefix)) as RawHandle)),
            _ => Ok(None),
        }
    }

    /// Options for `use_named`
    pub fn use_options(&self) -> ConfigResult<UseOptions> {
        self.validate()?;
        let mut options = UseOptions::new()
            .with_methods(self.methods.clone())
            .with_middleware(self.middleware.clone());
        if let Some(lib) = self.library()? {
            options = options.with_lib(lib);
        }
        Ok(options)
    }
}
