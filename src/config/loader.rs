//! Configuration loader.
//!
//! Merges defaults, configuration files, and environment variables through
//! figment, then validates the extracted configuration.

use super::{ConfigError, DEFAULT_CONFIG_FILES, ENV_PREFIX, KizunaConfig, Result, validation};
use figment::{
    Figment,
    providers::{Env, Format, Json, Serialized, Toml},
};
use std::path::{Path, PathBuf};

/// Loader that layers configuration sources in merge order.
#[derive(Debug, Clone)]
pub struct ConfigLoader {
    figment: Figment,
}

impl ConfigLoader {
    /// Start from crate defaults.
    pub fn new() -> Self {
        let figment = Figment::new().merge(Serialized::defaults(KizunaConfig::default()));
        Self { figment }
    }

    /// Merge a configuration file (TOML or JSON, by extension).
    pub fn load_file<P: AsRef<Path>>(&mut self, path: P) -> Result<&mut Self> {
        let path = path.as_ref();

        if !path.exists() {
            return Err(ConfigError::FileLoadError(format!(
                "configuration file not found: {}",
                path.display()
            )));
        }

        match path.extension().and_then(|ext| ext.to_str()) {
            Some("toml") => {
                self.figment = std::mem::take(&mut self.figment).merge(Toml::file(path));
            }
            Some("json") => {
                self.figment = std::mem::take(&mut self.figment).merge(Json::file(path));
            }
            _ => {
                return Err(ConfigError::FileLoadError(format!(
                    "unsupported file format: {}",
                    path.display()
                )));
            }
        }

        Ok(self)
    }

    /// Try the default file locations, stopping at the first that loads.
    pub fn load_default_files(&mut self) -> &mut Self {
        for file in DEFAULT_CONFIG_FILES {
            let path = PathBuf::from(file);
            if path.exists() && self.load_file(&path).is_ok() {
                return self;
            }
        }

        // Fall back to the XDG config directory.
        if let Some(dirs) = directories::ProjectDirs::from("org", "kizuna", "kizuna") {
            for name in ["config.toml", "config.json"] {
                let path = dirs.config_dir().join(name);
                if path.exists() && self.load_file(&path).is_ok() {
                    break;
                }
            }
        }

        self
    }

    /// Merge `KIZUNA_`-prefixed environment variables. Nested keys use a
    /// double underscore, e.g. `KIZUNA_GRAPH__MAX_TRAVERSAL_DEPTH=32`.
    pub fn load_env(&mut self) -> &mut Self {
        self.figment =
            std::mem::take(&mut self.figment).merge(Env::prefixed(ENV_PREFIX).split("__"));
        self
    }

    /// Extract and validate the merged configuration.
    pub fn build(&self) -> Result<KizunaConfig> {
        let config: KizunaConfig = self
            .figment
            .extract()
            .map_err(|e| ConfigError::ParseError(e.to_string()))?;
        validation::validate(&config)?;
        Ok(config)
    }
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}
