use std::fs;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use crate::error::ConfigError;
use crate::handle::ConfigHandle;
use crate::schema::SkyfallConfig;

const CONFIG_FILE: &str = "config.toml";

/// Directory holding `config.toml`.
///
/// `SKYFALL_CONFIG_DIR` wins; otherwise `<config dir>/skyfall`, falling
/// back to `./config/skyfall`.
pub fn config_dir() -> PathBuf {
    if let Ok(dir) = std::env::var("SKYFALL_CONFIG_DIR") {
        return PathBuf::from(dir);
    }
    dirs::config_dir()
        .map(|dir| dir.join("skyfall"))
        .unwrap_or_else(|| PathBuf::from("config").join("skyfall"))
}

/// Owns `config.toml` and the live handle features read from.
pub struct ConfigStore {
    path: PathBuf,
    handle: ConfigHandle,
}

impl ConfigStore {
    /// Load `config.toml` from `dir`, creating the directory if needed.
    ///
    /// A file that fails to parse is copied to
    /// `config-<unix millis>-backup.toml` and replaced with defaults. A
    /// missing file is written out with defaults.
    pub fn load(dir: &Path) -> Result<Self, ConfigError> {
        fs::create_dir_all(dir).map_err(|source| ConfigError::Io {
            path: dir.to_path_buf(),
            source,
        })?;

        let path = dir.join(CONFIG_FILE);
        tracing::info!(path = %path.display(), "loading config");

        let loaded = if path.exists() {
            match read(&path) {
                Ok(config) => {
                    tracing::info!("loaded config file");
                    Some(config)
                }
                Err(err @ ConfigError::Parse { .. }) => {
                    backup_corrupt(&path, &err);
                    None
                }
                Err(err) => return Err(err),
            }
        } else {
            None
        };

        let fresh = loaded.is_none();
        let store = Self {
            path,
            handle: ConfigHandle::new(loaded.unwrap_or_default()),
        };
        if fresh {
            tracing::info!("creating a new config file");
            store.save("blank config")?;
        }
        Ok(store)
    }

    pub fn handle(&self) -> ConfigHandle {
        self.handle.clone()
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Write the current config. The file is replaced atomically through a
    /// sibling temp file.
    pub fn save(&self, reason: &str) -> Result<(), ConfigError> {
        let raw = toml::to_string_pretty(&self.handle.snapshot())?;
        let staging = self.path.with_extension("toml.write");

        fs::write(&staging, raw)
            .and_then(|()| fs::rename(&staging, &self.path))
            .map_err(|source| ConfigError::Io {
                path: self.path.clone(),
                source,
            })?;

        tracing::debug!(reason, path = %self.path.display(), "config saved");
        Ok(())
    }

    /// Re-read the file from disk into the live handle.
    pub fn reload(&self) -> Result<(), ConfigError> {
        let config = read(&self.path)?;
        self.handle.update(|live| *live = config);
        tracing::info!("config reloaded");
        Ok(())
    }
}

fn read(path: &Path) -> Result<SkyfallConfig, ConfigError> {
    let raw = fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    toml::from_str(&raw).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

fn backup_corrupt(path: &Path, err: &ConfigError) {
    let millis = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis())
        .unwrap_or_default();
    let backup = path.with_file_name(format!("config-{millis}-backup.toml"));
    tracing::error!(
        error = %err,
        backup = %backup.display(),
        "config file is unreadable, loading fresh config and saving a backup"
    );
    if let Err(copy_err) = fs::copy(path, &backup) {
        tracing::error!(error = %copy_err, "couldn't create a backup of the config file");
    }
}
