use color_eyre::{eyre::Result, Report};
use serde::{Deserialize, Serialize};
use std::{
    collections::BTreeMap,
    env,
    fs::{self, File},
    io::{self, ErrorKind, Read, Write},
    path::{Path, PathBuf},
};
use tracing::{debug, warn};

#[derive(Serialize, Deserialize, Default, Debug, PartialEq, Eq)]
pub struct Config {
    /// Username used by `execute` when `--username` is not given
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    /// Avatar used by `execute` when `--avatar-url` is not given
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar_url: Option<String>,
    #[serde(default)]
    pub webhooks: BTreeMap<String, String>,
}

impl Config {
    /// Reads the config at `path`, writing a default one if it is missing.
    pub fn load_from(path: &Path) -> Result<Self> {
        match File::open(path) {
            Ok(mut file) => {
                let mut config_str = String::new();
                file.read_to_string(&mut config_str)?;
                Ok(toml::from_str(&config_str)?)
            }
            Err(err) if err.kind() == ErrorKind::NotFound => {
                debug!(path = %path.display(), "no config file, creating one");
                let config = Config::default();
                config.save_to(path)?;
                Ok(config)
            }
            Err(err) => Err(Report::new(err).wrap_err("Failed to open the config file")),
        }
    }

    /// Reads the config at `path` without creating it. A missing or
    /// malformed file yields the defaults.
    pub fn peek(path: &Path) -> Self {
        match fs::read_to_string(path) {
            Ok(config_str) => toml::from_str(&config_str).unwrap_or_else(|err| {
                warn!(path = %path.display(), %err, "ignoring malformed config file");
                Config::default()
            }),
            Err(err) => {
                if err.kind() != ErrorKind::NotFound {
                    warn!(path = %path.display(), %err, "cannot read config file");
                }
                Config::default()
            }
        }
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(configdir) = path.parent().filter(|dir| !dir.is_dir()) {
            fs::create_dir_all(configdir)?;
        }
        let config_str = toml::to_string_pretty(self)?;
        let mut file = File::create(path)?;
        file.write_all(config_str.as_bytes())?;
        Ok(())
    }
}

/// Location of the config file. Nothing is created until it is saved.
pub fn default_path() -> io::Result<PathBuf> {
    let configdir = if let Some(dir) = dirs::config_dir() {
        dir
    } else {
        env::current_dir()?
    }
    .join("dishook");
    Ok(configdir.join("config.toml"))
}
