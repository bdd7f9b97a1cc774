use std::fs;
use std::io::{BufReader, Read};
use std::path::{Path, PathBuf};

use super::core::Configuration;

/// Project-level configuration file name
pub const CONFIG_FILE_NAME: &str = ".proofcheck.toml";

const MAX_TRAVERSAL_DEPTH: usize = 10;

/// Configuration plus the file it came from, if any.
#[derive(Debug, Clone, Default)]
pub struct LoadedConfig {
    pub config: Configuration,
    pub path: Option<PathBuf>,
}

pub(crate) fn read_config_file(path: &Path) -> Result<String, std::io::Error> {
    let file = fs::File::open(path)?;
    let mut reader = BufReader::new(file);
    let mut contents = String::new();
    reader.read_to_string(&mut contents)?;
    Ok(contents)
}

/// Parse configuration from a TOML string
pub fn parse_config(contents: &str) -> Result<Configuration, String> {
    let config = toml::from_str::<Configuration>(contents)
        .map_err(|e| format!("Failed to parse {}: {}", CONFIG_FILE_NAME, e))?;

    for rule in config.disabled_rules.intersection(&config.enabled_rules) {
        log::warn!("Rule {} is both enabled and disabled; treating it as disabled", rule);
    }

    Ok(config)
}

pub(crate) fn try_load_config_from_path(config_path: &Path) -> Option<Configuration> {
    let contents = match read_config_file(config_path) {
        Ok(contents) => contents,
        Err(e) => {
            handle_read_error(config_path, &e);
            return None;
        }
    };

    match parse_config(&contents) {
        Ok(config) => {
            log::debug!("Loaded config from {}", config_path.display());
            Some(config)
        }
        Err(e) => {
            log::warn!("{}. Using defaults.", e);
            None
        }
    }
}

/// Only log actual errors, not "file not found"
pub(crate) fn handle_read_error(config_path: &Path, error: &std::io::Error) {
    if error.kind() != std::io::ErrorKind::NotFound {
        log::warn!(
            "Failed to read config file {}: {}",
            config_path.display(),
            error
        );
    }
}

/// Directory ancestors of `start` (itself included), up to `max_depth` entries
pub fn directory_ancestors(start: PathBuf, max_depth: usize) -> impl Iterator<Item = PathBuf> {
    std::iter::successors(Some(start), |dir| {
        let mut parent = dir.clone();
        if parent.pop() {
            Some(parent)
        } else {
            None
        }
    })
    .take(max_depth)
}

/// Per-user configuration file, e.g. `~/.config/proofcheck/config.toml`
pub fn user_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("proofcheck").join("config.toml"))
}

/// Load from `path` if given, otherwise search from `start` upwards, then the
/// user configuration, then fall back to defaults.
pub fn load_config_from(explicit: Option<&Path>, start: PathBuf) -> LoadedConfig {
    if let Some(path) = explicit {
        return LoadedConfig {
            config: try_load_config_from_path(path).unwrap_or_default(),
            path: Some(path.to_path_buf()),
        };
    }

    let project = directory_ancestors(start, MAX_TRAVERSAL_DEPTH)
        .map(|dir| dir.join(CONFIG_FILE_NAME))
        .find_map(|path| try_load_config_from_path(&path).map(|config| (config, path)));

    let found = project.or_else(|| {
        let path = user_config_path()?;
        try_load_config_from_path(&path).map(|config| (config, path))
    });

    match found {
        Some((config, path)) => LoadedConfig {
            config,
            path: Some(path),
        },
        None => {
            log::debug!(
                "No config found after checking {} directories. Using default config.",
                MAX_TRAVERSAL_DEPTH
            );
            LoadedConfig::default()
        }
    }
}

pub fn load_config(explicit: Option<&Path>) -> LoadedConfig {
    let current = match std::env::current_dir() {
        Ok(dir) => dir,
        Err(e) => {
            log::warn!(
                "Failed to get current directory: {}. Using default config.",
                e
            );
            return LoadedConfig {
                config: Configuration::default(),
                path: explicit.map(Path::to_path_buf),
            };
        }
    };
    load_config_from(explicit, current)
}
