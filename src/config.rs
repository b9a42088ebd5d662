use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const DEFAULT_DIRECTORY: &str = ".gadget";
pub const DEFAULT_FILE: &str = "gadget.db";
pub const BACKUP_SUFFIX: &str = ".bkp";

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct CatalogConfig {
    pub directory: Option<String>,
    pub file: Option<String>,
}

impl CatalogConfig {
    /// Resolve the storage location, letting explicit overrides win over
    /// config values and config values win over defaults.
    pub fn paths(&self, directory: Option<PathBuf>, file: Option<String>) -> CatalogPaths {
        let directory = directory
            .or_else(|| self.directory.as_ref().map(PathBuf::from))
            .unwrap_or_else(|| PathBuf::from(DEFAULT_DIRECTORY));
        let file = file
            .or_else(|| self.file.clone())
            .unwrap_or_else(|| DEFAULT_FILE.to_string());
        CatalogPaths::new(directory, file)
    }
}

/// Location of the catalog storage file and its backup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogPaths {
    pub directory: PathBuf,
    pub file: String,
}

impl CatalogPaths {
    /// An empty directory means the current one.
    pub fn new(directory: impl Into<PathBuf>, file: impl Into<String>) -> Self {
        let mut directory = directory.into();
        if directory.as_os_str().is_empty() {
            directory = PathBuf::from(".");
        }
        Self {
            directory,
            file: file.into(),
        }
    }

    pub fn database_path(&self) -> PathBuf {
        self.directory.join(&self.file)
    }

    pub fn backup_path(&self) -> PathBuf {
        let mut path = self.database_path().into_os_string();
        path.push(BACKUP_SUFFIX);
        PathBuf::from(path)
    }
}

impl Default for CatalogPaths {
    fn default() -> Self {
        Self::new(DEFAULT_DIRECTORY, DEFAULT_FILE)
    }
}

pub fn default_config_path() -> PathBuf {
    PathBuf::from("gadget.toml")
}

pub fn load_config(path: Option<&Path>) -> anyhow::Result<Option<CatalogConfig>> {
    let path = path.map(Path::to_path_buf).unwrap_or_else(default_config_path);
    if !path.exists() {
        return Ok(None);
    }

    let contents = std::fs::read_to_string(&path)?;
    let config: CatalogConfig = toml::from_str(&contents)?;
    Ok(Some(config))
}

pub fn write_config(path: &Path, config: &CatalogConfig, force: bool) -> anyhow::Result<()> {
    if path.exists() && !force {
        anyhow::bail!("config already exists at {} (use --force to overwrite)", path.display());
    }

    let contents = toml::to_string_pretty(config)?;
    std::fs::write(path, contents)?;
    Ok(())
}
