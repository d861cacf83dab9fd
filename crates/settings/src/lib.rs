//! Reading and writing the user-editable settings file

mod schema;

pub use schema::{
    CalibrationLists, CalibrationRow, CalibrationTable, ListSlot, ProviderKind, Settings,
};

use directories::ProjectDirs;
use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};

/// Environment variable naming a settings file to use instead of the default
pub const SETTINGS_ENV: &str = "MSCOPE_SETTINGS";

pub const SETTINGS_FILE_NAME: &str = "settings.json";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("unable to resolve the user configuration directory")]
    NoConfigDirectory,
    #[error("settings file {} does not exist", .0.display())]
    NotFound(PathBuf),
    #[error("settings file {} already exists", .0.display())]
    AlreadyExists(PathBuf),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid settings in {}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("serialization error: {0}")]
    Serialize(#[from] serde_json::Error),
    #[error("no calibrations configured")]
    EmptyRegistry,
    #[error(
        "calibration lists differ in length: names={names} cals={cals} units={units} aspect_ratio={aspect_ratio}"
    )]
    LengthMismatch { names: usize, cals: usize, units: usize, aspect_ratio: usize },
    #[error("calibration {index} mixes a provider with plain values")]
    InconsistentProvider { index: usize },
    #[error("calibration {index} has no value in `{field}`")]
    MissingValue { index: usize, field: &'static str },
}

/// Where settings are read from and written to
#[derive(Debug, Clone)]
pub struct SettingsStore {
    path: PathBuf,
    /// Named by the user, so it must exist
    explicit: bool,
}

impl SettingsStore {
    pub fn from_default_project() -> Result<Self, ConfigError> {
        let dirs = ProjectDirs::from("edu", "mscope", "mscope-tools")
            .ok_or(ConfigError::NoConfigDirectory)?;

        Ok(Self { path: dirs.config_dir().join(SETTINGS_FILE_NAME), explicit: false })
    }

    /// Settings in `root`, falling back to defaults when the file is absent
    pub fn with_root(root: impl Into<PathBuf>) -> Self {
        Self { path: root.into().join(SETTINGS_FILE_NAME), explicit: false }
    }

    /// A file the user named; loading fails if it is absent
    pub fn at_path(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into(), explicit: true }
    }

    /// Resolve the flag, then `MSCOPE_SETTINGS`, then the per-user default
    pub fn discover(flag: Option<PathBuf>) -> Result<Self, ConfigError> {
        Self::discover_with(flag, std::env::var_os(SETTINGS_ENV))
    }

    fn discover_with(flag: Option<PathBuf>, env: Option<OsString>) -> Result<Self, ConfigError> {
        if let Some(path) = flag {
            return Ok(Self::at_path(path));
        }
        if let Some(path) = env.filter(|value| !value.is_empty()) {
            log::debug!("settings path taken from {SETTINGS_ENV}");
            return Ok(Self::at_path(path));
        }
        Self::from_default_project()
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn is_explicit(&self) -> bool {
        self.explicit
    }

    /// Read and validate the settings
    ///
    /// Calibration lists are checked here so that a broken file is
    /// reported before anything is shown to the user.
    pub fn load(&self) -> Result<Settings, ConfigError> {
        if !self.path.exists() {
            if self.explicit {
                return Err(ConfigError::NotFound(self.path.clone()));
            }
            log::debug!("{} absent, using built-in settings", self.path.display());
            return Ok(Settings::default());
        }

        let bytes = fs::read(&self.path)?;
        let settings: Settings = serde_json::from_slice(&bytes)
            .map_err(|source| ConfigError::Parse { path: self.path.clone(), source })?;
        settings.calibrations.to_rows()?;

        Ok(settings)
    }

    pub fn save(&self, settings: &Settings) -> Result<(), ConfigError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }

        let bytes = serde_json::to_vec_pretty(settings)?;
        fs::write(&self.path, bytes)?;
        Ok(())
    }

    /// Write the built-in settings as a starting point for editing
    pub fn init(&self, force: bool) -> Result<(), ConfigError> {
        if self.path.exists() && !force {
            return Err(ConfigError::AlreadyExists(self.path.clone()));
        }
        self.save(&Settings::default())?;
        log::info!("wrote default settings to {}", self.path.display());
        Ok(())
    }
}
