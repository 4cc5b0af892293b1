pub mod loader;
pub mod settings;

pub use settings::{AssetSettings, AudioSettings, DrivingSettings, PuzzleSettings};

use log::{error, info};
use serde::{Deserialize, Serialize};
use std::sync::{Arc, RwLock};
use std::time::{Duration, Instant, SystemTime};

// Global configuration instance with thread-safe access
pub static CONFIG: once_cell::sync::Lazy<Arc<RwLock<Config>>> =
    once_cell::sync::Lazy::new(|| Arc::new(RwLock::new(Config::default())));

// Time to wait between checking for config file changes
const CONFIG_CHECK_INTERVAL: Duration = Duration::from_secs(2);

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub audio: AudioSettings,
    pub assets: AssetSettings,
    pub puzzle: PuzzleSettings,
    pub driving: DrivingSettings,
    #[serde(skip)]
    last_checked: Option<Instant>,
    #[serde(skip)]
    file_modified: Option<SystemTime>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            audio: AudioSettings::default(),
            assets: AssetSettings::default(),
            puzzle: PuzzleSettings::default(),
            driving: DrivingSettings::default(),
            last_checked: Some(Instant::now()),
            file_modified: None,
        }
    }
}

impl PartialEq for Config {
    // Bookkeeping fields are not part of the configuration itself
    fn eq(&self, other: &Self) -> bool {
        self.audio == other.audio
            && self.assets == other.assets
            && self.puzzle == other.puzzle
            && self.driving == other.driving
    }
}

impl Config {
    /// Snapshot of the live configuration.
    #[must_use]
    pub fn current() -> Config {
        match CONFIG.read() {
            Ok(config) => config.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    /// Replaces the live configuration.
    pub fn install(mut config: Config) {
        config.last_checked = Some(Instant::now());
        match CONFIG.write() {
            Ok(mut live) => *live = config,
            Err(poisoned) => *poisoned.into_inner() = config,
        }
    }

    /// Loads the configuration file into the live configuration, falling back
    /// to defaults when it cannot be read.
    pub fn init() -> Config {
        match loader::load_config_from_file() {
            Ok(config) => {
                info!("Configuration loaded successfully");
                Self::install(config.clone());
                config
            }
            Err(e) => {
                error!("Failed to load configuration: {e}");
                Config::current()
            }
        }
    }

    // Check if the config needs to be reloaded and reload if necessary
    pub fn check_and_reload() -> bool {
        let now = Instant::now();
        let (should_check, known_modified) = {
            let config = Self::current();
            let due = config
                .last_checked
                .is_none_or(|last| now.duration_since(last) > CONFIG_CHECK_INTERVAL);
            (due, config.file_modified)
        };

        if !should_check {
            return false;
        }

        let modified = loader::modified_time(&loader::get_config_file_path());
        if modified.is_none() || modified == known_modified {
            Self::touch(now);
            return false;
        }

        match loader::load_config_from_file() {
            Ok(new_config) => {
                info!("Configuration file changed, reloading");
                Self::install(new_config);
                true
            }
            Err(e) => {
                error!("Failed to reload configuration: {e}");
                Self::touch(now);
                false
            }
        }
    }

    /// Writes `self` to the configuration file and makes it the live configuration.
    pub fn persist(&self) -> Result<(), loader::ConfigError> {
        let mut saved = self.clone();
        loader::save_config_to_file(&saved)?;
        saved.file_modified = loader::modified_time(&loader::get_config_file_path());
        Self::install(saved);
        Ok(())
    }

    pub(crate) fn set_file_modified(&mut self, modified: Option<SystemTime>) {
        self.file_modified = modified;
    }

    fn touch(now: Instant) {
        match CONFIG.write() {
            Ok(mut live) => live.last_checked = Some(now),
            Err(poisoned) => poisoned.into_inner().last_checked = Some(now),
        }
    }
}
