use serde::{Deserialize, Serialize};
use std::fs;

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct TesseraSettings {
    #[serde(default)]
    pub session: SessionSettings,
    #[serde(default)]
    pub logging: LoggingSettings,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionSettings {
    /// Source of randomness for token minting.
    pub entropy_file: String,
    /// Number of bytes read from the entropy source per token.
    pub entropy_length: usize,
    /// Seconds of inactivity before a session expires.
    pub timeout_seconds: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingSettings {
    pub level: String,
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            entropy_file: "/dev/urandom".to_string(),
            entropy_length: 32,
            timeout_seconds: 1200, // 20 minutes
        }
    }
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

impl TesseraSettings {
    /// Load settings from configuration files and environment variables
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Settings file cannot be read or parsed
    /// - TOML parsing fails
    pub fn load() -> Result<Self, Box<dyn std::error::Error>> {
        // Logger initialization is idempotent so load() can be called from
        // multiple entry points.
        let _ = env_logger::try_init();

        // Load base settings from TOML or defaults
        let mut settings = Self::load_base_settings()?;

        // Apply environment variable overrides
        Self::apply_env_overrides(&mut settings);

        Ok(settings)
    }

    /// Load base settings from TOML file(s) or use defaults
    /// Settings are loaded with the following priority (highest to lowest):
    /// 1. Environment variables (applied separately after loading base settings)
    /// 2. Settings.toml in `TESSERA_SETTINGS_DIR` (if specified and exists)
    /// 3. Settings.toml in current directory (if exists)
    /// 4. Default settings
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Settings file cannot be read
    /// - TOML parsing fails
    fn load_base_settings() -> Result<Self, Box<dyn std::error::Error>> {
        // 1. Start with default settings
        let mut settings = Self::default();

        // 2. Try to load from Settings.toml in current directory (lower priority)
        let default_config_path = std::path::PathBuf::from("Settings.toml");
        if default_config_path.exists() {
            let toml_content = fs::read_to_string(&default_config_path)?;
            settings = basic_toml::from_str(&toml_content)?;
        }

        // 3. If TESSERA_SETTINGS_DIR is set and contains Settings.toml, override
        //    with those settings (higher priority)
        if let Ok(settings_dir) = std::env::var("TESSERA_SETTINGS_DIR") {
            let settings_path = std::path::Path::new(&settings_dir).join("Settings.toml");
            if settings_path.exists() {
                let toml_content = fs::read_to_string(&settings_path)?;
                settings = basic_toml::from_str(&toml_content)?;
            }
        }

        Ok(settings)
    }

    /// Apply environment variable overrides to settings
    fn apply_env_overrides(settings: &mut Self) {
        Self::apply_session_env_overrides(&mut settings.session);
        Self::apply_logging_env_overrides(&mut settings.logging);
    }

    /// Apply environment overrides for session settings
    pub fn apply_session_env_overrides(session_settings: &mut SessionSettings) {
        if let Ok(entropy_file) = std::env::var("SESSION_ENTROPY_FILE") {
            session_settings.entropy_file = entropy_file;
        }
        if let Ok(length_str) = std::env::var("SESSION_ENTROPY_LENGTH") {
            if let Ok(length) = length_str.parse::<usize>() {
                session_settings.entropy_length = length;
            }
        }
        if let Ok(timeout_str) = std::env::var("SESSION_TIMEOUT_SECONDS") {
            if let Ok(timeout) = timeout_str.parse::<i64>() {
                session_settings.timeout_seconds = timeout;
            }
        }
    }

    /// Apply environment overrides for logging settings
    fn apply_logging_env_overrides(logging_settings: &mut LoggingSettings) {
        if let Ok(level) = std::env::var("LOG_LEVEL") {
            logging_settings.level = level;
        }
    }
}
