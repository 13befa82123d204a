//! Configuration system for persona-lens
//!
//! Supports multiple configuration sources with the following precedence (highest to lowest):
//! 1. CLI arguments
//! 2. Environment variables (PERSONA_LENS_* prefix)
//! 3. Configuration file (TOML)
//! 4. Default values

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::{Error, Result};
use crate::render::report::ReportFormat;
use crate::render::{parse_hex_color, CardStyle, MotivationStrength};

/// Main application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Output artifact settings
    pub output: OutputSettings,

    /// Avatar fetching settings
    pub avatar: AvatarSettings,

    /// Card appearance settings
    pub card: CardSettings,

    /// Logging configuration
    pub logging: LoggingSettings,
}

/// Output artifact settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputSettings {
    /// Directory artifacts are written to
    pub dir: String,

    /// Report format: "text" or "markdown"
    pub report_format: String,
}

/// Avatar fetching settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AvatarSettings {
    /// HTTP timeout in seconds for the avatar fetch
    pub timeout_secs: u64,

    /// Rendered avatar diameter in pixels
    pub size: u32,
}

/// Card appearance settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CardSettings {
    /// Canvas background color (#RRGGBB)
    pub background: String,

    /// Section panel color (#RRGGBB)
    pub panel: String,

    /// Accent color for headers, bars, and markers (#RRGGBB)
    pub accent: String,

    /// Primary text color (#RRGGBB)
    pub text: String,

    /// Muted text color (#RRGGBB)
    pub muted: String,

    /// Regular font file (empty = bundled font)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub font_regular: Option<String>,

    /// Bold font file (empty = bundled font)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub font_bold: Option<String>,

    /// Motivation bar fill per confidence level (0.0 - 1.0)
    pub strength_high: f32,
    pub strength_medium: f32,
    pub strength_low: f32,
}

/// Logging settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
    /// Log level: trace, debug, info, warn, error
    pub level: String,

    /// Log file path (empty = no file logging)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file: Option<String>,

    /// Maximum log file size in MB before rotation
    pub max_file_size_mb: u64,

    /// Number of rotated log files to keep
    pub max_files: u32,

    /// Enable JSON formatted logging
    pub json_format: bool,
}

// Default implementations

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            output: OutputSettings::default(),
            avatar: AvatarSettings::default(),
            card: CardSettings::default(),
            logging: LoggingSettings::default(),
        }
    }
}

impl Default for OutputSettings {
    fn default() -> Self {
        Self {
            dir: "personas".to_string(),
            report_format: "text".to_string(),
        }
    }
}

impl Default for AvatarSettings {
    fn default() -> Self {
        Self {
            timeout_secs: 10,
            size: 160,
        }
    }
}

impl Default for CardSettings {
    fn default() -> Self {
        Self {
            background: "#181A1B".to_string(),
            panel: "#232526".to_string(),
            accent: "#4CAF50".to_string(),
            text: "#F3F4F6".to_string(),
            muted: "#888888".to_string(),
            font_regular: None,
            font_bold: None,
            strength_high: 0.9,
            strength_medium: 0.65,
            strength_low: 0.4,
        }
    }
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            file: None,
            max_file_size_mb: 100,
            max_files: 5,
            json_format: false,
        }
    }
}

impl AppConfig {
    /// Load configuration from file with environment variable overrides
    pub fn load(config_path: Option<&str>) -> Result<Self> {
        let mut config = Self::default();

        // 1. Load from config file if it exists
        let config_file = Self::find_config_file(config_path)?;
        if let Some(path) = config_file {
            debug!(path = %path.display(), "Loading configuration file");
            let content = fs::read_to_string(&path)
                .map_err(|e| Error::config_parse(format!("Failed to read config file: {}", e)))?;
            config = toml::from_str(&content)
                .map_err(|e| Error::config_parse(format!("Failed to parse config file: {}", e)))?;
            info!(path = %path.display(), "Configuration loaded from file");
        }

        // 2. Apply environment variable overrides
        config.apply_env_overrides();

        // 3. Expand paths
        config.expand_paths();

        // 4. Validate
        config.validate()?;

        Ok(config)
    }

    /// Find the configuration file to use
    fn find_config_file(explicit_path: Option<&str>) -> Result<Option<PathBuf>> {
        // If explicit path provided, use it (error if not found)
        if let Some(path) = explicit_path {
            let expanded = shellexpand::tilde(path);
            let path = PathBuf::from(expanded.as_ref());
            if path.exists() {
                return Ok(Some(path));
            } else {
                return Err(Error::ConfigNotFound { path });
            }
        }

        // Search in standard locations
        let search_paths = [
            // Current directory
            PathBuf::from("persona-lens.toml"),
            PathBuf::from("config.toml"),
            // User config directory
            dirs::config_dir()
                .map(|p| p.join("persona-lens").join("config.toml"))
                .unwrap_or_default(),
            // Home directory
            dirs::home_dir()
                .map(|p| p.join(".persona-lens").join("config.toml"))
                .unwrap_or_default(),
            // System config (Linux)
            PathBuf::from("/etc/persona-lens/config.toml"),
        ];

        for path in &search_paths {
            if path.exists() {
                debug!(path = %path.display(), "Found configuration file");
                return Ok(Some(path.clone()));
            }
        }

        debug!("No configuration file found, using defaults");
        Ok(None)
    }

    /// Apply environment variable overrides
    fn apply_env_overrides(&mut self) {
        // Output settings
        if let Ok(val) = std::env::var("PERSONA_LENS_OUTPUT_DIR") {
            self.output.dir = val;
        }
        if let Ok(val) = std::env::var("PERSONA_LENS_REPORT_FORMAT") {
            self.output.report_format = val;
        }

        // Avatar settings
        if let Ok(val) = std::env::var("PERSONA_LENS_AVATAR_TIMEOUT_SECS") {
            if let Ok(n) = val.parse() {
                self.avatar.timeout_secs = n;
            }
        }
        if let Ok(val) = std::env::var("PERSONA_LENS_AVATAR_SIZE") {
            if let Ok(n) = val.parse() {
                self.avatar.size = n;
            }
        }

        // Card settings
        if let Ok(val) = std::env::var("PERSONA_LENS_CARD_ACCENT") {
            self.card.accent = val;
        }
        if let Ok(val) = std::env::var("PERSONA_LENS_CARD_BACKGROUND") {
            self.card.background = val;
        }
        if let Ok(val) = std::env::var("PERSONA_LENS_FONT_REGULAR") {
            self.card.font_regular = Some(val);
        }
        if let Ok(val) = std::env::var("PERSONA_LENS_FONT_BOLD") {
            self.card.font_bold = Some(val);
        }

        // Logging settings
        if let Ok(val) = std::env::var("PERSONA_LENS_LOG_LEVEL") {
            self.logging.level = val;
        }
        if let Ok(val) = std::env::var("PERSONA_LENS_LOG_FILE") {
            self.logging.file = Some(val);
        }
        if let Ok(val) = std::env::var("PERSONA_LENS_LOG_JSON") {
            self.logging.json_format = val.to_lowercase() == "true" || val == "1";
        }
    }

    /// Expand ~ and other path variables
    fn expand_paths(&mut self) {
        self.output.dir = expand_path(&self.output.dir);

        if let Some(ref font) = self.card.font_regular {
            self.card.font_regular = Some(expand_path(font));
        }
        if let Some(ref font) = self.card.font_bold {
            self.card.font_bold = Some(expand_path(font));
        }
        if let Some(ref file) = self.logging.file {
            self.logging.file = Some(expand_path(file));
        }
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.output.dir.is_empty() {
            return Err(Error::config_field_invalid(
                "output.dir",
                "Output directory cannot be empty",
            ));
        }

        self.report_format()?;

        for (field, value) in [
            ("card.background", &self.card.background),
            ("card.panel", &self.card.panel),
            ("card.accent", &self.card.accent),
            ("card.text", &self.card.text),
            ("card.muted", &self.card.muted),
        ] {
            parse_hex_color(value).map_err(|_| {
                Error::config_field_invalid(
                    field,
                    format!("'{}' is not a #RRGGBB hex color", value),
                )
            })?;
        }

        if !(16..=512).contains(&self.avatar.size) {
            return Err(Error::config_field_invalid(
                "avatar.size",
                "Avatar size must be between 16 and 512 pixels",
            ));
        }
        if self.avatar.timeout_secs == 0 {
            return Err(Error::config_field_invalid(
                "avatar.timeout_secs",
                "Avatar timeout must be at least 1 second",
            ));
        }

        for (field, value) in [
            ("card.strength_high", self.card.strength_high),
            ("card.strength_medium", self.card.strength_medium),
            ("card.strength_low", self.card.strength_low),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(Error::config_field_invalid(
                    field,
                    "Strength values must be between 0.0 and 1.0",
                ));
            }
        }

        // Validate log level
        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.logging.level.to_lowercase().as_str()) {
            return Err(Error::config_field_invalid(
                "logging.level",
                format!(
                    "Invalid log level '{}'. Must be one of: {}",
                    self.logging.level,
                    valid_levels.join(", ")
                ),
            ));
        }

        Ok(())
    }

    /// Parsed report format
    pub fn report_format(&self) -> Result<ReportFormat> {
        match self.output.report_format.to_lowercase().as_str() {
            "text" | "txt" => Ok(ReportFormat::Text),
            "markdown" | "md" => Ok(ReportFormat::Markdown),
            other => Err(Error::config_field_invalid(
                "output.report_format",
                format!("Unknown report format '{}'. Use 'text' or 'markdown'", other),
            )),
        }
    }

    /// Build the card style from the configured colors and strengths
    pub fn card_style(&self) -> Result<CardStyle> {
        Ok(CardStyle {
            background: parse_hex_color(&self.card.background)?,
            panel: parse_hex_color(&self.card.panel)?,
            accent: parse_hex_color(&self.card.accent)?,
            text: parse_hex_color(&self.card.text)?,
            muted: parse_hex_color(&self.card.muted)?,
            avatar_size: self.avatar.size,
            motivation_strength: MotivationStrength {
                high: self.card.strength_high,
                medium: self.card.strength_medium,
                low: self.card.strength_low,
            },
        })
    }

    /// Get the output directory as a PathBuf
    pub fn output_dir(&self) -> PathBuf {
        PathBuf::from(&self.output.dir)
    }

    /// Configured font paths, when set
    pub fn font_paths(&self) -> (Option<&Path>, Option<&Path>) {
        (
            self.card.font_regular.as_deref().map(Path::new),
            self.card.font_bold.as_deref().map(Path::new),
        )
    }
}

/// Expand ~ and environment variables in paths
fn expand_path(path: &str) -> String {
    shellexpand::full(path)
        .unwrap_or_else(|_| std::borrow::Cow::Borrowed(path))
        .into_owned()
}

/// Initialize a new configuration file
pub fn init_config(path: Option<&str>, force: bool) -> Result<()> {
    let config_path = path
        .map(|p| PathBuf::from(expand_path(p)))
        .unwrap_or_else(|| {
            dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(".persona-lens")
                .join("config.toml")
        });

    // Check if file exists
    if config_path.exists() && !force {
        return Err(Error::config_parse(format!(
            "Configuration file already exists: {}. Use --force to overwrite.",
            config_path.display()
        )));
    }

    // Create parent directories
    if let Some(parent) = config_path.parent() {
        fs::create_dir_all(parent)
            .map_err(|e| Error::config_parse(format!("Failed to create config directory: {}", e)))?;
    }

    // Generate default config with comments
    let config_content = generate_default_config();

    // Write the file
    fs::write(&config_path, config_content)
        .map_err(|e| Error::config_parse(format!("Failed to write config file: {}", e)))?;

    println!("Configuration file created: {}", config_path.display());
    Ok(())
}

/// Generate default configuration content with comments
fn generate_default_config() -> String {
    r##"# persona-lens Configuration

[output]
# Directory rendered artifacts are written to
dir = "personas"

# Report format: "text" or "markdown"
report_format = "text"

[avatar]
# HTTP timeout in seconds for the avatar fetch
timeout_secs = 10

# Rendered avatar diameter in pixels
size = 160

[card]
# Card colors (#RRGGBB)
background = "#181A1B"
panel = "#232526"
accent = "#4CAF50"
text = "#F3F4F6"
muted = "#888888"

# Font files (comment out to use the bundled fonts)
# font_regular = "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf"
# font_bold = "/usr/share/fonts/truetype/dejavu/DejaVuSans-Bold.ttf"

# Motivation bar fill per confidence level (0.0 - 1.0)
strength_high = 0.9
strength_medium = 0.65
strength_low = 0.4

[logging]
# Log level: trace, debug, info, warn, error
level = "info"

# Log file path (comment out to disable file logging)
# file = "~/.persona-lens/logs/persona-lens.log"

# Maximum log file size in MB before rotation
max_file_size_mb = 100

# Number of rotated log files to keep
max_files = 5

# Enable JSON formatted logging
json_format = false
"##
    .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.output.dir, "personas");
        assert_eq!(config.avatar.timeout_secs, 10);
        assert_eq!(config.card.accent, "#4CAF50");
        assert_eq!(config.logging.level, "info");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_env_override() {
        env::set_var("PERSONA_LENS_OUTPUT_DIR", "/tmp/cards");
        env::set_var("PERSONA_LENS_CARD_ACCENT", "#FF8800");
        env::set_var("PERSONA_LENS_LOG_LEVEL", "debug");

        let mut config = AppConfig::default();
        config.apply_env_overrides();

        assert_eq!(config.output.dir, "/tmp/cards");
        assert_eq!(config.card.accent, "#FF8800");
        assert_eq!(config.logging.level, "debug");

        env::remove_var("PERSONA_LENS_OUTPUT_DIR");
        env::remove_var("PERSONA_LENS_CARD_ACCENT");
        env::remove_var("PERSONA_LENS_LOG_LEVEL");
    }

    #[test]
    fn test_validation_invalid_color() {
        let mut config = AppConfig::default();
        config.card.accent = "green".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validation_invalid_report_format() {
        let mut config = AppConfig::default();
        config.output.report_format = "pdf".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validation_invalid_avatar_size() {
        let mut config = AppConfig::default();
        config.avatar.size = 4;
        assert!(config.validate().is_err());
        config.avatar.size = 4096;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validation_invalid_log_level() {
        let mut config = AppConfig::default();
        config.logging.level = "invalid".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validation_strength_out_of_range() {
        let mut config = AppConfig::default();
        config.card.strength_high = 1.5;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_report_format_parsing() {
        let mut config = AppConfig::default();
        assert_eq!(config.report_format().unwrap(), ReportFormat::Text);
        config.output.report_format = "md".to_string();
        assert_eq!(config.report_format().unwrap(), ReportFormat::Markdown);
    }

    #[test]
    fn test_card_style_from_config() {
        let config = AppConfig::default();
        let style = config.card_style().unwrap();
        assert_eq!(style.accent, image::Rgba([0x4c, 0xaf, 0x50, 0xff]));
        assert_eq!(style.avatar_size, 160);
        assert_eq!(style.motivation_strength.high, 0.9);
    }

    #[test]
    fn test_path_expansion() {
        let mut config = AppConfig::default();
        config.output.dir = "~/personas".to_string();
        config.expand_paths();
        assert!(!config.output.dir.contains('~'));
    }

    #[test]
    fn test_serialize_deserialize() {
        let config = AppConfig::default();
        let toml_str = toml::to_string(&config).unwrap();
        let parsed: AppConfig = toml::from_str(&toml_str).unwrap();
        assert_eq!(config.output.dir, parsed.output.dir);
        assert_eq!(config.card.accent, parsed.card.accent);
    }

    #[test]
    fn test_generated_default_config_parses() {
        let content = generate_default_config();
        assert!(content.contains("background = \"#181A1B\""));
        assert!(content.contains("muted = \"#888888\""));
        let parsed: AppConfig = toml::from_str(&content).unwrap();
        assert!(parsed.validate().is_ok());
        assert_eq!(parsed.card.accent, "#4CAF50");
    }

    #[test]
    fn test_parse_config_file() {
        let config_str = r##"
[output]
dir = "/srv/personas"
report_format = "markdown"

[avatar]
timeout_secs = 5
size = 200

[card]
accent = "#E91E63"

[logging]
level = "debug"
"##;
        let config: AppConfig = toml::from_str(config_str).unwrap();

        assert_eq!(config.output.dir, "/srv/personas");
        assert_eq!(config.output.report_format, "markdown");
        assert_eq!(config.avatar.timeout_secs, 5);
        assert_eq!(config.avatar.size, 200);
        assert_eq!(config.card.accent, "#E91E63");
        // untouched sections keep defaults
        assert_eq!(config.card.background, "#181A1B");
        assert_eq!(config.logging.level, "debug");
    }
}
