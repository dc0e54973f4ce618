//! Configuration module for loading TOML config files.

use serde::Deserialize;
use std::fs;
use std::path::Path;

use crate::error::GenerationError;

/// Root configuration structure.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub run: RunConfig,
    pub announcement: AnnouncementConfig,
}

/// Parameters controlling the generation loop.
#[derive(Debug, Clone, Deserialize)]
pub struct RunConfig {
    /// First cartela number (inclusive).
    pub start: u32,
    /// Last cartela number (inclusive).
    pub end: u32,
    /// Directory the MP3 files are written into.
    pub output_dir: String,
    /// A progress line is printed every this many generated items.
    #[serde(default = "default_progress_interval")]
    pub progress_interval: u32,
    /// Pause after each item, to stay under provider rate limits.
    #[serde(default = "default_item_delay_ms")]
    pub item_delay_ms: u64,
    /// Longer pause after a failed item.
    #[serde(default = "default_error_delay_ms")]
    pub error_delay_ms: u64,
}

/// The announcement sentence and how to speak it.
#[derive(Debug, Clone, Deserialize)]
pub struct AnnouncementConfig {
    /// Sentence template with a single `{}` placeholder for the number.
    pub template: String,
    /// Language code passed to the TTS provider.
    pub language: String,
    /// Ask the provider for slow speech.
    #[serde(default)]
    pub slow: bool,
}

fn default_progress_interval() -> u32 {
    10
}

fn default_item_delay_ms() -> u64 {
    200
}

fn default_error_delay_ms() -> u64 {
    2000
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, GenerationError> {
        let content = fs::read_to_string(path.as_ref())
            .map_err(|e| GenerationError::ConfigError(format!("Failed to read config: {}", e)))?;
        Self::from_str(&content)
    }

    /// Load configuration from string content.
    pub fn from_str(content: &str) -> Result<Self, GenerationError> {
        let config: Config = toml::from_str(content)
            .map_err(|e| GenerationError::ConfigError(format!("Failed to parse config: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Check the range and template before starting a run.
    pub fn validate(&self) -> Result<(), GenerationError> {
        if self.run.start == 0 || self.run.start > self.run.end {
            return Err(GenerationError::ConfigError(format!(
                "Invalid cartela range: {}..={}",
                self.run.start, self.run.end
            )));
        }

        let placeholders = self.announcement.template.matches("{}").count();
        if placeholders != 1 {
            return Err(GenerationError::ConfigError(format!(
                "Template must contain the {{}} placeholder exactly once, found {}",
                placeholders
            )));
        }

        Ok(())
    }

    /// Render the announcement text for a cartela number.
    pub fn render(&self, number: u32) -> String {
        self.announcement
            .template
            .replacen("{}", &number.to_string(), 1)
    }
}

/// Default configuration embedded in the binary.
///
/// Values match the constants the generator was originally run with:
/// winner announcements for cartelas 1-300, spoken in Amharic, written
/// under the game client's public audio directory.
pub fn default_config() -> Config {
    Config {
        run: RunConfig {
            start: 1,
            end: 300,
            output_dir: "client/public/audio/cartelas".to_string(),
            progress_interval: default_progress_interval(),
            item_delay_ms: default_item_delay_ms(),
            error_delay_ms: default_error_delay_ms(),
        },
        announcement: AnnouncementConfig {
            // "The winner is cartela number {}"
            template: "ያሸነፈው ካርቴላ ቁጥር {}".to_string(),
            language: "am".to_string(),
            slow: false,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = default_config();
        assert!(config.validate().is_ok());
        assert_eq!(config.run.start, 1);
        assert_eq!(config.run.end, 300);
        assert_eq!(config.announcement.language, "am");
        assert_eq!(config.run.output_dir, "client/public/audio/cartelas");
    }

    #[test]
    fn test_render_substitutes_number_once() {
        let config = default_config();
        assert_eq!(config.render(7), "ያሸነፈው ካርቴላ ቁጥር 7");
        assert_eq!(config.render(300), "ያሸነፈው ካርቴላ ቁጥር 300");
    }

    #[test]
    fn test_render_contains_decimal_form() {
        let config = default_config();
        for n in [1u32, 42, 150, 300] {
            let text = config.render(n);
            assert_eq!(text.matches(&n.to_string()).count(), 1);
        }
    }

    #[test]
    fn test_from_str_round_trip() {
        let toml = r#"
            [run]
            start = 10
            end = 20
            output_dir = "out"
            item_delay_ms = 0
            error_delay_ms = 0

            [announcement]
            template = "number {}"
            language = "en"
        "#;

        let config = Config::from_str(toml).unwrap();
        assert_eq!(config.run.start, 10);
        assert_eq!(config.run.end, 20);
        assert_eq!(config.run.progress_interval, 10);
        assert!(!config.announcement.slow);
        assert_eq!(config.render(11), "number 11");
    }

    #[test]
    fn test_template_without_placeholder_rejected() {
        let mut config = default_config();
        config.announcement.template = "no placeholder".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_template_with_two_placeholders_rejected() {
        let mut config = default_config();
        config.announcement.template = "{} and {}".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_empty_range_rejected() {
        let mut config = default_config();
        config.run.start = 5;
        config.run.end = 4;
        assert!(config.validate().is_err());
    }
}
