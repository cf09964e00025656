// RUNTIME PREFERENCES (User Experience)
//
// Every preference defaults from a JACK_* environment variable. A TOML file
// passed with --config overrides the defaults section by section.

use crate::logging::events::LogLevel;
use serde::{Deserialize, Serialize};
use std::env;
use std::path::{Path, PathBuf};

fn env_bool(name: &str, default: bool) -> bool {
    env::var(name)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FileProcessorPreferences {
    /// Whether to reject files that do not end in .jack
    pub require_jack_extension: bool,

    /// Whether to log processing rate and timing for each file
    pub enable_performance_logging: bool,
}

impl Default for FileProcessorPreferences {
    fn default() -> Self {
        Self {
            require_jack_extension: env_bool(env_vars::REQUIRE_JACK_EXTENSION, true),
            enable_performance_logging: env_bool(env_vars::ENABLE_PERFORMANCE_LOGGING, true),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LexicalPreferences {
    /// Whether to collect per-kind token counts and length statistics
    pub collect_detailed_metrics: bool,

    /// Whether to show position information in error messages
    pub include_position_in_errors: bool,
}

impl Default for LexicalPreferences {
    fn default() -> Self {
        Self {
            collect_detailed_metrics: env_bool(env_vars::LEXICAL_DETAILED_METRICS, true),
            include_position_in_errors: env_bool(env_vars::LEXICAL_INCLUDE_POSITIONS, true),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputPreferences {
    /// Write `<Name>T.xml` alongside the parse tree
    pub write_token_xml: bool,

    /// Write `<Name>.json` with the serialized parse tree
    pub write_json_tree: bool,

    /// Directory for output files; next to the source when unset
    pub output_dir: Option<PathBuf>,
}

impl Default for OutputPreferences {
    fn default() -> Self {
        Self {
            write_token_xml: env_bool(env_vars::OUTPUT_TOKEN_XML, false),
            write_json_tree: env_bool(env_vars::OUTPUT_JSON_TREE, false),
            output_dir: env::var(env_vars::OUTPUT_DIR).ok().map(PathBuf::from),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingPreferences {
    /// Whether to use structured JSON logging
    pub use_structured_logging: bool,

    /// Whether to enable console output
    pub enable_console_logging: bool,

    /// Minimum level that reaches the logger
    pub min_log_level: LogLevel,

    /// Whether to include performance metrics in logs
    pub log_performance_events: bool,

    /// Whether to print the cargo-style error summary
    pub enable_cargo_style_output: bool,

    /// Whether to tag events with the file being processed
    pub include_file_context: bool,
}

impl Default for LoggingPreferences {
    fn default() -> Self {
        Self {
            use_structured_logging: env_bool(env_vars::LOGGING_USE_STRUCTURED, false),
            enable_console_logging: env_bool(env_vars::LOGGING_ENABLE_CONSOLE, false),
            min_log_level: env::var(env_vars::LOGGING_MIN_LEVEL)
                .ok()
                .and_then(|v| LogLevel::parse(&v))
                .unwrap_or(LogLevel::Info),
            log_performance_events: env_bool(env_vars::LOGGING_LOG_PERFORMANCE, true),
            enable_cargo_style_output: env_bool(env_vars::LOGGING_CARGO_STYLE, true),
            include_file_context: env_bool(env_vars::LOGGING_INCLUDE_FILE_CONTEXT, true),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Cannot read configuration file {path}: {message}")]
    Read { path: String, message: String },

    #[error("Invalid configuration in {path}: {message}")]
    Parse { path: String, message: String },
}

impl ConfigError {
    pub fn error_code(&self) -> crate::logging::Code {
        crate::logging::codes::system::CONFIGURATION_ERROR
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RuntimeConfig {
    pub file_processor: FileProcessorPreferences,
    pub lexical: LexicalPreferences,
    pub output: OutputPreferences,
    pub logging: LoggingPreferences,
}

impl RuntimeConfig {
    /// Load preferences from a TOML file; missing sections keep their defaults
    pub fn from_toml_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Read {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        Self::from_toml_str(&content).map_err(|e| match e {
            ConfigError::Parse { message, .. } => ConfigError::Parse {
                path: path.display().to_string(),
                message,
            },
            other => other,
        })
    }

    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(|e| ConfigError::Parse {
            path: "<inline>".to_string(),
            message: e.to_string(),
        })
    }
}

/// Environment variable names for configuration
pub mod env_vars {
    // File Processor
    pub const REQUIRE_JACK_EXTENSION: &str = "JACK_REQUIRE_JACK_EXTENSION";
    pub const ENABLE_PERFORMANCE_LOGGING: &str = "JACK_ENABLE_PERFORMANCE_LOGGING";

    // Lexical
    pub const LEXICAL_DETAILED_METRICS: &str = "JACK_LEXICAL_DETAILED_METRICS";
    pub const LEXICAL_INCLUDE_POSITIONS: &str = "JACK_LEXICAL_INCLUDE_POSITIONS";

    // Output
    pub const OUTPUT_TOKEN_XML: &str = "JACK_OUTPUT_TOKEN_XML";
    pub const OUTPUT_JSON_TREE: &str = "JACK_OUTPUT_JSON_TREE";
    pub const OUTPUT_DIR: &str = "JACK_OUTPUT_DIR";

    // Logging
    pub const LOGGING_USE_STRUCTURED: &str = "JACK_LOGGING_USE_STRUCTURED";
    pub const LOGGING_ENABLE_CONSOLE: &str = "JACK_LOGGING_ENABLE_CONSOLE";
    pub const LOGGING_MIN_LEVEL: &str = "JACK_LOGGING_MIN_LEVEL";
    pub const LOGGING_LOG_PERFORMANCE: &str = "JACK_LOGGING_LOG_PERFORMANCE";
    pub const LOGGING_CARGO_STYLE: &str = "JACK_LOGGING_CARGO_STYLE";
    pub const LOGGING_INCLUDE_FILE_CONTEXT: &str = "JACK_LOGGING_INCLUDE_FILE_CONTEXT";
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use std::io::Write;

    #[test]
    fn test_toml_overrides_only_named_fields() {
        let config = RuntimeConfig::from_toml_str(
            r#"
            [output]
            write_token_xml = true
            output_dir = "build"

            [logging]
            min_log_level = "Debug"
            "#,
        )
        .unwrap();

        assert!(config.output.write_token_xml);
        assert_eq!(config.output.output_dir, Some(PathBuf::from("build")));
        assert_eq!(config.logging.min_log_level, LogLevel::Debug);
    }

    #[test]
    fn test_empty_toml_is_default() {
        let config = RuntimeConfig::from_toml_str("").unwrap();
        let defaults = RuntimeConfig::default();
        assert_eq!(
            config.file_processor.require_jack_extension,
            defaults.file_processor.require_jack_extension
        );
    }

    #[test]
    fn test_invalid_toml_reports_path() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[output]\nwrite_token_xml = \"maybe\"").unwrap();

        let result = RuntimeConfig::from_toml_file(file.path());
        assert_matches!(result, Err(ConfigError::Parse { ref path, .. }) if path.contains(
            file.path().file_name().unwrap().to_str().unwrap()
        ));
    }

    #[test]
    fn test_missing_file() {
        let result = RuntimeConfig::from_toml_file(Path::new("/nonexistent/jack.toml"));
        assert_matches!(result, Err(ConfigError::Read { .. }));
    }

    #[test]
    fn test_env_var_names_are_prefixed() {
        for name in [
            env_vars::REQUIRE_JACK_EXTENSION,
            env_vars::OUTPUT_TOKEN_XML,
            env_vars::LOGGING_MIN_LEVEL,
        ] {
            assert!(name.starts_with("JACK_"));
        }
    }
}
