//! Configuration module for the Jack compiler
//! Compile-time limits are generated from TOML by build.rs; runtime preferences live in `runtime`

// Include generated constants from build.rs
include!(concat!(env!("OUT_DIR"), "/constants.rs"));

pub mod runtime;

pub use runtime::{ConfigError, RuntimeConfig};

/// Build information and configuration metadata
pub mod build_info {
    /// Returns the configuration profile used during build
    pub fn profile() -> &'static str {
        option_env!("JACK_BUILD_PROFILE").unwrap_or("development")
    }

    /// Returns the configuration directory used during build
    pub fn config_dir() -> &'static str {
        option_env!("JACK_CONFIG_DIR").unwrap_or("config")
    }

    pub fn source_info() -> String {
        format!("Generated from {}/{}.toml", config_dir(), profile())
    }
}

#[cfg(test)]
mod tests {
    use super::compile_time;

    #[test]
    fn test_generated_limits_are_consistent() {
        assert_eq!(compile_time::lexical::MAX_INTEGER_CONSTANT, 32767);
        assert!(compile_time::syntax::MAX_PARSE_DEPTH > 0);
        assert!(
            compile_time::logging::MAX_LOG_EVENTS_PER_FILE
                <= compile_time::logging::LOG_BUFFER_SIZE
        );
        assert!(compile_time::file_processing::LARGE_FILE_THRESHOLD
            <= compile_time::file_processing::MAX_FILE_SIZE);
    }

    #[test]
    fn test_source_info_names_profile() {
        assert!(super::build_info::source_info().ends_with(".toml"));
    }
}
