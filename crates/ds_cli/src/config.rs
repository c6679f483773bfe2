//! Engine options from a TOML file.
//!
//! Keys mirror [`EngineOptions`]; missing keys keep their defaults:
//!
//! ```toml
//! parallel = true
//! strict = false
//! default_lower = 1e-12
//! default_upper = 1e12
//! ```

use std::fs;
use std::path::Path;

use ds_engine::EngineOptions;

/// File read when `--config` is not given.
pub const DEFAULT_CONFIG: &str = "dspace.toml";

/// Load options from `path`, or from [`DEFAULT_CONFIG`] when it exists.
///
/// Unreadable or malformed files are reported and the defaults are used.
pub fn load(path: Option<&Path>) -> EngineOptions {
    let path = match path {
        Some(p) => p,
        None => {
            let default = Path::new(DEFAULT_CONFIG);
            if !default.exists() {
                return EngineOptions::default();
            }
            default
        }
    };

    match fs::read_to_string(path) {
        Ok(content) => match parse(&content) {
            Ok(options) => {
                tracing::debug!(path = %path.display(), ?options, "config_loaded");
                options
            }
            Err(e) => {
                tracing::warn!(
                    "error parsing config file {}: {}. Using defaults.",
                    path.display(),
                    e
                );
                EngineOptions::default()
            }
        },
        Err(e) => {
            tracing::warn!(
                "error reading config file {}: {}. Using defaults.",
                path.display(),
                e
            );
            EngineOptions::default()
        }
    }
}

pub fn parse(content: &str) -> Result<EngineOptions, toml::de::Error> {
    toml::from_str(content)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_files_keep_defaults() {
        let options = parse("parallel = true\ndefault_upper = 1e6").unwrap();
        assert!(options.parallel);
        assert!(options.strict);
        assert_eq!(options.default_upper, 1e6);
    }

    #[test]
    fn malformed_files_are_errors() {
        assert!(parse("parallel = \"sometimes\"").is_err());
    }

    #[test]
    fn missing_file_falls_back_to_defaults() {
        let options = load(Some(Path::new("definitely/not/here.toml")));
        assert_eq!(options, EngineOptions::default());
    }
}
