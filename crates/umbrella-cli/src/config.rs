//! CLI configuration via environment variables
//!
//! Umbrella reads optional defaults from the environment. Command-line
//! flags always take precedence over these values.

use std::env;
use std::path::PathBuf;

/// CLI configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    /// Default to JSON output (UMBRELLA_JSON=1)
    pub default_json: bool,
    /// Default output directory (UMBRELLA_OUT_DIR=/path/to/dir)
    pub out_dir: Option<PathBuf>,
    /// Default build profile (UMBRELLA_PROFILE=release)
    pub profile: Option<String>,
    /// Log filter directives (UMBRELLA_LOG=debug)
    pub log_filter: Option<String>,
    /// Disable colored output (UMBRELLA_NO_COLOR=1 or NO_COLOR=1)
    pub no_color: bool,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        Self {
            default_json: lookup("UMBRELLA_JSON").map(|v| is_truthy(&v)).unwrap_or(false),
            out_dir: non_empty("UMBRELLA_OUT_DIR").map(PathBuf::from),
            profile: non_empty("UMBRELLA_PROFILE"),
            log_filter: non_empty("UMBRELLA_LOG"),
            no_color: lookup("UMBRELLA_NO_COLOR").is_some() || lookup("NO_COLOR").is_some(),
        }
    }

    /// Log filter to use when `UMBRELLA_LOG` is unset
    pub fn default_log_level(verbose: bool) -> &'static str {
        if verbose {
            "info"
        } else {
            "warn"
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::from_env()
    }
}

fn is_truthy(value: &str) -> bool {
    let lower = value.trim().to_lowercase();
    !(lower.is_empty() || lower == "0" || lower == "false" || lower == "off")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config(vars: &[(&str, &str)]) -> Config {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_config_defaults() {
        let config = config(&[]);
        assert!(!config.default_json);
        assert!(config.out_dir.is_none());
        assert!(config.profile.is_none());
        assert!(config.log_filter.is_none());
        assert!(!config.no_color);
    }

    #[test]
    fn test_config_json() {
        assert!(config(&[("UMBRELLA_JSON", "1")]).default_json);
        assert!(config(&[("UMBRELLA_JSON", "true")]).default_json);
        assert!(!config(&[("UMBRELLA_JSON", "0")]).default_json);
        assert!(!config(&[("UMBRELLA_JSON", "off")]).default_json);
    }

    #[test]
    fn test_config_out_dir_and_profile() {
        let config = config(&[
            ("UMBRELLA_OUT_DIR", "/tmp/umbrella-out"),
            ("UMBRELLA_PROFILE", "release"),
        ]);
        assert_eq!(config.out_dir, Some(PathBuf::from("/tmp/umbrella-out")));
        assert_eq!(config.profile.as_deref(), Some("release"));
    }

    #[test]
    fn test_config_blank_values_ignored() {
        let config = config(&[("UMBRELLA_OUT_DIR", ""), ("UMBRELLA_LOG", "  ")]);
        assert!(config.out_dir.is_none());
        assert!(config.log_filter.is_none());
    }

    #[test]
    fn test_config_no_color() {
        assert!(config(&[("UMBRELLA_NO_COLOR", "1")]).no_color);
        // Also the NO_COLOR convention
        assert!(config(&[("NO_COLOR", "")]).no_color);
    }

    #[test]
    fn test_default_log_level() {
        assert_eq!(Config::default_log_level(false), "warn");
        assert_eq!(Config::default_log_level(true), "info");
    }
}
