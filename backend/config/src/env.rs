//! Environment overrides for config values.
//!
//! Only a handful of operational knobs can be overridden; everything else
//! lives in the YAML file.

use std::collections::HashMap;
use std::path::PathBuf;

use crate::schema::{ExportConfig, LoggingConfig, SmartParseConfig};

pub const ENV_LOG_LEVEL: &str = "SMARTPARSE_LOG_LEVEL";
pub const ENV_LOG_DIR: &str = "SMARTPARSE_LOG_DIR";
pub const ENV_EXPORT_DIR: &str = "SMARTPARSE_EXPORT_DIR";

/// Apply overrides from the process environment.
pub fn apply_env_overrides(config: SmartParseConfig) -> SmartParseConfig {
    apply_env_overrides_with(config, &std::env::vars().collect())
}

/// Apply overrides from a provided map (useful for testing).
pub fn apply_env_overrides_with(
    mut config: SmartParseConfig,
    env: &HashMap<String, String>,
) -> SmartParseConfig {
    let non_empty = |key: &str| env.get(key).filter(|v| !v.trim().is_empty()).cloned();

    if let Some(level) = non_empty(ENV_LOG_LEVEL) {
        config.logging.get_or_insert_with(LoggingConfig::default).level = Some(level);
    }
    if let Some(dir) = non_empty(ENV_LOG_DIR) {
        config.logging.get_or_insert_with(LoggingConfig::default).dir = Some(PathBuf::from(dir));
    }
    if let Some(dir) = non_empty(ENV_EXPORT_DIR) {
        config.export.get_or_insert_with(ExportConfig::default).output_dir =
            Some(PathBuf::from(dir));
    }
    config
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn overrides_level_and_dirs() {
        let env: HashMap<String, String> = [
            (ENV_LOG_LEVEL.to_string(), "warn".to_string()),
            (ENV_EXPORT_DIR.to_string(), "/tmp/exports".to_string()),
        ]
        .into_iter()
        .collect();
        let cfg = apply_env_overrides_with(SmartParseConfig::default(), &env);
        assert_eq!(cfg.log_level(), "warn");
        assert_eq!(cfg.export_output_dir(), Some(PathBuf::from("/tmp/exports")));
        assert!(cfg.log_dir().is_none());
    }

    #[test]
    fn blank_values_are_ignored() {
        let env: HashMap<String, String> =
            [(ENV_LOG_LEVEL.to_string(), "  ".to_string())].into_iter().collect();
        let cfg = apply_env_overrides_with(SmartParseConfig::default(), &env);
        assert_eq!(cfg, SmartParseConfig::default());
    }
}
