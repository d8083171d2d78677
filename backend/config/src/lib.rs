//! `smartparse-config`: SmartParse runtime configuration.
//!
//! Provides:
//! - Typed config schema (pipeline stages, export, logging)
//! - YAML read/write with atomic replace
//! - Environment overrides for operational knobs
//! - Default value application
//! - Schema validation

pub mod defaults;
pub mod env;
pub mod io;
pub mod schema;
pub mod validation;

// Re-export most-used types at crate root.
pub use defaults::{apply_all_defaults, default_stages};
pub use env::{apply_env_overrides, apply_env_overrides_with};
pub use io::{config_dir, config_file_path, load_config, write_config};
pub use schema::{ExportConfig, LoggingConfig, PipelineConfig, SmartParseConfig};
pub use validation::{validate, ConfigValidationError, ValidationReport};

use anyhow::{bail, Result};
use std::path::Path;

/// Load, apply env overrides and defaults, then validate a config file.
///
/// This is the main entry point for loading a config at runtime.
pub async fn load_and_prepare(path: &Path) -> Result<SmartParseConfig> {
    let config = load_config(path).await?;
    let config = apply_env_overrides(config);
    let config = apply_all_defaults(config);

    let report = validate(&config);
    for warning in &report.warnings {
        tracing::warn!(path = %warning.path, message = %warning.message, "Config warning");
    }
    for error in &report.errors {
        tracing::error!(path = %error.path, message = %error.message, "Config error");
    }
    if let Some(first) = report.errors.first() {
        bail!("{} ({} error(s) total)", first, report.errors.len());
    }

    Ok(config)
}
