//! Donation configuration loading.
//!
//! Configuration comes from an optional YAML file, then environment
//! overrides, then validation. Missing keys fall back to
//! [`DonationConfig::default`].

use log::{debug, info};
use shared::DonationConfig;
use std::fs;
use std::path::{Path, PathBuf};

/// Path to a YAML config file
pub const CONFIG_PATH_ENV: &str = "DONATIONS_CONFIG";
pub const MONTHLY_GOAL_ENV: &str = "DONATIONS_MONTHLY_GOAL";
pub const RECENT_LIMIT_ENV: &str = "DONATIONS_RECENT_LIMIT";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to parse config: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("Invalid value {value:?} for {var}")]
    InvalidOverride { var: &'static str, value: String },
    #[error("Invalid config: {0}")]
    Invalid(String),
}

/// Parse a YAML document into a config
pub fn from_yaml_str(yaml: &str) -> Result<DonationConfig, ConfigError> {
    if yaml.trim().is_empty() {
        return Ok(DonationConfig::default());
    }
    Ok(serde_yaml::from_str(yaml)?)
}

/// Read and parse a YAML config file
pub fn from_file(path: &Path) -> Result<DonationConfig, ConfigError> {
    let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    debug!("Loaded donation config from {}", path.display());
    from_yaml_str(&content)
}

/// Apply overrides using `lookup` to read variables
pub fn apply_overrides(
    mut config: DonationConfig,
    lookup: impl Fn(&str) -> Option<String>,
) -> Result<DonationConfig, ConfigError> {
    if let Some(value) = lookup(MONTHLY_GOAL_ENV) {
        config.monthly_goal = value.trim().parse().map_err(|_| ConfigError::InvalidOverride {
            var: MONTHLY_GOAL_ENV,
            value: value.clone(),
        })?;
    }
    if let Some(value) = lookup(RECENT_LIMIT_ENV) {
        config.recent_limit = value.trim().parse().map_err(|_| ConfigError::InvalidOverride {
            var: RECENT_LIMIT_ENV,
            value: value.clone(),
        })?;
    }
    Ok(config)
}

/// Largest configurable per-donation maximum, in major units. Keeps cent
/// totals far from `i64` overflow.
pub const MAX_DONATION_LIMIT: f64 = 1_000_000.0;

/// Check the limits make sense together
pub fn validate(config: &DonationConfig) -> Result<(), ConfigError> {
    let limits = [
        ("min_amount", config.min_amount),
        ("max_amount", config.max_amount),
        ("monthly_goal", config.monthly_goal),
    ];
    for (name, value) in limits {
        if !value.is_finite() {
            return Err(ConfigError::Invalid(format!("{} must be a finite number", name)));
        }
    }
    if config.min_amount < 0.01 {
        return Err(ConfigError::Invalid("min_amount must be at least 0.01".to_string()));
    }
    if config.max_amount < config.min_amount {
        return Err(ConfigError::Invalid("max_amount must not be below min_amount".to_string()));
    }
    if config.max_amount > MAX_DONATION_LIMIT {
        return Err(ConfigError::Invalid(format!(
            "max_amount must not exceed {:.2}",
            MAX_DONATION_LIMIT
        )));
    }
    if config.monthly_goal <= 0.0 {
        return Err(ConfigError::Invalid("monthly_goal must be positive".to_string()));
    }
    if config.currency_symbol.trim().is_empty() {
        return Err(ConfigError::Invalid("currency_symbol must not be empty".to_string()));
    }
    Ok(())
}

/// Load config from `path` (or defaults), apply process environment
/// overrides and validate
pub fn load(path: Option<&Path>) -> Result<DonationConfig, ConfigError> {
    let config = match path {
        Some(path) => from_file(path)?,
        None => DonationConfig::default(),
    };
    let config = apply_overrides(config, |var| std::env::var(var).ok())?;
    validate(&config)?;
    info!(
        "Donation config: minimum {}{:.2}, monthly goal {}{:.2}",
        config.currency_symbol, config.min_amount, config.currency_symbol, config.monthly_goal
    );
    Ok(config)
}
