//! Process configuration resolved from environment variables.
//!
//! | Variable              | Default                               |
//! |-----------------------|---------------------------------------|
//! | `CUSTOMERS_DB_PATH`   | `<temp dir>/customers.sqlite3`        |
//! | `CUSTOMERS_LOG_LEVEL` | [`default_log_level`]                 |
//! | `CUSTOMERS_LOG_DIR`   | unset: file logging stays disabled    |
//!
//! Blank values count as unset.

use crate::logging::default_log_level;
use std::path::PathBuf;

pub const DB_PATH_VAR: &str = "CUSTOMERS_DB_PATH";
pub const LOG_LEVEL_VAR: &str = "CUSTOMERS_LOG_LEVEL";
pub const LOG_DIR_VAR: &str = "CUSTOMERS_LOG_DIR";

const DEFAULT_DB_FILE_NAME: &str = "customers.sqlite3";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoreConfig {
    pub db_path: PathBuf,
    pub log_level: String,
    pub log_dir: Option<PathBuf>,
}

impl CoreConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Resolves configuration through an arbitrary key lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let value = |key: &str| {
            lookup(key)
                .map(|raw| raw.trim().to_string())
                .filter(|trimmed| !trimmed.is_empty())
        };

        Self {
            db_path: value(DB_PATH_VAR)
                .map(PathBuf::from)
                .unwrap_or_else(|| std::env::temp_dir().join(DEFAULT_DB_FILE_NAME)),
            log_level: value(LOG_LEVEL_VAR).unwrap_or_else(|| default_log_level().to_string()),
            log_dir: value(LOG_DIR_VAR).map(PathBuf::from),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{CoreConfig, DB_PATH_VAR, LOG_DIR_VAR, LOG_LEVEL_VAR};
    use crate::logging::default_log_level;
    use std::collections::HashMap;
    use std::path::PathBuf;

    fn config_from(pairs: &[(&str, &str)]) -> CoreConfig {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(key, value)| (key.to_string(), value.to_string()))
            .collect();
        CoreConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults_apply_when_unset() {
        let config = config_from(&[]);
        assert_eq!(
            config.db_path,
            std::env::temp_dir().join("customers.sqlite3")
        );
        assert_eq!(config.log_level, default_log_level());
        assert_eq!(config.log_dir, None);
    }

    #[test]
    fn explicit_values_are_trimmed() {
        let config = config_from(&[
            (DB_PATH_VAR, " /var/lib/customers.db "),
            (LOG_LEVEL_VAR, "warn"),
            (LOG_DIR_VAR, "/var/log/customers"),
        ]);
        assert_eq!(config.db_path, PathBuf::from("/var/lib/customers.db"));
        assert_eq!(config.log_level, "warn");
        assert_eq!(config.log_dir, Some(PathBuf::from("/var/log/customers")));
    }

    #[test]
    fn blank_values_count_as_unset() {
        let config = config_from(&[(LOG_DIR_VAR, "   "), (LOG_LEVEL_VAR, "")]);
        assert_eq!(config.log_dir, None);
        assert_eq!(config.log_level, default_log_level());
    }
}
