//! # Config - environment-driven settings for the reftable shell
//!
//! ```text
//! REFTABLE_HASH_SIZE      object id length in bytes: 20 (SHA-1) or 32 (SHA-256)  (default: 20)
//! REFTABLE_INDEX_OBJECTS  build an oid -> ref index in new tables                  (default: true)
//! REFTABLE_LOG            log level: error, warn, info, debug, trace                (default: info)
//! ```
//!
//! Values that fail to parse fall back to their defaults.

use tracing::Level;

pub const HASH_SIZE_VAR: &str = "REFTABLE_HASH_SIZE";
pub const INDEX_OBJECTS_VAR: &str = "REFTABLE_INDEX_OBJECTS";
pub const LOG_VAR: &str = "REFTABLE_LOG";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Config {
    pub hash_size: usize,
    pub index_objects: bool,
    pub log_level: Level,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            hash_size: 20,
            index_objects: true,
            log_level: Level::INFO,
        }
    }
}

impl Config {
    /// Reads the configuration from the process environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Reads the configuration through `lookup`, which maps a variable name to
    /// its value if set.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        let env_or = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());

        let hash_size = match env_or(HASH_SIZE_VAR, "20").trim().parse() {
            Ok(n @ (20 | 32)) => n,
            _ => defaults.hash_size,
        };
        let index_objects = env_or(INDEX_OBJECTS_VAR, "true")
            .trim()
            .parse()
            .unwrap_or(defaults.index_objects);
        let log_level = env_or(LOG_VAR, "info")
            .trim()
            .parse()
            .unwrap_or(defaults.log_level);

        Self {
            hash_size,
            index_objects,
            log_level,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn from_pairs(pairs: &[(&str, &str)]) -> Config {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|&(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|k| vars.get(k).cloned())
    }

    #[test]
    fn defaults_when_unset() {
        assert_eq!(from_pairs(&[]), Config::default());
    }

    #[test]
    fn reads_all_variables() {
        let cfg = from_pairs(&[
            (HASH_SIZE_VAR, "32"),
            (INDEX_OBJECTS_VAR, "false"),
            (LOG_VAR, "debug"),
        ]);
        assert_eq!(cfg.hash_size, 32);
        assert!(!cfg.index_objects);
        assert_eq!(cfg.log_level, Level::DEBUG);
    }

    #[test]
    fn unparseable_values_fall_back() {
        let cfg = from_pairs(&[
            (HASH_SIZE_VAR, "abc"),
            (INDEX_OBJECTS_VAR, "maybe"),
            (LOG_VAR, "loud"),
        ]);
        assert_eq!(cfg, Config::default());
    }

    #[test]
    fn unsupported_hash_size_falls_back() {
        assert_eq!(from_pairs(&[(HASH_SIZE_VAR, "16")]).hash_size, 20);
        assert_eq!(from_pairs(&[(HASH_SIZE_VAR, " 32 ")]).hash_size, 32);
    }
}
