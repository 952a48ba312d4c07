//! Database, paging and code-generation configuration.
//!
//! Loaded with `figment`: built-in defaults, then an optional YAML file with a
//! top-level `database:` section, then `ITSM_DATABASE__*` environment
//! variables (e.g. `ITSM_DATABASE__DSN`, `ITSM_DATABASE__PAGING__MAX_PAGE_SIZE`).

use std::path::Path;
use std::time::Duration;

use figment::Figment;
use figment::providers::{Env, Format, Serialized, Yaml};
use serde::{Deserialize, Serialize};

use crate::DbError;

/// Section name used in configuration files and environment variables.
pub const CONFIG_SECTION: &str = "database";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct DbConfig {
    /// Connection string, e.g. `sqlite://itsm.db?mode=rwc` or `postgres://...`.
    pub dsn: String,
    pub max_conns: Option<u32>,
    pub min_conns: Option<u32>,
    #[serde(with = "crate::humantime_serde")]
    pub acquire_timeout: Duration,
    /// Forward sqlx statement logging to `tracing`.
    pub sqlx_logging: bool,
    pub paging: PagingConfig,
    pub codegen: CodegenConfig,
}

impl Default for DbConfig {
    fn default() -> Self {
        Self {
            dsn: "sqlite::memory:".to_owned(),
            max_conns: None,
            min_conns: None,
            acquire_timeout: Duration::from_secs(5),
            sqlx_logging: false,
            paging: PagingConfig::default(),
            codegen: CodegenConfig::default(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct PagingConfig {
    /// Used when a caller passes `page_size <= 0`.
    pub default_page_size: u64,
    /// Larger page sizes are rejected as malformed input.
    pub max_page_size: u64,
}

impl Default for PagingConfig {
    fn default() -> Self {
        Self {
            default_page_size: 50,
            max_page_size: 1000,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct CodegenConfig {
    /// Total INSERT attempts per generated code, the first one included.
    pub max_attempts: u32,
}

impl Default for CodegenConfig {
    fn default() -> Self {
        Self { max_attempts: 2 }
    }
}

impl PagingConfig {
    /// The default size must be a usable page: positive and within the maximum.
    ///
    /// # Errors
    /// `DbError::InvalidConfig` naming the offending bound.
    pub fn validate(&self) -> Result<(), DbError> {
        if self.default_page_size == 0 {
            return Err(DbError::InvalidConfig(
                "paging.default_page_size must be positive".to_owned(),
            ));
        }
        if self.default_page_size > self.max_page_size {
            return Err(DbError::InvalidConfig(format!(
                "paging.default_page_size ({}) exceeds paging.max_page_size ({})",
                self.default_page_size, self.max_page_size
            )));
        }
        Ok(())
    }
}

impl DbConfig {
    /// Extract the `database` section from an already assembled figment.
    ///
    /// # Errors
    /// Returns `DbError::Config` when the section does not match the schema,
    /// `DbError::InvalidConfig` for inconsistent paging bounds.
    pub fn from_figment(figment: &Figment) -> Result<Self, DbError> {
        let cfg: Self = figment
            .extract_inner(CONFIG_SECTION)
            .map_err(|e| DbError::Config(Box::new(e)))?;
        cfg.paging.validate()?;
        Ok(cfg)
    }

    /// Defaults, then the optional YAML file, then `ITSM_` environment overrides.
    ///
    /// # Errors
    /// Returns `DbError::Config` on unreadable files or invalid values,
    /// `DbError::InvalidConfig` for inconsistent paging bounds.
    pub fn load(path: Option<&Path>) -> Result<Self, DbError> {
        let mut figment =
            Figment::new().merge(Serialized::defaults(Self::default()).key(CONFIG_SECTION));
        if let Some(path) = path {
            figment = figment.merge(Yaml::file(path));
        }
        figment = figment.merge(Env::prefixed("ITSM_").split("__"));
        Self::from_figment(&figment)
    }
}
