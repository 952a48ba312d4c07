//! Persistence primitives for the ITSM repositories.
//!
//! - [`secure`]: scoped query composition on top of `SeaORM`
//! - [`paging`]: page normalisation and the [`Page`] envelope
//! - [`codegen`]: sequential `PREFIX-YYYY-NNNN` business codes
//! - [`error`]: the [`RepoError`] taxonomy every repository returns
//! - [`config`]: figment-backed [`DbConfig`]
//!
//! # Features
//! - `sqlite` (default), `pg`: enable the matching sqlx driver

pub mod codegen;
pub mod config;
pub mod error;
pub mod humantime_serde;
pub mod paging;
pub mod secure;

pub use codegen::{CodeSeries, CodedEntity, EntityCode, insert_with_code, next_code};
pub use config::{CodegenConfig, DbConfig, PagingConfig};
pub use error::{ConstraintKind, DbResultExt, RepoError};
pub use paging::{Page, PageRequest, Window};
pub use secure::SecureConn;

use sea_orm::{ConnectOptions, ConnectionTrait, Database, DbErr};
use tracing::info;

/// Errors raised while configuring or opening the database.
#[derive(Debug, thiserror::Error)]
pub enum DbError {
    #[error("invalid database configuration: {0}")]
    Config(#[source] Box<figment::Error>),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("failed to connect to {dsn}")]
    Connect {
        dsn: String,
        #[source]
        source: DbErr,
    },

    #[error(transparent)]
    Sea(#[from] DbErr),
}

/// Open a pooled connection described by `cfg`.
///
/// # Errors
/// `InvalidConfig` for inconsistent pool bounds, `Connect` when the driver
/// cannot reach the database.
pub async fn connect(cfg: &DbConfig) -> Result<SecureConn, DbError> {
    if let (Some(min), Some(max)) = (cfg.min_conns, cfg.max_conns)
        && min > max
    {
        return Err(DbError::InvalidConfig(format!(
            "min_conns ({min}) is greater than max_conns ({max})"
        )));
    }

    let mut opts = ConnectOptions::new(cfg.dsn.clone());
    if let Some(max) = cfg.max_conns {
        opts.max_connections(max);
    }
    if let Some(min) = cfg.min_conns {
        opts.min_connections(min);
    }
    opts.acquire_timeout(cfg.acquire_timeout)
        .sqlx_logging(cfg.sqlx_logging);

    let dsn = redact_dsn(&cfg.dsn);
    let conn = Database::connect(opts)
        .await
        .map_err(|source| DbError::Connect {
            dsn: dsn.clone(),
            source,
        })?;
    info!(%dsn, backend = ?conn.get_database_backend(), "database connected");
    Ok(SecureConn::new(conn))
}

/// Mask the password component of a DSN for logs and errors.
#[must_use]
pub fn redact_dsn(dsn: &str) -> String {
    match url::Url::parse(dsn) {
        Ok(mut url) if url.password().is_some() => {
            if url.set_password(Some("***")).is_ok() {
                url.to_string()
            } else {
                dsn.to_owned()
            }
        }
        _ => dsn.to_owned(),
    }
}
