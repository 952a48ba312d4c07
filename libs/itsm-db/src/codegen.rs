//! Sequential business codes of the form `PREFIX-YYYY-NNNN`, e.g. `TKT-2025-0042`.
//!
//! The next code is `max(existing suffix) + 1` within a prefix/year series.
//! Soft-deleted rows still count so a code is never handed out twice. Two
//! concurrent writers can compute the same candidate; the UNIQUE index on
//! the code column rejects the loser, which [`insert_with_code`] retries with
//! a freshly computed code.

use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, Utc};
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ConnectionTrait, EntityTrait, IntoActiveModel, QueryFilter, QuerySelect,
};
use thiserror::Error;
use tracing::{debug, instrument, warn};

use crate::error::{DbResultExt, RepoError};

/// Minimum width of the numeric suffix. Longer suffixes are kept as is.
pub const SEQ_WIDTH: usize = 4;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CodeParseError {
    #[error("expected PREFIX-YYYY-NNNN, got '{0}'")]
    Shape(String),
    #[error("prefix must be 2-8 uppercase ASCII letters or digits, got '{0}'")]
    Prefix(String),
    #[error("year must be four digits, got '{0}'")]
    Year(String),
    #[error("sequence must be decimal digits, got '{0}'")]
    Sequence(String),
}

fn validate_prefix(prefix: &str) -> Result<(), CodeParseError> {
    let ok = (2..=8).contains(&prefix.len())
        && prefix
            .bytes()
            .all(|b| b.is_ascii_uppercase() || b.is_ascii_digit());
    if ok {
        Ok(())
    } else {
        Err(CodeParseError::Prefix(prefix.to_owned()))
    }
}

fn validate_year(year: i32) -> Result<(), CodeParseError> {
    if (1000..=9999).contains(&year) {
        Ok(())
    } else {
        Err(CodeParseError::Year(year.to_string()))
    }
}

/// A prefix + year pair that codes are allocated in.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CodeSeries {
    prefix: String,
    year: i32,
}

impl CodeSeries {
    /// # Errors
    /// `MalformedInput` for a prefix outside `[A-Z0-9]{2,8}` or a year that
    /// is not four digits.
    pub fn new(prefix: &str, year: i32) -> Result<Self, RepoError> {
        validate_prefix(prefix).map_err(|e| RepoError::malformed("code prefix", e.to_string()))?;
        validate_year(year).map_err(|e| RepoError::malformed("code year", e.to_string()))?;
        Ok(Self {
            prefix: prefix.to_owned(),
            year,
        })
    }

    /// Series for the current UTC year.
    ///
    /// # Errors
    /// Same as [`CodeSeries::new`].
    pub fn current(prefix: &str) -> Result<Self, RepoError> {
        Self::new(prefix, Utc::now().year())
    }

    #[must_use]
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    #[must_use]
    pub fn year(&self) -> i32 {
        self.year
    }

    /// `LIKE` pattern matching every code of this series. Prefixes are
    /// `[A-Z0-9]` only, so no wildcard escaping is needed.
    #[must_use]
    pub fn like_pattern(&self) -> String {
        format!("{}-{}-%", self.prefix, self.year)
    }

    #[must_use]
    pub fn code(&self, seq: u32) -> EntityCode {
        EntityCode {
            prefix: self.prefix.clone(),
            year: self.year,
            seq,
        }
    }

    /// Highest suffix among `codes` that belong to this series.
    /// Codes of other series and malformed codes are ignored.
    #[must_use]
    pub fn max_seq<'a>(&self, codes: impl IntoIterator<Item = &'a str>) -> u32 {
        codes
            .into_iter()
            .filter_map(|c| c.parse::<EntityCode>().ok())
            .filter(|c| c.prefix == self.prefix && c.year == self.year)
            .map(|c| c.seq)
            .max()
            .unwrap_or(0)
    }
}

impl fmt::Display for CodeSeries {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.prefix, self.year)
    }
}

/// A parsed business code.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EntityCode {
    prefix: String,
    year: i32,
    seq: u32,
}

impl EntityCode {
    #[must_use]
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    #[must_use]
    pub fn year(&self) -> i32 {
        self.year
    }

    #[must_use]
    pub fn seq(&self) -> u32 {
        self.seq
    }
}

impl fmt::Display for EntityCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}-{}-{:0width$}",
            self.prefix,
            self.year,
            self.seq,
            width = SEQ_WIDTH
        )
    }
}

impl FromStr for EntityCode {
    type Err = CodeParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut parts = s.split('-');
        let (Some(prefix), Some(year), Some(seq), None) =
            (parts.next(), parts.next(), parts.next(), parts.next())
        else {
            return Err(CodeParseError::Shape(s.to_owned()));
        };

        validate_prefix(prefix)?;
        if year.len() != 4 || !year.bytes().all(|b| b.is_ascii_digit()) {
            return Err(CodeParseError::Year(year.to_owned()));
        }
        let year: i32 = year
            .parse()
            .map_err(|_| CodeParseError::Year(year.to_owned()))?;
        validate_year(year)?;
        if seq.is_empty() || !seq.bytes().all(|b| b.is_ascii_digit()) {
            return Err(CodeParseError::Sequence(seq.to_owned()));
        }
        let seq: u32 = seq
            .parse()
            .map_err(|_| CodeParseError::Sequence(seq.to_owned()))?;

        Ok(Self {
            prefix: prefix.to_owned(),
            year,
            seq,
        })
    }
}

/// Entities that carry a generated code in a UNIQUE column.
pub trait CodedEntity: EntityTrait {
    fn code_col() -> Self::Column;
}

/// Compute the next free code of `series` for `E`.
///
/// Reads every code of the series, deleted rows included, and returns
/// `max + 1` (`-0001` for an empty series). Not reserved: callers must
/// insert under a UNIQUE constraint, see [`insert_with_code`].
///
/// # Errors
/// Driver failures are classified through [`RepoError::from_db`];
/// an exhausted series is `MalformedInput`.
#[instrument(level = "debug", skip(conn, series), fields(series = %series))]
pub async fn next_code<E, C>(conn: &C, series: &CodeSeries) -> Result<EntityCode, RepoError>
where
    E: CodedEntity,
    C: ConnectionTrait,
{
    let col = E::code_col();
    let codes: Vec<String> = E::find()
        .select_only()
        .column(col)
        .filter(Expr::col((E::default(), col)).like(series.like_pattern()))
        .into_tuple()
        .all(conn)
        .await
        .op("next_code")?;

    let max = series.max_seq(codes.iter().map(String::as_str));
    let next = max
        .checked_add(1)
        .ok_or_else(|| RepoError::malformed("code", format!("series {series} is exhausted")))?;
    debug!(existing = codes.len(), next, "computed next code");
    Ok(series.code(next))
}

/// Insert a row built around a freshly generated code, retrying on a
/// uniqueness conflict.
///
/// `max_attempts` counts the first try (values below 1 are treated as 1).
/// When every attempt collides the last `ConstraintViolation` is returned.
///
/// # Errors
/// `ConstraintViolation` after exhausting attempts, or whatever the insert
/// or code lookup failed with.
pub async fn insert_with_code<E, C, F>(
    conn: &C,
    series: &CodeSeries,
    max_attempts: u32,
    build: F,
) -> Result<E::Model, RepoError>
where
    E: CodedEntity,
    C: ConnectionTrait,
    F: Fn(&EntityCode) -> E::ActiveModel,
    E::ActiveModel: ActiveModelTrait<Entity = E> + Send,
    E::Model: IntoActiveModel<E::ActiveModel>,
{
    let attempts = max_attempts.max(1);
    let mut attempt = 1;
    loop {
        let code = next_code::<E, C>(conn, series).await?;
        match build(&code).insert(conn).await {
            Ok(model) => return Ok(model),
            Err(err) => {
                let err = RepoError::from_db("insert_with_code", err);
                if !err.is_unique_violation() || attempt >= attempts {
                    return Err(err);
                }
                warn!(%code, attempt, "generated code already taken; retrying");
                attempt += 1;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_with_zero_padding() {
        let series = CodeSeries::new("TKT", 2025).unwrap();
        assert_eq!(series.code(42).to_string(), "TKT-2025-0042");
        assert_eq!(series.code(12345).to_string(), "TKT-2025-12345");
        assert_eq!(series.like_pattern(), "TKT-2025-%");
    }

    #[test]
    fn parses_codes() {
        let code: EntityCode = "PRJ-2024-0007".parse().unwrap();
        assert_eq!((code.prefix(), code.year(), code.seq()), ("PRJ", 2024, 7));
        let long: EntityCode = "AST-2024-10001".parse().unwrap();
        assert_eq!(long.seq(), 10001);
    }

    #[test]
    fn rejects_malformed_codes() {
        for bad in [
            "TKT-2025",
            "TKT-2025-",
            "TKT-2025-00a1",
            "TKT-25-0001",
            "tkt-2025-0001",
            "TKT-2025-0001-X",
            "T-2025-0001",
            "TKT-2025-99999999999",
        ] {
            assert!(bad.parse::<EntityCode>().is_err(), "{bad} should not parse");
        }
    }

    #[test]
    fn max_seq_skips_foreign_and_malformed_codes() {
        let series = CodeSeries::new("TKT", 2025).unwrap();
        let codes = [
            "TKT-2025-0001",
            "TKT-2025-0003",
            "TKT-2025-garbage",
            "TKT-2024-0099",
            "AST-2025-0050",
        ];
        assert_eq!(series.max_seq(codes), 3);
        assert_eq!(series.max_seq([]), 0);
    }

    #[test]
    fn series_validation() {
        assert!(CodeSeries::new("TAP", 2025).is_ok());
        assert!(CodeSeries::new("tkt", 2025).is_err());
        assert!(CodeSeries::new("TOOLONGPREFIX", 2025).is_err());
        assert!(CodeSeries::new("TKT", 99).is_err());
        assert!(matches!(
            CodeSeries::new("T-K", 2025),
            Err(RepoError::MalformedInput { .. })
        ));
    }
}
