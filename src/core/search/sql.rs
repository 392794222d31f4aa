//! SQL Compilation
//!
//! Compiles term vectors, queries and rank functions to PostgreSQL
//! full-text expressions. Values travel as positional parameters in
//! [`SqlParams`]; identifiers are validated and inlined.

use std::ops::Add;

use once_cell::sync::Lazy;
use regex::Regex;

use super::error::{Result, SearchError};
use super::profile::StemmingStrategy;
use super::query::{BuiltQuery, QueryExpression};
use super::resources::SearchResources;
use super::vector::Weight;

static IDENTIFIER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*(\.[A-Za-z_][A-Za-z0-9_]*)?$")
        .expect("Invalid identifier regex")
});

fn identifier(name: &str) -> Result<&str> {
    if IDENTIFIER.is_match(name) {
        Ok(name)
    } else {
        Err(SearchError::Config(format!("invalid SQL identifier '{name}'")))
    }
}

// ============================================================================
// Parameters
// ============================================================================

/// Positional parameters collected while compiling.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SqlParams {
    values: Vec<String>,
}

impl SqlParams {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a value and return its placeholder, `$1` for the first.
    pub fn push(&mut self, value: impl Into<String>) -> String {
        self.values.push(value.into());
        format!("${}", self.values.len())
    }

    pub fn values(&self) -> &[String] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn into_values(self) -> Vec<String> {
        self.values
    }
}

// ============================================================================
// Vectors
// ============================================================================

/// Where a vector comes from. Concatenation is the same `||` either way.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VectorExpr {
    /// A `tsvector` column.
    Stored(String),
    /// Computed from text columns at query time.
    OnTheFly {
        columns: Vec<String>,
        profile: String,
        weight: Option<Weight>,
    },
    Combined(Box<VectorExpr>, Box<VectorExpr>),
}

impl VectorExpr {
    pub fn stored(column: impl Into<String>) -> Self {
        Self::Stored(column.into())
    }

    pub fn on_the_fly<I, S>(columns: I, profile: impl Into<String>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::OnTheFly {
            columns: columns.into_iter().map(Into::into).collect(),
            profile: profile.into(),
            weight: None,
        }
    }

    /// Set the weight of an on-the-fly vector. Other variants are returned
    /// unchanged.
    pub fn weighted(self, weight: Weight) -> Self {
        match self {
            Self::OnTheFly {
                columns, profile, ..
            } => Self::OnTheFly {
                columns,
                profile,
                weight: Some(weight),
            },
            other => other,
        }
    }

    pub fn combine(self, other: VectorExpr) -> Self {
        Self::Combined(Box::new(self), Box::new(other))
    }

    pub fn compile(&self, params: &mut SqlParams) -> Result<String> {
        match self {
            Self::Stored(column) => Ok(identifier(column)?.to_string()),
            Self::OnTheFly {
                columns,
                profile,
                weight,
            } => {
                if columns.is_empty() {
                    return Err(SearchError::Config(
                        "on-the-fly vector needs at least one column".to_string(),
                    ));
                }
                let text = columns
                    .iter()
                    .map(|column| Ok(format!("COALESCE({}, '')", identifier(column)?)))
                    .collect::<Result<Vec<_>>>()?
                    .join(" || ' ' || ");
                let config = params.push(profile.as_str());
                let vector = format!("to_tsvector({config}::regconfig, {text})");
                Ok(match weight {
                    Some(weight) => format!("setweight({vector}, '{}')", weight.as_char()),
                    None => vector,
                })
            }
            Self::Combined(lhs, rhs) => {
                let lhs = lhs.compile(params)?;
                let rhs = rhs.compile(params)?;
                Ok(format!("({lhs} || {rhs})"))
            }
        }
    }
}

impl Add for VectorExpr {
    type Output = VectorExpr;

    fn add(self, rhs: VectorExpr) -> VectorExpr {
        self.combine(rhs)
    }
}

// ============================================================================
// Queries
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchQuery {
    pub profile: String,
    pub expression: QueryExpression,
}

impl SearchQuery {
    pub fn new(profile: impl Into<String>, expression: QueryExpression) -> Self {
        Self {
            profile: profile.into(),
            expression,
        }
    }

    /// An empty query matches nothing and should not be sent.
    pub fn is_empty(&self) -> bool {
        self.expression.is_empty()
    }

    pub fn compile(&self, params: &mut SqlParams) -> String {
        let config = params.push(self.profile.as_str());
        let query = params.push(self.expression.to_string());
        format!("to_tsquery({config}::regconfig, {query})")
    }
}

impl From<BuiltQuery> for SearchQuery {
    fn from(built: BuiltQuery) -> Self {
        Self::new(built.profile, built.expression)
    }
}

// ============================================================================
// Ranking
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RankFunction {
    /// Frequency rank, divided by 1 + log(unique words) and then by
    /// itself + 1.
    Rank,
    /// Cover density rank, divided by the mean harmonic distance between
    /// extents.
    RankCd,
}

impl RankFunction {
    pub fn function_name(self) -> &'static str {
        match self {
            Self::Rank => "ts_rank",
            Self::RankCd => "ts_rank_cd",
        }
    }

    pub fn normalization(self) -> &'static str {
        match self {
            Self::Rank => "16 | 32",
            Self::RankCd => "4",
        }
    }

    pub fn compile(
        self,
        vector: &VectorExpr,
        query: &SearchQuery,
        params: &mut SqlParams,
    ) -> Result<String> {
        let vector = vector.compile(params)?;
        let query = query.compile(params);
        Ok(format!(
            "{}({vector}, {query}, {})",
            self.function_name(),
            self.normalization()
        ))
    }
}

/// Ranked match over `table`, best first.
///
/// Returns `None` for an empty query.
pub fn ranked_search(
    table: &str,
    key: &str,
    vector: &VectorExpr,
    query: &SearchQuery,
    rank: RankFunction,
) -> Result<Option<(String, SqlParams)>> {
    if query.is_empty() {
        return Ok(None);
    }

    let table = identifier(table)?;
    let key = identifier(key)?;
    let mut params = SqlParams::new();
    let score = rank.compile(vector, query, &mut params)?;
    let matched = vector.compile(&mut params)?;
    let filter = query.compile(&mut params);

    let sql = format!(
        "SELECT {key}, {score} AS rank FROM {table} WHERE {matched} @@ {filter} ORDER BY rank DESC"
    );
    Ok(Some((sql, params)))
}

// ============================================================================
// Setup
// ============================================================================

const AGGREGATE_FUNCTION: &str = "CREATE OR REPLACE FUNCTION tsvector_add(tsvector, tsvector) \
     RETURNS tsvector AS 'SELECT COALESCE($1, '''') || COALESCE($2, '''');' LANGUAGE SQL";

const AGGREGATE: &str = "CREATE AGGREGATE tsvector_agg(tsvector) (sfunc = tsvector_add, stype = tsvector)";

/// Statements preparing a database for the search pipeline.
///
/// Every dictionary-stemmed profile gets a text search configuration that
/// copies `english` but maps words through the `simple` dictionary, since
/// its stems are computed before they reach the database. The
/// `tsvector_agg` aggregate folds many stored vectors with `||`.
pub fn setup_statements(resources: &SearchResources) -> Result<Vec<String>> {
    let mut names: Vec<&str> = resources
        .profiles()
        .filter(|profile| profile.strategy == StemmingStrategy::Dictionary)
        .map(|profile| profile.name.as_str())
        .collect();
    names.sort_unstable();

    let mut statements = Vec::with_capacity(names.len() + 2);
    for name in names {
        let name = identifier(name)?;
        statements.push(format!(
            "DO $$ BEGIN \
             IF NOT EXISTS (SELECT 1 FROM pg_ts_config WHERE cfgname = '{name}') THEN \
             CREATE TEXT SEARCH CONFIGURATION public.{name} (COPY = pg_catalog.english); \
             ALTER TEXT SEARCH CONFIGURATION public.{name} ALTER MAPPING FOR \
             asciiword, asciihword, hword_asciipart, word, hword, hword_part WITH simple; \
             END IF; END $$"
        ));
    }
    statements.push(AGGREGATE_FUNCTION.to_string());
    statements.push(AGGREGATE.to_string());
    Ok(statements)
}

/// Reverse of [`setup_statements`].
pub fn teardown_statements(resources: &SearchResources) -> Result<Vec<String>> {
    let mut statements = vec![
        "DROP AGGREGATE IF EXISTS tsvector_agg(tsvector)".to_string(),
        "DROP FUNCTION IF EXISTS tsvector_add(tsvector, tsvector)".to_string(),
    ];
    let mut names: Vec<&str> = resources
        .profiles()
        .filter(|profile| profile.strategy == StemmingStrategy::Dictionary)
        .map(|profile| profile.name.as_str())
        .collect();
    names.sort_unstable();
    for name in names {
        statements.push(format!(
            "DROP TEXT SEARCH CONFIGURATION IF EXISTS public.{}",
            identifier(name)?
        ));
    }
    Ok(statements)
}
