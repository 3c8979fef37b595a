//! # Creditlens Warehouse
//!
//! DuckDB-backed credit score history.
//!
//! ## Overview
//!
//! Every calculated score is appended to `credit_scores` together with the
//! feature vector and explanation that produced it. The history feeds the
//! drop alert (previous score) and the `history` command.
//!
//! - **Parameterized SQL** only; tickers and JSON payloads are never interpolated
//! - **Versioned migrations** tracked in `schema_migrations`
//! - **Connection pooling** per access mode
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use creditlens_core::Ticker;
//! use creditlens_warehouse::{NewScoreRecord, Warehouse};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let warehouse = Warehouse::open_default()?;
//!     let ticker = Ticker::parse("ACME")?;
//!
//!     let previous = warehouse.latest_score(&ticker)?.map(|record| record.score);
//!     warehouse.save_score(&NewScoreRecord {
//!         ticker: ticker.clone(),
//!         score: 72,
//!         method: String::from("model"),
//!         features: String::from(r#"{"close":101.5}"#),
//!         explanation: String::from(r#"{"baseValue":0.0,"prediction":0.011,"contributions":{}}"#),
//!         key_headline: None,
//!     })?;
//!
//!     println!("previous: {previous:?}");
//!     Ok(())
//! }
//! ```
//!
//! ## Tables
//!
//! | Table | Description |
//! |-------|-------------|
//! | `credit_scores` | One row per calculated score |
//! | `schema_migrations` | Applied migration versions |

pub mod duckdb;
pub mod migrations;

use std::fs;
use std::path::{Path, PathBuf};

use ::duckdb::{Connection, Row, ToSql};
use creditlens_core::{resolve_creditlens_home, Ticker};
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

pub use duckdb::{AccessMode, DuckDbConnectionManager, PooledConnection};

#[derive(Debug, Error)]
pub enum WarehouseError {
    #[error(transparent)]
    DuckDb(#[from] ::duckdb::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// A stored features or explanation payload is not valid JSON.
    #[error("stored payload for score {id} is not valid JSON: {source}")]
    CorruptPayload {
        id: i64,
        #[source]
        source: serde_json::Error,
    },
}

#[derive(Debug, Clone)]
pub struct WarehouseConfig {
    /// Root directory for creditlens data.
    pub creditlens_home: PathBuf,
    pub db_path: PathBuf,
    pub max_pool_size: usize,
}

impl WarehouseConfig {
    /// Database at `home/cache/warehouse.duckdb`.
    pub fn in_home(home: impl Into<PathBuf>) -> Self {
        let creditlens_home = home.into();
        let db_path = creditlens_home.join("cache").join("warehouse.duckdb");
        Self {
            creditlens_home,
            db_path,
            max_pool_size: 4,
        }
    }
}

impl Default for WarehouseConfig {
    fn default() -> Self {
        Self::in_home(resolve_creditlens_home())
    }
}

/// Row to append; payloads are JSON text as produced by the scoring pipeline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewScoreRecord {
    pub ticker: Ticker,
    pub score: i32,
    pub method: String,
    pub features: String,
    pub explanation: String,
    pub key_headline: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoreRecord {
    pub id: i64,
    pub ticker: String,
    pub score: i32,
    pub method: String,
    pub features: Value,
    pub explanation: Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub key_headline: Option<String>,
    pub created_at: String,
}

const RECORD_COLUMNS: &str = "id, ticker, score, method, features, explanation, key_headline, \
                              CAST(created_at AS VARCHAR)";

#[derive(Clone)]
pub struct Warehouse {
    config: WarehouseConfig,
    manager: DuckDbConnectionManager,
}

impl Warehouse {
    pub fn open_default() -> Result<Self, WarehouseError> {
        Self::open(WarehouseConfig::default())
    }

    /// Opens (creating directories as needed) and migrates the database.
    pub fn open(config: WarehouseConfig) -> Result<Self, WarehouseError> {
        if let Some(parent) = config.db_path.parent() {
            fs::create_dir_all(parent)?;
        }

        let manager = DuckDbConnectionManager::new(config.db_path.clone(), config.max_pool_size);
        let warehouse = Self { config, manager };
        warehouse.initialize()?;
        Ok(warehouse)
    }

    pub fn initialize(&self) -> Result<(), WarehouseError> {
        let connection = self.manager.acquire(AccessMode::ReadWrite)?;
        migrations::apply_migrations(&connection)?;
        Ok(())
    }

    pub fn db_path(&self) -> &Path {
        self.manager.db_path()
    }

    pub fn config(&self) -> &WarehouseConfig {
        &self.config
    }

    /// Appends a score and returns its id.
    pub fn save_score(&self, record: &NewScoreRecord) -> Result<i64, WarehouseError> {
        let connection = self.manager.acquire(AccessMode::ReadWrite)?;
        connection.execute_batch("BEGIN TRANSACTION")?;
        let result = (|| -> Result<i64, WarehouseError> {
            let ticker = record.ticker.as_str();
            let params: [&dyn ToSql; 6] = [
                &ticker,
                &record.score,
                &record.method,
                &record.features,
                &record.explanation,
                &record.key_headline,
            ];
            let id = connection.query_row(
                "INSERT INTO credit_scores \
                 (ticker, score, method, features, explanation, key_headline) \
                 VALUES (?, ?, ?, ?, ?, ?) RETURNING id",
                params.as_slice(),
                |row| row.get::<_, i64>(0),
            )?;
            Ok(id)
        })();

        let id = finalize_transaction(&connection, result)?;
        tracing::debug!(id, ticker = %record.ticker, score = record.score, "score persisted");
        Ok(id)
    }

    /// Most recent score for `ticker`, by creation time then id.
    pub fn latest_score(&self, ticker: &Ticker) -> Result<Option<ScoreRecord>, WarehouseError> {
        let mut history = self.score_history(ticker, 1)?;
        Ok(history.pop())
    }

    /// The latest `limit` scores for `ticker`, oldest first.
    pub fn score_history(
        &self,
        ticker: &Ticker,
        limit: usize,
    ) -> Result<Vec<ScoreRecord>, WarehouseError> {
        if limit == 0 {
            return Ok(Vec::new());
        }

        let connection = self.manager.acquire(AccessMode::ReadOnly)?;
        let sql = format!(
            "SELECT {RECORD_COLUMNS} FROM credit_scores WHERE ticker = ? \
             ORDER BY created_at DESC, id DESC LIMIT ?"
        );
        let ticker = ticker.as_str();
        let limit = i64::try_from(limit).unwrap_or(i64::MAX);
        let params: [&dyn ToSql; 2] = [&ticker, &limit];

        let mut statement = connection.prepare(sql.as_str())?;
        let rows = statement.query_map(params.as_slice(), read_row)?;
        let mut records = Vec::new();
        for row in rows {
            records.push(decode_record(row?)?);
        }
        records.reverse();
        Ok(records)
    }

    pub fn count_scores(&self, ticker: &Ticker) -> Result<u64, WarehouseError> {
        let connection = self.manager.acquire(AccessMode::ReadOnly)?;
        let ticker = ticker.as_str();
        let count: i64 = connection.query_row(
            "SELECT COUNT(*) FROM credit_scores WHERE ticker = ?",
            [ticker],
            |row| row.get(0),
        )?;
        Ok(u64::try_from(count).unwrap_or(0))
    }
}

struct RawRecord {
    id: i64,
    ticker: String,
    score: i32,
    method: String,
    features: String,
    explanation: String,
    key_headline: Option<String>,
    created_at: String,
}

fn read_row(row: &Row<'_>) -> Result<RawRecord, ::duckdb::Error> {
    Ok(RawRecord {
        id: row.get(0)?,
        ticker: row.get(1)?,
        score: row.get(2)?,
        method: row.get(3)?,
        features: row.get(4)?,
        explanation: row.get(5)?,
        key_headline: row.get(6)?,
        created_at: row.get(7)?,
    })
}

fn decode_record(raw: RawRecord) -> Result<ScoreRecord, WarehouseError> {
    let parse = |payload: &str| {
        serde_json::from_str::<Value>(payload)
            .map_err(|source| WarehouseError::CorruptPayload { id: raw.id, source })
    };
    Ok(ScoreRecord {
        id: raw.id,
        features: parse(&raw.features)?,
        explanation: parse(&raw.explanation)?,
        ticker: raw.ticker,
        score: raw.score,
        method: raw.method,
        key_headline: raw.key_headline,
        created_at: raw.created_at,
    })
}

/// Commits on success, rolls back on failure.
fn finalize_transaction<T>(
    connection: &Connection,
    result: Result<T, WarehouseError>,
) -> Result<T, WarehouseError> {
    match result {
        Ok(value) => {
            connection.execute_batch("COMMIT")?;
            Ok(value)
        }
        Err(error) => {
            let _ = connection.execute_batch("ROLLBACK");
            Err(error)
        }
    }
}
