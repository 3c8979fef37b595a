use ::duckdb::Connection;

struct Migration {
    version: &'static str,
    sql: &'static str,
}

const MIGRATIONS: &[Migration] = &[
    Migration {
        version: "0001_credit_scores",
        sql: r#"
CREATE SEQUENCE IF NOT EXISTS credit_scores_id_seq START 1;

CREATE TABLE IF NOT EXISTS credit_scores (
    id BIGINT PRIMARY KEY DEFAULT nextval('credit_scores_id_seq'),
    ticker TEXT NOT NULL,
    score INTEGER NOT NULL,
    method TEXT NOT NULL,
    features TEXT NOT NULL,
    explanation TEXT NOT NULL,
    key_headline TEXT,
    created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP
);
"#,
    },
    Migration {
        version: "0002_credit_scores_index",
        sql: r#"
CREATE INDEX IF NOT EXISTS idx_credit_scores_ticker_created_at ON credit_scores(ticker, created_at);
"#,
    },
];

/// Versions in the order they are applied.
pub fn known_versions() -> impl Iterator<Item = &'static str> {
    MIGRATIONS.iter().map(|migration| migration.version)
}

pub fn apply_migrations(connection: &Connection) -> Result<(), ::duckdb::Error> {
    connection.execute_batch(
        r#"
CREATE TABLE IF NOT EXISTS schema_migrations (
    version TEXT PRIMARY KEY,
    applied_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP
);
"#,
    )?;

    for migration in MIGRATIONS {
        let applied_count: i64 = connection.query_row(
            "SELECT COUNT(*) FROM schema_migrations WHERE version = ?",
            [migration.version],
            |row| row.get(0),
        )?;

        if applied_count == 0 {
            connection.execute_batch(migration.sql)?;
            connection.execute(
                "INSERT INTO schema_migrations (version) VALUES (?)",
                [migration.version],
            )?;
            tracing::info!(version = migration.version, "applied warehouse migration");
        }
    }

    Ok(())
}
