//! DDL for the leaderboard relation. Every statement is idempotent so it can
//! run on each startup.

pub const CREATE_TABLES: &str = r#"
CREATE TABLE IF NOT EXISTS scores (
    id SERIAL PRIMARY KEY,
    nickname TEXT NOT NULL,
    score INTEGER NOT NULL,
    timestamp TIMESTAMP WITH TIME ZONE DEFAULT CURRENT_TIMESTAMP
);

-- Deletes and the per-nickname aggregate both filter or group on nickname
CREATE INDEX IF NOT EXISTS idx_scores_nickname ON scores (nickname);
"#;

/// Split `CREATE_TABLES` into executable statements, dropping comment lines.
pub fn statements() -> impl Iterator<Item = String> {
    CREATE_TABLES.split(';').filter_map(|statement| {
        let sql = statement
            .lines()
            .filter(|line| !line.trim().starts_with("--"))
            .collect::<Vec<_>>()
            .join("\n");
        let sql = sql.trim();
        (!sql.is_empty()).then(|| sql.to_string())
    })
}
