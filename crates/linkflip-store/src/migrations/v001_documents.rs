//! v001 -- Initial schema creation.
//!
//! A single key/value table holding whole JSON documents.

use rusqlite::Connection;

const UP_SQL: &str = r#"
CREATE TABLE IF NOT EXISTS documents (
    key        TEXT PRIMARY KEY NOT NULL,   -- 'profile' | 'settings'
    json       TEXT NOT NULL,               -- camelCase JSON document
    updated_at INTEGER NOT NULL             -- epoch milliseconds of the last write
);
"#;

/// Apply the migration.
pub fn up(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch(UP_SQL)
}
