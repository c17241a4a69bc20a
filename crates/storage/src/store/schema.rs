#![forbid(unsafe_code)]

use super::StoreError;
use rusqlite::Connection;

const PRAGMAS_SQL: &str = r#"
        PRAGMA journal_mode=WAL;
        PRAGMA synchronous=NORMAL;
"#;

const META_SQL: &str = r#"
        CREATE TABLE IF NOT EXISTS meta (
          key TEXT PRIMARY KEY,
          value TEXT NOT NULL
        );
"#;

const WORKS_SQL: &str = r#"
        CREATE TABLE IF NOT EXISTS works (
          id INTEGER PRIMARY KEY AUTOINCREMENT,
          source INTEGER NOT NULL,
          url TEXT NOT NULL,
          title TEXT NOT NULL,
          favorite INTEGER NOT NULL DEFAULT 0,
          initialized INTEGER NOT NULL DEFAULT 0,
          date_added_ms INTEGER NOT NULL
        );
"#;

const SUBITEMS_SQL: &str = r#"
        CREATE TABLE IF NOT EXISTS subitems (
          id INTEGER PRIMARY KEY AUTOINCREMENT,
          work_id INTEGER NOT NULL REFERENCES works(id),
          source INTEGER NOT NULL,
          url TEXT NOT NULL,
          name TEXT NOT NULL,
          read INTEGER NOT NULL DEFAULT 0,
          last_position_read INTEGER NOT NULL DEFAULT 0
        );
"#;

const CROSS_REFERENCES_SQL: &str = r#"
        CREATE TABLE IF NOT EXISTS cross_references (
          id INTEGER PRIMARY KEY AUTOINCREMENT,
          composite_work_id INTEGER NOT NULL,
          composite_url TEXT NOT NULL,
          constituent_work_id INTEGER NOT NULL,
          constituent_url TEXT NOT NULL,
          constituent_source INTEGER NOT NULL,
          is_primary_info INTEGER NOT NULL DEFAULT 0,
          gets_updates INTEGER NOT NULL DEFAULT 0,
          download_enabled INTEGER NOT NULL DEFAULT 0,
          sort_mode INTEGER NOT NULL DEFAULT 0,
          priority INTEGER NOT NULL DEFAULT 0
        );
"#;

const INDEXES_SQL: &str = r#"
        CREATE INDEX IF NOT EXISTS idx_works_source_url
          ON works(source, url);

        CREATE INDEX IF NOT EXISTS idx_subitems_work
          ON subitems(work_id);

        CREATE UNIQUE INDEX IF NOT EXISTS uk_cross_references_edge
          ON cross_references(composite_work_id, constituent_work_id);
"#;

pub(super) fn install(conn: &Connection) -> Result<(), StoreError> {
    conn.execute_batch(&full_schema_sql())?;
    Ok(())
}

fn full_schema_sql() -> String {
    let mut sql = String::new();
    sql.push_str(PRAGMAS_SQL);
    sql.push_str(META_SQL);
    sql.push_str(WORKS_SQL);
    sql.push_str(SUBITEMS_SQL);
    sql.push_str(CROSS_REFERENCES_SQL);
    sql.push_str(INDEXES_SQL);
    sql
}
