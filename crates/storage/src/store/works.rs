#![forbid(unsafe_code)]

use super::StoreError;
use rusqlite::{Connection, OptionalExtension, Row, params};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WorkRow {
    pub id: i64,
    pub source: i64,
    pub url: String,
    pub title: String,
    pub favorite: bool,
    pub initialized: bool,
    pub date_added_ms: i64,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NewWork {
    pub source: i64,
    pub url: String,
    pub title: String,
    pub favorite: bool,
    pub initialized: bool,
    pub date_added_ms: i64,
}

impl NewWork {
    /// Minimal placeholder record for a constituent that has no real Work yet.
    pub(crate) fn stub(source: i64, url: &str) -> Self {
        Self {
            source,
            url: url.to_string(),
            title: url.to_string(),
            favorite: false,
            initialized: false,
            date_added_ms: 0,
        }
    }
}

const SELECT_WORK: &str =
    "SELECT id, source, url, title, favorite, initialized, date_added_ms FROM works";

fn map_work_row(row: &Row<'_>) -> rusqlite::Result<WorkRow> {
    Ok(WorkRow {
        id: row.get(0)?,
        source: row.get(1)?,
        url: row.get(2)?,
        title: row.get(3)?,
        favorite: row.get(4)?,
        initialized: row.get(5)?,
        date_added_ms: row.get(6)?,
    })
}

pub(crate) fn insert_work_tx(conn: &Connection, work: &NewWork) -> Result<i64, StoreError> {
    conn.execute(
        "INSERT INTO works(source, url, title, favorite, initialized, date_added_ms) \
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        params![
            work.source,
            work.url,
            work.title,
            work.favorite,
            work.initialized,
            work.date_added_ms,
        ],
    )?;
    Ok(conn.last_insert_rowid())
}

pub(crate) fn work_by_id_tx(conn: &Connection, id: i64) -> Result<Option<WorkRow>, StoreError> {
    let row = conn
        .query_row(
            &format!("{SELECT_WORK} WHERE id = ?1"),
            params![id],
            map_work_row,
        )
        .optional()?;
    Ok(row)
}

pub(crate) fn work_by_source_and_url_tx(
    conn: &Connection,
    source: i64,
    url: &str,
) -> Result<Option<WorkRow>, StoreError> {
    let row = conn
        .query_row(
            &format!("{SELECT_WORK} WHERE source = ?1 AND url = ?2 LIMIT 1"),
            params![source, url],
            map_work_row,
        )
        .optional()?;
    Ok(row)
}

pub(crate) fn works_by_source_tx(
    conn: &Connection,
    source: i64,
) -> Result<Vec<WorkRow>, StoreError> {
    let mut stmt = conn.prepare(&format!("{SELECT_WORK} WHERE source = ?1 ORDER BY id ASC"))?;
    let rows = stmt.query_map(params![source], map_work_row)?;
    let mut works = Vec::new();
    for row in rows {
        works.push(row?);
    }
    Ok(works)
}

/// Url-only bulk update keyed on identity. The narrow statement keeps large
/// rewrites fast, the same reason the legacy app used a dedicated url resolver.
pub(crate) fn update_work_urls_tx(
    conn: &Connection,
    rewrites: &[(i64, String)],
) -> Result<(), StoreError> {
    if rewrites.is_empty() {
        return Ok(());
    }
    let mut stmt = conn.prepare("UPDATE works SET url = ?2 WHERE id = ?1")?;
    for (id, url) in rewrites {
        stmt.execute(params![id, url])?;
    }
    Ok(())
}
