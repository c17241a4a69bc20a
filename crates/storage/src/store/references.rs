#![forbid(unsafe_code)]

use super::StoreError;
use rusqlite::{Connection, Row, params};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CrossReferenceRow {
    pub id: i64,
    pub composite_work_id: i64,
    pub composite_url: String,
    pub constituent_work_id: i64,
    pub constituent_url: String,
    pub constituent_source: i64,
    pub is_primary_info: bool,
    pub gets_updates: bool,
    pub download_enabled: bool,
    pub sort_mode: i64,
    pub priority: i64,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NewCrossReference {
    pub composite_work_id: i64,
    pub composite_url: String,
    pub constituent_work_id: i64,
    pub constituent_url: String,
    pub constituent_source: i64,
    pub is_primary_info: bool,
    pub gets_updates: bool,
    pub download_enabled: bool,
    pub sort_mode: i64,
    pub priority: i64,
}

impl NewCrossReference {
    /// Anchor edge: the composite pointing at itself. A bookkeeping record,
    /// never a data source, so every flag stays off.
    pub(crate) fn anchor(composite_work_id: i64, composite_url: &str) -> Self {
        Self {
            composite_work_id,
            composite_url: composite_url.to_string(),
            constituent_work_id: composite_work_id,
            constituent_url: composite_url.to_string(),
            constituent_source: shiori_core::sources::MERGED_SOURCE_ID,
            is_primary_info: false,
            gets_updates: false,
            download_enabled: false,
            sort_mode: 0,
            priority: 0,
        }
    }
}

const SELECT_REFERENCE: &str = "SELECT id, composite_work_id, composite_url, \
     constituent_work_id, constituent_url, constituent_source, is_primary_info, \
     gets_updates, download_enabled, sort_mode, priority FROM cross_references";

fn map_reference_row(row: &Row<'_>) -> rusqlite::Result<CrossReferenceRow> {
    Ok(CrossReferenceRow {
        id: row.get(0)?,
        composite_work_id: row.get(1)?,
        composite_url: row.get(2)?,
        constituent_work_id: row.get(3)?,
        constituent_url: row.get(4)?,
        constituent_source: row.get(5)?,
        is_primary_info: row.get(6)?,
        gets_updates: row.get(7)?,
        download_enabled: row.get(8)?,
        sort_mode: row.get(9)?,
        priority: row.get(10)?,
    })
}

pub(crate) fn insert_cross_reference_tx(
    conn: &Connection,
    reference: &NewCrossReference,
) -> Result<i64, StoreError> {
    conn.execute(
        "INSERT INTO cross_references(composite_work_id, composite_url, \
         constituent_work_id, constituent_url, constituent_source, is_primary_info, \
         gets_updates, download_enabled, sort_mode, priority) \
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
        params![
            reference.composite_work_id,
            reference.composite_url,
            reference.constituent_work_id,
            reference.constituent_url,
            reference.constituent_source,
            reference.is_primary_info,
            reference.gets_updates,
            reference.download_enabled,
            reference.sort_mode,
            reference.priority,
        ],
    )?;
    Ok(conn.last_insert_rowid())
}

pub(crate) fn insert_cross_references_tx(
    conn: &Connection,
    references: &[NewCrossReference],
) -> Result<(), StoreError> {
    for reference in references {
        insert_cross_reference_tx(conn, reference)?;
    }
    Ok(())
}

pub(crate) fn cross_references_for_composite_tx(
    conn: &Connection,
    composite_work_id: i64,
) -> Result<Vec<CrossReferenceRow>, StoreError> {
    let mut stmt = conn.prepare(&format!(
        "{SELECT_REFERENCE} WHERE composite_work_id = ?1 ORDER BY id ASC"
    ))?;
    let rows = stmt.query_map(params![composite_work_id], map_reference_row)?;
    let mut references = Vec::new();
    for row in rows {
        references.push(row?);
    }
    Ok(references)
}
