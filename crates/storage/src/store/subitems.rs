#![forbid(unsafe_code)]

use super::StoreError;
use rusqlite::{Connection, Row, params};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SubItemRow {
    pub id: i64,
    pub work_id: i64,
    pub source: i64,
    pub url: String,
    pub name: String,
    pub read: bool,
    pub last_position_read: i64,
}

impl SubItemRow {
    pub fn has_progress(&self) -> bool {
        self.read || self.last_position_read != 0
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NewSubItem {
    pub work_id: i64,
    pub source: i64,
    pub url: String,
    pub name: String,
    pub read: bool,
    pub last_position_read: i64,
}

const SELECT_SUBITEM: &str =
    "SELECT id, work_id, source, url, name, read, last_position_read FROM subitems";

fn map_subitem_row(row: &Row<'_>) -> rusqlite::Result<SubItemRow> {
    Ok(SubItemRow {
        id: row.get(0)?,
        work_id: row.get(1)?,
        source: row.get(2)?,
        url: row.get(3)?,
        name: row.get(4)?,
        read: row.get(5)?,
        last_position_read: row.get(6)?,
    })
}

pub(crate) fn insert_subitem_tx(conn: &Connection, item: &NewSubItem) -> Result<i64, StoreError> {
    conn.execute(
        "INSERT INTO subitems(work_id, source, url, name, read, last_position_read) \
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        params![
            item.work_id,
            item.source,
            item.url,
            item.name,
            item.read,
            item.last_position_read,
        ],
    )?;
    Ok(conn.last_insert_rowid())
}

pub(crate) fn subitems_for_work_tx(
    conn: &Connection,
    work_id: i64,
) -> Result<Vec<SubItemRow>, StoreError> {
    let mut stmt = conn.prepare(&format!(
        "{SELECT_SUBITEM} WHERE work_id = ?1 ORDER BY id ASC"
    ))?;
    let rows = stmt.query_map(params![work_id], map_subitem_row)?;
    let mut items = Vec::new();
    for row in rows {
        items.push(row?);
    }
    Ok(items)
}

pub(crate) fn subitems_for_works_tx(
    conn: &Connection,
    work_ids: &[i64],
) -> Result<Vec<SubItemRow>, StoreError> {
    let mut items = Vec::new();
    for work_id in work_ids {
        items.extend(subitems_for_work_tx(conn, *work_id)?);
    }
    Ok(items)
}

pub(crate) fn update_subitem_progress_tx(
    conn: &Connection,
    items: &[SubItemRow],
) -> Result<(), StoreError> {
    if items.is_empty() {
        return Ok(());
    }
    let mut stmt =
        conn.prepare("UPDATE subitems SET read = ?2, last_position_read = ?3 WHERE id = ?1")?;
    for item in items {
        stmt.execute(params![item.id, item.read, item.last_position_read])?;
    }
    Ok(())
}

pub(crate) fn delete_subitems_tx(conn: &Connection, ids: &[i64]) -> Result<(), StoreError> {
    if ids.is_empty() {
        return Ok(());
    }
    let mut stmt = conn.prepare("DELETE FROM subitems WHERE id = ?1")?;
    for id in ids {
        stmt.execute(params![id])?;
    }
    Ok(())
}
