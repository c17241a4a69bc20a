#![forbid(unsafe_code)]

use crate::store::StoreError;
use rusqlite::{Transaction, params};

/// Entity tables a source remap may touch. Restricting the statement to a
/// known table keeps the bulk update from ever being built from free text.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(super) enum EntityTable {
    Works,
    SubItems,
}

impl EntityTable {
    fn as_str(self) -> &'static str {
        match self {
            EntityTable::Works => "works",
            EntityTable::SubItems => "subitems",
        }
    }
}

/// One bulk rewrite of a legacy numeric source id to its canonical id.
/// Updates 0 rows when already applied, which is what makes individual remap
/// steps safe to re-run after a rolled-back pass.
pub(super) fn remap_source_tx(
    tx: &Transaction<'_>,
    table: EntityTable,
    from_legacy: i64,
    to_canonical: i64,
) -> Result<usize, StoreError> {
    let sql = format!(
        "UPDATE {} SET source = ?1 WHERE source = ?2",
        table.as_str()
    );
    Ok(tx.execute(&sql, params![to_canonical, from_legacy])?)
}
