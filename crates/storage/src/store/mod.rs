#![forbid(unsafe_code)]

mod error;
mod references;
mod schema;
mod subitems;
mod works;

pub use error::StoreError;
pub use references::{CrossReferenceRow, NewCrossReference};
pub use subitems::{NewSubItem, SubItemRow};
pub use works::{NewWork, WorkRow};

pub(crate) use references::{
    cross_references_for_composite_tx, insert_cross_reference_tx, insert_cross_references_tx,
};
pub(crate) use subitems::{
    delete_subitems_tx, insert_subitem_tx, subitems_for_work_tx, subitems_for_works_tx,
    update_subitem_progress_tx,
};
pub(crate) use works::{
    insert_work_tx, update_work_urls_tx, work_by_id_tx, work_by_source_and_url_tx,
    works_by_source_tx,
};

use rusqlite::{Connection, OptionalExtension, params};
use std::path::{Path, PathBuf};
use std::time::Duration;

const DB_FILE_NAME: &str = "shiori.db";
const MIGRATION_VERSION_KEY: &str = "migration_version";

#[derive(Debug)]
pub struct CatalogStore {
    pub(crate) conn: Connection,
    storage_dir: PathBuf,
    db_path: PathBuf,
}

impl CatalogStore {
    pub fn open(storage_dir: impl AsRef<Path>) -> Result<Self, StoreError> {
        let storage_dir = storage_dir.as_ref().to_path_buf();
        std::fs::create_dir_all(&storage_dir)?;

        let db_path = storage_dir.join(DB_FILE_NAME);
        let conn = Connection::open(&db_path)?;
        conn.busy_timeout(Duration::from_secs(5))?;
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;

        schema::install(&conn)?;

        Ok(Self {
            conn,
            storage_dir,
            db_path,
        })
    }

    pub fn storage_dir(&self) -> &Path {
        &self.storage_dir
    }

    pub fn db_path(&self) -> &Path {
        &self.db_path
    }

    /// Stored migration version counter; 0 when the store has never been
    /// migrated (fresh install).
    pub fn migration_version(&self) -> Result<i64, StoreError> {
        migration_version_tx(&self.conn)
    }

    pub fn insert_work(&mut self, work: &NewWork) -> Result<i64, StoreError> {
        insert_work_tx(&self.conn, work)
    }

    pub fn work_by_id(&self, id: i64) -> Result<Option<WorkRow>, StoreError> {
        work_by_id_tx(&self.conn, id)
    }

    pub fn work_by_source_and_url(
        &self,
        source: i64,
        url: &str,
    ) -> Result<Option<WorkRow>, StoreError> {
        work_by_source_and_url_tx(&self.conn, source, url)
    }

    pub fn works_by_source(&self, source: i64) -> Result<Vec<WorkRow>, StoreError> {
        works_by_source_tx(&self.conn, source)
    }

    pub fn insert_subitem(&mut self, item: &NewSubItem) -> Result<i64, StoreError> {
        insert_subitem_tx(&self.conn, item)
    }

    pub fn subitems_for_work(&self, work_id: i64) -> Result<Vec<SubItemRow>, StoreError> {
        subitems_for_work_tx(&self.conn, work_id)
    }

    pub fn insert_cross_reference(
        &mut self,
        reference: &NewCrossReference,
    ) -> Result<i64, StoreError> {
        insert_cross_reference_tx(&self.conn, reference)
    }

    pub fn cross_references_for_composite(
        &self,
        composite_work_id: i64,
    ) -> Result<Vec<CrossReferenceRow>, StoreError> {
        cross_references_for_composite_tx(&self.conn, composite_work_id)
    }
}

pub(crate) fn migration_version_tx(conn: &Connection) -> Result<i64, StoreError> {
    let value: Option<String> = conn
        .query_row(
            "SELECT value FROM meta WHERE key = ?1",
            params![MIGRATION_VERSION_KEY],
            |row| row.get(0),
        )
        .optional()?;
    Ok(value.and_then(|raw| raw.parse().ok()).unwrap_or(0))
}

pub(crate) fn set_migration_version_tx(conn: &Connection, version: i64) -> Result<(), StoreError> {
    conn.execute(
        "INSERT INTO meta(key, value) VALUES (?1, ?2) \
         ON CONFLICT(key) DO UPDATE SET value = excluded.value",
        params![MIGRATION_VERSION_KEY, version.to_string()],
    )?;
    Ok(())
}
