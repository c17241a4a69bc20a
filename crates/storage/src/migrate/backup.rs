#![forbid(unsafe_code)]

use std::path::Path;

const BACKUP_DIR_NAME: &str = "migration_backups";

/// Best-effort snapshot of the database file, taken once per source version.
/// A failed copy is logged and never blocks the pass.
pub(super) fn backup_before_migration(db_path: &Path, storage_dir: &Path, from_version: i64) {
    let backup_dir = storage_dir.join(BACKUP_DIR_NAME);
    let destination = backup_dir.join(format!("{from_version}.bck.db"));
    if destination.exists() {
        // Do not back up the same version twice.
        return;
    }

    let copied = std::fs::create_dir_all(&backup_dir)
        .and_then(|_| std::fs::copy(db_path, &destination).map(|_| ()));
    if let Err(err) = copied {
        tracing::warn!("failed to back up catalog before migration: {err}");
    }
}
