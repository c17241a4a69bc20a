#![forbid(unsafe_code)]

//! Versioned migration pass over the catalog store.
//!
//! Steps are registered against an activation version and run in ascending
//! order inside one exclusive transaction; the stored version counter advances
//! only when that transaction commits, so a failed pass leaves the store at
//! its previous version and the same pass re-runs on the next start.

mod backup;
mod config;
mod import;
mod reconcile;
mod remap;
mod steps;

pub use config::{
    AggregateConfig, ConstituentRef, ProvenanceConfig, decode_aggregate, decode_provenance,
    encode_aggregate, encode_provenance,
};
pub use import::remap_imported_work;

use crate::store::{CatalogStore, StoreError, set_migration_version_tx};
use rusqlite::{Transaction, TransactionBehavior};
use shiori_core::sources::SourceRegistry;

/// Version written after a completed pass. Steps activate at the versions
/// listed in [`registry`].
pub const MIGRATION_VERSION: i64 = 7;

const RECURRING_TASKS: &[(&str, u32)] = &[
    ("app_update_check", 24),
    ("extension_update_check", 12),
    ("library_update", 24),
];

/// Background job registration, consumed fire-and-forget on fresh installs.
pub trait TaskScheduler {
    fn register_recurring_task(&self, name: &str, interval_hours: u32);
}

pub(crate) struct MigrationCtx<'a> {
    pub(crate) sources: &'a SourceRegistry,
}

type StepFn = fn(&Transaction<'_>, &MigrationCtx<'_>) -> Result<(), StoreError>;

struct MigrationStep {
    activation_version: i64,
    apply: StepFn,
}

// Ascending by activation version; the runner relies on the order.
fn registry() -> Vec<MigrationStep> {
    vec![
        MigrationStep {
            activation_version: 4,
            apply: steps::migrate_hbrowse_sources,
        },
        MigrationStep {
            activation_version: 5,
            apply: steps::migrate_hitomi_sources,
        },
        MigrationStep {
            activation_version: 6,
            apply: steps::migrate_delegated_sources,
        },
        MigrationStep {
            activation_version: 7,
            apply: steps::migrate_merged_works,
        },
    ]
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum UpgradeOutcome {
    /// Stored version is already at [`MIGRATION_VERSION`]; nothing ran.
    AlreadyCurrent,
    /// Version 0: first-run setup only, no data existed to migrate.
    FreshInstall,
    /// At least one step ran and the pass committed.
    Migrated,
    /// The pass failed and was rolled back; the version counter is unchanged.
    Failed,
}

impl UpgradeOutcome {
    pub fn migration_performed(self) -> bool {
        matches!(self, Self::Migrated)
    }
}

/// Runs every not-yet-applied migration step. Must be called once at startup,
/// before anything else touches the store. Failures are logged and reported
/// only through the outcome; the store is left at its pre-pass state.
pub fn upgrade(
    store: &mut CatalogStore,
    sources: &SourceRegistry,
    scheduler: &dyn TaskScheduler,
) -> UpgradeOutcome {
    let stored = match store.migration_version() {
        Ok(version) => version,
        Err(err) => {
            tracing::error!("failed to read the stored migration version: {err}");
            return UpgradeOutcome::Failed;
        }
    };
    if stored >= MIGRATION_VERSION {
        return UpgradeOutcome::AlreadyCurrent;
    }

    match run_upgrade(store, sources, scheduler, stored) {
        Ok(outcome) => outcome,
        Err(err) => {
            tracing::error!(
                "failed to migrate the catalog from version {stored} to {MIGRATION_VERSION}: {err}"
            );
            UpgradeOutcome::Failed
        }
    }
}

fn run_upgrade(
    store: &mut CatalogStore,
    sources: &SourceRegistry,
    scheduler: &dyn TaskScheduler,
    stored: i64,
) -> Result<UpgradeOutcome, StoreError> {
    if stored == 0 {
        // Fresh install: set up default background tasks, stamp the version.
        for (name, interval_hours) in RECURRING_TASKS {
            scheduler.register_recurring_task(name, *interval_hours);
        }
        set_migration_version_tx(&store.conn, MIGRATION_VERSION)?;
        return Ok(UpgradeOutcome::FreshInstall);
    }

    let db_path = store.db_path().to_path_buf();
    let storage_dir = store.storage_dir().to_path_buf();
    backup::backup_before_migration(&db_path, &storage_dir, stored);

    let ctx = MigrationCtx { sources };
    let tx = store
        .conn
        .transaction_with_behavior(TransactionBehavior::Exclusive)?;
    for step in registry()
        .iter()
        .filter(|step| step.activation_version > stored)
    {
        (step.apply)(&tx, &ctx)?;
    }
    set_migration_version_tx(&tx, MIGRATION_VERSION)?;
    tx.commit()?;
    Ok(UpgradeOutcome::Migrated)
}
