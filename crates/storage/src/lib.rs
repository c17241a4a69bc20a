#![forbid(unsafe_code)]

mod migrate;
mod store;

pub use migrate::{
    AggregateConfig, ConstituentRef, MIGRATION_VERSION, ProvenanceConfig, TaskScheduler,
    UpgradeOutcome, decode_aggregate, decode_provenance, encode_aggregate, encode_provenance,
    remap_imported_work, upgrade,
};
pub use store::{
    CatalogStore, CrossReferenceRow, NewCrossReference, NewSubItem, NewWork, StoreError,
    SubItemRow, WorkRow,
};
