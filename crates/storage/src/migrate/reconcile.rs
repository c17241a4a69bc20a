#![forbid(unsafe_code)]

//! Expands legacy merged Works into explicit cross-reference edges.
//!
//! A merged Work used to encode its constituents as a JSON blob inside its
//! url column, and its SubItems carried stale copies of the constituents'
//! progress. This pass rewrites each merged Work to point at its first
//! constituent's locator, records one cross-reference edge per distinct
//! constituent, and moves user progress from the stale copies onto the
//! surviving records before deleting the constituent-owned duplicates.
//!
//! Works whose url does not decode are either already migrated or foreign
//! data; they are left untouched. Everything here runs inside the single
//! migration transaction, so one store failure discards the whole rewrite.

use super::MigrationCtx;
use super::config::{AggregateConfig, ConstituentRef, decode_aggregate, decode_provenance};
use crate::store::{
    NewCrossReference, NewWork, StoreError, SubItemRow, WorkRow, delete_subitems_tx,
    insert_cross_references_tx, insert_work_tx, subitems_for_works_tx,
    update_subitem_progress_tx, update_work_urls_tx, work_by_source_and_url_tx,
    works_by_source_tx,
};
use rusqlite::Transaction;
use shiori_core::sources::MERGED_SOURCE_ID;
use std::collections::BTreeSet;

pub(super) fn reconcile_merged_works_tx(
    tx: &Transaction<'_>,
    ctx: &MigrationCtx<'_>,
) -> Result<(), StoreError> {
    let aggregates = works_by_source_tx(tx, MERGED_SOURCE_ID)?;
    let decoded: Vec<(WorkRow, AggregateConfig)> = aggregates
        .into_iter()
        .filter_map(|work| decode_aggregate(&work.url).map(|config| (work, config)))
        .collect();
    if decoded.is_empty() {
        return Ok(());
    }

    let mut url_rewrites: Vec<(i64, String)> = Vec::new();
    let mut new_references: Vec<NewCrossReference> = Vec::new();
    // Union of resolved constituent Works, deduplicated by id. Drives the
    // subitem consolidation below.
    let mut constituents: Vec<WorkRow> = Vec::new();

    for (aggregate, config) in &decoded {
        let mut composite_url = aggregate.url.clone();
        if let Some(first) = config.children.first() {
            match work_by_source_and_url_tx(tx, MERGED_SOURCE_ID, &first.url)? {
                Some(existing) if existing.id != aggregate.id => {
                    // Locator collision: skip, do not overwrite.
                    tracing::warn!(
                        "merged work {} keeps its url, locator {} is already held by work {}",
                        aggregate.id,
                        first.url,
                        existing.id
                    );
                }
                _ => {
                    composite_url = first.url.clone();
                    url_rewrites.push((aggregate.id, composite_url.clone()));
                }
            }
        }

        new_references.push(NewCrossReference::anchor(aggregate.id, &composite_url));

        let mut seen: BTreeSet<(i64, String)> = BTreeSet::new();
        let distinct: Vec<&ConstituentRef> = config
            .children
            .iter()
            .filter(|child| seen.insert((child.source, child.url.clone())))
            .collect();
        for (index, child) in distinct.iter().enumerate() {
            let Some(child_work) = resolve_constituent_tx(tx, ctx, child)? else {
                continue;
            };
            if child_work.id == aggregate.id {
                // A composite must never become its own constituent.
                continue;
            }
            new_references.push(NewCrossReference {
                composite_work_id: aggregate.id,
                composite_url: composite_url.clone(),
                constituent_work_id: child_work.id,
                constituent_url: child_work.url.clone(),
                constituent_source: child_work.source,
                is_primary_info: index == 0,
                gets_updates: true,
                download_enabled: true,
                sort_mode: 0,
                priority: 0,
            });
            if !constituents.iter().any(|work| work.id == child_work.id) {
                constituents.push(child_work);
            }
        }
    }

    update_work_urls_tx(tx, &url_rewrites)?;
    insert_cross_references_tx(tx, &new_references)?;

    consolidate_subitems_tx(tx, &decoded, &constituents)
}

/// Resolves a constituent descriptor to a real Work, registering a stub when
/// the source is known but the Work is missing. Unknown source: skip entirely.
fn resolve_constituent_tx(
    tx: &Transaction<'_>,
    ctx: &MigrationCtx<'_>,
    child: &ConstituentRef,
) -> Result<Option<WorkRow>, StoreError> {
    if let Some(work) = work_by_source_and_url_tx(tx, child.source, &child.url)? {
        return Ok(Some(work));
    }
    if !ctx.sources.is_registered(child.source) {
        tracing::debug!(
            "skipping constituent {} of unregistered source {}",
            child.url,
            child.source
        );
        return Ok(None);
    }
    let stub = NewWork::stub(child.source, &child.url);
    let id = insert_work_tx(tx, &stub)?;
    Ok(Some(WorkRow {
        id,
        source: stub.source,
        url: stub.url,
        title: stub.title,
        favorite: stub.favorite,
        initialized: stub.initialized,
        date_added_ms: stub.date_added_ms,
    }))
}

/// Carries progress from the aggregates' shadow SubItems onto the matching
/// constituent-owned records, then deletes the constituent-owned records that
/// did not receive any. The shadow rows stay: they are the merged Work's own
/// list going forward.
fn consolidate_subitems_tx(
    tx: &Transaction<'_>,
    migrated: &[(WorkRow, AggregateConfig)],
    constituents: &[WorkRow],
) -> Result<(), StoreError> {
    let aggregate_ids: Vec<i64> = migrated.iter().map(|(work, _)| work.id).collect();
    let shadow = subitems_for_works_tx(tx, &aggregate_ids)?;
    let constituent_ids: Vec<i64> = constituents.iter().map(|work| work.id).collect();
    let real = subitems_for_works_tx(tx, &constituent_ids)?;

    let mut updated: Vec<SubItemRow> = Vec::new();
    let mut updated_ids: BTreeSet<i64> = BTreeSet::new();
    // Only shadows that carry progress are considered, so a blank shadow can
    // never clobber real progress.
    for shadow_item in shadow.iter().filter(|item| item.has_progress()) {
        let Some(provenance) = decode_provenance(&shadow_item.url) else {
            continue;
        };
        let matched = real.iter().find(|item| {
            item.url == provenance.url
                && constituents.iter().any(|owner| {
                    owner.id == item.work_id
                        && owner.source == provenance.source
                        && owner.url == provenance.owner_url
                })
        });
        if let Some(item) = matched {
            if updated_ids.insert(item.id) {
                let mut carried = item.clone();
                carried.read = shadow_item.read;
                carried.last_position_read = shadow_item.last_position_read;
                updated.push(carried);
            }
        }
    }

    let superseded: Vec<i64> = real
        .iter()
        .filter(|item| !updated_ids.contains(&item.id))
        .map(|item| item.id)
        .collect();
    delete_subitems_tx(tx, &superseded)?;
    update_subitem_progress_tx(tx, &updated)
}
