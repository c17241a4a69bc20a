#![forbid(unsafe_code)]

use super::MigrationCtx;
use super::reconcile::reconcile_merged_works_tx;
use super::remap::{EntityTable, remap_source_tx};
use crate::store::{StoreError, update_work_urls_tx, works_by_source_tx};
use rusqlite::Transaction;
use shiori_core::sources;
use shiori_core::urls::strip_domain;

const HBROWSE_FIRST_SUBITEM_SEGMENT: &str = "/c00001/";

/// v4: HBrowse works move to the canonical source id, and their locators gain
/// the default first-subitem path segment the new handler expects.
pub(super) fn migrate_hbrowse_sources(
    tx: &Transaction<'_>,
    _ctx: &MigrationCtx<'_>,
) -> Result<(), StoreError> {
    remap_both_tables(
        tx,
        sources::LEGACY_HBROWSE_SOURCE_ID,
        sources::HBROWSE_SOURCE_ID,
    )?;

    let works = works_by_source_tx(tx, sources::HBROWSE_SOURCE_ID)?;
    let rewrites: Vec<(i64, String)> = works
        .into_iter()
        .filter(|work| !work.url.ends_with(HBROWSE_FIRST_SUBITEM_SEGMENT))
        .map(|work| {
            let url = format!("{}{}", work.url, HBROWSE_FIRST_SUBITEM_SEGMENT);
            (work.id, url)
        })
        .collect();
    update_work_urls_tx(tx, &rewrites)
}

/// v5: Hitomi works move off the retired standalone id.
pub(super) fn migrate_hitomi_sources(
    tx: &Transaction<'_>,
    _ctx: &MigrationCtx<'_>,
) -> Result<(), StoreError> {
    remap_both_tables(
        tx,
        sources::LEGACY_HITOMI_SOURCE_ID,
        sources::HITOMI_SOURCE_ID,
    )
}

/// v6: the remaining legacy numeric ids move to their delegated sources.
/// NHentai locators also lose their absolute-url prefix, and blacklisted
/// standalone EH extension ids collapse back into the built-in EH source.
pub(super) fn migrate_delegated_sources(
    tx: &Transaction<'_>,
    _ctx: &MigrationCtx<'_>,
) -> Result<(), StoreError> {
    // Gather NHentai urls under the legacy id before the id itself moves.
    let nhentai = works_by_source_tx(tx, sources::LEGACY_NHENTAI_SOURCE_ID)?;
    let rewrites: Vec<(i64, String)> = nhentai
        .into_iter()
        .filter_map(|work| {
            let stripped = strip_domain(&work.url);
            (stripped != work.url).then_some((work.id, stripped))
        })
        .collect();
    update_work_urls_tx(tx, &rewrites)?;

    for (from_legacy, to_canonical) in [
        (
            sources::LEGACY_PERV_EDEN_EN_SOURCE_ID,
            sources::PERV_EDEN_EN_SOURCE_ID,
        ),
        (
            sources::LEGACY_PERV_EDEN_IT_SOURCE_ID,
            sources::PERV_EDEN_IT_SOURCE_ID,
        ),
        (sources::LEGACY_NHENTAI_SOURCE_ID, sources::NHENTAI_SOURCE_ID),
        (
            sources::LEGACY_HENTAI_CAFE_SOURCE_ID,
            sources::HENTAI_CAFE_SOURCE_ID,
        ),
        (sources::LEGACY_TSUMINO_SOURCE_ID, sources::TSUMINO_SOURCE_ID),
    ] {
        remap_both_tables(tx, from_legacy, to_canonical)?;
    }
    for blacklisted in sources::EH_EXT_SOURCE_BLACKLIST {
        remap_both_tables(tx, *blacklisted, sources::EH_SOURCE_ID)?;
    }
    Ok(())
}

/// v7: merged works become explicit cross-references.
pub(super) fn migrate_merged_works(
    tx: &Transaction<'_>,
    ctx: &MigrationCtx<'_>,
) -> Result<(), StoreError> {
    reconcile_merged_works_tx(tx, ctx)
}

// SubItems denormalize their owner's source id, so every work remap is
// mirrored onto the subitems table.
fn remap_both_tables(
    tx: &Transaction<'_>,
    from_legacy: i64,
    to_canonical: i64,
) -> Result<(), StoreError> {
    remap_source_tx(tx, EntityTable::Works, from_legacy, to_canonical)?;
    remap_source_tx(tx, EntityTable::SubItems, from_legacy, to_canonical)?;
    Ok(())
}
