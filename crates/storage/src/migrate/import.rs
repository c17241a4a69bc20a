#![forbid(unsafe_code)]

use crate::store::NewWork;
use shiori_core::sources::{LEGACY_NHENTAI_SOURCE_ID, canonical_for_legacy};
use shiori_core::urls::strip_domain;

/// Applies the legacy source-id table to a Work decoded from an external
/// backup, before it is inserted. Backups written by old releases predate the
/// versioned pass, so they arrive with legacy numeric ids regardless of the
/// store's own version counter.
pub fn remap_imported_work(work: &mut NewWork) {
    if work.source == LEGACY_NHENTAI_SOURCE_ID {
        work.url = strip_domain(&work.url);
    }
    if let Some(canonical) = canonical_for_legacy(work.source) {
        work.source = canonical;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shiori_core::sources;

    fn imported(source: i64, url: &str) -> NewWork {
        NewWork {
            source,
            url: url.to_string(),
            title: "imported".to_string(),
            favorite: true,
            initialized: false,
            date_added_ms: 0,
        }
    }

    #[test]
    fn legacy_sources_are_remapped() {
        let mut work = imported(6909, "/entry/123");
        remap_imported_work(&mut work);
        assert_eq!(work.source, sources::TSUMINO_SOURCE_ID);
        assert_eq!(work.url, "/entry/123");
    }

    #[test]
    fn nhentai_urls_lose_their_domain() {
        let mut work = imported(6907, "https://nhentai.net/g/123");
        remap_imported_work(&mut work);
        assert_eq!(work.source, sources::NHENTAI_SOURCE_ID);
        assert_eq!(work.url, "/g/123");
    }

    #[test]
    fn blacklisted_extension_ids_collapse_to_eh() {
        let mut work = imported(sources::EH_EXT_SOURCE_BLACKLIST[0], "/g/9");
        remap_imported_work(&mut work);
        assert_eq!(work.source, sources::EH_SOURCE_ID);
    }

    #[test]
    fn canonical_sources_pass_through() {
        let mut work = imported(sources::HITOMI_SOURCE_ID, "https://example.org/x");
        remap_imported_work(&mut work);
        assert_eq!(work.source, sources::HITOMI_SOURCE_ID);
        assert_eq!(work.url, "https://example.org/x");
    }
}
