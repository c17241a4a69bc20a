#![forbid(unsafe_code)]

pub mod sources {
    use std::collections::BTreeSet;

    pub const EH_SOURCE_ID: i64 = 6901;
    pub const EXH_SOURCE_ID: i64 = 6902;

    /// Well-known id of the legacy "merged" pseudo-source. Works under this id
    /// historically packed their constituents into the url field as JSON.
    pub const MERGED_SOURCE_ID: i64 = 6969;

    pub const PERV_EDEN_EN_SOURCE_ID: i64 = 4673633799850248749;
    pub const PERV_EDEN_IT_SOURCE_ID: i64 = 1433898225963724122;
    pub const NHENTAI_SOURCE_ID: i64 = 3122156392225024195;
    pub const HENTAI_CAFE_SOURCE_ID: i64 = 260868874183818481;
    pub const TSUMINO_SOURCE_ID: i64 = 6707338697138388949;
    pub const HITOMI_SOURCE_ID: i64 = 2703068117101782422;
    pub const HBROWSE_SOURCE_ID: i64 = 1401584337232758222;

    pub const LEGACY_PERV_EDEN_EN_SOURCE_ID: i64 = 6905;
    pub const LEGACY_PERV_EDEN_IT_SOURCE_ID: i64 = 6906;
    pub const LEGACY_NHENTAI_SOURCE_ID: i64 = 6907;
    pub const LEGACY_HENTAI_CAFE_SOURCE_ID: i64 = 6908;
    pub const LEGACY_TSUMINO_SOURCE_ID: i64 = 6909;
    pub const LEGACY_HITOMI_SOURCE_ID: i64 = 6910;
    pub const LEGACY_HBROWSE_SOURCE_ID: i64 = 6912;

    /// Standalone extension source ids that are folded back into the built-in
    /// EH source. Any member encountered in persisted or imported data remaps
    /// to [`EH_SOURCE_ID`].
    pub const EH_EXT_SOURCE_BLACKLIST: &[i64] = &[
        8100626124886895451,
        57122881048805941,
        4678440076103929247,
    ];

    /// Canonical id for a legacy numeric source id, or `None` when the id is
    /// not a legacy one.
    pub fn canonical_for_legacy(source: i64) -> Option<i64> {
        let canonical = match source {
            LEGACY_PERV_EDEN_EN_SOURCE_ID => PERV_EDEN_EN_SOURCE_ID,
            LEGACY_PERV_EDEN_IT_SOURCE_ID => PERV_EDEN_IT_SOURCE_ID,
            LEGACY_NHENTAI_SOURCE_ID => NHENTAI_SOURCE_ID,
            LEGACY_HENTAI_CAFE_SOURCE_ID => HENTAI_CAFE_SOURCE_ID,
            LEGACY_TSUMINO_SOURCE_ID => TSUMINO_SOURCE_ID,
            LEGACY_HITOMI_SOURCE_ID => HITOMI_SOURCE_ID,
            LEGACY_HBROWSE_SOURCE_ID => HBROWSE_SOURCE_ID,
            other if EH_EXT_SOURCE_BLACKLIST.contains(&other) => EH_SOURCE_ID,
            _ => return None,
        };
        Some(canonical)
    }

    /// The set of source ids the application has handlers for. The migration
    /// engine consults it before registering stub Works: a constituent whose
    /// source is not registered is skipped instead of being materialized.
    #[derive(Clone, Debug, Default)]
    pub struct SourceRegistry {
        ids: BTreeSet<i64>,
    }

    impl SourceRegistry {
        pub fn new() -> Self {
            Self::default()
        }

        /// Registry pre-populated with every built-in source.
        pub fn with_builtin_sources() -> Self {
            let mut registry = Self::new();
            for id in [
                EH_SOURCE_ID,
                EXH_SOURCE_ID,
                MERGED_SOURCE_ID,
                PERV_EDEN_EN_SOURCE_ID,
                PERV_EDEN_IT_SOURCE_ID,
                NHENTAI_SOURCE_ID,
                HENTAI_CAFE_SOURCE_ID,
                TSUMINO_SOURCE_ID,
                HITOMI_SOURCE_ID,
                HBROWSE_SOURCE_ID,
            ] {
                registry.register(id);
            }
            registry
        }

        pub fn register(&mut self, source: i64) {
            self.ids.insert(source);
        }

        pub fn is_registered(&self, source: i64) -> bool {
            self.ids.contains(&source)
        }
    }
}

pub mod urls {
    /// Strips the scheme and authority from an absolute http(s) URL, keeping
    /// path, query and fragment. Anything that does not look like an absolute
    /// URL is returned unchanged (it is already a provider-scoped locator).
    pub fn strip_domain(url: &str) -> String {
        let rest = if let Some(rest) = url.strip_prefix("https://") {
            rest
        } else if let Some(rest) = url.strip_prefix("http://") {
            rest
        } else {
            return url.to_string();
        };

        // Everything from the first path/query/fragment delimiter on survives.
        match rest.find(['/', '?', '#']) {
            Some(index) => rest[index..].to_string(),
            None => String::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::sources::*;
    use super::urls::strip_domain;

    #[test]
    fn legacy_ids_map_to_canonical_sources() {
        assert_eq!(canonical_for_legacy(6905), Some(PERV_EDEN_EN_SOURCE_ID));
        assert_eq!(canonical_for_legacy(6906), Some(PERV_EDEN_IT_SOURCE_ID));
        assert_eq!(canonical_for_legacy(6907), Some(NHENTAI_SOURCE_ID));
        assert_eq!(canonical_for_legacy(6908), Some(HENTAI_CAFE_SOURCE_ID));
        assert_eq!(canonical_for_legacy(6909), Some(TSUMINO_SOURCE_ID));
        assert_eq!(canonical_for_legacy(6910), Some(HITOMI_SOURCE_ID));
        assert_eq!(canonical_for_legacy(6912), Some(HBROWSE_SOURCE_ID));
    }

    #[test]
    fn blacklisted_extension_sources_collapse_to_eh() {
        for id in EH_EXT_SOURCE_BLACKLIST {
            assert_eq!(canonical_for_legacy(*id), Some(EH_SOURCE_ID));
        }
    }

    #[test]
    fn non_legacy_ids_are_untouched() {
        assert_eq!(canonical_for_legacy(HITOMI_SOURCE_ID), None);
        assert_eq!(canonical_for_legacy(1), None);
    }

    #[test]
    fn strip_domain_keeps_path_query_and_fragment() {
        assert_eq!(strip_domain("https://example.org/g/123"), "/g/123");
        assert_eq!(
            strip_domain("http://example.org/g/123?page=2#top"),
            "/g/123?page=2#top"
        );
        assert_eq!(strip_domain("https://example.org?q=1"), "?q=1");
        assert_eq!(strip_domain("https://example.org"), "");
    }

    #[test]
    fn strip_domain_leaves_relative_locators_alone() {
        assert_eq!(strip_domain("/g/123"), "/g/123");
        assert_eq!(strip_domain("g/123"), "g/123");
        assert_eq!(strip_domain(""), "");
    }

    #[test]
    fn registry_controls_stub_creation() {
        let mut registry = SourceRegistry::new();
        assert!(!registry.is_registered(HITOMI_SOURCE_ID));
        registry.register(HITOMI_SOURCE_ID);
        assert!(registry.is_registered(HITOMI_SOURCE_ID));

        let builtin = SourceRegistry::with_builtin_sources();
        assert!(builtin.is_registered(MERGED_SOURCE_ID));
        assert!(!builtin.is_registered(6905));
    }
}
