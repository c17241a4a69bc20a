#![forbid(unsafe_code)]

//! Codec for the legacy "config smuggled in the url field" encodings.
//!
//! Before cross-references existed, a merged Work stored its constituents as a
//! JSON blob in its url column, and each of its SubItems tagged the record it
//! really belonged to the same way. Decoding is deliberately forgiving: any
//! malformed payload means "this url is an ordinary locator", never an error.

use serde::Deserialize;
use serde_json::json;

/// One `(source, url)` constituent descriptor inside an aggregate config.
#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
pub struct ConstituentRef {
    #[serde(rename = "s")]
    pub source: i64,
    #[serde(rename = "u")]
    pub url: String,
}

/// Ordered constituent list of a legacy merged Work. The first entry is the
/// info-bearing constituent; duplicates are possible and collapse downstream.
#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
pub struct AggregateConfig {
    #[serde(rename = "c")]
    pub children: Vec<ConstituentRef>,
}

/// Provenance tag on a legacy merged SubItem: which real Work/SubItem the
/// progress on this record actually belongs to.
#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
pub struct ProvenanceConfig {
    #[serde(rename = "s")]
    pub source: i64,
    #[serde(rename = "u")]
    pub url: String,
    #[serde(rename = "m")]
    pub owner_url: String,
}

pub fn decode_aggregate(raw: &str) -> Option<AggregateConfig> {
    serde_json::from_str(raw).ok()
}

pub fn decode_provenance(raw: &str) -> Option<ProvenanceConfig> {
    serde_json::from_str(raw).ok()
}

pub fn encode_aggregate(config: &AggregateConfig) -> String {
    let children: Vec<_> = config
        .children
        .iter()
        .map(|child| json!({"s": child.source, "u": child.url}))
        .collect();
    json!({"c": children}).to_string()
}

pub fn encode_provenance(config: &ProvenanceConfig) -> String {
    json!({"s": config.source, "u": config.url, "m": config.owner_url}).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_aggregate_config() {
        let config = decode_aggregate(r#"{"c":[{"s":11,"u":"/a"},{"s":22,"u":"/b"}]}"#)
            .expect("aggregate config");
        assert_eq!(config.children.len(), 2);
        assert_eq!(config.children[0].source, 11);
        assert_eq!(config.children[0].url, "/a");
        assert_eq!(config.children[1].source, 22);
        assert_eq!(config.children[1].url, "/b");
    }

    #[test]
    fn decodes_provenance_config() {
        let config =
            decode_provenance(r#"{"s":11,"u":"/a/ch1","m":"/a"}"#).expect("provenance config");
        assert_eq!(config.source, 11);
        assert_eq!(config.url, "/a/ch1");
        assert_eq!(config.owner_url, "/a");
    }

    #[test]
    fn malformed_payloads_decode_to_none() {
        // Ordinary locators, truncated JSON, schema and type mismatches.
        assert!(decode_aggregate("/g/123").is_none());
        assert!(decode_aggregate(r#"{"c":"#).is_none());
        assert!(decode_aggregate(r#"{"x":[]}"#).is_none());
        assert!(decode_aggregate(r#"{"c":[{"s":"eleven","u":"/a"}]}"#).is_none());
        assert!(decode_provenance("/g/123/ch1").is_none());
        assert!(decode_provenance(r#"{"s":11,"u":"/a/ch1"}"#).is_none());
    }

    #[test]
    fn encoders_round_trip() {
        let aggregate = AggregateConfig {
            children: vec![
                ConstituentRef {
                    source: 11,
                    url: "/a".to_string(),
                },
                ConstituentRef {
                    source: 22,
                    url: "/b".to_string(),
                },
            ],
        };
        assert_eq!(
            decode_aggregate(&encode_aggregate(&aggregate)),
            Some(aggregate)
        );

        let provenance = ProvenanceConfig {
            source: 11,
            url: "/a/ch1".to_string(),
            owner_url: "/a".to_string(),
        };
        assert_eq!(
            decode_provenance(&encode_provenance(&provenance)),
            Some(provenance)
        );
    }
}
