//! Deployment Version Selection
//!
//! Picks the most recent generation out of a set of named records by reading
//! their version marker (for replication controllers, the
//! `openshift.io/deployment-config.latest-version` annotation).
//!
//! Ordering:
//! - A record with a parsed version always beats a record without one
//! - Higher parsed version wins
//! - Ties (including all records unset) go to the lexically greatest name
//!
//! The result is independent of the iteration order of the input.

use k8s_openapi::api::core::v1::ReplicationController;
use std::cmp::Ordering;
use thiserror::Error;

/// Annotation holding the deployment config version of a replication controller.
pub const DEPLOYMENT_VERSION_ANNOTATION: &str = "openshift.io/deployment-config.latest-version";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum VersionError {
    #[error("record {name} has malformed version {value:?}")]
    MalformedVersion { name: String, value: String },
}

/// A record carrying an optional version marker.
pub trait Versioned {
    /// Raw version marker, `None` when no version has been recorded yet.
    fn version_marker(&self) -> Option<&str>;
}

impl Versioned for ReplicationController {
    fn version_marker(&self) -> Option<&str> {
        self.metadata
            .annotations
            .as_ref()
            .and_then(|annotations| annotations.get(DEPLOYMENT_VERSION_ANNOTATION))
            .map(String::as_str)
    }
}

/// Minimal named record with an optional version marker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionedRecord {
    pub name: String,
    pub version: Option<String>,
}

impl VersionedRecord {
    pub fn new(name: impl Into<String>, version: Option<&str>) -> Self {
        Self {
            name: name.into(),
            version: version.map(str::to_string),
        }
    }
}

impl Versioned for VersionedRecord {
    fn version_marker(&self) -> Option<&str> {
        self.version.as_deref()
    }
}

/// Returns the record with the highest version, `None` for an empty input.
///
/// Fails on the first record whose marker is not a non-negative integer.
pub fn select_most_recent<'a, I, K, R>(records: I) -> Result<Option<&'a R>, VersionError>
where
    I: IntoIterator<Item = (&'a K, &'a R)>,
    K: AsRef<str> + ?Sized + 'a,
    R: Versioned + 'a,
{
    let mut best: Option<(Option<u64>, &'a str, &'a R)> = None;

    for (name, record) in records {
        let name = name.as_ref();
        let version = parse_version(name, record.version_marker())?;

        let replace = match &best {
            None => true,
            Some((best_version, best_name, _)) => {
                rank(version, name, *best_version, best_name) == Ordering::Greater
            }
        };
        if replace {
            best = Some((version, name, record));
        }
    }

    Ok(best.map(|(_, _, record)| record))
}

fn parse_version(name: &str, marker: Option<&str>) -> Result<Option<u64>, VersionError> {
    marker
        .map(|value| {
            value
                .parse::<u64>()
                .map_err(|_| VersionError::MalformedVersion {
                    name: name.to_string(),
                    value: value.to_string(),
                })
        })
        .transpose()
}

/// `None` sorts below every `Some`, so unset records lose to any parsed version.
fn rank(version: Option<u64>, name: &str, other_version: Option<u64>, other_name: &str) -> Ordering {
    version
        .cmp(&other_version)
        .then_with(|| name.cmp(other_name))
}

#[cfg(test)]
mod tests {
    use super::*;
    use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;
    use std::collections::{BTreeMap, HashMap};

    fn rc(name: &str, version: &str) -> ReplicationController {
        let mut annotations = BTreeMap::new();
        if !version.is_empty() {
            annotations.insert(
                DEPLOYMENT_VERSION_ANNOTATION.to_string(),
                version.to_string(),
            );
        }
        ReplicationController {
            metadata: ObjectMeta {
                name: Some(name.to_string()),
                annotations: Some(annotations),
                ..Default::default()
            },
            ..Default::default()
        }
    }

    fn rcs(entries: &[(&str, &str)]) -> HashMap<String, ReplicationController> {
        entries
            .iter()
            .map(|(name, version)| (name.to_string(), rc(name, version)))
            .collect()
    }

    fn selected_name(rcs: &HashMap<String, ReplicationController>) -> Option<String> {
        select_most_recent(rcs)
            .expect("selection should succeed")
            .and_then(|rc| rc.metadata.name.clone())
    }

    #[test]
    fn test_basic() {
        let rcs = rcs(&[("world", "1"), ("hello", "2")]);
        assert_eq!(selected_name(&rcs).as_deref(), Some("hello"));
    }

    #[test]
    fn test_empty_returns_none() {
        let rcs = rcs(&[]);
        assert!(select_most_recent(&rcs).unwrap().is_none());
    }

    #[test]
    fn test_version_not_number() {
        let rcs = rcs(&[("world", "1"), ("hello", "Not a number")]);
        let err = select_most_recent(&rcs).unwrap_err();
        assert_eq!(
            err,
            VersionError::MalformedVersion {
                name: "hello".to_string(),
                value: "Not a number".to_string(),
            }
        );
    }

    #[test]
    fn test_first_without_version() {
        let rcs = rcs(&[("world", ""), ("hello", "2")]);
        assert_eq!(selected_name(&rcs).as_deref(), Some("hello"));
    }

    #[test]
    fn test_second_without_version() {
        let rcs = rcs(&[("world", "1"), ("hello", "")]);
        assert_eq!(selected_name(&rcs).as_deref(), Some("world"));
    }

    #[test]
    fn test_both_without_version() {
        let rcs = rcs(&[("hello", ""), ("world", "")]);
        assert_eq!(selected_name(&rcs).as_deref(), Some("world"));
    }

    #[test]
    fn test_unset_loses_to_zero() {
        let rcs = rcs(&[("zzz", ""), ("aaa", "0")]);
        assert_eq!(selected_name(&rcs).as_deref(), Some("aaa"));
    }

    #[test]
    fn test_equal_versions_break_on_name() {
        let rcs = rcs(&[("alpha", "3"), ("beta", "3"), ("gamma", "2")]);
        assert_eq!(selected_name(&rcs).as_deref(), Some("beta"));
    }

    #[test]
    fn test_negative_version_is_malformed() {
        let rcs = rcs(&[("world", "-1")]);
        assert!(select_most_recent(&rcs).is_err());
    }

    #[test]
    fn test_empty_marker_is_malformed() {
        let records = BTreeMap::from([("hello".to_string(), VersionedRecord::new("hello", Some("")))]);
        assert!(select_most_recent(&records).is_err());
    }

    #[test]
    fn test_error_wins_over_valid_records() {
        let records = BTreeMap::from([
            ("a".to_string(), VersionedRecord::new("a", Some("10"))),
            ("b".to_string(), VersionedRecord::new("b", Some("x"))),
            ("c".to_string(), VersionedRecord::new("c", None)),
        ]);
        assert!(select_most_recent(&records).is_err());
    }

    #[test]
    fn test_deterministic_across_insertion_order() {
        let forward: Vec<(String, VersionedRecord)> = ["a", "b", "c", "d"]
            .iter()
            .map(|name| (name.to_string(), VersionedRecord::new(*name, Some("7"))))
            .collect();
        let reverse: Vec<(String, VersionedRecord)> = forward.iter().rev().cloned().collect();

        let first = select_most_recent(forward.iter().map(|(k, v)| (k, v))).unwrap();
        let second = select_most_recent(reverse.iter().map(|(k, v)| (k, v))).unwrap();
        assert_eq!(first.map(|r| r.name.as_str()), Some("d"));
        assert_eq!(first, second);
    }

    #[test]
    fn test_higher_version_wins_regardless_of_name() {
        for (low, high) in [("a", "z"), ("z", "a")] {
            let records = BTreeMap::from([
                (low.to_string(), VersionedRecord::new(low, Some("1"))),
                (high.to_string(), VersionedRecord::new(high, Some("2"))),
            ]);
            let selected = select_most_recent(&records).unwrap().unwrap();
            assert_eq!(selected.name, high);
        }
    }
}
