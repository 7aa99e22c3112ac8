//! Persistence models for work item link types and their related resources

use crate::error::ControllerError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};
use uuid::Uuid;

/// Shape of the graph formed by links of one link type.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Topology {
    /// Any work item can link to any other, in both directions.
    Network,
    /// Like network, but links carry a direction.
    DirectedNetwork,
    /// Directed and acyclic.
    Dependency,
    /// Each work item has at most one parent.
    Tree,
}

impl Topology {
    /// Parses a wire value, rejecting anything outside the known topologies.
    pub fn parse(value: &str) -> Result<Self, ControllerError> {
        value.parse().map_err(|_| {
            ControllerError::bad_parameter(
                "data.attributes.topology",
                value,
                "one of network, directed_network, dependency, tree",
            )
        })
    }
}

/// Relation kind between two work items.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkItemLinkType {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    /// Optimistic locking counter, bumped on every save.
    pub version: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    /// Label read from source to target, e.g. "blocks".
    pub forward_name: String,
    /// Label read from target to source, e.g. "blocked by".
    pub reverse_name: String,
    pub topology: Topology,
    pub link_category_id: Uuid,
    pub space_id: Uuid,
}

impl WorkItemLinkType {
    /// Checks the constraints every stored link type must satisfy.
    pub fn validate(&self) -> Result<(), ControllerError> {
        if self.name.is_empty() {
            return Err(ControllerError::bad_parameter(
                "data.attributes.name",
                &self.name,
                "not empty",
            ));
        }
        if self.forward_name.is_empty() {
            return Err(ControllerError::bad_parameter(
                "data.attributes.forward_name",
                &self.forward_name,
                "not empty",
            ));
        }
        if self.reverse_name.is_empty() {
            return Err(ControllerError::bad_parameter(
                "data.attributes.reverse_name",
                &self.reverse_name,
                "not empty",
            ));
        }
        Ok(())
    }
}

/// Grouping of link types, e.g. "system" or "user".
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkItemLinkCategory {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub version: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Space {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub owner_id: Uuid,
    pub version: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_topology_wire_names() {
        assert_eq!(Topology::parse("network").unwrap(), Topology::Network);
        assert_eq!(
            Topology::parse("directed_network").unwrap(),
            Topology::DirectedNetwork
        );
        assert_eq!(Topology::Dependency.to_string(), "dependency");
        assert_eq!(Topology::Tree.to_string(), "tree");
    }

    #[test]
    fn test_topology_rejects_unknown() {
        let err = Topology::parse("star").unwrap_err();
        assert!(matches!(err, ControllerError::BadParameter { .. }));
    }
}
