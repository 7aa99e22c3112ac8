//! JSONAPI wire representation
//!
//! Documents exchanged with clients for work item link types, plus the
//! related resources placed in `included`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub const LINK_TYPES_TYPE: &str = "workitemlinktypes";
pub const LINK_CATEGORIES_TYPE: &str = "workitemlinkcategories";
pub const SPACES_TYPE: &str = "spaces";
pub const IDENTITIES_TYPE: &str = "identities";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenericLinks {
    #[serde(rename = "self", default, skip_serializing_if = "Option::is_none")]
    pub self_link: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub related: Option<String>,
}

impl GenericLinks {
    /// Links where `self` and `related` point at the same URL.
    pub fn same(url: String) -> Self {
        Self {
            self_link: Some(url.clone()),
            related: Some(url),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelationData {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<Uuid>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Relation {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<RelationData>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub links: Option<GenericLinks>,
}

impl Relation {
    pub fn new(kind: &str, id: Uuid, url: String) -> Self {
        Self {
            data: Some(RelationData {
                kind: kind.to_string(),
                id: Some(id),
            }),
            links: Some(GenericLinks::same(url)),
        }
    }

    pub fn id(&self) -> Option<Uuid> {
        self.data.as_ref().and_then(|data| data.id)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkItemLinkTypeAttributes {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<i32>,
    #[serde(rename = "created-at", default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(rename = "updated-at", default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub forward_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reverse_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub topology: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkItemLinkTypeRelationships {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub link_category: Option<Relation>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub space: Option<Relation>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkItemLinkTypeData {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<Uuid>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attributes: Option<WorkItemLinkTypeAttributes>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub relationships: Option<WorkItemLinkTypeRelationships>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub links: Option<GenericLinks>,
}

impl WorkItemLinkTypeData {
    pub fn link_category_id(&self) -> Option<Uuid> {
        self.relationships
            .as_ref()
            .and_then(|rel| rel.link_category.as_ref())
            .and_then(Relation::id)
    }

    pub fn space_id(&self) -> Option<Uuid> {
        self.relationships
            .as_ref()
            .and_then(|rel| rel.space.as_ref())
            .and_then(Relation::id)
    }
}

/// Resource attached to a document's `included` array.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Included {
    #[serde(rename = "workitemlinkcategories")]
    LinkCategory(LinkCategoryData),
    #[serde(rename = "spaces")]
    Space(SpaceData),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkCategoryData {
    pub id: Uuid,
    pub attributes: LinkCategoryAttributes,
    pub links: GenericLinks,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkCategoryAttributes {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub version: i32,
    #[serde(rename = "created-at")]
    pub created_at: DateTime<Utc>,
    #[serde(rename = "updated-at")]
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpaceData {
    pub id: Uuid,
    pub attributes: SpaceAttributes,
    pub relationships: SpaceRelationships,
    pub links: GenericLinks,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpaceAttributes {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub version: i32,
    #[serde(rename = "created-at")]
    pub created_at: DateTime<Utc>,
    #[serde(rename = "updated-at")]
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpaceRelationships {
    #[serde(rename = "owned-by")]
    pub owned_by: Relation,
}

/// Document carrying one link type.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkItemLinkTypeSingle {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<WorkItemLinkTypeData>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub included: Vec<Included>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListMeta {
    #[serde(rename = "totalCount")]
    pub total_count: usize,
}

/// Document carrying all link types of a space.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkItemLinkTypeList {
    pub data: Vec<WorkItemLinkTypeData>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub included: Vec<Included>,
    pub meta: ListMeta,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorObject {
    pub status: String,
    pub title: String,
    pub detail: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorDocument {
    pub errors: Vec<ErrorObject>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_payload_field_names() {
        let single: WorkItemLinkTypeSingle = serde_json::from_value(serde_json::json!({
            "data": {
                "type": "workitemlinktypes",
                "attributes": {
                    "name": "Blocker",
                    "forward_name": "blocks",
                    "reverse_name": "blocked by",
                    "topology": "network",
                    "version": 0
                },
                "relationships": {
                    "link_category": {
                        "data": { "type": "workitemlinkcategories", "id": "6c5610be-30b2-4880-9fec-81e4f8e4fd76" }
                    }
                }
            }
        }))
        .unwrap();

        let data = single.data.unwrap();
        let attrs = data.attributes.as_ref().unwrap();
        assert_eq!(attrs.forward_name.as_deref(), Some("blocks"));
        assert_eq!(attrs.version, Some(0));
        assert!(data.link_category_id().is_some());
        assert!(data.space_id().is_none());
    }

    #[test]
    fn test_included_is_tagged_by_type() {
        let id = Uuid::nil();
        let now = Utc::now();
        let included = Included::LinkCategory(LinkCategoryData {
            id,
            attributes: LinkCategoryAttributes {
                name: "system".to_string(),
                description: None,
                version: 0,
                created_at: now,
                updated_at: now,
            },
            links: GenericLinks::same("http://localhost/api/workitemlinkcategories/x".to_string()),
        });

        let value = serde_json::to_value(&included).unwrap();
        assert_eq!(value["type"], "workitemlinkcategories");
        assert_eq!(value["attributes"]["name"], "system");
        assert_eq!(value["links"]["self"], value["links"]["related"]);
    }
}
