//! Conversion between persistence models and JSONAPI documents

use crate::error::{ControllerError, Result};
use crate::jsonapi::{
    GenericLinks, Included, LinkCategoryAttributes, LinkCategoryData, ListMeta, Relation,
    SpaceAttributes, SpaceData, SpaceRelationships, WorkItemLinkTypeAttributes,
    WorkItemLinkTypeData, WorkItemLinkTypeList, WorkItemLinkTypeRelationships,
    WorkItemLinkTypeSingle, IDENTITIES_TYPE, LINK_CATEGORIES_TYPE, LINK_TYPES_TYPE, SPACES_TYPE,
};
use crate::model::{Space, Topology, WorkItemLinkCategory, WorkItemLinkType};
use chrono::{DateTime, Utc};
use http::header::HOST;
use http::Request;
use uuid::Uuid;

pub fn space_href(space_id: Uuid) -> String {
    format!("/api/spaces/{}", space_id)
}

pub fn link_category_href(category_id: Uuid) -> String {
    format!("/api/workitemlinkcategories/{}", category_id)
}

pub fn link_type_href(space_id: Uuid, link_type_id: Uuid) -> String {
    format!("/api/spaces/{}/workitemlinktypes/{}", space_id, link_type_id)
}

pub fn identity_href(identity_id: Uuid) -> String {
    format!("/api/users/{}", identity_id)
}

/// Absolute URL for `path` on the host the request was addressed to.
///
/// Honors `X-Forwarded-Proto` so links stay correct behind a TLS proxy.
pub fn absolute_url<B>(request: &Request<B>, path: &str) -> String {
    let scheme = request
        .headers()
        .get("x-forwarded-proto")
        .and_then(|value| value.to_str().ok())
        .or_else(|| request.uri().scheme_str())
        .unwrap_or("http");
    let host = request
        .headers()
        .get(HOST)
        .and_then(|value| value.to_str().ok())
        .or_else(|| request.uri().authority().map(|authority| authority.as_str()))
        .unwrap_or("localhost");
    format!("{}://{}{}", scheme, host, path)
}

/// Wire representation of a stored link type, without enrichment.
pub fn link_type_from_model<B>(
    request: &Request<B>,
    link_type: &WorkItemLinkType,
) -> WorkItemLinkTypeSingle {
    WorkItemLinkTypeSingle {
        data: Some(link_type_data_from_model(request, link_type)),
        included: Vec::new(),
    }
}

fn link_type_data_from_model<B>(
    request: &Request<B>,
    link_type: &WorkItemLinkType,
) -> WorkItemLinkTypeData {
    let space_url = absolute_url(request, &space_href(link_type.space_id));
    let category_url = absolute_url(request, &link_category_href(link_type.link_category_id));

    WorkItemLinkTypeData {
        kind: LINK_TYPES_TYPE.to_string(),
        id: Some(link_type.id),
        attributes: Some(WorkItemLinkTypeAttributes {
            name: Some(link_type.name.clone()),
            description: link_type.description.clone(),
            version: Some(link_type.version),
            created_at: Some(link_type.created_at),
            updated_at: Some(link_type.updated_at),
            forward_name: Some(link_type.forward_name.clone()),
            reverse_name: Some(link_type.reverse_name.clone()),
            topology: Some(link_type.topology.to_string()),
        }),
        relationships: Some(WorkItemLinkTypeRelationships {
            link_category: Some(Relation::new(
                LINK_CATEGORIES_TYPE,
                link_type.link_category_id,
                category_url,
            )),
            space: Some(Relation::new(SPACES_TYPE, link_type.space_id, space_url)),
        }),
        links: None,
    }
}

/// List document for `link_types`; `meta.totalCount` is the number of entries.
pub fn link_types_from_models<B>(
    request: &Request<B>,
    link_types: &[WorkItemLinkType],
) -> WorkItemLinkTypeList {
    WorkItemLinkTypeList {
        data: link_types
            .iter()
            .map(|link_type| link_type_data_from_model(request, link_type))
            .collect(),
        included: Vec::new(),
        meta: ListMeta {
            total_count: link_types.len(),
        },
    }
}

/// Converts an incoming document to the model.
///
/// Fields missing from the payload keep their empty value; present names
/// must not be empty and a present topology must be known. The topology
/// itself is required since the model has no "unset" topology.
pub fn link_type_to_model(single: &WorkItemLinkTypeSingle) -> Result<WorkItemLinkType> {
    let data = single
        .data
        .as_ref()
        .ok_or_else(|| ControllerError::bad_parameter("data", "<nil>", "not <nil>"))?;
    let attrs = data
        .attributes
        .as_ref()
        .ok_or_else(|| ControllerError::bad_parameter("data.attributes", "<nil>", "not <nil>"))?;
    if data.relationships.is_none() {
        return Err(ControllerError::bad_parameter(
            "data.relationships",
            "<nil>",
            "not <nil>",
        ));
    }

    let topology = match &attrs.topology {
        Some(topology) => Topology::parse(topology)?,
        None => {
            return Err(ControllerError::bad_parameter(
                "data.attributes.topology",
                "<nil>",
                "not <nil>",
            ))
        }
    };

    let epoch = DateTime::<Utc>::default();
    Ok(WorkItemLinkType {
        id: data.id.unwrap_or_else(Uuid::nil),
        name: non_empty("data.attributes.name", &attrs.name)?,
        description: attrs.description.clone(),
        version: attrs.version.unwrap_or_default(),
        created_at: attrs.created_at.unwrap_or(epoch),
        updated_at: attrs.updated_at.unwrap_or(epoch),
        forward_name: non_empty("data.attributes.forward_name", &attrs.forward_name)?,
        reverse_name: non_empty("data.attributes.reverse_name", &attrs.reverse_name)?,
        topology,
        link_category_id: data.link_category_id().unwrap_or_else(Uuid::nil),
        space_id: data.space_id().unwrap_or_else(Uuid::nil),
    })
}

/// Absent stays empty, present must not be.
fn non_empty(parameter: &str, value: &Option<String>) -> Result<String> {
    match value {
        Some(value) if value.is_empty() => {
            Err(ControllerError::bad_parameter(parameter, value, "not empty"))
        }
        Some(value) => Ok(value.clone()),
        None => Ok(String::new()),
    }
}

pub fn link_category_from_model<B>(
    request: &Request<B>,
    category: &WorkItemLinkCategory,
) -> Included {
    Included::LinkCategory(LinkCategoryData {
        id: category.id,
        attributes: LinkCategoryAttributes {
            name: category.name.clone(),
            description: category.description.clone(),
            version: category.version,
            created_at: category.created_at,
            updated_at: category.updated_at,
        },
        links: GenericLinks::same(absolute_url(request, &link_category_href(category.id))),
    })
}

pub fn space_from_model<B>(request: &Request<B>, space: &Space) -> Included {
    Included::Space(SpaceData {
        id: space.id,
        attributes: SpaceAttributes {
            name: space.name.clone(),
            description: space.description.clone(),
            version: space.version,
            created_at: space.created_at,
            updated_at: space.updated_at,
        },
        relationships: SpaceRelationships {
            owned_by: Relation::new(
                IDENTITIES_TYPE,
                space.owner_id,
                absolute_url(request, &identity_href(space.owner_id)),
            ),
        },
        links: GenericLinks::same(absolute_url(request, &space_href(space.id))),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request() -> Request<()> {
        Request::builder()
            .uri("/api/spaces")
            .header(HOST, "api.example.com")
            .body(())
            .unwrap()
    }

    fn link_type() -> WorkItemLinkType {
        let now = Utc::now();
        WorkItemLinkType {
            id: Uuid::new_v4(),
            name: "Blocker".to_string(),
            description: Some("One work item blocks another".to_string()),
            version: 3,
            created_at: now,
            updated_at: now,
            forward_name: "blocks".to_string(),
            reverse_name: "blocked by".to_string(),
            topology: Topology::Network,
            link_category_id: Uuid::new_v4(),
            space_id: Uuid::new_v4(),
        }
    }

    #[test]
    fn test_absolute_url_uses_host_and_forwarded_proto() {
        let mut req = request();
        assert_eq!(absolute_url(&req, "/api/x"), "http://api.example.com/api/x");

        req.headers_mut()
            .insert("x-forwarded-proto", "https".parse().unwrap());
        assert_eq!(absolute_url(&req, "/api/x"), "https://api.example.com/api/x");
    }

    #[test]
    fn test_from_model_sets_relationships() {
        let model = link_type();
        let single = link_type_from_model(&request(), &model);
        let data = single.data.unwrap();

        assert_eq!(data.kind, "workitemlinktypes");
        assert_eq!(data.id, Some(model.id));
        assert_eq!(data.link_category_id(), Some(model.link_category_id));
        assert_eq!(data.space_id(), Some(model.space_id));

        let category = data.relationships.unwrap().link_category.unwrap();
        let links = category.links.unwrap();
        assert_eq!(
            links.self_link.as_deref(),
            Some(format!("http://api.example.com/api/workitemlinkcategories/{}", model.link_category_id).as_str())
        );
        assert_eq!(links.self_link, links.related);
        assert_eq!(
            data.attributes.unwrap().topology.as_deref(),
            Some("network")
        );
    }

    #[test]
    fn test_model_round_trip_through_wire() {
        let model = link_type();
        let single = link_type_from_model(&request(), &model);
        assert_eq!(link_type_to_model(&single).unwrap(), model);
    }

    #[test]
    fn test_to_model_requires_data_attributes_relationships() {
        let model = link_type();
        let mut single = link_type_from_model(&request(), &model);

        single.data.as_mut().unwrap().relationships = None;
        assert!(matches!(
            link_type_to_model(&single),
            Err(ControllerError::BadParameter { parameter, .. }) if parameter == "data.relationships"
        ));

        single.data.as_mut().unwrap().attributes = None;
        assert!(matches!(
            link_type_to_model(&single),
            Err(ControllerError::BadParameter { parameter, .. }) if parameter == "data.attributes"
        ));

        single.data = None;
        assert!(matches!(
            link_type_to_model(&single),
            Err(ControllerError::BadParameter { parameter, .. }) if parameter == "data"
        ));
    }

    #[test]
    fn test_to_model_rejects_empty_names() {
        for field in ["name", "forward_name", "reverse_name"] {
            let mut single = link_type_from_model(&request(), &link_type());
            let attrs = single.data.as_mut().unwrap().attributes.as_mut().unwrap();
            match field {
                "name" => attrs.name = Some(String::new()),
                "forward_name" => attrs.forward_name = Some(String::new()),
                _ => attrs.reverse_name = Some(String::new()),
            }
            let err = link_type_to_model(&single).unwrap_err();
            assert_eq!(
                err,
                ControllerError::bad_parameter(format!("data.attributes.{}", field), "", "not empty")
            );
        }
    }

    #[test]
    fn test_to_model_rejects_unknown_topology() {
        let mut single = link_type_from_model(&request(), &link_type());
        single
            .data
            .as_mut()
            .unwrap()
            .attributes
            .as_mut()
            .unwrap()
            .topology = Some("star".to_string());
        assert!(link_type_to_model(&single).is_err());
    }

    #[test]
    fn test_to_model_keeps_absent_fields_empty() {
        let mut single = link_type_from_model(&request(), &link_type());
        let data = single.data.as_mut().unwrap();
        data.id = None;
        let attrs = data.attributes.as_mut().unwrap();
        attrs.name = None;
        attrs.description = None;

        let model = link_type_to_model(&single).unwrap();
        assert!(model.id.is_nil());
        assert!(model.name.is_empty());
        assert!(model.description.is_none());
    }

    #[test]
    fn test_list_total_count() {
        let models = vec![link_type(), link_type()];
        let list = link_types_from_models(&request(), &models);
        assert_eq!(list.meta.total_count, 2);
        assert_eq!(list.data.len(), 2);
    }
}
