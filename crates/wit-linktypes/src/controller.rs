//! Work Item Link Type Controller
//!
//! Create, show, list, update and delete actions for the
//! `workitemlinktypes` resource of a space. Routing and identity extraction
//! happen upstream: actions receive the already-parsed request, path
//! parameters and the caller's identity.
//!
//! Every successful response is enriched: data entries get `self`/`related`
//! links, and the related link categories and spaces are appended to
//! `included`, each distinct resource once.

use crate::conditional::CacheHeaders;
use crate::config::ControllerConfig;
use crate::convert::{
    absolute_url, link_category_from_model, link_type_from_model, link_type_href,
    link_type_to_model, link_types_from_models, space_from_model, space_href,
};
use crate::error::{ControllerError, Result};
use crate::jsonapi::{
    GenericLinks, Included, Relation, WorkItemLinkTypeData, WorkItemLinkTypeList,
    WorkItemLinkTypeSingle, SPACES_TYPE,
};
use crate::metrics::{describe_metrics, record_error, record_not_modified, record_request};
use crate::model::WorkItemLinkType;
use crate::store::Application;
use http::header::LOCATION;
use http::{HeaderValue, Request, Response, StatusCode};
use std::collections::BTreeSet;
use std::sync::{Arc, Once};
use tracing::{debug, instrument, warn};
use uuid::Uuid;

/// Response of an action; the body is `None` for 304 and delete answers.
pub type ActionResponse<T> = Response<Option<T>>;

static DESCRIBE_METRICS: Once = Once::new();

pub struct WorkItemLinkTypeController<A: ?Sized> {
    app: Arc<A>,
    config: ControllerConfig,
}

impl<A: Application + ?Sized> WorkItemLinkTypeController<A> {
    pub fn new(app: Arc<A>, config: ControllerConfig) -> Self {
        DESCRIBE_METRICS.call_once(describe_metrics);
        Self { app, config }
    }

    pub fn config(&self) -> &ControllerConfig {
        &self.config
    }

    /// Creates a link type in `space_id`, overriding any space in the payload.
    #[instrument(skip(self, request))]
    pub async fn create(
        &self,
        request: &Request<WorkItemLinkTypeSingle>,
        space_id: Uuid,
        identity: Option<Uuid>,
    ) -> Result<ActionResponse<WorkItemLinkTypeSingle>> {
        let result = self.create_link_type(request, space_id, identity).await;
        observe("create", result)
    }

    async fn create_link_type(
        &self,
        request: &Request<WorkItemLinkTypeSingle>,
        space_id: Uuid,
        identity: Option<Uuid>,
    ) -> Result<ActionResponse<WorkItemLinkTypeSingle>> {
        self.check_mutations_enabled()?;

        let mut payload = request.body().clone();
        if let Some(relationships) = payload
            .data
            .as_mut()
            .and_then(|data| data.relationships.as_mut())
        {
            let space_url = absolute_url(request, &space_href(space_id));
            relationships.space = Some(Relation::new(SPACES_TYPE, space_id, space_url));
        }

        let mut model = link_type_to_model(&payload)?;
        model.space_id = space_id;
        require_identity(identity)?;

        // Referenced resources are resolved before anything is written
        let included = self.included_for(request, &model).await?;
        let created = self.app.link_types().create(model).await?;
        debug!(id = %created.id, name = %created.name, "Created link type");

        let single = with_included(request, created.space_id, &created, included)?;

        let location = link_type_href(created.space_id, created.id);
        let mut response = respond(StatusCode::CREATED, Some(single));
        response.headers_mut().insert(
            LOCATION,
            HeaderValue::from_str(&location)
                .map_err(|e| ControllerError::Internal(e.to_string()))?,
        );
        Ok(response)
    }

    /// Shows one link type, honoring conditional request headers.
    #[instrument(skip(self, request))]
    pub async fn show<B>(
        &self,
        request: &Request<B>,
        space_id: Uuid,
        id: Uuid,
    ) -> Result<ActionResponse<WorkItemLinkTypeSingle>> {
        let result = self.show_link_type(request, space_id, id).await;
        observe("show", result)
    }

    async fn show_link_type<B>(
        &self,
        request: &Request<B>,
        space_id: Uuid,
        id: Uuid,
    ) -> Result<ActionResponse<WorkItemLinkTypeSingle>> {
        let model = self.app.link_types().load(id).await?;

        let cache = CacheHeaders::for_entity(&model, &self.config.cache_control_link_type);
        if cache.is_not_modified(request.headers()) {
            record_not_modified("show");
            return not_modified(&cache);
        }

        let mut single = link_type_from_model(request, &model);
        self.enrich_single(request, space_id, &mut single)
            .await
            .map_err(|e| ControllerError::Internal(format!("Failed to enrich link type: {}", e)))?;

        let mut response = respond(StatusCode::OK, Some(single));
        cache.apply(response.headers_mut())?;
        Ok(response)
    }

    /// Lists all link types of `space_id`, honoring conditional request headers.
    #[instrument(skip(self, request))]
    pub async fn list<B>(
        &self,
        request: &Request<B>,
        space_id: Uuid,
    ) -> Result<ActionResponse<WorkItemLinkTypeList>> {
        let result = self.list_link_types(request, space_id).await;
        observe("list", result)
    }

    async fn list_link_types<B>(
        &self,
        request: &Request<B>,
        space_id: Uuid,
    ) -> Result<ActionResponse<WorkItemLinkTypeList>> {
        let models = self.app.link_types().list(space_id).await?;

        let cache = CacheHeaders::for_entities(&models, &self.config.cache_control_link_types);
        if cache.is_not_modified(request.headers()) {
            record_not_modified("list");
            return not_modified(&cache);
        }

        let mut list = link_types_from_models(request, &models);
        self.enrich_list(request, space_id, &mut list)
            .await
            .map_err(|e| ControllerError::Internal(format!("Failed to enrich link types: {}", e)))?;

        let mut response = respond(StatusCode::OK, Some(list));
        cache.apply(response.headers_mut())?;
        Ok(response)
    }

    /// Replaces a link type; the payload must carry its ID and current version.
    #[instrument(skip(self, request))]
    pub async fn update(
        &self,
        request: &Request<WorkItemLinkTypeSingle>,
        space_id: Uuid,
        identity: Option<Uuid>,
    ) -> Result<ActionResponse<WorkItemLinkTypeSingle>> {
        let result = self.update_link_type(request, space_id, identity).await;
        observe("update", result)
    }

    async fn update_link_type(
        &self,
        request: &Request<WorkItemLinkTypeSingle>,
        space_id: Uuid,
        identity: Option<Uuid>,
    ) -> Result<ActionResponse<WorkItemLinkTypeSingle>> {
        self.check_mutations_enabled()?;
        require_identity(identity)?;

        let payload = request.body();
        if payload.data.as_ref().and_then(|data| data.id).is_none() {
            return Err(ControllerError::bad_parameter(
                "data.id",
                "<nil>",
                "not <nil>",
            ));
        }

        let mut model = link_type_to_model(payload)?;
        match payload.data.as_ref().and_then(|data| data.space_id()) {
            None => model.space_id = space_id,
            Some(payload_space) if payload_space != space_id => {
                return Err(ControllerError::bad_parameter(
                    "data.relationships.space",
                    payload_space.to_string(),
                    space_id.to_string(),
                ))
            }
            Some(_) => {}
        }

        let included = self.included_for(request, &model).await?;
        let saved = self.app.link_types().save(model).await?;
        debug!(id = %saved.id, version = saved.version, "Updated link type");

        let single = with_included(request, space_id, &saved, included)?;
        Ok(respond(StatusCode::OK, Some(single)))
    }

    #[instrument(skip(self))]
    pub async fn delete(
        &self,
        space_id: Uuid,
        id: Uuid,
    ) -> Result<ActionResponse<WorkItemLinkTypeSingle>> {
        let result = self.delete_link_type(space_id, id).await;
        observe("delete", result)
    }

    async fn delete_link_type(
        &self,
        space_id: Uuid,
        id: Uuid,
    ) -> Result<ActionResponse<WorkItemLinkTypeSingle>> {
        self.check_mutations_enabled()?;
        self.app.link_types().delete(space_id, id).await?;
        debug!(id = %id, "Deleted link type");
        Ok(respond(StatusCode::OK, None))
    }

    fn check_mutations_enabled(&self) -> Result<()> {
        if self.config.mutations_enabled {
            Ok(())
        } else {
            Err(ControllerError::MethodNotAllowed)
        }
    }

    async fn enrich_single<B>(
        &self,
        request: &Request<B>,
        space_id: Uuid,
        single: &mut WorkItemLinkTypeSingle,
    ) -> Result<()> {
        let Some(data) = single.data.as_mut() else {
            return Ok(());
        };
        add_links(request, space_id, data)?;

        let category_id = related_id(data.link_category_id(), "data.relationships.link_category")?;
        let related_space_id = related_id(data.space_id(), "data.relationships.space")?;
        let included = self
            .included(
                request,
                BTreeSet::from([category_id]),
                BTreeSet::from([related_space_id]),
            )
            .await?;
        single.included.extend(included);
        Ok(())
    }

    async fn enrich_list<B>(
        &self,
        request: &Request<B>,
        space_id: Uuid,
        list: &mut WorkItemLinkTypeList,
    ) -> Result<()> {
        let mut category_ids = BTreeSet::new();
        let mut space_ids = BTreeSet::new();
        for data in &mut list.data {
            add_links(request, space_id, data)?;
            category_ids.insert(related_id(
                data.link_category_id(),
                "data.relationships.link_category",
            )?);
            space_ids.insert(related_id(data.space_id(), "data.relationships.space")?);
        }

        let included = self.included(request, category_ids, space_ids).await?;
        list.included.extend(included);
        Ok(())
    }

    /// Category and space a link type refers to, as `included` entries.
    async fn included_for<B>(
        &self,
        request: &Request<B>,
        link_type: &WorkItemLinkType,
    ) -> Result<Vec<Included>> {
        self.included(
            request,
            BTreeSet::from([link_type.link_category_id]),
            BTreeSet::from([link_type.space_id]),
        )
        .await
    }

    /// Loads each related category and space once, categories first.
    async fn included<B>(
        &self,
        request: &Request<B>,
        category_ids: BTreeSet<Uuid>,
        space_ids: BTreeSet<Uuid>,
    ) -> Result<Vec<Included>> {
        let mut included = Vec::with_capacity(category_ids.len() + space_ids.len());
        for category_id in category_ids {
            let category = self.app.link_categories().load(category_id).await?;
            included.push(link_category_from_model(request, &category));
        }
        for space_id in space_ids {
            let space = self.app.spaces().load(space_id).await?;
            included.push(space_from_model(request, &space));
        }
        Ok(included)
    }
}

fn with_included<B>(
    request: &Request<B>,
    space_id: Uuid,
    link_type: &WorkItemLinkType,
    included: Vec<Included>,
) -> Result<WorkItemLinkTypeSingle> {
    let mut single = link_type_from_model(request, link_type);
    if let Some(data) = single.data.as_mut() {
        add_links(request, space_id, data)?;
    }
    single.included = included;
    Ok(single)
}

fn add_links<B>(request: &Request<B>, space_id: Uuid, data: &mut WorkItemLinkTypeData) -> Result<()> {
    let id = related_id(data.id, "data.id")?;
    let url = absolute_url(request, &link_type_href(space_id, id));
    data.links = Some(GenericLinks::same(url));
    Ok(())
}

fn related_id(id: Option<Uuid>, what: &str) -> Result<Uuid> {
    id.ok_or_else(|| ControllerError::Internal(format!("{} has no id", what)))
}

fn require_identity(identity: Option<Uuid>) -> Result<Uuid> {
    identity.ok_or_else(|| ControllerError::Unauthorized("missing identity".to_string()))
}

fn respond<T>(status: StatusCode, body: Option<T>) -> ActionResponse<T> {
    let mut response = Response::new(body);
    *response.status_mut() = status;
    response
}

fn not_modified<T>(cache: &CacheHeaders) -> Result<ActionResponse<T>> {
    let mut response = respond(StatusCode::NOT_MODIFIED, None);
    cache.apply(response.headers_mut())?;
    Ok(response)
}

fn observe<T>(action: &'static str, result: Result<T>) -> Result<T> {
    record_request(action);
    if let Err(e) = &result {
        let status = e.status();
        record_error(action, status);
        if status.is_server_error() {
            warn!(action, error = %e, "Link type action failed");
        } else {
            debug!(action, error = %e, "Link type action rejected");
        }
    }
    result
}
