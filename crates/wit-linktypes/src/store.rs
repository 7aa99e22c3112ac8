//! Repository Boundary
//!
//! The controller reaches persistence only through these traits. Transaction
//! handling belongs to the implementor; `InMemoryStore` backs the tests and
//! local tooling.

use crate::error::{ControllerError, Result};
use crate::model::{Space, WorkItemLinkCategory, WorkItemLinkType};
use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use tokio::sync::RwLock;
use uuid::Uuid;

pub const LINK_TYPE_ENTITY: &str = "work item link type";
pub const LINK_CATEGORY_ENTITY: &str = "work item link category";
pub const SPACE_ENTITY: &str = "space";

#[async_trait]
pub trait LinkTypeRepository: Send + Sync {
    /// Stores a new link type, assigning an ID when the given one is nil.
    async fn create(&self, link_type: WorkItemLinkType) -> Result<WorkItemLinkType>;
    async fn load(&self, id: Uuid) -> Result<WorkItemLinkType>;
    /// All link types of a space, ordered by name.
    async fn list(&self, space_id: Uuid) -> Result<Vec<WorkItemLinkType>>;
    /// Replaces a stored link type. The given version must match the stored one.
    async fn save(&self, link_type: WorkItemLinkType) -> Result<WorkItemLinkType>;
    async fn delete(&self, space_id: Uuid, id: Uuid) -> Result<()>;
}

#[async_trait]
pub trait LinkCategoryRepository: Send + Sync {
    async fn load(&self, id: Uuid) -> Result<WorkItemLinkCategory>;
}

#[async_trait]
pub trait SpaceRepository: Send + Sync {
    async fn load(&self, id: Uuid) -> Result<Space>;
}

/// Access to every repository the controller needs.
pub trait Application: Send + Sync {
    fn link_types(&self) -> &dyn LinkTypeRepository;
    fn link_categories(&self) -> &dyn LinkCategoryRepository;
    fn spaces(&self) -> &dyn SpaceRepository;
}

#[derive(Default)]
pub struct InMemoryLinkTypes {
    rows: RwLock<HashMap<Uuid, WorkItemLinkType>>,
}

#[derive(Default)]
pub struct InMemoryLinkCategories {
    rows: RwLock<HashMap<Uuid, WorkItemLinkCategory>>,
}

#[derive(Default)]
pub struct InMemorySpaces {
    rows: RwLock<HashMap<Uuid, Space>>,
}

/// In-process implementation of every repository.
#[derive(Default)]
pub struct InMemoryStore {
    link_types: InMemoryLinkTypes,
    link_categories: InMemoryLinkCategories,
    spaces: InMemorySpaces,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts or replaces a link type as-is, bypassing validation and versioning.
    pub async fn insert_link_type(&self, link_type: WorkItemLinkType) {
        self.link_types
            .rows
            .write()
            .await
            .insert(link_type.id, link_type);
    }

    pub async fn insert_link_category(&self, category: WorkItemLinkCategory) {
        self.link_categories
            .rows
            .write()
            .await
            .insert(category.id, category);
    }

    pub async fn insert_space(&self, space: Space) {
        self.spaces.rows.write().await.insert(space.id, space);
    }
}

impl Application for InMemoryStore {
    fn link_types(&self) -> &dyn LinkTypeRepository {
        &self.link_types
    }

    fn link_categories(&self) -> &dyn LinkCategoryRepository {
        &self.link_categories
    }

    fn spaces(&self) -> &dyn SpaceRepository {
        &self.spaces
    }
}

impl InMemoryLinkTypes {
    fn check_unique_name(
        rows: &HashMap<Uuid, WorkItemLinkType>,
        link_type: &WorkItemLinkType,
    ) -> Result<()> {
        let taken = rows.values().any(|existing| {
            existing.id != link_type.id
                && existing.space_id == link_type.space_id
                && existing.name == link_type.name
        });
        if taken {
            return Err(ControllerError::DataConflict(format!(
                "{} named '{}' already exists in space {}",
                LINK_TYPE_ENTITY, link_type.name, link_type.space_id
            )));
        }
        Ok(())
    }
}

#[async_trait]
impl LinkTypeRepository for InMemoryLinkTypes {
    async fn create(&self, mut link_type: WorkItemLinkType) -> Result<WorkItemLinkType> {
        link_type.validate()?;
        if link_type.id.is_nil() {
            link_type.id = Uuid::new_v4();
        }

        let mut rows = self.rows.write().await;
        if rows.contains_key(&link_type.id) {
            return Err(ControllerError::DataConflict(format!(
                "{} with id '{}' already exists",
                LINK_TYPE_ENTITY, link_type.id
            )));
        }
        Self::check_unique_name(&rows, &link_type)?;

        let now = Utc::now();
        link_type.version = 0;
        link_type.created_at = now;
        link_type.updated_at = now;
        rows.insert(link_type.id, link_type.clone());
        Ok(link_type)
    }

    async fn load(&self, id: Uuid) -> Result<WorkItemLinkType> {
        self.rows
            .read()
            .await
            .get(&id)
            .cloned()
            .ok_or_else(|| ControllerError::not_found(LINK_TYPE_ENTITY, id))
    }

    async fn list(&self, space_id: Uuid) -> Result<Vec<WorkItemLinkType>> {
        let mut link_types: Vec<WorkItemLinkType> = self
            .rows
            .read()
            .await
            .values()
            .filter(|link_type| link_type.space_id == space_id)
            .cloned()
            .collect();
        link_types.sort_by(|a, b| a.name.cmp(&b.name).then_with(|| a.id.cmp(&b.id)));
        Ok(link_types)
    }

    async fn save(&self, mut link_type: WorkItemLinkType) -> Result<WorkItemLinkType> {
        link_type.validate()?;

        let mut rows = self.rows.write().await;
        let existing = rows
            .get(&link_type.id)
            .ok_or_else(|| ControllerError::not_found(LINK_TYPE_ENTITY, link_type.id))?;
        if existing.version != link_type.version {
            return Err(ControllerError::VersionConflict {
                entity: LINK_TYPE_ENTITY,
                id: link_type.id.to_string(),
                expected: link_type.version,
                actual: existing.version,
            });
        }
        Self::check_unique_name(&rows, &link_type)?;

        link_type.version = existing.version + 1;
        link_type.created_at = existing.created_at;
        link_type.updated_at = Utc::now();
        rows.insert(link_type.id, link_type.clone());
        Ok(link_type)
    }

    async fn delete(&self, space_id: Uuid, id: Uuid) -> Result<()> {
        let mut rows = self.rows.write().await;
        match rows.get(&id) {
            Some(existing) if existing.space_id == space_id => {
                rows.remove(&id);
                Ok(())
            }
            _ => Err(ControllerError::not_found(LINK_TYPE_ENTITY, id)),
        }
    }
}

#[async_trait]
impl LinkCategoryRepository for InMemoryLinkCategories {
    async fn load(&self, id: Uuid) -> Result<WorkItemLinkCategory> {
        self.rows
            .read()
            .await
            .get(&id)
            .cloned()
            .ok_or_else(|| ControllerError::not_found(LINK_CATEGORY_ENTITY, id))
    }
}

#[async_trait]
impl SpaceRepository for InMemorySpaces {
    async fn load(&self, id: Uuid) -> Result<Space> {
        self.rows
            .read()
            .await
            .get(&id)
            .cloned()
            .ok_or_else(|| ControllerError::not_found(SPACE_ENTITY, id))
    }
}
