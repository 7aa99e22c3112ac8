//! wit-linktypes
//!
//! JSONAPI controller for the work item link type resource. Converts between
//! wire documents and persistence models, validates requests, enriches
//! responses with related categories and spaces, and answers conditional
//! requests from `ETag` / `Last-Modified` validators.

pub mod conditional;
pub mod config;
pub mod controller;
pub mod convert;
pub mod error;
pub mod jsonapi;
pub mod metrics;
pub mod model;
pub mod store;

pub use config::ControllerConfig;
pub use controller::{ActionResponse, WorkItemLinkTypeController};
pub use error::{ControllerError, Result};
pub use model::{Space, Topology, WorkItemLinkCategory, WorkItemLinkType};
pub use store::{
    Application, InMemoryStore, LinkCategoryRepository, LinkTypeRepository, SpaceRepository,
};
