//! Controller errors and their JSONAPI rendering

use crate::jsonapi::{ErrorDocument, ErrorObject};
use http::{Response, StatusCode};
use thiserror::Error;

pub type Result<T, E = ControllerError> = std::result::Result<T, E>;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ControllerError {
    #[error("bad value for parameter '{parameter}': {value:?} (expected {expected})")]
    BadParameter {
        parameter: String,
        value: String,
        expected: String,
    },
    #[error("{entity} with id '{id}' not found")]
    NotFound { entity: &'static str, id: String },
    #[error("unauthorized: {0}")]
    Unauthorized(String),
    #[error("method not allowed")]
    MethodNotAllowed,
    #[error("version conflict on {entity} '{id}': expected version {expected}, found {actual}")]
    VersionConflict {
        entity: &'static str,
        id: String,
        expected: i32,
        actual: i32,
    },
    #[error("data conflict: {0}")]
    DataConflict(String),
    #[error("internal error: {0}")]
    Internal(String),
}

impl ControllerError {
    pub fn bad_parameter(
        parameter: impl Into<String>,
        value: impl Into<String>,
        expected: impl Into<String>,
    ) -> Self {
        Self::BadParameter {
            parameter: parameter.into(),
            value: value.into(),
            expected: expected.into(),
        }
    }

    pub fn not_found(entity: &'static str, id: impl ToString) -> Self {
        Self::NotFound {
            entity,
            id: id.to_string(),
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            Self::BadParameter { .. } => StatusCode::BAD_REQUEST,
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::NotFound { .. } => StatusCode::NOT_FOUND,
            Self::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            Self::VersionConflict { .. } | Self::DataConflict(_) => StatusCode::CONFLICT,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// JSONAPI error document with the matching status code.
    pub fn into_response(self) -> Response<ErrorDocument> {
        let status = self.status();
        let document = ErrorDocument {
            errors: vec![ErrorObject {
                status: status.as_str().to_string(),
                title: status.canonical_reason().unwrap_or("Error").to_string(),
                detail: self.to_string(),
            }],
        };
        let mut response = Response::new(document);
        *response.status_mut() = status;
        response
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(
            ControllerError::bad_parameter("data", "", "not <nil>").status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ControllerError::not_found("work item link type", "x").status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            ControllerError::MethodNotAllowed.status(),
            StatusCode::METHOD_NOT_ALLOWED
        );
    }

    #[test]
    fn test_error_document() {
        let response = ControllerError::Unauthorized("missing identity".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

        let body = serde_json::to_value(response.body()).unwrap();
        assert_eq!(body["errors"][0]["status"], "401");
        assert_eq!(body["errors"][0]["title"], "Unauthorized");
        assert_eq!(body["errors"][0]["detail"], "unauthorized: missing identity");
    }
}
