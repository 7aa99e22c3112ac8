//! Conditional Requests
//!
//! `ETag` / `Last-Modified` computation for cacheable entities and evaluation
//! of `If-None-Match` / `If-Modified-Since` request headers.

use crate::error::{ControllerError, Result};
use crate::model::WorkItemLinkType;
use chrono::{DateTime, Utc};
use http::header::{CACHE_CONTROL, ETAG, IF_MODIFIED_SINCE, IF_NONE_MATCH, LAST_MODIFIED};
use http::{HeaderMap, HeaderValue};
use sha2::{Digest, Sha256};

const HTTP_DATE_FORMAT: &str = "%a, %d %b %Y %H:%M:%S GMT";

/// Entity whose representation changes whenever `updated_at` does.
pub trait Cacheable {
    fn cache_key(&self) -> String;
    fn last_modified(&self) -> DateTime<Utc>;
}

impl Cacheable for WorkItemLinkType {
    fn cache_key(&self) -> String {
        self.id.to_string()
    }

    fn last_modified(&self) -> DateTime<Utc> {
        self.updated_at
    }
}

/// Validators and cache policy for one response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheHeaders {
    /// Quoted strong entity tag.
    pub etag: String,
    /// Latest modification, `None` for an empty collection.
    pub last_modified: Option<DateTime<Utc>>,
    pub cache_control: String,
}

impl CacheHeaders {
    pub fn for_entity<C: Cacheable>(entity: &C, cache_control: &str) -> Self {
        Self::for_entities(std::slice::from_ref(entity), cache_control)
    }

    pub fn for_entities<C: Cacheable>(entities: &[C], cache_control: &str) -> Self {
        let mut hasher = Sha256::new();
        for entity in entities {
            hasher.update(entity.cache_key().as_bytes());
            hasher.update(b"-");
            hasher.update(entity.last_modified().timestamp_micros().to_be_bytes());
            hasher.update(b"\n");
        }

        Self {
            etag: format!("\"{}\"", hex::encode(hasher.finalize())),
            last_modified: entities.iter().map(Cacheable::last_modified).max(),
            cache_control: cache_control.to_string(),
        }
    }

    /// Whether the client's cached copy is still current.
    ///
    /// `If-None-Match` takes precedence; `If-Modified-Since` is only
    /// consulted when it is absent.
    pub fn is_not_modified(&self, request_headers: &HeaderMap) -> bool {
        if let Some(value) = request_headers.get(IF_NONE_MATCH) {
            return value
                .to_str()
                .map(|tags| self.matches_any(tags))
                .unwrap_or(false);
        }

        let since = request_headers
            .get(IF_MODIFIED_SINCE)
            .and_then(|value| value.to_str().ok())
            .and_then(parse_http_date);
        match (since, self.last_modified) {
            // HTTP dates carry whole seconds only
            (Some(since), Some(last_modified)) => last_modified.timestamp() <= since.timestamp(),
            _ => false,
        }
    }

    fn matches_any(&self, tags: &str) -> bool {
        tags.split(',')
            .map(str::trim)
            .map(|tag| tag.trim_start_matches("W/"))
            .any(|tag| tag == "*" || tag == self.etag)
    }

    /// Writes `ETag`, `Last-Modified` and `Cache-Control` into `headers`.
    pub fn apply(&self, headers: &mut HeaderMap) -> Result<()> {
        headers.insert(ETAG, header_value(&self.etag)?);
        if let Some(last_modified) = self.last_modified {
            headers.insert(LAST_MODIFIED, header_value(&http_date(last_modified))?);
        }
        headers.insert(CACHE_CONTROL, header_value(&self.cache_control)?);
        Ok(())
    }
}

fn header_value(value: &str) -> Result<HeaderValue> {
    HeaderValue::from_str(value)
        .map_err(|e| ControllerError::Internal(format!("invalid header value {:?}: {}", value, e)))
}

pub fn http_date(date: DateTime<Utc>) -> String {
    date.format(HTTP_DATE_FORMAT).to_string()
}

pub fn parse_http_date(value: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc2822(value)
        .ok()
        .map(|date| date.with_timezone(&Utc))
}
