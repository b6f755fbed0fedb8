//! Cursor paginator for the ledger response envelope

use super::types::PageToken;
use crate::error::{Error, Result};
use crate::types::JsonObject;
use serde_json::Value;

/// Query parameter name carrying the continuation token
pub(super) const CURSOR_PARAM: &str = "cursor";

/// Paginator over the `{"cursor": {"hasMore", "next", "data"}}` envelope
///
/// Stateless: the token for the next request is derived strictly from the
/// previous response, and pagination ends when the server stops advertising
/// `hasMore`.
#[derive(Debug, Clone, Copy, Default)]
pub struct CursorPaginator;

impl CursorPaginator {
    /// Create a new cursor paginator
    pub fn new() -> Self {
        Self
    }

    /// Extract the continuation token from a response body
    ///
    /// Returns `None` when the server signals completion (`hasMore` absent or
    /// false). `hasMore` set without a `next` value is a malformed response.
    pub fn next_page_token(&self, body: &Value) -> Result<Option<PageToken>> {
        let cursor = envelope(body)?;

        if cursor.get("hasMore").and_then(Value::as_bool) != Some(true) {
            return Ok(None);
        }

        match cursor.get("next").and_then(Value::as_str) {
            Some(next) => Ok(Some(PageToken::new(next))),
            None => Err(Error::malformed(
                "cursor.hasMore is set but cursor.next is missing",
            )),
        }
    }

    /// Merge a page token into the query parameters
    ///
    /// No default parameters: only the token fields, on top of whatever the
    /// caller already built.
    pub fn request_params(&self, token: Option<&PageToken>) -> Vec<(String, String)> {
        match token {
            Some(token) => token.request_params(),
            None => Vec::new(),
        }
    }

    /// Extract the page's records, in server order
    pub fn parse_records(&self, body: &Value) -> Result<Vec<Value>> {
        let cursor = envelope(body)?;

        match cursor.get("data") {
            Some(Value::Array(data)) => Ok(data.clone()),
            Some(_) => Err(Error::malformed("cursor.data is not an array")),
            None => Err(Error::malformed("response missing 'cursor.data'")),
        }
    }
}

/// The `cursor` envelope object, or a hard error
fn envelope(body: &Value) -> Result<&JsonObject> {
    body.get("cursor")
        .ok_or_else(|| Error::malformed("response missing 'cursor' key"))?
        .as_object()
        .ok_or_else(|| Error::malformed("'cursor' is not an object"))
}
