//! Opaque pagination cursors.
//!
//! A cursor remembers the keyset position of one document: its id and the
//! value of the active sort field. Cursors are serialized as JSON and then
//! base64url-encoded without padding, so they can travel in query strings.
//! Clients must treat them as opaque.
//!
//! # Fail-open decoding
//!
//! Decoding never fails loudly. A token that is not valid base64, not valid
//! JSON, or written by an unknown format version decodes to `None`, and the
//! pagers treat that as "no cursor" and serve the first page. A cursor is a
//! navigation convenience, not an authorization boundary.
//!
//! A cursor is only meaningful for the exact collection, filters, sort field
//! and sort direction that produced it. That is not checked here.

use base64::{Engine, engine::general_purpose::URL_SAFE_NO_PAD};
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::value::{Document, FieldValue};

/// Current cursor format version.
pub const CURSOR_VERSION: u8 = 1;

/// Direction a cursor resumes in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum CursorDirection {
    /// Resume after the cursor position (next page).
    #[default]
    Next,
    /// Resume before the cursor position (previous page).
    Previous,
}

/// A decoded keyset position.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageCursor {
    #[serde(rename = "v")]
    version: u8,

    #[serde(rename = "id")]
    document_id: String,

    #[serde(rename = "s")]
    sort_value: FieldValue,

    #[serde(rename = "d", default)]
    direction: CursorDirection,
}

impl PageCursor {
    /// Creates a forward cursor positioned at the given document.
    pub fn new(document_id: impl Into<String>, sort_value: FieldValue) -> Self {
        Self {
            version: CURSOR_VERSION,
            document_id: document_id.into(),
            sort_value,
            direction: CursorDirection::Next,
        }
    }

    /// Creates a backward cursor positioned at the given document.
    pub fn previous(document_id: impl Into<String>, sort_value: FieldValue) -> Self {
        Self {
            direction: CursorDirection::Previous,
            ..Self::new(document_id, sort_value)
        }
    }

    /// Creates a cursor at a document's position for the given sort field.
    pub fn at(document: &Document, sort_field: &str, direction: CursorDirection) -> Self {
        let cursor = Self::new(document.id(), document.field(sort_field));
        Self { direction, ..cursor }
    }

    /// Returns the id of the document at the cursor position.
    pub fn document_id(&self) -> &str {
        &self.document_id
    }

    /// Returns the sort field value at the cursor position.
    pub fn sort_value(&self) -> &FieldValue {
        &self.sort_value
    }

    /// Returns the direction.
    pub fn direction(&self) -> CursorDirection {
        self.direction
    }

    /// Encodes the cursor to an opaque URL-safe string.
    pub fn encode(&self) -> String {
        let json = serde_json::to_vec(self).unwrap_or_default();
        URL_SAFE_NO_PAD.encode(&json)
    }

    /// Decodes a cursor from an opaque string.
    ///
    /// Returns `None` for anything that is not a cursor this version wrote.
    pub fn decode(token: &str) -> Option<Self> {
        if token.is_empty() {
            return None;
        }

        let bytes = match URL_SAFE_NO_PAD.decode(token) {
            Ok(bytes) => bytes,
            Err(e) => {
                debug!(error = %e, "Rejecting cursor with invalid encoding");
                return None;
            }
        };

        let cursor: PageCursor = match serde_json::from_slice(&bytes) {
            Ok(cursor) => cursor,
            Err(e) => {
                debug!(error = %e, "Rejecting cursor with invalid payload");
                return None;
            }
        };

        if cursor.version != CURSOR_VERSION {
            debug!(version = cursor.version, "Rejecting cursor from unknown version");
            return None;
        }

        Some(cursor)
    }
}

/// Encodes a forward cursor for a `(document id, sort value)` pair.
pub fn encode_cursor(document_id: &str, sort_value: FieldValue) -> String {
    PageCursor::new(document_id, sort_value).encode()
}

/// Decodes a cursor, returning `None` when the token is malformed.
pub fn decode_cursor(token: &str) -> Option<PageCursor> {
    PageCursor::decode(token)
}
