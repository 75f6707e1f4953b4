//! Core types: field values, documents, cursors, pages and page requests.

pub mod cursor;
pub mod page;
pub mod request;
pub mod value;

pub use cursor::{CURSOR_VERSION, CursorDirection, PageCursor, decode_cursor, encode_cursor};
pub use page::{Page, PageInfo};
pub use request::PageRequest;
pub use value::{DOCUMENT_ID, Document, FieldValue};
