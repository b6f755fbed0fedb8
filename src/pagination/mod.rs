//! Pagination module
//!
//! Cursor-based pagination over the ledger API's response envelope:
//!
//! ```json
//! { "cursor": { "hasMore": true, "next": "<token>", "data": [ ... ] } }
//! ```
//!
//! A page token is only ever produced from the previous response's
//! `cursor.next`; a response that lacks the envelope is a hard error, never
//! substituted with empty results.

mod cursor;
mod types;

pub use cursor::CursorPaginator;
pub use types::PageToken;
