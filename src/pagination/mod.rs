//! Cursor pagination subsystem.
//!
//! # Data Flow
//! ```text
//! ResourceApi::list
//!     → ListCursor (buffer + cursor state)
//!     → page fetcher closure (one POST <path>/list per page)
//!     → Page<T> { items, nextCursor }
//!     → items handed out in server order
//! ```
//!
//! # Design Decisions
//! - Pull-based: nothing is fetched until the caller asks for an item
//! - A cursor is moved out of the state before it is used, so it cannot be
//!   replayed
//! - Dropping a `ListCursor` never triggers another request

pub mod cursor;
pub mod page;

pub use cursor::{ListCursor, PageFetcher};
pub use page::{ItemsWrapper, Page, ToVecLimit, DEFAULT_TO_VEC_LIMIT};
