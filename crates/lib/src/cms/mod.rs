//! Visual CMS: in-place editing of rendered pages.
//!
//! Editable regions of a page carry an [`EditTarget`]. An admin edit arrives as
//! an [`EditRequest`], the [`Editor`] persists it and invalidates the affected
//! collection in the [`ContentCache`] so the next page render reads fresh data.

mod cache;
mod editor;
mod target;

pub use cache::ContentCache;
pub use editor::Editor;
pub use target::{EditRequest, EditTarget, editable_fields};
