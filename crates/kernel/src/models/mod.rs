//! Content records: pages, their child collections, and snippets.

pub mod children;
pub mod page;
pub mod snippet;

pub use children::{ChildCollection, ChildKind};
pub use page::{Page, PageDecodeError, StoredPage};
pub use snippet::{Document, Image, Snippet, StudentResource, Subject, FacultyResource};
