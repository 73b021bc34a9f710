//! Snippet and media records.
//!
//! These live outside the page tree and are referenced from pages by
//! identifier. Deleting one nulls every reference to it.

use folio_sdk::types::ReferenceTarget;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// An uploaded document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub id: Uuid,
    pub title: String,
    /// Site-relative file path, e.g. `/documents/12/physics.pdf`.
    pub url: String,
}

/// An uploaded image.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Image {
    pub id: Uuid,
    pub title: String,
    /// Storage path relative to the media root, e.g. `original_images/logo.png`.
    pub file: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Subject {
    pub id: Uuid,
    pub name: String,
}

/// Instructor resource shared across books.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FacultyResource {
    pub id: Uuid,
    pub heading: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub unlocked_resource: bool,
}

/// Student resource shared across books.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StudentResource {
    pub id: Uuid,
    pub heading: String,
    #[serde(default)]
    pub description: String,
}

/// Any record addressable by a non-page reference.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Snippet {
    Document(Document),
    Image(Image),
    Subject(Subject),
    FacultyResource(FacultyResource),
    StudentResource(StudentResource),
}

impl Snippet {
    pub fn id(&self) -> Uuid {
        match self {
            Snippet::Document(d) => d.id,
            Snippet::Image(i) => i.id,
            Snippet::Subject(s) => s.id,
            Snippet::FacultyResource(r) => r.id,
            Snippet::StudentResource(r) => r.id,
        }
    }

    pub fn target(&self) -> ReferenceTarget {
        match self {
            Snippet::Document(_) => ReferenceTarget::Document,
            Snippet::Image(_) => ReferenceTarget::Image,
            Snippet::Subject(_) => ReferenceTarget::Subject,
            Snippet::FacultyResource(_) => ReferenceTarget::FacultyResource,
            Snippet::StudentResource(_) => ReferenceTarget::StudentResource,
        }
    }
}
