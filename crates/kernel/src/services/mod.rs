//! Write-side services.

pub mod book;
pub mod page_service;

pub use page_service::{CreatePage, PageInput, PageService, PageServiceError, SaveReport};
