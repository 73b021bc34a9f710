//! Media URL resolution.

mod resolve;

pub use resolve::{DEFAULT_HTTP_PORT, MediaUrls, SiteConfig, build_document_url, build_image_url};
