//! Public URLs for documents and images.
//!
//! The default site's port decides the form: on the default HTTP port files
//! are served from the media base URL, otherwise the URL points at the site
//! host directly.

use serde::{Deserialize, Serialize};

use crate::models::Image;

pub const DEFAULT_HTTP_PORT: u16 = 80;

/// Hostname and port of the default site.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SiteConfig {
    pub hostname: String,
    pub port: u16,
}

impl SiteConfig {
    pub fn new(hostname: impl Into<String>, port: u16) -> Self {
        Self {
            hostname: hostname.into(),
            port,
        }
    }

    pub fn is_default_port(&self) -> bool {
        self.port == DEFAULT_HTTP_PORT
    }
}

/// Public URL of a document stored at `path`.
///
/// On the default port only the first path segment (the folder) and the last
/// (the file name) are kept, joined under `media_url`. Empty segments are
/// skipped rather than counted: `docs/x/a.pdf` keeps `docs` as its folder, and
/// `/a.pdf` resolves to `{media_url}a.pdf`, not `{media_url}a.pdf/a.pdf`.
pub fn build_document_url(path: Option<&str>, site: &SiteConfig, media_url: &str) -> Option<String> {
    let path = path.filter(|p| !p.is_empty())?;

    if !site.is_default_port() {
        return Some(format!("http://{}:{}{}", site.hostname, site.port, path));
    }

    let mut segments = path.split('/').filter(|s| !s.is_empty());
    let folder = segments.next()?;
    match segments.next_back() {
        Some(filename) => Some(format!("{media_url}{folder}/{filename}")),
        None => Some(format!("{media_url}{folder}")),
    }
}

/// Public URL of an image.
///
/// Off the default port images are served through the image API by id.
pub fn build_image_url(image: Option<&Image>, site: &SiteConfig, media_url: &str) -> Option<String> {
    let image = image?;
    if site.is_default_port() {
        Some(format!("{media_url}{}", image.file))
    } else {
        Some(format!(
            "http://{}:{}/api/v0/images/{}",
            site.hostname, site.port, image.id
        ))
    }
}

/// Resolver bound to one site configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaUrls {
    pub site: SiteConfig,
    pub media_url: String,
}

impl MediaUrls {
    pub fn new(site: SiteConfig, media_url: impl Into<String>) -> Self {
        Self {
            site,
            media_url: media_url.into(),
        }
    }

    pub fn document(&self, path: Option<&str>) -> Option<String> {
        build_document_url(path, &self.site, &self.media_url)
    }

    pub fn image(&self, image: Option<&Image>) -> Option<String> {
        build_image_url(image, &self.site, &self.media_url)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use uuid::Uuid;

    #[test]
    fn default_port_keeps_folder_and_filename() {
        let site = SiteConfig::new("openstax.org", 80);
        assert_eq!(
            build_document_url(Some("/media/foo/bar.png"), &site, "/m/").as_deref(),
            Some("/m/media/bar.png")
        );
    }

    #[test]
    fn other_port_uses_host_and_full_path() {
        let site = SiteConfig::new("example.org", 8080);
        assert_eq!(
            build_document_url(Some("/media/foo/bar.png"), &site, "/m/").as_deref(),
            Some("http://example.org:8080/media/foo/bar.png")
        );
    }

    #[test]
    fn absent_path_resolves_to_none() {
        let site = SiteConfig::new("example.org", 80);
        assert_eq!(build_document_url(None, &site, "/m/"), None);
        assert_eq!(build_document_url(Some(""), &site, "/m/"), None);
    }

    #[test]
    fn single_segment_path() {
        let site = SiteConfig::new("example.org", 80);
        assert_eq!(
            build_document_url(Some("/bar.pdf"), &site, "/media/").as_deref(),
            Some("/media/bar.pdf")
        );
    }

    #[test]
    fn empty_segments_are_not_counted() {
        let site = SiteConfig::new("example.org", 80);
        assert_eq!(
            build_document_url(Some("documents/4/handbook.pdf"), &site, "/media/").as_deref(),
            Some("/media/documents/handbook.pdf")
        );
        assert_eq!(
            build_document_url(Some("/documents//4/handbook.pdf"), &site, "/media/").as_deref(),
            Some("/media/documents/handbook.pdf")
        );
    }

    #[test]
    fn image_urls() {
        let image = Image {
            id: Uuid::now_v7(),
            title: "Logo".into(),
            file: "original_images/logo.png".into(),
        };
        let urls = MediaUrls::new(SiteConfig::new("localhost", 80), "/media/");
        assert_eq!(
            urls.image(Some(&image)).as_deref(),
            Some("/media/original_images/logo.png")
        );

        let urls = MediaUrls::new(SiteConfig::new("localhost", 8000), "/media/");
        assert_eq!(
            urls.image(Some(&image)),
            Some(format!("http://localhost:8000/api/v0/images/{}", image.id))
        );
        assert_eq!(urls.image(None), None);
    }
}
