//! Child collection projections.

use folio_sdk::types::{Orderable, ReferenceTarget};
use serde_json::{Value, json};

use super::{Projector, ProjectionError};
use crate::models::children::ResourceLink;
use crate::models::{ChildCollection, Snippet};

impl Projector {
    /// Project a child collection as an array in record order.
    pub(super) async fn project_collection(
        &self,
        collection: &ChildCollection,
    ) -> Result<Value, ProjectionError> {
        let mut out = Vec::with_capacity(collection.len());
        match collection {
            ChildCollection::Quotes(items) => {
                for quote in records(items) {
                    out.push(json!({
                        "quote_text": quote.quote_text,
                        "quote_author": quote.quote_author,
                        "quote_author_school": quote.quote_author_school,
                    }));
                }
            }
            ChildCollection::Allies(items) => {
                for link in records(items) {
                    let ally = self.page(link.ally).await?;
                    let color_logo = match &ally {
                        Some(ally) => self.image_url(ally, "logo_color").await?,
                        None => None,
                    };
                    out.push(json!({
                        "ally_heading": ally.as_ref().and_then(|a| a.text("heading")),
                        "ally_short_description":
                            ally.as_ref().and_then(|a| a.text("short_description")),
                        "ally_color_logo": color_logo,
                        "book_link_url": link.book_link_url,
                        "book_link_text": link.book_link_text,
                    }));
                }
            }
            ChildCollection::FacultyResources(items) => {
                for link in records(items) {
                    out.push(
                        self.resource_link(link, ReferenceTarget::FacultyResource)
                            .await?,
                    );
                }
            }
            ChildCollection::StudentResources(items) => {
                for link in records(items) {
                    out.push(
                        self.resource_link(link, ReferenceTarget::StudentResource)
                            .await?,
                    );
                }
            }
            ChildCollection::Authors(items) => {
                for author in records(items) {
                    out.push(json!({
                        "name": author.name,
                        "university": author.university,
                        "country": author.country,
                        "senior_author": author.senior_author,
                        "display_at_top": author.display_at_top,
                    }));
                }
            }
            ChildCollection::TeamMembers(items) => {
                for member in records(items) {
                    out.push(json!({
                        "name": member.name,
                        "team_member_image": self.image_by_id(member.image).await?,
                        "position": member.position,
                        "description": member.description,
                    }));
                }
            }
            ChildCollection::Advisors(items) => {
                for advisor in records(items) {
                    out.push(json!({
                        "name": advisor.name,
                        "advisor_image": self.image_by_id(advisor.image).await?,
                        "description": advisor.description,
                    }));
                }
            }
            ChildCollection::Funders(items) => {
                for funder in records(items) {
                    out.push(json!({
                        "title": funder.title,
                        "funder_logo": self.image_by_id(funder.logo).await?,
                        "description": funder.description,
                    }));
                }
            }
            ChildCollection::Institutions(items) => {
                for institution in records(items) {
                    out.push(json!({
                        "title": institution.title,
                        "institution_logo": self.image_by_id(institution.logo).await?,
                    }));
                }
            }
            ChildCollection::Videos(items) => {
                for video in records(items) {
                    out.push(json!({
                        "video_url": video.video_url,
                        "video_blurb": video.video_blurb,
                    }));
                }
            }
            ChildCollection::Availability(items) => {
                for entry in records(items) {
                    out.push(json!({
                        "name": entry.name,
                        "available": entry.available,
                        "alternate_text": entry.alternate_text,
                    }));
                }
            }
            ChildCollection::AllySubjects(items) => {
                for entry in records(items) {
                    let subject = self.subject(entry.subject).await?;
                    out.push(json!({ "subject": subject.map(|s| s.name) }));
                }
            }
        }
        Ok(Value::Array(out))
    }

    async fn image_by_id(&self, id: Option<uuid::Uuid>) -> Result<Option<String>, ProjectionError> {
        let image = self.image(id).await?;
        Ok(self.media.image(image.as_ref()))
    }

    /// Faculty links also expose whether the resource is unlocked.
    async fn resource_link(
        &self,
        link: &ResourceLink,
        target: ReferenceTarget,
    ) -> Result<Value, ProjectionError> {
        let (heading, description, unlocked) = match self.snippet(target, link.resource).await? {
            Some(Snippet::FacultyResource(r)) => {
                (Some(r.heading), Some(r.description), Some(r.unlocked_resource))
            }
            Some(Snippet::StudentResource(r)) => (Some(r.heading), Some(r.description), None),
            _ => (None, None, None),
        };
        let document = self.document(link.link_document).await?;

        let mut out = json!({
            "resource_heading": heading,
            "resource_description": description,
        });
        if target == ReferenceTarget::FacultyResource {
            out["resource_unlocked"] = json!(unlocked);
        }
        out["link_external"] = json!(link.link_external);
        out["link_page"] = json!(link.link_page);
        out["link_document_url"] =
            json!(self.media.document(document.as_ref().map(|d| d.url.as_str())));
        out["link_document_title"] = json!(document.map(|d| d.title));
        out["link_text"] = json!(link.link_text);
        Ok(out)
    }
}

fn records<T>(items: &[Orderable<T>]) -> impl Iterator<Item = &T> {
    items.iter().map(|item| &item.record)
}
