//! Orderable child records owned by a page.
//!
//! Each collection belongs to exactly one page and is stored with it, so
//! deleting the page removes its children. Order is explicit: records carry
//! a `sort_order` that is normalized to `0..n` on decode.

use folio_sdk::types::{Orderable, ReferenceTarget, sort_orderables};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

/// Problems found in one child record, as `(field, message)`.
pub type ChildIssues = Vec<(String, String)>;

/// Behavior shared by every child record type.
pub trait ChildRecord: Clone + Serialize + DeserializeOwned {
    /// Report blank required fields.
    fn validate(&self, _issues: &mut ChildIssues) {}

    /// Null references to `id`. Returns whether anything changed.
    fn clear_reference(&mut self, _target: ReferenceTarget, _id: Uuid) -> bool {
        false
    }

    /// Set references as `(field, target, id)`. `kind` is the owning collection.
    fn references(&self, _kind: ChildKind) -> Vec<ChildReference> {
        Vec::new()
    }
}

/// A set reference held by a child record: `(field, target, id)`.
pub type ChildReference = (&'static str, ReferenceTarget, Uuid);

fn set_references<const N: usize>(
    slots: [(&'static str, ReferenceTarget, Option<Uuid>); N],
) -> Vec<ChildReference> {
    slots
        .into_iter()
        .filter_map(|(field, target, id)| Some((field, target, id?)))
        .collect()
}

fn require(issues: &mut ChildIssues, field: &str, value: &str) {
    if value.trim().is_empty() {
        issues.push((field.to_string(), "This field is required.".to_string()));
    }
}

fn clear(slot: &mut Option<Uuid>, id: Uuid) -> bool {
    if *slot == Some(id) {
        *slot = None;
        true
    } else {
        false
    }
}

/// Reader quote shown on a book page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Quote {
    pub quote_text: String,
    pub quote_author: String,
    pub quote_author_school: String,
}

impl ChildRecord for Quote {
    fn validate(&self, issues: &mut ChildIssues) {
        require(issues, "quote_text", &self.quote_text);
        require(issues, "quote_author", &self.quote_author);
        require(issues, "quote_author_school", &self.quote_author_school);
    }
}

/// Partner listed on a book page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BookAlly {
    /// The `allies.Ally` page.
    #[serde(default)]
    pub ally: Option<Uuid>,
    #[serde(default)]
    pub book_link_url: String,
    pub book_link_text: String,
}

impl ChildRecord for BookAlly {
    fn validate(&self, issues: &mut ChildIssues) {
        require(issues, "book_link_text", &self.book_link_text);
    }

    fn clear_reference(&mut self, target: ReferenceTarget, id: Uuid) -> bool {
        target == ReferenceTarget::Page && clear(&mut self.ally, id)
    }

    fn references(&self, _kind: ChildKind) -> Vec<ChildReference> {
        set_references([("ally", ReferenceTarget::Page, self.ally)])
    }
}

/// A student or instructor resource attached to a book.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResourceLink {
    /// The resource snippet.
    #[serde(default)]
    pub resource: Option<Uuid>,
    #[serde(default)]
    pub link_external: String,
    #[serde(default)]
    pub link_page: Option<Uuid>,
    #[serde(default)]
    pub link_document: Option<Uuid>,
    pub link_text: String,
}

impl ChildRecord for ResourceLink {
    fn validate(&self, issues: &mut ChildIssues) {
        require(issues, "link_text", &self.link_text);
    }

    fn clear_reference(&mut self, target: ReferenceTarget, id: Uuid) -> bool {
        match target {
            ReferenceTarget::Document => clear(&mut self.link_document, id),
            ReferenceTarget::Page => clear(&mut self.link_page, id),
            ReferenceTarget::FacultyResource | ReferenceTarget::StudentResource => {
                clear(&mut self.resource, id)
            }
            _ => false,
        }
    }

    fn references(&self, kind: ChildKind) -> Vec<ChildReference> {
        let resource = match kind {
            ChildKind::StudentResources => ReferenceTarget::StudentResource,
            _ => ReferenceTarget::FacultyResource,
        };
        set_references([
            ("resource", resource, self.resource),
            ("link_page", ReferenceTarget::Page, self.link_page),
            ("link_document", ReferenceTarget::Document, self.link_document),
        ])
    }
}

/// Contributing author; the source for a book's derived `authors` stream.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Author {
    pub name: String,
    #[serde(default)]
    pub university: Option<String>,
    #[serde(default)]
    pub country: Option<String>,
    #[serde(default)]
    pub senior_author: bool,
    #[serde(default)]
    pub display_at_top: bool,
}

impl ChildRecord for Author {
    fn validate(&self, issues: &mut ChildIssues) {
        require(issues, "name", &self.name);
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TeamMember {
    pub name: String,
    #[serde(default)]
    pub image: Option<Uuid>,
    pub position: String,
    pub description: String,
}

impl ChildRecord for TeamMember {
    fn validate(&self, issues: &mut ChildIssues) {
        require(issues, "name", &self.name);
        require(issues, "position", &self.position);
        require(issues, "description", &self.description);
    }

    fn clear_reference(&mut self, target: ReferenceTarget, id: Uuid) -> bool {
        target == ReferenceTarget::Image && clear(&mut self.image, id)
    }

    fn references(&self, _kind: ChildKind) -> Vec<ChildReference> {
        set_references([("image", ReferenceTarget::Image, self.image)])
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Advisor {
    pub name: String,
    #[serde(default)]
    pub image: Option<Uuid>,
    pub description: String,
}

impl ChildRecord for Advisor {
    fn validate(&self, issues: &mut ChildIssues) {
        require(issues, "name", &self.name);
        require(issues, "description", &self.description);
    }

    fn clear_reference(&mut self, target: ReferenceTarget, id: Uuid) -> bool {
        target == ReferenceTarget::Image && clear(&mut self.image, id)
    }

    fn references(&self, _kind: ChildKind) -> Vec<ChildReference> {
        set_references([("image", ReferenceTarget::Image, self.image)])
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Funder {
    pub title: String,
    #[serde(default)]
    pub logo: Option<Uuid>,
    pub description: String,
}

impl ChildRecord for Funder {
    fn validate(&self, issues: &mut ChildIssues) {
        require(issues, "title", &self.title);
        require(issues, "description", &self.description);
    }

    fn clear_reference(&mut self, target: ReferenceTarget, id: Uuid) -> bool {
        target == ReferenceTarget::Image && clear(&mut self.logo, id)
    }

    fn references(&self, _kind: ChildKind) -> Vec<ChildReference> {
        set_references([("logo", ReferenceTarget::Image, self.logo)])
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Institution {
    pub title: String,
    #[serde(default)]
    pub logo: Option<Uuid>,
}

impl ChildRecord for Institution {
    fn validate(&self, issues: &mut ChildIssues) {
        require(issues, "title", &self.title);
    }

    fn clear_reference(&mut self, target: ReferenceTarget, id: Uuid) -> bool {
        target == ReferenceTarget::Image && clear(&mut self.logo, id)
    }

    fn references(&self, _kind: ChildKind) -> Vec<ChildReference> {
        set_references([("logo", ReferenceTarget::Image, self.logo)])
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarketingVideo {
    pub video_url: String,
    #[serde(default)]
    pub video_blurb: Option<String>,
}

impl ChildRecord for MarketingVideo {
    fn validate(&self, issues: &mut ChildIssues) {
        require(issues, "video_url", &self.video_url);
    }
}

/// Whether a supplement is available for the marketed product.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResourceAvailability {
    pub name: String,
    #[serde(default)]
    pub available: bool,
    /// When set, availability is ignored.
    #[serde(default)]
    pub alternate_text: Option<String>,
}

impl ChildRecord for ResourceAvailability {
    fn validate(&self, issues: &mut ChildIssues) {
        require(issues, "name", &self.name);
    }
}

/// Subject tag on an ally page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AllySubject {
    #[serde(default)]
    pub subject: Option<Uuid>,
}

impl ChildRecord for AllySubject {
    fn clear_reference(&mut self, target: ReferenceTarget, id: Uuid) -> bool {
        target == ReferenceTarget::Subject && clear(&mut self.subject, id)
    }

    fn references(&self, _kind: ChildKind) -> Vec<ChildReference> {
        set_references([("subject", ReferenceTarget::Subject, self.subject)])
    }
}

/// Kinds of child collection a page type may declare.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChildKind {
    Quotes,
    Allies,
    FacultyResources,
    StudentResources,
    Authors,
    TeamMembers,
    Advisors,
    Funders,
    Institutions,
    Videos,
    Availability,
    AllySubjects,
}

/// A page-owned, ordered child collection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "items", rename_all = "snake_case")]
pub enum ChildCollection {
    Quotes(Vec<Orderable<Quote>>),
    Allies(Vec<Orderable<BookAlly>>),
    FacultyResources(Vec<Orderable<ResourceLink>>),
    StudentResources(Vec<Orderable<ResourceLink>>),
    Authors(Vec<Orderable<Author>>),
    TeamMembers(Vec<Orderable<TeamMember>>),
    Advisors(Vec<Orderable<Advisor>>),
    Funders(Vec<Orderable<Funder>>),
    Institutions(Vec<Orderable<Institution>>),
    Videos(Vec<Orderable<MarketingVideo>>),
    Availability(Vec<Orderable<ResourceAvailability>>),
    AllySubjects(Vec<Orderable<AllySubject>>),
}

/// Run `$body` with `$items` bound to the collection's record list.
macro_rules! with_items {
    ($collection:expr, $items:ident => $body:expr) => {
        match $collection {
            ChildCollection::Quotes($items) => $body,
            ChildCollection::Allies($items) => $body,
            ChildCollection::FacultyResources($items) => $body,
            ChildCollection::StudentResources($items) => $body,
            ChildCollection::Authors($items) => $body,
            ChildCollection::TeamMembers($items) => $body,
            ChildCollection::Advisors($items) => $body,
            ChildCollection::Funders($items) => $body,
            ChildCollection::Institutions($items) => $body,
            ChildCollection::Videos($items) => $body,
            ChildCollection::Availability($items) => $body,
            ChildCollection::AllySubjects($items) => $body,
        }
    };
}

fn decode_items<T: ChildRecord>(raw: &Value) -> Result<Vec<Orderable<T>>, String> {
    let mut items: Vec<Orderable<T>> = match raw {
        Value::Null => Vec::new(),
        other => serde_json::from_value(other.clone()).map_err(|e| e.to_string())?,
    };
    normalize(&mut items);
    Ok(items)
}

fn normalize<T>(items: &mut [Orderable<T>]) {
    sort_orderables(items);
    for (item, position) in items.iter_mut().zip(0..) {
        item.sort_order = position;
    }
}

fn validate_items<T: ChildRecord>(
    name: &str,
    items: &[Orderable<T>],
    errors: &mut Vec<(String, String)>,
) {
    for (i, item) in items.iter().enumerate() {
        let mut issues = ChildIssues::new();
        item.record.validate(&mut issues);
        for (field, message) in issues {
            errors.push((format!("{name}[{i}].{field}"), message));
        }
    }
}

fn collect_references<T: ChildRecord>(
    name: &str,
    kind: ChildKind,
    items: &[Orderable<T>],
    out: &mut Vec<(String, ReferenceTarget, Uuid)>,
) {
    for (i, item) in items.iter().enumerate() {
        for (field, target, id) in item.record.references(kind) {
            out.push((format!("{name}[{i}].{field}"), target, id));
        }
    }
}

fn clear_items<T: ChildRecord>(items: &mut [Orderable<T>], target: ReferenceTarget, id: Uuid) -> bool {
    let mut changed = false;
    for item in items {
        changed |= item.record.clear_reference(target, id);
    }
    changed
}

impl ChildKind {
    /// Decode a JSON list of records into a collection of this kind.
    pub fn decode(self, raw: &Value) -> Result<ChildCollection, String> {
        Ok(match self {
            ChildKind::Quotes => ChildCollection::Quotes(decode_items(raw)?),
            ChildKind::Allies => ChildCollection::Allies(decode_items(raw)?),
            ChildKind::FacultyResources => ChildCollection::FacultyResources(decode_items(raw)?),
            ChildKind::StudentResources => ChildCollection::StudentResources(decode_items(raw)?),
            ChildKind::Authors => ChildCollection::Authors(decode_items(raw)?),
            ChildKind::TeamMembers => ChildCollection::TeamMembers(decode_items(raw)?),
            ChildKind::Advisors => ChildCollection::Advisors(decode_items(raw)?),
            ChildKind::Funders => ChildCollection::Funders(decode_items(raw)?),
            ChildKind::Institutions => ChildCollection::Institutions(decode_items(raw)?),
            ChildKind::Videos => ChildCollection::Videos(decode_items(raw)?),
            ChildKind::Availability => ChildCollection::Availability(decode_items(raw)?),
            ChildKind::AllySubjects => ChildCollection::AllySubjects(decode_items(raw)?),
        })
    }

    pub fn empty(self) -> ChildCollection {
        match self {
            ChildKind::Quotes => ChildCollection::Quotes(Vec::new()),
            ChildKind::Allies => ChildCollection::Allies(Vec::new()),
            ChildKind::FacultyResources => ChildCollection::FacultyResources(Vec::new()),
            ChildKind::StudentResources => ChildCollection::StudentResources(Vec::new()),
            ChildKind::Authors => ChildCollection::Authors(Vec::new()),
            ChildKind::TeamMembers => ChildCollection::TeamMembers(Vec::new()),
            ChildKind::Advisors => ChildCollection::Advisors(Vec::new()),
            ChildKind::Funders => ChildCollection::Funders(Vec::new()),
            ChildKind::Institutions => ChildCollection::Institutions(Vec::new()),
            ChildKind::Videos => ChildCollection::Videos(Vec::new()),
            ChildKind::Availability => ChildCollection::Availability(Vec::new()),
            ChildKind::AllySubjects => ChildCollection::AllySubjects(Vec::new()),
        }
    }
}

impl ChildCollection {
    pub fn kind(&self) -> ChildKind {
        match self {
            ChildCollection::Quotes(_) => ChildKind::Quotes,
            ChildCollection::Allies(_) => ChildKind::Allies,
            ChildCollection::FacultyResources(_) => ChildKind::FacultyResources,
            ChildCollection::StudentResources(_) => ChildKind::StudentResources,
            ChildCollection::Authors(_) => ChildKind::Authors,
            ChildCollection::TeamMembers(_) => ChildKind::TeamMembers,
            ChildCollection::Advisors(_) => ChildKind::Advisors,
            ChildCollection::Funders(_) => ChildKind::Funders,
            ChildCollection::Institutions(_) => ChildKind::Institutions,
            ChildCollection::Videos(_) => ChildKind::Videos,
            ChildCollection::Availability(_) => ChildKind::Availability,
            ChildCollection::AllySubjects(_) => ChildKind::AllySubjects,
        }
    }

    pub fn len(&self) -> usize {
        with_items!(self, items => items.len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Sort by explicit order and renumber positions from zero.
    pub fn normalize(&mut self) {
        with_items!(self, items => normalize(items));
    }

    /// Collect `(path, message)` problems for blank required child fields.
    pub fn validate(&self, name: &str, errors: &mut Vec<(String, String)>) {
        with_items!(self, items => validate_items(name, items, errors));
    }

    /// Null references to `id` in every record. Returns whether anything changed.
    pub fn clear_reference(&mut self, target: ReferenceTarget, id: Uuid) -> bool {
        with_items!(self, items => clear_items(items, target, id))
    }

    /// Every set reference, keyed by `name[i].field`.
    pub fn collect_references(&self, name: &str, out: &mut Vec<(String, ReferenceTarget, Uuid)>) {
        let kind = self.kind();
        with_items!(self, items => collect_references(name, kind, items, out));
    }

    /// Records serialized in order, without their `sort_order`.
    pub fn records_json(&self) -> Vec<Value> {
        with_items!(self, items => items
            .iter()
            .filter_map(|item| serde_json::to_value(&item.record).ok())
            .collect())
    }

    /// Records with their positions, in the shape [`ChildKind::decode`] accepts.
    pub fn to_json(&self) -> Value {
        with_items!(self, items => serde_json::to_value(items).unwrap_or(Value::Null))
    }

    pub fn as_authors(&self) -> Option<&[Orderable<Author>]> {
        match self {
            ChildCollection::Authors(items) => Some(items),
            _ => None,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn decode_sorts_and_renumbers() {
        let raw = json!([
            {"sort_order": 5, "name": "Second"},
            {"sort_order": 1, "name": "First"},
        ]);
        let collection = ChildKind::Authors.decode(&raw).unwrap();
        let authors = collection.as_authors().unwrap();
        assert_eq!(authors[0].record.name, "First");
        assert_eq!(authors[0].sort_order, 0);
        assert_eq!(authors[1].record.name, "Second");
        assert_eq!(authors[1].sort_order, 1);
    }

    #[test]
    fn records_without_order_keep_input_sequence() {
        let raw = json!([{"name": "A"}, {"name": "B"}, {"name": "C"}]);
        let collection = ChildKind::Authors.decode(&raw).unwrap();
        let names: Vec<_> = collection
            .as_authors()
            .unwrap()
            .iter()
            .map(|a| a.record.name.as_str())
            .collect();
        assert_eq!(names, vec!["A", "B", "C"]);
    }

    #[test]
    fn malformed_records_are_rejected() {
        let err = ChildKind::Quotes.decode(&json!([{"quote_text": 3}])).unwrap_err();
        assert!(!err.is_empty());
    }

    #[test]
    fn validate_reports_paths() {
        let collection = ChildKind::Quotes
            .decode(&json!([
                {"quote_text": "Great", "quote_author": "A", "quote_author_school": "Rice"},
                {"quote_text": "", "quote_author": "B", "quote_author_school": "UT"},
            ]))
            .unwrap();
        let mut errors = Vec::new();
        collection.validate("book_quotes", &mut errors);
        assert_eq!(
            errors,
            vec![(
                "book_quotes[1].quote_text".to_string(),
                "This field is required.".to_string()
            )]
        );
    }

    #[test]
    fn clear_reference_only_touches_matching_target() {
        let doc = Uuid::now_v7();
        let mut collection = ChildKind::StudentResources
            .decode(&json!([{"link_document": doc.to_string(), "link_text": "Get it"}]))
            .unwrap();
        assert!(!collection.clear_reference(ReferenceTarget::Image, doc));
        assert!(collection.clear_reference(ReferenceTarget::Document, doc));
        assert_eq!(collection.records_json()[0]["link_document"], Value::Null);
    }

    #[test]
    fn references_carry_paths_and_collection_targets() {
        let resource = Uuid::now_v7();
        let doc = Uuid::now_v7();
        let collection = ChildKind::StudentResources
            .decode(&json!([
                {"link_text": "Blank"},
                {"resource": resource.to_string(), "link_document": doc.to_string(), "link_text": "Both"},
            ]))
            .unwrap();
        let mut refs = Vec::new();
        collection.collect_references("book_student_resources", &mut refs);
        assert_eq!(
            refs,
            vec![
                (
                    "book_student_resources[1].resource".to_string(),
                    ReferenceTarget::StudentResource,
                    resource
                ),
                (
                    "book_student_resources[1].link_document".to_string(),
                    ReferenceTarget::Document,
                    doc
                ),
            ]
        );

        let faculty = ChildKind::FacultyResources
            .decode(&json!([{"resource": resource.to_string(), "link_text": "Key"}]))
            .unwrap();
        let mut refs = Vec::new();
        faculty.collect_references("book_faculty_resources", &mut refs);
        assert_eq!(refs[0].1, ReferenceTarget::FacultyResource);
    }

    #[test]
    fn empty_collection_has_kind() {
        let collection = ChildKind::Funders.empty();
        assert_eq!(collection.kind(), ChildKind::Funders);
        assert!(collection.is_empty());
    }
}
