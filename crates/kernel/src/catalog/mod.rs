//! Page type catalog.
//!
//! Each [`PageKind`] has a [`PageTypeDefinition`]: its field table, owned
//! child collections, public field projection, and placement rules. The
//! catalog enforces placement when pages are created and checks its own
//! consistency at startup.

mod definitions;
mod kind;

use std::collections::{HashMap, HashSet};

use folio_sdk::types::{FieldDefinition, FieldType};
use thiserror::Error;

use crate::content::schemas::stream_schema;
use crate::models::children::ChildKind;

pub use kind::{PageKind, UnknownPageKind};

/// Attributes every page carries outside its field table.
pub const BASE_ATTRIBUTES: &[&str] = &[
    "title",
    "slug",
    "seo_title",
    "search_description",
    "created",
    "updated",
];

/// Declaration of one page type.
#[derive(Debug, Clone)]
pub struct PageTypeDefinition {
    pub kind: PageKind,
    pub label: &'static str,
    pub fields: Vec<FieldDefinition>,
    /// Owned child collections, by relation name.
    pub children: Vec<(&'static str, ChildKind)>,
    /// Properties evaluated at read time.
    pub computed: Vec<&'static str>,
    /// Names exposed by the read API, in output order.
    pub api_fields: Vec<&'static str>,
    /// Allowed parent types. Empty means the type sits at the tree root.
    pub parent_types: Vec<PageKind>,
    /// Allowed direct child types.
    pub subpage_types: Vec<PageKind>,
}

impl PageTypeDefinition {
    pub fn field(&self, name: &str) -> Option<&FieldDefinition> {
        self.fields.iter().find(|f| f.field_name == name)
    }

    pub fn child_kind(&self, name: &str) -> Option<ChildKind> {
        self.children
            .iter()
            .find(|(child, _)| *child == name)
            .map(|(_, kind)| *kind)
    }

    pub fn is_computed(&self, name: &str) -> bool {
        self.computed.contains(&name)
    }

    /// Whether this type may only appear at the tree root.
    pub fn is_root(&self) -> bool {
        self.parent_types.is_empty()
    }
}

/// Creating a page somewhere its type does not allow.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PlacementError {
    #[error("{kind} cannot be created under {parent}")]
    NotAllowed { kind: PageKind, parent: PageKind },

    #[error("{kind} cannot be created at the tree root")]
    RootNotAllowed { kind: PageKind },

    #[error("{kind} can only be created at the tree root")]
    RootOnly { kind: PageKind },

    #[error("{0} is not registered in the catalog")]
    Unregistered(PageKind),
}

/// A configuration defect found by [`Catalog::check_consistency`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CatalogDefect {
    #[error("{0} has no definition")]
    MissingDefinition(PageKind),

    #[error("{kind} lists {parent} as a parent, but {parent} does not allow it as a subpage")]
    ParentMismatch { kind: PageKind, parent: PageKind },

    #[error("{kind} allows subpage {child}, but {child} does not list it as a parent")]
    SubpageMismatch { kind: PageKind, child: PageKind },

    #[error("{kind}: api field '{field}' is not a field, child collection, or computed property")]
    UnresolvedApiField { kind: PageKind, field: String },

    #[error("{kind}: field '{field}' uses unknown stream schema '{schema}'")]
    UnknownStreamSchema {
        kind: PageKind,
        field: String,
        schema: String,
    },

    #[error("{kind}: name '{name}' is declared more than once")]
    DuplicateName { kind: PageKind, name: String },
}

/// Registry of page type definitions, keyed by kind.
#[derive(Debug, Clone)]
pub struct Catalog {
    types: HashMap<PageKind, PageTypeDefinition>,
}

impl Default for Catalog {
    fn default() -> Self {
        Self::standard()
    }
}

impl Catalog {
    /// Create an empty catalog.
    pub fn new() -> Self {
        Self {
            types: HashMap::new(),
        }
    }

    /// The site's full set of page types.
    pub fn standard() -> Self {
        let mut catalog = Self::new();
        for def in definitions::standard_definitions() {
            catalog.register(def);
        }
        catalog
    }

    pub fn register(&mut self, definition: PageTypeDefinition) {
        self.types.insert(definition.kind, definition);
    }

    pub fn get(&self, kind: PageKind) -> Option<&PageTypeDefinition> {
        self.types.get(&kind)
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    /// Registered definitions in declaration order of [`PageKind::ALL`].
    pub fn definitions(&self) -> impl Iterator<Item = &PageTypeDefinition> {
        PageKind::ALL.iter().filter_map(|kind| self.types.get(kind))
    }

    /// Check that a page of `kind` may be created under a parent of `parent`
    /// (`None` for the tree root).
    pub fn check_placement(
        &self,
        kind: PageKind,
        parent: Option<PageKind>,
    ) -> Result<(), PlacementError> {
        let def = self.get(kind).ok_or(PlacementError::Unregistered(kind))?;
        match parent {
            None if def.is_root() => Ok(()),
            None => Err(PlacementError::RootNotAllowed { kind }),
            Some(_) if def.is_root() => Err(PlacementError::RootOnly { kind }),
            Some(parent) => {
                let parent_def = self
                    .get(parent)
                    .ok_or(PlacementError::Unregistered(parent))?;
                if def.parent_types.contains(&parent) && parent_def.subpage_types.contains(&kind)
                {
                    Ok(())
                } else {
                    Err(PlacementError::NotAllowed { kind, parent })
                }
            }
        }
    }

    /// Find configuration defects: asymmetric placement rules, unresolvable
    /// api fields, unknown stream schemas, and duplicate names.
    pub fn check_consistency(&self) -> Vec<CatalogDefect> {
        let mut defects = Vec::new();

        for kind in PageKind::ALL {
            if !self.types.contains_key(&kind) {
                defects.push(CatalogDefect::MissingDefinition(kind));
            }
        }

        for def in self.definitions() {
            let kind = def.kind;

            for &parent in &def.parent_types {
                let allowed = self
                    .get(parent)
                    .is_some_and(|p| p.subpage_types.contains(&kind));
                if !allowed {
                    defects.push(CatalogDefect::ParentMismatch { kind, parent });
                }
            }

            for &child in &def.subpage_types {
                let allowed = self
                    .get(child)
                    .is_some_and(|c| c.parent_types.contains(&kind));
                if !allowed {
                    defects.push(CatalogDefect::SubpageMismatch { kind, child });
                }
            }

            let mut seen = HashSet::new();
            let names = def
                .fields
                .iter()
                .map(|f| f.field_name.as_str())
                .chain(def.children.iter().map(|(name, _)| *name))
                .chain(def.computed.iter().copied());
            for name in names {
                if !seen.insert(name) || BASE_ATTRIBUTES.contains(&name) {
                    defects.push(CatalogDefect::DuplicateName {
                        kind,
                        name: name.to_string(),
                    });
                }
            }

            for field in &def.fields {
                if let FieldType::Stream(schema) = &field.field_type
                    && stream_schema(schema).is_none()
                {
                    defects.push(CatalogDefect::UnknownStreamSchema {
                        kind,
                        field: field.field_name.clone(),
                        schema: schema.clone(),
                    });
                }
            }

            for &name in &def.api_fields {
                let resolved = BASE_ATTRIBUTES.contains(&name)
                    || def.field(name).is_some()
                    || def.child_kind(name).is_some()
                    || def.is_computed(name);
                if !resolved {
                    defects.push(CatalogDefect::UnresolvedApiField {
                        kind,
                        field: name.to_string(),
                    });
                }
            }
        }

        defects
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn standard_catalog_is_consistent() {
        let catalog = Catalog::standard();
        assert_eq!(catalog.len(), PageKind::ALL.len());
        let defects = catalog.check_consistency();
        assert!(defects.is_empty(), "catalog defects: {defects:?}");
    }

    #[test]
    fn book_only_under_book_index() {
        let catalog = Catalog::standard();
        assert!(
            catalog
                .check_placement(PageKind::Book, Some(PageKind::BookIndex))
                .is_ok()
        );
        assert_eq!(
            catalog.check_placement(PageKind::Book, Some(PageKind::HomePage)),
            Err(PlacementError::NotAllowed {
                kind: PageKind::Book,
                parent: PageKind::HomePage
            })
        );
    }

    #[test]
    fn home_page_is_root_only() {
        let catalog = Catalog::standard();
        assert!(catalog.check_placement(PageKind::HomePage, None).is_ok());
        assert_eq!(
            catalog.check_placement(PageKind::HomePage, Some(PageKind::HomePage)),
            Err(PlacementError::RootOnly {
                kind: PageKind::HomePage
            })
        );
        assert_eq!(
            catalog.check_placement(PageKind::AboutUs, None),
            Err(PlacementError::RootNotAllowed {
                kind: PageKind::AboutUs
            })
        );
    }

    #[test]
    fn every_home_page_child_is_placeable() {
        let catalog = Catalog::standard();
        let home = catalog.get(PageKind::HomePage).unwrap();
        for &kind in &home.subpage_types {
            assert!(
                catalog
                    .check_placement(kind, Some(PageKind::HomePage))
                    .is_ok(),
                "{kind} should be allowed under the home page"
            );
        }
    }

    #[test]
    fn asymmetric_rules_are_reported() {
        let mut catalog = Catalog::standard();
        let mut index = catalog.get(PageKind::BookIndex).unwrap().clone();
        index.subpage_types.clear();
        catalog.register(index);

        let defects = catalog.check_consistency();
        assert!(defects.contains(&CatalogDefect::ParentMismatch {
            kind: PageKind::Book,
            parent: PageKind::BookIndex
        }));
        assert_eq!(
            catalog.check_placement(PageKind::Book, Some(PageKind::BookIndex)),
            Err(PlacementError::NotAllowed {
                kind: PageKind::Book,
                parent: PageKind::BookIndex
            })
        );
    }

    #[test]
    fn unresolved_api_field_is_reported() {
        let mut catalog = Catalog::standard();
        let mut faq = catalog.get(PageKind::Faq).unwrap().clone();
        faq.api_fields.push("answers");
        catalog.register(faq);

        let defects = catalog.check_consistency();
        assert_eq!(
            defects,
            vec![CatalogDefect::UnresolvedApiField {
                kind: PageKind::Faq,
                field: "answers".to_string()
            }]
        );
    }

    #[test]
    fn missing_definition_is_reported() {
        let mut catalog = Catalog::new();
        for def in Catalog::standard().definitions() {
            if def.kind != PageKind::Technology {
                catalog.register(def.clone());
            }
        }
        let defects = catalog.check_consistency();
        assert!(defects.contains(&CatalogDefect::MissingDefinition(PageKind::Technology)));
        assert!(defects.contains(&CatalogDefect::SubpageMismatch {
            kind: PageKind::HomePage,
            child: PageKind::Technology
        }));
    }
}
