//! Core field and record types.
//!
//! Page types are described as tables of [`FieldDefinition`]s. Values travel
//! as JSON; the kernel decodes them against these declarations.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Maximum length of a short text field unless declared otherwise.
pub const DEFAULT_CHAR_LENGTH: usize = 255;

/// Things a reference field may point at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReferenceTarget {
    /// An uploaded document (PDF, cover file, handbook).
    Document,
    /// An uploaded image.
    Image,
    /// A subject snippet.
    Subject,
    /// An instructor resource snippet.
    FacultyResource,
    /// A student resource snippet.
    StudentResource,
    /// Another page in the tree.
    Page,
}

impl ReferenceTarget {
    /// Whether this target is a media record hosted outside the page tree.
    pub fn is_media(self) -> bool {
        matches!(self, ReferenceTarget::Document | ReferenceTarget::Image)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ReferenceTarget::Document => "document",
            ReferenceTarget::Image => "image",
            ReferenceTarget::Subject => "subject",
            ReferenceTarget::FacultyResource => "faculty_resource",
            ReferenceTarget::StudentResource => "student_resource",
            ReferenceTarget::Page => "page",
        }
    }
}

/// Field type declarations for page type registration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "settings", rename_all = "snake_case")]
pub enum FieldType {
    /// Short single-line text.
    Char { max_length: usize },
    /// Multi-line plain text.
    Text,
    /// Sanitized HTML fragment.
    RichText,
    /// Absolute http(s) URL.
    Url,
    Boolean,
    /// Fixed-point number, stored in its canonical string form.
    Decimal { max_digits: u8, decimal_places: u8 },
    /// Calendar date (`YYYY-MM-DD`).
    Date,
    /// Opaque JSON document.
    Json,
    /// Weak reference by identifier.
    Reference(ReferenceTarget),
    /// Structured block stream, named by its schema.
    Stream(String),
}

impl FieldType {
    /// Short text with the default length limit.
    pub fn char() -> Self {
        FieldType::Char {
            max_length: DEFAULT_CHAR_LENGTH,
        }
    }

    /// Whether values of this type are strings on the wire.
    pub fn is_textual(&self) -> bool {
        matches!(
            self,
            FieldType::Char { .. } | FieldType::Text | FieldType::RichText | FieldType::Url
        )
    }
}

/// A single field definition within a page type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldDefinition {
    pub field_name: String,
    pub field_type: FieldType,
    pub label: String,
    /// Blank values fail validation.
    #[serde(default)]
    pub required: bool,
    /// Read-only fields are maintained by the kernel and ignored on input.
    #[serde(default = "default_editable")]
    pub editable: bool,
    /// Value used when the field is absent on input.
    #[serde(default)]
    pub default: Value,
    #[serde(default)]
    pub help_text: Option<String>,
}

fn default_editable() -> bool {
    true
}

impl FieldDefinition {
    pub fn new(name: &str, field_type: FieldType) -> Self {
        let default = match field_type {
            FieldType::Boolean => Value::Bool(false),
            _ => Value::Null,
        };
        Self {
            field_name: name.into(),
            field_type,
            label: name.replace('_', " "),
            required: false,
            editable: true,
            default,
            help_text: None,
        }
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn label(mut self, label: &str) -> Self {
        self.label = label.into();
        self
    }

    pub fn read_only(mut self) -> Self {
        self.editable = false;
        self
    }

    pub fn default_value(mut self, value: Value) -> Self {
        self.default = value;
        self
    }

    pub fn help(mut self, text: &str) -> Self {
        self.help_text = Some(text.into());
        self
    }
}

/// A child record with an explicit position in its parent's collection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Orderable<T> {
    #[serde(default)]
    pub sort_order: i32,
    #[serde(flatten)]
    pub record: T,
}

impl<T> Orderable<T> {
    pub fn new(sort_order: i32, record: T) -> Self {
        Self { sort_order, record }
    }

    /// Wrap records in their current sequence order.
    pub fn sequence(records: impl IntoIterator<Item = T>) -> Vec<Self> {
        records
            .into_iter()
            .zip(0..)
            .map(|(record, sort_order)| Self { sort_order, record })
            .collect()
    }
}

/// Sort a collection by its explicit order, keeping input order for ties.
pub fn sort_orderables<T>(items: &mut [Orderable<T>]) {
    items.sort_by_key(|o| o.sort_order);
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct Note {
        text: String,
    }

    #[test]
    fn field_definition_builder() {
        let def = FieldDefinition::new("cnx_id", FieldType::char())
            .label("CNX ID")
            .help("Used to pull metadata from the archive.");
        assert_eq!(def.field_name, "cnx_id");
        assert_eq!(def.label, "CNX ID");
        assert!(!def.required);
        assert!(def.editable);
        assert_eq!(def.default, Value::Null);
    }

    #[test]
    fn boolean_fields_default_to_false() {
        let def = FieldDefinition::new("is_ap", FieldType::Boolean);
        assert_eq!(def.default, Value::Bool(false));

        let def = def.default_value(Value::Bool(true));
        assert_eq!(def.default, Value::Bool(true));
    }

    #[test]
    fn field_type_serializes_tagged() {
        let json = serde_json::to_value(FieldType::Reference(ReferenceTarget::Document)).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"type": "reference", "settings": "document"})
        );
        let back: FieldType = serde_json::from_value(json).unwrap();
        assert_eq!(back, FieldType::Reference(ReferenceTarget::Document));
    }

    #[test]
    fn orderable_flattens_record() {
        let item: Orderable<Note> =
            serde_json::from_value(serde_json::json!({"sort_order": 3, "text": "hi"})).unwrap();
        assert_eq!(item.sort_order, 3);
        assert_eq!(item.record.text, "hi");

        let missing: Orderable<Note> =
            serde_json::from_value(serde_json::json!({"text": "no order"})).unwrap();
        assert_eq!(missing.sort_order, 0);
    }

    #[test]
    fn sort_is_stable_on_ties() {
        let mut items = vec![
            Orderable::new(2, "c"),
            Orderable::new(1, "a"),
            Orderable::new(1, "b"),
        ];
        sort_orderables(&mut items);
        let order: Vec<_> = items.iter().map(|o| o.record).collect();
        assert_eq!(order, vec!["a", "b", "c"]);
    }

    #[test]
    fn sequence_assigns_positions() {
        let items = Orderable::sequence(["x", "y"]);
        assert_eq!(items[0].sort_order, 0);
        assert_eq!(items[1].sort_order, 1);
    }

    #[test]
    fn media_targets() {
        assert!(ReferenceTarget::Document.is_media());
        assert!(ReferenceTarget::Image.is_media());
        assert!(!ReferenceTarget::Subject.is_media());
    }
}
