//! Structured content blocks.
//!
//! A block tree is described by a [`BlockDef`] schema and held as a
//! [`BlockValue`]. Stream elements serialize to `{"type": tag, "value": ...}`,
//! struct blocks to a plain mapping. Decoding is schema-driven, so
//! `def.decode(&value.to_json())` reconstructs the same tree.

use std::collections::BTreeMap;

use folio_sdk::types::ReferenceTarget;
use serde_json::{Map, Value};
use thiserror::Error;
use uuid::Uuid;

use super::sanitize::sanitize_html;

/// Errors raised while decoding a serialized block tree.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BlockError {
    #[error("{path}: expected {expected}")]
    TypeMismatch { path: String, expected: &'static str },

    #[error("{path}: unknown block type '{tag}'")]
    UnknownBlockType { path: String, tag: String },

    #[error("{path}: stream element is missing its type tag")]
    MissingTag { path: String },

    #[error("{path}: '{raw}' is not a valid identifier")]
    InvalidReference { path: String, raw: String },

    #[error("{path}: stream JSON could not be parsed: {message}")]
    MalformedStream { path: String, message: String },
}

/// A validation problem found inside a block tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockIssue {
    pub path: String,
    pub message: String,
}

/// Schema for one block kind.
#[derive(Debug, Clone, PartialEq)]
pub enum BlockDef {
    /// Short plain text.
    Char { required: bool },
    /// Sanitized HTML fragment.
    RichText { required: bool },
    Url { required: bool },
    Boolean { required: bool },
    /// One key out of a fixed list of `(key, label)` pairs. Always required.
    Choice {
        choices: &'static [(&'static str, &'static str)],
    },
    /// Chooser for an image or document, stored by identifier.
    Reference {
        target: ReferenceTarget,
        required: bool,
    },
    /// Raw HTML, stored verbatim.
    RawHtml { required: bool },
    /// Embedded video, by its provider URL.
    Embed { required: bool },
    Struct(StructDef),
    Stream(StreamDef),
}

/// Fixed-shape mapping of named sub-blocks.
#[derive(Debug, Clone, PartialEq)]
pub struct StructDef {
    pub name: &'static str,
    pub children: Vec<(&'static str, BlockDef)>,
    /// An optional struct left entirely blank skips child validation.
    pub required: bool,
}

/// Ordered, heterogeneous sequence of tagged blocks.
#[derive(Debug, Clone, PartialEq)]
pub struct StreamDef {
    pub children: Vec<(&'static str, BlockDef)>,
    pub required: bool,
}

/// A decoded block tree node.
#[derive(Debug, Clone, PartialEq)]
pub enum BlockValue {
    Text(String),
    Bool(bool),
    Reference {
        target: ReferenceTarget,
        id: Option<Uuid>,
    },
    Struct(BTreeMap<String, BlockValue>),
    Stream(StreamValue),
}

/// One element of a stream: its kind tag and value.
#[derive(Debug, Clone, PartialEq)]
pub struct StreamChild {
    pub block_type: String,
    pub value: BlockValue,
}

/// Decoded stream contents, in editor order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StreamValue(pub Vec<StreamChild>);

impl StreamValue {
    pub fn new() -> Self {
        Self(Vec::new())
    }

    pub fn push(&mut self, block_type: &str, value: BlockValue) {
        self.0.push(StreamChild {
            block_type: block_type.to_string(),
            value,
        });
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &StreamChild> {
        self.0.iter()
    }

    /// Serialize to the canonical tagged list.
    pub fn to_json(&self) -> Value {
        Value::Array(
            self.0
                .iter()
                .map(|child| {
                    let mut obj = Map::new();
                    obj.insert("type".to_string(), Value::String(child.block_type.clone()));
                    obj.insert("value".to_string(), child.value.to_json());
                    Value::Object(obj)
                })
                .collect(),
        )
    }

    /// Every set reference in the stream, keyed by the same paths
    /// [`StreamDef::validate`] reports under `path`.
    pub fn collect_references(&self, path: &str, out: &mut Vec<(String, ReferenceTarget, Uuid)>) {
        for (i, child) in self.0.iter().enumerate() {
            child
                .value
                .collect_references(&format!("{path}[{i}].{}", child.block_type), out);
        }
    }

    /// Replace references to `id` with empty references. Returns whether anything changed.
    pub fn clear_reference(&mut self, target: ReferenceTarget, id: Uuid) -> bool {
        let mut changed = false;
        for child in &mut self.0 {
            changed |= child.value.clear_reference(target, id);
        }
        changed
    }
}

impl BlockValue {
    /// Serialize this node.
    pub fn to_json(&self) -> Value {
        match self {
            BlockValue::Text(s) => Value::String(s.clone()),
            BlockValue::Bool(b) => Value::Bool(*b),
            BlockValue::Reference { id, .. } => match id {
                Some(id) => Value::String(id.to_string()),
                None => Value::Null,
            },
            BlockValue::Struct(fields) => Value::Object(
                fields
                    .iter()
                    .map(|(name, value)| (name.clone(), value.to_json()))
                    .collect(),
            ),
            BlockValue::Stream(stream) => stream.to_json(),
        }
    }

    /// Whether this node holds nothing an editor entered.
    pub fn is_blank(&self) -> bool {
        match self {
            BlockValue::Text(s) => s.trim().is_empty(),
            BlockValue::Bool(b) => !b,
            BlockValue::Reference { id, .. } => id.is_none(),
            BlockValue::Struct(fields) => fields.values().all(BlockValue::is_blank),
            BlockValue::Stream(stream) => stream.is_empty(),
        }
    }

    /// Look up a struct child.
    pub fn get(&self, name: &str) -> Option<&BlockValue> {
        match self {
            BlockValue::Struct(fields) => fields.get(name),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            BlockValue::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Visit every node depth-first, this one included.
    pub fn walk<'a>(&'a self, f: &mut impl FnMut(&'a BlockValue)) {
        f(self);
        match self {
            BlockValue::Struct(fields) => {
                for value in fields.values() {
                    value.walk(f);
                }
            }
            BlockValue::Stream(stream) => {
                for child in &stream.0 {
                    child.value.walk(f);
                }
            }
            _ => {}
        }
    }

    pub fn collect_references(&self, path: &str, out: &mut Vec<(String, ReferenceTarget, Uuid)>) {
        match self {
            BlockValue::Reference {
                target,
                id: Some(id),
            } => out.push((path.to_string(), *target, *id)),
            BlockValue::Struct(fields) => {
                for (name, value) in fields {
                    value.collect_references(&format!("{path}.{name}"), out);
                }
            }
            BlockValue::Stream(stream) => stream.collect_references(path, out),
            _ => {}
        }
    }

    /// Replace references to `id` with empty references. Returns whether anything changed.
    pub fn clear_reference(&mut self, target: ReferenceTarget, id: Uuid) -> bool {
        match self {
            BlockValue::Reference {
                target: t,
                id: slot,
            } if *t == target && *slot == Some(id) => {
                *slot = None;
                true
            }
            BlockValue::Struct(fields) => {
                let mut changed = false;
                for value in fields.values_mut() {
                    changed |= value.clear_reference(target, id);
                }
                changed
            }
            BlockValue::Stream(stream) => stream.clear_reference(target, id),
            _ => false,
        }
    }
}

impl BlockDef {
    /// The value an absent optional sub-block takes.
    pub fn empty_value(&self) -> BlockValue {
        match self {
            BlockDef::Char { .. }
            | BlockDef::RichText { .. }
            | BlockDef::Url { .. }
            | BlockDef::Choice { .. }
            | BlockDef::RawHtml { .. }
            | BlockDef::Embed { .. } => BlockValue::Text(String::new()),
            BlockDef::Boolean { .. } => BlockValue::Bool(false),
            BlockDef::Reference { target, .. } => BlockValue::Reference {
                target: *target,
                id: None,
            },
            BlockDef::Struct(def) => def.empty_value(),
            BlockDef::Stream(_) => BlockValue::Stream(StreamValue::new()),
        }
    }

    /// Decode a serialized node against this schema.
    pub fn decode(&self, raw: &Value) -> Result<BlockValue, BlockError> {
        self.decode_at(raw, "value")
    }

    fn decode_at(&self, raw: &Value, path: &str) -> Result<BlockValue, BlockError> {
        if raw.is_null() {
            return Ok(self.empty_value());
        }
        match self {
            BlockDef::Char { .. }
            | BlockDef::RichText { .. }
            | BlockDef::Url { .. }
            | BlockDef::Choice { .. }
            | BlockDef::RawHtml { .. }
            | BlockDef::Embed { .. } => match raw {
                Value::String(s) => Ok(BlockValue::Text(s.clone())),
                _ => Err(BlockError::TypeMismatch {
                    path: path.to_string(),
                    expected: "a string",
                }),
            },
            BlockDef::Boolean { .. } => match raw {
                Value::Bool(b) => Ok(BlockValue::Bool(*b)),
                _ => Err(BlockError::TypeMismatch {
                    path: path.to_string(),
                    expected: "a boolean",
                }),
            },
            BlockDef::Reference { target, .. } => {
                let Some(s) = raw.as_str() else {
                    return Err(BlockError::TypeMismatch {
                        path: path.to_string(),
                        expected: "an identifier string",
                    });
                };
                let id = Uuid::parse_str(s).map_err(|_| BlockError::InvalidReference {
                    path: path.to_string(),
                    raw: s.to_string(),
                })?;
                Ok(BlockValue::Reference {
                    target: *target,
                    id: Some(id),
                })
            }
            BlockDef::Struct(def) => def.decode_at(raw, path),
            BlockDef::Stream(def) => def.decode_at(raw, path).map(BlockValue::Stream),
        }
    }

    /// Check requiredness and format rules, collecting every problem.
    pub fn validate(&self, value: &BlockValue, path: &str, issues: &mut Vec<BlockIssue>) {
        let mut fail = |message: &str| {
            issues.push(BlockIssue {
                path: path.to_string(),
                message: message.to_string(),
            });
        };
        match (self, value) {
            (
                BlockDef::Char { required }
                | BlockDef::RichText { required }
                | BlockDef::RawHtml { required },
                BlockValue::Text(s),
            ) => {
                if *required && s.trim().is_empty() {
                    fail("This field is required.");
                }
            }
            (BlockDef::Url { required } | BlockDef::Embed { required }, BlockValue::Text(s)) => {
                if s.trim().is_empty() {
                    if *required {
                        fail("This field is required.");
                    }
                } else if !is_http_url(s) {
                    fail("Enter a valid URL.");
                }
            }
            (BlockDef::Boolean { required }, BlockValue::Bool(b)) => {
                if *required && !b {
                    fail("This field is required.");
                }
            }
            (BlockDef::Choice { choices }, BlockValue::Text(s)) => {
                if s.is_empty() {
                    fail("This field is required.");
                } else if !choices.iter().any(|(key, _)| key == s) {
                    fail(&format!(
                        "Select a valid choice. {s} is not one of the available choices."
                    ));
                }
            }
            (BlockDef::Reference { required, .. }, BlockValue::Reference { id, .. }) => {
                if *required && id.is_none() {
                    fail("This field is required.");
                }
            }
            (BlockDef::Struct(def), BlockValue::Struct(_)) => def.validate(value, path, issues),
            (BlockDef::Stream(def), BlockValue::Stream(stream)) => {
                def.validate(stream, path, issues);
            }
            _ => fail("Value does not match its block type."),
        }
    }

    /// Run rich-text nodes through the HTML sanitizer in place.
    pub fn sanitize(&self, value: &mut BlockValue) {
        match (self, value) {
            (BlockDef::RichText { .. }, BlockValue::Text(s)) => {
                *s = sanitize_html(s);
            }
            (BlockDef::Struct(def), BlockValue::Struct(fields)) => {
                for (name, child_def) in &def.children {
                    if let Some(child) = fields.get_mut(*name) {
                        child_def.sanitize(child);
                    }
                }
            }
            (BlockDef::Stream(def), BlockValue::Stream(stream)) => def.sanitize(stream),
            _ => {}
        }
    }
}

impl StructDef {
    pub fn empty_value(&self) -> BlockValue {
        BlockValue::Struct(
            self.children
                .iter()
                .map(|(name, def)| (name.to_string(), def.empty_value()))
                .collect(),
        )
    }

    fn decode_at(&self, raw: &Value, path: &str) -> Result<BlockValue, BlockError> {
        let Some(obj) = raw.as_object() else {
            return Err(BlockError::TypeMismatch {
                path: path.to_string(),
                expected: "an object",
            });
        };
        let mut fields = BTreeMap::new();
        for (name, def) in &self.children {
            let child_path = format!("{path}.{name}");
            let value = def.decode_at(obj.get(*name).unwrap_or(&Value::Null), &child_path)?;
            fields.insert(name.to_string(), value);
        }
        Ok(BlockValue::Struct(fields))
    }

    fn validate(&self, value: &BlockValue, path: &str, issues: &mut Vec<BlockIssue>) {
        if !self.required && value.is_blank() {
            return;
        }
        for (name, def) in &self.children {
            let child_path = format!("{path}.{name}");
            match value.get(name) {
                Some(child) => def.validate(child, &child_path, issues),
                None => def.validate(&def.empty_value(), &child_path, issues),
            }
        }
    }
}

impl StreamDef {
    /// Find the schema registered for a stream tag.
    pub fn child(&self, tag: &str) -> Option<&BlockDef> {
        self.children
            .iter()
            .find(|(name, _)| *name == tag)
            .map(|(_, def)| def)
    }

    /// Decode a serialized stream.
    ///
    /// Accepts the tagged list itself or a string holding its JSON text.
    pub fn decode(&self, raw: &Value) -> Result<StreamValue, BlockError> {
        self.decode_at(raw, "stream")
    }

    fn decode_at(&self, raw: &Value, path: &str) -> Result<StreamValue, BlockError> {
        let parsed;
        let raw = match raw {
            Value::Null => return Ok(StreamValue::new()),
            Value::String(s) if s.trim().is_empty() => return Ok(StreamValue::new()),
            Value::String(s) => {
                parsed = serde_json::from_str::<Value>(s).map_err(|e| {
                    BlockError::MalformedStream {
                        path: path.to_string(),
                        message: e.to_string(),
                    }
                })?;
                &parsed
            }
            other => other,
        };
        let Some(items) = raw.as_array() else {
            return Err(BlockError::TypeMismatch {
                path: path.to_string(),
                expected: "a list of tagged blocks",
            });
        };

        let mut stream = StreamValue::new();
        for (i, item) in items.iter().enumerate() {
            let item_path = format!("{path}[{i}]");
            let Some(tag) = item.get("type").and_then(Value::as_str) else {
                return Err(BlockError::MissingTag { path: item_path });
            };
            let Some(def) = self.child(tag) else {
                return Err(BlockError::UnknownBlockType {
                    path: item_path,
                    tag: tag.to_string(),
                });
            };
            let value = def.decode_at(
                item.get("value").unwrap_or(&Value::Null),
                &format!("{item_path}.{tag}"),
            )?;
            stream.push(tag, value);
        }
        Ok(stream)
    }

    /// Validate a decoded stream. `path` names the stream in reported issues.
    pub fn validate(&self, stream: &StreamValue, path: &str, issues: &mut Vec<BlockIssue>) {
        if self.required && stream.is_empty() {
            issues.push(BlockIssue {
                path: path.to_string(),
                message: "This field is required.".to_string(),
            });
        }
        for (i, child) in stream.iter().enumerate() {
            if let Some(def) = self.child(&child.block_type) {
                def.validate(
                    &child.value,
                    &format!("{path}[{i}].{}", child.block_type),
                    issues,
                );
            }
        }
    }

    pub fn sanitize(&self, stream: &mut StreamValue) {
        for child in &mut stream.0 {
            if let Some(def) = self.child(&child.block_type) {
                def.sanitize(&mut child.value);
            }
        }
    }
}

/// Whether `s` parses as an absolute http(s) URL.
pub fn is_http_url(s: &str) -> bool {
    url::Url::parse(s).is_ok_and(|u| matches!(u.scheme(), "http" | "https") && u.has_host())
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::content::schemas::{STREAM_SCHEMAS, author_block, column_block, stream_schema};
    use proptest::prelude::*;
    use proptest::strategy::Union;
    use serde_json::json;

    fn column(heading: &str) -> BlockValue {
        let mut value = column_block().empty_value();
        if let BlockValue::Struct(fields) = &mut value {
            fields.insert("heading".into(), BlockValue::Text(heading.into()));
        }
        value
    }

    #[test]
    fn stream_round_trips_through_tagged_json() {
        let def = stream_schema("general_body").unwrap();
        let mut multicolumn = StreamValue::new();
        multicolumn.push("column", column("Left"));
        multicolumn.push("column", column("Right"));

        let mut body = StreamValue::new();
        body.push("heading", BlockValue::Text("Welcome".into()));
        body.push("paragraph", BlockValue::Text("<p>Hello</p>".into()));
        body.push(
            "image",
            BlockValue::Reference {
                target: ReferenceTarget::Image,
                id: Some(Uuid::now_v7()),
            },
        );
        body.push("multicolumn", BlockValue::Stream(multicolumn));
        body.push("heading", BlockValue::Text("Again".into()));

        let decoded = def.decode(&body.to_json()).unwrap();
        assert_eq!(decoded, body);
    }

    #[test]
    fn every_block_kind_round_trips_when_blank() {
        for name in STREAM_SCHEMAS {
            let def = stream_schema(name).unwrap();
            let mut stream = StreamValue::new();
            for (tag, child) in &def.children {
                stream.push(tag, child.empty_value());
            }
            assert_eq!(def.decode(&stream.to_json()).unwrap(), stream, "{name}");
            assert_eq!(def.decode(&json!([])).unwrap(), StreamValue::new());
        }
    }

    fn arb_block(def: &BlockDef) -> BoxedStrategy<BlockValue> {
        match def {
            BlockDef::Char { .. }
            | BlockDef::RichText { .. }
            | BlockDef::Url { .. }
            | BlockDef::Choice { .. }
            | BlockDef::RawHtml { .. }
            | BlockDef::Embed { .. } => "\\PC{0,12}".prop_map(BlockValue::Text).boxed(),
            BlockDef::Boolean { .. } => any::<bool>().prop_map(BlockValue::Bool).boxed(),
            BlockDef::Reference { target, .. } => {
                let target = *target;
                proptest::option::of(any::<u128>().prop_map(Uuid::from_u128))
                    .prop_map(move |id| BlockValue::Reference { target, id })
                    .boxed()
            }
            BlockDef::Struct(def) => {
                let children: Vec<_> = def
                    .children
                    .iter()
                    .map(|(name, child)| {
                        let name = name.to_string();
                        arb_block(child)
                            .prop_map(move |value| (name.clone(), value))
                            .boxed()
                    })
                    .collect();
                children
                    .prop_map(|pairs| BlockValue::Struct(pairs.into_iter().collect()))
                    .boxed()
            }
            BlockDef::Stream(def) => arb_stream(def).prop_map(BlockValue::Stream).boxed(),
        }
    }

    fn arb_stream(def: &StreamDef) -> BoxedStrategy<StreamValue> {
        if def.children.is_empty() {
            return Just(StreamValue::new()).boxed();
        }
        let child = Union::new(def.children.iter().map(|(tag, child)| {
            let tag = tag.to_string();
            arb_block(child)
                .prop_map(move |value| StreamChild {
                    block_type: tag.clone(),
                    value,
                })
                .boxed()
        }));
        proptest::collection::vec(child, 0..4)
            .prop_map(StreamValue)
            .boxed()
    }

    fn arb_schema_and_stream() -> impl Strategy<Value = (StreamDef, StreamValue)> {
        proptest::sample::select(STREAM_SCHEMAS.to_vec()).prop_flat_map(|name| {
            let def = stream_schema(name).unwrap();
            arb_stream(&def).prop_map(move |stream| (def.clone(), stream))
        })
    }

    proptest! {
        #[test]
        fn generated_streams_round_trip((def, stream) in arb_schema_and_stream()) {
            prop_assert_eq!(def.decode(&stream.to_json()).unwrap(), stream);
        }
    }

    #[test]
    fn references_are_collected_with_block_paths() {
        let def = stream_schema("general_body").unwrap();
        let image = Uuid::now_v7();
        let mut multicolumn = StreamValue::new();
        multicolumn.push("column", column("Left"));
        let mut body = StreamValue::new();
        body.push(
            "image",
            BlockValue::Reference {
                target: ReferenceTarget::Image,
                id: None,
            },
        );
        body.push(
            "image",
            BlockValue::Reference {
                target: ReferenceTarget::Image,
                id: Some(image),
            },
        );
        body.push("multicolumn", BlockValue::Stream(multicolumn));
        assert_eq!(def.decode(&body.to_json()).unwrap(), body);

        let mut refs = Vec::new();
        body.collect_references("body", &mut refs);
        assert_eq!(
            refs,
            vec![("body[1].image".to_string(), ReferenceTarget::Image, image)]
        );
    }

    #[test]
    fn stream_serializes_type_and_value() {
        let def = stream_schema("authors").unwrap();
        let raw = json!([{
            "type": "author",
            "value": {"name": "Ada", "university": "Rice", "country": "US",
                      "senior_author": true, "display_at_top": false}
        }]);
        let stream = def.decode(&raw).unwrap();
        assert_eq!(stream.len(), 1);
        assert_eq!(stream.to_json(), raw);
    }

    #[test]
    fn stream_accepts_json_text() {
        let def = stream_schema("authors").unwrap();
        let raw = json!(r#"[{"type": "author", "value": {"name": "Ada"}}]"#);
        let stream = def.decode(&raw).unwrap();
        assert_eq!(
            stream.iter().next().unwrap().value.get("name"),
            Some(&BlockValue::Text("Ada".into()))
        );
    }

    #[test]
    fn missing_struct_children_take_empty_values() {
        let value = author_block().decode(&json!({"name": "Ada"})).unwrap();
        assert_eq!(value.get("university"), Some(&BlockValue::Text(String::new())));
        assert_eq!(value.get("senior_author"), Some(&BlockValue::Bool(false)));
    }

    #[test]
    fn unknown_tag_is_rejected() {
        let def = stream_schema("column_row").unwrap();
        let err = def
            .decode(&json!([{"type": "carousel", "value": {}}]))
            .unwrap_err();
        assert!(matches!(err, BlockError::UnknownBlockType { ref tag, .. } if tag == "carousel"));
    }

    #[test]
    fn missing_tag_is_rejected() {
        let def = stream_schema("column_row").unwrap();
        let err = def.decode(&json!([{"value": {}}])).unwrap_err();
        assert!(matches!(err, BlockError::MissingTag { .. }));
    }

    #[test]
    fn malformed_reference_is_rejected() {
        let def = BlockDef::Reference {
            target: ReferenceTarget::Document,
            required: false,
        };
        let err = def.decode(&json!("not-a-uuid")).unwrap_err();
        assert!(matches!(err, BlockError::InvalidReference { .. }));
    }

    #[test]
    fn required_child_blank_fails_validation() {
        let def = author_block();
        let value = def.decode(&json!({"name": "  "})).unwrap();
        let mut issues = Vec::new();
        def.validate(&value, "authors[0].author", &mut issues);
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].path, "authors[0].author.name");
    }

    #[test]
    fn optional_blank_image_struct_is_skipped() {
        let def = column_block();
        let value = def.decode(&json!({"heading": "Only a heading"})).unwrap();
        let mut issues = Vec::new();
        def.validate(&value, "row_1[0].column", &mut issues);
        assert!(issues.is_empty(), "{issues:?}");
    }

    #[test]
    fn partially_filled_image_struct_needs_alignment() {
        let def = column_block();
        let value = def
            .decode(&json!({"image": {"image": Uuid::now_v7().to_string()}}))
            .unwrap();
        let mut issues = Vec::new();
        def.validate(&value, "c", &mut issues);
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].path, "c.image.alignment");
    }

    #[test]
    fn choice_outside_list_fails() {
        let def = column_block();
        let value = def
            .decode(&json!({"image": {"alt_text": "x", "alignment": "diagonal"}}))
            .unwrap();
        let mut issues = Vec::new();
        def.validate(&value, "c", &mut issues);
        assert!(issues[0].message.contains("diagonal"));
    }

    #[test]
    fn bad_link_fails_validation() {
        let def = column_block();
        let value = def.decode(&json!({"link": "not a url"})).unwrap();
        let mut issues = Vec::new();
        def.validate(&value, "c", &mut issues);
        assert_eq!(issues[0].path, "c.link");
        assert_eq!(issues[0].message, "Enter a valid URL.");
    }

    #[test]
    fn nested_stream_requires_children() {
        let def = stream_schema("general_body").unwrap();
        let stream = def
            .decode(&json!([{"type": "multicolumn", "value": []}]))
            .unwrap();
        let mut issues = Vec::new();
        def.validate(&stream, "body", &mut issues);
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].path, "body[0].multicolumn");
    }

    #[test]
    fn sanitize_cleans_rich_text_only() {
        let def = stream_schema("general_body").unwrap();
        let mut stream = def
            .decode(&json!([
                {"type": "paragraph", "value": "<p>ok</p><script>x()</script>"},
                {"type": "html", "value": "<script>kept()</script>"}
            ]))
            .unwrap();
        def.sanitize(&mut stream);
        let values: Vec<_> = stream.iter().map(|c| c.value.as_str().unwrap()).collect();
        assert_eq!(values[0], "<p>ok</p>");
        assert_eq!(values[1], "<script>kept()</script>");
    }

    #[test]
    fn clear_reference_nulls_matching_ids() {
        let doc = Uuid::now_v7();
        let def = stream_schema("column_row").unwrap();
        let mut stream = def
            .decode(&json!([{"type": "column", "value": {"document": doc.to_string()}}]))
            .unwrap();

        assert!(!stream.clear_reference(ReferenceTarget::Image, doc));
        assert!(stream.clear_reference(ReferenceTarget::Document, doc));
        let column = &stream.iter().next().unwrap().value;
        assert_eq!(
            column.get("document"),
            Some(&BlockValue::Reference {
                target: ReferenceTarget::Document,
                id: None
            })
        );
    }

    #[test]
    fn http_url_check() {
        assert!(is_http_url("https://openstax.org/details"));
        assert!(!is_http_url("ftp://example.org/file"));
        assert!(!is_http_url("/relative/path"));
    }
}
