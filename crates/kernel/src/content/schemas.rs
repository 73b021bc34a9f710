//! Block schemas used by the page catalog.
//!
//! Stream fields refer to these by name; [`stream_schema`] resolves them.

use folio_sdk::types::ReferenceTarget;

use super::blocks::{BlockDef, StreamDef, StructDef};

/// Image wrap options.
pub const IMAGE_ALIGNMENT: &[(&str, &str)] = &[
    ("left", "Wrap left"),
    ("right", "Wrap right"),
    ("mid", "Mid width"),
    ("full", "Full width"),
];

/// Raw HTML width options.
pub const HTML_ALIGNMENT: &[(&str, &str)] = &[("normal", "Normal"), ("full", "Full width")];

/// Names accepted by [`stream_schema`].
pub const STREAM_SCHEMAS: &[&str] = &[
    "column_row",
    "general_body",
    "faq_questions",
    "marketing_faqs",
    "authors",
];

fn char_block(required: bool) -> BlockDef {
    BlockDef::Char { required }
}

fn image_ref(required: bool) -> BlockDef {
    BlockDef::Reference {
        target: ReferenceTarget::Image,
        required,
    }
}

fn document_ref() -> BlockDef {
    BlockDef::Reference {
        target: ReferenceTarget::Document,
        required: false,
    }
}

/// Image with alt text and wrap alignment.
pub fn image_block(required: bool) -> BlockDef {
    BlockDef::Struct(StructDef {
        name: "image",
        children: vec![
            ("image", image_ref(false)),
            ("alt_text", char_block(false)),
            (
                "alignment",
                BlockDef::Choice {
                    choices: IMAGE_ALIGNMENT,
                },
            ),
        ],
        required,
    })
}

/// Raw HTML with a width choice.
pub fn aligned_html_block() -> BlockDef {
    BlockDef::Struct(StructDef {
        name: "aligned_html",
        children: vec![
            ("html", BlockDef::RawHtml { required: true }),
            (
                "alignment",
                BlockDef::Choice {
                    choices: HTML_ALIGNMENT,
                },
            ),
        ],
        required: true,
    })
}

/// Callout column: heading, body, image, document, and a call to action.
pub fn column_block() -> BlockDef {
    BlockDef::Struct(StructDef {
        name: "column",
        children: vec![
            ("heading", char_block(false)),
            ("content", BlockDef::RichText { required: false }),
            ("image", image_block(false)),
            ("document", document_ref()),
            ("cta", char_block(false)),
            ("link", BlockDef::Url { required: false }),
        ],
        required: true,
    })
}

/// Question and answer entry.
pub fn faq_block() -> BlockDef {
    BlockDef::Struct(StructDef {
        name: "faq",
        children: vec![
            ("question", BlockDef::RichText { required: true }),
            ("slug", char_block(true)),
            ("answer", BlockDef::RichText { required: true }),
            ("document", document_ref()),
        ],
        required: true,
    })
}

/// Book author entry.
pub fn author_block() -> BlockDef {
    BlockDef::Struct(StructDef {
        name: "author",
        children: vec![
            ("name", char_block(true)),
            ("university", char_block(false)),
            ("country", char_block(false)),
            ("senior_author", BlockDef::Boolean { required: false }),
            ("display_at_top", BlockDef::Boolean { required: false }),
        ],
        required: true,
    })
}

/// Pull quote with an optional attribution.
pub fn quote_block() -> BlockDef {
    BlockDef::Struct(StructDef {
        name: "quote",
        children: vec![
            ("content", BlockDef::RichText { required: true }),
            ("attribution", char_block(false)),
        ],
        required: true,
    })
}

fn columns() -> StreamDef {
    StreamDef {
        children: vec![("column", column_block())],
        required: false,
    }
}

/// Resolve a stream schema by name.
pub fn stream_schema(name: &str) -> Option<StreamDef> {
    let def = match name {
        "column_row" => columns(),
        "general_body" => StreamDef {
            children: vec![
                ("heading", char_block(true)),
                ("tagline", char_block(true)),
                ("paragraph", BlockDef::RichText { required: true }),
                ("image", image_ref(true)),
                ("aligned_image", image_block(true)),
                ("video", BlockDef::Embed { required: true }),
                ("quote", quote_block()),
                (
                    "multicolumn",
                    BlockDef::Stream(StreamDef {
                        children: vec![("column", column_block())],
                        required: true,
                    }),
                ),
                ("html", BlockDef::RawHtml { required: true }),
                ("aligned_html", aligned_html_block()),
            ],
            required: false,
        },
        "faq_questions" => StreamDef {
            children: vec![("question", faq_block())],
            required: false,
        },
        "marketing_faqs" => StreamDef {
            children: vec![("faq", faq_block())],
            required: false,
        },
        "authors" => StreamDef {
            children: vec![("author", author_block())],
            required: false,
        },
        _ => return None,
    };
    Some(def)
}
