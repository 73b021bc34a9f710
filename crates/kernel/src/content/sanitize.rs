//! HTML sanitization for rich-text values.

/// Sanitize HTML input using ammonia with default settings.
///
/// Strips `<script>`, event handlers, and other XSS vectors while keeping
/// safe formatting tags.
pub fn sanitize_html(input: &str) -> String {
    ammonia::clean(input)
}
