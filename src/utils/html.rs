// src/utils/html.rs

/// Sanitizes user-authored quiz text (names, descriptions, question and
/// choice content) before it is stored.
///
/// Safe inline markup such as `<b>` survives; `<script>` elements, event
/// handler attributes and similar are stripped. Surrounding whitespace is trimmed.
pub fn clean_html(input: &str) -> String {
    ammonia::clean(input.trim())
}
