//! Text normalization helpers

use scraper::Html;

/// Characters replaced by a single space before trimming
const UNWANTED_CHARS: [char; 5] = ['\u{200C}', '\u{00A0}', '\n', '\r', '\t'];

/// Replace zero-width non-joiners, non-breaking spaces and line/tab
/// characters with one space each, then trim both ends.
///
/// Runs are not collapsed: `"a\n\nb"` becomes `"a  b"`.
pub fn clean_body(body: &str) -> String {
    body.replace(UNWANTED_CHARS, " ").trim().to_string()
}

/// Elements whose text is never rendered
const HIDDEN_ELEMENTS: [&str; 3] = ["script", "style", "template"];

/// Visible text of an HTML document or fragment.
///
/// Text nodes are concatenated in document order with no separators added;
/// tags, attributes and comments are dropped and entities are decoded. Text
/// inside `script`, `style` and `template` is skipped.
pub fn html_to_text(html: &str) -> String {
    let document = Html::parse_document(html);
    let mut text = String::new();

    for node in document.tree.root().descendants() {
        let Some(content) = node.value().as_text() else {
            continue;
        };
        let hidden = node.ancestors().any(|ancestor| {
            ancestor
                .value()
                .as_element()
                .is_some_and(|element| HIDDEN_ELEMENTS.contains(&element.name()))
        });
        if !hidden {
            text.push_str(content);
        }
    }

    text
}
