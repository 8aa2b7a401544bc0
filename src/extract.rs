//! HTML Content Extractor (Component B).
//!
//! Strips boilerplate and script/style noise, picks a content root, and
//! extracts main text plus an optional detected language.
//!
//! The boilerplate selector list is preserved here as documentation, but is
//! applied via tag-name/id/class checks during a single DFS pass (rather than
//! literal `Selector::parse` + `.select()` per entry) so that stripping a
//! boilerplate ancestor also skips everything beneath it in one pass.

use scraper::{ElementRef, Html, Selector};

/// Non-content tags removed outright.
const STRIPPED_TAGS: &[&str] = &[
    "script", "style", "noscript", "svg", "img", "picture", "video", "audio", "canvas", "form",
    "button",
];

/// Boilerplate tag names (`header, footer, nav, aside`).
const BOILERPLATE_TAGS: &[&str] = &["header", "footer", "nav", "aside"];

/// Boilerplate class names.
const BOILERPLATE_CLASSES: &[&str] = &[
    "navbar",
    "nav",
    "navigation",
    "site-header",
    "site-footer",
    "footer",
    "cookie",
    "cookie-banner",
    "banner",
];

/// Boilerplate id names.
const BOILERPLATE_IDS: &[&str] = &["header", "footer", "nav", "navbar", "cookie-banner"];

/// Main-content root candidates, tried in order.
const MAIN_CANDIDATES: &[&str] = &[
    "main",
    "article",
    "#main",
    ".main",
    ".main-content",
    "#content",
    ".content",
    ".page-content",
    ".layout__content",
    "body",
];

/// Result of content extraction: the main text and, if detected, a normalized
/// language tag.
pub struct Extracted {
    pub main_text: String,
    pub detected_lang: Option<String>,
}

/// Run the extraction algorithm over raw HTML.
pub fn extract(html: &str) -> Extracted {
    let document = Html::parse_document(html);

    let detected_lang = detect_lang(&document);
    let main_text = extract_main_text(&document);

    Extracted { main_text, detected_lang }
}

fn should_skip(element: &ElementRef) -> bool {
    let tag = element.value().name();
    if STRIPPED_TAGS.contains(&tag) || BOILERPLATE_TAGS.contains(&tag) {
        return true;
    }
    if let Some(id) = element.value().id() {
        if BOILERPLATE_IDS.contains(&id) {
            return true;
        }
    }
    for class in element.value().classes() {
        if BOILERPLATE_CLASSES.contains(&class) {
            return true;
        }
    }
    false
}

fn extract_main_text(document: &Html) -> String {
    let root = find_content_root(document);
    let mut buf = String::new();
    if let Some(root) = root {
        collect_text(&root, &mut buf);
    }
    collapse_whitespace(&buf)
}

fn find_content_root(document: &Html) -> Option<ElementRef<'_>> {
    for candidate in MAIN_CANDIDATES {
        if let Ok(sel) = Selector::parse(candidate) {
            if let Some(el) = document.select(&sel).next() {
                return Some(el);
            }
        }
    }
    Some(document.root_element())
}

/// Depth-first text concatenation with single-space separators, skipping any
/// subtree rooted at a stripped/boilerplate element.
fn collect_text(element: &ElementRef, buf: &mut String) {
    if should_skip(element) {
        return;
    }
    for child in element.children() {
        if let Some(child_element) = ElementRef::wrap(child) {
            collect_text(&child_element, buf);
        } else if let Some(text) = child.value().as_text() {
            buf.push_str(text);
            buf.push(' ');
        }
    }
}

fn collapse_whitespace(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut last_was_space = true;
    for c in s.chars() {
        if c.is_whitespace() {
            if !last_was_space {
                out.push(' ');
            }
            last_was_space = true;
        } else {
            out.push(c);
            last_was_space = false;
        }
    }
    out.trim().to_string()
}

/// `html[lang]` -> `meta[http-equiv=content-language]` -> `meta[name=language]`,
/// normalized by lowercasing and keeping the substring before the first `,`
/// and before the first `-`. Empty -> `None`.
fn detect_lang(document: &Html) -> Option<String> {
    if let Ok(sel) = Selector::parse("html[lang]") {
        if let Some(el) = document.select(&sel).next() {
            if let Some(v) = el.value().attr("lang") {
                if let Some(n) = normalize_lang(v) {
                    return Some(n);
                }
            }
        }
    }
    if let Ok(sel) = Selector::parse(r#"meta[http-equiv="content-language" i]"#) {
        if let Some(el) = document.select(&sel).next() {
            if let Some(v) = el.value().attr("content") {
                if let Some(n) = normalize_lang(v) {
                    return Some(n);
                }
            }
        }
    }
    if let Ok(sel) = Selector::parse(r#"meta[name="language" i]"#) {
        if let Some(el) = document.select(&sel).next() {
            if let Some(v) = el.value().attr("content") {
                if let Some(n) = normalize_lang(v) {
                    return Some(n);
                }
            }
        }
    }
    None
}

fn normalize_lang(raw: &str) -> Option<String> {
    let lower = raw.trim().to_ascii_lowercase();
    if lower.is_empty() {
        return None;
    }
    let before_comma = lower.split(',').next().unwrap_or(&lower);
    let before_dash = before_comma.split('-').next().unwrap_or(before_comma);
    if before_dash.is_empty() {
        None
    } else {
        Some(before_dash.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_scripts_nav_and_footer() {
        let html = r#"
            <html><body>
                <nav>Home About</nav>
                <script>var x = 1;</script>
                <main>Hello <b>world</b></main>
                <footer>copyright</footer>
            </body></html>
        "#;
        let result = extract(html);
        assert_eq!(result.main_text, "Hello world");
    }

    #[test]
    fn falls_back_through_main_candidates() {
        let html = r#"<html><body><div class="content">Article body text</div></body></html>"#;
        let result = extract(html);
        assert_eq!(result.main_text, "Article body text");
    }

    #[test]
    fn falls_back_to_body_when_no_candidate_matches() {
        let html = r#"<html><body>Just some plain body text</body></html>"#;
        let result = extract(html);
        assert_eq!(result.main_text, "Just some plain body text");
    }

    #[test]
    fn strips_boilerplate_by_class_inside_main() {
        let html = r#"<html><body><main><div class="cookie-banner">Accept cookies</div>Real content</main></body></html>"#;
        let result = extract(html);
        assert_eq!(result.main_text, "Real content");
    }

    #[test]
    fn detects_lang_from_html_attribute() {
        let html = r#"<html lang="en-US"><body>hi</body></html>"#;
        let result = extract(html);
        assert_eq!(result.detected_lang.as_deref(), Some("en"));
    }

    #[test]
    fn detects_lang_from_meta_content_language() {
        let html = r#"<html><head><meta http-equiv="content-language" content="de,en"></head><body>hallo</body></html>"#;
        let result = extract(html);
        assert_eq!(result.detected_lang.as_deref(), Some("de"));
    }

    #[test]
    fn no_lang_hint_yields_none() {
        let html = r#"<html><body>plain</body></html>"#;
        let result = extract(html);
        assert_eq!(result.detected_lang, None);
    }
}
