//! HTML extraction for captured pages.
//!
//! Pulls the title, visible text, and outbound links out of fetched HTML.
//! Script, style, and hidden markup are dropped before text extraction;
//! caps are applied by the caller's settings.

use scraper::{ElementRef, Html, Selector};
use url::Url;

use crate::evidence::spans::normalize_whitespace;

/// Elements whose text content is never user-visible
const NON_VISIBLE_TAGS: &[&str] = &["script", "style", "noscript", "template", "head"];

/// Extract the page title: `<title>` first, `og:title` meta as fallback
pub fn extract_title(document: &Html) -> String {
    let title_sel = Selector::parse("title").ok();
    let title = title_sel
        .as_ref()
        .and_then(|sel| document.select(sel).next())
        .map(text_content)
        .map(|t| normalize_whitespace(&t))
        .filter(|t| !t.is_empty());

    if let Some(title) = title {
        return title;
    }

    Selector::parse(r#"meta[property="og:title"]"#)
        .ok()
        .and_then(|sel| document.select(&sel).next())
        .and_then(|el| el.value().attr("content"))
        .map(|t| normalize_whitespace(t))
        .unwrap_or_default()
}

/// Extract visible text, whitespace-normalized and capped at `max_chars`.
///
/// Walks the body and skips non-visible containers and elements hidden
/// with inline styles or the `hidden` attribute.
pub fn extract_text(document: &Html, max_chars: usize) -> String {
    let Ok(body_sel) = Selector::parse("body") else {
        return String::new();
    };
    let Some(body) = document.select(&body_sel).next() else {
        return String::new();
    };

    let mut pieces: Vec<String> = Vec::new();
    collect_visible_text(body, &mut pieces);

    let text = normalize_whitespace(&pieces.join(" "));
    truncate_chars(&text, max_chars)
}

fn collect_visible_text(element: ElementRef<'_>, out: &mut Vec<String>) {
    if !is_visible(element) {
        return;
    }

    for child in element.children() {
        if let Some(text) = child.value().as_text() {
            let trimmed = text.trim();
            if !trimmed.is_empty() {
                out.push(trimmed.to_string());
            }
        } else if let Some(child_el) = ElementRef::wrap(child) {
            collect_visible_text(child_el, out);
        }
    }
}

fn is_visible(element: ElementRef<'_>) -> bool {
    let value = element.value();
    let tag = value.name();
    if NON_VISIBLE_TAGS.contains(&tag) {
        return false;
    }
    if value.attr("hidden").is_some() {
        return false;
    }
    if let Some(style) = value.attr("style") {
        let style = style.to_ascii_lowercase().replace(' ', "");
        if style.contains("display:none") || style.contains("visibility:hidden") {
            return false;
        }
    }
    true
}

/// Extract anchor hrefs resolved against the page URL, capped at `max_links`.
///
/// Fragments, javascript:, and mailto: links are skipped; duplicates kept in
/// first-seen order.
pub fn extract_links(document: &Html, base_url: &str, max_links: usize) -> Vec<String> {
    let Ok(anchor_sel) = Selector::parse("a[href]") else {
        return Vec::new();
    };
    let base = Url::parse(base_url).ok();

    let mut seen = std::collections::HashSet::new();
    let mut links = Vec::new();

    for anchor in document.select(&anchor_sel) {
        if links.len() >= max_links {
            break;
        }

        let Some(href) = anchor.value().attr("href") else {
            continue;
        };
        let href = href.trim();
        if href.is_empty()
            || href.starts_with('#')
            || href.starts_with("javascript:")
            || href.starts_with("mailto:")
        {
            continue;
        }

        let resolved = match Url::parse(href) {
            Ok(url) => Some(url),
            Err(_) => base.as_ref().and_then(|b| b.join(href).ok()),
        };

        if let Some(url) = resolved {
            let url = url.to_string();
            if seen.insert(url.clone()) {
                links.push(url);
            }
        }
    }

    links
}

fn text_content(elem: ElementRef<'_>) -> String {
    elem.text().collect::<Vec<_>>().join(" ")
}

/// Truncate to a character budget without splitting a code point
fn truncate_chars(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    text.chars().take(max_chars).collect()
}
