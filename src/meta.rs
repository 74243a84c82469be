//! Page metadata scraping and field fallback.

use scraper::{Html, Selector};

/// Open-graph tags scraped from an HTML page.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OpenGraph {
    pub title: Option<String>,
    pub description: Option<String>,
}

impl OpenGraph {
    pub fn from_html(html: &str) -> Self {
        let doc = Html::parse_document(html);
        Self {
            title: og_property(&doc, "og:title"),
            description: og_property(&doc, "og:description"),
        }
    }
}

/// Content of the first non-blank `<meta property="..">` (or `name=".."`)
/// tag. Entities are already decoded by the HTML parser.
fn og_property(doc: &Html, property: &str) -> Option<String> {
    let css = format!(r#"meta[property="{property}"], meta[name="{property}"]"#);
    let selector = Selector::parse(&css).ok()?;
    doc.select(&selector)
        .filter_map(|el| el.value().attr("content"))
        .map(str::trim)
        .find(|content| !content.is_empty())
        .map(ToString::to_string)
}

/// First candidate that is present and not blank.
///
/// Candidates are evaluated left to right, so put the most trusted source
/// first.
pub fn first_present<I>(candidates: I) -> Option<String>
where
    I: IntoIterator<Item = Option<String>>,
{
    candidates
        .into_iter()
        .flatten()
        .find(|value| !value.trim().is_empty())
}

/// `value` with `prefix` removed when it starts with it.
pub fn strip_prefix_owned(value: String, prefix: &str) -> String {
    match value.strip_prefix(prefix) {
        Some(rest) => rest.to_string(),
        None => value,
    }
}
