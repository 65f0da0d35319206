//! Queryable view over fetched markup, backed by `scraper`.
//!
//! The parsed tree is not `Send`; a `Document` lives only inside the synchronous
//! extraction call and never crosses an await point.

use crate::core::error::{AppError, Result};
use crate::core::models::RawDocument;

use scraper::node::Node;
use scraper::html::Select;
use scraper::{ElementRef, Html, Selector};

/// Elements treated as the "containing block" of an address.
const BLOCK_ELEMENTS: [&str; 4] = ["p", "li", "div", "section"];

pub struct Document {
    url: String,
    html: Html,
    serialized: String,
}

impl Document {
    /// Parses raw markup. Documents larger than `max_bytes` are refused with
    /// `AppError::Parse`; anything smaller is accepted, the parser is lenient.
    pub fn parse(raw: &RawDocument, max_bytes: usize) -> Result<Self> {
        if raw.body.len() > max_bytes {
            return Err(AppError::Parse {
                url: raw.url.clone(),
                reason: format!(
                    "document is {} bytes, limit is {} bytes",
                    raw.body.len(),
                    max_bytes
                ),
            });
        }
        let html = Html::parse_document(&raw.body);
        let serialized = html.html();
        tracing::trace!(target: "extract", "Parsed {} ({} bytes, {} serialized)", raw.url, raw.body.len(), serialized.len());
        Ok(Self {
            url: raw.url.clone(),
            html,
            serialized,
        })
    }

    /// Parses a markup fragment with no size limit. Mostly useful in tests.
    pub fn from_markup(markup: &str) -> Self {
        let html = Html::parse_document(markup);
        let serialized = html.html();
        Self {
            url: String::new(),
            html,
            serialized,
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Normalized markup text. Free-text offsets refer to this string.
    pub fn serialized(&self) -> &str {
        &self.serialized
    }

    pub fn select<'a, 'b>(&'a self, selector: &'b Selector) -> Select<'a, 'b> {
        self.html.select(selector)
    }

    /// Flattened, whitespace-collapsed text of the whole document.
    pub fn text(&self) -> String {
        element_text(&self.html.root_element())
    }

    /// Element owning the first text node (document order) that contains
    /// `needle`, compared ASCII case-insensitively. `needle` must be lowercase.
    pub fn element_with_text(&self, needle: &str) -> Option<ElementRef<'_>> {
        self.html
            .root_element()
            .descendants()
            .find(|node| match node.value() {
                Node::Text(text) => text.to_ascii_lowercase().contains(needle),
                _ => false,
            })
            .and_then(|node| node.parent())
            .and_then(ElementRef::wrap)
    }
}

/// Text of the nearest block-level element enclosing `element`, the element
/// itself included.
pub fn nearest_block_text(element: ElementRef<'_>) -> Option<String> {
    std::iter::once(element)
        .chain(element.ancestors().filter_map(ElementRef::wrap))
        .find(|el| BLOCK_ELEMENTS.contains(&el.value().name()))
        .map(|el| element_text(&el))
}

/// Concatenated text content of an element, whitespace-collapsed and trimmed.
pub fn element_text(element: &ElementRef<'_>) -> String {
    collapse_whitespace(&element.text().collect::<String>())
}

pub fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
