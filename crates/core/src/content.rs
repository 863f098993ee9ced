//! Content negotiation over client-submitted post payloads.
//!
//! Publishing clients send some subset of `{markdown, html, lexical,
//! mobiledoc}`. Exactly one canonical `(body, format)` pair is stored;
//! lexical and mobiledoc are kept as opaque text and tagged HTML pending
//! later rendering.

use pulldown_cmark::{Parser, html};
use serde::{Deserialize, Serialize};

/// Canonical stored content format.
///
/// A closed union: precedence logic below is matched exhaustively, never
/// dispatched on strings.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ContentFormat {
    Markdown,
    Html,
}

impl ContentFormat {
    /// Get the string representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Markdown => "MARKDOWN",
            Self::Html => "HTML",
        }
    }

    /// Parse from the stored representation.
    pub fn parse(s: &str) -> crate::Result<Self> {
        match s {
            "MARKDOWN" => Ok(Self::Markdown),
            "HTML" => Ok(Self::Html),
            _ => Err(crate::Error::InvalidToken(format!("unknown format: {s}"))),
        }
    }
}

/// The content fields a client may submit with a post.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct ContentPayload {
    pub markdown: Option<String>,
    pub html: Option<String>,
    pub lexical: Option<String>,
    pub mobiledoc: Option<String>,
}

/// Explicit source override from the `?source=` query parameter.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ContentSource {
    /// No override: markdown is the preferred source of truth.
    #[default]
    Default,
    /// Client asked for HTML to be stored, rendering markdown if needed.
    Html,
}

impl ContentSource {
    /// Parse the query parameter value. Anything other than `html` is the
    /// default behavior, matching how Ghost ignores unknown source values.
    pub fn from_query(value: Option<&str>) -> Self {
        match value {
            Some("html") => Self::Html,
            _ => Self::Default,
        }
    }
}

/// The resolved canonical content for a post.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NegotiatedContent {
    pub body: String,
    pub format: ContentFormat,
}

/// Resolve a payload to exactly one `(body, format)` pair.
///
/// Default precedence: markdown > html > lexical > mobiledoc, first
/// non-empty wins, stored verbatim. With `source=html`, HTML is preferred
/// and markdown is rendered; lexical/mobiledoc remain a verbatim fallback.
/// An empty payload yields empty HTML content; that is the caller's concern,
/// not an error here.
pub fn negotiate(payload: &ContentPayload, source: ContentSource) -> NegotiatedContent {
    let markdown = non_empty(&payload.markdown);
    let html = non_empty(&payload.html);
    let opaque = non_empty(&payload.lexical).or_else(|| non_empty(&payload.mobiledoc));

    match source {
        ContentSource::Default => {
            if let Some(markdown) = markdown {
                return NegotiatedContent {
                    body: markdown.to_string(),
                    format: ContentFormat::Markdown,
                };
            }
            let body = html.or(opaque).unwrap_or_default().to_string();
            NegotiatedContent {
                body,
                format: ContentFormat::Html,
            }
        }
        ContentSource::Html => {
            let body = match (html, markdown) {
                (Some(html), _) => html.to_string(),
                (None, Some(markdown)) => markdown_to_html(markdown),
                (None, None) => opaque.unwrap_or_default().to_string(),
            };
            NegotiatedContent {
                body,
                format: ContentFormat::Html,
            }
        }
    }
}

/// Render markdown to HTML.
///
/// pulldown-cmark already emits self-closing `<img src alt title>` tags with
/// no extra attributes, which is the normalization Ghost clients expect.
pub fn markdown_to_html(markdown: &str) -> String {
    let parser = Parser::new(markdown);
    let mut out = String::with_capacity(markdown.len() * 2);
    html::push_html(&mut out, parser);
    out.trim_end().to_string()
}

fn non_empty(field: &Option<String>) -> Option<&str> {
    field.as_deref().filter(|s| !s.is_empty())
}
