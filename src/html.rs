//! Queryable node-tree view over parsed HTML.
//!
//! The section parsers never touch a concrete HTML library. They are written
//! against the [`Node`] trait, which offers the handful of structural queries
//! they need:
//!
//! - [`Node::find_first`] / [`Node::find_all`]: descendant search
//! - [`Node::find_children`]: direct children only
//! - [`Node::attribute`]: raw attribute access
//! - [`Node::text_content`] / [`Node::text_excluding`]: collapsed descendant text
//! - [`Node::text_joined`]: collapsed descendant text without added separators
//! - [`Node::resolve_href`]: `href` resolved against a base URL
//!
//! [`HtmlPage`] is the single backend, built on `scraper`.

use crate::utils::collapse_whitespace;
use scraper::{ElementRef, Html};
use url::Url;

/// A structural match on tag name plus optional class and id.
///
/// ```ignore
/// const LISTING: Query = Query::tag("section").id("articleList");
/// const READ_MORE: Query = Query::tag("a").class("more-link");
/// ```
#[derive(Debug, Clone, Copy)]
pub struct Query {
    tag: &'static str,
    class: Option<&'static str>,
    id: Option<&'static str>,
}

impl Query {
    pub const fn tag(tag: &'static str) -> Self {
        Self {
            tag,
            class: None,
            id: None,
        }
    }

    pub const fn class(mut self, class: &'static str) -> Self {
        self.class = Some(class);
        self
    }

    pub const fn id(mut self, id: &'static str) -> Self {
        self.id = Some(id);
        self
    }

    pub fn matches<'a, N: Node<'a>>(&self, node: &N) -> bool {
        node.tag_name().eq_ignore_ascii_case(self.tag)
            && self.class.is_none_or(|class| node.has_class(class))
            && self.id.is_none_or(|id| node.attribute("id") == Some(id))
    }
}

/// An element in a parsed document.
///
/// Implementors supply the primitive accessors; the query helpers are
/// provided on top of them.
pub trait Node<'a>: Copy + Sized {
    fn tag_name(&self) -> &'a str;

    fn attribute(&self, name: &str) -> Option<&'a str>;

    fn has_class(&self, class: &str) -> bool;

    /// Element children in document order.
    fn element_children(&self) -> Vec<Self>;

    /// All element descendants in document order, excluding `self`.
    fn element_descendants(&self) -> Vec<Self>;

    /// Raw text nodes under `self` in document order, skipping the whole
    /// subtree of any element matching `exclude`.
    fn text_pieces(&self, exclude: Option<&Query>) -> Vec<&'a str>;

    fn find_first(&self, query: &Query) -> Option<Self> {
        self.element_descendants()
            .into_iter()
            .find(|node| query.matches(node))
    }

    fn find_all(&self, query: &Query) -> Vec<Self> {
        self.element_descendants()
            .into_iter()
            .filter(|node| query.matches(node))
            .collect()
    }

    fn find_children(&self, query: &Query) -> Vec<Self> {
        self.element_children()
            .into_iter()
            .filter(|node| query.matches(node))
            .collect()
    }

    /// Descendant text with whitespace collapsed to single spaces.
    fn text_content(&self) -> String {
        collapse_whitespace(&self.text_pieces(None).join(" "))
    }

    /// Descendant text nodes concatenated as they appear, then collapsed.
    ///
    /// Inline markup inside a word (`WIG<sub>20</sub>`) stays joined.
    fn text_joined(&self) -> String {
        collapse_whitespace(&self.text_pieces(None).concat())
    }

    /// Like [`Node::text_content`], minus the text of elements matching `exclude`.
    fn text_excluding(&self, exclude: &Query) -> String {
        collapse_whitespace(&self.text_pieces(Some(exclude)).join(" "))
    }

    /// The element's `href`, resolved against `base`.
    fn resolve_href(&self, base: &Url) -> Option<Url> {
        let href = self.attribute("href")?.trim();
        if href.is_empty() {
            return None;
        }
        base.join(href).ok()
    }
}

/// A parsed HTML document.
pub struct HtmlPage {
    document: Html,
}

impl HtmlPage {
    pub fn parse(markup: &str) -> Self {
        Self {
            document: Html::parse_document(markup),
        }
    }

    /// The document's `<html>` element.
    pub fn root(&self) -> ElementRef<'_> {
        self.document.root_element()
    }
}

impl<'a> Node<'a> for ElementRef<'a> {
    fn tag_name(&self) -> &'a str {
        self.value().name()
    }

    fn attribute(&self, name: &str) -> Option<&'a str> {
        self.value().attr(name)
    }

    fn has_class(&self, class: &str) -> bool {
        self.value().classes().any(|c| c == class)
    }

    fn element_children(&self) -> Vec<Self> {
        self.children().filter_map(ElementRef::wrap).collect()
    }

    fn element_descendants(&self) -> Vec<Self> {
        self.descendants()
            .skip(1)
            .filter_map(ElementRef::wrap)
            .collect()
    }

    fn text_pieces(&self, exclude: Option<&Query>) -> Vec<&'a str> {
        let mut out = Vec::new();
        push_text(*self, exclude, &mut out);
        out
    }
}

fn push_text<'a>(element: ElementRef<'a>, exclude: Option<&Query>, out: &mut Vec<&'a str>) {
    for child in element.children() {
        if let Some(text) = child.value().as_text() {
            out.push(&**text);
        } else if let Some(child_element) = ElementRef::wrap(child) {
            if exclude.is_some_and(|query| query.matches(&child_element)) {
                continue;
            }
            push_text(child_element, exclude, out);
        }
    }
}
