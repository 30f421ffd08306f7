//! Parsed-page capability over the `scraper` HTML engine.
//!
//! The pipeline queries pages by tag, class token, or id and reads
//! attributes and text; CSS selector syntax never leaks past this module.
//! Class matching is HTML class-token matching, which keeps class names
//! containing selector metacharacters (`after:absolute`, `text-[20px]`)
//! plain strings.

use scraper::{ElementRef, Html, Selector};

/// A parsed HTML document that can be queried by tag, class, or id.
pub struct PageDocument {
    html: Html,
}

/// A single element within a [`PageDocument`].
#[derive(Clone, Copy)]
pub struct PageNode<'a> {
    element: ElementRef<'a>,
}

impl PageDocument {
    /// Parses a document from raw HTML.
    #[must_use]
    pub fn parse(body: &str) -> Self {
        Self {
            html: Html::parse_document(body),
        }
    }

    /// Returns the text of the `<title>` element, or empty when absent.
    #[must_use]
    pub fn title(&self) -> String {
        self.first("title").map(|node| node.text()).unwrap_or_default()
    }

    /// Returns the first element with the given tag name.
    #[must_use]
    pub fn first(&self, tag: &str) -> Option<PageNode<'_>> {
        self.elements(tag).next()
    }

    /// Returns the first `tag` element carrying `class` as a class token.
    #[must_use]
    pub fn first_with_class(&self, tag: &str, class: &str) -> Option<PageNode<'_>> {
        self.elements(tag).find(|node| node.has_class(class))
    }

    /// Returns the first `tag` element whose `id` attribute matches.
    #[must_use]
    pub fn first_with_id(&self, tag: &str, id: &str) -> Option<PageNode<'_>> {
        self.elements(tag).find(|node| node.attr("id") == Some(id))
    }

    /// Returns every `tag` element carrying `class` as a class token,
    /// in document order.
    #[must_use]
    pub fn all_with_class(&self, tag: &str, class: &str) -> Vec<PageNode<'_>> {
        self.elements(tag)
            .filter(|node| node.has_class(class))
            .collect()
    }

    fn elements<'a>(&'a self, tag: &str) -> impl Iterator<Item = PageNode<'a>> {
        // Tag names are fixed strings chosen by callers; an unparseable
        // tag yields no matches rather than an error.
        let selector = Selector::parse(tag).ok();
        selector
            .into_iter()
            .flat_map(move |sel| {
                self.html
                    .select(&sel)
                    .map(|element| PageNode { element })
                    .collect::<Vec<_>>()
            })
    }
}

impl<'a> PageNode<'a> {
    /// Returns the value of an attribute, if present.
    #[must_use]
    pub fn attr(&self, name: &str) -> Option<&'a str> {
        self.element.value().attr(name)
    }

    /// Returns the concatenated text content of this element.
    #[must_use]
    pub fn text(&self) -> String {
        self.element.text().collect()
    }

    fn has_class(&self, class: &str) -> bool {
        self.element
            .value()
            .attr("class")
            .is_some_and(|value| value.split_ascii_whitespace().any(|token| token == class))
    }
}
