use std::sync::LazyLock;

use scraper::{ElementRef, Html, Selector};
use url::Url;

static ROW_SEL: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("table.wikitable.mw-collapsible tr").unwrap());

/// Read-only view of one item-table row. Cells are addressed like CSS
/// `td:nth-child(n)`: position counts every element child of the row, and only
/// a `td` at that position is a cell.
#[derive(Clone, Copy)]
pub struct Row<'a> {
    element: ElementRef<'a>,
}

impl<'a> Row<'a> {
    pub fn new(element: ElementRef<'a>) -> Self {
        Row { element }
    }

    /// 1-based column lookup.
    pub fn cell(&self, column: usize) -> Option<ElementRef<'a>> {
        let nth = self
            .element
            .children()
            .filter_map(ElementRef::wrap)
            .nth(column.checked_sub(1)?)?;
        (nth.value().name() == "td").then_some(nth)
    }
}

/// Item rows of every collapsible wikitable, in document order.
pub fn item_rows(doc: &Html) -> Vec<Row<'_>> {
    doc.select(&ROW_SEL).map(Row::new).collect()
}

/// All descendant text, like DOM `textContent`.
pub fn text_content(el: ElementRef) -> String {
    el.text().collect()
}

/// Only text nodes that are immediate children of `el`.
pub fn direct_text(el: ElementRef) -> String {
    el.children()
        .filter_map(|child| child.value().as_text())
        .map(|t| &**t)
        .collect()
}

/// Resolve an `href`/`src` against the page URL like a browser's `a.href`.
/// Without a base, or when joining fails, the value is kept as written.
pub fn resolve(href: &str, base: Option<&Url>) -> String {
    match base.map(|b| b.join(href.trim())) {
        Some(Ok(url)) => url.into(),
        _ => href.to_string(),
    }
}
