use std::sync::LazyLock;

use regex::Regex;
use scraper::{ElementRef, Html, Selector};

use crate::types::Snapshot;

#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    #[error("Missing required field: {0}")]
    MissingField(String),
}

static RE_LOCATION_HEADER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^Appointments for(.*)").expect("invalid regex: location header")
});

fn tag_selector(tag: &str) -> Selector {
    Selector::parse(tag).expect("invalid selector")
}

static TBODY: LazyLock<Selector> = LazyLock::new(|| tag_selector("tbody"));
static BOLD: LazyLock<Selector> = LazyLock::new(|| tag_selector("b"));
static LINK: LazyLock<Selector> = LazyLock::new(|| tag_selector("a"));
static ROW: LazyLock<Selector> = LazyLock::new(|| tag_selector("tr"));
static CELL: LazyLock<Selector> = LazyLock::new(|| tag_selector("td"));
static ITALIC: LazyLock<Selector> = LazyLock::new(|| tag_selector("i"));

/// All elements matching `tag` in document order.
fn find_all<'a>(document: &'a Html, tag: &Selector) -> Vec<ElementRef<'a>> {
    document.select(tag).collect()
}

/// Descendants of `element` matching `tag`, excluding `element` itself.
fn find_descendants<'a>(element: ElementRef<'a>, tag: &Selector) -> Vec<ElementRef<'a>> {
    element.select(tag).collect()
}

fn elem_text(element: ElementRef) -> String {
    element.text().collect::<String>()
}

/// Location headers as they appear on the page.
///
/// The site marks them up either as `<b>` or as `<a>`; bold headers come
/// first, then link headers, each group in document order.
fn location_headers(document: &Html) -> Vec<String> {
    [&*BOLD, &*LINK]
        .into_iter()
        .flat_map(|tag| find_all(document, tag))
        .map(elem_text)
        .filter(|text| RE_LOCATION_HEADER.is_match(text.trim()))
        .collect()
}

/// Parses the appointment page into a [`Snapshot`].
///
/// The first `<tbody>` on the page is layout, not data. Remaining tables are
/// paired with location headers by position; when the counts differ the
/// extra headers or tables are dropped. Rows containing any `<i>` element
/// are unavailable slots and are skipped, as is each table's first row.
///
/// The HTML parser gives every `<table>` a `<tbody>` even when the markup
/// has none, so tables written without one still count toward the dropped
/// layout table and toward pairing.
pub fn parse_appointments(html: &str) -> Result<Snapshot, ParseError> {
    let document = Html::parse_document(html);

    let tables = find_all(&document, &TBODY);
    let headers = location_headers(&document);

    let data_tables = tables.into_iter().skip(1);
    if headers.len() != data_tables.len() {
        log::debug!(
            "Pairing {} location header(s) with {} data table(s), extras dropped",
            headers.len(),
            data_tables.len()
        );
    }

    let mut snapshot = Snapshot::new();

    for (header, table) in headers.iter().zip(data_tables) {
        for row in find_descendants(table, &ROW).into_iter().skip(1) {
            if !find_descendants(row, &ITALIC).is_empty() {
                continue;
            }

            let cell = find_descendants(row, &CELL)
                .into_iter()
                .next()
                .ok_or_else(|| {
                    ParseError::MissingField(format!("date cell in table for '{}'", header))
                })?;

            snapshot.push(header, elem_text(cell));
        }
    }

    Ok(snapshot)
}
