// src/scrape/fields.rs

use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{ElementRef, Html, Selector};

use crate::table::ScrapedFields;

/// Ids the print page only renders for some properties (no prior year for new
/// construction, no comments, ...). Always present in the output, null if absent.
pub const DYNAMIC_IDS: [&str; 6] = [
    "lblTotalAssessedLand",
    "lblTotalAssessedBuilding",
    "lblPreviousAssessedLand",
    "lblPreviousAssessedBuilding",
    "property-comments",
    "lblComments",
];

static FIELD_ID: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?:lbl|manufacture|legal)|^property-comments$").expect("field id pattern")
});

/// Whether an element id names a field worth keeping.
pub fn is_field_id(id: &str) -> bool {
    FIELD_ID.is_match(id)
}

/// First direct text child, trimmed. Empty, whitespace-only or missing text is null.
fn first_text(el: ElementRef<'_>) -> Option<String> {
    let text = el.children().find_map(|n| n.value().as_text())?;
    let trimmed = text.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

/// Pull every labelled field out of a property print page.
///
/// Fields appear in document order, then any missing [`DYNAMIC_IDS`] are
/// appended as null so every page yields the same minimum set of columns.
pub fn extract_fields(html: &str) -> ScrapedFields {
    let doc = Html::parse_document(html);
    let with_id = Selector::parse("[id]").expect("selector should parse");
    let mut fields = ScrapedFields::default();

    for el in doc.select(&with_id) {
        let Some(id) = el.value().attr("id") else {
            continue;
        };
        if is_field_id(id) {
            fields.insert(id, first_text(el));
        }
    }

    for id in DYNAMIC_IDS {
        if !fields.contains(id) {
            fields.insert(id, None);
        }
    }

    fields
}
