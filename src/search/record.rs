//! Publication Mapping
//!
//! Converts the loosely structured publications produced by a search backend
//! into [`PaperRecord`]s. Every field lives under `bib`; anything missing,
//! null or of an unexpected shape maps to `"N/A"` rather than an error.

use serde_json::Value;

use crate::models::{PaperRecord, NOT_AVAILABLE};

impl PaperRecord {
    /// Map a raw publication (`{ "bib": { ... } }`) into a record. Never fails.
    pub fn from_publication(publication: &Value) -> Self {
        let bib = publication.get("bib");
        let field = |key: &str| bib.and_then(|b| b.get(key));

        Self {
            title: text_or_na(field("title")),
            author: join_authors(field("author")),
            year: text_or_na(field("pub_year")),
            journal: text_or_na(field("venue")),
            abstract_text: text_or_na(field("abstract")),
        }
    }
}

fn text_or_na(value: Option<&Value>) -> String {
    match value {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Number(n)) => n.to_string(),
        _ => NOT_AVAILABLE.to_string(),
    }
}

/// Join an author list with `", "`. An empty or missing list is `"N/A"`;
/// a bare string is taken as already joined.
fn join_authors(value: Option<&Value>) -> String {
    match value {
        Some(Value::Array(authors)) => {
            let names: Vec<String> = authors
                .iter()
                .filter_map(|a| match a {
                    Value::String(s) => Some(s.clone()),
                    Value::Number(n) => Some(n.to_string()),
                    _ => None,
                })
                .collect();

            if names.is_empty() {
                NOT_AVAILABLE.to_string()
            } else {
                names.join(", ")
            }
        }
        Some(Value::String(s)) => s.clone(),
        _ => NOT_AVAILABLE.to_string(),
    }
}
