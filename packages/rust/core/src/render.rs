//! Render an enriched herb entry as a front-matter document.

use serde_json::Value;

use flora_shared::{Entry, FloraError, Result};

/// Title shown for a herb.
///
/// A string `name` is used as-is and any other `name` value as compact JSON.
/// Without `name`, the whole entry stands in as the title.
pub fn display_title(entry: &Entry) -> String {
    match entry.get("name") {
        Some(Value::String(name)) => name.clone(),
        Some(other) => other.to_string(),
        None => Value::Object(entry.clone()).to_string(),
    }
}

/// Build the document for one herb:
///
/// ```text
/// ---
/// title: <title>
/// herb_id: <herb_id>
/// <entry as YAML>
/// ---
/// ```
pub fn render_document(herb_id: &str, entry: &Entry) -> Result<String> {
    let title = display_title(entry);
    let body = serde_yaml::to_string(entry)
        .map_err(|e| FloraError::Serialize(format!("herb {herb_id}: {e}")))?;

    Ok(format!("---\ntitle: {title}\nherb_id: {herb_id}\n{body}\n---"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn entry(value: Value) -> Entry {
        match value {
            Value::Object(map) => map,
            _ => panic!("fixture must be an object"),
        }
    }

    #[test]
    fn header_carries_title_and_id() {
        let doc = render_document("ginkgo", &entry(json!({"name": "Ginkgo"}))).unwrap();
        assert!(doc.starts_with("---\ntitle: Ginkgo\nherb_id: ginkgo\n"));
        assert!(doc.contains("name: Ginkgo"));
        assert!(doc.ends_with("\n---"));
    }

    #[test]
    fn body_is_the_full_entry() {
        let e = entry(json!({
            "name": "Lotus",
            "repository": "acme/lotus",
            "data": [{"path": "dataset/blooms.csv"}]
        }));
        let doc = render_document("lotus", &e).unwrap();

        let body = doc
            .trim_start_matches("---\ntitle: Lotus\nherb_id: lotus\n")
            .trim_end_matches("---");
        let parsed: Value = serde_yaml::from_str(body).unwrap();
        assert_eq!(parsed, Value::Object(e));
    }

    #[test]
    fn title_falls_back_to_entry() {
        let e = entry(json!({"repository": "acme/nameless"}));
        assert_eq!(display_title(&e), r#"{"repository":"acme/nameless"}"#);

        let doc = render_document("nameless", &e).unwrap();
        assert!(doc.contains("herb_id: nameless"));
    }

    #[test]
    fn non_string_name_is_rendered_as_json() {
        let e = entry(json!({"name": {"en": "Mint"}}));
        assert_eq!(display_title(&e), r#"{"en":"Mint"}"#);
    }
}
