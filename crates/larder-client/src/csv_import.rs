//! CSV import reshaping.
//!
//! A CSV import must carry a header row. Header names are matched
//! case-insensitively (and trimmed) against the collection's expected field
//! list; if any expected column is missing the whole import is rejected with
//! an error naming the missing columns. Rows whose values are all empty are
//! dropped, and surviving rows are coerced to exactly the expected field
//! set, with unmatched expected fields defaulting to the empty string.

use larder_core::{Error, FieldKind, FieldMap, FieldSpec, Result};

/// Parse CSV text into field maps ready for the bulk endpoint.
///
/// Returns an error before any network call when the header is unusable or
/// no rows survive filtering.
pub fn parse_rows(text: &str, fields: &[FieldSpec]) -> Result<Vec<FieldMap>> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .flexible(true)
        .from_reader(text.as_bytes());

    let headers: Vec<String> = reader
        .headers()
        .map_err(|e| Error::Csv(format!("Error parsing CSV: {}", e)))?
        .iter()
        .map(|h| h.trim().to_lowercase())
        .collect();

    let missing: Vec<&str> = fields
        .iter()
        .map(|f| f.name)
        .filter(|name| !headers.contains(&name.to_lowercase()))
        .collect();
    if !missing.is_empty() {
        return Err(Error::Csv(format!(
            "Missing required fields: {}",
            missing.join(", ")
        )));
    }

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record.map_err(|e| Error::Csv(format!("Error parsing CSV: {}", e)))?;
        if record.iter().all(|value| value.trim().is_empty()) {
            continue;
        }

        let mut row = FieldMap::new();
        for field in fields {
            let value = headers
                .iter()
                .position(|h| h == &field.name.to_lowercase())
                .and_then(|idx| record.get(idx))
                .unwrap_or("");
            row.insert(field.name.to_string(), coerce(field, value));
        }
        rows.push(row);
    }

    if rows.is_empty() {
        return Err(Error::Csv(
            "The CSV file appears to be empty or invalid.".to_string(),
        ));
    }

    Ok(rows)
}

// Season columns hold delimited lists ("spring, summer" or "spring;summer");
// split them into the array shape the rest of the system expects. Everything
// else stays a plain string.
fn coerce(field: &FieldSpec, value: &str) -> serde_json::Value {
    match field.kind {
        FieldKind::Seasons => {
            let seasons: Vec<serde_json::Value> = value
                .split([',', ';'])
                .map(|s| s.trim().to_lowercase())
                .filter(|s| !s.is_empty())
                .map(serde_json::Value::String)
                .collect();
            serde_json::Value::Array(seasons)
        }
        _ => serde_json::Value::String(value.to_string()),
    }
}
