use gs_core::error::{CoreError, Result};
use serde_json::{Map, Value};

use crate::grid::LINE_SEP;

/// Text of one attribute value: strings bare, everything else as JSON.
fn cell_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Format an ordered attribute mapping as a two-column ASCII table.
///
/// Names are left-aligned, values right-aligned. No trailing line separator.
///
/// # Errors
/// [`CoreError::EmptyTable`] when `rows` is empty.
///
/// # Example
/// ```
/// use gs_ascii::table::format_table;
/// use serde_json::json;
///
/// let rows = json!({"ALAND": "883338808", "AWATER": 639183, "CBSAFP": null});
/// let table = format_table(rows.as_object().unwrap()).unwrap();
/// assert_eq!(table, "\
/// +--------+-----------+
/// | ALAND  | 883338808 |
/// | AWATER |    639183 |
/// | CBSAFP |      null |
/// +--------+-----------+");
/// ```
pub fn format_table(rows: &Map<String, Value>) -> Result<String> {
    if rows.is_empty() {
        return Err(CoreError::EmptyTable);
    }
    let rows: Vec<(&str, String)> = rows
        .iter()
        .map(|(k, v)| (k.as_str(), cell_text(v)))
        .collect();

    let name_width = rows.iter().map(|(k, _)| k.chars().count()).max().unwrap_or(0);
    let value_width = rows.iter().map(|(_, v)| v.chars().count()).max().unwrap_or(0);

    // +----------+-------+
    // | Property | Value |
    //  ^        ^ ^     ^   (un espace de marge de chaque côté)
    let divider = format!(
        "+{}+{}+",
        "-".repeat(name_width + 2),
        "-".repeat(value_width + 2)
    );

    let mut lines = Vec::with_capacity(rows.len() + 2);
    lines.push(divider.clone());
    for (name, value) in &rows {
        let name_pad = name_width - name.chars().count();
        let value_pad = value_width - value.chars().count();
        lines.push(format!(
            "| {name}{} | {}{value} |",
            " ".repeat(name_pad),
            " ".repeat(value_pad)
        ));
    }
    lines.push(divider);
    Ok(lines.join(LINE_SEP))
}

/// Pick `names` out of `properties`, in the order given.
///
/// # Errors
/// [`CoreError::MissingProperty`] for the first name absent from `properties`.
pub fn select_properties(
    properties: &Map<String, Value>,
    names: &[String],
) -> Result<Map<String, Value>> {
    names
        .iter()
        .map(|name| {
            properties
                .get(name)
                .map(|v| (name.clone(), v.clone()))
                .ok_or_else(|| CoreError::MissingProperty { name: name.clone() })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn empty_table_is_an_error() {
        assert!(matches!(format_table(&Map::new()), Err(CoreError::EmptyTable)));
    }

    #[test]
    fn widths_count_characters() {
        let rows = json!({"nom": "Zürich"});
        let table = format_table(rows.as_object().unwrap()).unwrap();
        let widths: Vec<usize> = table.lines().map(|l| l.chars().count()).collect();
        assert!(widths.windows(2).all(|w| w[0] == w[1]));
        assert!(table.contains("| nom | Zürich |"));
    }

    #[test]
    fn selection_follows_requested_order() {
        let props = json!({"a": 1, "b": 2, "c": 3});
        let picked = select_properties(
            props.as_object().unwrap(),
            &["c".to_string(), "a".to_string()],
        )
        .unwrap();
        let keys: Vec<&String> = picked.keys().collect();
        assert_eq!(keys, ["c", "a"]);
    }

    #[test]
    fn missing_property_is_named() {
        let props = json!({"a": 1});
        let err = select_properties(props.as_object().unwrap(), &["zz".to_string()]).unwrap_err();
        assert_eq!(err.to_string(), "Feature has no property `zz'");
    }
}
