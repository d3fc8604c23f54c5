use std::io::Read;

use anyhow::{Context, Result, bail};
use gs_core::geometry::{Feature, Geometry};
use serde_json::Value;

/// Longest excerpt of an unrecognized value quoted in errors.
const EXCERPT_CHARS: usize = 60;

/// Read one input, a path or `-` for stdin, into its features.
///
/// # Errors
/// Returns an error if the input cannot be read or is not GeoJSON.
pub fn read_input(source: &str) -> Result<Vec<Feature>> {
    let text = if source == "-" {
        let mut buf = String::new();
        std::io::stdin()
            .read_to_string(&mut buf)
            .context("cannot read stdin")?;
        buf
    } else {
        std::fs::read_to_string(source).with_context(|| format!("cannot read {source}"))?
    };
    let features = parse_document(&text).with_context(|| format!("in {source}"))?;
    log::info!("{source}: {} features", features.len());
    Ok(features)
}

/// Parse a GeoJSON document into features.
///
/// A FeatureCollection yields its members, a bare geometry becomes a
/// feature without properties, and arrays are flattened.
///
/// # Errors
/// Returns an error on invalid JSON or an unrecognized object.
pub fn parse_document(text: &str) -> Result<Vec<Feature>> {
    let doc: Value = serde_json::from_str(text).context("input is not valid JSON")?;
    let mut features = Vec::new();
    collect(doc, &mut features)?;
    Ok(features)
}

fn collect(value: Value, out: &mut Vec<Feature>) -> Result<()> {
    let kind = value.get("type").and_then(Value::as_str).map(str::to_owned);
    match (value, kind.as_deref()) {
        (Value::Array(items), _) => items.into_iter().try_for_each(|v| collect(v, out)),
        (Value::Object(mut map), Some("FeatureCollection")) => match map.remove("features") {
            Some(Value::Array(items)) => items.into_iter().try_for_each(|v| collect(v, out)),
            _ => bail!("FeatureCollection without a `features` array"),
        },
        (doc @ Value::Object(_), Some("Feature")) => {
            if doc.get("geometry").is_none_or(Value::is_null) {
                log::warn!("skipping feature without geometry");
                return Ok(());
            }
            out.push(serde_json::from_value(doc).context("malformed feature")?);
            Ok(())
        }
        (doc @ Value::Object(_), Some(_)) => {
            let geometry: Geometry = serde_json::from_value(doc).context("malformed geometry")?;
            out.push(Feature::new(geometry));
            Ok(())
        }
        (other, _) => {
            let mut text = other.to_string();
            if text.chars().count() > EXCERPT_CHARS {
                text = text.chars().take(EXCERPT_CHARS).collect::<String>() + "...";
            }
            bail!("not a GeoJSON object: {text}")
        }
    }
}
