use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::bounds::Bounds;

/// Default number of output columns.
pub const DEFAULT_WIDTH: i64 = 40;
/// Default background character.
pub const DEFAULT_FILL: &str = " ";
/// Default covered-cell character.
pub const DEFAULT_VALUE: &str = "+";
/// Per-layer value characters used when stacking without explicit values.
pub const DEFAULT_RAMP: &str = "0123456789*#@0=-%$";

/// Options for a single render call.
///
/// Symbols are kept as strings so that invalid ones (empty, several
/// characters) can be reported rather than silently truncated.
///
/// # Example
/// ```
/// use gs_core::config::RenderOptions;
/// let opts = RenderOptions::default();
/// assert_eq!(opts.width, 40);
/// assert_eq!(opts.fill, " ");
/// assert_eq!(opts.value, "+");
/// assert!(!opts.all_touched);
/// ```
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct RenderOptions {
    /// Number of columns; rows follow from the extent's aspect ratio.
    pub width: i64,
    /// Character for uncovered cells.
    pub fill: String,
    /// Character for covered cells.
    pub value: String,
    /// Cover every cell a geometry touches, not only cells whose center it covers.
    pub all_touched: bool,
    /// Explicit extent; inferred from the geometries when absent.
    pub bbox: Option<Bounds>,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            width: DEFAULT_WIDTH,
            fill: DEFAULT_FILL.to_string(),
            value: DEFAULT_VALUE.to_string(),
            all_touched: false,
            bbox: None,
        }
    }
}

impl RenderOptions {
    /// Same options with another width.
    #[must_use]
    pub fn with_width(mut self, width: i64) -> Self {
        self.width = width;
        self
    }

    /// Same options with other fill/value symbols.
    #[must_use]
    pub fn with_symbols(mut self, fill: &str, value: &str) -> Self {
        self.fill = fill.to_string();
        self.value = value.to_string();
        self
    }

    /// Same options with an explicit extent.
    #[must_use]
    pub fn with_bbox(mut self, bbox: impl Into<Bounds>) -> Self {
        self.bbox = Some(bbox.into());
        self
    }

    /// Same options with the given coverage policy.
    #[must_use]
    pub fn with_all_touched(mut self, all_touched: bool) -> Self {
        self.all_touched = all_touched;
        self
    }
}

/// Full front-end configuration: render options plus stacking and paging.
#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct RenderConfig {
    /// Per-layer render options.
    pub render: RenderOptions,
    /// Stacking settings.
    pub stack: StackOptions,
    /// Attribute names shown above each page, in order.
    pub properties: Option<Vec<String>>,
}

/// Settings for compositing several layers.
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct StackOptions {
    /// Background of the composite.
    pub fill: String,
    /// Value characters handed out to layers in order, cycling.
    pub ramp: String,
}

impl Default for StackOptions {
    fn default() -> Self {
        Self {
            fill: DEFAULT_FILL.to_string(),
            ramp: DEFAULT_RAMP.to_string(),
        }
    }
}

/// Structure TOML intermédiaire : toutes les sections sont optionnelles.
#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct ConfigFile {
    render: Option<RenderSection>,
    stack: Option<StackSection>,
    paginate: Option<PaginateSection>,
}

/// Render section, every field optional for partial override.
#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct RenderSection {
    width: Option<i64>,
    fill: Option<String>,
    value: Option<String>,
    all_touched: Option<bool>,
    bbox: Option<Bounds>,
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct StackSection {
    fill: Option<String>,
    ramp: Option<String>,
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct PaginateSection {
    properties: Option<Vec<String>>,
}

/// Parse TOML text and merge it over the defaults.
///
/// # Errors
/// Returns an error if the text is not valid TOML for this layout.
///
/// # Example
/// ```
/// use gs_core::config::parse_config;
/// let config = parse_config("[render]\nwidth = 20\nvalue = \"#\"\n").unwrap();
/// assert_eq!(config.render.width, 20);
/// assert_eq!(config.render.value, "#");
/// assert_eq!(config.render.fill, " ");
/// ```
pub fn parse_config(content: &str) -> Result<RenderConfig> {
    let file: ConfigFile = toml::from_str(content).context("invalid TOML configuration")?;
    let mut config = RenderConfig::default();

    if let Some(r) = file.render {
        if let Some(v) = r.width {
            config.render.width = v;
        }
        if let Some(v) = r.fill {
            config.render.fill = v;
        }
        if let Some(v) = r.value {
            config.render.value = v;
        }
        if let Some(v) = r.all_touched {
            config.render.all_touched = v;
        }
        if r.bbox.is_some() {
            config.render.bbox = r.bbox;
        }
    }
    if let Some(s) = file.stack {
        if let Some(v) = s.fill {
            config.stack.fill = v;
        }
        if let Some(v) = s.ramp {
            config.stack.ramp = v;
        }
    }
    if let Some(p) = file.paginate {
        config.properties = p.properties;
    }
    Ok(config)
}

/// Charge un fichier TOML et fusionne avec les valeurs par défaut.
///
/// # Errors
/// Returns an error if the file cannot be read or parsed.
///
/// # Example
/// ```no_run
/// use gs_core::config::load_config;
/// use std::path::Path;
/// let config = load_config(Path::new("geoscii.toml")).unwrap();
/// ```
pub fn load_config(path: &Path) -> Result<RenderConfig> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("cannot read {}", path.display()))?;
    let config = parse_config(&content)
        .with_context(|| format!("TOML parse error in {}", path.display()))?;
    log::debug!("loaded configuration from {}", path.display());
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn empty_file_yields_defaults() {
        assert_eq!(parse_config("").unwrap(), RenderConfig::default());
    }

    #[test]
    fn partial_sections_merge() {
        let config = parse_config(
            r#"
            [render]
            all_touched = true
            bbox = [0.0, 0.0, 10.0, 10.0]

            [stack]
            fill = "."

            [paginate]
            properties = ["NAME", "AREA"]
            "#,
        )
        .unwrap();
        assert!(config.render.all_touched);
        assert_eq!(config.render.bbox, Some(Bounds::new(0.0, 0.0, 10.0, 10.0)));
        assert_eq!(config.render.width, DEFAULT_WIDTH);
        assert_eq!(config.stack.fill, ".");
        assert_eq!(config.stack.ramp, DEFAULT_RAMP);
        assert_eq!(config.properties, Some(vec!["NAME".to_string(), "AREA".to_string()]));
    }

    #[test]
    fn bundled_sample_matches_defaults() {
        let config = parse_config(include_str!("../../../config/geoscii.toml")).unwrap();
        assert_eq!(config, RenderConfig::default());
    }

    #[test]
    fn unknown_keys_are_rejected() {
        assert!(parse_config("[render]\ncolour = true\n").is_err());
    }

    #[test]
    fn load_config_reads_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[render]\nwidth = 12").unwrap();
        let config = load_config(file.path()).unwrap();
        assert_eq!(config.render.width, 12);
    }

    #[test]
    fn missing_file_names_path() {
        let err = load_config(Path::new("/nonexistent/geoscii.toml")).unwrap_err();
        assert!(err.to_string().contains("/nonexistent/geoscii.toml"));
    }
}
