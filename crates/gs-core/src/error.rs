use thiserror::Error;

/// Errors originating from the render pipeline.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Non-positive width, or a fill/value symbol that is not one character.
    #[error("Invalid {name} `{value}' - {reason}")]
    InvalidDimension {
        /// Which parameter was rejected.
        name: &'static str,
        /// The offending value, as given.
        value: String,
        /// Constraint the value violates.
        reason: &'static str,
    },

    /// Stacked layers differ in row count or row length.
    #[error("Input layers have heterogeneous dimensions: {detail}")]
    HeterogeneousLayers {
        /// Which rows disagree, and how.
        detail: String,
    },

    /// An input element is neither a feature, a geometry, nor a geometry-interface object.
    #[error(
        "An input object isn't a feature, geometry, or object supporting a geometry interface: {value}"
    )]
    UnrecognizedGeometryShape {
        /// Abbreviated rendering of the element.
        value: String,
    },

    /// Tagged as a geometry or feature, but the payload does not deserialize.
    #[error("Malformed geometry: {0}")]
    MalformedGeometry(#[from] serde_json::Error),

    /// Bounds must be inferred but the source holds no coordinates.
    #[error("Cannot infer bounds - geometry source contains no coordinates")]
    EmptyExtent,

    /// A requested attribute is absent from a feature.
    #[error("Feature has no property `{name}'")]
    MissingProperty {
        /// Property name that was requested.
        name: String,
    },

    /// The table formatter received no rows.
    #[error("Cannot format table - input is empty")]
    EmptyTable,
}

/// Convenience alias used across the workspace.
pub type Result<T> = std::result::Result<T, CoreError>;

impl CoreError {
    /// Width rejection, shared by the transform builder and the text renderer.
    #[must_use]
    pub fn invalid_width(width: i64) -> Self {
        Self::InvalidDimension {
            name: "width",
            value: width.to_string(),
            reason: "must be > 0",
        }
    }

    /// Symbol rejection for fill/value characters.
    #[must_use]
    pub fn invalid_symbol(name: &'static str, symbol: &str) -> Self {
        Self::InvalidDimension {
            name,
            value: symbol.to_string(),
            reason: "must be 1 character long",
        }
    }
}

/// Validate that `symbol` is exactly one character and return it.
///
/// # Errors
/// Returns [`CoreError::InvalidDimension`] for empty or multi-character input.
///
/// # Example
/// ```
/// use gs_core::error::single_char;
/// assert_eq!(single_char("fill value", "*").unwrap(), '*');
/// assert!(single_char("fill value", "ab").is_err());
/// assert!(single_char("pixel value", "").is_err());
/// ```
pub fn single_char(name: &'static str, symbol: &str) -> Result<char> {
    let mut chars = symbol.chars();
    match (chars.next(), chars.next()) {
        (Some(ch), None) => Ok(ch),
        _ => Err(CoreError::invalid_symbol(name, symbol)),
    }
}
