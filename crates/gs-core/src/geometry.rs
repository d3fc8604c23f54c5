use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

/// A single coordinate pair. Extra ordinates (z, m) are dropped on input.
///
/// # Example
/// ```
/// use gs_core::geometry::Position;
/// let p: Position = serde_json::from_str("[1.5, -2.0, 30.0]").unwrap();
/// assert_eq!(p, Position::new(1.5, -2.0));
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Deserialize, Serialize)]
#[serde(try_from = "Vec<f64>", into = "[f64; 2]")]
pub struct Position {
    /// Easting / longitude.
    pub x: f64,
    /// Northing / latitude.
    pub y: f64,
}

impl Position {
    /// Build a position from its two ordinates.
    #[must_use]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

impl TryFrom<Vec<f64>> for Position {
    type Error = String;

    fn try_from(ords: Vec<f64>) -> Result<Self, Self::Error> {
        match ords.as_slice() {
            [x, y, ..] => Ok(Self::new(*x, *y)),
            _ => Err(format!(
                "a position needs at least 2 ordinates, got {}",
                ords.len()
            )),
        }
    }
}

impl From<Position> for [f64; 2] {
    fn from(p: Position) -> Self {
        [p.x, p.y]
    }
}

impl From<(f64, f64)> for Position {
    fn from((x, y): (f64, f64)) -> Self {
        Self::new(x, y)
    }
}

/// GeoJSON geometry, tagged by its `type` member.
///
/// # Example
/// ```
/// use gs_core::geometry::{Geometry, Position};
/// let g: Geometry = serde_json::from_str(
///     r#"{"type": "Point", "coordinates": [10.0, 20.0]}"#,
/// ).unwrap();
/// assert_eq!(g, Geometry::Point { coordinates: Position::new(10.0, 20.0) });
/// ```
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
#[serde(tag = "type")]
pub enum Geometry {
    /// A single position.
    Point {
        /// The position.
        coordinates: Position,
    },
    /// Unconnected positions.
    MultiPoint {
        /// The positions.
        coordinates: Vec<Position>,
    },
    /// An open or closed polyline.
    LineString {
        /// Vertices, in drawing order.
        coordinates: Vec<Position>,
    },
    /// Several polylines.
    MultiLineString {
        /// One vertex list per line.
        coordinates: Vec<Vec<Position>>,
    },
    /// Exterior ring followed by zero or more holes.
    Polygon {
        /// Linear rings.
        coordinates: Vec<Vec<Position>>,
    },
    /// Several polygons.
    MultiPolygon {
        /// One ring list per polygon.
        coordinates: Vec<Vec<Vec<Position>>>,
    },
    /// Heterogeneous geometries.
    GeometryCollection {
        /// Member geometries.
        geometries: Vec<Geometry>,
    },
}

impl Geometry {
    /// Shorthand for a point geometry.
    #[must_use]
    pub const fn point(x: f64, y: f64) -> Self {
        Self::Point {
            coordinates: Position::new(x, y),
        }
    }

    /// Axis-aligned rectangle as a closed single-ring polygon.
    ///
    /// # Example
    /// ```
    /// use gs_core::geometry::Geometry;
    /// let g = Geometry::rectangle(0.0, 0.0, 2.0, 1.0);
    /// let mut n = 0;
    /// g.for_each_position(&mut |_| n += 1);
    /// assert_eq!(n, 5);
    /// ```
    #[must_use]
    pub fn rectangle(x_min: f64, y_min: f64, x_max: f64, y_max: f64) -> Self {
        Self::Polygon {
            coordinates: vec![vec![
                Position::new(x_min, y_min),
                Position::new(x_max, y_min),
                Position::new(x_max, y_max),
                Position::new(x_min, y_max),
                Position::new(x_min, y_min),
            ]],
        }
    }

    /// GeoJSON `type` name of this geometry.
    #[must_use]
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Point { .. } => "Point",
            Self::MultiPoint { .. } => "MultiPoint",
            Self::LineString { .. } => "LineString",
            Self::MultiLineString { .. } => "MultiLineString",
            Self::Polygon { .. } => "Polygon",
            Self::MultiPolygon { .. } => "MultiPolygon",
            Self::GeometryCollection { .. } => "GeometryCollection",
        }
    }

    /// Visit every position of every part, ring and member.
    pub fn for_each_position(&self, f: &mut impl FnMut(Position)) {
        match self {
            Self::Point { coordinates } => f(*coordinates),
            Self::MultiPoint { coordinates } | Self::LineString { coordinates } => {
                coordinates.iter().copied().for_each(f);
            }
            Self::MultiLineString { coordinates } | Self::Polygon { coordinates } => {
                coordinates.iter().flatten().copied().for_each(f);
            }
            Self::MultiPolygon { coordinates } => {
                coordinates.iter().flatten().flatten().copied().for_each(f);
            }
            Self::GeometryCollection { geometries } => {
                for g in geometries {
                    g.for_each_position(f);
                }
            }
        }
    }
}

/// A geometry plus its attributes.
///
/// Only the geometry is rendered; properties feed the attribute table.
#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct Feature {
    /// Optional feature identifier.
    #[serde(default)]
    pub id: Option<Value>,
    /// The feature's shape.
    pub geometry: Geometry,
    /// Attribute name → scalar value, in source order.
    #[serde(default, deserialize_with = "null_as_empty")]
    pub properties: Map<String, Value>,
}

impl Feature {
    /// Wrap a geometry with no attributes.
    #[must_use]
    pub fn new(geometry: Geometry) -> Self {
        Self {
            id: None,
            geometry,
            properties: Map::new(),
        }
    }

    /// Builder-style attribute insertion.
    #[must_use]
    pub fn with_property(mut self, name: &str, value: impl Into<Value>) -> Self {
        self.properties.insert(name.to_string(), value.into());
        self
    }
}

// `"properties": null` is legal GeoJSON.
fn null_as_empty<'de, D>(deserializer: D) -> Result<Map<String, Value>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Map<String, Value>>::deserialize(deserializer)?.unwrap_or_default())
}

/// Anything able to describe itself as a plain GeoJSON mapping on demand.
///
/// # Example
/// ```
/// use gs_core::geometry::GeoInterface;
/// use serde_json::{json, Value};
///
/// struct Station { lon: f64, lat: f64 }
/// impl GeoInterface for Station {
///     fn geo_interface(&self) -> Value {
///         json!({"type": "Point", "coordinates": [self.lon, self.lat]})
///     }
/// }
/// let s = Station { lon: 2.35, lat: 48.85 };
/// assert_eq!(s.geo_interface()["type"], "Point");
/// ```
pub trait GeoInterface {
    /// The GeoJSON mapping for this object (a geometry or a feature).
    fn geo_interface(&self) -> Value;

    /// Consuming variant; avoids a clone when the object already is a mapping.
    fn into_geo_interface(self: Box<Self>) -> Value {
        self.geo_interface()
    }
}

impl GeoInterface for Value {
    fn geo_interface(&self) -> Value {
        self.clone()
    }

    fn into_geo_interface(self: Box<Self>) -> Value {
        *self
    }
}

impl GeoInterface for Geometry {
    fn geo_interface(&self) -> Value {
        serde_json::to_value(self).unwrap_or(Value::Null)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn polygon_with_hole_deserializes() {
        let g: Geometry = serde_json::from_value(json!({
            "type": "Polygon",
            "coordinates": [
                [[0, 0], [4, 0], [4, 4], [0, 4], [0, 0]],
                [[1, 1], [2, 1], [2, 2], [1, 1]]
            ]
        }))
        .unwrap();
        let Geometry::Polygon { coordinates } = &g else {
            panic!("expected polygon, got {}", g.type_name());
        };
        assert_eq!(coordinates.len(), 2);
        assert_eq!(coordinates[1][1], Position::new(2.0, 1.0));
    }

    #[test]
    fn short_position_is_rejected() {
        let res: Result<Geometry, _> =
            serde_json::from_value(json!({"type": "Point", "coordinates": [1.0]}));
        assert!(res.is_err());
    }

    #[test]
    fn feature_accepts_null_properties() {
        let f: Feature = serde_json::from_value(json!({
            "type": "Feature",
            "geometry": {"type": "Point", "coordinates": [0, 0]},
            "properties": null
        }))
        .unwrap();
        assert!(f.properties.is_empty());
        assert_eq!(f.geometry, Geometry::point(0.0, 0.0));
    }

    #[test]
    fn collection_positions_are_visited_recursively() {
        let g = Geometry::GeometryCollection {
            geometries: vec![Geometry::point(1.0, 1.0), Geometry::rectangle(0.0, 0.0, 1.0, 1.0)],
        };
        let mut n = 0;
        g.for_each_position(&mut |_| n += 1);
        assert_eq!(n, 6);
    }

    #[test]
    fn geometry_interface_round_trips_type_tag() {
        let v = Geometry::point(3.0, 4.0).geo_interface();
        assert_eq!(v, json!({"type": "Point", "coordinates": [3.0, 4.0]}));
    }
}
