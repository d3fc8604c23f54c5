use std::fmt;
use std::iter;

use serde_json::Value;

use crate::error::{CoreError, Result};
use crate::geometry::{Feature, GeoInterface, Geometry};

/// Longest excerpt of an offending value quoted in error messages.
const EXCERPT_CHARS: usize = 80;

/// One element of a geometry source.
pub enum GeoInput {
    /// Already a plain geometry.
    Geometry(Geometry),
    /// A feature; its geometry is extracted.
    Feature(Feature),
    /// An object producing a GeoJSON mapping on demand (raw JSON included).
    Interface(Box<dyn GeoInterface>),
}

impl fmt::Debug for GeoInput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Geometry(g) => f.debug_tuple("Geometry").field(g).finish(),
            Self::Feature(ft) => f.debug_tuple("Feature").field(ft).finish(),
            Self::Interface(_) => f.write_str("Interface(..)"),
        }
    }
}

impl From<Geometry> for GeoInput {
    fn from(g: Geometry) -> Self {
        Self::Geometry(g)
    }
}

impl From<Feature> for GeoInput {
    fn from(f: Feature) -> Self {
        Self::Feature(f)
    }
}

impl From<Value> for GeoInput {
    fn from(v: Value) -> Self {
        Self::Interface(Box::new(v))
    }
}

impl From<Box<dyn GeoInterface>> for GeoInput {
    fn from(obj: Box<dyn GeoInterface>) -> Self {
        Self::Interface(obj)
    }
}

/// Reduce one input element to its plain geometry.
///
/// Interface mappings are discriminated by their `type` tag: `"Feature"`
/// yields its `geometry` member, a mapping carrying `coordinates` (or
/// `geometries`) is the geometry itself.
///
/// # Errors
/// [`CoreError::UnrecognizedGeometryShape`] when the mapping is neither,
/// [`CoreError::MalformedGeometry`] when the payload does not deserialize.
///
/// # Example
/// ```
/// use gs_core::normalize::{extract, GeoInput};
/// use gs_core::geometry::Geometry;
/// use serde_json::json;
///
/// let feature = json!({
///     "type": "Feature",
///     "properties": {"name": "origin"},
///     "geometry": {"type": "Point", "coordinates": [0, 0]}
/// });
/// assert_eq!(extract(GeoInput::from(feature)).unwrap(), Geometry::point(0.0, 0.0));
/// assert!(extract(GeoInput::from(json!({"name": "nothing"}))).is_err());
/// ```
pub fn extract(input: GeoInput) -> Result<Geometry> {
    match input {
        GeoInput::Geometry(g) => Ok(g),
        GeoInput::Feature(f) => Ok(f.geometry),
        GeoInput::Interface(obj) => from_mapping(obj.into_geo_interface()),
    }
}

fn from_mapping(value: Value) -> Result<Geometry> {
    let Value::Object(mut map) = value else {
        return Err(unrecognized(&value));
    };
    if map.get("type").and_then(Value::as_str) == Some("Feature") {
        let geometry = map.remove("geometry").unwrap_or(Value::Null);
        return Ok(serde_json::from_value(geometry)?);
    }
    if map.contains_key("coordinates") || map.contains_key("geometries") {
        return Ok(serde_json::from_value(Value::Object(map))?);
    }
    Err(unrecognized(&Value::Object(map)))
}

fn unrecognized(value: &Value) -> CoreError {
    let text = value.to_string();
    let value = if text.chars().count() > EXCERPT_CHARS {
        let head: String = text.chars().take(EXCERPT_CHARS).collect();
        format!("{head}...")
    } else {
        text
    };
    CoreError::UnrecognizedGeometryShape { value }
}

/// Anything that can be read as a sequence of [`GeoInput`]s.
///
/// Single objects (a geometry, a feature, one JSON mapping, one interface
/// object) form a one-element sequence; they are never iterated field by
/// field. Collections, JSON arrays and iterators yield one input per element.
pub trait GeoSource {
    /// The input cursor.
    type Inputs: Iterator<Item = GeoInput>;

    /// Consume the source into its input cursor.
    fn into_inputs(self) -> Self::Inputs;
}

macro_rules! single_source {
    ($($ty:ty),* $(,)?) => {
        $(
            impl GeoSource for $ty {
                type Inputs = iter::Once<GeoInput>;

                fn into_inputs(self) -> Self::Inputs {
                    iter::once(GeoInput::from(self))
                }
            }
        )*
    };
}

single_source!(Geometry, Feature, Box<dyn GeoInterface>);

/// A JSON array is a collection, one input per element; any other value is
/// a single interface object.
impl GeoSource for Value {
    type Inputs = std::vec::IntoIter<GeoInput>;

    fn into_inputs(self) -> Self::Inputs {
        let inputs: Vec<GeoInput> = match self {
            Value::Array(items) => items.into_iter().map(GeoInput::from).collect(),
            other => vec![GeoInput::from(other)],
        };
        inputs.into_iter()
    }
}

impl GeoSource for GeoInput {
    type Inputs = iter::Once<GeoInput>;

    fn into_inputs(self) -> Self::Inputs {
        iter::once(self)
    }
}

impl<T: Into<GeoInput>> GeoSource for Vec<T> {
    type Inputs = iter::Map<std::vec::IntoIter<T>, fn(T) -> GeoInput>;

    fn into_inputs(self) -> Self::Inputs {
        self.into_iter().map(<T as Into<GeoInput>>::into as fn(T) -> GeoInput)
    }
}

impl<'a> GeoSource for &'a [Geometry] {
    type Inputs = iter::Map<std::slice::Iter<'a, Geometry>, fn(&'a Geometry) -> GeoInput>;

    fn into_inputs(self) -> Self::Inputs {
        self.iter().map(clone_input as fn(&'a Geometry) -> GeoInput)
    }
}

fn clone_input(g: &Geometry) -> GeoInput {
    GeoInput::Geometry(g.clone())
}

/// Adapter for arbitrary, possibly single-pass, iterators.
///
/// # Example
/// ```
/// use gs_core::normalize::{geometries, Stream};
/// use gs_core::geometry::Geometry;
///
/// let lazy = (0..3).map(|i| Geometry::point(f64::from(i), 0.0));
/// let out: Vec<_> = geometries(Stream(lazy)).collect::<Result<_, _>>().unwrap();
/// assert_eq!(out.len(), 3);
/// ```
#[derive(Debug, Clone)]
pub struct Stream<I>(pub I);

impl<I> GeoSource for Stream<I>
where
    I: IntoIterator,
    I::Item: Into<GeoInput>,
{
    type Inputs = iter::Map<I::IntoIter, fn(I::Item) -> GeoInput>;

    fn into_inputs(self) -> Self::Inputs {
        self.0
            .into_iter()
            .map(<I::Item as Into<GeoInput>>::into as fn(I::Item) -> GeoInput)
    }
}

/// Lazy, single-pass sequence of plain geometries.
#[derive(Debug)]
pub struct Geometries<I> {
    inputs: I,
}

impl<I: Iterator<Item = GeoInput>> Iterator for Geometries<I> {
    type Item = Result<Geometry>;

    fn next(&mut self) -> Option<Self::Item> {
        self.inputs.next().map(extract)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inputs.size_hint()
    }
}

/// Normalize a source into a lazy stream of geometries.
///
/// # Example
/// ```
/// use gs_core::normalize::geometries;
/// use gs_core::geometry::{Feature, Geometry};
/// use serde_json::json;
///
/// // Un objet isolé compte pour un seul élément.
/// let one = json!({"type": "Point", "coordinates": [1, 2]});
/// assert_eq!(geometries(one).count(), 1);
///
/// let mixed = vec![
///     Feature::new(Geometry::point(0.0, 0.0)).into(),
///     Geometry::point(1.0, 1.0).into(),
///     gs_core::normalize::GeoInput::from(json!({"type": "Point", "coordinates": [2, 2]})),
/// ];
/// assert_eq!(geometries(mixed).filter(Result::is_ok).count(), 3);
/// ```
pub fn geometries<S: GeoSource>(source: S) -> Geometries<S::Inputs> {
    Geometries {
        inputs: source.into_inputs(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    struct Station;

    impl GeoInterface for Station {
        fn geo_interface(&self) -> Value {
            json!({
                "type": "Feature",
                "properties": {},
                "geometry": {"type": "Point", "coordinates": [5, 6]}
            })
        }
    }

    #[test]
    fn interface_objects_are_converted() {
        let obj: Box<dyn GeoInterface> = Box::new(Station);
        let out: Vec<Geometry> = geometries(obj).collect::<Result<_>>().unwrap();
        assert_eq!(out, vec![Geometry::point(5.0, 6.0)]);
    }

    #[test]
    fn bare_mapping_is_one_element() {
        let fc_like = json!({"type": "LineString", "coordinates": [[0, 0], [1, 1]]});
        let out: Vec<_> = geometries(fc_like).collect();
        assert_eq!(out.len(), 1);
        assert!(matches!(out[0], Ok(Geometry::LineString { .. })));
    }

    #[test]
    fn unknown_mapping_fails_with_type_error() {
        let fc = json!({"type": "FeatureCollection", "features": []});
        let out: Vec<_> = geometries(vec![fc]).collect();
        assert!(matches!(
            out[0],
            Err(CoreError::UnrecognizedGeometryShape { .. })
        ));
    }

    #[test]
    fn json_array_is_a_collection() {
        let arr = json!([
            {"type": "Point", "coordinates": [0, 0]},
            {
                "type": "Feature",
                "properties": {},
                "geometry": {"type": "Point", "coordinates": [1, 1]}
            }
        ]);
        let out: Vec<Geometry> = geometries(arr).collect::<Result<_>>().unwrap();
        assert_eq!(out, vec![Geometry::point(0.0, 0.0), Geometry::point(1.0, 1.0)]);

        let mixed = json!([{"type": "Point", "coordinates": [0, 0]}, 7]);
        let bad: Vec<_> = geometries(mixed).collect();
        assert!(matches!(bad[1], Err(CoreError::UnrecognizedGeometryShape { .. })));
    }

    #[test]
    fn non_object_value_fails() {
        let out: Vec<_> = geometries(json!(42)).collect();
        assert!(matches!(
            out[0],
            Err(CoreError::UnrecognizedGeometryShape { ref value }) if value == "42"
        ));
    }

    #[test]
    fn feature_with_bad_geometry_is_malformed() {
        let out: Vec<_> = geometries(json!({"type": "Feature", "geometry": null})).collect();
        assert!(matches!(out[0], Err(CoreError::MalformedGeometry(_))));
    }

    #[test]
    fn long_values_are_abbreviated() {
        let big = json!({"name": "x".repeat(500)});
        let Some(Err(err)) = geometries(big).next() else {
            panic!("expected an error");
        };
        assert!(err.to_string().ends_with("..."));
    }

    #[test]
    fn stream_is_lazy() {
        let mut pulled = 0;
        let src = (0..10).map(|i| {
            pulled += 1;
            Geometry::point(f64::from(i), 0.0)
        });
        let first = geometries(Stream(src)).next();
        assert!(first.is_some());
        assert_eq!(pulled, 1);
    }
}
