use serde::{Deserialize, Serialize};

use crate::error::{CoreError, Result};
use crate::geometry::{Geometry, Position};
use crate::normalize::{GeoSource, Geometries, geometries};

/// Axis-aligned bounding rectangle `(x_min, y_min, x_max, y_max)`.
///
/// Degenerate (zero-area) rectangles are valid.
///
/// # Example
/// ```
/// use gs_core::bounds::Bounds;
/// let b = Bounds::from([0.0, 0.0, 10.0, 5.0]);
/// assert_eq!(b.x_extent(), 10.0);
/// assert_eq!(b.y_extent(), 5.0);
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Deserialize, Serialize)]
#[serde(from = "[f64; 4]", into = "[f64; 4]")]
pub struct Bounds {
    /// Western edge.
    pub x_min: f64,
    /// Southern edge.
    pub y_min: f64,
    /// Eastern edge.
    pub x_max: f64,
    /// Northern edge.
    pub y_max: f64,
}

impl Bounds {
    /// Build from the four edges, used verbatim.
    #[must_use]
    pub const fn new(x_min: f64, y_min: f64, x_max: f64, y_max: f64) -> Self {
        Self {
            x_min,
            y_min,
            x_max,
            y_max,
        }
    }

    /// Zero-area rectangle at a single position.
    #[must_use]
    pub const fn at(p: Position) -> Self {
        Self::new(p.x, p.y, p.x, p.y)
    }

    /// Smallest rectangle covering both.
    #[must_use]
    pub fn union(self, other: Self) -> Self {
        Self::new(
            self.x_min.min(other.x_min),
            self.y_min.min(other.y_min),
            self.x_max.max(other.x_max),
            self.y_max.max(other.y_max),
        )
    }

    /// Horizontal extent.
    #[must_use]
    pub fn x_extent(&self) -> f64 {
        self.x_max - self.x_min
    }

    /// Vertical extent.
    #[must_use]
    pub fn y_extent(&self) -> f64 {
        self.y_max - self.y_min
    }
}

impl From<[f64; 4]> for Bounds {
    fn from([x_min, y_min, x_max, y_max]: [f64; 4]) -> Self {
        Self::new(x_min, y_min, x_max, y_max)
    }
}

impl From<(f64, f64, f64, f64)> for Bounds {
    fn from((x_min, y_min, x_max, y_max): (f64, f64, f64, f64)) -> Self {
        Self::new(x_min, y_min, x_max, y_max)
    }
}

impl From<Bounds> for [f64; 4] {
    fn from(b: Bounds) -> Self {
        [b.x_min, b.y_min, b.x_max, b.y_max]
    }
}

/// Bounds of a single geometry, `None` when it has no positions.
///
/// # Example
/// ```
/// use gs_core::bounds::{geometry_bounds, Bounds};
/// use gs_core::geometry::Geometry;
/// let g = Geometry::rectangle(-1.0, 2.0, 3.0, 4.0);
/// assert_eq!(geometry_bounds(&g), Some(Bounds::new(-1.0, 2.0, 3.0, 4.0)));
/// assert_eq!(geometry_bounds(&Geometry::MultiPoint { coordinates: vec![] }), None);
/// ```
#[must_use]
pub fn geometry_bounds(geometry: &Geometry) -> Option<Bounds> {
    let mut acc: Option<Bounds> = None;
    geometry.for_each_position(&mut |p| {
        let here = Bounds::at(p);
        acc = Some(acc.map_or(here, |b| b.union(here)));
    });
    acc
}

/// Element-wise min/max over every geometry's bounds.
///
/// # Errors
/// [`CoreError::EmptyExtent`] when no geometry contributes a position.
pub fn union_bounds<'a>(items: impl IntoIterator<Item = &'a Geometry>) -> Result<Bounds> {
    let mut acc: Option<Bounds> = None;
    for g in items {
        match geometry_bounds(g) {
            Some(b) => acc = Some(acc.map_or(b, |a| a.union(b))),
            None => log::warn!("{} without coordinates ignored for bounds", g.type_name()),
        }
    }
    acc.ok_or(CoreError::EmptyExtent)
}

/// Geometry cursor handed to the rasterizer after bounds resolution.
#[derive(Debug)]
pub enum Resolved<I> {
    /// Materialized once to infer bounds; replayed from memory.
    Buffered(std::vec::IntoIter<Geometry>),
    /// Bounds were supplied; geometries flow straight from the source.
    Streaming(Geometries<I>),
}

impl<I: Iterator<Item = crate::normalize::GeoInput>> Iterator for Resolved<I> {
    type Item = Result<Geometry>;

    fn next(&mut self) -> Option<Self::Item> {
        match self {
            Self::Buffered(it) => it.next().map(Ok),
            Self::Streaming(it) => it.next(),
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        match self {
            Self::Buffered(it) => it.size_hint(),
            Self::Streaming(it) => it.size_hint(),
        }
    }
}

/// Decide the rendering extent and hand back a cursor over the geometries.
///
/// Explicit bounds are used verbatim and the source is left untouched.
/// Otherwise the source is normalized once into an owned buffer, bounds are
/// computed from it, and that same buffer is what the caller rasterizes:
/// single-pass sources are never read twice.
///
/// # Errors
/// Normalization errors while buffering, or [`CoreError::EmptyExtent`].
///
/// # Example
/// ```
/// use gs_core::bounds::{resolve, Bounds};
/// use gs_core::geometry::Geometry;
/// use gs_core::normalize::Stream;
///
/// let once = (0..4).map(|i| Geometry::point(f64::from(i), f64::from(i) * 2.0));
/// let (bounds, rest) = resolve(Stream(once), None).unwrap();
/// assert_eq!(bounds, Bounds::new(0.0, 0.0, 3.0, 6.0));
/// assert_eq!(rest.count(), 4);
/// ```
pub fn resolve<S: GeoSource>(
    source: S,
    explicit: Option<Bounds>,
) -> Result<(Bounds, Resolved<S::Inputs>)> {
    if let Some(bounds) = explicit {
        log::debug!("using explicit bounds {bounds:?}");
        return Ok((bounds, Resolved::Streaming(geometries(source))));
    }
    let buffered: Vec<Geometry> = geometries(source).collect::<Result<_>>()?;
    let bounds = union_bounds(&buffered)?;
    log::debug!(
        "inferred bounds {bounds:?} from {} geometries",
        buffered.len()
    );
    Ok((bounds, Resolved::Buffered(buffered.into_iter())))
}
