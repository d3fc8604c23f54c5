use crate::bounds::Bounds;
use crate::error::{CoreError, Result};
use crate::geometry::Position;

/// Largest grid a single render may allocate.
pub const MAX_CELLS: usize = 1 << 28;

/// Six-coefficient affine map from grid `(col, row)` to geographic `(x, y)`.
///
/// `x = a·col + b·row + c`, `y = d·col + e·row + f`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Affine {
    pub a: f64,
    pub b: f64,
    pub c: f64,
    pub d: f64,
    pub e: f64,
    pub f: f64,
}

impl Affine {
    /// Build from the GDAL geotransform ordering `(c, a, b, f, d, e)`.
    ///
    /// # Example
    /// ```
    /// use gs_core::transform::Affine;
    /// let t = Affine::from_gdal(100.0, 2.0, 0.0, 50.0, 0.0, -2.0);
    /// assert_eq!(t.apply(1.0, 1.0), (102.0, 48.0));
    /// ```
    #[must_use]
    pub const fn from_gdal(c: f64, a: f64, b: f64, f: f64, d: f64, e: f64) -> Self {
        Self { a, b, c, d, e, f }
    }

    /// Forward mapping.
    #[inline]
    #[must_use]
    pub fn apply(&self, col: f64, row: f64) -> (f64, f64) {
        (
            self.a * col + self.b * row + self.c,
            self.d * col + self.e * row + self.f,
        )
    }
}

/// Geographic-to-grid mapping for one render call.
///
/// Row 0 is the northern (maximum-y) edge; rows grow southward.
///
/// # Example
/// ```
/// use gs_core::bounds::Bounds;
/// use gs_core::transform::GridTransform;
///
/// let t = GridTransform::from_bounds(Bounds::new(0.0, 0.0, 10.0, 5.0), 20).unwrap();
/// assert_eq!((t.height, t.width), (10, 20));
/// assert_eq!(t.cell_size, 0.5);
/// ```
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GridTransform {
    /// Cell → geographic mapping.
    pub affine: Affine,
    /// Side of one square cell, in geographic units.
    pub cell_size: f64,
    /// Number of columns.
    pub width: usize,
    /// Number of rows, always ≥ 1.
    pub height: usize,
}

impl GridTransform {
    /// Derive the transform and grid shape for `width` columns.
    ///
    /// A zero horizontal extent (single point, vertical line) falls back to
    /// the vertical extent spread over `width` cells, then to unit cells.
    ///
    /// # Errors
    /// [`CoreError::InvalidDimension`] if `width <= 0`, or if the extent's
    /// aspect ratio asks for more than [`MAX_CELLS`] cells.
    ///
    /// # Example
    /// ```
    /// use gs_core::bounds::Bounds;
    /// use gs_core::transform::GridTransform;
    ///
    /// // Étendue verticale nulle : une seule ligne.
    /// let flat = GridTransform::from_bounds(Bounds::new(0.0, 3.0, 8.0, 3.0), 8).unwrap();
    /// assert_eq!(flat.height, 1);
    ///
    /// let point = GridTransform::from_bounds(Bounds::new(1.0, 1.0, 1.0, 1.0), 5).unwrap();
    /// assert_eq!((point.height, point.width), (1, 5));
    ///
    /// assert!(GridTransform::from_bounds(Bounds::new(0.0, 0.0, 1.0, 1.0), 0).is_err());
    /// ```
    pub fn from_bounds(bounds: Bounds, width: i64) -> Result<Self> {
        if width <= 0 {
            return Err(CoreError::invalid_width(width));
        }
        let width_f = width as f64;
        let x_delta = bounds.x_extent();
        let y_delta = bounds.y_extent();

        let mut cell_size = x_delta / width_f;
        if !cell_size.is_finite() || cell_size <= 0.0 {
            let fallback = y_delta / width_f;
            cell_size = if fallback.is_finite() && fallback > 0.0 {
                fallback
            } else {
                1.0
            };
            log::warn!(
                "degenerate horizontal extent {x_delta} in {bounds:?}, using cell size {cell_size}"
            );
        }

        let rows = (y_delta / cell_size).floor();
        if rows.is_infinite() || rows.max(1.0) * width_f > MAX_CELLS as f64 {
            return Err(CoreError::InvalidDimension {
                name: "height",
                value: rows.to_string(),
                reason: "grid exceeds the cell limit",
            });
        }
        // NaN → 0, puis au moins une ligne.
        let height = (rows as usize).max(1);

        let affine = Affine::from_gdal(bounds.x_min, cell_size, 0.0, bounds.y_max, 0.0, -cell_size);

        log::debug!(
            "grid {height}x{width} cell_size={cell_size} origin=({}, {})",
            bounds.x_min,
            bounds.y_max
        );
        Ok(Self {
            affine,
            cell_size,
            width: width as usize,
            height,
        })
    }

    /// `(rows, columns)` of the grid.
    #[must_use]
    pub fn shape(&self) -> (usize, usize) {
        (self.height, self.width)
    }

    /// Fractional `(col, row)` of a geographic position.
    ///
    /// The grid is north-up with no shear, so each axis inverts on its own
    /// and positions on cell boundaries land exactly on integers.
    #[inline]
    #[must_use]
    pub fn to_grid(&self, p: Position) -> (f64, f64) {
        let t = &self.affine;
        ((p.x - t.c) / t.a, (p.y - t.f) / t.e)
    }

    /// Geographic position of a cell's center.
    #[must_use]
    pub fn cell_center(&self, col: usize, row: usize) -> Position {
        let (x, y) = self.affine.apply(col as f64 + 0.5, row as f64 + 0.5);
        Position::new(x, y)
    }
}
