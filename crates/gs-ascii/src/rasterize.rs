use gs_core::error::Result;
use gs_core::geometry::{Geometry, Position};
use gs_core::transform::GridTransform;

/// Positions this close past the last row/column still belong to it.
const EDGE_EPSILON: f64 = 1e-9;

/// Binary occupancy raster: `1` covered, `0` background.
///
/// # Example
/// ```
/// use gs_ascii::rasterize::OccupancyGrid;
/// let mut grid = OccupancyGrid::new(4, 2);
/// grid.burn(3, 1);
/// grid.burn(3, 1);
/// assert_eq!(grid.get(3, 1), 1);
/// assert_eq!(grid.count(), 1);
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OccupancyGrid {
    /// Flat array of cells, row-major.
    pub cells: Vec<u8>,
    /// Number of columns.
    pub width: usize,
    /// Number of rows.
    pub height: usize,
}

impl OccupancyGrid {
    /// All-background grid.
    #[must_use]
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            cells: vec![0; width * height],
            width,
            height,
        }
    }

    /// Mark a cell covered. Idempotent.
    #[inline]
    pub fn burn(&mut self, col: usize, row: usize) {
        self.cells[row * self.width + col] = 1;
    }

    /// Value at column `col`, row `row`.
    #[inline]
    #[must_use]
    pub fn get(&self, col: usize, row: usize) -> u8 {
        self.cells[row * self.width + col]
    }

    /// Number of covered cells.
    #[must_use]
    pub fn count(&self) -> usize {
        self.cells.iter().filter(|&&c| c != 0).count()
    }

    // Hors grille : ignoré.
    #[inline]
    fn burn_clipped(&mut self, col: i64, row: i64) {
        if col >= 0 && row >= 0 && (col as usize) < self.width && (row as usize) < self.height {
            self.burn(col as usize, row as usize);
        }
    }
}

/// Burns geometries into an [`OccupancyGrid`] through a [`GridTransform`].
///
/// Overlaps are OR-ed: a later geometry never erases an earlier one.
pub struct Rasterizer<'t> {
    transform: &'t GridTransform,
    all_touched: bool,
    grid: OccupancyGrid,
    crossings: Vec<f64>,
}

impl<'t> Rasterizer<'t> {
    /// Empty raster shaped by `transform`.
    ///
    /// `all_touched` covers every cell a geometry touches; otherwise a cell
    /// is covered only when its center is.
    #[must_use]
    pub fn new(transform: &'t GridTransform, all_touched: bool) -> Self {
        Self {
            transform,
            all_touched,
            grid: OccupancyGrid::new(transform.width, transform.height),
            crossings: Vec::new(),
        }
    }

    /// Burn one geometry.
    pub fn burn(&mut self, geometry: &Geometry) {
        log::trace!("burning {}", geometry.type_name());
        match geometry {
            Geometry::Point { coordinates } => self.burn_point(*coordinates),
            Geometry::MultiPoint { coordinates } => {
                for p in coordinates {
                    self.burn_point(*p);
                }
            }
            Geometry::LineString { coordinates } => self.burn_path(coordinates),
            Geometry::MultiLineString { coordinates } => {
                for line in coordinates {
                    self.burn_path(line);
                }
            }
            Geometry::Polygon { coordinates } => self.burn_polygon(coordinates),
            Geometry::MultiPolygon { coordinates } => {
                for polygon in coordinates {
                    self.burn_polygon(polygon);
                }
            }
            Geometry::GeometryCollection { geometries } => {
                for g in geometries {
                    self.burn(g);
                }
            }
        }
    }

    /// Hand over the finished raster.
    #[must_use]
    pub fn finish(self) -> OccupancyGrid {
        self.grid
    }

    fn burn_point(&mut self, p: Position) {
        let (col, row) = self.transform.to_grid(p);
        if let (Some(col), Some(row)) = (
            cell_index(col, self.grid.width),
            cell_index(row, self.grid.height),
        ) {
            self.grid.burn(col, row);
        }
    }

    fn burn_path(&mut self, path: &[Position]) {
        match path {
            [] => {}
            [only] => self.burn_point(*only),
            _ => {
                for pair in path.windows(2) {
                    let a = self.transform.to_grid(pair[0]);
                    let b = self.transform.to_grid(pair[1]);
                    self.burn_segment(a, b);
                }
            }
        }
    }

    fn burn_segment(&mut self, a: (f64, f64), b: (f64, f64)) {
        let Some((a, b)) = clip_segment(a, b, self.grid.width as f64, self.grid.height as f64)
        else {
            return;
        };
        if self.all_touched {
            self.traverse_segment(a, b);
        } else {
            self.step_segment(a, b);
        }
    }

    /// One sample per cell center crossed along the dominant axis.
    fn step_segment(&mut self, (x0, y0): (f64, f64), (x1, y1): (f64, f64)) {
        let (dx, dy) = (x1 - x0, y1 - y0);
        let x_major = dx.abs() >= dy.abs();
        let (lo, hi) = if x_major {
            (x0.min(x1), x0.max(x1))
        } else {
            (y0.min(y1), y0.max(y1))
        };
        let first = (lo - 0.5).ceil().max(0.0) as i64;
        let last = (hi - 0.5).floor() as i64;
        let mut burned = false;
        for i in first..=last {
            let center = i as f64 + 0.5;
            let (x, y) = if x_major {
                (center, y0 + (center - x0) * dy / dx)
            } else {
                (x0 + (center - y0) * dx / dy, center)
            };
            if let (Some(col), Some(row)) = (
                cell_index(x, self.grid.width),
                cell_index(y, self.grid.height),
            ) {
                self.grid.burn(col, row);
                burned = true;
            }
        }
        // Segment trop court pour croiser un centre : sa cellule médiane.
        if !burned {
            self.burn_edge_cell((x0 + x1) / 2.0, (y0 + y1) / 2.0);
        }
    }

    /// Every cell the segment passes through (grid traversal).
    fn traverse_segment(&mut self, (x0, y0): (f64, f64), (x1, y1): (f64, f64)) {
        let (dx, dy) = (x1 - x0, y1 - y0);
        let mut col = x0.floor() as i64;
        let mut row = y0.floor() as i64;
        let end_col = x1.floor() as i64;
        let end_row = y1.floor() as i64;

        let step_col: i64 = if dx > 0.0 { 1 } else { -1 };
        let step_row: i64 = if dy > 0.0 { 1 } else { -1 };
        let next_boundary = |v: f64, step: i64| if step > 0 { v.floor() + 1.0 } else { v.floor() };
        let mut t_max_x = if dx == 0.0 {
            f64::INFINITY
        } else {
            (next_boundary(x0, step_col) - x0) / dx
        };
        let mut t_max_y = if dy == 0.0 {
            f64::INFINITY
        } else {
            (next_boundary(y0, step_row) - y0) / dy
        };
        let t_delta_x = if dx == 0.0 { f64::INFINITY } else { 1.0 / dx.abs() };
        let t_delta_y = if dy == 0.0 { f64::INFINITY } else { 1.0 / dy.abs() };

        let max_steps = (end_col - col).unsigned_abs() + (end_row - row).unsigned_abs();
        self.grid.burn_clipped(col, row);
        for _ in 0..max_steps {
            if t_max_x < t_max_y {
                col += step_col;
                t_max_x += t_delta_x;
            } else {
                row += step_row;
                t_max_y += t_delta_y;
            }
            self.grid.burn_clipped(col, row);
        }
        // Extrémité posée exactement sur le bord droit/bas de la grille.
        self.burn_edge_cell(x1, y1);
    }

    fn burn_edge_cell(&mut self, x: f64, y: f64) {
        if let (Some(col), Some(row)) = (
            cell_index(x, self.grid.width),
            cell_index(y, self.grid.height),
        ) {
            self.grid.burn(col, row);
        }
    }

    fn burn_polygon(&mut self, rings: &[Vec<Position>]) {
        let rings: Vec<Vec<(f64, f64)>> = rings
            .iter()
            .map(|ring| ring.iter().map(|p| self.transform.to_grid(*p)).collect())
            .collect();
        self.fill_rings(&rings);
        if self.all_touched {
            for ring in &rings {
                for (a, b) in ring_edges(ring) {
                    self.burn_segment(a, b);
                }
            }
        }
    }

    /// Even-odd scanline fill sampled at cell centers, holes included.
    fn fill_rings(&mut self, rings: &[Vec<(f64, f64)>]) {
        let (y_lo, y_hi) = rings
            .iter()
            .flatten()
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &(_, y)| {
                (lo.min(y), hi.max(y))
            });
        if y_lo > y_hi {
            return;
        }
        let height = self.grid.height as f64;
        let first_row = y_lo.floor().clamp(0.0, height) as usize;
        let last_row = y_hi.ceil().clamp(0.0, height) as usize;
        let width = self.grid.width as f64;

        let mut crossings = std::mem::take(&mut self.crossings);
        for row in first_row..last_row {
            let yc = row as f64 + 0.5;
            crossings.clear();
            for ring in rings {
                for ((xa, ya), (xb, yb)) in ring_edges(ring) {
                    if (ya <= yc && yb > yc) || (yb <= yc && ya > yc) {
                        crossings.push(xa + (yc - ya) * (xb - xa) / (yb - ya));
                    }
                }
            }
            crossings.sort_by(f64::total_cmp);
            for span in crossings.chunks_exact(2) {
                // Centres c + 0.5 dans [x0, x1).
                let start = (span[0] - 0.5).ceil().clamp(0.0, width) as usize;
                let end = (span[1] - 0.5).ceil().clamp(0.0, width) as usize;
                for col in start..end {
                    self.grid.burn(col, row);
                }
            }
        }
        self.crossings = crossings;
    }
}

/// Burn a whole geometry stream into a fresh raster.
///
/// # Errors
/// The first normalization error reported by the stream.
///
/// # Example
/// ```
/// use gs_ascii::rasterize::rasterize;
/// use gs_core::bounds::Bounds;
/// use gs_core::geometry::Geometry;
/// use gs_core::transform::GridTransform;
///
/// let t = GridTransform::from_bounds(Bounds::new(0.0, 0.0, 4.0, 4.0), 4).unwrap();
/// let grid = rasterize([Ok(Geometry::rectangle(0.0, 0.0, 2.0, 2.0))], &t, false).unwrap();
/// assert_eq!(grid.count(), 4);
/// assert_eq!(grid.get(0, 3), 1);
/// assert_eq!(grid.get(0, 0), 0);
/// ```
pub fn rasterize<I>(
    geometries: I,
    transform: &GridTransform,
    all_touched: bool,
) -> Result<OccupancyGrid>
where
    I: IntoIterator<Item = Result<Geometry>>,
{
    let mut rasterizer = Rasterizer::new(transform, all_touched);
    let mut burned = 0usize;
    for geometry in geometries {
        rasterizer.burn(&geometry?);
        burned += 1;
    }
    let grid = rasterizer.finish();
    log::debug!(
        "rasterized {burned} geometries, {} of {} cells covered",
        grid.count(),
        grid.cells.len()
    );
    Ok(grid)
}

/// Cell containing fractional coordinate `v` on an axis of `n` cells.
fn cell_index(v: f64, n: usize) -> Option<usize> {
    if v.is_nan() || v < 0.0 {
        return None;
    }
    let i = v.floor() as usize;
    if i < n {
        Some(i)
    } else if n > 0 && v <= n as f64 + EDGE_EPSILON {
        Some(n - 1)
    } else {
        None
    }
}

/// Consecutive vertex pairs, closing the ring if the source left it open.
fn ring_edges(ring: &[(f64, f64)]) -> impl Iterator<Item = ((f64, f64), (f64, f64))> + '_ {
    let closing = match (ring.first(), ring.last()) {
        (Some(&first), Some(&last)) if ring.len() > 2 && first != last => Some((last, first)),
        _ => None,
    };
    ring.windows(2).map(|w| (w[0], w[1])).chain(closing)
}

/// Liang-Barsky clip of a segment against `[0, w] × [0, h]`.
fn clip_segment(
    (x0, y0): (f64, f64),
    (x1, y1): (f64, f64),
    w: f64,
    h: f64,
) -> Option<((f64, f64), (f64, f64))> {
    let (dx, dy) = (x1 - x0, y1 - y0);
    let mut t0 = 0.0_f64;
    let mut t1 = 1.0_f64;
    for (p, q) in [(-dx, x0), (dx, w - x0), (-dy, y0), (dy, h - y0)] {
        if p == 0.0 {
            if q < 0.0 {
                return None;
            }
        } else {
            let r = q / p;
            if p < 0.0 {
                t0 = t0.max(r);
            } else {
                t1 = t1.min(r);
            }
        }
    }
    if t0 > t1 || t0.is_nan() || t1.is_nan() {
        return None;
    }
    Some((
        (x0 + dx * t0, y0 + dy * t0),
        (x0 + dx * t1, y0 + dy * t1),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use gs_core::bounds::Bounds;

    fn transform(w: f64, h: f64, width: i64) -> GridTransform {
        GridTransform::from_bounds(Bounds::new(0.0, 0.0, w, h), width).unwrap()
    }

    fn burn_one(g: &Geometry, t: &GridTransform, all_touched: bool) -> OccupancyGrid {
        rasterize([Ok(g.clone())], t, all_touched).unwrap()
    }

    #[test]
    fn full_extent_square_covers_everything() {
        let t = transform(3.0, 3.0, 3);
        let grid = burn_one(&Geometry::rectangle(0.0, 0.0, 3.0, 3.0), &t, false);
        assert_eq!(grid.count(), 9);
    }

    #[test]
    fn hole_is_left_empty() {
        let t = transform(3.0, 3.0, 3);
        let donut = Geometry::Polygon {
            coordinates: vec![
                vec![
                    Position::new(0.0, 0.0),
                    Position::new(3.0, 0.0),
                    Position::new(3.0, 3.0),
                    Position::new(0.0, 3.0),
                    Position::new(0.0, 0.0),
                ],
                vec![
                    Position::new(1.0, 1.0),
                    Position::new(2.0, 1.0),
                    Position::new(2.0, 2.0),
                    Position::new(1.0, 2.0),
                    Position::new(1.0, 1.0),
                ],
            ],
        };
        let grid = burn_one(&donut, &t, false);
        assert_eq!(grid.count(), 8);
        assert_eq!(grid.get(1, 1), 0);
    }

    #[test]
    fn small_polygon_needs_all_touched() {
        let t = transform(4.0, 4.0, 4);
        // Ne couvre aucun centre de cellule.
        let tiny = Geometry::rectangle(1.1, 1.1, 1.4, 1.4);
        assert_eq!(burn_one(&tiny, &t, false).count(), 0);
        let grid = burn_one(&tiny, &t, true);
        assert_eq!(grid.count(), 1);
        assert_eq!(grid.get(1, 2), 1);
    }

    #[test]
    fn all_touched_is_superset_of_center_only() {
        let t = transform(10.0, 10.0, 10);
        let tri = Geometry::Polygon {
            coordinates: vec![vec![
                Position::new(0.3, 0.2),
                Position::new(9.7, 1.1),
                Position::new(4.2, 9.6),
                Position::new(0.3, 0.2),
            ]],
        };
        let center = burn_one(&tri, &t, false);
        let touched = burn_one(&tri, &t, true);
        assert!(touched.count() > center.count());
        for (c, a) in center.cells.iter().zip(&touched.cells) {
            assert!(c <= a);
        }
    }

    #[test]
    fn diagonal_line_center_only() {
        let t = transform(4.0, 4.0, 4);
        let line = Geometry::LineString {
            coordinates: vec![Position::new(0.0, 0.0), Position::new(4.0, 4.0)],
        };
        let grid = burn_one(&line, &t, false);
        for i in 0..4 {
            assert_eq!(grid.get(i, 3 - i), 1, "cell {i} on the diagonal");
        }
        assert_eq!(grid.count(), 4);
    }

    #[test]
    fn all_touched_line_traverses_every_crossed_cell() {
        let t = transform(4.0, 2.0, 4);
        let line = Geometry::LineString {
            coordinates: vec![Position::new(0.5, 0.25), Position::new(3.5, 1.75)],
        };
        let center = burn_one(&line, &t, false);
        let touched = burn_one(&line, &t, true);
        assert!(touched.count() >= center.count());
        assert_eq!(touched.get(0, 1), 1);
        assert_eq!(touched.get(3, 0), 1);
    }

    #[test]
    fn points_on_max_edge_land_in_last_cell() {
        let t = transform(4.0, 4.0, 4);
        let grid = burn_one(&Geometry::point(4.0, 0.0), &t, false);
        assert_eq!(grid.get(3, 3), 1);
    }

    #[test]
    fn outside_geometry_is_clipped() {
        let t = transform(4.0, 4.0, 4);
        let far = Geometry::MultiPoint {
            coordinates: vec![Position::new(-10.0, 2.0), Position::new(2.0, 50.0)],
        };
        assert_eq!(burn_one(&far, &t, true).count(), 0);
        let crossing = Geometry::LineString {
            coordinates: vec![Position::new(-100.0, 2.5), Position::new(100.0, 2.5)],
        };
        assert_eq!(burn_one(&crossing, &t, false).count(), 4);
    }

    #[test]
    fn overlaps_are_idempotent() {
        let t = transform(4.0, 4.0, 4);
        let grid = rasterize(
            [
                Ok(Geometry::rectangle(0.0, 0.0, 2.0, 4.0)),
                Ok(Geometry::rectangle(0.0, 0.0, 4.0, 2.0)),
            ],
            &t,
            false,
        )
        .unwrap();
        assert_eq!(grid.count(), 12);
        assert!(grid.cells.iter().all(|&c| c <= 1));
    }

    #[test]
    fn open_ring_is_closed() {
        let t = transform(2.0, 2.0, 2);
        let open = Geometry::Polygon {
            coordinates: vec![vec![
                Position::new(0.0, 0.0),
                Position::new(2.0, 0.0),
                Position::new(2.0, 2.0),
                Position::new(0.0, 2.0),
            ]],
        };
        assert_eq!(burn_one(&open, &t, false).count(), 4);
    }

    #[test]
    fn clip_rejects_outside_segments() {
        assert!(clip_segment((-2.0, -2.0), (-1.0, 5.0), 4.0, 4.0).is_none());
        let (a, b) = clip_segment((-2.0, 1.0), (6.0, 1.0), 4.0, 4.0).unwrap();
        assert_eq!(a, (0.0, 1.0));
        assert_eq!(b, (4.0, 1.0));
    }
}
