//! ASCII rendering engine for geoscii.
//!
//! Rasterizes geometries into occupancy grids, turns them into character
//! layers, and composites layers into one picture.

pub mod compositor;
pub mod grid;
pub mod paginate;
pub mod rasterize;
pub mod table;
pub mod text;

use gs_core::bounds::resolve;
use gs_core::config::RenderOptions;
use gs_core::error::{CoreError, Result, single_char};
use gs_core::normalize::GeoSource;
use gs_core::transform::GridTransform;

pub use compositor::{stack, stack_grids};
pub use grid::CharGrid;
pub use paginate::paginate;
pub use table::format_table;

/// Render a geometry source into a structured character layer.
///
/// Options are validated before the source is touched.
///
/// # Errors
/// [`CoreError::InvalidDimension`] for a bad width or symbol, plus any
/// normalization or bounds error from the source.
///
/// # Example
/// ```
/// use gs_ascii::render_layer;
/// use gs_core::config::RenderOptions;
/// use gs_core::geometry::Geometry;
///
/// let layer = render_layer(Geometry::point(3.0, 3.0), &RenderOptions::default()).unwrap();
/// assert_eq!(layer.shape(), (1, 40));
/// ```
pub fn render_layer<S: GeoSource>(source: S, options: &RenderOptions) -> Result<CharGrid> {
    let fill = single_char("fill value", &options.fill)?;
    let value = single_char("pixel value", &options.value)?;
    if options.width <= 0 {
        return Err(CoreError::invalid_width(options.width));
    }

    let (bounds, geometries) = resolve(source, options.bbox)?;
    let transform = GridTransform::from_bounds(bounds, options.width)?;
    let occupancy = rasterize::rasterize(geometries, &transform, options.all_touched)?;
    Ok(text::occupancy_to_chars(&occupancy, fill, value))
}

/// Render a geometry source to text.
///
/// # Errors
/// Same as [`render_layer`].
///
/// # Example
/// ```
/// use gs_ascii::render;
/// use gs_core::config::RenderOptions;
/// use gs_core::geometry::Geometry;
///
/// let square = Geometry::rectangle(0.0, 0.0, 3.0, 3.0);
/// let opts = RenderOptions::default().with_width(3).with_symbols(".", "*");
/// assert_eq!(render(square, &opts).unwrap(), "* * *\n* * *\n* * *\n");
/// ```
pub fn render<S: GeoSource>(source: S, options: &RenderOptions) -> Result<String> {
    Ok(render_layer(source, options)?.to_text())
}
