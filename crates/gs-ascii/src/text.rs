use gs_core::error::{CoreError, Result, single_char};

use crate::grid::CharGrid;
use crate::rasterize::OccupancyGrid;

/// Map occupancy to characters: `0` → `fill`, anything else → `value`.
///
/// # Example
/// ```
/// use gs_ascii::rasterize::OccupancyGrid;
/// use gs_ascii::text::occupancy_to_chars;
///
/// let mut occ = OccupancyGrid::new(3, 1);
/// occ.burn(1, 0);
/// let grid = occupancy_to_chars(&occ, '.', '*');
/// assert_eq!(grid.cells, vec!['.', '*', '.']);
/// ```
#[must_use]
pub fn occupancy_to_chars(grid: &OccupancyGrid, fill: char, value: char) -> CharGrid {
    CharGrid {
        cells: grid
            .cells
            .iter()
            .map(|&c| if c == 0 { fill } else { value })
            .collect(),
        width: grid.width,
        height: grid.height,
    }
}

/// Validate the symbols and serialize an occupancy grid to text.
///
/// # Errors
/// [`CoreError::InvalidDimension`] if either symbol is not exactly one
/// character, or the grid has no columns.
///
/// # Example
/// ```
/// use gs_ascii::rasterize::OccupancyGrid;
/// use gs_ascii::text::occupancy_to_text;
///
/// let mut occ = OccupancyGrid::new(2, 2);
/// occ.burn(0, 0);
/// occ.burn(1, 1);
/// assert_eq!(occupancy_to_text(&occ, ".", "+").unwrap(), "+ .\n. +\n");
/// assert!(occupancy_to_text(&occ, "..", "+").is_err());
/// ```
pub fn occupancy_to_text(grid: &OccupancyGrid, fill: &str, value: &str) -> Result<String> {
    let fill = single_char("fill value", fill)?;
    let value = single_char("pixel value", value)?;
    if grid.width == 0 {
        return Err(CoreError::invalid_width(0));
    }
    Ok(occupancy_to_chars(grid, fill, value).to_text())
}
