use gs_core::error::{CoreError, Result, single_char};

use crate::grid::{BLANK, CharGrid};

/// Compositor empile des calques de même forme, du bas vers le haut.
///
/// A cell takes the character of the topmost layer that drew there. The
/// blank (space) is every layer's transparent background, whatever fill the
/// layer was rendered with.
///
/// # Example
/// ```
/// use gs_ascii::compositor::Compositor;
/// use gs_ascii::grid::CharGrid;
///
/// let mut bottom = CharGrid::new(2, 1);
/// bottom.set(0, 0, '*');
/// bottom.set(1, 0, '*');
/// let mut top = CharGrid::new(2, 1);
/// top.set(1, 0, '+');
///
/// let mut c = Compositor::new(2, 1);
/// c.draw(&bottom).unwrap();
/// c.draw(&top).unwrap();
/// assert_eq!(c.finish('.').cells, vec!['*', '+']);
/// ```
pub struct Compositor {
    canvas: CharGrid,
    layers: usize,
}

impl Compositor {
    /// Empty canvas of the given shape.
    #[must_use]
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            canvas: CharGrid::new(width, height),
            layers: 0,
        }
    }

    /// Draw `layer` over everything drawn so far.
    ///
    /// # Errors
    /// [`CoreError::HeterogeneousLayers`] if `layer` is not the canvas shape.
    pub fn draw(&mut self, layer: &CharGrid) -> Result<()> {
        if layer.shape() != self.canvas.shape() {
            return Err(CoreError::HeterogeneousLayers {
                detail: format!(
                    "layer {} is {}x{}, expected {}x{}",
                    self.layers,
                    layer.height,
                    layer.width,
                    self.canvas.height,
                    self.canvas.width
                ),
            });
        }
        for (dst, &src) in self.canvas.cells.iter_mut().zip(&layer.cells) {
            if src != BLANK {
                *dst = src;
            }
        }
        self.layers += 1;
        Ok(())
    }

    /// Replace still-blank cells with `fill` and hand over the picture.
    #[must_use]
    pub fn finish(mut self, fill: char) -> CharGrid {
        if fill != BLANK {
            for cell in &mut self.canvas.cells {
                if *cell == BLANK {
                    *cell = fill;
                }
            }
        }
        self.canvas
    }
}

/// Composite structured layers, first at the bottom, last on top.
///
/// # Errors
/// [`CoreError::HeterogeneousLayers`] if the layers differ in shape.
///
/// # Example
/// ```
/// use gs_ascii::compositor::stack_grids;
/// use gs_ascii::grid::CharGrid;
///
/// let a = CharGrid::from_text("+  \n  +\n").unwrap();
/// let b = CharGrid::from_text("  *\n*  \n").unwrap();
/// assert_eq!(stack_grids(&[a, b], '.').unwrap().to_text(), "+ *\n* +\n");
/// ```
pub fn stack_grids(layers: &[CharGrid], fill: char) -> Result<CharGrid> {
    let Some(first) = layers.first() else {
        return Ok(CharGrid::new(0, 0));
    };
    let mut compositor = Compositor::new(first.width, first.height);
    for layer in layers {
        compositor.draw(layer)?;
    }
    log::debug!(
        "stacked {} layers of {}x{}",
        layers.len(),
        first.height,
        first.width
    );
    Ok(compositor.finish(fill))
}

/// Composite rendered text layers into one picture.
///
/// Every layer must have the same number of lines, and aligned lines must
/// have the same length in every layer. Cells are every other character of
/// a line; a space is "not drawn". Where no layer drew, `fill` is emitted.
///
/// # Errors
/// [`CoreError::InvalidDimension`] if `fill` is not one character,
/// [`CoreError::HeterogeneousLayers`] on mismatched dimensions.
///
/// # Example
/// ```
/// use gs_ascii::compositor::stack;
/// let out = stack(&["+ .\n. +\n", ". +\n+ .\n"], ".").unwrap();
/// assert_eq!(out, ". +\n+ .\n");
/// ```
pub fn stack<S: AsRef<str>>(layers: &[S], fill: &str) -> Result<String> {
    let fill = single_char("fill value", fill)?;
    let lines: Vec<Vec<&str>> = layers.iter().map(|l| l.as_ref().lines().collect()).collect();

    if let Some(first) = lines.first() {
        for (i, layer) in lines.iter().enumerate().skip(1) {
            if layer.len() != first.len() {
                return Err(CoreError::HeterogeneousLayers {
                    detail: format!(
                        "layer {i} has {} rows, layer 0 has {}",
                        layer.len(),
                        first.len()
                    ),
                });
            }
        }
        for row in 0..first.len() {
            let lens: Vec<usize> = lines.iter().map(|l| l[row].chars().count()).collect();
            if lens.windows(2).any(|w| w[0] != w[1]) {
                return Err(CoreError::HeterogeneousLayers {
                    detail: format!("row {row} lengths differ across layers: {lens:?}"),
                });
            }
        }
    }

    let grids = lines
        .iter()
        .map(|l| CharGrid::from_lines(l))
        .collect::<Result<Vec<_>>>()?;
    Ok(stack_grids(&grids, fill)?.to_text())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn space_is_transparent_regardless_of_layer_fill() {
        // '.' est opaque : seul l'espace laisse voir en dessous.
        let out = stack(&["* *\n", ".  \n"], "-").unwrap();
        assert_eq!(out, ". *\n");
    }

    #[test]
    fn row_count_mismatch_is_heterogeneous() {
        let err = stack(&["+ +\n+ +\n", "+ +\n"], " ").unwrap_err();
        assert!(matches!(err, CoreError::HeterogeneousLayers { .. }));
    }

    #[test]
    fn row_length_mismatch_is_heterogeneous() {
        let err = stack(&["+ + +\n", "+ +\n"], " ").unwrap_err();
        assert!(err.to_string().contains("row 0"));
    }

    #[test]
    fn invalid_fill_is_rejected() {
        assert!(matches!(
            stack(&["+\n"], "ab"),
            Err(CoreError::InvalidDimension { .. })
        ));
        assert!(matches!(
            stack(&["+\n"], ""),
            Err(CoreError::InvalidDimension { .. })
        ));
    }

    #[test]
    fn order_decides_overlaps() {
        let a = "a a\n";
        let b = "b  \n";
        assert_eq!(stack(&[a, b], ".").unwrap(), "b a\n");
        assert_eq!(stack(&[b, a], ".").unwrap(), "a a\n");
    }

    #[test]
    fn nothing_drawn_becomes_fill() {
        assert_eq!(stack(&["   \n   \n"], "~").unwrap(), "~ ~\n~ ~\n");
    }

    #[test]
    fn no_layers_is_empty_picture() {
        let none: [&str; 0] = [];
        assert_eq!(stack(&none, " ").unwrap(), "\n");
    }

    #[test]
    fn stacking_is_associative_with_blank_intermediate() {
        let a = "1    \n  1  \n";
        let b = "  2  \n2   2\n";
        let c = "    3\n3    \n";
        let all = stack(&[a, b, c], ".").unwrap();
        let ab = stack(&[a, b], " ").unwrap();
        assert_eq!(stack(&[ab.as_str(), c], ".").unwrap(), all);
        assert_eq!(all, "1 2 3\n3 1 2\n");
    }

    #[test]
    fn compositor_rejects_other_shape() {
        let mut c = Compositor::new(2, 2);
        assert!(c.draw(&CharGrid::new(3, 2)).is_err());
    }
}
