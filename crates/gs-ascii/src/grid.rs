use gs_core::error::{CoreError, Result};

/// Column separator and universal "not drawn" background of a text layer.
pub const BLANK: char = ' ';

/// Line terminator of every text block.
pub const LINE_SEP: &str = "\n";

/// Grille de caractères, row-major. Forme structurée d'un calque rendu.
///
/// # Example
/// ```
/// use gs_ascii::grid::CharGrid;
/// let mut grid = CharGrid::new(3, 2);
/// grid.set(1, 0, '*');
/// assert_eq!(grid.get(1, 0), '*');
/// assert_eq!(grid.to_text(), "  *  \n     \n");
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CharGrid {
    /// Flat array of cells, row-major.
    pub cells: Vec<char>,
    /// Width in characters.
    pub width: usize,
    /// Height in characters.
    pub height: usize,
}

impl CharGrid {
    /// Grid filled with the blank background.
    #[must_use]
    pub fn new(width: usize, height: usize) -> Self {
        Self::filled(width, height, BLANK)
    }

    /// Grid filled with `ch`.
    #[must_use]
    pub fn filled(width: usize, height: usize, ch: char) -> Self {
        Self {
            cells: vec![ch; width * height],
            width,
            height,
        }
    }

    /// Set a cell at column `x`, row `y`.
    #[inline]
    pub fn set(&mut self, x: usize, y: usize, ch: char) {
        self.cells[y * self.width + x] = ch;
    }

    /// Get the cell at column `x`, row `y`.
    #[inline]
    #[must_use]
    pub fn get(&self, x: usize, y: usize) -> char {
        self.cells[y * self.width + x]
    }

    /// Rows, top to bottom.
    pub fn rows(&self) -> impl Iterator<Item = &[char]> {
        // chunks() panique sur une taille nulle.
        self.cells.chunks(self.width.max(1)).take(self.height)
    }

    /// `(rows, columns)`.
    #[must_use]
    pub fn shape(&self) -> (usize, usize) {
        (self.height, self.width)
    }

    /// Serialize: one line per row, cells separated by a single space, one
    /// trailing line separator for the whole block.
    ///
    /// # Example
    /// ```
    /// use gs_ascii::grid::CharGrid;
    /// let grid = CharGrid::filled(2, 2, '#');
    /// assert_eq!(grid.to_text(), "# #\n# #\n");
    /// ```
    #[must_use]
    pub fn to_text(&self) -> String {
        let line_len = (2 * self.width).saturating_sub(1);
        let mut out = String::with_capacity(self.height * (line_len + LINE_SEP.len()) + 1);
        for (i, row) in self.rows().enumerate() {
            if i > 0 {
                out.push_str(LINE_SEP);
            }
            for (j, ch) in row.iter().enumerate() {
                if j > 0 {
                    out.push(BLANK);
                }
                out.push(*ch);
            }
        }
        out.push_str(LINE_SEP);
        out
    }

    /// Parse a text layer laid out by [`CharGrid::to_text`]: every other
    /// character of a line is a cell, the ones in between are separators.
    ///
    /// Both `\n` and `\r\n` terminators are accepted.
    ///
    /// # Errors
    /// [`CoreError::HeterogeneousLayers`] if the rows of the layer differ in length.
    ///
    /// # Example
    /// ```
    /// use gs_ascii::grid::CharGrid;
    /// let grid = CharGrid::from_text("+ .\n. +\n").unwrap();
    /// assert_eq!(grid.shape(), (2, 2));
    /// assert_eq!(grid.get(1, 1), '+');
    /// ```
    pub fn from_text(text: &str) -> Result<Self> {
        let lines: Vec<&str> = text.lines().collect();
        Self::from_lines(&lines)
    }

    pub(crate) fn from_lines(lines: &[&str]) -> Result<Self> {
        let Some(first) = lines.first() else {
            return Ok(Self::new(0, 0));
        };
        let line_len = first.chars().count();
        if let Some((row, line)) = lines
            .iter()
            .enumerate()
            .find(|(_, l)| l.chars().count() != line_len)
        {
            return Err(CoreError::HeterogeneousLayers {
                detail: format!(
                    "row {row} is {} characters long, row 0 is {line_len}",
                    line.chars().count()
                ),
            });
        }
        let width = line_len.div_ceil(2);
        let mut cells = Vec::with_capacity(width * lines.len());
        for line in lines {
            cells.extend(line.chars().step_by(2));
        }
        Ok(Self {
            cells,
            width,
            height: lines.len(),
        })
    }
}
