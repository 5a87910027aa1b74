//! A positioned, rotated, optionally recolored window onto a [`Grid`].

use core::iter::FusedIterator;

use super::{Grid, as_coordinate};
use crate::cell::Cell;
use crate::color::Color;
use crate::{Error, Result};

/// Quarter-turn rotation applied by a [`GridView`], clockwise.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Rotation {
    /// No rotation.
    #[default]
    Deg0,
    /// 90° clockwise.
    Deg90,
    /// 180°.
    Deg180,
    /// 270° clockwise (90° counter-clockwise).
    Deg270,
}

impl Rotation {
    /// Normalize any number of quarter turns into `0..4`; negative turns count counter-clockwise.
    #[must_use]
    pub const fn from_quarter_turns(quarter_turns: i32) -> Self {
        match quarter_turns.rem_euclid(4) {
            1 => Self::Deg90,
            2 => Self::Deg180,
            3 => Self::Deg270,
            _ => Self::Deg0,
        }
    }

    /// Quarter turns in `0..4`.
    #[must_use]
    pub const fn quarter_turns(self) -> u8 {
        match self {
            Self::Deg0 => 0,
            Self::Deg90 => 1,
            Self::Deg180 => 2,
            Self::Deg270 => 3,
        }
    }

    /// Whether width and height trade places.
    #[must_use]
    pub const fn swaps_axes(self) -> bool {
        matches!(self, Self::Deg90 | Self::Deg270)
    }

    const fn reflects(self) -> bool {
        matches!(self, Self::Deg90 | Self::Deg180)
    }
}

/// A non-owning view of a [`Grid`]: offset, rotation, and optional override color.
///
/// The view borrows the grid, so it always reads the grid's current contents and can
/// never modify it. Reads go through four steps:
///
/// 1. reject `(row, column)` outside the view's *effective* size (width and height swap
///    for 90° and 270°);
/// 2. map the local position back to the grid's own coordinates;
/// 3. read the grid;
/// 4. if an override color is set, any lit cell reads as that color (off stays off).
///
/// The position offset only applies to the [`Cell`]s produced by iteration, which carry
/// absolute coordinates ready for the controller.
#[derive(Clone, Copy, Debug)]
pub struct GridView<'a> {
    grid: &'a Grid,
    row_position: i32,
    column_position: i32,
    rotation: Rotation,
    override_color: Option<Color>,
}

impl<'a> GridView<'a> {
    /// View `grid` at position `(0, 0)`, unrotated, with its own colors.
    #[must_use]
    pub const fn new(grid: &'a Grid) -> Self {
        Self {
            grid,
            row_position: 0,
            column_position: 0,
            rotation: Rotation::Deg0,
            override_color: None,
        }
    }

    /// View `grid` with its top-left corner at `(row, column)`.
    #[must_use]
    pub const fn at(grid: &'a Grid, row: i32, column: i32) -> Self {
        let mut view = Self::new(grid);
        view.row_position = row;
        view.column_position = column;
        view
    }

    /// The grid being viewed.
    #[must_use]
    pub const fn grid(&self) -> &'a Grid {
        self.grid
    }

    /// Point the view at another grid, keeping position, rotation, and override color.
    pub const fn set_grid(&mut self, grid: &'a Grid) {
        self.grid = grid;
    }

    /// Current `(row, column)` offset.
    #[must_use]
    pub const fn position(&self) -> (i32, i32) {
        (self.row_position, self.column_position)
    }

    /// Move the view's top-left corner to `(row, column)`.
    pub const fn set_position(&mut self, row: i32, column: i32) {
        self.row_position = row;
        self.column_position = column;
    }

    /// Set only the row offset.
    pub const fn set_row_position(&mut self, row: i32) {
        self.row_position = row;
    }

    /// Set only the column offset.
    pub const fn set_column_position(&mut self, column: i32) {
        self.column_position = column;
    }

    /// Shift the view by `rows` and `columns`.
    pub const fn translate(&mut self, rows: i32, columns: i32) {
        self.row_position = self.row_position.wrapping_add(rows);
        self.column_position = self.column_position.wrapping_add(columns);
    }

    /// Current rotation.
    #[must_use]
    pub const fn rotation(&self) -> Rotation {
        self.rotation
    }

    /// Set the rotation in clockwise quarter turns, taken modulo 4 (`-1` is 270°).
    pub const fn set_rotation(&mut self, quarter_turns: i32) {
        self.rotation = Rotation::from_quarter_turns(quarter_turns);
    }

    /// Add `quarter_turns` clockwise to the current rotation.
    pub const fn rotate(&mut self, quarter_turns: i32) {
        let current = self.rotation.quarter_turns() as i32;
        self.rotation = Rotation::from_quarter_turns(current + quarter_turns.rem_euclid(4));
    }

    /// The override color, if any.
    #[must_use]
    pub const fn override_color(&self) -> Option<Color> {
        self.override_color
    }

    /// Render every lit cell as `color`, or pass colors through with `None`.
    ///
    /// `Some(Color::OFF)` is treated like `None`.
    pub const fn set_override_color(&mut self, color: Option<Color>) {
        self.override_color = match color {
            Some(color) if color.is_off() => None,
            other => other,
        };
    }

    /// Width after rotation.
    #[must_use]
    pub const fn width(&self) -> usize {
        if self.rotation.swaps_axes() {
            self.grid.height()
        } else {
            self.grid.width()
        }
    }

    /// Height after rotation.
    #[must_use]
    pub const fn height(&self) -> usize {
        if self.rotation.swaps_axes() {
            self.grid.width()
        } else {
            self.grid.height()
        }
    }

    /// Whether the local `(row, column)` lies inside the view's effective size.
    #[must_use]
    pub fn in_bounds(&self, row: i32, column: i32) -> bool {
        row >= 0
            && column >= 0
            && row < as_coordinate(self.height())
            && column < as_coordinate(self.width())
    }

    /// Map a local position to the viewed grid's own coordinates.
    fn grid_position(&self, row: i32, column: i32) -> Option<(i32, i32)> {
        if !self.in_bounds(row, column) {
            return None;
        }
        let height = as_coordinate(self.height());
        let width = as_coordinate(self.width());
        let (mut row, mut column) = (row, column);
        if self.rotation.reflects() {
            row = height - 1 - row;
            column = width - 1 - column;
        }
        if self.rotation.swaps_axes() {
            (row, column) = (column, height - 1 - row);
        }
        Some((row, column))
    }

    /// Color at the local `(row, column)`, rotated and recolored.
    ///
    /// # Errors
    ///
    /// Returns [`Error::OutOfBounds`] outside the view's effective size.
    pub fn get(&self, row: i32, column: i32) -> Result<Color> {
        let (grid_row, grid_column) = self
            .grid_position(row, column)
            .ok_or(Error::OutOfBounds { row, column })?;
        let color = self.grid.get(grid_row, grid_column)?;
        Ok(match self.override_color {
            Some(fill) if !color.is_off() => fill,
            _ => color,
        })
    }

    /// Every cell of the view in row-major order, off cells included, at absolute positions.
    #[must_use]
    pub const fn cells(&self) -> Cells<'_, 'a> {
        Cells {
            view: self,
            row: 0,
            column: 0,
        }
    }
}

impl<'v, 'a> IntoIterator for &'v GridView<'a> {
    type Item = Cell;
    type IntoIter = Cells<'v, 'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.cells()
    }
}

/// Iterator over a [`GridView`]'s cells, created by [`GridView::cells`].
#[derive(Clone, Debug)]
pub struct Cells<'v, 'a> {
    view: &'v GridView<'a>,
    row: i32,
    column: i32,
}

impl Cells<'_, '_> {
    fn remaining(&self) -> usize {
        let width = self.view.width();
        let consumed = usize::try_from(self.row)
            .unwrap_or(0)
            .saturating_mul(width)
            .saturating_add(usize::try_from(self.column).unwrap_or(0));
        self.view
            .height()
            .saturating_mul(width)
            .saturating_sub(consumed)
    }
}

impl Iterator for Cells<'_, '_> {
    type Item = Cell;

    fn next(&mut self) -> Option<Cell> {
        let color = self.view.get(self.row, self.column).ok()?;
        let cell = Cell::new(
            self.row.wrapping_add(self.view.row_position),
            self.column.wrapping_add(self.view.column_position),
            color,
        );
        self.column += 1;
        if self.column >= as_coordinate(self.view.width()) {
            self.column = 0;
            self.row += 1;
        }
        Some(cell)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.remaining();
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for Cells<'_, '_> {}

impl FusedIterator for Cells<'_, '_> {}
