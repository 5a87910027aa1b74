//! Rectangular color grids ("shapes") and transformable views over them.
//!
//! A [`Grid`] owns its colors. A [`GridView`] borrows a grid and adds a position,
//! a quarter-turn rotation, and an optional override color without copying anything.
//! Views are what the [`Launchpad`](crate::launchpad::Launchpad) controller consumes.
//!
//! # Example
//!
//! ```rust
//! use launchpad_envoy::{Cell, color::Color, grid::{Grid, GridView}};
//!
//! let mut grid = Grid::new(8, 8)?;
//! grid.set(0, 0, Color::STRONG_RED)?;
//!
//! // A quarter turn clockwise moves the top-left cell to the top-right.
//! let mut view = GridView::new(&grid);
//! view.set_rotation(1);
//! let lit: Vec<Cell> = view.cells().filter(|cell| !cell.color.is_off()).collect();
//! assert_eq!((lit[0].row, lit[0].column, lit[0].color), (0, 7, Color::STRONG_RED));
//! # Ok::<(), launchpad_envoy::Error>(())
//! ```

pub mod view;

pub use view::{Cells, GridView, Rotation};

use alloc::vec;
use alloc::vec::Vec;
use core::convert::Infallible;
use core::fmt;

use embedded_graphics::{
    draw_target::DrawTarget,
    prelude::*,
    primitives::{PrimitiveStyleBuilder, Rectangle, StrokeAlignment},
};
use smart_leds::RGB8;

use crate::color::Color;
use crate::{Error, Result};

/// An owned `height × width` array of [`Color`]s, stored row-major.
///
/// Unlit cells hold [`Color::OFF`]. Coordinates are `(row, column)` with `(0, 0)` at the
/// top-left; accessors reject anything outside `[0, height) × [0, width)` with
/// [`Error::OutOfBounds`].
///
/// `Grid` is also an [`embedded-graphics`](https://docs.rs/embedded-graphics) draw target
/// over [`Color`], so primitives and text can be drawn into it. Pixels that fall outside
/// the grid are clipped.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct Grid {
    width: usize,
    height: usize,
    colors: Vec<Color>,
}

impl Grid {
    /// Create a blank grid: every cell is [`Color::OFF`].
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidDimension`] if either dimension is zero or does not fit in `i32`.
    pub fn new(width: usize, height: usize) -> Result<Self> {
        Self::filled(width, height, Color::OFF)
    }

    /// Create a grid with every cell set to `color`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidDimension`] if either dimension is zero or does not fit in `i32`.
    pub fn filled(width: usize, height: usize, color: Color) -> Result<Self> {
        let invalid = Error::InvalidDimension { width, height };
        if width == 0 || height == 0 {
            return Err(invalid);
        }
        if i32::try_from(width).is_err() || i32::try_from(height).is_err() {
            return Err(invalid);
        }
        let len = width.checked_mul(height).ok_or(invalid)?;
        Ok(Self {
            width,
            height,
            colors: vec![color; len],
        })
    }

    /// Blank grid of a size known to be valid.
    pub(crate) fn blank(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            colors: vec![Color::OFF; width.saturating_mul(height)],
        }
    }

    /// Copy of the `width × height` block starting at `(top, left)`, cut short at the
    /// grid's edges.
    pub(crate) fn window(&self, top: usize, left: usize, width: usize, height: usize) -> Self {
        let width = width.min(self.width.saturating_sub(left));
        let height = height.min(self.height.saturating_sub(top));
        let colors = self
            .rows()
            .skip(top)
            .take(height)
            .flat_map(|row| row.iter().skip(left).take(width).copied())
            .collect();
        Self {
            width,
            height,
            colors,
        }
    }

    /// Build a grid from rows of colors.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidArgument`] if there are no rows, the first row is empty, or
    /// the rows differ in length.
    pub fn from_rows(rows: Vec<Vec<Color>>) -> Result<Self> {
        let width = rows.first().map_or(0, Vec::len);
        if width == 0 {
            return Err(Error::InvalidArgument("grid rows must be non-empty"));
        }
        if rows.iter().any(|row| row.len() != width) {
            return Err(Error::InvalidArgument("grid rows must all have the same length"));
        }
        let height = rows.len();
        let mut grid = Self::new(width, height)?;
        grid.colors = rows.into_iter().flatten().collect();
        Ok(grid)
    }

    /// Build a grid from row-major RGB pixels, quantized with [`Color::from_rgb8`].
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidDimension`] for a zero dimension and
    /// [`Error::InvalidArgument`] if `pixels.len()` is not `width * height`.
    pub fn from_rgb8(width: usize, height: usize, pixels: &[RGB8]) -> Result<Self> {
        let mut grid = Self::new(width, height)?;
        if pixels.len() != grid.colors.len() {
            return Err(Error::InvalidArgument("pixel count must equal width * height"));
        }
        for (slot, pixel) in grid.colors.iter_mut().zip(pixels) {
            *slot = Color::from_rgb8(*pixel);
        }
        Ok(grid)
    }

    /// A `width × height` grid whose border ring is `color` and whose interior is off.
    ///
    /// ```rust
    /// use launchpad_envoy::{color::Color, grid::Grid};
    ///
    /// let frame = Grid::hollow_rectangle(4, 3, Color::WEAK_GREEN)?;
    /// assert_eq!(frame.to_string(), "****\n*  *\n****\n");
    /// # Ok::<(), launchpad_envoy::Error>(())
    /// ```
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidDimension`] if either dimension is zero.
    pub fn hollow_rectangle(width: usize, height: usize, color: Color) -> Result<Self> {
        let mut grid = Self::new(width, height)?;
        let style = PrimitiveStyleBuilder::new()
            .stroke_color(color)
            .stroke_width(1)
            .stroke_alignment(StrokeAlignment::Inside)
            .build();
        let Ok(()) = Rectangle::new(Point::zero(), grid.size())
            .into_styled(style)
            .draw(&mut grid);
        Ok(grid)
    }

    /// Number of columns.
    #[must_use]
    pub const fn width(&self) -> usize {
        self.width
    }

    /// Number of rows.
    #[must_use]
    pub const fn height(&self) -> usize {
        self.height
    }

    /// Whether `(row, column)` lies inside the grid.
    #[must_use]
    pub fn in_bounds(&self, row: i32, column: i32) -> bool {
        self.index(row, column).is_some()
    }

    fn index(&self, row: i32, column: i32) -> Option<usize> {
        let row = usize::try_from(row).ok().filter(|row| *row < self.height)?;
        let column = usize::try_from(column)
            .ok()
            .filter(|column| *column < self.width)?;
        Some(row * self.width + column)
    }

    /// Color at `(row, column)`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::OutOfBounds`] outside the grid.
    pub fn get(&self, row: i32, column: i32) -> Result<Color> {
        self.index(row, column)
            .and_then(|index| self.colors.get(index).copied())
            .ok_or(Error::OutOfBounds { row, column })
    }

    /// Set the color at `(row, column)`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::OutOfBounds`] outside the grid.
    pub fn set(&mut self, row: i32, column: i32, color: Color) -> Result<()> {
        let slot = self
            .index(row, column)
            .and_then(|index| self.colors.get_mut(index))
            .ok_or(Error::OutOfBounds { row, column })?;
        *slot = color;
        Ok(())
    }

    /// Recolor: every lit cell becomes `color`, unlit cells stay off.
    pub fn fill(&mut self, color: Color) {
        self.colors
            .iter_mut()
            .filter(|slot| !slot.is_off())
            .for_each(|slot| *slot = color);
    }

    /// Set every cell, lit or not, to `color`.
    pub fn fill_area(&mut self, color: Color) {
        self.colors.fill(color);
    }

    /// Take over `other`'s storage and dimensions; nothing is copied.
    pub fn replace_by(&mut self, other: Self) {
        *self = other;
    }

    /// The rows of the grid, top to bottom.
    pub fn rows(&self) -> impl Iterator<Item = &[Color]> + '_ {
        self.colors.chunks_exact(self.width)
    }

    /// Iterate every cell in row-major order with its position.
    pub fn cells(&self) -> impl Iterator<Item = crate::Cell> + '_ {
        self.colors.iter().zip(0_usize..).map(|(color, index)| {
            let (row, column) = (index / self.width, index % self.width);
            crate::Cell::new(as_coordinate(row), as_coordinate(column), *color)
        })
    }
}

// Dimensions are limited to `i32` on construction, so positions always fit.
pub(crate) fn as_coordinate(value: usize) -> i32 {
    i32::try_from(value).unwrap_or(i32::MAX)
}

impl fmt::Display for Grid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in self.rows() {
            for color in row {
                f.write_str(if color.is_off() { " " } else { "*" })?;
            }
            f.write_str("\n")?;
        }
        Ok(())
    }
}

impl fmt::Debug for Grid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Grid")
            .field("width", &self.width)
            .field("height", &self.height)
            .finish_non_exhaustive()
    }
}

impl OriginDimensions for Grid {
    fn size(&self) -> Size {
        Size::new(
            u32::try_from(self.width).unwrap_or(u32::MAX),
            u32::try_from(self.height).unwrap_or(u32::MAX),
        )
    }
}

impl DrawTarget for Grid {
    type Color = Color;
    type Error = Infallible;

    fn draw_iter<I>(&mut self, pixels: I) -> core::result::Result<(), Self::Error>
    where
        I: IntoIterator<Item = Pixel<Self::Color>>,
    {
        for Pixel(coord, color) in pixels {
            // x is the column, y the row; off-grid pixels are clipped.
            if let Some(index) = self.index(coord.y, coord.x) {
                if let Some(slot) = self.colors.get_mut(index) {
                    *slot = color;
                }
            }
        }
        Ok(())
    }
}
