//! A positioned, colored cell as produced by iterating a [`GridView`](crate::grid::GridView).

use alloc::vec::Vec;
use core::hash::{Hash, Hasher};

use crate::color::Color;
use crate::{Error, Result};

/// One cell at an absolute `(row, column)` with its color.
///
/// # Equality
///
/// Equality and hashing compare the packed key `row + 8·column + 64·color`
/// (see [`Cell::packed_key`]), not the three fields one by one. Distinct cells can
/// share a key, for example `(8, 0, c)` and `(0, 1, c)`, and compare equal. Use
/// [`Cell::position_eq`] to compare positions only.
#[derive(Clone, Copy, Debug)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Cell {
    /// Absolute row.
    pub row: i32,
    /// Absolute column.
    pub column: i32,
    /// Color, possibly [`Color::OFF`].
    pub color: Color,
}

impl Cell {
    /// Create a cell.
    #[must_use]
    pub const fn new(row: i32, column: i32, color: Color) -> Self {
        Self { row, column, color }
    }

    /// Create a lit cell whose color is [`Color::NOT_DEFINED`].
    #[must_use]
    pub const fn uncolored(row: i32, column: i32) -> Self {
        Self::new(row, column, Color::NOT_DEFINED)
    }

    /// Whether both cells sit at the same position, whatever their colors.
    #[must_use]
    pub const fn position_eq(&self, other: &Self) -> bool {
        self.row == other.row && self.column == other.column
    }

    /// Packed identity key `row + 8·column + 64·color` with wrapping arithmetic.
    #[must_use]
    pub const fn packed_key(&self) -> i32 {
        self.row
            .wrapping_add(self.column.wrapping_mul(8))
            .wrapping_add((self.color.0 as i32).wrapping_mul(64))
    }

    /// Build cells from a flat `[row, column, color, row, column, color, ...]` list.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidArgument`] if the list is empty or its length is not a
    /// multiple of three, or if a color value does not fit in a color byte.
    pub fn from_triples(values: &[i32]) -> Result<Vec<Self>> {
        if values.is_empty() || values.len() % 3 != 0 {
            return Err(Error::InvalidArgument(
                "expected a non-empty multiple of three values",
            ));
        }
        values
            .chunks_exact(3)
            .map(|chunk| match *chunk {
                [row, column, color] => i8::try_from(color)
                    .map(|color| Self::new(row, column, Color(color)))
                    .map_err(|_| Error::InvalidArgument("color must fit in a signed byte")),
                _ => Err(Error::InvalidArgument("expected row, column, color")),
            })
            .collect()
    }

    /// Build uncolored cells from a flat `[row, column, row, column, ...]` list.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidArgument`] if the list is empty or has odd length.
    pub fn from_pairs(values: &[i32]) -> Result<Vec<Self>> {
        if values.is_empty() || values.len() % 2 != 0 {
            return Err(Error::InvalidArgument(
                "expected a non-empty even number of values",
            ));
        }
        Ok(values
            .chunks_exact(2)
            .filter_map(|chunk| match *chunk {
                [row, column] => Some(Self::uncolored(row, column)),
                _ => None,
            })
            .collect())
    }
}

impl PartialEq for Cell {
    fn eq(&self, other: &Self) -> bool {
        self.packed_key() == other.packed_key()
    }
}

impl Eq for Cell {}

impl Hash for Cell {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.packed_key().hash(state);
    }
}
