//! Launchpad color bytes: red/green levels plus the device's copy and clear flags.
//!
//! See [`Color`] for the constants and the named palette.

use core::fmt;

use embedded_graphics::pixelcolor::{PixelColor, Rgb888};
use embedded_graphics::prelude::RgbColor;
use smart_leds::RGB8;

use crate::{Error, Result};

/// Predefined RGB color constants from the `smart_leds` crate, useful with [`Color::from_rgb8`].
#[doc(inline)]
pub use smart_leds::colors;

// Bit layout of a color byte: gg cl rr (green level, clear flag, copy flag, red level).
const GREEN_SHIFT: u8 = 4;
const LEVEL_MASK: u8 = 0b11;
const COPY_BIT: u8 = 0b0100;
const CLEAR_BIT: u8 = 0b1000;

/// Highest red or green level a pad can show.
pub const MAX_LEVEL: u8 = 3;

/// Number of entries in [`Color::PALETTE`].
pub const VISIBLE_COLORS: usize = 15;

/// A Launchpad color byte.
///
/// The low two bits hold the red level, bits four and five the green level. Bit two
/// ("copy") and bit three ("clear") select how the device double-buffers the LED; the
/// public constructor [`Color::new`] always sets both, which is the normal behavior.
///
/// [`Color::OFF`] is not a device color. It marks an unlit cell in a
/// [`Grid`](crate::grid::Grid) and in the controller's shadow state, and is never sent.
///
/// ```rust
/// use launchpad_envoy::color::Color;
///
/// let orange = Color::new(3, 1)?;
/// assert_eq!(orange, Color::STRONG_ORANGE);
/// assert_eq!((orange.red(), orange.green()), (3, 1));
/// assert!(Color::OFF.is_off());
/// # Ok::<(), launchpad_envoy::Error>(())
/// ```
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Color(pub i8);

impl Color {
    /// A turned-off cell.
    pub const OFF: Self = Self(-1);
    /// Displays as black but counts as a lit cell whose color is not chosen yet.
    pub const NOT_DEFINED: Self = Self(0);
    /// Device default velocity.
    pub const DEFAULT: Self = Self(127);
    /// Both levels zero with copy and clear set: invisible on the pad, yet not [`Color::OFF`].
    pub const EMPTY_COLOR: Self = Self(12);

    /// Full yellow.
    pub const STRONG_YELLOW: Self = Self(63);
    /// Medium yellow.
    pub const MEDIUM_YELLOW: Self = Self(46);
    /// First lime tone.
    pub const LIME_1: Self = Self(62);
    /// Weak first lime tone.
    pub const WEAK_LIME_1: Self = Self(45);
    /// Second lime tone.
    pub const LIME_2: Self = Self(61);
    /// Full green.
    pub const STRONG_GREEN: Self = Self(60);
    /// Medium green.
    pub const MEDIUM_GREEN: Self = Self(44);
    /// Weak green.
    pub const WEAK_GREEN: Self = Self(28);
    /// Full orange.
    pub const STRONG_ORANGE: Self = Self(31);
    /// Medium orange.
    pub const MEDIUM_ORANGE: Self = Self(47);
    /// Weak orange.
    pub const WEAK_ORANGE: Self = Self(30);
    /// Weak yellow.
    pub const WEAK_YELLOW: Self = Self(29);
    /// Full red.
    pub const STRONG_RED: Self = Self(15);
    /// Medium red.
    pub const MEDIUM_RED: Self = Self(14);
    /// Weak red.
    pub const WEAK_RED: Self = Self(13);

    /// The visible pre-mixed colors, in a fixed order.
    pub const PALETTE: [Self; VISIBLE_COLORS] = [
        Self::STRONG_YELLOW,
        Self::MEDIUM_YELLOW,
        Self::LIME_1,
        Self::WEAK_LIME_1,
        Self::LIME_2,
        Self::STRONG_GREEN,
        Self::MEDIUM_GREEN,
        Self::WEAK_GREEN,
        Self::STRONG_ORANGE,
        Self::MEDIUM_ORANGE,
        Self::WEAK_ORANGE,
        Self::WEAK_YELLOW,
        Self::STRONG_RED,
        Self::MEDIUM_RED,
        Self::WEAK_RED,
    ];

    /// Build a color from red and green levels (each `0..=3`) with the copy and clear flags set.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidArgument`] if a level is above [`MAX_LEVEL`].
    pub const fn new(red: u8, green: u8) -> Result<Self> {
        Self::with_flags(red, green, true, true)
    }

    /// Build a color with explicit control over the copy and clear flags.
    pub(crate) const fn with_flags(red: u8, green: u8, copy: bool, clear: bool) -> Result<Self> {
        if red > MAX_LEVEL {
            return Err(Error::InvalidArgument("red level must be 0..=3"));
        }
        if green > MAX_LEVEL {
            return Err(Error::InvalidArgument("green level must be 0..=3"));
        }
        let mut byte = (green << GREEN_SHIFT) | red;
        if copy {
            byte |= COPY_BIT;
        }
        if clear {
            byte |= CLEAR_BIT;
        }
        #[allow(clippy::cast_possible_wrap, reason = "byte is at most 0b0011_1111")]
        let signed = byte as i8;
        Ok(Self(signed))
    }

    /// Look up a palette entry by index.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidArgument`] if `index` is not below [`VISIBLE_COLORS`].
    pub fn from_palette(index: usize) -> Result<Self> {
        Self::PALETTE
            .get(index)
            .copied()
            .ok_or(Error::InvalidArgument("palette index must be below 15"))
    }

    /// Whether this is the [`Color::OFF`] sentinel.
    #[must_use]
    pub const fn is_off(self) -> bool {
        self.0 == Self::OFF.0
    }

    /// Red level (`0..=3`).
    #[must_use]
    pub const fn red(self) -> u8 {
        self.bits() & LEVEL_MASK
    }

    /// Green level (`0..=3`).
    #[must_use]
    pub const fn green(self) -> u8 {
        (self.bits() >> GREEN_SHIFT) & LEVEL_MASK
    }

    /// Whether the copy flag is set.
    #[must_use]
    pub const fn copy(self) -> bool {
        self.bits() & COPY_BIT != 0
    }

    /// Whether the clear flag is set.
    #[must_use]
    pub const fn clear(self) -> bool {
        self.bits() & CLEAR_BIT != 0
    }

    #[allow(clippy::cast_sign_loss, reason = "reinterpret the byte")]
    const fn bits(self) -> u8 {
        self.0 as u8
    }

    /// Quantize an 8-bit RGB pixel to Launchpad levels (`channel / 64`); blue is ignored.
    ///
    /// A pixel whose red and green both quantize to zero becomes [`Color::OFF`].
    #[must_use]
    pub const fn from_rgb8(pixel: RGB8) -> Self {
        let red = pixel.r / 64;
        let green = pixel.g / 64;
        if red == 0 && green == 0 {
            return Self::OFF;
        }
        match Self::new(red, green) {
            Ok(color) => color,
            Err(_) => Self::OFF,
        }
    }

    /// Approximate on-screen color of this pad, for previews. [`Color::OFF`] is black.
    #[must_use]
    pub const fn to_rgb8(self) -> RGB8 {
        if self.is_off() {
            return RGB8::new(0, 0, 0);
        }
        RGB8::new(self.red() * 85, self.green() * 85, 0)
    }
}

impl fmt::Debug for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_off() {
            return f.write_str("Color::OFF");
        }
        write!(
            f,
            "Color({} r{} g{}{}{})",
            self.0,
            self.red(),
            self.green(),
            if self.copy() { " copy" } else { "" },
            if self.clear() { " clear" } else { "" },
        )
    }
}

impl Default for Color {
    fn default() -> Self {
        Self::OFF
    }
}

impl From<RGB8> for Color {
    fn from(pixel: RGB8) -> Self {
        Self::from_rgb8(pixel)
    }
}

impl From<Rgb888> for Color {
    fn from(pixel: Rgb888) -> Self {
        Self::from_rgb8(RGB8::new(pixel.r(), pixel.g(), pixel.b()))
    }
}

impl From<Color> for RGB8 {
    fn from(color: Color) -> Self {
        color.to_rgb8()
    }
}

// Lets a `Grid` act as an embedded-graphics draw target.
impl PixelColor for Color {
    type Raw = ();
}
