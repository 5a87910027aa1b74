//! Device abstraction for Launchpad-style grid-button LED controllers.
//!
//! The controller keeps a shadow of every LED so it only talks to the device when a pad
//! actually changes, batches changes while "preparing", and decodes button presses.
//! Patterns are built as [`Grid`]s and applied through [`GridView`]s, which add a
//! position, a quarter-turn rotation, and an optional override color.
//!
//! # Glossary
//!
//! - **Logical coordinate:** `(row, column)` as a client sees it. Row `-1` is the round
//!   top row, rows `0..8` the main pads; column `8` of a main row is its side button.
//! - **Shadow:** the controller's record of what each LED currently shows.
//! - **Preparing:** a nestable batching mode; writes land in a snapshot and are sent in
//!   one pass when the outermost level is left.
//! - **Message port:** an already-open channel that delivers three-byte MIDI messages
//!   ([`MessagePort`]). Finding and opening the device is up to the caller.
//!
//! # Example
//!
//! ```rust
//! use launchpad_envoy::{Color, Grid, GridView, Launchpad, MessagePort, ShortMessage, TransportError};
//!
//! struct Sink;
//!
//! impl MessagePort for Sink {
//!     fn send(&mut self, _message: ShortMessage) -> Result<(), TransportError> {
//!         Ok(())
//!     }
//! }
//!
//! let mut launchpad = Launchpad::open(Sink, ())?;
//! let arrow = Grid::from_rows(vec![
//!     vec![Color::OFF, Color::STRONG_RED, Color::OFF],
//!     vec![Color::STRONG_RED, Color::STRONG_RED, Color::STRONG_RED],
//! ])?;
//! let mut view = GridView::at(&arrow, 3, 3);
//! view.set_rotation(1);
//! launchpad.turn_on_view(&view)?;
//! assert_eq!(launchpad.get_button(4, 4)?, Color::STRONG_RED);
//! # Ok::<(), launchpad_envoy::Error>(())
//! ```
//!
//! # Features
//!
//! - `defmt`: log through `defmt` and derive `defmt::Format` for the public value types.
//! - `host`: build with `std`; adds [`to_png`] previews and `Grid::from_png`.
#![cfg_attr(not(feature = "host"), no_std)]

extern crate alloc;

pub mod cell;
pub mod color;
mod error;
pub mod grid;
pub mod launchpad;
mod logging;
pub mod protocol;
#[cfg(feature = "host")]
pub mod to_png;

// Re-export error types and result (used throughout)
pub use crate::error::{Error, Result, TransportError};

pub use cell::Cell;
pub use color::Color;
pub use grid::{Grid, GridView, Rotation};
pub use launchpad::{ButtonHandler, ButtonQueue, Launchpad, SharedLaunchpad, TestBrightness};
pub use protocol::{ButtonAction, ButtonEvent, MessagePort, ShortMessage, decode};
