//! Launchpad wire protocol: three-byte MIDI short messages and the coordinate mapping.
//!
//! Logical coordinates put the eight round "top" buttons on row `-1` (columns `0..8`)
//! and the main pads on rows `0..8`, columns `0..9`, where column `8` is the round side
//! button of each row.
//!
//! | Where            | Status byte                        | Data byte            |
//! |------------------|------------------------------------|----------------------|
//! | top row (`-1`)   | [`CONTROL_CHANGE`] for on and off  | `104 + column`       |
//! | main rows        | [`NOTE_ON`] / [`NOTE_OFF`]         | `row * 16 + column`  |
//!
//! The value byte carries the [`Color`](crate::color::Color) when lighting a pad and `0`
//! when turning it off. Inbound button events use the same layout: a non-zero value is
//! a press, zero a release.

use crate::{Error, Result, TransportError};

/// Note-on status byte (channel 1), lights a main-grid pad.
pub const NOTE_ON: u8 = 0x90;
/// Note-off status byte (channel 1), turns a main-grid pad off.
pub const NOTE_OFF: u8 = 0x80;
/// Control-change status byte (channel 1), used for the top row and device commands.
pub const CONTROL_CHANGE: u8 = 0xB0;

/// Data byte of the first top-row button.
pub const TOP_ROW_BASE: u8 = 104;
/// Logical row of the top (auxiliary) button row.
pub const TOP_ROW: i32 = -1;
/// Column of the round side buttons on the main rows.
pub const SIDE_COLUMN: i32 = 8;
/// Number of main rows and of main columns.
pub const MAIN_SIZE: i32 = 8;

/// Control-change data byte for a device reset (with value `0`) or a test mode.
pub const RESET_CONTROLLER: u8 = 0x00;
/// Value byte of the lowest brightness test mode; medium and full follow it.
pub const TEST_MODE_BASE: u8 = 125;
/// Control-change data byte for duty cycles with numerator `1..=8`.
pub const DUTY_CYCLE_LOW: u8 = 0x1E;
/// Control-change data byte for duty cycles with numerator `9..=16`.
pub const DUTY_CYCLE_HIGH: u8 = 0x1F;

/// Largest value a MIDI data byte can carry.
const DATA_MAX: u8 = 0x7F;

/// A three-byte MIDI short message.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ShortMessage {
    status: u8,
    data: u8,
    value: u8,
}

impl ShortMessage {
    /// Create a message, validating the MIDI byte ranges.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidArgument`] if `status` lacks its high bit or a data byte has it.
    pub const fn new(status: u8, data: u8, value: u8) -> Result<Self> {
        if status <= DATA_MAX {
            return Err(Error::InvalidArgument("status byte must be 0x80..=0xFF"));
        }
        if data > DATA_MAX || value > DATA_MAX {
            return Err(Error::InvalidArgument("data bytes must be 0x00..=0x7F"));
        }
        Ok(Self {
            status,
            data,
            value,
        })
    }

    /// Status (command) byte.
    #[must_use]
    pub const fn status(&self) -> u8 {
        self.status
    }

    /// First data byte: the pad code, or the device command.
    #[must_use]
    pub const fn data(&self) -> u8 {
        self.data
    }

    /// Second data byte: the color, velocity, or command argument.
    #[must_use]
    pub const fn value(&self) -> u8 {
        self.value
    }

    /// The three raw bytes.
    #[must_use]
    pub const fn to_bytes(&self) -> [u8; 3] {
        [self.status, self.data, self.value]
    }
}

impl TryFrom<[u8; 3]> for ShortMessage {
    type Error = Error;

    fn try_from([status, data, value]: [u8; 3]) -> Result<Self> {
        Self::new(status, data, value)
    }
}

/// An already-open channel to the device.
///
/// Finding and opening the hardware is up to the caller; the controller only sends
/// through this trait. Inbound messages are handed to
/// [`Launchpad::receive`](crate::launchpad::Launchpad::receive) by whoever reads the port.
pub trait MessagePort {
    /// Deliver one message to the device.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError`] if the message could not be delivered.
    fn send(&mut self, message: ShortMessage) -> core::result::Result<(), TransportError>;
}

impl<P: MessagePort + ?Sized> MessagePort for &mut P {
    fn send(&mut self, message: ShortMessage) -> core::result::Result<(), TransportError> {
        (**self).send(message)
    }
}

/// Whether to light or darken a pad; selects the main-grid status byte.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum LedSwitch {
    /// Light the pad.
    On,
    /// Turn the pad off.
    Off,
}

/// Whether `(row, column)` addresses a button: rows `-1..8`, columns `0..9`, except
/// `(-1, 8)`, which does not exist.
#[must_use]
pub const fn position_in_bounds(row: i32, column: i32) -> bool {
    row >= TOP_ROW
        && row < MAIN_SIZE
        && column >= 0
        && column <= SIDE_COLUMN
        && !(row == TOP_ROW && column == SIDE_COLUMN)
}

/// Whether `(row, column)` is one of the 64 square main pads.
#[must_use]
pub const fn position_in_strict_bounds(row: i32, column: i32) -> bool {
    row >= 0 && row < MAIN_SIZE && column >= 0 && column < MAIN_SIZE
}

/// Data byte addressing `(row, column)`.
///
/// # Errors
///
/// Returns [`Error::OutOfBounds`] unless [`position_in_bounds`] holds.
pub const fn position_to_code(row: i32, column: i32) -> Result<u8> {
    if !position_in_bounds(row, column) {
        return Err(Error::OutOfBounds { row, column });
    }
    #[allow(clippy::cast_sign_loss, clippy::cast_possible_truncation, reason = "bounds checked above")]
    let code = if row == TOP_ROW {
        TOP_ROW_BASE + column as u8
    } else {
        (row as u8) * 16 + column as u8
    };
    Ok(code)
}

/// Status byte that switches `(row, column)`.
///
/// The top row always uses [`CONTROL_CHANGE`]; the main rows use [`NOTE_ON`] or [`NOTE_OFF`].
///
/// # Errors
///
/// Returns [`Error::OutOfBounds`] unless [`position_in_bounds`] holds.
pub const fn position_to_command(row: i32, column: i32, switch: LedSwitch) -> Result<u8> {
    if !position_in_bounds(row, column) {
        return Err(Error::OutOfBounds { row, column });
    }
    Ok(if row == TOP_ROW {
        CONTROL_CHANGE
    } else {
        match switch {
            LedSwitch::On => NOTE_ON,
            LedSwitch::Off => NOTE_OFF,
        }
    })
}

/// Message that switches `(row, column)` to `value` (a color byte, or `0` to turn off).
pub(crate) fn switch_message(row: i32, column: i32, switch: LedSwitch, value: u8) -> Result<ShortMessage> {
    let status = position_to_command(row, column, switch)?;
    let code = position_to_code(row, column)?;
    ShortMessage::new(status, code, value)
}

/// Recover the logical `(row, column)` from a status and data byte.
///
/// Returns `None` for status bytes other than [`NOTE_ON`] and [`CONTROL_CHANGE`] and for
/// codes that do not address a button.
#[must_use]
pub const fn code_to_position(status: u8, code: u8) -> Option<(i32, i32)> {
    let (row, column) = match status {
        NOTE_ON => ((code / 16) as i32, (code % 16) as i32),
        CONTROL_CHANGE => (TOP_ROW, code as i32 - TOP_ROW_BASE as i32),
        _ => return None,
    };
    if position_in_bounds(row, column) {
        Some((row, column))
    } else {
        None
    }
}

/// Whether a button went down or up.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ButtonAction {
    /// The button was pressed.
    Pressed,
    /// The button was released.
    Released,
}

/// A decoded button message.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ButtonEvent {
    /// Logical row, `-1` for the top row.
    pub row: i32,
    /// Logical column.
    pub column: i32,
    /// Press or release.
    pub action: ButtonAction,
}

/// Decode an inbound message into a button event.
///
/// Messages with an unknown status byte or an unaddressable code yield `None`.
#[must_use]
pub const fn decode(message: ShortMessage) -> Option<ButtonEvent> {
    let Some((row, column)) = code_to_position(message.status, message.data) else {
        return None;
    };
    let action = if message.value == 0 {
        ButtonAction::Released
    } else {
        ButtonAction::Pressed
    };
    Some(ButtonEvent {
        row,
        column,
        action,
    })
}

/// Message selecting a duty cycle of `numerator / denominator`.
///
/// # Errors
///
/// Returns [`Error::InvalidArgument`] unless `numerator` is `1..=16` and `denominator` is `3..=18`.
pub const fn duty_cycle_message(numerator: u8, denominator: u8) -> Result<ShortMessage> {
    if numerator < 1 || numerator > 16 {
        return Err(Error::InvalidArgument("duty cycle numerator must be 1..=16"));
    }
    if denominator < 3 || denominator > 18 {
        return Err(Error::InvalidArgument("duty cycle denominator must be 3..=18"));
    }
    let (data, steps) = if numerator < 9 {
        (DUTY_CYCLE_LOW, numerator - 1)
    } else {
        (DUTY_CYCLE_HIGH, numerator - 9)
    };
    ShortMessage::new(CONTROL_CHANGE, data, 0x10 * steps + denominator - 3)
}
