//! A device abstraction for a Launchpad-style 8×8 grid-button LED controller.
//!
//! See [`Launchpad`] for usage.

pub mod shared;

pub use shared::SharedLaunchpad;

use embedded_graphics::{Pixel, draw_target::DrawTarget, prelude::Point};
use heapless::{Deque, Vec};

use crate::cell::Cell;
use crate::color::Color;
use crate::grid::{Grid, GridView};
use crate::logging::{log_debug, log_info, log_trace, log_warn};
use crate::protocol::{
    self, ButtonAction, ButtonEvent, CONTROL_CHANGE, LedSwitch, MAIN_SIZE, MessagePort,
    RESET_CONTROLLER, SIDE_COLUMN, ShortMessage, TEST_MODE_BASE, TOP_ROW, position_in_bounds,
};
use crate::{Error, Result};

// ============================================================================
// Constants
// ============================================================================

/// Shadow storage is 9×9: the top row sits at index 0, main rows at 1..=8.
const SHADOW_SIZE: usize = 9;
const SHADOW_LEN: usize = SHADOW_SIZE * SHADOW_SIZE;
/// Width and height of the square pad area.
const MAIN_SQUARE: usize = 8;

// ============================================================================
// ButtonHandler - Inbound press/release hooks
// ============================================================================

/// Receives button presses and releases decoded by [`Launchpad::receive`].
///
/// Both methods default to doing nothing. `()` is the handler that ignores everything.
pub trait ButtonHandler {
    /// A button at `(row, column)` went down. Row `-1` is the top row.
    fn pressed(&mut self, _row: i32, _column: i32) {}

    /// A button at `(row, column)` came back up.
    fn released(&mut self, _row: i32, _column: i32) {}
}

impl ButtonHandler for () {}

impl<H: ButtonHandler + ?Sized> ButtonHandler for &mut H {
    fn pressed(&mut self, row: i32, column: i32) {
        (**self).pressed(row, column);
    }

    fn released(&mut self, row: i32, column: i32) {
        (**self).released(row, column);
    }
}

/// A [`ButtonHandler`] that queues the last `N` events for polling.
///
/// When the queue is full the oldest event is dropped.
#[derive(Clone, Debug, Default)]
pub struct ButtonQueue<const N: usize> {
    events: Deque<ButtonEvent, N>,
}

impl<const N: usize> ButtonQueue<N> {
    /// Create an empty queue.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            events: Deque::new(),
        }
    }

    /// Take the oldest queued event.
    pub fn pop(&mut self) -> Option<ButtonEvent> {
        self.events.pop_front()
    }

    /// Number of queued events.
    #[must_use]
    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// Whether no events are queued.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    fn push(&mut self, event: ButtonEvent) {
        if self.events.is_full() {
            self.events.pop_front();
        }
        // Cannot fail: room was made above (and N == 0 stores nothing).
        let _ = self.events.push_back(event);
    }
}

impl<const N: usize> ButtonHandler for ButtonQueue<N> {
    fn pressed(&mut self, row: i32, column: i32) {
        self.push(ButtonEvent {
            row,
            column,
            action: ButtonAction::Pressed,
        });
    }

    fn released(&mut self, row: i32, column: i32) {
        self.push(ButtonEvent {
            row,
            column,
            action: ButtonAction::Released,
        });
    }
}

// ============================================================================
// TestBrightness - Device self-test levels
// ============================================================================

/// Brightness of the device's built-in all-LEDs-on test mode.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TestBrightness {
    /// Every LED amber at level 1.
    Low,
    /// Every LED amber at level 2.
    Medium,
    /// Every LED amber at level 3.
    Full,
}

impl TestBrightness {
    const fn mode(self) -> u8 {
        match self {
            Self::Low => 0,
            Self::Medium => 1,
            Self::Full => 2,
        }
    }
}

// ============================================================================
// Launchpad Device
// ============================================================================

/// A device abstraction for a Launchpad-style grid controller.
///
/// The controller keeps a shadow copy of every LED and only talks to the device when a
/// pad actually changes. Coordinates are logical: rows `0..8` and columns `0..8` are the
/// square pads, column `8` on those rows is the round side button, and row `-1`,
/// columns `0..8`, is the round top row. See [`protocol`] for the wire mapping.
///
/// # Preparing
///
/// [`set_preparing(true)`](Self::set_preparing) (or [`prepare`](Self::prepare)) batches
/// changes: writes land in a snapshot of the shadow state taken when preparing first
/// starts. Preparing nests; only the outermost `set_preparing(false)` sends the net
/// changes, one message per pad that ends up different.
///
/// # Example
///
/// ```rust
/// use launchpad_envoy::color::Color;
/// use launchpad_envoy::grid::{Grid, GridView};
/// use launchpad_envoy::launchpad::Launchpad;
/// use launchpad_envoy::protocol::{MessagePort, ShortMessage};
/// use launchpad_envoy::TransportError;
///
/// #[derive(Default)]
/// struct Recorder(Vec<ShortMessage>);
///
/// impl MessagePort for Recorder {
///     fn send(&mut self, message: ShortMessage) -> Result<(), TransportError> {
///         self.0.push(message);
///         Ok(())
///     }
/// }
///
/// let mut launchpad = Launchpad::new(Recorder::default(), ());
/// launchpad.turn_on(0, 0, Color::STRONG_RED)?;
/// launchpad.turn_on(0, 0, Color::STRONG_RED)?; // already lit: nothing sent
/// assert_eq!(launchpad.port().0.len(), 1);
///
/// // Draw a frame around the pads in one batch.
/// let frame = Grid::hollow_rectangle(8, 8, Color::STRONG_GREEN)?;
/// launchpad.prepare(|launchpad| launchpad.turn_on_view(&GridView::new(&frame)))?;
/// assert_eq!(launchpad.get_button(0, 0)?, Color::STRONG_GREEN);
/// assert_eq!(launchpad.port().0.len(), 1 + 28);
/// # Ok::<(), launchpad_envoy::Error>(())
/// ```
pub struct Launchpad<P, H = ()> {
    port: P,
    handler: H,
    shadow: Grid,
    preparing_depth: u32,
    pending: Option<Grid>,
}

impl<P: MessagePort, H: ButtonHandler> Launchpad<P, H> {
    /// Wrap an already-open port. Nothing is sent; the shadow starts all off.
    #[must_use]
    pub fn new(port: P, handler: H) -> Self {
        Self {
            port,
            handler,
            shadow: Grid::blank(SHADOW_SIZE, SHADOW_SIZE),
            preparing_depth: 0,
            pending: None,
        }
    }

    /// Wrap an already-open port and reset the device so it matches the all-off shadow.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Transport`] if the reset message cannot be sent.
    pub fn open(port: P, handler: H) -> Result<Self> {
        let mut launchpad = Self::new(port, handler);
        launchpad.reset()?;
        Ok(launchpad)
    }

    /// Reset the device and give back the port.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Transport`] if the reset message cannot be sent; use
    /// [`into_parts`](Self::into_parts) to recover the port without touching the device.
    pub fn close(mut self) -> Result<P> {
        self.reset()?;
        log_info!("Launchpad::close");
        Ok(self.port)
    }

    /// Give back the port and handler without sending anything.
    pub fn into_parts(self) -> (P, H) {
        (self.port, self.handler)
    }

    /// The message port.
    #[must_use]
    pub const fn port(&self) -> &P {
        &self.port
    }

    /// The message port, mutably.
    pub const fn port_mut(&mut self) -> &mut P {
        &mut self.port
    }

    /// The button handler.
    #[must_use]
    pub const fn handler(&self) -> &H {
        &self.handler
    }

    /// The button handler, mutably (for example to drain a [`ButtonQueue`]).
    pub const fn handler_mut(&mut self) -> &mut H {
        &mut self.handler
    }

    // The top row is stored at index 0, so stored rows are shifted by one.
    const fn shadow_row(row: i32) -> i32 {
        row + 1
    }

    /// Current color of `(row, column)` as last sent, [`Color::OFF`] if unlit.
    ///
    /// # Errors
    ///
    /// Returns [`Error::OutOfBounds`] unless the position addresses a button.
    pub fn get_button(&self, row: i32, column: i32) -> Result<Color> {
        if !position_in_bounds(row, column) {
            return Err(Error::OutOfBounds { row, column });
        }
        self.shadow.get(Self::shadow_row(row), column)
    }

    /// Light `(row, column)` with `color`.
    ///
    /// Sends nothing if the pad already shows `color`. Turning a pad on with
    /// [`Color::OFF`] turns it off. While preparing, only the pending snapshot changes.
    ///
    /// # Errors
    ///
    /// - [`Error::OutOfBounds`] unless the position addresses a button.
    /// - [`Error::InvalidArgument`] if `color` is negative (other than [`Color::OFF`]).
    /// - [`Error::Transport`] if the port fails; the shadow keeps its old color.
    pub fn turn_on(&mut self, row: i32, column: i32, color: Color) -> Result<()> {
        if !position_in_bounds(row, column) {
            return Err(Error::OutOfBounds { row, column });
        }
        if color.is_off() {
            return self.turn_off(row, column);
        }
        let value = u8::try_from(color.0)
            .map_err(|_| Error::InvalidArgument("color byte must be 0..=127"))?;
        if let Some(pending) = self.pending.as_mut() {
            return pending.set(Self::shadow_row(row), column, color);
        }
        if self.shadow.get(Self::shadow_row(row), column)? == color {
            return Ok(());
        }
        let message = protocol::switch_message(row, column, LedSwitch::On, value)?;
        self.send(message)?;
        self.shadow.set(Self::shadow_row(row), column, color)
    }

    /// Turn `(row, column)` off.
    ///
    /// Positions that do not address a button are ignored. Sends nothing if the pad
    /// is already off.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Transport`] if the port fails; the shadow keeps its old color.
    pub fn turn_off(&mut self, row: i32, column: i32) -> Result<()> {
        if !position_in_bounds(row, column) {
            return Ok(());
        }
        if let Some(pending) = self.pending.as_mut() {
            return pending.set(Self::shadow_row(row), column, Color::OFF);
        }
        if self.shadow.get(Self::shadow_row(row), column)?.is_off() {
            return Ok(());
        }
        let message = protocol::switch_message(row, column, LedSwitch::Off, 0)?;
        self.send(message)?;
        self.shadow.set(Self::shadow_row(row), column, Color::OFF)
    }

    /// Light every lit cell of `view`; off cells leave the pads under them alone.
    ///
    /// # Errors
    ///
    /// Stops at the first failing cell; see [`turn_on`](Self::turn_on).
    pub fn turn_on_view(&mut self, view: &GridView<'_>) -> Result<()> {
        view.cells()
            .filter(|cell| !cell.color.is_off())
            .try_for_each(|cell| self.turn_on(cell.row, cell.column, cell.color))
    }

    /// Turn off the pads under every lit cell of `view`.
    ///
    /// # Errors
    ///
    /// Stops at the first transport failure.
    pub fn turn_off_view(&mut self, view: &GridView<'_>) -> Result<()> {
        view.cells()
            .filter(|cell| !cell.color.is_off())
            .try_for_each(|cell| self.turn_off(cell.row, cell.column))
    }

    /// Make the pads under `view` match it exactly: lit cells light, off cells turn off.
    ///
    /// # Errors
    ///
    /// Stops at the first failing cell; every cell of the view must address a button.
    pub fn replace(&mut self, view: &GridView<'_>) -> Result<()> {
        view.cells()
            .try_for_each(|cell| self.turn_on(cell.row, cell.column, cell.color))
    }

    /// Send the device's reset command and mark every pad off.
    ///
    /// While preparing, the pending snapshot is cleared too.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Transport`] if the port fails; nothing is changed then.
    pub fn reset(&mut self) -> Result<()> {
        self.send(ShortMessage::new(CONTROL_CHANGE, RESET_CONTROLLER, 0)?)?;
        self.shadow.fill_area(Color::OFF);
        if let Some(pending) = self.pending.as_mut() {
            pending.fill_area(Color::OFF);
        }
        log_info!("Launchpad::reset: all pads off");
        Ok(())
    }

    /// Turn every pad off one at a time, sending only for pads that are lit.
    ///
    /// # Errors
    ///
    /// Stops at the first transport failure.
    pub fn clear(&mut self) -> Result<()> {
        for row in TOP_ROW..MAIN_SIZE {
            for column in 0..=SIDE_COLUMN {
                self.turn_off(row, column)?;
            }
        }
        log_info!("Launchpad::clear: done");
        Ok(())
    }

    /// Switch the device into its all-LEDs test mode at `brightness`.
    ///
    /// The shadow records every pad as amber at the matching level. While preparing, the
    /// pending snapshot is filled too, so leaving preparing keeps the test pattern.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Transport`] if the port fails; nothing is changed then.
    pub fn light_test(&mut self, brightness: TestBrightness) -> Result<()> {
        let mode = brightness.mode();
        let color = Color::new(mode + 1, mode + 1)?;
        self.send(ShortMessage::new(
            CONTROL_CHANGE,
            RESET_CONTROLLER,
            TEST_MODE_BASE + mode,
        )?)?;
        self.shadow.fill_area(color);
        if let Some(pending) = self.pending.as_mut() {
            pending.fill_area(color);
        }
        log_info!("Launchpad::light_test: mode {}", mode);
        Ok(())
    }

    /// Set the LED duty cycle to `numerator / denominator` (brightness and flicker).
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidArgument`] unless `numerator` is `1..=16` and `denominator` is `3..=18`.
    /// - [`Error::Transport`] if the port fails.
    pub fn set_duty_cycle(&mut self, numerator: u8, denominator: u8) -> Result<()> {
        let message = protocol::duty_cycle_message(numerator, denominator)?;
        self.send(message)
    }

    /// Copy of the 8×8 square pads (no side or top buttons).
    #[must_use]
    pub fn grid(&self) -> Grid {
        self.shadow.window(1, 0, MAIN_SQUARE, MAIN_SQUARE)
    }

    /// Copy of every button as a 9×9 grid: row 0 is the top row, rows 1..=8 the main
    /// rows; the unused top-right corner is always off.
    #[must_use]
    pub fn full_grid(&self) -> Grid {
        let mut grid = self.shadow.clone();
        let corner = Point::new(SIDE_COLUMN, Self::shadow_row(TOP_ROW));
        let Ok(()) = grid.draw_iter([Pixel(corner, Color::OFF)]);
        grid
    }

    /// Whether changes are currently being batched.
    #[must_use]
    pub const fn is_preparing(&self) -> bool {
        self.preparing_depth != 0
    }

    /// How many times preparing has been entered without being left.
    #[must_use]
    pub const fn preparing_depth(&self) -> u32 {
        self.preparing_depth
    }

    /// Enter (`true`) or leave (`false`) preparing.
    ///
    /// Leaving the outermost level sends every pad whose pending color differs from
    /// the shadow.
    ///
    /// # Errors
    ///
    /// - [`Error::IllegalState`] when leaving while not preparing.
    /// - The first error from the flush. Every change is still attempted, and preparing is
    ///   left either way.
    pub fn set_preparing(&mut self, preparing: bool) -> Result<()> {
        if preparing {
            if self.preparing_depth == 0 {
                self.pending = Some(self.shadow.clone());
            }
            self.preparing_depth = self.preparing_depth.saturating_add(1);
            log_debug!("Launchpad: preparing depth {}", self.preparing_depth);
            return Ok(());
        }
        if self.preparing_depth == 0 {
            return Err(Error::IllegalState("not preparing"));
        }
        self.preparing_depth -= 1;
        log_debug!("Launchpad: preparing depth {}", self.preparing_depth);
        if self.preparing_depth == 0 {
            self.flush()
        } else {
            Ok(())
        }
    }

    /// Run `f` while preparing, then leave preparing (flushing if outermost).
    ///
    /// Preparing is left even if `f` fails; `f`'s error wins over a flush error.
    ///
    /// # Errors
    ///
    /// Whatever `f` or the flush returns.
    pub fn prepare<R>(&mut self, f: impl FnOnce(&mut Self) -> Result<R>) -> Result<R> {
        self.set_preparing(true)?;
        let result = f(&mut *self);
        let flushed = self.set_preparing(false);
        let value = result?;
        flushed?;
        Ok(value)
    }

    // Send every pending change. All changes are attempted; the first error is returned.
    fn flush(&mut self) -> Result<()> {
        let Some(pending) = self.pending.take() else {
            return Ok(());
        };
        let changes: Vec<Cell, SHADOW_LEN> = pending
            .cells()
            .filter(|cell| self.shadow.get(cell.row, cell.column) != Ok(cell.color))
            .map(|cell| Cell::new(cell.row - 1, cell.column, cell.color))
            .filter(|cell| position_in_bounds(cell.row, cell.column))
            .collect();
        log_debug!("Launchpad::flush: {} changes", changes.len());
        let mut first_error = None;
        for cell in &changes {
            if let Err(error) = self.turn_on(cell.row, cell.column, cell.color) {
                first_error.get_or_insert(error);
            }
        }
        first_error.map_or(Ok(()), Err)
    }

    /// Decode an inbound message and call the handler's `pressed` or `released`.
    ///
    /// Messages that do not address a button are dropped and yield `None`.
    /// `timestamp_micros` is the port's receive time, `-1` if it has none.
    pub fn receive(&mut self, message: ShortMessage, timestamp_micros: i64) -> Option<ButtonEvent> {
        let Some(event) = protocol::decode(message) else {
            log_trace!("Launchpad::receive: dropped {} at {}", message, timestamp_micros);
            return None;
        };
        match event.action {
            ButtonAction::Pressed => self.handler.pressed(event.row, event.column),
            ButtonAction::Released => self.handler.released(event.row, event.column),
        }
        Some(event)
    }

    /// Like [`receive`](Self::receive), starting from raw bytes; invalid MIDI is dropped.
    pub fn receive_bytes(&mut self, bytes: [u8; 3], timestamp_micros: i64) -> Option<ButtonEvent> {
        let message = ShortMessage::try_from(bytes).ok()?;
        self.receive(message, timestamp_micros)
    }

    fn send(&mut self, message: ShortMessage) -> Result<()> {
        log_trace!("Launchpad::send: {}", message);
        self.port.send(message).map_err(|error| {
            log_warn!("Launchpad::send: {} failed", message);
            Error::from(error)
        })
    }
}
