//! A [`Launchpad`] that can be reached through a shared reference.

use core::cell::RefCell;

use embassy_sync::blocking_mutex::{Mutex, raw::NoopRawMutex};

use super::{ButtonHandler, Launchpad};
use crate::protocol::{ButtonEvent, MessagePort, ShortMessage};
use crate::{Error, Result};

/// Shares one [`Launchpad`] between the code that draws and the code that reads the port.
///
/// Every access goes through [`lock`](Self::lock), which runs a closure with exclusive
/// access. Calling `lock` again from inside that closure fails with
/// [`Error::IllegalState`] instead of deadlocking.
///
/// ```rust
/// use launchpad_envoy::color::Color;
/// use launchpad_envoy::launchpad::{ButtonQueue, Launchpad, SharedLaunchpad};
/// use launchpad_envoy::protocol::{MessagePort, ShortMessage};
/// use launchpad_envoy::TransportError;
///
/// struct Sink;
///
/// impl MessagePort for Sink {
///     fn send(&mut self, _message: ShortMessage) -> Result<(), TransportError> {
///         Ok(())
///     }
/// }
///
/// let shared = SharedLaunchpad::new(Launchpad::new(Sink, ButtonQueue::<4>::new()));
/// shared.lock(|launchpad| launchpad.turn_on(-1, 0, Color::WEAK_ORANGE))?;
/// shared.receive(ShortMessage::new(0xB0, 104, 127)?, -1)?;
/// assert_eq!(shared.lock(|launchpad| Ok(launchpad.handler_mut().len()))?, 1);
/// # Ok::<(), launchpad_envoy::Error>(())
/// ```
pub struct SharedLaunchpad<P, H = ()> {
    inner: Mutex<NoopRawMutex, RefCell<Launchpad<P, H>>>,
}

impl<P: MessagePort, H: ButtonHandler> SharedLaunchpad<P, H> {
    /// Share `launchpad`.
    #[must_use]
    pub const fn new(launchpad: Launchpad<P, H>) -> Self {
        Self {
            inner: Mutex::new(RefCell::new(launchpad)),
        }
    }

    /// Run `f` with exclusive access to the controller.
    ///
    /// # Errors
    ///
    /// Returns [`Error::IllegalState`] if called re-entrantly, otherwise whatever `f` returns.
    pub fn lock<R>(&self, f: impl FnOnce(&mut Launchpad<P, H>) -> Result<R>) -> Result<R> {
        self.inner.lock(|cell| {
            let mut launchpad = cell
                .try_borrow_mut()
                .map_err(|_| Error::IllegalState("launchpad is already locked"))?;
            f(&mut *launchpad)
        })
    }

    /// Hand an inbound message to [`Launchpad::receive`].
    ///
    /// # Errors
    ///
    /// Returns [`Error::IllegalState`] if called from inside [`lock`](Self::lock).
    pub fn receive(&self, message: ShortMessage, timestamp_micros: i64) -> Result<Option<ButtonEvent>> {
        self.lock(|launchpad| Ok(launchpad.receive(message, timestamp_micros)))
    }

    /// Take back the controller.
    pub fn into_inner(self) -> Launchpad<P, H> {
        self.inner.into_inner().into_inner()
    }
}
