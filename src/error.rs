use derive_more::{Display, Error, From};

/// Result type used throughout the crate.
pub type Result<T, E = Error> = core::result::Result<T, E>;

/// Errors reported by grids, views, and the [`Launchpad`](crate::launchpad::Launchpad) controller.
#[derive(Clone, Copy, Debug, Display, Error, From, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Error {
    /// A coordinate lies outside the valid range of the grid, view, or device.
    #[display("position (row {row}, column {column}) is out of bounds")]
    OutOfBounds {
        /// Requested row.
        row: i32,
        /// Requested column.
        column: i32,
    },

    /// A grid was requested with a zero width or height.
    #[display("invalid grid dimensions {width}x{height}")]
    InvalidDimension {
        /// Requested width.
        width: usize,
        /// Requested height.
        height: usize,
    },

    /// Malformed input: color levels, duty cycles, flat coordinate lists, or pixel buffers.
    #[display("invalid argument: {_0}")]
    InvalidArgument(#[error(not(source))] &'static str),

    /// The message port failed to deliver an outbound message.
    #[display("message port failed: {_0}")]
    #[from]
    Transport(TransportError),

    /// The controller was used in a way its current state does not allow.
    #[display("illegal state: {_0}")]
    IllegalState(#[error(not(source))] &'static str),
}

/// Failure reported by a [`MessagePort`](crate::protocol::MessagePort) when a send does not go through.
#[derive(Clone, Copy, Debug, Display, Error, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[display("message could not be delivered")]
pub struct TransportError;
