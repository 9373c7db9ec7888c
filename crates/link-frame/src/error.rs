//! Error types for the frame crate.

use crate::private::*;

/// A specialized `Result` type with [`Error`].
pub type Result<T> = StdResult<T, Error>;

/// Errors returned by [`crate::build_frame`].
///
/// Parser errors are never surfaced this way: per the parser's
/// resync discipline they are counted internally and never returned
/// to a caller (see [`Parser`](crate::Parser)'s `ok`/`len_err`/
/// `crc_err`/`budget_err` counters).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Error {
    /// Payload would not fit in `MAX_PACKET` bytes.
    PayloadTooLarge { max: usize },
    /// Destination buffer is too small to hold the built frame.
    BufferTooSmall { need: usize },
}

impl StdError for Error {}

impl Display for Error {
    fn fmt(&self, f: &mut Formatter) -> FmtResult {
        match self {
            Self::PayloadTooLarge { max } => {
                write!(f, "payload exceeds the maximum packet size of {max} bytes")
            }
            Self::BufferTooSmall { need } => {
                write!(f, "destination buffer too small, need {need} bytes")
            }
        }
    }
}
