//! Error types surfaced to callers of the runtime.

use crate::private::*;

/// A specialized `Result` type with [`LinkError`].
pub type Result<T> = StdResult<T, LinkError>;

/// Errors returned to the caller of [`crate::TxEngine::send_frame`]
/// (and, through it, [`crate::send_segmented`]).
///
/// Parser, ring, and delivery-queue errors are never surfaced this
/// way: §7 specifies they are counted and resolved internally, and
/// that policy is unchanged here.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum LinkError {
    /// `len == 0` or `len > MAX_PACKET`.
    Invalid,
    /// A transmit is already in flight.
    Busy,
    /// The transmit did not complete within the caller's deadline.
    Timeout,
}

impl StdError for LinkError {}

impl Display for LinkError {
    fn fmt(&self, f: &mut Formatter) -> FmtResult {
        match self {
            Self::Invalid => write!(f, "invalid send_frame argument"),
            Self::Busy => write!(f, "a transmit is already in flight"),
            Self::Timeout => write!(f, "transmit did not complete before the deadline"),
        }
    }
}
