//! Error types for the TLV codec.

use crate::private::*;

/// A specialized `Result` type with [`Error`].
pub type Result<T> = StdResult<T, Error>;

/// Errors from [`crate::encode`] / [`crate::decode`], one-to-one with
/// the `errno` values the original C contract returned
/// (`EINVAL`, `EMSGSIZE`, `EFAULT`, `ENODATA`, `EBADMSG`, `EOVERFLOW`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Error {
    /// A required argument was invalid (e.g. a null/absent input).
    Invalid,
    /// The value would not fit the declared or available capacity.
    MsgSize,
    /// Output slot unavailable.
    Fault,
    /// Input frame unavailable.
    NoData,
    /// Frame too short to contain a TLV header.
    Badmsg,
    /// Frame too short to contain the declared value length.
    Overflow,
}

impl StdError for Error {}

impl Display for Error {
    fn fmt(&self, f: &mut Formatter) -> FmtResult {
        match self {
            Self::Invalid => write!(f, "invalid argument"),
            Self::MsgSize => write!(f, "value exceeds the maximum TLV value size"),
            Self::Fault => write!(f, "output record unavailable"),
            Self::NoData => write!(f, "input frame unavailable"),
            Self::Badmsg => write!(f, "frame too short for a TLV header"),
            Self::Overflow => write!(f, "frame too short for the declared value length"),
        }
    }
}
