//! A tagged Type-Length-Value codec over a [`link_frame::Frame`] payload.
//!
//! This crate is the thin collaborator §4.7 of the link protocol
//! describes: it maps between a decoded frame payload and a tagged
//! [`TlvRecord`]. It performs no framing, no CRC, and no I/O of its
//! own — it only reads and writes the `id(1) | len(1) | value(len)`
//! layout inside a frame that [`link_frame`] has already validated.
//!
//! # Typical Usage
//!
//! 1. Build a [`TlvRecord`] with the message you want to send.
//! 2. [`encode`] it into a [`link_frame::Frame`].
//! 3. Hand the frame to the link's `send_frame`.
//! 4. On receive, [`decode`] the delivered frame back into a
//!    [`TlvRecord`].
#![cfg_attr(not(test), no_std)]

pub use error::{Error, Result};
pub use id::TlvId;
pub use record::TlvRecord;

mod error;
mod id;
mod record;

mod private {
    pub use super::*;

    #[allow(unused_imports)]
    #[cfg(feature = "defmt")]
    pub use ::defmt::{debug, error, info, trace, warn};

    pub use core::error::Error as StdError;
    pub use core::fmt::{Display, Formatter, Result as FmtResult};
    pub use core::result::Result as StdResult;
}

use link_frame::Frame;

/// Encode `tlv` into `frame`'s payload.
///
/// Fails with [`Error::MsgSize`] if `tlv.len() > V` (which cannot
/// happen for a well-formed `TlvRecord` but is checked defensively,
/// matching the original C contract's own redundant bounds check).
/// `N` must be at least `tlv.len() + 2`.
pub fn encode<const N: usize, const V: usize>(
    frame: &mut Frame<N>,
    tlv: &TlvRecord<V>,
) -> Result<()> {
    let len = tlv.len();
    if len > V {
        return Err(Error::MsgSize);
    }

    let id = tlv.id().to_u8();
    let value = tlv.value();
    *frame = Frame::build(2 + len, |dst| {
        dst[0] = id;
        dst[1] = len as u8;
        dst[2..2 + len].copy_from_slice(value);
    })
    .ok_or(Error::MsgSize)?;

    Ok(())
}

/// Decode `frame`'s payload into `out`.
///
/// Mirrors the original C error ladder exactly:
/// - [`Error::Badmsg`] when `frame.len() < 2`.
/// - [`Error::MsgSize`] when the declared value length exceeds `V`.
/// - [`Error::Overflow`] when `frame.len()` is shorter than `2 + declared_len`.
pub fn decode<const N: usize, const V: usize>(
    out: &mut TlvRecord<V>,
    frame: &Frame<N>,
) -> Result<()> {
    let payload = frame.payload();
    if payload.len() < 2 {
        return Err(Error::Badmsg);
    }

    let vlen = payload[1] as usize;
    if vlen > V {
        return Err(Error::MsgSize);
    }
    if payload.len() < 2 + vlen {
        return Err(Error::Overflow);
    }

    out.set_id(TlvId::from_u8(payload[0]));
    out.set_value(&payload[2..2 + vlen]);

    Ok(())
}
