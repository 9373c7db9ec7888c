//! A byte-level framing protocol library for a single UART link.
//!
//! This crate recovers message boundaries from a lossy, restart-prone
//! byte stream using a single-byte sync marker, a length byte, and a
//! CCITT-FALSE CRC16 trailer. It is allocation-free and performs no
//! I/O; it only turns bytes into [`Frame`]s and back.
//!
//! # Architecture Overview
//!
//! - **`crc16_ccitt`**
//!   CRC16-CCITT (poly `0x1021`, init `0xFFFF`, no reflection, no
//!   final xor), the integrity check folded into every frame.
//!
//! - **`Frame`**
//!   A fixed-capacity, value-typed view of a single decoded payload.
//!
//! - **`Parser`**
//!   The byte-driven state machine that recovers [`Frame`]s from a raw
//!   stream, resynchronizing on garbage rather than ever emitting a
//!   partial or corrupt frame.
//!
//! - **`build_frame`**
//!   The inverse operation: serializes a payload into the on-wire
//!   `SYNC | LEN | DATA | CRC_HI | CRC_LO` layout.
//!
//! # Typical Usage
//!
//! 1. Construct a [`Parser`] with a [`ParserConfig`].
//! 2. Feed it bytes one at a time via [`Parser::step`] as they arrive.
//! 3. Each `Some(frame)` returned is a validated, complete [`Frame`].
//! 4. Use [`build_frame`] to serialize outgoing payloads.
//!
//! ---
//!
//! # Frame Layout
//!
//! ```text
//! +--------+--------+---------+--------+--------+
//! |  SYNC  |  LEN   |  DATA   | CRC_HI | CRC_LO  |
//! +--------+--------+---------+--------+--------+
//! | 1 byte | 1 byte | N bytes | 1 byte | 1 byte  |
//! +--------+--------+---------+--------+--------+
//! ```
//!
//! CRC is computed over `LEN || DATA`, seeded with `0xFFFF`, and
//! carried big-endian.
#![cfg_attr(not(test), no_std)]

pub use crc16_ccitt::{crc_over, crc_step};
pub use error::{Error, Result};
pub use frame::Frame;
pub use parser::{Parser, ParserConfig};
pub use wire::build_frame;

mod crc16_ccitt;
mod error;
mod frame;
mod parser;
mod wire;

mod private {
    pub use super::*;

    #[allow(unused_imports)]
    #[cfg(feature = "defmt")]
    pub use ::defmt::{debug, error, info, trace, warn};

    pub use core::error::Error as StdError;
    pub use core::fmt::{Display, Formatter, Result as FmtResult};
    pub use core::result::Result as StdResult;
}
