//! Async runtime gluing a byte-level frame parser to a single UART
//! link: an evicting RX ring, a deferred drain worker, a bounded
//! delivery queue, a serialized TX engine, and segmentation for
//! payloads larger than one frame.
//!
//! # Architecture Overview
//!
//! - **`RxRing`**
//!   Fixed-capacity byte ring between an interrupt-context producer
//!   and a worker-context consumer. Evicts oldest bytes on overflow
//!   rather than blocking the producer.
//!
//! - **`Link`**
//!   Owns the ring, a [`link_frame::Parser`], a delivery [`Channel`]
//!   (pulled by [`Link::run_delivery_worker`] into an application
//!   callback), and a [`TxEngine`]. This is the crate's one handle.
//!
//! - **`TxEngine` / `FrameTransmitter`**
//!   Serializes access to the application's hardware transmit path
//!   and turns its interrupt-reported completion into an awaitable
//!   result, with an abort grace period on timeout.
//!
//! - **`send_segmented`**
//!   Splits a payload wider than one frame into consecutive framed
//!   segments sharing a transfer id.
//!
//! # Typical Usage
//!
//! 1. Implement [`FrameTransmitter`] over the application's UART.
//! 2. Build a [`Link`] with [`Link::new`], sized by its const
//!    generics (`MAX_PACKET`, ring capacity, delivery queue depth).
//! 3. Feed raw bytes from the RX interrupt handler to
//!    [`Link::on_rx_bytes`], and TX completions to
//!    [`Link::notify_tx_done`] / [`Link::notify_tx_aborted`].
//! 4. Register a callback with [`Link::register_rx_cb`] and spawn
//!    [`Link::run_drain_worker`] and [`Link::run_delivery_worker`] as
//!    tasks.
//! 5. Call [`Link::send_frame`] or [`Link::send_segmented`] to
//!    transmit.
#![cfg_attr(not(test), no_std)]

pub use embassy_sync::channel::Channel;

pub use config::LinkConfig;
pub use error::{LinkError, Result};
pub use link::{Link, RxCallback};
pub use ring::RxRing;
pub use segment::{SegmentHeader, send_segmented, SEGMENT_TYPE};
pub use tx::{FrameTransmitter, LoopbackTransmitter, TxEngine, TxOutcome};

mod config;
mod error;
mod link;
mod ring;
mod segment;
mod tx;

mod private {
    pub use super::*;

    #[allow(unused_imports)]
    #[cfg(feature = "defmt")]
    pub use ::defmt::{debug, error, info, trace, warn};

    pub use core::error::Error as StdError;
    pub use core::fmt::{Display, Formatter, Result as FmtResult};
    pub use core::result::Result as StdResult;
}
