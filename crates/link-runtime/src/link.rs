//!
//! The top-level link: wires the RX ring, frame parser, delivery
//! queue, and TX engine together behind one handle (§4, §5).
//!

use core::cell::RefCell;

use embassy_sync::blocking_mutex::Mutex as BlockingMutex;
use embassy_sync::blocking_mutex::raw::RawMutex;
use embassy_sync::channel::Channel;
use embassy_sync::signal::Signal;
use embassy_time::Duration;
use link_frame::{Frame, Parser};
use portable_atomic::{AtomicU32, Ordering};

use crate::config::LinkConfig;
use crate::error::{LinkError, Result};
use crate::ring::RxRing;
use crate::segment::send_segmented;
use crate::tx::{FrameTransmitter, TxEngine};

/// Bytes drained from the ring and fed to the parser per worker pass.
const DRAIN_CHUNK: usize = 32;

/// A frame delivered to the application, called back on
/// [`Link::run_delivery_worker`]'s task.
pub type RxCallback<const MAX_PACKET: usize> = fn(&Frame<MAX_PACKET>);

/// Everything needed to move bytes in both directions over one UART
/// (§1, §2 architecture overview): an evicting RX ring fed from
/// interrupt context, a byte-driven frame parser run by a deferred
/// drain worker, a bounded delivery queue handed to application code
/// through a registered callback, and a serialized TX engine.
///
/// `MAX_PACKET` bounds both RX and TX frame payloads, `RING_CAP` sizes
/// the RX staging ring, and `QDEPTH` sizes the delivery queue.
pub struct Link<M, T, const MAX_PACKET: usize, const RING_CAP: usize, const QDEPTH: usize>
where
    M: RawMutex,
    T: FrameTransmitter,
{
    ring: RxRing<M, RING_CAP>,
    /// Explicit ISR/re-enable → drain-worker handoff (§4.3, §9): a
    /// single-slot, latest-wins wakeup, never a per-byte one.
    /// Concurrent kicks before the worker observes one coalesce into
    /// at most a single pending run.
    drain_kick: Signal<M, ()>,
    parser: BlockingMutex<M, RefCell<Parser<MAX_PACKET>>>,
    queue: Channel<M, Frame<MAX_PACKET>, QDEPTH>,
    tx: TxEngine<M, T>,
    callback: BlockingMutex<M, RefCell<Option<RxCallback<MAX_PACKET>>>>,
    config: LinkConfig,
    queue_drop: AtomicU32,
}

impl<M, T, const MAX_PACKET: usize, const RING_CAP: usize, const QDEPTH: usize>
    Link<M, T, MAX_PACKET, RING_CAP, QDEPTH>
where
    M: RawMutex,
    T: FrameTransmitter,
{
    /// Build a link around `transmitter`, idle until bytes arrive or
    /// a send is requested.
    pub fn new(transmitter: T, config: LinkConfig) -> Self {
        Self {
            ring: RxRing::new(),
            drain_kick: Signal::new(),
            parser: BlockingMutex::new(RefCell::new(Parser::new(config.parser))),
            queue: Channel::new(),
            tx: TxEngine::new(transmitter),
            callback: BlockingMutex::new(RefCell::new(None)),
            config,
            queue_drop: AtomicU32::new(0),
        }
    }

    /// Interrupt-context entry point: stage newly received bytes in
    /// the RX ring. Never blocks.
    pub fn on_rx_bytes(&self, bytes: &[u8]) {
        self.ring.push(bytes);
        self.drain_kick.signal(());
    }

    /// Interrupt-context hook for TX completion; see
    /// [`TxEngine::notify_done`].
    pub fn notify_tx_done(&self) {
        self.tx.notify_done();
    }

    /// Interrupt-context hook for a TX abort; see
    /// [`TxEngine::notify_aborted`].
    pub fn notify_tx_aborted(&self) {
        self.tx.notify_aborted();
    }

    /// Register, or clear with `None`, the callback invoked for each
    /// frame [`Link::run_delivery_worker`] pulls off the delivery
    /// queue. Replaces any previously registered callback; a frame
    /// delivered while no callback is registered is silently
    /// discarded.
    pub fn register_rx_cb(&self, cb: Option<RxCallback<MAX_PACKET>>) {
        self.callback.lock(|cell| *cell.borrow_mut() = cb);
    }

    /// Drain the RX ring into the parser, forever. Intended to run as
    /// its own deferred (non-interrupt) task.
    ///
    /// Runs to quiescence (drains the ring until empty) and then waits
    /// on the explicit kick signal [`Link::on_rx_bytes`] and
    /// [`Link::reenable`] raise, rather than polling on a timer (§4.3,
    /// §9: "an explicit 'kick' signal ... avoid per-byte signaling").
    ///
    /// Complete frames are handed to the delivery queue with a
    /// non-blocking `try_send`; per §4.3, a full queue drops the new
    /// frame (never evicting one already queued) and the drop is
    /// counted in [`Link::delivery_drops`].
    pub async fn run_drain_worker(&self) -> ! {
        let mut scratch = [0u8; DRAIN_CHUNK];
        loop {
            let n = self.ring.pop_into(&mut scratch);
            if n == 0 {
                self.drain_kick.wait().await;
                continue;
            }
            for &byte in &scratch[..n] {
                let frame = self
                    .parser
                    .lock(|cell| cell.borrow_mut().step(byte));
                if let Some(frame) = frame {
                    if self.queue.try_send(frame).is_err() {
                        self.queue_drop.fetch_add(1, Ordering::Relaxed);
                    }
                }
            }
        }
    }

    /// Pull frames off the delivery queue and invoke the registered
    /// callback for each, forever. Intended to run as its own task,
    /// independent from [`Link::run_drain_worker`] (§4.3's split
    /// between staging and delivery).
    pub async fn run_delivery_worker(&self) -> ! {
        loop {
            let frame = self.queue.receive().await;
            self.callback.lock(|cell| {
                if let Some(cb) = *cell.borrow() {
                    cb(&frame);
                }
            });
        }
    }

    /// Send one payload as a single frame, waiting up to `deadline`
    /// for the hardware to report completion.
    ///
    /// Returns [`LinkError::Invalid`] for an empty or oversized
    /// payload, and [`LinkError::Busy`] immediately if a transmit is
    /// already in flight.
    pub async fn send_frame(&self, payload: &[u8], deadline: Duration) -> Result<()> {
        if payload.is_empty() || payload.len() > MAX_PACKET {
            return Err(LinkError::Invalid);
        }
        let mut wire = [0u8; MAX_PACKET + 4];
        let n = link_frame::build_frame::<MAX_PACKET>(&mut wire, payload, self.config.parser.sync_byte)
            .map_err(|_| LinkError::Invalid)?;
        self.tx.send_frame(&wire[..n], deadline).await
    }

    /// Send a payload larger than one frame can carry, split into
    /// consecutive segments sharing transfer id `xid` (§6).
    pub async fn send_segmented(&self, payload: &[u8], xid: u8, deadline: Duration) -> Result<()> {
        send_segmented::<M, T, MAX_PACKET>(
            &self.tx,
            payload,
            xid,
            self.config.parser.sync_byte,
            deadline,
        )
        .await
    }

    /// Reset the link to its just-constructed state: discard any
    /// buffered RX bytes and mid-frame parser progress (§5's
    /// re-enable path). Does not affect an in-flight transmit.
    ///
    /// Re-kicks the drain worker per §4.3: residual bytes from a
    /// retired DMA buffer may still be queued behind this reset.
    pub fn reenable(&self) {
        self.ring.clear();
        self.parser.lock(|cell| cell.borrow_mut().reset());
        self.drain_kick.signal(());
    }

    /// Bytes evicted from the RX ring by overflow since construction.
    pub fn ring_drop_bytes(&self) -> u32 {
        self.ring.drop_bytes()
    }

    /// Frames dropped because the delivery queue was full.
    pub fn delivery_drops(&self) -> u32 {
        self.queue_drop.load(Ordering::Relaxed)
    }

    /// Parser-level counters: `(ok, len_err, crc_err, budget_err)`.
    /// See [`link_frame::Parser`] for definitions.
    pub fn parser_counters(&self) -> (u32, u32, u32, u32) {
        self.parser.lock(|cell| {
            let parser = cell.borrow();
            (parser.ok, parser.len_err, parser.crc_err, parser.budget_err)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tx::LoopbackTransmitter;
    use embassy_sync::blocking_mutex::raw::NoopRawMutex;
    use portable_atomic::AtomicU32 as TestAtomicU32;

    type TestLink = Link<NoopRawMutex, LoopbackTransmitter, 64, 128, 4>;

    static DELIVERED: TestAtomicU32 = TestAtomicU32::new(0);

    fn count_delivery(_frame: &Frame<64>) {
        DELIVERED.fetch_add(1, Ordering::Relaxed);
    }

    #[test]
    fn end_to_end_byte_stream_delivers_frame() {
        DELIVERED.store(0, Ordering::Relaxed);
        let link = TestLink::new(LoopbackTransmitter, LinkConfig::default());
        link.register_rx_cb(Some(count_delivery));

        let mut wire = [0u8; 68];
        let n = link_frame::build_frame::<64>(&mut wire, b"hello", 0xAA).unwrap();
        link.on_rx_bytes(&wire[..n]);

        embassy_futures::block_on(async {
            let drain = link.run_drain_worker();
            let deliver = link.run_delivery_worker();
            let both = embassy_futures::select::select(drain, deliver);
            let _ = embassy_time::with_timeout(Duration::from_millis(20), both).await;
        });

        assert_eq!(DELIVERED.load(Ordering::Relaxed), 1);
        let (ok, len_err, crc_err, budget_err) = link.parser_counters();
        assert_eq!((ok, len_err, crc_err, budget_err), (1, 0, 0, 0));
    }

    #[test]
    fn reenable_clears_buffered_and_midframe_state() {
        let link = TestLink::new(LoopbackTransmitter, LinkConfig::default());
        // Feed a sync byte and a length byte, but not the rest — the
        // parser is left mid-frame.
        link.on_rx_bytes(&[0xAA, 0x05]);
        link.reenable();
        assert_eq!(link.ring_drop_bytes(), 0);

        let mut wire = [0u8; 68];
        let n = link_frame::build_frame::<64>(&mut wire, b"ok", 0xAA).unwrap();
        link.on_rx_bytes(&wire[..n]);

        embassy_futures::block_on(async {
            let mut scratch = [0u8; 8];
            let mut got = None;
            for _ in 0..n {
                let read = link.ring.pop_into(&mut scratch[..1]);
                if read == 0 {
                    break;
                }
                if let Some(frame) = link
                    .parser
                    .lock(|cell| cell.borrow_mut().step(scratch[0]))
                {
                    got = Some(frame);
                }
            }
            assert_eq!(got.unwrap().payload(), b"ok");
        });
    }
}
