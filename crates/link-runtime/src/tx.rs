//!
//! Outbound frame transmission (§5).
//!
//! A transmit is in flight for as long as the hardware needs to shift
//! the frame out. [`TxEngine`] serializes transmits with its own
//! async [`Mutex`] (so at most one frame is ever "in flight") and
//! waits on a completion [`Signal`] that the application's interrupt
//! handler raises through [`TxEngine::notify_done`] or
//! [`TxEngine::notify_aborted`].
//!

use embassy_sync::blocking_mutex::raw::RawMutex;
use embassy_sync::mutex::Mutex;
use embassy_sync::signal::Signal;
use embassy_time::{Duration, with_timeout};
use portable_atomic::{AtomicBool, Ordering};

use crate::error::{LinkError, Result};
use crate::private::*;

/// How a transmit attempt ended, as reported by the application's
/// interrupt handler.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TxOutcome {
    /// Every byte was shifted out.
    Done,
    /// The hardware transmit was aborted (e.g. a line fault) before
    /// completion.
    Aborted,
}

/// Hook into the application's hardware transmit path.
///
/// Implementations must be non-blocking: `start` arms the hardware
/// (e.g. starts a DMA transfer or fills a UART's shift register) and
/// returns immediately; completion is reported later, from interrupt
/// context, via [`TxEngine::notify_done`] or
/// [`TxEngine::notify_aborted`].
pub trait FrameTransmitter {
    /// Begin transmitting `bytes`. Called with the engine's lock
    /// held, so at most one transmit is ever started at a time.
    fn start(&mut self, bytes: &[u8]);

    /// Stop an in-flight transmit, e.g. because the caller's deadline
    /// passed. Implementations that cannot physically abort mid-frame
    /// may treat this as a no-op; [`TxEngine`] will still return
    /// [`LinkError::Timeout`] to the caller and, per §5, wait out a
    /// grace period before accepting a new transmit.
    fn abort(&mut self);
}

/// A transmitter that immediately reports `Done`, useful for tests
/// and for callers without real hardware wired up yet.
#[derive(Debug, Default)]
pub struct LoopbackTransmitter;

impl FrameTransmitter for LoopbackTransmitter {
    fn start(&mut self, _bytes: &[u8]) {}
    fn abort(&mut self) {}
}

/// Grace period after an abort before a new transmit may start (§5).
const ABORT_GRACE: Duration = Duration::from_millis(100);

/// Serializes access to a single [`FrameTransmitter`] and turns its
/// interrupt-reported completion into an awaitable result.
pub struct TxEngine<M: RawMutex, T: FrameTransmitter> {
    transmitter: Mutex<M, T>,
    done: Signal<M, TxOutcome>,
    armed: AtomicBool,
}

impl<M: RawMutex, T: FrameTransmitter> TxEngine<M, T> {
    /// Wrap `transmitter`, initially idle.
    pub const fn new(transmitter: T) -> Self {
        Self {
            transmitter: Mutex::new(transmitter),
            done: Signal::new(),
            armed: AtomicBool::new(false),
        }
    }

    /// Send the already wire-encoded bytes in `wire` (sync, length,
    /// payload, and CRC — the output of [`link_frame::build_frame`]),
    /// returning once the hardware reports completion or `deadline`
    /// elapses.
    ///
    /// Returns [`LinkError::Busy`] immediately, without blocking, if
    /// another transmit is already in flight (§5's non-blocking
    /// variant / S6's serialization test).
    pub async fn send_frame(&self, wire: &[u8], deadline: Duration) -> Result<()> {
        let mut guard = match self.transmitter.try_lock() {
            Ok(guard) => guard,
            Err(_) => return Err(LinkError::Busy),
        };

        self.done.reset();
        self.armed.store(true, Ordering::Release);
        guard.start(wire);

        let outcome = with_timeout(deadline, self.done.wait()).await;

        match outcome {
            // Any pre-deadline signal, `Done` or `Aborted`, means the
            // hardware finished with the frame; both arms of the
            // original C's `on_tx_done`/`on_tx_aborted` just
            // `k_sem_give` the same semaphore and a successful take
            // falls through to `return 0`.
            Ok(_) => {
                self.armed.store(false, Ordering::Release);
                Ok(())
            }
            Err(_) => {
                guard.abort();
                // Race the abort against the completion signal rather
                // than blindly sleeping out the grace period, so a
                // signal that lands during the window is still
                // observed instead of being silently dropped by the
                // `armed` guard in `notify_done`/`notify_aborted`.
                let _ = with_timeout(ABORT_GRACE, self.done.wait()).await;
                self.armed.store(false, Ordering::Release);
                Err(LinkError::Timeout)
            }
        }
    }

    /// Interrupt-context hook: the in-flight transmit finished
    /// cleanly. Ignored if no transmit is armed (a late or spurious
    /// completion).
    pub fn notify_done(&self) {
        if self.armed.load(Ordering::Acquire) {
            self.done.signal(TxOutcome::Done);
        }
    }

    /// Interrupt-context hook: the in-flight transmit was aborted by
    /// the hardware itself. Ignored if no transmit is armed.
    pub fn notify_aborted(&self) {
        if self.armed.load(Ordering::Acquire) {
            self.done.signal(TxOutcome::Aborted);
        }
    }
}
