//!
//! RX staging ring buffer (§4.3, §3 Ring buffer).
//!
//! Single producer (interrupt context), single consumer (a deferred
//! drain worker). The producer never blocks: when there is not enough
//! room for incoming bytes, the oldest bytes are evicted to make
//! space, and the evicted count is accounted in `drop_bytes`.
//!

use embassy_sync::blocking_mutex::Mutex;
use embassy_sync::blocking_mutex::raw::RawMutex;
use heapless::Deque;
use portable_atomic::{AtomicU32, Ordering};

use core::cell::RefCell;

/// Fixed-capacity evicting byte ring between an ISR-context producer
/// and a worker-context consumer.
///
/// `CAP` is `4 * CHUNK_LEN` per §3.
pub struct RxRing<M: RawMutex, const CAP: usize> {
    inner: Mutex<M, RefCell<Deque<u8, CAP>>>,
    drop_bytes: AtomicU32,
}

impl<M: RawMutex, const CAP: usize> RxRing<M, CAP> {
    /// An empty ring.
    pub const fn new() -> Self {
        Self {
            inner: Mutex::new(RefCell::new(Deque::new())),
            drop_bytes: AtomicU32::new(0),
        }
    }

    /// Append `bytes`, the ISR-context entry point.
    ///
    /// Evicts the oldest buffered bytes (never the newest) to make
    /// room when `bytes` would not otherwise fit, and accounts every
    /// evicted byte in [`RxRing::drop_bytes`]. Never blocks, never
    /// allocates.
    pub fn push(&self, bytes: &[u8]) {
        self.inner.lock(|cell| {
            let mut buf = cell.borrow_mut();
            let need = bytes.len().min(CAP);
            while buf.len() + need > CAP {
                if buf.pop_front().is_none() {
                    break;
                }
                self.drop_bytes.fetch_add(1, Ordering::Relaxed);
            }
            // If the incoming chunk itself is larger than the ring,
            // only its trailing `CAP` bytes can ever be kept; the
            // leading bytes are evicted before ever entering the
            // ring, which the caller also observes as dropped bytes.
            let start = bytes.len() - need;
            if start > 0 {
                self.drop_bytes
                    .fetch_add(start as u32, Ordering::Relaxed);
            }
            for &b in &bytes[start..] {
                // Capacity was just guaranteed above; this cannot fail.
                let _ = buf.push_back(b);
            }
        });
    }

    /// Pull up to `scratch.len()` bytes into `scratch`, the
    /// worker-context entry point. Returns the number of bytes
    /// written.
    pub fn pop_into(&self, scratch: &mut [u8]) -> usize {
        self.inner.lock(|cell| {
            let mut buf = cell.borrow_mut();
            let mut n = 0;
            while n < scratch.len() {
                match buf.pop_front() {
                    Some(b) => {
                        scratch[n] = b;
                        n += 1;
                    }
                    None => break,
                }
            }
            n
        })
    }

    /// Discard all buffered bytes, e.g. on link re-enable (§5).
    pub fn clear(&self) {
        self.inner.lock(|cell| cell.borrow_mut().clear());
    }

    /// Total bytes evicted by overflow since construction.
    pub fn drop_bytes(&self) -> u32 {
        self.drop_bytes.load(Ordering::Relaxed)
    }
}

impl<M: RawMutex, const CAP: usize> Default for RxRing<M, CAP> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use embassy_sync::blocking_mutex::raw::NoopRawMutex;

    #[test]
    fn push_then_pop_round_trips() {
        let ring: RxRing<NoopRawMutex, 16> = RxRing::new();
        ring.push(b"hello");
        let mut out = [0u8; 16];
        let n = ring.pop_into(&mut out);
        assert_eq!(&out[..n], b"hello");
        assert_eq!(ring.drop_bytes(), 0);
    }

    #[test]
    fn overflow_evicts_oldest_not_newest() {
        let ring: RxRing<NoopRawMutex, 4> = RxRing::new();
        ring.push(b"ABCD");
        ring.push(b"EF"); // no room for 2 more; evict 2 oldest ("AB")
        let mut out = [0u8; 8];
        let n = ring.pop_into(&mut out);
        assert_eq!(&out[..n], b"CDEF");
        assert_eq!(ring.drop_bytes(), 2);
    }

    #[test]
    fn chunk_larger_than_ring_keeps_trailing_bytes() {
        let ring: RxRing<NoopRawMutex, 4> = RxRing::new();
        ring.push(b"123456789"); // 9 bytes into a 4-byte ring
        let mut out = [0u8; 8];
        let n = ring.pop_into(&mut out);
        assert_eq!(&out[..n], b"6789");
        assert_eq!(ring.drop_bytes(), 5);
    }

    #[test]
    fn partial_drain_then_refill() {
        let ring: RxRing<NoopRawMutex, 8> = RxRing::new();
        ring.push(b"abcd");
        let mut out = [0u8; 2];
        let n = ring.pop_into(&mut out);
        assert_eq!(&out[..n], b"ab");
        ring.push(b"ef");
        let mut out2 = [0u8; 8];
        let n2 = ring.pop_into(&mut out2);
        assert_eq!(&out2[..n2], b"cdef");
    }
}
