//!
//! Segmentation codec for payloads larger than a single frame (§6).
//!
//! Each segment is its own framed packet whose payload is a 7-byte
//! header followed by up to `MAX_PACKET - 7` bytes of chunk data:
//!
//! ```text
//! typ(1)=0x01 | xid(1) | total(2 BE) | offset(2 BE) | clen(1) | chunk(clen)
//! ```
//!

use embassy_sync::blocking_mutex::raw::RawMutex;
use embassy_time::Duration;

use crate::error::{LinkError, Result};
use crate::tx::{FrameTransmitter, TxEngine};

/// Segment header tag identifying a fragmented payload, as opposed to
/// an ordinary single-frame TLV payload.
pub const SEGMENT_TYPE: u8 = 0x01;

const HEADER_LEN: usize = 7;

/// Parsed or to-be-written segmentation header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct SegmentHeader {
    /// Transfer id, shared by every segment of one logical payload.
    pub xid: u8,
    /// Total length of the logical payload, in bytes.
    pub total: u16,
    /// Byte offset of this segment's chunk within the logical
    /// payload.
    pub offset: u16,
    /// Length of this segment's chunk.
    pub clen: u8,
}

impl SegmentHeader {
    /// Serialize the 7-byte header into `dst[..7]`.
    pub fn write(&self, dst: &mut [u8; HEADER_LEN]) {
        dst[0] = SEGMENT_TYPE;
        dst[1] = self.xid;
        dst[2..4].copy_from_slice(&self.total.to_be_bytes());
        dst[4..6].copy_from_slice(&self.offset.to_be_bytes());
        dst[6] = self.clen;
    }

    /// Parse a 7-byte header from `payload`'s leading bytes.
    ///
    /// Returns `None` if `payload` is shorter than the header or does
    /// not carry [`SEGMENT_TYPE`].
    pub fn read(payload: &[u8]) -> Option<Self> {
        if payload.len() < HEADER_LEN || payload[0] != SEGMENT_TYPE {
            return None;
        }
        Some(Self {
            xid: payload[1],
            total: u16::from_be_bytes([payload[2], payload[3]]),
            offset: u16::from_be_bytes([payload[4], payload[5]]),
            clen: payload[6],
        })
    }
}

/// Split `payload` into consecutive segments of at most
/// `MAX_PACKET - 7` chunk bytes each, and send every segment in
/// order through `engine`, using `xid` to tag them as one transfer.
///
/// Stops at the first segment that fails to send and returns that
/// error; segments already sent are not retracted (§6 leaves
/// reassembly and retry policy to the receiving application).
pub async fn send_segmented<M: RawMutex, T: FrameTransmitter, const MAX_PACKET: usize>(
    engine: &TxEngine<M, T>,
    payload: &[u8],
    xid: u8,
    sync_byte: u8,
    deadline: Duration,
) -> Result<()> {
    if MAX_PACKET <= HEADER_LEN {
        return Err(LinkError::Invalid);
    }
    let chunk_cap = MAX_PACKET - HEADER_LEN;
    let total = u16::try_from(payload.len()).map_err(|_| LinkError::Invalid)?;

    if payload.is_empty() {
        return Err(LinkError::Invalid);
    }

    let mut offset: usize = 0;
    while offset < payload.len() {
        let clen = chunk_cap.min(payload.len() - offset);
        let header = SegmentHeader {
            xid,
            total,
            offset: offset as u16,
            clen: clen as u8,
        };

        let mut hdr_bytes = [0u8; HEADER_LEN];
        header.write(&mut hdr_bytes);

        // MAX_PACKET bounds the segment payload; the wire frame adds
        // sync, length, and a 2-byte CRC around it.
        let mut segment_payload = [0u8; 255];
        segment_payload[..HEADER_LEN].copy_from_slice(&hdr_bytes);
        segment_payload[HEADER_LEN..HEADER_LEN + clen]
            .copy_from_slice(&payload[offset..offset + clen]);

        let mut wire = [0u8; MAX_PACKET + 4];
        let n = link_frame::build_frame::<MAX_PACKET>(
            &mut wire,
            &segment_payload[..HEADER_LEN + clen],
            sync_byte,
        )
        .map_err(|_| LinkError::Invalid)?;

        engine.send_frame(&wire[..n], deadline).await?;

        offset += clen;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn header_round_trips() {
        let header = SegmentHeader {
            xid: 7,
            total: 150,
            offset: 57,
            clen: 57,
        };
        let mut buf = [0u8; HEADER_LEN];
        header.write(&mut buf);
        assert_eq!(SegmentHeader::read(&buf), Some(header));
    }

    #[test]
    fn read_rejects_wrong_type_or_short_buffer() {
        assert_eq!(SegmentHeader::read(&[0u8; HEADER_LEN]), None);
        assert_eq!(SegmentHeader::read(&[SEGMENT_TYPE; HEADER_LEN - 1]), None);
    }

    /// S5: a 150-byte payload through a `MAX_PACKET = 64` link splits
    /// into 3 segments of chunk lengths 57/57/36 at offsets 0/57/114,
    /// all sharing one `xid` and `total = 150`.
    #[test]
    fn splits_150_bytes_over_max_packet_64() {
        const MAX_PACKET: usize = 64;
        const CHUNK_CAP: usize = MAX_PACKET - HEADER_LEN;

        let payload = [0xABu8; 150];
        let mut headers: [Option<SegmentHeader>; 4] = [None; 4];
        let mut offset = 0;
        let mut n = 0;
        while offset < payload.len() {
            let clen = CHUNK_CAP.min(payload.len() - offset);
            headers[n] = Some(SegmentHeader {
                xid: 7,
                total: payload.len() as u16,
                offset: offset as u16,
                clen: clen as u8,
            });
            n += 1;
            offset += clen;
        }

        assert_eq!(n, 3);
        assert_eq!(headers[0], Some(SegmentHeader { xid: 7, total: 150, offset: 0, clen: 57 }));
        assert_eq!(headers[1], Some(SegmentHeader { xid: 7, total: 150, offset: 57, clen: 57 }));
        assert_eq!(headers[2], Some(SegmentHeader { xid: 7, total: 150, offset: 114, clen: 36 }));
    }

    #[test]
    fn send_segmented_delivers_three_segments_over_loopback() {
        use crate::tx::{LoopbackTransmitter, TxEngine};
        use embassy_sync::blocking_mutex::raw::NoopRawMutex;
        use embassy_time::Duration;

        let engine: TxEngine<NoopRawMutex, LoopbackTransmitter> =
            TxEngine::new(LoopbackTransmitter);
        let payload = [0xABu8; 150];

        embassy_futures::block_on(async {
            let send = send_segmented::<NoopRawMutex, LoopbackTransmitter, 64>(
                &engine,
                &payload,
                7,
                0xAA,
                Duration::from_millis(50),
            );
            // Each of the 3 segments needs its own completion notify,
            // the way a real ISR fires once per shifted-out frame.
            let notify = async {
                for _ in 0..3 {
                    embassy_time::Timer::after(Duration::from_millis(1)).await;
                    engine.notify_done();
                }
            };
            let (result, _) = embassy_futures::join::join(send, notify).await;
            assert_eq!(result, Ok(()));
        });
    }
}
