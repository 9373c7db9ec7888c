//!
//! Serializes a payload into the on-wire frame layout.
//!

use crate::private::*;

/// Serialize `payload` as `SYNC | LEN | DATA | CRC_HI | CRC_LO` into
/// `dst`, returning the total number of bytes written.
///
/// `N` is `MAX_PACKET`. Fails with [`Error::PayloadTooLarge`] if
/// `payload` is empty or longer than `N`, or [`Error::BufferTooSmall`]
/// if `dst` cannot hold the whole frame (`payload.len() + 4` bytes).
pub fn build_frame<const N: usize>(dst: &mut [u8], payload: &[u8], sync: u8) -> Result<usize> {
    if payload.is_empty() || payload.len() > N {
        return Err(Error::PayloadTooLarge { max: N });
    }

    let total = payload.len() + 4;
    if dst.len() < total {
        return Err(Error::BufferTooSmall { need: total });
    }

    dst[0] = sync;
    dst[1] = payload.len() as u8;
    dst[2..2 + payload.len()].copy_from_slice(payload);

    let crc = crc_over(&dst[1..2 + payload.len()]);
    dst[2 + payload.len()] = (crc >> 8) as u8;
    dst[3 + payload.len()] = (crc & 0xFF) as u8;

    Ok(total)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn matches_s1_vector() {
        let mut buf = [0u8; 16];
        let n = build_frame::<64>(&mut buf, &[1, 2, 3], 0xAA).unwrap();
        assert_eq!(&buf[..n], &[0xAA, 0x03, 0x01, 0x02, 0x03, 0x89, 0xC3]);
    }

    #[test]
    fn rejects_empty_payload() {
        let mut buf = [0u8; 16];
        assert_eq!(
            build_frame::<64>(&mut buf, &[], 0xAA),
            Err(Error::PayloadTooLarge { max: 64 })
        );
    }

    #[test]
    fn rejects_oversized_payload() {
        let mut buf = [0u8; 16];
        let payload = [0u8; 65];
        assert_eq!(
            build_frame::<64>(&mut buf, &payload, 0xAA),
            Err(Error::PayloadTooLarge { max: 64 })
        );
    }

    #[test]
    fn rejects_undersized_buffer() {
        let mut buf = [0u8; 4];
        assert_eq!(
            build_frame::<64>(&mut buf, &[1, 2, 3], 0xAA),
            Err(Error::BufferTooSmall { need: 7 })
        );
    }
}
