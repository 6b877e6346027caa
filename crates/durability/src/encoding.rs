//! WAL frame encoding
//!
//! ```text
//! +----------------+----------------+---------------------+
//! | len: u32 (LE)  | crc32: u32 (LE)| payload (bincode)   |
//! +----------------+----------------+---------------------+
//! ```
//!
//! The CRC covers the payload only. A frame cut short by a crash decodes
//! as `Ok(None)`; recovery treats that as a torn tail.

use byteorder::{ByteOrder, LittleEndian};

use crate::error::{DurabilityError, Result};
use crate::record::WalRecord;

/// Size of the frame header in bytes
pub const FRAME_HEADER_LEN: usize = 8;

/// Largest payload a frame may declare
pub const MAX_RECORD_LEN: usize = 16 * 1024 * 1024;

/// Encode a record as a complete frame
pub fn encode_record(record: &WalRecord) -> Result<Vec<u8>> {
    let payload = bincode::serialize(record).map_err(|e| DurabilityError::Encode(e.to_string()))?;
    if payload.len() > MAX_RECORD_LEN {
        return Err(DurabilityError::Encode(format!(
            "record is {} bytes, limit is {}",
            payload.len(),
            MAX_RECORD_LEN
        )));
    }

    let mut frame = vec![0u8; FRAME_HEADER_LEN + payload.len()];
    LittleEndian::write_u32(&mut frame[0..4], payload.len() as u32);
    LittleEndian::write_u32(&mut frame[4..8], crc32fast::hash(&payload));
    frame[FRAME_HEADER_LEN..].copy_from_slice(&payload);
    Ok(frame)
}

/// Decode the frame at the start of `buf`
///
/// `offset` is the frame's position in the file, used for error reporting.
///
/// # Returns
///
/// - `Ok(Some((record, frame_len)))` for a complete, valid frame
/// - `Ok(None)` if `buf` ends before the frame does
/// - `Err(..)` for a checksum mismatch or undecodable payload
pub fn decode_record(buf: &[u8], offset: u64) -> Result<Option<(WalRecord, usize)>> {
    if buf.len() < FRAME_HEADER_LEN {
        return Ok(None);
    }

    let len = LittleEndian::read_u32(&buf[0..4]) as usize;
    let expected = LittleEndian::read_u32(&buf[4..8]);
    if len > MAX_RECORD_LEN {
        return Err(DurabilityError::RecordTooLarge {
            offset,
            len,
            max: MAX_RECORD_LEN,
        });
    }

    let end = FRAME_HEADER_LEN + len;
    if buf.len() < end {
        return Ok(None);
    }

    let payload = &buf[FRAME_HEADER_LEN..end];
    let actual = crc32fast::hash(payload);
    if actual != expected {
        return Err(DurabilityError::ChecksumMismatch {
            offset,
            expected,
            actual,
        });
    }

    let record = bincode::deserialize(payload).map_err(|e| DurabilityError::Decode {
        offset,
        message: e.to_string(),
    })?;
    Ok(Some((record, end)))
}
