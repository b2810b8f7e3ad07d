//! Fixed 8-byte reading record.
//!
//! ```text
//!  byte 0   0xAA
//!  byte 1   s10 s9 s8 s7 s6 s5 s4 s3          sequence mod 2048
//!  byte 2   s2  s1 s0 r9 r8 r7 r6 r5          raw mod 1024
//!  byte 3   r4  r3 r2 r1 r0 c2 c1 c0          source id
//!  byte 4-7 timestamp, big-endian microseconds
//! ```

/// Leading byte of every data blob.
pub const BLOB_FLAG: u8 = 0xAA;
/// Encoded size in bytes.
pub const BLOB_LEN: usize = 8;

const SEQUENCE_MODULUS: u32 = 2048;
const RAW_MODULUS: u16 = 1024;

/// Fields recovered from a blob. Sequence and raw are already reduced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecodedBlob {
    pub sequence: u16,
    pub raw: u16,
    pub source: u8,
    pub timestamp_us: u32,
}

pub fn encode(sequence: u32, raw: u16, source: u8, timestamp_us: u32) -> [u8; BLOB_LEN] {
    let seq = sequence % SEQUENCE_MODULUS;
    let raw = raw % RAW_MODULUS;
    let src = source & 0x07;
    let ts = timestamp_us.to_be_bytes();

    [
        BLOB_FLAG,
        ((seq >> 3) & 0xFF) as u8,
        (((seq & 0x07) << 5) as u8) | ((raw >> 5) & 0x1F) as u8,
        (((raw & 0x1F) << 3) as u8) | src,
        ts[0],
        ts[1],
        ts[2],
        ts[3],
    ]
}

/// Inverse of [`encode`]; `None` if the flag byte is wrong.
pub fn decode(bytes: &[u8; BLOB_LEN]) -> Option<DecodedBlob> {
    if bytes[0] != BLOB_FLAG {
        return None;
    }
    let sequence = (u16::from(bytes[1]) << 3) | u16::from(bytes[2] >> 5);
    let raw = (u16::from(bytes[2] & 0x1F) << 5) | u16::from(bytes[3] >> 3);
    Some(DecodedBlob {
        sequence,
        raw,
        source: bytes[3] & 0x07,
        timestamp_us: u32::from_be_bytes([bytes[4], bytes[5], bytes[6], bytes[7]]),
    })
}
