//! Length-prefix codec for variable-length objects.
//!
//! An object stored in a tuple slot or a [`Varlen`](crate::varlen::Varlen)
//! payload is preceded by a 1-byte or 4-byte length. The single byte form
//! carries lengths up to 63; longer objects set the continuation bit and
//! carry a 30-bit big-endian length across four bytes. Bit 6 of the first
//! byte marks a NULL object.

use crate::error::ValueError;

/// Bit 6 of the first prefix byte: the object is NULL.
pub const OBJECT_NULL_BIT: u8 = 1 << 6;

/// Bit 7 of the first prefix byte: three more length bytes follow.
pub const OBJECT_CONTINUATION_BIT: u8 = 1 << 7;

/// Largest object length representable by the single-byte prefix.
pub const MAX_SHORT_OBJECT_LENGTH: usize = 63;

/// Largest object length the 30 payload bits of the long prefix can carry.
pub const MAX_OBJECT_LENGTH: usize = (1 << 30) - 1;

/// Size of the short prefix in bytes.
pub const SHORT_PREFIX_LEN: usize = 1;

/// Size of the long prefix in bytes.
pub const LONG_PREFIX_LEN: usize = 4;

/// Mask stripping the NULL and continuation bits from the first byte.
const LENGTH_MASK: u8 = !(OBJECT_NULL_BIT | OBJECT_CONTINUATION_BIT);

/// Returns the prefix size appropriate for an object of `len` bytes.
pub const fn prefix_len(len: usize) -> usize {
    if len <= MAX_SHORT_OBJECT_LENGTH {
        SHORT_PREFIX_LEN
    } else {
        LONG_PREFIX_LEN
    }
}

/// Encodes a length prefix into `out`, returning the number of prefix
/// bytes written. `None` encodes the NULL object as a single byte.
///
/// # Errors
///
/// Returns `BufferTooSmall` if `out` cannot hold the prefix and
/// `NumericOutOfRange` if the length exceeds 30 bits.
pub fn encode_length(len: Option<usize>, out: &mut [u8]) -> Result<usize, ValueError> {
    let Some(len) = len else {
        if out.is_empty() {
            return Err(ValueError::BufferTooSmall {
                required: SHORT_PREFIX_LEN,
                available: 0,
            });
        }
        out[0] = OBJECT_NULL_BIT;
        return Ok(SHORT_PREFIX_LEN);
    };

    if len > MAX_OBJECT_LENGTH {
        return Err(ValueError::arithmetic_out_of_range(format!(
            "object length {} exceeds the 30-bit length prefix",
            len
        )));
    }

    let needed = prefix_len(len);
    if out.len() < needed {
        return Err(ValueError::BufferTooSmall {
            required: needed,
            available: out.len(),
        });
    }

    if needed == SHORT_PREFIX_LEN {
        out[0] = len as u8;
    } else {
        let be = (len as u32).to_be_bytes();
        out[0] = be[0] | OBJECT_CONTINUATION_BIT;
        out[1] = be[1];
        out[2] = be[2];
        out[3] = be[3];
    }
    Ok(needed)
}

/// Decodes a length prefix from `buf`.
///
/// Returns `(length, prefix bytes consumed)`, where `length` is `None` for
/// a NULL object.
///
/// # Errors
///
/// Returns `BufferTooSmall` if `buf` ends inside the prefix.
pub fn decode_length(buf: &[u8]) -> Result<(Option<usize>, usize), ValueError> {
    let Some(&first) = buf.first() else {
        return Err(ValueError::BufferTooSmall {
            required: SHORT_PREFIX_LEN,
            available: 0,
        });
    };

    if first & OBJECT_CONTINUATION_BIT != 0 {
        if buf.len() < LONG_PREFIX_LEN {
            return Err(ValueError::BufferTooSmall {
                required: LONG_PREFIX_LEN,
                available: buf.len(),
            });
        }
        let len = u32::from_be_bytes([first & LENGTH_MASK, buf[1], buf[2], buf[3]]);
        Ok((Some(len as usize), LONG_PREFIX_LEN))
    } else if first & OBJECT_NULL_BIT != 0 {
        Ok((None, SHORT_PREFIX_LEN))
    } else {
        Ok((Some((first & LENGTH_MASK) as usize), SHORT_PREFIX_LEN))
    }
}
