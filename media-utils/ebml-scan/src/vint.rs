// Copyright 2022-2023 Andrew D. Straw.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license <LICENSE-MIT
// or http://opensource.org/licenses/MIT>, at your option. This file may not be
// copied, modified, or distributed except according to those terms.

//! EBML variable-length integers.
//!
//! The number of leading zero bits in the first byte, plus one, gives the
//! total byte count of the integer. Element identifiers keep this length
//! marker as part of their value, sizes and other values mask it off.

use crate::error::{Error, Result};
use crate::source::ByteSource;

/// Numeric EBML element identifier, length marker included.
pub type Id = u32;

/// Longest permitted element identifier, in bytes.
pub const MAX_ID_LENGTH: usize = 4;

/// Longest permitted size or value VINT, in bytes.
pub const MAX_SIZE_LENGTH: usize = 8;

/// A decoded size-flavored VINT.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Vint {
    /// Number of bytes the encoding occupied.
    pub length: usize,
    /// Value with the length marker removed.
    pub value: u64,
}

impl Vint {
    /// All data bits set: the reserved "unknown size" value.
    pub fn is_unknown(&self) -> bool {
        self.value == data_mask(self.length)
    }
}

/// Number of bytes in a VINT whose first byte is `first_byte`.
///
/// Fails when the byte is zero (the count would exceed 8) or when the count
/// exceeds `max_length`.
pub fn decode_length(first_byte: u8, max_length: usize) -> Result<usize> {
    debug_assert!((1..=MAX_SIZE_LENGTH).contains(&max_length));
    if first_byte == 0 {
        tracing::debug!("VINT with greater than 8 bytes not allowed");
        return Err(Error::MalformedVint {
            first_byte,
            max_length,
        });
    }
    let length = first_byte.leading_zeros() as usize + 1;
    if length > max_length {
        tracing::debug!("VINT length {length} exceeds {max_length} bytes");
        return Err(Error::MalformedVint {
            first_byte,
            max_length,
        });
    }
    Ok(length)
}

/// Decode a size VINT from the start of `bytes`.
///
/// Only the prefix announced by the first byte is consumed; any trailing
/// bytes are ignored.
pub fn decode_value(bytes: &[u8]) -> Result<Vint> {
    let Some(&first_byte) = bytes.first() else {
        return Err(Error::Truncated {
            needed: 1,
            available: 0,
        });
    };
    let length = decode_length(first_byte, MAX_SIZE_LENGTH)?;
    if bytes.len() < length {
        return Err(Error::Truncated {
            needed: length,
            available: bytes.len(),
        });
    }
    let value = be_uint(&bytes[..length]) & data_mask(length);
    Ok(Vint { length, value })
}

/// Read a size VINT from `src`, pulling exactly as many bytes as it occupies.
pub fn read_vint<S: ByteSource + ?Sized>(src: &mut S) -> Result<Vint> {
    let buf = read_vint_bytes(src, MAX_SIZE_LENGTH)?;
    let length = buf.len();
    Ok(Vint {
        length,
        value: be_uint(&buf) & data_mask(length),
    })
}

/// Read an element identifier from `src`.
///
/// The marker bits stay in the returned value, so the two bytes `4D BB`
/// yield `0x4DBB`.
pub fn read_id<S: ByteSource + ?Sized>(src: &mut S) -> Result<Id> {
    let buf = read_vint_bytes(src, MAX_ID_LENGTH)?;
    // at most four bytes, so this cannot truncate
    Ok(be_uint(&buf) as Id)
}

fn read_vint_bytes<S: ByteSource + ?Sized>(src: &mut S, max_length: usize) -> Result<Vec<u8>> {
    let mut buf = src.read_block(1)?;
    let Some(&first_byte) = buf.first() else {
        tracing::debug!("Failed to read VINT size");
        return Err(Error::Truncated {
            needed: 1,
            available: 0,
        });
    };
    let length = decode_length(first_byte, max_length)?;
    if length > 1 {
        buf.extend(src.read_block(length - 1)?);
    }
    if buf.len() != length {
        tracing::debug!("Failed to read VINT data");
        return Err(Error::Truncated {
            needed: length,
            available: buf.len(),
        });
    }
    Ok(buf)
}

#[inline]
fn data_mask(length: usize) -> u64 {
    u64::MAX >> (64 - 7 * length)
}

#[inline]
fn be_uint(bytes: &[u8]) -> u64 {
    bytes.iter().fold(0, |acc, &b| (acc << 8) | u64::from(b))
}
