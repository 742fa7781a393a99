// Copyright 2022-2023 Andrew D. Straw.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license <LICENSE-MIT
// or http://opensource.org/licenses/MIT>, at your option. This file may not be
// copied, modified, or distributed except according to those terms.

//! Readers for the payloads of EBML primitive elements.
//!
//! Each reader consumes exactly `size` bytes, the element's declared payload
//! size.

use chrono::{DateTime, TimeDelta, Utc};

use crate::error::{Error, Result};
use crate::source::ByteSource;

/// 2001-01-01T00:00:00 UTC, the origin of EBML dates.
const EBML_EPOCH_UNIX_SECS: i64 = 978_307_200;

/// Caps on allocations made on behalf of declared sizes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReadLimits {
    /// Largest string or binary payload that will be read into memory.
    pub max_payload_size: u64,
}

impl Default for ReadLimits {
    fn default() -> Self {
        Self {
            max_payload_size: 16 * 1024 * 1024,
        }
    }
}

fn read_exact<S: ByteSource + ?Sized>(src: &mut S, size: usize) -> Result<Vec<u8>> {
    let buf = src.read_block(size)?;
    if buf.len() != size {
        tracing::debug!("payload truncated: wanted {size} bytes, got {}", buf.len());
        return Err(Error::Truncated {
            needed: size,
            available: buf.len(),
        });
    }
    Ok(buf)
}

fn read_small<S: ByteSource + ?Sized>(
    src: &mut S,
    size: u64,
    kind: &'static str,
) -> Result<Vec<u8>> {
    if size > 8 {
        return Err(Error::InvalidPayloadSize { kind, size });
    }
    read_exact(src, size as usize)
}

fn read_limited<S: ByteSource + ?Sized>(
    src: &mut S,
    size: u64,
    limits: &ReadLimits,
) -> Result<Vec<u8>> {
    if size > limits.max_payload_size {
        return Err(Error::PayloadTooLarge {
            size,
            limit: limits.max_payload_size,
        });
    }
    let size = usize::try_from(size).map_err(|_| Error::PayloadTooLarge {
        size,
        limit: limits.max_payload_size,
    })?;
    read_exact(src, size)
}

/// Big-endian unsigned integer of 0 to 8 bytes. An empty payload is 0.
pub fn read_unsigned<S: ByteSource + ?Sized>(src: &mut S, size: u64) -> Result<u64> {
    let buf = read_small(src, size, "unsigned integer")?;
    Ok(buf.iter().fold(0, |acc, &b| (acc << 8) | u64::from(b)))
}

/// Big-endian two's complement integer of 0 to 8 bytes.
pub fn read_signed<S: ByteSource + ?Sized>(src: &mut S, size: u64) -> Result<i64> {
    let buf = read_small(src, size, "signed integer")?;
    let Some(&first) = buf.first() else {
        return Ok(0);
    };
    // sign-extend from the first byte
    let init: i64 = if first & 0x80 != 0 { -1 } else { 0 };
    Ok(buf.iter().fold(init, |acc, &b| (acc << 8) | i64::from(b)))
}

/// IEEE 754 float of 0, 4 or 8 bytes.
pub fn read_float<S: ByteSource + ?Sized>(src: &mut S, size: u64) -> Result<f64> {
    match size {
        0 => Ok(0.0),
        4 => {
            let buf = read_exact(src, 4)?;
            let buf: [u8; 4] = buf
                .try_into()
                .map_err(|_| Error::InvalidPayloadSize { kind: "float", size })?;
            Ok(f32::from_be_bytes(buf).into())
        }
        8 => {
            let buf = read_exact(src, 8)?;
            let buf: [u8; 8] = buf
                .try_into()
                .map_err(|_| Error::InvalidPayloadSize { kind: "float", size })?;
            Ok(f64::from_be_bytes(buf))
        }
        size => Err(Error::InvalidPayloadSize {
            kind: "float",
            size,
        }),
    }
}

/// Nanoseconds relative to 2001-01-01T00:00:00 UTC. An empty payload is
/// the epoch itself.
pub fn read_date<S: ByteSource + ?Sized>(src: &mut S, size: u64) -> Result<DateTime<Utc>> {
    if size != 0 && size != 8 {
        return Err(Error::InvalidPayloadSize { kind: "date", size });
    }
    let nanos = read_signed(src, size)?;
    let epoch = DateTime::from_timestamp(EBML_EPOCH_UNIX_SECS, 0).ok_or(Error::DateOutOfRange)?;
    epoch
        .checked_add_signed(TimeDelta::nanoseconds(nanos))
        .ok_or(Error::DateOutOfRange)
}

/// String payload, for both the ASCII and UTF-8 element types. Trailing NUL
/// padding is removed.
pub fn read_string<S: ByteSource + ?Sized>(
    src: &mut S,
    size: u64,
    limits: &ReadLimits,
) -> Result<String> {
    let mut buf = read_limited(src, size, limits)?;
    let len = buf.iter().rposition(|&b| b != 0).map_or(0, |i| i + 1);
    buf.truncate(len);
    Ok(String::from_utf8(buf)?)
}

/// Opaque binary payload.
pub fn read_binary<S: ByteSource + ?Sized>(
    src: &mut S,
    size: u64,
    limits: &ReadLimits,
) -> Result<Vec<u8>> {
    read_limited(src, size, limits)
}

#[cfg(test)]
mod test {
    use super::*;
    use std::io::Cursor;

    use test_log::test;

    #[test]
    fn unsigned_values() {
        assert_eq!(read_unsigned(&mut Cursor::new(vec![]), 0).unwrap(), 0);
        assert_eq!(read_unsigned(&mut Cursor::new(vec![0x32]), 1).unwrap(), 50);
        assert_eq!(
            read_unsigned(&mut Cursor::new(vec![0x0F, 0x42, 0x40]), 3).unwrap(),
            1_000_000
        );
        assert!(matches!(
            read_unsigned(&mut Cursor::new(vec![0; 9]), 9),
            Err(Error::InvalidPayloadSize { size: 9, .. })
        ));
    }

    #[test]
    fn signed_values() {
        assert_eq!(read_signed(&mut Cursor::new(vec![0xFF]), 1).unwrap(), -1);
        assert_eq!(read_signed(&mut Cursor::new(vec![0xFF, 0x38]), 2).unwrap(), -200);
        assert_eq!(read_signed(&mut Cursor::new(vec![0x00, 0xC8]), 2).unwrap(), 200);
    }

    #[test]
    fn float_values() {
        let src = 1.5f32.to_be_bytes().to_vec();
        assert_eq!(read_float(&mut Cursor::new(src), 4).unwrap(), 1.5);
        let src = 0.1f64.to_be_bytes().to_vec();
        assert_eq!(read_float(&mut Cursor::new(src), 8).unwrap(), 0.1);
        assert!(read_float(&mut Cursor::new(vec![0; 3]), 3).is_err());
    }

    #[test]
    fn date_values() {
        let epoch = read_date(&mut Cursor::new(vec![]), 0).unwrap();
        assert_eq!(epoch.timestamp(), EBML_EPOCH_UNIX_SECS);

        let one_sec = 1_000_000_000i64.to_be_bytes().to_vec();
        let date = read_date(&mut Cursor::new(one_sec), 8).unwrap();
        assert_eq!(date.timestamp(), EBML_EPOCH_UNIX_SECS + 1);

        assert!(read_date(&mut Cursor::new(vec![0; 4]), 4).is_err());
    }

    #[test]
    fn strings_drop_padding() {
        let limits = ReadLimits::default();
        let mut src = Cursor::new(b"TITLE\0\0".to_vec());
        assert_eq!(read_string(&mut src, 7, &limits).unwrap(), "TITLE");
        assert_eq!(src.position(), 7);

        let mut src = Cursor::new("Grüße".as_bytes().to_vec());
        let len = src.get_ref().len() as u64;
        assert_eq!(read_string(&mut src, len, &limits).unwrap(), "Grüße");
    }

    #[test]
    fn oversized_payload_is_not_read() {
        let limits = ReadLimits {
            max_payload_size: 4,
        };
        let mut src = Cursor::new(vec![0u8; 16]);
        assert!(matches!(
            read_binary(&mut src, 5, &limits),
            Err(Error::PayloadTooLarge { size: 5, limit: 4 })
        ));
        assert_eq!(src.position(), 0);
    }

    #[test]
    fn truncated_payload() {
        let limits = ReadLimits::default();
        let mut src = Cursor::new(vec![1u8, 2]);
        assert!(matches!(
            read_binary(&mut src, 4, &limits),
            Err(Error::Truncated {
                needed: 4,
                available: 2
            })
        ));
    }
}
