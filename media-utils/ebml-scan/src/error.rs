// Copyright 2022-2023 Andrew D. Straw.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license <LICENSE-MIT
// or http://opensource.org/licenses/MIT>, at your option. This file may not be
// copied, modified, or distributed except according to those terms.

pub type Result<T> = std::result::Result<T, Error>;

#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// The first byte of a VINT is zero or announces more bytes than allowed.
    #[error("malformed VINT: first byte {first_byte:#04x} exceeds maximum length of {max_length} bytes")]
    MalformedVint { first_byte: u8, max_length: usize },
    /// The source ended before all bytes announced by a VINT could be read.
    #[error("truncated stream: needed {needed} bytes, only {available} available")]
    Truncated { needed: usize, available: usize },
    #[error("could not construct element at offset {position}: {source}")]
    ElementConstructionFailed {
        position: u64,
        #[source]
        source: Box<Error>,
    },
    #[error("element {id:#x} ends at {end}, past the enclosing bound {max_offset}")]
    ElementOverrun { id: u32, end: u64, max_offset: u64 },
    #[error("invalid payload size {size} for {kind} element")]
    InvalidPayloadSize { kind: &'static str, size: u64 },
    #[error("payload of {size} bytes exceeds limit of {limit} bytes")]
    PayloadTooLarge { size: u64, limit: u64 },
    #[error("date value out of range")]
    DateOutOfRange,
    #[error("invalid UTF-8 string: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// True for failures caused by the stream ending early.
    pub fn is_truncated(&self) -> bool {
        match self {
            Error::Truncated { .. } => true,
            Error::ElementConstructionFailed { source, .. } => source.is_truncated(),
            Error::Io(e) => e.kind() == std::io::ErrorKind::UnexpectedEof,
            _ => false,
        }
    }
}
