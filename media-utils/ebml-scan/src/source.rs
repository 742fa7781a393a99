// Copyright 2022-2023 Andrew D. Straw.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license <LICENSE-MIT
// or http://opensource.org/licenses/MIT>, at your option. This file may not be
// copied, modified, or distributed except according to those terms.

use std::io::{Read, Seek, SeekFrom};

/// A sequential byte stream with a cursor that can be queried and advanced.
///
/// Implemented for every `Read + Seek` type, so files, buffered readers and
/// `std::io::Cursor` can all be scanned directly.
pub trait ByteSource {
    /// Current cursor position from the start of the stream.
    fn tell(&mut self) -> std::io::Result<u64>;

    /// Read up to `n` bytes. Fewer bytes are returned only at end of stream.
    fn read_block(&mut self, n: usize) -> std::io::Result<Vec<u8>>;

    /// Advance the cursor by exactly `n` bytes without reading them.
    fn skip(&mut self, n: u64) -> std::io::Result<()>;
}

impl<R: Read + Seek + ?Sized> ByteSource for R {
    fn tell(&mut self) -> std::io::Result<u64> {
        self.stream_position()
    }

    fn read_block(&mut self, n: usize) -> std::io::Result<Vec<u8>> {
        let mut buf = Vec::with_capacity(n);
        (&mut *self).take(n as u64).read_to_end(&mut buf)?;
        Ok(buf)
    }

    fn skip(&mut self, n: u64) -> std::io::Result<()> {
        let delta = i64::try_from(n).map_err(|_| {
            std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                format!("cannot skip {n} bytes"),
            )
        })?;
        self.seek(SeekFrom::Current(delta))?;
        Ok(())
    }
}

/// A view of a source that reads nothing at or past `end`.
///
/// Reads that would cross `end` are shortened, so a decoder running over it
/// sees end of stream at the bound.
pub(crate) struct Bounded<'a, S: ?Sized> {
    inner: &'a mut S,
    end: u64,
}

impl<'a, S: ByteSource + ?Sized> Bounded<'a, S> {
    pub(crate) fn new(inner: &'a mut S, end: u64) -> Self {
        Self { inner, end }
    }

    fn remaining(&mut self) -> std::io::Result<u64> {
        Ok(self.end.saturating_sub(self.inner.tell()?))
    }
}

impl<S: ByteSource + ?Sized> ByteSource for Bounded<'_, S> {
    fn tell(&mut self) -> std::io::Result<u64> {
        self.inner.tell()
    }

    fn read_block(&mut self, n: usize) -> std::io::Result<Vec<u8>> {
        let remaining = usize::try_from(self.remaining()?).unwrap_or(usize::MAX);
        self.inner.read_block(n.min(remaining))
    }

    fn skip(&mut self, n: u64) -> std::io::Result<()> {
        if n > self.remaining()? {
            return Err(std::io::Error::new(
                std::io::ErrorKind::UnexpectedEof,
                format!("cannot skip {n} bytes past offset {}", self.end),
            ));
        }
        self.inner.skip(n)
    }
}
