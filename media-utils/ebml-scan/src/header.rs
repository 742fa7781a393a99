// Copyright 2022-2023 Andrew D. Straw.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license <LICENSE-MIT
// or http://opensource.org/licenses/MIT>, at your option. This file may not be
// copied, modified, or distributed except according to those terms.

use crate::error::{Error, Result};
use crate::source::ByteSource;
use crate::vint::{read_id, read_vint, Id};

/// Declared payload size of an element.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ElementSize {
    Known(u64),
    /// All data bits of the size were set. The element runs to the end of
    /// its parent.
    Unknown,
}

impl ElementSize {
    pub fn known(&self) -> Option<u64> {
        match self {
            ElementSize::Known(size) => Some(*size),
            ElementSize::Unknown => None,
        }
    }
}

/// An element's identifier, declared size and location in the stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ElementHeader {
    /// the ID of the EBML element
    pub id: Id,
    /// the declared size of the payload
    pub size: ElementSize,
    /// the position of the start of the EBML element
    pub position: u64,
    /// the position of the first payload byte
    pub data_start: u64,
}

impl ElementHeader {
    /// Size of the id and size fields together.
    #[inline]
    pub fn header_size(&self) -> u64 {
        self.data_start - self.position
    }

    /// Offset one past the last payload byte.
    ///
    /// Unknown-size elements end where their parent does, `parent_end`.
    /// Saturates rather than wrapping on absurd declared sizes so that the
    /// result is always caught by bound checks.
    pub fn data_end(&self, parent_end: u64) -> u64 {
        match self.size {
            ElementSize::Known(size) => self.data_start.saturating_add(size),
            ElementSize::Unknown => parent_end,
        }
    }

    /// Payload size, resolving an unknown size against `parent_end`.
    pub fn data_size(&self, parent_end: u64) -> u64 {
        self.data_end(parent_end).saturating_sub(self.data_start)
    }

    /// Check the element lies within `max_offset`.
    pub fn check_within(&self, max_offset: u64) -> Result<()> {
        let end = self.data_end(max_offset);
        if end > max_offset {
            return Err(Error::ElementOverrun {
                id: self.id,
                end,
                max_offset,
            });
        }
        Ok(())
    }
}

/// Read an element identifier followed by its size.
///
/// On success the source is positioned at the first payload byte. Any
/// failure is reported as [Error::ElementConstructionFailed] carrying the
/// underlying VINT error.
pub fn read_element_header<S: ByteSource + ?Sized>(src: &mut S) -> Result<ElementHeader> {
    let position = src.tell()?;
    read_id_size(src, position).map_err(|e| match e {
        Error::Io(e) => Error::Io(e),
        source => Error::ElementConstructionFailed {
            position,
            source: Box::new(source),
        },
    })
}

fn read_id_size<S: ByteSource + ?Sized>(src: &mut S, position: u64) -> Result<ElementHeader> {
    let id = read_id(src)?;
    let size = read_vint(src)?;
    let size = if size.is_unknown() {
        ElementSize::Unknown
    } else {
        ElementSize::Known(size.value)
    };
    let data_start = src.tell()?;
    tracing::trace!("element {id:#x} at {position}, size {size:?}");
    Ok(ElementHeader {
        id,
        size,
        position,
        data_start,
    })
}
