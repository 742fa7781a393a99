// Copyright 2022-2023 Andrew D. Straw.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license <LICENSE-MIT
// or http://opensource.org/licenses/MIT>, at your option. This file may not be
// copied, modified, or distributed except according to those terms.

//! Bounded scanning over sibling elements.
//!
//! Scans are tolerant: a header that cannot be decoded, a truncated stream or
//! an element reaching past `max_offset` all end the scan with `None` rather
//! than an error. The cursor only ever moves forward.

use std::marker::PhantomData;

use crate::element::Element;
use crate::header::ElementHeader;
use crate::source::{Bounded, ByteSource};
use crate::vint::Id;

/// Find the first sibling with identifier `id` before `max_offset`.
///
/// Elements with other ids are skipped using their declared size, their
/// payloads are never read. On success the source is positioned at the
/// payload of the returned element. If nothing is found and the siblings
/// are well formed, the source is left at `max_offset`.
pub fn find_element<E, S>(src: &mut S, id: Id, max_offset: u64) -> Option<E>
where
    E: Element,
    S: ByteSource + ?Sized,
{
    loop {
        let element: E = find_next_element(src, max_offset)?;
        if element.id() == id {
            return Some(element);
        }
        if let Err(e) = element.skip_data(src, max_offset) {
            tracing::debug!("could not skip element {:#x}: {e}", element.id());
            return None;
        }
    }
}

/// Construct the element at the current position, whatever its id.
///
/// Returns `None` without reading anything if the source is already at or
/// past `max_offset`. The header is read through a view ending at
/// `max_offset`, so a header crossing the bound ends the scan without the
/// cursor passing it.
pub fn find_next_element<E, S>(src: &mut S, max_offset: u64) -> Option<E>
where
    E: Element,
    S: ByteSource + ?Sized,
{
    let position = match src.tell() {
        Ok(position) => position,
        Err(e) => {
            tracing::debug!("could not query stream position: {e}");
            return None;
        }
    };
    if position >= max_offset {
        return None;
    }
    let element = match E::construct(&mut Bounded::new(src, max_offset)) {
        Ok(element) => element,
        Err(e) => {
            tracing::debug!("stopping scan: {e}");
            return None;
        }
    };
    if let Err(e) = element.header().check_within(max_offset) {
        tracing::warn!("stopping scan: {e}");
        return None;
    }
    Some(element)
}

/// Walks the children of a master element one at a time.
///
/// The source is passed to every call instead of being held, so the caller
/// is free to read from it between calls. Whatever part of a child's payload
/// the caller leaves unread is skipped before the next child is constructed.
pub struct Children<E> {
    end: u64,
    last: Option<ElementHeader>,
    _element: PhantomData<fn() -> E>,
}

impl<E: Element> Children<E> {
    /// Children found between the current position and `end`.
    pub fn new(end: u64) -> Self {
        Self {
            end,
            last: None,
            _element: PhantomData,
        }
    }

    /// Children of `parent`, whose own parent ends at `parent_end`.
    pub fn of(parent: &ElementHeader, parent_end: u64) -> Self {
        Self::new(parent.data_end(parent_end))
    }

    /// Offset one past the last byte that may belong to a child.
    pub fn end(&self) -> u64 {
        self.end
    }

    /// The next child, or `None` at the end of the parent or on malformed
    /// input.
    pub fn next_child<S: ByteSource + ?Sized>(&mut self, src: &mut S) -> Option<E> {
        if let Some(last) = self.last.take() {
            if let Err(e) = last.skip_data(src, self.end) {
                tracing::debug!("could not skip element {:#x}: {e}", last.id);
                self.end = 0;
                return None;
            }
        }
        let element: E = find_next_element(src, self.end)?;
        self.last = Some(*element.header());
        Some(element)
    }

    /// Move the source to the end of the parent.
    ///
    /// A parent without a bound (`end` of `u64::MAX`) is left where it is.
    pub fn finish<S: ByteSource + ?Sized>(self, src: &mut S) -> crate::Result<()> {
        if self.end == u64::MAX {
            return Ok(());
        }
        let pos = src.tell()?;
        if self.end > pos {
            src.skip(self.end - pos)?;
        }
        Ok(())
    }
}
