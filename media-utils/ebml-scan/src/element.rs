// Copyright 2022-2023 Andrew D. Straw.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license <LICENSE-MIT
// or http://opensource.org/licenses/MIT>, at your option. This file may not be
// copied, modified, or distributed except according to those terms.

use crate::error::Result;
use crate::header::{read_element_header, ElementHeader};
use crate::source::ByteSource;
use crate::vint::Id;

/// An element kind that can be built from the stream and can skip its own
/// payload.
///
/// Implementations are typically a flat enum over the identifiers a reader
/// cares about, with a catch-all variant for everything else. `construct`
/// acts as the factory: it reads the header and dispatches on the id.
pub trait Element: Sized {
    /// Read an element header from the current position and build the
    /// element for its id. The source is left at the start of the payload.
    fn construct<S: ByteSource + ?Sized>(src: &mut S) -> Result<Self>;

    fn header(&self) -> &ElementHeader;

    #[inline]
    fn id(&self) -> Id {
        self.header().id
    }

    /// Move the source to the end of this element's payload.
    ///
    /// Assumes the source is positioned at or after `data_start` and not
    /// beyond the payload end. An unknown-size payload ends at
    /// `parent_end`.
    fn skip_data<S: ByteSource + ?Sized>(&self, src: &mut S, parent_end: u64) -> Result<()> {
        let end = self.header().data_end(parent_end);
        let pos = src.tell()?;
        if end > pos {
            src.skip(end - pos)?;
        }
        Ok(())
    }
}

/// The generic element: just the header.
impl Element for ElementHeader {
    fn construct<S: ByteSource + ?Sized>(src: &mut S) -> Result<Self> {
        read_element_header(src)
    }

    #[inline]
    fn header(&self) -> &ElementHeader {
        self
    }
}
