// Copyright 2022-2023 Andrew D. Straw.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license <LICENSE-MIT
// or http://opensource.org/licenses/MIT>, at your option. This file may not be
// copied, modified, or distributed except according to those terms.

use ebml_scan::{find_element, ByteSource, ElementHeader, ReadLimits};

use crate::{
    element::MkElement,
    error::Result,
    ids,
    tags::{TagCollection, Tags},
};

/// A Segment element and the Tags element found inside it, if any.
#[derive(Debug, Clone)]
pub struct Segment {
    header: ElementHeader,
    tags: Option<Tags>,
}

impl Segment {
    /// Look for the first Tags child of the segment `header` and read it.
    ///
    /// The source must be at the start of the segment payload. Every other
    /// child is skipped by its declared size.
    pub fn read<S: ByteSource + ?Sized>(
        src: &mut S,
        header: &ElementHeader,
        parent_end: u64,
        limits: &ReadLimits,
    ) -> Result<Self> {
        let max_offset = header.data_end(parent_end);
        let tags = match find_element::<MkElement, _>(src, ids::TAGS, max_offset) {
            Some(MkElement::Tags(h)) => Some(Tags::read(src, &h, max_offset, limits)?),
            _ => {
                tracing::debug!("no tags in segment at offset {}", header.position);
                None
            }
        };
        Ok(Self {
            header: *header,
            tags,
        })
    }

    pub fn header(&self) -> &ElementHeader {
        &self.header
    }

    pub fn tags(&self) -> Option<&Tags> {
        self.tags.as_ref()
    }

    /// The tags of this segment, or `None` when it has no Tags element.
    pub fn parse_tag(&self) -> Option<TagCollection> {
        self.tags.as_ref().map(Tags::parse)
    }

    pub fn into_tag(self) -> Option<TagCollection> {
        self.tags.map(Tags::into_collection)
    }
}
