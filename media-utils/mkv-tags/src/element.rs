// Copyright 2022-2023 Andrew D. Straw.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license <LICENSE-MIT
// or http://opensource.org/licenses/MIT>, at your option. This file may not be
// copied, modified, or distributed except according to those terms.

use ebml_scan::{read_element_header, ByteSource, Element, ElementHeader};

use crate::ids;

/// The element kinds this crate dispatches on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MkElement {
    Ebml(ElementHeader),
    Segment(ElementHeader),
    Tags(ElementHeader),
    Tag(ElementHeader),
    Targets(ElementHeader),
    SimpleTag(ElementHeader),
    /// Anything else, including all leaf elements.
    Other(ElementHeader),
}

impl Element for MkElement {
    fn construct<S: ByteSource + ?Sized>(src: &mut S) -> ebml_scan::Result<Self> {
        let header = read_element_header(src)?;
        Ok(match header.id {
            ids::EBML => MkElement::Ebml(header),
            ids::SEGMENT => MkElement::Segment(header),
            ids::TAGS => MkElement::Tags(header),
            ids::TAG => MkElement::Tag(header),
            ids::TARGETS => MkElement::Targets(header),
            ids::SIMPLE_TAG => MkElement::SimpleTag(header),
            _ => MkElement::Other(header),
        })
    }

    fn header(&self) -> &ElementHeader {
        match self {
            MkElement::Ebml(h)
            | MkElement::Segment(h)
            | MkElement::Tags(h)
            | MkElement::Tag(h)
            | MkElement::Targets(h)
            | MkElement::SimpleTag(h)
            | MkElement::Other(h) => h,
        }
    }
}
