// Copyright 2022-2023 Andrew D. Straw.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license <LICENSE-MIT
// or http://opensource.org/licenses/MIT>, at your option. This file may not be
// copied, modified, or distributed except according to those terms.

//! Read the tags (title, artist, encoder and other key/value metadata) of
//! Matroska and WebM files.
//!
//! Only the elements on the way to the Tags element are decoded. Clusters,
//! cues and everything else are skipped by their declared sizes.

use ebml_scan::{
    find_element, find_next_element, value::read_string, ByteSource, Children, Element,
    ElementHeader, ReadLimits,
};

pub use element::MkElement;
pub use error::{Error, Result};
pub use segment::Segment;
pub use tags::{
    SimpleTag, Tag, TagCollection, TagValue, Tags, Targets, DEFAULT_TARGET_TYPE_VALUE,
};

mod element;
mod error;
pub mod ids;
mod segment;
mod tags;

const SUPPORTED_DOC_TYPES: &[&str] = &["matroska", "webm"];

/// Read the tags of the Matroska or WebM stream starting at the current
/// position of `src`.
///
/// Returns `Ok(None)` for a valid file without tags.
pub fn read_tags<S: ByteSource + ?Sized>(src: &mut S) -> Result<Option<TagCollection>> {
    read_tags_with_limits(src, &ReadLimits::default())
}

pub fn read_tags_with_limits<S: ByteSource + ?Sized>(
    src: &mut S,
    limits: &ReadLimits,
) -> Result<Option<TagCollection>> {
    let segment = read_segment(src, limits)?;
    Ok(segment.into_tag())
}

/// Validate the EBML header, then find and read the first segment.
pub fn read_segment<S: ByteSource + ?Sized>(src: &mut S, limits: &ReadLimits) -> Result<Segment> {
    let ebml = match find_next_element::<MkElement, _>(src, u64::MAX) {
        Some(MkElement::Ebml(h)) => h,
        _ => return Err(Error::NotEbml),
    };
    let doc_type = read_doc_type(src, &ebml, limits)?;
    if !SUPPORTED_DOC_TYPES.contains(&doc_type.as_str()) {
        return Err(Error::UnsupportedDocType(doc_type));
    }
    tracing::debug!("document type {doc_type}");

    match find_element::<MkElement, _>(src, ids::SEGMENT, u64::MAX) {
        Some(MkElement::Segment(h)) => Segment::read(src, &h, u64::MAX, limits),
        _ => Err(Error::NoSegment),
    }
}

/// DocType of the EBML header `header`. Leaves the source after the header.
fn read_doc_type<S: ByteSource + ?Sized>(
    src: &mut S,
    header: &ElementHeader,
    limits: &ReadLimits,
) -> Result<String> {
    let mut doc_type = None;
    let mut children = Children::<MkElement>::of(header, u64::MAX);
    while let Some(child) = children.next_child(src) {
        if child.id() == ids::DOC_TYPE {
            let size = child.header().data_size(children.end());
            doc_type = Some(read_string(src, size, limits)?);
        }
    }
    children.finish(src)?;
    // DocType defaults to "matroska" when absent
    Ok(doc_type.unwrap_or_else(|| "matroska".to_string()))
}
