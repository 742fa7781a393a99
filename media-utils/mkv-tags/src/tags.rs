// Copyright 2022-2023 Andrew D. Straw.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license <LICENSE-MIT
// or http://opensource.org/licenses/MIT>, at your option. This file may not be
// copied, modified, or distributed except according to those terms.

use ebml_scan::{
    value::{read_binary, read_string, read_unsigned},
    ByteSource, Children, Element, ElementHeader, ReadLimits,
};

use crate::{element::MkElement, error::Result, ids};

/// Target type value used when a tag does not name one ("ALBUM", "MOVIE").
pub const DEFAULT_TARGET_TYPE_VALUE: u64 = 50;

const DEFAULT_LANGUAGE: &str = "und";

/// Simple tags nested deeper than this are skipped.
const MAX_SIMPLE_TAG_DEPTH: usize = 16;

/// What a [Tag] applies to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Targets {
    /// Logical level, e.g. 30 for a track or chapter, 50 for an album or
    /// movie.
    pub type_value: u64,
    /// Informational name of the level, e.g. "ALBUM".
    pub target_type: Option<String>,
    pub track_uids: Vec<u64>,
    pub edition_uids: Vec<u64>,
    pub chapter_uids: Vec<u64>,
    pub attachment_uids: Vec<u64>,
}

impl Default for Targets {
    fn default() -> Self {
        Self {
            type_value: DEFAULT_TARGET_TYPE_VALUE,
            target_type: None,
            track_uids: Vec::new(),
            edition_uids: Vec::new(),
            chapter_uids: Vec::new(),
            attachment_uids: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TagValue {
    String(String),
    Binary(Vec<u8>),
}

/// A single key/value pair, possibly with nested pairs refining it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SimpleTag {
    pub name: String,
    pub language: String,
    pub default: bool,
    pub value: Option<TagValue>,
    pub children: Vec<SimpleTag>,
}

impl SimpleTag {
    pub fn as_str(&self) -> Option<&str> {
        match &self.value {
            Some(TagValue::String(s)) => Some(s),
            _ => None,
        }
    }

    pub fn as_bytes(&self) -> Option<&[u8]> {
        match &self.value {
            Some(TagValue::Binary(b)) => Some(b),
            _ => None,
        }
    }
}

/// The simple tags sharing one set of targets.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Tag {
    pub targets: Targets,
    pub simple_tags: Vec<SimpleTag>,
}

/// All tags of a file, in stream order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TagCollection {
    tags: Vec<Tag>,
}

impl TagCollection {
    pub fn new(tags: Vec<Tag>) -> Self {
        Self { tags }
    }

    pub fn tags(&self) -> &[Tag] {
        &self.tags
    }

    pub fn is_empty(&self) -> bool {
        self.tags.is_empty()
    }

    pub fn len(&self) -> usize {
        self.tags.len()
    }

    /// Top-level simple tags of every tag, with the targets they apply to.
    pub fn simple_tags(&self) -> impl Iterator<Item = (&Targets, &SimpleTag)> {
        self.tags
            .iter()
            .flat_map(|tag| tag.simple_tags.iter().map(move |st| (&tag.targets, st)))
    }

    /// First top-level simple tag called `name`, ignoring ASCII case.
    pub fn get(&self, name: &str) -> Option<&SimpleTag> {
        self.simple_tags()
            .map(|(_, st)| st)
            .find(|st| st.name.eq_ignore_ascii_case(name))
    }

    /// String value of the first simple tag called `name`.
    pub fn get_string(&self, name: &str) -> Option<&str> {
        self.get(name).and_then(SimpleTag::as_str)
    }
}

impl IntoIterator for TagCollection {
    type Item = Tag;
    type IntoIter = std::vec::IntoIter<Tag>;
    fn into_iter(self) -> Self::IntoIter {
        self.tags.into_iter()
    }
}

/// A Tags element together with the tags read from its payload.
#[derive(Debug, Clone)]
pub struct Tags {
    header: ElementHeader,
    tags: Vec<Tag>,
}

impl Tags {
    /// Read every Tag child of the Tags element `header`.
    ///
    /// The source must be at the start of the payload and is left at its
    /// end. Malformed children and values cut off by the end of the stream
    /// end the read early, keeping the tags read so far. Unreadable values
    /// such as invalid UTF-8 are an error.
    pub fn read<S: ByteSource + ?Sized>(
        src: &mut S,
        header: &ElementHeader,
        parent_end: u64,
        limits: &ReadLimits,
    ) -> Result<Self> {
        let mut tags = Vec::new();
        let mut children = Children::<MkElement>::of(header, parent_end);
        while let Some(child) = children.next_child(src) {
            if let MkElement::Tag(h) = child {
                let tag = read_tag(src, &h, children.end(), limits)?;
                if tag.simple_tags.is_empty() {
                    tracing::debug!("ignoring tag without simple tags at {}", h.position);
                    continue;
                }
                tags.push(tag);
            }
        }
        children.finish(src)?;
        tracing::debug!("read {} tags at offset {}", tags.len(), header.position);
        Ok(Self {
            header: *header,
            tags,
        })
    }

    pub fn header(&self) -> &ElementHeader {
        &self.header
    }

    /// Materialize the tags read from this element.
    pub fn parse(&self) -> TagCollection {
        TagCollection::new(self.tags.clone())
    }

    pub fn into_collection(self) -> TagCollection {
        TagCollection::new(self.tags)
    }
}

/// `Ok(None)` when the stream ended inside the value.
fn complete<T>(value: ebml_scan::Result<T>) -> Result<Option<T>> {
    match value {
        Ok(value) => Ok(Some(value)),
        Err(e) if e.is_truncated() => {
            tracing::debug!("value cut short: {e}");
            Ok(None)
        }
        Err(e) => Err(e.into()),
    }
}

fn read_tag<S: ByteSource + ?Sized>(
    src: &mut S,
    header: &ElementHeader,
    parent_end: u64,
    limits: &ReadLimits,
) -> Result<Tag> {
    let mut tag = Tag::default();
    let mut children = Children::<MkElement>::of(header, parent_end);
    while let Some(child) = children.next_child(src) {
        match child {
            MkElement::Targets(h) => {
                tag.targets = read_targets(src, &h, children.end(), limits)?;
            }
            MkElement::SimpleTag(h) => {
                if let Some(st) = read_simple_tag(src, &h, children.end(), limits, 0)? {
                    tag.simple_tags.push(st);
                }
            }
            _ => {}
        }
    }
    children.finish(src)?;
    Ok(tag)
}

fn read_targets<S: ByteSource + ?Sized>(
    src: &mut S,
    header: &ElementHeader,
    parent_end: u64,
    limits: &ReadLimits,
) -> Result<Targets> {
    let mut targets = Targets::default();
    let mut children = Children::<MkElement>::of(header, parent_end);
    while let Some(child) = children.next_child(src) {
        let size = child.header().data_size(children.end());
        let read = match child.id() {
            ids::TARGET_TYPE_VALUE => read_unsigned(src, size).map(|v| targets.type_value = v),
            ids::TARGET_TYPE => {
                read_string(src, size, limits).map(|v| targets.target_type = Some(v))
            }
            ids::TAG_TRACK_UID => read_unsigned(src, size).map(|v| targets.track_uids.push(v)),
            ids::TAG_EDITION_UID => read_unsigned(src, size).map(|v| targets.edition_uids.push(v)),
            ids::TAG_CHAPTER_UID => read_unsigned(src, size).map(|v| targets.chapter_uids.push(v)),
            ids::TAG_ATTACHMENT_UID => {
                read_unsigned(src, size).map(|v| targets.attachment_uids.push(v))
            }
            _ => Ok(()),
        };
        if complete(read)?.is_none() {
            break;
        }
    }
    children.finish(src)?;
    Ok(targets)
}

fn read_simple_tag<S: ByteSource + ?Sized>(
    src: &mut S,
    header: &ElementHeader,
    parent_end: u64,
    limits: &ReadLimits,
    depth: usize,
) -> Result<Option<SimpleTag>> {
    let mut name = String::new();
    let mut language = None;
    let mut language_bcp47 = None;
    let mut default = true;
    let mut value = None;
    let mut nested = Vec::new();
    let mut truncated = false;

    let mut children = Children::<MkElement>::of(header, parent_end);
    while let Some(child) = children.next_child(src) {
        let size = child.header().data_size(children.end());
        match child {
            MkElement::SimpleTag(h) => {
                if depth + 1 >= MAX_SIMPLE_TAG_DEPTH {
                    tracing::debug!("skipping simple tag nested {} deep", depth + 1);
                    continue;
                }
                if let Some(st) = read_simple_tag(src, &h, children.end(), limits, depth + 1)? {
                    nested.push(st);
                }
            }
            other => {
                let read = match other.id() {
                    ids::TAG_NAME => read_string(src, size, limits).map(|v| name = v),
                    ids::TAG_LANGUAGE => read_string(src, size, limits).map(|v| language = Some(v)),
                    ids::TAG_LANGUAGE_BCP47 => {
                        read_string(src, size, limits).map(|v| language_bcp47 = Some(v))
                    }
                    ids::TAG_DEFAULT => read_unsigned(src, size).map(|v| default = v != 0),
                    ids::TAG_STRING => read_string(src, size, limits)
                        .map(|v| value = Some(TagValue::String(v))),
                    ids::TAG_BINARY => read_binary(src, size, limits)
                        .map(|v| value = Some(TagValue::Binary(v))),
                    _ => Ok(()),
                };
                if complete(read)?.is_none() {
                    truncated = true;
                    break;
                }
            }
        }
    }
    children.finish(src)?;

    if truncated {
        tracing::debug!("dropping simple tag cut short at {}", header.position);
        return Ok(None);
    }
    if name.is_empty() {
        tracing::debug!("ignoring simple tag without name at {}", header.position);
        return Ok(None);
    }
    Ok(Some(SimpleTag {
        name,
        language: language_bcp47
            .or(language)
            .unwrap_or_else(|| DEFAULT_LANGUAGE.to_string()),
        default,
        value,
        children: nested,
    }))
}
