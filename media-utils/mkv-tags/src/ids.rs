// Copyright 2022-2023 Andrew D. Straw.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license <LICENSE-MIT
// or http://opensource.org/licenses/MIT>, at your option. This file may not be
// copied, modified, or distributed except according to those terms.

//! Matroska element identifiers used by this crate.

use ebml_scan::Id;

/// The EBML data type of an element's payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataType {
    Master,
    Unsigned,
    Signed,
    Float,
    Date,
    /// ASCII string
    String,
    Utf8,
    Binary,
}

macro_rules! impl_ids {
    ( $( ($name:ident, $val:literal, $dtype:ident) ),* ) => {
        $(
            pub const $name: Id = $val;
        )*

        /// Name of a known element.
        pub fn name(id: Id) -> Option<&'static str> {
            match id {
                $(
                    $val => Some(stringify!($name)),
                )*
                _ => None,
            }
        }

        /// Payload type of a known element.
        pub fn data_type(id: Id) -> Option<DataType> {
            match id {
                $(
                    $val => Some(DataType::$dtype),
                )*
                _ => None,
            }
        }
    };
}

/// True for elements whose payload is a sequence of child elements.
pub fn is_master(id: Id) -> bool {
    data_type(id) == Some(DataType::Master)
}

// See https://www.matroska.org/technical/elements.html

impl_ids!(
    // EBML header
    (EBML, 0x1A45_DFA3, Master),
    (EBML_VERSION, 0x4286, Unsigned),
    (EBML_READ_VERSION, 0x42F7, Unsigned),
    (EBML_MAX_ID_LENGTH, 0x42F2, Unsigned),
    (EBML_MAX_SIZE_LENGTH, 0x42F3, Unsigned),
    (DOC_TYPE, 0x4282, String),
    (DOC_TYPE_VERSION, 0x4287, Unsigned),
    (DOC_TYPE_READ_VERSION, 0x4285, Unsigned),
    // Global
    (VOID, 0xEC, Binary),
    (CRC32, 0xBF, Binary),
    // Segment and its top-level children
    (SEGMENT, 0x1853_8067, Master),
    (SEEK_HEAD, 0x114D_9B74, Master),
    (SEEK, 0x4DBB, Master),
    (SEEK_ID, 0x53AB, Binary),
    (SEEK_POSITION, 0x53AC, Unsigned),
    (INFO, 0x1549_A966, Master),
    (TIMESTAMP_SCALE, 0x2A_D7B1, Unsigned),
    (DURATION, 0x4489, Float),
    (DATE_UTC, 0x4461, Date),
    (TITLE, 0x7BA9, Utf8),
    (MUXING_APP, 0x4D80, Utf8),
    (WRITING_APP, 0x5741, Utf8),
    (TRACKS, 0x1654_AE6B, Master),
    (TRACK_ENTRY, 0xAE, Master),
    (TRACK_NUMBER, 0xD7, Unsigned),
    (TRACK_UID, 0x73C5, Unsigned),
    (TRACK_TYPE, 0x83, Unsigned),
    (CODEC_ID, 0x86, String),
    (CLUSTER, 0x1F43_B675, Master),
    (TIMESTAMP, 0xE7, Unsigned),
    (SIMPLE_BLOCK, 0xA3, Binary),
    (CUES, 0x1C53_BB6B, Master),
    (CHAPTERS, 0x1043_A770, Master),
    (ATTACHMENTS, 0x1941_A469, Master),
    // Tags
    (TAGS, 0x1254_C367, Master),
    (TAG, 0x7373, Master),
    (TARGETS, 0x63C0, Master),
    (TARGET_TYPE_VALUE, 0x68CA, Unsigned),
    (TARGET_TYPE, 0x63CA, String),
    (TAG_TRACK_UID, 0x63C5, Unsigned),
    (TAG_EDITION_UID, 0x63C9, Unsigned),
    (TAG_CHAPTER_UID, 0x63C4, Unsigned),
    (TAG_ATTACHMENT_UID, 0x63C6, Unsigned),
    (SIMPLE_TAG, 0x67C8, Master),
    (TAG_NAME, 0x45A3, Utf8),
    (TAG_LANGUAGE, 0x447A, String),
    (TAG_LANGUAGE_BCP47, 0x447B, String),
    (TAG_DEFAULT, 0x4484, Unsigned),
    (TAG_STRING, 0x4487, Utf8),
    (TAG_BINARY, 0x4485, Binary)
);
