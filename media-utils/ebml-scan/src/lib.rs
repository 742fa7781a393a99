// Copyright 2022-2023 Andrew D. Straw.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license <LICENSE-MIT
// or http://opensource.org/licenses/MIT>, at your option. This file may not be
// copied, modified, or distributed except according to those terms.

//! Streaming decoder for EBML, the binary container format underneath
//! Matroska and WebM.
//!
//! Decoding happens in a single forward pass over a [ByteSource]. Element
//! identifiers are opaque numbers here; mapping them to meaning is up to
//! the [Element] implementation supplied by the caller.

pub use element::Element;
pub use error::{Error, Result};
pub use header::{read_element_header, ElementHeader, ElementSize};
pub use scan::{find_element, find_next_element, Children};
pub use source::ByteSource;
pub use value::ReadLimits;
pub use vint::{
    decode_length, decode_value, read_id, read_vint, Id, Vint, MAX_ID_LENGTH, MAX_SIZE_LENGTH,
};

mod element;
mod error;
mod header;
mod scan;
mod source;
pub mod value;
mod vint;
