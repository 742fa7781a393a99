// Copyright 2022-2023 Andrew D. Straw.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license <LICENSE-MIT
// or http://opensource.org/licenses/MIT>, at your option. This file may not be
// copied, modified, or distributed except according to those terms.

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("EBML error: {source}")]
    Ebml {
        #[from]
        source: ebml_scan::Error,
    },
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("stream does not start with an EBML header")]
    NotEbml,
    #[error("unsupported document type \"{0}\"")]
    UnsupportedDocType(String),
    #[error("no segment found")]
    NoSegment,
}

pub type Result<T> = std::result::Result<T, Error>;
