use std::io::{Cursor, Write};

use test_log::test;

use mkv_tags::{ids, read_tags, Error, TagValue, DEFAULT_TARGET_TYPE_VALUE};

/// Encode an element with a minimal-length size field.
fn el(id: u32, payload: &[u8]) -> Vec<u8> {
    let id_bytes = id.to_be_bytes();
    let skip = id_bytes.iter().take_while(|&&b| b == 0).count();
    let mut buf = id_bytes[skip..].to_vec();
    let len = payload.len() as u64;
    if len < 0x7F {
        buf.push(0x80 | len as u8);
    } else if len < 0x3FFF {
        buf.extend(((0x4000 | len) as u16).to_be_bytes());
    } else {
        buf.push(0x01);
        buf.extend(&len.to_be_bytes()[1..]);
    }
    buf.extend(payload);
    buf
}

/// Encode a master element from its already-encoded children.
fn master(id: u32, children: &[Vec<u8>]) -> Vec<u8> {
    el(id, &children.concat())
}

/// Encode an element whose size is the reserved "unknown" value.
fn unknown_size(id: u32, children: &[Vec<u8>]) -> Vec<u8> {
    let mut buf = id.to_be_bytes().to_vec();
    buf.push(0xFF);
    buf.extend(children.concat());
    buf
}

fn ebml_header(doc_type: &str) -> Vec<u8> {
    master(
        ids::EBML,
        &[
            el(ids::EBML_VERSION, &[1]),
            el(ids::EBML_READ_VERSION, &[1]),
            el(ids::DOC_TYPE, doc_type.as_bytes()),
            el(ids::DOC_TYPE_VERSION, &[4]),
        ],
    )
}

fn simple_tag(name: &str, value: &str) -> Vec<u8> {
    master(
        ids::SIMPLE_TAG,
        &[
            el(ids::TAG_NAME, name.as_bytes()),
            el(ids::TAG_STRING, value.as_bytes()),
        ],
    )
}

fn info_and_cluster() -> Vec<Vec<u8>> {
    vec![
        master(ids::INFO, &[el(ids::TITLE, b"A title")]),
        // block payload full of bytes that would be malformed headers
        master(
            ids::CLUSTER,
            &[el(ids::TIMESTAMP, &[0]), el(ids::SIMPLE_BLOCK, &[0u8; 300])],
        ),
    ]
}

fn album_tags() -> Vec<u8> {
    master(
        ids::TAGS,
        &[
            master(
                ids::TAG,
                &[
                    master(
                        ids::TARGETS,
                        &[
                            el(ids::TARGET_TYPE_VALUE, &[50]),
                            el(ids::TARGET_TYPE, b"ALBUM"),
                        ],
                    ),
                    simple_tag("TITLE", "Hello"),
                    master(
                        ids::SIMPLE_TAG,
                        &[
                            el(ids::TAG_NAME, b"ARTIST"),
                            el(ids::TAG_STRING, "Someone Ünïcode".as_bytes()),
                            simple_tag("SORT_WITH", "One"),
                        ],
                    ),
                ],
            ),
            master(
                ids::TAG,
                &[
                    master(ids::TARGETS, &[el(ids::TAG_TRACK_UID, &[0x04, 0xD2])]),
                    master(
                        ids::SIMPLE_TAG,
                        &[
                            el(ids::TAG_NAME, b"ENCODER"),
                            el(ids::TAG_LANGUAGE, b"eng"),
                            el(ids::TAG_DEFAULT, &[0]),
                            el(ids::TAG_STRING, b"libfoo 1.0\0\0"),
                        ],
                    ),
                    master(
                        ids::SIMPLE_TAG,
                        &[
                            el(ids::TAG_NAME, b"COVER"),
                            el(ids::TAG_LANGUAGE, b"ger"),
                            el(ids::TAG_LANGUAGE_BCP47, b"de-CH"),
                            el(ids::TAG_BINARY, &[0xDE, 0xAD]),
                        ],
                    ),
                ],
            ),
        ],
    )
}

fn file_with(segment_children: &[Vec<u8>]) -> Vec<u8> {
    let mut buf = ebml_header("matroska");
    buf.extend(master(ids::SEGMENT, segment_children));
    buf
}

#[test]
fn reads_tags_after_skipped_elements() -> anyhow::Result<()> {
    let mut children = info_and_cluster();
    children.push(album_tags());
    let buf = file_with(&children);

    let tags = read_tags(&mut Cursor::new(&buf))?.expect("tags");
    assert_eq!(tags.len(), 2);

    let album = &tags.tags()[0];
    assert_eq!(album.targets.type_value, 50);
    assert_eq!(album.targets.target_type.as_deref(), Some("ALBUM"));
    assert_eq!(album.simple_tags.len(), 2);
    assert_eq!(tags.get_string("title"), Some("Hello"));
    assert_eq!(tags.get_string("ARTIST"), Some("Someone Ünïcode"));

    let artist = tags.get("artist").unwrap();
    assert_eq!(artist.language, "und");
    assert!(artist.default);
    assert_eq!(artist.children.len(), 1);
    assert_eq!(artist.children[0].name, "SORT_WITH");
    assert_eq!(artist.children[0].as_str(), Some("One"));

    let track = &tags.tags()[1];
    assert_eq!(track.targets.type_value, DEFAULT_TARGET_TYPE_VALUE);
    assert_eq!(track.targets.track_uids, vec![1234]);
    let encoder = tags.get("ENCODER").unwrap();
    assert_eq!(encoder.language, "eng");
    assert!(!encoder.default);
    assert_eq!(encoder.as_str(), Some("libfoo 1.0"));

    let cover = tags.get("cover").unwrap();
    assert_eq!(cover.language, "de-CH");
    assert_eq!(cover.value, Some(TagValue::Binary(vec![0xDE, 0xAD])));
    assert_eq!(tags.get_string("COVER"), None);

    let names: Vec<_> = tags.simple_tags().map(|(_, st)| st.name.as_str()).collect();
    assert_eq!(names, ["TITLE", "ARTIST", "ENCODER", "COVER"]);
    Ok(())
}

#[test]
fn no_tags_is_none() -> anyhow::Result<()> {
    let buf = file_with(&info_and_cluster());
    assert!(read_tags(&mut Cursor::new(&buf))?.is_none());
    Ok(())
}

#[test]
fn tags_after_segment_are_not_found() -> anyhow::Result<()> {
    // containment: a Tags element following the segment is not its child
    let mut buf = file_with(&info_and_cluster());
    buf.extend(album_tags());
    assert!(read_tags(&mut Cursor::new(&buf))?.is_none());
    Ok(())
}

#[test]
fn webm_is_supported() -> anyhow::Result<()> {
    let mut buf = ebml_header("webm");
    buf.extend(master(ids::SEGMENT, &[album_tags()]));
    let tags = read_tags(&mut Cursor::new(&buf))?.unwrap();
    assert_eq!(tags.get_string("TITLE"), Some("Hello"));
    Ok(())
}

#[test]
fn other_doc_types_are_rejected() {
    let mut buf = ebml_header("xyz");
    buf.extend(master(ids::SEGMENT, &[album_tags()]));
    match read_tags(&mut Cursor::new(&buf)) {
        Err(Error::UnsupportedDocType(doc_type)) => assert_eq!(doc_type, "xyz"),
        other => panic!("unexpected {other:?}"),
    }
}

#[test]
fn garbage_is_not_ebml() {
    let buf = vec![0u8; 32];
    assert!(matches!(
        read_tags(&mut Cursor::new(&buf)),
        Err(Error::NotEbml)
    ));
    assert!(matches!(
        read_tags(&mut Cursor::new(Vec::<u8>::new())),
        Err(Error::NotEbml)
    ));
}

#[test]
fn missing_segment() {
    let buf = ebml_header("matroska");
    assert!(matches!(
        read_tags(&mut Cursor::new(&buf)),
        Err(Error::NoSegment)
    ));
}

#[test]
fn unknown_size_segment() -> anyhow::Result<()> {
    let mut children = info_and_cluster();
    children.push(album_tags());
    let mut buf = ebml_header("matroska");
    buf.extend(unknown_size(ids::SEGMENT, &children));
    let tags = read_tags(&mut Cursor::new(&buf))?.unwrap();
    assert_eq!(tags.len(), 2);
    Ok(())
}

#[test]
fn truncated_file_keeps_complete_tags() -> anyhow::Result<()> {
    let mut buf = ebml_header("matroska");
    let tags = master(
        ids::TAGS,
        &[
            master(ids::TAG, &[simple_tag("TITLE", "Complete")]),
            master(ids::TAG, &[simple_tag("ARTIST", "Lost in truncation")]),
        ],
    );
    buf.extend(unknown_size(ids::SEGMENT, &[tags]));
    // cut inside the second Tag's header
    let second_tag = buf.len() - (2 + 1 + simple_tag("ARTIST", "Lost in truncation").len());
    buf.truncate(second_tag + 1);

    let tags = read_tags(&mut Cursor::new(&buf))?.unwrap();
    assert_eq!(tags.len(), 1);
    assert_eq!(tags.get_string("TITLE"), Some("Complete"));
    Ok(())
}

#[test]
fn value_cut_by_end_of_file_keeps_complete_tags() -> anyhow::Result<()> {
    let mut buf = ebml_header("matroska");
    let tags = master(
        ids::TAGS,
        &[
            master(ids::TAG, &[simple_tag("TITLE", "Complete")]),
            master(ids::TAG, &[simple_tag("ARTIST", "Lost in truncation")]),
        ],
    );
    buf.extend(unknown_size(ids::SEGMENT, &[tags]));
    // cut inside the second Tag's TagString payload
    buf.truncate(buf.len() - 5);

    let tags = read_tags(&mut Cursor::new(&buf))?.unwrap();
    assert_eq!(tags.len(), 1);
    assert_eq!(tags.get_string("TITLE"), Some("Complete"));
    assert!(tags.get("ARTIST").is_none());
    Ok(())
}

#[test]
fn cut_simple_tag_keeps_earlier_siblings() -> anyhow::Result<()> {
    let mut buf = ebml_header("matroska");
    let tags = master(
        ids::TAGS,
        &[master(
            ids::TAG,
            &[
                master(ids::TARGETS, &[el(ids::TARGET_TYPE_VALUE, &[30])]),
                simple_tag("TITLE", "Complete"),
                simple_tag("ARTIST", "Lost in truncation"),
            ],
        )],
    );
    buf.extend(unknown_size(ids::SEGMENT, &[tags]));
    buf.truncate(buf.len() - 5);

    let tags = read_tags(&mut Cursor::new(&buf))?.unwrap();
    assert_eq!(tags.len(), 1);
    assert_eq!(tags.tags()[0].targets.type_value, 30);
    assert_eq!(tags.tags()[0].simple_tags.len(), 1);
    assert_eq!(tags.get_string("TITLE"), Some("Complete"));
    Ok(())
}

#[test]
fn invalid_utf8_is_still_an_error() {
    let mut buf = ebml_header("matroska");
    let tags = master(
        ids::TAGS,
        &[master(
            ids::TAG,
            &[master(
                ids::SIMPLE_TAG,
                &[el(ids::TAG_NAME, b"TITLE"), el(ids::TAG_STRING, &[0xC3, 0x28])],
            )],
        )],
    );
    buf.extend(master(ids::SEGMENT, &[tags]));
    assert!(matches!(
        read_tags(&mut Cursor::new(&buf)),
        Err(Error::Ebml {
            source: ebml_scan::Error::Utf8(_)
        })
    ));
}

#[test]
fn reads_from_file() -> anyhow::Result<()> {
    let mut children = info_and_cluster();
    children.push(album_tags());
    let buf = file_with(&children);

    let tempdir = tempfile::tempdir()?;
    let path = tempdir.path().join("tagged.mkv");
    std::fs::File::create(&path)?.write_all(&buf)?;

    let mut rdr = std::io::BufReader::new(std::fs::File::open(&path)?);
    let tags = read_tags(&mut rdr)?.unwrap();
    assert_eq!(tags.get_string("TITLE"), Some("Hello"));
    Ok(())
}
