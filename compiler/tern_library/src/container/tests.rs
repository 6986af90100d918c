use std::fs;
use std::path::{Path, PathBuf};

use pretty_assertions::assert_eq;
use tern_session::AbiVersion;

use super::format::PREFIX_LEN;
use super::*;
use crate::error::LibraryError;

fn write_container(dir: &Path, writer: &ContainerWriter) -> PathBuf {
    let path = dir.join("lib.tlib");
    writer
        .write_to(&path)
        .unwrap_or_else(|e| panic!("failed to write container: {e}"));
    path
}

fn sample_writer(abi: AbiVersion) -> ContainerWriter {
    ContainerWriter::new("geometry", abi)
        .with_fragment("geometry.shapes", b"circle;square".to_vec())
        .with_fragment("geometry", b"root".to_vec())
}

fn temp_dir() -> tempfile::TempDir {
    tempfile::tempdir().unwrap_or_else(|e| panic!("failed to create temp dir: {e}"))
}

#[test]
fn test_open_missing_file() {
    let dir = temp_dir();
    let path = dir.path().join("missing.tlib");

    let err = ContainerReader::open(&path).unwrap_err();
    assert_eq!(err, LibraryError::PathNotFound { path });
}

#[test]
fn test_open_directory_is_not_a_library() {
    let dir = temp_dir();
    let err = ContainerReader::open(dir.path()).unwrap_err();
    assert!(matches!(err, LibraryError::PathNotFound { .. }));
}

#[test]
fn test_load_header() {
    let dir = temp_dir();
    let abi = AbiVersion::new(1, 2, 0);
    let path = write_container(dir.path(), &sample_writer(abi));

    let reader = ContainerReader::open(&path).unwrap_or_else(|e| panic!("open failed: {e}"));
    let header = reader
        .load_header(abi)
        .unwrap_or_else(|e| panic!("header failed: {e}"));

    assert_eq!(header.module_name, "geometry");
    assert_eq!(reader.abi_version(), Ok(abi));
}

#[test]
fn test_load_header_version_mismatch() {
    let dir = temp_dir();
    let path = write_container(dir.path(), &sample_writer(AbiVersion::new(2, 0, 0)));

    let reader = ContainerReader::open(&path).unwrap_or_else(|e| panic!("open failed: {e}"));
    let err = reader.load_header(AbiVersion::new(1, 0, 0)).unwrap_err();

    assert_eq!(
        err,
        LibraryError::VersionMismatch {
            path,
            expected: AbiVersion::new(1, 0, 0),
            found: AbiVersion::new(2, 0, 0),
        }
    );
}

#[test]
fn test_patch_level_skew_is_a_mismatch() {
    let dir = temp_dir();
    let path = write_container(dir.path(), &sample_writer(AbiVersion::new(1, 0, 1)));

    let reader = ContainerReader::open(&path).unwrap_or_else(|e| panic!("open failed: {e}"));
    let err = reader.load_header(AbiVersion::new(1, 0, 0)).unwrap_err();
    assert!(matches!(err, LibraryError::VersionMismatch { .. }));
}

#[test]
fn test_explicit_table_of_contents_round_trips() {
    let dir = temp_dir();
    let abi = AbiVersion::CURRENT;
    let writer = sample_writer(abi).with_table_of_contents(vec![0xde, 0xad, 0xbe, 0xef]);
    let path = write_container(dir.path(), &writer);

    let reader = ContainerReader::open(&path).unwrap_or_else(|e| panic!("open failed: {e}"));
    let header = reader
        .load_header(abi)
        .unwrap_or_else(|e| panic!("header failed: {e}"));

    assert_eq!(header.table_of_contents.as_bytes(), &[0xde, 0xad, 0xbe, 0xef]);
    assert_eq!(header.table_of_contents.encoded(), "3q2+7w==");
}

#[test]
fn test_load_fragment() {
    let dir = temp_dir();
    let path = write_container(dir.path(), &sample_writer(AbiVersion::CURRENT));
    let reader = ContainerReader::open(&path).unwrap_or_else(|e| panic!("open failed: {e}"));

    assert_eq!(reader.load_fragment("geometry.shapes"), Ok(b"circle;square".to_vec()));
    assert_eq!(reader.load_fragment("geometry"), Ok(b"root".to_vec()));
    assert_eq!(
        reader.fragment_names(),
        Ok(vec!["geometry".to_string(), "geometry.shapes".to_string()])
    );
}

#[test]
fn test_load_fragment_not_found() {
    let dir = temp_dir();
    let writer = ContainerWriter::new("pkg", AbiVersion::CURRENT).with_fragment("pkg.A", b"a".to_vec());
    let path = write_container(dir.path(), &writer);
    let reader = ContainerReader::open(&path).unwrap_or_else(|e| panic!("open failed: {e}"));

    let err = reader.load_fragment("pkg.B").unwrap_err();
    assert_eq!(
        err,
        LibraryError::FragmentNotFound {
            path,
            fq_name: "pkg.B".to_string(),
        }
    );
}

#[test]
fn test_load_fragment_is_not_cached() {
    let dir = temp_dir();
    let path = write_container(dir.path(), &sample_writer(AbiVersion::CURRENT));
    let reader = ContainerReader::open(&path).unwrap_or_else(|e| panic!("open failed: {e}"));
    assert_eq!(reader.load_fragment("geometry"), Ok(b"root".to_vec()));

    // Replace the file behind the reader's back.
    ContainerWriter::new("geometry", AbiVersion::CURRENT)
        .with_fragment("geometry", b"rewritten".to_vec())
        .write_to(&path)
        .unwrap_or_else(|e| panic!("rewrite failed: {e}"));

    assert_eq!(reader.load_fragment("geometry"), Ok(b"rewritten".to_vec()));
}

#[test]
fn test_empty_fragment() {
    let dir = temp_dir();
    let writer = ContainerWriter::new("empty", AbiVersion::CURRENT).with_fragment("empty", Vec::new());
    let path = write_container(dir.path(), &writer);
    let reader = ContainerReader::open(&path).unwrap_or_else(|e| panic!("open failed: {e}"));

    assert_eq!(reader.load_fragment("empty"), Ok(Vec::new()));
}

#[test]
fn test_bad_magic_is_corrupt() {
    let dir = temp_dir();
    let path = dir.path().join("garbage.tlib");
    fs::write(&path, b"this is not a library container at all").unwrap_or_else(|e| panic!("{e}"));

    let reader = ContainerReader::open(&path).unwrap_or_else(|e| panic!("open failed: {e}"));
    let err = reader.load_header(AbiVersion::CURRENT).unwrap_err();
    assert!(matches!(err, LibraryError::CorruptContainer { .. }), "{err}");
}

#[test]
fn test_truncated_prefix_is_corrupt() {
    let dir = temp_dir();
    let path = dir.path().join("short.tlib");
    fs::write(&path, b"TNLB").unwrap_or_else(|e| panic!("{e}"));

    let reader = ContainerReader::open(&path).unwrap_or_else(|e| panic!("open failed: {e}"));
    let err = reader.load_header(AbiVersion::CURRENT).unwrap_err();
    assert!(matches!(err, LibraryError::CorruptContainer { .. }), "{err}");
}

#[test]
fn test_truncated_index_is_corrupt() {
    let dir = temp_dir();
    let bytes = sample_writer(AbiVersion::CURRENT)
        .to_bytes()
        .unwrap_or_else(|e| panic!("encode failed: {e}"));
    let path = dir.path().join("cut.tlib");
    fs::write(&path, &bytes[..PREFIX_LEN + 3]).unwrap_or_else(|e| panic!("{e}"));

    let reader = ContainerReader::open(&path).unwrap_or_else(|e| panic!("open failed: {e}"));
    let err = reader.load_header(AbiVersion::CURRENT).unwrap_err();
    assert!(matches!(err, LibraryError::CorruptContainer { .. }), "{err}");
}

#[test]
fn test_truncated_payload_is_corrupt() {
    let dir = temp_dir();
    let bytes = sample_writer(AbiVersion::CURRENT)
        .to_bytes()
        .unwrap_or_else(|e| panic!("encode failed: {e}"));
    let path = dir.path().join("cut.tlib");
    fs::write(&path, &bytes[..bytes.len() - 2]).unwrap_or_else(|e| panic!("{e}"));

    let reader = ContainerReader::open(&path).unwrap_or_else(|e| panic!("open failed: {e}"));
    // The header is intact, but the last fragment runs off the end.
    assert!(reader.load_header(AbiVersion::CURRENT).is_ok());
    let err = reader.load_fragment("geometry.shapes").unwrap_err();
    assert!(matches!(err, LibraryError::CorruptContainer { .. }), "{err}");
}

#[test]
fn test_version_is_checked_before_index_decoding() {
    let dir = temp_dir();
    let mut bytes = sample_writer(AbiVersion::new(7, 0, 0))
        .to_bytes()
        .unwrap_or_else(|e| panic!("encode failed: {e}"));
    // Scribble over the index: a reader on the wrong ABI must still report
    // the version, not corruption.
    for byte in &mut bytes[PREFIX_LEN..] {
        *byte = 0xff;
    }
    let path = dir.path().join("skewed.tlib");
    fs::write(&path, &bytes).unwrap_or_else(|e| panic!("{e}"));

    let reader = ContainerReader::open(&path).unwrap_or_else(|e| panic!("open failed: {e}"));
    let err = reader.load_header(AbiVersion::new(1, 0, 0)).unwrap_err();
    assert!(matches!(err, LibraryError::VersionMismatch { .. }), "{err}");
}

#[test]
fn test_table_of_contents_rejects_invalid_base64() {
    assert!(TableOfContents::from_encoded("not base64!".to_string()).is_err());

    let toc = TableOfContents::from_bytes(b"listing".to_vec());
    let decoded = TableOfContents::from_encoded(toc.encoded().to_string())
        .unwrap_or_else(|e| panic!("decode failed: {e}"));
    assert_eq!(decoded, toc);
}
