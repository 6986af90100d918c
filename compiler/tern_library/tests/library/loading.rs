//! End-to-end library loading scenarios.

use std::sync::Arc;

use pretty_assertions::assert_eq;
use tern_library::{
    ContainerReader, LibraryError, LibraryImage, LibraryRegistry, PackageIndexDeserializer,
};
use tern_session::{AbiVersion, SessionConfig};

use super::util::{open_image, write_library};

#[test]
fn test_nonexistent_library_fails_before_any_read() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("missing.tlib");

    let err = LibraryImage::open(
        &path,
        Arc::new(SessionConfig::default()),
        Arc::new(PackageIndexDeserializer),
    )
    .unwrap_err();

    assert_eq!(err, LibraryError::PathNotFound { path });
}

#[test]
fn test_fragment_not_found_for_absent_package() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_library(
        dir.path(),
        "pkg.tlib",
        "pkg",
        AbiVersion::CURRENT,
        &[("pkg.A", "declarations of A")],
    );

    let reader = ContainerReader::open(&path).unwrap();
    assert_eq!(reader.load_fragment("pkg.A").unwrap(), b"declarations of A");
    assert_eq!(
        reader.load_fragment("pkg.B").unwrap_err(),
        LibraryError::FragmentNotFound {
            path,
            fq_name: "pkg.B".to_string(),
        }
    );
}

#[test]
fn test_materialize_module() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_library(
        dir.path(),
        "collections.tlib",
        "collections",
        AbiVersion::CURRENT,
        &[
            ("collections", "root"),
            ("collections.list", "List"),
            ("collections.map", "Map"),
        ],
    );

    let image = open_image(&path, AbiVersion::CURRENT);
    assert_eq!(image.module_name().unwrap(), "collections");

    let module = image.module_descriptor().unwrap();
    assert_eq!(module.name, "collections");
    assert_eq!(
        module.package_names().collect::<Vec<_>>(),
        vec!["collections", "collections.list", "collections.map"]
    );
    assert_eq!(module.package("collections.map").unwrap().bytes, b"Map");
    assert_eq!(image.header_reads(), 1);
}

#[test]
fn test_repeated_access_is_idempotent() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_library(
        dir.path(),
        "text.tlib",
        "text",
        AbiVersion::new(1, 3, 0),
        &[("text", "Str")],
    );
    let image = open_image(&path, AbiVersion::new(1, 3, 0));

    let names: Vec<_> = (0..5).map(|_| image.module_name().unwrap().to_string()).collect();
    assert!(names.iter().all(|name| name == "text"));

    let first = image.module_descriptor().unwrap().clone();
    for _ in 0..5 {
        assert_eq!(image.module_descriptor().unwrap(), &first);
    }
    assert_eq!(image.header_reads(), 1);
}

#[test]
fn test_abi_skew_is_fatal() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_library(
        dir.path(),
        "old.tlib",
        "old",
        AbiVersion::new(0, 9, 0),
        &[("old", "legacy")],
    );
    let image = open_image(&path, AbiVersion::CURRENT);

    assert!(matches!(
        image.module_name(),
        Err(LibraryError::VersionMismatch { .. })
    ));
    assert!(matches!(
        image.module_descriptor(),
        Err(LibraryError::VersionMismatch { .. })
    ));
    assert_eq!(image.header_reads(), 1);
}

#[test]
fn test_registry_across_dependencies() {
    let dir = tempfile::tempdir().unwrap();
    let core = write_library(dir.path(), "core.tlib", "core", AbiVersion::CURRENT, &[("core", "c")]);
    let io = write_library(dir.path(), "io.tlib", "io", AbiVersion::CURRENT, &[("io", "i")]);

    let registry = LibraryRegistry::new(Arc::new(SessionConfig::default()), PackageIndexDeserializer);
    let core_image = registry.open(&core).unwrap();
    let io_image = registry.open(&io).unwrap();
    let core_again = registry.open(&core).unwrap();

    assert!(Arc::ptr_eq(&core_image, &core_again));
    assert_eq!(registry.len(), 2);
    assert_eq!(core_image.module_descriptor().unwrap().name, "core");
    assert_eq!(io_image.module_descriptor().unwrap().name, "io");
    assert_eq!(core_again.header_reads(), 1);
}
