//! Shared fixtures for library integration tests.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tern_library::{ContainerWriter, LibraryImage, PackageIndexDeserializer};
use tern_session::{AbiVersion, SessionConfig};

/// Write a library for module `module` with the given `(fq_name, contents)` packages.
pub fn write_library(
    dir: &Path,
    file: &str,
    module: &str,
    abi: AbiVersion,
    packages: &[(&str, &str)],
) -> PathBuf {
    let mut writer = ContainerWriter::new(module, abi);
    for (fq_name, contents) in packages {
        writer.add_fragment(*fq_name, contents.as_bytes());
    }
    let path = dir.join(file);
    writer.write_to(&path).unwrap();
    path
}

/// Open `path` with the package-index deserializer under `abi`.
pub fn open_image(path: &Path, abi: AbiVersion) -> LibraryImage<PackageIndexDeserializer> {
    tern_session::init_tracing();
    LibraryImage::open(
        path,
        Arc::new(SessionConfig::new(abi)),
        Arc::new(PackageIndexDeserializer),
    )
    .unwrap()
}
