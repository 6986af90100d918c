//! Library Image
//!
//! The public unit of a precompiled dependency. An image is opened once per
//! resolved dependency and lives as long as the compilation. Its module name
//! and module descriptor are materialized lazily, each exactly once.
//!
//! ```text
//! LibraryImage::open ──▶ path exists? ──no──▶ PathNotFound
//!        │
//!        ▼
//! module_name() ──▶ header (once) ──▶ ContainerReader::load_header(abi)
//!        │
//!        ▼
//! module_descriptor() (once) ──▶ ModuleDeserializer::deserialize
//!                                      │
//!                                      └──▶ FragmentLoader ──▶ load_fragment(fq_name)
//! ```

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use tern_session::SessionConfig;
use tracing::debug;

use crate::container::{ContainerReader, MetadataHeader};
use crate::deserializer::{DeserializeRequest, FragmentLoader, ModuleDeserializer};
use crate::error::Result;
use crate::once::OnceCompute;

/// A precompiled library ready for separate compilation.
pub struct LibraryImage<D: ModuleDeserializer> {
    /// The library path rendered as a string (the image's identity).
    library_name: String,
    /// Code artifacts linked for this library. Currently the library itself.
    bitcode_paths: Vec<PathBuf>,
    reader: ContainerReader,
    config: Arc<SessionConfig>,
    deserializer: Arc<D>,
    header: OnceCompute<MetadataHeader>,
    descriptor: OnceCompute<D::Descriptor>,
    header_reads: AtomicUsize,
}

impl<D: ModuleDeserializer> LibraryImage<D> {
    /// Open the library at `path`.
    ///
    /// Fails with `PathNotFound` if the file does not exist. Nothing is read
    /// from the container until the module name or descriptor is requested.
    pub fn open(
        path: impl Into<PathBuf>,
        config: Arc<SessionConfig>,
        deserializer: Arc<D>,
    ) -> Result<Self> {
        let reader = ContainerReader::open(path)?;
        let library_path = reader.path().to_path_buf();

        debug!(library = %library_path.display(), "opened library image");

        Ok(Self {
            library_name: library_path.display().to_string(),
            bitcode_paths: vec![library_path],
            reader,
            config,
            deserializer,
            header: OnceCompute::new(),
            descriptor: OnceCompute::new(),
            header_reads: AtomicUsize::new(0),
        })
    }

    /// The library's identity: its path as given at construction.
    #[must_use]
    pub fn library_name(&self) -> &str {
        &self.library_name
    }

    /// Path of the library file.
    #[must_use]
    pub fn library_path(&self) -> &Path {
        self.reader.path()
    }

    /// Code artifacts to link for this library, in link order.
    #[must_use]
    pub fn bitcode_paths(&self) -> &[PathBuf] {
        &self.bitcode_paths
    }

    /// Session configuration this image reads under.
    #[must_use]
    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Module name from the library header.
    ///
    /// The first call reads the header under the session's ABI version; every
    /// later call (including a failing one) reuses that outcome.
    pub fn module_name(&self) -> Result<&str> {
        self.header().map(|header| header.module_name.as_str())
    }

    /// The fully deserialized module, materialized at most once.
    ///
    /// A failure is cached: no descriptor is ever produced for an image whose
    /// materialization failed.
    pub fn module_descriptor(&self) -> Result<&D::Descriptor> {
        self.descriptor.get_or_compute(&self.library_name, || {
            let header = self.header()?;
            let _span = tracing::debug_span!("materialize", library = %self.library_name).entered();

            let loader = FragmentLoader::new(&self.reader);
            let descriptor = self.deserializer.deserialize(DeserializeRequest {
                library: self.reader.path(),
                module_name: &header.module_name,
                table_of_contents: &header.table_of_contents,
                fragments: &loader,
                config: &self.config,
            })?;

            debug!(module = %header.module_name, "materialized module descriptor");
            Ok(descriptor)
        })
    }

    /// Whether the module descriptor has been materialized (or has failed).
    #[must_use]
    pub fn is_materialized(&self) -> bool {
        self.descriptor.is_complete()
    }

    /// How many times the container header was read. Never more than one.
    #[must_use]
    pub fn header_reads(&self) -> usize {
        self.header_reads.load(Ordering::Acquire)
    }

    fn header(&self) -> Result<&MetadataHeader> {
        self.header.get_or_compute(&self.library_name, || {
            let _span = tracing::debug_span!("load_header", library = %self.library_name).entered();
            self.header_reads.fetch_add(1, Ordering::AcqRel);
            self.reader.load_header(self.config.abi_version())
        })
    }
}

impl<D: ModuleDeserializer> std::fmt::Debug for LibraryImage<D> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LibraryImage")
            .field("library_name", &self.library_name)
            .field("header_loaded", &self.header.is_complete())
            .field("materialized", &self.descriptor.is_complete())
            .finish_non_exhaustive()
    }
}
