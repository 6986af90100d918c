//! Precompiled Library Images for the Tern Native Backend
//!
//! A previously compiled Tern module ships as a library container: a versioned
//! header (module name and table of contents) plus package fragments fetched
//! on demand. This crate reads those containers and exposes each one as a
//! [`LibraryImage`] whose module descriptor is materialized lazily and exactly
//! once, so separate compilation and cross-module linking never re-parse
//! source.
//!
//! # Key Types
//!
//! - [`ContainerReader`]: header and fragment reads against one library file
//! - [`ContainerWriter`]: produces library files
//! - [`LibraryImage`]: identity, bitcode paths, memoized module descriptor
//! - [`ModuleDeserializer`]: seam to the front end's module deserializer
//! - [`LibraryRegistry`]: one shared image per resolved dependency
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use tern_library::{LibraryImage, PackageIndexDeserializer};
//! use tern_session::SessionConfig;
//!
//! let config = Arc::new(SessionConfig::default());
//! let image = LibraryImage::open("libs/core.tlib", config, Arc::new(PackageIndexDeserializer))?;
//!
//! println!("module {}", image.module_name()?);
//! let module = image.module_descriptor()?;
//! for package in module.package_names() {
//!     println!("  package {package}");
//! }
//! # Ok::<(), tern_library::LibraryError>(())
//! ```
//!
//! # Debugging
//!
//! - `RUST_LOG=tern_library=debug` - header loads, materialization
//! - `RUST_LOG=tern_library=trace` - every fragment read

pub mod container;
pub mod deserializer;
pub mod error;
pub mod image;
pub mod once;
pub mod registry;

pub use container::{ContainerReader, ContainerWriter, MetadataHeader, TableOfContents};
pub use deserializer::{
    DeserializeRequest, FragmentLoader, FragmentSource, ModuleDescriptor, ModuleDeserializer,
    PackageFragment, PackageIndexDeserializer, PackageListing,
};
pub use error::{LibraryError, Result};
pub use image::LibraryImage;
pub use once::OnceCompute;
pub use registry::LibraryRegistry;
