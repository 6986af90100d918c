//! Module deserializer seam.
//!
//! Turning a library's table of contents and package fragments into a module
//! descriptor is the front end's job. The image hands the deserializer a
//! [`DeserializeRequest`] and a [`FragmentSource`] bound to its container; the
//! deserializer pulls whichever fragments the table of contents references.

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tern_session::SessionConfig;
use tracing::trace;

use crate::container::{ContainerReader, TableOfContents};
use crate::error::{LibraryError, Result};

/// Supplies encoded package fragments by fully qualified name.
pub trait FragmentSource {
    /// Load the encoded fragment for `fq_name`.
    fn load_fragment(&self, fq_name: &str) -> Result<Vec<u8>>;
}

/// Fragment loader bound to one container reader.
#[derive(Debug, Clone, Copy)]
pub struct FragmentLoader<'a> {
    reader: &'a ContainerReader,
}

impl<'a> FragmentLoader<'a> {
    #[must_use]
    pub fn new(reader: &'a ContainerReader) -> Self {
        Self { reader }
    }
}

impl FragmentSource for FragmentLoader<'_> {
    fn load_fragment(&self, fq_name: &str) -> Result<Vec<u8>> {
        trace!(library = %self.reader.path().display(), fq_name, "fragment requested");
        self.reader.load_fragment(fq_name)
    }
}

/// Everything a deserializer needs to materialize one module.
#[derive(Clone, Copy)]
pub struct DeserializeRequest<'a> {
    /// Path of the library being materialized.
    pub library: &'a Path,
    /// Module name from the library header.
    pub module_name: &'a str,
    /// Table of contents from the library header.
    pub table_of_contents: &'a TableOfContents,
    /// On-demand access to the library's package fragments.
    pub fragments: &'a dyn FragmentSource,
    /// Active session configuration.
    pub config: &'a SessionConfig,
}

/// Builds a module descriptor from a library's header and fragments.
pub trait ModuleDeserializer: Send + Sync {
    /// The materialized module.
    type Descriptor: Send + Sync;

    /// Materialize the module described by `request`.
    ///
    /// Errors from the fragment source must be returned unchanged.
    fn deserialize(&self, request: DeserializeRequest<'_>) -> Result<Self::Descriptor>;
}

/// Table of contents understood by [`PackageIndexDeserializer`]: the list of
/// packages the library contributes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackageListing {
    pub packages: Vec<String>,
}

impl PackageListing {
    /// Encode the listing as raw table-of-contents bytes.
    pub fn encode(&self) -> std::result::Result<Vec<u8>, String> {
        bincode::serialize(self).map_err(|e| format!("failed to encode package listing: {e}"))
    }

    /// Decode a listing from raw table-of-contents bytes.
    pub fn decode(bytes: &[u8]) -> std::result::Result<Self, String> {
        bincode::deserialize(bytes).map_err(|e| format!("failed to decode package listing: {e}"))
    }
}

/// One package fragment of a materialized module.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageFragment {
    /// Fully qualified package name.
    pub fq_name: String,
    /// Encoded declarations, opaque at this layer.
    pub bytes: Vec<u8>,
}

/// Module materialized by [`PackageIndexDeserializer`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModuleDescriptor {
    /// Module name from the library header.
    pub name: String,
    /// Packages keyed by fully qualified name.
    pub packages: BTreeMap<String, PackageFragment>,
}

impl ModuleDescriptor {
    /// Look up a package by fully qualified name.
    #[must_use]
    pub fn package(&self, fq_name: &str) -> Option<&PackageFragment> {
        self.packages.get(fq_name)
    }

    /// Iterate package names in sorted order.
    pub fn package_names(&self) -> impl Iterator<Item = &str> {
        self.packages.keys().map(String::as_str)
    }
}

/// Deserializer whose table of contents is a [`PackageListing`].
///
/// Loads every listed fragment eagerly. A listed package missing from the
/// container fails with `FragmentNotFound`.
#[derive(Debug, Clone, Copy, Default)]
pub struct PackageIndexDeserializer;

impl ModuleDeserializer for PackageIndexDeserializer {
    type Descriptor = ModuleDescriptor;

    fn deserialize(&self, request: DeserializeRequest<'_>) -> Result<ModuleDescriptor> {
        let listing = PackageListing::decode(request.table_of_contents.as_bytes())
            .map_err(|message| LibraryError::corrupt(request.library, message))?;

        let mut packages = BTreeMap::new();
        for fq_name in listing.packages {
            let bytes = request.fragments.load_fragment(&fq_name)?;
            packages.insert(fq_name.clone(), PackageFragment { fq_name, bytes });
        }

        Ok(ModuleDescriptor {
            name: request.module_name.to_string(),
            packages,
        })
    }
}
