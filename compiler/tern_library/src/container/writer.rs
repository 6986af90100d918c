//! Producing library containers.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use tern_session::AbiVersion;
use tracing::debug;

use super::format::{ContainerIndex, FragmentEntry, Prefix};
use super::reader::TableOfContents;
use crate::deserializer::PackageListing;
use crate::error::{LibraryError, Result};

/// Builder for a library container.
///
/// Fragments are laid out in name order. Unless a table of contents is set
/// explicitly, the writer stores a [`PackageListing`] of all fragment names,
/// which is what [`PackageIndexDeserializer`](crate::PackageIndexDeserializer)
/// expects.
#[derive(Debug, Clone)]
pub struct ContainerWriter {
    module_name: String,
    abi_version: AbiVersion,
    table_of_contents: Option<Vec<u8>>,
    fragments: BTreeMap<String, Vec<u8>>,
}

impl ContainerWriter {
    /// Create a writer for `module_name` encoded under `abi_version`.
    #[must_use]
    pub fn new(module_name: impl Into<String>, abi_version: AbiVersion) -> Self {
        Self {
            module_name: module_name.into(),
            abi_version,
            table_of_contents: None,
            fragments: BTreeMap::new(),
        }
    }

    /// Add a package fragment. A later fragment with the same name replaces it.
    pub fn add_fragment(&mut self, fq_name: impl Into<String>, bytes: impl Into<Vec<u8>>) -> &mut Self {
        self.fragments.insert(fq_name.into(), bytes.into());
        self
    }

    /// Set a fragment and return the writer (builder style).
    #[must_use]
    pub fn with_fragment(mut self, fq_name: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        self.add_fragment(fq_name, bytes);
        self
    }

    /// Store `bytes` as the table of contents instead of the package listing.
    #[must_use]
    pub fn with_table_of_contents(mut self, bytes: impl Into<Vec<u8>>) -> Self {
        self.table_of_contents = Some(bytes.into());
        self
    }

    /// Encode the container.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let toc_bytes = match &self.table_of_contents {
            Some(bytes) => bytes.clone(),
            None => PackageListing {
                packages: self.fragments.keys().cloned().collect(),
            }
            .encode()
            .map_err(|message| self.encode_error(message))?,
        };

        let mut fragments = Vec::with_capacity(self.fragments.len());
        let mut offset = 0u64;
        for (fq_name, bytes) in &self.fragments {
            let len = bytes.len() as u64;
            fragments.push(FragmentEntry {
                fq_name: fq_name.clone(),
                offset,
                len,
            });
            offset += len;
        }

        let index = ContainerIndex {
            module_name: self.module_name.clone(),
            table_of_contents: TableOfContents::from_bytes(toc_bytes).encoded().to_string(),
            fragments,
        };
        let index_bytes = bincode::serialize(&index)
            .map_err(|e| self.encode_error(format!("failed to encode container index: {e}")))?;

        let prefix = Prefix {
            abi_version: self.abi_version,
            index_len: index_bytes.len() as u64,
        };

        let mut out = Vec::with_capacity(prefix.encode().len() + index_bytes.len() + offset as usize);
        out.extend_from_slice(&prefix.encode());
        out.extend_from_slice(&index_bytes);
        for bytes in self.fragments.values() {
            out.extend_from_slice(bytes);
        }
        Ok(out)
    }

    /// Encode the container and write it to `path`.
    pub fn write_to(&self, path: &Path) -> Result<()> {
        let bytes = self.to_bytes()?;
        fs::write(path, &bytes).map_err(|e| LibraryError::Io {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;

        debug!(
            library = %path.display(),
            module = %self.module_name,
            abi = %self.abi_version,
            fragments = self.fragments.len(),
            bytes = bytes.len(),
            "wrote library container"
        );
        Ok(())
    }

    fn encode_error(&self, message: String) -> LibraryError {
        LibraryError::Encode {
            module: self.module_name.clone(),
            message,
        }
    }
}
