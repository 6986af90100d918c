//! Reading headers and package fragments out of a library container.

use std::fs::File;
use std::io::{Read, Seek, SeekFrom};
use std::path::{Path, PathBuf};

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use tern_session::AbiVersion;
use tracing::{debug, trace};

use super::format::{ContainerIndex, Prefix, PREFIX_LEN};
use crate::error::{LibraryError, Result};

/// Decoded library header: module name plus table of contents.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetadataHeader {
    /// Name of the module the library was compiled from.
    pub module_name: String,
    /// Table of contents handed to the module deserializer.
    pub table_of_contents: TableOfContents,
}

/// Table of contents of a library, as stored (base64) and decoded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableOfContents {
    encoded: String,
    bytes: Vec<u8>,
}

impl TableOfContents {
    /// Decode a base64 table of contents.
    pub fn from_encoded(encoded: String) -> std::result::Result<Self, base64::DecodeError> {
        let bytes = STANDARD.decode(encoded.as_bytes())?;
        Ok(Self { encoded, bytes })
    }

    /// Encode raw table-of-contents bytes.
    #[must_use]
    pub fn from_bytes(bytes: Vec<u8>) -> Self {
        Self {
            encoded: STANDARD.encode(&bytes),
            bytes,
        }
    }

    /// The base64 form, exactly as stored in the container.
    #[must_use]
    pub fn encoded(&self) -> &str {
        &self.encoded
    }

    /// The decoded bytes.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }
}

/// Read-only view of one library container file.
///
/// Holds nothing but the path: every call opens the file and reads only the
/// bytes it needs, so readers can be shared freely across threads.
#[derive(Debug, Clone)]
pub struct ContainerReader {
    path: PathBuf,
}

impl ContainerReader {
    /// Create a reader for the container at `path`.
    ///
    /// Fails with `PathNotFound` if the file does not exist. Nothing is read.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        if !path.is_file() {
            return Err(LibraryError::PathNotFound { path });
        }
        Ok(Self { path })
    }

    /// Path of the container file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the module name and table of contents under `abi_version`.
    ///
    /// # Errors
    ///
    /// - `VersionMismatch` if the container was written under another ABI version.
    /// - `CorruptContainer` if the prefix, index or table of contents cannot be decoded.
    pub fn load_header(&self, abi_version: AbiVersion) -> Result<MetadataHeader> {
        let mut file = self.open_file()?;
        let prefix = self.read_prefix(&mut file)?;

        if prefix.abi_version != abi_version {
            return Err(LibraryError::VersionMismatch {
                path: self.path.clone(),
                expected: abi_version,
                found: prefix.abi_version,
            });
        }

        let index = self.read_index(&mut file, &prefix)?;
        let table_of_contents = TableOfContents::from_encoded(index.table_of_contents)
            .map_err(|e| {
                LibraryError::corrupt(&self.path, format!("table of contents is not base64: {e}"))
            })?;

        debug!(
            library = %self.path.display(),
            module = %index.module_name,
            abi = %abi_version,
            fragments = index.fragments.len(),
            "loaded library header"
        );

        Ok(MetadataHeader {
            module_name: index.module_name,
            table_of_contents,
        })
    }

    /// Load the encoded package fragment named `fq_name`.
    ///
    /// Not cached: each call reads the fragment from disk again.
    ///
    /// # Errors
    ///
    /// - `FragmentNotFound` if no package with that name is in the container.
    /// - `CorruptContainer` if the index cannot be decoded or the fragment lies
    ///   outside the file.
    pub fn load_fragment(&self, fq_name: &str) -> Result<Vec<u8>> {
        let mut file = self.open_file()?;
        let prefix = self.read_prefix(&mut file)?;
        let index = self.read_index(&mut file, &prefix)?;

        let Some(entry) = index.fragment(fq_name) else {
            return Err(LibraryError::FragmentNotFound {
                path: self.path.clone(),
                fq_name: fq_name.to_string(),
            });
        };

        let file_len = self.file_len(&file)?;
        let payload_start = PREFIX_LEN as u64 + prefix.index_len;
        let range = payload_start
            .checked_add(entry.offset)
            .and_then(|start| start.checked_add(entry.len).map(|end| (start, end)));
        let (start, end) = match range {
            Some((start, end)) if end <= file_len => (start, end),
            _ => {
                return Err(LibraryError::corrupt(
                    &self.path,
                    format!(
                        "fragment '{fq_name}' spans {}+{} bytes past the end of the payload",
                        entry.offset, entry.len
                    ),
                ))
            }
        };

        file.seek(SeekFrom::Start(start))
            .map_err(|e| LibraryError::from_io(&self.path, &e))?;
        let mut bytes = vec![0u8; (end - start) as usize];
        file.read_exact(&mut bytes)
            .map_err(|e| LibraryError::from_io(&self.path, &e))?;

        trace!(library = %self.path.display(), fq_name, len = bytes.len(), "loaded package fragment");
        Ok(bytes)
    }

    /// List the fully qualified names of all fragments, in container order.
    pub fn fragment_names(&self) -> Result<Vec<String>> {
        let mut file = self.open_file()?;
        let prefix = self.read_prefix(&mut file)?;
        let index = self.read_index(&mut file, &prefix)?;
        Ok(index
            .fragments
            .into_iter()
            .map(|entry| entry.fq_name)
            .collect())
    }

    /// Read only the ABI version the container was written under.
    pub fn abi_version(&self) -> Result<AbiVersion> {
        let mut file = self.open_file()?;
        Ok(self.read_prefix(&mut file)?.abi_version)
    }

    fn open_file(&self) -> Result<File> {
        File::open(&self.path).map_err(|e| LibraryError::from_io(&self.path, &e))
    }

    fn file_len(&self, file: &File) -> Result<u64> {
        file.metadata()
            .map(|meta| meta.len())
            .map_err(|e| LibraryError::from_io(&self.path, &e))
    }

    fn read_prefix(&self, file: &mut File) -> Result<Prefix> {
        let mut bytes = [0u8; PREFIX_LEN];
        file.read_exact(&mut bytes)
            .map_err(|e| LibraryError::from_io(&self.path, &e))?;
        Prefix::decode(&bytes).map_err(|message| LibraryError::corrupt(&self.path, message))
    }

    fn read_index(&self, file: &mut File, prefix: &Prefix) -> Result<ContainerIndex> {
        let available = self.file_len(file)?.saturating_sub(PREFIX_LEN as u64);
        if prefix.index_len > available {
            return Err(LibraryError::corrupt(
                &self.path,
                format!(
                    "index claims {} bytes but only {available} follow the prefix",
                    prefix.index_len
                ),
            ));
        }

        let mut bytes = vec![0u8; prefix.index_len as usize];
        file.read_exact(&mut bytes)
            .map_err(|e| LibraryError::from_io(&self.path, &e))?;
        bincode::deserialize(&bytes).map_err(|e| {
            LibraryError::corrupt(&self.path, format!("failed to decode container index: {e}"))
        })
    }
}
