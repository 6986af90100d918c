//! On-disk framing of a library container.
//!
//! ```text
//! offset  size  field
//! 0       4     magic b"TNLB"
//! 4       2     framing version (u16 LE)
//! 6       2     reserved (0)
//! 8       12    ABI version: major, minor, patch (u32 LE each)
//! 20      8     index length N (u64 LE)
//! 28      N     bincode-encoded `ContainerIndex`
//! 28+N    ...   fragment payload region
//! ```
//!
//! The ABI version sits in the fixed prefix so it can be checked before the
//! index is decoded. An index written under another ABI may not decode at all,
//! and that must surface as a version mismatch rather than corruption.

use serde::{Deserialize, Serialize};
use tern_session::AbiVersion;

/// Magic bytes at the start of every container.
pub(crate) const MAGIC: [u8; 4] = *b"TNLB";

/// Version of the framing described above (not the ABI version).
pub(crate) const FRAMING_VERSION: u16 = 1;

/// Size of the fixed prefix in bytes.
pub(crate) const PREFIX_LEN: usize = 28;

/// Fixed-size prefix preceding the index.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Prefix {
    pub(crate) abi_version: AbiVersion,
    pub(crate) index_len: u64,
}

impl Prefix {
    pub(crate) fn encode(&self) -> [u8; PREFIX_LEN] {
        let mut out = [0u8; PREFIX_LEN];
        out[0..4].copy_from_slice(&MAGIC);
        out[4..6].copy_from_slice(&FRAMING_VERSION.to_le_bytes());
        out[8..12].copy_from_slice(&self.abi_version.major.to_le_bytes());
        out[12..16].copy_from_slice(&self.abi_version.minor.to_le_bytes());
        out[16..20].copy_from_slice(&self.abi_version.patch.to_le_bytes());
        out[20..28].copy_from_slice(&self.index_len.to_le_bytes());
        out
    }

    /// Decode the prefix. The error is a human-readable corruption reason.
    pub(crate) fn decode(bytes: &[u8; PREFIX_LEN]) -> Result<Self, String> {
        if bytes[0..4] != MAGIC {
            return Err(format!(
                "bad magic {:02x?}, expected {:02x?}",
                &bytes[0..4],
                MAGIC
            ));
        }

        let framing = u16::from_le_bytes([bytes[4], bytes[5]]);
        if framing != FRAMING_VERSION {
            return Err(format!(
                "unsupported container framing version {framing} (expected {FRAMING_VERSION})"
            ));
        }

        let word = |at: usize| u32::from_le_bytes([bytes[at], bytes[at + 1], bytes[at + 2], bytes[at + 3]]);
        let mut len = [0u8; 8];
        len.copy_from_slice(&bytes[20..28]);

        Ok(Self {
            abi_version: AbiVersion::new(word(8), word(12), word(16)),
            index_len: u64::from_le_bytes(len),
        })
    }
}

/// Index stored right after the prefix.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub(crate) struct ContainerIndex {
    /// Name of the module this library was compiled from.
    pub(crate) module_name: String,
    /// Base64-encoded table of contents, opaque to the container.
    pub(crate) table_of_contents: String,
    /// Package fragments, in the order they appear in the payload region.
    pub(crate) fragments: Vec<FragmentEntry>,
}

/// Location of one package fragment inside the payload region.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub(crate) struct FragmentEntry {
    /// Fully qualified package name.
    pub(crate) fq_name: String,
    /// Offset from the start of the payload region.
    pub(crate) offset: u64,
    /// Length in bytes.
    pub(crate) len: u64,
}

impl ContainerIndex {
    pub(crate) fn fragment(&self, fq_name: &str) -> Option<&FragmentEntry> {
        self.fragments.iter().find(|entry| entry.fq_name == fq_name)
    }
}
