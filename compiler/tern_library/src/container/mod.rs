//! Library Metadata Container
//!
//! A precompiled Tern library is a single file holding a header (module name
//! plus table of contents) and a set of package fragments addressed by fully
//! qualified package name.
//!
//! # Structure
//!
//! ```text
//! core.tlib
//! ├── prefix      magic, framing version, ABI version, index length
//! ├── index       module name, base64 table of contents, fragment ranges
//! └── payload     fragment bytes, back to back
//! ```
//!
//! The header is only readable under the exact ABI version the container was
//! written with. Fragments are fetched on demand and never cached here;
//! caching belongs to whoever deserializes them.

mod format;
mod reader;
mod writer;

pub use reader::{ContainerReader, MetadataHeader, TableOfContents};
pub use writer::ContainerWriter;

#[cfg(test)]
mod tests;
