//! Debug Information for the Tern Native Backend
//!
//! Emits the debug metadata native debuggers read: one compile unit per
//! output, the version flags under `llvm.module.flags`, and per-symbol type,
//! subprogram and location nodes.
//!
//! # Architecture
//!
//! ```text
//! ┌────────────────┐     ┌─────────────────────────────┐     ┌────────────────────┐
//! │ SessionConfig  │────▶│ generate_debug_info_header  │────▶│ DebugMetadataSink  │
//! │ DebugConstants │     │  FileAndFolder, CompileUnit │     │ (MetadataModule or │
//! │ TargetLayout   │     └──────────────┬──────────────┘     │  code generator)   │
//! └────────────────┘                    ▼                    └────────────────────┘
//!                       DebugInfo: basic_type / subprogram / location
//! ```
//!
//! # Usage
//!
//! ```
//! use std::sync::Arc;
//! use tern_debug::{generate_debug_info_header, CompilationContext, MetadataModule};
//! use tern_debug::{PrimitiveKind, SourceType};
//! use tern_session::{AbiVersion, DebugLevel, SessionConfig};
//!
//! let config = SessionConfig::new(AbiVersion::CURRENT)
//!     .with_debug_level(DebugLevel::Full)
//!     .with_output_path("build/main.o");
//! let mut ctx = CompilationContext::for_target(Arc::new(config), MetadataModule::new())?;
//!
//! if let Some(mut info) = generate_debug_info_header(&mut ctx)? {
//!     info.basic_type(&mut ctx, &SourceType::Primitive(PrimitiveKind::Int))?;
//! }
//! assert_eq!(ctx.sink().compile_unit_count(), 1);
//! # Ok::<(), tern_debug::DebugInfoError>(())
//! ```
//!
//! # Debugging
//!
//! - `RUST_LOG=tern_debug=debug` - header emission, layout resolution
//! - `RUST_LOG=tern_debug=trace` - every metadata node

pub mod constants;
pub mod context;
pub mod error;
pub mod file;
pub mod header;
pub mod layout;
pub mod location;
pub mod sink;
pub mod types;

pub use constants::{DebugConstants, DwarfLanguage, FlagBehavior};
pub use context::CompilationContext;
pub use error::{DebugInfoError, Result};
pub use file::FileAndFolder;
pub use header::{generate_debug_info_header, DebugInfo};
pub use layout::{DataLayout, NativeType, TargetLayout, TargetTriple};
pub use location::{LineIndex, LineMap, SourceLocator};
pub use sink::{
    CompileUnitDesc, DebugMetadataSink, MetadataModule, MetadataNode, MetadataValue, NamedMetadata,
    NodeId, SinkMark, SubprogramDesc,
};
pub use types::{map_type, DwarfEncoding, PrimitiveKind, SourceType, TypeDescriptor};
