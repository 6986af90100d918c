//! Debug Info Header
//!
//! Emits, once per output, the metadata every later debug node hangs off:
//!
//! ```text
//! output path ──▶ FileAndFolder ──▶ module node
//!                                      │
//!                                      ▼
//!                              compile unit (language, file, dir, producer)
//!                                      │
//!                                      ▼
//! llvm.module.flags ◀── (2, "Dwarf Version", 2), (2, "Debug Info Version", 3)
//! ```
//!
//! The returned [`DebugInfo`] handle emits symbol-level nodes afterwards.

use rustc_hash::FxHashMap;
use tern_session::DebugLevel;
use tracing::{debug, trace, warn};

use crate::context::CompilationContext;
use crate::error::{DebugInfoError, Result};
use crate::file::FileAndFolder;
use crate::location::SourceLocator;
use crate::sink::{CompileUnitDesc, DebugMetadataSink, MetadataValue, NodeId, SubprogramDesc};
use crate::types::{map_type, SourceType, TypeDescriptor};

/// Emit the debug info header for the output configured in `ctx`.
///
/// Returns `Ok(None)` without touching the sink when debug info is disabled.
/// On failure the sink is rolled back to its state before the call.
///
/// # Errors
///
/// `HeaderAlreadyEmitted` on a second call for the same context, or any
/// error raised by the sink.
pub fn generate_debug_info_header<S: DebugMetadataSink>(
    ctx: &mut CompilationContext<S>,
) -> Result<Option<DebugInfo>> {
    if !ctx.should_contain_debug_info() {
        debug!("debug info disabled, no header emitted");
        return Ok(None);
    }
    if ctx.header_emitted() {
        return Err(DebugInfoError::HeaderAlreadyEmitted);
    }

    let source = FileAndFolder::from_optional(ctx.config().output_path());
    if source.is_no_file() {
        warn!("no output path configured, compile unit is anonymous");
    }

    let mark = ctx.sink().mark();
    match emit_header(ctx, source) {
        Ok(info) => {
            ctx.set_header_emitted();
            debug!(
                module = %info.source,
                compile_unit = %info.compile_unit,
                "emitted debug info header"
            );
            Ok(Some(info))
        }
        Err(err) => {
            ctx.sink_mut().rollback(mark);
            Err(err)
        }
    }
}

fn emit_header<S: DebugMetadataSink>(
    ctx: &mut CompilationContext<S>,
    source: FileAndFolder,
) -> Result<DebugInfo> {
    let constants = ctx.constants();
    let sink = ctx.sink_mut();

    let module = sink.create_module(&source.path())?;
    let compile_unit = sink.create_compile_unit(&CompileUnitDesc {
        language: constants.language,
        file: source.file(),
        directory: source.folder(),
        producer: &constants.producer,
        optimized: false,
        flags: "",
        runtime_version: constants.runtime_version,
    })?;

    let flags = [
        (constants.dwarf_version_key, constants.dwarf_version),
        (constants.debug_info_version_key, constants.debug_info_version),
    ]
    .into_iter()
    .map(|(key, value)| {
        sink.create_tuple(vec![
            MetadataValue::Int(constants.flag_behavior.tag()),
            MetadataValue::String(key.to_string()),
            MetadataValue::Int(u64::from(value)),
        ])
    })
    .collect::<Result<Vec<_>>>()?;

    for flag in flags {
        sink.add_named_metadata_operand(constants.flags_group, flag)?;
    }

    Ok(DebugInfo {
        module,
        compile_unit,
        source,
        types: FxHashMap::default(),
    })
}

/// Handle to the emitted header.
///
/// Use it with the context it was emitted into; created type nodes are
/// cached per descriptor name, which assumes one target layout.
#[derive(Debug, Clone)]
pub struct DebugInfo {
    module: NodeId,
    compile_unit: NodeId,
    source: FileAndFolder,
    types: FxHashMap<&'static str, NodeId>,
}

impl DebugInfo {
    /// The module node.
    #[must_use]
    pub fn module(&self) -> NodeId {
        self.module
    }

    /// The compile unit node, scope of every top-level symbol.
    #[must_use]
    pub fn compile_unit(&self) -> NodeId {
        self.compile_unit
    }

    /// The output the compile unit is named after.
    #[must_use]
    pub fn source(&self) -> &FileAndFolder {
        &self.source
    }

    /// Get or create the debug type node for `ty`.
    ///
    /// Returns `Ok(None)` at `LineTablesOnly`, which carries no type info.
    ///
    /// # Errors
    ///
    /// `NotYetImplemented` for types outside the mapped set; nothing is
    /// created in that case.
    pub fn basic_type<S: DebugMetadataSink>(
        &mut self,
        ctx: &mut CompilationContext<S>,
        ty: &SourceType,
    ) -> Result<Option<NodeId>> {
        if ctx.config().debug_level() != DebugLevel::Full {
            return Ok(None);
        }
        let descriptor = map_type(ty, ctx.layout())?;
        if let Some(&id) = self.types.get(descriptor.name()) {
            return Ok(Some(id));
        }

        let sink = ctx.sink_mut();
        let id = match descriptor {
            TypeDescriptor::Basic {
                name,
                size_in_bits,
                align_in_bits,
                encoding,
            } => sink.create_basic_type(name, size_in_bits, align_in_bits, encoding)?,
            TypeDescriptor::Pointer {
                name,
                size_in_bits,
                align_in_bits,
            } => sink.create_pointer_type(None, size_in_bits, align_in_bits, name)?,
        };

        trace!(ty = %ty, %id, "created debug type");
        self.types.insert(descriptor.name(), id);
        Ok(Some(id))
    }

    /// Create a subprogram in the compile unit, at the line of `offset`.
    pub fn subprogram<S: DebugMetadataSink>(
        &self,
        ctx: &mut CompilationContext<S>,
        locator: &SourceLocator<'_>,
        name: &str,
        linkage_name: Option<&str>,
        offset: i64,
    ) -> Result<NodeId> {
        ctx.sink_mut().create_subprogram(&SubprogramDesc {
            scope: self.compile_unit,
            name,
            linkage_name,
            line: locator.line(offset),
        })
    }

    /// Create a location for `offset` in `scope`.
    pub fn location<S: DebugMetadataSink>(
        &self,
        ctx: &mut CompilationContext<S>,
        locator: &SourceLocator<'_>,
        offset: i64,
        scope: NodeId,
    ) -> Result<NodeId> {
        ctx.sink_mut()
            .create_location(locator.line(offset), locator.column(offset), scope)
    }
}
