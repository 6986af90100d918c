//! Debug Metadata Sink
//!
//! The code generator's artifact, seen from the debug info emitter: it
//! creates metadata nodes and attaches operands to named metadata groups.
//! [`MetadataModule`] is the in-memory artifact used by tests and by tooling
//! that serializes metadata on its own.
//!
//! Every sink supports [`mark`](DebugMetadataSink::mark) and
//! [`rollback`](DebugMetadataSink::rollback) so an emission that fails midway
//! leaves nothing behind.

use std::fmt;

use tracing::trace;

use crate::constants::DwarfLanguage;
use crate::error::{DebugInfoError, Result};
use crate::types::DwarfEncoding;

/// Handle to a node created by a sink.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(u32);

impl NodeId {
    #[must_use]
    pub const fn new(index: u32) -> Self {
        Self(index)
    }

    #[must_use]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "!{}", self.0)
    }
}

/// Sink state to roll back to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SinkMark {
    nodes: usize,
    operands: usize,
}

impl SinkMark {
    #[must_use]
    pub const fn new(nodes: usize, operands: usize) -> Self {
        Self { nodes, operands }
    }
}

/// Operand of a metadata tuple.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MetadataValue {
    Int(u64),
    String(String),
    Node(NodeId),
}

/// Fields of a compile unit node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CompileUnitDesc<'a> {
    pub language: DwarfLanguage,
    pub file: &'a str,
    pub directory: &'a str,
    pub producer: &'a str,
    pub optimized: bool,
    pub flags: &'a str,
    pub runtime_version: u32,
}

/// Fields of a subprogram node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubprogramDesc<'a> {
    pub scope: NodeId,
    pub name: &'a str,
    pub linkage_name: Option<&'a str>,
    /// 1-based line, or `-1` if unknown.
    pub line: i64,
}

/// Destination of debug metadata.
pub trait DebugMetadataSink {
    /// Create the node describing the output module.
    fn create_module(&mut self, name: &str) -> Result<NodeId>;

    fn create_compile_unit(&mut self, unit: &CompileUnitDesc<'_>) -> Result<NodeId>;

    fn create_basic_type(
        &mut self,
        name: &str,
        size_in_bits: u64,
        align_in_bits: u32,
        encoding: DwarfEncoding,
    ) -> Result<NodeId>;

    fn create_pointer_type(
        &mut self,
        pointee: Option<NodeId>,
        size_in_bits: u64,
        align_in_bits: u32,
        name: &str,
    ) -> Result<NodeId>;

    fn create_subprogram(&mut self, subprogram: &SubprogramDesc<'_>) -> Result<NodeId>;

    /// Create a source location. `-1` marks an unknown line or column.
    fn create_location(&mut self, line: i64, column: i64, scope: NodeId) -> Result<NodeId>;

    /// Create an anonymous tuple node.
    fn create_tuple(&mut self, operands: Vec<MetadataValue>) -> Result<NodeId>;

    /// Append `operand` to the named metadata group `group`, creating the
    /// group on first use.
    fn add_named_metadata_operand(&mut self, group: &str, operand: NodeId) -> Result<()>;

    /// Capture the current state.
    fn mark(&self) -> SinkMark;

    /// Discard every node and operand added since `mark`.
    fn rollback(&mut self, mark: SinkMark);
}

/// A metadata node of the in-memory artifact.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MetadataNode {
    Module {
        name: String,
    },
    CompileUnit {
        language: DwarfLanguage,
        file: String,
        directory: String,
        producer: String,
        optimized: bool,
        flags: String,
        runtime_version: u32,
    },
    BasicType {
        name: String,
        size_in_bits: u64,
        align_in_bits: u32,
        encoding: DwarfEncoding,
    },
    PointerType {
        pointee: Option<NodeId>,
        size_in_bits: u64,
        align_in_bits: u32,
        name: String,
    },
    Subprogram {
        scope: NodeId,
        name: String,
        linkage_name: Option<String>,
        line: i64,
    },
    Location {
        line: i64,
        column: i64,
        scope: NodeId,
    },
    Tuple(Vec<MetadataValue>),
}

impl MetadataNode {
    #[must_use]
    pub fn is_compile_unit(&self) -> bool {
        matches!(self, Self::CompileUnit { .. })
    }
}

/// A named metadata group and its operands, in insertion order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NamedMetadata {
    pub name: String,
    pub operands: Vec<NodeId>,
}

/// In-memory debug metadata artifact.
///
/// Rejects empty names, names containing NUL and references to nodes it
/// does not hold. Symbol-level nodes require a compile unit.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MetadataModule {
    nodes: Vec<MetadataNode>,
    named: Vec<NamedMetadata>,
    /// Group index of every operand, in the order they were added.
    journal: Vec<usize>,
}

impl MetadataModule {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of nodes.
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Whether no node or named metadata exists.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty() && self.named.is_empty()
    }

    #[must_use]
    pub fn node(&self, id: NodeId) -> Option<&MetadataNode> {
        self.nodes.get(id.index())
    }

    /// All nodes with their ids, in creation order.
    pub fn nodes(&self) -> impl Iterator<Item = (NodeId, &MetadataNode)> {
        self.nodes
            .iter()
            .enumerate()
            .map(|(i, node)| (NodeId(index_u32(i)), node))
    }

    /// Operands of the named group, if it exists.
    #[must_use]
    pub fn named_metadata(&self, group: &str) -> Option<&[NodeId]> {
        self.named
            .iter()
            .find(|named| named.name == group)
            .map(|named| named.operands.as_slice())
    }

    /// All named groups, in creation order.
    #[must_use]
    pub fn named_groups(&self) -> &[NamedMetadata] {
        &self.named
    }

    /// Number of compile unit nodes.
    #[must_use]
    pub fn compile_unit_count(&self) -> usize {
        self.nodes.iter().filter(|node| node.is_compile_unit()).count()
    }

    fn push(&mut self, node: MetadataNode) -> NodeId {
        let id = NodeId(index_u32(self.nodes.len()));
        trace!(%id, ?node, "metadata node");
        self.nodes.push(node);
        id
    }

    fn check_node(&self, id: NodeId, what: &str) -> Result<()> {
        if id.index() < self.nodes.len() {
            Ok(())
        } else {
            Err(DebugInfoError::rejected(what, format!("unknown node {id}")))
        }
    }

    fn require_compile_unit(&self) -> Result<()> {
        if self.nodes.iter().any(MetadataNode::is_compile_unit) {
            Ok(())
        } else {
            Err(DebugInfoError::MissingCompileUnit)
        }
    }
}

fn index_u32(index: usize) -> u32 {
    u32::try_from(index).unwrap_or(u32::MAX)
}

fn check_name(what: &str, name: &str) -> Result<()> {
    if name.is_empty() {
        return Err(DebugInfoError::rejected(what, "name is empty"));
    }
    check_text(what, name)
}

fn check_text(what: &str, text: &str) -> Result<()> {
    if text.contains('\0') {
        return Err(DebugInfoError::rejected(what, format!("'{}' contains NUL", text.escape_default())));
    }
    Ok(())
}

impl DebugMetadataSink for MetadataModule {
    fn create_module(&mut self, name: &str) -> Result<NodeId> {
        check_name("module name", name)?;
        Ok(self.push(MetadataNode::Module {
            name: name.to_string(),
        }))
    }

    fn create_compile_unit(&mut self, unit: &CompileUnitDesc<'_>) -> Result<NodeId> {
        check_name("compile unit file", unit.file)?;
        check_text("compile unit directory", unit.directory)?;
        check_text("compile unit producer", unit.producer)?;
        check_text("compile unit flags", unit.flags)?;
        Ok(self.push(MetadataNode::CompileUnit {
            language: unit.language,
            file: unit.file.to_string(),
            directory: unit.directory.to_string(),
            producer: unit.producer.to_string(),
            optimized: unit.optimized,
            flags: unit.flags.to_string(),
            runtime_version: unit.runtime_version,
        }))
    }

    fn create_basic_type(
        &mut self,
        name: &str,
        size_in_bits: u64,
        align_in_bits: u32,
        encoding: DwarfEncoding,
    ) -> Result<NodeId> {
        self.require_compile_unit()?;
        check_name("basic type name", name)?;
        Ok(self.push(MetadataNode::BasicType {
            name: name.to_string(),
            size_in_bits,
            align_in_bits,
            encoding,
        }))
    }

    fn create_pointer_type(
        &mut self,
        pointee: Option<NodeId>,
        size_in_bits: u64,
        align_in_bits: u32,
        name: &str,
    ) -> Result<NodeId> {
        self.require_compile_unit()?;
        check_name("pointer type name", name)?;
        if let Some(pointee) = pointee {
            self.check_node(pointee, "pointer type pointee")?;
        }
        Ok(self.push(MetadataNode::PointerType {
            pointee,
            size_in_bits,
            align_in_bits,
            name: name.to_string(),
        }))
    }

    fn create_subprogram(&mut self, subprogram: &SubprogramDesc<'_>) -> Result<NodeId> {
        self.require_compile_unit()?;
        check_name("subprogram name", subprogram.name)?;
        if let Some(linkage_name) = subprogram.linkage_name {
            check_name("subprogram linkage name", linkage_name)?;
        }
        self.check_node(subprogram.scope, "subprogram scope")?;
        Ok(self.push(MetadataNode::Subprogram {
            scope: subprogram.scope,
            name: subprogram.name.to_string(),
            linkage_name: subprogram.linkage_name.map(str::to_string),
            line: subprogram.line,
        }))
    }

    fn create_location(&mut self, line: i64, column: i64, scope: NodeId) -> Result<NodeId> {
        self.require_compile_unit()?;
        self.check_node(scope, "location scope")?;
        Ok(self.push(MetadataNode::Location { line, column, scope }))
    }

    fn create_tuple(&mut self, operands: Vec<MetadataValue>) -> Result<NodeId> {
        for operand in &operands {
            match operand {
                MetadataValue::String(text) => check_text("tuple operand", text)?,
                MetadataValue::Node(id) => self.check_node(*id, "tuple operand")?,
                MetadataValue::Int(_) => {}
            }
        }
        Ok(self.push(MetadataNode::Tuple(operands)))
    }

    fn add_named_metadata_operand(&mut self, group: &str, operand: NodeId) -> Result<()> {
        check_name("named metadata", group)?;
        self.check_node(operand, "named metadata operand")?;

        let index = match self.named.iter().position(|named| named.name == group) {
            Some(index) => index,
            None => {
                self.named.push(NamedMetadata {
                    name: group.to_string(),
                    operands: Vec::new(),
                });
                self.named.len() - 1
            }
        };
        self.named[index].operands.push(operand);
        self.journal.push(index);
        trace!(group, %operand, "named metadata operand");
        Ok(())
    }

    fn mark(&self) -> SinkMark {
        SinkMark::new(self.nodes.len(), self.journal.len())
    }

    fn rollback(&mut self, mark: SinkMark) {
        while self.journal.len() > mark.operands {
            let Some(index) = self.journal.pop() else {
                break;
            };
            if let Some(named) = self.named.get_mut(index) {
                named.operands.pop();
            }
        }
        // Groups are created on first operand, so an empty group is always
        // the most recently created one.
        while self.named.last().is_some_and(|named| named.operands.is_empty()) {
            self.named.pop();
        }
        self.nodes.truncate(mark.nodes);
    }
}
