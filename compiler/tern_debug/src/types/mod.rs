//! Source types to debug type descriptors.
//!
//! Mapping is a closed match: every recognized primitive gets a descriptor
//! sized by the target layout, references collapse to one opaque pointer
//! placeholder, and anything else is a hard `NotYetImplemented` error.

use std::fmt;

use crate::error::{DebugInfoError, Result};
use crate::layout::{NativeType, TargetLayout};

/// Primitive types of the Tern language.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PrimitiveKind {
    Byte,
    Short,
    Int,
    Long,
    Boolean,
    Float,
    Double,
}

impl PrimitiveKind {
    /// Every primitive kind.
    pub const ALL: [Self; 7] = [
        Self::Byte,
        Self::Short,
        Self::Int,
        Self::Long,
        Self::Boolean,
        Self::Float,
        Self::Double,
    ];

    /// Language-facing name, as shown by the debugger.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Byte => "Byte",
            Self::Short => "Short",
            Self::Int => "Int",
            Self::Long => "Long",
            Self::Boolean => "Boolean",
            Self::Float => "Float",
            Self::Double => "Double",
        }
    }

    /// Native type this primitive is lowered to.
    #[must_use]
    pub const fn native_type(self) -> NativeType {
        match self {
            Self::Byte => NativeType::I8,
            Self::Short => NativeType::I16,
            Self::Int => NativeType::I32,
            Self::Long => NativeType::I64,
            Self::Boolean => NativeType::I1,
            Self::Float => NativeType::F32,
            Self::Double => NativeType::F64,
        }
    }

    #[must_use]
    pub const fn encoding(self) -> DwarfEncoding {
        match self {
            Self::Byte | Self::Short | Self::Int | Self::Long => DwarfEncoding::Signed,
            Self::Boolean => DwarfEncoding::Boolean,
            Self::Float | Self::Double => DwarfEncoding::Float,
        }
    }
}

/// DWARF base type encoding (`DW_ATE_*`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DwarfEncoding {
    Boolean,
    Float,
    Signed,
}

impl DwarfEncoding {
    #[must_use]
    pub const fn code(self) -> u32 {
        match self {
            Self::Boolean => 0x02,
            Self::Float => 0x04,
            Self::Signed => 0x05,
        }
    }
}

/// A resolved source type, as handed over by the type checker.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum SourceType {
    Primitive(PrimitiveKind),
    /// A class instance type.
    Class { name: String, nullable: bool },
    /// The top reference type.
    Any { nullable: bool },
    /// An unsubstituted generic parameter.
    TypeParameter { name: String },
    /// A type the checker could not resolve.
    Error { printable: String },
}

impl fmt::Display for SourceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let nullable_suffix = |nullable: bool| if nullable { "?" } else { "" };
        match self {
            Self::Primitive(kind) => f.write_str(kind.name()),
            Self::Class { name, nullable } => write!(f, "{name}{}", nullable_suffix(*nullable)),
            Self::Any { nullable } => write!(f, "Any{}", nullable_suffix(*nullable)),
            Self::TypeParameter { name } => f.write_str(name),
            Self::Error { printable } => f.write_str(printable),
        }
    }
}

/// Name of the opaque pointer placeholder every reference type maps to.
pub const ANY_PLACEHOLDER_NAME: &str = "Any?";

/// Size and alignment of the opaque pointer placeholder.
pub const ANY_PLACEHOLDER_BITS: u64 = 64;

/// Debug type descriptor of one source type on one target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TypeDescriptor {
    /// A base type with a DWARF encoding.
    Basic {
        name: &'static str,
        size_in_bits: u64,
        align_in_bits: u32,
        encoding: DwarfEncoding,
    },
    /// An opaque pointer.
    Pointer {
        name: &'static str,
        size_in_bits: u64,
        align_in_bits: u32,
    },
}

impl TypeDescriptor {
    /// The placeholder for references: a 64-bit pointer named `Any?`.
    pub const ANY_PLACEHOLDER: Self = Self::Pointer {
        name: ANY_PLACEHOLDER_NAME,
        size_in_bits: ANY_PLACEHOLDER_BITS,
        align_in_bits: 64,
    };

    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Basic { name, .. } | Self::Pointer { name, .. } => *name,
        }
    }

    #[must_use]
    pub const fn size_in_bits(&self) -> u64 {
        match self {
            Self::Basic { size_in_bits, .. } | Self::Pointer { size_in_bits, .. } => *size_in_bits,
        }
    }

    #[must_use]
    pub const fn align_in_bits(&self) -> u32 {
        match self {
            Self::Basic { align_in_bits, .. } | Self::Pointer { align_in_bits, .. } => {
                *align_in_bits
            }
        }
    }
}

/// Map a source type to its debug descriptor on `layout`.
///
/// # Errors
///
/// Returns `NotYetImplemented` carrying the type's printable form for type
/// parameters and unresolved types.
pub fn map_type(ty: &SourceType, layout: &dyn TargetLayout) -> Result<TypeDescriptor> {
    match ty {
        SourceType::Primitive(kind) => {
            let native = kind.native_type();
            Ok(TypeDescriptor::Basic {
                name: kind.name(),
                size_in_bits: layout.size_in_bits(native),
                align_in_bits: layout.preferred_alignment_in_bits(native),
                encoding: kind.encoding(),
            })
        }
        SourceType::Class { .. } | SourceType::Any { .. } => Ok(TypeDescriptor::ANY_PLACEHOLDER),
        SourceType::TypeParameter { .. } | SourceType::Error { .. } => {
            Err(DebugInfoError::NotYetImplemented { ty: ty.to_string() })
        }
    }
}
