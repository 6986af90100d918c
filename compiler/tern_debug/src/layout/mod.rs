//! Target Type Widths
//!
//! Debug descriptors carry the size and alignment the target gives each
//! native type. [`TargetLayout`] is the query interface; [`DataLayout`]
//! answers it from an LLVM data layout string, either given directly or
//! derived from a target triple.
//!
//! ```text
//! e-m:e-p:64:64-i64:64-f80:128-n8:16:32:64-S128
//! │  │   │       │      │
//! │  │   │       │      └─ float alignment (abi[:pref])
//! │  │   │       └──────── integer alignment (abi[:pref])
//! │  │   └──────────────── pointer size:abi[:pref]
//! │  └──────────────────── mangling (ignored)
//! └─────────────────────── endianness
//! ```

mod triple;

pub use triple::TargetTriple;

use std::collections::BTreeMap;
use std::fmt;

use tracing::debug;

use crate::error::{DebugInfoError, Result};

/// Native machine types the debug info emitter asks about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NativeType {
    I1,
    I8,
    I16,
    I32,
    I64,
    F32,
    F64,
    Ptr,
}

impl fmt::Display for NativeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::I1 => "i1",
            Self::I8 => "i8",
            Self::I16 => "i16",
            Self::I32 => "i32",
            Self::I64 => "i64",
            Self::F32 => "f32",
            Self::F64 => "f64",
            Self::Ptr => "ptr",
        };
        f.write_str(name)
    }
}

/// Size and alignment of native types on one target.
pub trait TargetLayout {
    /// Size of `ty` in bits.
    fn size_in_bits(&self, ty: NativeType) -> u64;

    /// Preferred alignment of `ty` in bits.
    fn preferred_alignment_in_bits(&self, ty: NativeType) -> u32;
}

/// ABI and preferred alignment of one type width, in bits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Alignment {
    abi: u32,
    preferred: u32,
}

impl Alignment {
    const fn new(abi: u32, preferred: u32) -> Self {
        Self { abi, preferred }
    }
}

/// Target layout parsed from an LLVM data layout string.
///
/// Specifications the debug info emitter does not need (mangling, native
/// integer widths, stack alignment, non-default address spaces) are accepted
/// and ignored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataLayout {
    source: String,
    little_endian: bool,
    pointer_size: u32,
    pointer_align: Alignment,
    integers: BTreeMap<u32, Alignment>,
    floats: BTreeMap<u32, Alignment>,
}

impl Default for DataLayout {
    /// LLVM's defaults for an empty layout string.
    fn default() -> Self {
        Self {
            source: String::new(),
            little_endian: true,
            pointer_size: 64,
            pointer_align: Alignment::new(64, 64),
            integers: BTreeMap::from([
                (1, Alignment::new(8, 8)),
                (8, Alignment::new(8, 8)),
                (16, Alignment::new(16, 16)),
                (32, Alignment::new(32, 32)),
                (64, Alignment::new(32, 64)),
            ]),
            floats: BTreeMap::from([
                (16, Alignment::new(16, 16)),
                (32, Alignment::new(32, 32)),
                (64, Alignment::new(64, 64)),
                (128, Alignment::new(128, 128)),
            ]),
        }
    }
}

impl DataLayout {
    /// Parse a data layout string such as `e-m:e-p:64:64-i64:64-n8:16:32:64-S128`.
    pub fn parse(layout: &str) -> Result<Self> {
        let mut parsed = Self {
            source: layout.to_string(),
            ..Self::default()
        };
        if layout.is_empty() {
            return Ok(parsed);
        }

        for spec in layout.split('-') {
            parsed.apply(layout, spec)?;
        }
        Ok(parsed)
    }

    /// Layout of the given target triple.
    pub fn for_triple(triple: &str) -> Result<Self> {
        let target = TargetTriple::parse(triple)?;
        let mangling = target.mangling();

        let layout = match target.arch.as_str() {
            "x86_64" => format!(
                "e-{mangling}-p270:32:32-p271:32:32-p272:64:64-i64:64-i128:128-f80:128-n8:16:32:64-S128"
            ),
            "aarch64" | "arm64" if target.is_apple() => {
                format!("e-{mangling}-i64:64-i128:128-n32:64-S128")
            }
            "aarch64" => format!("e-{mangling}-i8:8:32-i16:16:32-i64:64-i128:128-n32:64-S128"),
            "i686" | "i386" => format!(
                "e-{mangling}-p:32:32-p270:32:32-p271:32:32-p272:64:64-i128:128-f64:32:64-f80:32-n8:16:32-S128"
            ),
            _ if target.is_wasm() => {
                let bits = target.pointer_width();
                format!("e-m:e-p:{bits}:{bits}-p10:8:8-p20:8:8-i64:64-n32:64-S128-ni:1:10:20")
            }
            arch => {
                return Err(DebugInfoError::invalid_layout(
                    triple,
                    format!("no known data layout for architecture '{arch}'"),
                ))
            }
        };

        debug!(triple, %layout, "resolved target data layout");
        Self::parse(&layout)
    }

    /// The string this layout was parsed from.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.source
    }

    #[must_use]
    pub fn is_little_endian(&self) -> bool {
        self.little_endian
    }

    /// ABI alignment of `ty` in bits.
    #[must_use]
    pub fn abi_alignment_in_bits(&self, ty: NativeType) -> u32 {
        self.alignment(ty).abi
    }

    fn apply(&mut self, layout: &str, spec: &str) -> Result<()> {
        let mut fields = spec.split(':');
        let head = fields.next().unwrap_or_default();
        let rest: Vec<&str> = fields.collect();

        match head.chars().next() {
            Some('e') if head == "e" => self.little_endian = true,
            Some('E') if head == "E" => self.little_endian = false,
            Some('p') => {
                let address_space = &head[1..];
                if !address_space.is_empty() && address_space != "0" {
                    // Only the default address space matters for debug info.
                    parse_bits(layout, address_space)?;
                    return Ok(());
                }
                let [size, abi, pref @ ..] = rest.as_slice() else {
                    return Err(DebugInfoError::invalid_layout(
                        layout,
                        format!("pointer specification '{spec}' needs size and alignment"),
                    ));
                };
                self.pointer_size = parse_bits(layout, size)?;
                self.pointer_align = parse_alignment(layout, abi, pref.first().copied())?;
            }
            Some(kind @ ('i' | 'f')) => {
                let width = parse_bits(layout, &head[1..])?;
                let [abi, pref @ ..] = rest.as_slice() else {
                    return Err(DebugInfoError::invalid_layout(
                        layout,
                        format!("specification '{spec}' needs an alignment"),
                    ));
                };
                let alignment = parse_alignment(layout, abi, pref.first().copied())?;
                let table = if kind == 'i' { &mut self.integers } else { &mut self.floats };
                table.insert(width, alignment);
            }
            Some('m' | 'n' | 'S' | 'a' | 'v' | 'A' | 'G' | 'P' | 'F') => {}
            _ => {
                return Err(DebugInfoError::invalid_layout(
                    layout,
                    format!("unknown specification '{spec}'"),
                ))
            }
        }
        Ok(())
    }

    fn alignment(&self, ty: NativeType) -> Alignment {
        match ty {
            NativeType::Ptr => self.pointer_align,
            NativeType::F32 => lookup(&self.floats, 32),
            NativeType::F64 => lookup(&self.floats, 64),
            _ => lookup(&self.integers, integer_width(ty)),
        }
    }
}

impl TargetLayout for DataLayout {
    fn size_in_bits(&self, ty: NativeType) -> u64 {
        match ty {
            NativeType::Ptr => u64::from(self.pointer_size),
            NativeType::F32 => 32,
            NativeType::F64 => 64,
            _ => u64::from(integer_width(ty)),
        }
    }

    fn preferred_alignment_in_bits(&self, ty: NativeType) -> u32 {
        self.alignment(ty).preferred
    }
}

impl fmt::Display for DataLayout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}

fn integer_width(ty: NativeType) -> u32 {
    match ty {
        NativeType::I1 => 1,
        NativeType::I8 => 8,
        NativeType::I16 => 16,
        NativeType::I32 => 32,
        NativeType::I64 | NativeType::F64 | NativeType::Ptr => 64,
        NativeType::F32 => 32,
    }
}

/// Exact width, else the next wider entry, else the widest.
fn lookup(table: &BTreeMap<u32, Alignment>, width: u32) -> Alignment {
    table
        .range(width..)
        .next()
        .or_else(|| table.iter().next_back())
        .map_or(Alignment::new(8, 8), |(_, alignment)| *alignment)
}

fn parse_bits(layout: &str, text: &str) -> Result<u32> {
    text.parse().map_err(|_| {
        DebugInfoError::invalid_layout(layout, format!("'{text}' is not a bit count"))
    })
}

fn parse_alignment(layout: &str, abi: &str, preferred: Option<&str>) -> Result<Alignment> {
    let abi = parse_bits(layout, abi)?;
    let preferred = preferred.map_or(Ok(abi), |pref| parse_bits(layout, pref))?;
    if preferred < abi {
        return Err(DebugInfoError::invalid_layout(
            layout,
            format!("preferred alignment {preferred} is below ABI alignment {abi}"),
        ));
    }
    Ok(Alignment::new(abi, preferred))
}
