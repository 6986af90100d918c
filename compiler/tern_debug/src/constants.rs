//! Fixed debug-format constants.
//!
//! The values every compile unit and version-flag block is built from. They
//! are fixed for the life of the process: [`DebugConstants::current`] builds
//! the record once and hands out a shared reference.

use std::fmt;
use std::sync::OnceLock;

/// Version of the compiler, as embedded in the producer string.
pub const COMPILER_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Version of the Tern language this compiler implements.
pub const LANGUAGE_VERSION: &str = "0.1";

/// Source language recorded in the compile unit.
///
/// Tern has no registered DWARF language code; C is the closest match for
/// debuggers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DwarfLanguage {
    /// `DW_LANG_C`
    C,
}

impl DwarfLanguage {
    /// The `DW_LANG_*` code.
    #[must_use]
    pub const fn code(self) -> u32 {
        match self {
            Self::C => 0x0002,
        }
    }
}

/// How a linker merges a module flag that appears in several inputs.
///
/// The tag is the first operand of every flag tuple.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FlagBehavior {
    Error,
    Warning,
    Require,
    Override,
    Append,
    AppendUnique,
    Max,
    Min,
}

impl FlagBehavior {
    #[must_use]
    pub const fn tag(self) -> u64 {
        match self {
            Self::Error => 1,
            Self::Warning => 2,
            Self::Require => 3,
            Self::Override => 4,
            Self::Append => 5,
            Self::AppendUnique => 6,
            Self::Max => 7,
            Self::Min => 8,
        }
    }
}

/// Immutable debug-format constants.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DebugConstants {
    /// Language id of every compile unit.
    pub language: DwarfLanguage,
    /// Producer string of every compile unit.
    pub producer: String,
    /// Runtime version of every compile unit.
    pub runtime_version: u32,
    /// Value of the "Dwarf Version" flag.
    pub dwarf_version: u32,
    /// Value of the "Debug Info Version" flag.
    pub debug_info_version: u32,
    pub dwarf_version_key: &'static str,
    pub debug_info_version_key: &'static str,
    /// Named metadata group holding the version flags.
    pub flags_group: &'static str,
    /// Merge behavior of the version flags.
    pub flag_behavior: FlagBehavior,
}

impl DebugConstants {
    /// Constants for the given compiler and language versions.
    #[must_use]
    pub fn with_versions(compiler_version: &str, language_version: &str) -> Self {
        Self {
            language: DwarfLanguage::C,
            producer: format!("ternc {compiler_version} / tern-language: {language_version}"),
            runtime_version: 2,
            dwarf_version: 2,
            debug_info_version: 3,
            dwarf_version_key: "Dwarf Version",
            debug_info_version_key: "Debug Info Version",
            flags_group: "llvm.module.flags",
            flag_behavior: FlagBehavior::Warning,
        }
    }

    /// The process-wide constants of this compiler build.
    #[must_use]
    pub fn current() -> &'static Self {
        static CURRENT: OnceLock<DebugConstants> = OnceLock::new();
        CURRENT.get_or_init(|| Self::with_versions(COMPILER_VERSION, LANGUAGE_VERSION))
    }
}

impl fmt::Display for DebugConstants {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} (DWARF {}, debug info {})",
            self.producer, self.dwarf_version, self.debug_info_version
        )
    }
}
