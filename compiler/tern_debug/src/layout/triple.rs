//! Splitting a target triple into the parts that pick a data layout.

use std::fmt;

use crate::error::{DebugInfoError, Result};

/// A target triple such as `aarch64-unknown-linux-gnu`.
///
/// Only the architecture, vendor and OS select a layout; a trailing
/// environment is kept for display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetTriple {
    pub arch: String,
    pub vendor: String,
    pub os: String,
    pub env: Option<String>,
}

impl TargetTriple {
    pub fn parse(triple: &str) -> Result<Self> {
        let mut parts = triple.split('-');
        let (Some(arch), Some(vendor), Some(os)) = (parts.next(), parts.next(), parts.next())
        else {
            return Err(malformed(triple));
        };
        let env = parts.next();
        if [arch, vendor, os].iter().chain(env.iter()).any(|part| part.is_empty()) {
            return Err(malformed(triple));
        }

        Ok(Self {
            arch: arch.to_string(),
            vendor: vendor.to_string(),
            os: os.to_string(),
            env: env.map(str::to_string),
        })
    }

    /// `wasm32` or `wasm64`.
    #[must_use]
    pub fn is_wasm(&self) -> bool {
        self.arch.starts_with("wasm")
    }

    #[must_use]
    pub fn is_windows(&self) -> bool {
        self.os == "windows"
    }

    /// Any Apple vendor triple; the OS part may be `macos`, `ios` or `darwin`.
    #[must_use]
    pub fn is_apple(&self) -> bool {
        self.vendor == "apple"
    }

    /// Pointer width implied by the architecture name.
    #[must_use]
    pub fn pointer_width(&self) -> u32 {
        if self.arch.ends_with("32") || matches!(self.arch.as_str(), "i386" | "i686") {
            32
        } else {
            64
        }
    }

    pub(crate) fn mangling(&self) -> &'static str {
        if self.is_apple() {
            "m:o"
        } else if self.is_windows() && self.arch == "x86_64" {
            "m:w"
        } else {
            "m:e"
        }
    }
}

fn malformed(triple: &str) -> DebugInfoError {
    DebugInfoError::invalid_layout(
        triple,
        "expected a target triple <arch>-<vendor>-<os>[-<env>]",
    )
}

impl fmt::Display for TargetTriple {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}-{}", self.arch, self.vendor, self.os)?;
        match &self.env {
            Some(env) => write!(f, "-{env}"),
            None => Ok(()),
        }
    }
}
