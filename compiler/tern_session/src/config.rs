//! Session configuration types and error definitions.

use std::fmt;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::{AbiVersion, ENV_ABI_VERSION, ENV_DEBUG_INFO, ENV_TARGET};

/// Debug information detail level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DebugLevel {
    /// No debug information.
    #[default]
    None,
    /// Compile unit, subprograms and locations; no type nodes.
    LineTablesOnly,
    /// Full debug information (types, locations, compile unit).
    Full,
}

impl DebugLevel {
    /// Check if debug info should be generated.
    #[must_use]
    pub fn is_enabled(self) -> bool {
        !matches!(self, Self::None)
    }

    /// Parse the value of `TERN_DEBUG_INFO`.
    fn parse_env(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "none" | "0" | "false" | "off" => Some(Self::None),
            "line-tables" | "line-tables-only" => Some(Self::LineTablesOnly),
            "full" | "1" | "true" | "on" => Some(Self::Full),
            _ => None,
        }
    }
}

impl fmt::Display for DebugLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::None => write!(f, "none"),
            Self::LineTablesOnly => write!(f, "line-tables"),
            Self::Full => write!(f, "full"),
        }
    }
}

/// Error type for configuration parsing.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// ABI version string could not be parsed.
    #[error("invalid ABI version '{value}': {reason}")]
    InvalidAbiVersion { value: String, reason: String },
    /// An environment override had an unrecognized value.
    #[error("invalid value '{value}' for environment variable {var}")]
    InvalidEnvValue { var: &'static str, value: String },
}

/// Configuration for one compilation session.
///
/// Consumed by library images (ABI version) and by the debug info header
/// builder (debug level, output path, target).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionConfig {
    /// ABI version used to decode library headers.
    abi_version: AbiVersion,
    /// Path of the produced output. Names the debug compile unit.
    output_path: Option<PathBuf>,
    /// Debug information detail level.
    debug_level: DebugLevel,
    /// Target triple (e.g., "x86_64-unknown-linux-gnu").
    target: String,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self::new(AbiVersion::CURRENT)
    }
}

impl SessionConfig {
    /// Create a new configuration reading libraries under `abi_version`.
    #[must_use]
    pub fn new(abi_version: AbiVersion) -> Self {
        Self {
            abi_version,
            output_path: None,
            debug_level: DebugLevel::None,
            target: "x86_64-unknown-linux-gnu".to_string(),
        }
    }

    /// Set the ABI version.
    #[must_use]
    pub fn with_abi_version(mut self, version: AbiVersion) -> Self {
        self.abi_version = version;
        self
    }

    /// Set the output path.
    #[must_use]
    pub fn with_output_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.output_path = Some(path.into());
        self
    }

    /// Clear the output path.
    #[must_use]
    pub fn without_output_path(mut self) -> Self {
        self.output_path = None;
        self
    }

    /// Set the debug level.
    #[must_use]
    pub fn with_debug_level(mut self, level: DebugLevel) -> Self {
        self.debug_level = level;
        self
    }

    /// Set the target triple.
    #[must_use]
    pub fn with_target(mut self, target: impl Into<String>) -> Self {
        self.target = target.into();
        self
    }

    /// Apply overrides from the process environment.
    pub fn apply_env(self) -> Result<Self, ConfigError> {
        self.apply_env_from(|var| std::env::var(var).ok())
    }

    /// Apply overrides from an arbitrary variable lookup.
    ///
    /// Unset variables leave the corresponding field untouched.
    pub fn apply_env_from(
        mut self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ConfigError> {
        if let Some(value) = lookup(ENV_ABI_VERSION) {
            self.abi_version = value.parse()?;
        }

        if let Some(value) = lookup(ENV_DEBUG_INFO) {
            self.debug_level =
                DebugLevel::parse_env(&value).ok_or(ConfigError::InvalidEnvValue {
                    var: ENV_DEBUG_INFO,
                    value,
                })?;
        }

        if let Some(value) = lookup(ENV_TARGET) {
            if value.trim().is_empty() {
                return Err(ConfigError::InvalidEnvValue {
                    var: ENV_TARGET,
                    value,
                });
            }
            self.target = value.trim().to_string();
        }

        Ok(self)
    }

    /// Get the ABI version used to decode library headers.
    #[must_use]
    pub fn abi_version(&self) -> AbiVersion {
        self.abi_version
    }

    /// Get the configured output path, if any.
    #[must_use]
    pub fn output_path(&self) -> Option<&Path> {
        self.output_path.as_deref()
    }

    /// Get the debug level.
    #[must_use]
    pub fn debug_level(&self) -> DebugLevel {
        self.debug_level
    }

    /// Check if debug info should be emitted for this session.
    #[must_use]
    pub fn debug_info_enabled(&self) -> bool {
        self.debug_level.is_enabled()
    }

    /// Get the target triple.
    #[must_use]
    pub fn target(&self) -> &str {
        &self.target
    }
}
