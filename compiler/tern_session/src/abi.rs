//! Serialization ABI version of precompiled library metadata.

use std::fmt;
use std::str::FromStr;

use crate::ConfigError;

/// ABI version a library header and its fragments are encoded under.
///
/// Versions are compared exactly: a reader configured for `1.4.0` refuses a
/// container written for `1.4.1`. There is no negotiation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct AbiVersion {
    pub major: u32,
    pub minor: u32,
    pub patch: u32,
}

impl AbiVersion {
    /// ABI version written and expected by this compiler build.
    pub const CURRENT: Self = Self::new(1, 0, 0);

    #[must_use]
    pub const fn new(major: u32, minor: u32, patch: u32) -> Self {
        Self {
            major,
            minor,
            patch,
        }
    }
}

impl Default for AbiVersion {
    fn default() -> Self {
        Self::CURRENT
    }
}

impl fmt::Display for AbiVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)
    }
}

impl FromStr for AbiVersion {
    type Err = ConfigError;

    /// Parse `major.minor.patch`, `major.minor` or a bare `major`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = |reason: &str| ConfigError::InvalidAbiVersion {
            value: s.to_string(),
            reason: reason.to_string(),
        };

        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(invalid("empty version"));
        }

        let mut parts = [0u32; 3];
        let mut count = 0;
        for component in trimmed.split('.') {
            if count == parts.len() {
                return Err(invalid("expected at most 3 components"));
            }
            parts[count] = component
                .parse()
                .map_err(|_| invalid("components must be unsigned integers"))?;
            count += 1;
        }

        Ok(Self::new(parts[0], parts[1], parts[2]))
    }
}
