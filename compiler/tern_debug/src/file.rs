//! Output path resolution for the compile unit.

use std::borrow::Cow;
use std::fmt;
use std::path::Path;

use tracing::warn;

/// A bare file name paired with its directory.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FileAndFolder {
    file: Cow<'static, str>,
    folder: Cow<'static, str>,
}

impl FileAndFolder {
    /// Placeholder for an unknown or absent source path. Renders as `-`.
    pub const NO_FILE: Self = Self {
        file: Cow::Borrowed("-"),
        folder: Cow::Borrowed(""),
    };

    /// Split `path` into file name and directory.
    ///
    /// A path without a parent lives in `.`. A path without a file name
    /// (`/`, `..`) resolves to [`Self::NO_FILE`].
    #[must_use]
    pub fn from_path(path: &Path) -> Self {
        let Some(file) = path.file_name() else {
            warn!(path = %path.display(), "output path has no file name");
            return Self::NO_FILE;
        };
        let folder = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_string_lossy().into_owned(),
            _ => ".".to_string(),
        };

        Self {
            file: Cow::Owned(file.to_string_lossy().into_owned()),
            folder: Cow::Owned(folder),
        }
    }

    /// Resolve an optional configured path, using the sentinel when absent.
    #[must_use]
    pub fn from_optional(path: Option<&Path>) -> Self {
        path.map_or(Self::NO_FILE, Self::from_path)
    }

    #[must_use]
    pub fn file(&self) -> &str {
        &self.file
    }

    /// Directory of the file. Empty for the sentinel.
    #[must_use]
    pub fn folder(&self) -> &str {
        &self.folder
    }

    #[must_use]
    pub fn is_no_file(&self) -> bool {
        self.folder.is_empty()
    }

    /// `folder/file`, or `-` for the sentinel.
    #[must_use]
    pub fn path(&self) -> String {
        if self.is_no_file() {
            self.file.to_string()
        } else {
            format!("{}/{}", self.folder, self.file)
        }
    }
}

impl fmt::Display for FileAndFolder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.path())
    }
}
