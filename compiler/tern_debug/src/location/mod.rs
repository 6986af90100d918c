//! Source offsets to debug line and column numbers.
//!
//! The front end owns a per-file position index ([`LineIndex`]) that answers
//! 0-based line and column lookups. [`SourceLocator`] turns those into the
//! 1-based numbering debug formats use, with `-1` standing for an unknown
//! location.

/// 0-based position lookups over one source file.
pub trait LineIndex {
    /// 0-based line containing the character at `offset`.
    fn line_index(&self, offset: usize) -> usize;

    /// 0-based column of the character at `offset` within its line.
    fn column_index(&self, offset: usize) -> usize;
}

/// Line index over character offsets.
///
/// Pre-computes the offset where each line starts and binary searches it.
/// Offsets past the end of the text resolve to the end of the last line.
#[derive(Debug, Clone)]
pub struct LineMap {
    /// Character offsets where each line starts. `line_starts[0]` is always 0.
    line_starts: Vec<usize>,
    /// Length of the source in characters.
    len: usize,
}

impl LineMap {
    #[must_use]
    pub fn new(source: &str) -> Self {
        let mut line_starts = vec![0];
        let mut len = 0;
        for (i, c) in source.chars().enumerate() {
            if c == '\n' {
                line_starts.push(i + 1);
            }
            len = i + 1;
        }
        Self { line_starts, len }
    }

    /// 0-based `(line, column)` for a character offset.
    #[must_use]
    pub fn offset_to_line_col(&self, offset: usize) -> (usize, usize) {
        let offset = offset.min(self.len);
        let line = match self.line_starts.binary_search(&offset) {
            Ok(i) => i,
            Err(i) => i - 1,
        };
        (line, offset - self.line_starts[line])
    }

    #[must_use]
    pub fn line_count(&self) -> usize {
        self.line_starts.len()
    }

    /// Length of the source in characters.
    #[must_use]
    pub fn len(&self) -> usize {
        self.len
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

impl LineIndex for LineMap {
    fn line_index(&self, offset: usize) -> usize {
        self.offset_to_line_col(offset).0
    }

    fn column_index(&self, offset: usize) -> usize {
        self.offset_to_line_col(offset).1
    }
}

/// Translates source offsets into 1-based debug line and column numbers.
#[derive(Clone, Copy)]
pub struct SourceLocator<'a> {
    index: &'a dyn LineIndex,
}

impl<'a> SourceLocator<'a> {
    #[must_use]
    pub fn new(index: &'a dyn LineIndex) -> Self {
        Self { index }
    }

    /// 1-based line of `offset`, or `-1` if the offset is negative.
    #[must_use]
    pub fn line(&self, offset: i64) -> i64 {
        self.translate(offset, |index, offset| index.line_index(offset))
    }

    /// 1-based column of `offset`, or `-1` if the offset is negative.
    #[must_use]
    pub fn column(&self, offset: i64) -> i64 {
        self.translate(offset, |index, offset| index.column_index(offset))
    }

    fn translate(&self, offset: i64, converter: impl Fn(&dyn LineIndex, usize) -> usize) -> i64 {
        let Ok(offset) = usize::try_from(offset) else {
            return -1;
        };
        let index = converter(self.index, offset);
        i64::try_from(index).map_or(i64::MAX, |index| index.saturating_add(1))
    }
}

impl std::fmt::Debug for SourceLocator<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SourceLocator").finish_non_exhaustive()
    }
}
