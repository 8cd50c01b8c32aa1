//! Source locations attached to diagnostics and reference records.

use std::fmt;

pub use text_size::{TextRange, TextSize};

/// An interned identifier for a source file.
///
/// The path itself lives with whoever owns the file set; the resolution core
/// only carries the handle around.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Ord, PartialOrd)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FileId(pub u32);

impl FileId {
    #[inline]
    pub const fn new(id: u32) -> Self {
        Self(id)
    }
}

impl fmt::Debug for FileId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "FileId({})", self.0)
    }
}

/// A range inside a particular file.
#[derive(Copy, Clone, Eq, PartialEq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FileRange {
    pub file: FileId,
    pub range: TextRange,
}

impl FileRange {
    pub fn new(file: FileId, range: TextRange) -> Self {
        Self { file, range }
    }

    /// An empty range at offset zero, for synthetic positions.
    pub fn detached(file: FileId) -> Self {
        Self::new(file, TextRange::empty(TextSize::from(0)))
    }
}

impl fmt::Debug for FileRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:?}@{}..{}",
            self.file,
            u32::from(self.range.start()),
            u32::from(self.range.end())
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_range_debug() {
        let range = FileRange::new(
            FileId::new(3),
            TextRange::new(TextSize::from(4), TextSize::from(9)),
        );
        assert_eq!(format!("{:?}", range), "FileId(3)@4..9");
    }

    #[test]
    fn test_detached_range_is_empty() {
        assert!(FileRange::detached(FileId::new(0)).range.is_empty());
    }
}
