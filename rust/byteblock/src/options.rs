//! Options controlling how mapped file blocks open, flush and release their files.

/// Access-pattern hints passed to the file system when a file is opened.
///
/// Hints are advisory: they affect caching and durability behavior, never the
/// contents observed through a block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AccessHints {
    /// The file will be read front to back; enables aggressive read-ahead.
    pub sequential_scan: bool,
    /// Writes to the file handle go straight to stable storage.
    pub write_through: bool,
}

impl AccessHints {
    /// No hints at all; the platform defaults apply.
    pub const NONE: AccessHints = AccessHints {
        sequential_scan: false,
        write_through: false,
    };

    pub fn sequential_scan(mut self, value: bool) -> Self {
        self.sequential_scan = value;
        self
    }

    pub fn write_through(mut self, value: bool) -> Self {
        self.write_through = value;
        self
    }
}

impl Default for AccessHints {
    fn default() -> Self {
        AccessHints {
            sequential_scan: true,
            write_through: true,
        }
    }
}

/// How much work `flush()` does on a mapped file block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FlushMode {
    /// Write the dirty pages of the mapped view back to the file.
    ViewOnly,
    /// Write back the mapped view, then force the file data and metadata to
    /// stable storage.
    #[default]
    ViewAndFile,
}

/// Options for constructing a [`MappedFileBlock`](crate::MappedFileBlock).
#[derive(Debug, Clone, Default)]
pub struct MapOptions {
    pub hints: AccessHints,
    pub flush_mode: FlushMode,
    /// Map only the first [`MAX_REGION_LEN`](crate::MAX_REGION_LEN) bytes of a
    /// larger file instead of failing with `FileTooLarge`. Bytes past the
    /// boundary are not reachable through the block.
    pub allow_truncated_view: bool,
    /// Keep the file handle open after the block is disposed; retrieve it with
    /// [`MappedFileBlock::take_file`](crate::MappedFileBlock::take_file).
    pub leave_open: bool,
}

impl MapOptions {
    pub fn new() -> MapOptions {
        Default::default()
    }

    pub fn hints(mut self, hints: AccessHints) -> Self {
        self.hints = hints;
        self
    }

    pub fn flush_mode(mut self, flush_mode: FlushMode) -> Self {
        self.flush_mode = flush_mode;
        self
    }

    pub fn allow_truncated_view(mut self, value: bool) -> Self {
        self.allow_truncated_view = value;
        self
    }

    pub fn leave_open(mut self, value: bool) -> Self {
        self.leave_open = value;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let options = MapOptions::default();
        assert_eq!(options.hints, AccessHints::default());
        assert!(options.hints.sequential_scan);
        assert!(options.hints.write_through);
        assert_eq!(options.flush_mode, FlushMode::ViewAndFile);
        assert!(!options.allow_truncated_view);
        assert!(!options.leave_open);
    }

    #[test]
    fn test_setters() {
        let options = MapOptions::new()
            .hints(AccessHints::NONE.write_through(true))
            .flush_mode(FlushMode::ViewOnly)
            .allow_truncated_view(true)
            .leave_open(true);
        assert!(!options.hints.sequential_scan);
        assert!(options.hints.write_through);
        assert_eq!(options.flush_mode, FlushMode::ViewOnly);
        assert!(options.allow_truncated_view);
        assert!(options.leave_open);
    }
}
