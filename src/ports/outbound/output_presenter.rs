use crate::shared::Result;

/// Sink for a finished document: stdout or a file on disk.
pub trait OutputPresenter {
    /// Writes `content` verbatim.
    ///
    /// # Errors
    /// File presenters fail on unsafe destinations (symlinks, missing parent
    /// directory) and on I/O errors.
    fn present(&self, content: &str) -> Result<()>;
}
