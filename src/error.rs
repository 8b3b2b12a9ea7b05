use alloc::collections::TryReserveError;

/// Errors returned by [`GlyphBuffer`](crate::GlyphBuffer) operations.
///
/// Capacity growth is the only thing that can fail. When it does, the
/// buffer is left exactly as it was before the call.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum BufferError {
    /// Storage for the requested number of glyphs could not be allocated.
    #[error("out of memory while growing glyph storage to {requested} items")]
    OutOfMemory {
        /// Glyph capacity that was requested.
        requested: usize,
    },
}

impl BufferError {
    pub(crate) fn out_of_memory(requested: usize, err: TryReserveError) -> Self {
        log::warn!("glyph storage allocation of {} items failed: {}", requested, err);
        BufferError::OutOfMemory { requested }
    }
}
