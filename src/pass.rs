use crate::buffer::GlyphBuffer;
use crate::error::BufferError;

/// A single traversal over the input stream of a [`GlyphBuffer`].
pub trait ShapingPass {
    /// Passes that only ever copy glyphs or replace them in place.
    ///
    /// Such a pass must never separate the output.
    const IN_PLACE: bool = false;

    /// Applies the pass at the input cursor.
    ///
    /// Returns `true` if input was consumed through the buffer's production
    /// operations. Returns `false` to leave the glyph alone, in which case
    /// it is copied to the output unchanged.
    fn apply(&mut self, buffer: &mut GlyphBuffer) -> Result<bool, BufferError>;
}

impl GlyphBuffer {
    /// Runs `pass` over the whole input stream and promotes its output to
    /// the new input.
    ///
    /// Returns whether the pass applied anywhere.
    pub fn run_pass<P: ShapingPass>(&mut self, pass: &mut P) -> Result<bool, BufferError> {
        self.rewind();

        let mut applied = false;
        while self.input_cursor() < self.input_len() {
            let idx = self.input_cursor();
            if pass.apply(self)? {
                assert!(self.input_cursor() > idx, "pass applied without consuming input");
                applied = true;
            } else {
                self.copy_current()?;
            }
        }

        if P::IN_PLACE {
            assert!(!self.is_separated(), "in-place pass separated the output");
        }

        self.swap();
        log::trace!("pass finished with {} glyphs (applied: {})", self.input_len(), applied);
        Ok(applied)
    }
}
