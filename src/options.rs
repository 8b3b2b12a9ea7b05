/// Growth policy for the secondary glyph storage while it is not backing
/// the output stream.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum SecondaryGrowth {
    /// Once allocated, secondary storage grows together with the primary
    /// storage, used or not, so entering separated mode never reallocates.
    #[default]
    Lockstep,
    /// Idle secondary storage is left alone and brought up to capacity the
    /// next time a pass enters separated mode.
    Lazy,
}

/// Construction options for a [`GlyphBuffer`](crate::GlyphBuffer).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct BufferOptions {
    /// Number of glyph slots to allocate up front.
    pub initial_capacity: usize,
    /// See [`SecondaryGrowth`].
    pub secondary_growth: SecondaryGrowth,
}

impl BufferOptions {
    /// Sets the initial capacity.
    pub fn initial_capacity(mut self, capacity: usize) -> Self {
        self.initial_capacity = capacity;
        self
    }

    /// Sets the secondary storage growth policy.
    pub fn secondary_growth(mut self, growth: SecondaryGrowth) -> Self {
        self.secondary_growth = growth;
        self
    }
}
