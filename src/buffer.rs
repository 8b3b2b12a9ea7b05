use alloc::vec::Vec;

use crate::error::BufferError;
use crate::glyph::{Assign, GlyphItem, GlyphPosition};
use crate::options::{BufferOptions, SecondaryGrowth};
use crate::Mask;

// Here is how the buffer works internally:
//
// There are two glyph storages, `primary` and `secondary`, and the output
// stream is a view onto one of them. The input stream always lives in
// `primary`.
//
// As long as a pass only copies glyphs or replaces them in place, the
// output view stays on `primary` and reads and writes go to the same
// memory. Copying is then a no-op and `swap` only exchanges lengths.
//
// As soon as a pass produces a different number of glyphs than it consumes,
// the output is moved over to `secondary` and the first `output_len`
// glyphs are copied along. `swap` then exchanges the two storages.
// `secondary` is not allocated until it is needed.

/// Each growth step adds half of the current capacity plus this many slots.
const GROWTH_STEP: usize = 8;

/// Storage currently backing the output stream.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Storage {
    Primary,
    Secondary,
}

/// How [`GlyphBuffer::replace_current`] writes the new glyph.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Replace {
    /// Rewrite the glyph id where it is. Keeps the buffer unseparated.
    InPlace,
    /// Produce the replacement into separate output, like
    /// [`GlyphBuffer::output_glyph`] with inherited component and ligature id.
    Separate,
}

/// A glyph buffer with an input and an output stream.
///
/// A shaping pass walks the input stream from start to end and, for every
/// glyph at the input cursor, calls one of the production operations
/// ([`copy_current`], [`replace_current`], [`produce_many`], ...). Once the
/// walk is finished, [`swap`] turns the output into the input of the next
/// pass.
///
/// [`copy_current`]: GlyphBuffer::copy_current
/// [`replace_current`]: GlyphBuffer::replace_current
/// [`produce_many`]: GlyphBuffer::produce_many
/// [`swap`]: GlyphBuffer::swap
pub struct GlyphBuffer {
    // Always `allocated` items long.
    primary: Vec<GlyphItem>,
    // Either empty (never used) or grown according to `secondary_growth`.
    // Always `allocated` items long while it backs the output.
    secondary: Vec<GlyphItem>,
    positions: Option<Vec<GlyphPosition>>,
    output: Storage,
    secondary_growth: SecondaryGrowth,

    input_len: usize,
    input_cursor: usize,
    output_len: usize,
    output_cursor: usize,

    max_ligature_id: u32,
}

impl GlyphBuffer {
    /// Creates a new empty `GlyphBuffer`. Does not allocate.
    pub fn new() -> Self {
        GlyphBuffer {
            primary: Vec::new(),
            secondary: Vec::new(),
            positions: None,
            output: Storage::Primary,
            secondary_growth: SecondaryGrowth::default(),
            input_len: 0,
            input_cursor: 0,
            output_len: 0,
            output_cursor: 0,
            max_ligature_id: 0,
        }
    }

    /// Creates a new `GlyphBuffer` configured by `options`.
    pub fn with_options(options: BufferOptions) -> Result<Self, BufferError> {
        let mut buffer = GlyphBuffer::new();
        buffer.secondary_growth = options.secondary_growth;
        buffer.ensure_capacity(options.initial_capacity)?;
        Ok(buffer)
    }

    /// Pre-allocate the buffer to hold at least `size` glyphs.
    #[inline]
    pub fn pre_allocate(&mut self, size: usize) -> Result<(), BufferError> {
        self.ensure_capacity(size)
    }

    /// Makes sure every allocated storage can hold at least `size` glyphs.
    ///
    /// Either all storages grow or, on failure, none of the buffer state
    /// changes.
    pub fn ensure_capacity(&mut self, size: usize) -> Result<(), BufferError> {
        self.grow(size, false)
    }

    /// Grows all storages to hold `size` glyphs. With `with_secondary`,
    /// secondary storage grows too, even when idle.
    fn grow(&mut self, size: usize, with_secondary: bool) -> Result<(), BufferError> {
        let allocated = self.allocated();
        if size <= allocated {
            return Ok(());
        }

        let mut new_allocated = allocated;
        while size > new_allocated {
            new_allocated = match new_allocated.checked_add(new_allocated / 2 + GROWTH_STEP) {
                Some(n) => n,
                None => {
                    log::warn!("glyph capacity of {} items overflows", size);
                    return Err(BufferError::OutOfMemory { requested: size });
                }
            };
        }

        let grow_secondary = with_secondary
            || self.is_separated()
            || (self.secondary_growth == SecondaryGrowth::Lockstep && !self.secondary.is_empty());

        // Reserve everything first, so that a failure leaves no storage resized.
        reserve(&mut self.primary, new_allocated, size)?;
        if grow_secondary {
            reserve(&mut self.secondary, new_allocated, size)?;
        }
        if let Some(positions) = &mut self.positions {
            reserve(positions, new_allocated, size)?;
        }

        self.primary.resize(new_allocated, GlyphItem::default());
        if grow_secondary {
            self.secondary.resize(new_allocated, GlyphItem::default());
        }
        if let Some(positions) = &mut self.positions {
            positions.resize(new_allocated, GlyphPosition::default());
        }

        log::trace!(
            "grew glyph storage {} -> {} (secondary: {}, positions: {})",
            allocated,
            new_allocated,
            grow_secondary,
            self.positions.is_some()
        );

        Ok(())
    }

    /// Moves the output stream onto secondary storage.
    ///
    /// The glyphs already written to the output are copied along. Does
    /// nothing when the output is separated already.
    pub fn enter_separated_mode(&mut self) -> Result<(), BufferError> {
        if self.is_separated() {
            return Ok(());
        }

        let allocated = self.allocated();
        reserve(&mut self.secondary, allocated, allocated)?;
        self.secondary.resize(allocated, GlyphItem::default());

        let len = self.output_len;
        self.secondary[..len].copy_from_slice(&self.primary[..len]);
        self.output = Storage::Secondary;

        log::debug!("separated output after {} glyphs", len);
        Ok(())
    }

    /// Appends a glyph to the input stream.
    ///
    /// Meant for populating the buffer before the first pass.
    pub fn append_input(&mut self, glyph_id: u32, flags: Mask, cluster: u32) -> Result<(), BufferError> {
        self.ensure_capacity(self.input_len + 1)?;
        self.primary[self.input_len] = GlyphItem::new(glyph_id, flags, cluster);
        self.input_len += 1;
        Ok(())
    }

    /// Copies the glyph at the input cursor to the output and advances
    /// both cursors.
    ///
    /// While the output is not separated this moves nothing.
    pub fn copy_current(&mut self) -> Result<(), BufferError> {
        assert!(self.input_cursor < self.input_len, "no input glyph left to copy");

        self.ensure_capacity(self.output_cursor + 1)?;

        match self.output {
            Storage::Primary => {
                if self.output_cursor != self.input_cursor {
                    self.primary[self.output_cursor] = self.primary[self.input_cursor];
                }
            }
            Storage::Secondary => {
                self.secondary[self.output_cursor] = self.primary[self.input_cursor];
            }
        }

        self.input_cursor += 1;
        self.output_cursor += 1;
        self.output_len = self.output_cursor;
        Ok(())
    }

    /// Consumes the glyph at the input cursor and outputs `glyph_id` in
    /// its place.
    pub fn replace_current(&mut self, glyph_id: u32, mode: Replace) -> Result<(), BufferError> {
        match mode {
            Replace::InPlace => {
                self.copy_current()?;
                let idx = self.output_cursor - 1;
                let item = &mut self.output_storage_mut()[idx];
                item.glyph_id = glyph_id;
                item.computed_class = None;
                Ok(())
            }
            Replace::Separate => self.output_glyph(glyph_id, Assign::Inherit, Assign::Inherit),
        }
    }

    /// Consumes one glyph and produces `glyph_id` into separate output.
    #[inline]
    pub fn output_glyph(
        &mut self,
        glyph_id: u32,
        component: Assign<u16>,
        ligature_id: Assign<u32>,
    ) -> Result<(), BufferError> {
        self.produce_many(1, &[glyph_id], component, ligature_id)
    }

    /// Consumes `num_consumed` input glyphs and produces `glyph_ids`.
    ///
    /// Every produced glyph takes its flags and cluster from the glyph at
    /// the input cursor. `component` and `ligature_id` are either inherited
    /// from that same glyph or set to the given value. The computed class
    /// of the produced glyphs is unknown.
    ///
    /// Always separates the output.
    pub fn produce_many(
        &mut self,
        num_consumed: usize,
        glyph_ids: &[u32],
        component: Assign<u16>,
        ligature_id: Assign<u32>,
    ) -> Result<(), BufferError> {
        assert!(self.input_cursor < self.input_len, "no input glyph left to consume");
        assert!(
            num_consumed <= self.input_len - self.input_cursor,
            "consuming {} glyphs with only {} left",
            num_consumed,
            self.input_len - self.input_cursor
        );

        // Secondary storage is needed right after, so it is grown along
        // with the rest, before anything is resized.
        self.grow(self.output_cursor + glyph_ids.len(), true)?;
        self.enter_separated_mode()?;

        let current = self.primary[self.input_cursor];
        let component = component.resolve(current.component);
        let ligature_id = ligature_id.resolve(current.ligature_id);

        let start = self.output_cursor;
        let out = &mut self.secondary[start..start + glyph_ids.len()];
        for (item, &glyph_id) in out.iter_mut().zip(glyph_ids) {
            *item = GlyphItem {
                glyph_id,
                input_flags: current.input_flags,
                cluster: current.cluster,
                component,
                ligature_id,
                computed_class: None,
            };
        }

        self.input_cursor += num_consumed;
        self.output_cursor += glyph_ids.len();
        self.output_len = self.output_cursor;
        Ok(())
    }

    /// Returns a ligature id never handed out before by this buffer.
    pub fn allocate_ligature_id(&mut self) -> u32 {
        assert!(self.max_ligature_id < u32::MAX, "ligature id space exhausted");
        self.max_ligature_id += 1;
        self.max_ligature_id
    }

    /// Discards the output and points the output view back at the input
    /// storage. Input glyphs and positions are left alone.
    pub fn reset_output(&mut self) {
        self.output_len = 0;
        self.output_cursor = 0;
        self.output = Storage::Primary;
    }

    /// Makes the output of the finished pass the input of the next one.
    ///
    /// When the output is separated, the storages trade places. Lengths
    /// and cursors of the two streams are exchanged in any case.
    pub fn swap(&mut self) {
        if self.is_separated() {
            debug_assert_eq!(self.primary.len(), self.secondary.len());
            core::mem::swap(&mut self.primary, &mut self.secondary);
            log::debug!("swapped glyph storages ({} glyphs)", self.output_len);
        }

        core::mem::swap(&mut self.input_len, &mut self.output_len);
        core::mem::swap(&mut self.input_cursor, &mut self.output_cursor);
    }

    /// Clears both streams, keeping the allocated storage.
    ///
    /// Ligature ids keep counting up from where they were.
    pub fn full_reset(&mut self) {
        self.input_len = 0;
        self.input_cursor = 0;
        self.reset_output();
    }

    /// Attaches position storage if needed and zeroes the positions of all
    /// input glyphs.
    pub fn ensure_positions(&mut self) -> Result<(), BufferError> {
        let len = self.input_len;
        let allocated = self.allocated();
        if self.positions.is_none() {
            let mut positions = Vec::new();
            reserve(&mut positions, allocated, allocated)?;
            positions.resize(allocated, GlyphPosition::default());
            self.positions = Some(positions);
        }

        if let Some(positions) = &mut self.positions {
            positions[..len].fill(bytemuck::Zeroable::zeroed());
        }

        Ok(())
    }

    pub(crate) fn rewind(&mut self) {
        self.input_cursor = 0;
        self.reset_output();
    }

    #[inline]
    fn output_storage(&self) -> &[GlyphItem] {
        match self.output {
            Storage::Primary => &self.primary,
            Storage::Secondary => &self.secondary,
        }
    }

    #[inline]
    fn output_storage_mut(&mut self) -> &mut [GlyphItem] {
        match self.output {
            Storage::Primary => &mut self.primary,
            Storage::Secondary => &mut self.secondary,
        }
    }

    /// Returns the number of glyphs in the input stream.
    #[inline]
    pub fn input_len(&self) -> usize {
        self.input_len
    }

    /// Returns the number of glyphs written to the output stream.
    #[inline]
    pub fn output_len(&self) -> usize {
        self.output_len
    }

    /// Index of the next input glyph to consume.
    #[inline]
    pub fn input_cursor(&self) -> usize {
        self.input_cursor
    }

    /// Index of the next output glyph to write.
    #[inline]
    pub fn output_cursor(&self) -> usize {
        self.output_cursor
    }

    /// Returns `true` if the input stream is empty.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.input_len == 0
    }

    /// Returns the number of glyphs every storage can hold.
    #[inline]
    pub fn allocated(&self) -> usize {
        self.primary.len()
    }

    /// Returns `true` if the output is backed by secondary storage.
    #[inline]
    pub fn is_separated(&self) -> bool {
        self.output == Storage::Secondary
    }

    /// Returns the most recently allocated ligature id, 0 if none.
    #[inline]
    pub fn max_ligature_id(&self) -> u32 {
        self.max_ligature_id
    }

    /// The input stream.
    #[inline]
    pub fn input(&self) -> &[GlyphItem] {
        &self.primary[..self.input_len]
    }

    /// The input stream, mutably.
    #[inline]
    pub fn input_mut(&mut self) -> &mut [GlyphItem] {
        &mut self.primary[..self.input_len]
    }

    /// The output stream.
    #[inline]
    pub fn output(&self) -> &[GlyphItem] {
        &self.output_storage()[..self.output_len]
    }

    /// Returns the input glyph at the cursor, if any is left.
    #[inline]
    pub fn cur(&self) -> Option<&GlyphItem> {
        self.input().get(self.input_cursor)
    }

    /// Returns the input glyph at the cursor mutably, if any is left.
    #[inline]
    pub fn cur_mut(&mut self) -> Option<&mut GlyphItem> {
        let idx = self.input_cursor;
        self.input_mut().get_mut(idx)
    }

    /// Positions of the input glyphs.
    ///
    /// Empty until [`ensure_positions`](GlyphBuffer::ensure_positions) is called.
    #[inline]
    pub fn positions(&self) -> &[GlyphPosition] {
        match &self.positions {
            Some(positions) => &positions[..self.input_len],
            None => &[],
        }
    }

    /// Positions of the input glyphs, mutably.
    #[inline]
    pub fn positions_mut(&mut self) -> &mut [GlyphPosition] {
        match &mut self.positions {
            Some(positions) => &mut positions[..self.input_len],
            None => &mut [],
        }
    }

    /// Positions of the input glyphs as raw bytes.
    #[inline]
    pub fn positions_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(self.positions())
    }
}

impl Default for GlyphBuffer {
    fn default() -> Self {
        GlyphBuffer::new()
    }
}

impl core::fmt::Debug for GlyphBuffer {
    fn fmt(&self, fmt: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        fmt.debug_struct("GlyphBuffer")
            .field("allocated", &self.allocated())
            .field("separated", &self.is_separated())
            .field("input_cursor", &self.input_cursor)
            .field("output_cursor", &self.output_cursor)
            .field("input", &self.input())
            .field("output", &self.output())
            .finish()
    }
}

/// Reserves room for `len` items in total without changing `vec`'s length.
fn reserve<T>(vec: &mut Vec<T>, len: usize, requested: usize) -> Result<(), BufferError> {
    if let Some(additional) = len.checked_sub(vec.len()) {
        #[cfg(test)]
        if additional > 0 && failpoint::reserve_fails() {
            return Err(BufferError::OutOfMemory { requested });
        }

        vec.try_reserve_exact(additional)
            .map_err(|err| BufferError::out_of_memory(requested, err))?;
    }

    Ok(())
}
