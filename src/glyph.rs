use ttf_parser::GlyphId;

use crate::Mask;

bitflags::bitflags! {
    /// Glyph properties computed by shaping passes.
    ///
    /// The class bits match the `IGNORE_*` bits of OpenType lookup flags,
    /// so a lookup can test them with a single mask.
    #[derive(Default, Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct GlyphPropsFlags: u16 {
        /// Base glyph.
        const BASE_GLYPH           = 0x0002;
        /// Ligature glyph.
        const LIGATURE             = 0x0004;
        /// Mark glyph.
        const MARK                 = 0x0008;
        /// All class bits.
        const CLASS_MASK           = Self::BASE_GLYPH.bits()
                                   | Self::LIGATURE.bits()
                                   | Self::MARK.bits();
        /// Mark attachment class, valid only together with `MARK`.
        const MARK_ATTACHMENT_TYPE = 0xFF00;
    }
}

impl GlyphPropsFlags {
    /// Returns the mark attachment class stored in the high byte.
    #[inline]
    pub fn mark_attachment_class(self) -> u8 {
        (self.bits() >> 8) as u8
    }
}

/// How a produced glyph gets its `component` or `ligature_id`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Assign<T> {
    /// Copy the value of the input glyph at the input cursor.
    Inherit,
    /// Use this value for every produced glyph.
    Literal(T),
}

impl<T: Copy> Assign<T> {
    #[inline]
    pub(crate) fn resolve(self, current: T) -> T {
        match self {
            Assign::Inherit => current,
            Assign::Literal(v) => v,
        }
    }
}

impl<T> From<T> for Assign<T> {
    #[inline]
    fn from(v: T) -> Self {
        Assign::Literal(v)
    }
}

/// A single glyph in either stream of a [`GlyphBuffer`](crate::GlyphBuffer).
#[derive(Clone, Copy, Default, PartialEq, Eq)]
pub struct GlyphItem {
    /// Font glyph index.
    pub glyph_id: u32,
    /// Flags carried over from tokenization. Never interpreted by the buffer.
    pub input_flags: Mask,
    /// Source text cluster this glyph renders.
    pub cluster: u32,
    /// Index among the siblings produced by decomposing one source glyph.
    pub component: u16,
    /// Ligature this glyph belongs to, 0 for none.
    pub ligature_id: u32,
    /// Glyph class, `None` until a pass computes it.
    pub computed_class: Option<GlyphPropsFlags>,
}

impl GlyphItem {
    pub(crate) fn new(glyph_id: u32, input_flags: Mask, cluster: u32) -> Self {
        GlyphItem {
            glyph_id,
            input_flags,
            cluster,
            component: 0,
            ligature_id: 0,
            computed_class: None,
        }
    }

    /// Returns the glyph index as a `ttf-parser` glyph id.
    ///
    /// Returns `None` for indices above `u16::MAX`, which no OpenType font
    /// can contain.
    #[inline]
    pub fn as_glyph(&self) -> Option<GlyphId> {
        u16::try_from(self.glyph_id).ok().map(GlyphId)
    }

    /// Returns `true` if the glyph is part of a ligature.
    #[inline]
    pub fn is_ligated(&self) -> bool {
        self.ligature_id != 0
    }

    /// Returns `true` if the glyph is known to be a mark.
    #[inline]
    pub fn is_mark(&self) -> bool {
        self.computed_class
            .map_or(false, |props| props.contains(GlyphPropsFlags::MARK))
    }
}

impl core::fmt::Debug for GlyphItem {
    fn fmt(&self, fmt: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        fmt.debug_struct("GlyphItem")
            .field("glyph_id", &self.glyph_id)
            .field("cluster", &self.cluster)
            .field("component", &self.component)
            .field("ligature_id", &self.ligature_id)
            .field("computed_class", &self.computed_class)
            .finish()
    }
}

/// `GlyphPosition` holds the positioning adjustments of one glyph in
/// both horizontal and vertical directions. All positions are relative
/// to the current point.
#[repr(C)]
#[derive(Clone, Copy, Default, Debug, PartialEq, Eq)]
pub struct GlyphPosition {
    /// How much the line advances after drawing this glyph when setting text in
    /// horizontal direction.
    pub x_advance: i32,
    /// How much the line advances after drawing this glyph when setting text in
    /// vertical direction.
    pub y_advance: i32,
    /// How much the glyph moves on the X-axis before drawing it, this should not
    /// affect how much the line advances.
    pub x_offset: i32,
    /// How much the glyph moves on the Y-axis before drawing it, this should
    /// not affect how much the line advances.
    pub y_offset: i32,
}

// Four `i32`s, no padding.
unsafe impl bytemuck::Zeroable for GlyphPosition {}
unsafe impl bytemuck::Pod for GlyphPosition {}
