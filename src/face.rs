use ttf_parser::gdef::GlyphClass;
use ttf_parser::{Face, GlyphId};

use crate::buffer::GlyphBuffer;
use crate::glyph::GlyphPropsFlags;

/// A source of glyph classes, usually a font's GDEF table.
pub trait GlyphClassifier {
    /// Returns the class of `glyph`, or empty flags if it has none.
    fn glyph_props(&self, glyph: GlyphId) -> GlyphPropsFlags;
}

impl GlyphClassifier for ttf_parser::gdef::Table<'_> {
    fn glyph_props(&self, glyph: GlyphId) -> GlyphPropsFlags {
        match self.glyph_class(glyph) {
            Some(GlyphClass::Base) => GlyphPropsFlags::BASE_GLYPH,
            Some(GlyphClass::Ligature) => GlyphPropsFlags::LIGATURE,
            Some(GlyphClass::Mark) => {
                let class = self.glyph_mark_attachment_class(glyph);
                GlyphPropsFlags::from_bits_retain((class << 8) | GlyphPropsFlags::MARK.bits())
            }
            _ => GlyphPropsFlags::empty(),
        }
    }
}

impl GlyphClassifier for Face<'_> {
    fn glyph_props(&self, glyph: GlyphId) -> GlyphPropsFlags {
        match self.tables().gdef {
            Some(table) => table.glyph_props(glyph),
            None => GlyphPropsFlags::empty(),
        }
    }
}

impl GlyphBuffer {
    /// Computes the class of every input glyph that does not have one yet.
    ///
    /// Glyph ids that cannot exist in a font get empty flags.
    pub fn classify_input<C: GlyphClassifier + ?Sized>(&mut self, classifier: &C) {
        for item in self.input_mut() {
            if item.computed_class.is_none() {
                let props = match item.as_glyph() {
                    Some(glyph) => classifier.glyph_props(glyph),
                    None => GlyphPropsFlags::empty(),
                };
                item.computed_class = Some(props);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::glyph::Assign;

    // Glyphs from 100 up are marks.
    struct MarksFrom100;

    impl GlyphClassifier for MarksFrom100 {
        fn glyph_props(&self, glyph: GlyphId) -> GlyphPropsFlags {
            if glyph.0 >= 100 {
                GlyphPropsFlags::MARK
            } else {
                GlyphPropsFlags::BASE_GLYPH
            }
        }
    }

    #[test]
    fn classifies_only_unknown_glyphs() {
        let mut buffer = GlyphBuffer::new();
        buffer.append_input(1, 0, 0).unwrap();
        buffer.append_input(100, 0, 1).unwrap();
        buffer.input_mut()[0].computed_class = Some(GlyphPropsFlags::LIGATURE);

        buffer.classify_input(&MarksFrom100);

        assert_eq!(buffer.input()[0].computed_class, Some(GlyphPropsFlags::LIGATURE));
        assert_eq!(buffer.input()[1].computed_class, Some(GlyphPropsFlags::MARK));
        assert!(buffer.input()[1].is_mark());
    }

    // Marks only glyph 4464, which is 70000 truncated to 16 bits.
    struct MarksTruncated;

    impl GlyphClassifier for MarksTruncated {
        fn glyph_props(&self, glyph: GlyphId) -> GlyphPropsFlags {
            if glyph.0 == 4464 {
                GlyphPropsFlags::MARK
            } else {
                GlyphPropsFlags::BASE_GLYPH
            }
        }
    }

    #[test]
    fn glyph_ids_beyond_u16_are_not_looked_up() {
        let mut buffer = GlyphBuffer::new();
        buffer.append_input(70000, 0, 0).unwrap();
        buffer.append_input(4464, 0, 1).unwrap();

        buffer.classify_input(&MarksTruncated);

        assert_eq!(buffer.input()[0].computed_class, Some(GlyphPropsFlags::empty()));
        assert_eq!(buffer.input()[1].computed_class, Some(GlyphPropsFlags::MARK));
    }

    // GDEF 1.0 with a glyph class definition and a mark attachment class
    // definition, both in ClassDef format 2.
    //
    // glyph 1: base, 2: ligature, 3-4: mark, 5: component
    // glyph 4: mark attachment class 5
    fn gdef_data() -> Vec<u8> {
        let words: &[u16] = &[
            1, 0, // version 1.0
            12,   // glyphClassDefOffset
            0,    // attachListOffset
            0,    // ligCaretListOffset
            40,   // markAttachClassDefOffset
            // glyph class ClassDef at 12
            2, 4,
            1, 1, 1,
            2, 2, 2,
            3, 4, 3,
            5, 5, 4,
            // mark attachment ClassDef at 40
            2, 1,
            4, 4, 5,
        ];
        words.iter().flat_map(|w| w.to_be_bytes()).collect()
    }

    #[test]
    fn gdef_classes_map_to_props() {
        let data = gdef_data();
        let table = ttf_parser::gdef::Table::parse(&data).unwrap();

        assert_eq!(table.glyph_props(GlyphId(1)), GlyphPropsFlags::BASE_GLYPH);
        assert_eq!(table.glyph_props(GlyphId(2)), GlyphPropsFlags::LIGATURE);
        assert_eq!(table.glyph_props(GlyphId(3)), GlyphPropsFlags::MARK);

        let mark = table.glyph_props(GlyphId(4));
        assert!(mark.contains(GlyphPropsFlags::MARK));
        assert_eq!(mark.mark_attachment_class(), 5);
        assert_eq!(mark.bits(), (5 << 8) | GlyphPropsFlags::MARK.bits());

        // Component glyphs and unlisted glyphs have no class.
        assert_eq!(table.glyph_props(GlyphId(5)), GlyphPropsFlags::empty());
        assert_eq!(table.glyph_props(GlyphId(9)), GlyphPropsFlags::empty());
    }

    #[test]
    fn classify_input_with_gdef() {
        let data = gdef_data();
        let table = ttf_parser::gdef::Table::parse(&data).unwrap();

        let mut buffer = GlyphBuffer::new();
        for (cluster, glyph) in [1, 2, 4, 9].into_iter().enumerate() {
            buffer.append_input(glyph, 0, cluster as u32).unwrap();
        }
        buffer.classify_input(&table);

        let classes: Vec<_> = buffer.input().iter().map(|g| g.computed_class).collect();
        assert_eq!(
            classes,
            [
                Some(GlyphPropsFlags::BASE_GLYPH),
                Some(GlyphPropsFlags::LIGATURE),
                Some(GlyphPropsFlags::from_bits_retain(0x0508)),
                Some(GlyphPropsFlags::empty()),
            ]
        );
        assert!(buffer.input()[2].is_mark());
    }

    #[test]
    fn produced_glyphs_need_classifying_again() {
        let mut buffer = GlyphBuffer::new();
        buffer.append_input(1, 0, 0).unwrap();
        buffer.classify_input(&MarksFrom100);

        buffer.produce_many(1, &[101], Assign::Inherit, Assign::Inherit).unwrap();
        buffer.swap();
        assert_eq!(buffer.input()[0].computed_class, None);

        buffer.classify_input(&MarksFrom100);
        assert_eq!(buffer.input()[0].computed_class, Some(GlyphPropsFlags::MARK));
    }
}
