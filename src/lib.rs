/*!
`glyphstream` is the glyph buffer underneath a text shaping engine.

Shaping passes read glyphs from the buffer's input stream and write the
result into its output stream. As long as a pass rewrites glyphs one for one,
both streams share the same storage and nothing is copied. The first time a
pass produces a different number of glyphs than it consumes, the output moves
to separate storage, and [`GlyphBuffer::swap`] later makes it the input of the
next pass.

```
use glyphstream::{Assign, GlyphBuffer};

let mut buffer = GlyphBuffer::new();
buffer.append_input(10, 0, 0)?;
buffer.append_input(11, 0, 1)?;

// Form a ligature out of both glyphs.
let lig_id = buffer.allocate_ligature_id();
buffer.produce_many(2, &[55], Assign::Inherit, Assign::Literal(lig_id))?;
buffer.swap();

assert_eq!(buffer.input_len(), 1);
assert_eq!(buffer.input()[0].glyph_id, 55);
# Ok::<(), glyphstream::BufferError>(())
```
*/

#![doc(html_root_url = "https://docs.rs/glyphstream/0.1.0")]
#![cfg_attr(not(any(feature = "std", test)), no_std)]
#![warn(missing_docs)]

extern crate alloc;

mod buffer;
mod error;
mod face;
mod glyph;
mod options;
mod pass;

pub use ttf_parser::GlyphId;

pub use crate::buffer::{GlyphBuffer, Replace};
pub use crate::error::BufferError;
pub use crate::face::GlyphClassifier;
pub use crate::glyph::{Assign, GlyphItem, GlyphPosition, GlyphPropsFlags};
pub use crate::options::{BufferOptions, SecondaryGrowth};
pub use crate::pass::ShapingPass;

/// Opaque per-glyph flags carried over from tokenization.
pub type Mask = u32;
