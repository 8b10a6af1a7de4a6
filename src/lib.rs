//! Styled-text layout and rendering engine.
//!
//! velotype consumes strings carrying square-bracket markup (`[RED]`,
//! `[*]` bold, `[@Mono]` font switches, `[+name]` inline images, ...),
//! produces fully measured multi-line [`Layout`]s in which every visible
//! unit is a 64-bit packed glyph, and draws those layouts through the
//! [`QuadBatch`] trait as textured, tinted, optionally rotated quads —
//! with bold, oblique, underline, strikethrough, scripts, outlines, drop
//! shadow, glow, small caps, jostle, colored squiggles, box drawing, and
//! per-atlas inline images.
//!
//! The engine is deliberately GPU-agnostic: texture upload, shader
//! compilation, and batching live behind [`QuadBatch`] and [`TextureId`]
//! in the embedder. Fonts load from AngelCode `.fnt`, SadConsole `.font`,
//! and structured-JSON atlas descriptions, or from an in-memory
//! [`BitmapFontData`].
//!
//! # Example
//!
//! ```ignore
//! let font = velotype::load_fnt_file("assets/ui.fnt", |page| textures.get(page))?;
//! let mut layout = velotype::Layout::new();
//! layout.target_width = 480.0;
//! font.markup("[GREEN]ready[] — press [*]start[*]", &mut layout);
//! let mut batch = velotype::TextBatch::new(&mut sprite_batch);
//! font.draw_glyphs(&mut batch, &layout, 16.0, 300.0,
//!                  velotype::Align::Left, 0.0, 0.0, 0.0);
//! ```
//!
//! All methods are single-threaded and synchronous; see `DESIGN.md` for
//! the sharing and concurrency model.

pub mod color;
pub mod family;
pub mod font;
pub mod glyph;
pub mod layout;
mod markup;
pub mod render;
mod wrap;

pub use color::{ColorLookup, Palette};
pub use family::FontFamily;
pub use font::{
    load_fnt, load_fnt_file, load_sadconsole, load_structured, BitmapFontData, BitmapGlyph,
    DistanceFieldType, Font, FontError, GlyphRegion,
};
pub use glyph::{GlyphMode, PackedGlyph};
pub use layout::{Justify, Layout, Line};
pub use render::{Align, GlyphVertex, QuadBatch, ShaderId, TextBatch, TextureId};
pub use wrap::insert_zero_width_spaces_in_cjk;
