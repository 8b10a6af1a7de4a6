// Font data model: glyph regions, metrics, distance-field state, effect
// colors, and the shared-map machinery behind cheap font copies.

mod bmfont;
mod sadconsole;
mod structured;

pub use bmfont::{load_fnt, load_fnt_file};
pub use sadconsole::load_sadconsole;
pub use structured::load_structured;

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::{Arc, RwLock};

use crate::family::FontFamily;
use crate::glyph::{self, GlyphMode, PackedGlyph, SUPERSCRIPT};
use crate::render::{QuadBatch, ShaderId, TextureId};

/// First codepoint of the private-use range used for atlas entries.
pub const PRIVATE_USE_START: u32 = 0xE000;
/// One past the last private-use codepoint available to atlas entries.
pub const PRIVATE_USE_END: u32 = 0xF800;
/// Default solid-block codepoint (FULL BLOCK).
pub const SOLID_BLOCK: u32 = 0x2588;

/// Errors surfaced by font constructors and loaders. Rendering and markup
/// never fail; only building a `Font` can.
#[derive(Debug, thiserror::Error)]
pub enum FontError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("{0}")]
    Parse(String),

    #[error("font defines no space glyph (U+0020)")]
    MissingSpaceGlyph,

    #[error("unsupported font format: {0}")]
    UnsupportedFormat(String),
}

/// Which shader path a font's textures require.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DistanceFieldType {
    /// Plain bitmap pages; no smoothing uniform.
    #[default]
    Standard,
    /// Single-channel signed distance field (alpha channel).
    Sdf,
    /// Multi-channel signed distance field (RGB).
    Msdf,
    /// SDF with a baked outline band.
    SdfOutline,
}

/// A rectangle in some texture plus the placement metrics layout needs.
///
/// `offset_x == NaN` marks a box-drawing/block glyph: the renderer ignores
/// the region's texels and composes the shape from solid-block rectangles.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GlyphRegion {
    pub texture: TextureId,
    /// Normalized texture coordinates of the region corners.
    pub u: f32,
    pub v: f32,
    pub u2: f32,
    pub v2: f32,
    /// Position correction from whitespace trimming during packing.
    pub offset_x: f32,
    pub offset_y: f32,
    /// Horizontal cursor step in unscaled units.
    pub x_advance: f32,
    /// Region size in unscaled units.
    pub width: f32,
    pub height: f32,
}

impl GlyphRegion {
    /// A zero-size region on the given texture.
    pub fn empty(texture: TextureId) -> Self {
        GlyphRegion {
            texture,
            u: 0.0,
            v: 0.0,
            u2: 0.0,
            v2: 0.0,
            offset_x: 0.0,
            offset_y: 0.0,
            x_advance: 0.0,
            width: 0.0,
            height: 0.0,
        }
    }

    /// Larger of width and height; sizes inline images to the line height.
    #[inline]
    pub fn max_dimension(&self) -> f32 {
        self.width.max(self.height)
    }

    /// True when this glyph renders through the block-sequence path.
    #[inline]
    pub fn is_block_sequence(&self) -> bool {
        self.offset_x.is_nan()
    }
}

/// The four large maps a font may share with shallow copies of itself.
#[derive(Debug, Default, Clone)]
pub(crate) struct FontMaps {
    pub mapping: HashMap<u32, GlyphRegion>,
    pub kerning: Option<HashMap<u32, f32>>,
    /// Lowercased atlas-entry names to private-use codepoints.
    pub name_lookup: HashMap<String, u32>,
    /// Reverse of `name_lookup`, preserving the original spelling.
    pub names_by_code: HashMap<u32, String>,
    /// Named formatting states saved by `[(label)]` markup.
    pub stored_states: HashMap<String, PackedGlyph>,
}

/// In-memory bitmap-font description for [`Font::from_bitmap_data`]:
/// the already-parsed equivalent of a `.fnt` file.
#[derive(Debug, Clone, Default)]
pub struct BitmapFontData {
    pub line_height: f32,
    pub descent: f32,
    pub glyphs: Vec<BitmapGlyph>,
    /// `(first, second, amount)` kerning triples.
    pub kerning: Vec<(u16, u16, f32)>,
}

/// One glyph record of [`BitmapFontData`]. UVs are normalized.
#[derive(Debug, Clone, Copy)]
pub struct BitmapGlyph {
    pub codepoint: u32,
    pub texture: TextureId,
    pub u: f32,
    pub v: f32,
    pub u2: f32,
    pub v2: f32,
    pub offset_x: f32,
    pub offset_y: f32,
    pub x_advance: f32,
    pub width: f32,
    pub height: f32,
}

/// A bitmap or distance-field font: sparse codepoint → region mapping,
/// metrics, effect colors, and the knobs the renderer reads.
///
/// Fonts are single-threaded objects (see the crate docs); the `RwLock`
/// around the maps exists for shallow-copy sharing, not concurrency.
#[derive(Debug)]
pub struct Font {
    maps: Arc<RwLock<FontMaps>>,
    sharing: bool,

    // ── Metrics ─────────────────────────────────────────────────────
    pub cell_width: f32,
    pub cell_height: f32,
    pub original_cell_width: f32,
    pub original_cell_height: f32,
    pub scale_x: f32,
    pub scale_y: f32,
    /// Distance from baseline to the bottom of the cell; usually negative.
    pub descent: f32,

    // ── Distance field ──────────────────────────────────────────────
    pub distance_field: DistanceFieldType,
    /// Persistent crispness multiplier, kept across resizes.
    pub distance_field_crispness: f32,
    /// Working crispness, recomputed by [`Font::resize_distance_field`].
    pub actual_crispness: f32,
    /// Shader the embedder compiled for this font's field type, if any.
    pub shader: Option<ShaderId>,

    // ── Effect colors (RGBA8888) ────────────────────────────────────
    pub black_color: u32,
    pub white_color: u32,
    pub error_color: u32,
    pub context_color: u32,
    pub warn_color: u32,
    pub suggest_color: u32,
    pub note_color: u32,
    pub halo_color: u32,
    pub shadow_color: u32,
    pub shine_color: u32,

    // ── Zen metrics: fractions of cell width/height ─────────────────
    pub under_x: f32,
    pub under_y: f32,
    pub under_length: f32,
    pub under_breadth: f32,
    pub strike_x: f32,
    pub strike_y: f32,
    pub strike_length: f32,
    pub strike_breadth: f32,
    pub fancy_x: f32,
    pub fancy_y: f32,

    // ── Strengths and offsets ───────────────────────────────────────
    pub bold_strength: f32,
    pub oblique_strength: f32,
    pub outline_strength: f32,
    pub glow_strength: f32,
    pub drop_shadow_offset: [f32; 2],
    pub box_drawing_breadth: f32,
    pub inline_image_offset_x: f32,
    pub inline_image_offset_y: f32,
    pub inline_image_x_advance: f32,
    pub inline_image_stretch: f32,

    // ── Flags ───────────────────────────────────────────────────────
    pub is_mono: bool,
    pub integer_position: bool,
    pub omit_curly_braces: bool,
    pub enable_square_brackets: bool,

    /// Codepoint of the 1x1 white region used for bars, backgrounds, and
    /// composed box-drawing glyphs.
    pub solid_block: u32,

    pub(crate) family: Option<FontFamily>,
    pub(crate) next_private_use: u32,
}

impl Font {
    /// An empty font with the given cell metrics. Loaders fill the mapping
    /// and then call [`Font::finish_setup`].
    pub fn new(cell_width: f32, cell_height: f32) -> Font {
        Font {
            maps: Arc::new(RwLock::new(FontMaps::default())),
            sharing: false,
            cell_width,
            cell_height,
            original_cell_width: cell_width,
            original_cell_height: cell_height,
            scale_x: 1.0,
            scale_y: 1.0,
            descent: -cell_height * 0.25,
            distance_field: DistanceFieldType::Standard,
            distance_field_crispness: 1.0,
            actual_crispness: 1.0,
            shader: None,
            black_color: 0x0000_00FF,
            white_color: 0xFFFF_FFFF,
            error_color: 0xFF00_00FF,
            context_color: 0x22A2_22FF,
            warn_color: 0xFFD5_10FF,
            suggest_color: 0x9999_99FF,
            note_color: 0x3088_B8FF,
            halo_color: 0xFEF0_C060,
            shadow_color: 0x0000_007F,
            shine_color: 0xFFFF_FFFF,
            under_x: 0.0,
            under_y: 0.0,
            under_length: 0.0,
            under_breadth: 0.0,
            strike_x: 0.0,
            strike_y: 0.0,
            strike_length: 0.0,
            strike_breadth: 0.0,
            fancy_x: 0.0,
            fancy_y: 0.0,
            bold_strength: 1.0,
            oblique_strength: 1.0,
            outline_strength: 1.0,
            glow_strength: 1.0,
            drop_shadow_offset: [1.0, -1.0],
            box_drawing_breadth: 1.0,
            inline_image_offset_x: 0.0,
            inline_image_offset_y: 0.0,
            inline_image_x_advance: 0.0,
            inline_image_stretch: 1.0,
            is_mono: false,
            integer_position: false,
            omit_curly_braces: false,
            enable_square_brackets: true,
            solid_block: SOLID_BLOCK,
            family: None,
            next_private_use: PRIVATE_USE_START,
        }
    }

    /// Build a font from an already-parsed bitmap-font structure.
    pub fn from_bitmap_data(data: &BitmapFontData) -> Result<Font, FontError> {
        let mut widest = 1.0f32;
        for g in &data.glyphs {
            widest = widest.max(g.x_advance);
        }
        let mut font = Font::new(widest, data.line_height.max(1.0));
        font.descent = data.descent;
        {
            let mut maps = font.maps.write().expect("font maps lock");
            for g in &data.glyphs {
                maps.mapping.insert(
                    g.codepoint,
                    GlyphRegion {
                        texture: g.texture,
                        u: g.u,
                        v: g.v,
                        u2: g.u2,
                        v2: g.v2,
                        offset_x: g.offset_x,
                        offset_y: g.offset_y,
                        x_advance: g.x_advance,
                        width: g.width,
                        height: g.height,
                    },
                );
            }
            if !data.kerning.is_empty() {
                let mut kern = HashMap::with_capacity(data.kerning.len());
                for &(first, second, amount) in &data.kerning {
                    kern.insert(((first as u32) << 16) | second as u32, amount);
                }
                maps.kerning = Some(kern);
            }
        }
        font.finish_setup()?;
        Ok(font)
    }

    /// Normalize the mapping after a loader runs: require a space glyph,
    /// alias `\r` to space, add the zero-width space and newline entries,
    /// and ensure the solid block exists.
    pub(crate) fn finish_setup(&mut self) -> Result<(), FontError> {
        let mut maps = self.maps.write().expect("font maps lock");
        let space = *maps
            .mapping
            .get(&0x20)
            .ok_or(FontError::MissingSpaceGlyph)?;
        maps.mapping.entry(0x0D).or_insert(space);
        maps.mapping.entry(0x200B).or_insert(GlyphRegion {
            x_advance: 0.0,
            width: 0.0,
            ..space
        });
        maps.mapping.entry(0x0A).or_insert(GlyphRegion {
            x_advance: 0.0,
            width: 0.0,
            height: 0.0,
            ..space
        });
        let solid = self.solid_block;
        let cell_w = self.cell_width;
        let cell_h = self.cell_height;
        maps.mapping.entry(solid).or_insert(GlyphRegion {
            texture: TextureId::WHITE,
            u: 0.0,
            v: 0.0,
            u2: 1.0,
            v2: 1.0,
            offset_x: 0.0,
            offset_y: 0.0,
            x_advance: cell_w,
            width: cell_w,
            height: cell_h,
        });
        Ok(())
    }

    // ── Mapping access ──────────────────────────────────────────────

    /// The region for a codepoint, if mapped.
    pub fn region(&self, codepoint: u32) -> Option<GlyphRegion> {
        self.maps
            .read()
            .expect("font maps lock")
            .mapping
            .get(&codepoint)
            .copied()
    }

    /// The region for a codepoint, falling back to the space glyph for
    /// anything unmapped. Draw paths never fail on missing glyphs.
    pub fn region_or_default(&self, codepoint: u32) -> GlyphRegion {
        let maps = self.maps.read().expect("font maps lock");
        maps.mapping
            .get(&codepoint)
            .or_else(|| maps.mapping.get(&0x20))
            .copied()
            .unwrap_or_else(|| GlyphRegion::empty(TextureId::WHITE))
    }

    /// Whether the font maps this codepoint.
    pub fn has_glyph(&self, codepoint: u32) -> bool {
        self.maps
            .read()
            .expect("font maps lock")
            .mapping
            .contains_key(&codepoint)
    }

    /// The solid-block region used for bars, backgrounds, and box drawing.
    pub fn solid_block_region(&self) -> GlyphRegion {
        self.region_or_default(self.solid_block)
    }

    /// Insert or replace one codepoint's region directly.
    pub fn set_region(&mut self, codepoint: u32, region: GlyphRegion) {
        self.maps
            .write()
            .expect("font maps lock")
            .mapping
            .insert(codepoint, region);
    }

    // ── Atlas names and inline images ───────────────────────────────

    /// Register one named region in the private-use range, returning its
    /// assigned codepoint. Past capacity the region is dropped and `None`
    /// returned.
    pub fn add_image(&mut self, name: &str, region: GlyphRegion) -> Option<u32> {
        if self.next_private_use >= PRIVATE_USE_END {
            log::warn!("atlas full: dropping inline image {name:?}");
            return None;
        }
        let code = self.next_private_use;
        self.next_private_use += 1;
        let mut maps = self.maps.write().expect("font maps lock");
        maps.mapping.insert(code, region);
        maps.name_lookup.insert(name.to_lowercase(), code);
        maps.names_by_code.insert(code, name.to_string());
        Some(code)
    }

    /// Register a batch of named regions; names past atlas capacity are
    /// silently dropped (logged once).
    pub fn add_atlas<I>(&mut self, entries: I)
    where
        I: IntoIterator<Item = (String, GlyphRegion)>,
    {
        let mut dropped = 0usize;
        for (name, region) in entries {
            if self.add_image(&name, region).is_none() {
                dropped += 1;
            }
        }
        if dropped > 0 {
            log::warn!("atlas full: dropped {dropped} regions");
        }
    }

    /// Resolve an atlas-entry name to its codepoint, case-insensitively.
    pub fn atlas_lookup(&self, name: &str) -> Option<u32> {
        self.maps
            .read()
            .expect("font maps lock")
            .name_lookup
            .get(&name.to_lowercase())
            .copied()
    }

    /// The original spelling of an atlas entry's name.
    pub fn atlas_name(&self, codepoint: u32) -> Option<String> {
        self.maps
            .read()
            .expect("font maps lock")
            .names_by_code
            .get(&codepoint)
            .cloned()
    }

    // ── Stored formatting states ────────────────────────────────────

    pub(crate) fn store_state(&self, label: &str, state: PackedGlyph) {
        self.maps
            .write()
            .expect("font maps lock")
            .stored_states
            .insert(label.to_string(), state);
    }

    pub(crate) fn stored_state(&self, label: &str) -> Option<PackedGlyph> {
        self.maps
            .read()
            .expect("font maps lock")
            .stored_states
            .get(label)
            .copied()
    }

    // ── Kerning ─────────────────────────────────────────────────────

    /// Kerning adjustment between two codepoints, in unscaled units.
    pub fn kern(&self, first: u32, second: u32) -> f32 {
        let maps = self.maps.read().expect("font maps lock");
        match &maps.kerning {
            Some(k) => k
                .get(&(((first & 0xFFFF) << 16) | (second & 0xFFFF)))
                .copied()
                .unwrap_or(0.0),
            None => 0.0,
        }
    }

    /// Whether this font carries kerning pairs at all.
    pub fn has_kerning(&self) -> bool {
        self.maps.read().expect("font maps lock").kerning.is_some()
    }

    /// Install kerning pairs, merging with any already present.
    pub fn set_kerning(&mut self, pairs: impl IntoIterator<Item = (u16, u16, f32)>) {
        let mut maps = self.maps.write().expect("font maps lock");
        let kern = maps.kerning.get_or_insert_with(HashMap::new);
        for (first, second, amount) in pairs {
            kern.insert(((first as u32) << 16) | second as u32, amount);
        }
    }

    // ── Advances ────────────────────────────────────────────────────

    /// True when the codepoint lives in the inline-image private-use range.
    #[inline]
    pub fn is_inline_image(codepoint: u32) -> bool {
        (PRIVATE_USE_START..PRIVATE_USE_END).contains(&codepoint)
    }

    /// Horizontal scale applied to an inline-image region so it fits one
    /// line height.
    pub fn inline_image_scale(&self, region: &GlyphRegion) -> f32 {
        let max_dim = region.max_dimension().max(1.0);
        self.cell_height / max_dim * self.inline_image_stretch
    }

    /// The horizontal step one glyph advances the cursor, including the
    /// per-glyph `scale` multiplier from the layout's advances array. The
    /// glyph's family slot is resolved first, so this is correct to call
    /// on the base font for any glyph of the layout.
    ///
    /// Superscript advances are halved on variable-width fonts; inline
    /// images use the line-height fitting rule instead of `scale_x`.
    pub fn x_advance(&self, scale: f32, glyph: PackedGlyph) -> f32 {
        let font = self.resolve_slot(glyph::extract_font_index(glyph));
        let cp = glyph::extract_codepoint(glyph);
        let region = font.region_or_default(cp);
        if Self::is_inline_image(cp) {
            return region.x_advance * font.inline_image_scale(&region) * scale
                + font.inline_image_x_advance * scale;
        }
        let mut advance = region.x_advance * font.scale_x * scale;
        if glyph::extract_style(glyph) & SUPERSCRIPT == SUPERSCRIPT && !font.is_mono {
            advance *= 0.5;
        }
        advance
    }

    /// The packed effect color for a fancy-line mode.
    pub(crate) fn fancy_color(&self, mode: GlyphMode) -> u32 {
        match mode {
            GlyphMode::Error => self.error_color,
            GlyphMode::Context => self.context_color,
            GlyphMode::Warn => self.warn_color,
            GlyphMode::Suggest => self.suggest_color,
            GlyphMode::Note => self.note_color,
            _ => self.black_color,
        }
    }

    // ── Scaling ─────────────────────────────────────────────────────

    /// Multiply both draw scales, adjusting the cell accordingly.
    pub fn scale_by(&mut self, multiplier: f32) {
        self.scale_x *= multiplier;
        self.scale_y *= multiplier;
        self.cell_width *= multiplier;
        self.cell_height *= multiplier;
    }

    /// Scale so one cell is exactly `width` x `height` world units.
    pub fn scale_to(&mut self, width: f32, height: f32) {
        self.scale_x = width / self.original_cell_width;
        self.scale_y = height / self.original_cell_height;
        self.cell_width = width;
        self.cell_height = height;
    }

    /// Force every glyph advance to the cell width, making layout treat
    /// the font as monospaced.
    pub fn fit_cell(&mut self, width: f32, height: f32) {
        self.scale_to(width, height);
        let cell_advance = self.original_cell_width;
        let mut maps = self.maps.write().expect("font maps lock");
        for region in maps.mapping.values_mut() {
            if !region.is_block_sequence() {
                region.x_advance = cell_advance;
            }
        }
        self.is_mono = true;
    }

    // ── Sharing ─────────────────────────────────────────────────────

    /// A copy sharing the four large maps by reference. Mutations through
    /// either font are visible in both until [`Font::set_sharing`] breaks
    /// the link.
    pub fn shallow_copy(&self) -> Font {
        Font {
            maps: Arc::clone(&self.maps),
            sharing: true,
            family: self.family.clone(),
            ..*self
        }
    }

    /// Enable or break map sharing. Turning sharing off deep-clones the
    /// maps so later mutations stay isolated.
    pub fn set_sharing(&mut self, sharing: bool) {
        if !sharing && self.sharing {
            let cloned = self.maps.read().expect("font maps lock").clone();
            self.maps = Arc::new(RwLock::new(cloned));
        }
        self.sharing = sharing;
    }

    /// Whether this font currently shares its maps with another.
    pub fn sharing(&self) -> bool {
        self.sharing
    }

    // ── Family ──────────────────────────────────────────────────────

    /// Attach a family; slot lookups during draw resolve through it, with
    /// slot 0 and unoccupied slots falling back to this font.
    pub fn set_family(&mut self, family: Option<FontFamily>) {
        self.family = family;
    }

    /// The attached family, if any.
    pub fn family(&self) -> Option<&FontFamily> {
        self.family.as_ref()
    }

    /// Resolve a glyph's font slot to the font that should draw it.
    pub(crate) fn resolve_slot(&self, index: u8) -> &Font {
        if index == 0 {
            return self;
        }
        match &self.family {
            Some(family) => family.slot(index as usize).unwrap_or(self),
            None => self,
        }
    }

    // ── Distance field ──────────────────────────────────────────────

    /// Recompute the working crispness after a window resize. Must be
    /// called on every resize or SDF text goes blurry or jagged.
    pub fn resize_distance_field(
        &mut self,
        width: f32,
        height: f32,
        backbuffer_width: f32,
        backbuffer_height: f32,
    ) {
        let ratio = (width / backbuffer_width.max(1.0))
            .max(height / backbuffer_height.max(1.0))
            .max(f32::EPSILON);
        self.actual_crispness = self.distance_field_crispness * ratio;
    }

    /// The `u_smoothing` uniform value for the current cell scale.
    pub fn smoothing_value(&self) -> f32 {
        let base = match self.distance_field {
            DistanceFieldType::Standard => return 0.0,
            DistanceFieldType::Msdf => 8.0,
            _ => 4.0,
        };
        base * self.actual_crispness
            * (self.cell_height / self.original_cell_height)
                .max(self.cell_width / self.original_cell_width)
    }

    /// Install this font's shader on the batch and prime the smoothing
    /// uniform. With a `Standard` field this clears any custom shader.
    pub fn enable_shader(&self, batch: &mut dyn QuadBatch) {
        match self.distance_field {
            DistanceFieldType::Standard => {
                batch.set_shader(None);
            }
            _ => {
                if self.shader.is_none() {
                    log::warn!(
                        "distance-field font has no shader installed; drawing will look blurry"
                    );
                }
                batch.set_shader(self.shader);
                batch.set_uniform_f("u_smoothing", self.smoothing_value());
            }
        }
    }

    /// Zero the smoothing uniform so a standard texture (an inline image)
    /// renders correctly mid-batch between SDF glyphs.
    pub fn pause_distance_field_shader(&self, batch: &mut dyn QuadBatch) {
        if self.distance_field != DistanceFieldType::Standard {
            batch.flush();
            batch.set_uniform_f("u_smoothing", 0.0);
        }
    }

    /// Restore the smoothing uniform after a paused stretch.
    pub fn resume_distance_field_shader(&self, batch: &mut dyn QuadBatch) {
        if self.distance_field != DistanceFieldType::Standard {
            batch.flush();
            batch.set_uniform_f("u_smoothing", self.smoothing_value());
        }
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use crate::glyph::pack;

    fn region(advance: f32) -> GlyphRegion {
        GlyphRegion {
            texture: TextureId(9),
            u: 0.0,
            v: 0.0,
            u2: 0.5,
            v2: 0.5,
            offset_x: 0.0,
            offset_y: 0.0,
            x_advance: advance,
            width: 32.0,
            height: 32.0,
        }
    }

    // ── Setup normalization ─────────────────────────────────────────

    #[test]
    fn finish_setup_requires_space() {
        let mut font = Font::new(8.0, 16.0);
        assert!(matches!(
            font.finish_setup(),
            Err(FontError::MissingSpaceGlyph)
        ));
    }

    #[test]
    fn finish_setup_adds_control_entries() {
        let font = test_support::mono_font(8.0, 16.0);
        assert!(font.has_glyph(0x0D), "\\r must map to space");
        assert_eq!(font.region(0x200B).unwrap().x_advance, 0.0);
        let newline = font.region(0x0A).unwrap();
        assert_eq!(newline.x_advance, 0.0);
        assert_eq!(newline.height, 0.0);
        assert!(font.has_glyph(SOLID_BLOCK));
    }

    #[test]
    fn missing_glyphs_fall_back_to_space() {
        let font = test_support::mono_font(8.0, 16.0);
        let r = font.region_or_default(0x3042); // not mapped
        assert_eq!(r.x_advance, 8.0);
    }

    // ── Atlas names ─────────────────────────────────────────────────

    #[test]
    fn atlas_lookup_is_case_insensitive() {
        let mut font = test_support::mono_font(8.0, 16.0);
        let code = font.add_image("saxophone", region(32.0)).unwrap();
        assert_eq!(code, PRIVATE_USE_START);
        assert_eq!(font.atlas_lookup("SAXOPHONE"), Some(code));
        assert_eq!(font.atlas_lookup("Saxophone"), Some(code));
        assert_eq!(font.atlas_name(code).as_deref(), Some("saxophone"));
    }

    #[test]
    fn atlas_assigns_sequential_private_use() {
        let mut font = test_support::mono_font(8.0, 16.0);
        let a = font.add_image("a", region(32.0)).unwrap();
        let b = font.add_image("b", region(32.0)).unwrap();
        assert_eq!(b, a + 1);
    }

    #[test]
    fn atlas_overflow_drops_silently() {
        let mut font = test_support::mono_font(8.0, 16.0);
        font.next_private_use = PRIVATE_USE_END - 1;
        assert!(font.add_image("last", region(32.0)).is_some());
        assert!(font.add_image("overflow", region(32.0)).is_none());
    }

    // ── Advances ────────────────────────────────────────────────────

    #[test]
    fn x_advance_scales_by_font_and_glyph_scale() {
        let mut font = test_support::mono_font(8.0, 16.0);
        font.scale_x = 2.0;
        let g = pack(0xFFFFFFFE, 0, GlyphMode::None, 0, 'a');
        assert_eq!(font.x_advance(1.0, g), 16.0);
        assert_eq!(font.x_advance(0.5, g), 8.0);
    }

    #[test]
    fn superscript_halves_only_variable_width() {
        let mut font = test_support::mono_font(8.0, 16.0);
        let g = pack(0xFFFFFFFE, SUPERSCRIPT, GlyphMode::None, 0, 'a');
        assert_eq!(font.x_advance(1.0, g), 8.0, "mono font keeps full step");
        font.is_mono = false;
        assert_eq!(font.x_advance(1.0, g), 4.0);
    }

    #[test]
    fn inline_image_advance_fits_line_height() {
        let mut font = test_support::mono_font(8.0, 16.0);
        let code = font.add_image("sax", region(32.0)).unwrap();
        let g = crate::glyph::apply_char(
            pack(0xFFFFFFFE, 0, GlyphMode::None, 0, 'a'),
            char::from_u32(code).unwrap(),
        );
        // cell_height / max_dimension * stretch = 16/32 = 0.5
        assert!((font.x_advance(1.0, g) - 32.0 * 0.5).abs() < 1e-6);
    }

    // ── Kerning ─────────────────────────────────────────────────────

    #[test]
    fn kerning_keys_combine_pair() {
        let data = BitmapFontData {
            line_height: 16.0,
            descent: -4.0,
            glyphs: vec![BitmapGlyph {
                codepoint: 0x20,
                texture: TextureId(1),
                u: 0.0,
                v: 0.0,
                u2: 0.1,
                v2: 0.1,
                offset_x: 0.0,
                offset_y: 0.0,
                x_advance: 8.0,
                width: 8.0,
                height: 16.0,
            }],
            kerning: vec![(b'A' as u16, b'V' as u16, -2.0)],
        };
        let font = Font::from_bitmap_data(&data).unwrap();
        assert_eq!(font.kern('A' as u32, 'V' as u32), -2.0);
        assert_eq!(font.kern('V' as u32, 'A' as u32), 0.0);
    }

    // ── Sharing ─────────────────────────────────────────────────────

    #[test]
    fn shallow_copy_shares_mutations() {
        let mut a = test_support::mono_font(8.0, 16.0);
        let b = a.shallow_copy();
        a.add_image("shared", region(32.0));
        assert!(b.atlas_lookup("shared").is_some());
    }

    #[test]
    fn set_sharing_false_isolates() {
        let mut a = test_support::mono_font(8.0, 16.0);
        let mut b = a.shallow_copy();
        b.set_sharing(false);
        a.add_image("late", region(32.0));
        assert!(b.atlas_lookup("late").is_none());
        assert!(a.atlas_lookup("late").is_some());
    }

    // ── Scaling ─────────────────────────────────────────────────────

    #[test]
    fn scale_to_sets_cell_and_scales() {
        let mut font = test_support::mono_font(8.0, 16.0);
        font.scale_to(16.0, 32.0);
        assert_eq!(font.scale_x, 2.0);
        assert_eq!(font.scale_y, 2.0);
        assert_eq!(font.cell_width, 16.0);
        assert_eq!(font.original_cell_width, 8.0);
    }

    #[test]
    fn fit_cell_makes_every_advance_equal() {
        let mut font = test_support::mono_font(8.0, 16.0);
        font.set_region(b'i' as u32, region(3.0));
        font.fit_cell(8.0, 16.0);
        assert!(font.is_mono);
        assert_eq!(font.region(b'i' as u32).unwrap().x_advance, 8.0);
    }

    // ── Distance field ──────────────────────────────────────────────

    #[test]
    fn resize_distance_field_tracks_ratio() {
        let mut font = test_support::mono_font(8.0, 16.0);
        font.distance_field = DistanceFieldType::Sdf;
        font.distance_field_crispness = 2.0;
        font.resize_distance_field(1920.0, 1080.0, 1920.0, 1080.0);
        assert!((font.actual_crispness - 2.0).abs() < 1e-6);
        font.resize_distance_field(960.0, 540.0, 1920.0, 1080.0);
        assert!((font.actual_crispness - 1.0).abs() < 1e-6);
    }

    #[test]
    fn smoothing_grows_with_cell_scale() {
        let mut font = test_support::mono_font(8.0, 16.0);
        font.distance_field = DistanceFieldType::Sdf;
        let base = font.smoothing_value();
        font.scale_to(16.0, 32.0);
        assert!(
            font.smoothing_value() > base,
            "u_smoothing must increase with cell_h / original_cell_h"
        );
        font.scale_to(24.0, 48.0);
        let bigger = font.smoothing_value();
        font.scale_to(16.0, 32.0);
        assert!(bigger > font.smoothing_value());
    }

    #[test]
    fn standard_font_has_zero_smoothing() {
        let font = test_support::mono_font(8.0, 16.0);
        assert_eq!(font.smoothing_value(), 0.0);
    }

    #[test]
    fn msdf_doubles_sdf_smoothing() {
        let mut font = test_support::mono_font(8.0, 16.0);
        font.distance_field = DistanceFieldType::Sdf;
        let sdf = font.smoothing_value();
        font.distance_field = DistanceFieldType::Msdf;
        assert!((font.smoothing_value() - sdf * 2.0).abs() < 1e-6);
    }
}
