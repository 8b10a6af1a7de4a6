// Per-glyph quad generation: the batch abstraction, the draw passes for
// outlines/shadows/glow/bold, bar decorations, fancy lines, and block
// sequences.

mod boxdraw;

use crate::color::{mul_alpha, to_packed_float};
use crate::font::{DistanceFieldType, Font, GlyphRegion};
use crate::glyph::{
    self, GlyphMode, PackedGlyph, BLACK_OUTLINE, BOLD, OBLIQUE, STRIKETHROUGH, UNDERLINE,
};
use crate::layout::Layout;

/// Opaque handle to a texture the embedder uploaded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TextureId(pub u32);

impl TextureId {
    /// Reserved 1x1 solid-white texture used for bars, backgrounds, and
    /// composed box-drawing glyphs.
    pub const WHITE: TextureId = TextureId(0);
}

/// Opaque handle to a compiled shader program.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ShaderId(pub u32);

/// The sprite-batch seam the engine draws through. One call to
/// [`QuadBatch::draw_vertices`] is one textured quad of four vertices,
/// each `(x, y, packed_color, u, v)`, in bottom-left, top-left,
/// top-right, bottom-right order.
pub trait QuadBatch {
    fn draw_vertices(&mut self, texture: TextureId, vertices: &[f32; 20]);
    fn set_uniform_f(&mut self, name: &str, value: f32);
    fn flush(&mut self);
    fn set_shader(&mut self, shader: Option<ShaderId>);
    fn shader(&self) -> Option<ShaderId>;
    /// The batch's current tint; its alpha multiplies every glyph.
    fn color(&self) -> [f32; 4];
}

/// One vertex of the quad stream, mirroring the wire layout so whole
/// quads can be cast to the `[f32; 20]` the batch consumes.
#[repr(C)]
#[derive(Debug, Clone, Copy, bytemuck::Pod, bytemuck::Zeroable)]
pub struct GlyphVertex {
    pub x: f32,
    pub y: f32,
    pub color: f32,
    pub u: f32,
    pub v: f32,
}

/// Wraps a [`QuadBatch`] with the per-frame state the draw path needs:
/// the last-drawn texture (for distance-field pause/resume on texture
/// switches) and the size of one logical pixel in world units (for fancy
/// lines), derived from the embedder's projection.
pub struct TextBatch<'a> {
    batch: &'a mut dyn QuadBatch,
    latest_texture: Option<TextureId>,
    pub px_x: f32,
    pub px_y: f32,
}

impl<'a> TextBatch<'a> {
    pub fn new(batch: &'a mut dyn QuadBatch) -> TextBatch<'a> {
        TextBatch {
            batch,
            latest_texture: None,
            px_x: 1.0,
            px_y: 1.0,
        }
    }

    /// Set the world-unit size of one logical pixel.
    pub fn with_pixel_size(mut self, px_x: f32, px_y: f32) -> TextBatch<'a> {
        self.px_x = px_x;
        self.px_y = px_y;
        self
    }

    pub fn inner(&mut self) -> &mut dyn QuadBatch {
        self.batch
    }

    /// Note a texture about to be drawn. On a switch, the distance-field
    /// uniform is paused for standard textures (inline images, the white
    /// block) and resumed for the font's own pages.
    fn touch_texture(&mut self, font: &Font, texture: TextureId, standard: bool) {
        if self.latest_texture == Some(texture) {
            return;
        }
        if font.distance_field != DistanceFieldType::Standard {
            if standard {
                font.pause_distance_field_shader(self.batch);
            } else {
                font.resume_distance_field_shader(self.batch);
            }
        }
        self.latest_texture = Some(texture);
    }

    /// Emit one quad: an axis-aligned rectangle with optional x shear on
    /// the top edge, rotated by (sin, cos) around (cx, cy).
    #[allow(clippy::too_many_arguments)]
    fn quad(
        &mut self,
        texture: TextureId,
        region: &GlyphRegion,
        color: f32,
        x0: f32,
        y0: f32,
        w: f32,
        h: f32,
        shear: f32,
        cx: f32,
        cy: f32,
        sin: f32,
        cos: f32,
    ) {
        let rot = |px: f32, py: f32| -> (f32, f32) {
            if sin == 0.0 && cos == 1.0 {
                return (px, py);
            }
            let dx = px - cx;
            let dy = py - cy;
            (cx + dx * cos - dy * sin, cy + dx * sin + dy * cos)
        };
        let (blx, bly) = rot(x0, y0);
        let (tlx, tly) = rot(x0 + shear, y0 + h);
        let (trx, try_) = rot(x0 + w + shear, y0 + h);
        let (brx, bry) = rot(x0 + w, y0);
        let verts = [
            GlyphVertex { x: blx, y: bly, color, u: region.u, v: region.v2 },
            GlyphVertex { x: tlx, y: tly, color, u: region.u, v: region.v },
            GlyphVertex { x: trx, y: try_, color, u: region.u2, v: region.v },
            GlyphVertex { x: brx, y: bry, color, u: region.u2, v: region.v2 },
        ];
        self.batch.draw_vertices(texture, bytemuck::cast_ref(&verts));
    }
}

/// Horizontal alignment for [`Font::draw_glyphs`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Align {
    #[default]
    Left,
    Center,
    Right,
}

/// Deterministic jostle offset in ±2 world units, stable per position
/// and codepoint so text does not shimmer between frames.
fn jostle_offset(x: f32, y: f32, codepoint: u32) -> (f32, f32) {
    let mut h = (x.to_bits() as u64)
        ^ ((y.to_bits() as u64) << 32)
        ^ (codepoint as u64).wrapping_mul(0x9E37_79B9_7F4A_7C15);
    h ^= h >> 33;
    h = h.wrapping_mul(0xFF51_AFD7_ED55_8CCD);
    h ^= h >> 33;
    let dx = ((h & 0xFF) as f32 / 255.0) * 4.0 - 2.0;
    let dy = (((h >> 8) & 0xFF) as f32 / 255.0) * 4.0 - 2.0;
    (dx, dy)
}

/// UVs for untextured solid quads.
const SOLID_UV: GlyphRegion = GlyphRegion {
    texture: TextureId::WHITE,
    u: 0.0,
    v: 0.0,
    u2: 1.0,
    v2: 1.0,
    offset_x: 0.0,
    offset_y: 0.0,
    x_advance: 0.0,
    width: 0.0,
    height: 0.0,
};

impl Font {
    /// Draw one packed glyph with its pen at `(x, y)` (left end of the
    /// baseline), rotated by `rotation_deg` around the pen. `sizing_x`/
    /// `sizing_y` scale the drawn quad; `advance_mul` scales the returned
    /// cursor step. A non-zero `background` fills the cell behind the
    /// glyph. Returns the width consumed.
    #[allow(clippy::too_many_arguments)]
    pub fn draw_glyph(
        &self,
        batch: &mut TextBatch,
        glyph: PackedGlyph,
        x: f32,
        y: f32,
        rotation_deg: f32,
        sizing_x: f32,
        mut sizing_y: f32,
        background: u32,
        advance_mul: f32,
    ) -> f32 {
        let font = self.resolve_slot(glyph::extract_font_index(glyph));
        let mode = glyph::extract_mode(glyph);

        let (x, y) = if font.integer_position {
            (x.round(), y.round())
        } else {
            (x, y)
        };

        let mut draw_ch = glyph::extract_char(glyph);
        if mode == GlyphMode::SmallCaps && draw_ch.is_lowercase() {
            draw_ch = draw_ch.to_uppercase().next().unwrap_or(draw_ch);
            sizing_y *= 0.7;
        }
        let draw_cp = draw_ch as u32;

        let (sin, cos) = if rotation_deg != 0.0 {
            rotation_deg.to_radians().sin_cos()
        } else {
            (0.0, 1.0)
        };

        let batch_alpha = batch.batch.color()[3];
        let bold = glyph & BOLD != 0;
        let alpha_mul = if bold {
            batch_alpha.powf(1.5)
        } else {
            batch_alpha
        };
        let tint = mul_alpha(glyph::extract_color(glyph), alpha_mul);
        let packed_tint = to_packed_float(tint);

        let cw = font.cell_width * sizing_x;
        let chh = font.cell_height * sizing_y;

        if background != 0 {
            let bg = to_packed_float(mul_alpha(background, batch_alpha));
            let block = font.solid_block_region();
            batch.touch_texture(font, block.texture, true);
            batch.quad(
                block.texture, &block, bg,
                x, y + font.descent * sizing_y, cw, chh,
                0.0, x, y, sin, cos,
            );
        }

        // Box-drawing and block-element glyphs bypass the font texture.
        let mapped = font.has_glyph(draw_cp);
        let region = font.region_or_default(draw_cp);
        if region.is_block_sequence() || !mapped {
            if let Some(rects) =
                boxdraw::block_sequence(draw_cp, font.box_drawing_breadth)
            {
                self.draw_block_sequence(
                    batch, font, &rects, packed_tint, x, y, cw, chh, sin, cos,
                );
                return font.cell_width * advance_mul;
            }
        }

        let inline = Font::is_inline_image(draw_cp);
        let (scale_x, scale_y) = if inline {
            let s = font.inline_image_scale(&region);
            (s * sizing_x, s * sizing_y)
        } else {
            (font.scale_x * sizing_x, font.scale_y * sizing_y)
        };

        let mut w = region.width * scale_x;
        let mut h = region.height * scale_y;
        let mut xc = x + region.offset_x * scale_x;
        let mut yb = y + font.descent * sizing_y + region.offset_y * scale_y;
        if inline {
            xc += font.inline_image_offset_x;
            yb += font.inline_image_offset_y;
        }

        // Sub-, mid-, and superscript halve the quad and shift it.
        match glyph::extract_script(glyph) {
            1 => {
                w *= 0.5;
                h *= 0.5;
                yb -= chh * 0.125;
            }
            2 => {
                w *= 0.5;
                h *= 0.5;
                yb += chh * 0.1875;
            }
            3 => {
                w *= 0.5;
                h *= 0.5;
                yb += chh * 0.4375;
            }
            _ => {}
        }

        if mode == GlyphMode::Jostle {
            let (dx, dy) = jostle_offset(x, y, draw_cp);
            xc += dx;
            yb += dy;
        }

        let shear = if glyph & OBLIQUE != 0 {
            h * 0.2 * font.oblique_strength
        } else {
            0.0
        };

        batch.touch_texture(font, region.texture, inline || region.texture == TextureId::WHITE);

        let advance = self.x_advance(advance_mul, glyph);

        // Pre-passes, farthest from the eye first.
        if mode == GlyphMode::DropShadow {
            let shadow = to_packed_float(mul_alpha(font.shadow_color, batch_alpha));
            batch.quad(
                region.texture, &region, shadow,
                xc + font.drop_shadow_offset[0], yb + font.drop_shadow_offset[1],
                w, h, shear, x, y, sin, cos,
            );
        }

        if glyph & BLACK_OUTLINE != 0 {
            let outline_rgba = match mode {
                GlyphMode::BlueOutline => 0x3070_F0FF,
                GlyphMode::RedOutline => font.error_color,
                GlyphMode::YellowOutline => font.warn_color,
                GlyphMode::WhiteOutline => font.white_color,
                _ => font.black_color,
            };
            let outline = to_packed_float(mul_alpha(outline_rgba, batch_alpha));
            let o = font.outline_strength;
            if bold {
                // Bold widens the ring to a 5x3 grid.
                for ix in -2i32..=2 {
                    for iy in -1i32..=1 {
                        if ix == 0 && iy == 0 {
                            continue;
                        }
                        batch.quad(
                            region.texture, &region, outline,
                            xc + ix as f32 * o, yb + iy as f32 * o,
                            w, h, shear, x, y, sin, cos,
                        );
                    }
                }
            } else {
                for (ix, iy) in [
                    (-1, 0), (1, 0), (0, -1), (0, 1),
                    (-1, -1), (-1, 1), (1, -1), (1, 1),
                ] {
                    batch.quad(
                        region.texture, &region, outline,
                        xc + ix as f32 * o, yb + iy as f32 * o,
                        w, h, shear, x, y, sin, cos,
                    );
                }
            }
        }

        if mode == GlyphMode::Halo || mode == GlyphMode::Neon {
            let glow_rgba = if mode == GlyphMode::Halo {
                font.halo_color
            } else {
                tint
            };
            let spread = font.outline_strength * 3.0;
            // 11x7 cross-shaped kernel of low-alpha copies.
            for ix in -5i32..=5 {
                for iy in -3i32..=3 {
                    let fx = ix.abs() as f32 / 5.0;
                    let fy = iy.abs() as f32 / 3.0;
                    if fx + fy > 1.0 {
                        continue;
                    }
                    let falloff = (1.0 - (fx + fy)) * 0.25 * font.glow_strength;
                    let glow =
                        to_packed_float(mul_alpha(glow_rgba, batch_alpha * falloff));
                    batch.quad(
                        region.texture, &region, glow,
                        xc + ix as f32 / 5.0 * spread,
                        yb + iy as f32 / 3.0 * spread,
                        w, h, shear, x, y, sin, cos,
                    );
                }
            }
        }

        if mode == GlyphMode::Shiny {
            let shine = to_packed_float(mul_alpha(font.shine_color, batch_alpha));
            batch.quad(
                region.texture, &region, shine,
                xc, yb + 1.5 * sizing_y,
                w, h, shear, x, y, sin, cos,
            );
        }

        // Main quad. Neon brightens the core toward white.
        let main_color = if mode == GlyphMode::Neon {
            to_packed_float(mul_alpha(font.white_color, alpha_mul))
        } else {
            packed_tint
        };
        batch.quad(
            region.texture, &region, main_color,
            xc, yb, w, h, shear, x, y, sin, cos,
        );

        if bold {
            for f in [-1.0f32, -0.5, 0.5, 1.0] {
                batch.quad(
                    region.texture, &region, main_color,
                    xc + f * font.bold_strength, yb,
                    w, h, shear, x, y, sin, cos,
                );
            }
        }

        // Bar decorations, positioned in cell fractions (Zen metrics).
        if glyph & UNDERLINE != 0 {
            self.draw_bar(
                batch, font, packed_tint,
                x + font.under_x * cw,
                y + font.descent * 0.8 * sizing_y + font.under_y * chh,
                advance * (1.0 + font.under_length),
                chh * 0.065 * (1.0 + font.under_breadth),
                '_', x, y, sin, cos,
            );
        }
        if glyph & STRIKETHROUGH != 0 {
            self.draw_bar(
                batch, font, packed_tint,
                x + font.strike_x * cw,
                y + chh * 0.3 + font.strike_y * chh,
                advance * (1.0 + font.strike_length),
                chh * 0.065 * (1.0 + font.strike_breadth),
                '-', x, y, sin, cos,
            );
        }
        if mode.is_fancy_line() {
            let color = to_packed_float(mul_alpha(font.fancy_color(mode), batch_alpha));
            self.draw_fancy_line(
                batch, font, mode, color,
                x + font.fancy_x * cw,
                y + font.descent * sizing_y + font.fancy_y * chh,
                advance,
            );
        }

        advance
    }

    /// One underline/strikethrough bar. Prefers the font's own glyph
    /// region (`'_'` or `'-'`) so distance-field pages keep their crisp
    /// edges; falls back to the solid block.
    #[allow(clippy::too_many_arguments)]
    fn draw_bar(
        &self,
        batch: &mut TextBatch,
        font: &Font,
        color: f32,
        x0: f32,
        y0: f32,
        length: f32,
        breadth: f32,
        preferred: char,
        cx: f32,
        cy: f32,
        sin: f32,
        cos: f32,
    ) {
        let (texture, region, standard) = match font.region(preferred as u32) {
            Some(r) if !r.is_block_sequence() && r.width > 0.0 => (r.texture, r, false),
            _ => {
                let block = font.solid_block_region();
                (block.texture, block, true)
            }
        };
        batch.touch_texture(font, texture, standard);
        batch.quad(
            texture, &region, color,
            x0, y0, length, breadth.max(batch.px_y),
            0.0, cx, cy, sin, cos,
        );
    }

    /// The five squiggle decorations, one `px_x` x `px_y` solid quad per
    /// step.
    fn draw_fancy_line(
        &self,
        batch: &mut TextBatch,
        font: &Font,
        mode: GlyphMode,
        color: f32,
        x0: f32,
        y0: f32,
        width: f32,
    ) {
        let xpx = batch.px_x;
        let ypx = batch.px_y;
        let steps = (width / xpx).ceil().max(1.0) as i32;
        let block = font.solid_block_region();
        batch.touch_texture(font, block.texture, true);
        for i in 0..steps {
            let mut dx = i as f32 * xpx;
            let mut dy = 0.0f32;
            match mode {
                // Zig-zag.
                GlyphMode::Error => dy = (i & 1) as f32 * ypx,
                // Backslash ticks.
                GlyphMode::Context => {
                    if i & 2 != 0 {
                        dx -= xpx;
                    }
                    dy = -((i & 1) as f32) * ypx;
                }
                // Bar segments.
                GlyphMode::Warn => {
                    dx += (!i & 1) as f32 * xpx;
                    dy = (!i & 1) as f32 * ypx;
                }
                // Small right-angles with gaps.
                GlyphMode::Suggest => {
                    if i & (i >> 1) & 1 != 0 {
                        continue;
                    }
                }
                // Wave.
                GlyphMode::Note => dy = (i >> 1 & 1) as f32 * ypx,
                _ => {}
            }
            batch.quad(
                block.texture, &block, color,
                x0 + dx, y0 + dy, xpx, ypx,
                0.0, x0, y0, 0.0, 1.0,
            );
        }
    }

    /// Emit one solid quad per rectangle of a block sequence, in cell
    /// fractions, rotated with the glyph.
    #[allow(clippy::too_many_arguments)]
    fn draw_block_sequence(
        &self,
        batch: &mut TextBatch,
        font: &Font,
        rects: &[[f32; 4]],
        color: f32,
        x: f32,
        y: f32,
        cw: f32,
        chh: f32,
        sin: f32,
        cos: f32,
    ) {
        let block = font.solid_block_region();
        batch.touch_texture(font, block.texture, true);
        let bottom = y + font.descent;
        // Rectangles rotate around the cell center so rotated box art
        // stays contiguous.
        let cx = x + cw * 0.5;
        let cy = bottom + chh * 0.5;
        for r in rects {
            batch.quad(
                block.texture, &SOLID_UV, color,
                x + r[0] * cw, bottom + r[1] * chh,
                r[2] * cw, r[3] * chh,
                0.0, cx, cy, sin, cos,
            );
        }
    }

    /// Draw a measured layout with its first baseline's left end at
    /// `(x, y)`, aligned per line, rotated by `rotation_deg` around
    /// `(x + origin_x, y + origin_y)`. Returns the widest drawn line
    /// width.
    #[allow(clippy::too_many_arguments)]
    pub fn draw_glyphs(
        &self,
        batch: &mut TextBatch,
        layout: &Layout,
        x: f32,
        y: f32,
        align: Align,
        rotation_deg: f32,
        origin_x: f32,
        origin_y: f32,
    ) -> f32 {
        let (sin, cos) = if rotation_deg != 0.0 {
            rotation_deg.to_radians().sin_cos()
        } else {
            (0.0, 1.0)
        };
        let ox = x + origin_x;
        let oy = y + origin_y;
        let mut widest = 0.0f32;
        let mut line_y = y;
        let mut flat = 0usize;
        for line in &layout.lines {
            let start_x = match align {
                Align::Left => x,
                Align::Center => x - line.width * 0.5,
                Align::Right => x - line.width,
            };
            let mut pen_x = start_x;
            for (j, &g) in line.glyphs.iter().enumerate() {
                let advance_mul = layout.advances.get(flat + j).copied().unwrap_or(1.0);
                let sizing = layout.sizing.get(flat + j).copied().unwrap_or([1.0, 1.0]);
                if sizing == [0.0, 0.0] && advance_mul == 0.0 {
                    continue;
                }
                if glyph::extract_char(g) == '\n' {
                    continue;
                }
                let (px, py) = if sin == 0.0 && cos == 1.0 {
                    (pen_x, line_y)
                } else {
                    let dx = pen_x - ox;
                    let dy = line_y - oy;
                    (ox + dx * cos - dy * sin, oy + dx * sin + dy * cos)
                };
                pen_x += self.draw_glyph(
                    batch, g, px, py, rotation_deg,
                    sizing[0], sizing[1], 0, advance_mul,
                );
            }
            widest = widest.max(pen_x - start_x);
            flat += line.glyphs.len();
            line_y -= line.height;
        }
        widest
    }
}


#[cfg(test)]
mod tests {
    use super::test_support::MockBatch;
    use super::*;
    use crate::font::test_support::mono_font;
    use crate::glyph::pack;

    const WHITE: u32 = 0xFFFF_FFFE;
    const RED: u32 = 0xFF00_00FE;

    fn plain(ch: char) -> PackedGlyph {
        pack(WHITE, 0, GlyphMode::None, 0, ch)
    }

    fn quad_x_min(q: &[f32; 20]) -> f32 {
        [q[0], q[5], q[10], q[15]]
            .into_iter()
            .fold(f32::INFINITY, f32::min)
    }

    fn quad_height(q: &[f32; 20]) -> f32 {
        let ys = [q[1], q[6], q[11], q[16]];
        ys.into_iter().fold(f32::NEG_INFINITY, f32::max)
            - ys.into_iter().fold(f32::INFINITY, f32::min)
    }

    // ── Main pass ───────────────────────────────────────────────────

    #[test]
    fn plain_glyph_is_one_quad_with_tint() {
        let font = mono_font(8.0, 16.0);
        let mut mock = MockBatch::new();
        let mut batch = TextBatch::new(&mut mock);
        let advance =
            font.draw_glyph(&mut batch, plain('A'), 10.0, 20.0, 0.0, 1.0, 1.0, 0, 1.0);
        assert_eq!(advance, 8.0);
        assert_eq!(mock.quads.len(), 1);
        assert_eq!(mock.quads[0].1[2], to_packed_float(WHITE));
    }

    #[test]
    fn advance_multiplier_scales_return_only() {
        let font = mono_font(8.0, 16.0);
        let mut mock = MockBatch::new();
        let mut batch = TextBatch::new(&mut mock);
        let advance =
            font.draw_glyph(&mut batch, plain('A'), 0.0, 0.0, 0.0, 1.0, 1.0, 0, 0.5);
        assert_eq!(advance, 4.0);
    }

    // ── Pre-passes don't displace the main color ────────────────────

    #[test]
    fn outline_draws_ring_then_main() {
        let font = mono_font(8.0, 16.0);
        let g = pack(RED, BLACK_OUTLINE, GlyphMode::None, 0, 'A');
        let mut mock = MockBatch::new();
        let mut batch = TextBatch::new(&mut mock);
        font.draw_glyph(&mut batch, g, 0.0, 0.0, 0.0, 1.0, 1.0, 0, 1.0);
        assert_eq!(mock.quads.len(), 9, "8 ring quads + main");
        let main = mock.quads.last().unwrap();
        assert_eq!(main.1[2], to_packed_float(RED));
        let ring_color = to_packed_float(font.black_color);
        for (_, q) in &mock.quads[..8] {
            assert_eq!(q[2], ring_color);
        }
    }

    #[test]
    fn every_mode_keeps_main_pass_tint() {
        let font = mono_font(8.0, 16.0);
        for mode in GlyphMode::ALL {
            if mode == GlyphMode::Neon {
                continue; // neon deliberately whitens the core
            }
            let g = pack(RED, 0, mode, 0, 'A');
            let mut mock = MockBatch::new();
            let mut batch = TextBatch::new(&mut mock);
            font.draw_glyph(&mut batch, g, 0.0, 0.0, 0.0, 1.0, 1.0, 0, 1.0);
            let tint = to_packed_float(RED);
            assert!(
                mock.quads.iter().any(|(_, q)| q[2] == tint),
                "{mode:?} lost the main tint"
            );
        }
    }

    #[test]
    fn drop_shadow_draws_shadow_first() {
        let font = mono_font(8.0, 16.0);
        let g = pack(WHITE, 0, GlyphMode::DropShadow, 0, 'A');
        let mut mock = MockBatch::new();
        let mut batch = TextBatch::new(&mut mock);
        font.draw_glyph(&mut batch, g, 0.0, 0.0, 0.0, 1.0, 1.0, 0, 1.0);
        assert_eq!(mock.quads.len(), 2);
        assert_eq!(mock.quads[0].1[2], to_packed_float(font.shadow_color));
        // Shadow offset by drop_shadow_offset.
        assert!(quad_x_min(&mock.quads[0].1) > quad_x_min(&mock.quads[1].1));
    }

    #[test]
    fn bold_adds_four_post_passes() {
        let font = mono_font(8.0, 16.0);
        let g = pack(WHITE, BOLD, GlyphMode::None, 0, 'A');
        let mut mock = MockBatch::new();
        let mut batch = TextBatch::new(&mut mock);
        font.draw_glyph(&mut batch, g, 0.0, 0.0, 0.0, 1.0, 1.0, 0, 1.0);
        assert_eq!(mock.quads.len(), 5);
    }

    #[test]
    fn bold_widens_outline_grid() {
        let font = mono_font(8.0, 16.0);
        let g = pack(WHITE, BOLD | BLACK_OUTLINE, GlyphMode::None, 0, 'A');
        let mut mock = MockBatch::new();
        let mut batch = TextBatch::new(&mut mock);
        font.draw_glyph(&mut batch, g, 0.0, 0.0, 0.0, 1.0, 1.0, 0, 1.0);
        // 5x3 grid minus center = 14 ring + main + 4 bold.
        assert_eq!(mock.quads.len(), 19);
    }

    #[test]
    fn halo_emits_low_alpha_kernel() {
        let font = mono_font(8.0, 16.0);
        let g = pack(WHITE, 0, GlyphMode::Halo, 0, 'A');
        let mut mock = MockBatch::new();
        let mut batch = TextBatch::new(&mut mock);
        font.draw_glyph(&mut batch, g, 0.0, 0.0, 0.0, 1.0, 1.0, 0, 1.0);
        assert!(mock.quads.len() > 20, "kernel plus main");
        let main = mock.quads.last().unwrap();
        assert_eq!(main.1[2], to_packed_float(WHITE));
    }

    #[test]
    fn shiny_draws_shine_above() {
        let font = mono_font(8.0, 16.0);
        let g = pack(RED, 0, GlyphMode::Shiny, 0, 'A');
        let mut mock = MockBatch::new();
        let mut batch = TextBatch::new(&mut mock);
        font.draw_glyph(&mut batch, g, 0.0, 0.0, 0.0, 1.0, 1.0, 0, 1.0);
        assert_eq!(mock.quads.len(), 2);
        assert_eq!(mock.quads[0].1[2], to_packed_float(font.shine_color));
    }

    // ── Decorations ─────────────────────────────────────────────────

    #[test]
    fn underline_adds_a_bar() {
        let font = mono_font(8.0, 16.0);
        let g = pack(WHITE, UNDERLINE, GlyphMode::None, 0, 'A');
        let mut mock = MockBatch::new();
        let mut batch = TextBatch::new(&mut mock);
        font.draw_glyph(&mut batch, g, 0.0, 0.0, 0.0, 1.0, 1.0, 0, 1.0);
        assert_eq!(mock.quads.len(), 2);
        // The test font maps '_' so the bar keeps the font texture.
        assert_eq!(mock.quads[1].0, TextureId(1));
    }

    #[test]
    fn strikethrough_bar_sits_higher_than_underline() {
        let font = mono_font(8.0, 16.0);
        let mut mock = MockBatch::new();
        let mut batch = TextBatch::new(&mut mock);
        let under = pack(WHITE, UNDERLINE, GlyphMode::None, 0, 'A');
        let strike = pack(WHITE, STRIKETHROUGH, GlyphMode::None, 0, 'A');
        font.draw_glyph(&mut batch, under, 0.0, 0.0, 0.0, 1.0, 1.0, 0, 1.0);
        font.draw_glyph(&mut batch, strike, 0.0, 0.0, 0.0, 1.0, 1.0, 0, 1.0);
        let under_y = mock.quads[1].1[1];
        let strike_y = mock.quads[3].1[1];
        assert!(strike_y > under_y);
    }

    #[test]
    fn fancy_modes_emit_pixel_steps() {
        let font = mono_font(8.0, 16.0);
        for mode in [
            GlyphMode::Error,
            GlyphMode::Context,
            GlyphMode::Warn,
            GlyphMode::Suggest,
            GlyphMode::Note,
        ] {
            let g = pack(WHITE, 0, mode, 0, 'A');
            let mut mock = MockBatch::new();
            let mut batch = TextBatch::new(&mut mock);
            font.draw_glyph(&mut batch, g, 0.0, 0.0, 0.0, 1.0, 1.0, 0, 1.0);
            assert!(
                mock.quads.len() >= 2,
                "{mode:?} must add squiggle quads"
            );
            let fancy = to_packed_float(font.fancy_color(mode));
            assert!(
                mock.quads.iter().any(|(_, q)| q[2] == fancy),
                "{mode:?} squiggle color missing"
            );
        }
    }

    #[test]
    fn error_zigzag_alternates_rows() {
        let font = mono_font(8.0, 16.0);
        let g = pack(WHITE, 0, GlyphMode::Error, 0, 'A');
        let mut mock = MockBatch::new();
        let mut batch = TextBatch::new(&mut mock);
        font.draw_glyph(&mut batch, g, 0.0, 0.0, 0.0, 1.0, 1.0, 0, 1.0);
        // Squiggle quads follow the main quad; collect their bottom ys.
        let ys: Vec<f32> = mock.quads[1..].iter().map(|(_, q)| q[1]).collect();
        assert!(ys.len() >= 4);
        assert!((ys[0] - ys[1]).abs() > 1e-6, "steps alternate in y");
        assert!((ys[0] - ys[2]).abs() < 1e-6, "period is two steps");
    }

    // ── Special glyph paths ─────────────────────────────────────────

    #[test]
    fn box_drawing_uses_solid_quads() {
        let font = mono_font(8.0, 16.0);
        let g = plain('─');
        let mut mock = MockBatch::new();
        let mut batch = TextBatch::new(&mut mock);
        let advance =
            font.draw_glyph(&mut batch, g, 0.0, 0.0, 0.0, 1.0, 1.0, 0, 1.0);
        assert_eq!(advance, font.cell_width);
        assert!(!mock.quads.is_empty());
        for (tex, _) in &mock.quads {
            assert_eq!(*tex, TextureId::WHITE);
        }
    }

    #[test]
    fn small_caps_squashes_lowercase() {
        let font = mono_font(8.0, 16.0);
        let mut mock = MockBatch::new();
        let mut batch = TextBatch::new(&mut mock);
        let lower = pack(WHITE, 0, GlyphMode::SmallCaps, 0, 'a');
        let upper = pack(WHITE, 0, GlyphMode::SmallCaps, 0, 'A');
        font.draw_glyph(&mut batch, lower, 0.0, 0.0, 0.0, 1.0, 1.0, 0, 1.0);
        font.draw_glyph(&mut batch, upper, 0.0, 0.0, 0.0, 1.0, 1.0, 0, 1.0);
        let squashed = quad_height(&mock.quads[0].1);
        let full = quad_height(&mock.quads[1].1);
        assert!((squashed - full * 0.7).abs() < 1e-3);
    }

    #[test]
    fn jostle_is_deterministic() {
        let font = mono_font(8.0, 16.0);
        let g = pack(WHITE, 0, GlyphMode::Jostle, 0, 'A');
        let mut mock_a = MockBatch::new();
        let mut batch_a = TextBatch::new(&mut mock_a);
        font.draw_glyph(&mut batch_a, g, 3.0, 7.0, 0.0, 1.0, 1.0, 0, 1.0);
        let mut mock_b = MockBatch::new();
        let mut batch_b = TextBatch::new(&mut mock_b);
        font.draw_glyph(&mut batch_b, g, 3.0, 7.0, 0.0, 1.0, 1.0, 0, 1.0);
        assert_eq!(mock_a.quads[0].1, mock_b.quads[0].1);

        let mut mock_c = MockBatch::new();
        let mut batch_c = TextBatch::new(&mut mock_c);
        font.draw_glyph(&mut batch_c, g, 4.0, 7.0, 0.0, 1.0, 1.0, 0, 1.0);
        assert_ne!(mock_a.quads[0].1, mock_c.quads[0].1);
    }

    #[test]
    fn background_fills_behind_glyph() {
        let font = mono_font(8.0, 16.0);
        let mut mock = MockBatch::new();
        let mut batch = TextBatch::new(&mut mock);
        font.draw_glyph(&mut batch, plain('A'), 0.0, 0.0, 0.0, 1.0, 1.0, 0x2040_60FF, 1.0);
        assert_eq!(mock.quads.len(), 2);
        assert_eq!(mock.quads[0].0, TextureId::WHITE);
    }

    #[test]
    fn integer_position_rounds_the_pen() {
        let mut font = mono_font(8.0, 16.0);
        font.integer_position = true;
        let mut mock = MockBatch::new();
        let mut batch = TextBatch::new(&mut mock);
        font.draw_glyph(&mut batch, plain('A'), 10.4, 20.6, 0.0, 1.0, 1.0, 0, 1.0);
        let x0 = quad_x_min(&mock.quads[0].1);
        assert_eq!(x0, 10.0);
    }

    #[test]
    fn rotation_moves_vertices() {
        let font = mono_font(8.0, 16.0);
        let mut mock = MockBatch::new();
        let mut batch = TextBatch::new(&mut mock);
        font.draw_glyph(&mut batch, plain('A'), 0.0, 0.0, 0.0, 1.0, 1.0, 0, 1.0);
        font.draw_glyph(&mut batch, plain('A'), 0.0, 0.0, 90.0, 1.0, 1.0, 0, 1.0);
        assert_ne!(mock.quads[0].1, mock.quads[1].1);
    }

    // ── Distance-field uniform management ───────────────────────────

    #[test]
    fn texture_switch_pauses_and_resumes_sdf() {
        let mut font = mono_font(8.0, 16.0);
        font.distance_field = DistanceFieldType::Sdf;
        font.shader = Some(ShaderId(5));
        let sax = font
            .add_image(
                "sax",
                GlyphRegion {
                    texture: TextureId(42),
                    u: 0.0,
                    v: 0.0,
                    u2: 1.0,
                    v2: 1.0,
                    offset_x: 0.0,
                    offset_y: 0.0,
                    x_advance: 32.0,
                    width: 32.0,
                    height: 32.0,
                },
            )
            .unwrap();
        let mut mock = MockBatch::new();
        let mut batch = TextBatch::new(&mut mock);
        font.draw_glyph(&mut batch, plain('A'), 0.0, 0.0, 0.0, 1.0, 1.0, 0, 1.0);
        let image = glyph::apply_char(plain('A'), char::from_u32(sax).unwrap());
        font.draw_glyph(&mut batch, image, 8.0, 0.0, 0.0, 1.0, 1.0, 0, 1.0);
        font.draw_glyph(&mut batch, plain('B'), 24.0, 0.0, 0.0, 1.0, 1.0, 0, 1.0);
        let smoothing: Vec<f32> = mock
            .uniforms
            .iter()
            .filter(|(n, _)| n == "u_smoothing")
            .map(|&(_, v)| v)
            .collect();
        assert!(smoothing.contains(&0.0), "paused for the inline image");
        assert!(
            smoothing.iter().any(|&v| v > 0.0),
            "resumed for the font page"
        );
    }

    #[test]
    fn enable_shader_sets_smoothing() {
        let mut font = mono_font(8.0, 16.0);
        font.distance_field = DistanceFieldType::Sdf;
        font.shader = Some(ShaderId(3));
        let mut mock = MockBatch::new();
        font.enable_shader(&mut mock);
        assert_eq!(mock.shader, Some(ShaderId(3)));
        let small = mock.uniforms.last().unwrap().1;
        font.scale_to(16.0, 32.0);
        font.enable_shader(&mut mock);
        let large = mock.uniforms.last().unwrap().1;
        assert!(large > small, "u_smoothing grows with cell scale");
    }

    // ── Layout drawing ──────────────────────────────────────────────

    #[test]
    fn draw_glyphs_steps_the_pen() {
        let font = mono_font(8.0, 16.0);
        let mut layout = Layout::new();
        font.markup("abc", &mut layout);
        let mut mock = MockBatch::new();
        let mut batch = TextBatch::new(&mut mock);
        let width = font.draw_glyphs(
            &mut batch, &layout, 0.0, 0.0, Align::Left, 0.0, 0.0, 0.0,
        );
        assert_eq!(width, 24.0);
        assert_eq!(mock.quads.len(), 3);
        let xs: Vec<f32> = mock.quads.iter().map(|(_, q)| quad_x_min(q)).collect();
        assert!(xs[0] < xs[1] && xs[1] < xs[2]);
    }

    #[test]
    fn draw_glyphs_right_align_shifts_left() {
        let font = mono_font(8.0, 16.0);
        let mut layout = Layout::new();
        font.markup("abc", &mut layout);
        let mut left = MockBatch::new();
        let mut lb = TextBatch::new(&mut left);
        font.draw_glyphs(&mut lb, &layout, 100.0, 0.0, Align::Left, 0.0, 0.0, 0.0);
        let mut right = MockBatch::new();
        let mut rb = TextBatch::new(&mut right);
        font.draw_glyphs(&mut rb, &layout, 100.0, 0.0, Align::Right, 0.0, 0.0, 0.0);
        let dx = quad_x_min(&left.quads[0].1) - quad_x_min(&right.quads[0].1);
        assert!((dx - 24.0).abs() < 1e-3);
    }

    #[test]
    fn draw_glyphs_skips_typing_layer_bytes() {
        let mut font = mono_font(8.0, 16.0);
        font.omit_curly_braces = true;
        let mut layout = Layout::new();
        font.markup("a{SPEED=2}b", &mut layout);
        let mut mock = MockBatch::new();
        let mut batch = TextBatch::new(&mut mock);
        font.draw_glyphs(&mut batch, &layout, 0.0, 0.0, Align::Left, 0.0, 0.0, 0.0);
        assert_eq!(mock.quads.len(), 2, "only a and b draw");
    }

    #[test]
    fn draw_glyphs_descends_per_line() {
        let font = mono_font(8.0, 16.0);
        let mut layout = Layout::new();
        font.markup("a\nb", &mut layout);
        let mut mock = MockBatch::new();
        let mut batch = TextBatch::new(&mut mock);
        font.draw_glyphs(&mut batch, &layout, 0.0, 100.0, Align::Left, 0.0, 0.0, 0.0);
        assert_eq!(mock.quads.len(), 2);
        assert!(mock.quads[1].1[1] < mock.quads[0].1[1]);
    }

    #[test]
    fn typing_layer_advances_modulate_spacing() {
        let font = mono_font(8.0, 16.0);
        let mut layout = Layout::new();
        font.markup("ab", &mut layout);
        layout.advances[0] = 0.5; // typing effect squeezes the first step
        let mut mock = MockBatch::new();
        let mut batch = TextBatch::new(&mut mock);
        let width = font.draw_glyphs(
            &mut batch, &layout, 0.0, 0.0, Align::Left, 0.0, 0.0, 0.0,
        );
        assert_eq!(width, 12.0);
        let dx = quad_x_min(&mock.quads[1].1) - quad_x_min(&mock.quads[0].1);
        assert!((dx - 4.0).abs() < 1e-3);
    }
}
