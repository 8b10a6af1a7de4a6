// Lines, Layouts, and the parallel advance/sizing arrays the typing layer
// mutates between layout and draw.

use crate::font::Font;
use crate::glyph::{self, PackedGlyph};

/// How wrapped lines are stretched to the target width.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Justify {
    /// No stretching.
    #[default]
    None,
    /// Stretch only space glyphs.
    SpaceOnly,
    /// Stretch every glyph's advance.
    Full,
}

/// One wrapped row of glyphs with its measured size.
#[derive(Debug, Clone, Default)]
pub struct Line {
    pub glyphs: Vec<PackedGlyph>,
    /// Cached sum of scaled advances; valid after `calculate_size`.
    pub width: f32,
    /// Cached max scaled cell height; valid after `calculate_size`.
    pub height: f32,
}

impl Line {
    pub fn new() -> Line {
        Line::default()
    }
}

/// A measured paragraph: wrapped lines plus per-glyph advance multipliers
/// and draw-size multipliers, parallel to the flattened glyph sequence in
/// reading order.
///
/// `advances[i]` scales the i-th glyph's horizontal step (1.0 unless an
/// effect is animating it); `sizing[i]` scales its drawn quad. Glyphs a
/// parser emitted only for the typing layer carry advance 0 and sizing
/// `[0, 0]`, so they measure and draw as nothing.
#[derive(Debug, Clone)]
pub struct Layout {
    pub lines: Vec<Line>,
    pub advances: Vec<f32>,
    pub sizing: Vec<[f32; 2]>,
    /// Color applied when markup resets or no tag is active (RGBA8888).
    pub base_color: u32,
    /// Wrap width in world units; 0 or less disables wrapping.
    pub target_width: f32,
    /// Maximum wrapped lines before ellipsis handling kicks in.
    pub max_lines: usize,
    /// Appended when text is truncated at `max_lines`.
    pub ellipsis: Option<String>,
    /// True once truncation has happened; further glyphs are discarded.
    pub at_limit: bool,
    pub justification: Justify,
}

impl Default for Layout {
    fn default() -> Layout {
        Layout {
            lines: vec![Line::new()],
            advances: Vec::new(),
            sizing: Vec::new(),
            base_color: 0xFFFF_FFFE,
            target_width: 0.0,
            max_lines: usize::MAX,
            ellipsis: None,
            at_limit: false,
            justification: Justify::None,
        }
    }
}

impl Layout {
    pub fn new() -> Layout {
        Layout::default()
    }

    /// Clear all glyphs and measurements, keeping configuration
    /// (target width, max lines, ellipsis, justification, base color).
    pub fn reset(&mut self) {
        self.lines.clear();
        self.lines.push(Line::new());
        self.advances.clear();
        self.sizing.clear();
        self.at_limit = false;
    }

    /// Total glyphs across all lines.
    pub fn total_glyphs(&self) -> usize {
        self.lines.iter().map(|l| l.glyphs.len()).sum()
    }

    /// Number of glyphs on lines before `line_index`; the offset of that
    /// line's first glyph in `advances`/`sizing`.
    pub fn count_glyphs_before_line(&self, line_index: usize) -> usize {
        self.lines[..line_index.min(self.lines.len())]
            .iter()
            .map(|l| l.glyphs.len())
            .sum()
    }

    /// Flattened index of a glyph addressed by line and position.
    pub fn glyph_index(&self, line_index: usize, within: usize) -> usize {
        self.count_glyphs_before_line(line_index) + within
    }

    pub(crate) fn current_line(&mut self) -> &mut Line {
        if self.lines.is_empty() {
            self.lines.push(Line::new());
        }
        self.lines.last_mut().expect("at least one line")
    }

    /// Append a glyph with its advance multiplier and sizing pair.
    pub(crate) fn push_glyph(&mut self, glyph: PackedGlyph, advance: f32, sizing: [f32; 2]) {
        self.current_line().glyphs.push(glyph);
        self.advances.push(advance);
        self.sizing.push(sizing);
    }

    /// Recompute `width`/`height` of every line by replaying the advance
    /// logic of layout, and return the widest line's width.
    pub fn calculate_size(&mut self, font: &Font) -> f32 {
        let mut widest = 0.0f32;
        let mut base = 0usize;
        // Lines borrow check: walk by index so advances stay readable.
        for li in 0..self.lines.len() {
            let (w, h) = self.measure_line(font, li, base);
            base += self.lines[li].glyphs.len();
            self.lines[li].width = w;
            self.lines[li].height = h;
            widest = widest.max(w);
        }
        widest
    }

    /// Measure one line without writing the cache. `base` is the
    /// flattened index of the line's first glyph.
    pub(crate) fn measure_line(&self, font: &Font, line_index: usize, base: usize) -> (f32, f32) {
        let line = &self.lines[line_index];
        let mut width = 0.0f32;
        let mut height = 0.0f32;
        let mut prev: Option<(u8, u32)> = None;
        for (i, &g) in line.glyphs.iter().enumerate() {
            let scale = self.advances.get(base + i).copied().unwrap_or(1.0);
            if scale == 0.0 {
                continue;
            }
            let slot = glyph::extract_font_index(g);
            let resolved = font.resolve_slot(slot);
            let cp = glyph::extract_codepoint(g);
            if let Some((pslot, pcp)) = prev {
                if pslot == slot {
                    width += resolved.kern(pcp, cp) * resolved.scale_x * scale;
                }
            }
            width += font.x_advance(scale, g);
            height = height.max(resolved.cell_height * scale);
            prev = Some((slot, cp));
        }
        if height == 0.0 {
            height = font.cell_height;
        }
        (width, height)
    }

    /// Fill `out` with each glyph's absolute x offset from its line start,
    /// resetting to 0 at every line break. Every stored glyph gets an
    /// entry, including zero-advance typing-layer bytes.
    pub fn calculate_x_advances(&self, font: &Font, out: &mut Vec<f32>) {
        out.clear();
        out.reserve(self.total_glyphs());
        let mut base = 0usize;
        for line in &self.lines {
            let mut x = 0.0f32;
            let mut prev: Option<(u8, u32)> = None;
            for (i, &g) in line.glyphs.iter().enumerate() {
                let scale = self.advances.get(base + i).copied().unwrap_or(1.0);
                if scale != 0.0 {
                    let slot = glyph::extract_font_index(g);
                    let resolved = font.resolve_slot(slot);
                    let cp = glyph::extract_codepoint(g);
                    if let Some((pslot, pcp)) = prev {
                        if pslot == slot {
                            x += resolved.kern(pcp, cp) * resolved.scale_x * scale;
                        }
                    }
                    prev = Some((slot, cp));
                }
                out.push(x);
                if scale != 0.0 {
                    x += font.x_advance(scale, g);
                }
            }
            base += line.glyphs.len();
        }
    }

    /// Overall height: the sum of line heights (call `calculate_size`
    /// first).
    pub fn height(&self) -> f32 {
        self.lines.iter().map(|l| l.height).sum()
    }
}
