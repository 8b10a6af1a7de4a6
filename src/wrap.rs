// Word wrap, ellipsis truncation, justification, and the CJK
// break-opportunity helper.

use std::borrow::Cow;
use std::sync::OnceLock;

use regex::Regex;

use crate::font::Font;
use crate::glyph::{self, PackedGlyph};
use crate::layout::{Justify, Layout, Line};

/// Style-inheritance mask for appended ellipsis glyphs: color,
/// alpha-extend, outline flag, mode, and font index survive; the toggled
/// style bits and codepoint do not.
const ELLIPSIS_INHERIT_MASK: u64 = 0xFFFF_FFFF_81FF_0000;

/// Space-like characters that may be discarded at a wrap point. The
/// no-break spaces are deliberately absent.
pub(crate) fn is_space_char(ch: char) -> bool {
    matches!(
        ch,
        ' ' | '\t'
            | '\u{1680}'
            | '\u{2000}'..='\u{200B}'
            | '\u{205F}'
            | '\u{3000}'
    )
}

/// Hyphen-like characters that allow a break after themselves and stay on
/// the earlier line.
pub(crate) fn is_hyphen_char(ch: char) -> bool {
    matches!(
        ch,
        '-' | '\u{00AD}' | '\u{2010}'..='\u{2014}' | '\u{2027}'
    )
}

/// Whether a break may occur after this character.
pub(crate) fn is_break_char(ch: char) -> bool {
    is_space_char(ch) || is_hyphen_char(ch)
}

fn is_break_glyph(glyph: PackedGlyph) -> bool {
    // A zero-color glyph is a typing-effect marker and always breakable.
    is_break_char(glyph::extract_char(glyph)) || glyph::extract_color(glyph) == 0
}

fn is_space_glyph(glyph: PackedGlyph) -> bool {
    is_space_char(glyph::extract_char(glyph))
}

/// Split the overfull last line at the best break opportunity, moving the
/// tail glyphs and their parallel array slices onto a fresh line. Returns
/// the new current line's width.
///
/// The search walks backward from end-1 and prefers the rightmost
/// candidate; runs of spaces around a space break are discarded, with one
/// space kept on the earlier line. With no break opportunity the overflow
/// glyph alone moves down (character-level break).
pub(crate) fn wrap_current_line(layout: &mut Layout, font: &Font) -> f32 {
    let line_index = layout.lines.len() - 1;
    let base = layout.count_glyphs_before_line(line_index);
    let glyphs = &layout.lines[line_index].glyphs;
    let len = glyphs.len();
    if len < 2 {
        return layout.lines[line_index].width;
    }

    // Rightmost break opportunity, leaving at least the overflow glyph in
    // the tail and at least one glyph on the earlier line.
    let mut break_at = None;
    let mut i = len - 2;
    while i >= 1 {
        if is_break_glyph(glyphs[i]) {
            break_at = Some(i);
            break;
        }
        i -= 1;
    }

    let (keep, tail_start) = match break_at {
        Some(bi) if is_hyphen_char(glyph::extract_char(glyphs[bi]))
            && glyph::extract_color(glyphs[bi]) != 0 =>
        {
            // Hyphen stays on the earlier line, nothing is discarded.
            (bi + 1, bi + 1)
        }
        Some(bi) => {
            // Skip leftward past consecutive spaces; the earlier line
            // keeps exactly one of them.
            let mut first = bi;
            while first > 1 && is_space_glyph(glyphs[first - 1]) {
                first -= 1;
            }
            (first + 1, bi + 1)
        }
        None => (len - 1, len - 1),
    };

    // Discard the glyphs between keep and tail_start along with their
    // advance/sizing entries so the arrays stay parallel.
    let line = &mut layout.lines[line_index];
    let tail_glyphs: Vec<PackedGlyph> = line.glyphs.drain(tail_start..).collect();
    line.glyphs.truncate(keep);

    let tail_advances: Vec<f32> = layout.advances.drain(base + tail_start..).collect();
    layout.advances.truncate(base + keep);
    let tail_sizing: Vec<[f32; 2]> = layout.sizing.drain(base + tail_start..).collect();
    layout.sizing.truncate(base + keep);

    let mut new_line = Line::new();
    new_line.glyphs = tail_glyphs;
    layout.lines.push(new_line);
    layout.advances.extend(tail_advances);
    layout.sizing.extend(tail_sizing);

    // Recompute both affected widths.
    let (w0, h0) = layout.measure_line(font, line_index, base);
    layout.lines[line_index].width = w0;
    layout.lines[line_index].height = h0;
    let base1 = layout.count_glyphs_before_line(line_index + 1);
    let (w1, h1) = layout.measure_line(font, line_index + 1, base1);
    layout.lines[line_index + 1].width = w1;
    layout.lines[line_index + 1].height = h1;
    w1
}

/// Truncate the overfull last line so the configured ellipsis fits within
/// the target width, appending the ellipsis in the style of the glyph at
/// the cut. Marks the layout at-limit; the caller discards further input.
pub(crate) fn handle_ellipsis(layout: &mut Layout, font: &Font) {
    let line_index = layout.lines.len() - 1;
    let base = layout.count_glyphs_before_line(line_index);
    let ellipsis = layout.ellipsis.clone().unwrap_or_default();
    let target = layout.target_width;

    let ellipsis_width = |font: &Font, style: PackedGlyph| -> f32 {
        ellipsis
            .chars()
            .map(|ch| font.x_advance(1.0, glyph::apply_char(style, ch)))
            .sum()
    };

    // First try the rightmost break opportunity whose truncation leaves
    // room for the ellipsis.
    let mut truncate_at = {
        let glyphs = &layout.lines[line_index].glyphs;
        let len = glyphs.len();
        let mut found = None;
        if len >= 2 {
            let mut i = len - 2;
            while i >= 1 {
                if is_break_glyph(glyphs[i]) {
                    let mut cut = if is_hyphen_char(glyph::extract_char(glyphs[i])) {
                        i + 1
                    } else {
                        i
                    };
                    while cut > 0 && is_space_glyph(glyphs[cut - 1]) {
                        cut -= 1;
                    }
                    found = Some(cut);
                    break;
                }
                i -= 1;
            }
        }
        found.unwrap_or(len)
    };

    loop {
        let line = &mut layout.lines[line_index];
        line.glyphs.truncate(truncate_at);
        layout.advances.truncate(base + truncate_at);
        layout.sizing.truncate(base + truncate_at);

        let style = layout.lines[line_index]
            .glyphs
            .last()
            .map(|&g| g & ELLIPSIS_INHERIT_MASK)
            .unwrap_or(((layout.base_color as u64) << 32) | glyph::ALPHA_EXTEND);
        let (width, _) = layout.measure_line(font, line_index, base);
        if target <= 0.0
            || width + ellipsis_width(font, style) <= target
            || layout.lines[line_index].glyphs.is_empty()
        {
            for ch in ellipsis.chars() {
                layout.push_glyph(glyph::apply_char(style, ch), 1.0, [1.0, 1.0]);
            }
            break;
        }
        // Character-level fallback: drop one more glyph and retry.
        truncate_at = layout.lines[line_index].glyphs.len() - 1;
    }

    let (w, h) = layout.measure_line(font, line_index, base);
    layout.lines[line_index].width = w;
    layout.lines[line_index].height = h;
    layout.at_limit = true;
}

/// Stretch wrapped lines to the target width by scaling advances. The
/// layout's last line and each line's last logical glyph (skipping
/// trailing newlines and spaces) are never stretched.
pub(crate) fn apply_justification(layout: &mut Layout, font: &Font) {
    if layout.justification == Justify::None || layout.target_width <= 0.0 {
        return;
    }
    let line_count = layout.lines.len();
    let mut base = 0usize;
    for li in 0..line_count {
        let glyph_count = layout.lines[li].glyphs.len();
        if li + 1 == line_count {
            break;
        }
        // Last logical glyph: skip trailing newline and spaces.
        let logical_end = {
            let glyphs = &layout.lines[li].glyphs;
            let mut end = glyph_count;
            while end > 0 {
                let ch = glyph::extract_char(glyphs[end - 1]);
                if ch == '\n' || is_space_char(ch) {
                    end -= 1;
                } else {
                    break;
                }
            }
            end
        };
        if logical_end < 2 {
            base += glyph_count;
            continue;
        }

        let last_advance = {
            let g = layout.lines[li].glyphs[logical_end - 1];
            font.x_advance(layout.advances[base + logical_end - 1], g)
        };
        let (width, _) = layout.measure_line(font, li, base);
        if width >= layout.target_width || width <= last_advance {
            base += glyph_count;
            continue;
        }

        match layout.justification {
            Justify::Full => {
                let ratio =
                    (layout.target_width - last_advance) / (width - last_advance);
                for i in 0..logical_end - 1 {
                    layout.advances[base + i] *= ratio;
                }
            }
            Justify::SpaceOnly => {
                let mut space_width = 0.0f32;
                for i in 0..logical_end - 1 {
                    let g = layout.lines[li].glyphs[i];
                    if is_space_glyph(g) {
                        space_width += font.x_advance(layout.advances[base + i], g);
                    }
                }
                if space_width > 0.0 {
                    let ratio =
                        (layout.target_width - (width - space_width)) / space_width;
                    for i in 0..logical_end - 1 {
                        if is_space_glyph(layout.lines[li].glyphs[i]) {
                            layout.advances[base + i] *= ratio;
                        }
                    }
                }
            }
            Justify::None => {}
        }
        let (w, h) = layout.measure_line(font, li, base);
        layout.lines[li].width = w;
        layout.lines[li].height = h;
        base += glyph_count;
    }
}

/// Append a zero-width space after every CJK ideograph, kana, or hangul
/// syllable so the wrapper finds break opportunities inside runs that
/// carry no spaces. Returns the input untouched when nothing matches.
pub fn insert_zero_width_spaces_in_cjk(text: &str) -> Cow<'_, str> {
    static CJK: OnceLock<Regex> = OnceLock::new();
    let re = CJK.get_or_init(|| {
        Regex::new(
            "[\u{3040}-\u{30FF}\u{31F0}-\u{31FF}\u{3400}-\u{4DBF}\u{4E00}-\u{9FFF}\
             \u{AC00}-\u{D7AF}\u{F900}-\u{FAFF}]",
        )
        .expect("CJK class compiles")
    });
    re.replace_all(text, "$0\u{200B}")
}
