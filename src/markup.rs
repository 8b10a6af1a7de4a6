// Square-bracket markup parser: a single-pass state machine that turns
// tagged text into a measured Layout of packed glyphs.

use crate::color::{describe, ColorLookup, Palette};
use crate::font::Font;
use crate::glyph::{
    self, GlyphMode, PackedGlyph, ALPHA_EXTEND, BLACK_OUTLINE, BOLD, CHAR_MASK, MIDSCRIPT,
    OBLIQUE, SCRIPT_MASK, STRIKETHROUGH, SUBSCRIPT, SUPERSCRIPT, UNDERLINE,
};
use crate::layout::Layout;
use crate::wrap::{apply_justification, handle_ellipsis, wrap_current_line};

/// What a `[?..]`-family tag selected.
enum ModeSelection {
    Clear,
    Mode(GlyphMode),
    BlackOutline,
}

/// Route a mode name to its mode by the distinguishing prefixes the
/// markup grammar promises. Unknown names clear the mode.
fn parse_mode(name: &str) -> ModeSelection {
    let upper = name.trim().to_uppercase();
    if upper.is_empty() {
        return ModeSelection::Clear;
    }
    let m = |mode| ModeSelection::Mode(mode);
    if upper.starts_with("BLU") {
        m(GlyphMode::BlueOutline)
    } else if upper.starts_with("RED") {
        m(GlyphMode::RedOutline)
    } else if upper.starts_with("YEL") {
        m(GlyphMode::YellowOutline)
    } else if upper.starts_with("WARN") {
        m(GlyphMode::Warn)
    } else if upper.starts_with("WH") {
        m(GlyphMode::WhiteOutline)
    } else if upper.starts_with('B') {
        ModeSelection::BlackOutline
    } else if upper.starts_with("SHI") {
        m(GlyphMode::Shiny)
    } else if upper.starts_with("SHAD") || upper.starts_with("DROP") || upper.starts_with('D') {
        m(GlyphMode::DropShadow)
    } else if upper.starts_with("NEO") {
        m(GlyphMode::Neon)
    } else if upper.starts_with("HAL") {
        m(GlyphMode::Halo)
    } else if upper.starts_with("SM") {
        m(GlyphMode::SmallCaps)
    } else if upper.starts_with('J') {
        m(GlyphMode::Jostle)
    } else if upper.starts_with('E') {
        m(GlyphMode::Error)
    } else if upper.starts_with("CON") {
        m(GlyphMode::Context)
    } else if upper.starts_with("SUG") {
        m(GlyphMode::Suggest)
    } else if upper.starts_with('N') {
        m(GlyphMode::Note)
    } else {
        ModeSelection::Clear
    }
}

/// Parse `[#...]` hex content. 3- and 4-digit forms double each nibble;
/// 6 digits get opaque alpha. Anything else resets to the base color.
fn parse_hex_color(content: &str, base: u32) -> u32 {
    let doubled = |n: u32| n << 4 | n;
    let parsed = u32::from_str_radix(content, 16).ok();
    match (content.len(), parsed) {
        (8, Some(v)) => v,
        (6, Some(v)) => v << 8 | 0xFF,
        (4, Some(v)) => {
            doubled(v >> 12 & 0xF) << 24
                | doubled(v >> 8 & 0xF) << 16
                | doubled(v >> 4 & 0xF) << 8
                | doubled(v & 0xF)
        }
        (3, Some(v)) => {
            doubled(v >> 8 & 0xF) << 24
                | doubled(v >> 4 & 0xF) << 16
                | doubled(v & 0xF) << 8
                | 0xFF
        }
        _ => base,
    }
}

/// Parser state carried across one `markup` call.
struct ParseState {
    /// The current-formatting word; codepoint bits are overwritten per
    /// emitted glyph.
    current: PackedGlyph,
    font_index: u8,
    scale: f32,
    capitalize: bool,
    previous_was_letter: bool,
    caps_lock: bool,
    lower_case: bool,
    /// True until the first visible glyph of a line; compensates negative
    /// `offset_x` at line start.
    initial: bool,
    history: Vec<PackedGlyph>,
    /// Running width of the current line.
    width: f32,
    /// Last emitted (font slot, codepoint) for kerning.
    prev: Option<(u8, u32)>,
}

impl ParseState {
    fn new(base_format: PackedGlyph) -> ParseState {
        ParseState {
            current: base_format,
            font_index: 0,
            scale: 1.0,
            capitalize: false,
            previous_was_letter: false,
            caps_lock: false,
            lower_case: false,
            initial: true,
            history: Vec::new(),
            width: 0.0,
            prev: None,
        }
    }

    fn reset(&mut self, base_format: PackedGlyph) {
        self.current = base_format;
        self.font_index = 0;
        self.scale = 1.0;
        self.capitalize = false;
        self.caps_lock = false;
        self.lower_case = false;
    }
}

impl Font {
    /// Parse markup into `layout` using the default named palette for
    /// color tags. Returns the widest line's width.
    pub fn markup(&self, text: &str, layout: &mut Layout) -> f32 {
        self.markup_with(text, layout, &Palette)
    }

    /// Parse markup into `layout`, resolving color names through
    /// `colors`. Appends to whatever the layout already holds; markup
    /// never fails, it only degrades (unknown tags become color lookups,
    /// failed lookups reset to the base color).
    pub fn markup_with(
        &self,
        text: &str,
        layout: &mut Layout,
        colors: &dyn ColorLookup,
    ) -> f32 {
        let base_format =
            (((layout.base_color & 0xFFFF_FFFE) as u64) << 32) | ALPHA_EXTEND;
        let mut state = ParseState::new(base_format);
        let chars: Vec<char> = text.chars().collect();
        let mut i = 0usize;

        while i < chars.len() && !layout.at_limit {
            let ch = chars[i];
            let next = chars.get(i + 1).copied();

            if self.omit_curly_braces && ch == '{' {
                if next == Some('{') {
                    self.emit(layout, &mut state, '{');
                    i += 2;
                    continue;
                }
                let close = chars[i..]
                    .iter()
                    .position(|&c| c == '}')
                    .map(|p| i + p)
                    .unwrap_or(chars.len() - 1);
                self.curly_region(layout, &mut state, &chars[i..=close.min(chars.len() - 1)]);
                i = close + 1;
                continue;
            }

            if self.enable_square_brackets && ch == '[' {
                if next == Some('[') {
                    self.emit(layout, &mut state, '[');
                    i += 2;
                    continue;
                }
                // Unmatched '[' consumes to end of string.
                let close = chars[i + 1..]
                    .iter()
                    .position(|&c| c == ']')
                    .map(|p| i + 1 + p)
                    .unwrap_or(chars.len());
                let content: String = chars[i + 1..close.min(chars.len())].iter().collect();
                self.apply_tag(layout, &mut state, &content, colors);
                i = close + 1;
                continue;
            }

            if self.enable_square_brackets && ch == ']' && next == Some(']') {
                self.emit(layout, &mut state, ']');
                i += 2;
                continue;
            }

            if self.omit_curly_braces && ch == '}' && next == Some('}') {
                self.emit(layout, &mut state, '}');
                i += 2;
                continue;
            }

            if ch == '\n' {
                self.newline(layout, &mut state);
                i += 1;
                continue;
            }

            self.emit(layout, &mut state, ch);
            i += 1;
        }

        let widest = layout.calculate_size(self);
        apply_justification(layout, self);
        layout.calculate_size(self).max(widest)
    }

    /// Apply one `[...]` tag's content to the parse state, emitting
    /// glyphs for the few tags that produce output.
    fn apply_tag(
        &self,
        layout: &mut Layout,
        state: &mut ParseState,
        content: &str,
        colors: &dyn ColorLookup,
    ) {
        let base_format =
            (((layout.base_color & 0xFFFF_FFFE) as u64) << 32) | ALPHA_EXTEND;

        // "[]": pop one history entry, or reset when empty.
        if content.is_empty() {
            state.current = state.history.pop().unwrap_or(base_format);
            state.font_index = glyph::extract_font_index(state.current);
            return;
        }

        // "[ ]": hard reset, no history push.
        if content == " " {
            state.reset(base_format);
            return;
        }

        let mut it = content.chars();
        let first = it.next().expect("non-empty tag");
        let rest: String = it.collect();

        // "[ label]": restore a saved state.
        if first == ' ' {
            if let Some(saved) = self.stored_state(rest.trim()) {
                state.history.push(state.current);
                state.current = saved;
                state.font_index = glyph::extract_font_index(saved);
            }
            return;
        }

        // "[(label)]": save the current state, codepoint cleared.
        if first == '(' && rest.ends_with(')') {
            let label = &rest[..rest.len() - 1];
            self.store_state(label, state.current & !CHAR_MASK);
            return;
        }

        // "[-tag]": escaped for the typing layer; pass through unmeasured.
        if first == '-' {
            self.emit_invisible(layout, state, '[');
            for ch in rest.chars() {
                self.emit_invisible(layout, state, ch);
            }
            self.emit_invisible(layout, state, ']');
            return;
        }

        // "[+name]": inline image from the atlas names.
        if first == '+' {
            match self.atlas_lookup(&rest) {
                Some(code) => {
                    let ch = char::from_u32(code).unwrap_or('\u{FFFD}');
                    self.emit(layout, state, ch);
                }
                None => log::debug!("unknown inline image {rest:?}"),
            }
            return;
        }

        // Single-character style toggles.
        if rest.is_empty() {
            match first {
                '*' => {
                    state.history.push(state.current);
                    state.current ^= BOLD;
                    return;
                }
                '/' => {
                    state.history.push(state.current);
                    state.current ^= OBLIQUE;
                    return;
                }
                '_' => {
                    state.history.push(state.current);
                    state.current ^= UNDERLINE;
                    return;
                }
                '~' => {
                    state.history.push(state.current);
                    state.current ^= STRIKETHROUGH;
                    return;
                }
                '^' | '=' | '.' => {
                    let script = match first {
                        '^' => SUPERSCRIPT,
                        '=' => MIDSCRIPT,
                        _ => SUBSCRIPT,
                    };
                    state.history.push(state.current);
                    // The three scripts share one field; toggling one
                    // clears the others.
                    state.current = if state.current & SCRIPT_MASK == script {
                        state.current & !SCRIPT_MASK
                    } else {
                        (state.current & !SCRIPT_MASK) | script
                    };
                    return;
                }
                ';' => {
                    state.capitalize = !state.capitalize;
                    state.previous_was_letter = false;
                    return;
                }
                '!' => {
                    state.caps_lock = !state.caps_lock;
                    state.lower_case = false;
                    return;
                }
                ',' => {
                    state.lower_case = !state.lower_case;
                    state.caps_lock = false;
                    return;
                }
                '%' => {
                    state.history.push(state.current);
                    state.scale = 1.0;
                    return;
                }
                '?' => {
                    state.history.push(state.current);
                    state.current = glyph::apply_mode(state.current, GlyphMode::None);
                    return;
                }
                '@' => {
                    state.history.push(state.current);
                    state.font_index = 0;
                    state.current = glyph::apply_font_index(state.current, 0);
                    return;
                }
                '#' => {
                    state.history.push(state.current);
                    state.current ^= BLACK_OUTLINE;
                    return;
                }
                '|' => return,
                _ => {}
            }
        }

        match first {
            '%' => {
                // "[%N]" scale, or "[%?..]"/"[%^..]" mode selection.
                state.history.push(state.current);
                if let Some(mode_name) = rest
                    .strip_prefix('?')
                    .or_else(|| rest.strip_prefix('^'))
                {
                    self.select_mode(state, mode_name);
                } else if let Ok(percent) = rest.trim().parse::<f32>() {
                    state.scale = (percent / 100.0).clamp(0.0, 8.0);
                } else {
                    state.scale = 1.0;
                }
            }
            '?' => {
                state.history.push(state.current);
                self.select_mode(state, &rest);
            }
            '@' => {
                state.history.push(state.current);
                let index = match self.family() {
                    Some(family) => family.index_of(&rest),
                    None => 0,
                };
                state.font_index = index;
                state.current = glyph::apply_font_index(state.current, index);
            }
            '#' => {
                state.history.push(state.current);
                let color = parse_hex_color(&rest, layout.base_color);
                state.current =
                    glyph::apply_color(state.current, color & 0xFFFF_FFFE);
            }
            '|' => {
                state.history.push(state.current);
                let color = colors
                    .rgba(&rest)
                    .or_else(|| describe(colors, &rest))
                    .unwrap_or(layout.base_color);
                state.current =
                    glyph::apply_color(state.current, color & 0xFFFF_FFFE);
            }
            _ => {
                // "[Name]": color-name lookup; failure resets to base.
                state.history.push(state.current);
                let color = colors
                    .rgba(content)
                    .or_else(|| describe(colors, content))
                    .unwrap_or(layout.base_color);
                state.current =
                    glyph::apply_color(state.current, color & 0xFFFF_FFFE);
            }
        }
    }

    fn select_mode(&self, state: &mut ParseState, name: &str) {
        match parse_mode(name) {
            ModeSelection::Clear => {
                state.current = glyph::apply_mode(state.current, GlyphMode::None);
            }
            ModeSelection::Mode(mode) => {
                state.current = glyph::apply_mode(state.current, mode);
            }
            ModeSelection::BlackOutline => {
                state.current |= BLACK_OUTLINE;
            }
        }
    }

    /// A `{...}` region: kept in the layout for the typing layer, never
    /// measured. Font/scale/script directives still update parse state so
    /// the surrounding text measures correctly.
    fn curly_region(&self, layout: &mut Layout, state: &mut ParseState, region: &[char]) {
        let inner: String = region
            .iter()
            .skip(1)
            .take(region.len().saturating_sub(2))
            .collect();

        if inner.eq_ignore_ascii_case("RESET") {
            let base_format =
                (((layout.base_color & 0xFFFF_FFFE) as u64) << 32) | ALPHA_EXTEND;
            state.reset(base_format);
        } else if let Some(font_name) = inner.strip_prefix('@') {
            let index = match self.family() {
                Some(family) if !font_name.is_empty() => family.index_of(font_name),
                _ => 0,
            };
            state.font_index = index;
            state.current = glyph::apply_font_index(state.current, index);
        } else if let Some(size) = inner.strip_prefix('%') {
            state.scale = match size.trim().trim_end_matches('%').parse::<f32>() {
                Ok(percent) => (percent / 100.0).clamp(0.0, 8.0),
                Err(_) => 1.0,
            };
        } else if inner == "^" || inner == "=" || inner == "." {
            let script = match inner.as_str() {
                "^" => SUPERSCRIPT,
                "=" => MIDSCRIPT,
                _ => SUBSCRIPT,
            };
            state.current = if state.current & SCRIPT_MASK == script {
                state.current & !SCRIPT_MASK
            } else {
                (state.current & !SCRIPT_MASK) | script
            };
        }

        // Emit the raw region for the typing layer, expanding embedded
        // inline-image tags to their codepoints.
        let mut idx = 0usize;
        let region_chars: Vec<char> = region.to_vec();
        while idx < region_chars.len() {
            let c = region_chars[idx];
            if c == '['
                && region_chars.get(idx + 1) == Some(&'+')
            {
                if let Some(end) = region_chars[idx..].iter().position(|&x| x == ']') {
                    let name: String =
                        region_chars[idx + 2..idx + end].iter().collect();
                    if let Some(code) = self.atlas_lookup(&name) {
                        let ch = char::from_u32(code).unwrap_or('\u{FFFD}');
                        self.emit_invisible(layout, state, ch);
                        idx += end + 1;
                        continue;
                    }
                }
            }
            self.emit_invisible(layout, state, c);
            idx += 1;
        }
    }

    /// Append one visible glyph, fold its case, advance the running
    /// width, and wrap or truncate when the target width is exceeded.
    fn emit(&self, layout: &mut Layout, state: &mut ParseState, ch: char) {
        if layout.at_limit {
            return;
        }
        let show = if state.caps_lock {
            ch.to_uppercase().next().unwrap_or(ch)
        } else if state.lower_case {
            ch.to_lowercase().next().unwrap_or(ch)
        } else if state.capitalize && !state.previous_was_letter && ch.is_alphabetic() {
            ch.to_uppercase().next().unwrap_or(ch)
        } else {
            ch
        };
        state.previous_was_letter = ch.is_alphabetic();

        let packed = glyph::apply_char(state.current, show);
        layout.push_glyph(packed, state.scale, [state.scale, state.scale]);

        let resolved = self.resolve_slot(state.font_index);
        let cp = glyph::extract_codepoint(packed);
        if let Some((pslot, pcp)) = state.prev {
            if pslot == state.font_index {
                state.width += resolved.kern(pcp, cp) * resolved.scale_x * state.scale;
            }
        }
        if state.initial {
            let region = resolved.region_or_default(cp);
            if region.offset_x.is_finite() && region.offset_x < 0.0 {
                state.width -= region.offset_x * resolved.scale_x * state.scale;
            }
            state.initial = false;
        }
        state.width += self.x_advance(state.scale, packed);
        state.prev = Some((state.font_index, cp));

        if layout.target_width > 0.0
            && state.width > layout.target_width
            && layout.lines.last().map_or(0, |l| l.glyphs.len()) > 1
        {
            if layout.lines.len() >= layout.max_lines {
                handle_ellipsis(layout, self);
            } else {
                state.width = wrap_current_line(layout, self);
                state.prev = layout
                    .lines
                    .last()
                    .and_then(|l| l.glyphs.last())
                    .map(|&g| (glyph::extract_font_index(g), glyph::extract_codepoint(g)));
            }
        }
    }

    /// Append a typing-layer byte: present in the glyph stream, zero
    /// advance, zero sizing, so it never measures or draws.
    fn emit_invisible(&self, layout: &mut Layout, state: &mut ParseState, ch: char) {
        if layout.at_limit {
            return;
        }
        let packed = glyph::apply_char(state.current, ch);
        layout.push_glyph(packed, 0.0, [0.0, 0.0]);
    }

    /// End the current line: the newline glyph stays on the line it
    /// terminates, then a fresh line begins.
    fn newline(&self, layout: &mut Layout, state: &mut ParseState) {
        let packed = glyph::apply_char(state.current, '\n');
        layout.push_glyph(packed, state.scale, [state.scale, state.scale]);

        if layout.lines.len() >= layout.max_lines {
            handle_ellipsis(layout, self);
            return;
        }
        layout.lines.push(crate::layout::Line::new());
        state.width = 0.0;
        state.initial = true;
        state.prev = None;
        state.previous_was_letter = false;
    }
}
