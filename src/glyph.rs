// Packed-glyph codec: one 64-bit word per visible unit of text.
//
// Bit layout (LSB right):
//   0-15   codepoint (BMP code unit; 0x02 is the stored form of '[')
//   16-19  font index (slot in the owning FontFamily)
//   20-23  alternate mode
//   24     black-outline flag
//   25-26  script (0 normal, 1 sub, 2 mid, 3 super)
//   27     strikethrough
//   28     underline
//   29     oblique
//   30     bold
//   31     alpha-extend, forced to 1
//   32-63  RGBA8888 color

/// One glyph: codepoint, style, mode, font slot, and color in a single word.
pub type PackedGlyph = u64;

/// Bold style bit. Stacks with any mode; not part of the mode field.
pub const BOLD: u64 = 1 << 30;
/// Oblique (faux-italic) style bit.
pub const OBLIQUE: u64 = 1 << 29;
/// Underline style bit.
pub const UNDERLINE: u64 = 1 << 28;
/// Strikethrough style bit.
pub const STRIKETHROUGH: u64 = 1 << 27;
/// Subscript: script field value 1.
pub const SUBSCRIPT: u64 = 1 << 25;
/// Midscript: script field value 2.
pub const MIDSCRIPT: u64 = 2 << 25;
/// Superscript: script field value 3.
pub const SUPERSCRIPT: u64 = 3 << 25;
/// Black-outline flag, independent of the mode field.
pub const BLACK_OUTLINE: u64 = 1 << 24;
/// Alpha-extend bit; always set so the packed-float alpha table stays usable.
pub const ALPHA_EXTEND: u64 = 1 << 31;

/// Mask covering the two script bits.
pub const SCRIPT_MASK: u64 = 3 << 25;
/// Mask covering every style bit a setter may change (24-30).
pub const STYLE_MASK: u64 = 0x7F00_0000;
/// Mask covering the mode nibble (bits 20-23).
pub const MODE_MASK: u64 = 0xF << 20;
/// Mask covering the font-index nibble (bits 16-19).
pub const FONT_INDEX_MASK: u64 = 0xF << 16;
/// Mask covering the stored codepoint.
pub const CHAR_MASK: u64 = 0xFFFF;
/// Mask covering the 32 color bits.
pub const COLOR_MASK: u64 = 0xFFFF_FFFF_0000_0000;

/// Stored codepoint that round-trips to '[' on extraction, so literal
/// brackets survive markup parsing.
pub const BRACKET_PLACEHOLDER: u16 = 0x02;

/// The sixteen alternate modes selectable via `[?MODE]` markup.
///
/// `SmallCaps` changes draw-time case upward; `Jostle` applies a
/// deterministic per-position offset; the five squiggle modes add a colored
/// line below the glyph without touching the main glyph; the four
/// `*Outline` modes recolor the outline ring and imply the black-outline
/// flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[repr(u8)]
pub enum GlyphMode {
    #[default]
    None = 0,
    SmallCaps = 1,
    Jostle = 2,
    Shiny = 3,
    Neon = 4,
    Halo = 5,
    DropShadow = 6,
    Error = 7,
    Context = 8,
    Warn = 9,
    Suggest = 10,
    Note = 11,
    BlueOutline = 12,
    RedOutline = 13,
    YellowOutline = 14,
    WhiteOutline = 15,
}

impl GlyphMode {
    /// All modes, indexable by field value.
    pub const ALL: [GlyphMode; 16] = [
        GlyphMode::None,
        GlyphMode::SmallCaps,
        GlyphMode::Jostle,
        GlyphMode::Shiny,
        GlyphMode::Neon,
        GlyphMode::Halo,
        GlyphMode::DropShadow,
        GlyphMode::Error,
        GlyphMode::Context,
        GlyphMode::Warn,
        GlyphMode::Suggest,
        GlyphMode::Note,
        GlyphMode::BlueOutline,
        GlyphMode::RedOutline,
        GlyphMode::YellowOutline,
        GlyphMode::WhiteOutline,
    ];

    /// Decode a mode from the low nibble of `bits`.
    #[inline]
    pub fn from_bits(bits: u64) -> GlyphMode {
        Self::ALL[(bits & 0xF) as usize]
    }

    /// The mode's contribution to a packed glyph (bits 20-23).
    #[inline]
    pub const fn to_bits(self) -> u64 {
        (self as u64) << 20
    }

    /// True for the five squiggle-underline modes.
    #[inline]
    pub const fn is_fancy_line(self) -> bool {
        matches!(
            self,
            GlyphMode::Error
                | GlyphMode::Context
                | GlyphMode::Warn
                | GlyphMode::Suggest
                | GlyphMode::Note
        )
    }

    /// True for the four colored-outline modes.
    #[inline]
    pub const fn is_colored_outline(self) -> bool {
        matches!(
            self,
            GlyphMode::BlueOutline
                | GlyphMode::RedOutline
                | GlyphMode::YellowOutline
                | GlyphMode::WhiteOutline
        )
    }
}

/// Encode a char as the stored 16-bit codepoint. '[' is stored as the
/// placeholder so it cannot collide with markup delimiters.
#[inline]
fn encode_char(ch: char) -> u64 {
    if ch == '[' {
        BRACKET_PLACEHOLDER as u64
    } else {
        (ch as u32 & 0xFFFF) as u64
    }
}

/// Build a packed glyph from its five fields.
///
/// `style` is an OR of the style-bit constants; the alpha-extend bit is
/// always forced on. Colored-outline modes force the black-outline flag.
#[inline]
pub fn pack(color: u32, style: u64, mode: GlyphMode, font_index: u8, ch: char) -> PackedGlyph {
    let outline = if mode.is_colored_outline() {
        BLACK_OUTLINE
    } else {
        0
    };
    ((color as u64) << 32)
        | ALPHA_EXTEND
        | (style & STYLE_MASK)
        | outline
        | mode.to_bits()
        | (((font_index & 0xF) as u64) << 16)
        | encode_char(ch)
}

/// The glyph's 32 RGBA8888 color bits.
#[inline]
pub fn extract_color(glyph: PackedGlyph) -> u32 {
    (glyph >> 32) as u32
}

/// Replace only the color bits.
#[inline]
pub fn apply_color(glyph: PackedGlyph, color: u32) -> PackedGlyph {
    (glyph & !COLOR_MASK) | ((color as u64) << 32)
}

/// The style bits (24-30): bold, oblique, underline, strikethrough,
/// script field, black-outline flag.
#[inline]
pub fn extract_style(glyph: PackedGlyph) -> u64 {
    glyph & STYLE_MASK
}

/// Replace only the style bits.
#[inline]
pub fn apply_style(glyph: PackedGlyph, style: u64) -> PackedGlyph {
    (glyph & !STYLE_MASK) | (style & STYLE_MASK)
}

/// The alternate mode stored in bits 20-23.
#[inline]
pub fn extract_mode(glyph: PackedGlyph) -> GlyphMode {
    GlyphMode::from_bits(glyph >> 20)
}

/// Replace only the mode field. Selecting a colored-outline mode also sets
/// the black-outline flag.
#[inline]
pub fn apply_mode(glyph: PackedGlyph, mode: GlyphMode) -> PackedGlyph {
    let base = (glyph & !MODE_MASK) | mode.to_bits();
    if mode.is_colored_outline() {
        base | BLACK_OUTLINE
    } else {
        base
    }
}

/// The stored character. The bracket placeholder extracts as '['.
#[inline]
pub fn extract_char(glyph: PackedGlyph) -> char {
    let cp = (glyph & CHAR_MASK) as u32;
    if cp == BRACKET_PLACEHOLDER as u32 {
        '['
    } else {
        char::from_u32(cp).unwrap_or('\u{FFFD}')
    }
}

/// Replace only the codepoint bits. `apply_char(g, '[')` stores the
/// placeholder, pairing with [`extract_char`].
#[inline]
pub fn apply_char(glyph: PackedGlyph, ch: char) -> PackedGlyph {
    (glyph & !CHAR_MASK) | encode_char(ch)
}

/// The raw stored codepoint, without the bracket-placeholder mapping.
#[inline]
pub fn extract_codepoint(glyph: PackedGlyph) -> u32 {
    (glyph & CHAR_MASK) as u32
}

/// The font slot (0-15) within the owning family.
#[inline]
pub fn extract_font_index(glyph: PackedGlyph) -> u8 {
    ((glyph >> 16) & 0xF) as u8
}

/// Replace only the font-index nibble.
#[inline]
pub fn apply_font_index(glyph: PackedGlyph, font_index: u8) -> PackedGlyph {
    (glyph & !FONT_INDEX_MASK) | (((font_index & 0xF) as u64) << 16)
}

/// The script field: 0 normal, 1 subscript, 2 midscript, 3 superscript.
#[inline]
pub fn extract_script(glyph: PackedGlyph) -> u64 {
    (glyph & SCRIPT_MASK) >> 25
}

/// Scale is not stored in the glyph; it lives in `Layout::advances`. This
/// exists so consumers that iterate every `apply_*` field see a total API,
/// and is documented as a no-op.
#[inline]
pub fn apply_scale(glyph: PackedGlyph, _scale: f32) -> PackedGlyph {
    glyph
}
