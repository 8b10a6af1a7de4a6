// SadConsole .font loader: a JSON header describing a regular glyph grid.

use serde::Deserialize;

use crate::font::{Font, FontError, GlyphRegion};
use crate::render::TextureId;

/// The `.font` header as SadConsole writes it.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct SadConsoleFont {
    #[allow(dead_code)]
    #[serde(default)]
    file_path: String,
    columns: u32,
    glyph_width: f32,
    glyph_height: f32,
    #[serde(default)]
    glyph_padding: f32,
    #[serde(default)]
    solid_glyph_index: u32,
    /// Rows are not always written; 256 glyphs total is the usual sheet.
    #[serde(default)]
    rows: u32,
}

/// Load a SadConsole `.font` JSON description. The grid texture itself is
/// the `texture` handle the embedder already uploaded.
pub fn load_sadconsole(json: &str, texture: TextureId) -> Result<Font, FontError> {
    let header: SadConsoleFont =
        serde_json::from_str(json).map_err(|e| FontError::Parse(e.to_string()))?;
    if header.columns == 0 || header.glyph_width <= 0.0 || header.glyph_height <= 0.0 {
        return Err(FontError::Parse(
            "SadConsole font needs positive Columns/GlyphWidth/GlyphHeight".to_string(),
        ));
    }

    let rows = if header.rows > 0 {
        header.rows
    } else {
        (256 + header.columns - 1) / header.columns
    };
    let pad = header.glyph_padding;
    let sheet_w = header.columns as f32 * (header.glyph_width + pad * 2.0);
    let sheet_h = rows as f32 * (header.glyph_height + pad * 2.0);

    let mut font = Font::new(header.glyph_width, header.glyph_height);
    font.is_mono = true;
    font.descent = -header.glyph_height * 0.2;

    let count = header.columns * rows;
    for index in 0..count {
        let col = index % header.columns;
        let row = index / header.columns;
        let x = col as f32 * (header.glyph_width + pad * 2.0) + pad;
        let y = row as f32 * (header.glyph_height + pad * 2.0) + pad;
        font.set_region(
            index,
            GlyphRegion {
                texture,
                u: x / sheet_w,
                v: y / sheet_h,
                u2: (x + header.glyph_width) / sheet_w,
                v2: (y + header.glyph_height) / sheet_h,
                offset_x: 0.0,
                offset_y: 0.0,
                x_advance: header.glyph_width,
                width: header.glyph_width,
                height: header.glyph_height,
            },
        );
    }

    // The sheet's designated solid glyph backs bars and box drawing.
    if header.solid_glyph_index < count {
        if let Some(solid) = font.region(header.solid_glyph_index) {
            let block = font.solid_block;
            font.set_region(block, solid);
        }
    }

    font.finish_setup()?;
    Ok(font)
}
