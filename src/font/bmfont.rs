// AngelCode BMFont text-format loader.

use std::collections::HashMap;
use std::path::Path;

use crate::font::{Font, FontError, GlyphRegion};
use crate::render::TextureId;

/// Split one `.fnt` line into its record type and `key=value` attributes.
/// Values may be quoted (`file="page.png"`) or comma lists (`padding=2,2,2,2`).
fn attributes(line: &str) -> (&str, HashMap<&str, &str>) {
    let mut parts = line.split_whitespace();
    let record = parts.next().unwrap_or("");
    let mut out = HashMap::new();
    for part in parts {
        if let Some((key, value)) = part.split_once('=') {
            out.insert(key, value.trim_matches('"'));
        }
    }
    (record, out)
}

fn get_f32(attrs: &HashMap<&str, &str>, key: &str) -> f32 {
    attrs
        .get(key)
        .and_then(|v| v.parse::<f32>().ok())
        .unwrap_or(0.0)
}

fn get_u32(attrs: &HashMap<&str, &str>, key: &str) -> u32 {
    attrs
        .get(key)
        .and_then(|v| v.parse::<u32>().ok())
        .unwrap_or(0)
}

/// Load an AngelCode `.fnt` (text form) from an in-memory string. Page
/// texture file names are resolved to handles through `resolve_page`;
/// texture IO itself is the embedder's concern.
pub fn load_fnt(
    text: &str,
    mut resolve_page: impl FnMut(&str) -> TextureId,
) -> Result<Font, FontError> {
    let mut line_height = 0.0f32;
    let mut base = 0.0f32;
    let mut padding = [0.0f32; 4];
    let mut scale_w = 1.0f32;
    let mut scale_h = 1.0f32;
    let mut pages: HashMap<u32, TextureId> = HashMap::new();
    let mut glyphs: Vec<(u32, GlyphRegion)> = Vec::new();
    let mut kerning: Vec<(u32, u32, f32)> = Vec::new();
    let mut widest = 1.0f32;

    for line in text.lines() {
        let (record, attrs) = attributes(line);
        match record {
            "info" => {
                if let Some(pad) = attrs.get("padding") {
                    for (i, v) in pad.split(',').take(4).enumerate() {
                        padding[i] = v.parse().unwrap_or(0.0);
                    }
                }
            }
            "common" => {
                line_height = get_f32(&attrs, "lineHeight");
                base = get_f32(&attrs, "base");
                scale_w = get_f32(&attrs, "scaleW").max(1.0);
                scale_h = get_f32(&attrs, "scaleH").max(1.0);
                let declared = get_u32(&attrs, "pages");
                if declared > 32 {
                    log::warn!("suspicious page count {declared} in .fnt");
                }
            }
            "page" => {
                let id = get_u32(&attrs, "id");
                let file = attrs.get("file").copied().unwrap_or("");
                pages.insert(id, resolve_page(file));
            }
            "char" => {
                let id = get_u32(&attrs, "id");
                let x = get_f32(&attrs, "x");
                let y = get_f32(&attrs, "y");
                let w = get_f32(&attrs, "width");
                let h = get_f32(&attrs, "height");
                let xoffset = get_f32(&attrs, "xoffset");
                let yoffset = get_f32(&attrs, "yoffset");
                let xadvance = get_f32(&attrs, "xadvance");
                let page = get_u32(&attrs, "page");
                let texture = pages
                    .get(&page)
                    .copied()
                    .unwrap_or(TextureId::WHITE);
                widest = widest.max(xadvance);
                glyphs.push((
                    id,
                    GlyphRegion {
                        texture,
                        u: x / scale_w,
                        v: y / scale_h,
                        u2: (x + w) / scale_w,
                        v2: (y + h) / scale_h,
                        offset_x: xoffset,
                        // .fnt yoffset runs downward from the line top;
                        // convert to height-above-baseline of the bottom.
                        offset_y: base - yoffset - h,
                        x_advance: xadvance,
                        width: w,
                        height: h,
                    },
                ));
            }
            "kerning" => {
                let first = get_u32(&attrs, "first");
                let second = get_u32(&attrs, "second");
                let amount = get_f32(&attrs, "amount");
                kerning.push((first, second, amount));
            }
            // "chars"/"kernings" count lines and blanks need no handling.
            _ => {}
        }
    }

    if line_height <= 0.0 {
        return Err(FontError::Parse(
            "missing or invalid common lineHeight in .fnt".to_string(),
        ));
    }

    // Padding inflates every cell symmetrically; the usable cell is the
    // declared line height minus the vertical padding.
    let cell_height = (line_height - padding[0] - padding[2]).max(1.0);
    let mut font = Font::new(widest, cell_height);
    font.descent = base - line_height;
    {
        for (cp, region) in glyphs {
            font.set_region(cp, region);
        }
    }
    if !kerning.is_empty() {
        let pairs: Vec<(u16, u16, f32)> = kerning
            .iter()
            .map(|&(a, b, v)| (a as u16, b as u16, v))
            .collect();
        font.set_kerning(pairs);
    }
    font.finish_setup()?;
    Ok(font)
}

/// Load a `.fnt` from disk. The page textures referenced by the file are
/// resolved relative to the caller through `resolve_page`.
pub fn load_fnt_file(
    path: impl AsRef<Path>,
    resolve_page: impl FnMut(&str) -> TextureId,
) -> Result<Font, FontError> {
    let path = path.as_ref();
    let text = std::fs::read_to_string(path).map_err(|source| FontError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    load_fnt(&text, resolve_page)
}
