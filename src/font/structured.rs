// Structured-JSON atlas fonts (msdf-atlas-gen style), plain or gzipped.

use std::io::Read;

use serde::Deserialize;

use crate::font::{DistanceFieldType, Font, FontError, GlyphRegion};
use crate::render::TextureId;

#[derive(Debug, Deserialize)]
struct StructuredFont {
    atlas: Atlas,
    metrics: Metrics,
    #[serde(default)]
    glyphs: Vec<Glyph>,
    #[serde(default)]
    kerning: Vec<Kerning>,
}

#[derive(Debug, Deserialize)]
struct Atlas {
    #[serde(rename = "type", default)]
    kind: String,
    #[serde(rename = "distanceRange", default)]
    distance_range: f32,
    /// Pixels per em.
    size: f32,
    width: f32,
    height: f32,
}

#[derive(Debug, Deserialize)]
struct Metrics {
    #[serde(rename = "lineHeight")]
    line_height: f32,
    #[serde(default)]
    ascender: f32,
    #[serde(default)]
    descender: f32,
}

#[derive(Debug, Deserialize)]
struct Glyph {
    unicode: u32,
    advance: f32,
    #[serde(rename = "planeBounds")]
    plane_bounds: Option<Bounds>,
    #[serde(rename = "atlasBounds")]
    atlas_bounds: Option<Bounds>,
}

#[derive(Debug, Deserialize, Clone, Copy)]
struct Bounds {
    left: f32,
    bottom: f32,
    right: f32,
    top: f32,
}

#[derive(Debug, Deserialize)]
struct Kerning {
    unicode1: u32,
    unicode2: u32,
    advance: f32,
}

fn field_type(kind: &str) -> DistanceFieldType {
    match kind {
        "msdf" | "mtsdf" => DistanceFieldType::Msdf,
        "sdf" | "psdf" => DistanceFieldType::Sdf,
        // softmask, hardmask, or absent: plain coverage pages.
        _ => DistanceFieldType::Standard,
    }
}

/// Load a structured-JSON font. `bytes` may be the raw JSON or a gzipped
/// stream of it (`.json.gz`); gzip is detected by its magic number.
pub fn load_structured(bytes: &[u8], texture: TextureId) -> Result<Font, FontError> {
    let text = if bytes.starts_with(&[0x1F, 0x8B]) {
        let mut out = String::new();
        flate2::read::GzDecoder::new(bytes)
            .read_to_string(&mut out)
            .map_err(|e| FontError::Parse(format!("gzip: {e}")))?;
        out
    } else {
        String::from_utf8(bytes.to_vec())
            .map_err(|e| FontError::Parse(e.to_string()))?
    };

    let data: StructuredFont =
        serde_json::from_str(&text).map_err(|e| FontError::Parse(e.to_string()))?;
    if data.atlas.size <= 0.0 || data.metrics.line_height <= 0.0 {
        return Err(FontError::Parse(
            "structured font needs positive atlas size and lineHeight".to_string(),
        ));
    }

    // Em-relative metrics scale by the atlas's pixels-per-em.
    let em = data.atlas.size;
    let aw = data.atlas.width.max(1.0);
    let ah = data.atlas.height.max(1.0);

    let mut widest = 1.0f32;
    for g in &data.glyphs {
        widest = widest.max(g.advance * em);
    }
    let mut font = Font::new(widest, data.metrics.line_height * em);
    font.descent = data.metrics.descender * em;
    font.distance_field = field_type(&data.atlas.kind);
    if font.distance_field != DistanceFieldType::Standard {
        font.distance_field_crispness = (data.atlas.distance_range * 0.5).max(1.0);
        font.actual_crispness = font.distance_field_crispness;
    }
    if data.metrics.ascender != 0.0 {
        log::debug!(
            "structured font: ascender {} em, descender {} em",
            data.metrics.ascender,
            data.metrics.descender
        );
    }

    for g in &data.glyphs {
        // Missing atlasBounds yields a zero-size region rather than an
        // error; generators emit such records for blank glyphs.
        let (u, v, u2, v2) = match g.atlas_bounds {
            Some(b) => (
                b.left / aw,
                (ah - b.top) / ah,
                b.right / aw,
                (ah - b.bottom) / ah,
            ),
            None => (0.0, 0.0, 0.0, 0.0),
        };
        let (offset_x, offset_y, width, height) = match g.plane_bounds {
            Some(b) => (
                b.left * em,
                b.bottom * em,
                (b.right - b.left) * em,
                (b.top - b.bottom) * em,
            ),
            None => (0.0, 0.0, 0.0, 0.0),
        };
        font.set_region(
            g.unicode,
            GlyphRegion {
                texture,
                u,
                v,
                u2,
                v2,
                offset_x,
                offset_y,
                x_advance: g.advance * em,
                width,
                height,
            },
        );
    }

    if !data.kerning.is_empty() {
        font.set_kerning(
            data.kerning
                .iter()
                .map(|k| (k.unicode1 as u16, k.unicode2 as u16, k.advance * em)),
        );
    }

    font.finish_setup()?;
    Ok(font)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const FIXTURE: &str = r#"{
        "atlas": { "type": "msdf", "distanceRange": 4.0, "size": 32.0,
                   "width": 256.0, "height": 256.0, "yOrigin": "bottom" },
        "metrics": { "emSize": 1, "lineHeight": 1.25,
                     "ascender": 0.9, "descender": -0.25 },
        "glyphs": [
            { "unicode": 32, "advance": 0.25 },
            { "unicode": 65, "advance": 0.6,
              "planeBounds": { "left": 0.05, "bottom": 0.0, "right": 0.55, "top": 0.7 },
              "atlasBounds": { "left": 10.0, "bottom": 10.0, "right": 26.0, "top": 33.0 } },
            { "unicode": 66, "advance": 0.6,
              "planeBounds": { "left": 0.05, "bottom": 0.0, "right": 0.55, "top": 0.7 } }
        ],
        "kerning": [ { "unicode1": 65, "unicode2": 66, "advance": -0.05 } ]
    }"#;

    // ── Metadata ────────────────────────────────────────────────────

    #[test]
    fn atlas_type_selects_field() {
        let font = load_structured(FIXTURE.as_bytes(), TextureId(4)).unwrap();
        assert_eq!(font.distance_field, DistanceFieldType::Msdf);
        assert!(font.distance_field_crispness >= 1.0);
    }

    #[test]
    fn sdf_and_mask_types() {
        let sdf = FIXTURE.replace("\"msdf\"", "\"sdf\"");
        assert_eq!(
            load_structured(sdf.as_bytes(), TextureId(4))
                .unwrap()
                .distance_field,
            DistanceFieldType::Sdf
        );
        let mask = FIXTURE.replace("\"msdf\"", "\"softmask\"");
        assert_eq!(
            load_structured(mask.as_bytes(), TextureId(4))
                .unwrap()
                .distance_field,
            DistanceFieldType::Standard
        );
    }

    #[test]
    fn em_metrics_scale_to_pixels() {
        let font = load_structured(FIXTURE.as_bytes(), TextureId(4)).unwrap();
        assert_eq!(font.cell_height, 40.0, "1.25 em at 32 px/em");
        assert_eq!(font.descent, -8.0);
        let a = font.region(65).unwrap();
        assert!((a.x_advance - 19.2).abs() < 1e-4);
        assert!((a.width - 16.0).abs() < 1e-4, "0.5 em wide");
    }

    #[test]
    fn atlas_bounds_become_uvs() {
        let font = load_structured(FIXTURE.as_bytes(), TextureId(4)).unwrap();
        let a = font.region(65).unwrap();
        assert!((a.u - 10.0 / 256.0).abs() < 1e-6);
        assert!((a.v - (256.0 - 33.0) / 256.0).abs() < 1e-6);
        assert!(a.v2 > a.v);
    }

    #[test]
    fn missing_atlas_bounds_tolerated_as_zero_region() {
        let font = load_structured(FIXTURE.as_bytes(), TextureId(4)).unwrap();
        let b = font.region(66).unwrap();
        assert_eq!((b.u, b.v, b.u2, b.v2), (0.0, 0.0, 0.0, 0.0));
        assert!(b.x_advance > 0.0, "advance survives");
    }

    #[test]
    fn kerning_scales_by_em() {
        let font = load_structured(FIXTURE.as_bytes(), TextureId(4)).unwrap();
        assert!((font.kern(65, 66) - -1.6).abs() < 1e-4);
    }

    // ── Gzip transport ──────────────────────────────────────────────

    #[test]
    fn gzipped_json_loads() {
        let mut enc =
            flate2::write::GzEncoder::new(Vec::new(), flate2::Compression::fast());
        enc.write_all(FIXTURE.as_bytes()).unwrap();
        let packed = enc.finish().unwrap();
        let font = load_structured(&packed, TextureId(4)).unwrap();
        assert!(font.has_glyph(65));
        assert_eq!(font.distance_field, DistanceFieldType::Msdf);
    }

    // ── Errors ──────────────────────────────────────────────────────

    #[test]
    fn truncated_gzip_is_parse_error() {
        let err = load_structured(&[0x1F, 0x8B, 0x00], TextureId(4)).unwrap_err();
        assert!(matches!(err, FontError::Parse(_)));
    }

    #[test]
    fn missing_space_is_fatal() {
        let no_space = FIXTURE.replace("\"unicode\": 32", "\"unicode\": 33");
        let err = load_structured(no_space.as_bytes(), TextureId(4)).unwrap_err();
        assert!(matches!(err, FontError::MissingSpaceGlyph));
    }
}
