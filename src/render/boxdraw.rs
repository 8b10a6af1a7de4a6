// Box-drawing and block-element glyphs composed from solid rectangles.
//
// Each sequence is a list of (rel_x, rel_y, width, height) groups in cell
// fractions, origin at the cell's bottom-left. Line-drawing characters are
// described by four arm weights (left, right, up, down); block elements
// and shades get literal rectangles.

/// Arm weight nibbles packed l<<12 | r<<8 | u<<4 | d.
/// 0 none, 1 light, 2 heavy, 3 double.
const ARMS_2500: [u16; 0x50] = [
    0x1100, 0x2200, 0x0011, 0x0022, // ─ ━ │ ┃
    0x1100, 0x2200, 0x0011, 0x0022, // dashed render solid
    0x1100, 0x2200, 0x0011, 0x0022,
    0x0101, 0x0201, 0x0102, 0x0202, // ┌ ┍ ┎ ┏
    0x1001, 0x2001, 0x1002, 0x2002, // ┐ ┑ ┒ ┓
    0x0110, 0x0210, 0x0120, 0x0220, // └ ┕ ┖ ┗
    0x1010, 0x2010, 0x1020, 0x2020, // ┘ ┙ ┚ ┛
    0x0111, 0x0211, 0x0121, 0x0112, // ├ ┝ ┞ ┟
    0x0122, 0x0221, 0x0212, 0x0222, // ┠ ┡ ┢ ┣
    0x1011, 0x2011, 0x1021, 0x1012, // ┤ ┥ ┦ ┧
    0x1022, 0x2021, 0x2012, 0x2022, // ┨ ┩ ┪ ┫
    0x1101, 0x2101, 0x1201, 0x2201, // ┬ ┭ ┮ ┯
    0x1102, 0x2102, 0x1202, 0x2202, // ┰ ┱ ┲ ┳
    0x1110, 0x2110, 0x1210, 0x2210, // ┴ ┵ ┶ ┷
    0x1120, 0x2120, 0x1220, 0x2220, // ┸ ┹ ┺ ┻
    0x1111, 0x2111, 0x1211, 0x2211, // ┼ ┽ ┾ ┿
    0x1121, 0x1112, 0x1122, 0x2121, // ╀ ╁ ╂ ╃
    0x1221, 0x2112, 0x1212, 0x2221, // ╄ ╅ ╆ ╇
    0x2212, 0x2122, 0x1222, 0x2222, // ╈ ╉ ╊ ╋
    0x1100, 0x2200, 0x0011, 0x0022, // ╌ ╍ ╎ ╏ render solid
];

/// Arm weights for U+2550..U+257F (doubles, arcs, half lines).
const ARMS_2550: [u16; 0x30] = [
    0x3300, 0x0033, // ═ ║
    0x0301, 0x0103, 0x0303, // ╒ ╓ ╔
    0x3001, 0x1003, 0x3003, // ╕ ╖ ╗
    0x0310, 0x0130, 0x0330, // ╘ ╙ ╚
    0x3010, 0x1030, 0x3030, // ╛ ╜ ╝
    0x0311, 0x0133, 0x0333, // ╞ ╟ ╠
    0x3011, 0x1033, 0x3033, // ╡ ╢ ╣
    0x3301, 0x1103, 0x3303, // ╤ ╥ ╦
    0x3310, 0x1130, 0x3330, // ╧ ╨ ╩
    0x3311, 0x1133, 0x3333, // ╪ ╫ ╬
    0x0101, 0x1001, 0x1010, 0x0110, // ╭ ╮ ╯ ╰ arcs as corners
    0x0000, 0x0000, 0x0000, // ╱ ╲ ╳ fall through to the font glyph
    0x1000, 0x0010, 0x0100, 0x0001, // ╴ ╵ ╶ ╷
    0x2000, 0x0020, 0x0200, 0x0002, // ╸ ╹ ╺ ╻
    0x1200, 0x0012, 0x2100, 0x0021, // ╼ ╽ ╾ ╿
];

const LIGHT: f32 = 0.125;
const HEAVY: f32 = 0.25;
/// Stroke thickness of one rail of a double line.
const RAIL: f32 = 0.1;
/// Offset of each double-line rail from the stroke center.
const GAP: f32 = 0.15;

fn thickness(weight: u16) -> f32 {
    match weight {
        2 => HEAVY,
        _ => LIGHT,
    }
}

/// Append the rectangles for one arm. `breadth` scales single-line stroke
/// thickness; double rails keep their geometry so parallel lines stay
/// parallel across adjacent cells.
fn push_arm(out: &mut Vec<[f32; 4]>, arm: Arm, weight: u16, breadth: f32) {
    if weight == 0 {
        return;
    }
    if weight == 3 {
        for offset in [-GAP, GAP] {
            push_stroke(out, arm, 0.5 + offset, RAIL, GAP + RAIL);
        }
        return;
    }
    let t = (thickness(weight) * breadth).clamp(0.01, 1.0);
    push_stroke(out, arm, 0.5, t, 0.0);
}

#[derive(Clone, Copy)]
enum Arm {
    Left,
    Right,
    Up,
    Down,
}

/// One stroke from a cell edge to just past the center. `center` is the
/// stroke's centerline in the perpendicular axis; `reach` extends the
/// stroke past the cell midpoint so joints close.
fn push_stroke(out: &mut Vec<[f32; 4]>, arm: Arm, center: f32, t: f32, reach: f32) {
    let half = t * 0.5;
    let end = 0.5 + reach + half;
    match arm {
        Arm::Left => out.push([0.0, center - half, end, t]),
        Arm::Right => out.push([1.0 - end, center - half, end, t]),
        Arm::Up => out.push([center - half, 1.0 - end, t, end]),
        Arm::Down => out.push([center - half, 0.0, t, end]),
    }
}

fn arms_to_rects(arms: u16, breadth: f32) -> Vec<[f32; 4]> {
    let mut out = Vec::with_capacity(4);
    push_arm(&mut out, Arm::Left, arms >> 12 & 0xF, breadth);
    push_arm(&mut out, Arm::Right, arms >> 8 & 0xF, breadth);
    push_arm(&mut out, Arm::Up, arms >> 4 & 0xF, breadth);
    push_arm(&mut out, Arm::Down, arms & 0xF, breadth);
    out
}

/// Shade characters as a dot grid; `keep` of every four cells are filled.
fn shade(keep: u32) -> Vec<[f32; 4]> {
    let mut out = Vec::new();
    let step = 0.125;
    for row in 0..8u32 {
        for col in 0..8u32 {
            let phase = (row * 3 + col * 2) % 4;
            if phase < keep {
                out.push([col as f32 * step, row as f32 * step, step, step]);
            }
        }
    }
    out
}

fn quadrants(mask: u8) -> Vec<[f32; 4]> {
    const QUAD: [[f32; 4]; 4] = [
        [0.0, 0.5, 0.5, 0.5], // upper left
        [0.5, 0.5, 0.5, 0.5], // upper right
        [0.0, 0.0, 0.5, 0.5], // lower left
        [0.5, 0.0, 0.5, 0.5], // lower right
    ];
    (0..4)
        .filter(|i| mask & (1 << i) != 0)
        .map(|i| QUAD[i as usize])
        .collect()
}

/// The rectangle sequence for a box-drawing or block-element codepoint,
/// or `None` when the glyph should render from the font's own region
/// (diagonals, anything outside U+2500..U+259F).
pub(crate) fn block_sequence(codepoint: u32, breadth: f32) -> Option<Vec<[f32; 4]>> {
    match codepoint {
        0x2500..=0x254F => Some(arms_to_rects(
            ARMS_2500[(codepoint - 0x2500) as usize],
            breadth,
        )),
        0x2571..=0x2573 => None,
        0x2550..=0x257F => Some(arms_to_rects(
            ARMS_2550[(codepoint - 0x2550) as usize],
            breadth,
        )),
        // Upper half and eighth blocks.
        0x2580 => Some(vec![[0.0, 0.5, 1.0, 0.5]]),
        0x2594 => Some(vec![[0.0, 0.875, 1.0, 0.125]]),
        0x2595 => Some(vec![[0.875, 0.0, 0.125, 1.0]]),
        // Lower blocks in eighths.
        0x2581..=0x2588 => {
            let h = (codepoint - 0x2580) as f32 * 0.125;
            Some(vec![[0.0, 0.0, 1.0, h]])
        }
        // Left blocks in eighths, widest first.
        0x2589..=0x258F => {
            let w = (0x2590 - codepoint) as f32 * 0.125;
            Some(vec![[0.0, 0.0, w, 1.0]])
        }
        0x2590 => Some(vec![[0.5, 0.0, 0.5, 1.0]]),
        0x2591 => Some(shade(1)),
        0x2592 => Some(shade(2)),
        0x2593 => Some(shade(3)),
        // Quadrant combinations, bit order UL UR LL LR.
        0x2596 => Some(quadrants(0b0100)),
        0x2597 => Some(quadrants(0b1000)),
        0x2598 => Some(quadrants(0b0001)),
        0x2599 => Some(quadrants(0b1101)),
        0x259A => Some(quadrants(0b1001)),
        0x259B => Some(quadrants(0b0111)),
        0x259C => Some(quadrants(0b1011)),
        0x259D => Some(quadrants(0b0010)),
        0x259E => Some(quadrants(0b0110)),
        0x259F => Some(quadrants(0b1110)),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn covers(rects: &[[f32; 4]], x: f32, y: f32) -> bool {
        rects
            .iter()
            .any(|r| x >= r[0] && x <= r[0] + r[2] && y >= r[1] && y <= r[1] + r[3])
    }

    // ── Line characters ─────────────────────────────────────────────

    #[test]
    fn light_horizontal_spans_the_cell() {
        let rects = block_sequence(0x2500, 1.0).unwrap();
        assert!(covers(&rects, 0.0, 0.5));
        assert!(covers(&rects, 1.0, 0.5));
        assert!(!covers(&rects, 0.5, 0.1));
    }

    #[test]
    fn heavy_is_thicker_than_light() {
        let light = block_sequence(0x2500, 1.0).unwrap();
        let heavy = block_sequence(0x2501, 1.0).unwrap();
        let breadth = |rects: &[[f32; 4]]| rects.iter().map(|r| r[3]).fold(0.0f32, f32::max);
        assert!(breadth(&heavy) > breadth(&light));
    }

    #[test]
    fn corner_has_two_arms_that_join() {
        // ┌ reaches right and down, joining at the center.
        let rects = block_sequence(0x250C, 1.0).unwrap();
        assert_eq!(rects.len(), 2);
        assert!(covers(&rects, 0.5, 0.5));
        assert!(covers(&rects, 1.0, 0.5));
        assert!(covers(&rects, 0.5, 0.0));
        assert!(!covers(&rects, 0.0, 0.5));
    }

    #[test]
    fn cross_covers_all_four_edges() {
        let rects = block_sequence(0x253C, 1.0).unwrap();
        for (x, y) in [(0.0, 0.5), (1.0, 0.5), (0.5, 0.0), (0.5, 1.0)] {
            assert!(covers(&rects, x, y), "missing arm toward ({x}, {y})");
        }
    }

    #[test]
    fn dashed_variants_render_solid() {
        assert_eq!(
            block_sequence(0x2504, 1.0),
            block_sequence(0x2500, 1.0)
        );
    }

    #[test]
    fn diagonals_fall_through_to_font() {
        assert!(block_sequence(0x2571, 1.0).is_none());
        assert!(block_sequence(0x2572, 1.0).is_none());
        assert!(block_sequence(0x2573, 1.0).is_none());
    }

    // ── Breadth multiplier ──────────────────────────────────────────

    #[test]
    fn breadth_scales_single_lines_only() {
        let thin = block_sequence(0x2500, 0.5).unwrap();
        let normal = block_sequence(0x2500, 1.0).unwrap();
        assert!(thin[0][3] < normal[0][3]);

        let double_thin = block_sequence(0x2550, 0.5).unwrap();
        let double_normal = block_sequence(0x2550, 1.0).unwrap();
        assert_eq!(double_thin, double_normal, "double lines ignore breadth");
    }

    #[test]
    fn double_lines_have_two_rails() {
        let rects = block_sequence(0x2551, 1.0).unwrap();
        assert_eq!(rects.len(), 4, "two arms, two rails each");
    }

    // ── Block elements ──────────────────────────────────────────────

    #[test]
    fn full_block_is_one_full_rect() {
        let rects = block_sequence(0x2588, 1.0).unwrap();
        assert_eq!(rects, vec![[0.0, 0.0, 1.0, 1.0]]);
    }

    #[test]
    fn lower_half_and_upper_half() {
        assert_eq!(
            block_sequence(0x2584, 1.0).unwrap(),
            vec![[0.0, 0.0, 1.0, 0.5]]
        );
        assert_eq!(
            block_sequence(0x2580, 1.0).unwrap(),
            vec![[0.0, 0.5, 1.0, 0.5]]
        );
    }

    #[test]
    fn left_eighths_shrink() {
        let seven = block_sequence(0x2589, 1.0).unwrap();
        let one = block_sequence(0x258F, 1.0).unwrap();
        assert!((seven[0][2] - 0.875).abs() < 1e-6);
        assert!((one[0][2] - 0.125).abs() < 1e-6);
    }

    #[test]
    fn shades_increase_in_density() {
        let light = block_sequence(0x2591, 1.0).unwrap().len();
        let medium = block_sequence(0x2592, 1.0).unwrap().len();
        let dark = block_sequence(0x2593, 1.0).unwrap().len();
        assert!(light < medium && medium < dark);
    }

    #[test]
    fn quadrant_characters_cover_their_corners() {
        let ul = block_sequence(0x2598, 1.0).unwrap();
        assert!(covers(&ul, 0.25, 0.75));
        assert!(!covers(&ul, 0.75, 0.25));

        let three = block_sequence(0x259F, 1.0).unwrap();
        assert_eq!(three.len(), 3);
    }

    #[test]
    fn non_box_codepoints_are_none() {
        assert!(block_sequence('A' as u32, 1.0).is_none());
        assert!(block_sequence(0x24FF, 1.0).is_none());
        assert!(block_sequence(0x25A0, 1.0).is_none());
    }
}
