use plotters::style::RGBColor;

/// Slice colours for categorical charts, cycled when there are more slices.
pub const CATEGORY_COLORS: [&str; 6] = ["#3b82f6", "#10b981", "#f59e0b", "#ef4444", "#6366f1", "#ec4899"];

pub const MARKER_COLOR: &str = "#3b82f6";
pub const BAR_COLOR: &str = "#10b981";
pub const OUTLINE_COLOR: &str = "#1e40af";
pub const PAPER_COLOR: &str = "#f9fafb";
pub const GRID_COLOR: &str = "#e5e7eb";
pub const TEXT_COLOR: &str = "#1f2937";

/// Parse a `#rrggbb` hex string. Malformed input gives the marker blue.
pub fn parse_color(color: &str) -> RGBColor {
    color
        .strip_prefix('#')
        .and_then(parse_hex)
        .unwrap_or(RGBColor(59, 130, 246))
}

fn parse_hex(hex: &str) -> Option<RGBColor> {
    if hex.len() != 6 || !hex.is_ascii() {
        return None;
    }
    let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();
    Some(RGBColor(channel(0)?, channel(2)?, channel(4)?))
}

/// `n` slice colours, repeating the category palette.
pub fn category_colors(n: usize) -> Vec<RGBColor> {
    CATEGORY_COLORS.iter().cycle().take(n).map(|c| parse_color(c)).collect()
}

// Viridis control points at 0, 0.25, 0.5, 0.75, 1
const VIRIDIS: [(u8, u8, u8); 5] = [
    (68, 1, 84),
    (59, 82, 139),
    (33, 145, 140),
    (94, 201, 98),
    (253, 231, 37),
];

/// Approximate viridis colour for `t` in `[0, 1]` (clamped).
pub fn viridis(t: f64) -> RGBColor {
    let t = if t.is_finite() { t.clamp(0.0, 1.0) } else { 0.0 };
    let scaled = t * (VIRIDIS.len() - 1) as f64;
    let lo = (scaled.floor() as usize).min(VIRIDIS.len() - 2);
    let frac = scaled - lo as f64;
    let lerp = |a: u8, b: u8| (a as f64 + (b as f64 - a as f64) * frac).round() as u8;
    let (a, b) = (VIRIDIS[lo], VIRIDIS[lo + 1]);
    RGBColor(lerp(a.0, b.0), lerp(a.1, b.1), lerp(a.2, b.2))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_hex() {
        let c = parse_color("#10b981");
        assert_eq!((c.0, c.1, c.2), (16, 185, 129));
        let c = parse_color("10b981");
        assert_eq!((c.0, c.1, c.2), (59, 130, 246));
        let c = parse_color("#zzzzzz");
        assert_eq!((c.0, c.1, c.2), (59, 130, 246));
    }

    #[test]
    fn test_category_colors_cycle() {
        let colors = category_colors(8);
        assert_eq!(colors.len(), 8);
        assert_eq!((colors[6].0, colors[6].1, colors[6].2), (colors[0].0, colors[0].1, colors[0].2));
    }

    #[test]
    fn test_viridis_endpoints() {
        let lo = viridis(0.0);
        let hi = viridis(1.0);
        assert_eq!((lo.0, lo.1, lo.2), (68, 1, 84));
        assert_eq!((hi.0, hi.1, hi.2), (253, 231, 37));
        let mid = viridis(f64::NAN);
        assert_eq!((mid.0, mid.1, mid.2), (68, 1, 84));
    }
}
