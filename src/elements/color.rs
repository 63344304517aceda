use egui::{ecolor::rgb_from_hsv, Color32};

/// Neutral color of freshly-loaded nodes before community coloring runs.
pub const DEFAULT_NODE_COLOR: Color32 = Color32::from_rgb(91, 91, 91);

const GOLDEN_RATIO_CONJUGATE: f64 = 0.618_033_988_7;
const COMMUNITY_SATURATION: f32 = 0.8;
const COMMUNITY_VALUE: f32 = 0.95;

/// Color of the `i`-th distinct community. Consecutive indices land far apart on the hue wheel.
pub fn community_color(i: usize) -> Color32 {
    let h = (i as f64 * GOLDEN_RATIO_CONJUGATE).fract() as f32;
    // channels are taken as sRGB bytes directly, without linear-to-gamma conversion
    let [r, g, b] = rgb_from_hsv((h, COMMUNITY_SATURATION, COMMUNITY_VALUE));
    Color32::from_rgb(to_byte(r), to_byte(g), to_byte(b))
}

fn to_byte(c: f32) -> u8 {
    (c.clamp(0.0, 1.0) * 255.0).round() as u8
}
