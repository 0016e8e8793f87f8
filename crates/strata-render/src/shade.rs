//! Depth tinting for fluids and relief shading for the height layer.

use strata_blocks::color::{OPAQUE_BLACK, lerp_argb, set_alpha};

/// Fluid depth contributed by each fluid block passed during a descent.
pub const FLUID_DEPTH_STEP: f32 = 0.025;

/// Darkening caps for the fluid tint.
pub const LAVA_BLEND_CAP: f32 = 0.3;
pub const WATER_BLEND_CAP: f32 = 0.45;

/// Height-layer alpha for a column level with its northern neighbor.
pub const SHADE_NEUTRAL: u32 = 0x22;
/// Alpha for a column that rises above its northern neighbor.
pub const SHADE_LIGHT: u32 = 0x00;
/// Alpha for a column that sits below its northern neighbor.
pub const SHADE_DARK: u32 = 0x44;

#[inline]
pub fn cubic_out(t: f32) -> f32 {
    let u = 1.0 - t;
    1.0 - u * u * u
}

#[inline]
pub fn quintic_out(t: f32) -> f32 {
    let u = 1.0 - t;
    1.0 - u * u * u * u * u
}

#[inline]
pub fn fluid_depth(fluid_blocks: u32) -> f32 {
    fluid_blocks as f32 * FLUID_DEPTH_STEP
}

/// Fluid pixel for a surface `base` color seen through `depth` of fluid.
///
/// Deeper fluid darkens toward black up to a cap; water also grows more opaque
/// with depth while lava is always opaque.
pub fn fluid_color(base: u32, depth: f32, lava: bool) -> u32 {
    let cap = if lava { LAVA_BLEND_CAP } else { WATER_BLEND_CAP };
    let blend = cubic_out((depth / 1.5).clamp(0.0, 1.0)).clamp(0.0, cap);
    let color = lerp_argb(base, OPAQUE_BLACK, blend);
    let alpha = if lava {
        0xFF
    } else {
        (quintic_out((depth * 5.0).clamp(0.0, 1.0)) * 255.0) as u32
    };
    set_alpha(alpha, color)
}

/// Height-layer pixel for a column at `y` whose northern neighbor ended at `north`.
pub fn height_shade(y: i32, north: Option<i32>) -> u32 {
    let alpha = match north {
        Some(n) if y > n => SHADE_LIGHT,
        Some(n) if y < n => SHADE_DARK,
        _ => SHADE_NEUTRAL,
    };
    alpha << 24
}

#[cfg(test)]
mod tests {
    use super::*;
    use strata_blocks::color::alpha;

    #[test]
    fn easing_endpoints() {
        assert_eq!(cubic_out(0.0), 0.0);
        assert_eq!(cubic_out(1.0), 1.0);
        assert_eq!(quintic_out(0.0), 0.0);
        assert_eq!(quintic_out(1.0), 1.0);
        assert!(quintic_out(0.3) > cubic_out(0.3));
    }

    #[test]
    fn shallow_water_is_nearly_clear() {
        let c = fluid_color(0x3F76E4, fluid_depth(0), false);
        assert_eq!(c, 0x003F76E4);
        let one = fluid_color(0x3F76E4, fluid_depth(1), false);
        assert!(alpha(one) > 0 && alpha(one) < 0xFF);
    }

    #[test]
    fn deep_water_hits_the_cap() {
        assert_eq!(fluid_color(0x3F76E4, fluid_depth(12), false), 0xFF22407D);
        assert_eq!(fluid_color(0x3F76E4, fluid_depth(60), false), 0xFF22407D);
    }

    #[test]
    fn lava_is_always_opaque() {
        for n in [0, 1, 5, 60] {
            assert_eq!(alpha(fluid_color(0xFF0000, fluid_depth(n), true)), 0xFF);
        }
        assert_eq!(fluid_color(0xFF0000, 0.0, true), 0xFFFF0000);
    }

    #[test]
    fn lava_darkening_is_capped() {
        // 0xFF lerped 0.3 of the way to black truncates to 0xB2
        assert_eq!(fluid_color(0xFF0000, fluid_depth(12), true), 0xFFB20000);
        assert_eq!(fluid_color(0xFF0000, fluid_depth(60), true), 0xFFB20000);
        assert_eq!(fluid_color(0xFF0000, fluid_depth(3), true), 0xFFDA0000);
    }

    #[test]
    fn height_shades() {
        assert_eq!(height_shade(70, Some(64)), 0x0000_0000);
        assert_eq!(height_shade(60, Some(64)), 0x4400_0000);
        assert_eq!(height_shade(64, Some(64)), 0x2200_0000);
        assert_eq!(height_shade(64, None), 0x2200_0000);
    }
}
