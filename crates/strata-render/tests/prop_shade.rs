use proptest::prelude::*;
use strata_blocks::color::{alpha, blue, green, red};
use strata_render::shade::{
    SHADE_DARK, SHADE_LIGHT, SHADE_NEUTRAL, WATER_BLEND_CAP, fluid_color, fluid_depth, height_shade,
};

fn rgb() -> impl Strategy<Value = u32> {
    0u32..=0x00FF_FFFF
}

proptest! {
    // Water only gets more opaque as it gets deeper
    #[test]
    fn water_alpha_is_monotonic(base in rgb(), n in 0u32..200) {
        let shallow = alpha(fluid_color(base, fluid_depth(n), false));
        let deeper = alpha(fluid_color(base, fluid_depth(n + 1), false));
        prop_assert!(deeper >= shallow);
    }

    // Lava is opaque at any depth
    #[test]
    fn lava_is_opaque(base in rgb(), n in 0u32..400) {
        prop_assert_eq!(alpha(fluid_color(base, fluid_depth(n), true)), 0xFF);
    }

    // Darkening never exceeds the water cap
    #[test]
    fn water_darkening_is_capped(base in rgb(), n in 0u32..400) {
        let c = fluid_color(base, fluid_depth(n), false);
        for (got, orig) in [(red(c), red(base)), (green(c), green(base)), (blue(c), blue(base))] {
            prop_assert!(got <= orig);
            let floor = orig as f32 * (1.0 - WATER_BLEND_CAP) - 1.0;
            prop_assert!(got as f32 >= floor);
        }
    }

    // Swapping a column with its neighbor swaps light and dark
    #[test]
    fn height_shade_is_antisymmetric(a in -64i32..320, b in -64i32..320) {
        let ab = height_shade(a, Some(b)) >> 24;
        let ba = height_shade(b, Some(a)) >> 24;
        prop_assert!([SHADE_LIGHT, SHADE_NEUTRAL, SHADE_DARK].contains(&ab));
        match a.cmp(&b) {
            std::cmp::Ordering::Equal => prop_assert_eq!(ab, SHADE_NEUTRAL),
            std::cmp::Ordering::Greater => prop_assert_eq!((ab, ba), (SHADE_LIGHT, SHADE_DARK)),
            std::cmp::Ordering::Less => prop_assert_eq!((ab, ba), (SHADE_DARK, SHADE_LIGHT)),
        }
        prop_assert_eq!(height_shade(a, None) >> 24, SHADE_NEUTRAL);
    }
}
