//! Packed `0xAARRGGBB` color helpers.

pub const OPAQUE_BLACK: u32 = 0xFF00_0000;

#[inline]
pub const fn alpha(argb: u32) -> u32 {
    (argb >> 24) & 0xFF
}

#[inline]
pub const fn red(argb: u32) -> u32 {
    (argb >> 16) & 0xFF
}

#[inline]
pub const fn green(argb: u32) -> u32 {
    (argb >> 8) & 0xFF
}

#[inline]
pub const fn blue(argb: u32) -> u32 {
    argb & 0xFF
}

#[inline]
pub const fn argb(a: u32, r: u32, g: u32, b: u32) -> u32 {
    ((a & 0xFF) << 24) | ((r & 0xFF) << 16) | ((g & 0xFF) << 8) | (b & 0xFF)
}

#[inline]
pub const fn rgb(argb: u32) -> u32 {
    argb & 0x00FF_FFFF
}

#[inline]
pub const fn set_alpha(a: u32, color: u32) -> u32 {
    ((a & 0xFF) << 24) | rgb(color)
}

/// Full alpha for any non-zero color; zero stays "nothing here".
#[inline]
pub const fn opaque_or_empty(color: u32) -> u32 {
    if color == 0 { 0 } else { OPAQUE_BLACK | color }
}

#[inline]
fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + t * (b - a)
}

/// Per-channel linear blend; channels truncate toward zero.
pub fn lerp_argb(from: u32, to: u32, t: f32) -> u32 {
    if from == to {
        return from;
    }
    if t >= 1.0 {
        return to;
    }
    if t <= 0.0 {
        return from;
    }
    let ch = |f: fn(u32) -> u32| lerp(f(from) as f32, f(to) as f32, t) as u32;
    argb(ch(alpha), ch(red), ch(green), ch(blue))
}

/// Integer mean of the RGB channels; alpha is dropped.
pub fn average_rgb(colors: impl IntoIterator<Item = u32>) -> u32 {
    let (mut r, mut g, mut b, mut n) = (0u64, 0u64, 0u64, 0u64);
    for c in colors {
        r += u64::from(red(c));
        g += u64::from(green(c));
        b += u64::from(blue(c));
        n += 1;
    }
    if n == 0 {
        return 0;
    }
    argb(0, (r / n) as u32, (g / n) as u32, (b / n) as u32)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn channels_roundtrip() {
        let c = 0x8012_3456;
        assert_eq!(argb(alpha(c), red(c), green(c), blue(c)), c);
    }

    #[test]
    fn lerp_endpoints() {
        assert_eq!(lerp_argb(0x0011_2233, OPAQUE_BLACK, 0.0), 0x0011_2233);
        assert_eq!(lerp_argb(0x0011_2233, OPAQUE_BLACK, 1.0), OPAQUE_BLACK);
        assert_eq!(lerp_argb(0x00FF_FFFF, OPAQUE_BLACK, 0.5), 0x7F7F_7F7F);
    }

    #[test]
    fn average_drops_alpha() {
        assert_eq!(average_rgb([0xFF00_0010, 0x0000_0030]), 0x0000_0020);
        assert_eq!(average_rgb(std::iter::empty()), 0);
    }
}
