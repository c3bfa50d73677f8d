pub use kurbo::{Point, Vec2};

/// Straight (non-premultiplied) ARGB color packed as `0xAARRGGBB`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default, serde::Serialize, serde::Deserialize)]
pub struct Argb(pub u32);

impl Argb {
    /// Opaque white.
    pub const WHITE: Self = Self(0xFFFF_FFFF);

    /// Pack separate channels.
    pub fn from_components(a: u8, r: u8, g: u8, b: u8) -> Self {
        Self(u32::from(a) << 24 | u32::from(r) << 16 | u32::from(g) << 8 | u32::from(b))
    }

    /// Alpha channel.
    pub fn a(self) -> u8 {
        (self.0 >> 24) as u8
    }

    /// Red channel.
    pub fn r(self) -> u8 {
        (self.0 >> 16) as u8
    }

    /// Green channel.
    pub fn g(self) -> u8 {
        (self.0 >> 8) as u8
    }

    /// Blue channel.
    pub fn b(self) -> u8 {
        self.0 as u8
    }

    /// Channels as tweenable floats in `[0, 255]`, ordered `[r, g, b, a]`.
    pub fn to_channels(self) -> [f64; 4] {
        [
            f64::from(self.r()),
            f64::from(self.g()),
            f64::from(self.b()),
            f64::from(self.a()),
        ]
    }

    /// Inverse of [`Argb::to_channels`]; channels are rounded and clamped.
    pub fn from_channels(c: [f64; 4]) -> Self {
        fn channel(v: f64) -> u8 {
            if v.is_nan() {
                return 0;
            }
            v.round().clamp(0.0, 255.0) as u8
        }

        Self::from_components(channel(c[3]), channel(c[0]), channel(c[1]), channel(c[2]))
    }
}

/// Timeline data stores rotation in degrees; targets take radians.
pub fn deg_to_rad(deg: f64) -> f64 {
    deg.to_radians()
}

/// Inverse of [`deg_to_rad`].
pub fn rad_to_deg(rad: f64) -> f64 {
    rad.to_degrees()
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/core.rs"]
mod tests;
