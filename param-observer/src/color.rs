/// RGBA color packed as `0xRRGGBBAA` in an unsigned parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const fn from_rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Decode `0xRRGGBBAA`. Bits above 32 are ignored.
    pub const fn from_packed(packed: u64) -> Self {
        Self {
            r: (packed >> 24) as u8,
            g: (packed >> 16) as u8,
            b: (packed >> 8) as u8,
            a: packed as u8,
        }
    }

    pub const fn to_packed(self) -> u64 {
        ((self.r as u64) << 24) | ((self.g as u64) << 16) | ((self.b as u64) << 8) | self.a as u64
    }

    /// Components scaled to `0.0..=1.0`
    pub fn to_f32(self) -> [f32; 4] {
        [self.r, self.g, self.b, self.a].map(|c| c as f32 / 255.0)
    }
}
