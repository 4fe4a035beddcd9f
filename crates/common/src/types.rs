use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// An sRGB colour, written as `#rrggbb` in configuration files.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

/// Error returned when a colour string is not `#rrggbb` / `#rgb`.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid colour {0:?}: expected #rrggbb or #rgb")]
pub struct ParseColorError(pub String);

impl Rgb {
    pub const BLACK: Self = Self::new(0, 0, 0);
    pub const WHITE: Self = Self::new(0xff, 0xff, 0xff);

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Linear-light components in `[0, 1]`, suitable for shader uniforms.
    pub fn to_linear(self) -> [f32; 3] {
        [
            srgb_to_linear(self.r),
            srgb_to_linear(self.g),
            srgb_to_linear(self.b),
        ]
    }
}

fn srgb_to_linear(c: u8) -> f32 {
    let c = c as f32 / 255.0;
    if c <= 0.04045 {
        c / 12.92
    } else {
        ((c + 0.055) / 1.055).powf(2.4)
    }
}

impl FromStr for Rgb {
    type Err = ParseColorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || ParseColorError(s.to_string());
        let hex = s.trim().strip_prefix('#').ok_or_else(err)?;
        if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(err());
        }
        match hex.len() {
            6 => {
                let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).map_err(|_| err());
                Ok(Self::new(channel(0)?, channel(2)?, channel(4)?))
            }
            3 => {
                // #abc expands to #aabbcc
                let channel = |i: usize| {
                    u8::from_str_radix(&hex[i..i + 1], 16)
                        .map(|v| v * 17)
                        .map_err(|_| err())
                };
                Ok(Self::new(channel(0)?, channel(1)?, channel(2)?))
            }
            _ => Err(err()),
        }
    }
}

impl TryFrom<String> for Rgb {
    type Error = ParseColorError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Rgb> for String {
    fn from(c: Rgb) -> Self {
        c.to_string()
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

/// Pixel dimensions of the mounting surface. Either side may be zero,
/// e.g. while a window is minimised.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SurfaceSize {
    pub width: u32,
    pub height: u32,
}

impl SurfaceSize {
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// True when nothing can be drawn into the surface.
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Width over height, or `None` for an empty surface.
    pub fn aspect(&self) -> Option<f32> {
        if self.is_empty() {
            None
        } else {
            Some(self.width as f32 / self.height as f32)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_long_and_short_hex() {
        assert_eq!("#bfc5d7".parse::<Rgb>().unwrap(), Rgb::new(0xbf, 0xc5, 0xd7));
        assert_eq!("#fff".parse::<Rgb>().unwrap(), Rgb::WHITE);
    }

    #[test]
    fn reject_malformed_colours() {
        assert!("bfc5d7".parse::<Rgb>().is_err());
        assert!("#bfc5d".parse::<Rgb>().is_err());
        assert!("#gggggg".parse::<Rgb>().is_err());
    }

    #[test]
    fn display_is_lowercase_hex() {
        assert_eq!(Rgb::new(0xBF, 0xC5, 0xD7).to_string(), "#bfc5d7");
    }

    #[test]
    fn linear_conversion_endpoints() {
        assert_eq!(Rgb::BLACK.to_linear(), [0.0, 0.0, 0.0]);
        let white = Rgb::WHITE.to_linear();
        for c in white {
            assert!((c - 1.0).abs() < 1e-6);
        }
        // mid grey is darker in linear space
        let grey = Rgb::new(128, 128, 128).to_linear();
        assert!(grey[0] < 0.5 && grey[0] > 0.2);
    }

    #[test]
    fn empty_surface_has_no_aspect() {
        assert_eq!(SurfaceSize::new(0, 600).aspect(), None);
        assert_eq!(SurfaceSize::new(800, 0).aspect(), None);
        assert_eq!(SurfaceSize::new(800, 400).aspect(), Some(2.0));
    }
}
