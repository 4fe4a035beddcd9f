use crate::types::Rgb;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Largest accepted `grid_size`. 1024² instances fit in 16 MiB of
/// instance data, well under wgpu's default 256 MiB buffer limit.
pub const MAX_GRID_SIZE: u32 = 1024;

/// Errors from loading or validating a [`WallConfig`].
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("{field} out of range: {value} ({expected})")]
    OutOfRange {
        field: &'static str,
        value: f64,
        expected: &'static str,
    },
}

/// Every tunable of the cube wall.
///
/// Missing keys in a config file fall back to [`WallConfig::default`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WallConfig {
    /// Cells per side; the wall holds `grid_size²` cubes.
    pub grid_size: u32,
    /// Width of the lattice in world units. Spacing is `wall_width / grid_size`.
    pub wall_width: f32,
    /// Edge length of each cube.
    pub cube_size: f32,
    /// Maximum out-of-plane spread of the seeded resting depth.
    pub wall_depth: f32,
    /// Pointer influence radius when no button is held.
    pub radius_base: f32,
    /// Radius multiplier while a pointer button is held.
    pub press_radius_factor: f32,
    /// How far past the grid bounds the pointer target may travel.
    pub pointer_margin: f32,
    /// Master switch for the post-process chain.
    pub bloom: bool,
    pub bloom_strength: f32,
    /// Blur spread multiplier.
    pub bloom_radius: f32,
    /// Luminance above which pixels contribute to the glow.
    pub bloom_threshold: f32,
    pub color_a: Rgb,
    pub color_b: Rgb,
    pub background: Rgb,
    /// Fraction of the remaining distance the smoothed pointer covers per frame.
    pub pointer_smoothing: f32,
    /// Fraction of the remaining distance the camera covers per frame.
    pub camera_smoothing: f32,
    pub camera_fov_deg: f32,
    pub camera_distance: f32,
    /// Parallax reach on x and y.
    pub parallax: [f32; 2],
    /// Idle sway frequency around the x and y axes (radians per second).
    pub idle_frequency: [f32; 2],
    /// Idle sway amplitude around the x and y axes (radians).
    pub idle_amplitude: [f32; 2],
    /// Tone-mapping exposure.
    pub exposure: f32,
}

impl Default for WallConfig {
    fn default() -> Self {
        Self {
            grid_size: 40,
            wall_width: 11.0,
            cube_size: 0.25,
            wall_depth: 1.8,
            radius_base: 3.0,
            press_radius_factor: 0.65,
            pointer_margin: 2.0,
            bloom: true,
            bloom_strength: 0.9,
            bloom_radius: 0.7,
            bloom_threshold: 0.1,
            color_a: Rgb::new(0xbf, 0xc5, 0xd7),
            color_b: Rgb::WHITE,
            background: Rgb::BLACK,
            pointer_smoothing: 0.08,
            camera_smoothing: 0.05,
            camera_fov_deg: 50.0,
            camera_distance: 9.0,
            parallax: [0.6, 0.4],
            idle_frequency: [0.05, 0.08],
            idle_amplitude: [0.02, 0.03],
            exposure: 1.0,
        }
    }
}

impl WallConfig {
    /// Read, parse and validate a YAML config file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)?;
        let config = Self::from_yaml_str(&text)?;
        tracing::debug!(path = %path.display(), "loaded wall config");
        Ok(config)
    }

    /// Parse and validate a YAML document.
    pub fn from_yaml_str(text: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_yaml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_yaml(&self) -> Result<String, ConfigError> {
        Ok(serde_yaml::to_string(self)?)
    }

    /// Number of cubes the wall will hold.
    pub fn cell_count(&self) -> usize {
        let n = self.grid_size as usize;
        n * n
    }

    /// Reject values that would produce an empty or degenerate wall.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.grid_size == 0 || self.grid_size > MAX_GRID_SIZE {
            return Err(out_of_range(
                "grid_size",
                self.grid_size as f64,
                "between 1 and 1024",
            ));
        }
        positive("wall_width", self.wall_width)?;
        positive("cube_size", self.cube_size)?;
        positive("radius_base", self.radius_base)?;
        positive("camera_distance", self.camera_distance)?;
        non_negative("wall_depth", self.wall_depth)?;
        non_negative("pointer_margin", self.pointer_margin)?;
        non_negative("bloom_strength", self.bloom_strength)?;
        non_negative("bloom_radius", self.bloom_radius)?;
        non_negative("bloom_threshold", self.bloom_threshold)?;
        positive("exposure", self.exposure)?;
        unit_fraction("press_radius_factor", self.press_radius_factor)?;
        unit_fraction("pointer_smoothing", self.pointer_smoothing)?;
        unit_fraction("camera_smoothing", self.camera_smoothing)?;
        if !(self.camera_fov_deg > 0.0 && self.camera_fov_deg < 180.0) {
            return Err(out_of_range(
                "camera_fov_deg",
                self.camera_fov_deg as f64,
                "between 0 and 180",
            ));
        }
        Ok(())
    }
}

fn out_of_range(field: &'static str, value: f64, expected: &'static str) -> ConfigError {
    ConfigError::OutOfRange {
        field,
        value,
        expected,
    }
}

fn positive(field: &'static str, value: f32) -> Result<(), ConfigError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(out_of_range(field, value as f64, "> 0"))
    }
}

fn non_negative(field: &'static str, value: f32) -> Result<(), ConfigError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(out_of_range(field, value as f64, ">= 0"))
    }
}

fn unit_fraction(field: &'static str, value: f32) -> Result<(), ConfigError> {
    if value > 0.0 && value <= 1.0 {
        Ok(())
    } else {
        Err(out_of_range(field, value as f64, "in (0, 1]"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_validate() {
        let config = WallConfig::default();
        config.validate().unwrap();
        assert_eq!(config.cell_count(), 1600);
    }

    #[test]
    fn partial_yaml_fills_defaults() {
        let config = WallConfig::from_yaml_str("grid_size: 8\nbloom: false\n").unwrap();
        assert_eq!(config.grid_size, 8);
        assert!(!config.bloom);
        assert_eq!(config.radius_base, WallConfig::default().radius_base);
        assert_eq!(config.color_a, WallConfig::default().color_a);
    }

    #[test]
    fn colours_parse_from_yaml() {
        let config = WallConfig::from_yaml_str("color_a: \"#102030\"\n").unwrap();
        assert_eq!(config.color_a, Rgb::new(0x10, 0x20, 0x30));
    }

    #[test]
    fn malformed_colour_is_rejected() {
        let err = WallConfig::from_yaml_str("color_b: \"white\"\n").unwrap_err();
        assert!(matches!(err, ConfigError::Yaml(_)));
    }

    #[test]
    fn zero_grid_is_rejected() {
        let err = WallConfig::from_yaml_str("grid_size: 0\n").unwrap_err();
        assert!(matches!(
            err,
            ConfigError::OutOfRange {
                field: "grid_size",
                ..
            }
        ));
    }

    #[test]
    fn oversized_grid_is_rejected() {
        for grid_size in [MAX_GRID_SIZE + 1, 4100, 100_000] {
            let config = WallConfig {
                grid_size,
                ..WallConfig::default()
            };
            let err = config.validate().unwrap_err();
            assert!(matches!(
                err,
                ConfigError::OutOfRange {
                    field: "grid_size",
                    ..
                }
            ));
        }

        let config = WallConfig {
            grid_size: MAX_GRID_SIZE,
            ..WallConfig::default()
        };
        config.validate().unwrap();
    }

    #[test]
    fn smoothing_must_be_a_fraction() {
        let config = WallConfig {
            pointer_smoothing: 1.5,
            ..WallConfig::default()
        };
        assert!(config.validate().is_err());

        let config = WallConfig {
            camera_smoothing: 0.0,
            ..WallConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn dumped_defaults_load_back() {
        let yaml = WallConfig::default().to_yaml().unwrap();
        let back = WallConfig::from_yaml_str(&yaml).unwrap();
        assert_eq!(back, WallConfig::default());
    }

    #[test]
    fn load_reads_yaml_file() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("wall.yaml");
        std::fs::write(&path, "grid_size: 12\ncolor_b: \"#ff8800\"\n").unwrap();

        let config = WallConfig::load(&path).unwrap();
        assert_eq!(config.grid_size, 12);
        assert_eq!(config.color_b, Rgb::new(0xff, 0x88, 0x00));
        assert_eq!(config.bloom, WallConfig::default().bloom);
    }

    #[test]
    fn load_validates_file_contents() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("wall.yaml");
        std::fs::write(&path, "grid_size: 4100\n").unwrap();

        let err = WallConfig::load(&path).unwrap_err();
        assert!(matches!(err, ConfigError::OutOfRange { .. }));
    }

    #[test]
    fn missing_file_is_io_error() {
        let tmp = tempfile::tempdir().unwrap();
        let err = WallConfig::load(tmp.path().join("absent.yaml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }
}
