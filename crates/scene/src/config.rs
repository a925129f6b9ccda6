//! Scene configuration.
//!
//! Every field has a default, so a config file only needs to name what it
//! overrides. Colors are written as `"#rrggbb"` strings.

use foundation::math::Vec3;
use formats::FlightRange;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

use crate::mesh::MAX_SPHERE_SEGMENTS;
use crate::spline::MIN_ARC_SEGMENTS;

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("{field} must be positive, got {value}")]
    NotPositive { field: &'static str, value: f64 },
    #[error("{field} must be at least {min}, got {value}")]
    TooFew {
        field: &'static str,
        min: u32,
        value: u32,
    },
    #[error("{field} must be at most {max}, got {value}")]
    TooMany {
        field: &'static str,
        max: u32,
        value: u32,
    },
    #[error("flights.speed_max ({max}) must exceed flights.speed_min ({min})")]
    SpeedRange { min: f64, max: f64 },
    #[error("config is not valid JSON: {0}")]
    Json(String),
}

/// 24-bit RGB color.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct Color(pub u32);

impl Color {
    pub const WHITE: Color = Color(0xffffff);

    /// Linear `[r, g, b]` in `[0, 1]`.
    pub fn to_rgb(self) -> [f32; 3] {
        [
            ((self.0 >> 16) & 0xff) as f32 / 255.0,
            ((self.0 >> 8) & 0xff) as f32 / 255.0,
            (self.0 & 0xff) as f32 / 255.0,
        ]
    }

    pub fn to_rgba(self, alpha: f32) -> [f32; 4] {
        let [r, g, b] = self.to_rgb();
        [r, g, b, alpha]
    }

    pub fn parse(s: &str) -> Option<Self> {
        let hex = s.strip_prefix('#').or_else(|| s.strip_prefix("0x"))?;
        if hex.len() != 6 {
            return None;
        }
        u32::from_str_radix(hex, 16).ok().map(Color)
    }
}

impl std::fmt::Display for Color {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{:06x}", self.0 & 0xffffff)
    }
}

impl Serialize for Color {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Color {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Color::parse(&s)
            .ok_or_else(|| serde::de::Error::custom(format!("invalid color '{s}', expected #rrggbb")))
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneConfig {
    pub globe: GlobeConfig,
    pub stars: StarsConfig,
    pub camera: CameraConfig,
    pub lights: LightsConfig,
    pub controls: ControlsConfig,
    pub flights: FlightsConfig,
    pub textures: TextureConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GlobeConfig {
    pub radius: f64,
    pub width_segments: u32,
    pub height_segments: u32,
    pub bump_scale: f64,
    pub specular: Color,
    pub shininess: f64,
    /// Rotation about the polar axis added every rendered frame (radians).
    pub spin_per_frame: f64,
}

impl Default for GlobeConfig {
    fn default() -> Self {
        Self {
            radius: 1.6,
            width_segments: 20,
            height_segments: 20,
            bump_scale: 0.35,
            specular: Color(0x808080),
            shininess: 30.0,
            spin_per_frame: 0.0025,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StarsConfig {
    pub radius: f64,
    pub segments: u32,
}

impl Default for StarsConfig {
    fn default() -> Self {
        Self {
            radius: 90.0,
            segments: 64,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    pub fov_y_deg: f64,
    pub near: f64,
    pub far: f64,
    pub position: Vec3,
    pub target: Vec3,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            fov_y_deg: 45.0,
            near: 0.01,
            far: 10_000.0,
            position: Vec3::new(5.0, 2.0, -5.5),
            target: Vec3::ZERO,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DirectionalLight {
    pub color: Color,
    pub intensity: f64,
    /// The light shines from here towards the origin.
    pub position: Vec3,
}

impl DirectionalLight {
    /// Unit vector from the lit surface towards the light.
    pub fn direction(&self) -> Vec3 {
        self.position.normalize()
    }
}

impl Default for DirectionalLight {
    fn default() -> Self {
        Self {
            color: Color::WHITE,
            intensity: 0.2,
            position: Vec3::new(5.0, 2.0, -3.5),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AmbientLight {
    pub color: Color,
    pub intensity: f64,
}

impl Default for AmbientLight {
    fn default() -> Self {
        Self {
            color: Color::WHITE,
            intensity: 0.5,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LightsConfig {
    pub directional: DirectionalLight,
    pub ambient: AmbientLight,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ControlsConfig {
    pub enable_rotate: bool,
    pub enable_pan: bool,
    pub enable_zoom: bool,
    pub rotate_speed: f64,
    pub pan_speed: f64,
    pub zoom_speed: f64,
    pub min_distance: f64,
    pub max_distance: Option<f64>,
}

impl Default for ControlsConfig {
    fn default() -> Self {
        Self {
            enable_rotate: true,
            enable_pan: true,
            enable_zoom: false,
            rotate_speed: 1.0,
            pan_speed: 1.0,
            zoom_speed: 1.0,
            min_distance: 0.0,
            max_distance: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FlightsConfig {
    pub range: FlightRange,
    /// Peak height of an arc above the globe surface, reached mid-flight.
    pub arc_max_height: f64,
    /// Spline segments per arc; the arc has one more control point than this.
    pub spline_control_points: u32,
    /// Points sampled along each spline for the track polyline.
    pub track_samples: u32,
    pub track_color: Color,
    pub track_opacity: f64,
    pub track_start_color: Color,
    pub track_end_color: Color,
    pub marker_color: Color,
    pub marker_size_px: f64,
    pub speed_scaling: f64,
    pub speed_min: f64,
    pub speed_max: f64,
    pub duration_ms_per_unit: f64,
    pub start_jitter_ms: f64,
}

impl Default for FlightsConfig {
    fn default() -> Self {
        Self {
            range: FlightRange::all(),
            arc_max_height: 0.1,
            spline_control_points: 8,
            track_samples: 32,
            track_color: Color(0x00d8cc),
            track_opacity: 1.0,
            track_start_color: Color::WHITE,
            track_end_color: Color(0xff0000),
            marker_color: Color(0x00fff0),
            marker_size_px: 20.0,
            speed_scaling: 5.0,
            speed_min: 1.0,
            speed_max: 25.0,
            duration_ms_per_unit: 80_000.0,
            start_jitter_ms: 5_000.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TextureConfig {
    pub globe_map: String,
    pub globe_bump: String,
    pub globe_specular: String,
    pub starfield: String,
    pub marker_sprite: String,
}

impl Default for TextureConfig {
    fn default() -> Self {
        Self {
            globe_map: "images/black_white_4k.jpg".to_string(),
            globe_bump: "images/elev_bump_4k.jpg".to_string(),
            globe_specular: "images/water_4k.png".to_string(),
            starfield: "images/galaxy_starfield.png".to_string(),
            marker_sprite: "images/disc.png".to_string(),
        }
    }
}

impl SceneConfig {
    pub fn from_json(text: &str) -> Result<Self, ConfigError> {
        let config: SceneConfig =
            serde_json::from_str(text).map_err(|e| ConfigError::Json(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        positive("globe.radius", self.globe.radius)?;
        positive("stars.radius", self.stars.radius)?;
        positive("camera.fov_y_deg", self.camera.fov_y_deg)?;
        positive("camera.near", self.camera.near)?;
        positive("camera.far", self.camera.far)?;
        positive("flights.duration_ms_per_unit", self.flights.duration_ms_per_unit)?;
        at_least("globe.width_segments", 3, self.globe.width_segments)?;
        at_least("globe.height_segments", 2, self.globe.height_segments)?;
        at_least("stars.segments", 3, self.stars.segments)?;
        at_most("globe.width_segments", MAX_SPHERE_SEGMENTS, self.globe.width_segments)?;
        at_most("globe.height_segments", MAX_SPHERE_SEGMENTS, self.globe.height_segments)?;
        at_most("stars.segments", MAX_SPHERE_SEGMENTS, self.stars.segments)?;
        at_least(
            "flights.spline_control_points",
            MIN_ARC_SEGMENTS,
            self.flights.spline_control_points,
        )?;
        at_least("flights.track_samples", 2, self.flights.track_samples)?;

        if self.flights.speed_max <= self.flights.speed_min {
            return Err(ConfigError::SpeedRange {
                min: self.flights.speed_min,
                max: self.flights.speed_max,
            });
        }
        Ok(())
    }
}

fn positive(field: &'static str, value: f64) -> Result<(), ConfigError> {
    if value > 0.0 && value.is_finite() {
        Ok(())
    } else {
        Err(ConfigError::NotPositive { field, value })
    }
}

fn at_least(field: &'static str, min: u32, value: u32) -> Result<(), ConfigError> {
    if value >= min {
        Ok(())
    } else {
        Err(ConfigError::TooFew { field, min, value })
    }
}

fn at_most(field: &'static str, max: u32, value: u32) -> Result<(), ConfigError> {
    if value <= max {
        Ok(())
    } else {
        Err(ConfigError::TooMany { field, max, value })
    }
}
