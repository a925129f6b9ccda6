use bytemuck::{Pod, Zeroable};
use foundation::math::{Mat4, mat4_identity};
use scene::camera::PerspectiveCamera;
use scene::config::SceneConfig;

/// Drawable size in physical pixels.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
}

impl Viewport {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width: width.max(1),
            height: height.max(1),
        }
    }
}

/// The uniform block shared by every pass. Must match `Globals` in the WGSL.
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
pub struct Globals {
    pub view_proj: Mat4,
    /// Globe spin; identity for the starfield.
    pub model: Mat4,
    pub camera_pos: [f32; 4],
    /// Unit vector towards the light.
    pub light_dir: [f32; 4],
    /// Directional light color premultiplied by intensity.
    pub light_color: [f32; 4],
    /// Ambient light color premultiplied by intensity.
    pub ambient: [f32; 4],
    /// `rgb` specular color, `w` shininess.
    pub specular: [f32; 4],
    /// `rgb` track tint, `a` opacity.
    pub track_color: [f32; 4],
    /// `rgb` marker color, `a` size in pixels.
    pub marker_color: [f32; 4],
    /// `width`, `height`, bump scale, unused.
    pub viewport: [f32; 4],
}

fn scaled(rgb: [f32; 3], s: f64) -> [f32; 4] {
    let s = s as f32;
    [rgb[0] * s, rgb[1] * s, rgb[2] * s, 1.0]
}

impl Globals {
    pub fn new(
        config: &SceneConfig,
        camera: &PerspectiveCamera,
        model: Mat4,
        viewport: Viewport,
    ) -> Self {
        let lights = &config.lights;
        let dir = lights.directional.direction();
        let eye = camera.position;
        let flights = &config.flights;
        Self {
            view_proj: camera.view_proj(),
            model,
            camera_pos: [eye.x as f32, eye.y as f32, eye.z as f32, 1.0],
            light_dir: [dir.x as f32, dir.y as f32, dir.z as f32, 0.0],
            light_color: scaled(
                lights.directional.color.to_rgb(),
                lights.directional.intensity,
            ),
            ambient: scaled(lights.ambient.color.to_rgb(), lights.ambient.intensity),
            specular: config
                .globe
                .specular
                .to_rgba(config.globe.shininess as f32),
            track_color: flights
                .track_color
                .to_rgba(flights.track_opacity as f32),
            marker_color: flights
                .marker_color
                .to_rgba(flights.marker_size_px as f32),
            viewport: [
                viewport.width as f32,
                viewport.height as f32,
                config.globe.bump_scale as f32,
                0.0,
            ],
        }
    }

    /// Same block with the globe spin removed, for the starfield pass.
    pub fn without_model(&self) -> Self {
        Self {
            model: mat4_identity(),
            ..*self
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{Globals, Viewport};
    use foundation::math::{mat4_identity, mat4_rotation_y};
    use scene::camera::PerspectiveCamera;
    use scene::config::SceneConfig;

    fn assert_close(a: f32, b: f32) {
        assert!((a - b).abs() < 1e-6, "expected {a} ~= {b}");
    }

    #[test]
    fn block_size_is_uniform_friendly() {
        assert_eq!(std::mem::size_of::<Globals>(), 256);
        assert_eq!(std::mem::size_of::<Globals>() % 16, 0);
    }

    #[test]
    fn defaults_fill_the_block() {
        let config = SceneConfig::default();
        let camera = PerspectiveCamera::from_config(&config.camera, 800.0, 600.0);
        let g = Globals::new(&config, &camera, mat4_rotation_y(0.5), Viewport::new(800, 600));

        assert_close(g.light_color[0], 0.2);
        assert_close(g.ambient[1], 0.5);
        assert_close(g.specular[0], 128.0 / 255.0);
        assert_close(g.specular[3], 30.0);
        assert_close(g.track_color[1], 0xd8 as f32 / 255.0);
        assert_close(g.track_color[3], 1.0);
        assert_close(g.marker_color[3], 20.0);
        assert_eq!(g.viewport[..2], [800.0, 600.0]);
        assert_close(g.viewport[2], 0.35);
        assert_eq!(g.camera_pos, [5.0, 2.0, -5.5, 1.0]);

        let len = g.light_dir[..3].iter().map(|c| c * c).sum::<f32>().sqrt();
        assert_close(len, 1.0);

        let stars = g.without_model();
        assert_eq!(stars.model, mat4_identity());
        assert_eq!(stars.view_proj, g.view_proj);
    }

    #[test]
    fn viewport_never_collapses() {
        assert_eq!(Viewport::new(0, 0), Viewport::new(1, 1));
    }
}
