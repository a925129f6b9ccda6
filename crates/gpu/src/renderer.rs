//! Turns a [`GlobeScene`] into buffer contents.
//!
//! Sphere meshes, tracks and endpoints are uploaded once; only the uniform
//! block and the moving markers change per frame.

use foundation::math::Vec3;
use scene::camera::PerspectiveCamera;
use scene::config::FlightsConfig;
use scene::flights::FlightPaths;
use scene::GlobeScene;
use scene::mesh::SphereMesh;

use crate::globals::{Globals, Viewport};
use crate::vertex::{GlobeVertex, MarkerInstance, TrackVertex};

fn to_f32(v: Vec3) -> [f32; 3] {
    [v.x as f32, v.y as f32, v.z as f32]
}

/// Interleave a sphere mesh.
pub fn sphere_vertices(mesh: &SphereMesh) -> Vec<GlobeVertex> {
    mesh.positions
        .iter()
        .zip(&mesh.normals)
        .zip(&mesh.uvs)
        .map(|((position, normal), uv)| GlobeVertex {
            position: *position,
            normal: *normal,
            uv: *uv,
        })
        .collect()
}

/// Line-list vertices: each segment runs from the start color to the end color.
pub fn track_vertices(paths: &FlightPaths, config: &FlightsConfig) -> Vec<TrackVertex> {
    let start_color = config.track_start_color.to_rgb();
    let end_color = config.track_end_color.to_rgb();
    paths
        .track_segments(config.track_samples)
        .iter()
        .flat_map(|segment| {
            [
                TrackVertex {
                    position: to_f32(segment.start),
                    color: start_color,
                },
                TrackVertex {
                    position: to_f32(segment.end),
                    color: end_color,
                },
            ]
        })
        .collect()
}

pub fn marker_instances(points: &[Vec3]) -> Vec<MarkerInstance> {
    points
        .iter()
        .map(|p| MarkerInstance::at(to_f32(*p)))
        .collect()
}

/// Everything that is uploaded once per scene.
#[derive(Debug, Clone, Default)]
pub struct StaticBuffers {
    pub globe_vertices: Vec<GlobeVertex>,
    pub globe_indices: Vec<u32>,
    pub star_vertices: Vec<GlobeVertex>,
    pub star_indices: Vec<u32>,
    pub track_vertices: Vec<TrackVertex>,
    pub endpoint_instances: Vec<MarkerInstance>,
}

/// Per-frame uploads.
#[derive(Debug, Clone)]
pub struct FramePacket {
    pub globals: Globals,
    pub markers: Vec<MarkerInstance>,
}

pub struct Renderer;

impl Renderer {
    pub fn static_buffers(scene: &GlobeScene) -> StaticBuffers {
        StaticBuffers {
            globe_vertices: sphere_vertices(&scene.globe_mesh),
            globe_indices: scene.globe_mesh.indices.clone(),
            star_vertices: sphere_vertices(&scene.star_mesh),
            star_indices: scene.star_mesh.indices.clone(),
            track_vertices: track_vertices(&scene.paths, &scene.config.flights),
            endpoint_instances: marker_instances(&scene.endpoints),
        }
    }

    /// Uniforms and marker instances for one frame.
    pub fn prepare(
        scene: &GlobeScene,
        camera: &PerspectiveCamera,
        markers: &[Vec3],
        viewport: Viewport,
    ) -> FramePacket {
        FramePacket {
            globals: Globals::new(&scene.config, camera, scene.spin.model_matrix(), viewport),
            markers: marker_instances(markers),
        }
    }
}
