pub mod animation;
pub mod camera;
pub mod config;
pub mod controls;
pub mod flights;
pub mod globe;
pub mod mesh;
pub mod picking;
pub mod schedule;
pub mod spline;

pub use globe::*;
