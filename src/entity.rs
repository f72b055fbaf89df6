use glam::{Mat4, Vec2, Vec3};

use crate::{
    config::{DEFAULT_CLEAR_COLOR, DEFAULT_PRIMARY_COLOR, DEFAULT_SECONDARY_COLOR},
    particles::morph::MorphPair,
};

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Camera {
    pub position: Vec3,
    pub target: Vec3,
    pub fov: f32,
    pub aspect_ratio: f32,
    pub near: f32,
    pub far: f32,
}

impl Camera {
    pub fn proj_matrix(&self) -> Mat4 {
        Mat4::perspective_rh(
            self.fov.to_radians(),
            self.aspect_ratio,
            self.near,
            self.far,
        )
    }

    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.position, self.target, Vec3::Y)
    }
}

impl Default for Camera {
    fn default() -> Self {
        Self {
            position: Vec3::new(0., 0., 36.),
            target: Vec3::ZERO,
            fov: 35.,
            aspect_ratio: 1.,
            near: 0.1,
            far: 100.,
        }
    }
}

/// Look parameters of the particle material.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Appearance {
    pub clear_color: Vec3,
    pub primary_color: Vec3,
    pub secondary_color: Vec3,
    pub particle_size: f32,
}

impl Default for Appearance {
    fn default() -> Self {
        Self {
            clear_color: DEFAULT_CLEAR_COLOR.to_linear(),
            primary_color: DEFAULT_PRIMARY_COLOR.to_linear(),
            secondary_color: DEFAULT_SECONDARY_COLOR.to_linear(),
            particle_size: 0.4,
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Scene {
    pub camera: Camera,
    pub appearance: Appearance,
    /// `uResolution`, in device pixels.
    pub resolution: Vec2,
    pub progress: f32,
    pub morph_pair: MorphPair,
}
