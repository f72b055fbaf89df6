use std::f32::consts::{PI, TAU};

use glam::{Vec2, Vec3};
use log::debug;

use crate::entity::Camera;

const POLE_EPSILON: f32 = 1e-6;
/// Below this the pending motion is dropped.
const REST_EPSILON: f32 = 1e-6;

/// Damped orbit around a fixed target. Panning is not supported.
///
/// Input only accumulates pending motion; `update` applies a `damping_factor`
/// share of it each frame, so the camera glides to a stop after input ends.
#[derive(Debug, Clone)]
pub struct OrbitControls {
    pub target: Vec3,
    pub damping_factor: f32,
    pub rotate_speed: f32,
    pub zoom_speed: f32,
    pub min_distance: f32,
    pub max_distance: f32,

    radius: f32,
    theta: f32,
    phi: f32,

    pending_theta: f32,
    pending_phi: f32,
    pending_zoom: f32,

    dragging: bool,
    last_cursor: Option<Vec2>,
}

impl OrbitControls {
    pub fn new(camera: &Camera) -> Self {
        let offset = camera.position - camera.target;
        let radius = offset.length();
        let theta = offset.x.atan2(offset.z);
        let phi = if radius > 0. {
            (offset.y / radius).clamp(-1., 1.).acos()
        } else {
            PI * 0.5
        };

        Self {
            target: camera.target,
            damping_factor: 0.05,
            rotate_speed: 1.,
            zoom_speed: 1.,
            min_distance: 5.,
            max_distance: camera.far * 0.9,
            radius,
            theta,
            phi,
            pending_theta: 0.,
            pending_phi: 0.,
            pending_zoom: 0.,
            dragging: false,
            last_cursor: None,
        }
    }

    pub fn distance(&self) -> f32 {
        self.radius
    }

    pub fn begin_drag(&mut self) {
        self.dragging = true;
    }

    pub fn end_drag(&mut self) {
        self.dragging = false;
    }

    /// Cursor position in physical pixels. Dragging across the full viewport
    /// height turns the camera once around.
    pub fn cursor_moved(&mut self, position: Vec2, viewport_height: f32) {
        let last = self.last_cursor.replace(position);
        if !self.dragging || viewport_height <= 0. {
            return;
        }
        if let Some(last) = last {
            let delta = position - last;
            self.pending_theta -= TAU * delta.x / viewport_height * self.rotate_speed;
            self.pending_phi -= TAU * delta.y / viewport_height * self.rotate_speed;
        }
    }

    /// Positive `lines` zoom in.
    pub fn scroll(&mut self, lines: f32) {
        self.pending_zoom += lines * 0.1 * self.zoom_speed;
    }

    pub fn is_moving(&self) -> bool {
        self.pending_theta != 0. || self.pending_phi != 0. || self.pending_zoom != 0.
    }

    /// Integrates one frame of damped motion and moves the camera.
    pub fn update(&mut self, camera: &mut Camera) {
        let damping = self.damping_factor;

        self.theta += self.pending_theta * damping;
        self.phi = (self.phi + self.pending_phi * damping).clamp(POLE_EPSILON, PI - POLE_EPSILON);
        self.radius = (self.radius * (-self.pending_zoom * damping).exp())
            .clamp(self.min_distance, self.max_distance);

        self.pending_theta = settle(self.pending_theta * (1. - damping));
        self.pending_phi = settle(self.pending_phi * (1. - damping));
        self.pending_zoom = settle(self.pending_zoom * (1. - damping));

        let (sin_phi, cos_phi) = self.phi.sin_cos();
        let (sin_theta, cos_theta) = self.theta.sin_cos();
        camera.target = self.target;
        camera.position = self.target
            + Vec3::new(
                self.radius * sin_phi * sin_theta,
                self.radius * cos_phi,
                self.radius * sin_phi * cos_theta,
            );

        if self.is_moving() {
            debug!(
                "Orbit theta {:.3} phi {:.3} distance {:.2}",
                self.theta,
                self.phi,
                self.distance()
            );
        }
    }
}

fn settle(value: f32) -> f32 {
    if value.abs() < REST_EPSILON {
        0.
    } else {
        value
    }
}
