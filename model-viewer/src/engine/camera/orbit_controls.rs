use std::f32::consts::{PI, TAU};

use bevy::input::mouse::{MouseMotion, MouseScrollUnit, MouseWheel};
use bevy::prelude::*;
use bevy::window::PrimaryWindow;
use constants::render_settings::{
    ORBIT_DAMPING_FACTOR, ORBIT_MAX_DISTANCE, ORBIT_MAX_POLAR_ANGLE, ORBIT_MIN_DISTANCE,
    ORBIT_PAN_SPEED, ORBIT_ROTATE_SPEED, ORBIT_ZOOM_SPEED,
};

use super::viewer_camera::ViewerCamera;

/// Keeps the polar angle off the poles so `looking_at` never degenerates.
const POLAR_EPSILON: f32 = 1e-6;
const CHANGE_EPSILON: f32 = 1e-6;

/// Orbit camera controls: rotate around a target point, pan the target across
/// the ground plane and dolly towards or away from it. Input accumulates
/// deltas; `update` applies a damped fraction of them each frame.
#[derive(Resource, Debug, Clone)]
pub struct OrbitControls {
    pub target: Vec3,
    pub enable_damping: bool,
    pub damping_factor: f32,
    /// Pan along the camera's screen-space up instead of the ground plane.
    pub screen_space_panning: bool,
    pub min_polar_angle: f32,
    pub max_polar_angle: f32,
    pub min_distance: f32,
    pub max_distance: f32,
    pub rotate_speed: f32,
    pub zoom_speed: f32,
    pub pan_speed: f32,
    pub(crate) theta_delta: f32,
    pub(crate) phi_delta: f32,
    pub(crate) scale: f32,
    pub(crate) pan_offset: Vec3,
}

impl Default for OrbitControls {
    fn default() -> Self {
        Self {
            target: Vec3::ZERO,
            enable_damping: true,
            damping_factor: ORBIT_DAMPING_FACTOR,
            screen_space_panning: false,
            min_polar_angle: 0.0,
            max_polar_angle: ORBIT_MAX_POLAR_ANGLE,
            min_distance: ORBIT_MIN_DISTANCE,
            max_distance: ORBIT_MAX_DISTANCE,
            rotate_speed: ORBIT_ROTATE_SPEED,
            zoom_speed: ORBIT_ZOOM_SPEED,
            pan_speed: ORBIT_PAN_SPEED,
            theta_delta: 0.0,
            phi_delta: 0.0,
            scale: 1.0,
            pan_offset: Vec3::ZERO,
        }
    }
}

impl OrbitControls {
    /// Rotate around the vertical axis through the target.
    pub fn rotate_left(&mut self, angle: f32) {
        self.theta_delta -= angle;
    }

    /// Rotate towards or away from the pole.
    pub fn rotate_up(&mut self, angle: f32) {
        self.phi_delta -= angle;
    }

    pub fn dolly_in(&mut self, scale: f32) {
        self.scale *= scale;
    }

    pub fn dolly_out(&mut self, scale: f32) {
        self.scale /= scale;
    }

    fn zoom_scale(&self) -> f32 {
        0.95_f32.powf(self.zoom_speed)
    }

    /// Pan by a pointer delta in pixels. The pan distance is scaled so the
    /// target tracks the pointer at the target's depth.
    pub fn pan(
        &mut self,
        delta: Vec2,
        eye: Vec3,
        camera_rotation: Quat,
        fov: f32,
        viewport_height: f32,
    ) {
        if viewport_height <= 0.0 {
            return;
        }

        let target_distance = (eye - self.target).length() * (fov * 0.5).tan();
        let left = 2.0 * delta.x * target_distance / viewport_height * self.pan_speed;
        let up = 2.0 * delta.y * target_distance / viewport_height * self.pan_speed;

        let right_axis = camera_rotation * Vec3::X;
        self.pan_offset += right_axis * -left;

        let up_axis = if self.screen_space_panning {
            camera_rotation * Vec3::Y
        } else {
            Vec3::Y.cross(right_axis)
        };
        self.pan_offset += up_axis * up;
    }

    /// Point the controls at a new target and drop any pending motion.
    pub fn reset_to(&mut self, target: Vec3) {
        self.target = target;
        self.theta_delta = 0.0;
        self.phi_delta = 0.0;
        self.scale = 1.0;
        self.pan_offset = Vec3::ZERO;
    }

    /// Apply pending motion to an eye position and return the new eye.
    /// Returns `None` when the camera did not move.
    pub fn update(&mut self, eye: Vec3) -> Option<Vec3> {
        let offset = eye - self.target;
        let radius = offset.length();
        let (mut theta, mut phi) = if radius > 0.0 {
            (
                offset.x.atan2(offset.z),
                (offset.y / radius).clamp(-1.0, 1.0).acos(),
            )
        } else {
            (0.0, 0.0)
        };

        let step = if self.enable_damping {
            self.damping_factor
        } else {
            1.0
        };

        theta += self.theta_delta * step;
        phi += self.phi_delta * step;
        phi = phi
            .clamp(self.min_polar_angle, self.max_polar_angle)
            .clamp(POLAR_EPSILON, PI - POLAR_EPSILON);

        let radius = (radius * self.scale).clamp(self.min_distance, self.max_distance);
        self.target += self.pan_offset * step;

        let new_offset = Vec3::new(
            radius * phi.sin() * theta.sin(),
            radius * phi.cos(),
            radius * phi.sin() * theta.cos(),
        );
        let new_eye = self.target + new_offset;

        if self.enable_damping {
            self.theta_delta *= 1.0 - self.damping_factor;
            self.phi_delta *= 1.0 - self.damping_factor;
            self.pan_offset *= 1.0 - self.damping_factor;
        } else {
            self.theta_delta = 0.0;
            self.phi_delta = 0.0;
            self.pan_offset = Vec3::ZERO;
        }
        self.scale = 1.0;

        (new_eye.distance_squared(eye) > CHANGE_EPSILON).then_some(new_eye)
    }
}

/// Translate pointer input into pending orbit motion.
pub fn orbit_controls_input(
    mut controls: ResMut<OrbitControls>,
    mouse_button: Res<ButtonInput<MouseButton>>,
    mut mouse_motion: EventReader<MouseMotion>,
    mut scroll_events: EventReader<MouseWheel>,
    windows: Query<&Window, With<PrimaryWindow>>,
    camera_query: Query<(&Transform, &Projection), With<ViewerCamera>>,
) {
    let mouse_delta: Vec2 = mouse_motion.read().map(|m| m.delta).sum();

    let mut scroll_accum = 0.0;
    for ev in scroll_events.read() {
        scroll_accum += match ev.unit {
            MouseScrollUnit::Line => ev.y,
            MouseScrollUnit::Pixel => ev.y * 0.05,
        };
    }

    let Ok(window) = windows.single() else {
        return;
    };
    let height = window.height();
    if height <= 0.0 {
        return;
    }

    if mouse_button.pressed(MouseButton::Left) && mouse_delta != Vec2::ZERO {
        let speed = controls.rotate_speed;
        controls.rotate_left(TAU * mouse_delta.x / height * speed);
        controls.rotate_up(TAU * mouse_delta.y / height * speed);
    }

    if mouse_button.any_pressed([MouseButton::Right, MouseButton::Middle])
        && mouse_delta != Vec2::ZERO
    {
        if let Ok((transform, Projection::Perspective(perspective))) = camera_query.single() {
            controls.pan(
                mouse_delta,
                transform.translation,
                transform.rotation,
                perspective.fov,
                height,
            );
        }
    }

    if scroll_accum.abs() > f32::EPSILON {
        let scale = controls.zoom_scale().powf(scroll_accum.abs());
        if scroll_accum > 0.0 {
            controls.dolly_in(scale);
        } else {
            controls.dolly_out(scale);
        }
    }
}

/// Per-frame controls update; moves the camera while damped motion remains.
pub fn orbit_controls_update(
    mut controls: ResMut<OrbitControls>,
    mut camera_query: Query<&mut Transform, With<ViewerCamera>>,
) {
    let Ok(mut transform) = camera_query.single_mut() else {
        return;
    };

    if let Some(eye) = controls.update(transform.translation) {
        *transform = Transform::from_translation(eye).looking_at(controls.target, Vec3::Y);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn idle_controls_do_not_move_camera() {
        let mut controls = OrbitControls::default();
        assert_eq!(controls.update(Vec3::new(0.0, 0.0, 2.0)), None);
    }

    #[test]
    fn damping_spreads_rotation_over_frames() {
        let mut controls = OrbitControls::default();
        let start = Vec3::new(0.0, 0.0, 2.0);
        controls.rotate_left(1.0);

        let first = controls.update(start).unwrap();
        let second = controls.update(first).unwrap();

        let angle = |eye: Vec3| eye.x.atan2(eye.z);
        // Each frame applies a quarter of the remaining delta.
        assert!((angle(first) - -0.25).abs() < 1e-4);
        assert!((angle(second) - -(0.25 + 0.75 * 0.25)).abs() < 1e-4);
        assert!((first.length() - 2.0).abs() < 1e-4);
    }

    #[test]
    fn cannot_orbit_below_ground() {
        let mut controls = OrbitControls {
            enable_damping: false,
            ..default()
        };
        controls.rotate_up(-PI);

        let eye = controls.update(Vec3::new(0.0, 1.0, 2.0)).unwrap();
        assert!(eye.y >= -1e-4);
    }

    #[test]
    fn dolly_scales_distance() {
        let mut controls = OrbitControls {
            enable_damping: false,
            ..default()
        };
        controls.dolly_out(0.5);

        let eye = controls.update(Vec3::new(0.0, 0.0, 2.0)).unwrap();
        assert!((eye.length() - 4.0).abs() < 1e-4);
    }

    #[test]
    fn ground_plane_pan_keeps_target_height() {
        let mut controls = OrbitControls {
            enable_damping: false,
            ..default()
        };
        let eye = Vec3::new(0.0, 2.0, 2.0);
        let rotation = Transform::from_translation(eye)
            .looking_at(Vec3::ZERO, Vec3::Y)
            .rotation;

        controls.pan(Vec2::new(10.0, 10.0), eye, rotation, 1.0, 600.0);
        controls.update(eye);

        assert!(controls.target.y.abs() < 1e-5);
        assert!(controls.target.x < 0.0);
    }

    #[test]
    fn framed_distance_survives_update() {
        let mut controls = OrbitControls::default();
        controls.reset_to(Vec3::ZERO);

        for distance in [0.001, 1661.7, 25_000.0] {
            let eye = Vec3::new(0.0, 0.0, distance);
            let moved = controls.update(eye).unwrap_or(eye);
            assert!((moved.length() - distance).abs() <= distance * 1e-5);
        }
    }

    #[test]
    fn reset_discards_pending_motion() {
        let mut controls = OrbitControls::default();
        controls.rotate_left(1.0);
        controls.reset_to(Vec3::ONE);

        assert_eq!(controls.target, Vec3::ONE);
        assert_eq!(controls.update(Vec3::new(1.0, 1.0, 3.0)), None);
    }
}
