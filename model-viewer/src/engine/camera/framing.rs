use bevy::prelude::*;
use constants::render_settings::MIN_FRAMING_DISTANCE;

use crate::engine::assets::bounds::ModelBounds;

/// Camera placement that fits a model in view.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraFraming {
    pub eye: Vec3,
    pub target: Vec3,
    pub distance: f32,
}

/// Distance at which an object of `max_dimension` fills the vertical field of
/// view, scaled by `padding`.
pub fn fit_distance(max_dimension: f32, fov: f32, padding: f32) -> f32 {
    let distance = (max_dimension * 0.5 / (fov * 0.5).tan()).abs() * padding;
    if distance > f32::EPSILON {
        distance
    } else {
        MIN_FRAMING_DISTANCE
    }
}

/// Frame `bounds` from +Z: the camera sits in front of the box centre and
/// looks straight at it.
pub fn frame_bounds(bounds: &ModelBounds, fov: f32, padding: f32) -> CameraFraming {
    let target = bounds.center();
    let distance = fit_distance(bounds.max_dimension(), fov, padding);

    CameraFraming {
        eye: target + Vec3::Z * distance,
        target,
        distance,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use constants::render_settings::{CAMERA_FOV_DEGREES, FRAMING_PADDING};

    fn fov() -> f32 {
        CAMERA_FOV_DEGREES.to_radians()
    }

    #[test]
    fn distance_follows_largest_dimension() {
        let bounds = ModelBounds {
            min: Vec3::new(-1.0, -0.5, -0.25),
            max: Vec3::new(1.0, 0.5, 0.25),
        };
        let framing = frame_bounds(&bounds, fov(), FRAMING_PADDING);

        let expected = 2.0 * 0.5 / (fov() * 0.5).tan() * 1.5;
        assert!((framing.distance - expected).abs() < 1e-5);
        assert_eq!(framing.target, Vec3::ZERO);
        assert_eq!(framing.eye, Vec3::new(0.0, 0.0, framing.distance));
    }

    #[test]
    fn distance_is_independent_of_position() {
        let at_origin = ModelBounds {
            min: Vec3::ZERO,
            max: Vec3::splat(3.0),
        };
        let far_away = at_origin.translated(Vec3::new(40.0, -7.0, 12.0));

        let a = frame_bounds(&at_origin, fov(), FRAMING_PADDING);
        let b = frame_bounds(&far_away, fov(), FRAMING_PADDING);

        assert!((a.distance - b.distance).abs() < 1e-5);
        assert!((b.eye - b.target - Vec3::new(0.0, 0.0, b.distance)).length() < 1e-4);
    }

    #[test]
    fn distance_scales_linearly() {
        let one = fit_distance(1.0, fov(), FRAMING_PADDING);
        let four = fit_distance(4.0, fov(), FRAMING_PADDING);
        assert!((four - 4.0 * one).abs() < 1e-5);
    }

    #[test]
    fn flat_model_still_gets_a_distance() {
        assert_eq!(fit_distance(0.0, fov(), FRAMING_PADDING), MIN_FRAMING_DISTANCE);
    }
}
