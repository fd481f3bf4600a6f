use bevy::color::Color;

/// Scene background behind the model (#333333).
pub const BACKGROUND_COLOUR: Color = Color::srgb(0.2, 0.2, 0.2);

/// Flat colour forced onto every node of a loaded model.
pub const MODEL_COLOUR: Color = Color::srgb(1.0, 0.0, 0.0);

/// Vertical field of view in degrees.
pub const CAMERA_FOV_DEGREES: f32 = 75.0;
pub const CAMERA_NEAR: f32 = 0.1;
pub const CAMERA_FAR: f32 = 1000.0;

/// Start-up camera distance along +Z before any model is framed.
pub const INITIAL_CAMERA_Z: f32 = 2.0;

/// Extra margin applied to the fitted camera distance when framing a model.
pub const FRAMING_PADDING: f32 = 1.5;

/// Lower bound on the framed distance so degenerate models still get a view.
pub const MIN_FRAMING_DISTANCE: f32 = 0.5;

pub const AMBIENT_BRIGHTNESS: f32 = 250.0;
pub const DIRECTIONAL_ILLUMINANCE: f32 = 2_000.0;

/// Direction the directional light shines from, normalised at spawn.
pub const DIRECTIONAL_LIGHT_FROM: [f32; 3] = [0.0, 1.0, 1.0];

/// Length of each world axis drawn at the origin.
pub const AXES_LENGTH: f32 = 5.0;

pub const ORBIT_DAMPING_FACTOR: f32 = 0.25;
pub const ORBIT_ROTATE_SPEED: f32 = 1.0;
pub const ORBIT_ZOOM_SPEED: f32 = 1.0;
pub const ORBIT_PAN_SPEED: f32 = 1.0;
/// Dolly range. Unbounded, so framing a model of any size is never undone.
pub const ORBIT_MIN_DISTANCE: f32 = 0.0;
pub const ORBIT_MAX_DISTANCE: f32 = f32::INFINITY;

/// Orbit may not go below the horizon.
pub const ORBIT_MAX_POLAR_ANGLE: f32 = std::f32::consts::FRAC_PI_2;
