use bevy::prelude::*;
use bevy::window::PrimaryWindow;
use constants::render_settings::BACKGROUND_COLOUR;

use crate::engine::assets::viewer_config::ViewerConfig;
use crate::engine::camera::orbit_controls::OrbitControls;
use crate::engine::camera::viewer_camera::spawn_viewer_camera;
use crate::engine::scene::lighting::spawn_lighting;

/// Pixel size of the render surface (the canvas inside the page container).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SurfaceSize {
    pub width: u32,
    pub height: u32,
}

impl SurfaceSize {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    pub fn aspect_ratio(&self) -> f32 {
        self.width as f32 / self.height.max(1) as f32
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }
}

/// Viewport state for the lifetime of the page. Created once by
/// `initialise_viewport`; absent until then.
#[derive(Resource, Debug)]
pub struct ViewportSession {
    pub surface: SurfaceSize,
    pub camera: Entity,
    pub background: Color,
    /// Root of the displayed model. At most one model is attached.
    pub model: Option<Entity>,
}

/// Startup system: size the surface to the container, spawn camera and lights,
/// set the background and install orbit controls.
pub fn initialise_viewport(
    mut commands: Commands,
    windows: Query<&Window, With<PrimaryWindow>>,
    config: Res<ViewerConfig>,
) {
    let surface = match windows.single() {
        Ok(window) => SurfaceSize::new(window.width() as u32, window.height() as u32),
        Err(_) => {
            warn!("No primary window at start-up, surface size deferred to first resize");
            SurfaceSize::new(1, 1)
        }
    };

    let background = config.background().unwrap_or(BACKGROUND_COLOUR);
    commands.insert_resource(ClearColor(background));

    let camera = spawn_viewer_camera(&mut commands, config.fov_radians(), surface.aspect_ratio());
    spawn_lighting(&mut commands);

    commands.insert_resource(OrbitControls {
        damping_factor: config.damping_factor,
        ..default()
    });
    commands.insert_resource(ViewportSession {
        surface,
        camera,
        background,
        model: None,
    });

    info!(
        "Viewport initialised at {}x{} (aspect {:.4})",
        surface.width,
        surface.height,
        surface.aspect_ratio()
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn aspect_ratio_of_surface() {
        let surface = SurfaceSize::new(800, 600);
        assert!((surface.aspect_ratio() - 1.3333).abs() < 1e-4);
        assert!(!surface.is_empty());
        assert!(SurfaceSize::new(0, 600).is_empty());
    }

    #[test]
    fn initialise_creates_single_session() {
        let mut app = App::new();
        app.add_plugins(MinimalPlugins)
            .init_resource::<ViewerConfig>()
            .add_systems(Startup, initialise_viewport);

        app.update();

        let world = app.world_mut();
        let session = world.resource::<ViewportSession>();
        assert!(session.model.is_none());
        let camera = session.camera;

        let projection = world.get::<Projection>(camera).unwrap();
        let Projection::Perspective(perspective) = projection else {
            panic!("viewer camera must use a perspective projection");
        };
        assert!((perspective.fov - 75.0_f32.to_radians()).abs() < 1e-6);
        assert_eq!(perspective.near, 0.1);
        assert_eq!(perspective.far, 1000.0);

        let transform = world.get::<Transform>(camera).unwrap();
        assert_eq!(transform.translation, Vec3::new(0.0, 0.0, 2.0));
        assert!(world.contains_resource::<OrbitControls>());
        assert!(world.contains_resource::<ClearColor>());
    }
}
