use bevy::prelude::*;
use constants::render_settings::MODEL_COLOUR;

use crate::engine::assets::bounds::ModelBounds;
use crate::engine::assets::obj::ObjModel;
use crate::engine::core::session::ViewportSession;

/// Root of the model currently shown in the viewport.
#[derive(Component, Debug)]
pub struct DisplayedModel {
    pub source_url: String,
    /// Bounds after recentring, in world space.
    pub bounds: ModelBounds,
}

/// One mesh node of the displayed model.
#[derive(Component, Debug)]
pub struct ModelNode {
    pub name: String,
    /// Material the asset asked for. Never applied.
    pub source_material: Option<String>,
}

/// Flat red, fully opaque, double-sided appearance shared by every node.
pub fn flat_model_material() -> StandardMaterial {
    StandardMaterial {
        base_color: MODEL_COLOUR,
        alpha_mode: AlphaMode::Opaque,
        unlit: true,
        double_sided: true,
        cull_mode: None,
        ..default()
    }
}

#[derive(Debug, Clone, Copy)]
pub struct AttachedModel {
    pub root: Entity,
    pub bounds: ModelBounds,
}

/// Spawn `model` recentred on the origin, one child entity per node, all with
/// the flat material. Returns `None` for a model without geometry.
pub fn attach_model(
    commands: &mut Commands,
    meshes: &mut Assets<Mesh>,
    materials: &mut Assets<StandardMaterial>,
    model: &ObjModel,
    source_url: &str,
) -> Option<AttachedModel> {
    let local_bounds = model.bounds()?;
    let offset = -local_bounds.center();
    let bounds = local_bounds.translated(offset);
    let material = materials.add(flat_model_material());

    let root = commands
        .spawn((
            DisplayedModel {
                source_url: source_url.to_string(),
                bounds,
            },
            Transform::from_translation(offset),
            Visibility::Visible,
        ))
        .with_children(|parent| {
            for node in &model.nodes {
                parent.spawn((
                    Mesh3d(meshes.add(node.to_mesh())),
                    MeshMaterial3d(material.clone()),
                    Transform::IDENTITY,
                    ModelNode {
                        name: node.name.clone(),
                        source_material: node.material.clone(),
                    },
                ));
            }
        })
        .id();

    Some(AttachedModel { root, bounds })
}

/// Despawn the displayed model, if any. The session keeps no reference to it.
pub fn detach_model(commands: &mut Commands, session: &mut ViewportSession) {
    if let Some(root) = session.model.take() {
        commands.entity(root).despawn();
        info!("Previous model removed from scene");
    }
}
