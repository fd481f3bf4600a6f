//! Mirrors the `StatusMessage` resource onto whatever surface shows it: the
//! page's status element on WASM, a text overlay natively.

use bevy::prelude::*;

use crate::engine::core::status::StatusMessage;

#[cfg(target_arch = "wasm32")]
use crate::engine::assets::viewer_config::ViewerConfig;

/// Marker for the native status overlay text.
#[cfg(not(target_arch = "wasm32"))]
#[derive(Component)]
pub struct StatusText;

#[cfg(not(target_arch = "wasm32"))]
pub fn create_status_overlay(mut commands: Commands) {
    commands
        .spawn(Node {
            width: Val::Percent(100.0),
            height: Val::Percent(100.0),
            ..default()
        })
        .with_children(|parent| {
            parent.spawn((
                Text::new(""),
                TextFont {
                    font_size: 16.0,
                    ..default()
                },
                TextColor(Color::WHITE),
                Node {
                    position_type: PositionType::Absolute,
                    bottom: Val::Px(12.0),
                    left: Val::Px(12.0),
                    ..default()
                },
                StatusText,
            ));
        });
}

#[cfg(not(target_arch = "wasm32"))]
pub fn update_status_overlay(
    status: Res<StatusMessage>,
    mut query: Query<(&mut Text, &mut TextColor), With<StatusText>>,
) {
    if !status.is_changed() {
        return;
    }

    for (mut text, mut colour) in &mut query {
        text.0 = status.text.clone();
        colour.0 = status.tone.colour();
    }
}

/// Write the status text and tone colour to the page element.
#[cfg(target_arch = "wasm32")]
pub fn sync_status_element(status: Res<StatusMessage>, config: Res<ViewerConfig>) {
    use wasm_bindgen::JsCast;

    if !status.is_changed() {
        return;
    }

    let Some(document) = web_sys::window().and_then(|window| window.document()) else {
        return;
    };
    let Some(element) = document.get_element_by_id(&config.status_element_id) else {
        warn!("Status element #{} not found", config.status_element_id);
        return;
    };

    element.set_text_content(Some(&status.text));
    if let Ok(element) = element.dyn_into::<web_sys::HtmlElement>() {
        if let Err(e) = element
            .style()
            .set_property("color", status.tone.css_colour())
        {
            error!("Failed to colour status element: {:?}", e);
        }
    }
}

#[cfg(all(test, not(target_arch = "wasm32")))]
mod tests {
    use super::*;
    use crate::engine::core::status::StatusTone;

    #[test]
    fn overlay_follows_status_changes() {
        let mut app = App::new();
        app.add_plugins(MinimalPlugins)
            .init_resource::<StatusMessage>()
            .add_systems(Startup, create_status_overlay)
            .add_systems(Update, update_status_overlay);
        app.update();

        app.world_mut()
            .resource_mut::<StatusMessage>()
            .set("Model generated and displayed!", StatusTone::Success);
        app.update();

        let world = app.world_mut();
        let mut texts = world.query_filtered::<(&Text, &TextColor), With<StatusText>>();
        let (text, colour) = texts.single(world).unwrap();
        assert_eq!(text.0, "Model generated and displayed!");
        assert_eq!(colour.0, StatusTone::Success.colour());
    }
}
