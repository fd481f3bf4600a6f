use bevy::prelude::*;

/// Viewer lifecycle. Render-loop systems only run while `Ready`, which gives
/// the frame loop an explicit stop condition.
#[derive(Debug, Clone, Copy, Default, Eq, PartialEq, Hash, States)]
pub enum ViewerState {
    #[default]
    Initialising,
    Ready,
    ShutDown,
}

pub fn transition_to_ready(mut next_state: ResMut<NextState<ViewerState>>) {
    info!("→ Viewport initialised, transitioning to Ready state");
    next_state.set(ViewerState::Ready);
}
