//! Screen implementations. Each screen is a top-level Component.

pub mod editor;
pub mod status;

use statusdeck_core::SourceKind;

use crate::component::Component;
use crate::screen::ScreenId;

/// Build every screen, keyed by id.
pub fn create_screens(can_mutate: bool, kind: SourceKind) -> Vec<(ScreenId, Box<dyn Component>)> {
    let status_screen: Box<dyn Component> = Box::new(status::StatusScreen::new());
    let editor_screen: Box<dyn Component> = Box::new(editor::EditorScreen::new(can_mutate, kind));
    vec![(ScreenId::Status, status_screen), (ScreenId::Editor, editor_screen)]
}
