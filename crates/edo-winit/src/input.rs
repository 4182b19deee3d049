//! Translates winit input events into edo [`Msg`] values.

use winit::event::{ElementState, KeyEvent};
use winit::keyboard::{Key as WKey, NamedKey};

use edo_core::{Key, Msg};

pub(crate) fn translate_keyboard(event: &KeyEvent) -> Option<Msg> {
    // Only key-down (pressed) events.
    if event.state != ElementState::Pressed {
        return None;
    }

    let key = match &event.logical_key {
        WKey::Named(named) => match named {
            NamedKey::ArrowUp => Key::ArrowUp,
            NamedKey::ArrowDown => Key::ArrowDown,
            NamedKey::ArrowLeft => Key::ArrowLeft,
            NamedKey::ArrowRight => Key::ArrowRight,
            NamedKey::Escape => Key::Escape,
            NamedKey::Enter => Key::Enter,
            NamedKey::Space => Key::Space,
            _ => return None,
        },
        WKey::Character(s) => {
            let mut chars = s.chars();
            match (chars.next(), chars.next()) {
                (Some(c), None) => Key::Char(c),
                _ => return None,
            }
        }
        _ => return None,
    };

    Some(Msg::key(key))
}
