//! The edo model: a placeholder picture moved around with the keyboard.

use edo_core::{Color, Effect, ImageId, Key, Model, Msg, Point, Rect, Scene};

pub const SCREEN_WIDTH: i32 = 640;
pub const SCREEN_HEIGHT: i32 = 480;

/// Pixels moved per key press.
pub const MOVE_STEP: i32 = 10;

/// Colour the frame clears to.
pub const BACKGROUND: Color = Color::from_rgb(0xF0, 0xF0, 0xF0);

/// Label tint, the original's `"0000FF"`.
const LABEL_COLOR: Color = Color::from_rgb(0x00, 0x00, 0xFF);
const LABEL_SIZE: f32 = 40.0;
const LABEL: &str = "edo";

/// Game state: the picture's top-left corner plus its (optional) image.
pub struct EdoModel {
    pos: Point,
    placeholder: Option<ImageId>,
}

impl EdoModel {
    /// Create the model. `placeholder` is `None` when the image failed to
    /// load; the picture is then simply not drawn.
    pub fn new(placeholder: Option<ImageId>) -> Self {
        Self {
            pos: Point::ZERO,
            placeholder,
        }
    }

    /// Current top-left corner of the picture.
    #[inline]
    pub fn pos(&self) -> Point {
        self.pos
    }

    fn handle_key(&mut self, key: Key) -> Option<Effect> {
        let (dx, dy) = match key {
            Key::ArrowUp => (0, -1),
            Key::ArrowDown => (0, 1),
            Key::ArrowLeft => (-1, 0),
            Key::ArrowRight => (1, 0),
            Key::Char(c) => match c.to_ascii_lowercase() {
                'w' => (0, -1),
                's' => (0, 1),
                'a' => (-1, 0),
                'd' => (1, 0),
                'q' => return Some(Effect::End),
                _ => return None,
            },
            _ => return None,
        };

        // No clamping: the picture may leave the screen indefinitely.
        self.pos = self.pos.shift(dx * MOVE_STEP, dy * MOVE_STEP);
        None
    }
}

impl Model for EdoModel {
    fn update(&mut self, msg: Msg) -> Option<Effect> {
        match msg {
            Msg::KeyDown { key } => self.handle_key(key),
            _ => None,
        }
    }

    fn draw(&self, scene: &mut Scene) {
        let dst = Rect::sized(self.pos, SCREEN_WIDTH / 2, SCREEN_HEIGHT / 2);
        if let Some(image) = self.placeholder {
            scene.draw_image(image, dst);
        }
        scene.draw_text(LABEL, dst.min, LABEL_SIZE, LABEL_COLOR);
    }
}
