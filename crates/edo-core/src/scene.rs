//! The [`Scene`] type — the per-frame list of draw commands.
//!
//! The model rebuilds the scene from scratch every frame; drivers consume
//! it back-to-front in insertion order. There is no diffing: every loop
//! iteration presents one full frame.

use crate::color::Color;
use crate::geom::{Point, Rect};

// ---------------------------------------------------------------------------
// ImageId
// ---------------------------------------------------------------------------

/// Handle to an image registered in the asset store.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ImageId(pub usize);

// ---------------------------------------------------------------------------
// DrawCmd
// ---------------------------------------------------------------------------

/// A single draw command.
#[derive(Clone, Debug, PartialEq)]
pub enum DrawCmd {
    /// Draw an image scaled into `dst`.
    Image { image: ImageId, dst: Rect },
    /// Draw a line of text with its top-left corner at `pos`.
    Text {
        text: String,
        pos: Point,
        /// Font size in pixels.
        size: f32,
        color: Color,
    },
}

// ---------------------------------------------------------------------------
// Scene
// ---------------------------------------------------------------------------

/// A frame description: a clear colour plus ordered draw commands.
#[derive(Clone, Debug)]
pub struct Scene {
    clear: Color,
    cmds: Vec<DrawCmd>,
}

impl Scene {
    /// Create an empty scene with the given clear colour.
    pub fn new(clear: Color) -> Self {
        Self {
            clear,
            cmds: Vec::new(),
        }
    }

    /// Colour the frame is cleared to before any command is drawn.
    #[inline]
    pub fn clear_color(&self) -> Color {
        self.clear
    }

    /// The queued draw commands, in insertion order.
    #[inline]
    pub fn cmds(&self) -> &[DrawCmd] {
        &self.cmds
    }

    /// Drop all queued commands and set a new clear colour.
    pub fn reset(&mut self, clear: Color) {
        self.clear = clear;
        self.cmds.clear();
    }

    /// Queue an image draw, scaled into `dst`.
    pub fn draw_image(&mut self, image: ImageId, dst: Rect) {
        self.cmds.push(DrawCmd::Image { image, dst });
    }

    /// Queue a text draw at `pos` with the given pixel size and colour.
    pub fn draw_text(&mut self, text: impl Into<String>, pos: Point, size: f32, color: Color) {
        self.cmds.push(DrawCmd::Text {
            text: text.into(),
            pos,
            size,
            color,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn commands_keep_insertion_order() {
        let mut scene = Scene::new(Color::BLACK);
        let dst = Rect::sized(Point::new(20, 10), 320, 240);
        scene.draw_image(ImageId(0), dst);
        scene.draw_text("edo", Point::new(20, 10), 40.0, Color::from_rgb(0, 0, 0xFF));

        assert_eq!(scene.cmds().len(), 2);
        assert_eq!(
            scene.cmds()[0],
            DrawCmd::Image {
                image: ImageId(0),
                dst
            }
        );
        assert!(matches!(&scene.cmds()[1], DrawCmd::Text { text, .. } if text == "edo"));
    }

    #[test]
    fn reset_clears_everything() {
        let mut scene = Scene::new(Color::BLACK);
        scene.draw_image(ImageId(3), Rect::new(0, 0, 8, 8));
        scene.reset(Color::WHITE);

        assert!(scene.cmds().is_empty());
        assert_eq!(scene.clear_color(), Color::WHITE);
    }
}
