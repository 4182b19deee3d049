//! Input messages delivered to the application: [`Msg`] and [`Key`].

// ---------------------------------------------------------------------------
// Key
// ---------------------------------------------------------------------------

/// A keyboard key.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Key {
    ArrowUp,
    ArrowDown,
    ArrowLeft,
    ArrowRight,
    Escape,
    Enter,
    Space,
    /// A printable character.
    Char(char),
}

// ---------------------------------------------------------------------------
// Msg
// ---------------------------------------------------------------------------

/// A message delivered to the application model.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Msg {
    /// Sent once when the application starts.
    Init,
    /// A key was pressed.
    KeyDown { key: Key },
    /// The window was asked to close.
    Quit,
}

impl Msg {
    /// Convenience: create a `KeyDown`.
    #[inline]
    pub const fn key(key: Key) -> Self {
        Self::KeyDown { key }
    }
}
