use serde::{Deserialize, Serialize};

/// Handler interaction modes.
///
/// A session always starts from and returns to [`Mode::None`]; there is no
/// direct transition between cursor and selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Mode {
    /// No session; no handles on screen.
    #[default]
    None,
    /// A single caret handle positioned inside an editable field.
    Cursor,
    /// Start and end handles around a text selection.
    Selection,
}

impl Mode {
    pub fn label(&self) -> &'static str {
        match self {
            Mode::None => "NONE",
            Mode::Cursor => "CURSOR",
            Mode::Selection => "SELECTION",
        }
    }
}

/// Identity of an on-screen handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HandleType {
    Start,
    Middle,
    End,
}

/// The selection endpoint a drag applies to. The caret handle has none.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endpoint {
    Start,
    End,
}

impl HandleType {
    pub fn endpoint(self) -> Option<Endpoint> {
        match self {
            HandleType::Start => Some(Endpoint::Start),
            HandleType::End => Some(Endpoint::End),
            HandleType::Middle => None,
        }
    }
}
