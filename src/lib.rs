//! Selection and caret handles over a rendered document.
//!
//! [`SelectionHandler`] owns the cursor/selection session state machine. It
//! talks to the rendering engine through [`dom::Document`] and to the UI that
//! draws the handles through [`shell::HandleShell`].

pub mod dom;
pub mod error;
pub mod handler;
pub mod listeners;
pub mod model;
pub mod msg;
pub mod publish;
pub mod replay;
pub mod reversal;
pub mod shell;
pub mod sim;
pub mod synth;
pub mod view_offset;
pub mod wire;

pub use dom::{Document, ElementId, SelectionChange, SelectionScope, WindowId};
pub use error::{DocumentError, SessionError, ShellError};
pub use handler::SelectionHandler;
pub use model::config::HandlerConfig;
pub use model::geometry::{Point, Rect};
pub use model::mode::{HandleType, Mode};
pub use msg::Msg;
