//! Headless stand-ins for the rendering engine and the host UI.

mod document;
mod scene;
mod shell;

pub use document::{GlyphMetrics, ScrollRequest, SimDocument};
pub use scene::Scene;
pub use shell::RecordingShell;
