use crate::dom::{ElementId, SelectionChange, WindowEvent};
use crate::listeners::{Listener, Topic};
use crate::model::geometry::Point;
use crate::model::mode::HandleType;

/// All notifications that drive the selection handler.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Msg {
    // -- Gestures and drags
    SingleTap(Point),
    HandleMove { handle: HandleType, point: Point },
    HandleRelease(HandleType),

    // -- Viewport
    WindowResize,
    ViewportChanged,
    SubframeScrolled(ElementId),

    // -- Lifecycle
    TabSelected,
    PageHide,
    KeyDown,
    Blur,
    CompositionEnd,

    // -- Engine
    SelectionChanged(SelectionChange),
}

impl Msg {
    /// The subscription an event arrives through, if any.
    pub fn listener(&self) -> Option<Listener> {
        let listener = match self {
            Msg::SingleTap(_) => Listener::Topic(Topic::SingleTap),
            Msg::HandleMove { .. } => Listener::Topic(Topic::HandleMove),
            Msg::HandleRelease(_) => Listener::Topic(Topic::HandlePosition),
            Msg::WindowResize => Listener::Topic(Topic::WindowResize),
            Msg::ViewportChanged => Listener::Topic(Topic::ViewportChange),
            Msg::TabSelected => Listener::Topic(Topic::TabSelected),
            Msg::CompositionEnd => Listener::Topic(Topic::CompositionEnd),
            Msg::PageHide => Listener::Window(WindowEvent::PageHide),
            Msg::KeyDown => Listener::Window(WindowEvent::KeyDown),
            Msg::Blur => Listener::Window(WindowEvent::Blur),
            Msg::SubframeScrolled(_) | Msg::SelectionChanged(_) => return None,
        };
        Some(listener)
    }
}
