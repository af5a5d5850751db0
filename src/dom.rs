//! Contracts for the rendering engine the handler sits on top of.
//!
//! Windows and elements are addressed by generation-checked keys. The handler
//! never owns the objects behind them: once the engine drops a window or an
//! element, every lookup through its key fails with a "gone" error.

use crate::error::DocumentError;
use crate::model::geometry::{Point, Rect};

slotmap::new_key_type! {
    /// A document window. Subframes are windows with a frame element.
    pub struct WindowId;
    /// An element inside some window.
    pub struct ElementId;
}

/// The element categories the handler cares about.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ElementKind {
    Generic,
    /// An editable text control with its own editor selection.
    TextField,
    /// An element hosting a subframe window.
    Frame,
    Button,
    Embed,
    Image,
    Media,
}

impl ElementKind {
    pub fn is_editable(self) -> bool {
        matches!(self, ElementKind::TextField)
    }

    /// Replaced and interactive elements never take part in text selection.
    pub fn excludes_selection(self) -> bool {
        matches!(
            self,
            ElementKind::Button | ElementKind::Embed | ElementKind::Image | ElementKind::Media
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TextDirection {
    #[default]
    Ltr,
    Rtl,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UserSelect {
    #[default]
    Auto,
    None,
}

/// The resolved style properties the handler reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ComputedStyle {
    pub direction: TextDirection,
    pub user_select: UserSelect,
}

/// Which native selection an operation applies to.
///
/// Plain content shares the window selection; editable fields own a separate
/// editor selection. The scope is picked once when a session starts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionScope {
    Content(WindowId),
    Field(ElementId),
}

impl SelectionScope {
    pub fn for_target(window: WindowId, target: ElementId, kind: ElementKind) -> Self {
        if kind.is_editable() {
            SelectionScope::Field(target)
        } else {
            SelectionScope::Content(window)
        }
    }
}

/// A selection-change notification from the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SelectionChange {
    pub collapsed: bool,
    /// The change came from a pointer-down, real or synthesized.
    pub caused_by_pointer_down: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerKind {
    Down,
    Up,
}

/// A synthetic pointer event in top-level client coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerEvent {
    pub kind: PointerKind,
    pub point: Point,
    pub shift: bool,
}

/// Per-window DOM events a session listens to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WindowEvent {
    PageHide,
    KeyDown,
    Blur,
}

/// Selection and range operations, addressed by [`SelectionScope`].
pub trait SelectionService {
    fn remove_all_ranges(&mut self, scope: SelectionScope) -> Result<(), DocumentError>;
    fn collapse_to_start(&mut self, scope: SelectionScope) -> Result<(), DocumentError>;
    fn range_count(&self, scope: SelectionScope) -> Result<usize, DocumentError>;
    fn selection_text(&self, scope: SelectionScope) -> Result<String, DocumentError>;
    /// Client rects of the first range, local to the selection's window.
    fn range_client_rects(&self, scope: SelectionScope) -> Result<Vec<Rect>, DocumentError>;
    /// Bounding rect of the first range, local to the selection's window.
    fn range_bounding_rect(&self, scope: SelectionScope) -> Result<Rect, DocumentError>;
    fn word_move(
        &mut self,
        scope: SelectionScope,
        forward: bool,
        extend: bool,
    ) -> Result<(), DocumentError>;
    fn select_all(&mut self, scope: SelectionScope) -> Result<(), DocumentError>;
    fn scroll_line(&mut self, scope: SelectionScope, forward: bool) -> Result<(), DocumentError>;
    fn scroll_character(
        &mut self,
        scope: SelectionScope,
        forward: bool,
    ) -> Result<(), DocumentError>;
    fn add_selection_listener(&mut self, scope: SelectionScope) -> Result<(), DocumentError>;
    fn remove_selection_listener(&mut self, scope: SelectionScope);
}

/// Frame graph, geometry, editable-field queries and input dispatch.
pub trait Document: SelectionService {
    fn owner_window(&self, element: ElementId) -> Result<WindowId, DocumentError>;
    /// `None` for the top-level window.
    fn parent_window(&self, window: WindowId) -> Result<Option<WindowId>, DocumentError>;
    /// The element hosting `window`, `None` for the top-level window.
    fn frame_element(&self, window: WindowId) -> Result<Option<ElementId>, DocumentError>;
    /// Border box in the client coordinates of the element's own window.
    fn bounding_client_rect(&self, element: ElementId) -> Result<Rect, DocumentError>;
    fn element_kind(&self, element: ElementId) -> Result<ElementKind, DocumentError>;
    fn computed_style(&self, element: ElementId) -> Result<ComputedStyle, DocumentError>;
    fn scroll_offset(&self, window: WindowId) -> Result<Point, DocumentError>;
    fn focus(&mut self, element: ElementId) -> Result<(), DocumentError>;

    fn add_event_listener(
        &mut self,
        window: WindowId,
        event: WindowEvent,
    ) -> Result<(), DocumentError>;
    fn remove_event_listener(&mut self, window: WindowId, event: WindowEvent);

    /// Dispatch a synthetic pointer event to the top-level window.
    ///
    /// Returns the selection-change notifications the event produced for
    /// scopes with a registered listener, in delivery order.
    fn dispatch_pointer(
        &mut self,
        event: PointerEvent,
    ) -> Result<Vec<SelectionChange>, DocumentError>;

    /// Logical end offset of a field's selection.
    fn selection_end(&self, field: ElementId) -> Result<usize, DocumentError>;
    /// Caret rect at `offset`, in top-level client coordinates.
    fn caret_rect(&self, field: ElementId, offset: usize) -> Result<Rect, DocumentError>;
    /// Bounds of a field's text content, in top-level client coordinates.
    fn text_bounds(&self, field: ElementId) -> Result<Rect, DocumentError>;
    /// Visual editor area of a field, in top-level client coordinates.
    fn editor_rect(&self, field: ElementId) -> Result<Rect, DocumentError>;

    /// Walk up the frame chain to the top-level window.
    fn top_window(&self, window: WindowId) -> Result<WindowId, DocumentError> {
        let mut current = window;
        while let Some(parent) = self.parent_window(current)? {
            current = parent;
        }
        Ok(current)
    }
}
