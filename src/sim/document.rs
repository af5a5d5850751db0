//! In-memory document with monospace layout.
//!
//! Each text element lays its characters out on a fixed glyph grid starting
//! at the element's top-left corner (top-right for RTL, where columns run
//! right to left). Lines break on `\n`. Coordinates of an element are client
//! coordinates of the window that holds it.

use slotmap::SlotMap;

use crate::dom::{
    ComputedStyle, Document, ElementId, ElementKind, PointerEvent, PointerKind, SelectionChange,
    SelectionScope, SelectionService, TextDirection, UserSelect, WindowEvent, WindowId,
};
use crate::error::DocumentError;
use crate::model::geometry::{Point, Rect};
use crate::view_offset::view_offset;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GlyphMetrics {
    pub width: f64,
    pub height: f64,
}

impl Default for GlyphMetrics {
    fn default() -> Self {
        Self {
            width: 10.0,
            height: 20.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScrollRequest {
    Line { forward: bool },
    Character { forward: bool },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct SimRange {
    element: ElementId,
    anchor: usize,
    focus: usize,
}

impl SimRange {
    fn collapsed(element: ElementId, offset: usize) -> Self {
        Self {
            element,
            anchor: offset,
            focus: offset,
        }
    }

    fn start(&self) -> usize {
        self.anchor.min(self.focus)
    }

    fn end(&self) -> usize {
        self.anchor.max(self.focus)
    }

    fn is_collapsed(&self) -> bool {
        self.anchor == self.focus
    }
}

#[derive(Debug, Default)]
struct SimSelection {
    range: Option<SimRange>,
    listening: bool,
}

#[derive(Debug)]
struct SimWindow {
    parent: Option<WindowId>,
    frame: Option<ElementId>,
    scroll: Point,
    selection: SimSelection,
    listeners: Vec<WindowEvent>,
    elements: Vec<ElementId>,
}

impl SimWindow {
    fn new(parent: Option<WindowId>, frame: Option<ElementId>) -> Self {
        Self {
            parent,
            frame,
            scroll: Point::ZERO,
            selection: SimSelection::default(),
            listeners: Vec::new(),
            elements: Vec::new(),
        }
    }
}

#[derive(Debug)]
struct SimElement {
    window: WindowId,
    kind: ElementKind,
    style: ComputedStyle,
    rect: Rect,
    text: Vec<char>,
    hosted: Option<WindowId>,
    editor: Option<SimSelection>,
}

impl SimElement {
    fn has_text_layout(&self) -> bool {
        match self.kind {
            ElementKind::TextField => true,
            ElementKind::Generic => !self.text.is_empty(),
            _ => false,
        }
    }

    fn rtl(&self) -> bool {
        self.style.direction == TextDirection::Rtl
    }

    /// `(start, end)` character offsets of every line, `end` exclusive of `\n`.
    fn lines(&self) -> Vec<(usize, usize)> {
        let mut lines = Vec::new();
        let mut start = 0;
        for (idx, ch) in self.text.iter().enumerate() {
            if *ch == '\n' {
                lines.push((start, idx));
                start = idx + 1;
            }
        }
        lines.push((start, self.text.len()));
        lines
    }

    fn line_of(&self, offset: usize) -> (usize, usize) {
        let lines = self.lines();
        let line = lines
            .iter()
            .rposition(|(start, _)| *start <= offset)
            .unwrap_or(0);
        let col = offset.saturating_sub(lines[line].0);
        (line, col)
    }

    /// x of the caret boundary before column `col`.
    fn boundary_x(&self, col: usize, glyph: GlyphMetrics) -> f64 {
        let advance = col as f64 * glyph.width;
        if self.rtl() {
            self.rect.right() - advance
        } else {
            self.rect.left() + advance
        }
    }

    fn line_top(&self, line: usize, glyph: GlyphMetrics) -> f64 {
        self.rect.top() + line as f64 * glyph.height
    }

    fn caret_rect(&self, offset: usize, glyph: GlyphMetrics) -> Rect {
        let (line, col) = self.line_of(offset.min(self.text.len()));
        Rect::new(
            self.boundary_x(col, glyph),
            self.line_top(line, glyph),
            0.0,
            glyph.height,
        )
    }

    fn range_rects(&self, start: usize, end: usize, glyph: GlyphMetrics) -> Vec<Rect> {
        if start == end {
            return vec![self.caret_rect(start, glyph)];
        }

        let mut rects = Vec::new();
        for (line, (line_start, line_end)) in self.lines().into_iter().enumerate() {
            let from = start.max(line_start);
            let to = end.min(line_end);
            if from >= to {
                continue;
            }
            let a = self.boundary_x(from - line_start, glyph);
            let b = self.boundary_x(to - line_start, glyph);
            let top = self.line_top(line, glyph);
            rects.push(Rect::from_edges(
                a.min(b),
                top,
                a.max(b),
                top + glyph.height,
            ));
        }
        rects
    }

    fn text_bounds(&self, glyph: GlyphMetrics) -> Rect {
        let lines = self.lines();
        let widest = lines.iter().map(|(s, e)| e - s).max().unwrap_or(0);
        let width = widest as f64 * glyph.width;
        let left = if self.rtl() {
            self.rect.right() - width
        } else {
            self.rect.left()
        };
        Rect::new(
            left,
            self.rect.top(),
            width,
            lines.len() as f64 * glyph.height,
        )
    }

    /// Nearest caret offset to a point in window coordinates.
    fn offset_at(&self, point: Point, glyph: GlyphMetrics) -> usize {
        let lines = self.lines();
        let line = ((point.y - self.rect.top()) / glyph.height).floor();
        let line = (line.max(0.0) as usize).min(lines.len() - 1);
        let (line_start, line_end) = lines[line];

        let advance = if self.rtl() {
            self.rect.right() - point.x
        } else {
            point.x - self.rect.left()
        };
        let col = (advance / glyph.width).round().max(0.0) as usize;
        line_start + col.min(line_end - line_start)
    }
}

/// Headless [`Document`] for tests and trace replay.
#[derive(Debug)]
pub struct SimDocument {
    windows: SlotMap<WindowId, SimWindow>,
    elements: SlotMap<ElementId, SimElement>,
    top: WindowId,
    glyph: GlyphMetrics,
    focused: Option<ElementId>,
    dispatched: Vec<PointerEvent>,
    scroll_requests: Vec<ScrollRequest>,
    fail_word_move: bool,
    unrendered: bool,
}

impl Default for SimDocument {
    fn default() -> Self {
        Self::new()
    }
}

impl SimDocument {
    pub fn new() -> Self {
        let mut windows = SlotMap::with_key();
        let top = windows.insert(SimWindow::new(None, None));
        Self {
            windows,
            elements: SlotMap::with_key(),
            top,
            glyph: GlyphMetrics::default(),
            focused: None,
            dispatched: Vec::new(),
            scroll_requests: Vec::new(),
            fail_word_move: false,
            unrendered: false,
        }
    }

    pub fn with_glyph(mut self, glyph: GlyphMetrics) -> Self {
        self.glyph = glyph;
        self
    }

    pub fn top(&self) -> WindowId {
        self.top
    }

    // ── Building ─────────────────────────────────────────────────

    pub fn add_element(&mut self, window: WindowId, kind: ElementKind, rect: Rect) -> ElementId {
        let element = self.elements.insert(SimElement {
            window,
            kind,
            style: ComputedStyle::default(),
            rect,
            text: Vec::new(),
            hosted: None,
            editor: kind.is_editable().then(SimSelection::default),
        });
        if let Some(win) = self.windows.get_mut(window) {
            win.elements.push(element);
        }
        element
    }

    pub fn add_text(&mut self, window: WindowId, rect: Rect, text: &str) -> ElementId {
        let element = self.add_element(window, ElementKind::Generic, rect);
        self.elements[element].text = text.chars().collect();
        element
    }

    pub fn add_field(&mut self, window: WindowId, rect: Rect, text: &str) -> ElementId {
        let element = self.add_element(window, ElementKind::TextField, rect);
        self.elements[element].text = text.chars().collect();
        element
    }

    /// Add a frame element to `window`, returning it and its hosted window.
    pub fn add_frame(&mut self, window: WindowId, rect: Rect) -> (ElementId, WindowId) {
        let frame = self.add_element(window, ElementKind::Frame, rect);
        let hosted = self.windows.insert(SimWindow::new(Some(window), Some(frame)));
        self.elements[frame].hosted = Some(hosted);
        (frame, hosted)
    }

    pub fn set_direction(&mut self, element: ElementId, direction: TextDirection) {
        if let Some(el) = self.elements.get_mut(element) {
            el.style.direction = direction;
        }
    }

    pub fn set_user_select(&mut self, element: ElementId, user_select: UserSelect) {
        if let Some(el) = self.elements.get_mut(element) {
            el.style.user_select = user_select;
        }
    }

    pub fn set_rect(&mut self, element: ElementId, rect: Rect) {
        if let Some(el) = self.elements.get_mut(element) {
            el.rect = rect;
        }
    }

    pub fn set_scroll(&mut self, window: WindowId, scroll: Point) {
        if let Some(win) = self.windows.get_mut(window) {
            win.scroll = scroll;
        }
    }

    pub fn set_field_caret(&mut self, field: ElementId, offset: usize) {
        if let Some(editor) = self.elements.get_mut(field).and_then(|el| el.editor.as_mut()) {
            editor.range = Some(SimRange::collapsed(field, offset));
        }
    }

    pub fn set_fail_word_move(&mut self, fail: bool) {
        self.fail_word_move = fail;
    }

    /// Report no client rects for any range, as for content with no boxes.
    pub fn set_unrendered(&mut self, unrendered: bool) {
        self.unrendered = unrendered;
    }

    /// Destroy an element. Frames take their hosted window tree with them.
    pub fn remove_element(&mut self, element: ElementId) {
        let Some(el) = self.elements.remove(element) else {
            return;
        };
        if let Some(win) = self.windows.get_mut(el.window) {
            win.elements.retain(|e| *e != element);
            if win.selection.range.is_some_and(|r| r.element == element) {
                win.selection.range = None;
            }
        }
        if let Some(hosted) = el.hosted {
            self.remove_window(hosted);
        }
        if self.focused == Some(element) {
            self.focused = None;
        }
    }

    fn remove_window(&mut self, window: WindowId) {
        let Some(win) = self.windows.remove(window) else {
            return;
        };
        for element in win.elements {
            if let Some(hosted) = self.elements.remove(element).and_then(|el| el.hosted) {
                self.remove_window(hosted);
            }
        }
    }

    /// Collapse a selection the way a script would, returning the
    /// notification a listener would receive.
    pub fn collapse_externally(&mut self, scope: SelectionScope) -> SelectionChange {
        if let Some(range) = self
            .selection_mut(scope)
            .ok()
            .and_then(|sel| sel.range.as_mut())
        {
            let start = range.start();
            range.anchor = start;
            range.focus = start;
        }
        SelectionChange {
            collapsed: true,
            caused_by_pointer_down: false,
        }
    }

    // ── Inspection ───────────────────────────────────────────────

    pub fn dispatched(&self) -> &[PointerEvent] {
        &self.dispatched
    }

    pub fn clear_dispatched(&mut self) {
        self.dispatched.clear();
    }

    pub fn scroll_requests(&self) -> &[ScrollRequest] {
        &self.scroll_requests
    }

    pub fn focused(&self) -> Option<ElementId> {
        self.focused
    }

    /// `(anchor, focus)` offsets of a scope's range.
    pub fn selection_offsets(&self, scope: SelectionScope) -> Option<(usize, usize)> {
        self.selection(scope)
            .ok()?
            .range
            .map(|r| (r.anchor, r.focus))
    }

    pub fn field_caret(&self, field: ElementId) -> Option<usize> {
        self.elements
            .get(field)?
            .editor
            .as_ref()?
            .range
            .map(|r| r.focus)
    }

    pub fn has_selection_listener(&self, scope: SelectionScope) -> bool {
        self.selection(scope).is_ok_and(|sel| sel.listening)
    }

    pub fn has_event_listener(&self, window: WindowId, event: WindowEvent) -> bool {
        self.windows
            .get(window)
            .is_some_and(|w| w.listeners.contains(&event))
    }

    /// The innermost non-frame element under a top-level client point.
    pub fn element_at(&self, point: Point) -> Option<ElementId> {
        let (window, local) = self.route(point);
        self.windows[window]
            .elements
            .iter()
            .copied()
            .rev()
            .find(|e| {
                let el = &self.elements[*e];
                el.kind != ElementKind::Frame && el.rect.contains(local)
            })
    }

    // ── Internals ────────────────────────────────────────────────

    /// Descend through frames containing `point`, returning the innermost
    /// window and the point in its client coordinates.
    fn route(&self, point: Point) -> (WindowId, Point) {
        let mut window = self.top;
        let mut local = point;
        'descend: loop {
            for element in self.windows[window].elements.iter().rev() {
                let el = &self.elements[*element];
                let Some(hosted) = el.hosted else {
                    continue;
                };
                if el.rect.contains(local) && self.windows.contains_key(hosted) {
                    local = local - el.rect.origin();
                    window = hosted;
                    continue 'descend;
                }
            }
            return (window, local);
        }
    }

    /// Text element under `local`, or the closest one in the window.
    fn text_element_near(&self, window: WindowId, local: Point) -> Option<ElementId> {
        let candidates = self.windows[window]
            .elements
            .iter()
            .copied()
            .filter(|e| self.elements[*e].has_text_layout());

        let distance = |rect: &Rect| {
            let dx = (rect.left() - local.x).max(local.x - rect.right()).max(0.0);
            let dy = (rect.top() - local.y).max(local.y - rect.bottom()).max(0.0);
            dx * dx + dy * dy
        };

        candidates.min_by(|a, b| {
            distance(&self.elements[*a].rect).total_cmp(&distance(&self.elements[*b].rect))
        })
    }

    fn scope_of(&self, element: ElementId) -> SelectionScope {
        let el = &self.elements[element];
        SelectionScope::for_target(el.window, element, el.kind)
    }

    fn selection(&self, scope: SelectionScope) -> Result<&SimSelection, DocumentError> {
        match scope {
            SelectionScope::Content(window) => self
                .windows
                .get(window)
                .map(|w| &w.selection)
                .ok_or(DocumentError::WindowGone),
            SelectionScope::Field(field) => self
                .elements
                .get(field)
                .ok_or(DocumentError::ElementGone)?
                .editor
                .as_ref()
                .ok_or(DocumentError::NotEditable),
        }
    }

    fn selection_mut(&mut self, scope: SelectionScope) -> Result<&mut SimSelection, DocumentError> {
        match scope {
            SelectionScope::Content(window) => self
                .windows
                .get_mut(window)
                .map(|w| &mut w.selection)
                .ok_or(DocumentError::WindowGone),
            SelectionScope::Field(field) => self
                .elements
                .get_mut(field)
                .ok_or(DocumentError::ElementGone)?
                .editor
                .as_mut()
                .ok_or(DocumentError::NotEditable),
        }
    }

    fn range(&self, scope: SelectionScope) -> Result<SimRange, DocumentError> {
        self.selection(scope)?.range.ok_or(DocumentError::NoRange)
    }

    fn element(&self, element: ElementId) -> Result<&SimElement, DocumentError> {
        self.elements.get(element).ok_or(DocumentError::ElementGone)
    }

    fn field(&self, field: ElementId) -> Result<&SimElement, DocumentError> {
        let el = self.element(field)?;
        if el.editor.is_none() {
            return Err(DocumentError::NotEditable);
        }
        Ok(el)
    }

    fn press(&mut self, point: Point, shift: bool) -> Option<SelectionChange> {
        let (window, local) = self.route(point);

        let Some(element) = self.text_element_near(window, local) else {
            if shift {
                return None;
            }
            let sel = &mut self.windows[window].selection;
            sel.range = None;
            return sel.listening.then_some(SelectionChange {
                collapsed: true,
                caused_by_pointer_down: true,
            });
        };

        let offset = self.elements[element].offset_at(local, self.glyph);
        let scope = self.scope_of(element);
        if matches!(scope, SelectionScope::Field(_)) {
            self.focused = Some(element);
        }

        let sel = self.selection_mut(scope).ok()?;
        let range = match sel.range {
            Some(mut range) if shift && range.element == element => {
                range.focus = offset;
                range
            }
            _ => SimRange::collapsed(element, offset),
        };
        sel.range = Some(range);

        sel.listening.then_some(SelectionChange {
            collapsed: range.is_collapsed(),
            caused_by_pointer_down: true,
        })
    }
}

fn prev_word_start(text: &[char], mut idx: usize) -> usize {
    while idx > 0 && text[idx - 1].is_whitespace() {
        idx -= 1;
    }
    while idx > 0 && !text[idx - 1].is_whitespace() {
        idx -= 1;
    }
    idx
}

fn next_word_end(text: &[char], mut idx: usize) -> usize {
    while idx < text.len() && text[idx].is_whitespace() {
        idx += 1;
    }
    while idx < text.len() && !text[idx].is_whitespace() {
        idx += 1;
    }
    idx
}

impl SelectionService for SimDocument {
    fn remove_all_ranges(&mut self, scope: SelectionScope) -> Result<(), DocumentError> {
        self.selection_mut(scope)?.range = None;
        Ok(())
    }

    fn collapse_to_start(&mut self, scope: SelectionScope) -> Result<(), DocumentError> {
        if let Some(range) = self.selection_mut(scope)?.range.as_mut() {
            let start = range.start();
            range.anchor = start;
            range.focus = start;
        }
        Ok(())
    }

    fn range_count(&self, scope: SelectionScope) -> Result<usize, DocumentError> {
        Ok(usize::from(self.selection(scope)?.range.is_some()))
    }

    fn selection_text(&self, scope: SelectionScope) -> Result<String, DocumentError> {
        let Some(range) = self.selection(scope)?.range else {
            return Ok(String::new());
        };
        let el = self.element(range.element)?;
        Ok(el.text[range.start()..range.end()].iter().collect())
    }

    fn range_client_rects(&self, scope: SelectionScope) -> Result<Vec<Rect>, DocumentError> {
        let range = self.range(scope)?;
        let el = self.element(range.element)?;
        if self.unrendered {
            return Ok(Vec::new());
        }
        Ok(el.range_rects(range.start(), range.end(), self.glyph))
    }

    fn range_bounding_rect(&self, scope: SelectionScope) -> Result<Rect, DocumentError> {
        self.range_client_rects(scope)?
            .into_iter()
            .reduce(|acc, rect| acc.union(&rect))
            .ok_or(DocumentError::NoRange)
    }

    /// Caret moves are visual and extending moves are logical, so in RTL text
    /// a backward caret move lands on the logical end of the word.
    fn word_move(
        &mut self,
        scope: SelectionScope,
        forward: bool,
        extend: bool,
    ) -> Result<(), DocumentError> {
        if self.fail_word_move {
            return Err(DocumentError::WordMove("no word boundary".to_string()));
        }

        let mut range = self.range(scope)?;
        let el = self.element(range.element)?;
        let logical_forward = if extend { forward } else { forward != el.rtl() };
        let target = if logical_forward {
            next_word_end(&el.text, range.focus)
        } else {
            prev_word_start(&el.text, range.focus)
        };

        range.focus = target;
        if !extend {
            range.anchor = target;
        }
        self.selection_mut(scope)?.range = Some(range);
        Ok(())
    }

    fn select_all(&mut self, scope: SelectionScope) -> Result<(), DocumentError> {
        let element = match (self.selection(scope)?.range, scope) {
            (Some(range), _) => range.element,
            (None, SelectionScope::Field(field)) => field,
            (None, SelectionScope::Content(window)) => self.windows[window]
                .elements
                .iter()
                .copied()
                .find(|e| self.elements[*e].has_text_layout())
                .ok_or(DocumentError::NoRange)?,
        };
        let len = self.element(element)?.text.len();
        self.selection_mut(scope)?.range = Some(SimRange {
            element,
            anchor: 0,
            focus: len,
        });
        Ok(())
    }

    fn scroll_line(&mut self, scope: SelectionScope, forward: bool) -> Result<(), DocumentError> {
        self.selection(scope)?;
        self.scroll_requests.push(ScrollRequest::Line { forward });
        Ok(())
    }

    fn scroll_character(
        &mut self,
        scope: SelectionScope,
        forward: bool,
    ) -> Result<(), DocumentError> {
        self.selection(scope)?;
        self.scroll_requests
            .push(ScrollRequest::Character { forward });
        Ok(())
    }

    fn add_selection_listener(&mut self, scope: SelectionScope) -> Result<(), DocumentError> {
        self.selection_mut(scope)?.listening = true;
        Ok(())
    }

    fn remove_selection_listener(&mut self, scope: SelectionScope) {
        if let Ok(sel) = self.selection_mut(scope) {
            sel.listening = false;
        }
    }
}

impl Document for SimDocument {
    fn owner_window(&self, element: ElementId) -> Result<WindowId, DocumentError> {
        Ok(self.element(element)?.window)
    }

    fn parent_window(&self, window: WindowId) -> Result<Option<WindowId>, DocumentError> {
        self.windows
            .get(window)
            .map(|w| w.parent)
            .ok_or(DocumentError::WindowGone)
    }

    fn frame_element(&self, window: WindowId) -> Result<Option<ElementId>, DocumentError> {
        self.windows
            .get(window)
            .map(|w| w.frame)
            .ok_or(DocumentError::WindowGone)
    }

    fn bounding_client_rect(&self, element: ElementId) -> Result<Rect, DocumentError> {
        Ok(self.element(element)?.rect)
    }

    fn element_kind(&self, element: ElementId) -> Result<ElementKind, DocumentError> {
        Ok(self.element(element)?.kind)
    }

    fn computed_style(&self, element: ElementId) -> Result<ComputedStyle, DocumentError> {
        Ok(self.element(element)?.style)
    }

    fn scroll_offset(&self, window: WindowId) -> Result<Point, DocumentError> {
        self.windows
            .get(window)
            .map(|w| w.scroll)
            .ok_or(DocumentError::WindowGone)
    }

    fn focus(&mut self, element: ElementId) -> Result<(), DocumentError> {
        self.element(element)?;
        self.focused = Some(element);
        Ok(())
    }

    fn add_event_listener(
        &mut self,
        window: WindowId,
        event: WindowEvent,
    ) -> Result<(), DocumentError> {
        let win = self.windows.get_mut(window).ok_or(DocumentError::WindowGone)?;
        win.listeners.push(event);
        Ok(())
    }

    fn remove_event_listener(&mut self, window: WindowId, event: WindowEvent) {
        let Some(win) = self.windows.get_mut(window) else {
            return;
        };
        if let Some(idx) = win.listeners.iter().position(|e| *e == event) {
            win.listeners.remove(idx);
        }
    }

    fn dispatch_pointer(
        &mut self,
        event: PointerEvent,
    ) -> Result<Vec<SelectionChange>, DocumentError> {
        self.dispatched.push(event);
        if event.kind == PointerKind::Up {
            return Ok(Vec::new());
        }
        Ok(self.press(event.point, event.shift).into_iter().collect())
    }

    fn selection_end(&self, field: ElementId) -> Result<usize, DocumentError> {
        let el = self.field(field)?;
        Ok(el
            .editor
            .as_ref()
            .and_then(|editor| editor.range)
            .map(|r| r.end())
            .unwrap_or(0))
    }

    fn caret_rect(&self, field: ElementId, offset: usize) -> Result<Rect, DocumentError> {
        let el = self.field(field)?;
        let offset_to_top = view_offset(self, el.window)?;
        Ok(el.caret_rect(offset, self.glyph).translate(offset_to_top))
    }

    fn text_bounds(&self, field: ElementId) -> Result<Rect, DocumentError> {
        let el = self.field(field)?;
        let offset_to_top = view_offset(self, el.window)?;
        Ok(el.text_bounds(self.glyph).translate(offset_to_top))
    }

    fn editor_rect(&self, field: ElementId) -> Result<Rect, DocumentError> {
        let el = self.field(field)?;
        let offset_to_top = view_offset(self, el.window)?;
        Ok(el.rect.translate(offset_to_top))
    }
}
