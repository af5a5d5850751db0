use crate::dom::{
    Document, ElementId, SelectionChange, SelectionScope, TextDirection, UserSelect,
};
use crate::error::SessionError;
use crate::listeners::Listener;
use crate::model::cache::EndpointCache;
use crate::model::config::HandlerConfig;
use crate::model::context::{CollapseGuard, SelectionContext, Session};
use crate::model::geometry::Point;
use crate::model::mode::{Endpoint, HandleType, Mode};
use crate::msg::Msg;
use crate::publish;
use crate::reversal;
use crate::shell::HandleShell;
use crate::synth;
use crate::view_offset::view_offset;

/// Owns the cursor/selection session for one document and its handle UI.
pub struct SelectionHandler<D: Document, S: HandleShell> {
    document: D,
    shell: S,
    config: HandlerConfig,
    mode: Mode,
    session: Option<Session>,
    collapse_guard: CollapseGuard,
}

impl<D: Document, S: HandleShell> SelectionHandler<D, S> {
    pub fn new(document: D, shell: S, config: HandlerConfig) -> Self {
        Self {
            document,
            shell,
            config,
            mode: Mode::None,
            session: None,
            collapse_guard: CollapseGuard::Idle,
        }
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn document(&self) -> &D {
        &self.document
    }

    pub fn document_mut(&mut self) -> &mut D {
        &mut self.document
    }

    pub fn shell(&self) -> &S {
        &self.shell
    }

    pub fn shell_mut(&mut self) -> &mut S {
        &mut self.shell
    }

    pub fn context(&self) -> Option<SelectionContext> {
        self.session.as_ref().map(|s| s.context)
    }

    pub fn is_rtl(&self) -> bool {
        self.session.as_ref().is_some_and(|s| s.rtl)
    }

    /// Frame-local endpoints of the active selection.
    pub fn cache(&self) -> Option<EndpointCache> {
        self.session.as_ref().and_then(|s| s.cache)
    }

    pub fn collapse_guard(&self) -> CollapseGuard {
        self.collapse_guard
    }

    pub fn into_parts(self) -> (D, S) {
        (self.document, self.shell)
    }

    // ── MVU: Update ──────────────────────────────────────────────

    pub fn update(&mut self, msg: Msg) {
        if let Some(listener) = msg.listener() {
            if !self.is_listening(listener) {
                tracing::trace!(?msg, "no subscription, dropping");
                return;
            }
        }

        match msg {
            Msg::SingleTap(point) => self.on_single_tap(point),
            Msg::HandleMove { handle, point } => match self.mode {
                Mode::Selection => self.move_handle(handle == HandleType::Start, point),
                Mode::Cursor => self.sync_cursor_drag(point),
                Mode::None => {}
            },
            Msg::HandleRelease(handle) => match self.mode {
                Mode::Selection => self.report_handle_release(handle),
                Mode::Cursor => self.run(Self::publish),
                Mode::None => {}
            },
            Msg::WindowResize | Msg::TabSelected | Msg::PageHide | Msg::KeyDown | Msg::Blur => {
                self.close_selection()
            }
            Msg::CompositionEnd => {
                if self.mode == Mode::Cursor {
                    self.close_selection();
                }
            }
            Msg::ViewportChanged => {
                if self.mode == Mode::Selection {
                    self.run(|h| {
                        h.refresh_cache(None)?;
                        h.publish()
                    });
                }
            }
            Msg::SubframeScrolled(element) => self.subdocument_scrolled(element),
            Msg::SelectionChanged(change) => {
                if self.session.as_ref().is_some_and(|s| s.selection_listener) {
                    self.on_native_selection_changed(change);
                }
            }
        }
    }

    fn is_listening(&self, listener: Listener) -> bool {
        self.session
            .as_ref()
            .is_some_and(|s| s.subscriptions.is_listening(listener))
    }

    // ── Session lifecycle ────────────────────────────────────────

    /// Whether a selection may start on `element`. Stale elements cannot.
    pub fn can_select(&self, element: ElementId) -> bool {
        let (Ok(kind), Ok(style)) = (
            self.document.element_kind(element),
            self.document.computed_style(element),
        ) else {
            return false;
        };
        !kind.excludes_selection() && style.user_select != UserSelect::None
    }

    /// Select the word under `point`. Returns whether a selection started.
    pub fn begin_selection(&mut self, element: ElementId, point: Point) -> bool {
        if !self.can_select(element) {
            tracing::debug!("element is not selectable");
            return false;
        }

        self.close_selection();
        match self.try_begin_selection(element, point) {
            Ok(()) => true,
            Err(err) => {
                tracing::debug!("no selection started: {err}");
                self.abort();
                false
            }
        }
    }

    fn try_begin_selection(&mut self, element: ElementId, point: Point) -> Result<(), SessionError> {
        let context = self.establish(element)?;
        let scope = context.scope;
        let rtl = self.is_rtl();

        self.document.remove_all_ranges(scope)?;
        self.synthesize_click(point, false)?;
        self.document.word_move(scope, false, false)?;
        self.document.word_move(scope, !rtl, true)?;

        let has_word = self.document.range_count(scope)? > 0
            && !self.document.selection_text(scope)?.trim().is_empty();
        if !has_word {
            self.document.collapse_to_start(scope)?;
            return Err(SessionError::EmptyWord);
        }

        self.document.add_selection_listener(scope)?;
        if let Some(session) = self.session.as_mut() {
            session.selection_listener = true;
        }

        self.refresh_cache(None)?;
        self.mode = Mode::Selection;
        self.shell.show_handles(&[HandleType::Start, HandleType::End])?;
        self.publish()?;

        if self.document.element_kind(element)?.is_editable() {
            self.document.focus(element)?;
        }
        tracing::debug!(rtl, "selection started");
        Ok(())
    }

    /// Show the caret handle for `element`. Returns whether cursor mode started.
    pub fn begin_cursor(&mut self, element: ElementId) -> bool {
        self.close_selection();
        match self.try_begin_cursor(element) {
            Ok(()) => true,
            Err(err) => {
                tracing::debug!("no cursor started: {err}");
                self.abort();
                false
            }
        }
    }

    fn try_begin_cursor(&mut self, element: ElementId) -> Result<(), SessionError> {
        self.establish(element)?;
        self.mode = Mode::Cursor;
        self.shell.show_handles(&[HandleType::Middle])?;
        self.publish()?;
        tracing::debug!("cursor started");
        Ok(())
    }

    /// Create the session for `element` and subscribe its listeners.
    ///
    /// The session is stored before subscribing so a partial subscription
    /// is still released on abort.
    fn establish(&mut self, element: ElementId) -> Result<SelectionContext, SessionError> {
        let window = self.document.owner_window(element)?;
        let kind = self.document.element_kind(element)?;
        let style = self.document.computed_style(element)?;
        let context = SelectionContext {
            window,
            target: element,
            scope: SelectionScope::for_target(window, element, kind),
        };

        let session = self
            .session
            .insert(Session::new(context, style.direction == TextDirection::Rtl));
        session
            .subscriptions
            .acquire(&mut self.document, &mut self.shell, window)?;
        Ok(context)
    }

    /// Select all content of `element`, starting a selection first if needed.
    pub fn select_all(&mut self, element: ElementId, point: Point) -> bool {
        if self.mode != Mode::Selection && !self.begin_selection(element, point) {
            return false;
        }

        self.run(|h| {
            let Some(context) = h.context() else {
                return Ok(());
            };
            h.document.select_all(context.scope)?;
            h.refresh_cache(None)?;
            h.publish()
        });
        self.mode == Mode::Selection
    }

    /// End the session. Does nothing when no session is active.
    pub fn close_selection(&mut self) {
        if self.mode == Mode::None {
            return;
        }
        self.teardown(true);
    }

    fn abort(&mut self) {
        if self.mode == Mode::None {
            // Handles were never shown.
            self.teardown(false);
        } else {
            self.close_selection();
        }
    }

    fn teardown(&mut self, hide: bool) {
        let previous = self.mode;
        self.mode = Mode::None;
        self.collapse_guard = CollapseGuard::Idle;

        let Some(mut session) = self.session.take() else {
            return;
        };
        let scope = session.context.scope;

        // The listener must go first: clearing the range notifies.
        if session.selection_listener {
            self.document.remove_selection_listener(scope);
        }
        // A begin that got as far as the listener has a word selected natively.
        if previous == Mode::Selection || session.selection_listener {
            if let Err(err) = self.document.remove_all_ranges(scope) {
                tracing::debug!("could not clear selection: {err}");
            }
        }

        if hide {
            if let Err(err) = self.shell.hide_handles() {
                tracing::warn!("could not hide handles: {err}");
            }
        }
        session
            .subscriptions
            .release(&mut self.document, &mut self.shell);
        tracing::debug!(from = previous.label(), "session closed");
    }

    /// Run a fallible step of an active session, aborting the session on error.
    fn run(&mut self, step: impl FnOnce(&mut Self) -> Result<(), SessionError>) {
        if let Err(err) = step(self) {
            tracing::warn!(mode = self.mode.label(), "aborting session: {err}");
            self.abort();
        }
    }

    // ── Handle drags ─────────────────────────────────────────────

    /// Drag a selection handle to `point` (top-level client coordinates).
    pub fn move_handle(&mut self, is_start: bool, point: Point) {
        if self.mode != Mode::Selection {
            return;
        }
        self.run(|h| h.try_move_handle(is_start, point));
    }

    fn try_move_handle(&mut self, is_start: bool, point: Point) -> Result<(), SessionError> {
        let Some(context) = self.context() else {
            return Ok(());
        };
        let offset = view_offset(&self.document, context.window)?;
        let endpoint = if is_start { Endpoint::Start } else { Endpoint::End };

        let Some(session) = self.session.as_mut() else {
            return Ok(());
        };
        let cache = session.cache.get_or_insert_with(EndpointCache::default);
        cache.set(endpoint, point - offset);
        let (start, end) = (cache.start + offset, cache.end + offset);

        // The plain click places the native anchor, the shift-click moves the focus.
        if self.is_rtl() {
            if !is_start {
                self.synthesize_click(end, false)?;
                if self.mode != Mode::Selection {
                    return Ok(());
                }
            }
            self.synthesize_click(start, true)?;
        } else {
            if is_start {
                self.synthesize_click(start, false)?;
                if self.mode != Mode::Selection {
                    return Ok(());
                }
            }
            self.synthesize_click(end, true)?;
        }
        Ok(())
    }

    /// Move the caret handle to `point`.
    pub fn sync_cursor_drag(&mut self, point: Point) {
        if self.mode != Mode::Cursor {
            return;
        }
        self.run(|h| {
            h.synthesize_click(point, false)?;
            if h.mode != Mode::Cursor {
                return Ok(());
            }
            h.publish()
        });
    }

    /// A selection handle was let go; fix up swapped endpoints and republish.
    pub fn report_handle_release(&mut self, handle: HandleType) {
        if self.mode != Mode::Selection {
            return;
        }
        self.run(|h| h.try_report_handle_release(handle));
    }

    fn try_report_handle_release(&mut self, handle: HandleType) -> Result<(), SessionError> {
        if self.refresh_cache(handle.endpoint())? {
            let (Some(context), Some(cache)) = (self.context(), self.cache()) else {
                return Ok(());
            };
            let offset = view_offset(&self.document, context.window)?;
            let (start, end) = (cache.start + offset, cache.end + offset);
            tracing::debug!(?handle, "handles crossed, reselecting");

            let (anchor, focus) = if self.is_rtl() { (end, start) } else { (start, end) };
            self.synthesize_click(anchor, false)?;
            if self.mode != Mode::Selection {
                return Ok(());
            }
            self.synthesize_click(focus, true)?;
            if self.mode != Mode::Selection {
                return Ok(());
            }
        }
        self.publish()
    }

    // ── Engine notifications ─────────────────────────────────────

    pub fn on_native_selection_changed(&mut self, change: SelectionChange) {
        if !change.collapsed {
            self.collapse_guard = CollapseGuard::Idle;
            return;
        }

        match self.collapse_guard {
            CollapseGuard::AwaitingResolution => {
                tracing::trace!("synthetic collapse resolved");
                self.collapse_guard = CollapseGuard::Idle;
            }
            CollapseGuard::Idle if change.caused_by_pointer_down => {
                self.collapse_guard = CollapseGuard::AwaitingResolution;
            }
            CollapseGuard::Idle => {
                tracing::debug!("selection collapsed outside the handles");
                self.close_selection();
            }
        }
    }

    /// A frame scrolled; republish if it contains the active document.
    pub fn subdocument_scrolled(&mut self, element: ElementId) {
        if self.mode == Mode::None {
            return;
        }
        self.run(|h| h.try_subdocument_scrolled(element));
    }

    fn try_subdocument_scrolled(&mut self, element: ElementId) -> Result<(), SessionError> {
        let Some(context) = self.context() else {
            return Ok(());
        };
        // Unrelated documents may have gone away; that is not our concern.
        let Ok(scrolled) = self.document.owner_window(element) else {
            return Ok(());
        };

        let mut view = Some(context.window);
        while let Some(window) = view {
            if window == scrolled {
                if self.mode == Mode::Selection {
                    self.refresh_cache(None)?;
                }
                return self.publish();
            }
            view = self.document.parent_window(window)?;
        }
        Ok(())
    }

    // ── Taps and actions ─────────────────────────────────────────

    pub fn on_single_tap(&mut self, point: Point) {
        if self.mode != Mode::Selection {
            return;
        }
        match self.point_in_selection(point) {
            Ok(true) => self.copy_selection(),
            Ok(false) => self.close_selection(),
            Err(err) => {
                tracing::warn!("could not hit-test selection: {err}");
                self.close_selection();
            }
        }
    }

    /// Whether a long-press at `point` should open the selection menu.
    pub fn should_show_context_menu(&self, point: Point) -> bool {
        self.mode == Mode::Selection && self.point_in_selection(point).unwrap_or(false)
    }

    /// Whether `point` (top-level) falls within the selection, padded by
    /// the touch radius.
    fn point_in_selection(&self, point: Point) -> Result<bool, SessionError> {
        let Some(context) = self.context() else {
            return Ok(false);
        };
        let offset = view_offset(&self.document, context.window)?;
        let bounds = self.document.range_bounding_rect(context.scope)?;
        let radius = self.config.touch.radius();
        let local = point - offset;

        Ok(local.x > bounds.left() - radius.left
            && local.x < bounds.right() + radius.right
            && local.y > bounds.top() - radius.top
            && local.y < bounds.bottom() + radius.bottom)
    }

    /// Copy the selected text, confirm with a toast, then end the session.
    pub fn copy_selection(&mut self) {
        if self.session.is_none() {
            return;
        }
        if let Err(err) = self.try_copy_selection() {
            tracing::warn!("copy failed: {err}");
        }
        self.close_selection();
    }

    fn try_copy_selection(&mut self) -> Result<(), SessionError> {
        let text = self.selected_text()?;
        if text.is_empty() {
            return Ok(());
        }
        self.shell.copy_to_clipboard(&text)?;
        self.shell.toast(&self.config.messages.text_copied)?;
        Ok(())
    }

    /// Hand the selected text to the share sheet, then end the session.
    pub fn share_selection(&mut self) {
        if self.session.is_none() {
            return;
        }
        let shared = self.selected_text().and_then(|text| {
            if !text.is_empty() {
                self.shell.share_text(&text)?;
            }
            Ok(())
        });
        if let Err(err) = shared {
            tracing::warn!("share failed: {err}");
        }
        self.close_selection();
    }

    fn selected_text(&self) -> Result<String, SessionError> {
        let Some(context) = self.context() else {
            return Ok(String::new());
        };
        let text = self.document.selection_text(context.scope)?;
        Ok(text.trim().to_string())
    }

    // ── Helpers ──────────────────────────────────────────────────

    /// Click at `point` and deliver the resulting notifications as if they
    /// arrived during dispatch. Callers must re-check the mode afterwards.
    fn synthesize_click(&mut self, point: Point, extend: bool) -> Result<(), SessionError> {
        let Some(context) = self.context() else {
            return Ok(());
        };
        let changes = synth::click(
            &mut self.document,
            self.mode,
            &context,
            point,
            extend,
            &self.config.input,
        )?;

        for change in changes {
            if !self.session.as_ref().is_some_and(|s| s.selection_listener) {
                break;
            }
            self.on_native_selection_changed(change);
        }
        Ok(())
    }

    /// Re-measure the selection, returning whether the endpoints swapped
    /// relative to the previous measurement.
    fn refresh_cache(&mut self, dragged: Option<Endpoint>) -> Result<bool, SessionError> {
        let Some(session) = self.session.as_mut() else {
            return Ok(false);
        };
        let rects = self.document.range_client_rects(session.context.scope)?;
        let fresh = EndpointCache::measure(&rects, session.rtl).ok_or(SessionError::NoGeometry)?;
        let reversed = reversal::is_reversed(session.cache.as_ref(), &fresh, dragged);
        session.cache = Some(fresh);
        Ok(reversed)
    }

    fn publish(&mut self) -> Result<(), SessionError> {
        let Some(session) = self.session.as_ref() else {
            return Ok(());
        };
        let update = publish::handle_positions(&self.document, self.mode, session)?;
        tracing::trace!(handles = update.positions.len(), "publishing positions");
        self.shell.position_handles(update)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::{ElementKind, PointerEvent, PointerKind, SelectionService, WindowEvent};
    use crate::model::geometry::Rect;
    use crate::sim::{RecordingShell, SimDocument};
    use crate::wire::OutboundMessage;

    type Handler = SelectionHandler<SimDocument, RecordingShell>;

    fn handler(doc: SimDocument) -> Handler {
        SelectionHandler::new(doc, RecordingShell::default(), HandlerConfig::default())
    }

    /// "hello world" at (80, 90), one 10x20 glyph per column.
    fn hello(direction: TextDirection) -> (Handler, ElementId) {
        let mut doc = SimDocument::new();
        let top = doc.top();
        let text = doc.add_text(top, Rect::new(80.0, 90.0, 300.0, 20.0), "hello world");
        doc.set_direction(text, direction);
        (handler(doc), text)
    }

    fn content_scope(h: &Handler) -> SelectionScope {
        SelectionScope::Content(h.document().top())
    }

    fn click_pair(x: f64, y: f64, shift: bool) -> [PointerEvent; 2] {
        let point = Point::new(x, y);
        [
            PointerEvent {
                kind: PointerKind::Down,
                point,
                shift,
            },
            PointerEvent {
                kind: PointerKind::Up,
                point,
                shift,
            },
        ]
    }

    fn collapsed(by_pointer: bool) -> Msg {
        Msg::SelectionChanged(SelectionChange {
            collapsed: true,
            caused_by_pointer_down: by_pointer,
        })
    }

    #[test]
    fn begin_selection_selects_the_word_and_shows_both_handles() {
        let (mut h, text) = hello(TextDirection::Ltr);

        assert!(h.begin_selection(text, Point::new(100.0, 100.0)));

        assert_eq!(h.mode(), Mode::Selection);
        let scope = content_scope(&h);
        assert_eq!(h.document().selection_text(scope).unwrap(), "hello");
        assert!(h.document().has_selection_listener(scope));
        assert_eq!(
            h.cache(),
            Some(EndpointCache::new(
                Point::new(80.0, 110.0),
                Point::new(130.0, 110.0)
            ))
        );
        assert_eq!(
            h.shell().shown_handles(),
            Some(&[HandleType::Start, HandleType::End][..])
        );
        let update = h.shell().last_positions().unwrap();
        assert!(!update.rtl);
        assert_eq!(update.positions.len(), 2);
        assert_eq!(update.positions[0].handle, HandleType::Start);
        assert_eq!(update.positions[0].left, 80.0);
        assert_eq!(update.positions[1].left, 130.0);
    }

    #[test]
    fn begin_selection_anchors_rtl_words_under_the_end_handle() {
        let (mut h, text) = hello(TextDirection::Rtl);

        // Column 2 from the right edge at 380.
        assert!(h.begin_selection(text, Point::new(360.0, 100.0)));

        let scope = content_scope(&h);
        assert!(h.is_rtl());
        assert_eq!(h.document().selection_text(scope).unwrap(), "hello");
        assert_eq!(h.document().selection_offsets(scope), Some((5, 0)));
        assert_eq!(
            h.cache(),
            Some(EndpointCache::new(
                Point::new(380.0, 110.0),
                Point::new(330.0, 110.0)
            ))
        );
        assert!(h.shell().last_positions().unwrap().rtl);
    }

    #[test]
    fn unselectable_targets_are_refused_without_side_effects() {
        let mut doc = SimDocument::new();
        let top = doc.top();
        let rect = Rect::new(0.0, 0.0, 100.0, 20.0);
        let mut targets: Vec<ElementId> = [
            ElementKind::Button,
            ElementKind::Embed,
            ElementKind::Image,
            ElementKind::Media,
        ]
        .into_iter()
        .map(|kind| doc.add_element(top, kind, rect))
        .collect();
        let plain = doc.add_text(top, rect, "no select");
        doc.set_user_select(plain, UserSelect::None);
        targets.push(plain);

        let mut h = handler(doc);
        for target in targets {
            assert!(!h.can_select(target));
            assert!(!h.begin_selection(target, Point::new(10.0, 10.0)));
            assert_eq!(h.mode(), Mode::None);
        }
        assert!(h.shell().sent().is_empty());
        assert!(h.shell().subscriptions().is_empty());
    }

    #[test]
    fn whitespace_only_word_aborts_without_showing_or_hiding() {
        let mut doc = SimDocument::new();
        let top = doc.top();
        let blank = doc.add_text(top, Rect::new(0.0, 0.0, 100.0, 20.0), "     ");
        let mut h = handler(doc);

        assert!(!h.begin_selection(blank, Point::new(20.0, 10.0)));

        assert_eq!(h.mode(), Mode::None);
        assert!(h.context().is_none());
        assert!(h.shell().sent().is_empty());
        assert!(h.shell().subscriptions().is_empty());
        assert!(!h.document().has_event_listener(top, WindowEvent::KeyDown));
        assert!(!h.document().has_selection_listener(SelectionScope::Content(top)));
    }

    #[test]
    fn failed_word_movement_aborts_to_none() {
        let (mut h, text) = hello(TextDirection::Ltr);
        h.document_mut().set_fail_word_move(true);

        assert!(!h.begin_selection(text, Point::new(100.0, 100.0)));

        assert_eq!(h.mode(), Mode::None);
        assert!(h.shell().subscriptions().is_empty());
        assert_eq!(h.shell().count(|m| matches!(m, OutboundMessage::HideHandles)), 0);
    }

    #[test]
    fn begin_without_geometry_clears_the_native_word() {
        let (mut h, text) = hello(TextDirection::Ltr);
        h.document_mut().set_unrendered(true);

        assert!(!h.begin_selection(text, Point::new(100.0, 100.0)));

        assert_eq!(h.mode(), Mode::None);
        let scope = content_scope(&h);
        assert_eq!(h.document().range_count(scope).unwrap(), 0);
        assert!(!h.document().has_selection_listener(scope));
        assert!(h.shell().sent().is_empty());
        assert!(h.shell().subscriptions().is_empty());
    }

    #[test]
    fn disconnected_renderer_aborts_and_releases_listeners() {
        let (mut h, text) = hello(TextDirection::Ltr);
        h.shell_mut().set_disconnected(true);

        assert!(!h.begin_selection(text, Point::new(100.0, 100.0)));

        assert_eq!(h.mode(), Mode::None);
        assert!(h.shell().subscriptions().is_empty());
        let top = h.document().top();
        assert!(!h.document().has_event_listener(top, WindowEvent::Blur));
        assert!(!h.document().has_selection_listener(SelectionScope::Content(top)));
    }

    #[test]
    fn close_is_idempotent_and_releases_everything() {
        let (mut h, text) = hello(TextDirection::Ltr);
        assert!(h.begin_selection(text, Point::new(100.0, 100.0)));

        h.close_selection();
        h.close_selection();

        let hides = h.shell().count(|m| matches!(m, OutboundMessage::HideHandles));
        assert_eq!(hides, 1);
        assert_eq!(h.mode(), Mode::None);
        assert!(h.cache().is_none());
        assert!(!h.is_rtl());
        assert_eq!(h.collapse_guard(), CollapseGuard::Idle);
        let scope = content_scope(&h);
        assert!(!h.document().has_selection_listener(scope));
        assert_eq!(h.document().range_count(scope).unwrap(), 0);
        assert!(h.shell().subscriptions().is_empty());
    }

    #[test]
    fn ltr_start_drag_anchors_at_start_and_extends_to_end() {
        let (mut h, text) = hello(TextDirection::Ltr);
        assert!(h.begin_selection(text, Point::new(100.0, 100.0)));
        h.document_mut().clear_dispatched();

        h.move_handle(true, Point::new(90.0, 110.0));

        let mut expected = click_pair(90.0, 109.0, false).to_vec();
        expected.extend(click_pair(130.0, 109.0, true));
        assert_eq!(h.document().dispatched(), expected.as_slice());
        assert_eq!(h.document().selection_text(content_scope(&h)).unwrap(), "ello");
        assert_eq!(h.mode(), Mode::Selection);
    }

    #[test]
    fn ltr_end_drag_only_extends() {
        let (mut h, text) = hello(TextDirection::Ltr);
        assert!(h.begin_selection(text, Point::new(100.0, 100.0)));
        h.document_mut().clear_dispatched();

        h.move_handle(false, Point::new(180.0, 110.0));

        assert_eq!(h.document().dispatched(), click_pair(180.0, 109.0, true).as_slice());
        assert_eq!(
            h.document().selection_text(content_scope(&h)).unwrap(),
            "hello worl"
        );
    }

    #[test]
    fn rtl_end_drag_clicks_end_then_extends_to_start() {
        let (mut h, text) = hello(TextDirection::Rtl);
        assert!(h.begin_selection(text, Point::new(360.0, 100.0)));
        h.document_mut().clear_dispatched();

        h.move_handle(false, Point::new(300.0, 110.0));

        let mut expected = click_pair(300.0, 109.0, false).to_vec();
        expected.extend(click_pair(380.0, 109.0, true));
        assert_eq!(h.document().dispatched(), expected.as_slice());
        assert_eq!(
            h.document().selection_text(content_scope(&h)).unwrap(),
            "hello wo"
        );
        assert_eq!(h.mode(), Mode::Selection);
    }

    #[test]
    fn rtl_start_drag_only_extends() {
        let (mut h, text) = hello(TextDirection::Rtl);
        assert!(h.begin_selection(text, Point::new(360.0, 100.0)));
        h.document_mut().clear_dispatched();

        h.move_handle(true, Point::new(370.0, 110.0));

        assert_eq!(h.document().dispatched(), click_pair(370.0, 109.0, true).as_slice());
        assert_eq!(h.document().selection_text(content_scope(&h)).unwrap(), "ello");
    }

    #[test]
    fn releasing_a_crossed_start_handle_reselects_in_order() {
        let (mut h, text) = hello(TextDirection::Ltr);
        assert!(h.begin_selection(text, Point::new(100.0, 100.0)));

        // Drag the start handle past the end handle at x=130.
        h.move_handle(true, Point::new(160.0, 110.0));
        h.document_mut().clear_dispatched();
        h.report_handle_release(HandleType::Start);

        let mut expected = click_pair(130.0, 109.0, false).to_vec();
        expected.extend(click_pair(160.0, 109.0, true));
        assert_eq!(h.document().dispatched(), expected.as_slice());
        assert_eq!(h.document().selection_offsets(content_scope(&h)), Some((5, 8)));

        let update = h.shell().last_positions().unwrap();
        assert_eq!(update.positions[0].left, 130.0);
        assert_eq!(update.positions[1].left, 160.0);
        assert_eq!(h.mode(), Mode::Selection);
    }

    #[test]
    fn releasing_a_crossed_rtl_end_handle_clicks_end_then_start() {
        let mut doc = SimDocument::new();
        let top = doc.top();
        let text = doc.add_text(top, Rect::new(0.0, 0.0, 200.0, 40.0), "aaaa bbbb\ncccc dddd");
        doc.set_direction(text, TextDirection::Rtl);
        let mut h = handler(doc);

        // "cccc" on the second line, visually x 160..200.
        assert!(h.begin_selection(text, Point::new(170.0, 30.0)));
        assert_eq!(h.document().selection_text(content_scope(&h)).unwrap(), "cccc");

        // Drag the end handle up onto the first line, above the start handle.
        h.move_handle(false, Point::new(185.0, 20.0));
        h.document_mut().clear_dispatched();
        h.report_handle_release(HandleType::End);

        let mut expected = click_pair(110.0, 19.0, false).to_vec();
        expected.extend(click_pair(180.0, 19.0, true));
        assert_eq!(h.document().dispatched(), expected.as_slice());
        assert_eq!(h.document().selection_offsets(content_scope(&h)), Some((9, 2)));
        assert_eq!(h.mode(), Mode::Selection);

        let update = h.shell().last_positions().unwrap();
        assert!(update.rtl);
        assert_eq!(update.positions[0].left, 180.0);
        assert_eq!(update.positions[1].left, 110.0);
    }

    #[test]
    fn releasing_an_uncrossed_handle_only_republishes() {
        let (mut h, text) = hello(TextDirection::Ltr);
        assert!(h.begin_selection(text, Point::new(100.0, 100.0)));
        h.move_handle(false, Point::new(110.0, 110.0));
        h.document_mut().clear_dispatched();
        let published = h
            .shell()
            .count(|m| matches!(m, OutboundMessage::PositionHandles(_)));

        h.update(Msg::HandleRelease(HandleType::End));

        assert!(h.document().dispatched().is_empty());
        let after = h
            .shell()
            .count(|m| matches!(m, OutboundMessage::PositionHandles(_)));
        assert_eq!(after, published + 1);
        assert_eq!(
            h.cache().map(|c| c.end),
            Some(Point::new(110.0, 110.0))
        );
    }

    #[test]
    fn pointer_down_collapse_is_ignored_once() {
        let (mut h, text) = hello(TextDirection::Ltr);
        assert!(h.begin_selection(text, Point::new(100.0, 100.0)));

        h.update(collapsed(true));
        assert_eq!(h.mode(), Mode::Selection);
        assert_eq!(h.collapse_guard(), CollapseGuard::AwaitingResolution);

        // The follow-up notification is consumed.
        h.update(collapsed(false));
        assert_eq!(h.mode(), Mode::Selection);
        assert_eq!(h.collapse_guard(), CollapseGuard::Idle);

        h.update(collapsed(false));
        assert_eq!(h.mode(), Mode::None);
    }

    #[test]
    fn expanded_selection_resets_the_guard() {
        let (mut h, text) = hello(TextDirection::Ltr);
        assert!(h.begin_selection(text, Point::new(100.0, 100.0)));

        h.update(collapsed(true));
        h.update(Msg::SelectionChanged(SelectionChange {
            collapsed: false,
            caused_by_pointer_down: true,
        }));
        assert_eq!(h.collapse_guard(), CollapseGuard::Idle);

        let scope = content_scope(&h);
        let change = h.document_mut().collapse_externally(scope);
        h.update(Msg::SelectionChanged(change));
        assert_eq!(h.mode(), Mode::None);
    }

    #[test]
    fn cursor_mode_ignores_selection_notifications() {
        let mut doc = SimDocument::new();
        let top = doc.top();
        let field = doc.add_field(top, Rect::new(10.0, 10.0, 200.0, 20.0), "abc def");
        let mut h = handler(doc);
        assert!(h.begin_cursor(field));

        h.update(collapsed(false));
        assert_eq!(h.mode(), Mode::Cursor);
    }

    #[test]
    fn global_events_close_any_session() {
        for msg in [Msg::WindowResize, Msg::TabSelected, Msg::PageHide, Msg::KeyDown, Msg::Blur] {
            let (mut h, text) = hello(TextDirection::Ltr);
            assert!(h.begin_selection(text, Point::new(100.0, 100.0)));
            h.update(msg);
            assert_eq!(h.mode(), Mode::None, "{msg:?} should close a selection");
        }
    }

    #[test]
    fn composition_end_only_closes_the_cursor() {
        let (mut h, text) = hello(TextDirection::Ltr);
        assert!(h.begin_selection(text, Point::new(100.0, 100.0)));
        h.update(Msg::CompositionEnd);
        assert_eq!(h.mode(), Mode::Selection);

        let field = {
            let doc = h.document_mut();
            let top = doc.top();
            doc.add_field(top, Rect::new(0.0, 200.0, 200.0, 20.0), "typing")
        };
        assert!(h.begin_cursor(field));
        h.update(Msg::CompositionEnd);
        assert_eq!(h.mode(), Mode::None);
    }

    #[test]
    fn events_without_a_subscription_are_dropped() {
        let (mut h, text) = hello(TextDirection::Ltr);

        h.update(Msg::SingleTap(Point::new(100.0, 100.0)));
        h.update(Msg::HandleMove {
            handle: HandleType::Start,
            point: Point::new(90.0, 110.0),
        });
        assert!(h.shell().sent().is_empty());
        assert!(h.document().dispatched().is_empty());

        assert!(h.begin_selection(text, Point::new(100.0, 100.0)));
        h.close_selection();
        h.document_mut().clear_dispatched();
        h.update(Msg::HandleMove {
            handle: HandleType::End,
            point: Point::new(150.0, 110.0),
        });
        assert!(h.document().dispatched().is_empty());
    }

    #[test]
    fn viewport_change_republishes_with_new_scroll() {
        let (mut h, text) = hello(TextDirection::Ltr);
        assert!(h.begin_selection(text, Point::new(100.0, 100.0)));

        let top = h.document().top();
        h.document_mut().set_scroll(top, Point::new(0.0, 50.0));
        h.update(Msg::ViewportChanged);

        assert_eq!(h.mode(), Mode::Selection);
        let update = h.shell().last_positions().unwrap();
        assert_eq!(update.positions[0].top, 160.0);
    }

    #[test]
    fn tap_inside_copies_then_closes() {
        let (mut h, text) = hello(TextDirection::Ltr);
        assert!(h.begin_selection(text, Point::new(100.0, 100.0)));
        assert!(h.should_show_context_menu(Point::new(100.0, 100.0)));

        h.update(Msg::SingleTap(Point::new(100.0, 100.0)));

        let sent = h.shell().sent();
        assert!(sent.contains(&OutboundMessage::CopyText {
            text: "hello".to_string()
        }));
        assert!(sent.iter().any(|m| matches!(
            m,
            OutboundMessage::Toast { message, .. } if message == "Text copied to clipboard"
        )));
        assert_eq!(sent.last(), Some(&OutboundMessage::HideHandles));
        assert_eq!(h.mode(), Mode::None);
    }

    #[test]
    fn tap_within_touch_radius_still_counts_as_inside() {
        let (mut h, text) = hello(TextDirection::Ltr);
        assert!(h.begin_selection(text, Point::new(100.0, 100.0)));

        // Selection spans x 80..130; the default radius is 12.
        assert!(h.should_show_context_menu(Point::new(140.0, 100.0)));
        assert!(!h.should_show_context_menu(Point::new(145.0, 100.0)));
    }

    #[test]
    fn tap_outside_closes_without_copying() {
        let (mut h, text) = hello(TextDirection::Ltr);
        assert!(h.begin_selection(text, Point::new(100.0, 100.0)));

        h.update(Msg::SingleTap(Point::new(300.0, 400.0)));

        assert_eq!(h.mode(), Mode::None);
        assert_eq!(
            h.shell().count(|m| matches!(m, OutboundMessage::CopyText { .. })),
            0
        );
    }

    #[test]
    fn share_sends_the_text_and_closes() {
        let (mut h, text) = hello(TextDirection::Ltr);
        assert!(h.begin_selection(text, Point::new(100.0, 100.0)));

        h.share_selection();

        assert!(h.shell().sent().contains(&OutboundMessage::ShareText {
            text: "hello".to_string()
        }));
        assert_eq!(h.mode(), Mode::None);
    }

    #[test]
    fn copy_and_share_need_a_session() {
        let (mut h, _) = hello(TextDirection::Ltr);
        h.copy_selection();
        h.share_selection();
        assert!(h.shell().sent().is_empty());
    }

    #[test]
    fn select_all_starts_a_selection_when_needed() {
        let (mut h, text) = hello(TextDirection::Ltr);

        assert!(h.select_all(text, Point::new(100.0, 100.0)));

        assert_eq!(h.mode(), Mode::Selection);
        assert_eq!(
            h.document().selection_text(content_scope(&h)).unwrap(),
            "hello world"
        );
        assert_eq!(h.cache().map(|c| c.end), Some(Point::new(190.0, 110.0)));
        assert_eq!(h.shell().last_positions().unwrap().positions[1].left, 190.0);
    }

    #[test]
    fn select_all_fails_when_no_word_can_start() {
        let (mut h, text) = hello(TextDirection::Ltr);
        h.document_mut().set_fail_word_move(true);
        assert!(!h.select_all(text, Point::new(100.0, 100.0)));
        assert_eq!(h.mode(), Mode::None);
    }

    #[test]
    fn cursor_session_shows_one_handle_and_follows_drags() {
        let mut doc = SimDocument::new();
        let top = doc.top();
        let field = doc.add_field(top, Rect::new(10.0, 10.0, 200.0, 20.0), "abc def");
        let mut h = handler(doc);

        assert!(h.begin_cursor(field));
        assert_eq!(h.mode(), Mode::Cursor);
        assert_eq!(h.shell().shown_handles(), Some(&[HandleType::Middle][..]));

        h.update(Msg::HandleMove {
            handle: HandleType::Middle,
            point: Point::new(44.0, 20.0),
        });

        assert_eq!(h.document().dispatched(), click_pair(44.0, 20.0, false).as_slice());
        assert_eq!(h.document().field_caret(field), Some(3));
        let update = h.shell().last_positions().unwrap();
        assert_eq!(update.positions.len(), 1);
        assert_eq!(update.positions[0].handle, HandleType::Middle);
        assert_eq!(update.positions[0].left, 40.0);
    }

    #[test]
    fn switching_from_cursor_to_selection_passes_through_none() {
        let mut doc = SimDocument::new();
        let top = doc.top();
        let field = doc.add_field(top, Rect::new(10.0, 10.0, 200.0, 20.0), "abc def");
        let text = doc.add_text(top, Rect::new(80.0, 90.0, 300.0, 20.0), "hello world");
        let mut h = handler(doc);

        assert!(h.begin_cursor(field));
        h.shell_mut().clear();
        assert!(h.begin_selection(text, Point::new(100.0, 100.0)));

        let sent = h.shell().sent();
        let hide = sent
            .iter()
            .position(|m| matches!(m, OutboundMessage::HideHandles));
        let show = sent
            .iter()
            .position(|m| matches!(m, OutboundMessage::ShowHandles { .. }));
        assert!(hide.is_some());
        assert!(hide < show);
        assert_eq!(h.mode(), Mode::Selection);
    }

    #[test]
    fn selecting_in_a_field_focuses_it() {
        let mut doc = SimDocument::new();
        let top = doc.top();
        let field = doc.add_field(top, Rect::new(10.0, 10.0, 200.0, 20.0), "abc def");
        let mut h = handler(doc);

        assert!(h.begin_selection(field, Point::new(25.0, 20.0)));

        assert_eq!(h.context().map(|c| c.scope), Some(SelectionScope::Field(field)));
        assert_eq!(h.document().focused(), Some(field));
        assert_eq!(
            h.document().selection_text(SelectionScope::Field(field)).unwrap(),
            "abc"
        );
    }

    #[test]
    fn destroyed_target_aborts_on_next_refresh() {
        let (mut h, text) = hello(TextDirection::Ltr);
        assert!(h.begin_selection(text, Point::new(100.0, 100.0)));

        h.document_mut().remove_element(text);
        h.update(Msg::ViewportChanged);

        assert_eq!(h.mode(), Mode::None);
        assert!(h.shell().subscriptions().is_empty());
        assert_eq!(h.shell().sent().last(), Some(&OutboundMessage::HideHandles));
    }

    #[test]
    fn stale_element_cannot_start_a_cursor() {
        let (mut h, text) = hello(TextDirection::Ltr);
        h.document_mut().remove_element(text);

        assert!(!h.can_select(text));
        assert!(!h.begin_cursor(text));
        assert_eq!(h.mode(), Mode::None);
        assert!(h.shell().subscriptions().is_empty());
    }
}
