//! Absolute handle positions for the renderer.

use crate::dom::Document;
use crate::error::SessionError;
use crate::model::context::Session;
use crate::model::geometry::Point;
use crate::model::mode::{HandleType, Mode};
use crate::view_offset::view_offset;
use crate::wire::{HandleDescriptor, PositionUpdate};

/// Compute page-coordinate handle positions for the current session.
///
/// Handles inside a subframe are flagged hidden when their frame-local
/// position falls outside the frame, so they do not float over the parent
/// page once the frame scrolls the selection out of view.
pub fn handle_positions<D: Document>(
    document: &D,
    mode: Mode,
    session: &Session,
) -> Result<PositionUpdate, SessionError> {
    let window = session.context.window;
    let scroll = document.scroll_offset(document.top_window(window)?)?;
    let offset = view_offset(document, window)?;

    let frame_size = match document.frame_element(window)? {
        Some(frame) => Some(document.bounding_client_rect(frame)?),
        None => None,
    };
    let is_hidden = |local: Point| match frame_size {
        Some(bounds) => {
            local.x < 0.0 || local.y < 0.0 || local.x > bounds.width || local.y > bounds.height
        }
        None => false,
    };

    let descriptor = |handle, local: Point| {
        let absolute = local + offset + scroll;
        HandleDescriptor {
            handle,
            left: absolute.x,
            top: absolute.y,
            hidden: is_hidden(local),
        }
    };

    let positions = match mode {
        Mode::None => Vec::new(),
        Mode::Cursor => {
            let target = session.context.target;
            let caret = document.caret_rect(target, document.selection_end(target)?)?;
            // The caret rect is already top-level; take it back to frame-local.
            let local = Point::new(caret.left(), caret.bottom()) - offset;
            vec![descriptor(HandleType::Middle, local)]
        }
        Mode::Selection => {
            let cache = session.cache.ok_or(SessionError::NoGeometry)?;
            vec![
                descriptor(HandleType::Start, cache.start),
                descriptor(HandleType::End, cache.end),
            ]
        }
    };

    Ok(PositionUpdate {
        positions,
        rtl: session.rtl,
    })
}
